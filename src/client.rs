use std::fmt;
use std::sync::Arc;

use crate::{ClientOptions, Clients, Hosts, RequestExecutor, Subject, Tags};

/// Entry point for the SDK: holds the platform URL, the API key, and the
/// shared [`RequestExecutor`], and hands out resource handles.
#[derive(Clone)]
pub struct RiskSenseClient {
    executor: Arc<RequestExecutor>,
    platform_url: String,
    api_key: String,
}

impl fmt::Debug for RiskSenseClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RiskSenseClient")
            .field("platform_url", &self.platform_url)
            .field("api_key", &"<redacted>")
            .finish()
    }
}

impl RiskSenseClient {
    /// Creates a client with default options. A trailing slash on the
    /// platform URL is tolerated and stripped.
    pub fn new(platform_url: impl AsRef<str>, api_key: impl Into<String>) -> Self {
        let platform_url = platform_url.as_ref().trim_end_matches('/').to_owned();
        let api_key = api_key.into();
        Self {
            executor: Arc::new(RequestExecutor::new(api_key.clone(), ClientOptions::default())),
            platform_url,
            api_key,
        }
    }

    /// Creates a client from environment variables.
    ///
    /// Reads:
    /// - `RISKSENSE_PLATFORM_URL` — platform base URL
    /// - `RISKSENSE_API_KEY` — API key
    ///
    /// Returns an error if either variable is missing or empty.
    pub fn from_env() -> std::result::Result<Self, String> {
        let url = std::env::var("RISKSENSE_PLATFORM_URL")
            .map_err(|_| "missing RISKSENSE_PLATFORM_URL environment variable".to_owned())?;
        let api_key = std::env::var("RISKSENSE_API_KEY")
            .map_err(|_| "missing RISKSENSE_API_KEY environment variable".to_owned())?;
        if url.trim().is_empty() {
            return Err("RISKSENSE_PLATFORM_URL is set but empty".to_owned());
        }
        if api_key.trim().is_empty() {
            return Err("RISKSENSE_API_KEY is set but empty".to_owned());
        }
        Ok(Self::new(url, api_key))
    }

    /// Applies client options such as timeout, retry budget, and search
    /// worker count.
    pub fn with_options(mut self, options: ClientOptions) -> Self {
        self.executor = Arc::new(RequestExecutor::new(self.api_key.clone(), options));
        self
    }

    /// Overrides the `User-Agent` identity string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        let executor = (*self.executor).clone().with_user_agent(user_agent);
        self.executor = Arc::new(executor);
        self
    }

    pub fn platform_url(&self) -> &str {
        &self.platform_url
    }

    /// The shared request executor, for calling endpoints this crate does not
    /// model.
    pub fn executor(&self) -> &RequestExecutor {
        &self.executor
    }

    /// Host resource handle.
    pub fn hosts(&self) -> Hosts {
        Hosts::new(self.subject("host"))
    }

    /// Tag resource handle.
    pub fn tags(&self) -> Tags {
        Tags::new(self.subject("tag"))
    }

    /// Client-account resource handle.
    pub fn clients(&self) -> Clients {
        Clients::new(Arc::clone(&self.executor), self.platform_url.clone())
    }

    /// Search plumbing for a subject this crate does not wrap, e.g.
    /// `client.subject("hostFinding")`.
    pub fn subject(&self, name: &'static str) -> Subject {
        Subject::new(Arc::clone(&self.executor), self.platform_url.clone(), name)
    }
}

#[cfg(test)]
mod tests {
    use super::RiskSenseClient;

    #[test]
    fn trailing_slash_is_stripped() {
        let client = RiskSenseClient::new("https://platform.example/", "key");
        assert_eq!(client.platform_url(), "https://platform.example");
    }

    #[test]
    fn debug_redacts_api_key() {
        let client = RiskSenseClient::new("https://platform.example", "secret-key");
        let debug = format!("{client:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }
}
