use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use reqwest::{header, multipart, StatusCode};
use serde::de::DeserializeOwned;
use tokio::time::sleep;

use crate::{ClientOptions, Result, RiskSenseError};

/// Substring the platform puts in a 400 body when the requested page size is
/// over the limit. The platform signals this condition only through error
/// text, so the match must stay byte-identical to the upstream message.
pub(crate) const PAGE_SIZE_ERROR_MARKER: &str = "must be less than or equal to 1000";

const PAGE_SIZE_ERROR_MESSAGE: &str = "Maximum page size must be less than or equal to 1000.";

/// HTTP methods accepted by the platform API.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// Whether the method carries a JSON request body.
    fn has_body(self) -> bool {
        matches!(self, Self::Post | Self::Put)
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Method {
    type Err = RiskSenseError;

    /// Parses a method name, case-insensitively.
    ///
    /// Anything outside GET/POST/PUT/DELETE is a caller error and fails with
    /// [`RiskSenseError::UnsupportedMethod`] before any network activity.
    fn from_str(value: &str) -> Result<Self> {
        match value.to_ascii_uppercase().as_str() {
            "GET" => Ok(Self::Get),
            "POST" => Ok(Self::Post),
            "PUT" => Ok(Self::Put),
            "DELETE" => Ok(Self::Delete),
            _ => Err(RiskSenseError::UnsupportedMethod(value.to_owned())),
        }
    }
}

/// One file part of a multipart upload.
#[derive(Clone, Debug)]
pub struct FilePart {
    /// Form field name the platform expects (e.g. `"scanDataFile"`).
    pub field_name: String,
    /// File name reported to the platform.
    pub file_name: String,
    /// File contents.
    pub bytes: Vec<u8>,
    /// Optional MIME type; the transport picks a default when absent.
    pub content_type: Option<String>,
}

/// Normalized HTTP response: status code, headers, and body text.
#[derive(Clone, Debug)]
pub struct ApiResponse {
    pub status: u16,
    pub headers: header::HeaderMap,
    pub body: String,
}

impl ApiResponse {
    /// Deserializes the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_str(&self.body).map_err(|err| {
            RiskSenseError::Decode(format!(
                "invalid response JSON: {err}; body: {}",
                self.body
            ))
        })
    }
}

#[derive(Clone)]
/// Sends single HTTP requests to the platform with retry/backoff applied.
///
/// Stateless after construction; a single executor may be shared freely
/// across concurrent callers.
pub struct RequestExecutor {
    http: reqwest::Client,
    api_key: String,
    user_agent: String,
    options: ClientOptions,
}

impl fmt::Debug for RequestExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RequestExecutor")
            .field("api_key", &"<redacted>")
            .field("user_agent", &self.user_agent)
            .field("options", &self.options)
            .finish()
    }
}

impl RequestExecutor {
    /// Creates an executor with the default identity string
    /// `risksense-http/<crate version>`.
    pub fn new(api_key: impl Into<String>, options: ClientOptions) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: api_key.into(),
            user_agent: concat!("risksense-http/", env!("CARGO_PKG_VERSION")).to_owned(),
            options,
        }
    }

    /// Overrides the `User-Agent` identity string.
    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    pub fn options(&self) -> &ClientOptions {
        &self.options
    }

    /// Makes one request and normalizes the outcome.
    ///
    /// Every request carries the `User-Agent` identity, the `x-api-key`
    /// header, and (except for multipart uploads) `accept: application/json`.
    /// POST/PUT additionally carry `content-type: application/json` unless
    /// `files` is present, in which case the body is sent as multipart form
    /// data and the transport derives the content type and boundary itself.
    ///
    /// Statuses in the retryable set (429/502/503 by default) and transient
    /// transport failures are retried with exponential backoff up to the
    /// configured budget; this applies to every verb, so idempotency of
    /// mutating retries is the caller's responsibility. Exhausting the budget
    /// on a retryable status yields [`RiskSenseError::MaxRetries`]; on a
    /// transport failure, [`RiskSenseError::Transport`].
    ///
    /// A completed response outside [200, 299] yields
    /// [`RiskSenseError::PageSize`] when the status is 400 and the body
    /// carries the platform's page-size-limit message, otherwise
    /// [`RiskSenseError::Http`].
    pub async fn make_request(
        &self,
        method: Method,
        url: &str,
        params: Option<&[(&str, &str)]>,
        body: Option<&serde_json::Value>,
        files: Option<&[FilePart]>,
    ) -> Result<ApiResponse> {
        let mut attempt = 0usize;
        loop {
            let request = self.build_request(method, url, params, body, files)?;

            match request.send().await {
                Ok(response) => {
                    let status = response.status();
                    let headers = response.headers().clone();
                    let body = response.text().await.map_err(RiskSenseError::Transport)?;

                    if status.is_success() {
                        return Ok(ApiResponse {
                            status: status.as_u16(),
                            headers,
                            body,
                        });
                    }

                    if self.should_retry_status(status) {
                        if attempt < self.options.max_retries {
                            self.wait_before_retry(attempt).await;
                            attempt += 1;
                            continue;
                        }
                        return Err(RiskSenseError::MaxRetries {
                            url: url.to_owned(),
                        });
                    }

                    if status == StatusCode::BAD_REQUEST && body.contains(PAGE_SIZE_ERROR_MARKER) {
                        return Err(RiskSenseError::PageSize(PAGE_SIZE_ERROR_MESSAGE.to_owned()));
                    }

                    return Err(RiskSenseError::Http {
                        status: status.as_u16(),
                        body,
                    });
                }
                Err(err) => {
                    if self.should_retry_transport(&err) && attempt < self.options.max_retries {
                        self.wait_before_retry(attempt).await;
                        attempt += 1;
                        continue;
                    }
                    return Err(RiskSenseError::Transport(err));
                }
            }
        }
    }

    fn build_request(
        &self,
        method: Method,
        url: &str,
        params: Option<&[(&str, &str)]>,
        body: Option<&serde_json::Value>,
        files: Option<&[FilePart]>,
    ) -> Result<reqwest::RequestBuilder> {
        let mut request = match method {
            Method::Get => self.http.get(url),
            Method::Post => self.http.post(url),
            Method::Put => self.http.put(url),
            Method::Delete => self.http.delete(url),
        };

        request = request
            .header(header::USER_AGENT, &self.user_agent)
            .header("x-api-key", &self.api_key)
            .timeout(Duration::from_millis(self.options.timeout_ms));

        if let Some(params) = params {
            request = request.query(params);
        }

        match files {
            // accept/content-type omitted so the transport derives the
            // multipart content type and boundary itself.
            Some(files) if method.has_body() => {
                let mut form = multipart::Form::new();
                for file in files {
                    let mut part = multipart::Part::bytes(file.bytes.clone())
                        .file_name(file.file_name.clone());
                    if let Some(content_type) = &file.content_type {
                        part = part.mime_str(content_type).map_err(RiskSenseError::Transport)?;
                    }
                    form = form.part(file.field_name.clone(), part);
                }
                request = request.multipart(form);
            }
            _ => {
                request = request.header(header::ACCEPT, "application/json");
                if method.has_body() {
                    request = request.header(header::CONTENT_TYPE, "application/json");
                    if let Some(body) = body {
                        request = request.json(body);
                    }
                }
            }
        }

        Ok(request)
    }

    fn should_retry_status(&self, status: StatusCode) -> bool {
        self.options.retry_statuses.contains(&status.as_u16())
    }

    fn should_retry_transport(&self, err: &reqwest::Error) -> bool {
        err.is_timeout() || err.is_connect() || err.is_request() || err.is_body()
    }

    /// Waits before the next retry attempt using exponential backoff from
    /// the configured base delay.
    async fn wait_before_retry(&self, attempt: usize) {
        let exp = attempt.min(16) as u32;
        let multiplier = 1u64 << exp;
        let delay_ms = self.options.retry_backoff_ms.saturating_mul(multiplier);

        #[cfg(feature = "tracing")]
        tracing::debug!("retrying request after {} ms", delay_ms);

        sleep(Duration::from_millis(delay_ms)).await;
    }
}

#[cfg(test)]
mod tests {
    use super::{Method, RequestExecutor};
    use crate::{ClientOptions, RiskSenseError};

    #[test]
    fn method_parse_accepts_known_verbs_case_insensitively() {
        assert_eq!("get".parse::<Method>().unwrap(), Method::Get);
        assert_eq!("POST".parse::<Method>().unwrap(), Method::Post);
        assert_eq!("Put".parse::<Method>().unwrap(), Method::Put);
        assert_eq!("delete".parse::<Method>().unwrap(), Method::Delete);
    }

    #[test]
    fn method_parse_rejects_unsupported_verbs() {
        let err = "PATCH".parse::<Method>().unwrap_err();
        match err {
            RiskSenseError::UnsupportedMethod(method) => assert_eq!(method, "PATCH"),
            other => panic!("expected UnsupportedMethod, got {other:?}"),
        }
    }

    #[test]
    fn only_post_and_put_carry_a_body() {
        assert!(Method::Post.has_body());
        assert!(Method::Put.has_body());
        assert!(!Method::Get.has_body());
        assert!(!Method::Delete.has_body());
    }

    #[test]
    fn debug_redacts_api_key() {
        let executor = RequestExecutor::new("secret-key", ClientOptions::default());
        let debug = format!("{executor:?}");
        assert!(debug.contains("<redacted>"));
        assert!(!debug.contains("secret-key"));
    }
}
