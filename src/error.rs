/// Error type returned by this crate.
#[derive(Debug, thiserror::Error)]
pub enum RiskSenseError {
    /// Network or request execution error from `reqwest`, including transport
    /// failures that persisted past the retry budget (DNS, TLS, timeout).
    #[error("transport error: {0}")]
    Transport(reqwest::Error),
    /// Request completed but returned a non-success status outside the
    /// retryable set. Carries the status code and raw response body.
    #[error("http error {status}: {body}")]
    Http { status: u16, body: String },
    /// A retryable status (429/502/503 by default) persisted past the retry
    /// budget.
    #[error("maximum number of retries exceeded for: {url}")]
    MaxRetries { url: String },
    /// Status 400 attributable to an invalid page-size value.
    #[error("page size error: {0}")]
    PageSize(String),
    /// An HTTP method outside GET/POST/PUT/DELETE. Caller error, never
    /// retried; no network call is attempted.
    #[error("unsupported HTTP method: {0}")]
    UnsupportedMethod(String),
    /// Response decoding or payload-shape validation error.
    #[error("decode error: {0}")]
    Decode(String),
}

impl RiskSenseError {
    /// Whether this error belongs to the request-failure family: the request
    /// itself could not be completed successfully.
    ///
    /// Caller errors ([`UnsupportedMethod`](Self::UnsupportedMethod)) and
    /// payload-shape errors ([`Decode`](Self::Decode)) fall outside the
    /// family. The page aggregator uses this to decide which per-page errors
    /// may be skipped.
    pub fn is_request_failure(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Http { .. } | Self::MaxRetries { .. } | Self::PageSize(_)
        )
    }
}
