/// Configures HTTP timeout, retry behavior, and search concurrency.
///
/// Passed explicitly at client construction; nothing reads configuration from
/// ambient shared state.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds, covering connect plus read.
    pub timeout_ms: u64,
    /// Maximum number of retries after the initial attempt.
    pub max_retries: usize,
    /// Base retry backoff in milliseconds (exponential strategy).
    pub retry_backoff_ms: u64,
    /// Response status codes that trigger a retry. Applies to every verb;
    /// idempotency of POST/PUT/DELETE retries is the caller's responsibility.
    pub retry_statuses: Vec<u16>,
    /// Maximum number of concurrent page fetches during aggregated searches.
    pub num_workers: usize,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            max_retries: 5,
            retry_backoff_ms: 500,
            retry_statuses: vec![429, 502, 503],
            num_workers: 10,
        }
    }
}
