use std::time::Duration;

/// Configures HTTP timeout, retry and client-side rate limiting.
#[derive(Clone, Debug, PartialEq)]
pub struct ClientOptions {
    /// Per-request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum number of attempts, including the first one.
    pub retry_max_attempts: u32,
    /// Exponential backoff multiplier, in seconds.
    pub retry_backoff_factor: f64,
    /// Lower bound for a single backoff delay.
    pub retry_min_wait: Duration,
    /// Upper bound for a single backoff delay.
    pub retry_max_wait: Duration,
    /// Maximum calls admitted within any trailing `rate_limit_period`.
    pub rate_limit_calls: usize,
    /// Length of the sliding rate-limit window.
    pub rate_limit_period: Duration,
}

impl Default for ClientOptions {
    fn default() -> Self {
        Self {
            timeout_ms: 30_000,
            retry_max_attempts: 3,
            retry_backoff_factor: 2.0,
            retry_min_wait: Duration::from_secs(1),
            retry_max_wait: Duration::from_secs(60),
            rate_limit_calls: 60,
            rate_limit_period: Duration::from_secs(60),
        }
    }
}
