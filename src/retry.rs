//! Bounded exponential-backoff retry for classified request failures.

use std::future::Future;
use std::time::Duration;

use tokio::time::sleep;

use crate::{ClientOptions, Result};

/// Retry policy applied around one logical request.
///
/// The delay before retry `n` (1-based) is `backoff_factor * 2^(n-1)` seconds,
/// capped at `max_wait` and floored at `min_wait`. Only errors whose kind is
/// retryable are repeated; everything else is returned on first occurrence.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    max_attempts: u32,
    backoff_factor: f64,
    min_wait: Duration,
    max_wait: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_options(&ClientOptions::default())
    }
}

impl RetryPolicy {
    /// Creates a policy with the default wait bounds (1s..=60s).
    ///
    /// A `max_attempts` of zero is treated as one.
    pub fn new(max_attempts: u32, backoff_factor: f64) -> Self {
        let defaults = ClientOptions::default();
        Self {
            max_attempts: max_attempts.max(1),
            backoff_factor,
            min_wait: defaults.retry_min_wait,
            max_wait: defaults.retry_max_wait,
        }
    }

    pub fn from_options(opts: &ClientOptions) -> Self {
        Self::new(opts.retry_max_attempts, opts.retry_backoff_factor)
            .with_wait_bounds(opts.retry_min_wait, opts.retry_max_wait)
    }

    pub fn with_wait_bounds(mut self, min_wait: Duration, max_wait: Duration) -> Self {
        self.min_wait = min_wait;
        self.max_wait = max_wait;
        self
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Backoff delay to sleep after failed attempt number `attempt`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exp = attempt.saturating_sub(1).min(63) as i32;
        let secs = self.backoff_factor * 2f64.powi(exp);
        let delay = if secs.is_finite() && secs > 0.0 {
            Duration::try_from_secs_f64(secs).unwrap_or(self.max_wait)
        } else if secs > 0.0 {
            self.max_wait
        } else {
            Duration::ZERO
        };
        delay.min(self.max_wait).max(self.min_wait)
    }

    /// Runs `operation` until it succeeds, fails terminally, or attempts run out.
    ///
    /// On exhaustion the last error is returned unchanged.
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let mut attempt = 1u32;
        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis() as u64,
                        error = %err,
                        "retrying request after transient failure"
                    );
                    sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
