//! Sliding-window admission control for outbound API calls.

use std::collections::VecDeque;
use std::time::Duration;

use tokio::sync::Mutex;
use tokio::time::{sleep, Instant};

/// Admits at most `calls` requests within any trailing `period`.
///
/// Bursts up to `calls` go through immediately; after that each admission
/// waits until the oldest recorded call leaves the window. The limiter never
/// rejects, it only delays.
///
/// The window lock is held across the forced wait, so concurrent callers are
/// admitted one at a time in the order they reached the lock.
#[derive(Debug)]
pub struct RateLimiter {
    calls: usize,
    period: Duration,
    window: Mutex<VecDeque<Instant>>,
}

impl RateLimiter {
    /// Creates a limiter. A `calls` value of zero is treated as one.
    pub fn new(calls: usize, period: Duration) -> Self {
        let calls = calls.max(1);
        Self {
            calls,
            period,
            window: Mutex::new(VecDeque::with_capacity(calls)),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls
    }

    pub fn period(&self) -> Duration {
        self.period
    }

    /// Waits until the call may proceed, then records it in the window.
    pub async fn admit(&self) {
        let mut window = self.window.lock().await;
        loop {
            let now = Instant::now();
            evict_expired(&mut window, now, self.period);

            if window.len() < self.calls {
                window.push_back(now);
                return;
            }

            let oldest = window.front().copied().unwrap_or(now);
            let wait = self.period.saturating_sub(now.duration_since(oldest));
            tracing::debug!(
                wait_ms = wait.as_millis() as u64,
                calls = self.calls,
                "rate limit window full, delaying request"
            );
            sleep(wait).await;
        }
    }
}

/// Drops timestamps that are `period` old or older.
fn evict_expired(window: &mut VecDeque<Instant>, now: Instant, period: Duration) {
    while window
        .front()
        .is_some_and(|&stamp| now.duration_since(stamp) >= period)
    {
        window.pop_front();
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use tokio::time::Instant;

    use super::RateLimiter;

    fn assert_window_bound(stamps: &[Instant], calls: usize, period: Duration) {
        for (index, start) in stamps.iter().enumerate() {
            if let Some(end) = stamps.get(index + calls) {
                assert!(
                    end.duration_since(*start) >= period,
                    "call {} admitted {:?} after call {index}",
                    index + calls,
                    end.duration_since(*start)
                );
            }
        }
    }

    #[tokio::test(start_paused = true)]
    async fn burst_up_to_limit_is_immediate() {
        let limiter = RateLimiter::new(3, Duration::from_secs(10));
        let start = Instant::now();
        for _ in 0..3 {
            limiter.admit().await;
        }
        assert_eq!(start.elapsed(), Duration::ZERO);
    }

    #[tokio::test(start_paused = true)]
    async fn call_over_limit_waits_for_oldest_to_expire() {
        let limiter = RateLimiter::new(2, Duration::from_secs(10));
        let start = Instant::now();
        limiter.admit().await;
        tokio::time::advance(Duration::from_secs(4)).await;
        limiter.admit().await;
        limiter.admit().await;

        assert!(start.elapsed() >= Duration::from_secs(10));
        assert!(start.elapsed() < Duration::from_secs(11));
    }

    #[tokio::test(start_paused = true)]
    async fn no_window_holds_more_than_limit() {
        let calls = 3;
        let period = Duration::from_secs(5);
        let limiter = RateLimiter::new(calls, period);
        let mut stamps = Vec::new();
        for round in 0..12u64 {
            if round % 4 == 0 {
                tokio::time::advance(Duration::from_millis(700 * round)).await;
            }
            limiter.admit().await;
            stamps.push(Instant::now());
        }
        assert_window_bound(&stamps, calls, period);
    }

    #[tokio::test(start_paused = true)]
    async fn concurrent_callers_share_one_window() {
        let calls = 2;
        let period = Duration::from_secs(3);
        let limiter = Arc::new(RateLimiter::new(calls, period));
        let mut handles = Vec::new();
        for index in 0..6usize {
            let limiter = Arc::clone(&limiter);
            handles.push(tokio::spawn(async move {
                limiter.admit().await;
                (index, Instant::now())
            }));
            // Let the task reach the lock before spawning the next one.
            tokio::task::yield_now().await;
        }

        let mut admitted = Vec::new();
        for handle in handles {
            admitted.push(handle.await.expect("admission task must not panic"));
        }

        // Waiters are admitted in the order they queued.
        for pair in admitted.windows(2) {
            let ((first, earlier), (second, later)) = (pair[0], pair[1]);
            assert!(first < second);
            assert!(earlier <= later, "task {second} admitted before task {first}");
        }
        let stamps: Vec<_> = admitted.iter().map(|(_, stamp)| *stamp).collect();
        assert_window_bound(&stamps, calls, period);
    }

    #[test]
    fn zero_calls_is_clamped_to_one() {
        let limiter = RateLimiter::new(0, Duration::from_secs(1));
        assert_eq!(limiter.calls(), 1);
    }
}
