use std::future::Future;
use std::time::Duration;

use rand::Rng as _;

/// Exponential backoff policy with jitter for transient network failures.
#[derive(Debug, Clone)]
pub struct Backoff {
    pub max_retries: u32,
    pub base_delay_secs: u64,
    pub max_delay_secs: u64,
}

impl Default for Backoff {
    fn default() -> Self {
        Self {
            max_retries: 2,
            base_delay_secs: 5,
            max_delay_secs: 60,
        }
    }
}

impl Backoff {
    /// Delay before the given retry (0-indexed):
    /// `min(base * 2^retry, max) + jitter(0..base)`.
    fn delay(&self, retry: u32) -> Duration {
        let doubled = self
            .base_delay_secs
            .saturating_mul(1u64.checked_shl(retry).unwrap_or(u64::MAX));
        let capped = doubled.min(self.max_delay_secs);
        let jitter = if self.base_delay_secs > 0 {
            rand::thread_rng().gen_range(0..self.base_delay_secs)
        } else {
            0
        };
        Duration::from_secs(capped + jitter)
    }

    /// Run `operation`, retrying while `retryable` approves the error and
    /// attempts remain. Returns the first success or the last error.
    pub async fn run<F, Fut, T, E, C>(&self, retryable: C, operation: F) -> Result<T, E>
    where
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        C: Fn(&E) -> bool,
        E: std::fmt::Display,
    {
        let attempts = self.max_retries + 1;
        let mut last_err: Option<E> = None;

        for attempt in 0..attempts {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) => {
                    if !retryable(&e) || attempt + 1 >= attempts {
                        last_err = Some(e);
                        break;
                    }
                    let delay = self.delay(attempt);
                    tracing::warn!(
                        "Transient failure (attempt {}/{}), retrying in {}s: {}",
                        attempt + 1,
                        attempts,
                        delay.as_secs(),
                        e
                    );
                    tokio::time::sleep(delay).await;
                }
            }
        }

        Err(last_err.expect("at least one attempt must have run"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    fn no_sleep(max_retries: u32) -> Backoff {
        Backoff {
            max_retries,
            base_delay_secs: 0,
            max_delay_secs: 0,
        }
    }

    #[test]
    fn test_delay_doubles_and_caps() {
        let backoff = Backoff {
            max_retries: 10,
            base_delay_secs: 2,
            max_delay_secs: 30,
        };
        let d0 = backoff.delay(0);
        assert!(d0.as_secs() >= 2 && d0.as_secs() < 4);
        let d3 = backoff.delay(3);
        assert!(d3.as_secs() >= 16 && d3.as_secs() < 18);
        let d10 = backoff.delay(10);
        assert!(d10.as_secs() >= 30 && d10.as_secs() < 32);
    }

    #[tokio::test]
    async fn test_first_success_short_circuits() {
        let result: Result<u32, String> = no_sleep(3).run(|_| true, || async { Ok(7) }).await;
        assert_eq!(result.unwrap(), 7);
    }

    #[tokio::test]
    async fn test_non_retryable_fails_immediately() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<u32, String> = no_sleep(3)
            .run(
                |_| false,
                || {
                    let c = c.clone();
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        Err("fatal".to_string())
                    }
                },
            )
            .await;
        assert_eq!(result.unwrap_err(), "fatal");
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_after_transient_failures() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<u32, String> = no_sleep(3)
            .run(
                |_| true,
                || {
                    let c = c.clone();
                    async move {
                        if c.fetch_add(1, Ordering::SeqCst) < 2 {
                            Err("transient".to_string())
                        } else {
                            Ok(9)
                        }
                    }
                },
            )
            .await;
        assert_eq!(result.unwrap(), 9);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn test_exhaustion_returns_last_error() {
        let calls = Arc::new(AtomicU32::new(0));
        let c = calls.clone();
        let result: Result<u32, String> = no_sleep(2)
            .run(
                |_| true,
                || {
                    let c = c.clone();
                    async move {
                        c.fetch_add(1, Ordering::SeqCst);
                        Err("still down".to_string())
                    }
                },
            )
            .await;
        assert_eq!(result.unwrap_err(), "still down");
        // 1 initial + 2 retries
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }
}
