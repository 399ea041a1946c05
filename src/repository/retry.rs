//! Retry with exponential backoff.

use std::fmt;
use std::future::Future;
use std::time::Duration;

use async_trait::async_trait;
use tracing::{debug, warn};

use fleetwatch_adapters::ApiError;

use crate::MonitorError;

/// Something that can wait. Swapped out in tests to record delays.
#[async_trait]
pub trait Sleeper: Send + Sync + fmt::Debug {
    async fn sleep(&self, duration: Duration);
}

#[derive(Debug, Default, Clone, Copy)]
pub struct TokioSleeper;

#[async_trait]
impl Sleeper for TokioSleeper {
    async fn sleep(&self, duration: Duration) {
        tokio::time::sleep(duration).await;
    }
}

/// Retry settings for API requests.
///
/// A request is attempted once and then retried up to `max_retries` times
/// while the failure is transient. The delay before retry `n` (0-based) is
/// `base_delay * 2^n`, capped at `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_millis(1000),
            max_delay: Duration::from_millis(30_000),
        }
    }
}

impl RetryPolicy {
    /// No retries at all.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    /// Delay to wait before the given retry.
    pub fn delay_for(&self, retry: u32) -> Duration {
        let factor = 1u32.checked_shl(retry).unwrap_or(u32::MAX);
        self.base_delay
            .checked_mul(factor)
            .map_or(self.max_delay, |d| d.min(self.max_delay))
    }

    /// Run `operation` until it succeeds, fails permanently, or retries run out.
    pub async fn run<T, F, Fut>(
        &self,
        what: &str,
        sleeper: &dyn Sleeper,
        mut operation: F,
    ) -> Result<T, MonitorError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ApiError>>,
    {
        let mut retry = 0;
        loop {
            let err = match operation().await {
                Ok(value) => return Ok(value),
                Err(err) => err,
            };
            let attempts = retry + 1;

            if !err.is_retryable() {
                debug!(what, attempts, error = %err, "permanent failure, not retrying");
                return Err(MonitorError::Fetch(err));
            }

            if retry >= self.max_retries {
                warn!(what, attempts, error = %err, "giving up after retries");
                return Err(if err.is_rate_limited() {
                    MonitorError::RateLimit { attempts }
                } else {
                    MonitorError::Fetch(err)
                });
            }

            let delay = self.delay_for(retry);
            warn!(
                what,
                attempt = attempts,
                delay_ms = delay.as_millis() as u64,
                error = %err,
                "request failed, retrying"
            );
            sleeper.sleep(delay).await;
            retry += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::RecordingSleeper;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn ms(n: u64) -> Duration {
        Duration::from_millis(n)
    }

    #[test]
    fn test_delay_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), ms(1000));
        assert_eq!(policy.delay_for(1), ms(2000));
        assert_eq!(policy.delay_for(2), ms(4000));
        assert_eq!(policy.delay_for(5), ms(30_000));
        assert_eq!(policy.delay_for(40), ms(30_000));
    }

    #[tokio::test]
    async fn test_rate_limited_twice_then_success() {
        let sleeper = RecordingSleeper::default();
        let calls = &AtomicU32::new(0);

        let result = RetryPolicy::default()
            .run("fleet", &sleeper, move || async move {
                match calls.fetch_add(1, Ordering::SeqCst) {
                    0 | 1 => Err(ApiError::RateLimited),
                    _ => Ok("ok"),
                }
            })
            .await;

        assert_eq!(result, Ok("ok"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
        assert_eq!(sleeper.delays(), vec![ms(1000), ms(2000)]);
    }

    #[tokio::test]
    async fn test_rate_limit_exhausted() {
        let sleeper = RecordingSleeper::default();
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::default()
            .run("fleet", &sleeper, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::RateLimited)
            })
            .await;

        assert_eq!(result, Err(MonitorError::RateLimit { attempts: 4 }));
        assert_eq!(calls.load(Ordering::SeqCst), 4);
        assert_eq!(sleeper.delays(), vec![ms(1000), ms(2000), ms(4000)]);
    }

    #[tokio::test]
    async fn test_transient_failure_exhausted_is_fetch_error() {
        let sleeper = RecordingSleeper::default();
        let policy = RetryPolicy {
            max_retries: 1,
            ..RetryPolicy::default()
        };

        let result: Result<(), _> = policy
            .run("fleet", &sleeper, || async {
                Err(ApiError::from_status(503, "unavailable"))
            })
            .await;

        assert_eq!(result.unwrap_err().code(), "FETCH_ERROR");
        assert_eq!(sleeper.delays(), vec![ms(1000)]);
    }

    #[tokio::test]
    async fn test_permanent_failure_not_retried() {
        let sleeper = RecordingSleeper::default();
        let calls = &AtomicU32::new(0);

        let result: Result<(), _> = RetryPolicy::default()
            .run("fleet", &sleeper, move || async move {
                calls.fetch_add(1, Ordering::SeqCst);
                Err(ApiError::from_status(404, "not found"))
            })
            .await;

        assert!(matches!(result, Err(MonitorError::Fetch(ApiError::Status { status: 404, .. }))));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(sleeper.delays().is_empty());
    }

    #[tokio::test]
    async fn test_no_retries_policy() {
        let sleeper = RecordingSleeper::default();
        let result: Result<(), _> = RetryPolicy::none()
            .run("fleet", &sleeper, || async { Err(ApiError::RateLimited) })
            .await;
        assert_eq!(result, Err(MonitorError::RateLimit { attempts: 1 }));
    }
}
