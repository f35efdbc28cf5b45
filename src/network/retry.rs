//! Rate-limit retry with exponential backoff

use std::future::Future;
use std::time::Duration;
use tracing::{debug, warn};

use crate::config::{
    Config, DEFAULT_BACKOFF_MULTIPLIER, DEFAULT_MAX_RETRIES, DEFAULT_MAX_RETRY_DELAY_MS,
    DEFAULT_RETRY_DELAY_MS,
};
use crate::errors::{MonitorError, MonitorResult};

#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub retry_delay: Duration,
    pub backoff_multiplier: f64,
    /// Upper bound on any single backoff wait.
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_RETRIES,
            retry_delay: Duration::from_millis(DEFAULT_RETRY_DELAY_MS),
            backoff_multiplier: DEFAULT_BACKOFF_MULTIPLIER,
            max_delay: Duration::from_millis(DEFAULT_MAX_RETRY_DELAY_MS),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_attempts: config.max_retries,
            retry_delay: config.retry_delay(),
            backoff_multiplier: config.backoff_multiplier,
            max_delay: config.max_retry_delay(),
        }
    }

    /// Wait after the rate-limited attempt `attempt` (zero-based):
    /// `retry_delay * backoff_multiplier^attempt`, saturating at `max_delay`.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = i32::try_from(attempt).unwrap_or(i32::MAX);
        let factor = self.backoff_multiplier.max(1.0).powi(exponent);
        Duration::try_from_secs_f64(self.retry_delay.as_secs_f64() * factor)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }
}

/// Runs `operation` until it succeeds, retrying only on `RateLimited`.
///
/// Any other error is returned immediately. The wait between attempts is a
/// `tokio::time::sleep`, so dropping the returned future aborts the sequence.
pub async fn retry_on_rate_limit<F, Fut, T>(
    operation: F,
    policy: &RetryPolicy,
    endpoint: &str,
) -> MonitorResult<T>
where
    F: Fn() -> Fut,
    Fut: Future<Output = MonitorResult<T>>,
{
    let max_attempts = policy.max_attempts.max(1);

    for attempt in 0..max_attempts {
        match operation().await {
            Ok(result) => {
                if attempt > 0 {
                    debug!(endpoint, attempt = attempt + 1, "Request succeeded after rate limiting");
                }
                return Ok(result);
            }
            Err(e) if e.is_rate_limited() => {
                if attempt + 1 >= max_attempts {
                    break;
                }
                let delay = policy.delay_for(attempt);
                warn!(
                    "Rate limited on {} (attempt {}/{}). Retrying in {}ms...",
                    endpoint,
                    attempt + 1,
                    max_attempts,
                    delay.as_millis()
                );
                tokio::time::sleep(delay).await;
            }
            Err(e) => return Err(e),
        }
    }

    Err(MonitorError::RetriesExhausted {
        endpoint: endpoint.to_string(),
        attempts: max_attempts,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            retry_delay: Duration::from_millis(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_millis(10),
        }
    }

    fn rate_limited() -> MonitorError {
        MonitorError::RateLimited {
            endpoint: "/getVolumes/ethereum".to_string(),
        }
    }

    #[test]
    fn delay_grows_geometrically() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.delay_for(0), Duration::from_millis(1000));
        assert_eq!(policy.delay_for(1), Duration::from_millis(2000));
        assert_eq!(policy.delay_for(2), Duration::from_millis(4000));
    }

    #[test]
    fn delay_saturates_at_max_delay() {
        let config = Config {
            backoff_multiplier: 1e20,
            ..Config::default()
        };
        let policy = RetryPolicy::from_config(&config);

        assert_eq!(policy.delay_for(0), config.retry_delay());
        assert_eq!(policy.delay_for(1), config.max_retry_delay());
        assert_eq!(policy.delay_for(40), config.max_retry_delay());
        assert_eq!(policy.delay_for(u32::MAX), config.max_retry_delay());

        let tight = RetryPolicy {
            max_delay: Duration::from_millis(2500),
            ..RetryPolicy::default()
        };
        assert_eq!(tight.delay_for(1), Duration::from_millis(2000));
        assert_eq!(tight.delay_for(2), Duration::from_millis(2500));
    }

    #[tokio::test(start_paused = true)]
    async fn huge_multiplier_still_exhausts() {
        let policy = RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_millis(1),
            backoff_multiplier: f64::MAX,
            max_delay: Duration::from_millis(50),
        };
        let result: MonitorResult<()> =
            retry_on_rate_limit(|| async { Err(rate_limited()) }, &policy, "/getVolumes/ethereum").await;

        assert!(matches!(result, Err(MonitorError::RetriesExhausted { attempts: 3, .. })));
    }

    #[tokio::test]
    async fn recovers_after_rate_limit() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result = retry_on_rate_limit(
            move || async move {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(rate_limited())
                } else {
                    Ok(42)
                }
            },
            &fast_policy(3),
            "/getVolumes/ethereum",
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausts_after_max_attempts() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: MonitorResult<()> = retry_on_rate_limit(
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(rate_limited())
            },
            &fast_policy(3),
            "/getVolumes/ethereum",
        )
        .await;

        assert!(matches!(result, Err(MonitorError::RetriesExhausted { attempts: 3, .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn other_errors_fail_immediately() {
        let calls = AtomicU32::new(0);
        let counter = &calls;
        let result: MonitorResult<()> = retry_on_rate_limit(
            move || async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Err(MonitorError::request_failed("/getVolumes/ethereum", "HTTP 500"))
            },
            &fast_policy(3),
            "/getVolumes/ethereum",
        )
        .await;

        assert!(matches!(result, Err(MonitorError::RequestFailed { .. })));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn backoff_wait_is_cancellable() {
        let policy = RetryPolicy {
            max_attempts: 3,
            retry_delay: Duration::from_secs(60),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(600),
        };
        let sequence = retry_on_rate_limit(
            || async { Err::<(), _>(rate_limited()) },
            &policy,
            "/getVolumes/ethereum",
        );

        let outcome = tokio::time::timeout(Duration::from_secs(5), sequence).await;
        assert!(outcome.is_err(), "timeout should abort the backoff wait");
    }
}
