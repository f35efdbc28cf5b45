//! Circuit breaker for the poll loop
//!
//! Counts consecutive failed poll cycles and pauses polling for a cooldown
//! once the limit is reached. Failed cycles never touch persisted state, so
//! pausing only delays the next comparison.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use tracing::{error, info};

pub struct CircuitBreaker {
    consecutive_errors: Arc<RwLock<u32>>,
    is_open: Arc<RwLock<bool>>,
    opened_at: Arc<RwLock<Option<Instant>>>,
    max_consecutive_errors: u32,
    cooldown: Duration,
}

impl CircuitBreaker {
    pub fn new(max_consecutive_errors: u32, cooldown_secs: u64) -> Self {
        Self {
            consecutive_errors: Arc::new(RwLock::new(0)),
            is_open: Arc::new(RwLock::new(false)),
            opened_at: Arc::new(RwLock::new(None)),
            max_consecutive_errors: max_consecutive_errors.max(1),
            cooldown: Duration::from_secs(cooldown_secs),
        }
    }

    pub async fn record_success(&self) {
        *self.consecutive_errors.write().await = 0;
        *self.is_open.write().await = false;
    }

    /// Returns true when this error opened the breaker.
    pub async fn record_error(&self) -> bool {
        let mut errors = self.consecutive_errors.write().await;
        *errors += 1;

        if *errors >= self.max_consecutive_errors && !*self.is_open.read().await {
            *self.is_open.write().await = true;
            *self.opened_at.write().await = Some(Instant::now());
            error!(consecutive_errors = *errors, "Circuit breaker OPEN, pausing polls");
            return true;
        }
        false
    }

    /// Closed breakers always proceed; an open one closes itself once the
    /// cooldown since opening has elapsed.
    pub async fn can_proceed(&self) -> bool {
        if !self.is_open().await {
            return true;
        }

        let cooled_down = self
            .opened_at
            .read()
            .await
            .is_some_and(|opened| opened.elapsed() >= self.cooldown);
        if cooled_down {
            info!(cooldown_secs = self.cooldown.as_secs(), "Circuit breaker cooldown complete, resuming polls");
            self.record_success().await;
        }
        cooled_down
    }

    pub async fn is_open(&self) -> bool {
        *self.is_open.read().await
    }

    pub async fn consecutive_errors(&self) -> u32 {
        *self.consecutive_errors.read().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn opens_after_limit_and_closes_on_success() {
        let breaker = CircuitBreaker::new(2, 300);
        assert!(!breaker.record_error().await);
        assert!(breaker.can_proceed().await);
        assert!(breaker.record_error().await);
        assert!(!breaker.can_proceed().await);

        breaker.record_success().await;
        assert!(breaker.can_proceed().await);
        assert_eq!(breaker.consecutive_errors().await, 0);
        assert!(!breaker.is_open().await);
    }

    #[tokio::test]
    async fn zero_cooldown_resets_on_next_check() {
        let breaker = CircuitBreaker::new(1, 0);
        assert!(breaker.record_error().await);
        tokio::time::sleep(Duration::from_millis(5)).await;
        assert!(breaker.can_proceed().await);
    }
}
