use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tracing::warn;

use shared_config::AppConfig;

use crate::TokenQueueError;

/// Bounded retry for lost allocation races. Nothing else is retried.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(25),
        }
    }
}

impl RetryPolicy {
    pub fn from_config(config: &AppConfig) -> Self {
        Self {
            max_attempts: config.allocation_max_attempts.max(1),
            base_delay: Duration::from_millis(config.allocation_retry_base_ms),
        }
    }

    /// Exponential backoff with up to one base delay of jitter.
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let base_ms = self.base_delay.as_millis() as u64;
        let exponential = base_ms.saturating_mul(1u64 << attempt.saturating_sub(1).min(16));
        let jitter = rand::thread_rng().gen_range(0..=base_ms);
        Duration::from_millis(exponential.saturating_add(jitter))
    }
}

/// Runs `operation` until it stops reporting `AllocationConflict` or the
/// attempt budget runs out, in which case the conflict becomes
/// `AllocationFailed`.
pub async fn retry_on_conflict<T, F, Fut>(policy: &RetryPolicy, mut operation: F) -> Result<T, TokenQueueError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, TokenQueueError>>,
{
    let max_attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match operation().await {
            Err(TokenQueueError::AllocationConflict) if attempt < max_attempts => {
                let delay = policy.delay_for(attempt);
                warn!(
                    "Token allocation conflict (attempt {}/{}), retrying in {:?}",
                    attempt, max_attempts, delay
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            Err(TokenQueueError::AllocationConflict) => {
                return Err(TokenQueueError::AllocationFailed(format!(
                    "allocation conflict persisted after {} attempts",
                    max_attempts
                )));
            }
            other => return other,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use std::sync::atomic::{AtomicU32, Ordering};

    fn fast_policy(max_attempts: u32) -> RetryPolicy {
        RetryPolicy {
            max_attempts,
            base_delay: Duration::from_millis(1),
        }
    }

    #[tokio::test]
    async fn conflict_then_success_is_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result = retry_on_conflict(&fast_policy(3), || async move {
            if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                Err(TokenQueueError::AllocationConflict)
            } else {
                Ok(7)
            }
        })
        .await;

        assert_eq!(result.unwrap(), 7);
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn exhausted_budget_surfaces_allocation_failed() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = retry_on_conflict(&fast_policy(3), || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(TokenQueueError::AllocationConflict)
        })
        .await;

        assert_matches!(result, Err(TokenQueueError::AllocationFailed(msg)) if msg.contains("3 attempts"));
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn validation_errors_are_not_retried() {
        let calls = AtomicU32::new(0);
        let counter = &calls;

        let result: Result<(), _> = retry_on_conflict(&fast_policy(3), || async move {
            counter.fetch_add(1, Ordering::SeqCst);
            Err(TokenQueueError::Validation("bad phone".to_string()))
        })
        .await;

        assert_matches!(result, Err(TokenQueueError::Validation(_)));
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delay_grows_exponentially() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
        };

        let first = policy.delay_for(1);
        let third = policy.delay_for(3);
        assert!(first >= Duration::from_millis(10) && first <= Duration::from_millis(20));
        assert!(third >= Duration::from_millis(40) && third <= Duration::from_millis(50));
    }
}
