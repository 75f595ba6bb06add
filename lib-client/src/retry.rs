//! Bounded retry for best-effort lookups

use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;
use tracing::debug;

use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 10,
            delay_ms: 2_000,
        }
    }
}

impl RetryPolicy {
    /// Fast policy for tests
    pub fn for_testing() -> Self {
        Self {
            max_attempts: 3,
            delay_ms: 1,
        }
    }

    pub fn delay(&self) -> Duration {
        Duration::from_millis(self.delay_ms)
    }
}

/// Run `op` until it yields `Some`, at most `policy.max_attempts` times
///
/// Errors and `None` are both treated as "not yet". Exhaustion returns `None`;
/// this never fails.
pub async fn retry_optional<T, F, Fut>(policy: &RetryPolicy, mut op: F) -> Option<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<Option<T>>>,
{
    for attempt in 1..=policy.max_attempts {
        match op().await {
            Ok(Some(value)) => return Some(value),
            Ok(None) => debug!("Attempt {}/{}: not available yet", attempt, policy.max_attempts),
            Err(e) => debug!("Attempt {}/{} failed: {}", attempt, policy.max_attempts, e),
        }
        if attempt < policy.max_attempts {
            tokio::time::sleep(policy.delay()).await;
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn test_returns_first_some() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::for_testing();
        let value = retry_optional(&policy, || {
            let n = calls.fetch_add(1, Ordering::SeqCst);
            async move {
                if n == 0 {
                    Err(ClientError::Transport("down".into()))
                } else {
                    Ok(Some(7u64))
                }
            }
        })
        .await;
        assert_eq!(value, Some(7));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_exhaustion_is_none() {
        let calls = AtomicU32::new(0);
        let policy = RetryPolicy::for_testing();
        let value: Option<u64> = retry_optional(&policy, || {
            calls.fetch_add(1, Ordering::SeqCst);
            async { Ok(None) }
        })
        .await;
        assert_eq!(value, None);
        assert_eq!(calls.load(Ordering::SeqCst), policy.max_attempts);
    }
}
