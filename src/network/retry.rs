//! Retry logic with exponential backoff

use anyhow::Result;
use std::time::Duration;
use tracing::warn;

use crate::errors::{BotError, BotResult};

#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub max_attempts: u32,
    pub initial_delay_ms: u64,
    pub max_delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay_ms: 100,
            max_delay_ms: 5000,
        }
    }
}

impl RetryConfig {
    /// Delay before the next attempt: doubling backoff with ±5% jitter,
    /// capped at `max_delay_ms`.
    fn next_delay(&self, current_ms: u64) -> u64 {
        let doubled = current_ms.saturating_mul(2).min(self.max_delay_ms);
        let jitter = (doubled as f64 * 0.1 * (rand::random::<f64>() - 0.5)) as i64;
        doubled.saturating_add_signed(jitter)
    }
}

/// Run `operation` until it succeeds or attempts are exhausted. Exhaustion
/// maps to `BotError::TransientNetwork`; the scan loop treats that as a
/// skipped data point, never a fatal condition.
pub async fn retry_with_backoff<F, Fut, T>(
    operation: F,
    config: &RetryConfig,
    context: &str,
) -> BotResult<T>
where
    F: Fn() -> Fut,
    Fut: std::future::Future<Output = Result<T>>,
{
    let max_attempts = config.max_attempts.max(1);
    let mut delay = config.initial_delay_ms;

    for attempt in 1..=max_attempts {
        match operation().await {
            Ok(result) => return Ok(result),
            Err(e) if attempt == max_attempts => {
                return Err(BotError::TransientNetwork {
                    context: context.to_string(),
                    source: Some(e),
                    retry_count: attempt,
                });
            }
            Err(e) => {
                warn!(
                    "Attempt {}/{} failed for {}: {}. Retrying in {}ms...",
                    attempt, max_attempts, context, e, delay
                );
                tokio::time::sleep(Duration::from_millis(delay)).await;
                delay = config.next_delay(delay);
            }
        }
    }

    unreachable!("retry loop returns on the final attempt")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};

    #[tokio::test]
    async fn succeeds_after_transient_failures() {
        let calls = AtomicU32::new(0);
        let result = retry_with_backoff(
            || async {
                if calls.fetch_add(1, Ordering::SeqCst) < 2 {
                    Err(anyhow::anyhow!("flaky"))
                } else {
                    Ok(42u32)
                }
            },
            &RetryConfig {
                max_attempts: 3,
                initial_delay_ms: 1,
                max_delay_ms: 2,
            },
            "flaky op",
        )
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls.load(Ordering::SeqCst), 3);
    }

    #[tokio::test]
    async fn exhaustion_is_transient_error() {
        let result: BotResult<()> = retry_with_backoff(
            || async { Err(anyhow::anyhow!("down")) },
            &RetryConfig {
                max_attempts: 2,
                initial_delay_ms: 1,
                max_delay_ms: 2,
            },
            "dead endpoint",
        )
        .await;

        let err = result.unwrap_err();
        assert!(err.is_transient());
        assert!(matches!(
            err,
            BotError::TransientNetwork { retry_count: 2, .. }
        ));
    }
}
