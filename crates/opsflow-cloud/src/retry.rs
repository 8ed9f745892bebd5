//! Deadline-bounded retry with exponential backoff
//!
//! Mutating upstream calls are wrapped in [`retry`]. Transient errors are
//! retried until the configured wall-clock ceiling is reached; anything else
//! aborts the loop on the spot.

use crate::error::Result;
use std::future::Future;
use std::time::Duration;
use tokio::time::{Instant, sleep};

/// Deadline used when `timeout` does not fit in an `Instant` (about 30 years)
const FAR_FUTURE: Duration = Duration::from_secs(86400 * 365 * 30);

/// Retry configuration for upstream operations
#[derive(Debug, Clone, PartialEq)]
pub struct RetryConfig {
    /// Wall-clock ceiling for the whole retry loop
    pub timeout: Duration,

    /// Initial delay between retries
    pub initial_delay: Duration,

    /// Maximum delay between retries
    pub max_delay: Duration,

    /// Backoff multiplier
    pub backoff_multiplier: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(10 * 60),
            initial_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
        }
    }
}

impl RetryConfig {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Delay before the retry following attempt number `attempt` (0-based)
    pub fn delay_for_attempt(&self, attempt: u32) -> Duration {
        let exponent = attempt.min(i32::MAX as u32) as i32;
        let delay = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = delay.min(self.max_delay.as_secs_f64()).max(0.0);
        Duration::from_secs_f64(capped)
    }
}

/// Run `call` until it succeeds, fails with a non-retryable error, or the
/// deadline passes. On deadline the last transient error is returned.
pub async fn retry<T, F, Fut>(config: &RetryConfig, operation: &str, mut call: F) -> Result<T>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T>>,
{
    let start = Instant::now();
    let deadline = start
        .checked_add(config.timeout)
        .unwrap_or_else(|| start + FAR_FUTURE);
    let mut attempt: u32 = 0;

    loop {
        match call().await {
            Ok(value) => {
                if attempt > 0 {
                    tracing::debug!("{} succeeded after {} retries", operation, attempt);
                }
                return Ok(value);
            }
            Err(err) if err.is_retryable() => {
                let now = Instant::now();
                if now >= deadline {
                    tracing::warn!(
                        "{} still failing after {:?}, giving up: {}",
                        operation,
                        config.timeout,
                        err
                    );
                    return Err(err);
                }

                let delay = config.delay_for_attempt(attempt).min(deadline - now);
                tracing::warn!(
                    "{} failed (attempt {}), retrying in {:?}: {}",
                    operation,
                    attempt + 1,
                    delay,
                    err
                );
                sleep(delay).await;
                attempt = attempt.saturating_add(1);
            }
            Err(err) => return Err(err),
        }
    }
}
