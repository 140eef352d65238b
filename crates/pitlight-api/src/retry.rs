// Bounded exponential-backoff retry around a single logical API call.
//
// Each `run()` starts its own attempt counter; independent operations
// never share retry budget.

use std::future::Future;
use std::time::Duration;

use tracing::debug;

use crate::error::Error;

/// Retry policy for transient API failures.
///
/// Attempts an operation up to `max_attempts` times, sleeping
/// `base_delay * 2^(n-1)` after the n-th failed attempt. Permanent errors
/// ([`Error::InvalidToken`] and other non-transient classifications)
/// propagate immediately without retry.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// A policy that issues exactly one attempt.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            base_delay: Duration::ZERO,
        }
    }

    /// Run `op`, retrying transient failures per this policy.
    ///
    /// Exhausting the budget surfaces the last classified error unchanged.
    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, Error>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, Error>>,
    {
        let mut attempt: u32 = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if err.is_transient() && attempt < self.max_attempts => {
                    let delay = self.base_delay * 2u32.saturating_pow(attempt - 1);
                    debug!(
                        attempt,
                        max_attempts = self.max_attempts,
                        delay_ms = delay.as_millis(),
                        error = %err,
                        "transient API failure -- retrying"
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
                Err(err) => return Err(err),
            }
        }
    }
}
