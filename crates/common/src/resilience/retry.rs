//! Policy-driven retry with exponential backoff
//!
//! The retry loop knows nothing about HTTP. Callers supply a
//! [`RetryPolicy`] that inspects each failure and decides whether another
//! attempt is worthwhile; the loop handles attempt counting and sleeping.
//!
//! ```
//! use std::time::Duration;
//!
//! use glue_common::resilience::{retry_with_policy, Backoff, RetryDecision};
//!
//! # tokio_test::block_on(async {
//! let backoff = Backoff::exponential(Duration::ZERO);
//! let policy = |_: &&str, _: u32| RetryDecision::Retry;
//! let result = retry_with_policy(3, &backoff, &policy, |attempt| async move {
//!     if attempt < 3 { Err("transient") } else { Ok(attempt) }
//! })
//! .await;
//! assert_eq!(result.ok(), Some(3));
//! # });
//! ```

use std::future::Future;
use std::time::Duration;

use thiserror::Error;

/// Decision for whether to retry an operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetryDecision {
    /// Retry the operation with the default backoff delay
    Retry,
    /// Retry the operation with a custom delay
    RetryAfter(Duration),
    /// Don't retry the operation
    Stop,
}

/// Trait for determining whether an error should be retried
pub trait RetryPolicy<E> {
    /// Inspect the failure of attempt `attempt` (1-based)
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision;
}

impl<E, F> RetryPolicy<E> for F
where
    F: Fn(&E, u32) -> RetryDecision,
{
    fn should_retry(&self, error: &E, attempt: u32) -> RetryDecision {
        self(error, attempt)
    }
}

/// Exponential backoff: `base * 2^(retry_number - 1)`, capped at `max_delay`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Backoff {
    base: Duration,
    max_delay: Duration,
}

impl Backoff {
    /// Doubling backoff starting at `base`
    #[must_use]
    pub const fn exponential(base: Duration) -> Self {
        Self { base, max_delay: Duration::from_secs(60) }
    }

    /// Cap individual delays
    #[must_use]
    pub const fn with_max_delay(mut self, max_delay: Duration) -> Self {
        self.max_delay = max_delay;
        self
    }

    /// Delay to wait after the `retry_number`-th failure (1-based)
    #[must_use]
    pub fn delay_for(&self, retry_number: u32) -> Duration {
        let shift = retry_number.saturating_sub(1).min(16);
        self.base.saturating_mul(1u32 << shift).min(self.max_delay)
    }
}

/// Terminal failure of a retry loop
#[derive(Debug, Error)]
#[error("operation failed after {attempts} attempt(s): {error}")]
pub struct RetryFailure<E> {
    /// Error returned by the last attempt
    pub error: E,
    /// Number of attempts made
    pub attempts: u32,
    /// `true` when the policy still wanted to retry but attempts ran out
    pub exhausted: bool,
}

/// Run `operation` up to `max_attempts` times.
///
/// `operation` receives the 1-based attempt number. After each failure the
/// policy is consulted; [`RetryDecision::Stop`] ends the loop immediately.
///
/// # Errors
///
/// Returns [`RetryFailure`] carrying the last error and the attempt count.
pub async fn retry_with_policy<F, Fut, T, E, P>(
    max_attempts: u32,
    backoff: &Backoff,
    policy: &P,
    mut operation: F,
) -> Result<T, RetryFailure<E>>
where
    F: FnMut(u32) -> Fut,
    Fut: Future<Output = Result<T, E>>,
    P: RetryPolicy<E> + ?Sized,
{
    let max_attempts = max_attempts.max(1);
    let mut attempt = 1;

    loop {
        let error = match operation(attempt).await {
            Ok(value) => return Ok(value),
            Err(error) => error,
        };

        let delay = match policy.should_retry(&error, attempt) {
            RetryDecision::Stop => {
                return Err(RetryFailure { error, attempts: attempt, exhausted: false });
            }
            _ if attempt >= max_attempts => {
                return Err(RetryFailure { error, attempts: attempt, exhausted: true });
            }
            RetryDecision::Retry => backoff.delay_for(attempt),
            RetryDecision::RetryAfter(delay) => delay,
        };

        #[cfg(feature = "observability")]
        tracing::debug!(attempt, delay_ms = delay.as_millis() as u64, "retrying after failure");

        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
        attempt += 1;
    }
}
