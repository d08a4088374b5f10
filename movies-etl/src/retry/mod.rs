//! Bounded exponential backoff shared by every external call.
//!
//! Delays double from the base delay and are capped at the maximum delay.
//! No jitter is applied so consecutive delays never shrink.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use tokio_retry::strategy::ExponentialBackoff;
use tokio_retry::Retry;
use tracing::{error, warn};

/// Default total number of attempts, first call included.
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;

/// Default base delay between attempts.
pub const DEFAULT_BASE_DELAY: Duration = Duration::from_millis(100);

/// Default cap on a single delay.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(10);

/// Retry policy applied to source reads, watermark migrations and index calls.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: usize,
    base_delay: Duration,
    max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_ATTEMPTS, DEFAULT_BASE_DELAY, DEFAULT_MAX_DELAY)
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: usize, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// A policy that calls the action exactly once.
    pub fn no_retry() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    pub fn max_attempts(&self) -> usize {
        self.max_attempts
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    /// Delays slept between consecutive attempts.
    ///
    /// Yields `max_attempts - 1` values; the n-th retry waits
    /// `base_delay * 2^n`, capped at `max_delay`.
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let base_millis = u64::try_from(self.base_delay.as_millis()).unwrap_or(u64::MAX);

        ExponentialBackoff::from_millis(2)
            .factor(base_millis)
            .max_delay(self.max_delay)
            .take(self.max_attempts - 1)
    }

    /// Run `action` until it succeeds or the attempt budget is spent.
    ///
    /// The last error is returned unchanged.
    pub async fn run<A, Fut, T, E>(&self, operation: &str, mut action: A) -> Result<T, E>
    where
        A: FnMut() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: Display,
    {
        let max_attempts = self.max_attempts;
        let mut attempts = 0usize;

        let result = Retry::spawn(self.delays(), || {
            attempts += 1;
            let attempt = attempts;
            let call = action();

            async move {
                let result = call.await;
                if let Err(e) = &result {
                    if attempt < max_attempts {
                        warn!(
                            operation = operation,
                            attempt = attempt,
                            max_attempts = max_attempts,
                            error = %e,
                            "Attempt failed, retrying"
                        );
                    }
                }
                result
            }
        })
        .await;

        if let Err(e) = &result {
            error!(
                operation = operation,
                attempts = attempts,
                max_attempts = max_attempts,
                error = %e,
                "Giving up after exhausting retry attempts"
            );
        }

        result
    }
}
