//! Bounded retry execution with status-driven failure classification.
//!
//! Client errors (HTTP 4xx) are never retried; they fail on first
//! occurrence regardless of the remaining budget. Everything else is
//! retry-eligible, including timeouts and connection failures.

use super::backoff::{BackoffStrategy, JitterStrategy};
use crate::errors::{ProcedureError, RetryError};
use std::fmt;
use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

/// Default total-attempts budget: a single attempt, no re-tries.
pub const DEFAULT_RETRIES: usize = 1;

/// Default delay between attempts.
pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);

/// The wait between attempts, fixed or computed per failure.
#[derive(Clone)]
pub enum RetryDelay {
    /// The same wait before every re-attempt.
    Fixed(Duration),
    /// Computed from the 1-based count of failed attempts so far and the
    /// error that triggered the re-attempt.
    Computed(Arc<dyn Fn(usize, &ProcedureError) -> Duration + Send + Sync>),
}

impl RetryDelay {
    /// Creates a fixed delay from milliseconds.
    #[must_use]
    pub fn fixed_millis(millis: u64) -> Self {
        Self::Fixed(Duration::from_millis(millis))
    }

    /// Creates a computed delay from a closure.
    pub fn computed<F>(delay_fn: F) -> Self
    where
        F: Fn(usize, &ProcedureError) -> Duration + Send + Sync + 'static,
    {
        Self::Computed(Arc::new(delay_fn))
    }

    /// Resolves the wait for a failed attempt.
    #[must_use]
    pub fn duration_for(&self, attempt: usize, error: &ProcedureError) -> Duration {
        match self {
            Self::Fixed(duration) => *duration,
            Self::Computed(delay_fn) => delay_fn(attempt, error),
        }
    }
}

impl Default for RetryDelay {
    fn default() -> Self {
        Self::Fixed(DEFAULT_DELAY)
    }
}

impl fmt::Debug for RetryDelay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Fixed(duration) => f.debug_tuple("Fixed").field(duration).finish(),
            Self::Computed(_) => f.write_str("Computed(..)"),
        }
    }
}

/// Configuration for retrying the handler invocation.
///
/// `retries` is a total-attempts count: `retries: 1` means exactly one
/// attempt with no re-tries. Values below 1 are normalized up to 1.
#[derive(Debug, Clone)]
pub struct RetryOptions {
    /// Maximum total attempts, minimum 1.
    pub retries: usize,
    /// Wait between attempts.
    pub delay: RetryDelay,
}

impl Default for RetryOptions {
    fn default() -> Self {
        Self {
            retries: DEFAULT_RETRIES,
            delay: RetryDelay::default(),
        }
    }
}

impl RetryOptions {
    /// Creates the default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the total-attempts budget (normalized to a minimum of 1).
    #[must_use]
    pub fn with_retries(mut self, retries: usize) -> Self {
        self.retries = retries.max(1);
        self
    }

    /// Sets a fixed delay.
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = RetryDelay::Fixed(delay);
        self
    }

    /// Sets a fixed delay from milliseconds.
    #[must_use]
    pub fn with_delay_millis(mut self, millis: u64) -> Self {
        self.delay = RetryDelay::fixed_millis(millis);
        self
    }

    /// Sets a computed delay.
    #[must_use]
    pub fn with_delay_fn<F>(mut self, delay_fn: F) -> Self
    where
        F: Fn(usize, &ProcedureError) -> Duration + Send + Sync + 'static,
    {
        self.delay = RetryDelay::computed(delay_fn);
        self
    }

    /// Sets a computed delay from a backoff strategy plus jitter.
    #[must_use]
    pub fn with_backoff(mut self, backoff: BackoffStrategy, jitter: JitterStrategy) -> Self {
        self.delay = RetryDelay::computed(move |attempt, _error| {
            jitter.apply(backoff.delay(attempt as u32))
        });
        self
    }
}

/// Runs an operation under the retry policy.
///
/// On success the value is returned immediately. A failure carrying a
/// client (4xx) status is returned as-is without consuming further
/// budget. When the budget is exhausted, the failure is wrapped in a
/// [`RetryError`] only if more than one attempt was actually made; a
/// single-attempt budget surfaces the original error unwrapped.
pub async fn run_with_retry<T, F, Fut>(
    options: &RetryOptions,
    mut operation: F,
) -> Result<T, ProcedureError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, ProcedureError>>,
{
    let budget = options.retries.max(1);
    let mut attempt = 0usize;

    loop {
        match operation().await {
            Ok(value) => return Ok(value),
            Err(error) => {
                if !error.is_retry_eligible() {
                    return Err(error);
                }

                attempt += 1;
                if attempt >= budget {
                    if attempt > 1 {
                        return Err(RetryError::new(attempt, error).into());
                    }
                    return Err(error);
                }

                let delay = options.delay.duration_for(attempt, &error);
                tracing::debug!(
                    attempt,
                    remaining = budget - attempt,
                    delay_ms = delay.as_millis() as u64,
                    error = %error,
                    "retrying after failure"
                );
                if !delay.is_zero() {
                    tokio::time::sleep(delay).await;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::HttpError;
    use parking_lot::Mutex;

    #[test]
    fn test_options_defaults() {
        let options = RetryOptions::default();
        assert_eq!(options.retries, 1);
        assert!(matches!(options.delay, RetryDelay::Fixed(d) if d == DEFAULT_DELAY));
    }

    #[test]
    fn test_with_retries_normalizes_zero() {
        let options = RetryOptions::new().with_retries(0);
        assert_eq!(options.retries, 1);
    }

    #[test]
    fn test_backoff_delay_resolution() {
        let options = RetryOptions::new().with_backoff(
            BackoffStrategy::Exponential(Duration::from_millis(10)),
            JitterStrategy::None,
        );
        let error = ProcedureError::unexpected("x");
        assert_eq!(
            options.delay.duration_for(1, &error),
            Duration::from_millis(10)
        );
        assert_eq!(
            options.delay.duration_for(3, &error),
            Duration::from_millis(40)
        );
    }

    #[tokio::test]
    async fn test_success_on_first_attempt() {
        let options = RetryOptions::new().with_retries(5).with_delay_millis(1);
        let mut calls = 0usize;

        let result = run_with_retry(&options, || {
            calls += 1;
            async { Ok(42) }
        })
        .await;

        assert_eq!(result.unwrap(), 42);
        assert_eq!(calls, 1);
    }

    #[tokio::test]
    async fn test_success_after_transient_failures() {
        let options = RetryOptions::new().with_retries(4).with_delay_millis(1);
        let mut calls = 0usize;

        let result = run_with_retry(&options, || {
            calls += 1;
            let this_call = calls;
            async move {
                if this_call < 4 {
                    Err(HttpError::new(500).into())
                } else {
                    Ok("done")
                }
            }
        })
        .await;

        assert_eq!(result.unwrap(), "done");
        assert_eq!(calls, 4);
    }

    #[tokio::test]
    async fn test_exhaustion_wraps_in_retry_error() {
        let options = RetryOptions::new().with_retries(3).with_delay_millis(1);
        let mut calls = 0usize;

        let result: Result<(), _> = run_with_retry(&options, || {
            calls += 1;
            async { Err(HttpError::new(502).into()) }
        })
        .await;

        let error = result.unwrap_err();
        assert_eq!(calls, 3);
        match error {
            ProcedureError::Retry(retry) => {
                assert_eq!(retry.attempts, 3);
                assert!(retry.last_error.is_http());
            }
            other => panic!("expected RetryError, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_single_attempt_surfaces_original_error() {
        let options = RetryOptions::new();
        let result: Result<(), _> = run_with_retry(&options, || async {
            Err(ProcedureError::unexpected("boom"))
        })
        .await;

        let error = result.unwrap_err();
        assert!(!error.is_retry());
        assert_eq!(error.kind(), "UnexpectedError");
    }

    #[tokio::test]
    async fn test_client_error_short_circuits() {
        let options = RetryOptions::new().with_retries(10).with_delay_millis(1);
        let mut calls = 0usize;

        let result: Result<(), _> = run_with_retry(&options, || {
            calls += 1;
            async { Err(HttpError::new(404).into()) }
        })
        .await;

        let error = result.unwrap_err();
        assert_eq!(calls, 1);
        assert!(error.is_http());
        assert_eq!(error.status(), Some(404));
    }

    #[tokio::test]
    async fn test_delay_fn_receives_attempt_numbers() {
        let attempts = std::sync::Arc::new(Mutex::new(Vec::new()));
        let recorded = std::sync::Arc::clone(&attempts);
        let options = RetryOptions::new().with_retries(3).with_delay_fn(move |attempt, error| {
            assert!(error.is_timeout());
            recorded.lock().push(attempt);
            Duration::from_millis(1)
        });

        let mut calls = 0usize;
        let result: Result<(), _> = run_with_retry(&options, || {
            calls += 1;
            async { Err(crate::errors::TimeoutError::from_millis(5).into()) }
        })
        .await;

        assert!(result.is_err());
        assert_eq!(calls, 3);
        // delays are computed after the first and second failures only
        assert_eq!(*attempts.lock(), vec![1, 2]);
    }
}
