//! Retry execution for the procedure handler stage.

mod backoff;
mod executor;

pub use backoff::{BackoffStrategy, JitterStrategy};
pub use executor::{run_with_retry, RetryDelay, RetryOptions, DEFAULT_DELAY, DEFAULT_RETRIES};
