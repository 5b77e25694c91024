//! Backoff and jitter strategies for computed retry delays.

use rand::Rng;
use std::time::Duration;

/// How the base delay grows across attempts.
#[derive(Debug, Clone, Copy)]
pub enum BackoffStrategy {
    /// The same delay for every attempt.
    Constant(Duration),
    /// base * attempt.
    Linear(Duration),
    /// base * 2^(attempt - 1).
    Exponential(Duration),
}

impl BackoffStrategy {
    /// Returns the delay for a 1-based attempt number.
    #[must_use]
    pub fn delay(&self, attempt: u32) -> Duration {
        match self {
            Self::Constant(base) => *base,
            Self::Linear(base) => base.saturating_mul(attempt.max(1)),
            Self::Exponential(base) => {
                base.saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
            }
        }
    }
}

/// Randomization applied on top of the backoff delay.
#[derive(Debug, Clone, Copy, Default)]
pub enum JitterStrategy {
    /// No randomization.
    #[default]
    None,
    /// Uniform in [0, delay].
    Full,
    /// Uniform in [delay/2, delay].
    Equal,
}

impl JitterStrategy {
    /// Applies this jitter to a delay.
    #[must_use]
    pub fn apply(&self, delay: Duration) -> Duration {
        let millis = delay.as_millis() as u64;
        match self {
            Self::None => delay,
            Self::Full => {
                if millis == 0 {
                    Duration::ZERO
                } else {
                    Duration::from_millis(rand::thread_rng().gen_range(0..=millis))
                }
            }
            Self::Equal => {
                let half = millis / 2;
                if half == 0 {
                    delay
                } else {
                    Duration::from_millis(half + rand::thread_rng().gen_range(0..=half))
                }
            }
        }
    }
}
