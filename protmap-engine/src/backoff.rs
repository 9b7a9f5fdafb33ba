//! Retry with exponential backoff
//!
//! One policy object shared by every lookup call of a run. The delay before
//! retry `n` (1-based) is `min(base * 2^(n-1), max)`; a `Retry-After` hint
//! from the service replaces the computed delay, still capped at `max`.

use crate::config::RetryConfig;
use crate::lookup::LookupError;
use std::time::Duration;

/// Retry budget and delay schedule
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BackoffPolicy {
    max_attempts: u32,
    base_delay: Duration,
    max_delay: Duration,
}

/// A call that did not succeed within the budget
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Exhausted {
    /// Error from the last attempt
    pub last: LookupError,
    /// Attempts made, including the first
    pub attempts: u32,
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self::from(&RetryConfig::default())
    }
}

impl From<&RetryConfig> for BackoffPolicy {
    fn from(config: &RetryConfig) -> Self {
        Self::new(
            config.max_attempts,
            Duration::from_millis(config.base_delay_ms),
            Duration::from_millis(config.max_delay_ms),
        )
    }
}

impl BackoffPolicy {
    /// Create a policy; `max_attempts` is clamped to at least 1
    pub fn new(max_attempts: u32, base_delay: Duration, max_delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            base_delay,
            max_delay,
        }
    }

    /// Single attempt, no retries
    pub fn none() -> Self {
        Self::new(1, Duration::ZERO, Duration::ZERO)
    }

    /// Total attempts per call
    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay before retry `retry` (1-based)
    pub fn delay_for(&self, retry: u32, hint: Option<Duration>) -> Duration {
        if let Some(hint) = hint {
            return hint.min(self.max_delay);
        }
        let exponent = retry.saturating_sub(1).min(31);
        self.base_delay
            .checked_mul(1u32 << exponent)
            .unwrap_or(self.max_delay)
            .min(self.max_delay)
    }

    /// Run `op` until it succeeds, fails terminally, or the budget runs out
    ///
    /// `op` receives the 1-based attempt number.
    pub fn retry<T, F>(&self, mut op: F) -> Result<T, Exhausted>
    where
        F: FnMut(u32) -> Result<T, LookupError>,
    {
        let mut attempt = 1;
        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(error) if error.is_retryable() && attempt < self.max_attempts => {
                    let delay = self.delay_for(attempt, error.retry_after);
                    log::warn!(
                        "attempt {}/{} failed ({}), retrying in {:?}",
                        attempt,
                        self.max_attempts,
                        error,
                        delay
                    );
                    if !delay.is_zero() {
                        std::thread::sleep(delay);
                    }
                    attempt += 1;
                }
                Err(error) => {
                    return Err(Exhausted {
                        last: error,
                        attempts: attempt,
                    })
                }
            }
        }
    }
}
