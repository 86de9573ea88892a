//! Bounded retry primitive shared by the player probe, supervisor and
//! playback submission layers.

use std::{fmt::Display, thread, time::Duration};

use tracing::debug;

/// Fixed-delay retry budget.
///
/// All retrying in the crate goes through [`RetryPolicy::run`] or
/// [`RetryPolicy::run_if`]. The delay is a blocking sleep, so policies are
/// only executed on worker-pool threads, never on the async coordinator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts including the first. Zero is treated as one.
    pub attempts: u32,
    /// Pause between consecutive attempts.
    pub delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with `attempts` tries spaced `delay` apart.
    pub const fn new(attempts: u32, delay: Duration) -> Self {
        Self { attempts, delay }
    }

    /// A single attempt with no delay.
    pub const fn once() -> Self {
        Self::new(1, Duration::ZERO)
    }

    /// Effective attempt count (never below one).
    pub fn max_attempts(&self) -> u32 {
        self.attempts.max(1)
    }

    /// Run `op` until it succeeds or the budget is exhausted.
    ///
    /// `op` receives the 1-based attempt number. The last error is returned
    /// once all attempts have failed.
    pub fn run<T, E, F>(&self, operation: &str, op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
    {
        self.run_if(operation, |_| true, op)
    }

    /// Like [`RetryPolicy::run`], but stops early when `retryable` rejects
    /// the error.
    pub fn run_if<T, E, F, R>(&self, operation: &str, retryable: R, mut op: F) -> Result<T, E>
    where
        E: Display,
        F: FnMut(u32) -> Result<T, E>,
        R: Fn(&E) -> bool,
    {
        let attempts = self.max_attempts();
        let mut attempt = 1;

        loop {
            match op(attempt) {
                Ok(value) => return Ok(value),
                Err(e) => {
                    debug!(operation, attempt, attempts, error = %e, "Attempt failed");

                    if attempt >= attempts || !retryable(&e) {
                        return Err(e);
                    }

                    if !self.delay.is_zero() {
                        thread::sleep(self.delay);
                    }
                    attempt += 1;
                }
            }
        }
    }
}
