use std::time::Duration;

use crate::{HairscanError, Result};

/// Exponential backoff policy applied to transient failures.
///
/// The delay before retry `n` is `initial_delay * multiplier^(n-1)`. Growth is
/// unbounded: there is no cap and no jitter.
#[derive(Clone, Debug, PartialEq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Factor applied to the delay after every transient failure.
    pub multiplier: f64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_millis(1_000),
            multiplier: 2.0,
        }
    }
}

impl RetryPolicy {
    pub fn new(max_attempts: usize, initial_delay: Duration, multiplier: f64) -> Self {
        Self {
            max_attempts,
            initial_delay,
            multiplier,
        }
    }

    /// A policy that makes exactly one attempt.
    pub fn no_retry() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    pub(crate) fn validate(&self) -> Result<()> {
        if self.max_attempts == 0 {
            return Err(HairscanError::InvalidPolicy(
                "max_attempts must be at least 1".to_owned(),
            ));
        }
        if !self.multiplier.is_finite() || self.multiplier < 0.0 {
            return Err(HairscanError::InvalidPolicy(format!(
                "multiplier must be a finite non-negative number, got {}",
                self.multiplier
            )));
        }
        Ok(())
    }

    /// Returns the delay that follows `delay`.
    ///
    /// Saturates at `Duration::MAX` instead of panicking on overflow.
    pub fn next_delay(&self, delay: Duration) -> Duration {
        Duration::try_from_secs_f64(delay.as_secs_f64() * self.multiplier)
            .unwrap_or(Duration::MAX)
    }

    /// Delays this policy would wait between attempts, in order.
    ///
    /// Yields `max_attempts - 1` values.
    pub fn delays(&self) -> impl Iterator<Item = Duration> + '_ {
        std::iter::successors(Some(self.initial_delay), move |delay| {
            Some(self.next_delay(*delay))
        })
        .take(self.max_attempts.saturating_sub(1))
    }
}
