//! Retry backoff computation.
//!
//! An explicit attempt counter and a computed delay keep the retry
//! ceiling visible at the call site; callers loop rather than
//! rescheduling themselves recursively.

use std::time::Duration;

/// Capped exponential backoff: `base * 2^attempt`, bounded by both a
/// maximum delay and a maximum attempt count.
#[derive(Debug, Clone, Copy)]
pub struct BackoffPolicy {
    pub base: Duration,
    pub max_delay: Duration,
    pub max_attempts: u32,
}

impl BackoffPolicy {
    pub fn new(base: Duration, max_delay: Duration, max_attempts: u32) -> Self {
        Self {
            base,
            max_delay,
            max_attempts,
        }
    }

    /// Delay before retry number `attempt` (0-based), or `None` when the
    /// attempt ceiling is exhausted.
    pub fn delay_for(&self, attempt: u32) -> Option<Duration> {
        if attempt >= self.max_attempts {
            return None;
        }
        Some(compute_backoff(self.base, attempt, self.max_delay))
    }
}

impl Default for BackoffPolicy {
    fn default() -> Self {
        Self {
            base: Duration::from_millis(500),
            max_delay: Duration::from_secs(30),
            max_attempts: 3,
        }
    }
}

/// Exponential backoff with cap. Saturates instead of overflowing for
/// large attempt counts.
pub fn compute_backoff(base: Duration, attempt: u32, max_delay: Duration) -> Duration {
    let factor = 2_u32.checked_pow(attempt).unwrap_or(u32::MAX);
    base.checked_mul(factor).unwrap_or(max_delay).min(max_delay)
}
