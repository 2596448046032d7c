//! Retry schedule.

use std::time::Duration;

/// Attempt budget and exponential backoff schedule.
///
/// The delay before the attempt that follows the `n`-th failure is
/// `base_delay * 2^(n-1)`: with the default one-second base that is 1s, then 2s.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    max_attempts: u32,
    base_delay: Duration,
}

impl RetryPolicy {
    /// Default number of attempts, including the first.
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

    /// Default delay after the first failure.
    pub const DEFAULT_BASE_DELAY: Duration = Duration::from_secs(1);

    /// Creates a policy. At least one attempt is always made.
    #[must_use]
    pub const fn new(max_attempts: u32, base_delay: Duration) -> Self {
        Self {
            max_attempts: if max_attempts == 0 { 1 } else { max_attempts },
            base_delay,
        }
    }

    /// Total attempts allowed.
    #[must_use]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Delay slept after `failures` failed attempts; zero before the first.
    #[must_use]
    pub fn delay_before(&self, failures: u32) -> Duration {
        if failures == 0 {
            return Duration::ZERO;
        }
        let factor = 1_u32.checked_shl(failures - 1).unwrap_or(u32::MAX);
        self.base_delay.saturating_mul(factor)
    }

    /// Sum of all delays slept when the call succeeds on attempt `attempt`
    /// (1-based).
    #[must_use]
    pub fn total_delay(&self, attempt: u32) -> Duration {
        (1..attempt.min(self.max_attempts))
            .map(|failures| self.delay_before(failures))
            .sum()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MAX_ATTEMPTS, Self::DEFAULT_BASE_DELAY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_schedule() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.max_attempts(), 3);
        assert_eq!(policy.delay_before(0), Duration::ZERO);
        assert_eq!(policy.delay_before(1), Duration::from_secs(1));
        assert_eq!(policy.delay_before(2), Duration::from_secs(2));
    }

    #[test]
    fn test_total_delay_per_successful_attempt() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.total_delay(1), Duration::ZERO);
        assert_eq!(policy.total_delay(2), Duration::from_secs(1));
        assert_eq!(policy.total_delay(3), Duration::from_secs(3));
    }

    #[test]
    fn test_zero_attempts_clamped() {
        assert_eq!(RetryPolicy::new(0, Duration::ZERO).max_attempts(), 1);
    }

    #[test]
    fn test_large_failure_count_saturates() {
        let policy = RetryPolicy::new(100, Duration::from_secs(1));
        assert!(policy.delay_before(64) >= policy.delay_before(31));
    }
}
