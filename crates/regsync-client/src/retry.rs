//! Exponential backoff policy for registry requests.
//!
//! Attempt-count-bounded: each transient failure sleeps for the current
//! timeout value, then multiplies it, up to a fixed number of attempts.
//! The per-attempt request timeout and the inter-attempt sleep share the
//! same schedule, so a slow server and a dead server back off identically.

use std::time::Duration;

/// Default minimum timeout, in seconds.
pub const DEFAULT_BASE_TIMEOUT_SECS: u64 = 5;

/// Default backoff multiplier applied after each transient failure.
pub const DEFAULT_MULTIPLIER: u64 = 5;

/// Default maximum number of attempts (initial request included).
pub const DEFAULT_MAX_ATTEMPTS: u32 = 5;

/// Retry schedule configuration.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Timeout for the first attempt, in seconds.
    pub base_timeout_secs: u64,
    /// Factor the timeout grows by after each transient failure.
    pub multiplier: u64,
    /// Maximum number of attempts; the request fails once this many
    /// attempts have been made.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            base_timeout_secs: DEFAULT_BASE_TIMEOUT_SECS,
            multiplier: DEFAULT_MULTIPLIER,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
        }
    }
}

impl RetryPolicy {
    /// Create a policy with an explicit base timeout and attempt bound.
    /// The multiplier keeps its default.
    #[must_use]
    pub fn new(base_timeout_secs: u64, max_attempts: u32) -> Self {
        Self {
            base_timeout_secs,
            max_attempts,
            ..Self::default()
        }
    }

    /// Request timeout for a given zero-based attempt number.
    #[must_use]
    pub fn timeout_for(&self, attempt: u32) -> Duration {
        let secs = self
            .base_timeout_secs
            .saturating_mul(self.multiplier.saturating_pow(attempt));
        Duration::from_secs(secs)
    }

    /// Sleep applied after a failed zero-based attempt number.  Equal to
    /// that attempt's timeout; no sleep follows the final attempt.
    #[must_use]
    pub fn delay_for(&self, attempt: u32) -> Duration {
        self.timeout_for(attempt)
    }

    /// Whether another attempt may follow the given zero-based attempt.
    #[must_use]
    pub fn should_retry(&self, attempt: u32) -> bool {
        attempt + 1 < self.max_attempts
    }

    /// Total sleep accumulated by a request that fails `failures` times
    /// before succeeding or giving up.
    #[must_use]
    pub fn total_backoff(&self, failures: u32) -> Duration {
        (0..failures)
            .filter(|f| self.should_retry(*f))
            .map(|f| self.delay_for(f))
            .sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_schedule_matches_registry_constants() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.base_timeout_secs, 5);
        assert_eq!(policy.multiplier, 5);
        assert_eq!(policy.max_attempts, 5);
    }

    #[test]
    fn timeouts_grow_geometrically() {
        let policy = RetryPolicy::default();
        assert_eq!(policy.timeout_for(0), Duration::from_secs(5));
        assert_eq!(policy.timeout_for(1), Duration::from_secs(25));
        assert_eq!(policy.timeout_for(2), Duration::from_secs(125));
        assert_eq!(policy.timeout_for(3), Duration::from_secs(625));
    }

    #[test]
    fn retries_stop_at_attempt_bound() {
        let policy = RetryPolicy::new(5, 3);
        assert!(policy.should_retry(0));
        assert!(policy.should_retry(1));
        assert!(!policy.should_retry(2));
    }

    #[test]
    fn total_backoff_sums_the_geometric_series() {
        // t0 + t0*f + t0*f^2 for three failures then success.
        let policy = RetryPolicy::default();
        assert_eq!(policy.total_backoff(3), Duration::from_secs(5 + 25 + 125));
    }

    #[test]
    fn total_backoff_excludes_sleep_after_final_attempt() {
        // Five failures exhaust the policy; only four sleeps happen.
        let policy = RetryPolicy::default();
        assert_eq!(
            policy.total_backoff(5),
            Duration::from_secs(5 + 25 + 125 + 625)
        );
    }

    #[test]
    fn single_attempt_policy_never_sleeps() {
        let policy = RetryPolicy::new(5, 1);
        assert!(!policy.should_retry(0));
        assert_eq!(policy.total_backoff(1), Duration::ZERO);
    }
}
