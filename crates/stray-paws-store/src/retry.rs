use std::time::Duration;

/// Linear-backoff schedule for re-running read-only store calls.
///
/// Writes are never retried; a write that timed out may still have landed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total attempts, including the first one.
    pub max_attempts: usize,
    pub base_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 4,
            base_backoff_ms: 120,
        }
    }
}

impl RetryPolicy {
    /// Pause before retry number `attempt` (1-based): attempt times the base.
    #[must_use]
    pub fn delay_for_attempt(&self, attempt: usize) -> Duration {
        Duration::from_millis(self.base_backoff_ms.saturating_mul(attempt as u64))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_grows_linearly() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_backoff_ms: 50,
        };
        assert_eq!(policy.delay_for_attempt(1), Duration::from_millis(50));
        assert_eq!(policy.delay_for_attempt(2), Duration::from_millis(100));
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(150));
    }

    #[test]
    fn huge_attempt_counts_saturate_instead_of_wrapping() {
        let policy = RetryPolicy {
            max_attempts: 2,
            base_backoff_ms: u64::MAX,
        };
        assert_eq!(policy.delay_for_attempt(3), Duration::from_millis(u64::MAX));
    }
}
