use std::time::Duration;

pub const MAX_RETRIES: u32 = 10;
pub const BASE_DELAY: Duration = Duration::from_secs(1);

/// Bounded retry with linear, additively accumulated backoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    /// No waiting between attempts; for tests and local engines.
    pub fn immediate(max_retries: u32) -> Self {
        RetryPolicy { max_retries, base_delay: Duration::ZERO }
    }

    /// Wait before the next attempt after `failed_attempts` failures:
    /// `(1 + 2 + ... + n) × base_delay`.
    pub fn backoff_after(&self, failed_attempts: u32) -> Duration {
        let n = failed_attempts as u64;
        let units = n * (n + 1) / 2;
        self.base_delay.saturating_mul(units.min(u32::MAX as u64) as u32)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicy {
            max_retries: MAX_RETRIES,
            base_delay: BASE_DELAY,
        }
    }
}
