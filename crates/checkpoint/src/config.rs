//! Scheduler configuration.

use std::time::Duration;

/// Shortest allowed scheduled second.
pub const MIN_SECOND: Duration = Duration::from_millis(1);

/// Longest allowed scheduled second.
pub const MAX_SECOND: Duration = Duration::from_secs(60);

/// Upper bound on any single timer wait (about 30 years).
pub const MAX_WAIT: Duration = Duration::from_secs(86_400 * 365 * 30);

/// Tuning for checkpoint scheduling.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchedulerConfig {
    second: Duration,
    retry_after_secs: Option<u64>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            second: Duration::from_secs(1),
            retry_after_secs: None,
        }
    }
}

impl SchedulerConfig {
    /// Create the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the wall-clock length of a scheduled second, clamped to
    /// [`MIN_SECOND`]..=[`MAX_SECOND`].
    pub fn with_second(mut self, second: Duration) -> Self {
        self.second = second.clamp(MIN_SECOND, MAX_SECOND);
        self
    }

    /// Set the retry delay used after a declined checkpoint.
    pub fn with_retry_after_secs(mut self, secs: u64) -> Self {
        self.retry_after_secs = Some(secs);
        self
    }

    /// Wall-clock length of one scheduled second.
    pub fn second(&self) -> Duration {
        self.second
    }

    /// Seconds to wait before asking again after a "no"; `None` waits a full interval.
    pub fn retry_after_secs(&self) -> Option<u64> {
        self.retry_after_secs
    }

    /// Wall-clock duration of `secs` scheduled seconds, capped at [`MAX_WAIT`].
    pub fn scaled(&self, secs: u64) -> Duration {
        self.second
            .saturating_mul(u32::try_from(secs).unwrap_or(u32::MAX))
            .min(MAX_WAIT)
    }
}
