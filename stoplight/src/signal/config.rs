//! Cycle timing configuration.

use std::time::Duration;

use super::SignalError;

/// Shortest time a phase is held by default.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(4000);

/// Upper bound (exclusive) on the time a phase is held by default.
pub const DEFAULT_MAX_INTERVAL: Duration = Duration::from_millis(6000);

/// How often the cycle thread checks the clock by default.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Default name of the cycle thread.
pub const DEFAULT_THREAD_NAME: &str = "stoplight-cycle";

/// Configuration for a [`SignalController`](super::SignalController).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalConfig {
    /// Shortest time between two flips.
    pub min_interval: Duration,
    /// Flip intervals are drawn uniformly from `[min_interval, max_interval)`.
    pub max_interval: Duration,
    /// Sleep between clock checks. A flip lands up to one poll late, and
    /// shutdown takes up to one poll to be noticed.
    pub poll_interval: Duration,
    /// Seed for the interval generator. `None` seeds from OS entropy.
    pub seed: Option<u64>,
    /// Name given to the cycle thread.
    pub thread_name: String,
}

impl Default for SignalConfig {
    fn default() -> Self {
        Self {
            min_interval: DEFAULT_MIN_INTERVAL,
            max_interval: DEFAULT_MAX_INTERVAL,
            poll_interval: DEFAULT_POLL_INTERVAL,
            seed: None,
            thread_name: DEFAULT_THREAD_NAME.to_owned(),
        }
    }
}

impl SignalConfig {
    /// Checks that the interval range is non-empty and the poll period is
    /// non-zero.
    ///
    /// # Errors
    ///
    /// Returns [`SignalError::InvalidConfig`] describing the first violation.
    pub fn validate(&self) -> Result<(), SignalError> {
        if self.min_interval >= self.max_interval {
            return Err(SignalError::InvalidConfig(format!(
                "min_interval ({:?}) must be less than max_interval ({:?})",
                self.min_interval, self.max_interval
            )));
        }
        if self.poll_interval.is_zero() {
            return Err(SignalError::InvalidConfig(
                "poll_interval must be non-zero".to_owned(),
            ));
        }
        Ok(())
    }
}
