//! Controller configuration.

use std::time::Duration;

/// Controller and status poller configuration.
#[derive(Debug, Clone)]
pub struct ControllerConfig {
    /// Delay between the end of one status check and the start of the next
    pub poll_interval: Duration,
    /// Give up after this many consecutive failed status checks.
    /// `None` keeps polling forever.
    pub max_poll_failures: Option<u32>,
    /// Consecutive failures logged before the rest are suppressed
    pub logged_poll_failures: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(2000),
            max_poll_failures: None,
            logged_poll_failures: 3,
        }
    }
}

impl ControllerConfig {
    /// Create config from environment variables.
    pub fn from_env() -> Self {
        Self {
            poll_interval: Duration::from_millis(
                std::env::var("VSHOT_POLL_INTERVAL_MS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .filter(|ms| *ms > 0)
                    .unwrap_or(2000),
            ),
            max_poll_failures: std::env::var("VSHOT_MAX_POLL_FAILURES")
                .ok()
                .and_then(|s| s.parse().ok())
                .filter(|n| *n > 0),
            logged_poll_failures: std::env::var("VSHOT_LOGGED_POLL_FAILURES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(3),
        }
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_max_poll_failures(mut self, max_poll_failures: Option<u32>) -> Self {
        self.max_poll_failures = max_poll_failures.filter(|n| *n > 0);
        self
    }
}
