//! Failed status checks of one poll task.
//!
//! A failed check needs two answers: whether it is worth a log line, and
//! whether the poller should stop trying. Both depend on the current streak.

use crate::config::ControllerConfig;

/// What the poll loop does after a failed status check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureAction {
    /// Log it and retry on the next tick
    Report { streak: u32 },
    /// Log that the following failures go unreported, then retry
    Silence { streak: u32 },
    /// Retry quietly
    Retry,
    /// Limit reached, stop polling
    GiveUp { streak: u32 },
}

/// Consecutive failed status checks, reset by any answer from the server.
#[derive(Debug, Clone)]
pub struct FailureStreak {
    streak: u32,
    reported: u32,
    limit: Option<u32>,
}

impl FailureStreak {
    /// `reported` failures per streak are logged; `limit` failures end polling.
    pub fn new(reported: u32, limit: Option<u32>) -> Self {
        Self {
            streak: 0,
            reported,
            limit,
        }
    }

    pub fn from_config(config: &ControllerConfig) -> Self {
        Self::new(config.logged_poll_failures, config.max_poll_failures)
    }

    /// The server answered. Returns the length of the streak that ended.
    pub fn reset(&mut self) -> u32 {
        std::mem::take(&mut self.streak)
    }

    pub fn record(&mut self) -> FailureAction {
        self.streak += 1;
        let streak = self.streak;

        match self.limit {
            Some(limit) if streak >= limit => FailureAction::GiveUp { streak },
            _ if streak <= self.reported => FailureAction::Report { streak },
            _ if streak == self.reported + 1 => FailureAction::Silence { streak },
            _ => FailureAction::Retry,
        }
    }
}
