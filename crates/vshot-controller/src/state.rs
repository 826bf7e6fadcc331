//! Controller state machine.
//!
//! ```text
//! Idle --Submit--> Submitting
//! Submitting --ValidationFailed | SubmitFailed--> Idle
//! Submitting --SubmitSucceeded(id)--> Polling(id)
//! Polling(id) --PollUpdate(id)--> Polling(id)
//! Polling(id) --PollTerminal(id)--> Idle
//! ```
//!
//! Any other pair is illegal and yields `None`. Poll inputs for an ID other
//! than the active one fall in that bucket.

use vshot_models::JobId;

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum ControllerState {
    #[default]
    Idle,
    Submitting,
    Polling(JobId),
}

/// Inputs that drive the state machine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Input {
    Submit,
    ValidationFailed,
    SubmitFailed,
    SubmitSucceeded(JobId),
    PollUpdate(JobId),
    PollTerminal(JobId),
}

impl ControllerState {
    /// Look up the transition for `input`.
    pub fn next(&self, input: &Input) -> Option<ControllerState> {
        use ControllerState::*;

        match (self, input) {
            (Idle, Input::Submit) => Some(Submitting),
            (Submitting, Input::ValidationFailed) | (Submitting, Input::SubmitFailed) => Some(Idle),
            (Submitting, Input::SubmitSucceeded(id)) => Some(Polling(id.clone())),
            (Polling(active), Input::PollUpdate(id)) if active == id => Some(Polling(id.clone())),
            (Polling(active), Input::PollTerminal(id)) if active == id => Some(Idle),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ControllerState::Idle => "idle",
            ControllerState::Submitting => "submitting",
            ControllerState::Polling(_) => "polling",
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, ControllerState::Idle)
    }

    /// Job being polled, if any.
    pub fn active_job_id(&self) -> Option<&JobId> {
        match self {
            ControllerState::Polling(id) => Some(id),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> JobId {
        JobId::from(s)
    }

    #[test]
    fn test_happy_path() {
        let s = ControllerState::Idle;
        let s = s.next(&Input::Submit).unwrap();
        assert_eq!(s, ControllerState::Submitting);
        let s = s.next(&Input::SubmitSucceeded(id("a"))).unwrap();
        assert_eq!(s, ControllerState::Polling(id("a")));
        let s = s.next(&Input::PollUpdate(id("a"))).unwrap();
        assert_eq!(s, ControllerState::Polling(id("a")));
        let s = s.next(&Input::PollTerminal(id("a"))).unwrap();
        assert!(s.is_idle());
    }

    #[test]
    fn test_failures_return_to_idle() {
        let s = ControllerState::Submitting;
        assert_eq!(s.next(&Input::ValidationFailed), Some(ControllerState::Idle));
        assert_eq!(s.next(&Input::SubmitFailed), Some(ControllerState::Idle));
    }

    #[test]
    fn test_stale_poll_inputs_are_rejected() {
        let s = ControllerState::Polling(id("new"));
        assert_eq!(s.next(&Input::PollUpdate(id("old"))), None);
        assert_eq!(s.next(&Input::PollTerminal(id("old"))), None);
    }

    #[test]
    fn test_illegal_inputs() {
        let idle = ControllerState::Idle;
        assert_eq!(idle.next(&Input::PollUpdate(id("a"))), None);
        assert_eq!(idle.next(&Input::SubmitSucceeded(id("a"))), None);
        assert_eq!(idle.next(&Input::SubmitFailed), None);

        let submitting = ControllerState::Submitting;
        assert_eq!(submitting.next(&Input::Submit), None);
        assert_eq!(submitting.next(&Input::PollTerminal(id("a"))), None);

        let polling = ControllerState::Polling(id("a"));
        assert_eq!(polling.next(&Input::Submit), None);
        assert_eq!(polling.next(&Input::SubmitFailed), None);
    }

    #[test]
    fn test_active_job_id() {
        assert_eq!(ControllerState::Idle.active_job_id(), None);
        assert_eq!(
            ControllerState::Polling(id("a")).active_job_id(),
            Some(&id("a"))
        );
        assert_eq!(ControllerState::Submitting.name(), "submitting");
    }
}
