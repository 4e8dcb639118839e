//! Lifecycle state of an analysis session.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::domain::foundation::StateMachine;

/// Lifecycle state of the session controller.
///
/// ```text
/// Idle -> Submitting -> Streaming -> Completed -> Idle
///              |             |
///              +--> Failed <-+--> Idle
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Submitting,
    Streaming,
    Completed,
    Failed,
}

impl SessionState {
    /// Returns true while a submission is in flight.
    pub fn is_busy(&self) -> bool {
        matches!(self, SessionState::Submitting | SessionState::Streaming)
    }

    /// Returns true once the session has ended, successfully or not.
    pub fn is_finished(&self) -> bool {
        matches!(self, SessionState::Completed | SessionState::Failed)
    }
}

impl StateMachine for SessionState {
    fn can_transition_to(&self, target: &Self) -> bool {
        use SessionState::*;
        matches!(
            (self, target),
            (Idle, Submitting)
                | (Submitting, Streaming)
                | (Submitting, Failed)
                | (Streaming, Completed)
                | (Streaming, Failed)
                | (Completed, Idle)
                | (Failed, Idle)
        )
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use SessionState::*;
        match self {
            Idle => vec![Submitting],
            Submitting => vec![Streaming, Failed],
            Streaming => vec![Completed, Failed],
            Completed => vec![Idle],
            Failed => vec![Idle],
        }
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SessionState::Idle => "Idle",
            SessionState::Submitting => "Submitting",
            SessionState::Streaming => "Streaming",
            SessionState::Completed => "Completed",
            SessionState::Failed => "Failed",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_idle() {
        assert_eq!(SessionState::default(), SessionState::Idle);
    }

    #[test]
    fn busy_only_while_in_flight() {
        assert!(!SessionState::Idle.is_busy());
        assert!(SessionState::Submitting.is_busy());
        assert!(SessionState::Streaming.is_busy());
        assert!(!SessionState::Completed.is_busy());
        assert!(!SessionState::Failed.is_busy());
    }

    #[test]
    fn happy_path_is_valid() {
        let state = SessionState::Idle
            .transition_to(SessionState::Submitting)
            .and_then(|s| s.transition_to(SessionState::Streaming))
            .and_then(|s| s.transition_to(SessionState::Completed))
            .and_then(|s| s.transition_to(SessionState::Idle))
            .unwrap();
        assert_eq!(state, SessionState::Idle);
    }

    #[test]
    fn submitting_can_fail_before_streaming() {
        assert!(SessionState::Submitting.can_transition_to(&SessionState::Failed));
    }

    #[test]
    fn idle_cannot_skip_to_streaming() {
        assert!(SessionState::Idle
            .transition_to(SessionState::Streaming)
            .is_err());
    }

    #[test]
    fn completed_cannot_fail() {
        assert!(!SessionState::Completed.can_transition_to(&SessionState::Failed));
    }

    #[test]
    fn no_state_is_terminal() {
        for state in [
            SessionState::Idle,
            SessionState::Submitting,
            SessionState::Streaming,
            SessionState::Completed,
            SessionState::Failed,
        ] {
            assert!(!state.is_terminal(), "{} should have an exit", state);
        }
    }

    #[test]
    fn serializes_to_snake_case_json() {
        assert_eq!(
            serde_json::to_string(&SessionState::Streaming).unwrap(),
            "\"streaming\""
        );
    }
}
