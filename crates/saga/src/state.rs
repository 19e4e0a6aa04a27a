//! Saga status state machine.

use serde::{Deserialize, Serialize};

/// The overall status of a saga instance.
///
/// State transitions:
/// ```text
/// InProgress ──┬──► Completed
///              └──► Compensated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum SagaStatus {
    /// Steps or compensations are still running.
    #[default]
    InProgress,

    /// Every step and confirmation succeeded (terminal state).
    Completed,

    /// A step failed and completed steps were rolled back (terminal state).
    Compensated,
}

impl SagaStatus {
    /// Returns true if this is a terminal state.
    pub fn is_terminal(&self) -> bool {
        matches!(self, SagaStatus::Completed | SagaStatus::Compensated)
    }

    /// Returns true if a saga in this status may move to `next`.
    ///
    /// Only an in-progress saga may change; terminal states are final.
    pub fn can_transition_to(&self, _next: SagaStatus) -> bool {
        matches!(self, SagaStatus::InProgress)
    }

    /// Returns the status name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            SagaStatus::InProgress => "in_progress",
            SagaStatus::Completed => "completed",
            SagaStatus::Compensated => "compensated",
        }
    }
}

impl std::fmt::Display for SagaStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_status_is_in_progress() {
        assert_eq!(SagaStatus::default(), SagaStatus::InProgress);
    }

    #[test]
    fn test_terminal_states() {
        assert!(!SagaStatus::InProgress.is_terminal());
        assert!(SagaStatus::Completed.is_terminal());
        assert!(SagaStatus::Compensated.is_terminal());
    }

    #[test]
    fn test_transitions_are_monotonic() {
        assert!(SagaStatus::InProgress.can_transition_to(SagaStatus::InProgress));
        assert!(SagaStatus::InProgress.can_transition_to(SagaStatus::Completed));
        assert!(SagaStatus::InProgress.can_transition_to(SagaStatus::Compensated));

        for terminal in [SagaStatus::Completed, SagaStatus::Compensated] {
            assert!(!terminal.can_transition_to(SagaStatus::InProgress));
            assert!(!terminal.can_transition_to(SagaStatus::Completed));
            assert!(!terminal.can_transition_to(SagaStatus::Compensated));
        }
    }

    #[test]
    fn test_display() {
        assert_eq!(SagaStatus::InProgress.to_string(), "in_progress");
        assert_eq!(SagaStatus::Completed.to_string(), "completed");
        assert_eq!(SagaStatus::Compensated.to_string(), "compensated");
    }

    #[test]
    fn test_serialization_uses_snake_case() {
        let json = serde_json::to_string(&SagaStatus::InProgress).unwrap();
        assert_eq!(json, "\"in_progress\"");
        let deserialized: SagaStatus = serde_json::from_str(&json).unwrap();
        assert_eq!(deserialized, SagaStatus::InProgress);
    }
}
