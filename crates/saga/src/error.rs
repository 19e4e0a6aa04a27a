//! Saga and collaborator error types.

use common::TransactionId;
use domain::{CourseId, Money, StudentId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::state::SagaStatus;
use crate::step::StepKind;

/// Errors reported by saga collaborators.
///
/// The `Display` text is the user-facing failure reason returned to the
/// caller of a failed saga.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ServiceError {
    /// The student is already enrolled or held by another transaction.
    #[error("Student already exists")]
    StudentAlreadyExists { student_id: StudentId },

    /// The course is not in the catalog.
    #[error("Course not found")]
    CourseNotFound { course_id: CourseId },

    /// Every seat in the course is taken.
    #[error("Course is full")]
    CourseFull { course_id: CourseId },

    /// The payment amount is zero or negative.
    #[error("Invalid payment amount")]
    InvalidAmount { amount: Money },

    /// Confirm was called for a transaction with no staged reservation.
    #[error("No reservation found for transaction {transaction_id}")]
    ReservationNotFound { transaction_id: TransactionId },

    /// The transaction already carries a different request.
    #[error("Transaction {transaction_id} already used for a different request")]
    TransactionConflict { transaction_id: TransactionId },

    /// The collaborator could not serve the request.
    #[error("{service} service unavailable: {reason}")]
    Unavailable {
        service: &'static str,
        reason: String,
    },

    /// The call did not finish within the configured bound.
    #[error("{operation} timed out after {timeout_ms}ms")]
    Timeout {
        operation: &'static str,
        timeout_ms: u64,
    },
}

/// Coarse classification of a [`ServiceError`], as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    AlreadyExists,
    NotFound,
    CapacityExceeded,
    InvalidAmount,
    Unavailable,
    Timeout,
}

impl ServiceError {
    /// Returns the error classification.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ServiceError::StudentAlreadyExists { .. }
            | ServiceError::TransactionConflict { .. } => ErrorKind::AlreadyExists,
            ServiceError::CourseNotFound { .. } | ServiceError::ReservationNotFound { .. } => {
                ErrorKind::NotFound
            }
            ServiceError::CourseFull { .. } => ErrorKind::CapacityExceeded,
            ServiceError::InvalidAmount { .. } => ErrorKind::InvalidAmount,
            ServiceError::Unavailable { .. } => ErrorKind::Unavailable,
            ServiceError::Timeout { .. } => ErrorKind::Timeout,
        }
    }
}

/// Errors that can occur during saga operations.
#[derive(Debug, Error)]
pub enum SagaError {
    /// A saga with this transaction ID is already in the store.
    #[error("Saga already registered for transaction {0}")]
    AlreadyRegistered(TransactionId),

    /// No saga is stored under this transaction ID.
    #[error("Saga not found for transaction {0}")]
    NotFound(TransactionId),

    /// The saga cannot move between these states.
    #[error("Invalid saga transition: {from} -> {to}")]
    InvalidTransition { from: SagaStatus, to: SagaStatus },

    /// A step result was recorded while no step was pending.
    #[error("No saga step is pending")]
    NoPendingStep,

    /// A forward or confirm step failed.
    #[error("Saga step '{step}' failed: {source}")]
    StepFailed {
        step: StepKind,
        #[source]
        source: ServiceError,
    },

    /// A compensating action failed.
    #[error("Compensation step '{step}' failed: {source}")]
    CompensationFailed {
        step: StepKind,
        #[source]
        source: ServiceError,
    },
}

impl SagaError {
    /// Returns the message reported to the saga caller.
    ///
    /// Step failures surface the collaborator's own message rather than the
    /// wrapped form.
    pub fn reason(&self) -> String {
        match self {
            SagaError::StepFailed { source, .. } | SagaError::CompensationFailed { source, .. } => {
                source.to_string()
            }
            other => other.to_string(),
        }
    }
}

/// Convenience type alias for saga results.
pub type Result<T> = std::result::Result<T, SagaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_error_messages() {
        let full = ServiceError::CourseFull {
            course_id: CourseId::new("MATH201"),
        };
        assert_eq!(full.to_string(), "Course is full");
        assert_eq!(full.kind(), ErrorKind::CapacityExceeded);

        let dup = ServiceError::StudentAlreadyExists {
            student_id: StudentId::new("STU-001"),
        };
        assert_eq!(dup.to_string(), "Student already exists");
        assert_eq!(dup.kind(), ErrorKind::AlreadyExists);

        let amount = ServiceError::InvalidAmount {
            amount: Money::zero(),
        };
        assert_eq!(amount.to_string(), "Invalid payment amount");
    }

    #[test]
    fn test_step_failure_reason_is_collaborator_message() {
        let err = SagaError::StepFailed {
            step: StepKind::ReserveCourse,
            source: ServiceError::CourseNotFound {
                course_id: CourseId::new("BIO999"),
            },
        };
        assert_eq!(err.reason(), "Course not found");
        assert_eq!(
            err.to_string(),
            "Saga step 'reserve_course' failed: Course not found"
        );
    }

    #[test]
    fn test_transaction_conflict() {
        let err = ServiceError::TransactionConflict {
            transaction_id: TransactionId::new("ENR-001"),
        };
        assert_eq!(err.kind(), ErrorKind::AlreadyExists);
        assert_eq!(
            err.to_string(),
            "Transaction ENR-001 already used for a different request"
        );
    }

    #[test]
    fn test_error_kind_serializes_as_snake_case() {
        let json = serde_json::to_string(&ErrorKind::CapacityExceeded).unwrap();
        assert_eq!(json, "\"capacity_exceeded\"");
        let parsed: ErrorKind = serde_json::from_str("\"already_exists\"").unwrap();
        assert_eq!(parsed, ErrorKind::AlreadyExists);
    }

    #[test]
    fn test_timeout_kind() {
        let err = ServiceError::Timeout {
            operation: "process_payment",
            timeout_ms: 250,
        };
        assert_eq!(err.kind(), ErrorKind::Timeout);
        assert_eq!(err.to_string(), "process_payment timed out after 250ms");
    }
}
