//! Saga step records.
//!
//! A step stores *which* compensation to run as data (a [`CompensationKind`]
//! plus the transaction ID) instead of a captured closure, so instances stay
//! cloneable and serializable. The orchestrator dispatches on the tag.

use common::TransactionId;
use serde::{Deserialize, Serialize};

/// The operations the enrollment saga performs, in pipeline order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepKind {
    ReserveStudent,
    ReserveCourse,
    ProcessPayment,
    ConfirmStudent,
    ConfirmEnrollment,
}

impl StepKind {
    /// Returns the compensation bound to this step once it completes.
    ///
    /// Confirm steps have none.
    pub fn compensation(&self) -> Option<CompensationKind> {
        match self {
            StepKind::ReserveStudent => Some(CompensationKind::CancelStudentReservation),
            StepKind::ReserveCourse => Some(CompensationKind::CancelSeatReservation),
            StepKind::ProcessPayment => Some(CompensationKind::RefundPayment),
            StepKind::ConfirmStudent | StepKind::ConfirmEnrollment => None,
        }
    }

    /// Returns the step name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            StepKind::ReserveStudent => "reserve_student",
            StepKind::ReserveCourse => "reserve_course",
            StepKind::ProcessPayment => "process_payment",
            StepKind::ConfirmStudent => "confirm_student",
            StepKind::ConfirmEnrollment => "confirm_enrollment",
        }
    }
}

impl std::fmt::Display for StepKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Which collaborator operation undoes a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompensationKind {
    CancelStudentReservation,
    CancelSeatReservation,
    RefundPayment,
}

impl CompensationKind {
    /// Returns the compensation name as a string.
    pub fn as_str(&self) -> &'static str {
        match self {
            CompensationKind::CancelStudentReservation => "cancel_student_reservation",
            CompensationKind::CancelSeatReservation => "cancel_seat_reservation",
            CompensationKind::RefundPayment => "refund_payment",
        }
    }
}

impl std::fmt::Display for CompensationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A deferred compensation, bound to the transaction it undoes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompensationAction {
    pub kind: CompensationKind,
    pub transaction_id: TransactionId,
}

/// Runtime status of a single step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    #[default]
    Pending,
    Completed,
    Failed,
    Compensated,
}

/// One unit of work inside a saga instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaStep {
    name: StepKind,
    status: StepStatus,
    /// Bound when the forward action succeeds.
    compensation: Option<CompensationAction>,
    /// Identifier returned by the collaborator (student ID, course ID, receipt).
    output: Option<String>,
    /// Forward failure message.
    error: Option<String>,
    /// Set when the compensating action itself failed.
    compensation_error: Option<String>,
}

impl SagaStep {
    /// Creates a pending step.
    pub fn pending(name: StepKind) -> Self {
        Self {
            name,
            status: StepStatus::Pending,
            compensation: None,
            output: None,
            error: None,
            compensation_error: None,
        }
    }

    pub(crate) fn complete(&mut self, transaction_id: &TransactionId, output: Option<String>) {
        self.status = StepStatus::Completed;
        self.output = output;
        self.bind_compensation(transaction_id);
    }

    pub(crate) fn fail(&mut self, error: String) {
        self.status = StepStatus::Failed;
        self.error = Some(error);
    }

    /// Fails a step whose outcome is unknown. The collaborator may still
    /// have applied it, so the compensation stays bound.
    pub(crate) fn time_out(&mut self, transaction_id: &TransactionId, error: String) {
        self.fail(error);
        self.bind_compensation(transaction_id);
    }

    fn bind_compensation(&mut self, transaction_id: &TransactionId) {
        self.compensation = self.name.compensation().map(|kind| CompensationAction {
            kind,
            transaction_id: transaction_id.clone(),
        });
    }

    pub(crate) fn mark_compensated(&mut self) {
        self.status = StepStatus::Compensated;
        self.compensation_error = None;
    }

    pub(crate) fn record_compensation_failure(&mut self, error: String) {
        self.compensation_error = Some(error);
    }

    /// Returns the compensation eligible to run now.
    ///
    /// Completed steps and timed-out failures have one; pending, rejected
    /// and already compensated steps return `None`.
    pub fn pending_compensation(&self) -> Option<&CompensationAction> {
        match self.status {
            StepStatus::Completed | StepStatus::Failed => self.compensation.as_ref(),
            StepStatus::Pending | StepStatus::Compensated => None,
        }
    }

    pub fn name(&self) -> StepKind {
        self.name
    }

    pub fn status(&self) -> StepStatus {
        self.status
    }

    /// Returns the bound compensation regardless of status.
    pub fn compensation(&self) -> Option<&CompensationAction> {
        self.compensation.as_ref()
    }

    pub fn output(&self) -> Option<&str> {
        self.output.as_deref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn compensation_error(&self) -> Option<&str> {
        self.compensation_error.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pending_step_has_no_compensation() {
        let step = SagaStep::pending(StepKind::ReserveStudent);
        assert_eq!(step.status(), StepStatus::Pending);
        assert!(step.pending_compensation().is_none());
    }

    #[test]
    fn test_completed_step_binds_compensation_to_transaction() {
        let tx = TransactionId::new("ENR-001");
        let mut step = SagaStep::pending(StepKind::ProcessPayment);
        step.complete(&tx, Some("TXN-ENR-001".to_string()));

        let action = step.pending_compensation().unwrap();
        assert_eq!(action.kind, CompensationKind::RefundPayment);
        assert_eq!(action.transaction_id, tx);
        assert_eq!(step.output(), Some("TXN-ENR-001"));
    }

    #[test]
    fn test_confirm_step_is_not_compensatable() {
        let mut step = SagaStep::pending(StepKind::ConfirmStudent);
        step.complete(&TransactionId::new("ENR-001"), None);
        assert_eq!(step.status(), StepStatus::Completed);
        assert!(step.pending_compensation().is_none());
    }

    #[test]
    fn test_failed_step_is_not_compensatable() {
        let mut step = SagaStep::pending(StepKind::ReserveCourse);
        step.fail("Course is full".to_string());
        assert_eq!(step.status(), StepStatus::Failed);
        assert_eq!(step.error(), Some("Course is full"));
        assert!(step.pending_compensation().is_none());
    }

    #[test]
    fn test_timed_out_step_keeps_compensation() {
        let tx = TransactionId::new("ENR-001");
        let mut step = SagaStep::pending(StepKind::ProcessPayment);
        step.time_out(&tx, "process_payment timed out after 50ms".to_string());
        assert_eq!(step.status(), StepStatus::Failed);
        assert_eq!(
            step.pending_compensation().map(|a| a.kind),
            Some(CompensationKind::RefundPayment)
        );

        step.mark_compensated();
        assert!(step.pending_compensation().is_none());
    }

    #[test]
    fn test_compensated_step_is_not_eligible_again() {
        let mut step = SagaStep::pending(StepKind::ReserveCourse);
        step.complete(&TransactionId::new("ENR-001"), None);
        step.mark_compensated();
        assert_eq!(step.status(), StepStatus::Compensated);
        assert!(step.pending_compensation().is_none());
        assert!(step.compensation().is_some());
    }

    #[test]
    fn test_failed_compensation_keeps_step_completed() {
        let mut step = SagaStep::pending(StepKind::ReserveStudent);
        step.complete(&TransactionId::new("ENR-001"), None);
        step.record_compensation_failure("student service unavailable".to_string());
        assert_eq!(step.status(), StepStatus::Completed);
        assert_eq!(
            step.compensation_error(),
            Some("student service unavailable")
        );
    }

    #[test]
    fn test_step_serialization() {
        let mut step = SagaStep::pending(StepKind::ReserveStudent);
        step.complete(&TransactionId::new("ENR-001"), Some("STU-001".to_string()));
        let json = serde_json::to_value(&step).unwrap();
        assert_eq!(json["name"], "reserve_student");
        assert_eq!(json["status"], "completed");
        assert_eq!(json["compensation"]["kind"], "cancel_student_reservation");
        assert_eq!(json["compensation"]["transaction_id"], "ENR-001");
    }
}
