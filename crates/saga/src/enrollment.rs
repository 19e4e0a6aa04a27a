//! Enrollment saga constants.

use crate::step::StepKind;

/// The saga type identifier for student enrollment.
pub const SAGA_TYPE: &str = "StudentEnrollment";

/// Reservation steps, in execution order. Each one is compensatable.
pub const RESERVATION_STEPS: [StepKind; 3] = [
    StepKind::ReserveStudent,
    StepKind::ReserveCourse,
    StepKind::ProcessPayment,
];

/// Confirm steps, run only after every reservation succeeded.
pub const CONFIRM_STEPS: [StepKind; 2] = [StepKind::ConfirmStudent, StepKind::ConfirmEnrollment];
