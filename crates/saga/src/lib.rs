//! Saga pattern implementation for student enrollment.
//!
//! This crate orchestrates a multi-step enrollment transaction across
//! independently-owned services, with compensating actions on failure.
//!
//! The enrollment saga follows these steps:
//! 1. Reserve the student record
//! 2. Reserve a course seat
//! 3. Process payment
//! 4. Confirm the student and the enrollment
//! 5. Notify the student
//!
//! If any step fails, previously completed reservations are compensated in
//! reverse order and the student is notified of the failure.

pub mod config;
pub mod enrollment;
pub mod error;
pub mod instance;
pub mod orchestrator;
pub mod result;
pub mod services;
pub mod state;
pub mod step;
pub mod store;
pub mod wire;

pub use config::SagaConfig;
pub use error::{ErrorKind, SagaError, ServiceError};
pub use instance::{CompensationTask, SagaInstance};
pub use orchestrator::SagaOrchestrator;
pub use result::SagaResult;
pub use services::{
    CourseService, InMemoryCourseService, InMemoryNotificationService, InMemoryPaymentService,
    InMemoryStudentService, Notification, NotificationService, PaymentReceipt, PaymentRecord,
    PaymentService, PaymentStatus, SeatReservation, StudentReservation, StudentService,
};
pub use state::SagaStatus;
pub use step::{CompensationAction, CompensationKind, SagaStep, StepKind, StepStatus};
pub use store::SagaStore;
