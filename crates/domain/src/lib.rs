//! Domain layer for the enrollment saga.
//!
//! This crate provides the value objects exchanged between the saga
//! orchestrator and its collaborators:
//! - Student and course identifiers
//! - Money amounts in cents
//! - Course catalog entries with seat capacity
//! - The enrollment request carried through every saga step

pub mod enrollment;

pub use enrollment::{Course, CourseId, EnrollmentRequest, Money, StudentId, StudentProfile};
