//! Enrollment value objects and saga payload.

mod course;
mod request;
mod value_objects;

pub use course::Course;
pub use request::{EnrollmentRequest, StudentProfile};
pub use value_objects::{CourseId, Money, StudentId};
