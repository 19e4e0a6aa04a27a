//! Collaborator service traits and in-memory implementations for saga steps.

pub mod course;
pub mod notification;
pub mod payment;
pub mod student;

pub use course::{CourseService, InMemoryCourseService, SeatReservation};
pub use notification::{InMemoryNotificationService, Notification, NotificationService};
pub use payment::{
    InMemoryPaymentService, PaymentReceipt, PaymentRecord, PaymentService, PaymentStatus,
};
pub use student::{InMemoryStudentService, StudentReservation, StudentService};
