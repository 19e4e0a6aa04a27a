//! Enrollment saga payload.

use serde::{Deserialize, Serialize};

use super::value_objects::{CourseId, Money, StudentId};

/// Student details staged by the student service until confirmation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentProfile {
    pub student_id: StudentId,
    pub name: String,
    pub email: String,
}

impl StudentProfile {
    /// Creates a new student profile.
    pub fn new(
        student_id: impl Into<StudentId>,
        name: impl Into<String>,
        email: impl Into<String>,
    ) -> Self {
        Self {
            student_id: student_id.into(),
            name: name.into(),
            email: email.into(),
        }
    }
}

/// Everything the enrollment saga needs to enroll one student in one course.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EnrollmentRequest {
    pub student: StudentProfile,
    pub course_id: CourseId,
    pub amount: Money,
}

impl EnrollmentRequest {
    /// Creates a new enrollment request.
    pub fn new(student: StudentProfile, course_id: impl Into<CourseId>, amount: Money) -> Self {
        Self {
            student,
            course_id: course_id.into(),
            amount,
        }
    }

    /// Returns the ID of the student being enrolled.
    pub fn student_id(&self) -> &StudentId {
        &self.student.student_id
    }
}
