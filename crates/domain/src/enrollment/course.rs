//! Course catalog entry.

use serde::{Deserialize, Serialize};

use super::value_objects::CourseId;

/// A course with a fixed seat capacity.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Course {
    pub id: CourseId,
    pub name: String,
    pub capacity: u32,
    /// Seats currently held, including unconfirmed reservations.
    pub enrolled: u32,
}

impl Course {
    /// Creates an empty course.
    pub fn new(id: impl Into<CourseId>, name: impl Into<String>, capacity: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
            enrolled: 0,
        }
    }

    /// Returns true if at least one seat is free.
    pub fn has_capacity(&self) -> bool {
        self.enrolled < self.capacity
    }

    /// Returns the number of free seats.
    pub fn available_seats(&self) -> u32 {
        self.capacity.saturating_sub(self.enrolled)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_course_is_empty() {
        let course = Course::new("CS101", "Intro to Programming", 30);
        assert_eq!(course.enrolled, 0);
        assert_eq!(course.available_seats(), 30);
        assert!(course.has_capacity());
    }

    #[test]
    fn test_full_course_has_no_capacity() {
        let mut course = Course::new("MATH201", "Calculus I", 25);
        course.enrolled = 25;
        assert!(!course.has_capacity());
        assert_eq!(course.available_seats(), 0);
    }

    #[test]
    fn test_over_enrolled_course_reports_zero_seats() {
        let mut course = Course::new("MATH201", "Calculus I", 25);
        course.enrolled = 30;
        assert_eq!(course.available_seats(), 0);
    }
}
