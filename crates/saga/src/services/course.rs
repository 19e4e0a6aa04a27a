//! Course seat service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::TransactionId;
use domain::{Course, CourseId, StudentId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::ServiceError;

/// Result of a successful seat reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeatReservation {
    pub course_id: CourseId,
    pub student_id: StudentId,
}

/// Trait for course seat operations.
#[async_trait]
pub trait CourseService: Send + Sync {
    /// Holds one seat in the course for the transaction.
    async fn reserve_seat(
        &self,
        transaction_id: &TransactionId,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<SeatReservation, ServiceError>;

    /// Confirms the held seat as an enrollment.
    async fn confirm_enrollment(&self, transaction_id: &TransactionId)
    -> Result<(), ServiceError>;

    /// Releases the held seat. Idempotent.
    async fn cancel_seat_reservation(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Clone)]
struct SeatHold {
    reservation: SeatReservation,
    confirmed: bool,
}

#[derive(Debug, Default)]
struct InMemoryCourseState {
    courses: HashMap<CourseId, Course>,
    holds: HashMap<TransactionId, SeatHold>,
    fail_on_confirm: bool,
    fail_on_cancel: bool,
}

/// In-memory course service.
///
/// The capacity check and seat increment happen under one write lock, so
/// concurrent sagas can never overbook a course.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCourseService {
    state: Arc<RwLock<InMemoryCourseState>>,
}

impl InMemoryCourseService {
    /// Creates a course service with an empty catalog.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a course service seeded with `courses`.
    pub fn with_courses(courses: impl IntoIterator<Item = Course>) -> Self {
        let state = InMemoryCourseState {
            courses: courses
                .into_iter()
                .map(|course| (course.id.clone(), course))
                .collect(),
            ..Default::default()
        };
        Self {
            state: Arc::new(RwLock::new(state)),
        }
    }

    /// Adds or replaces a course in the catalog.
    pub async fn add_course(&self, course: Course) {
        self.state
            .write()
            .await
            .courses
            .insert(course.id.clone(), course);
    }

    /// Overrides the enrolled count of a course. Returns false if unknown.
    pub async fn set_enrolled(&self, course_id: &CourseId, enrolled: u32) -> bool {
        match self.state.write().await.courses.get_mut(course_id) {
            Some(course) => {
                course.enrolled = enrolled;
                true
            }
            None => false,
        }
    }

    /// Configures the service to fail confirm calls.
    pub async fn set_fail_on_confirm(&self, fail: bool) {
        self.state.write().await.fail_on_confirm = fail;
    }

    /// Configures the service to fail cancel calls.
    pub async fn set_fail_on_cancel(&self, fail: bool) {
        self.state.write().await.fail_on_cancel = fail;
    }

    /// Returns a copy of the course, if it exists.
    pub async fn course(&self, course_id: &CourseId) -> Option<Course> {
        self.state.read().await.courses.get(course_id).cloned()
    }

    /// Returns the number of seat holds, confirmed or not.
    pub async fn reservation_count(&self) -> usize {
        self.state.read().await.holds.len()
    }

    /// Returns the transactions holding seats, sorted.
    pub async fn reservation_ids(&self) -> Vec<TransactionId> {
        let mut ids: Vec<TransactionId> = self.state.read().await.holds.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns true if the transaction holds a confirmed seat.
    pub async fn is_confirmed(&self, transaction_id: &TransactionId) -> bool {
        self.state
            .read()
            .await
            .holds
            .get(transaction_id)
            .is_some_and(|hold| hold.confirmed)
    }
}

#[async_trait]
impl CourseService for InMemoryCourseService {
    async fn reserve_seat(
        &self,
        transaction_id: &TransactionId,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<SeatReservation, ServiceError> {
        tracing::debug!(%transaction_id, %course_id, "reserving course seat");
        let mut state = self.state.write().await;

        if let Some(hold) = state.holds.get(transaction_id) {
            let reservation = &hold.reservation;
            if &reservation.course_id != course_id || &reservation.student_id != student_id {
                return Err(ServiceError::TransactionConflict {
                    transaction_id: transaction_id.clone(),
                });
            }
            return Ok(reservation.clone());
        }

        let course = state
            .courses
            .get_mut(course_id)
            .ok_or_else(|| ServiceError::CourseNotFound {
                course_id: course_id.clone(),
            })?;
        if !course.has_capacity() {
            return Err(ServiceError::CourseFull {
                course_id: course_id.clone(),
            });
        }
        course.enrolled += 1;

        let reservation = SeatReservation {
            course_id: course_id.clone(),
            student_id: student_id.clone(),
        };
        state.holds.insert(
            transaction_id.clone(),
            SeatHold {
                reservation: reservation.clone(),
                confirmed: false,
            },
        );
        Ok(reservation)
    }

    async fn confirm_enrollment(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<(), ServiceError> {
        tracing::debug!(%transaction_id, "confirming enrollment");
        let mut state = self.state.write().await;

        if state.fail_on_confirm {
            return Err(ServiceError::Unavailable {
                service: "course",
                reason: "confirmation rejected".to_string(),
            });
        }

        let hold = state.holds.get_mut(transaction_id).ok_or_else(|| {
            ServiceError::ReservationNotFound {
                transaction_id: transaction_id.clone(),
            }
        })?;
        hold.confirmed = true;
        Ok(())
    }

    async fn cancel_seat_reservation(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<(), ServiceError> {
        tracing::debug!(%transaction_id, "cancelling course seat");
        let mut state = self.state.write().await;

        if state.fail_on_cancel {
            return Err(ServiceError::Unavailable {
                service: "course",
                reason: "cancellation rejected".to_string(),
            });
        }

        if let Some(hold) = state.holds.remove(transaction_id)
            && let Some(course) = state.courses.get_mut(&hold.reservation.course_id)
        {
            course.enrolled = course.enrolled.saturating_sub(1);
        }
        Ok(())
    }
}
