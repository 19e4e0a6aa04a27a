//! Student service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use common::TransactionId;
use domain::{StudentId, StudentProfile};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::ServiceError;

/// Result of a successful student reservation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudentReservation {
    pub student_id: StudentId,
}

/// Trait for student record operations.
///
/// Student creation is two-phase: a reservation stages the profile, and
/// confirmation makes it a permanent record.
#[async_trait]
pub trait StudentService: Send + Sync {
    /// Stages a student profile under the transaction.
    async fn reserve_student(
        &self,
        transaction_id: &TransactionId,
        profile: &StudentProfile,
    ) -> Result<StudentReservation, ServiceError>;

    /// Turns the staged profile into a permanent student record.
    async fn confirm_student(&self, transaction_id: &TransactionId) -> Result<(), ServiceError>;

    /// Drops the staged profile. Idempotent.
    async fn cancel_student_reservation(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryStudentState {
    students: HashMap<StudentId, StudentProfile>,
    reservations: HashMap<TransactionId, StudentProfile>,
    fail_on_confirm: bool,
    fail_on_cancel: bool,
}

/// In-memory student service.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStudentService {
    state: Arc<RwLock<InMemoryStudentState>>,
}

impl InMemoryStudentService {
    /// Creates a new in-memory student service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail confirm calls.
    pub async fn set_fail_on_confirm(&self, fail: bool) {
        self.state.write().await.fail_on_confirm = fail;
    }

    /// Configures the service to fail cancel calls.
    pub async fn set_fail_on_cancel(&self, fail: bool) {
        self.state.write().await.fail_on_cancel = fail;
    }

    /// Returns the number of permanent student records.
    pub async fn student_count(&self) -> usize {
        self.state.read().await.students.len()
    }

    /// Returns the permanent record for `student_id`, if any.
    pub async fn student(&self, student_id: &StudentId) -> Option<StudentProfile> {
        self.state.read().await.students.get(student_id).cloned()
    }

    /// Returns the IDs of all permanent student records, sorted.
    pub async fn student_ids(&self) -> Vec<StudentId> {
        let mut ids: Vec<StudentId> = self.state.read().await.students.keys().cloned().collect();
        ids.sort();
        ids
    }

    /// Returns the number of staged reservations.
    pub async fn reservation_count(&self) -> usize {
        self.state.read().await.reservations.len()
    }

    /// Returns true if a reservation is staged under the transaction.
    pub async fn has_reservation(&self, transaction_id: &TransactionId) -> bool {
        self.state
            .read()
            .await
            .reservations
            .contains_key(transaction_id)
    }
}

#[async_trait]
impl StudentService for InMemoryStudentService {
    async fn reserve_student(
        &self,
        transaction_id: &TransactionId,
        profile: &StudentProfile,
    ) -> Result<StudentReservation, ServiceError> {
        tracing::debug!(%transaction_id, student_id = %profile.student_id, "reserving student");
        let mut state = self.state.write().await;

        if let Some(existing) = state.reservations.get(transaction_id) {
            if existing.student_id != profile.student_id {
                return Err(ServiceError::TransactionConflict {
                    transaction_id: transaction_id.clone(),
                });
            }
            return Ok(StudentReservation {
                student_id: existing.student_id.clone(),
            });
        }

        let held_elsewhere = state
            .reservations
            .values()
            .any(|staged| staged.student_id == profile.student_id);
        if held_elsewhere || state.students.contains_key(&profile.student_id) {
            return Err(ServiceError::StudentAlreadyExists {
                student_id: profile.student_id.clone(),
            });
        }

        state
            .reservations
            .insert(transaction_id.clone(), profile.clone());

        Ok(StudentReservation {
            student_id: profile.student_id.clone(),
        })
    }

    async fn confirm_student(&self, transaction_id: &TransactionId) -> Result<(), ServiceError> {
        tracing::debug!(%transaction_id, "confirming student");
        let mut state = self.state.write().await;

        if state.fail_on_confirm {
            return Err(ServiceError::Unavailable {
                service: "student",
                reason: "confirmation rejected".to_string(),
            });
        }

        let profile = state.reservations.remove(transaction_id).ok_or_else(|| {
            ServiceError::ReservationNotFound {
                transaction_id: transaction_id.clone(),
            }
        })?;
        state.students.insert(profile.student_id.clone(), profile);
        Ok(())
    }

    async fn cancel_student_reservation(
        &self,
        transaction_id: &TransactionId,
    ) -> Result<(), ServiceError> {
        tracing::debug!(%transaction_id, "cancelling student reservation");
        let mut state = self.state.write().await;

        if state.fail_on_cancel {
            return Err(ServiceError::Unavailable {
                service: "student",
                reason: "cancellation rejected".to_string(),
            });
        }

        state.reservations.remove(transaction_id);
        Ok(())
    }
}
