//! Notification service trait and in-memory implementation.

use std::sync::Arc;

use async_trait::async_trait;
use domain::{CourseId, StudentId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::ServiceError;

/// A message delivered to a student.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Notification {
    EnrollmentConfirmed {
        student_id: StudentId,
        course_id: CourseId,
    },
    EnrollmentFailed {
        student_id: StudentId,
        reason: String,
    },
}

/// Trait for student notifications. Delivery is best-effort.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send_enrollment_confirmation(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<(), ServiceError>;

    async fn send_enrollment_failure(
        &self,
        student_id: &StudentId,
        reason: &str,
    ) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryNotificationState {
    sent: Vec<Notification>,
    fail_on_send: bool,
}

/// In-memory notification outbox.
#[derive(Debug, Clone, Default)]
pub struct InMemoryNotificationService {
    state: Arc<RwLock<InMemoryNotificationState>>,
}

impl InMemoryNotificationService {
    /// Creates a new in-memory notification service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail every send.
    pub async fn set_fail_on_send(&self, fail: bool) {
        self.state.write().await.fail_on_send = fail;
    }

    /// Returns every notification delivered so far, in order.
    pub async fn sent(&self) -> Vec<Notification> {
        self.state.read().await.sent.clone()
    }

    async fn deliver(&self, notification: Notification) -> Result<(), ServiceError> {
        let mut state = self.state.write().await;
        if state.fail_on_send {
            return Err(ServiceError::Unavailable {
                service: "notification",
                reason: "mail relay down".to_string(),
            });
        }
        state.sent.push(notification);
        Ok(())
    }
}

#[async_trait]
impl NotificationService for InMemoryNotificationService {
    async fn send_enrollment_confirmation(
        &self,
        student_id: &StudentId,
        course_id: &CourseId,
    ) -> Result<(), ServiceError> {
        tracing::info!(%student_id, %course_id, "sending enrollment confirmation");
        self.deliver(Notification::EnrollmentConfirmed {
            student_id: student_id.clone(),
            course_id: course_id.clone(),
        })
        .await
    }

    async fn send_enrollment_failure(
        &self,
        student_id: &StudentId,
        reason: &str,
    ) -> Result<(), ServiceError> {
        tracing::info!(%student_id, reason, "sending enrollment failure");
        self.deliver(Notification::EnrollmentFailed {
            student_id: student_id.clone(),
            reason: reason.to_string(),
        })
        .await
    }
}
