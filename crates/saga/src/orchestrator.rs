//! Saga orchestrator for the student enrollment transaction.

use std::future::Future;
use std::time::Instant;

use chrono::Utc;
use common::TransactionId;
use domain::EnrollmentRequest;

use crate::config::SagaConfig;
use crate::enrollment;
use crate::error::{SagaError, ServiceError};
use crate::instance::{CompensationTask, SagaInstance};
use crate::result::SagaResult;
use crate::services::course::CourseService;
use crate::services::notification::NotificationService;
use crate::services::payment::PaymentService;
use crate::services::student::StudentService;
use crate::step::{CompensationAction, CompensationKind, StepKind};
use crate::store::SagaStore;

/// Orchestrates enrollment sagas.
///
/// Drives reserve student → reserve course → process payment → confirm →
/// notify, strictly one call at a time. On any failure, completed
/// reservations are compensated in reverse order.
pub struct SagaOrchestrator<St, C, P, N>
where
    St: StudentService,
    C: CourseService,
    P: PaymentService,
    N: NotificationService,
{
    students: St,
    courses: C,
    payments: P,
    notifications: N,
    store: SagaStore,
    config: SagaConfig,
}

impl<St, C, P, N> SagaOrchestrator<St, C, P, N>
where
    St: StudentService,
    C: CourseService,
    P: PaymentService,
    N: NotificationService,
{
    /// Creates a new orchestrator with default configuration.
    pub fn new(students: St, courses: C, payments: P, notifications: N) -> Self {
        Self::with_config(
            students,
            courses,
            payments,
            notifications,
            SagaConfig::default(),
        )
    }

    /// Creates a new orchestrator with an explicit configuration.
    pub fn with_config(
        students: St,
        courses: C,
        payments: P,
        notifications: N,
        config: SagaConfig,
    ) -> Self {
        Self {
            students,
            courses,
            payments,
            notifications,
            store: SagaStore::with_retention(config.retention),
            config,
        }
    }

    /// Returns the store holding every saga this orchestrator has run.
    pub fn store(&self) -> &SagaStore {
        &self.store
    }

    pub fn config(&self) -> &SagaConfig {
        &self.config
    }

    /// Runs an enrollment saga to a terminal state.
    ///
    /// Never fails: collaborator errors are turned into a compensated saga
    /// and a failed [`SagaResult`]. A transaction ID that is already in the
    /// store is rejected without calling any collaborator.
    #[tracing::instrument(
        skip(self, request),
        fields(saga_type = enrollment::SAGA_TYPE, transaction_id = %transaction_id)
    )]
    pub async fn run_saga(
        &self,
        transaction_id: TransactionId,
        request: EnrollmentRequest,
    ) -> SagaResult {
        metrics::counter!("saga_executions_total").increment(1);
        let saga_start = Instant::now();

        self.store.purge_expired(Utc::now()).await;

        let mut saga = SagaInstance::new(transaction_id.clone());
        if let Err(e) = self.store.register(saga.clone()).await {
            metrics::counter!("saga_rejected_total").increment(1);
            tracing::warn!(error = %e, "saga rejected");
            return SagaResult::failure(transaction_id, e.to_string());
        }

        let result = match self.execute_steps(&mut saga, &request).await {
            Ok(()) => {
                self.notify_success(&request).await;
                if let Err(e) = saga.complete() {
                    tracing::error!(error = %e, "saga could not be marked completed");
                }
                self.persist(&saga).await;

                metrics::counter!("saga_completed").increment(1);
                tracing::info!("saga completed successfully");
                SagaResult::success(transaction_id)
            }
            Err(err) => {
                let reason = err.reason();
                self.compensate(&mut saga).await;
                self.notify_failure(&request, &reason).await;
                if let Err(e) = saga.mark_compensated(reason.clone()) {
                    tracing::error!(error = %e, "saga could not be marked compensated");
                }
                self.persist(&saga).await;

                metrics::counter!("saga_compensated").increment(1);
                tracing::warn!(%reason, "saga compensated");
                SagaResult::failure(transaction_id, reason)
            }
        };

        metrics::histogram!("saga_duration_seconds").record(saga_start.elapsed().as_secs_f64());
        result
    }

    /// Returns the stored saga, or `None` if the ID is unknown.
    pub async fn get_saga_status(&self, transaction_id: &TransactionId) -> Option<SagaInstance> {
        self.store.get(transaction_id).await
    }

    /// Runs the reservation steps, then the confirm steps.
    async fn execute_steps(
        &self,
        saga: &mut SagaInstance,
        request: &EnrollmentRequest,
    ) -> Result<(), SagaError> {
        for step in enrollment::RESERVATION_STEPS
            .into_iter()
            .chain(enrollment::CONFIRM_STEPS)
        {
            self.run_step(saga, step, request).await?;
        }
        Ok(())
    }

    async fn run_step(
        &self,
        saga: &mut SagaInstance,
        step: StepKind,
        request: &EnrollmentRequest,
    ) -> Result<(), SagaError> {
        tracing::info!(%step, "saga step started");
        saga.begin_step(step)?;
        self.persist(saga).await;

        let transaction_id = saga.transaction_id().clone();
        match self
            .bounded(step.as_str(), self.forward(step, &transaction_id, request))
            .await
        {
            Ok(output) => {
                saga.complete_current(output)?;
                self.persist(saga).await;
                tracing::info!(%step, "saga step completed");
                Ok(())
            }
            Err(source) => {
                metrics::counter!("saga_step_failures_total", "step" => step.as_str())
                    .increment(1);
                tracing::warn!(%step, error = %source, "saga step failed");
                if matches!(source, ServiceError::Timeout { .. }) {
                    saga.time_out_current(source.to_string())?;
                } else {
                    saga.fail_current(source.to_string())?;
                }
                self.persist(saga).await;
                Err(SagaError::StepFailed { step, source })
            }
        }
    }

    /// Dispatches the forward call for `step` to its collaborator.
    async fn forward(
        &self,
        step: StepKind,
        transaction_id: &TransactionId,
        request: &EnrollmentRequest,
    ) -> Result<Option<String>, ServiceError> {
        match step {
            StepKind::ReserveStudent => self
                .students
                .reserve_student(transaction_id, &request.student)
                .await
                .map(|r| Some(r.student_id.to_string())),
            StepKind::ReserveCourse => self
                .courses
                .reserve_seat(transaction_id, request.student_id(), &request.course_id)
                .await
                .map(|r| Some(r.course_id.to_string())),
            StepKind::ProcessPayment => self
                .payments
                .process_payment(transaction_id, request.student_id(), request.amount)
                .await
                .map(|r| Some(r.receipt_id)),
            StepKind::ConfirmStudent => self
                .students
                .confirm_student(transaction_id)
                .await
                .map(|()| None),
            StepKind::ConfirmEnrollment => self
                .courses
                .confirm_enrollment(transaction_id)
                .await
                .map(|()| None),
        }
    }

    /// Runs compensating actions for completed steps, newest first.
    ///
    /// A step that timed out is compensated too, since the collaborator
    /// may have applied it. A failing compensation is recorded and logged; the remaining ones
    /// still run.
    #[tracing::instrument(skip(self, saga), fields(transaction_id = %saga.transaction_id()))]
    async fn compensate(&self, saga: &mut SagaInstance) {
        let plan = saga.compensation_plan();
        tracing::info!(steps = plan.len(), "compensation started");

        for CompensationTask {
            index,
            step,
            action,
        } in plan
        {
            tracing::info!(%step, compensation = %action.kind, "compensating step");
            let outcome = self
                .bounded(action.kind.as_str(), self.dispatch_compensation(&action))
                .await;

            let recorded = match outcome {
                Ok(()) => saga.record_compensation(index, Ok(())),
                Err(source) => {
                    let err = SagaError::CompensationFailed { step, source };
                    metrics::counter!(
                        "saga_compensation_failures_total",
                        "step" => step.as_str()
                    )
                    .increment(1);
                    tracing::warn!(error = %err, "compensation failed, continuing rollback");
                    saga.record_compensation(index, Err(err.reason()))
                }
            };
            if let Err(e) = recorded {
                tracing::error!(%step, error = %e, "compensation outcome not recorded");
            }
            self.persist(saga).await;
        }
    }

    async fn dispatch_compensation(&self, action: &CompensationAction) -> Result<(), ServiceError> {
        let transaction_id = &action.transaction_id;
        match action.kind {
            CompensationKind::CancelStudentReservation => {
                self.students
                    .cancel_student_reservation(transaction_id)
                    .await
            }
            CompensationKind::CancelSeatReservation => {
                self.courses.cancel_seat_reservation(transaction_id).await
            }
            CompensationKind::RefundPayment => self.payments.refund_payment(transaction_id).await,
        }
    }

    async fn notify_success(&self, request: &EnrollmentRequest) {
        let sent = self
            .bounded(
                "send_enrollment_confirmation",
                self.notifications
                    .send_enrollment_confirmation(request.student_id(), &request.course_id),
            )
            .await;
        if let Err(e) = sent {
            metrics::counter!("saga_notification_failures_total").increment(1);
            tracing::warn!(error = %e, "enrollment confirmation not delivered");
        }
    }

    async fn notify_failure(&self, request: &EnrollmentRequest, reason: &str) {
        let sent = self
            .bounded(
                "send_enrollment_failure",
                self.notifications
                    .send_enrollment_failure(request.student_id(), reason),
            )
            .await;
        if let Err(e) = sent {
            metrics::counter!("saga_notification_failures_total").increment(1);
            tracing::warn!(error = %e, "enrollment failure notice not delivered");
        }
    }

    /// Applies the configured per-call timeout, if any.
    async fn bounded<T>(
        &self,
        operation: &'static str,
        call: impl Future<Output = Result<T, ServiceError>>,
    ) -> Result<T, ServiceError> {
        match self.config.step_timeout {
            Some(limit) => tokio::time::timeout(limit, call).await.map_err(|_| {
                ServiceError::Timeout {
                    operation,
                    timeout_ms: u64::try_from(limit.as_millis()).unwrap_or(u64::MAX),
                }
            })?,
            None => call.await,
        }
    }

    /// Writes the current snapshot to the store.
    async fn persist(&self, saga: &SagaInstance) {
        if let Err(e) = self.store.save(saga.clone()).await {
            tracing::error!(error = %e, "failed to persist saga snapshot");
        }
    }
}
