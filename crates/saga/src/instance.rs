//! Saga instance: the ordered step log of one enrollment transaction.

use chrono::{DateTime, Utc};
use common::TransactionId;
use serde::{Deserialize, Serialize};

use crate::enrollment;
use crate::error::{Result, SagaError};
use crate::state::SagaStatus;
use crate::step::{CompensationAction, SagaStep, StepKind, StepStatus};

/// A compensation scheduled for one completed step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompensationTask {
    /// Position of the step in [`SagaInstance::steps`].
    pub index: usize,
    pub step: StepKind,
    pub action: CompensationAction,
}

/// Tracks one saga execution.
///
/// Steps are append-only and in execution order. Since steps run strictly
/// sequentially, the only step that can be pending is the last one.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SagaInstance {
    transaction_id: TransactionId,
    saga_type: String,
    status: SagaStatus,
    steps: Vec<SagaStep>,
    /// Reason for failure, if any.
    error: Option<String>,
    started_at: DateTime<Utc>,
    finished_at: Option<DateTime<Utc>>,
}

impl SagaInstance {
    /// Creates an in-progress enrollment saga with no steps.
    pub fn new(transaction_id: TransactionId) -> Self {
        Self {
            transaction_id,
            saga_type: enrollment::SAGA_TYPE.to_string(),
            status: SagaStatus::InProgress,
            steps: Vec::new(),
            error: None,
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Appends a pending step.
    pub fn begin_step(&mut self, step: StepKind) -> Result<()> {
        self.ensure_in_progress(SagaStatus::InProgress)?;
        if self.current_pending().is_some() {
            return Err(SagaError::InvalidTransition {
                from: self.status,
                to: SagaStatus::InProgress,
            });
        }
        self.steps.push(SagaStep::pending(step));
        Ok(())
    }

    /// Marks the pending step completed and binds its compensation.
    pub fn complete_current(&mut self, output: Option<String>) -> Result<()> {
        self.ensure_in_progress(SagaStatus::InProgress)?;
        let transaction_id = self.transaction_id.clone();
        let step = self.current_pending().ok_or(SagaError::NoPendingStep)?;
        step.complete(&transaction_id, output);
        Ok(())
    }

    /// Marks the pending step failed.
    pub fn fail_current(&mut self, error: impl Into<String>) -> Result<()> {
        self.ensure_in_progress(SagaStatus::InProgress)?;
        let step = self.current_pending().ok_or(SagaError::NoPendingStep)?;
        step.fail(error.into());
        Ok(())
    }

    /// Marks the pending step failed on timeout, keeping its compensation.
    pub fn time_out_current(&mut self, error: impl Into<String>) -> Result<()> {
        self.ensure_in_progress(SagaStatus::InProgress)?;
        let transaction_id = self.transaction_id.clone();
        let step = self.current_pending().ok_or(SagaError::NoPendingStep)?;
        step.time_out(&transaction_id, error.into());
        Ok(())
    }

    /// Returns the compensations to run, in strict reverse order of completion.
    pub fn compensation_plan(&self) -> Vec<CompensationTask> {
        self.steps
            .iter()
            .enumerate()
            .rev()
            .filter_map(|(index, step)| {
                step.pending_compensation().map(|action| CompensationTask {
                    index,
                    step: step.name(),
                    action: action.clone(),
                })
            })
            .collect()
    }

    /// Records the outcome of a compensating action.
    pub fn record_compensation(
        &mut self,
        index: usize,
        outcome: std::result::Result<(), String>,
    ) -> Result<()> {
        self.ensure_in_progress(SagaStatus::InProgress)?;
        let step = self
            .steps
            .get_mut(index)
            .filter(|step| step.pending_compensation().is_some())
            .ok_or(SagaError::NoPendingStep)?;
        match outcome {
            Ok(()) => step.mark_compensated(),
            Err(error) => step.record_compensation_failure(error),
        }
        Ok(())
    }

    /// Moves the saga to `completed`.
    pub fn complete(&mut self) -> Result<()> {
        self.ensure_in_progress(SagaStatus::Completed)?;
        self.status = SagaStatus::Completed;
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    /// Moves the saga to `compensated`, recording the original failure.
    pub fn mark_compensated(&mut self, error: impl Into<String>) -> Result<()> {
        self.ensure_in_progress(SagaStatus::Compensated)?;
        self.status = SagaStatus::Compensated;
        self.error = Some(error.into());
        self.finished_at = Some(Utc::now());
        Ok(())
    }

    fn ensure_in_progress(&self, to: SagaStatus) -> Result<()> {
        if self.status.can_transition_to(to) {
            Ok(())
        } else {
            Err(SagaError::InvalidTransition {
                from: self.status,
                to,
            })
        }
    }

    fn current_pending(&mut self) -> Option<&mut SagaStep> {
        self.steps
            .last_mut()
            .filter(|step| step.status() == StepStatus::Pending)
    }
}

// Query methods
impl SagaInstance {
    pub fn transaction_id(&self) -> &TransactionId {
        &self.transaction_id
    }

    pub fn saga_type(&self) -> &str {
        &self.saga_type
    }

    pub fn status(&self) -> SagaStatus {
        self.status
    }

    /// Returns every recorded step, in execution order.
    pub fn steps(&self) -> &[SagaStep] {
        &self.steps
    }

    /// Returns the names of steps currently in `status`.
    pub fn steps_with_status(&self, status: StepStatus) -> Vec<StepKind> {
        self.steps
            .iter()
            .filter(|step| step.status() == status)
            .map(SagaStep::name)
            .collect()
    }

    /// Returns the failure reason, if any.
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Returns when the saga reached a terminal status.
    pub fn finished_at(&self) -> Option<DateTime<Utc>> {
        self.finished_at
    }
}
