//! Structured outcome returned by every saga run.

use common::TransactionId;
use serde::{Deserialize, Serialize};

/// Outcome of [`crate::SagaOrchestrator::run_saga`].
///
/// On failure, `error` carries the message of the step that triggered the
/// rollback, never a secondary compensation error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SagaResult {
    pub success: bool,
    pub transaction_id: TransactionId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl SagaResult {
    /// Creates a successful result.
    pub fn success(transaction_id: TransactionId) -> Self {
        Self {
            success: true,
            transaction_id,
            error: None,
        }
    }

    /// Creates a failed result.
    pub fn failure(transaction_id: TransactionId, error: impl Into<String>) -> Self {
        Self {
            success: false,
            transaction_id,
            error: Some(error.into()),
        }
    }
}
