//! Request/response shapes for collaborators deployed behind RPC or HTTP.
//!
//! Compensate requests may be delivered more than once; collaborators must
//! treat them idempotently.

use common::TransactionId;
use serde::{Deserialize, Serialize};

use crate::error::{ErrorKind, ServiceError};

/// Forward (reserve/act) request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardRequest<P> {
    pub transaction_id: TransactionId,
    pub payload: P,
}

/// Forward response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ForwardResponse<D> {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<D>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<ErrorKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl<D> From<Result<D, ServiceError>> for ForwardResponse<D> {
    fn from(result: Result<D, ServiceError>) -> Self {
        match result {
            Ok(data) => Self {
                ok: true,
                data: Some(data),
                error_kind: None,
                error_message: None,
            },
            Err(err) => Self {
                ok: false,
                data: None,
                error_kind: Some(err.kind()),
                error_message: Some(err.to_string()),
            },
        }
    }
}

/// Compensating request; only the transaction is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensateRequest {
    pub transaction_id: TransactionId,
}

/// Compensating response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompensateResponse {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl From<Result<(), ServiceError>> for CompensateResponse {
    fn from(result: Result<(), ServiceError>) -> Self {
        Self {
            ok: result.is_ok(),
            error_message: result.err().map(|err| err.to_string()),
        }
    }
}

/// Confirm request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConfirmRequest {
    pub transaction_id: TransactionId,
}

/// Confirm response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConfirmResponse {
    pub ok: bool,
}

impl From<Result<(), ServiceError>> for ConfirmResponse {
    fn from(result: Result<(), ServiceError>) -> Self {
        Self { ok: result.is_ok() }
    }
}
