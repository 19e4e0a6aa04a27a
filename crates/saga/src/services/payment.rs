//! Payment service trait and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::TransactionId;
use domain::{Money, StudentId};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::ServiceError;

/// Result of a successful payment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentReceipt {
    /// Receipt ID assigned by the payment service (`TXN-<transaction>`).
    pub receipt_id: String,
}

/// Lifecycle of a payment record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PaymentStatus {
    Processed,
    Refunded,
}

/// A payment held in the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentRecord {
    pub student_id: StudentId,
    pub amount: Money,
    pub status: PaymentStatus,
    pub processed_at: DateTime<Utc>,
    pub refunded_at: Option<DateTime<Utc>>,
}

/// Trait for payment processing operations.
#[async_trait]
pub trait PaymentService: Send + Sync {
    /// Charges the student for the transaction.
    async fn process_payment(
        &self,
        transaction_id: &TransactionId,
        student_id: &StudentId,
        amount: Money,
    ) -> Result<PaymentReceipt, ServiceError>;

    /// Refunds the transaction's payment. Idempotent.
    async fn refund_payment(&self, transaction_id: &TransactionId) -> Result<(), ServiceError>;
}

#[derive(Debug, Default)]
struct InMemoryPaymentState {
    payments: HashMap<TransactionId, PaymentRecord>,
    fail_on_refund: bool,
}

/// In-memory payment ledger. Refunds flip the record's status rather than
/// deleting it.
#[derive(Debug, Clone, Default)]
pub struct InMemoryPaymentService {
    state: Arc<RwLock<InMemoryPaymentState>>,
}

impl InMemoryPaymentService {
    /// Creates a new in-memory payment service.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the service to fail refund calls.
    pub async fn set_fail_on_refund(&self, fail: bool) {
        self.state.write().await.fail_on_refund = fail;
    }

    /// Returns the payment recorded for the transaction, if any.
    pub async fn payment(&self, transaction_id: &TransactionId) -> Option<PaymentRecord> {
        self.state.read().await.payments.get(transaction_id).cloned()
    }

    /// Returns the number of payment records, refunded or not.
    pub async fn payment_count(&self) -> usize {
        self.state.read().await.payments.len()
    }

    /// Returns the number of payments currently in `status`.
    pub async fn count_with_status(&self, status: PaymentStatus) -> usize {
        self.state
            .read()
            .await
            .payments
            .values()
            .filter(|record| record.status == status)
            .count()
    }
}

fn receipt_for(transaction_id: &TransactionId) -> PaymentReceipt {
    PaymentReceipt {
        receipt_id: format!("TXN-{transaction_id}"),
    }
}

#[async_trait]
impl PaymentService for InMemoryPaymentService {
    async fn process_payment(
        &self,
        transaction_id: &TransactionId,
        student_id: &StudentId,
        amount: Money,
    ) -> Result<PaymentReceipt, ServiceError> {
        tracing::debug!(%transaction_id, %amount, "processing payment");

        if !amount.is_positive() {
            return Err(ServiceError::InvalidAmount { amount });
        }

        let mut state = self.state.write().await;
        if let Some(record) = state.payments.get(transaction_id) {
            let same_charge = record.status == PaymentStatus::Processed
                && &record.student_id == student_id
                && record.amount == amount;
            if !same_charge {
                return Err(ServiceError::TransactionConflict {
                    transaction_id: transaction_id.clone(),
                });
            }
            return Ok(receipt_for(transaction_id));
        }

        state.payments.insert(
            transaction_id.clone(),
            PaymentRecord {
                student_id: student_id.clone(),
                amount,
                status: PaymentStatus::Processed,
                processed_at: Utc::now(),
                refunded_at: None,
            },
        );
        Ok(receipt_for(transaction_id))
    }

    async fn refund_payment(&self, transaction_id: &TransactionId) -> Result<(), ServiceError> {
        tracing::debug!(%transaction_id, "refunding payment");
        let mut state = self.state.write().await;

        if state.fail_on_refund {
            return Err(ServiceError::Unavailable {
                service: "payment",
                reason: "refund rejected".to_string(),
            });
        }

        if let Some(record) = state.payments.get_mut(transaction_id)
            && record.status == PaymentStatus::Processed
        {
            record.status = PaymentStatus::Refunded;
            record.refunded_at = Some(Utc::now());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_process_and_refund() {
        let service = InMemoryPaymentService::new();
        let tx = TransactionId::new("ENR-001");

        let receipt = service
            .process_payment(&tx, &StudentId::new("STU-001"), Money::from_dollars(500))
            .await
            .unwrap();
        assert_eq!(receipt.receipt_id, "TXN-ENR-001");
        assert_eq!(
            service.payment(&tx).await.unwrap().status,
            PaymentStatus::Processed
        );

        service.refund_payment(&tx).await.unwrap();
        let record = service.payment(&tx).await.unwrap();
        assert_eq!(record.status, PaymentStatus::Refunded);
        assert!(record.refunded_at.is_some());
    }

    #[tokio::test]
    async fn test_invalid_amount() {
        let service = InMemoryPaymentService::new();
        let tx = TransactionId::new("ENR-001");

        for amount in [Money::zero(), Money::from_cents(-100)] {
            let result = service
                .process_payment(&tx, &StudentId::new("STU-001"), amount)
                .await;
            assert!(matches!(result, Err(ServiceError::InvalidAmount { .. })));
        }
        assert_eq!(service.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_refund_is_idempotent() {
        let service = InMemoryPaymentService::new();
        let tx = TransactionId::new("ENR-001");
        service
            .process_payment(&tx, &StudentId::new("STU-001"), Money::from_dollars(500))
            .await
            .unwrap();

        service.refund_payment(&tx).await.unwrap();
        let once = service.payment(&tx).await.unwrap();
        service.refund_payment(&tx).await.unwrap();
        let twice = service.payment(&tx).await.unwrap();

        assert_eq!(once, twice);
        assert_eq!(service.count_with_status(PaymentStatus::Refunded).await, 1);
    }

    #[tokio::test]
    async fn test_refund_unknown_transaction_is_noop() {
        let service = InMemoryPaymentService::new();
        service
            .refund_payment(&TransactionId::new("ENR-404"))
            .await
            .unwrap();
        assert_eq!(service.payment_count().await, 0);
    }

    #[tokio::test]
    async fn test_repeated_payment_is_not_charged_twice() {
        let service = InMemoryPaymentService::new();
        let tx = TransactionId::new("ENR-001");
        let student = StudentId::new("STU-001");

        let r1 = service
            .process_payment(&tx, &student, Money::from_dollars(500))
            .await
            .unwrap();
        let r2 = service
            .process_payment(&tx, &student, Money::from_dollars(500))
            .await
            .unwrap();
        assert_eq!(r1, r2);
        assert_eq!(service.payment_count().await, 1);
    }

    #[tokio::test]
    async fn test_different_charge_under_same_transaction_fails() {
        let service = InMemoryPaymentService::new();
        let tx = TransactionId::new("ENR-001");
        let student = StudentId::new("STU-001");
        service
            .process_payment(&tx, &student, Money::from_dollars(500))
            .await
            .unwrap();

        let other_student = service
            .process_payment(&tx, &StudentId::new("STU-002"), Money::from_dollars(500))
            .await;
        assert!(matches!(
            other_student,
            Err(ServiceError::TransactionConflict { .. })
        ));

        let other_amount = service
            .process_payment(&tx, &student, Money::from_dollars(900))
            .await;
        assert!(matches!(
            other_amount,
            Err(ServiceError::TransactionConflict { .. })
        ));

        let record = service.payment(&tx).await.unwrap();
        assert_eq!(record.student_id, student);
        assert_eq!(record.amount, Money::from_dollars(500));
        assert_eq!(service.payment_count().await, 1);
    }

    #[tokio::test]
    async fn test_refunded_transaction_is_not_charged_again() {
        let service = InMemoryPaymentService::new();
        let tx = TransactionId::new("ENR-001");
        let student = StudentId::new("STU-001");
        service
            .process_payment(&tx, &student, Money::from_dollars(500))
            .await
            .unwrap();
        service.refund_payment(&tx).await.unwrap();

        let result = service
            .process_payment(&tx, &student, Money::from_dollars(500))
            .await;
        assert!(matches!(
            result,
            Err(ServiceError::TransactionConflict { .. })
        ));
        assert_eq!(
            service.payment(&tx).await.unwrap().status,
            PaymentStatus::Refunded
        );
    }
}
