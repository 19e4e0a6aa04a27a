//! Process-wide saga store keyed by transaction ID.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use common::TransactionId;
use tokio::sync::RwLock;

use crate::error::{Result, SagaError};
use crate::instance::SagaInstance;

/// In-memory store of saga instances.
///
/// Cloning yields a handle to the same underlying map. Terminal instances
/// are retained until [`SagaStore::purge_expired`] drops them; with no
/// retention configured they are kept for the life of the store.
#[derive(Debug, Clone, Default)]
pub struct SagaStore {
    sagas: Arc<RwLock<HashMap<TransactionId, SagaInstance>>>,
    retention: Option<Duration>,
}

impl SagaStore {
    /// Creates an empty store that never evicts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty store that evicts terminal sagas after `retention`.
    pub fn with_retention(retention: Option<Duration>) -> Self {
        Self {
            sagas: Arc::default(),
            retention,
        }
    }

    /// Returns the configured retention window.
    pub fn retention(&self) -> Option<Duration> {
        self.retention
    }

    /// Registers a new saga.
    ///
    /// Fails if any saga, live or finished, already uses the transaction ID.
    pub async fn register(&self, saga: SagaInstance) -> Result<()> {
        let mut sagas = self.sagas.write().await;
        if sagas.contains_key(saga.transaction_id()) {
            return Err(SagaError::AlreadyRegistered(saga.transaction_id().clone()));
        }
        sagas.insert(saga.transaction_id().clone(), saga);
        Ok(())
    }

    /// Replaces the stored snapshot of a registered saga.
    ///
    /// A stored terminal instance is never overwritten.
    pub async fn save(&self, saga: SagaInstance) -> Result<()> {
        let mut sagas = self.sagas.write().await;
        let stored = sagas
            .get_mut(saga.transaction_id())
            .ok_or_else(|| SagaError::NotFound(saga.transaction_id().clone()))?;
        if !stored.status().can_transition_to(saga.status()) {
            return Err(SagaError::InvalidTransition {
                from: stored.status(),
                to: saga.status(),
            });
        }
        *stored = saga;
        Ok(())
    }

    /// Returns a copy of the saga stored under `transaction_id`.
    pub async fn get(&self, transaction_id: &TransactionId) -> Option<SagaInstance> {
        self.sagas.read().await.get(transaction_id).cloned()
    }

    /// Returns the number of stored sagas.
    pub async fn len(&self) -> usize {
        self.sagas.read().await.len()
    }

    /// Returns true if no sagas are stored.
    pub async fn is_empty(&self) -> bool {
        self.sagas.read().await.is_empty()
    }

    /// Removes all sagas.
    pub async fn clear(&self) {
        self.sagas.write().await.clear();
    }

    /// Drops terminal sagas that finished at least `retention` before `now`.
    ///
    /// In-progress sagas are never evicted. Returns the number removed.
    pub async fn purge_expired(&self, now: DateTime<Utc>) -> usize {
        let Some(retention) = self
            .retention
            .and_then(|r| chrono::Duration::from_std(r).ok())
        else {
            return 0;
        };

        let mut sagas = self.sagas.write().await;
        let before = sagas.len();
        sagas.retain(|_, saga| {
            match saga.finished_at() {
                Some(finished_at) if saga.status().is_terminal() => finished_at
                    .checked_add_signed(retention)
                    .is_none_or(|expires_at| expires_at > now),
                _ => true,
            }
        });
        let purged = before - sagas.len();
        if purged > 0 {
            tracing::debug!(purged, "purged expired sagas");
        }
        purged
    }
}
