//! In-memory store implementations.
//!
//! Backs tests and database-free runs. The version discipline matches what
//! the contract demands from a real backend: saves succeed only when the
//! incoming record's version equals the stored one (or zero for a record
//! the store has never seen), and the stored version grows by exactly one
//! per successful save.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::sync::RwLock;
use tracing::debug;

use tresora_core::debt::Debt;
use tresora_core::error::TransactionError;
use tresora_core::transaction::{MovementType, Transaction, TransactionState, TransactionStatus};
use tresora_shared::types::{AccountId, CustomerId, DebtId, DebtorId, ProductId, TransactionId};

use crate::debt::DebtStore;
use crate::ledger::LedgerStore;

/// In-memory ledger store with optimistic-concurrency version checks.
#[derive(Debug, Clone, Default)]
pub struct InMemoryLedgerStore {
    records: Arc<RwLock<HashMap<TransactionId, Transaction>>>,
}

impl InMemoryLedgerStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored records, active or not.
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Returns true if the store holds no records.
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn sorted_desc(mut txns: Vec<Transaction>) -> Vec<Transaction> {
        // UUID v7 ids are time-ordered, which breaks created_at ties.
        txns.sort_by(|a, b| {
            b.created_at
                .cmp(&a.created_at)
                .then_with(|| b.id.as_str().cmp(a.id.as_str()))
        });
        txns
    }
}

impl LedgerStore for InMemoryLedgerStore {
    async fn save(&self, tx: Transaction) -> Result<Transaction, TransactionError> {
        let mut records = self.records.write().await;

        if let Some(existing) = records.get(&tx.id)
            && existing.version != tx.version
        {
            return Err(TransactionError::ConcurrencyConflict {
                id: tx.id.clone(),
                expected: tx.version,
                actual: existing.version,
            });
        }

        let mut saved = tx;
        saved.version += 1;
        saved.updated_at = Utc::now();
        debug!(id = %saved.id, version = saved.version, "transaction saved");
        records.insert(saved.id.clone(), saved.clone());
        Ok(saved)
    }

    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, TransactionError> {
        Ok(self.records.read().await.get(id).cloned())
    }

    async fn find_by_id_and_state(
        &self,
        id: &TransactionId,
        state: TransactionState,
    ) -> Result<Option<Transaction>, TransactionError> {
        Ok(self
            .records
            .read()
            .await
            .get(id)
            .filter(|tx| tx.state == state)
            .cloned())
    }

    async fn count_by_account_and_movement_in(
        &self,
        account_id: &AccountId,
        movements: &[MovementType],
    ) -> Result<u64, TransactionError> {
        let records = self.records.read().await;
        let count = records
            .values()
            .filter(|tx| tx.account_id.as_ref() == Some(account_id))
            .filter(|tx| movements.contains(&tx.movement))
            .count();
        Ok(count as u64)
    }

    async fn exists_by_customer_and_movement_and_date_before_and_state(
        &self,
        customer_id: &CustomerId,
        movement: MovementType,
        before: DateTime<Utc>,
        state: TransactionState,
    ) -> Result<bool, TransactionError> {
        let records = self.records.read().await;
        Ok(records.values().any(|tx| {
            tx.customer_id == *customer_id
                && tx.movement == movement
                && tx.event_date < before
                && tx.state == state
        }))
    }

    async fn find_by_product_and_state_desc(
        &self,
        product_id: &ProductId,
        state: TransactionState,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let records = self.records.read().await;
        let matched = records
            .values()
            .filter(|tx| tx.product_id.as_ref() == Some(product_id) && tx.state == state)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(matched))
    }

    async fn find_top_by_customer_and_state_desc(
        &self,
        customer_id: &CustomerId,
        state: TransactionState,
        limit: usize,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let records = self.records.read().await;
        let matched = records
            .values()
            .filter(|tx| tx.customer_id == *customer_id && tx.state == state)
            .cloned()
            .collect();
        let mut sorted = Self::sorted_desc(matched);
        sorted.truncate(limit);
        Ok(sorted)
    }

    async fn find_last_by_customer_and_state(
        &self,
        customer_id: &CustomerId,
        state: TransactionState,
    ) -> Result<Option<Transaction>, TransactionError> {
        let top = self
            .find_top_by_customer_and_state_desc(customer_id, state, 1)
            .await?;
        Ok(top.into_iter().next())
    }

    async fn find_by_customer_and_state(
        &self,
        customer_id: &CustomerId,
        state: TransactionState,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let records = self.records.read().await;
        let matched = records
            .values()
            .filter(|tx| tx.customer_id == *customer_id && tx.state == state)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(matched))
    }

    async fn find_by_created_between_and_state(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        state: TransactionState,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let records = self.records.read().await;
        let matched = records
            .values()
            .filter(|tx| tx.created_at >= start && tx.created_at <= end && tx.state == state)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(matched))
    }

    async fn find_by_status(
        &self,
        status: TransactionStatus,
    ) -> Result<Vec<Transaction>, TransactionError> {
        let records = self.records.read().await;
        let matched = records
            .values()
            .filter(|tx| tx.status == status)
            .cloned()
            .collect();
        Ok(Self::sorted_desc(matched))
    }
}

/// In-memory debt store.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDebtStore {
    records: Arc<RwLock<HashMap<DebtId, Debt>>>,
}

impl InMemoryDebtStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds a debt, for tests.
    pub async fn seed(&self, debt: Debt) {
        self.records.write().await.insert(debt.id.clone(), debt);
    }
}

impl DebtStore for InMemoryDebtStore {
    async fn find_by_debtor(
        &self,
        debtor_id: &DebtorId,
    ) -> Result<Option<Debt>, TransactionError> {
        let records = self.records.read().await;
        Ok(records
            .values()
            .find(|debt| debt.debtor_id == *debtor_id)
            .cloned())
    }

    async fn save(&self, debt: Debt) -> Result<Debt, TransactionError> {
        let mut records = self.records.write().await;
        records.insert(debt.id.clone(), debt.clone());
        Ok(debt)
    }
}
