//! Ledger store contract.

use chrono::{DateTime, Utc};
use tresora_core::error::TransactionError;
use tresora_core::transaction::{MovementType, Transaction, TransactionState};
use tresora_shared::types::{AccountId, CustomerId, ProductId, TransactionId};

/// Durable keyed storage for transaction records.
///
/// `save` enforces optimistic concurrency: the caller passes a record whose
/// `version` must match what is stored (or zero for a record the store has
/// never seen); the store increments the version by exactly one on success
/// and fails with `ConcurrencyConflict` on a stale version. Ordered queries
/// return most recent first.
#[allow(async_fn_in_trait)]
pub trait LedgerStore: Send + Sync {
    /// Persists a record, enforcing the version check.
    async fn save(&self, tx: Transaction) -> Result<Transaction, TransactionError>;

    /// Point lookup by id, regardless of state.
    async fn find_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<Option<Transaction>, TransactionError>;

    /// Point lookup by id restricted to a lifecycle state.
    async fn find_by_id_and_state(
        &self,
        id: &TransactionId,
        state: TransactionState,
    ) -> Result<Option<Transaction>, TransactionError>;

    /// Counts records for an account whose movement type is in the set.
    async fn count_by_account_and_movement_in(
        &self,
        account_id: &AccountId,
        movements: &[MovementType],
    ) -> Result<u64, TransactionError>;

    /// Existence check: any record for the customer with the movement type,
    /// an event date strictly before `before`, and the given state.
    async fn exists_by_customer_and_movement_and_date_before_and_state(
        &self,
        customer_id: &CustomerId,
        movement: MovementType,
        before: DateTime<Utc>,
        state: TransactionState,
    ) -> Result<bool, TransactionError>;

    /// All records for a product in the given state, most recent first.
    async fn find_by_product_and_state_desc(
        &self,
        product_id: &ProductId,
        state: TransactionState,
    ) -> Result<Vec<Transaction>, TransactionError>;

    /// The most recent `limit` records for a customer in the given state.
    async fn find_top_by_customer_and_state_desc(
        &self,
        customer_id: &CustomerId,
        state: TransactionState,
        limit: usize,
    ) -> Result<Vec<Transaction>, TransactionError>;

    /// The single most recent record for a customer in the given state.
    async fn find_last_by_customer_and_state(
        &self,
        customer_id: &CustomerId,
        state: TransactionState,
    ) -> Result<Option<Transaction>, TransactionError>;

    /// All records for a customer in the given state.
    async fn find_by_customer_and_state(
        &self,
        customer_id: &CustomerId,
        state: TransactionState,
    ) -> Result<Vec<Transaction>, TransactionError>;

    /// All records created within `[start, end]` in the given state.
    async fn find_by_created_between_and_state(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        state: TransactionState,
    ) -> Result<Vec<Transaction>, TransactionError>;

    /// All records in a processing status, for reconciliation sweeps.
    async fn find_by_status(
        &self,
        status: tresora_core::transaction::TransactionStatus,
    ) -> Result<Vec<Transaction>, TransactionError>;
}
