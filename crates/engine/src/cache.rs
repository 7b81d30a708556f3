//! Read-through cache for point lookups.
//!
//! Three keyspaces with independent TTLs: lookup by id, lookup by id
//! restricted to ACTIVE, and last transaction per customer. TTL expiry
//! bounds staleness for external writers; write paths that go through this
//! process call `evict` so their own reads are fresh immediately.

use std::sync::Arc;
use std::time::Duration;

use moka::future::Cache;
use tracing::debug;

use tresora_core::error::TransactionError;
use tresora_core::transaction::TransactionState;
use tresora_shared::config::CacheConfig;
use tresora_shared::types::{CustomerId, TransactionId};
use tresora_store::ledger::LedgerStore;

use crate::view::TransactionView;

const BY_ID_PREFIX: &str = "transactions";
const ACTIVE_PREFIX: &str = "activeTransactions";
const LAST_PREFIX: &str = "lastTransactions";

/// Read-through cache over a ledger store.
#[derive(Debug, Clone)]
pub struct CachedTransactions<S> {
    store: Arc<S>,
    by_id: Cache<String, TransactionView>,
    active: Cache<String, TransactionView>,
    last: Cache<String, TransactionView>,
}

impl<S: LedgerStore> CachedTransactions<S> {
    /// Builds the cache with per-keyspace TTLs from configuration.
    pub fn new(store: Arc<S>, config: &CacheConfig) -> Self {
        Self {
            store,
            by_id: Cache::builder()
                .time_to_live(Duration::from_secs(config.by_id_ttl_secs))
                .build(),
            active: Cache::builder()
                .time_to_live(Duration::from_secs(config.active_ttl_secs))
                .build(),
            last: Cache::builder()
                .time_to_live(Duration::from_secs(config.last_ttl_secs))
                .build(),
        }
    }

    /// Cached point lookup by id, regardless of state.
    ///
    /// Misses and lookups of absent records both go to the store; only
    /// hits are cached, absence is not.
    pub async fn get(
        &self,
        id: &TransactionId,
    ) -> Result<Option<TransactionView>, TransactionError> {
        let key = format!("{BY_ID_PREFIX}::{id}");
        if let Some(hit) = self.by_id.get(&key).await {
            debug!(key = %key, "cache hit");
            return Ok(Some(hit));
        }

        let found = self.store.find_by_id(id).await?;
        let view = found.as_ref().map(TransactionView::from);
        if let Some(view) = &view {
            self.by_id.insert(key, view.clone()).await;
        }
        Ok(view)
    }

    /// Cached point lookup restricted to ACTIVE records.
    pub async fn get_active(
        &self,
        id: &TransactionId,
    ) -> Result<Option<TransactionView>, TransactionError> {
        let key = format!("{ACTIVE_PREFIX}::{id}");
        if let Some(hit) = self.active.get(&key).await {
            debug!(key = %key, "cache hit");
            return Ok(Some(hit));
        }

        let found = self
            .store
            .find_by_id_and_state(id, TransactionState::Active)
            .await?;
        let view = found.as_ref().map(TransactionView::from);
        if let Some(view) = &view {
            self.active.insert(key, view.clone()).await;
        }
        Ok(view)
    }

    /// Cached most-recent ACTIVE transaction for a customer.
    pub async fn last_for(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<TransactionView>, TransactionError> {
        let key = format!("{LAST_PREFIX}::{customer_id}");
        if let Some(hit) = self.last.get(&key).await {
            debug!(key = %key, "cache hit");
            return Ok(Some(hit));
        }

        let found = self
            .store
            .find_last_by_customer_and_state(customer_id, TransactionState::Active)
            .await?;
        let view = found.as_ref().map(TransactionView::from);
        if let Some(view) = &view {
            self.last.insert(key, view.clone()).await;
        }
        Ok(view)
    }

    /// Drops every cached entry a write to this transaction could stale.
    pub async fn evict(&self, id: &TransactionId, customer_id: &CustomerId) {
        self.by_id.invalidate(&format!("{BY_ID_PREFIX}::{id}")).await;
        self.active
            .invalidate(&format!("{ACTIVE_PREFIX}::{id}"))
            .await;
        self.last
            .invalidate(&format!("{LAST_PREFIX}::{customer_id}"))
            .await;
    }
}
