//! Transaction lifecycle orchestration.
//!
//! The manager owns the write path: it validates caller input, applies the
//! commission policy, enforces the overdue-debt gate, and stamps the fields
//! callers never control (id, state, status, timestamps). Reads go straight
//! to the store; point lookups that want caching go through
//! `cache::CachedTransactions` instead.

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use tresora_core::commission;
use tresora_core::error::TransactionError;
use tresora_core::transaction::{
    Channel, MovementType, NewTransaction, Transaction, TransactionState,
    validate_amount_positive, validate_amount_within,
};
use tresora_core::withdrawal::{self, SelectionMode};
use tresora_shared::config::AppConfig;
use tresora_shared::types::{AccountId, CustomerId, ProductId, TransactionId};
use tresora_store::ledger::LedgerStore;

use crate::cache::CachedTransactions;
use crate::deadline;
use crate::view::TransactionView;

/// Orchestrates transaction creation, update, logical deletion, and queries.
///
/// Stateless besides its handles; clone freely across tasks. Every store
/// interaction runs under the configured operation deadline.
#[derive(Debug, Clone)]
pub struct TransactionManager<S> {
    store: Arc<S>,
    config: AppConfig,
    cache: Option<CachedTransactions<S>>,
}

impl<S: LedgerStore> TransactionManager<S> {
    /// Creates a manager over a ledger store.
    pub fn new(store: Arc<S>, config: AppConfig) -> Self {
        Self {
            store,
            config,
            cache: None,
        }
    }

    /// Attaches a read-through cache; every write evicts the entries it
    /// could stale, so the cache never serves this process's own writes
    /// out of date.
    #[must_use]
    pub fn with_cache(mut self, cache: CachedTransactions<S>) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Creates a transaction, dispatching per-movement business rules.
    ///
    /// Deposits and withdrawals are blocked while the customer has an
    /// overdue credit charge. Direct credit payments require such a charge
    /// to exist. Debit-card payments are capped at the configured ceiling
    /// and persisted as `PAYMENT` originating from the `DEBIT_CARD` channel.
    /// `DEBIT_WITHDRAWAL` requests run the ordered account selection over
    /// the product's history. Withdrawal-type amounts are stored negated.
    pub async fn create(
        &self,
        mut request: NewTransaction,
    ) -> Result<TransactionView, TransactionError> {
        validate_amount_positive(request.amount)?;
        let now = Utc::now();

        match request.movement {
            MovementType::Deposit | MovementType::Withdrawal => {
                self.ensure_no_overdue_debt(&request.customer_id, now).await?;
            }
            MovementType::CreditPayment => {
                self.ensure_overdue_charge_exists(&request.customer_id, now)
                    .await?;
            }
            MovementType::DebitCardPayment => {
                validate_amount_within(request.amount, self.config.debit_card.payment_ceiling)?;
                request.movement = MovementType::Payment;
                request.origin = Channel::DebitCard;
            }
            MovementType::DebitWithdrawal => {
                return self.ordered_debit_withdrawal(request).await;
            }
            _ => {}
        }

        let fee = self.commission_for(&request).await?;
        if matches!(request.movement, MovementType::Withdrawal) {
            request.amount = -request.amount;
        }

        let tx = Transaction::from_request(request, fee, now);
        let saved = self.bounded(self.store.save(tx)).await?;
        self.evict_cached(&saved).await;
        info!(
            id = %saved.id,
            movement = saved.movement.as_str(),
            commission = %saved.commission_applied,
            "transaction created"
        );
        Ok(TransactionView::from(&saved))
    }

    /// Resolves a `DEBIT_WITHDRAWAL` across the product's account list.
    ///
    /// Candidate balances are aggregated from the product's ACTIVE history
    /// in recency order; the first account that covers the request funds
    /// the whole withdrawal, persisted with a negated amount.
    pub async fn ordered_debit_withdrawal(
        &self,
        mut request: NewTransaction,
    ) -> Result<TransactionView, TransactionError> {
        validate_amount_positive(request.amount)?;

        // No product means no candidate accounts.
        let history = match &request.product_id {
            Some(product_id) => {
                self.bounded(
                    self.store
                        .find_by_product_and_state_desc(product_id, TransactionState::Active),
                )
                .await?
            }
            None => Vec::new(),
        };
        let selection =
            withdrawal::select_account(request.amount, &history, SelectionMode::Aggregate)?;
        debug!(
            account = selection.account_id.as_str(),
            available = %selection.available,
            requested = %request.amount,
            "withdrawal account selected"
        );

        request.movement = MovementType::DebitWithdrawal;
        request.account_id = Some(selection.account_id);
        request.amount = -request.amount;

        let tx = Transaction::from_request(request, Decimal::ZERO, Utc::now());
        let saved = self.bounded(self.store.save(tx)).await?;
        self.evict_cached(&saved).await;
        Ok(TransactionView::from(&saved))
    }

    /// Updates an ACTIVE transaction in place.
    ///
    /// Only the amount, event date, and description are replaceable; the
    /// owning customer, accounts, product, and channel are immutable.
    /// Updated records always persist as `TRANSFER_INTERNAL`, whatever
    /// movement the caller sends: an amended record no longer reflects the
    /// original movement and is reclassified rather than trusted.
    pub async fn update(
        &self,
        id: &TransactionId,
        request: NewTransaction,
    ) -> Result<TransactionView, TransactionError> {
        validate_amount_positive(request.amount)?;

        let mut existing = self
            .bounded(self.store.find_by_id_and_state(id, TransactionState::Active))
            .await?
            .ok_or_else(|| TransactionError::NotFound(id.clone()))?;
        self.ensure_no_overdue_debt(&existing.customer_id, Utc::now())
            .await?;

        existing.movement = MovementType::TransferInternal;
        existing.amount = request.amount;
        existing.event_date = request.event_date.unwrap_or(existing.event_date);
        existing.description = request.description;

        let saved = self.bounded(self.store.save(existing)).await?;
        self.evict_cached(&saved).await;
        info!(id = %saved.id, "transaction updated");
        Ok(TransactionView::from(&saved))
    }

    /// Logically deletes a transaction by flipping it to INACTIVE.
    ///
    /// Only ACTIVE records can be deleted; a second delete of the same id
    /// fails with `NotFound`. The record itself is never removed.
    pub async fn delete_logical(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionView, TransactionError> {
        let mut existing = self
            .bounded(self.store.find_by_id_and_state(id, TransactionState::Active))
            .await?
            .ok_or_else(|| TransactionError::NotFound(id.clone()))?;

        existing.state = TransactionState::Inactive;
        let saved = self.bounded(self.store.save(existing)).await?;
        self.evict_cached(&saved).await;
        info!(id = %saved.id, "transaction logically deleted");
        Ok(TransactionView::from(&saved))
    }

    /// Point lookup by id, regardless of state.
    pub async fn get_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionView, TransactionError> {
        self.bounded(self.store.find_by_id(id))
            .await?
            .map(|tx| TransactionView::from(&tx))
            .ok_or_else(|| TransactionError::NotFound(id.clone()))
    }

    /// Point lookup restricted to ACTIVE records.
    pub async fn get_active_by_id(
        &self,
        id: &TransactionId,
    ) -> Result<TransactionView, TransactionError> {
        self.bounded(self.store.find_by_id_and_state(id, TransactionState::Active))
            .await?
            .map(|tx| TransactionView::from(&tx))
            .ok_or_else(|| TransactionError::NotFound(id.clone()))
    }

    /// ACTIVE transactions for a product, most recent first.
    pub async fn list_by_product(
        &self,
        product_id: &ProductId,
    ) -> Result<Vec<TransactionView>, TransactionError> {
        let txns = self
            .bounded(
                self.store
                    .find_by_product_and_state_desc(product_id, TransactionState::Active),
            )
            .await?;
        Ok(txns.iter().map(TransactionView::from).collect())
    }

    /// All ACTIVE transactions for a customer, most recent first.
    pub async fn list_by_customer(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<TransactionView>, TransactionError> {
        let txns = self
            .bounded(
                self.store
                    .find_by_customer_and_state(customer_id, TransactionState::Active),
            )
            .await?;
        Ok(txns.iter().map(TransactionView::from).collect())
    }

    /// The ten most recent ACTIVE transactions for a customer.
    pub async fn last_ten(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Vec<TransactionView>, TransactionError> {
        let txns = self
            .bounded(self.store.find_top_by_customer_and_state_desc(
                customer_id,
                TransactionState::Active,
                10,
            ))
            .await?;
        Ok(txns.iter().map(TransactionView::from).collect())
    }

    /// The single most recent ACTIVE transaction for a customer.
    pub async fn last(
        &self,
        customer_id: &CustomerId,
    ) -> Result<Option<TransactionView>, TransactionError> {
        let tx = self
            .bounded(
                self.store
                    .find_last_by_customer_and_state(customer_id, TransactionState::Active),
            )
            .await?;
        Ok(tx.as_ref().map(TransactionView::from))
    }

    /// ACTIVE transactions created within `[start, end]`.
    pub async fn created_between(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<TransactionView>, TransactionError> {
        let txns = self
            .bounded(
                self.store
                    .find_by_created_between_and_state(start, end, TransactionState::Active),
            )
            .await?;
        Ok(txns.iter().map(TransactionView::from).collect())
    }

    /// Number of transactions on an account with any of the movement types.
    pub async fn count_by_account(
        &self,
        account_id: &AccountId,
        movements: &[MovementType],
    ) -> Result<u64, TransactionError> {
        self.bounded(
            self.store
                .count_by_account_and_movement_in(account_id, movements),
        )
        .await
    }

    /// Returns true if the customer has an ACTIVE credit charge whose event
    /// date is strictly before `now`.
    pub async fn has_overdue_debt(
        &self,
        customer_id: &CustomerId,
        now: DateTime<Utc>,
    ) -> Result<bool, TransactionError> {
        self.bounded(
            self.store
                .exists_by_customer_and_movement_and_date_before_and_state(
                    customer_id,
                    MovementType::CreditCharge,
                    now,
                    TransactionState::Active,
                ),
        )
        .await
    }

    async fn ensure_no_overdue_debt(
        &self,
        customer_id: &CustomerId,
        now: DateTime<Utc>,
    ) -> Result<(), TransactionError> {
        if self.has_overdue_debt(customer_id, now).await? {
            return Err(TransactionError::OverdueDebt(customer_id.clone()));
        }
        Ok(())
    }

    async fn ensure_overdue_charge_exists(
        &self,
        customer_id: &CustomerId,
        now: DateTime<Utc>,
    ) -> Result<(), TransactionError> {
        if !self.has_overdue_debt(customer_id, now).await? {
            return Err(TransactionError::DebtNotFound(
                tresora_shared::types::DebtorId::from_raw(customer_id.as_str()),
            ));
        }
        Ok(())
    }

    // The prior count is a snapshot; concurrent writers may each see the
    // same count, so the free quota is approximate under contention.
    async fn commission_for(&self, request: &NewTransaction) -> Result<Decimal, TransactionError> {
        let Some(account_id) = &request.account_id else {
            return Ok(Decimal::ZERO);
        };
        let prior = self
            .bounded(
                self.store
                    .count_by_account_and_movement_in(account_id, &[request.movement]),
            )
            .await?;
        Ok(commission::fee_for(
            request.movement,
            prior,
            &self.config.commission,
        ))
    }

    // Bounds a store interaction by the configured operation deadline.
    async fn bounded<T>(
        &self,
        fut: impl Future<Output = Result<T, TransactionError>>,
    ) -> Result<T, TransactionError> {
        deadline::within(Duration::from_millis(self.config.timeouts.operation_ms), fut).await
    }

    async fn evict_cached(&self, saved: &Transaction) {
        if let Some(cache) = &self.cache {
            cache.evict(&saved.id, &saved.customer_id).await;
        }
    }
}
