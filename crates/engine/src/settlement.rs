//! Third-party debt settlement saga.
//!
//! A settlement touches two stores that cannot share a transaction: the
//! ledger (the payment record) and the debt store (the reduced remaining
//! amount). The payment is written first as PENDING, the debt is reduced,
//! and only then does the payment flip to COMPLETED. A crash or failure
//! between the phases leaves a PENDING record that `reconcile` finishes
//! later; no phase is ever silently rolled back.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};

use tresora_core::error::TransactionError;
use tresora_core::transaction::{
    Channel, MovementType, NewTransaction, Transaction, TransactionState, TransactionStatus,
    validate_amount_positive,
};
use tresora_shared::types::{CustomerId, DebtorId};
use tresora_store::debt::DebtStore;
use tresora_store::ledger::LedgerStore;

use crate::view::TransactionView;

/// A request to pay down a debtor's obligation, possibly by a third party.
#[derive(Debug, Clone)]
pub struct SettlementRequest {
    /// The customer on whose ledger the payment is recorded.
    pub customer_id: CustomerId,
    /// The debtor whose obligation is reduced.
    pub debtor_id: DebtorId,
    /// The paying party; equals the debtor for self-payments.
    pub payer_id: DebtorId,
    /// Strictly positive payment amount.
    pub payment: Decimal,
    /// Origin channel.
    pub origin: Channel,
    /// Free-form description.
    pub description: Option<String>,
}

/// Runs the settlement saga across the ledger and debt stores.
#[derive(Debug, Clone)]
pub struct DebtSettlement<S, D> {
    ledger: Arc<S>,
    debts: Arc<D>,
}

impl<S: LedgerStore, D: DebtStore> DebtSettlement<S, D> {
    /// Creates a settlement service over the two stores.
    pub fn new(ledger: Arc<S>, debts: Arc<D>) -> Self {
        Self { ledger, debts }
    }

    /// Settles a payment against the debtor's open debt.
    ///
    /// The debt must exist and cover the full payment; partial coverage is
    /// not split. On success the returned view is COMPLETED. If the debt
    /// write fails after the payment record was persisted, the view is
    /// returned PENDING and a later `reconcile` finishes the saga.
    pub async fn settle(
        &self,
        request: SettlementRequest,
    ) -> Result<TransactionView, TransactionError> {
        validate_amount_positive(request.payment)?;

        let mut debt = self
            .debts
            .find_by_debtor(&request.debtor_id)
            .await?
            .filter(|debt| debt.covers(request.payment))
            .ok_or_else(|| TransactionError::DebtNotFound(request.debtor_id.clone()))?;

        // Phase 1: the payment record, PENDING until the debt is reduced.
        let mut tx = Transaction::from_request(
            NewTransaction {
                customer_id: request.customer_id,
                debtor_id: Some(request.debtor_id.clone()),
                payer_id: Some(request.payer_id),
                product_id: None,
                account_id: None,
                operation_type_id: None,
                destination_account_id: None,
                movement: MovementType::CreditPayment,
                origin: request.origin,
                amount: request.payment,
                event_date: None,
                description: request.description,
            },
            Decimal::ZERO,
            Utc::now(),
        );
        tx.status = TransactionStatus::Pending;
        let mut pending = self.ledger.save(tx).await?;

        // Phase 2: reduce the debt.
        debt.apply_payment(request.payment)?;
        let settled = debt.is_settled();
        if let Err(err) = self.debts.save(debt).await {
            warn!(
                id = %pending.id,
                debtor = request.debtor_id.as_str(),
                error = %err,
                "debt update failed, payment left pending for reconciliation"
            );
            return Ok(TransactionView::from(&pending));
        }

        // Phase 3: flip the payment to COMPLETED.
        pending.status = TransactionStatus::Completed;
        let completed = self.ledger.save(pending).await?;
        info!(
            id = %completed.id,
            debtor = request.debtor_id.as_str(),
            payment = %request.payment,
            settled,
            "debt payment settled"
        );
        Ok(TransactionView::from(&completed))
    }

    /// Finishes settlements stranded in PENDING.
    ///
    /// Re-applies the debt reduction where the debt can still absorb the
    /// payment; a debt that no longer covers it is treated as already
    /// reduced. Either way the payment flips to COMPLETED. Returns the
    /// number of payments completed.
    pub async fn reconcile(&self) -> Result<u64, TransactionError> {
        let pending = self.ledger.find_by_status(TransactionStatus::Pending).await?;
        let mut completed = 0_u64;

        for mut tx in pending {
            if tx.movement != MovementType::CreditPayment || tx.state != TransactionState::Active {
                continue;
            }
            let Some(debtor_id) = tx.debtor_id.clone() else {
                continue;
            };

            if let Some(mut debt) = self.debts.find_by_debtor(&debtor_id).await?
                && debt.covers(tx.amount)
            {
                debt.apply_payment(tx.amount)?;
                self.debts.save(debt).await?;
            }

            tx.status = TransactionStatus::Completed;
            let saved = self.ledger.save(tx).await?;
            info!(id = %saved.id, debtor = debtor_id.as_str(), "pending settlement reconciled");
            completed += 1;
        }
        Ok(completed)
    }
}
