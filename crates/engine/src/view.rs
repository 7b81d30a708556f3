//! The response shape returned to callers.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tresora_core::transaction::{
    Channel, MovementType, Transaction, TransactionState, TransactionStatus,
};
use tresora_shared::types::{
    AccountId, CustomerId, DebtorId, OperationTypeId, ProductId, TransactionId,
};

/// A transaction as exposed to callers and to the cache.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionView {
    /// Transaction id.
    pub id: TransactionId,
    /// Owning customer.
    pub customer_id: CustomerId,
    /// Debtor, for third-party debt payments.
    pub debtor_id: Option<DebtorId>,
    /// Paying third party, for third-party debt payments.
    pub payer_id: Option<DebtorId>,
    /// Product the movement belongs to.
    pub product_id: Option<ProductId>,
    /// Account the movement is posted against.
    pub account_id: Option<AccountId>,
    /// Operation type identifier.
    pub operation_type_id: Option<OperationTypeId>,
    /// Destination account, for transfers.
    pub destination_account_id: Option<AccountId>,
    /// Movement type.
    pub movement: MovementType,
    /// Origin channel.
    pub origin: Channel,
    /// Lifecycle state.
    pub state: TransactionState,
    /// Processing status.
    pub status: TransactionStatus,
    /// Signed amount.
    pub amount: Decimal,
    /// Commission applied at creation.
    pub commission_applied: Decimal,
    /// When the movement happened.
    pub event_date: DateTime<Utc>,
    /// Free-form description.
    pub description: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
}

impl From<&Transaction> for TransactionView {
    fn from(tx: &Transaction) -> Self {
        Self {
            id: tx.id.clone(),
            customer_id: tx.customer_id.clone(),
            debtor_id: tx.debtor_id.clone(),
            payer_id: tx.payer_id.clone(),
            product_id: tx.product_id.clone(),
            account_id: tx.account_id.clone(),
            operation_type_id: tx.operation_type_id.clone(),
            destination_account_id: tx.destination_account_id.clone(),
            movement: tx.movement,
            origin: tx.origin,
            state: tx.state,
            status: tx.status,
            amount: tx.amount,
            commission_applied: tx.commission_applied,
            event_date: tx.event_date,
            description: tx.description.clone(),
            created_at: tx.created_at,
        }
    }
}
