//! Transaction domain types.
//!
//! A transaction is the atomic record of a monetary movement against a
//! customer account. Amounts are signed: positive means credit/inflow,
//! negative means debit/outflow, independent of the movement type.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tresora_shared::types::{
    AccountId, CustomerId, DebtorId, OperationTypeId, ProductId, TransactionId,
};

/// Movement type classification of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MovementType {
    /// Inflow of funds into an account.
    Deposit,
    /// Outflow of funds from an account.
    Withdrawal,
    /// Payment to an external entity.
    Payment,
    /// Charge against a credit line.
    CreditCharge,
    /// Payment against a credit line.
    CreditPayment,
    /// Transfer between the customer's own accounts.
    TransferInternal,
    /// Transfer to a third party.
    TransferExternal,
    /// Charge made with a debit card.
    DebitCardCharge,
    /// Withdrawal resolved across a card's ordered account list.
    DebitWithdrawal,
    /// Payment made with a debit card.
    DebitCardPayment,
}

impl MovementType {
    /// Returns true if this movement type is eligible for a commission
    /// once the free-transaction quota is exceeded.
    #[must_use]
    pub fn is_commissionable(self) -> bool {
        matches!(self, Self::Deposit | Self::Withdrawal)
    }

    /// Returns the canonical name used by count queries and event payloads.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Deposit => "DEPOSIT",
            Self::Withdrawal => "WITHDRAWAL",
            Self::Payment => "PAYMENT",
            Self::CreditCharge => "CREDIT_CHARGE",
            Self::CreditPayment => "CREDIT_PAYMENT",
            Self::TransferInternal => "TRANSFER_INTERNAL",
            Self::TransferExternal => "TRANSFER_EXTERNAL",
            Self::DebitCardCharge => "DEBIT_CARD_CHARGE",
            Self::DebitWithdrawal => "DEBIT_WITHDRAWAL",
            Self::DebitCardPayment => "DEBIT_CARD_PAYMENT",
        }
    }
}

/// Origin channel of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Channel {
    /// Automated teller machine.
    Atm,
    /// Mobile application.
    MobileApp,
    /// Web portal.
    WebPortal,
    /// Debit card terminal.
    DebitCard,
}

/// Lifecycle state of a transaction.
///
/// `Inactive` is terminal: logically deleted transactions are excluded from
/// default queries and never reactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionState {
    /// Live record, visible to default queries.
    Active,
    /// Logically deleted, hidden from default queries.
    Inactive,
}

/// Processing status of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TransactionStatus {
    /// Awaiting completion (ingested events, unsettled saga writes).
    Pending,
    /// Fully applied.
    Completed,
    /// Terminally rejected.
    Rejected,
}

/// The atomic record of a monetary movement.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transaction {
    /// Opaque unique id, assigned at creation and never reused.
    pub id: TransactionId,
    /// The customer owning the movement.
    pub customer_id: CustomerId,
    /// Debtor identifier, for third-party debt payments.
    pub debtor_id: Option<DebtorId>,
    /// Paying third party identifier, for third-party debt payments.
    pub payer_id: Option<DebtorId>,
    /// The product (e.g. debit card) the movement belongs to.
    pub product_id: Option<ProductId>,
    /// The account the movement is posted against.
    pub account_id: Option<AccountId>,
    /// Operation type identifier.
    pub operation_type_id: Option<OperationTypeId>,
    /// Destination account, for transfers.
    pub destination_account_id: Option<AccountId>,
    /// Movement type classification.
    pub movement: MovementType,
    /// Origin channel.
    pub origin: Channel,
    /// Lifecycle state.
    pub state: TransactionState,
    /// Processing status.
    pub status: TransactionStatus,
    /// Signed amount: positive = credit/inflow, negative = debit/outflow.
    pub amount: Decimal,
    /// Commission applied at creation (zero or the fixed fee).
    pub commission_applied: Decimal,
    /// When the movement happened.
    pub event_date: DateTime<Utc>,
    /// Free-form description.
    pub description: Option<String>,
    /// When the record was created.
    pub created_at: DateTime<Utc>,
    /// When the record was last written.
    pub updated_at: DateTime<Utc>,
    /// Optimistic-concurrency version, incremented by the store on every
    /// successful save. Zero means "never persisted".
    pub version: u64,
}

impl Transaction {
    /// Builds a persisted-ready record from caller input.
    ///
    /// The manager stamps id, state, status, commission, and timestamps;
    /// caller-supplied values for those fields are ignored by design.
    #[must_use]
    pub fn from_request(
        request: NewTransaction,
        commission_applied: Decimal,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: TransactionId::new(),
            customer_id: request.customer_id,
            debtor_id: request.debtor_id,
            payer_id: request.payer_id,
            product_id: request.product_id,
            account_id: request.account_id,
            operation_type_id: request.operation_type_id,
            destination_account_id: request.destination_account_id,
            movement: request.movement,
            origin: request.origin,
            state: TransactionState::Active,
            status: TransactionStatus::Completed,
            amount: request.amount,
            commission_applied,
            event_date: request.event_date.unwrap_or(now),
            description: request.description,
            created_at: now,
            updated_at: now,
            version: 0,
        }
    }

    /// Returns true if the record is in the `Active` lifecycle state.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state == TransactionState::Active
    }
}

/// Caller input for creating a new transaction.
///
/// Deliberately has no id, state, status, commission, or creation timestamp:
/// the lifecycle manager stamps those.
#[derive(Debug, Clone)]
pub struct NewTransaction {
    /// The customer owning the movement.
    pub customer_id: CustomerId,
    /// Debtor identifier, for third-party debt payments.
    pub debtor_id: Option<DebtorId>,
    /// Paying third party identifier, for third-party debt payments.
    pub payer_id: Option<DebtorId>,
    /// The product the movement belongs to.
    pub product_id: Option<ProductId>,
    /// The account the movement is posted against.
    pub account_id: Option<AccountId>,
    /// Operation type identifier.
    pub operation_type_id: Option<OperationTypeId>,
    /// Destination account, for transfers.
    pub destination_account_id: Option<AccountId>,
    /// Movement type classification.
    pub movement: MovementType,
    /// Origin channel.
    pub origin: Channel,
    /// Requested amount. Must be strictly positive; withdrawals are negated
    /// by the manager at persistence time.
    pub amount: Decimal,
    /// When the movement happened; defaults to "now" when absent.
    pub event_date: Option<DateTime<Utc>>,
    /// Free-form description.
    pub description: Option<String>,
}
