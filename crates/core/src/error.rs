//! Error taxonomy for ledger operations.
//!
//! One enum covers the whole engine: validation rejections, business rule
//! failures, lookup misses, optimistic-concurrency conflicts, deadline
//! expiry, and wrapped backend failures. Synchronous callers receive these
//! directly; the event pipeline converts them into dead-letter routing.

use rust_decimal::Decimal;
use thiserror::Error;
use tresora_shared::types::{CustomerId, DebtorId, TransactionId};

/// Errors that can occur during ledger operations.
#[derive(Debug, Clone, Error)]
pub enum TransactionError {
    // ========== Validation Errors ==========
    /// Amount is missing, zero, or negative.
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Amount exceeds the configured ceiling for the operation.
    #[error("Amount {amount} exceeds the allowed ceiling {ceiling}")]
    AmountExceedsCeiling {
        /// The requested amount.
        amount: Decimal,
        /// The configured ceiling.
        ceiling: Decimal,
    },

    /// Inbound event is missing its natural id.
    #[error("Event is missing its natural id")]
    MissingNaturalId,

    // ========== Business Rule Errors ==========
    /// No candidate account covers the requested withdrawal.
    #[error("Insufficient funds for withdrawal of {requested}")]
    InsufficientFunds {
        /// The requested withdrawal amount.
        requested: Decimal,
    },

    /// No open debt exists for the debtor, or it cannot cover the payment.
    #[error("No debt found for debtor {0} covering the requested payment")]
    DebtNotFound(DebtorId),

    /// Payment is non-positive or exceeds the remaining debt.
    #[error("Invalid payment {payment} against remaining debt {remaining}")]
    InvalidPayment {
        /// The attempted payment.
        payment: Decimal,
        /// The remaining debt amount.
        remaining: Decimal,
    },

    /// Customer has an overdue credit charge blocking the operation.
    #[error("Customer {0} has an overdue credit debt")]
    OverdueDebt(CustomerId),

    // ========== Lookup Errors ==========
    /// Transaction not found (or not in the requested state).
    #[error("Transaction not found: {0}")]
    NotFound(TransactionId),

    // ========== Concurrency Errors ==========
    /// Stale version on write; the caller must re-read and retry.
    #[error("Concurrency conflict on {id}: expected version {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The transaction id.
        id: TransactionId,
        /// The version the writer expected.
        expected: u64,
        /// The version actually stored.
        actual: u64,
    },

    // ========== Infrastructure Errors ==========
    /// Operation deadline elapsed before completion.
    #[error("Operation timed out")]
    Timeout,

    /// Inbound event was malformed or could not be persisted.
    #[error("Event processing failed: {0}")]
    EventProcessing(String),

    /// Backend storage failure.
    #[error("Store error: {0}")]
    Store(String),
}

impl TransactionError {
    /// Returns the stable error code for this error.
    #[must_use]
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::InvalidAmount => "INVALID_AMOUNT",
            Self::AmountExceedsCeiling { .. } => "AMOUNT_EXCEEDS_CEILING",
            Self::MissingNaturalId => "MISSING_NATURAL_ID",
            Self::InsufficientFunds { .. } => "INSUFFICIENT_FUNDS",
            Self::DebtNotFound(_) => "DEBT_NOT_FOUND",
            Self::InvalidPayment { .. } => "INVALID_PAYMENT",
            Self::OverdueDebt(_) => "OVERDUE_DEBT",
            Self::NotFound(_) => "NOT_FOUND",
            Self::ConcurrencyConflict { .. } => "CONCURRENCY_CONFLICT",
            Self::Timeout => "TIMEOUT",
            Self::EventProcessing(_) => "EVENT_PROCESSING_ERROR",
            Self::Store(_) => "STORE_ERROR",
        }
    }

    /// Returns true if the caller may retry after a fresh read.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::ConcurrencyConflict { .. } | Self::Timeout)
    }
}
