//! Debt entity and payment arithmetic.
//!
//! A debt is an open obligation with a strictly decreasing remaining
//! amount. Payments may come from the debtor or a third party; the debt is
//! settled when the remaining amount reaches exactly zero. Records are
//! never deleted, downstream keeps the history.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tresora_shared::types::{DebtId, DebtorId};

use crate::error::TransactionError;

/// An outstanding obligation owed by a debtor.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Debt {
    /// Unique id.
    pub id: DebtId,
    /// The debtor owing the obligation.
    pub debtor_id: DebtorId,
    /// Remaining amount. Strictly positive while open, exactly zero once
    /// settled, never negative.
    pub remaining: Decimal,
    /// When the obligation falls due.
    pub due_date: DateTime<Utc>,
}

impl Debt {
    /// Opens a debt with a strictly positive amount.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::InvalidAmount` if the opening amount is
    /// not strictly positive.
    pub fn open(
        id: DebtId,
        debtor_id: DebtorId,
        amount: Decimal,
        due_date: DateTime<Utc>,
    ) -> Result<Self, TransactionError> {
        if amount <= Decimal::ZERO {
            return Err(TransactionError::InvalidAmount);
        }
        Ok(Self {
            id,
            debtor_id,
            remaining: amount,
            due_date,
        })
    }

    /// Reduces the remaining amount by a payment.
    ///
    /// # Errors
    ///
    /// Returns `TransactionError::InvalidPayment` when the payment is not
    /// strictly positive or exceeds the remaining amount; the debt is left
    /// unchanged in that case.
    pub fn apply_payment(&mut self, payment: Decimal) -> Result<(), TransactionError> {
        if payment <= Decimal::ZERO || payment > self.remaining {
            return Err(TransactionError::InvalidPayment {
                payment,
                remaining: self.remaining,
            });
        }
        self.remaining -= payment;
        Ok(())
    }

    /// Returns true if the remaining amount can absorb `payment`.
    #[must_use]
    pub fn covers(&self, payment: Decimal) -> bool {
        self.remaining >= payment
    }

    /// Returns true once the debt has been paid down to exactly zero.
    #[must_use]
    pub fn is_settled(&self) -> bool {
        self.remaining == Decimal::ZERO
    }
}
