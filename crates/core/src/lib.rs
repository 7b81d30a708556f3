//! Core business logic for Tresora.
//!
//! This crate contains pure business logic with ZERO web or database
//! dependencies. All domain types, validation rules, and calculations live
//! here. Current time and configured limits are always passed in explicitly
//! so every function stays deterministically testable.
//!
//! # Modules
//!
//! - `transaction` - Movement types, transaction records, amount validation
//! - `commission` - Per-account commission policy
//! - `withdrawal` - Ordered multi-account withdrawal selection
//! - `debt` - Debt entity and payment arithmetic
//! - `error` - Error taxonomy shared by the whole engine

pub mod commission;
pub mod debt;
pub mod error;
pub mod transaction;
pub mod withdrawal;

#[cfg(test)]
mod commission_props;
#[cfg(test)]
mod withdrawal_props;

pub use error::TransactionError;
pub use transaction::{
    Channel, MovementType, NewTransaction, Transaction, TransactionState, TransactionStatus,
};
