//! Transaction domain types and validation rules.
//!
//! - Movement type and origin channel enumerations
//! - The transaction record with optimistic-concurrency version
//! - Caller input for new transactions
//! - Amount validation rules

pub mod types;
pub mod validation;

pub use types::{
    Channel, MovementType, NewTransaction, Transaction, TransactionState, TransactionStatus,
};
pub use validation::{validate_amount_positive, validate_amount_within};
