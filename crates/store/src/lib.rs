//! Store contracts for the Tresora ledger.
//!
//! The authoritative store is an external collaborator; this crate defines
//! the contract the engine requires from it: keyed storage with
//! optimistic-concurrency version checks, plus the secondary-index queries
//! the lifecycle manager needs. An in-memory implementation backs tests
//! and anything that runs without a real database.

pub mod debt;
pub mod ledger;
pub mod memory;

pub use debt::DebtStore;
pub use ledger::LedgerStore;
pub use memory::{InMemoryDebtStore, InMemoryLedgerStore};
