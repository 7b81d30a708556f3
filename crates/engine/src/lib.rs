//! Async orchestration for the Tresora transaction ledger.
//!
//! Everything here runs on shared, stateless handles: the ledger store, the
//! debt store, and the broker client. No per-customer or per-account
//! serialization is imposed; optimistic versioning at the store is the only
//! mutation discipline, and callers retry `ConcurrencyConflict` with a
//! fresh read.
//!
//! # Modules
//!
//! - `lifecycle` - Transaction creation, update, logical deletion, queries
//! - `settlement` - Third-party debt payment saga
//! - `cache` - TTL-bounded read-through cache for point lookups
//! - `events` - Event ingestion pipeline (consumer handlers + producer)
//! - `view` - The response shape returned to callers
//! - `deadline` - Deadline propagation for store-touching operations

pub mod cache;
pub mod deadline;
pub mod events;
pub mod lifecycle;
pub mod settlement;
pub mod view;

pub use cache::CachedTransactions;
pub use lifecycle::TransactionManager;
pub use settlement::{DebtSettlement, SettlementRequest};
pub use view::TransactionView;
