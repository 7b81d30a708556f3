//! Broker-facing event pipeline.
//!
//! `types` defines the wire payloads, `bus` the transport-agnostic
//! publisher contract, `producer` the best-effort outbound announcements,
//! and `ingest` the inbound consumer handlers with dead-letter routing.

pub mod bus;
pub mod ingest;
pub mod producer;
pub mod types;

pub use bus::{Ack, EventPublisher, InMemoryBroker};
pub use ingest::EventIngestor;
pub use producer::{PublishingManager, TransactionEventPublisher};
