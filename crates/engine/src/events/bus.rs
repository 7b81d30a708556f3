//! Transport-agnostic publisher contract.
//!
//! The engine never talks to a concrete broker client; it publishes
//! through this trait and receives a partition/offset acknowledgement.
//! The in-memory implementation backs tests and broker-free runs.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use tresora_core::error::TransactionError;

use super::types::Envelope;

/// Broker acknowledgement for a published record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Ack {
    /// Partition the record landed on.
    pub partition: i32,
    /// Offset within the partition.
    pub offset: i64,
}

/// Publishes records to a topic.
#[allow(async_fn_in_trait)]
pub trait EventPublisher: Send + Sync {
    /// Publishes one record, returning where it landed.
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: serde_json::Value,
    ) -> Result<Ack, TransactionError>;
}

/// In-memory broker: one append-only log per topic, single partition.
#[derive(Debug, Clone, Default)]
pub struct InMemoryBroker {
    topics: Arc<RwLock<HashMap<String, Vec<Envelope>>>>,
}

impl InMemoryBroker {
    /// Creates an empty broker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns all records published to a topic, in publish order.
    pub async fn records(&self, topic: &str) -> Vec<Envelope> {
        self.topics
            .read()
            .await
            .get(topic)
            .cloned()
            .unwrap_or_default()
    }
}

impl EventPublisher for InMemoryBroker {
    async fn publish(
        &self,
        topic: &str,
        key: &str,
        payload: serde_json::Value,
    ) -> Result<Ack, TransactionError> {
        let mut topics = self.topics.write().await;
        let log = topics.entry(topic.to_string()).or_default();
        log.push(Envelope {
            topic: topic.to_string(),
            key: Some(key.to_string()),
            payload,
        });
        Ok(Ack {
            partition: 0,
            offset: (log.len() - 1) as i64,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_offsets_grow_per_topic() {
        let broker = InMemoryBroker::new();

        let first = broker.publish("t.a", "k1", json!({"n": 1})).await.unwrap();
        let second = broker.publish("t.a", "k2", json!({"n": 2})).await.unwrap();
        let other = broker.publish("t.b", "k1", json!({"n": 3})).await.unwrap();

        assert_eq!(first, Ack { partition: 0, offset: 0 });
        assert_eq!(second.offset, 1);
        assert_eq!(other.offset, 0);

        let records = broker.records("t.a").await;
        assert_eq!(records.len(), 2);
        assert_eq!(records[1].key.as_deref(), Some("k2"));
    }

    #[tokio::test]
    async fn test_unknown_topic_reads_empty() {
        let broker = InMemoryBroker::new();
        assert!(broker.records("nope").await.is_empty());
    }
}
