//! Inbound event handlers.
//!
//! Each topic maps a payload to a ledger record stamped ACTIVE/PENDING.
//! The upstream natural id becomes the ledger id, which makes replays
//! overwrite instead of duplicate. Handlers run under the configured
//! deadline; any rejection routes the original payload to the dead-letter
//! topic and acknowledges the record, so a poison message never wedges
//! the consumer.

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{error, info, warn};

use tresora_core::error::TransactionError;
use tresora_core::transaction::{
    Channel, MovementType, Transaction, TransactionState, TransactionStatus,
    validate_amount_positive, validate_amount_within,
};
use tresora_shared::config::AppConfig;
use tresora_shared::types::{AccountId, CustomerId, DebtorId, ProductId, TransactionId};
use tresora_store::ledger::LedgerStore;

use super::bus::EventPublisher;
use super::types::{
    CreditPaymentRequested, DeadLetter, DebitCardPaymentRequested, Envelope,
    ExternalTransferRequested, OrderedDebitWithdrawalRequested, ThirdPartyCreditPaymentRequested,
    TransactionCreated,
};
use crate::deadline;

/// Consumes broker records and writes them into the ledger.
#[derive(Debug, Clone)]
pub struct EventIngestor<S, P> {
    store: Arc<S>,
    bus: Arc<P>,
    config: AppConfig,
}

impl<S: LedgerStore, P: EventPublisher> EventIngestor<S, P> {
    /// Creates an ingestor over a ledger store and a broker handle.
    pub fn new(store: Arc<S>, bus: Arc<P>, config: AppConfig) -> Self {
        Self { store, bus, config }
    }

    /// Processes one consumed record.
    ///
    /// Never returns an error to the consumer loop: failures are routed to
    /// the dead-letter topic and the record is considered handled.
    pub async fn handle(&self, envelope: Envelope) {
        let broker = &self.config.broker;
        let budget = Duration::from_millis(broker.handler_timeout_ms);
        let payload = envelope.payload.clone();

        let result = if envelope.topic == broker.transaction_created_topic {
            deadline::within(budget, self.apply_created(payload)).await
        } else if envelope.topic == broker.credit_payment_topic {
            deadline::within(budget, self.apply_credit_payment(payload)).await
        } else if envelope.topic == broker.debit_card_payment_topic {
            deadline::within(budget, self.apply_debit_card_payment(payload)).await
        } else if envelope.topic == broker.third_party_credit_payment_topic {
            deadline::within(budget, self.apply_third_party_payment(payload)).await
        } else if envelope.topic == broker.external_transfer_topic {
            deadline::within(budget, self.apply_external_transfer(payload)).await
        } else if envelope.topic == broker.ordered_debit_withdrawal_topic {
            deadline::within(budget, self.apply_ordered_withdrawal(payload)).await
        } else {
            Err(TransactionError::EventProcessing(format!(
                "no handler for topic {}",
                envelope.topic
            )))
        };

        match result {
            Ok(id) => info!(topic = %envelope.topic, id = %id, "event applied"),
            Err(err) => self.dead_letter(envelope, &err).await,
        }
    }

    async fn apply_created(
        &self,
        payload: serde_json::Value,
    ) -> Result<TransactionId, TransactionError> {
        let event: TransactionCreated = decode(payload)?;
        let id = require_natural_id(event.transaction_id)?;
        validate_amount_positive(event.amount)?;
        let now = Utc::now();

        let mut tx = ingested_record(
            id,
            CustomerId::from_raw(event.customer_id),
            event.movement,
            event.origin,
            event.amount,
            parse_event_date(event.event_date, now)?,
            now,
        );
        tx.account_id = event.account_id.map(AccountId::from_raw);
        tx.description = event.description;
        self.upsert(tx).await
    }

    async fn apply_credit_payment(
        &self,
        payload: serde_json::Value,
    ) -> Result<TransactionId, TransactionError> {
        let event: CreditPaymentRequested = decode(payload)?;
        let id = require_natural_id(event.payment_id)?;
        validate_amount_positive(event.amount)?;
        let now = Utc::now();

        let mut tx = ingested_record(
            id,
            CustomerId::from_raw(event.customer_id),
            MovementType::CreditPayment,
            Channel::WebPortal,
            event.amount,
            parse_event_date(event.event_date, now)?,
            now,
        );
        tx.description = event.description;
        self.upsert(tx).await
    }

    async fn apply_debit_card_payment(
        &self,
        payload: serde_json::Value,
    ) -> Result<TransactionId, TransactionError> {
        let event: DebitCardPaymentRequested = decode(payload)?;
        let id = require_natural_id(event.payment_id)?;
        validate_amount_positive(event.amount)?;
        validate_amount_within(event.amount, self.config.debit_card.payment_ceiling)?;
        let now = Utc::now();

        // Same reclassification the synchronous path applies.
        let mut tx = ingested_record(
            id,
            CustomerId::from_raw(event.customer_id),
            MovementType::Payment,
            Channel::DebitCard,
            event.amount,
            parse_event_date(event.event_date, now)?,
            now,
        );
        tx.product_id = event.product_id.map(ProductId::from_raw);
        tx.account_id = event.account_id.map(AccountId::from_raw);
        self.upsert(tx).await
    }

    async fn apply_third_party_payment(
        &self,
        payload: serde_json::Value,
    ) -> Result<TransactionId, TransactionError> {
        let event: ThirdPartyCreditPaymentRequested = decode(payload)?;
        let id = require_natural_id(event.payment_id)?;
        validate_amount_positive(event.amount)?;
        let now = Utc::now();

        let mut tx = ingested_record(
            id,
            CustomerId::from_raw(event.customer_id),
            MovementType::CreditPayment,
            Channel::WebPortal,
            event.amount,
            parse_event_date(event.event_date, now)?,
            now,
        );
        tx.debtor_id = Some(DebtorId::from_raw(event.debtor_id));
        tx.payer_id = Some(DebtorId::from_raw(event.payer_id));
        self.upsert(tx).await
    }

    async fn apply_external_transfer(
        &self,
        payload: serde_json::Value,
    ) -> Result<TransactionId, TransactionError> {
        let event: ExternalTransferRequested = decode(payload)?;
        let id = require_natural_id(event.transfer_id)?;
        validate_amount_positive(event.amount)?;
        let now = Utc::now();

        let mut tx = ingested_record(
            id,
            CustomerId::from_raw(event.customer_id),
            MovementType::TransferExternal,
            Channel::WebPortal,
            event.amount,
            parse_event_date(event.event_date, now)?,
            now,
        );
        tx.account_id = event.account_id.map(AccountId::from_raw);
        tx.destination_account_id = event.destination_account_id.map(AccountId::from_raw);
        self.upsert(tx).await
    }

    async fn apply_ordered_withdrawal(
        &self,
        payload: serde_json::Value,
    ) -> Result<TransactionId, TransactionError> {
        let event: OrderedDebitWithdrawalRequested = decode(payload)?;
        let id = require_natural_id(event.withdrawal_id)?;
        validate_amount_positive(event.amount)?;
        let now = Utc::now();

        let mut tx = ingested_record(
            id,
            CustomerId::from_raw(event.customer_id),
            MovementType::DebitWithdrawal,
            Channel::DebitCard,
            -event.amount,
            parse_event_date(event.event_date, now)?,
            now,
        );
        tx.product_id = event.product_id.map(ProductId::from_raw);
        self.upsert(tx).await
    }

    // Replays carry the stored version forward so the save overwrites the
    // same record instead of conflicting or duplicating.
    async fn upsert(&self, mut tx: Transaction) -> Result<TransactionId, TransactionError> {
        if let Some(existing) = self.store.find_by_id(&tx.id).await? {
            tx.version = existing.version;
            tx.created_at = existing.created_at;
        }
        let saved = self.store.save(tx).await?;
        Ok(saved.id)
    }

    async fn dead_letter(&self, envelope: Envelope, err: &TransactionError) {
        let record = DeadLetter {
            source_topic: envelope.topic.clone(),
            error_code: err.error_code().to_string(),
            reason: err.to_string(),
            payload: envelope.payload,
        };
        let Ok(payload) = serde_json::to_value(&record) else {
            error!(topic = %envelope.topic, "dead-letter payload not serializable");
            return;
        };

        let key = envelope.key.as_deref().unwrap_or("unkeyed");
        match self
            .bus
            .publish(&self.config.broker.dead_letter_topic, key, payload)
            .await
        {
            Ok(ack) => warn!(
                topic = %envelope.topic,
                code = %record.error_code,
                offset = ack.offset,
                "event dead-lettered"
            ),
            Err(publish_err) => error!(
                topic = %envelope.topic,
                code = %record.error_code,
                error = %publish_err,
                "dead-letter publish failed, event dropped"
            ),
        }
    }
}

fn decode<T: serde::de::DeserializeOwned>(
    payload: serde_json::Value,
) -> Result<T, TransactionError> {
    serde_json::from_value(payload)
        .map_err(|err| TransactionError::EventProcessing(format!("malformed payload: {err}")))
}

fn require_natural_id(raw: Option<String>) -> Result<TransactionId, TransactionError> {
    match raw {
        Some(id) if !id.trim().is_empty() => Ok(TransactionId::from_raw(id)),
        _ => Err(TransactionError::MissingNaturalId),
    }
}

fn parse_event_date(
    raw: Option<String>,
    now: DateTime<Utc>,
) -> Result<DateTime<Utc>, TransactionError> {
    match raw {
        Some(s) => DateTime::parse_from_rfc3339(&s)
            .map(|dt| dt.with_timezone(&Utc))
            .map_err(|err| {
                TransactionError::EventProcessing(format!("unparseable event date: {err}"))
            }),
        None => Ok(now),
    }
}

#[allow(clippy::too_many_arguments)]
fn ingested_record(
    id: TransactionId,
    customer_id: CustomerId,
    movement: MovementType,
    origin: Channel,
    amount: Decimal,
    event_date: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Transaction {
    Transaction {
        id,
        customer_id,
        debtor_id: None,
        payer_id: None,
        product_id: None,
        account_id: None,
        operation_type_id: None,
        destination_account_id: None,
        movement,
        origin,
        state: TransactionState::Active,
        status: TransactionStatus::Pending,
        amount,
        commission_applied: Decimal::ZERO,
        event_date,
        description: None,
        created_at: now,
        updated_at: now,
        version: 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    use crate::events::bus::InMemoryBroker;
    use tresora_store::memory::InMemoryLedgerStore;

    fn ingestor() -> (
        Arc<InMemoryLedgerStore>,
        Arc<InMemoryBroker>,
        EventIngestor<InMemoryLedgerStore, InMemoryBroker>,
    ) {
        let store = Arc::new(InMemoryLedgerStore::new());
        let broker = Arc::new(InMemoryBroker::new());
        let ingestor = EventIngestor::new(
            Arc::clone(&store),
            Arc::clone(&broker),
            AppConfig::default(),
        );
        (store, broker, ingestor)
    }

    fn created_envelope(natural_id: Option<&str>, amount: &str) -> Envelope {
        Envelope {
            topic: "transaction.created".into(),
            key: Some("c-1".into()),
            payload: json!({
                "transactionId": natural_id,
                "customerId": "c-1",
                "accountId": "a-1",
                "movement": "DEPOSIT",
                "origin": "MOBILE_APP",
                "amount": amount,
                "eventDate": "2026-08-27T10:00:00Z",
                "description": "ingested"
            }),
        }
    }

    async fn dead_letters(broker: &InMemoryBroker) -> Vec<Envelope> {
        broker.records("transaction.dead.letter").await
    }

    #[tokio::test]
    async fn test_created_event_lands_active_pending() {
        let (store, broker, ingestor) = ingestor();

        ingestor.handle(created_envelope(Some("evt-1"), "125.50")).await;

        let tx = store
            .find_by_id(&TransactionId::from_raw("evt-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.state, TransactionState::Active);
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert_eq!(tx.amount, dec!(125.50));
        assert_eq!(tx.movement, MovementType::Deposit);
        assert_eq!(tx.description.as_deref(), Some("ingested"));
        assert!(dead_letters(&broker).await.is_empty());
    }

    #[tokio::test]
    async fn test_replay_overwrites_instead_of_duplicating() {
        let (store, broker, ingestor) = ingestor();

        ingestor.handle(created_envelope(Some("evt-1"), "10")).await;
        ingestor.handle(created_envelope(Some("evt-1"), "10")).await;

        assert_eq!(store.len().await, 1);
        let tx = store
            .find_by_id(&TransactionId::from_raw("evt-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.version, 2);
        assert!(dead_letters(&broker).await.is_empty());
    }

    #[tokio::test]
    async fn test_missing_natural_id_dead_letters() {
        let (store, broker, ingestor) = ingestor();

        ingestor.handle(created_envelope(None, "10")).await;

        assert!(store.is_empty().await);
        let dead = dead_letters(&broker).await;
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].payload["errorCode"], "MISSING_NATURAL_ID");
        assert_eq!(dead[0].payload["sourceTopic"], "transaction.created");
    }

    #[tokio::test]
    async fn test_non_positive_amount_dead_letters() {
        let (store, broker, ingestor) = ingestor();

        ingestor.handle(created_envelope(Some("evt-1"), "0")).await;

        assert!(store.is_empty().await);
        let dead = dead_letters(&broker).await;
        assert_eq!(dead[0].payload["errorCode"], "INVALID_AMOUNT");
    }

    #[tokio::test]
    async fn test_unparseable_event_date_dead_letters() {
        let (_, broker, ingestor) = ingestor();

        let mut envelope = created_envelope(Some("evt-1"), "10");
        envelope.payload["eventDate"] = json!("yesterday-ish");
        ingestor.handle(envelope).await;

        let dead = dead_letters(&broker).await;
        assert_eq!(dead[0].payload["errorCode"], "EVENT_PROCESSING_ERROR");
    }

    #[tokio::test]
    async fn test_malformed_payload_dead_letters() {
        let (_, broker, ingestor) = ingestor();

        ingestor
            .handle(Envelope {
                topic: "transaction.created".into(),
                key: None,
                payload: json!({"movement": "NOT_A_MOVEMENT"}),
            })
            .await;

        let dead = dead_letters(&broker).await;
        assert_eq!(dead[0].payload["errorCode"], "EVENT_PROCESSING_ERROR");
        assert_eq!(dead[0].key.as_deref(), Some("unkeyed"));
    }

    #[tokio::test]
    async fn test_unknown_topic_dead_letters() {
        let (_, broker, ingestor) = ingestor();

        ingestor
            .handle(Envelope {
                topic: "some.other.topic".into(),
                key: Some("k".into()),
                payload: json!({}),
            })
            .await;

        let dead = dead_letters(&broker).await;
        assert_eq!(dead.len(), 1);
        assert_eq!(dead[0].payload["sourceTopic"], "some.other.topic");
    }

    #[tokio::test]
    async fn test_third_party_payment_carries_debtor_and_payer() {
        let (store, _, ingestor) = ingestor();

        ingestor
            .handle(Envelope {
                topic: "third.party.credit.payment.requested".into(),
                key: Some("debtor-1".into()),
                payload: json!({
                    "paymentId": "pay-1",
                    "debtorId": "debtor-1",
                    "payerId": "payer-9",
                    "customerId": "c-1",
                    "amount": "50",
                    "eventDate": null
                }),
            })
            .await;

        let tx = store
            .find_by_id(&TransactionId::from_raw("pay-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.movement, MovementType::CreditPayment);
        assert_eq!(tx.debtor_id, Some(DebtorId::from_raw("debtor-1")));
        assert_eq!(tx.payer_id, Some(DebtorId::from_raw("payer-9")));
        assert_eq!(tx.status, TransactionStatus::Pending);
    }

    #[tokio::test]
    async fn test_debit_card_payment_reclassified_and_capped() {
        let (store, broker, ingestor) = ingestor();

        let payload = |id: &str, amount: &str| {
            json!({
                "paymentId": id,
                "customerId": "c-1",
                "productId": "card-1",
                "accountId": "a-1",
                "amount": amount,
                "eventDate": null
            })
        };

        ingestor
            .handle(Envelope {
                topic: "debit.card.payment.requested".into(),
                key: None,
                payload: payload("pay-1", "250"),
            })
            .await;
        let tx = store
            .find_by_id(&TransactionId::from_raw("pay-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.movement, MovementType::Payment);
        assert_eq!(tx.origin, Channel::DebitCard);

        ingestor
            .handle(Envelope {
                topic: "debit.card.payment.requested".into(),
                key: None,
                payload: payload("pay-2", "10000.01"),
            })
            .await;
        let dead = dead_letters(&broker).await;
        assert_eq!(dead[0].payload["errorCode"], "AMOUNT_EXCEEDS_CEILING");
    }

    #[tokio::test]
    async fn test_ordered_withdrawal_ingested_negated() {
        let (store, _, ingestor) = ingestor();

        ingestor
            .handle(Envelope {
                topic: "ordered.debit.withdrawal.requested".into(),
                key: None,
                payload: json!({
                    "withdrawalId": "wd-1",
                    "customerId": "c-1",
                    "productId": "card-1",
                    "amount": "150",
                    "eventDate": null
                }),
            })
            .await;

        let tx = store
            .find_by_id(&TransactionId::from_raw("wd-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.movement, MovementType::DebitWithdrawal);
        assert_eq!(tx.amount, dec!(-150));
    }

    #[tokio::test]
    async fn test_external_transfer_keeps_destination() {
        let (store, _, ingestor) = ingestor();

        ingestor
            .handle(Envelope {
                topic: "ordered.external.transfer.requested".into(),
                key: None,
                payload: json!({
                    "transferId": "tr-1",
                    "customerId": "c-1",
                    "accountId": "a-1",
                    "destinationAccountId": "ext-77",
                    "amount": "300",
                    "eventDate": null
                }),
            })
            .await;

        let tx = store
            .find_by_id(&TransactionId::from_raw("tr-1"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(tx.movement, MovementType::TransferExternal);
        assert_eq!(
            tx.destination_account_id,
            Some(AccountId::from_raw("ext-77"))
        );
    }
}
