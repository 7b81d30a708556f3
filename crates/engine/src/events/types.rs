//! Wire payloads exchanged over the broker.
//!
//! Field names are camelCase on the wire. Timestamps travel as RFC 3339
//! strings; amounts as decimal strings. Natural ids are optional at the
//! type level so the ingestor can reject their absence explicitly instead
//! of failing deserialization.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use tresora_core::transaction::{Channel, MovementType};

/// A consumed broker record: topic, partition key, and raw payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope {
    /// Topic the record was read from (or is destined for).
    pub topic: String,
    /// Partition key, when the producer set one.
    pub key: Option<String>,
    /// The payload, kept raw until the topic picks the schema.
    pub payload: serde_json::Value,
}

/// Announcement that a transaction was recorded upstream.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionCreated {
    /// Upstream natural id, reused as the ledger id.
    pub transaction_id: Option<String>,
    /// Owning customer.
    pub customer_id: String,
    /// Account the movement is posted against.
    pub account_id: Option<String>,
    /// Movement classification.
    pub movement: MovementType,
    /// Origin channel.
    pub origin: Channel,
    /// Strictly positive amount.
    pub amount: Decimal,
    /// RFC 3339 timestamp of the movement.
    pub event_date: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

/// Request to record a credit payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreditPaymentRequested {
    /// Upstream natural id, reused as the ledger id.
    pub payment_id: Option<String>,
    /// Owning customer.
    pub customer_id: String,
    /// Strictly positive payment amount.
    pub amount: Decimal,
    /// RFC 3339 timestamp of the payment.
    pub event_date: Option<String>,
    /// Free-form description.
    pub description: Option<String>,
}

/// Request to record a debit-card payment.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DebitCardPaymentRequested {
    /// Upstream natural id, reused as the ledger id.
    pub payment_id: Option<String>,
    /// Owning customer.
    pub customer_id: String,
    /// The card product.
    pub product_id: Option<String>,
    /// Account charged.
    pub account_id: Option<String>,
    /// Strictly positive payment amount.
    pub amount: Decimal,
    /// RFC 3339 timestamp of the payment.
    pub event_date: Option<String>,
}

/// Request to pay a debtor's obligation from a third party.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ThirdPartyCreditPaymentRequested {
    /// Upstream natural id, reused as the ledger id.
    pub payment_id: Option<String>,
    /// The debtor whose obligation is reduced.
    pub debtor_id: String,
    /// The paying third party.
    pub payer_id: String,
    /// The customer on whose ledger the payment lands.
    pub customer_id: String,
    /// Strictly positive payment amount.
    pub amount: Decimal,
    /// RFC 3339 timestamp of the payment.
    pub event_date: Option<String>,
}

/// Request to record an external transfer.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExternalTransferRequested {
    /// Upstream natural id, reused as the ledger id.
    pub transfer_id: Option<String>,
    /// Owning customer.
    pub customer_id: String,
    /// Source account.
    pub account_id: Option<String>,
    /// Destination account at the receiving institution.
    pub destination_account_id: Option<String>,
    /// Strictly positive transfer amount.
    pub amount: Decimal,
    /// RFC 3339 timestamp of the transfer.
    pub event_date: Option<String>,
}

/// Request to withdraw across a card's ordered account list.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderedDebitWithdrawalRequested {
    /// Upstream natural id, reused as the ledger id.
    pub withdrawal_id: Option<String>,
    /// Owning customer.
    pub customer_id: String,
    /// The card product whose accounts fund the withdrawal.
    pub product_id: Option<String>,
    /// Strictly positive withdrawal amount.
    pub amount: Decimal,
    /// RFC 3339 timestamp of the withdrawal.
    pub event_date: Option<String>,
}

/// Payload published to the dead-letter topic for unprocessable records.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DeadLetter {
    /// Topic the original record was read from.
    pub source_topic: String,
    /// Stable error code of the rejection.
    pub error_code: String,
    /// Human-readable rejection reason.
    pub reason: String,
    /// The original payload, untouched.
    pub payload: serde_json::Value,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    #[test]
    fn test_created_payload_round_trips_camel_case() {
        let raw = json!({
            "transactionId": "evt-1",
            "customerId": "c-1",
            "accountId": "a-1",
            "movement": "DEPOSIT",
            "origin": "WEB_PORTAL",
            "amount": "125.50",
            "eventDate": "2026-08-27T10:00:00Z",
            "description": null
        });

        let event: TransactionCreated = serde_json::from_value(raw).unwrap();
        assert_eq!(event.transaction_id.as_deref(), Some("evt-1"));
        assert_eq!(event.movement, MovementType::Deposit);
        assert_eq!(event.amount, dec!(125.50));

        let back = serde_json::to_value(&event).unwrap();
        assert_eq!(back["customerId"], "c-1");
        assert_eq!(back["movement"], "DEPOSIT");
    }

    #[test]
    fn test_missing_natural_id_still_deserializes() {
        let raw = json!({
            "customerId": "c-1",
            "amount": "50",
            "eventDate": null,
            "description": null
        });
        let event: CreditPaymentRequested = serde_json::from_value(raw).unwrap();
        assert!(event.payment_id.is_none());
    }
}
