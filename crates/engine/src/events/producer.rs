//! Best-effort outbound announcements.
//!
//! Publishing is fire-and-forget from the write path's point of view: a
//! persisted transaction is the source of truth, and a failed publish is
//! logged, never surfaced to the caller.

use std::sync::Arc;

use tracing::{debug, warn};

use tresora_core::error::TransactionError;
use tresora_core::transaction::{MovementType, NewTransaction};
use tresora_shared::config::BrokerConfig;
use tresora_store::ledger::LedgerStore;

use super::bus::EventPublisher;
use super::types::{
    CreditPaymentRequested, ExternalTransferRequested, OrderedDebitWithdrawalRequested,
    TransactionCreated,
};
use crate::lifecycle::TransactionManager;
use crate::view::TransactionView;

/// Announces persisted transactions on the topic matching their movement.
#[derive(Debug, Clone)]
pub struct TransactionEventPublisher<P> {
    bus: Arc<P>,
    config: BrokerConfig,
}

impl<P: EventPublisher> TransactionEventPublisher<P> {
    /// Creates a publisher over a broker handle.
    pub fn new(bus: Arc<P>, config: BrokerConfig) -> Self {
        Self { bus, config }
    }

    /// Publishes the announcement for a persisted transaction.
    ///
    /// Credit payments, external transfers, and debit withdrawals go to
    /// their dedicated topics; everything else is announced as a created
    /// transaction. Records are keyed by the transaction's natural id so
    /// per-key broker ordering and downstream replay line up with the
    /// ledger record. Failures are logged and swallowed.
    pub async fn announce(&self, view: &TransactionView) {
        let (topic, payload) = match self.payload_for(view) {
            Ok(pair) => pair,
            Err(err) => {
                warn!(id = %view.id, error = %err, "event serialization failed, not published");
                return;
            }
        };

        match self.bus.publish(topic, view.id.as_str(), payload).await {
            Ok(ack) => debug!(
                id = %view.id,
                topic,
                partition = ack.partition,
                offset = ack.offset,
                "event published"
            ),
            Err(err) => warn!(id = %view.id, topic, error = %err, "event publish failed"),
        }
    }

    fn payload_for(
        &self,
        view: &TransactionView,
    ) -> Result<(&str, serde_json::Value), serde_json::Error> {
        let event_date = Some(view.event_date.to_rfc3339());
        match view.movement {
            MovementType::CreditPayment => Ok((
                self.config.credit_payment_topic.as_str(),
                serde_json::to_value(CreditPaymentRequested {
                    payment_id: Some(view.id.as_str().to_string()),
                    customer_id: view.customer_id.as_str().to_string(),
                    amount: view.amount,
                    event_date,
                    description: view.description.clone(),
                })?,
            )),
            MovementType::TransferExternal => Ok((
                self.config.external_transfer_topic.as_str(),
                serde_json::to_value(ExternalTransferRequested {
                    transfer_id: Some(view.id.as_str().to_string()),
                    customer_id: view.customer_id.as_str().to_string(),
                    account_id: view.account_id.as_ref().map(|a| a.as_str().to_string()),
                    destination_account_id: view
                        .destination_account_id
                        .as_ref()
                        .map(|a| a.as_str().to_string()),
                    amount: view.amount,
                    event_date,
                })?,
            )),
            MovementType::DebitWithdrawal => Ok((
                self.config.ordered_debit_withdrawal_topic.as_str(),
                serde_json::to_value(OrderedDebitWithdrawalRequested {
                    withdrawal_id: Some(view.id.as_str().to_string()),
                    customer_id: view.customer_id.as_str().to_string(),
                    product_id: view.product_id.as_ref().map(|p| p.as_str().to_string()),
                    amount: view.amount,
                    event_date,
                })?,
            )),
            _ => Ok((
                self.config.transaction_created_topic.as_str(),
                serde_json::to_value(TransactionCreated {
                    transaction_id: Some(view.id.as_str().to_string()),
                    customer_id: view.customer_id.as_str().to_string(),
                    account_id: view.account_id.as_ref().map(|a| a.as_str().to_string()),
                    movement: view.movement,
                    origin: view.origin,
                    amount: view.amount,
                    event_date,
                    description: view.description.clone(),
                })?,
            )),
        }
    }
}

/// Write facade that announces every successful creation on the broker.
///
/// The ledger write is the source of truth; the announcement rides behind
/// it best-effort, exactly like the bare publisher.
#[derive(Debug, Clone)]
pub struct PublishingManager<S, P> {
    manager: TransactionManager<S>,
    publisher: TransactionEventPublisher<P>,
}

impl<S: LedgerStore, P: EventPublisher> PublishingManager<S, P> {
    /// Couples a lifecycle manager with an event publisher.
    pub fn new(manager: TransactionManager<S>, publisher: TransactionEventPublisher<P>) -> Self {
        Self { manager, publisher }
    }

    /// Creates a transaction and announces it.
    pub async fn create(
        &self,
        request: NewTransaction,
    ) -> Result<TransactionView, TransactionError> {
        let view = self.manager.create(request).await?;
        self.publisher.announce(&view).await;
        Ok(view)
    }
}
