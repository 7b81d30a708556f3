//! Application configuration management.

use rust_decimal::Decimal;
use serde::Deserialize;

/// Application configuration.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    /// Commission policy configuration.
    #[serde(default)]
    pub commission: CommissionConfig,
    /// Debit card limits.
    #[serde(default)]
    pub debit_card: DebitCardConfig,
    /// Read-through cache TTLs.
    #[serde(default)]
    pub cache: CacheConfig,
    /// Broker topics and consumer settings.
    #[serde(default)]
    pub broker: BrokerConfig,
    /// Operation deadlines.
    #[serde(default)]
    pub timeouts: TimeoutConfig,
}

/// Operation deadlines, in milliseconds.
#[derive(Debug, Clone, Deserialize)]
pub struct TimeoutConfig {
    /// Deadline for a single store-touching manager operation.
    #[serde(default = "default_operation_timeout_ms")]
    pub operation_ms: u64,
}

fn default_operation_timeout_ms() -> u64 {
    5_000
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self {
            operation_ms: default_operation_timeout_ms(),
        }
    }
}

/// Commission policy configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct CommissionConfig {
    /// Number of free transactions per account and movement type.
    #[serde(default = "default_free_transaction_limit")]
    pub free_transaction_limit: u64,
    /// Fixed fee applied once the free limit is exhausted.
    #[serde(default = "default_commission_fee")]
    pub fee: Decimal,
}

fn default_free_transaction_limit() -> u64 {
    5
}

fn default_commission_fee() -> Decimal {
    // 2.50
    Decimal::new(250, 2)
}

impl Default for CommissionConfig {
    fn default() -> Self {
        Self {
            free_transaction_limit: default_free_transaction_limit(),
            fee: default_commission_fee(),
        }
    }
}

/// Debit card limits.
#[derive(Debug, Clone, Deserialize)]
pub struct DebitCardConfig {
    /// Maximum amount accepted for a single debit-card payment.
    #[serde(default = "default_payment_ceiling")]
    pub payment_ceiling: Decimal,
}

fn default_payment_ceiling() -> Decimal {
    Decimal::new(10_000, 0)
}

impl Default for DebitCardConfig {
    fn default() -> Self {
        Self {
            payment_ceiling: default_payment_ceiling(),
        }
    }
}

/// Read-through cache TTLs, in seconds.
#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// TTL for lookup-by-id entries.
    #[serde(default = "default_by_id_ttl")]
    pub by_id_ttl_secs: u64,
    /// TTL for active-lookup-by-id entries.
    #[serde(default = "default_active_ttl")]
    pub active_ttl_secs: u64,
    /// TTL for last-transaction-by-customer entries.
    #[serde(default = "default_last_ttl")]
    pub last_ttl_secs: u64,
}

fn default_by_id_ttl() -> u64 {
    900 // 15 minutes
}

fn default_active_ttl() -> u64 {
    300 // 5 minutes
}

fn default_last_ttl() -> u64 {
    600 // 10 minutes
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            by_id_ttl_secs: default_by_id_ttl(),
            active_ttl_secs: default_active_ttl(),
            last_ttl_secs: default_last_ttl(),
        }
    }
}

/// Broker topics and consumer settings.
#[derive(Debug, Clone, Deserialize)]
pub struct BrokerConfig {
    /// Topic for transaction-created events.
    #[serde(default = "default_transaction_created_topic")]
    pub transaction_created_topic: String,
    /// Topic for credit-payment-requested events.
    #[serde(default = "default_credit_payment_topic")]
    pub credit_payment_topic: String,
    /// Topic for debit-card-payment-requested events.
    #[serde(default = "default_debit_card_payment_topic")]
    pub debit_card_payment_topic: String,
    /// Topic for third-party-credit-payment-requested events.
    #[serde(default = "default_third_party_credit_payment_topic")]
    pub third_party_credit_payment_topic: String,
    /// Topic for external-transfer-requested events.
    #[serde(default = "default_external_transfer_topic")]
    pub external_transfer_topic: String,
    /// Topic for ordered-debit-withdrawal-requested events.
    #[serde(default = "default_ordered_debit_withdrawal_topic")]
    pub ordered_debit_withdrawal_topic: String,
    /// Topic that receives events the pipeline could not process.
    #[serde(default = "default_dead_letter_topic")]
    pub dead_letter_topic: String,
    /// Deadline for handling a single consumed event, in milliseconds.
    #[serde(default = "default_handler_timeout_ms")]
    pub handler_timeout_ms: u64,
}

fn default_transaction_created_topic() -> String {
    "transaction.created".to_string()
}

fn default_credit_payment_topic() -> String {
    "credit.payment.requested".to_string()
}

fn default_debit_card_payment_topic() -> String {
    "debit.card.payment.requested".to_string()
}

fn default_third_party_credit_payment_topic() -> String {
    "third.party.credit.payment.requested".to_string()
}

fn default_external_transfer_topic() -> String {
    "ordered.external.transfer.requested".to_string()
}

fn default_ordered_debit_withdrawal_topic() -> String {
    "ordered.debit.withdrawal.requested".to_string()
}

fn default_dead_letter_topic() -> String {
    "transaction.dead.letter".to_string()
}

fn default_handler_timeout_ms() -> u64 {
    5_000
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            transaction_created_topic: default_transaction_created_topic(),
            credit_payment_topic: default_credit_payment_topic(),
            debit_card_payment_topic: default_debit_card_payment_topic(),
            third_party_credit_payment_topic: default_third_party_credit_payment_topic(),
            external_transfer_topic: default_external_transfer_topic(),
            ordered_debit_withdrawal_topic: default_ordered_debit_withdrawal_topic(),
            dead_letter_topic: default_dead_letter_topic(),
            handler_timeout_ms: default_handler_timeout_ms(),
        }
    }
}

impl AppConfig {
    /// Loads configuration from environment and config files.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration cannot be loaded.
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = std::env::var("RUN_MODE").unwrap_or_else(|_| "development".to_string());

        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{run_mode}")).required(false))
            .add_source(config::Environment::with_prefix("TRESORA").separator("__"))
            .build()?;

        config.try_deserialize()
    }
}
