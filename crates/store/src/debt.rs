//! Debt store contract.

use tresora_core::debt::Debt;
use tresora_core::error::TransactionError;
use tresora_shared::types::DebtorId;

/// Durable keyed storage for debt records.
///
/// Debts are created outside this system; the engine only reads them by
/// debtor and writes back reduced remaining amounts.
#[allow(async_fn_in_trait)]
pub trait DebtStore: Send + Sync {
    /// Looks up the open debt for a debtor.
    async fn find_by_debtor(&self, debtor_id: &DebtorId)
    -> Result<Option<Debt>, TransactionError>;

    /// Persists a debt record.
    async fn save(&self, debt: Debt) -> Result<Debt, TransactionError>;
}
