//! Ordered multi-account withdrawal selection.
//!
//! Given a withdrawal request and the product's ACTIVE transactions in
//! recency order, pick the first account whose available balance covers the
//! request. Balances are computed from history, not from a materialized
//! balance field.

use std::collections::HashMap;

use rust_decimal::Decimal;
use tresora_shared::types::AccountId;

use crate::error::TransactionError;
use crate::transaction::Transaction;

/// How candidate balances are evaluated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionMode {
    /// Only the most recent transaction is considered; its stored amount is
    /// treated as the account's current balance.
    SingleSource,
    /// All transactions are grouped by account (preserving first-seen
    /// order) and signed amounts are summed per account.
    Aggregate,
}

/// The account chosen to fund a withdrawal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    /// The selected account.
    pub account_id: AccountId,
    /// The balance that qualified the account.
    pub available: Decimal,
}

/// Selects the first account able to fund `requested`.
///
/// `recent_first` must be the product's ACTIVE transactions ordered most
/// recent first; transactions without an account id are skipped. No side
/// effects: persisting the resulting `DEBIT_WITHDRAWAL` is the caller's job.
///
/// # Errors
///
/// - `TransactionError::InvalidAmount` if `requested` is not positive.
/// - `TransactionError::InsufficientFunds` if no account qualifies.
pub fn select_account(
    requested: Decimal,
    recent_first: &[Transaction],
    mode: SelectionMode,
) -> Result<Selection, TransactionError> {
    if requested <= Decimal::ZERO {
        return Err(TransactionError::InvalidAmount);
    }

    match mode {
        SelectionMode::SingleSource => single_source(requested, recent_first),
        SelectionMode::Aggregate => aggregate(requested, recent_first),
    }
}

fn single_source(
    requested: Decimal,
    recent_first: &[Transaction],
) -> Result<Selection, TransactionError> {
    let latest = recent_first
        .iter()
        .find_map(|tx| tx.account_id.clone().map(|account| (account, tx.amount)));

    match latest {
        Some((account_id, balance)) if balance >= requested => Ok(Selection {
            account_id,
            available: balance,
        }),
        _ => Err(TransactionError::InsufficientFunds { requested }),
    }
}

fn aggregate(
    requested: Decimal,
    recent_first: &[Transaction],
) -> Result<Selection, TransactionError> {
    // First-seen order decides priority; sums need the whole history.
    let mut order: Vec<AccountId> = Vec::new();
    let mut balances: HashMap<AccountId, Decimal> = HashMap::new();

    for tx in recent_first {
        let Some(account_id) = tx.account_id.clone() else {
            continue;
        };
        if !balances.contains_key(&account_id) {
            order.push(account_id.clone());
        }
        *balances.entry(account_id).or_insert(Decimal::ZERO) += tx.amount;
    }

    for account_id in order {
        let available = balances[&account_id];
        if available >= requested {
            return Ok(Selection {
                account_id,
                available,
            });
        }
    }

    Err(TransactionError::InsufficientFunds { requested })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use rust_decimal_macros::dec;
    use tresora_shared::types::{CustomerId, ProductId, TransactionId};

    use crate::transaction::{Channel, MovementType, TransactionState, TransactionStatus};

    fn tx(account: &str, amount: Decimal) -> Transaction {
        let now = Utc::now();
        Transaction {
            id: TransactionId::new(),
            customer_id: CustomerId::from_raw("c-1"),
            debtor_id: None,
            payer_id: None,
            product_id: Some(ProductId::from_raw("card-1")),
            account_id: Some(AccountId::from_raw(account)),
            operation_type_id: None,
            destination_account_id: None,
            movement: MovementType::Deposit,
            origin: Channel::DebitCard,
            state: TransactionState::Active,
            status: TransactionStatus::Completed,
            amount,
            commission_applied: Decimal::ZERO,
            event_date: now,
            description: None,
            created_at: now,
            updated_at: now,
            version: 1,
        }
    }

    #[test]
    fn test_aggregate_picks_first_account_that_covers() {
        // A1 aggregates to 100, A2 to 200; a 150 withdrawal lands on A2.
        let history = vec![tx("A1", dec!(60)), tx("A2", dec!(200)), tx("A1", dec!(40))];

        let selection =
            select_account(dec!(150), &history, SelectionMode::Aggregate).unwrap();
        assert_eq!(selection.account_id, AccountId::from_raw("A2"));
        assert_eq!(selection.available, dec!(200));
    }

    #[test]
    fn test_aggregate_respects_first_seen_order() {
        // Both accounts qualify; the one seen first in recency order wins.
        let history = vec![tx("A1", dec!(500)), tx("A2", dec!(900))];

        let selection =
            select_account(dec!(100), &history, SelectionMode::Aggregate).unwrap();
        assert_eq!(selection.account_id, AccountId::from_raw("A1"));
    }

    #[test]
    fn test_aggregate_sums_signed_amounts() {
        // A1's withdrawals pull its balance under the request.
        let history = vec![
            tx("A1", dec!(-80)),
            tx("A1", dec!(150)),
            tx("A2", dec!(100)),
        ];

        let selection =
            select_account(dec!(100), &history, SelectionMode::Aggregate).unwrap();
        assert_eq!(selection.account_id, AccountId::from_raw("A2"));
    }

    #[test]
    fn test_aggregate_no_account_qualifies() {
        let history = vec![tx("A1", dec!(50)), tx("A2", dec!(20))];

        let result = select_account(dec!(150), &history, SelectionMode::Aggregate);
        assert!(matches!(
            result,
            Err(TransactionError::InsufficientFunds { requested }) if requested == dec!(150)
        ));
    }

    #[test]
    fn test_single_source_uses_latest_only() {
        // Latest transaction holds 80; older history is ignored.
        let history = vec![tx("A1", dec!(80)), tx("A1", dec!(500))];

        let result = select_account(dec!(100), &history, SelectionMode::SingleSource);
        assert!(matches!(
            result,
            Err(TransactionError::InsufficientFunds { .. })
        ));

        let selection =
            select_account(dec!(50), &history, SelectionMode::SingleSource).unwrap();
        assert_eq!(selection.account_id, AccountId::from_raw("A1"));
        assert_eq!(selection.available, dec!(80));
    }

    #[test]
    fn test_empty_history_is_insufficient() {
        for mode in [SelectionMode::SingleSource, SelectionMode::Aggregate] {
            assert!(matches!(
                select_account(dec!(10), &[], mode),
                Err(TransactionError::InsufficientFunds { .. })
            ));
        }
    }

    #[test]
    fn test_non_positive_request_rejected() {
        let history = vec![tx("A1", dec!(100))];
        assert!(matches!(
            select_account(dec!(0), &history, SelectionMode::Aggregate),
            Err(TransactionError::InvalidAmount)
        ));
    }
}
