//! Property-based tests for the ordered withdrawal selector.

use chrono::Utc;
use proptest::prelude::*;
use rust_decimal::Decimal;
use std::collections::HashMap;
use tresora_shared::types::{AccountId, CustomerId, ProductId, TransactionId};

use crate::error::TransactionError;
use crate::transaction::{
    Channel, MovementType, Transaction, TransactionState, TransactionStatus,
};
use crate::withdrawal::{SelectionMode, select_account};

fn tx(account: u8, amount: Decimal) -> Transaction {
    let now = Utc::now();
    Transaction {
        id: TransactionId::new(),
        customer_id: CustomerId::from_raw("c-1"),
        debtor_id: None,
        payer_id: None,
        product_id: Some(ProductId::from_raw("card-1")),
        account_id: Some(AccountId::from_raw(format!("A{account}"))),
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

/// Strategy: a history of up to 20 transactions over up to 5 accounts with
/// signed amounts.
fn history_strategy() -> impl Strategy<Value = Vec<Transaction>> {
    prop::collection::vec(
        (0u8..5, -50_000i64..50_000).prop_map(|(acct, cents)| tx(acct, Decimal::new(cents, 2))),
        0..20,
    )
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The selector never picks an account whose aggregated balance is
    /// below the requested amount.
    #[test]
    fn prop_selected_account_always_covers(
        history in history_strategy(),
        requested_cents in 1i64..100_000,
    ) {
        let requested = Decimal::new(requested_cents, 2);

        if let Ok(selection) = select_account(requested, &history, SelectionMode::Aggregate) {
            let mut balances: HashMap<AccountId, Decimal> = HashMap::new();
            for t in &history {
                if let Some(account) = t.account_id.clone() {
                    *balances.entry(account).or_insert(Decimal::ZERO) += t.amount;
                }
            }
            prop_assert!(balances[&selection.account_id] >= requested);
            prop_assert_eq!(selection.available, balances[&selection.account_id]);
        }
    }

    /// Failure is exactly "no account covers the request".
    #[test]
    fn prop_insufficient_iff_no_account_covers(
        history in history_strategy(),
        requested_cents in 1i64..100_000,
    ) {
        let requested = Decimal::new(requested_cents, 2);

        let mut balances: HashMap<AccountId, Decimal> = HashMap::new();
        for t in &history {
            if let Some(account) = t.account_id.clone() {
                *balances.entry(account).or_insert(Decimal::ZERO) += t.amount;
            }
        }
        let any_covers = balances.values().any(|b| *b >= requested);

        let result = select_account(requested, &history, SelectionMode::Aggregate);
        match result {
            Ok(_) => prop_assert!(any_covers),
            Err(TransactionError::InsufficientFunds { requested: r }) => {
                prop_assert!(!any_covers);
                prop_assert_eq!(r, requested);
            }
            Err(other) => prop_assert!(false, "unexpected error: {other:?}"),
        }
    }

    /// Single-source mode only ever selects the most recent transaction's
    /// account.
    #[test]
    fn prop_single_source_selects_latest(
        history in history_strategy(),
        requested_cents in 1i64..100_000,
    ) {
        let requested = Decimal::new(requested_cents, 2);

        if let Ok(selection) = select_account(requested, &history, SelectionMode::SingleSource) {
            let latest = history
                .iter()
                .find_map(|t| t.account_id.clone())
                .expect("selection implies a candidate");
            prop_assert_eq!(selection.account_id, latest);
        }
    }
}
