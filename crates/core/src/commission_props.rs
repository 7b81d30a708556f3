//! Property-based tests for the commission policy.

use proptest::prelude::*;
use rust_decimal::Decimal;
use tresora_shared::config::CommissionConfig;

use crate::commission::fee_for;
use crate::transaction::MovementType;

/// Strategy to generate any movement type.
fn movement_strategy() -> impl Strategy<Value = MovementType> {
    prop_oneof![
        Just(MovementType::Deposit),
        Just(MovementType::Withdrawal),
        Just(MovementType::Payment),
        Just(MovementType::CreditCharge),
        Just(MovementType::CreditPayment),
        Just(MovementType::TransferInternal),
        Just(MovementType::TransferExternal),
        Just(MovementType::DebitCardCharge),
        Just(MovementType::DebitWithdrawal),
        Just(MovementType::DebitCardPayment),
    ]
}

/// Strategy to generate a commission configuration with a positive fee.
fn config_strategy() -> impl Strategy<Value = CommissionConfig> {
    (0u64..50, 1i64..100_000).prop_map(|(limit, fee_cents)| CommissionConfig {
        free_transaction_limit: limit,
        fee: Decimal::new(fee_cents, 2),
    })
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(100))]

    /// The fee is either zero or exactly the configured amount, nothing else.
    #[test]
    fn prop_fee_is_zero_or_fixed(
        movement in movement_strategy(),
        prior_count in 0u64..1_000,
        config in config_strategy(),
    ) {
        let fee = fee_for(movement, prior_count, &config);
        prop_assert!(
            fee == Decimal::ZERO || fee == config.fee,
            "fee {fee} is neither zero nor the configured {}",
            config.fee
        );
    }

    /// Commissionable movements at or past the free limit always pay the fee.
    #[test]
    fn prop_past_limit_always_charged(
        extra in 0u64..1_000,
        config in config_strategy(),
    ) {
        let count = config.free_transaction_limit + extra;
        prop_assert_eq!(fee_for(MovementType::Deposit, count, &config), config.fee);
        prop_assert_eq!(fee_for(MovementType::Withdrawal, count, &config), config.fee);
    }

    /// Below the free limit nothing is ever charged.
    #[test]
    fn prop_below_limit_never_charged(
        movement in movement_strategy(),
        config in config_strategy(),
    ) {
        prop_assume!(config.free_transaction_limit > 0);
        let count = config.free_transaction_limit - 1;
        prop_assert_eq!(fee_for(movement, count, &config), Decimal::ZERO);
    }

    /// Non-commissionable movements never pay, whatever the count.
    #[test]
    fn prop_non_commissionable_free(
        movement in movement_strategy(),
        prior_count in 0u64..10_000,
        config in config_strategy(),
    ) {
        prop_assume!(!movement.is_commissionable());
        prop_assert_eq!(fee_for(movement, prior_count, &config), Decimal::ZERO);
    }
}
