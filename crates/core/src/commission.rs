//! Per-account commission policy.
//!
//! A movement incurs a fixed fee once the account has exhausted its free
//! quota of transactions of the same movement type. The prior count comes
//! from a single store query issued by the caller; the read-count-then-write
//! sequence is an accepted approximation under concurrent writers, not a
//! strict quota.

use rust_decimal::Decimal;
use tresora_shared::config::CommissionConfig;

use crate::transaction::MovementType;

/// Computes the commission for a movement.
///
/// Returns the configured fixed fee when the movement type is commissionable
/// (deposits and withdrawals) and `prior_count` has reached the free limit;
/// otherwise returns zero. Pure: configuration is passed in explicitly.
#[must_use]
pub fn fee_for(movement: MovementType, prior_count: u64, config: &CommissionConfig) -> Decimal {
    if movement.is_commissionable() && prior_count >= config.free_transaction_limit {
        config.fee
    } else {
        Decimal::ZERO
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    fn config() -> CommissionConfig {
        CommissionConfig {
            free_transaction_limit: 5,
            fee: dec!(2.50),
        }
    }

    #[rstest]
    #[case(MovementType::Deposit, 4, dec!(0))]
    #[case(MovementType::Deposit, 5, dec!(2.50))]
    #[case(MovementType::Deposit, 6, dec!(2.50))]
    #[case(MovementType::Withdrawal, 5, dec!(2.50))]
    #[case(MovementType::Withdrawal, 0, dec!(0))]
    fn test_fee_boundary_at_free_limit(
        #[case] movement: MovementType,
        #[case] prior_count: u64,
        #[case] expected: Decimal,
    ) {
        assert_eq!(fee_for(movement, prior_count, &config()), expected);
    }

    #[rstest]
    #[case(MovementType::TransferInternal)]
    #[case(MovementType::TransferExternal)]
    #[case(MovementType::CreditCharge)]
    #[case(MovementType::CreditPayment)]
    #[case(MovementType::DebitCardCharge)]
    #[case(MovementType::DebitCardPayment)]
    fn test_non_commissionable_types_never_charged(#[case] movement: MovementType) {
        assert_eq!(fee_for(movement, 1_000, &config()), Decimal::ZERO);
    }

    #[test]
    fn test_sixth_deposit_pays_the_fee() {
        // Scenario: 5 prior deposits on the account, the 6th pays 2.50.
        assert_eq!(fee_for(MovementType::Deposit, 5, &config()), dec!(2.50));
    }
}
