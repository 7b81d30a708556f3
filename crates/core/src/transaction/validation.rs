//! Amount validation rules.
//!
//! Every creation flow runs the positive-amount check; debit-card payments
//! additionally enforce a configured ceiling.

use rust_decimal::Decimal;

use crate::error::TransactionError;

/// Validates that an amount is strictly positive.
///
/// # Errors
///
/// Returns `TransactionError::InvalidAmount` for zero or negative amounts.
pub fn validate_amount_positive(amount: Decimal) -> Result<(), TransactionError> {
    if amount <= Decimal::ZERO {
        return Err(TransactionError::InvalidAmount);
    }
    Ok(())
}

/// Validates that an amount does not exceed the given ceiling.
///
/// # Errors
///
/// Returns `TransactionError::AmountExceedsCeiling` when it does.
pub fn validate_amount_within(amount: Decimal, ceiling: Decimal) -> Result<(), TransactionError> {
    if amount > ceiling {
        return Err(TransactionError::AmountExceedsCeiling { amount, ceiling });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rust_decimal_macros::dec;

    #[rstest]
    #[case(dec!(0.01))]
    #[case(dec!(1))]
    #[case(dec!(999999.99))]
    fn test_positive_amounts_accepted(#[case] amount: Decimal) {
        assert!(validate_amount_positive(amount).is_ok());
    }

    #[rstest]
    #[case(dec!(0))]
    #[case(dec!(-0.01))]
    #[case(dec!(-100))]
    fn test_non_positive_amounts_rejected(#[case] amount: Decimal) {
        assert!(matches!(
            validate_amount_positive(amount),
            Err(TransactionError::InvalidAmount)
        ));
    }

    #[test]
    fn test_ceiling_boundary_inclusive() {
        assert!(validate_amount_within(dec!(10000), dec!(10000)).is_ok());
        assert!(matches!(
            validate_amount_within(dec!(10000.01), dec!(10000)),
            Err(TransactionError::AmountExceedsCeiling { .. })
        ));
    }
}
