//! Conversions between the annual percentages users type in and the
//! per-period decimal rates the engine works with.

use rust_decimal::{Decimal, MathematicalOps};
use rust_decimal_macros::dec;

use crate::error::{ProjectionError, ProjectionResult};
use crate::numeric::{
    checked_div, checked_mul, compound_factor, ensure_non_negative, ensure_nonzero_count,
};

/// Converts an annual percentage into a nominal per-period rate.
///
/// `periodic_rate(dec!(8.5), 12)` is `0.085 / 12`, the convention used by
/// every loan and investment calculator.
///
/// # Errors
///
/// Returns `InvalidInput` if the percentage is negative or `periods_per_year`
/// is zero.
pub fn periodic_rate(annual_percent: Decimal, periods_per_year: u32) -> ProjectionResult<Decimal> {
    ensure_non_negative("annual_rate", annual_percent)?;
    ensure_nonzero_count("periods_per_year", periods_per_year)?;

    Ok(annual_percent / dec!(100) / Decimal::from(periods_per_year))
}

/// Normalizes an effective annual interest rate percentage to the equivalent
/// monthly rate.
///
/// Unlike [`periodic_rate`], this compounds back: 12% per year becomes
/// `1.12^(1/12) - 1`, a bit less than 1% per month.
pub fn normalize_annual_interest_rate(annual_percent: Decimal) -> ProjectionResult<Decimal> {
    ensure_non_negative("annual_rate", annual_percent)?;

    let base = Decimal::ONE + annual_percent / dec!(100);
    let exponent = Decimal::ONE / dec!(12);

    base.checked_powd(exponent)
        .map(|monthly| monthly - Decimal::ONE)
        .ok_or_else(|| ProjectionError::overflow(format!("{base}^(1/12)")))
}

/// Grows a value in today's money to its nominal value after `years` of
/// inflation at `annual_rate` (a decimal fraction).
pub fn inflate(amount: Decimal, annual_rate: Decimal, years: u32) -> ProjectionResult<Decimal> {
    ensure_non_negative("inflation_rate", annual_rate)?;
    checked_mul(amount, compound_factor(annual_rate, years)?, "inflated amount")
}

/// Discounts a nominal value `years` from now back to today's money.
pub fn deflate(amount: Decimal, annual_rate: Decimal, years: u32) -> ProjectionResult<Decimal> {
    ensure_non_negative("inflation_rate", annual_rate)?;
    checked_div(amount, compound_factor(annual_rate, years)?, "deflated amount")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(dec!(12), 12, dec!(0.01))]
    #[case(dec!(6), 4, dec!(0.015))]
    #[case(dec!(0), 12, dec!(0))]
    fn test_periodic_rate(#[case] annual: Decimal, #[case] per_year: u32, #[case] expected: Decimal) {
        assert_eq!(periodic_rate(annual, per_year).unwrap(), expected);
    }

    #[test]
    fn test_periodic_rate_rejects_bad_input() {
        assert!(periodic_rate(dec!(-1), 12).is_err());
        assert!(periodic_rate(dec!(5), 0).is_err());
    }

    #[test]
    fn test_normalize_annual_interest_rate() {
        // (1.12)^(1/12) - 1 = 0.009488...
        let monthly_rate = normalize_annual_interest_rate(dec!(12)).unwrap();
        assert!(monthly_rate > dec!(0.0094) && monthly_rate < dec!(0.0095));
    }

    #[test]
    fn test_inflate_and_deflate() {
        assert_eq!(inflate(dec!(100), dec!(0.1), 2).unwrap(), dec!(121));
        assert_eq!(deflate(dec!(121), dec!(0.1), 2).unwrap(), dec!(100));
        assert_eq!(inflate(dec!(100), dec!(0.05), 0).unwrap(), dec!(100));
    }
}
