//! Closed-form fixed payment solver.

use rust_decimal::Decimal;

use crate::error::ProjectionResult;
use crate::numeric::{
    checked_div, checked_mul, compound_factor, ensure_non_negative, ensure_nonzero_count,
    ensure_positive,
};

/// Calculates the fixed periodic payment that fully retires `principal` over
/// `num_periods` at `periodic_rate`.
///
/// The annuity formula is: PMT = P * [i(1 + i)^n] / [(1 + i)^n – 1]
///
/// At a zero rate the formula divides by zero, so the payment is the
/// straight-line `P / n` instead.
///
/// # Arguments
///
/// * `principal` - The amount outstanding at period 0.
/// * `periodic_rate` - The interest rate per period as a decimal (not percentage).
/// * `num_periods` - The total number of payments.
///
/// # Errors
///
/// Returns `InvalidInput` if `principal <= 0`, `periodic_rate < 0` or
/// `num_periods == 0`, and `NumericOverflow` if the payment does not fit a
/// `Decimal`.
pub fn amortized_payment(
    principal: Decimal,
    periodic_rate: Decimal,
    num_periods: u32,
) -> ProjectionResult<Decimal> {
    ensure_positive("principal", principal)?;
    ensure_non_negative("periodic_rate", periodic_rate)?;
    ensure_nonzero_count("num_periods", num_periods)?;

    if periodic_rate.is_zero() {
        return Ok(principal / Decimal::from(num_periods));
    }

    let i_plus_1_pow_n = compound_factor(periodic_rate, num_periods)?;
    let rate_factor = checked_mul(periodic_rate, i_plus_1_pow_n, "amortized payment numerator")?;
    let numerator = checked_mul(principal, rate_factor, "amortized payment numerator")?;

    checked_div(numerator, i_plus_1_pow_n - Decimal::ONE, "amortized payment")
}
