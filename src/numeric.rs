//! Input guards and overflow-checked helpers shared by the engine components.

use rust_decimal::{Decimal, MathematicalOps};

use crate::error::{ProjectionError, ProjectionResult};

pub const MONTHS_PER_YEAR: u32 = 12;

pub(crate) fn ensure_positive(field: &str, value: Decimal) -> ProjectionResult<()> {
    if value <= Decimal::ZERO {
        return Err(ProjectionError::invalid_input(
            field,
            format!("must be greater than zero, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_non_negative(field: &str, value: Decimal) -> ProjectionResult<()> {
    if value < Decimal::ZERO {
        return Err(ProjectionError::invalid_input(
            field,
            format!("cannot be negative, got {value}"),
        ));
    }
    Ok(())
}

pub(crate) fn ensure_nonzero_count(field: &str, value: u32) -> ProjectionResult<()> {
    if value == 0 {
        return Err(ProjectionError::invalid_input(field, "must be at least 1"));
    }
    Ok(())
}

/// `(1 + rate)^periods`, failing instead of panicking when the result does
/// not fit a `Decimal`.
pub(crate) fn compound_factor(rate: Decimal, periods: u32) -> ProjectionResult<Decimal> {
    (Decimal::ONE + rate)
        .checked_powu(periods.into())
        .ok_or_else(|| ProjectionError::overflow(format!("(1 + {rate})^{periods}")))
}

pub(crate) fn checked_mul(lhs: Decimal, rhs: Decimal, operation: &str) -> ProjectionResult<Decimal> {
    lhs.checked_mul(rhs)
        .ok_or_else(|| ProjectionError::overflow(operation))
}

pub(crate) fn checked_add(lhs: Decimal, rhs: Decimal, operation: &str) -> ProjectionResult<Decimal> {
    lhs.checked_add(rhs)
        .ok_or_else(|| ProjectionError::overflow(operation))
}

pub(crate) fn checked_div(lhs: Decimal, rhs: Decimal, operation: &str) -> ProjectionResult<Decimal> {
    lhs.checked_div(rhs)
        .ok_or_else(|| ProjectionError::overflow(operation))
}
