//! Projection engine errors

use rust_decimal::Decimal;
use thiserror::Error;

/// Result alias used by every engine component.
pub type ProjectionResult<T> = Result<T, ProjectionError>;

/// Tagged failure kinds returned by the engine.
///
/// Every kind is detected at the point of infeasibility and returned to the
/// caller, so a UI can render a specific message instead of a `NaN`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProjectionError {
    /// A scalar input is outside its domain (non-positive principal, periods
    /// or horizon, negative rate, ...).
    #[error("Invalid input for {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    /// Each input is valid on its own, but the payment can never reduce the
    /// outstanding balance.
    #[error(
        "Payment of {payment} does not cover interest of {interest} in period {period}; the balance will never be paid off"
    )]
    NonConverging {
        period: u32,
        payment: Decimal,
        interest: Decimal,
    },

    /// The payoff simulation ran out of periods before the balance reached zero.
    #[error("Payoff exceeds {max_periods} periods; {remaining_balance} still outstanding")]
    IterationCapReached {
        max_periods: u32,
        remaining_balance: Decimal,
    },

    #[error("Numeric overflow while computing {operation}")]
    NumericOverflow { operation: String },
}

impl ProjectionError {
    pub fn invalid_input(field: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    pub fn overflow(operation: impl Into<String>) -> Self {
        Self::NumericOverflow {
            operation: operation.into(),
        }
    }
}
