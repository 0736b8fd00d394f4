//! Period-by-period amortization schedules.
//!
//! Two repayment systems are supported:
//! - **Equal installment** ([`schedule`], [`schedule_with_payment`]): a fixed
//!   payment whose interest portion shrinks while the principal portion grows.
//! - **Constant principal** ([`constant_principal_schedule`]): a fixed
//!   principal portion plus interest on the remaining balance, leading to
//!   decreasing payments over time.
//!
//! Totals always cover the full horizon, even when the caller asks for only
//! the first few rows.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProjectionError, ProjectionResult};
use crate::numeric::{
    checked_add, checked_mul, ensure_non_negative, ensure_nonzero_count, ensure_positive,
};
use crate::payment::amortized_payment;

/// One row of a repayment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentPeriod {
    /// 1-based period number.
    pub index: u32,
    /// The total paid this period.
    pub payment: Decimal,
    /// The portion of the payment that reduces the principal.
    pub principal_portion: Decimal,
    /// The portion of the payment that covers interest.
    pub interest_portion: Decimal,
    /// The balance left after this period's payment.
    pub ending_balance: Decimal,
}

/// Result of an equal-installment schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmortizationSchedule {
    /// The fixed periodic payment.
    pub payment: Decimal,
    /// The returned rows; a prefix of the full schedule when a row limit was given.
    pub periods: Vec<PaymentPeriod>,
    /// The total paid over the full horizon.
    pub total_paid: Decimal,
    /// The total interest paid over the full horizon.
    pub total_interest: Decimal,
    /// The number of periods in the full schedule. Shorter than requested
    /// when an oversized payment clears the balance early.
    pub num_periods: u32,
    /// The payment made in the last period of the full schedule, which can be
    /// smaller than `payment`.
    pub last_payment: Decimal,
    /// The balance still outstanding after the last period.
    pub remaining_balance: Decimal,
}

/// Result of a constant-principal schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConstantPrincipalSchedule {
    /// The fixed amount of principal paid off each period.
    pub principal_portion: Decimal,
    /// The amount of the first payment, which is the highest.
    pub first_payment: Decimal,
    /// The amount of the last payment, which is the lowest.
    pub last_payment: Decimal,
    /// The returned rows; a prefix of the full schedule when a row limit was given.
    pub periods: Vec<PaymentPeriod>,
    /// The total paid over the full horizon.
    pub total_paid: Decimal,
    /// The total interest paid over the full horizon.
    pub total_interest: Decimal,
}

/// Builds the equal-installment schedule for a loan.
///
/// # Arguments
///
/// * `principal` - The principal loan amount.
/// * `periodic_rate` - The interest rate per period as a decimal (not percentage).
/// * `num_periods` - The total number of payments.
/// * `max_periods_to_return` - Optional row limit; totals still cover every period.
///
/// # Errors
///
/// Returns `InvalidInput` under the same conditions as [`amortized_payment`],
/// and `NumericOverflow` if an amount does not fit a `Decimal`.
pub fn schedule(
    principal: Decimal,
    periodic_rate: Decimal,
    num_periods: u32,
    max_periods_to_return: Option<usize>,
) -> ProjectionResult<AmortizationSchedule> {
    let payment = amortized_payment(principal, periodic_rate, num_periods)?;
    debug!(%principal, %periodic_rate, num_periods, %payment, "building amortization schedule");

    amortize(principal, periodic_rate, payment, num_periods, max_periods_to_return)
}

/// Builds a schedule for a caller-chosen fixed payment instead of the solved one.
///
/// A payment larger than needed ends the schedule early, with a smaller final
/// payment. A payment smaller than needed leaves a `remaining_balance` after
/// `num_periods`.
///
/// # Errors
///
/// Returns `InvalidInput` for a non-positive principal or payment, a negative
/// rate or zero periods, `NonConverging` when the payment does not exceed
/// the first period's interest, and `NumericOverflow` if the interest does not
/// fit a `Decimal`.
pub fn schedule_with_payment(
    principal: Decimal,
    periodic_rate: Decimal,
    payment: Decimal,
    num_periods: u32,
    max_periods_to_return: Option<usize>,
) -> ProjectionResult<AmortizationSchedule> {
    ensure_positive("principal", principal)?;
    ensure_non_negative("periodic_rate", periodic_rate)?;
    ensure_positive("payment", payment)?;
    ensure_nonzero_count("num_periods", num_periods)?;

    amortize(principal, periodic_rate, payment, num_periods, max_periods_to_return)
}

fn amortize(
    principal: Decimal,
    periodic_rate: Decimal,
    payment: Decimal,
    num_periods: u32,
    max_periods_to_return: Option<usize>,
) -> ProjectionResult<AmortizationSchedule> {
    let row_limit = max_periods_to_return.unwrap_or(usize::MAX);
    let mut current_balance = principal;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut periods_run = 0;
    let mut last_payment = Decimal::ZERO;
    let mut periods = Vec::new();

    for index in 1..=num_periods {
        let interest_payment = checked_mul(current_balance, periodic_rate, "period interest")?;
        if payment <= interest_payment {
            return Err(ProjectionError::NonConverging {
                period: index,
                payment,
                interest: interest_payment,
            });
        }

        let amortization = (payment - interest_payment).min(current_balance);
        current_balance -= amortization;
        if index == num_periods {
            current_balance = current_balance.max(Decimal::ZERO);
        }

        let period_payment = checked_add(amortization, interest_payment, "period payment")?;
        total_paid = checked_add(total_paid, period_payment, "total paid")?;
        total_interest = checked_add(total_interest, interest_payment, "total interest")?;
        periods_run = index;
        last_payment = period_payment;

        if periods.len() < row_limit {
            periods.push(PaymentPeriod {
                index,
                payment: period_payment,
                principal_portion: amortization,
                interest_portion: interest_payment,
                ending_balance: current_balance,
            });
        }

        if current_balance.is_zero() {
            break;
        }
    }

    debug!(periods_run, %total_paid, %total_interest, "amortization schedule complete");

    Ok(AmortizationSchedule {
        payment,
        periods,
        total_paid,
        total_interest,
        num_periods: periods_run,
        last_payment,
        remaining_balance: current_balance,
    })
}

/// Builds the constant-principal schedule for a loan.
///
/// Each period repays `principal / num_periods` plus interest on the balance
/// left, so payments decrease over time. The last period repays whatever
/// balance remains, absorbing the division remainder.
///
/// # Errors
///
/// Returns `InvalidInput` for a non-positive principal, a negative rate or
/// zero periods, and `NumericOverflow` if the interest does not fit a `Decimal`.
pub fn constant_principal_schedule(
    principal: Decimal,
    periodic_rate: Decimal,
    num_periods: u32,
    max_periods_to_return: Option<usize>,
) -> ProjectionResult<ConstantPrincipalSchedule> {
    ensure_positive("principal", principal)?;
    ensure_non_negative("periodic_rate", periodic_rate)?;
    ensure_nonzero_count("num_periods", num_periods)?;
    debug!(%principal, %periodic_rate, num_periods, "building constant principal schedule");

    let row_limit = max_periods_to_return.unwrap_or(usize::MAX);
    let fixed_amortization = principal / Decimal::from(num_periods);
    let mut current_balance = principal;
    let mut first_payment = Decimal::ZERO;
    let mut last_payment = Decimal::ZERO;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut periods = Vec::new();

    for index in 1..=num_periods {
        let interest_payment = checked_mul(current_balance, periodic_rate, "period interest")?;
        let amortization = if index == num_periods {
            current_balance
        } else {
            fixed_amortization.min(current_balance)
        };
        let current_payment = checked_add(amortization, interest_payment, "period payment")?;

        if index == 1 {
            first_payment = current_payment;
        }
        last_payment = current_payment;

        current_balance -= amortization;
        total_paid = checked_add(total_paid, current_payment, "total paid")?;
        total_interest = checked_add(total_interest, interest_payment, "total interest")?;

        if periods.len() < row_limit {
            periods.push(PaymentPeriod {
                index,
                payment: current_payment,
                principal_portion: amortization,
                interest_portion: interest_payment,
                ending_balance: current_balance,
            });
        }
    }

    Ok(ConstantPrincipalSchedule {
        principal_portion: fixed_amortization,
        first_payment,
        last_payment,
        periods,
        total_paid,
        total_interest,
    })
}
