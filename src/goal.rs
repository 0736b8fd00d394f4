//! Shortfall analysis of a projected balance against an inflation-adjusted target.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{ProjectionError, ProjectionResult};
use crate::growth::{AccumulationSummary, GrowthPeriod};
use crate::numeric::{
    MONTHS_PER_YEAR, checked_div, checked_mul, compound_factor, ensure_non_negative,
    ensure_nonzero_count,
};
use crate::rates::inflate;

/// How a projected balance compares with a savings goal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GoalAssessment {
    /// Balance at the end of the simulated accumulation.
    pub projected_balance: Decimal,
    /// The goal restated in money of the horizon year.
    pub inflation_adjusted_target: Decimal,
    /// `inflation_adjusted_target - projected_balance`; negative is a surplus.
    pub gap: Decimal,
    /// Extra end-of-period contribution that accumulates to exactly the shortfall.
    pub recommended_additional_periodic_contribution: Decimal,
}

impl GoalAssessment {
    pub fn is_on_track(&self) -> bool {
        self.gap <= Decimal::ZERO
    }

    /// The surplus over the target, zero when short.
    pub fn surplus(&self) -> Decimal {
        (-self.gap).max(Decimal::ZERO)
    }
}

/// Assesses a monthly accumulation against a target.
///
/// # Arguments
///
/// * `accumulation` - The simulated growth, one row per year.
/// * `target_nominal` - The goal in today's money.
/// * `annual_inflation_rate` - Inflation as a decimal (not percentage).
/// * `horizon_years` - Years until the goal, e.g. retirement age minus current age.
/// * `periodic_rate` - Monthly rate at which extra contributions would grow.
///
/// # Errors
///
/// Returns `InvalidInput` for a zero horizon, an empty accumulation or any
/// negative amount or rate, and `NumericOverflow` if the inflated target does
/// not fit a `Decimal`.
pub fn assess(
    accumulation: &[GrowthPeriod],
    target_nominal: Decimal,
    annual_inflation_rate: Decimal,
    horizon_years: u32,
    periodic_rate: Decimal,
) -> ProjectionResult<GoalAssessment> {
    assess_with_frequency(
        accumulation,
        target_nominal,
        annual_inflation_rate,
        horizon_years,
        periodic_rate,
        MONTHS_PER_YEAR,
    )
}

/// Same as [`assess`], with `periods_per_year` contribution periods a year.
pub fn assess_with_frequency(
    accumulation: &[GrowthPeriod],
    target_nominal: Decimal,
    annual_inflation_rate: Decimal,
    horizon_years: u32,
    periodic_rate: Decimal,
    periods_per_year: u32,
) -> ProjectionResult<GoalAssessment> {
    ensure_nonzero_count("horizon_years", horizon_years)?;
    ensure_nonzero_count("periods_per_year", periods_per_year)?;
    ensure_non_negative("target", target_nominal)?;
    ensure_non_negative("periodic_rate", periodic_rate)?;
    if accumulation.is_empty() {
        return Err(ProjectionError::invalid_input(
            "accumulation",
            "needs at least one simulated period",
        ));
    }

    let projected_balance = accumulation.final_balance();
    let inflation_adjusted_target = inflate(target_nominal, annual_inflation_rate, horizon_years)?;
    let gap = inflation_adjusted_target - projected_balance;

    let num_periods = horizon_years
        .checked_mul(periods_per_year)
        .ok_or_else(|| ProjectionError::overflow("number of contribution periods"))?;
    let recommended = required_periodic_contribution(gap, periodic_rate, num_periods)?;

    debug!(
        %projected_balance,
        %inflation_adjusted_target,
        %gap,
        %recommended,
        "goal assessed"
    );

    Ok(GoalAssessment {
        projected_balance,
        inflation_adjusted_target,
        gap,
        recommended_additional_periodic_contribution: recommended,
    })
}

/// Solves the end-of-period contribution that grows to `gap` over
/// `num_periods` at `periodic_rate`.
///
/// Inverts the future value of an annuity: c = gap * i / [(1 + i)^n – 1],
/// or `gap / n` at a zero rate. A non-positive gap needs no contribution.
///
/// # Errors
///
/// Returns `InvalidInput` for a negative rate or zero periods.
pub fn required_periodic_contribution(
    gap: Decimal,
    periodic_rate: Decimal,
    num_periods: u32,
) -> ProjectionResult<Decimal> {
    ensure_non_negative("periodic_rate", periodic_rate)?;
    ensure_nonzero_count("num_periods", num_periods)?;

    if gap <= Decimal::ZERO {
        return Ok(Decimal::ZERO);
    }
    if periodic_rate.is_zero() {
        return Ok(gap / Decimal::from(num_periods));
    }

    let growth = compound_factor(periodic_rate, num_periods)? - Decimal::ONE;
    let numerator = checked_mul(gap, periodic_rate, "required contribution")?;
    checked_div(numerator, growth, "required contribution")
}
