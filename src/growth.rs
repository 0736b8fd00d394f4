//! Balance simulation over discrete periods.
//!
//! - **Accumulation** grows a balance under compounding with optional
//!   periodic contributions (compound interest, SIP and lump-sum
//!   investments). Contributions are compounded at the sub-period
//!   frequency, monthly by default, even though the inputs are annual.
//! - **Payoff** shrinks an interest-bearing debt with a fixed payment until
//!   it is cleared, detecting payments that can never clear it.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{ProjectionError, ProjectionResult};
use crate::numeric::{
    MONTHS_PER_YEAR, checked_add, checked_mul, ensure_non_negative, ensure_nonzero_count,
    ensure_positive,
};
use crate::schedule::PaymentPeriod;

/// Hard cap on payoff iterations. Guarantees termination for payments that
/// barely exceed the interest charge.
pub const MAX_PAYOFF_PERIODS: u32 = 600;

/// A balance at or below one cent counts as paid off.
pub const PAYOFF_EPSILON: Decimal = dec!(0.01);

/// How often interest is credited (and contributions made) within a year.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CompoundingFrequency {
    Annually,
    SemiAnnually,
    Quarterly,
    #[default]
    Monthly,
}

impl CompoundingFrequency {
    pub fn periods_per_year(self) -> u32 {
        match self {
            CompoundingFrequency::Annually => 1,
            CompoundingFrequency::SemiAnnually => 2,
            CompoundingFrequency::Quarterly => 4,
            CompoundingFrequency::Monthly => MONTHS_PER_YEAR,
        }
    }
}

/// One simulated year of an accumulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrowthPeriod {
    /// 1-based year number.
    pub index: u32,
    /// Sum of the contributions made during the year.
    pub contribution_this_period: Decimal,
    /// Contributions made since the start, initial balance included.
    pub cumulative_contributed: Decimal,
    /// The balance at the end of the year.
    pub ending_balance: Decimal,
    /// Interest credited during the year, over all its sub-periods.
    pub interest_earned_this_period: Decimal,
}

/// Parameters of an accumulation simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccumulationPlan {
    /// The balance invested at the start (lump sum).
    pub initial_balance: Decimal,
    /// Annual rate as a decimal (not percentage).
    pub annual_rate: Decimal,
    /// The number of years simulated; one row is produced per year.
    pub years: u32,
    /// Contribution made at the start of every sub-period.
    pub periodic_contribution: Decimal,
    /// How many sub-periods each year is split into.
    pub compounding: CompoundingFrequency,
    /// Yearly step-up of the contribution as a decimal, e.g. `0.1` for +10% a year.
    pub annual_contribution_increase: Decimal,
}

impl AccumulationPlan {
    /// A plan compounding monthly with a flat contribution.
    pub fn monthly(
        initial_balance: Decimal,
        annual_rate: Decimal,
        years: u32,
        periodic_contribution: Decimal,
    ) -> Self {
        Self {
            initial_balance,
            annual_rate,
            years,
            periodic_contribution,
            compounding: CompoundingFrequency::Monthly,
            annual_contribution_increase: Decimal::ZERO,
        }
    }
}

/// Aggregates over a simulated accumulation.
pub trait AccumulationSummary {
    /// Balance at the end of the last period, zero for an empty sequence.
    fn final_balance(&self) -> Decimal;
    /// Everything put in, initial balance included.
    fn total_contributed(&self) -> Decimal;
    fn total_interest(&self) -> Decimal;
}

impl AccumulationSummary for [GrowthPeriod] {
    fn final_balance(&self) -> Decimal {
        self.last()
            .map(|period| period.ending_balance)
            .unwrap_or_default()
    }

    fn total_contributed(&self) -> Decimal {
        self.last()
            .map(|period| period.cumulative_contributed)
            .unwrap_or_default()
    }

    fn total_interest(&self) -> Decimal {
        self.iter()
            .map(|period| period.interest_earned_this_period)
            .sum()
    }
}

/// Simulates monthly compounding with a monthly contribution, one row per year.
///
/// Each month adds `periodic_contribution` and then applies `annual_rate / 12`.
/// A pure lump sum is simulated with a zero contribution.
///
/// # Errors
///
/// Returns `InvalidInput` if any amount or rate is negative or `years` is zero.
pub fn simulate_accumulation(
    initial_balance: Decimal,
    annual_rate: Decimal,
    years: u32,
    periodic_contribution: Decimal,
) -> ProjectionResult<Vec<GrowthPeriod>> {
    simulate_accumulation_with(&AccumulationPlan::monthly(
        initial_balance,
        annual_rate,
        years,
        periodic_contribution,
    ))
}

/// Simulates an accumulation with an explicit compounding frequency and
/// contribution step-up.
///
/// # Errors
///
/// Returns `InvalidInput` if any amount or rate is negative or `years` is
/// zero, and `NumericOverflow` if the balance outgrows a `Decimal`.
pub fn simulate_accumulation_with(plan: &AccumulationPlan) -> ProjectionResult<Vec<GrowthPeriod>> {
    ensure_non_negative("initial_balance", plan.initial_balance)?;
    ensure_non_negative("annual_rate", plan.annual_rate)?;
    ensure_nonzero_count("years", plan.years)?;
    ensure_non_negative("periodic_contribution", plan.periodic_contribution)?;
    ensure_non_negative("annual_contribution_increase", plan.annual_contribution_increase)?;

    let sub_periods = plan.compounding.periods_per_year();
    let rate = plan.annual_rate / Decimal::from(sub_periods);
    debug!(
        initial_balance = %plan.initial_balance,
        annual_rate = %plan.annual_rate,
        years = plan.years,
        sub_periods,
        "simulating accumulation"
    );

    let mut balance = plan.initial_balance;
    let mut contribution = plan.periodic_contribution;
    let mut cumulative_contributed = plan.initial_balance;
    let mut rows = Vec::with_capacity(plan.years as usize);

    for year in 1..=plan.years {
        let mut contributed = Decimal::ZERO;
        let mut interest = Decimal::ZERO;

        for _ in 0..sub_periods {
            balance = checked_add(balance, contribution, "accumulated balance")?;
            let earned = checked_mul(balance, rate, "accumulation interest")?;
            balance = checked_add(balance, earned, "accumulated balance")?;
            contributed = checked_add(contributed, contribution, "yearly contribution")?;
            interest = checked_add(interest, earned, "yearly interest")?;
        }

        cumulative_contributed =
            checked_add(cumulative_contributed, contributed, "cumulative contribution")?;
        rows.push(GrowthPeriod {
            index: year,
            contribution_this_period: contributed,
            cumulative_contributed,
            ending_balance: balance,
            interest_earned_this_period: interest,
        });

        let step_up = checked_add(
            Decimal::ONE,
            plan.annual_contribution_increase,
            "contribution step-up",
        )?;
        contribution = checked_mul(contribution, step_up, "stepped-up contribution")?;
    }

    debug!(final_balance = %balance, %cumulative_contributed, "accumulation complete");
    Ok(rows)
}

/// Terminal state of a payoff simulation that did not fail.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PayoffStatus {
    PaidOff,
    /// The cap was reached with a balance still outstanding.
    IterationCapReached,
}

/// Result of a payoff simulation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayoffSchedule {
    /// One row per payment made.
    pub periods: Vec<PaymentPeriod>,
    /// Number of payments made.
    pub months: u32,
    /// The sum of every payment, the smaller final one included.
    pub total_paid: Decimal,
    /// The total interest charged until payoff or the cap.
    pub total_interest: Decimal,
    /// The balance left when the simulation stopped.
    pub remaining_balance: Decimal,
    /// Whether the balance was cleared or the cap was reached first.
    pub status: PayoffStatus,
    /// The cap the simulation ran under.
    pub max_periods: u32,
}

impl PayoffSchedule {
    pub fn is_paid_off(&self) -> bool {
        self.status == PayoffStatus::PaidOff
    }

    /// Treats reaching the cap as a failure.
    ///
    /// # Errors
    ///
    /// Returns `IterationCapReached` when the balance was not cleared.
    pub fn require_paid_off(self) -> ProjectionResult<Self> {
        match self.status {
            PayoffStatus::PaidOff => Ok(self),
            PayoffStatus::IterationCapReached => Err(ProjectionError::IterationCapReached {
                max_periods: self.max_periods,
                remaining_balance: self.remaining_balance,
            }),
        }
    }
}

/// Simulates paying down `balance` with `fixed_payment` each period, capped
/// at [`MAX_PAYOFF_PERIODS`].
///
/// # Errors
///
/// See [`simulate_payoff_capped`].
pub fn simulate_payoff(
    balance: Decimal,
    periodic_rate: Decimal,
    fixed_payment: Decimal,
) -> ProjectionResult<PayoffSchedule> {
    simulate_payoff_capped(balance, periodic_rate, fixed_payment, MAX_PAYOFF_PERIODS)
}

/// Simulates paying down `balance` with `fixed_payment` each period, for at
/// most `max_periods` periods.
///
/// Every period charges `balance * periodic_rate` of interest and applies the
/// rest of the payment to the balance. The last payment only covers what is
/// left.
///
/// # Errors
///
/// Returns `InvalidInput` for a non-positive balance, payment or cap, or a
/// negative rate, `NonConverging` as soon as the payment does not exceed
/// the period's interest charge, and `NumericOverflow` if the interest charge
/// does not fit a `Decimal`.
pub fn simulate_payoff_capped(
    balance: Decimal,
    periodic_rate: Decimal,
    fixed_payment: Decimal,
    max_periods: u32,
) -> ProjectionResult<PayoffSchedule> {
    ensure_positive("balance", balance)?;
    ensure_non_negative("periodic_rate", periodic_rate)?;
    ensure_positive("fixed_payment", fixed_payment)?;
    ensure_nonzero_count("max_periods", max_periods)?;
    debug!(%balance, %periodic_rate, %fixed_payment, max_periods, "simulating payoff");

    let mut current_balance = balance;
    let mut months = 0;
    let mut total_paid = Decimal::ZERO;
    let mut total_interest = Decimal::ZERO;
    let mut periods = Vec::new();

    while current_balance > PAYOFF_EPSILON && months < max_periods {
        let interest_charge = checked_mul(current_balance, periodic_rate, "interest charge")?;
        if fixed_payment <= interest_charge {
            warn!(
                period = months + 1,
                %fixed_payment,
                %interest_charge,
                "payment does not cover interest; balance can never be paid off"
            );
            return Err(ProjectionError::NonConverging {
                period: months + 1,
                payment: fixed_payment,
                interest: interest_charge,
            });
        }

        let principal_payment = (fixed_payment - interest_charge).min(current_balance);
        current_balance -= principal_payment;
        months += 1;

        let payment = checked_add(principal_payment, interest_charge, "period payment")?;
        total_paid = checked_add(total_paid, payment, "total paid")?;
        total_interest = checked_add(total_interest, interest_charge, "total interest")?;
        periods.push(PaymentPeriod {
            index: months,
            payment,
            principal_portion: principal_payment,
            interest_portion: interest_charge,
            ending_balance: current_balance,
        });
    }

    let status = if current_balance <= PAYOFF_EPSILON {
        PayoffStatus::PaidOff
    } else {
        warn!(max_periods, remaining_balance = %current_balance, "payoff exceeds period cap");
        PayoffStatus::IterationCapReached
    };
    debug!(months, %total_paid, %total_interest, ?status, "payoff simulation complete");

    Ok(PayoffSchedule {
        periods,
        months,
        total_paid,
        total_interest,
        remaining_balance: current_balance,
        status,
        max_periods,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::{prop_assert, prop_assume, proptest};
    use rstest::rstest;

    #[test]
    fn test_lump_sum_compounds_monthly() {
        let rows = simulate_accumulation(dec!(10000), dec!(0.07), 20, dec!(0)).unwrap();

        assert_eq!(rows.len(), 20);
        // Monthly compounding beats the 10000 * 1.07^20 = 38696.84 of annual compounding.
        assert_eq!(rows.final_balance().round_dp(2), dec!(40387.39));
        assert_eq!(rows.total_contributed(), dec!(10000));
        assert_eq!(rows.total_interest().round_dp(2), dec!(30387.39));
    }

    #[test]
    fn test_sip_contributes_before_interest() {
        let rows = simulate_accumulation(dec!(0), dec!(0.12), 10, dec!(1000)).unwrap();

        assert_eq!(rows[0].contribution_this_period, dec!(12000));
        assert_eq!(rows[0].ending_balance.round_dp(2), dec!(12809.33));
        assert_eq!(rows.final_balance().round_dp(2), dec!(232339.08));
        assert_eq!(rows.total_contributed(), dec!(120000));
    }

    #[test]
    fn test_rows_chain_balances() {
        let rows = simulate_accumulation(dec!(5000), dec!(0.09), 15, dec!(250)).unwrap();
        let mut previous = dec!(5000);
        for row in &rows {
            let expected =
                previous + row.contribution_this_period + row.interest_earned_this_period;
            assert!((row.ending_balance - expected).abs() < dec!(0.000001));
            previous = row.ending_balance;
        }
    }

    #[rstest]
    #[case(CompoundingFrequency::Annually, dec!(1210))]
    #[case(CompoundingFrequency::SemiAnnually, dec!(1215.51))]
    #[case(CompoundingFrequency::Quarterly, dec!(1218.40))]
    fn test_compounding_frequency(
        #[case] compounding: CompoundingFrequency,
        #[case] expected: Decimal,
    ) {
        let plan = AccumulationPlan {
            compounding,
            ..AccumulationPlan::monthly(dec!(1000), dec!(0.1), 2, dec!(0))
        };
        let rows = simulate_accumulation_with(&plan).unwrap();
        assert_eq!(rows.final_balance().round_dp(2), expected);
    }

    #[test]
    fn test_contribution_step_up() {
        let plan = AccumulationPlan {
            annual_contribution_increase: dec!(0.1),
            ..AccumulationPlan::monthly(dec!(0), dec!(0), 3, dec!(100))
        };
        let rows = simulate_accumulation_with(&plan).unwrap();

        assert_eq!(rows[0].contribution_this_period, dec!(1200));
        assert_eq!(rows[1].contribution_this_period, dec!(1320));
        assert_eq!(rows[2].contribution_this_period, dec!(1452));
        assert_eq!(rows.final_balance(), dec!(3972));
    }

    #[test]
    fn test_accumulation_rejects_bad_input() {
        assert!(simulate_accumulation(dec!(1000), dec!(0.05), 0, dec!(0)).is_err());
        assert!(simulate_accumulation(dec!(-1), dec!(0.05), 5, dec!(0)).is_err());
        assert!(simulate_accumulation(dec!(1000), dec!(-0.05), 5, dec!(0)).is_err());
        assert!(simulate_accumulation(dec!(1000), dec!(0.05), 5, dec!(-10)).is_err());
    }

    #[test]
    fn test_payoff_non_converging() {
        let result = simulate_payoff(dec!(5000), dec!(0.015), dec!(50));
        assert_eq!(
            result,
            Err(ProjectionError::NonConverging {
                period: 1,
                payment: dec!(50),
                interest: dec!(75),
            })
        );
    }

    #[test]
    fn test_credit_card_payoff() {
        let result = simulate_payoff(dec!(5000), dec!(0.18) / dec!(12), dec!(200)).unwrap();

        assert!(result.is_paid_off());
        assert_eq!(result.months, 32);
        assert_eq!(result.periods.len(), 32);
        assert_eq!(result.total_interest.round_dp(2), dec!(1313.96));
        assert_eq!(result.total_paid.round_dp(2), dec!(6313.96));
        assert!(result.periods.last().unwrap().payment < dec!(200));
    }

    #[test]
    fn test_payoff_cap_is_reported() {
        let result = simulate_payoff(dec!(10000), dec!(0.02), dec!(200.001)).unwrap();

        assert_eq!(result.status, PayoffStatus::IterationCapReached);
        assert_eq!(result.months, MAX_PAYOFF_PERIODS);
        let remaining_balance = result.remaining_balance;
        assert!(remaining_balance > dec!(2000));
        assert_eq!(
            result.require_paid_off(),
            Err(ProjectionError::IterationCapReached {
                max_periods: 600,
                remaining_balance,
            })
        );
    }

    #[test]
    fn test_payoff_with_custom_cap() {
        let result = simulate_payoff_capped(dec!(1000), dec!(0), dec!(100), 5).unwrap();
        assert_eq!(result.status, PayoffStatus::IterationCapReached);
        assert_eq!(result.remaining_balance, dec!(500));

        let result = simulate_payoff_capped(dec!(1000), dec!(0), dec!(100), 10).unwrap();
        assert!(result.is_paid_off());
        assert_eq!(result.total_interest, dec!(0));
    }

    #[rstest]
    #[case(dec!(0.01))]
    #[case(dec!(0.005))]
    fn test_balance_within_a_cent_is_already_paid_off(#[case] balance: Decimal) {
        let result = simulate_payoff(balance, dec!(0.02), dec!(10)).unwrap();

        assert_eq!(result.status, PayoffStatus::PaidOff);
        assert_eq!(result.months, 0);
        assert!(result.periods.is_empty());
        assert_eq!(result.total_paid, dec!(0));
        assert_eq!(result.remaining_balance, balance);
    }

    #[test]
    fn test_balance_just_over_a_cent_takes_one_payment() {
        let result = simulate_payoff(dec!(0.02), dec!(0), dec!(10)).unwrap();
        assert_eq!(result.months, 1);
        assert_eq!(result.total_paid, dec!(0.02));
    }

    #[rstest]
    #[case::interest_charge(dec!(70000000000000000000000000000), dec!(2), dec!(1))]
    #[case::huge_rate(dec!(1000000), dec!(100000000000000000000000000), dec!(1))]
    fn test_payoff_overflow_is_reported(
        #[case] balance: Decimal,
        #[case] rate: Decimal,
        #[case] payment: Decimal,
    ) {
        let result = simulate_payoff(balance, rate, payment);
        assert!(matches!(result, Err(ProjectionError::NumericOverflow { .. })));
    }

    #[rstest]
    #[case::balance(AccumulationPlan::monthly(dec!(70000000000000000000000000000), dec!(12), 1, dec!(0)))]
    #[case::long_growth(AccumulationPlan::monthly(dec!(1000000), dec!(12), 40, dec!(0)))]
    #[case::contribution(AccumulationPlan::monthly(dec!(0), dec!(0), 1, dec!(10000000000000000000000000000)))]
    fn test_accumulation_overflow_is_reported(#[case] plan: AccumulationPlan) {
        let result = simulate_accumulation_with(&plan);
        assert!(matches!(result, Err(ProjectionError::NumericOverflow { .. })));
    }

    #[test]
    fn test_payoff_rejects_bad_input() {
        assert!(simulate_payoff(dec!(0), dec!(0.01), dec!(100)).is_err());
        assert!(simulate_payoff(dec!(1000), dec!(-0.01), dec!(100)).is_err());
        assert!(simulate_payoff(dec!(1000), dec!(0.01), dec!(0)).is_err());
    }

    proptest! {
        #![proptest_config(proptest::test_runner::Config::with_cases(48))]

        #[test]
        fn prop_payoff_balance_never_increases(
            balance in 100u32..50_000,
            rate_bp in 1u32..300,
            payment in 10u32..5_000
        ) {
            let balance = Decimal::from(balance);
            let rate = Decimal::from(rate_bp) / Decimal::from(10_000);
            let payment = Decimal::from(payment);
            prop_assume!(payment > balance * rate);

            let result = simulate_payoff(balance, rate, payment).unwrap();
            let mut previous = balance;
            for row in &result.periods {
                prop_assert!(row.ending_balance < previous);
                prop_assert!(row.ending_balance >= Decimal::ZERO);
                previous = row.ending_balance;
            }
            prop_assert!(result.months <= MAX_PAYOFF_PERIODS);
        }
    }
}
