//! Request/response types for the individual calculators.
//!
//! Each calculator takes the values a user types in (rates as percentages,
//! tenures in months or years, ages) and drives the engine components. Summary
//! figures are rounded to cents for display; schedule rows are left unrounded.

use anyhow::Context;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::ProjectionError;
use crate::goal::{GoalAssessment, assess};
use crate::growth::{
    AccumulationPlan, AccumulationSummary, CompoundingFrequency, GrowthPeriod, PayoffStatus,
    simulate_accumulation, simulate_accumulation_with, simulate_payoff,
};
use crate::numeric::{MONTHS_PER_YEAR, checked_mul};
use crate::rates::{deflate, periodic_rate};
use crate::schedule::{PaymentPeriod, constant_principal_schedule, schedule};

/// Number of schedule rows returned when the request does not say.
pub const DEFAULT_ROWS_TO_SHOW: usize = 12;

fn default_rows_to_show() -> usize {
    DEFAULT_ROWS_TO_SHOW
}

fn percent_to_fraction(percent: Decimal) -> Decimal {
    percent / dec!(100)
}

/// Repayment system of a loan.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RepaymentMethod {
    /// Same payment every month (EMI).
    #[default]
    EqualInstallment,
    /// Same principal every month, decreasing payments.
    ConstantPrincipal,
}

/// Input of the loan, mortgage and EMI calculators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanInput {
    /// The total principal amount of the loan.
    pub total_amount: Decimal,
    /// The annual interest rate as a percentage (e.g., 8.5 for 8.5%).
    pub interest_per_year: Decimal,
    /// The total number of months for the loan.
    pub total_months: u32,
    /// The repayment system, equal installments by default.
    #[serde(default)]
    pub method: RepaymentMethod,
    /// How many months of the schedule to return.
    #[serde(default = "default_rows_to_show")]
    pub rows_to_show: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoanResult {
    /// The principal borrowed.
    pub initial_total_amount: Decimal,
    /// The repayment system the schedule follows.
    pub method: RepaymentMethod,
    /// The first monthly payment; the installment (EMI) for equal installments.
    pub first_payment: Decimal,
    /// The payment of the final month, whether or not that row is returned.
    pub last_payment: Decimal,
    /// The total amount paid over the lifetime of the loan.
    pub total_paid: Decimal,
    /// The total interest paid over the lifetime of the loan.
    pub total_interest: Decimal,
    /// The first `rows_to_show` months.
    pub schedule: Vec<PaymentPeriod>,
}

/// Calculates monthly payments and the repayment schedule of a loan.
///
/// # Errors
///
/// Returns an error wrapping a [`ProjectionError`] if the amount, rate or
/// tenure is invalid.
pub fn calculate_loan(input: LoanInput) -> anyhow::Result<LoanResult> {
    let monthly_interest_rate = periodic_rate(input.interest_per_year, MONTHS_PER_YEAR)
        .context("Invalid loan interest rate")?;

    let result = match input.method {
        RepaymentMethod::EqualInstallment => {
            let table = schedule(
                input.total_amount,
                monthly_interest_rate,
                input.total_months,
                Some(input.rows_to_show),
            )
            .context("Failed to build the loan schedule")?;

            LoanResult {
                initial_total_amount: input.total_amount,
                method: input.method,
                first_payment: table.payment.round_dp(2),
                last_payment: table.last_payment.round_dp(2),
                total_paid: table.total_paid.round_dp(2),
                total_interest: table.total_interest.round_dp(2),
                schedule: table.periods,
            }
        }
        RepaymentMethod::ConstantPrincipal => {
            let table = constant_principal_schedule(
                input.total_amount,
                monthly_interest_rate,
                input.total_months,
                Some(input.rows_to_show),
            )
            .context("Failed to build the loan schedule")?;

            LoanResult {
                initial_total_amount: input.total_amount,
                method: input.method,
                first_payment: table.first_payment.round_dp(2),
                last_payment: table.last_payment.round_dp(2),
                total_paid: table.total_paid.round_dp(2),
                total_interest: table.total_interest.round_dp(2),
                schedule: table.periods,
            }
        }
    };

    Ok(result)
}

/// Input of the credit card payoff calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardInput {
    /// The outstanding card balance.
    pub balance: Decimal,
    /// The card's APR as a percentage.
    pub interest_per_year: Decimal,
    /// The fixed amount paid every month.
    pub monthly_payment: Decimal,
    /// How many months of the schedule to return.
    #[serde(default = "default_rows_to_show")]
    pub rows_to_show: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreditCardResult {
    /// The number of monthly payments made.
    pub months: u32,
    /// The total amount paid until payoff or the cap.
    pub total_paid: Decimal,
    /// The total interest charged until payoff or the cap.
    pub total_interest: Decimal,
    /// `iteration_cap_reached` means the payoff takes longer than the cap.
    pub status: PayoffStatus,
    /// The balance left when the simulation stopped; zero once paid off.
    pub remaining_balance: Decimal,
    /// The first `rows_to_show` months.
    pub schedule: Vec<PaymentPeriod>,
}

/// Calculates how long a fixed monthly payment takes to clear a card balance.
///
/// A payoff longer than the iteration cap is not an error; it is reported
/// through `status`.
///
/// # Errors
///
/// Returns an error wrapping [`ProjectionError::NonConverging`] when the
/// payment does not cover the monthly interest, or `InvalidInput` for bad
/// amounts.
pub fn calculate_credit_card_payoff(input: CreditCardInput) -> anyhow::Result<CreditCardResult> {
    let monthly_interest_rate = periodic_rate(input.interest_per_year, MONTHS_PER_YEAR)
        .context("Invalid card interest rate")?;

    let payoff = simulate_payoff(input.balance, monthly_interest_rate, input.monthly_payment)
        .with_context(|| {
            format!(
                "A monthly payment of {} cannot pay off a balance of {}",
                input.monthly_payment, input.balance
            )
        })?;

    let mut schedule = payoff.periods;
    schedule.truncate(input.rows_to_show);

    Ok(CreditCardResult {
        months: payoff.months,
        total_paid: payoff.total_paid.round_dp(2),
        total_interest: payoff.total_interest.round_dp(2),
        status: payoff.status,
        remaining_balance: payoff.remaining_balance.round_dp(2),
        schedule,
    })
}

/// Input of the compound interest, SIP and lump-sum calculators.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentInput {
    /// The lump sum invested at the start.
    #[serde(default)]
    pub initial_amount: Decimal,
    /// The amount invested every month (SIP).
    #[serde(default)]
    pub monthly_contribution: Decimal,
    /// Expected annual return as a percentage.
    pub expected_return_per_year: Decimal,
    /// The investment horizon in years.
    pub years: u32,
    /// Yearly increase of the contribution as a percentage.
    #[serde(default)]
    pub step_up_per_year: Decimal,
    /// Inflation as a percentage; when given, the result includes the final
    /// balance in today's money.
    #[serde(default)]
    pub inflation_per_year: Option<Decimal>,
    /// How often returns are compounded, monthly by default.
    #[serde(default)]
    pub compounding: CompoundingFrequency,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InvestmentResult {
    /// The balance at the end of the horizon.
    pub final_balance: Decimal,
    /// Everything invested, the initial amount included.
    pub total_contributed: Decimal,
    /// The returns earned over the horizon.
    pub total_interest: Decimal,
    /// The final balance in today's money, when an inflation rate was given.
    pub inflation_adjusted_balance: Option<Decimal>,
    /// One row per year.
    pub yearly: Vec<GrowthPeriod>,
}

/// Projects an investment's growth year by year.
///
/// With a non-monthly `compounding`, the monthly contribution is pooled and
/// paid once per compounding period.
///
/// # Errors
///
/// Returns an error wrapping a [`ProjectionError`] for negative amounts or
/// rates, a zero number of years, or amounts too large for a `Decimal`.
pub fn calculate_investment(input: InvestmentInput) -> anyhow::Result<InvestmentResult> {
    let sub_periods = Decimal::from(input.compounding.periods_per_year());
    let yearly_contribution = checked_mul(
        input.monthly_contribution,
        Decimal::from(MONTHS_PER_YEAR),
        "yearly contribution",
    )
    .context("Failed to project the investment")?;
    let plan = AccumulationPlan {
        initial_balance: input.initial_amount,
        annual_rate: percent_to_fraction(input.expected_return_per_year),
        years: input.years,
        periodic_contribution: yearly_contribution / sub_periods,
        compounding: input.compounding,
        annual_contribution_increase: percent_to_fraction(input.step_up_per_year),
    };

    let yearly = simulate_accumulation_with(&plan).context("Failed to project the investment")?;
    let final_balance = yearly.final_balance();

    let inflation_adjusted_balance = input
        .inflation_per_year
        .map(|inflation| deflate(final_balance, percent_to_fraction(inflation), input.years))
        .transpose()
        .context("Invalid inflation rate")?
        .map(|balance| balance.round_dp(2));

    Ok(InvestmentResult {
        final_balance: final_balance.round_dp(2),
        total_contributed: yearly.total_contributed().round_dp(2),
        total_interest: yearly.total_interest().round_dp(2),
        inflation_adjusted_balance,
        yearly,
    })
}

/// The goal of a retirement plan, in today's money.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RetirementTarget {
    /// A lump sum to have at retirement.
    Corpus {
        /// The corpus needed at retirement.
        amount: Decimal,
    },
    /// Enough to cover monthly expenses from retirement to life expectancy.
    Expenses {
        /// The monthly spending to cover.
        monthly_expenses: Decimal,
        /// The age until which expenses must be covered.
        life_expectancy: u32,
    },
}

/// Input of the retirement planning calculator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementInput {
    /// The saver's age today.
    pub current_age: u32,
    /// The age at which contributions stop; must be after `current_age`.
    pub retirement_age: u32,
    /// Savings already set aside for retirement.
    #[serde(default)]
    pub current_savings: Decimal,
    /// The amount saved every month until retirement.
    #[serde(default)]
    pub monthly_contribution: Decimal,
    /// Expected annual return as a percentage.
    pub expected_return_per_year: Decimal,
    /// Expected annual inflation as a percentage.
    #[serde(default)]
    pub inflation_per_year: Decimal,
    /// What the savings have to cover.
    pub target: RetirementTarget,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetirementPlanResult {
    /// Retirement age minus current age.
    pub years_to_retirement: u32,
    /// The target before inflation adjustment.
    pub target_in_todays_money: Decimal,
    /// The projected balance against the inflation-adjusted target.
    pub assessment: GoalAssessment,
    /// One row per year until retirement.
    pub projection: Vec<GrowthPeriod>,
}

impl RetirementTarget {
    fn amount_in_todays_money(&self, retirement_age: u32) -> Result<Decimal, ProjectionError> {
        match *self {
            RetirementTarget::Corpus { amount } => Ok(amount),
            RetirementTarget::Expenses {
                monthly_expenses,
                life_expectancy,
            } => {
                let years_in_retirement = life_expectancy
                    .checked_sub(retirement_age)
                    .filter(|years| *years > 0)
                    .ok_or_else(|| {
                        ProjectionError::invalid_input(
                            "life_expectancy",
                            format!("must be after the retirement age of {retirement_age}"),
                        )
                    })?;
                let yearly_expenses = checked_mul(
                    monthly_expenses,
                    Decimal::from(MONTHS_PER_YEAR),
                    "yearly expenses",
                )?;
                checked_mul(
                    yearly_expenses,
                    Decimal::from(years_in_retirement),
                    "retirement expenses",
                )
            }
        }
    }
}

/// Projects retirement savings and compares them with the inflation-adjusted
/// target.
///
/// # Errors
///
/// Returns an error wrapping [`ProjectionError::InvalidInput`] when the
/// retirement age is not after the current age, and for any other invalid
/// amount or rate, or [`ProjectionError::NumericOverflow`] for amounts too
/// large for a `Decimal`.
pub fn calculate_retirement_plan(input: RetirementInput) -> anyhow::Result<RetirementPlanResult> {
    let years_to_retirement = input
        .retirement_age
        .checked_sub(input.current_age)
        .filter(|years| *years > 0)
        .ok_or_else(|| {
            ProjectionError::invalid_input(
                "retirement_age",
                format!(
                    "must be greater than the current age of {}",
                    input.current_age
                ),
            )
        })?;

    let target = input.target.amount_in_todays_money(input.retirement_age)?;
    let annual_return = percent_to_fraction(input.expected_return_per_year);
    let monthly_rate = periodic_rate(input.expected_return_per_year, MONTHS_PER_YEAR)
        .context("Invalid expected return")?;

    let projection = simulate_accumulation(
        input.current_savings,
        annual_return,
        years_to_retirement,
        input.monthly_contribution,
    )
    .context("Failed to project retirement savings")?;

    let assessment = assess(
        &projection,
        target,
        percent_to_fraction(input.inflation_per_year),
        years_to_retirement,
        monthly_rate,
    )
    .context("Failed to assess the retirement goal")?;

    Ok(RetirementPlanResult {
        years_to_retirement,
        target_in_todays_money: target,
        assessment,
        projection,
    })
}

/// A request for any of the calculators, tagged by `"calculator"`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalculatorRequest {
    Loan(LoanInput),
    CreditCard(CreditCardInput),
    Investment(InvestmentInput),
    Retirement(RetirementInput),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "calculator", rename_all = "snake_case")]
pub enum CalculatorResponse {
    Loan(LoanResult),
    CreditCard(CreditCardResult),
    Investment(InvestmentResult),
    Retirement(RetirementPlanResult),
}

/// Runs the calculator a request names.
pub fn handle_request(request: CalculatorRequest) -> anyhow::Result<CalculatorResponse> {
    let response = match request {
        CalculatorRequest::Loan(input) => CalculatorResponse::Loan(calculate_loan(input)?),
        CalculatorRequest::CreditCard(input) => {
            CalculatorResponse::CreditCard(calculate_credit_card_payoff(input)?)
        }
        CalculatorRequest::Investment(input) => {
            CalculatorResponse::Investment(calculate_investment(input)?)
        }
        CalculatorRequest::Retirement(input) => {
            CalculatorResponse::Retirement(calculate_retirement_plan(input)?)
        }
    };
    Ok(response)
}

/// Runs a JSON-encoded [`CalculatorRequest`] and returns the JSON-encoded response.
///
/// # Errors
///
/// Returns an error if the request is not valid JSON for any calculator, or
/// if the calculation itself fails.
pub fn handle_json_request(request: &str) -> anyhow::Result<String> {
    let request: CalculatorRequest =
        serde_json::from_str(request).context("Malformed calculator request")?;
    let response = handle_request(request)?;
    serde_json::to_string(&response).context("Failed to encode calculator response")
}
