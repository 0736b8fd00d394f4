//! `projection_engine` is a Rust library for projecting how a balance evolves
//! over discrete periods under interest, contributions or withdrawals.
//!
//! It provides the numeric core shared by loan, credit card, investment and
//! retirement calculators:
//! - **Amortized payment**: the fixed payment that retires a principal over N
//!   periods ([`amortized_payment`]).
//! - **Amortization schedule**: the period-by-period principal/interest split of
//!   that payment ([`schedule`]), plus the constant-principal variant.
//! - **Growth simulation**: compounding with periodic contributions
//!   ([`simulate_accumulation`]) and fixed-payment debt payoff
//!   ([`simulate_payoff`]).
//! - **Goal analysis**: shortfall against an inflation-adjusted target and the
//!   extra contribution that closes it ([`assess`]).
//!
//! All amounts are [`rust_decimal::Decimal`]. Engine rates are decimal
//! fractions per period; the [`calculators`] module accepts percentages the way
//! users type them.
//!
//! ## Usage
//!
//! ```rust
//! use projection_engine::{amortized_payment, simulate_payoff, ProjectionError};
//! use rust_decimal_macros::dec;
//!
//! let payment = amortized_payment(dec!(5000000), dec!(0.085) / dec!(12), 240).unwrap();
//! assert_eq!(payment.round_dp(2), dec!(43391.16));
//!
//! match simulate_payoff(dec!(5000), dec!(0.015), dec!(50)) {
//!     Err(ProjectionError::NonConverging { interest, .. }) => {
//!         println!("Payment never covers the {interest} of monthly interest");
//!     }
//!     other => panic!("unexpected result: {other:?}"),
//! }
//! ```

pub mod calculators;
pub mod error;
pub mod goal;
pub mod growth;
mod numeric;
pub mod payment;
pub mod rates;
pub mod schedule;

pub use calculators::{
    CalculatorRequest, CalculatorResponse, CreditCardInput, CreditCardResult, InvestmentInput,
    InvestmentResult, LoanInput, LoanResult, RepaymentMethod, RetirementInput,
    RetirementPlanResult, RetirementTarget, calculate_credit_card_payoff, calculate_investment,
    calculate_loan, calculate_retirement_plan, handle_json_request, handle_request,
};
pub use error::{ProjectionError, ProjectionResult};
pub use goal::{GoalAssessment, assess, assess_with_frequency, required_periodic_contribution};
pub use growth::{
    AccumulationPlan, AccumulationSummary, CompoundingFrequency, GrowthPeriod, MAX_PAYOFF_PERIODS,
    PAYOFF_EPSILON, PayoffSchedule, PayoffStatus, simulate_accumulation,
    simulate_accumulation_with, simulate_payoff, simulate_payoff_capped,
};
pub use numeric::MONTHS_PER_YEAR;
pub use payment::amortized_payment;
pub use rates::{deflate, inflate, normalize_annual_interest_rate, periodic_rate};
pub use schedule::{
    AmortizationSchedule, ConstantPrincipalSchedule, PaymentPeriod, constant_principal_schedule,
    schedule, schedule_with_payment,
};
