//! # Calculators
//!
//! One module per calculator. Every module follows the same shape:
//!
//! - an `*Input` struct (serde, `validate()`, usually `clamped()`)
//! - a `*Result` struct with [`Money`](crate::units::Money) outputs
//! - a pure `calculate`-style function returning [`CalcResult`]
//!
//! | Module | Calculator |
//! |--------|------------|
//! | [`emi`] | Loan EMI, amortization, prepayment, rate shock |
//! | [`credit_payoff`] | Credit-card payoff time and interest |
//! | [`loan_eligibility`] | Home-loan eligibility (FOIR + LTV) |
//! | [`mortgage`] | US monthly housing cost, UK affordability |
//! | [`deposits`] | Fixed/recurring deposits, simple savings interest |
//! | [`sip`] | SIP and lump-sum investments |
//! | [`savings`] | Savings growth projection and goal deposit |
//! | [`retirement`] | 401(k) projection |
//! | [`vat`] | UK VAT add/remove and Flat Rate Scheme |
//! | [`income_tax`] | Indian income tax, old vs new regime |
//! | [`budget`] | Household budget summary and chart data |
//!
//! [`CalculationItem`] wraps every input so a worksheet can hold a mix of
//! calculators; [`evaluate`] dispatches one item to its calculator.

pub mod budget;
pub mod credit_payoff;
pub mod deposits;
pub mod emi;
pub mod income_tax;
pub mod loan_eligibility;
pub mod mortgage;
pub mod retirement;
pub mod savings;
pub mod sip;
pub mod vat;

use serde::{Deserialize, Serialize};

use crate::equations::Formula;
use crate::errors::CalcResult;
use crate::inputs::ClampedField;
use crate::policy::PolicySet;

pub use budget::{BudgetCharts, BudgetInput, BudgetSummary};
pub use credit_payoff::{CreditPayoffInput, CreditPayoffResult};
pub use deposits::{
    FixedDepositInput,
    FixedDepositResult,
    RecurringDepositInput,
    RecurringDepositResult,
    SavingsInterestInput,
    SavingsInterestResult,
};
pub use emi::{EmiInput, EmiResult, PrepaymentInput, PrepaymentResult};
pub use income_tax::{IncomeTaxInput, IncomeTaxResult};
pub use loan_eligibility::{EligibilityOutcome, LoanEligibilityInput};
pub use mortgage::{AffordabilityInput, AffordabilityResult, MortgageInput, MortgageResult};
pub use retirement::{RetirementInput, RetirementResult};
pub use savings::{SavingsGoalInput, SavingsGoalResult, SavingsInput, SavingsProjection};
pub use sip::{InvestmentResult, LumpsumInput, SipInput};
pub use vat::{VatInput, VatResult};

/// Any calculator input, tagged by `type` in JSON.
///
/// ```json
/// { "type": "Emi", "label": "Car", "principal": 800000, "annual_rate_pct": 9.5, "tenure_years": 5 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum CalculationItem {
    Emi(EmiInput),
    Prepayment(PrepaymentInput),
    CreditPayoff(CreditPayoffInput),
    LoanEligibility(LoanEligibilityInput),
    Mortgage(MortgageInput),
    UkAffordability(AffordabilityInput),
    FixedDeposit(FixedDepositInput),
    RecurringDeposit(RecurringDepositInput),
    SavingsInterest(SavingsInterestInput),
    Sip(SipInput),
    Lumpsum(LumpsumInput),
    SavingsGrowth(SavingsInput),
    SavingsGoal(SavingsGoalInput),
    Retirement(RetirementInput),
    Vat(VatInput),
    IncomeTax(IncomeTaxInput),
    Budget(BudgetInput),
}

impl CalculationItem {
    /// User label of the wrapped input.
    pub fn label(&self) -> &str {
        match self {
            CalculationItem::Emi(i) => &i.label,
            CalculationItem::Prepayment(i) => &i.loan.label,
            CalculationItem::CreditPayoff(i) => &i.label,
            CalculationItem::LoanEligibility(i) => &i.label,
            CalculationItem::Mortgage(i) => &i.label,
            CalculationItem::UkAffordability(i) => &i.label,
            CalculationItem::FixedDeposit(i) => &i.label,
            CalculationItem::RecurringDeposit(i) => &i.label,
            CalculationItem::SavingsInterest(i) => &i.label,
            CalculationItem::Sip(i) => &i.label,
            CalculationItem::Lumpsum(i) => &i.label,
            CalculationItem::SavingsGrowth(i) => &i.label,
            CalculationItem::SavingsGoal(i) => &i.savings.label,
            CalculationItem::Retirement(i) => &i.label,
            CalculationItem::Vat(i) => &i.label,
            CalculationItem::IncomeTax(i) => &i.label,
            CalculationItem::Budget(i) => &i.label,
        }
    }

    /// Human-readable calculator name.
    pub fn calc_type(&self) -> &'static str {
        match self {
            CalculationItem::Emi(_) => "Loan EMI",
            CalculationItem::Prepayment(_) => "Loan Prepayment",
            CalculationItem::CreditPayoff(_) => "Credit Card Payoff",
            CalculationItem::LoanEligibility(_) => "Home Loan Eligibility",
            CalculationItem::Mortgage(_) => "Mortgage",
            CalculationItem::UkAffordability(_) => "UK Mortgage Affordability",
            CalculationItem::FixedDeposit(_) => "Fixed Deposit",
            CalculationItem::RecurringDeposit(_) => "Recurring Deposit",
            CalculationItem::SavingsInterest(_) => "Savings Interest",
            CalculationItem::Sip(_) => "SIP",
            CalculationItem::Lumpsum(_) => "Lump Sum",
            CalculationItem::SavingsGrowth(_) => "Savings Growth",
            CalculationItem::SavingsGoal(_) => "Savings Goal",
            CalculationItem::Retirement(_) => "401(k) Retirement",
            CalculationItem::Vat(_) => "VAT",
            CalculationItem::IncomeTax(_) => "Income Tax",
            CalculationItem::Budget(_) => "Budget",
        }
    }

    /// Formulas the calculator applies, for the formula usage report.
    pub fn formulas(&self) -> &'static [Formula] {
        use Formula::*;
        match self {
            CalculationItem::Emi(_) => &[LoanPayment, AmortizationSplit],
            CalculationItem::Prepayment(_) => &[LoanPayment, AmortizationSplit, LoanTerm],
            CalculationItem::CreditPayoff(_) => &[LoanTerm, LoanPayment],
            CalculationItem::LoanEligibility(_) => &[
                WeightedIncome,
                FoirMaxEmi,
                EligibilityTenure,
                LoanPresentValue,
                LtvCapacity,
                LoanPayment,
            ],
            CalculationItem::Mortgage(_) => &[
                LoanPayment,
                MonthlyHousingCost,
                PmiDropOff,
                RemainingBalance,
                AmortizationSplit,
            ],
            CalculationItem::UkAffordability(_) => &[UkAffordability, LoanPayment],
            CalculationItem::FixedDeposit(_) => &[FixedDepositMaturity],
            CalculationItem::RecurringDeposit(_) => &[RecurringDepositMaturity, MonthlyEquivalentRate],
            CalculationItem::SavingsInterest(_) => &[SimpleInterest],
            CalculationItem::Sip(_) => &[SipFutureValue, LumpsumFutureValue],
            CalculationItem::Lumpsum(_) => &[LumpsumFutureValue],
            CalculationItem::SavingsGrowth(_) => &[PeriodicSavingsGrowth, RealValue],
            CalculationItem::SavingsGoal(_) => &[RequiredDeposit],
            CalculationItem::Retirement(_) => &[EmployeeDeferral, EmployerMatch, RetirementBalance, SafeWithdrawal],
            CalculationItem::Vat(_) => &[VatAdd, VatRemove, FlatRateVat],
            CalculationItem::IncomeTax(_) => &[SlabTax, HealthEducationCess],
            CalculationItem::Budget(_) => &[SavingsRate, DebtToIncome, LoanPayment],
        }
    }

    /// Clamp the wrapped input into its field bounds.
    ///
    /// Calculators without bounds tables are returned unchanged. Savings
    /// projections clamp inside [`savings::project`] and report it there.
    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        fn wrap<T>(pair: (T, Vec<ClampedField>), f: fn(T) -> CalculationItem) -> (CalculationItem, Vec<ClampedField>) {
            (f(pair.0), pair.1)
        }

        match self {
            CalculationItem::Emi(i) => wrap(i.clamped(), CalculationItem::Emi),
            CalculationItem::CreditPayoff(i) => wrap(i.clamped(), CalculationItem::CreditPayoff),
            CalculationItem::LoanEligibility(i) => wrap(i.clamped(), CalculationItem::LoanEligibility),
            CalculationItem::Mortgage(i) => wrap(i.clamped(), CalculationItem::Mortgage),
            CalculationItem::FixedDeposit(i) => wrap(i.clamped(), CalculationItem::FixedDeposit),
            CalculationItem::RecurringDeposit(i) => wrap(i.clamped(), CalculationItem::RecurringDeposit),
            CalculationItem::Sip(i) => wrap(i.clamped(), CalculationItem::Sip),
            CalculationItem::Lumpsum(i) => wrap(i.clamped(), CalculationItem::Lumpsum),
            CalculationItem::Retirement(i) => wrap(i.clamped(), CalculationItem::Retirement),
            CalculationItem::Vat(i) => wrap(i.clamped(), CalculationItem::Vat),
            other => (other.clone(), Vec::new()),
        }
    }
}

/// Result of evaluating a [`CalculationItem`], tagged to match it.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type")]
pub enum CalculationOutput {
    Emi(EmiResult),
    Prepayment(PrepaymentResult),
    CreditPayoff(CreditPayoffResult),
    LoanEligibility(EligibilityOutcome),
    Mortgage(MortgageResult),
    UkAffordability(AffordabilityResult),
    FixedDeposit(FixedDepositResult),
    RecurringDeposit(RecurringDepositResult),
    SavingsInterest(SavingsInterestResult),
    Sip(InvestmentResult),
    Lumpsum(InvestmentResult),
    SavingsGrowth(SavingsProjection),
    SavingsGoal(SavingsGoalResult),
    Retirement(RetirementResult),
    Vat(VatResult),
    IncomeTax(IncomeTaxResult),
    Budget { summary: BudgetSummary, charts: BudgetCharts },
}

/// Run the calculator for `item` with the given policy tables.
pub fn evaluate(item: &CalculationItem, policy: &PolicySet) -> CalcResult<CalculationOutput> {
    let output = match item {
        CalculationItem::Emi(i) => CalculationOutput::Emi(emi::calculate(i)?),
        CalculationItem::Prepayment(i) => CalculationOutput::Prepayment(emi::simulate_prepayment(i)?),
        CalculationItem::CreditPayoff(i) => CalculationOutput::CreditPayoff(credit_payoff::calculate(i)?),
        CalculationItem::LoanEligibility(i) => {
            CalculationOutput::LoanEligibility(loan_eligibility::calculate(i, &policy.lending)?)
        }
        CalculationItem::Mortgage(i) => CalculationOutput::Mortgage(mortgage::calculate(i, &policy.mortgage)?),
        CalculationItem::UkAffordability(i) => {
            CalculationOutput::UkAffordability(mortgage::affordability(i, &policy.mortgage)?)
        }
        CalculationItem::FixedDeposit(i) => CalculationOutput::FixedDeposit(deposits::fixed_deposit(i)?),
        CalculationItem::RecurringDeposit(i) => CalculationOutput::RecurringDeposit(deposits::recurring_deposit(i)?),
        CalculationItem::SavingsInterest(i) => CalculationOutput::SavingsInterest(deposits::savings_interest(i)?),
        CalculationItem::Sip(i) => CalculationOutput::Sip(sip::sip(i)?),
        CalculationItem::Lumpsum(i) => CalculationOutput::Lumpsum(sip::lumpsum(i)?),
        CalculationItem::SavingsGrowth(i) => CalculationOutput::SavingsGrowth(savings::project(i)?),
        CalculationItem::SavingsGoal(i) => CalculationOutput::SavingsGoal(savings::goal(i)?),
        CalculationItem::Retirement(i) => CalculationOutput::Retirement(retirement::calculate(i, &policy.retirement)?),
        CalculationItem::Vat(i) => CalculationOutput::Vat(vat::calculate(i, &policy.vat)?),
        CalculationItem::IncomeTax(i) => CalculationOutput::IncomeTax(income_tax::calculate(i, &policy.income_tax)?),
        CalculationItem::Budget(i) => {
            let summary = budget::summarize(i)?;
            let charts = summary.charts(&i.expenses);
            CalculationOutput::Budget { summary, charts }
        }
    };

    tracing::debug!(label = %item.label(), calc = item.calc_type(), "item evaluated");
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::units::Money;

    fn car_loan() -> CalculationItem {
        CalculationItem::Emi(EmiInput {
            label: "Car".to_string(),
            principal: 800_000.0,
            annual_rate_pct: 9.5,
            tenure_years: 5.0,
        })
    }

    #[test]
    fn test_item_json_is_tagged() {
        let json = serde_json::to_string(&car_loan()).unwrap();
        assert!(json.contains(r#""type":"Emi""#));

        let roundtrip: CalculationItem = serde_json::from_str(&json).unwrap();
        assert_eq!(roundtrip, car_loan());
    }

    #[test]
    fn test_item_from_partial_json() {
        let item: CalculationItem =
            serde_json::from_str(r#"{ "type": "Vat", "mode": "remove", "amount": 120.0 }"#).unwrap();
        assert_eq!(item.calc_type(), "VAT");

        match evaluate(&item, &PolicySet::default()).unwrap() {
            CalculationOutput::Vat(result) => assert_eq!(result.net, Money::from_major(100.0)),
            other => panic!("unexpected output {:?}", other),
        }
    }

    #[test]
    fn test_label_and_formulas() {
        let item = car_loan();
        assert_eq!(item.label(), "Car");
        assert!(item.formulas().contains(&Formula::LoanPayment));
        assert!(!item.formulas().contains(&Formula::RemainingBalance));

        let mortgage = CalculationItem::Mortgage(MortgageInput::default());
        assert!(mortgage.formulas().contains(&Formula::RemainingBalance));
        assert!(mortgage.formulas().contains(&Formula::PmiDropOff));
    }

    #[test]
    fn test_evaluate_emi() {
        let output = evaluate(&car_loan(), &PolicySet::default()).unwrap();
        let json = serde_json::to_value(&output).unwrap();
        assert_eq!(json["type"], "Emi");
        assert!(json["emi"].is_number());
    }

    #[test]
    fn test_evaluate_propagates_validation_errors() {
        let item = CalculationItem::Emi(EmiInput {
            label: "Bad".to_string(),
            principal: -1.0,
            annual_rate_pct: 9.5,
            tenure_years: 5.0,
        });
        let err = evaluate(&item, &PolicySet::default()).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_clamped_item() {
        let item = CalculationItem::Emi(EmiInput {
            label: "Huge".to_string(),
            principal: 1.0e12,
            annual_rate_pct: 9.5,
            tenure_years: 5.0,
        });
        let (clamped, adjustments) = item.clamped();
        assert_eq!(adjustments.len(), 1);
        assert_eq!(adjustments[0].field, "principal");
        assert_ne!(clamped, item);

        let budget = CalculationItem::Budget(BudgetInput::default());
        let (same, none) = budget.clamped();
        assert_eq!(same, budget);
        assert!(none.is_empty());
    }

    #[test]
    fn test_budget_output_has_charts() {
        let output = evaluate(&CalculationItem::Budget(BudgetInput::default()), &PolicySet::default()).unwrap();
        match output {
            CalculationOutput::Budget { summary, charts } => {
                assert!(summary.total_income > Money::ZERO);
                assert!(charts.savings_trend.has_data() || summary.net_savings <= Money::ZERO);
            }
            other => panic!("unexpected output {:?}", other),
        }
    }
}
