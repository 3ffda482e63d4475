//! # Mortgages
//!
//! - [`calculate`] - US monthly payment with the full PITI breakdown
//!   (principal & interest, property tax, insurance, PMI, HOA/other)
//! - [`affordability`] - UK maximum loan from an income multiple
//!
//! Principal & interest reuse the level-payment formula from
//! [`equations::annuity`](crate::equations::annuity), so a 0% rate is
//! allowed and pays `loan / months`.
//!
//! ## Example
//!
//! ```rust
//! use fincalc_core::calculations::mortgage::{calculate, MortgageInput};
//! use fincalc_core::policy::MortgagePolicy;
//!
//! let input = MortgageInput {
//!     home_price: 400_000.0,
//!     down_payment_pct: 10.0,
//!     ..MortgageInput::default()
//! };
//! let result = calculate(&input, &MortgagePolicy::default()).unwrap();
//! assert_eq!(result.loan_amount.major(), 360_000.0);
//! assert!(result.pmi_drop_off_month.is_some());
//! ```

use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::calculations::emi::{self, EmiInput, YearlyRow};
use crate::equations::annuity;
use crate::errors::{require_at_most, require_non_negative, require_positive, CalcError, CalcResult, MAX_HORIZON_YEARS};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::policy::MortgagePolicy;
use crate::units::Money;

pub const HOME_PRICE_BOUNDS: FieldBounds = FieldBounds::new(50_000.0, 5_000_000.0, 5_000.0, 400_000.0);
pub const DOWN_PAYMENT_BOUNDS: FieldBounds = FieldBounds::new(0.0, 95.0, 1.0, 20.0);
pub const RATE_BOUNDS: FieldBounds = FieldBounds::new(0.0, 15.0, 0.125, 6.5);
pub const TERM_BOUNDS: FieldBounds = FieldBounds::new(1.0, 40.0, 1.0, 30.0);

// ============================================================================
// US Mortgage (PITI)
// ============================================================================

/// Recurring costs on top of principal & interest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HousingCosts {
    /// Annual property tax as % of home price
    pub property_tax_pct: f64,
    /// Annual homeowners insurance
    pub home_insurance: f64,
    /// Annual PMI as % of the loan
    pub pmi_rate_pct: f64,
    /// Monthly HOA fee
    pub hoa_monthly: f64,
    /// Other annual costs
    pub other_annual: f64,
}

impl Default for HousingCosts {
    fn default() -> Self {
        HousingCosts {
            property_tax_pct: 1.2,
            home_insurance: 1_500.0,
            pmi_rate_pct: 0.5,
            hoa_monthly: 0.0,
            other_annual: 0.0,
        }
    }
}

/// ## JSON Example
///
/// ```json
/// {
///   "label": "Starter home",
///   "home_price": 400000.0,
///   "down_payment_pct": 10.0,
///   "annual_rate_pct": 6.5,
///   "term_years": 30.0,
///   "costs": { "property_tax_pct": 1.2, "home_insurance": 1200.0, "pmi_rate_pct": 0.5 },
///   "start_date": "2025-12-01"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortgageInput {
    pub label: String,
    pub home_price: f64,
    pub down_payment_pct: f64,
    pub annual_rate_pct: f64,
    pub term_years: f64,
    /// Taxes, insurance and fees; `None` reports principal & interest only
    pub costs: Option<HousingCosts>,
    /// Month of the first payment; defaults to the current month
    pub start_date: Option<NaiveDate>,
}

impl Default for MortgageInput {
    fn default() -> Self {
        MortgageInput {
            label: String::new(),
            home_price: HOME_PRICE_BOUNDS.default,
            down_payment_pct: DOWN_PAYMENT_BOUNDS.default,
            annual_rate_pct: RATE_BOUNDS.default,
            term_years: TERM_BOUNDS.default,
            costs: Some(HousingCosts::default()),
            start_date: None,
        }
    }
}

impl MortgageInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("home_price", self.home_price)?;
        require_non_negative("down_payment_pct", self.down_payment_pct)?;
        if self.down_payment_pct >= 100.0 {
            return Err(CalcError::invalid_input(
                "down_payment_pct",
                self.down_payment_pct.to_string(),
                "Down payment must leave a loan to finance",
            ));
        }
        require_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        require_positive("term_years", self.term_years)?;
        require_at_most("term_years", self.term_years, MAX_HORIZON_YEARS)?;
        if let Some(costs) = &self.costs {
            require_non_negative("property_tax_pct", costs.property_tax_pct)?;
            require_non_negative("home_insurance", costs.home_insurance)?;
            require_non_negative("pmi_rate_pct", costs.pmi_rate_pct)?;
            require_non_negative("hoa_monthly", costs.hoa_monthly)?;
            require_non_negative("other_annual", costs.other_annual)?;
        }
        Ok(())
    }

    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let input = MortgageInput {
            home_price: c.apply("home_price", self.home_price, &HOME_PRICE_BOUNDS),
            down_payment_pct: c.apply("down_payment_pct", self.down_payment_pct, &DOWN_PAYMENT_BOUNDS),
            annual_rate_pct: c.apply("annual_rate_pct", self.annual_rate_pct, &RATE_BOUNDS),
            term_years: c.apply("term_years", self.term_years, &TERM_BOUNDS),
            ..self.clone()
        };
        (input, c.into_adjustments())
    }

    pub fn loan_amount(&self) -> f64 {
        self.home_price * (1.0 - self.down_payment_pct / 100.0)
    }

    pub fn months(&self) -> u32 {
        (self.term_years * 12.0).round().max(0.0) as u32
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MonthlyBreakdown {
    pub principal_interest: Money,
    pub property_tax: Money,
    pub home_insurance: Money,
    pub pmi: Money,
    /// HOA plus other costs
    pub other: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MortgageResult {
    pub loan_amount: Money,
    pub down_payment: Money,
    pub monthly: MonthlyBreakdown,
    /// Principal & interest over the full term
    pub total_principal_interest: Money,
    pub total_interest: Money,
    pub start_date: NaiveDate,
    /// Start month plus the number of payments
    pub payoff_date: NaiveDate,
    /// Month in which the balance first reaches 80% of the loan; `None`
    /// when no PMI is charged
    pub pmi_drop_off_month: Option<u32>,
    pub yearly_schedule: Vec<YearlyRow>,
}

/// First month at which the balance falls to `(100 - equity%)` of the loan.
pub fn pmi_drop_off_month(loan: f64, rate: f64, payment: f64, equity_pct: f64, max_months: u32) -> Option<u32> {
    let target = loan * (1.0 - equity_pct / 100.0);
    (1..=max_months).find(|&month| annuity::remaining_balance(loan, rate, payment, month as f64) <= target)
}

fn first_of_month(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// US mortgage payment with PITI breakdown, payoff date and yearly schedule.
pub fn calculate(input: &MortgageInput, policy: &MortgagePolicy) -> CalcResult<MortgageResult> {
    input.validate()?;

    let loan = input.loan_amount();
    let months = input.months();
    if months == 0 {
        return Err(CalcError::invalid_input("term_years", input.term_years.to_string(), "Term is under one month"));
    }
    let rate = annuity::monthly_rate(input.annual_rate_pct);
    let pi = annuity::payment(loan, rate, months as f64);

    let pmi_applies = input.down_payment_pct < policy.pmi_equity_threshold_pct;
    let (tax, insurance, pmi, other) = match &input.costs {
        Some(costs) => (
            input.home_price * costs.property_tax_pct / 100.0 / 12.0,
            costs.home_insurance / 12.0,
            if pmi_applies { loan * costs.pmi_rate_pct / 100.0 / 12.0 } else { 0.0 },
            costs.hoa_monthly + costs.other_annual / 12.0,
        ),
        None => (0.0, 0.0, 0.0, 0.0),
    };

    let start_date = first_of_month(input.start_date.unwrap_or_else(|| chrono::Utc::now().date_naive()));
    let payoff_date = start_date
        .checked_add_months(Months::new(months))
        .ok_or_else(|| CalcError::calculation_failed("mortgage", "Payoff date out of range"))?;

    let pmi_drop_off = if pmi_applies {
        pmi_drop_off_month(loan, rate, pi, policy.pmi_equity_threshold_pct, months)
    } else {
        None
    };

    let schedule_input = EmiInput {
        label: input.label.clone(),
        principal: loan,
        annual_rate_pct: input.annual_rate_pct,
        tenure_years: input.term_years,
    };
    let yearly_schedule = emi::yearly_schedule(&schedule_input)?;

    tracing::debug!(label = %input.label, loan, pi, pmi_drop_off = ?pmi_drop_off, "mortgage computed");

    let total_pi = pi * months as f64;
    Ok(MortgageResult {
        loan_amount: Money::from_major(loan),
        down_payment: Money::from_major(input.home_price - loan),
        monthly: MonthlyBreakdown {
            principal_interest: Money::from_major(pi),
            property_tax: Money::from_major(tax),
            home_insurance: Money::from_major(insurance),
            pmi: Money::from_major(pmi),
            other: Money::from_major(other),
            total: Money::from_major(pi + tax + insurance + pmi + other),
        },
        total_principal_interest: Money::from_major(total_pi),
        total_interest: Money::from_major(total_pi - loan),
        start_date,
        payoff_date,
        pmi_drop_off_month: pmi_drop_off,
        yearly_schedule,
    })
}

// ============================================================================
// UK Affordability
// ============================================================================

/// ## JSON Example
///
/// ```json
/// { "annual_income": 40000.0, "monthly_debt": 500.0, "annual_rate_pct": 5.0, "term_years": 25.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AffordabilityInput {
    pub label: String,
    pub annual_income: f64,
    /// Existing monthly debt repayments
    pub monthly_debt: f64,
    pub annual_rate_pct: f64,
    pub term_years: f64,
}

impl Default for AffordabilityInput {
    fn default() -> Self {
        AffordabilityInput {
            label: String::new(),
            annual_income: 40_000.0,
            monthly_debt: 500.0,
            annual_rate_pct: 5.0,
            term_years: 25.0,
        }
    }
}

impl AffordabilityInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("annual_income", self.annual_income)?;
        require_non_negative("monthly_debt", self.monthly_debt)?;
        require_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        require_positive("term_years", self.term_years)?;
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AffordabilityResult {
    /// Income × multiple, less debt payments over the term; zero when negative
    pub max_loan: Money,
    pub monthly_payment: Money,
    pub affordable: bool,
}

/// UK maximum mortgage: income × multiple − monthly debts × 12 × years.
pub fn affordability(input: &AffordabilityInput, policy: &MortgagePolicy) -> CalcResult<AffordabilityResult> {
    input.validate()?;

    let max_loan = input.annual_income * policy.uk_income_multiple - input.monthly_debt * 12.0 * input.term_years;
    if max_loan <= 0.0 {
        tracing::debug!(label = %input.label, max_loan, "debts exceed borrowing capacity");
        return Ok(AffordabilityResult {
            max_loan: Money::ZERO,
            monthly_payment: Money::ZERO,
            affordable: false,
        });
    }

    let months = (input.term_years * 12.0).round().max(1.0);
    let payment = annuity::payment(max_loan, annuity::monthly_rate(input.annual_rate_pct), months);

    Ok(AffordabilityResult {
        max_loan: Money::from_major(max_loan),
        monthly_payment: Money::from_major(payment),
        affordable: true,
    })
}
