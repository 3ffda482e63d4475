//! # Home Loan Eligibility (India)
//!
//! Largest home loan a lender will sanction, bounded by two independent
//! rules:
//!
//! - **FOIR**: total EMIs may not exceed a share of weighted monthly income
//! - **LTV**: the loan may not exceed a share of the property value (RBI bands)
//!
//! The eligible loan is the smaller of the two bounds. Applicants whose age
//! leaves no tenure, or whose existing EMIs already use up the FOIR, get an
//! [`EligibilityOutcome::Ineligible`] outcome rather than an error.
//!
//! ## Example
//!
//! ```rust
//! use fincalc_core::calculations::loan_eligibility::{calculate, LoanEligibilityInput, LimitingFactor};
//! use fincalc_core::policy::LendingPolicy;
//!
//! let input = LoanEligibilityInput {
//!     annual_income: 1_200_000.0,
//!     co_applicant_income: 600_000.0,
//!     existing_emi: 10_000.0,
//!     property_value: 6_000_000.0,
//!     ltv_pct: 90.0,
//!     ..LoanEligibilityInput::default()
//! };
//!
//! let outcome = calculate(&input, &LendingPolicy::default()).unwrap();
//! let result = outcome.result().unwrap();
//! assert_eq!(result.limiting_factor, LimitingFactor::Ltv);
//! assert_eq!(result.eligible_loan.major(), 4_800_000.0);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::annuity;
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::policy::LendingPolicy;
use crate::units::Money;

pub const INCOME_BOUNDS: FieldBounds = FieldBounds::new(300_000.0, 50_000_000.0, 50_000.0, 1_200_000.0);
pub const CO_APPLICANT_BOUNDS: FieldBounds = FieldBounds::new(0.0, 50_000_000.0, 50_000.0, 0.0);
pub const OTHER_INCOME_BOUNDS: FieldBounds = FieldBounds::new(0.0, 10_000_000.0, 10_000.0, 0.0);
pub const AGE_BOUNDS: FieldBounds = FieldBounds::new(21.0, 65.0, 1.0, 35.0);
pub const EXISTING_EMI_BOUNDS: FieldBounds = FieldBounds::new(0.0, 500_000.0, 1_000.0, 15_000.0);
pub const PROPERTY_BOUNDS: FieldBounds = FieldBounds::new(1_000_000.0, 100_000_000.0, 100_000.0, 5_000_000.0);
pub const RATE_BOUNDS: FieldBounds = FieldBounds::new(6.0, 15.0, 0.05, 8.5);
pub const TENURE_BOUNDS: FieldBounds = FieldBounds::new(5.0, 30.0, 1.0, 20.0);
pub const FOIR_BOUNDS: FieldBounds = FieldBounds::new(30.0, 70.0, 1.0, 50.0);
pub const LTV_BOUNDS: FieldBounds = FieldBounds::new(50.0, 90.0, 1.0, 80.0);

// ============================================================================
// Applicant Categories
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EmploymentType {
    #[default]
    Salaried,
    SelfEmployed,
}

impl EmploymentType {
    pub fn retirement_age(&self, policy: &LendingPolicy) -> u32 {
        match self {
            EmploymentType::Salaried => policy.retirement_age_salaried,
            EmploymentType::SelfEmployed => policy.retirement_age_self_employed,
        }
    }

    /// Typical loan-to-annual-income multiple lenders offer (min, max)
    pub fn typical_multiplier(&self) -> (f64, f64) {
        match self {
            EmploymentType::Salaried => (4.0, 6.0),
            EmploymentType::SelfEmployed => (3.0, 5.0),
        }
    }
}

/// Lender category, which sets the FOIR ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LenderType {
    /// Public-sector bank
    Psu,
    #[default]
    Private,
    /// Non-banking financial company
    Nbfc,
}

impl LenderType {
    pub fn foir_cap_pct(&self, policy: &LendingPolicy) -> f64 {
        match self {
            LenderType::Psu => policy.foir_caps.psu,
            LenderType::Private => policy.foir_caps.private,
            LenderType::Nbfc => policy.foir_caps.nbfc,
        }
    }
}

/// Credit-score band as lenders quote it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum CreditScoreBand {
    #[default]
    #[serde(rename = "750+")]
    Excellent,
    #[serde(rename = "700-749")]
    Good,
    #[serde(rename = "650-699")]
    Fair,
    #[serde(rename = "below-650")]
    Poor,
}

impl CreditScoreBand {
    /// Band for a numeric CIBIL-style score.
    pub fn from_score(score: u16) -> Self {
        match score {
            750.. => CreditScoreBand::Excellent,
            700..=749 => CreditScoreBand::Good,
            650..=699 => CreditScoreBand::Fair,
            _ => CreditScoreBand::Poor,
        }
    }

    /// Percentage points added to the quoted rate.
    pub fn rate_adjustment_pct(&self, policy: &LendingPolicy) -> f64 {
        let adj = &policy.credit_score_adjustments;
        match self {
            CreditScoreBand::Excellent => adj.excellent,
            CreditScoreBand::Good => adj.good,
            CreditScoreBand::Fair => adj.fair,
            CreditScoreBand::Poor => adj.poor,
        }
    }

    fn approval_points(&self) -> u32 {
        match self {
            CreditScoreBand::Excellent => 30,
            CreditScoreBand::Good => 20,
            CreditScoreBand::Fair => 10,
            CreditScoreBand::Poor => 3,
        }
    }
}

// ============================================================================
// Input
// ============================================================================

/// Applicant, property and lender details.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Flat in Pune",
///   "annual_income": 1200000.0,
///   "co_applicant_income": 600000.0,
///   "other_income": 0.0,
///   "existing_emi": 10000.0,
///   "annual_rate_pct": 8.5,
///   "tenure_years": 20.0,
///   "property_value": 6000000.0,
///   "foir_pct": 50.0,
///   "ltv_pct": 90.0,
///   "age": 35,
///   "employment": "salaried",
///   "credit_score": "750+",
///   "lender": "private",
///   "include_charges": true
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LoanEligibilityInput {
    pub label: String,
    /// Primary applicant's gross annual income
    pub annual_income: f64,
    /// Co-applicant (spouse) annual income
    pub co_applicant_income: f64,
    /// Rental or other annual income
    pub other_income: f64,
    /// EMIs already being paid each month
    pub existing_emi: f64,
    /// Quoted annual rate before credit-score loading
    pub annual_rate_pct: f64,
    pub tenure_years: f64,
    pub property_value: f64,
    /// Requested FOIR (%)
    pub foir_pct: f64,
    /// Requested LTV (%)
    pub ltv_pct: f64,
    pub age: u32,
    pub employment: EmploymentType,
    pub credit_score: CreditScoreBand,
    pub lender: LenderType,
    /// Report processing fee, GST, stamp duty and legal charges
    pub include_charges: bool,
}

impl Default for LoanEligibilityInput {
    fn default() -> Self {
        LoanEligibilityInput {
            label: String::new(),
            annual_income: INCOME_BOUNDS.default,
            co_applicant_income: 0.0,
            other_income: 0.0,
            existing_emi: 0.0,
            annual_rate_pct: RATE_BOUNDS.default,
            tenure_years: TENURE_BOUNDS.default,
            property_value: PROPERTY_BOUNDS.default,
            foir_pct: FOIR_BOUNDS.default,
            ltv_pct: LTV_BOUNDS.default,
            age: AGE_BOUNDS.default as u32,
            employment: EmploymentType::Salaried,
            credit_score: CreditScoreBand::Excellent,
            lender: LenderType::Private,
            include_charges: true,
        }
    }
}

impl LoanEligibilityInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("annual_income", self.annual_income)?;
        require_non_negative("co_applicant_income", self.co_applicant_income)?;
        require_non_negative("other_income", self.other_income)?;
        require_non_negative("existing_emi", self.existing_emi)?;
        require_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        require_positive("tenure_years", self.tenure_years)?;
        require_positive("property_value", self.property_value)?;

        for (field, pct) in [("foir_pct", self.foir_pct), ("ltv_pct", self.ltv_pct)] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(CalcError::invalid_input(field, pct.to_string(), "Must be between 0 and 100"));
            }
        }
        if self.age < 18 {
            return Err(CalcError::invalid_input("age", self.age.to_string(), "Applicant must be an adult"));
        }
        Ok(())
    }

    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let input = LoanEligibilityInput {
            annual_income: c.apply("annual_income", self.annual_income, &INCOME_BOUNDS),
            co_applicant_income: c.apply("co_applicant_income", self.co_applicant_income, &CO_APPLICANT_BOUNDS),
            other_income: c.apply("other_income", self.other_income, &OTHER_INCOME_BOUNDS),
            existing_emi: c.apply("existing_emi", self.existing_emi, &EXISTING_EMI_BOUNDS),
            annual_rate_pct: c.apply("annual_rate_pct", self.annual_rate_pct, &RATE_BOUNDS),
            tenure_years: c.apply("tenure_years", self.tenure_years, &TENURE_BOUNDS),
            property_value: c.apply("property_value", self.property_value, &PROPERTY_BOUNDS),
            foir_pct: c.apply("foir_pct", self.foir_pct, &FOIR_BOUNDS),
            ltv_pct: c.apply("ltv_pct", self.ltv_pct, &LTV_BOUNDS),
            age: c.apply("age", self.age as f64, &AGE_BOUNDS) as u32,
            ..self.clone()
        };
        (input, c.into_adjustments())
    }
}

// ============================================================================
// Result
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IneligibilityReason {
    /// Retirement age leaves no tenure
    AgeLimit,
    /// Existing EMIs already use the whole FOIR allowance
    ExistingObligations,
}

impl IneligibilityReason {
    pub fn message(&self) -> &'static str {
        match self {
            IneligibilityReason::AgeLimit => {
                "Your age does not permit a home loan. Please check your age or retirement age."
            }
            IneligibilityReason::ExistingObligations => {
                "Your existing EMI exceeds the maximum allowed FOIR. Please reduce existing obligations."
            }
        }
    }
}

/// Which rule capped the loan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitingFactor {
    /// Repayment capacity (EMI bound is strictly lower)
    Foir,
    /// Property value
    Ltv,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct UpfrontCharges {
    pub processing_fee: Money,
    pub gst: Money,
    pub stamp_duty_and_registration: Money,
    pub legal_charges: Money,
    pub total: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityResult {
    pub eligible_loan: Money,
    pub monthly_emi: Money,
    pub down_payment: Money,
    pub total_amount_payable: Money,
    pub total_interest: Money,

    /// Unweighted sum of all incomes
    pub total_income: Money,
    /// Weighted annual income
    pub effective_income: Money,
    pub monthly_income: Money,
    /// Largest new EMI the FOIR allows
    pub max_monthly_emi: Money,

    pub loan_by_emi_capacity: Money,
    pub loan_by_ltv: Money,
    pub limiting_factor: LimitingFactor,

    /// min(requested, lender cap)
    pub effective_foir_pct: f64,
    /// (new EMI + existing EMIs) / monthly income, capped at 100
    pub foir_utilization_pct: f64,
    pub regulatory_max_ltv_pct: f64,
    /// min(requested, regulatory band)
    pub effective_ltv_pct: f64,
    /// eligible loan / property value
    pub ltv_used_pct: f64,

    pub effective_tenure_years: f64,
    pub tenure_capped: bool,
    /// Quoted rate plus credit-score loading
    pub effective_rate_pct: f64,
    /// Extra EMI paid because of the credit-score loading
    pub credit_score_monthly_cost: Money,

    /// eligible loan / effective annual income
    pub income_multiplier: f64,
    pub typical_multiplier: (f64, f64),
    /// 0-100 heuristic score
    pub approval_score: u32,

    pub charges: Option<UpfrontCharges>,
    /// Down payment plus charges
    pub total_upfront_cost: Money,
}

/// Outcome of an eligibility check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum EligibilityOutcome {
    Eligible(EligibilityResult),
    Ineligible {
        reason: IneligibilityReason,
        message: String,
    },
}

impl EligibilityOutcome {
    fn ineligible(reason: IneligibilityReason) -> Self {
        EligibilityOutcome::Ineligible {
            reason,
            message: reason.message().to_string(),
        }
    }

    pub fn is_eligible(&self) -> bool {
        matches!(self, EligibilityOutcome::Eligible(_))
    }

    /// Sanctionable amount; zero when ineligible.
    pub fn eligible_amount(&self) -> Money {
        match self {
            EligibilityOutcome::Eligible(r) => r.eligible_loan,
            EligibilityOutcome::Ineligible { .. } => Money::ZERO,
        }
    }

    pub fn result(&self) -> Option<&EligibilityResult> {
        match self {
            EligibilityOutcome::Eligible(r) => Some(r),
            EligibilityOutcome::Ineligible { .. } => None,
        }
    }
}

// ============================================================================
// Calculation
// ============================================================================

/// (total, effective) annual income with co-applicant and other income weighted.
pub fn effective_income(input: &LoanEligibilityInput, policy: &LendingPolicy) -> (f64, f64) {
    let total = input.annual_income + input.co_applicant_income + input.other_income;
    let effective = input.annual_income
        + input.co_applicant_income * policy.co_applicant_weight
        + input.other_income * policy.other_income_weight;
    (total, effective)
}

/// Tenure after the retirement-age and policy caps (may be ≤ 0).
pub fn eligible_tenure(input: &LoanEligibilityInput, policy: &LendingPolicy) -> f64 {
    let by_age = input.employment.retirement_age(policy) as f64 - input.age as f64;
    input.tenure_years.min(by_age).min(policy.max_tenure_years as f64)
}

/// Upfront charges for a sanctioned loan.
pub fn upfront_charges(loan: f64, property_value: f64, policy: &LendingPolicy) -> UpfrontCharges {
    let processing = loan * policy.processing_fee_pct / 100.0;
    let gst = processing * policy.gst_on_fee_pct / 100.0;
    let stamp = property_value * policy.stamp_duty_pct / 100.0;
    let legal = policy.legal_charges;
    UpfrontCharges {
        processing_fee: Money::from_major(processing),
        gst: Money::from_major(gst),
        stamp_duty_and_registration: Money::from_major(stamp),
        legal_charges: Money::from_major(legal),
        total: Money::from_major(processing + gst + stamp + legal),
    }
}

/// Heuristic approval score out of 100
/// (FOIR 30 / LTV 25 / credit 30 / age 15 points).
pub fn approval_score(foir_utilization_pct: f64, ltv_used_pct: f64, credit: CreditScoreBand, age: u32) -> u32 {
    let foir = if foir_utilization_pct < 40.0 {
        30
    } else if foir_utilization_pct < 50.0 {
        25
    } else if foir_utilization_pct < 60.0 {
        15
    } else {
        5
    };

    let ltv = if ltv_used_pct < 70.0 {
        25
    } else if ltv_used_pct < 80.0 {
        20
    } else if ltv_used_pct < 90.0 {
        10
    } else {
        5
    };

    let age_points = match age {
        25..=40 => 15,
        41..=50 => 12,
        51..=55 => 8,
        _ => 3,
    };

    (foir + ltv + credit.approval_points() + age_points).min(100)
}

/// Run the full eligibility check.
pub fn calculate(input: &LoanEligibilityInput, policy: &LendingPolicy) -> CalcResult<EligibilityOutcome> {
    input.validate()?;

    let (total_income, effective) = effective_income(input, policy);
    let monthly_income = effective / 12.0;

    let tenure_years = eligible_tenure(input, policy);
    if tenure_years <= 0.0 {
        tracing::debug!(label = %input.label, age = input.age, "ineligible: age limit");
        return Ok(EligibilityOutcome::ineligible(IneligibilityReason::AgeLimit));
    }

    let effective_foir_pct = input.foir_pct.min(input.lender.foir_cap_pct(policy));
    let max_emi = monthly_income * effective_foir_pct / 100.0 - input.existing_emi;
    if max_emi <= 0.0 {
        tracing::debug!(label = %input.label, max_emi, "ineligible: existing obligations");
        return Ok(EligibilityOutcome::ineligible(IneligibilityReason::ExistingObligations));
    }

    let effective_rate_pct = input.annual_rate_pct + input.credit_score.rate_adjustment_pct(policy);
    let rate = annuity::monthly_rate(effective_rate_pct);
    let months = (tenure_years * 12.0).round().max(1.0);

    let loan_by_emi = annuity::present_value(max_emi, rate, months);

    let regulatory_max_ltv_pct = policy.max_ltv_pct(input.property_value);
    let effective_ltv_pct = input.ltv_pct.min(regulatory_max_ltv_pct);
    let loan_by_ltv = input.property_value * effective_ltv_pct / 100.0;

    let (eligible_loan, limiting_factor) = if loan_by_emi < loan_by_ltv {
        (loan_by_emi, LimitingFactor::Foir)
    } else {
        (loan_by_ltv, LimitingFactor::Ltv)
    };

    let emi = annuity::payment(eligible_loan, rate, months);
    let base_emi = annuity::payment(eligible_loan, annuity::monthly_rate(input.annual_rate_pct), months);
    let total_payable = emi * months;
    let down_payment = input.property_value - eligible_loan;

    let foir_utilization_pct = if monthly_income > 0.0 {
        ((emi + input.existing_emi) / monthly_income * 100.0).min(100.0)
    } else {
        100.0
    };
    let ltv_used_pct = eligible_loan / input.property_value * 100.0;
    let income_multiplier = if effective > 0.0 { eligible_loan / effective } else { 0.0 };

    let charges = input
        .include_charges
        .then(|| upfront_charges(eligible_loan, input.property_value, policy));
    let charges_total = charges.as_ref().map(|c| c.total).unwrap_or(Money::ZERO);

    tracing::debug!(
        label = %input.label,
        loan_by_emi,
        loan_by_ltv,
        limiting_factor = ?limiting_factor,
        "eligibility bounds"
    );

    Ok(EligibilityOutcome::Eligible(EligibilityResult {
        eligible_loan: Money::from_major(eligible_loan),
        monthly_emi: Money::from_major(emi),
        down_payment: Money::from_major(down_payment),
        total_amount_payable: Money::from_major(total_payable),
        total_interest: Money::from_major(total_payable - eligible_loan),
        total_income: Money::from_major(total_income),
        effective_income: Money::from_major(effective),
        monthly_income: Money::from_major(monthly_income),
        max_monthly_emi: Money::from_major(max_emi),
        loan_by_emi_capacity: Money::from_major(loan_by_emi),
        loan_by_ltv: Money::from_major(loan_by_ltv),
        limiting_factor,
        effective_foir_pct,
        foir_utilization_pct,
        regulatory_max_ltv_pct,
        effective_ltv_pct,
        ltv_used_pct,
        effective_tenure_years: tenure_years,
        tenure_capped: tenure_years < input.tenure_years,
        effective_rate_pct,
        credit_score_monthly_cost: Money::from_major(emi - base_emi),
        income_multiplier,
        typical_multiplier: input.employment.typical_multiplier(),
        approval_score: approval_score(foir_utilization_pct, ltv_used_pct, input.credit_score, input.age),
        total_upfront_cost: Money::from_major(down_payment) + charges_total,
        charges,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    fn couple() -> LoanEligibilityInput {
        LoanEligibilityInput {
            label: "Pune flat".to_string(),
            annual_income: 1_200_000.0,
            co_applicant_income: 600_000.0,
            other_income: 0.0,
            existing_emi: 10_000.0,
            annual_rate_pct: 8.5,
            tenure_years: 20.0,
            property_value: 6_000_000.0,
            foir_pct: 50.0,
            ltv_pct: 90.0,
            age: 35,
            employment: EmploymentType::Salaried,
            credit_score: CreditScoreBand::Excellent,
            lender: LenderType::Private,
            include_charges: true,
        }
    }

    #[test]
    fn test_reference_case_ltv_bound() {
        let outcome = calculate(&couple(), &LendingPolicy::default()).unwrap();
        let r = outcome.result().unwrap();

        assert_eq!(r.effective_income, Money::from_major(1_650_000.0));
        assert_eq!(r.monthly_income, Money::from_major(137_500.0));
        assert_eq!(r.max_monthly_emi, Money::from_major(58_750.0));
        assert_relative_eq!(r.loan_by_emi_capacity.major(), 6_769_811.84, epsilon = 0.01);
        assert_eq!(r.regulatory_max_ltv_pct, 80.0);
        assert_eq!(r.loan_by_ltv, Money::from_major(4_800_000.0));
        assert_eq!(r.limiting_factor, LimitingFactor::Ltv);
        assert_eq!(outcome.eligible_amount(), Money::from_major(4_800_000.0));
        assert_eq!(r.down_payment, Money::from_major(1_200_000.0));
        assert_relative_eq!(r.ltv_used_pct, 80.0);
        assert!(!r.tenure_capped);
        assert_eq!(r.credit_score_monthly_cost, Money::ZERO);
    }

    #[test]
    fn test_charges_and_score() {
        let outcome = calculate(&couple(), &LendingPolicy::default()).unwrap();
        let r = outcome.result().unwrap();
        let charges = r.charges.as_ref().unwrap();

        assert_eq!(charges.processing_fee, Money::from_major(24_000.0));
        assert_eq!(charges.gst, Money::from_major(4_320.0));
        assert_eq!(charges.stamp_duty_and_registration, Money::from_major(300_000.0));
        assert_eq!(charges.legal_charges, Money::from_major(15_000.0));
        assert_eq!(charges.total, Money::from_major(343_320.0));
        assert_eq!(r.total_upfront_cost, Money::from_major(1_543_320.0));

        // FOIR util ~37.6% (30) + LTV 80% (10) + 750+ (30) + age 35 (15)
        assert!(r.foir_utilization_pct < 40.0);
        assert_eq!(r.approval_score, 85);
    }

    #[test]
    fn test_foir_bound() {
        let input = LoanEligibilityInput {
            property_value: 20_000_000.0,
            ..couple()
        };
        let outcome = calculate(&input, &LendingPolicy::default()).unwrap();
        let r = outcome.result().unwrap();
        assert_eq!(r.limiting_factor, LimitingFactor::Foir);
        assert_eq!(r.regulatory_max_ltv_pct, 75.0);
        assert_eq!(r.eligible_loan, r.loan_by_emi_capacity);
        // EMI on the FOIR-bound loan is the full allowance
        assert_relative_eq!(r.monthly_emi.major(), 58_750.0, epsilon = 0.01);
    }

    #[test]
    fn test_lender_cap_applies() {
        let input = LoanEligibilityInput {
            foir_pct: 70.0,
            lender: LenderType::Psu,
            property_value: 50_000_000.0,
            ..couple()
        };
        let outcome = calculate(&input, &LendingPolicy::default()).unwrap();
        assert_eq!(outcome.result().unwrap().effective_foir_pct, 55.0);
    }

    #[test]
    fn test_age_limit() {
        let input = LoanEligibilityInput { age: 60, ..couple() };
        let outcome = calculate(&input, &LendingPolicy::default()).unwrap();
        assert_eq!(
            outcome,
            EligibilityOutcome::Ineligible {
                reason: IneligibilityReason::AgeLimit,
                message: IneligibilityReason::AgeLimit.message().to_string(),
            }
        );
        assert_eq!(outcome.eligible_amount(), Money::ZERO);

        // Self-employed retire at 65, so 60 still gets five years
        let input = LoanEligibilityInput {
            age: 60,
            employment: EmploymentType::SelfEmployed,
            ..couple()
        };
        let outcome = calculate(&input, &LendingPolicy::default()).unwrap();
        let r = outcome.result().unwrap();
        assert_eq!(r.effective_tenure_years, 5.0);
        assert!(r.tenure_capped);
    }

    #[test]
    fn test_existing_obligations() {
        let input = LoanEligibilityInput {
            existing_emi: 70_000.0,
            ..couple()
        };
        let outcome = calculate(&input, &LendingPolicy::default()).unwrap();
        assert!(!outcome.is_eligible());
        assert!(matches!(
            outcome,
            EligibilityOutcome::Ineligible {
                reason: IneligibilityReason::ExistingObligations,
                ..
            }
        ));
    }

    #[test]
    fn test_credit_score_loading() {
        let input = LoanEligibilityInput {
            credit_score: CreditScoreBand::Fair,
            ..couple()
        };
        let outcome = calculate(&input, &LendingPolicy::default()).unwrap();
        let r = outcome.result().unwrap();
        assert_relative_eq!(r.effective_rate_pct, 9.25);
        assert!(r.credit_score_monthly_cost > Money::ZERO);

        assert_eq!(CreditScoreBand::from_score(780), CreditScoreBand::Excellent);
        assert_eq!(CreditScoreBand::from_score(700), CreditScoreBand::Good);
        assert_eq!(CreditScoreBand::from_score(699), CreditScoreBand::Fair);
        assert_eq!(CreditScoreBand::from_score(500), CreditScoreBand::Poor);
    }

    #[test]
    fn test_approval_score_bands() {
        assert_eq!(approval_score(35.0, 65.0, CreditScoreBand::Excellent, 30), 100);
        assert_eq!(approval_score(65.0, 95.0, CreditScoreBand::Poor, 60), 16);
        assert_eq!(approval_score(45.0, 75.0, CreditScoreBand::Good, 45), 77);
    }

    #[test]
    fn test_outcome_serialization() {
        let outcome = EligibilityOutcome::ineligible(IneligibilityReason::AgeLimit);
        let json = serde_json::to_value(&outcome).unwrap();
        assert_eq!(json["status"], "ineligible");
        assert_eq!(json["reason"], "age_limit");

        let input: LoanEligibilityInput =
            serde_json::from_str(r#"{"annual_income": 900000, "credit_score": "650-699", "lender": "nbfc"}"#).unwrap();
        assert_eq!(input.credit_score, CreditScoreBand::Fair);
        assert_eq!(input.lender, LenderType::Nbfc);
        assert_eq!(input.foir_pct, 50.0);
    }

    #[test]
    fn test_clamped() {
        let input = LoanEligibilityInput {
            foir_pct: 90.0,
            age: 70,
            ..couple()
        };
        let (clamped, adjustments) = input.clamped();
        assert_eq!(clamped.foir_pct, 70.0);
        assert_eq!(clamped.age, 65);
        // 90% LTV is within the slider range, 10,000 EMI too
        assert_eq!(adjustments.len(), 2);
    }

    fn eligible(input: &LoanEligibilityInput) -> Money {
        calculate(input, &LendingPolicy::default()).unwrap().eligible_amount()
    }

    proptest! {
        #[test]
        fn prop_eligibility_monotone(
            income in 300_000.0f64..5_000_000.0,
            existing in 0.0f64..100_000.0,
            foir in 30.0f64..69.0,
            ltv in 50.0f64..89.0,
            bump in 0.5f64..10.0,
            property in 1_000_000.0f64..50_000_000.0,
        ) {
            let base = LoanEligibilityInput {
                annual_income: income,
                co_applicant_income: 0.0,
                existing_emi: existing,
                foir_pct: foir,
                ltv_pct: ltv,
                property_value: property,
                ..couple()
            };
            let start = eligible(&base);

            let more_foir = LoanEligibilityInput { foir_pct: (foir + bump).min(100.0), ..base.clone() };
            prop_assert!(eligible(&more_foir) >= start);

            let more_ltv = LoanEligibilityInput { ltv_pct: (ltv + bump).min(100.0), ..base.clone() };
            prop_assert!(eligible(&more_ltv) >= start);

            let more_debt = LoanEligibilityInput { existing_emi: existing + bump * 1_000.0, ..base.clone() };
            prop_assert!(eligible(&more_debt) <= start);
        }
    }
}
