//! # Bank Deposits
//!
//! - [`fixed_deposit`] - lump sum compounded quarterly (Indian FD convention)
//! - [`recurring_deposit`] - equal monthly deposits at the start of each month
//! - [`savings_interest`] - UK simple interest on a savings balance
//!
//! ## Example
//!
//! ```rust
//! use fincalc_core::calculations::deposits::{fixed_deposit, FixedDepositInput};
//! use fincalc_core::units::Money;
//!
//! let input = FixedDepositInput {
//!     label: String::new(),
//!     principal: 100_000.0,
//!     annual_rate_pct: 7.0,
//!     tenure_months: 36,
//! };
//! let result = fixed_deposit(&input).unwrap();
//! assert_eq!(result.maturity_amount, Money::from_major(123_143.93));
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::compound;
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::units::Money;

/// Quarterly compounding used by Indian banks for FDs
pub const FD_COMPOUNDING_PER_YEAR: f64 = 4.0;
/// Extra rate banks offer senior citizens on RDs
pub const SENIOR_CITIZEN_BONUS_PCT: f64 = 0.5;

pub const FD_PRINCIPAL_BOUNDS: FieldBounds = FieldBounds::new(10_000.0, 10_000_000.0, 10_000.0, 100_000.0);
pub const RD_DEPOSIT_BOUNDS: FieldBounds = FieldBounds::new(500.0, 100_000.0, 500.0, 5_000.0);
pub const RATE_BOUNDS: FieldBounds = FieldBounds::new(1.0, 15.0, 0.1, 6.5);
pub const FD_TENURE_BOUNDS: FieldBounds = FieldBounds::new(1.0, 120.0, 1.0, 12.0);
pub const RD_TENURE_BOUNDS: FieldBounds = FieldBounds::new(6.0, 120.0, 1.0, 12.0);

fn require_months(field: &str, months: u32) -> CalcResult<()> {
    if months == 0 {
        return Err(CalcError::invalid_input(field, "0", "Must be at least one month"));
    }
    Ok(())
}

// ============================================================================
// Fixed Deposit
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedDepositInput {
    #[serde(default)]
    pub label: String,
    pub principal: f64,
    pub annual_rate_pct: f64,
    pub tenure_months: u32,
}

impl FixedDepositInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("principal", self.principal)?;
        require_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        require_months("tenure_months", self.tenure_months)
    }

    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let input = FixedDepositInput {
            label: self.label.clone(),
            principal: c.apply("principal", self.principal, &FD_PRINCIPAL_BOUNDS),
            annual_rate_pct: c.apply("annual_rate_pct", self.annual_rate_pct, &RATE_BOUNDS),
            tenure_months: c.apply("tenure_months", self.tenure_months as f64, &FD_TENURE_BOUNDS) as u32,
        };
        (input, c.into_adjustments())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FixedDepositResult {
    pub maturity_amount: Money,
    pub interest_earned: Money,
    /// Interest per year as a share of the deposit (not compounded)
    pub effective_annual_pct: f64,
}

/// FD maturity: A = P(1 + r/4)^(4t), t = months / 12.
pub fn fixed_deposit(input: &FixedDepositInput) -> CalcResult<FixedDepositResult> {
    input.validate()?;

    let years = input.tenure_months as f64 / 12.0;
    let rate = input.annual_rate_pct / 100.0 / FD_COMPOUNDING_PER_YEAR;
    let maturity = compound::compound_amount(input.principal, rate, FD_COMPOUNDING_PER_YEAR * years);
    let interest = maturity - input.principal;

    Ok(FixedDepositResult {
        maturity_amount: Money::from_major(maturity),
        interest_earned: Money::from_major(interest),
        effective_annual_pct: interest / input.principal / years * 100.0,
    })
}

// ============================================================================
// Recurring Deposit
// ============================================================================

/// How often the bank compounds RD interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RdCompounding {
    Monthly,
    #[default]
    Quarterly,
    Annual,
}

impl RdCompounding {
    pub fn per_year(&self) -> f64 {
        match self {
            RdCompounding::Monthly => 12.0,
            RdCompounding::Quarterly => 4.0,
            RdCompounding::Annual => 1.0,
        }
    }
}

/// ## JSON Example
///
/// ```json
/// {
///   "monthly_deposit": 5000.0,
///   "annual_rate_pct": 6.5,
///   "tenure_months": 12,
///   "compounding": "quarterly",
///   "senior_citizen": false,
///   "tax_slab_pct": 30.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringDepositInput {
    #[serde(default)]
    pub label: String,
    pub monthly_deposit: f64,
    pub annual_rate_pct: f64,
    pub tenure_months: u32,
    #[serde(default)]
    pub compounding: RdCompounding,
    #[serde(default)]
    pub senior_citizen: bool,
    /// Slab rate applied to the interest for a post-tax figure
    #[serde(default)]
    pub tax_slab_pct: Option<f64>,
}

impl RecurringDepositInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("monthly_deposit", self.monthly_deposit)?;
        require_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        require_months("tenure_months", self.tenure_months)?;
        if let Some(slab) = self.tax_slab_pct {
            if !(0.0..=100.0).contains(&slab) {
                return Err(CalcError::invalid_input("tax_slab_pct", slab.to_string(), "Must be between 0 and 100"));
            }
        }
        Ok(())
    }

    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let input = RecurringDepositInput {
            monthly_deposit: c.apply("monthly_deposit", self.monthly_deposit, &RD_DEPOSIT_BOUNDS),
            annual_rate_pct: c.apply("annual_rate_pct", self.annual_rate_pct, &RATE_BOUNDS),
            tenure_months: c.apply("tenure_months", self.tenure_months as f64, &RD_TENURE_BOUNDS) as u32,
            ..self.clone()
        };
        (input, c.into_adjustments())
    }

    /// Annual rate after the senior-citizen bonus.
    pub fn applied_rate_pct(&self) -> f64 {
        if self.senior_citizen {
            self.annual_rate_pct + SENIOR_CITIZEN_BONUS_PCT
        } else {
            self.annual_rate_pct
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringDepositResult {
    pub applied_rate_pct: f64,
    pub monthly_rate: f64,
    pub maturity_amount: Money,
    pub total_deposited: Money,
    pub interest_earned: Money,
    pub tax_on_interest: Money,
    pub post_tax_amount: Money,
    /// Annualised growth of maturity over deposits
    pub effective_annual_pct: f64,
}

/// RD maturity: M = P·((1+i)^n − 1)/i·(1+i) with `i` the monthly
/// equivalent of the bank's compounding.
pub fn recurring_deposit(input: &RecurringDepositInput) -> CalcResult<RecurringDepositResult> {
    input.validate()?;

    let applied_rate_pct = input.applied_rate_pct();
    let monthly_rate = compound::monthly_equivalent_rate(applied_rate_pct, input.compounding.per_year());
    let months = input.tenure_months as f64;

    let maturity = compound::annuity_due_future_value(input.monthly_deposit, monthly_rate, months);
    let deposited = input.monthly_deposit * months;
    let interest = maturity - deposited;
    let tax = input.tax_slab_pct.map_or(0.0, |slab| interest * slab / 100.0);

    tracing::debug!(label = %input.label, monthly_rate, maturity, "recurring deposit");

    Ok(RecurringDepositResult {
        applied_rate_pct,
        monthly_rate,
        maturity_amount: Money::from_major(maturity),
        total_deposited: Money::from_major(deposited),
        interest_earned: Money::from_major(interest),
        tax_on_interest: Money::from_major(tax),
        post_tax_amount: Money::from_major(maturity - tax),
        effective_annual_pct: compound::annualized_return_pct(deposited, maturity, months / 12.0),
    })
}

// ============================================================================
// UK Savings Interest
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsInterestInput {
    #[serde(default)]
    pub label: String,
    pub principal: f64,
    pub annual_rate_pct: f64,
    pub years: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsInterestResult {
    pub interest: Money,
    pub total: Money,
}

/// Simple interest I = P·r·t.
pub fn savings_interest(input: &SavingsInterestInput) -> CalcResult<SavingsInterestResult> {
    require_non_negative("principal", input.principal)?;
    require_non_negative("annual_rate_pct", input.annual_rate_pct)?;
    require_positive("years", input.years)?;

    let interest = compound::simple_interest(input.principal, input.annual_rate_pct, input.years);
    Ok(SavingsInterestResult {
        interest: Money::from_major(interest),
        total: Money::from_major(input.principal + interest),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn rd() -> RecurringDepositInput {
        RecurringDepositInput {
            label: "RD".to_string(),
            monthly_deposit: 5_000.0,
            annual_rate_pct: 6.5,
            tenure_months: 12,
            compounding: RdCompounding::Quarterly,
            senior_citizen: false,
            tax_slab_pct: None,
        }
    }

    #[test]
    fn test_fixed_deposit_reference() {
        let input = FixedDepositInput {
            label: String::new(),
            principal: 100_000.0,
            annual_rate_pct: 7.0,
            tenure_months: 36,
        };
        let result = fixed_deposit(&input).unwrap();
        assert_eq!(result.maturity_amount, Money::from_major(123_143.93));
        assert_eq!(result.interest_earned, Money::from_major(23_143.93));
        assert_relative_eq!(result.effective_annual_pct, 7.7146, epsilon = 1e-3);
    }

    #[test]
    fn test_fixed_deposit_zero_months_rejected() {
        let input = FixedDepositInput {
            label: String::new(),
            principal: 100_000.0,
            annual_rate_pct: 7.0,
            tenure_months: 0,
        };
        assert!(fixed_deposit(&input).is_err());
    }

    #[test]
    fn test_recurring_deposit_compounding() {
        let quarterly = recurring_deposit(&rd()).unwrap();
        assert_eq!(quarterly.maturity_amount, Money::from_major(62_143.23));
        assert_eq!(quarterly.total_deposited, Money::from_major(60_000.0));

        let monthly = recurring_deposit(&RecurringDepositInput { compounding: RdCompounding::Monthly, ..rd() }).unwrap();
        assert_eq!(monthly.maturity_amount, Money::from_major(62_155.03));

        let annual = recurring_deposit(&RecurringDepositInput { compounding: RdCompounding::Annual, ..rd() }).unwrap();
        assert_eq!(annual.maturity_amount, Money::from_major(62_092.18));
    }

    #[test]
    fn test_recurring_deposit_senior_and_tax() {
        let input = RecurringDepositInput {
            senior_citizen: true,
            tax_slab_pct: Some(30.0),
            ..rd()
        };
        let result = recurring_deposit(&input).unwrap();
        assert_eq!(result.applied_rate_pct, 7.0);
        assert_eq!(result.maturity_amount, Money::from_major(62_310.66));
        assert_eq!(result.tax_on_interest, Money::from_major(693.2));
        assert_eq!(result.post_tax_amount, Money::from_major(61_617.46));
    }

    #[test]
    fn test_recurring_deposit_zero_rate() {
        let input = RecurringDepositInput {
            annual_rate_pct: 0.0,
            ..rd()
        };
        let result = recurring_deposit(&input).unwrap();
        assert_eq!(result.maturity_amount, Money::from_major(60_000.0));
        assert_eq!(result.interest_earned, Money::ZERO);
    }

    #[test]
    fn test_uk_simple_interest() {
        let input = SavingsInterestInput {
            label: String::new(),
            principal: 5_000.0,
            annual_rate_pct: 3.0,
            years: 2.0,
        };
        let result = savings_interest(&input).unwrap();
        assert_eq!(result.interest, Money::from_major(300.0));
        assert_eq!(result.total, Money::from_major(5_300.0));
    }

    #[test]
    fn test_clamped_tenure() {
        let (clamped, adjustments) = RecurringDepositInput { tenure_months: 3, ..rd() }.clamped();
        assert_eq!(clamped.tenure_months, 6);
        assert_eq!(adjustments.len(), 1);
    }
}
