//! # SIP and Lump-Sum Investments
//!
//! Mutual-fund style projections at a constant expected return.
//!
//! - [`sip`] - monthly instalments at the start of each month, plus an
//!   optional initial amount compounded annually
//! - [`lumpsum`] - one-off investment compounded annually

use serde::{Deserialize, Serialize};

use crate::equations::compound;
use crate::errors::{require_non_negative, require_positive, CalcResult};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::units::Money;

pub const MONTHLY_BOUNDS: FieldBounds = FieldBounds::new(500.0, 1_000_000.0, 500.0, 5_000.0);
pub const INITIAL_BOUNDS: FieldBounds = FieldBounds::new(0.0, 10_000_000.0, 10_000.0, 0.0);
pub const LUMPSUM_BOUNDS: FieldBounds = FieldBounds::new(10_000.0, 10_000_000.0, 10_000.0, 100_000.0);
pub const RETURN_BOUNDS: FieldBounds = FieldBounds::new(1.0, 30.0, 0.1, 12.0);
pub const YEARS_BOUNDS: FieldBounds = FieldBounds::new(1.0, 40.0, 1.0, 10.0);

/// ## JSON Example
///
/// ```json
/// { "monthly_investment": 5000.0, "initial_investment": 0.0, "expected_return_pct": 12.0, "years": 10.0 }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SipInput {
    #[serde(default)]
    pub label: String,
    pub monthly_investment: f64,
    #[serde(default)]
    pub initial_investment: f64,
    pub expected_return_pct: f64,
    pub years: f64,
}

impl SipInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("monthly_investment", self.monthly_investment)?;
        require_non_negative("initial_investment", self.initial_investment)?;
        require_non_negative("expected_return_pct", self.expected_return_pct)?;
        require_positive("years", self.years)
    }

    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let input = SipInput {
            label: self.label.clone(),
            monthly_investment: c.apply("monthly_investment", self.monthly_investment, &MONTHLY_BOUNDS),
            initial_investment: c.apply("initial_investment", self.initial_investment, &INITIAL_BOUNDS),
            expected_return_pct: c.apply("expected_return_pct", self.expected_return_pct, &RETURN_BOUNDS),
            years: c.apply("years", self.years, &YEARS_BOUNDS),
        };
        (input, c.into_adjustments())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LumpsumInput {
    #[serde(default)]
    pub label: String,
    pub amount: f64,
    pub expected_return_pct: f64,
    pub years: f64,
}

impl LumpsumInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("amount", self.amount)?;
        require_non_negative("expected_return_pct", self.expected_return_pct)?;
        require_positive("years", self.years)
    }

    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let input = LumpsumInput {
            label: self.label.clone(),
            amount: c.apply("amount", self.amount, &LUMPSUM_BOUNDS),
            expected_return_pct: c.apply("expected_return_pct", self.expected_return_pct, &RETURN_BOUNDS),
            years: c.apply("years", self.years, &YEARS_BOUNDS),
        };
        (input, c.into_adjustments())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InvestmentResult {
    pub future_value: Money,
    pub total_invested: Money,
    pub total_returns: Money,
    /// Returns as a share of the amount invested
    pub wealth_gain_pct: f64,
}

impl InvestmentResult {
    fn new(future_value: f64, invested: f64) -> Self {
        let returns = future_value - invested;
        InvestmentResult {
            future_value: Money::from_major(future_value),
            total_invested: Money::from_major(invested),
            total_returns: Money::from_major(returns),
            wealth_gain_pct: if invested > 0.0 { returns / invested * 100.0 } else { 0.0 },
        }
    }
}

/// SIP: FV = P·((1+i)^n − 1)/i·(1+i) + initial·(1+R)^years
pub fn sip(input: &SipInput) -> CalcResult<InvestmentResult> {
    input.validate()?;

    let monthly_rate = input.expected_return_pct / 12.0 / 100.0;
    let months = input.years * 12.0;
    let instalments = compound::annuity_due_future_value(input.monthly_investment, monthly_rate, months);
    let initial = compound::compound_amount(input.initial_investment, input.expected_return_pct / 100.0, input.years);
    let invested = input.monthly_investment * months + input.initial_investment;

    tracing::debug!(label = %input.label, months, "sip projection");
    Ok(InvestmentResult::new(instalments + initial, invested))
}

/// Lump sum: FV = P(1+R)^t
pub fn lumpsum(input: &LumpsumInput) -> CalcResult<InvestmentResult> {
    input.validate()?;

    let future_value = compound::compound_amount(input.amount, input.expected_return_pct / 100.0, input.years);
    Ok(InvestmentResult::new(future_value, input.amount))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn monthly() -> SipInput {
        SipInput {
            label: "Index fund".to_string(),
            monthly_investment: 5_000.0,
            initial_investment: 0.0,
            expected_return_pct: 12.0,
            years: 10.0,
        }
    }

    #[test]
    fn test_sip_reference() {
        let result = sip(&monthly()).unwrap();
        assert_eq!(result.future_value, Money::from_major(1_161_695.38));
        assert_eq!(result.total_invested, Money::from_major(600_000.0));
        assert_eq!(result.total_returns, Money::from_major(561_695.38));
    }

    #[test]
    fn test_sip_with_initial() {
        let input = SipInput {
            initial_investment: 100_000.0,
            ..monthly()
        };
        let result = sip(&input).unwrap();
        assert_eq!(result.future_value, Money::from_major(1_472_280.2));
        assert_eq!(result.total_invested, Money::from_major(700_000.0));
    }

    #[test]
    fn test_sip_zero_return_is_sum_of_deposits() {
        let input = SipInput {
            expected_return_pct: 0.0,
            initial_investment: 10_000.0,
            ..monthly()
        };
        let result = sip(&input).unwrap();
        assert_eq!(result.future_value, Money::from_major(610_000.0));
        assert_eq!(result.total_returns, Money::ZERO);
    }

    #[test]
    fn test_lumpsum() {
        let input = LumpsumInput {
            label: String::new(),
            amount: 100_000.0,
            expected_return_pct: 12.0,
            years: 10.0,
        };
        let result = lumpsum(&input).unwrap();
        assert_eq!(result.future_value, Money::from_major(310_584.82));
        assert_eq!(result.total_returns, Money::from_major(210_584.82));
    }

    #[test]
    fn test_sip_clamped() {
        let (clamped, adjustments) = SipInput { expected_return_pct: 45.0, ..monthly() }.clamped();
        assert_eq!(clamped.expected_return_pct, 30.0);
        assert_eq!(adjustments[0].field, "expected_return_pct");
    }
}
