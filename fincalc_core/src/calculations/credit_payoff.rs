//! # Credit Card Payoff
//!
//! How long a fixed monthly payment takes to clear a revolving balance, and
//! what it costs. A payment that does not cover the monthly interest never
//! clears the balance and is reported as [`CalcError::NonAmortizing`].
//!
//! ```rust
//! use fincalc_core::calculations::credit_payoff::{CreditPayoffInput, calculate};
//!
//! let input = CreditPayoffInput {
//!     label: "Visa".to_string(),
//!     balance: 100_000.0,
//!     annual_rate_pct: 18.0,
//!     monthly_payment: 5_000.0,
//!     target_months: None,
//! };
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.months_to_payoff, 24);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::annuity;
use crate::errors::{require_non_negative, require_positive, CalcError, CalcResult};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::units::Money;

pub const BALANCE_BOUNDS: FieldBounds = FieldBounds::new(100.0, 100_000.0, 100.0, 5_000.0);
pub const RATE_BOUNDS: FieldBounds = FieldBounds::new(5.0, 36.0, 0.1, 18.0);
pub const PAYMENT_BOUNDS: FieldBounds = FieldBounds::new(10.0, 10_000.0, 10.0, 200.0);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPayoffInput {
    #[serde(default)]
    pub label: String,
    /// Current balance owed
    pub balance: f64,
    /// Card APR in percent
    pub annual_rate_pct: f64,
    /// Fixed payment made every month
    pub monthly_payment: f64,
    /// Optional goal: also report the payment that clears the card in this many months
    #[serde(default)]
    pub target_months: Option<u32>,
}

impl CreditPayoffInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("balance", self.balance)?;
        require_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        require_positive("monthly_payment", self.monthly_payment)?;
        if self.target_months == Some(0) {
            return Err(CalcError::invalid_input("target_months", "0", "Target must be at least one month"));
        }
        Ok(())
    }

    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut clamper = Clamper::new();
        let input = CreditPayoffInput {
            label: self.label.clone(),
            balance: clamper.apply("balance", self.balance, &BALANCE_BOUNDS),
            annual_rate_pct: clamper.apply("annual_rate_pct", self.annual_rate_pct, &RATE_BOUNDS),
            monthly_payment: clamper.apply("monthly_payment", self.monthly_payment, &PAYMENT_BOUNDS),
            target_months: self.target_months,
        };
        (input, clamper.into_adjustments())
    }

    /// Interest charged in the first month; the payment must exceed this.
    pub fn first_month_interest(&self) -> f64 {
        self.balance * annuity::monthly_rate(self.annual_rate_pct)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CreditPayoffResult {
    /// Exact (fractional) number of months
    pub months_exact: f64,
    /// Whole months until the card is clear (ceil of the exact term)
    pub months_to_payoff: u32,
    /// Payment × exact term
    pub total_paid: Money,
    pub total_interest: Money,
    pub first_month_interest: Money,
    /// Payment needed to clear the balance in `target_months`, if requested
    pub payment_for_target: Option<Money>,
}

impl CreditPayoffResult {
    /// (years, months) split of the payoff term
    pub fn years_and_months(&self) -> (u32, u32) {
        (self.months_to_payoff / 12, self.months_to_payoff % 12)
    }
}

pub fn calculate(input: &CreditPayoffInput) -> CalcResult<CreditPayoffResult> {
    input.validate()?;

    let rate = annuity::monthly_rate(input.annual_rate_pct);
    let months_exact = annuity::term(input.balance, rate, input.monthly_payment)?;
    let total = input.monthly_payment * months_exact;

    let payment_for_target = input
        .target_months
        .map(|months| Money::from_major(annuity::payment(input.balance, rate, months as f64)));

    tracing::debug!(label = %input.label, months_exact, "payoff term solved");

    Ok(CreditPayoffResult {
        months_exact,
        months_to_payoff: months_exact.ceil() as u32,
        total_paid: Money::from_major(total),
        total_interest: Money::from_major(total - input.balance),
        first_month_interest: Money::from_major(input.first_month_interest()),
        payment_for_target,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn card() -> CreditPayoffInput {
        CreditPayoffInput {
            label: "Visa".to_string(),
            balance: 100_000.0,
            annual_rate_pct: 18.0,
            monthly_payment: 5_000.0,
            target_months: None,
        }
    }

    #[test]
    fn test_reference_payoff() {
        let result = calculate(&card()).unwrap();
        assert_relative_eq!(result.months_exact, 23.956, epsilon = 1e-3);
        assert_eq!(result.months_to_payoff, 24);
        assert_eq!(result.total_interest, Money::from_major(19_781.12));
        assert_eq!(result.total_paid, Money::from_major(119_781.12));
        assert_eq!(result.first_month_interest, Money::from_major(1_500.0));
        assert_eq!(result.years_and_months(), (2, 0));
    }

    #[test]
    fn test_payment_below_interest_never_amortizes() {
        let input = CreditPayoffInput {
            monthly_payment: 1_400.0,
            ..card()
        };
        let err = calculate(&input).unwrap_err();
        assert!(matches!(err, CalcError::NonAmortizing { .. }));

        // Exactly the interest is not enough either
        let input = CreditPayoffInput {
            monthly_payment: 1_500.0,
            ..card()
        };
        assert_eq!(calculate(&input).unwrap_err().error_code(), "NON_AMORTIZING");
    }

    #[test]
    fn test_zero_rate() {
        let input = CreditPayoffInput {
            annual_rate_pct: 0.0,
            ..card()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.months_exact, 20.0);
        assert_eq!(result.months_to_payoff, 20);
        assert_eq!(result.total_interest, Money::ZERO);
    }

    #[test]
    fn test_target_payment() {
        let input = CreditPayoffInput {
            target_months: Some(12),
            ..card()
        };
        let result = calculate(&input).unwrap();
        let target = result.payment_for_target.unwrap();
        assert_eq!(target, Money::from_major(9_168.0));

        let input = CreditPayoffInput {
            target_months: Some(0),
            ..card()
        };
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_clamped() {
        let input = CreditPayoffInput {
            balance: 500_000.0,
            monthly_payment: 1.0,
            ..card()
        };
        let (clamped, adjustments) = input.clamped();
        assert_eq!(clamped.balance, 100_000.0);
        assert_eq!(clamped.monthly_payment, 10.0);
        assert_eq!(adjustments.len(), 2);
    }
}
