//! # Savings Growth and Goals (US)
//!
//! High-yield savings projections. Interest compounds at `APY / k` per
//! period (`k` compounding periods a year) and the year's deposits are
//! spread evenly over those periods:
//!
//! ```text
//! balance = balance × (1+r)^k + (deposits per year / k) × ((1+r)^k − 1)/r
//! ```
//!
//! Savings accounts rarely pay more than 6% APY, so rates are clamped to
//! 0-6% and horizons to 1-40 years; the clamps applied are returned with the
//! result.
//!
//! - [`project`] - balance, interest, real value and emergency-fund cover
//! - [`goal`] - deposit needed per deposit period to reach a target

use serde::{Deserialize, Serialize};

use crate::equations::compound;
use crate::errors::{require_non_negative, CalcResult};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::units::Money;

pub const APY_BOUNDS: FieldBounds = FieldBounds::new(0.0, 6.0, 0.05, 4.5);
pub const YEARS_BOUNDS: FieldBounds = FieldBounds::new(1.0, 40.0, 1.0, 10.0);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compounding {
    #[default]
    Daily,
    Monthly,
    Quarterly,
    Annually,
}

impl Compounding {
    pub fn periods_per_year(&self) -> u32 {
        match self {
            Compounding::Daily => 365,
            Compounding::Monthly => 12,
            Compounding::Quarterly => 4,
            Compounding::Annually => 1,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DepositFrequency {
    Weekly,
    Biweekly,
    #[default]
    Monthly,
    Annually,
}

impl DepositFrequency {
    pub fn per_year(&self) -> u32 {
        match self {
            DepositFrequency::Weekly => 52,
            DepositFrequency::Biweekly => 26,
            DepositFrequency::Monthly => 12,
            DepositFrequency::Annually => 1,
        }
    }
}

/// APY assumption: typical account tiers or an explicit rate.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApyScenario {
    /// Traditional bank
    Conservative,
    /// Online high-yield account
    #[default]
    Average,
    /// Promotional rate
    Aggressive,
    Custom(f64),
}

impl ApyScenario {
    pub fn apy_pct(&self) -> f64 {
        match self {
            ApyScenario::Conservative => 3.0,
            ApyScenario::Average => 4.5,
            ApyScenario::Aggressive => 5.25,
            ApyScenario::Custom(pct) => *pct,
        }
    }
}

/// ## JSON Example
///
/// ```json
/// {
///   "initial": 5000.0,
///   "deposit": 500.0,
///   "deposit_frequency": "monthly",
///   "years": 10,
///   "apy": "average",
///   "compounding": "daily",
///   "inflation_pct": 3.0,
///   "monthly_expenses": 3000.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SavingsInput {
    pub label: String,
    pub initial: f64,
    /// Amount deposited each `deposit_frequency` period
    pub deposit: f64,
    pub deposit_frequency: DepositFrequency,
    pub years: u32,
    pub apy: ApyScenario,
    pub compounding: Compounding,
    pub inflation_pct: f64,
    /// Used for emergency-fund coverage
    pub monthly_expenses: Option<f64>,
}

impl Default for SavingsInput {
    fn default() -> Self {
        SavingsInput {
            label: String::new(),
            initial: 5_000.0,
            deposit: 500.0,
            deposit_frequency: DepositFrequency::Monthly,
            years: YEARS_BOUNDS.default as u32,
            apy: ApyScenario::Average,
            compounding: Compounding::Daily,
            inflation_pct: 3.0,
            monthly_expenses: Some(3_000.0),
        }
    }
}

impl SavingsInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("initial", self.initial)?;
        require_non_negative("deposit", self.deposit)?;
        require_non_negative("inflation_pct", self.inflation_pct)?;
        if let Some(expenses) = self.monthly_expenses {
            require_non_negative("monthly_expenses", expenses)?;
        }
        Ok(())
    }

    /// Horizon and APY forced into their allowed ranges.
    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let apy = match self.apy {
            ApyScenario::Custom(pct) => ApyScenario::Custom(c.apply("apy", pct, &APY_BOUNDS)),
            preset => preset,
        };
        let input = SavingsInput {
            years: c.apply("years", self.years as f64, &YEARS_BOUNDS) as u32,
            apy,
            ..self.clone()
        };
        (input, c.into_adjustments())
    }
}

// ============================================================================
// Projection
// ============================================================================

/// How many months of expenses the balance covers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyCoverage {
    UnderThreeMonths,
    ThreeToSixMonths,
    SixPlusMonths,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmergencyFund {
    pub three_months: Money,
    pub six_months: Money,
    pub months_covered: f64,
    pub coverage: EmergencyCoverage,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsYear {
    pub year: u32,
    pub balance: Money,
    pub deposited: Money,
    pub interest: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsProjection {
    pub years: u32,
    pub apy_pct: f64,
    pub future_value: Money,
    /// Initial balance plus every deposit
    pub total_deposited: Money,
    pub total_interest: Money,
    /// Interest as a share of money deposited
    pub interest_growth_pct: f64,
    /// Future value in today's money
    pub real_value: Money,
    pub inflation_impact: Money,
    pub emergency_fund: Option<EmergencyFund>,
    pub yearly: Vec<SavingsYear>,
    pub clamped: Vec<ClampedField>,
}

fn emergency_fund(balance: f64, monthly_expenses: f64) -> Option<EmergencyFund> {
    if monthly_expenses <= 0.0 {
        return None;
    }
    let three = monthly_expenses * 3.0;
    let six = monthly_expenses * 6.0;
    let coverage = if balance >= six {
        EmergencyCoverage::SixPlusMonths
    } else if balance >= three {
        EmergencyCoverage::ThreeToSixMonths
    } else {
        EmergencyCoverage::UnderThreeMonths
    };
    Some(EmergencyFund {
        three_months: Money::from_major(three),
        six_months: Money::from_major(six),
        months_covered: balance / monthly_expenses,
        coverage,
    })
}

/// Year-by-year savings growth.
pub fn project(input: &SavingsInput) -> CalcResult<SavingsProjection> {
    input.validate()?;
    let (input, clamped) = input.clamped();

    let apy_pct = input.apy.apy_pct();
    let k = input.compounding.periods_per_year() as f64;
    let rate = apy_pct / 100.0 / k;
    let growth = compound::compound_amount(1.0, rate, k);
    let factor = compound::annuity_factor(rate, k);
    let yearly_deposits = input.deposit * input.deposit_frequency.per_year() as f64;

    let mut balance = input.initial;
    let mut deposited = input.initial;
    let mut yearly = Vec::with_capacity(input.years as usize);
    for year in 1..=input.years {
        balance = balance * growth + yearly_deposits / k * factor;
        deposited += yearly_deposits;
        yearly.push(SavingsYear {
            year,
            balance: Money::from_major(balance),
            deposited: Money::from_major(deposited),
            interest: Money::from_major(balance - deposited),
        });
    }

    let interest = balance - deposited;
    let real = compound::real_value(balance, input.inflation_pct, input.years as f64);

    tracing::debug!(label = %input.label, apy_pct, balance, clamped = clamped.len(), "savings projection");

    Ok(SavingsProjection {
        years: input.years,
        apy_pct,
        future_value: Money::from_major(balance),
        total_deposited: Money::from_major(deposited),
        total_interest: Money::from_major(interest),
        interest_growth_pct: if deposited > 0.0 { interest / deposited * 100.0 } else { 0.0 },
        real_value: Money::from_major(real),
        inflation_impact: Money::from_major(balance - real),
        emergency_fund: input.monthly_expenses.and_then(|e| emergency_fund(balance, e)),
        yearly,
        clamped,
    })
}

// ============================================================================
// Goal
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoalInput {
    /// Starting balance, deposit frequency, APY, compounding, inflation and
    /// horizon (`deposit` and `monthly_expenses` are ignored)
    #[serde(flatten)]
    pub savings: SavingsInput,
    pub target: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavingsGoalResult {
    pub target: Money,
    /// Deposit needed every `deposit_frequency` period; zero if the starting
    /// balance alone reaches the target
    pub required_deposit: Money,
    pub deposit_frequency: DepositFrequency,
    pub total_deposited: Money,
    pub interest_earned: Money,
    /// Target in today's money
    pub real_target: Money,
    pub apy_pct: f64,
    pub years: u32,
    pub clamped: Vec<ClampedField>,
}

/// Deposit per period needed to reach `target`.
pub fn goal(input: &SavingsGoalInput) -> CalcResult<SavingsGoalResult> {
    input.savings.validate()?;
    require_non_negative("target", input.target)?;
    let (savings, clamped) = input.savings.clamped();

    let apy_pct = savings.apy.apy_pct();
    let k = savings.compounding.periods_per_year() as f64;
    let per_year = savings.deposit_frequency.per_year() as f64;
    let years = savings.years as f64;
    let rate = apy_pct / 100.0 / k;

    let per_period = compound::required_deposit(input.target, savings.initial, rate, years * k);
    let per_deposit = per_period * k / per_year;
    let total = savings.initial + per_deposit * per_year * years;

    Ok(SavingsGoalResult {
        target: Money::from_major(input.target),
        required_deposit: Money::from_major(per_deposit),
        deposit_frequency: savings.deposit_frequency,
        total_deposited: Money::from_major(total),
        interest_earned: Money::from_major(input.target - total),
        real_target: Money::from_major(compound::real_value(input.target, savings.inflation_pct, years)),
        apy_pct,
        years: savings.years,
        clamped,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_projection_reference() {
        let result = project(&SavingsInput::default()).unwrap();
        assert_eq!(result.future_value, Money::from_major(83_610.50));
        assert_eq!(result.total_deposited, Money::from_major(65_000.0));
        assert_eq!(result.total_interest, Money::from_major(18_610.50));
        assert_eq!(result.real_value, Money::from_major(62_214.07));
        assert_eq!(result.yearly.len(), 10);
        assert!(result.clamped.is_empty());

        let fund = result.emergency_fund.unwrap();
        assert_eq!(fund.coverage, EmergencyCoverage::SixPlusMonths);
        assert_relative_eq!(fund.months_covered, 27.87, epsilon = 0.01);
    }

    #[test]
    fn test_annual_compounding_one_year() {
        let input = SavingsInput {
            years: 1,
            compounding: Compounding::Annually,
            ..SavingsInput::default()
        };
        let result = project(&input).unwrap();
        // 5,000 × 1.045 + 6,000 deposited in the single period
        assert_eq!(result.future_value, Money::from_major(11_225.0));
    }

    #[test]
    fn test_zero_apy_is_sum_of_deposits() {
        let input = SavingsInput {
            apy: ApyScenario::Custom(0.0),
            ..SavingsInput::default()
        };
        let result = project(&input).unwrap();
        assert_eq!(result.future_value, Money::from_major(65_000.0));
        assert_eq!(result.total_interest, Money::ZERO);
    }

    #[test]
    fn test_apy_and_years_are_clamped() {
        let input = SavingsInput {
            apy: ApyScenario::Custom(9.0),
            years: 55,
            ..SavingsInput::default()
        };
        let result = project(&input).unwrap();
        assert_eq!(result.apy_pct, 6.0);
        assert_eq!(result.years, 40);
        assert_eq!(result.clamped.len(), 2);
    }

    #[test]
    fn test_emergency_fund_bands() {
        assert_eq!(emergency_fund(5_000.0, 3_000.0).unwrap().coverage, EmergencyCoverage::UnderThreeMonths);
        assert_eq!(emergency_fund(9_000.0, 3_000.0).unwrap().coverage, EmergencyCoverage::ThreeToSixMonths);
        assert!(emergency_fund(9_000.0, 0.0).is_none());
    }

    #[test]
    fn test_goal_reference() {
        let input = SavingsGoalInput {
            savings: SavingsInput {
                years: 5,
                ..SavingsInput::default()
            },
            target: 50_000.0,
        };
        let result = goal(&input).unwrap();
        assert_eq!(result.required_deposit, Money::from_major(650.08));
        assert_eq!(result.total_deposited, Money::from_major(44_004.95));
        assert_eq!(result.interest_earned, Money::from_major(5_995.05));
        assert_eq!(result.real_target, Money::from_major(43_130.44));
    }

    #[test]
    fn test_goal_already_met() {
        let input = SavingsGoalInput {
            savings: SavingsInput {
                initial: 60_000.0,
                years: 5,
                ..SavingsInput::default()
            },
            target: 50_000.0,
        };
        let result = goal(&input).unwrap();
        assert_eq!(result.required_deposit, Money::ZERO);
    }

    #[test]
    fn test_goal_json_flattens() {
        let input: SavingsGoalInput =
            serde_json::from_str(r#"{"target": 20000, "years": 3, "deposit_frequency": "weekly"}"#).unwrap();
        assert_eq!(input.savings.years, 3);
        assert_eq!(input.savings.deposit_frequency, DepositFrequency::Weekly);
    }
}
