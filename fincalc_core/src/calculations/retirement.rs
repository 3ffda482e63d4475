//! # 401(k) Retirement Projection (US)
//!
//! Year-by-year growth of a tax-deferred account until retirement.
//!
//! Year `k` (1-based) is evaluated at age `current_age + k`:
//!
//! ```text
//! employee = min(salary × contribution%, IRS limit for age)
//! match    = salary × min(contribution%, match cap%) × match rate%
//! balance  = balance × (1 + return) + employee + match
//! salary   = salary × (1 + raise%)
//! ```
//!
//! The starting balance counts as employee money when splitting the final
//! balance into contributions and investment gain.
//!
//! ```rust
//! use fincalc_core::calculations::retirement::{calculate, RetirementInput};
//! use fincalc_core::policy::RetirementLimits;
//!
//! let input = RetirementInput::default();
//! let result = calculate(&input, &RetirementLimits::default()).unwrap();
//! assert_eq!(result.years_to_retirement, 32);
//! assert!(result.final_balance > result.total_contributed);
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_at_most, require_finite, require_non_negative, require_positive, CalcError, CalcResult, MAX_AGE};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::policy::RetirementLimits;
use crate::units::Money;

pub const CURRENT_AGE_BOUNDS: FieldBounds = FieldBounds::new(18.0, 75.0, 1.0, 33.0);
pub const RETIREMENT_AGE_BOUNDS: FieldBounds = FieldBounds::new(19.0, 80.0, 1.0, 65.0);
pub const BALANCE_BOUNDS: FieldBounds = FieldBounds::new(0.0, 1_000_000.0, 5_000.0, 50_000.0);
pub const SALARY_BOUNDS: FieldBounds = FieldBounds::new(20_000.0, 500_000.0, 5_000.0, 75_000.0);
pub const CONTRIBUTION_BOUNDS: FieldBounds = FieldBounds::new(0.0, 50.0, 0.5, 8.0);
pub const MATCH_BOUNDS: FieldBounds = FieldBounds::new(0.0, 100.0, 0.5, 4.0);
pub const RAISE_BOUNDS: FieldBounds = FieldBounds::new(0.0, 10.0, 0.5, 3.0);

/// Age → multiple of salary saved, as published by Fidelity.
pub const SAVINGS_BENCHMARKS: [(u32, f64); 9] = [
    (30, 1.0),
    (35, 2.0),
    (40, 3.0),
    (45, 4.0),
    (50, 6.0),
    (55, 7.0),
    (60, 8.0),
    (65, 10.0),
    (67, 10.0),
];

/// Benchmark salary multiple for an age (0 below 30).
pub fn benchmark_multiple(age: u32) -> f64 {
    SAVINGS_BENCHMARKS
        .iter()
        .filter(|(from, _)| age >= *from)
        .map(|(_, multiple)| *multiple)
        .last()
        .unwrap_or(0.0)
}

/// Annual market return assumption.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReturnScenario {
    Conservative,
    #[default]
    Average,
    Aggressive,
    /// Explicit annual return in percent
    Custom(f64),
}

impl ReturnScenario {
    pub fn return_pct(&self, limits: &RetirementLimits) -> f64 {
        match self {
            ReturnScenario::Conservative => limits.conservative_return_pct,
            ReturnScenario::Average => limits.average_return_pct,
            ReturnScenario::Aggressive => limits.aggressive_return_pct,
            ReturnScenario::Custom(pct) => *pct,
        }
    }
}

/// ## JSON Example
///
/// ```json
/// {
///   "label": "Work 401k",
///   "current_age": 33,
///   "retirement_age": 65,
///   "current_balance": 50000.0,
///   "annual_salary": 75000.0,
///   "contribution_pct": 8.0,
///   "employer_match_pct": 4.0,
///   "match_cap_pct": 6.0,
///   "salary_increase_pct": 3.0,
///   "scenario": "average"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementInput {
    pub label: String,
    pub current_age: u32,
    pub retirement_age: u32,
    pub current_balance: f64,
    pub annual_salary: f64,
    /// Employee deferral as percent of salary
    pub contribution_pct: f64,
    /// Employer match rate applied to the matchable salary
    pub employer_match_pct: f64,
    /// Share of salary the employer will match
    pub match_cap_pct: f64,
    pub salary_increase_pct: f64,
    pub scenario: ReturnScenario,
}

impl Default for RetirementInput {
    fn default() -> Self {
        RetirementInput {
            label: String::new(),
            current_age: CURRENT_AGE_BOUNDS.default as u32,
            retirement_age: RETIREMENT_AGE_BOUNDS.default as u32,
            current_balance: BALANCE_BOUNDS.default,
            annual_salary: SALARY_BOUNDS.default,
            contribution_pct: CONTRIBUTION_BOUNDS.default,
            employer_match_pct: MATCH_BOUNDS.default,
            match_cap_pct: 6.0,
            salary_increase_pct: RAISE_BOUNDS.default,
            scenario: ReturnScenario::Average,
        }
    }
}

impl RetirementInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_at_most("retirement_age", self.retirement_age as f64, MAX_AGE as f64)?;
        if self.retirement_age <= self.current_age {
            return Err(CalcError::invalid_input(
                "retirement_age",
                self.retirement_age.to_string(),
                format!("Must be greater than current age ({})", self.current_age),
            ));
        }
        require_non_negative("current_balance", self.current_balance)?;
        require_positive("annual_salary", self.annual_salary)?;
        require_non_negative("contribution_pct", self.contribution_pct)?;
        require_non_negative("employer_match_pct", self.employer_match_pct)?;
        require_non_negative("match_cap_pct", self.match_cap_pct)?;
        require_non_negative("salary_increase_pct", self.salary_increase_pct)?;
        if let ReturnScenario::Custom(pct) = self.scenario {
            require_finite("scenario", pct)?;
            if pct <= -100.0 {
                return Err(CalcError::invalid_input("scenario", pct.to_string(), "Return must be above -100%"));
            }
        }
        Ok(())
    }

    /// Clamp to the slider ranges; retirement age is kept above current age.
    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let current_age = c.apply("current_age", self.current_age as f64, &CURRENT_AGE_BOUNDS) as u32;
        let retirement_bounds = FieldBounds::new(
            (current_age + 1) as f64,
            RETIREMENT_AGE_BOUNDS.max,
            RETIREMENT_AGE_BOUNDS.step,
            RETIREMENT_AGE_BOUNDS.default,
        );
        let input = RetirementInput {
            current_age,
            retirement_age: c.apply("retirement_age", self.retirement_age as f64, &retirement_bounds) as u32,
            current_balance: c.apply("current_balance", self.current_balance, &BALANCE_BOUNDS),
            annual_salary: c.apply("annual_salary", self.annual_salary, &SALARY_BOUNDS),
            contribution_pct: c.apply("contribution_pct", self.contribution_pct, &CONTRIBUTION_BOUNDS),
            employer_match_pct: c.apply("employer_match_pct", self.employer_match_pct, &MATCH_BOUNDS),
            match_cap_pct: c.apply("match_cap_pct", self.match_cap_pct, &MATCH_BOUNDS),
            salary_increase_pct: c.apply("salary_increase_pct", self.salary_increase_pct, &RAISE_BOUNDS),
            ..self.clone()
        };
        (input, c.into_adjustments())
    }

    pub fn years_to_retirement(&self) -> u32 {
        self.retirement_age.saturating_sub(self.current_age)
    }
}

/// Account state at the end of one year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementYear {
    pub year: u32,
    pub age: u32,
    pub salary: Money,
    pub employee_contribution: Money,
    pub employer_match: Money,
    /// Whether the catch-up limit applied this year
    pub catch_up: bool,
    pub balance: Money,
    /// Cumulative employee money, starting balance included
    pub total_contributed: Money,
    pub total_employer_match: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetirementResult {
    pub years_to_retirement: u32,
    pub return_pct: f64,
    pub final_balance: Money,
    pub total_contributed: Money,
    pub total_employer_match: Money,
    pub total_invested: Money,
    pub investment_gain: Money,
    /// Withdrawal-rule income per month
    pub monthly_income: Money,
    pub benchmark_multiple: f64,
    /// Benchmark savings for the retirement age, on today's salary
    pub benchmark: Money,
    /// Final balance as a share of the benchmark; `None` when there is no benchmark
    pub benchmark_pct: Option<f64>,
    pub timeline: Vec<RetirementYear>,
}

pub fn calculate(input: &RetirementInput, limits: &RetirementLimits) -> CalcResult<RetirementResult> {
    input.validate()?;

    let years = input.years_to_retirement();
    let return_pct = input.scenario.return_pct(limits);
    let growth = 1.0 + return_pct / 100.0;
    let raise = 1.0 + input.salary_increase_pct / 100.0;
    let contribution = input.contribution_pct / 100.0;
    let matchable = contribution.min(input.match_cap_pct / 100.0);
    let match_rate = input.employer_match_pct / 100.0;

    let mut balance = input.current_balance;
    let mut salary = input.annual_salary;
    let mut contributed = input.current_balance;
    let mut matched = 0.0;
    let mut timeline = Vec::with_capacity(years as usize);

    for year in 1..=years {
        let age = input.current_age + year;
        let limit = limits.limit_for_age(age);
        let employee = (salary * contribution).min(limit);
        let employer = salary * matchable * match_rate;

        balance = balance * growth + employee + employer;
        contributed += employee;
        matched += employer;

        timeline.push(RetirementYear {
            year,
            age,
            salary: Money::from_major(salary),
            employee_contribution: Money::from_major(employee),
            employer_match: Money::from_major(employer),
            catch_up: age >= limits.catch_up_age,
            balance: Money::from_major(balance),
            total_contributed: Money::from_major(contributed),
            total_employer_match: Money::from_major(matched),
        });

        salary *= raise;
    }

    let invested = contributed + matched;
    let multiple = benchmark_multiple(input.retirement_age);
    let benchmark = input.annual_salary * multiple;
    let benchmark_pct = (benchmark > 0.0).then(|| balance / benchmark * 100.0);

    tracing::debug!(label = %input.label, years, return_pct, balance, "retirement projection");

    Ok(RetirementResult {
        years_to_retirement: years,
        return_pct,
        final_balance: Money::from_major(balance),
        total_contributed: Money::from_major(contributed),
        total_employer_match: Money::from_major(matched),
        total_invested: Money::from_major(invested),
        investment_gain: Money::from_major(balance - invested),
        monthly_income: Money::from_major(balance * limits.withdrawal_rate_pct / 100.0 / 12.0),
        benchmark_multiple: multiple,
        benchmark: Money::from_major(benchmark),
        benchmark_pct,
        timeline,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn flat() -> RetirementInput {
        RetirementInput {
            label: "flat".to_string(),
            current_age: 40,
            retirement_age: 42,
            current_balance: 0.0,
            annual_salary: 100_000.0,
            contribution_pct: 10.0,
            employer_match_pct: 50.0,
            match_cap_pct: 6.0,
            salary_increase_pct: 0.0,
            scenario: ReturnScenario::Custom(0.0),
        }
    }

    #[test]
    fn test_zero_return_sums_contributions() {
        let result = calculate(&flat(), &RetirementLimits::default()).unwrap();
        assert_eq!(result.years_to_retirement, 2);
        assert_eq!(result.final_balance, Money::from_major(26_000.0));
        assert_eq!(result.total_contributed, Money::from_major(20_000.0));
        assert_eq!(result.total_employer_match, Money::from_major(6_000.0));
        assert_eq!(result.investment_gain, Money::ZERO);
        assert_eq!(result.timeline.len(), 2);
        assert_eq!(result.timeline[0].age, 41);

        // Retiring at 42 → 3× salary benchmark
        assert_eq!(result.benchmark, Money::from_major(300_000.0));
        assert_relative_eq!(result.benchmark_pct.unwrap(), 26_000.0 / 3_000.0, epsilon = 1e-9);
        assert_eq!(result.monthly_income, Money::from_major(86.67));
    }

    #[test]
    fn test_one_year_with_growth() {
        let input = RetirementInput {
            current_age: 33,
            retirement_age: 34,
            ..RetirementInput::default()
        };
        let result = calculate(&input, &RetirementLimits::default()).unwrap();
        // 50,000 × 1.07 + 6,000 employee + 75,000 × 6% × 4% match
        assert_eq!(result.final_balance, Money::from_major(59_680.0));
        assert_eq!(result.total_contributed, Money::from_major(56_000.0));
        assert_eq!(result.total_employer_match, Money::from_major(180.0));
        assert_eq!(result.investment_gain, Money::from_major(3_500.0));
    }

    #[test]
    fn test_catch_up_limit_by_age() {
        let input = RetirementInput {
            current_age: 48,
            retirement_age: 50,
            annual_salary: 500_000.0,
            ..flat()
        };
        let result = calculate(&input, &RetirementLimits::default()).unwrap();
        assert_eq!(result.timeline[0].employee_contribution, Money::from_major(23_000.0));
        assert!(!result.timeline[0].catch_up);
        assert_eq!(result.timeline[1].employee_contribution, Money::from_major(30_500.0));
        assert!(result.timeline[1].catch_up);
    }

    #[test]
    fn test_salary_raise_applies_next_year() {
        let input = RetirementInput {
            salary_increase_pct: 10.0,
            ..flat()
        };
        let result = calculate(&input, &RetirementLimits::default()).unwrap();
        assert_eq!(result.timeline[0].salary, Money::from_major(100_000.0));
        assert_eq!(result.timeline[1].salary, Money::from_major(110_000.0));
        assert_eq!(result.timeline[1].employee_contribution, Money::from_major(11_000.0));
    }

    #[test]
    fn test_age_ceiling() {
        let input = RetirementInput {
            retirement_age: 4_000_000_000,
            ..flat()
        };
        let err = calculate(&input, &RetirementLimits::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_retirement_age_must_exceed_current() {
        let input = RetirementInput {
            retirement_age: 40,
            ..flat()
        };
        let err = calculate(&input, &RetirementLimits::default()).unwrap_err();
        assert!(err.is_input_error());
    }

    #[test]
    fn test_scenarios() {
        let limits = RetirementLimits::default();
        assert_eq!(ReturnScenario::Conservative.return_pct(&limits), 4.0);
        assert_eq!(ReturnScenario::Average.return_pct(&limits), 7.0);
        assert_eq!(ReturnScenario::Aggressive.return_pct(&limits), 10.0);

        let aggressive = calculate(
            &RetirementInput { scenario: ReturnScenario::Aggressive, ..RetirementInput::default() },
            &limits,
        )
        .unwrap();
        let conservative = calculate(
            &RetirementInput { scenario: ReturnScenario::Conservative, ..RetirementInput::default() },
            &limits,
        )
        .unwrap();
        assert!(aggressive.final_balance > conservative.final_balance);
        assert_eq!(aggressive.total_contributed, conservative.total_contributed);
    }

    #[test]
    fn test_benchmark_multiple() {
        assert_eq!(benchmark_multiple(25), 0.0);
        assert_eq!(benchmark_multiple(30), 1.0);
        assert_eq!(benchmark_multiple(52), 6.0);
        assert_eq!(benchmark_multiple(65), 10.0);
        assert_eq!(benchmark_multiple(70), 10.0);

        let input = RetirementInput {
            current_age: 20,
            retirement_age: 25,
            ..flat()
        };
        let result = calculate(&input, &RetirementLimits::default()).unwrap();
        assert_eq!(result.benchmark_pct, None);
    }

    #[test]
    fn test_clamped_keeps_order() {
        let input = RetirementInput {
            current_age: 79,
            retirement_age: 70,
            ..flat()
        };
        let (clamped, adjustments) = input.clamped();
        assert_eq!(clamped.current_age, 75);
        assert_eq!(clamped.retirement_age, 76);
        assert_eq!(adjustments.len(), 2);
        assert!(clamped.validate().is_ok());
    }

    #[test]
    fn test_custom_scenario_json() {
        let input: RetirementInput = serde_json::from_str(r#"{"scenario": {"custom": 6.5}}"#).unwrap();
        assert_eq!(input.scenario, ReturnScenario::Custom(6.5));
        let input: RetirementInput = serde_json::from_str(r#"{"scenario": "aggressive"}"#).unwrap();
        assert_eq!(input.scenario, ReturnScenario::Aggressive);
    }
}
