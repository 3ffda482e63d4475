//! # Monthly Budget Summary
//!
//! Totals, savings rate and debt-to-income for a household budget, with
//! rule-based advice, the 50/30/20 split and data for three charts:
//!
//! - expense breakdown (non-zero categories with their share)
//! - 12-month cumulative savings trend
//! - current vs optimised budget (expenses cut by 15%)
//!
//! Charts with nothing to show return [`ChartData::NoData`] carrying a
//! message, never an error.
//!
//! ## Example
//!
//! ```rust
//! use fincalc_core::calculations::budget::{summarize, BudgetInput, ExpenseBreakdown};
//!
//! let input = BudgetInput {
//!     monthly_income_primary: 80_000.0,
//!     expenses: ExpenseBreakdown { housing_rent: 20_000.0, groceries_food: 10_000.0, ..Default::default() },
//!     ..BudgetInput::default()
//! };
//! let summary = summarize(&input).unwrap();
//! assert_eq!(summary.net_savings.major(), 50_000.0);
//! assert!(!summary.has_deficit);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::annuity;
use crate::errors::{require_finite, require_non_negative, require_positive, CalcError, CalcResult};
use crate::units::Money;

/// Share of expenses the optimised scenario removes
pub const OPTIMIZED_EXPENSE_CUT_PCT: f64 = 15.0;
pub const TREND_MONTHS: u32 = 12;

// ============================================================================
// Input
// ============================================================================

/// Monthly spending by category.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExpenseBreakdown {
    pub housing_rent: f64,
    pub groceries_food: f64,
    pub transport: f64,
    pub utilities: f64,
    pub insurance: f64,
    pub emi_loans: f64,
    pub entertainment: f64,
    pub subscriptions: f64,
    pub others: f64,
}

impl ExpenseBreakdown {
    /// (display label, amount) for every category, in display order.
    pub fn categories(&self) -> [(&'static str, f64); 9] {
        [
            ("Housing/Rent", self.housing_rent),
            ("Groceries & Food", self.groceries_food),
            ("Transport", self.transport),
            ("Utilities", self.utilities),
            ("Insurance", self.insurance),
            ("EMI/Loans", self.emi_loans),
            ("Entertainment", self.entertainment),
            ("Subscriptions", self.subscriptions),
            ("Others", self.others),
        ]
    }

    pub fn total(&self) -> f64 {
        self.categories().iter().map(|(_, amount)| amount).sum()
    }
}

/// An outstanding loan whose EMI counts towards debt-to-income.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetLoan {
    pub name: String,
    pub outstanding_principal: f64,
    pub annual_rate_pct: f64,
    pub remaining_months: u32,
}

impl BudgetLoan {
    pub fn emi(&self) -> Money {
        let rate = annuity::monthly_rate(self.annual_rate_pct);
        Money::from_major(annuity::payment(self.outstanding_principal, rate, self.remaining_months as f64))
    }
}

/// ## JSON Example
///
/// ```json
/// {
///   "monthly_income_primary": 100000.0,
///   "monthly_income_additional": 0.0,
///   "expenses": { "housing_rent": 25000.0, "groceries_food": 10000.0 },
///   "loans": [
///     { "name": "Car loan", "outstanding_principal": 500000.0, "annual_rate_pct": 10.0, "remaining_months": 60 }
///   ]
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BudgetInput {
    pub label: String,
    pub monthly_income_primary: f64,
    pub monthly_income_additional: f64,
    pub expenses: ExpenseBreakdown,
    pub loans: Vec<BudgetLoan>,
}

impl Default for BudgetInput {
    fn default() -> Self {
        BudgetInput {
            label: String::new(),
            monthly_income_primary: 50_000.0,
            monthly_income_additional: 0.0,
            expenses: ExpenseBreakdown::default(),
            loans: Vec::new(),
        }
    }
}

impl BudgetInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("monthly_income_primary", self.monthly_income_primary)?;
        require_non_negative("monthly_income_additional", self.monthly_income_additional)?;
        for (category, amount) in self.expenses.categories() {
            require_finite(category, amount)?;
            if amount < 0.0 {
                return Err(CalcError::invalid_input(category, amount.to_string(), "Expenses cannot be negative"));
            }
        }
        for loan in &self.loans {
            require_positive("outstanding_principal", loan.outstanding_principal)?;
            require_non_negative("annual_rate_pct", loan.annual_rate_pct)?;
            if loan.remaining_months == 0 {
                return Err(CalcError::invalid_input(
                    "remaining_months",
                    "0",
                    format!("Loan '{}' has no months remaining", loan.name),
                ));
            }
        }
        Ok(())
    }
}

// ============================================================================
// Advice
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Advice {
    Deficit,
    LowSavings,
    HighDebt,
    ModerateSavings,
    Healthy,
    OnTrack,
}

impl Advice {
    pub fn message(&self) -> &'static str {
        match self {
            Advice::Deficit => {
                "You are spending more than you earn. Review and cut discretionary expenses like entertainment, dining out and subscriptions."
            }
            Advice::LowSavings => {
                "Your savings rate is below 10%. Aim for at least 20% by tracking every expense and cutting back."
            }
            Advice::HighDebt => {
                "Your debt-to-income ratio is above 40%. Prioritise loan repayment, highest interest first."
            }
            Advice::ModerateSavings => "You're saving, but a 20-30% savings rate gives better financial security.",
            Advice::Healthy => {
                "Your finances look healthy. Diversify investments and build an emergency fund of 6 months' expenses."
            }
            Advice::OnTrack => "Your finances are on track. Keep monitoring expenses and stay consistent with savings goals.",
        }
    }
}

/// Rule-based advice in priority order.
pub fn advise(has_deficit: bool, savings_rate_pct: f64, debt_to_income_pct: f64) -> Vec<Advice> {
    let mut advice = Vec::new();
    if has_deficit {
        advice.push(Advice::Deficit);
    } else if savings_rate_pct < 10.0 {
        advice.push(Advice::LowSavings);
    }
    if debt_to_income_pct > 40.0 {
        advice.push(Advice::HighDebt);
    }
    if !has_deficit && (10.0..20.0).contains(&savings_rate_pct) {
        advice.push(Advice::ModerateSavings);
    }
    if !has_deficit && savings_rate_pct >= 20.0 && debt_to_income_pct <= 40.0 {
        advice.push(Advice::Healthy);
    }
    if advice.is_empty() {
        advice.push(Advice::OnTrack);
    }
    advice
}

// ============================================================================
// Charts
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub label: String,
    pub value: Money,
    /// Share of the series total, for pie-style charts
    #[serde(skip_serializing_if = "Option::is_none")]
    pub share_pct: Option<f64>,
}

impl ChartPoint {
    fn new(label: impl Into<String>, value: f64) -> Self {
        ChartPoint {
            label: label.into(),
            value: Money::from_major(value),
            share_pct: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Series {
    pub name: String,
    pub points: Vec<ChartPoint>,
}

/// Data for one chart, or the reason there is nothing to draw.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ChartData {
    Series { series: Vec<Series> },
    NoData { message: String },
}

impl ChartData {
    fn no_data(message: &str) -> Self {
        ChartData::NoData {
            message: message.to_string(),
        }
    }

    pub fn has_data(&self) -> bool {
        matches!(self, ChartData::Series { .. })
    }
}

/// Pie data for every category above zero.
pub fn expense_breakdown(expenses: &ExpenseBreakdown) -> ChartData {
    let total = expenses.total();
    let points: Vec<ChartPoint> = expenses
        .categories()
        .into_iter()
        .filter(|(_, amount)| *amount > 0.0)
        .map(|(label, amount)| ChartPoint {
            share_pct: Some(amount / total * 100.0),
            ..ChartPoint::new(label, amount)
        })
        .collect();

    if points.is_empty() {
        return ChartData::no_data("No expense data to display");
    }
    ChartData::Series {
        series: vec![Series {
            name: "Expenses".to_string(),
            points,
        }],
    }
}

/// Cumulative savings over the next twelve months.
pub fn savings_trend(monthly_savings: Money) -> ChartData {
    if monthly_savings <= Money::ZERO {
        return ChartData::no_data("No positive savings to project");
    }
    let points = (1..=TREND_MONTHS)
        .map(|month| ChartPoint {
            label: format!("Month {month}"),
            value: Money::from_minor(monthly_savings.minor().saturating_mul(month as i64)),
            share_pct: None,
        })
        .collect();
    ChartData::Series {
        series: vec![Series {
            name: "Savings".to_string(),
            points,
        }],
    }
}

/// Current budget against one with expenses cut by 15%.
pub fn before_after(summary: Option<&BudgetSummary>) -> ChartData {
    let Some(summary) = summary else {
        return ChartData::no_data("No summary data available");
    };
    if summary.total_expenses <= Money::ZERO {
        return ChartData::no_data("No expenses to optimise");
    }

    let expenses = summary.total_expenses.major();
    let optimized = expenses * (1.0 - OPTIMIZED_EXPENSE_CUT_PCT / 100.0);
    let income = summary.total_income.major();

    ChartData::Series {
        series: vec![
            Series {
                name: "Expenses".to_string(),
                points: vec![ChartPoint::new("Current", expenses), ChartPoint::new("Optimized (Goal)", optimized)],
            },
            Series {
                name: "Savings".to_string(),
                points: vec![
                    ChartPoint::new("Current", summary.net_savings.non_negative().major()),
                    ChartPoint::new("Optimized (Goal)", income - optimized),
                ],
            },
        ],
    }
}

// ============================================================================
// Summary
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Rule503020 {
    pub needs: Money,
    pub wants: Money,
    pub savings: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetCharts {
    pub expense_breakdown: ChartData,
    pub savings_trend: ChartData,
    pub before_after: ChartData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetSummary {
    pub total_income: Money,
    pub total_expenses: Money,
    pub net_savings: Money,
    pub savings_rate_pct: f64,
    /// Sum of EMIs computed from the listed loans
    pub loan_emi_total: Money,
    pub debt_to_income_pct: f64,
    pub has_deficit: bool,
    pub advice: Vec<Advice>,
    pub rule_50_30_20: Rule503020,
}

impl BudgetSummary {
    pub fn charts(&self, expenses: &ExpenseBreakdown) -> BudgetCharts {
        BudgetCharts {
            expense_breakdown: expense_breakdown(expenses),
            savings_trend: savings_trend(self.net_savings),
            before_after: before_after(Some(self)),
        }
    }
}

pub fn summarize(input: &BudgetInput) -> CalcResult<BudgetSummary> {
    input.validate()?;

    let income = input.monthly_income_primary + input.monthly_income_additional;
    let expenses = input.expenses.total();
    let net = income - expenses;
    let savings_rate_pct = net / income * 100.0;

    let loan_emi_total: Money = input.loans.iter().map(BudgetLoan::emi).sum();
    let debt_to_income_pct = loan_emi_total.major() / income * 100.0;
    let has_deficit = net < 0.0;

    tracing::debug!(label = %input.label, savings_rate_pct, debt_to_income_pct, "budget summarized");

    Ok(BudgetSummary {
        total_income: Money::from_major(income),
        total_expenses: Money::from_major(expenses),
        net_savings: Money::from_major(net),
        savings_rate_pct,
        loan_emi_total,
        debt_to_income_pct,
        has_deficit,
        advice: advise(has_deficit, savings_rate_pct, debt_to_income_pct),
        rule_50_30_20: Rule503020 {
            needs: Money::from_major(income * 0.5),
            wants: Money::from_major(income * 0.3),
            savings: Money::from_major(income * 0.2),
        },
    })
}
