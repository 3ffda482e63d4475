//! # EMI Calculation
//!
//! Equated monthly instalment for a fixed-rate loan, with amortization
//! schedules, prepayment simulation, rate-shock and tenure comparison.
//!
//! ## Assumptions
//!
//! - Fixed rate for the whole tenure
//! - Interest charged monthly on the opening balance
//! - Tenure in years is converted to `round(years × 12)` months
//!
//! ## Example
//!
//! ```rust
//! use fincalc_core::calculations::emi::{EmiInput, calculate};
//!
//! let input = EmiInput {
//!     label: "Home loan".to_string(),
//!     principal: 2_500_000.0,
//!     annual_rate_pct: 8.5,
//!     tenure_years: 20.0,
//! };
//!
//! let result = calculate(&input).unwrap();
//! assert_eq!(result.months, 240);
//! assert_eq!(result.emi.minor(), 2_169_558);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::annuity;
use crate::errors::{require_at_most, require_non_negative, require_positive, CalcError, CalcResult, MAX_HORIZON_YEARS};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::units::Money;

/// Loan amount slider range (INR)
pub const PRINCIPAL_BOUNDS: FieldBounds = FieldBounds::new(100_000.0, 50_000_000.0, 10_000.0, 2_500_000.0);
/// Interest rate slider range (% p.a.)
pub const RATE_BOUNDS: FieldBounds = FieldBounds::new(5.0, 20.0, 0.1, 8.5);
/// Tenure slider range (years)
pub const TENURE_BOUNDS: FieldBounds = FieldBounds::new(1.0, 30.0, 1.0, 20.0);

/// Input parameters for an EMI calculation.
///
/// ## JSON Example
///
/// ```json
/// {
///   "label": "Home loan",
///   "principal": 2500000.0,
///   "annual_rate_pct": 8.5,
///   "tenure_years": 20.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiInput {
    /// User label (e.g., "Home loan")
    #[serde(default)]
    pub label: String,

    /// Amount borrowed
    pub principal: f64,

    /// Annual interest rate in percent
    pub annual_rate_pct: f64,

    /// Tenure in years (fractional allowed)
    pub tenure_years: f64,
}

impl EmiInput {
    /// Validate input parameters.
    pub fn validate(&self) -> CalcResult<()> {
        require_positive("principal", self.principal)?;
        require_non_negative("annual_rate_pct", self.annual_rate_pct)?;
        require_positive("tenure_years", self.tenure_years)?;
        require_at_most("tenure_years", self.tenure_years, MAX_HORIZON_YEARS)?;
        if self.months() == 0 {
            return Err(CalcError::invalid_input(
                "tenure_years",
                self.tenure_years.to_string(),
                "Tenure must be at least one month",
            ));
        }
        Ok(())
    }

    /// Copy with every field clamped into its slider range.
    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut clamper = Clamper::new();
        let input = EmiInput {
            label: self.label.clone(),
            principal: clamper.apply("principal", self.principal, &PRINCIPAL_BOUNDS),
            annual_rate_pct: clamper.apply("annual_rate_pct", self.annual_rate_pct, &RATE_BOUNDS),
            tenure_years: clamper.apply("tenure_years", self.tenure_years, &TENURE_BOUNDS),
        };
        (input, clamper.into_adjustments())
    }

    /// Number of monthly instalments
    pub fn months(&self) -> u32 {
        (self.tenure_years * 12.0).round().max(0.0) as u32
    }

    pub fn monthly_rate(&self) -> f64 {
        annuity::monthly_rate(self.annual_rate_pct)
    }

    fn with_rate(&self, annual_rate_pct: f64) -> Self {
        EmiInput {
            annual_rate_pct,
            ..self.clone()
        }
    }

    fn with_tenure(&self, tenure_years: f64) -> Self {
        EmiInput {
            tenure_years,
            ..self.clone()
        }
    }
}

/// EMI calculation results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmiResult {
    /// Monthly instalment
    pub emi: Money,
    /// EMI × months
    pub total_amount: Money,
    /// Total amount − principal
    pub total_interest: Money,
    pub months: u32,
    /// Interest as a share of everything paid (%)
    pub interest_share_pct: f64,
}

/// Calculate the EMI, total amount and total interest.
pub fn calculate(input: &EmiInput) -> CalcResult<EmiResult> {
    input.validate()?;

    let months = input.months();
    let emi = annuity::payment(input.principal, input.monthly_rate(), months as f64);
    let total = emi * months as f64;

    let total_amount = Money::from_major(total);
    let total_interest = total_amount - Money::from_major(input.principal);
    let interest_share_pct = if total > 0.0 {
        (total - input.principal) / total * 100.0
    } else {
        0.0
    };

    tracing::debug!(label = %input.label, months, emi, "emi calculated");

    Ok(EmiResult {
        emi: Money::from_major(emi),
        total_amount,
        total_interest,
        months,
        interest_share_pct,
    })
}

// ============================================================================
// Amortization Schedules
// ============================================================================

/// One month of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AmortizationRow {
    /// Month number, starting at 1
    pub period: u32,
    pub emi: Money,
    /// Principal repaid this month
    pub principal: Money,
    pub interest: Money,
    /// Balance after this month's payment
    pub balance: Money,
}

/// Unrounded schedule row, summed before rounding.
#[derive(Debug, Clone, Copy)]
struct RawRow {
    period: u32,
    emi: f64,
    principal: f64,
    interest: f64,
    balance: f64,
}

impl RawRow {
    fn to_row(self) -> AmortizationRow {
        AmortizationRow {
            period: self.period,
            emi: Money::from_major(self.emi),
            principal: Money::from_major(self.principal),
            interest: Money::from_major(self.interest),
            balance: Money::from_major(self.balance),
        }
    }
}

/// Amortize `principal` at monthly `rate` with a fixed `emi` for up to
/// `months` months, stopping once the balance reaches zero.
fn amortize(principal: f64, rate: f64, emi: f64, months: u32) -> Vec<RawRow> {
    let mut rows = Vec::with_capacity(months as usize);
    let mut balance = principal;
    for period in 1..=months {
        let interest = balance * rate;
        let principal_paid = (emi - interest).min(balance);
        balance = (balance - principal_paid).max(0.0);
        rows.push(RawRow {
            period,
            emi,
            principal: principal_paid,
            interest,
            balance,
        });
        if balance <= 0.0 {
            break;
        }
    }
    rows
}

fn baseline_rows(input: &EmiInput) -> Vec<RawRow> {
    let months = input.months();
    let rate = input.monthly_rate();
    let emi = annuity::payment(input.principal, rate, months as f64);
    amortize(input.principal, rate, emi, months)
}

/// Month-by-month amortization schedule.
pub fn monthly_schedule(input: &EmiInput) -> CalcResult<Vec<AmortizationRow>> {
    input.validate()?;
    Ok(baseline_rows(input).into_iter().map(RawRow::to_row).collect())
}

/// One year of an amortization schedule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct YearlyRow {
    /// Loan year, starting at 1
    pub year: u32,
    /// Months in this year (the last year may be partial)
    pub months: u32,
    pub principal_paid: Money,
    pub interest_paid: Money,
    pub total_paid: Money,
    pub closing_balance: Money,
}

fn aggregate_yearly(rows: &[RawRow]) -> Vec<YearlyRow> {
    rows.chunks(12)
        .enumerate()
        .map(|(i, chunk)| {
            let principal: f64 = chunk.iter().map(|r| r.principal).sum();
            let interest: f64 = chunk.iter().map(|r| r.interest).sum();
            let closing = chunk.last().map(|r| r.balance).unwrap_or(0.0);
            YearlyRow {
                year: i as u32 + 1,
                months: chunk.len() as u32,
                principal_paid: Money::from_major(principal),
                interest_paid: Money::from_major(interest),
                total_paid: Money::from_major(principal + interest),
                closing_balance: Money::from_major(closing),
            }
        })
        .collect()
}

/// Year-by-year schedule aggregated from the monthly rows.
pub fn yearly_schedule(input: &EmiInput) -> CalcResult<Vec<YearlyRow>> {
    input.validate()?;
    Ok(aggregate_yearly(&baseline_rows(input)))
}

// ============================================================================
// Prepayment Simulation
// ============================================================================

/// What a prepayment is used for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PrepaymentMode {
    /// Keep the end date, lower the EMI
    ReduceEmi,
    /// Keep the EMI, finish earlier
    #[default]
    ReduceTenure,
}

/// Yearly lump-sum prepayment scenario.
///
/// ## JSON Example
///
/// ```json
/// {
///   "loan": { "principal": 2500000.0, "annual_rate_pct": 8.5, "tenure_years": 20.0 },
///   "yearly_prepayment": 100000.0,
///   "start_year": 2,
///   "mode": "reduce_tenure"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentInput {
    pub loan: EmiInput,
    /// Paid at the end of every loan year from `start_year`
    pub yearly_prepayment: f64,
    /// First loan year (1-based) whose end gets a prepayment
    pub start_year: u32,
    #[serde(default)]
    pub mode: PrepaymentMode,
}

impl PrepaymentInput {
    pub fn validate(&self) -> CalcResult<()> {
        self.loan.validate()?;
        require_non_negative("yearly_prepayment", self.yearly_prepayment)?;
        if self.start_year == 0 {
            return Err(CalcError::invalid_input("start_year", "0", "Start year is 1-based"));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PrepaymentResult {
    /// Schedule with prepayments applied (balances after prepayment)
    pub schedule: Vec<AmortizationRow>,
    pub yearly: Vec<YearlyRow>,
    pub baseline_interest: Money,
    pub total_interest: Money,
    /// Baseline interest − interest with prepayments (never negative)
    pub interest_saved: Money,
    pub total_prepaid: Money,
    pub baseline_months: u32,
    pub months_taken: u32,
    pub months_saved: u32,
    pub original_emi: Money,
    /// EMI in force at the end of the simulation
    pub final_emi: Money,
    /// |final EMI − original EMI|
    pub emi_change: Money,
}

/// Simulate yearly prepayments against the baseline schedule.
pub fn simulate_prepayment(input: &PrepaymentInput) -> CalcResult<PrepaymentResult> {
    input.validate()?;

    let loan = &input.loan;
    let rate = loan.monthly_rate();
    let months = loan.months();
    let original_emi = annuity::payment(loan.principal, rate, months as f64);

    let baseline = amortize(loan.principal, rate, original_emi, months);
    let baseline_interest: f64 = baseline.iter().map(|r| r.interest).sum();

    let mut rows: Vec<RawRow> = Vec::with_capacity(months as usize);
    let mut balance = loan.principal;
    let mut emi = original_emi;
    let mut total_prepaid = 0.0;
    let mut month = 0u32;

    while month < months && balance > 0.0 {
        month += 1;
        let interest = balance * rate;
        let principal_paid = (emi - interest).min(balance);
        balance = (balance - principal_paid).max(0.0);

        let year_end = month % 12 == 0;
        if year_end && month / 12 >= input.start_year && input.yearly_prepayment > 0.0 && balance > 0.0 {
            let prepaid = input.yearly_prepayment.min(balance);
            balance -= prepaid;
            total_prepaid += prepaid;
            if input.mode == PrepaymentMode::ReduceEmi && balance > 0.0 {
                let remaining = months.saturating_sub(month).max(1);
                emi = annuity::payment(balance, rate, remaining as f64);
            }
        }

        rows.push(RawRow {
            period: month,
            emi,
            principal: principal_paid,
            interest,
            balance,
        });
    }

    let total_interest: f64 = rows.iter().map(|r| r.interest).sum();
    let baseline_months = baseline.len() as u32;
    let months_taken = rows.len() as u32;

    tracing::debug!(
        label = %loan.label,
        mode = ?input.mode,
        baseline_months,
        months_taken,
        "prepayment simulated"
    );

    Ok(PrepaymentResult {
        yearly: aggregate_yearly(&rows),
        schedule: rows.into_iter().map(RawRow::to_row).collect(),
        baseline_interest: Money::from_major(baseline_interest),
        total_interest: Money::from_major(total_interest),
        interest_saved: Money::from_major((baseline_interest - total_interest).max(0.0)),
        total_prepaid: Money::from_major(total_prepaid),
        baseline_months,
        months_taken,
        months_saved: baseline_months.saturating_sub(months_taken),
        original_emi: Money::from_major(original_emi),
        final_emi: Money::from_major(emi),
        emi_change: Money::from_major((emi - original_emi).abs()),
    })
}

// ============================================================================
// Rate Shock and Tenure Comparison
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RateShockResult {
    pub shock_pct: f64,
    pub base: EmiResult,
    pub shocked: EmiResult,
    pub emi_increase: Money,
    /// Extra lifetime interest (never negative)
    pub extra_interest: Money,
}

/// Compare the EMI at the input rate with the EMI at `rate + shock_pct`.
pub fn rate_shock(input: &EmiInput, shock_pct: f64) -> CalcResult<RateShockResult> {
    let base = calculate(input)?;
    let shocked_rate = input.annual_rate_pct + shock_pct;
    if shocked_rate < 0.0 {
        return Err(CalcError::invalid_input(
            "shock_pct",
            shock_pct.to_string(),
            "Shocked rate would be negative",
        ));
    }
    let shocked = calculate(&input.with_rate(shocked_rate))?;

    Ok(RateShockResult {
        shock_pct,
        emi_increase: shocked.emi - base.emi,
        extra_interest: (shocked.total_interest - base.total_interest).non_negative(),
        base,
        shocked,
    })
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TenureComparison {
    pub tenure_years: f64,
    pub result: EmiResult,
}

/// EMI results for each tenure in `tenures_years`, keeping principal and rate.
pub fn compare_tenures(input: &EmiInput, tenures_years: &[f64]) -> CalcResult<Vec<TenureComparison>> {
    tenures_years
        .iter()
        .map(|&tenure_years| {
            Ok(TenureComparison {
                tenure_years,
                result: calculate(&input.with_tenure(tenure_years))?,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn home_loan() -> EmiInput {
        EmiInput {
            label: "Home".to_string(),
            principal: 2_500_000.0,
            annual_rate_pct: 8.5,
            tenure_years: 20.0,
        }
    }

    #[test]
    fn test_reference_emi() {
        let result = calculate(&home_loan()).unwrap();
        assert_eq!(result.months, 240);
        assert_relative_eq!(result.emi.major(), 21_695.58, epsilon = 0.005);
        assert_relative_eq!(result.total_interest.major(), 2_706_939.40, epsilon = 0.01);
        assert_eq!(result.total_amount - result.total_interest, Money::from_major(2_500_000.0));
        assert!(result.interest_share_pct > 50.0 && result.interest_share_pct < 53.0);
    }

    #[test]
    fn test_zero_rate() {
        let input = EmiInput {
            annual_rate_pct: 0.0,
            principal: 120_000.0,
            tenure_years: 2.0,
            ..home_loan()
        };
        let result = calculate(&input).unwrap();
        assert_eq!(result.emi, Money::from_major(5_000.0));
        assert_eq!(result.total_interest, Money::ZERO);
    }

    #[test]
    fn test_fractional_tenure_rounds_months() {
        let input = EmiInput { tenure_years: 1.49, ..home_loan() };
        assert_eq!(input.months(), 18);
        let input = EmiInput { tenure_years: 0.01, ..home_loan() };
        assert!(calculate(&input).is_err());
    }

    #[test]
    fn test_validation() {
        assert!(calculate(&EmiInput { principal: 0.0, ..home_loan() }).is_err());
        assert!(calculate(&EmiInput { annual_rate_pct: -1.0, ..home_loan() }).is_err());
        assert!(calculate(&EmiInput { tenure_years: f64::NAN, ..home_loan() }).is_err());
    }

    #[test]
    fn test_tenure_ceiling() {
        let input = EmiInput {
            principal: 1_000.0,
            annual_rate_pct: 5.0,
            tenure_years: 1e9,
            ..home_loan()
        };
        assert_eq!(monthly_schedule(&input).unwrap_err().error_code(), "INVALID_INPUT");
        assert!(calculate(&EmiInput { tenure_years: 100.0, ..input.clone() }).is_ok());
    }

    #[test]
    fn test_clamped() {
        let input = EmiInput {
            principal: 10_000.0,
            annual_rate_pct: 25.0,
            ..home_loan()
        };
        let (clamped, adjustments) = input.clamped();
        assert_eq!(clamped.principal, 100_000.0);
        assert_eq!(clamped.annual_rate_pct, 20.0);
        assert_eq!(clamped.tenure_years, 20.0);
        assert_eq!(adjustments.len(), 2);
    }

    #[test]
    fn test_monthly_schedule_pays_off() {
        let rows = monthly_schedule(&home_loan()).unwrap();
        assert_eq!(rows.len(), 240);
        assert_eq!(rows.last().unwrap().balance, Money::ZERO);

        // First month interest = 25L × 8.5% / 12
        assert_relative_eq!(rows[0].interest.major(), 17_708.33, epsilon = 0.005);
        // Interest falls, principal rises
        assert!(rows[100].interest < rows[0].interest);
        assert!(rows[100].principal > rows[0].principal);
    }

    #[test]
    fn test_yearly_schedule() {
        let input = EmiInput { tenure_years: 2.5, ..home_loan() };
        let yearly = yearly_schedule(&input).unwrap();
        assert_eq!(yearly.len(), 3);
        assert_eq!(yearly[2].months, 6);
        assert_eq!(yearly[2].closing_balance, Money::ZERO);

        let paid: i64 = yearly.iter().map(|y| y.principal_paid.minor()).sum();
        assert!((paid - Money::from_major(2_500_000.0).minor()).abs() <= 3);
    }

    #[test]
    fn test_prepayment_reduce_tenure() {
        let input = PrepaymentInput {
            loan: home_loan(),
            yearly_prepayment: 100_000.0,
            start_year: 1,
            mode: PrepaymentMode::ReduceTenure,
        };
        let result = simulate_prepayment(&input).unwrap();
        assert!(result.months_taken < 240);
        assert!(result.months_saved > 0);
        assert!(result.interest_saved > Money::ZERO);
        assert_eq!(result.final_emi, result.original_emi);
        assert_eq!(result.emi_change, Money::ZERO);
        assert_eq!(result.schedule.last().unwrap().balance, Money::ZERO);
    }

    #[test]
    fn test_prepayment_reduce_emi() {
        let input = PrepaymentInput {
            loan: home_loan(),
            yearly_prepayment: 100_000.0,
            start_year: 3,
            mode: PrepaymentMode::ReduceEmi,
        };
        let result = simulate_prepayment(&input).unwrap();
        assert_eq!(result.months_taken, 240);
        assert!(result.final_emi < result.original_emi);
        assert!(result.emi_change > Money::ZERO);
        assert!(result.interest_saved > Money::ZERO);
        // Nothing prepaid during the first two years
        assert_eq!(result.schedule[23].emi, result.original_emi);
    }

    #[test]
    fn test_no_prepayment_matches_baseline() {
        let input = PrepaymentInput {
            loan: home_loan(),
            yearly_prepayment: 0.0,
            start_year: 1,
            mode: PrepaymentMode::ReduceTenure,
        };
        let result = simulate_prepayment(&input).unwrap();
        assert_eq!(result.interest_saved, Money::ZERO);
        assert_eq!(result.months_saved, 0);
        assert_eq!(result.total_interest, result.baseline_interest);
    }

    #[test]
    fn test_rate_shock() {
        let shock = rate_shock(&home_loan(), 1.0).unwrap();
        assert!(shock.shocked.emi > shock.base.emi);
        assert!(shock.extra_interest > Money::ZERO);
        assert_eq!(shock.emi_increase, shock.shocked.emi - shock.base.emi);

        assert!(rate_shock(&home_loan(), -10.0).is_err());
    }

    #[test]
    fn test_compare_tenures() {
        let rows = compare_tenures(&home_loan(), &[10.0, 15.0, 20.0]).unwrap();
        assert_eq!(rows.len(), 3);
        assert!(rows[0].result.emi > rows[1].result.emi);
        assert!(rows[0].result.total_interest < rows[2].result.total_interest);
    }
}
