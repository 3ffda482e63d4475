//! Subcommand arguments and handlers.

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Args;
use serde::de::DeserializeOwned;
use serde::Serialize;

use fincalc_core::calculations::credit_payoff::{self, CreditPayoffInput, CreditPayoffResult};
use fincalc_core::calculations::emi::{self, EmiInput, EmiResult, RateShockResult, YearlyRow};
use fincalc_core::calculations::loan_eligibility::{
    self,
    CreditScoreBand,
    EligibilityOutcome,
    EmploymentType,
    LenderType,
    LoanEligibilityInput,
};
use fincalc_core::calculations::retirement::{self, RetirementInput, RetirementResult, ReturnScenario};
use fincalc_core::calculations::vat::{self, FlatRate, VatInput, VatMode, VatRate, VatResult};
use fincalc_core::calculations::{evaluate, CalculationOutput};
use fincalc_core::equations::{generate_formulas_markdown, ALL_FORMULAS};
use fincalc_core::file_io::{load_item, load_worksheet, save_worksheet};
use fincalc_core::inputs::{parse_amount, ClampedField};
use fincalc_core::policy::PolicySet;
use fincalc_core::units::Currency;
use fincalc_core::worksheet::{Worksheet, FILE_EXTENSION};

use crate::render::{headline, Printer, TextBlock};

// ============================================================================
// Value parsers
// ============================================================================

/// Amounts accept currency symbols and separators: `₹25,00,000`, `£1,200.50`.
fn amount(raw: &str) -> Result<f64, String> {
    parse_amount(raw).map_err(|e| e.to_string())
}

/// Parse a unit enum variant by its serde name (`self-employed`, `psu`, ...).
fn serde_name<T: DeserializeOwned>(raw: &str) -> Result<T, String> {
    serde_json::from_value(serde_json::Value::String(raw.to_string())).map_err(|e| e.to_string())
}

fn vat_rate(raw: &str) -> Result<VatRate, String> {
    match raw.parse::<f64>() {
        Ok(pct) => Ok(VatRate::Custom(pct)),
        Err(_) => serde_name(raw),
    }
}

fn flat_rate(raw: &str) -> Result<FlatRate, String> {
    match raw.parse::<f64>() {
        Ok(pct) => Ok(FlatRate::Pct(pct)),
        Err(_) => Ok(FlatRate::Sector(raw.to_string())),
    }
}

fn warn_clamped(adjustments: &[ClampedField]) {
    for a in adjustments {
        tracing::warn!(field = %a.field, original = a.original, clamped = a.clamped, "input out of range, clamped");
    }
}

// ============================================================================
// emi
// ============================================================================

#[derive(Args, Debug)]
pub struct EmiArgs {
    /// Loan amount
    #[arg(long, value_parser = amount)]
    pub principal: f64,
    /// Annual interest rate (%)
    #[arg(long)]
    pub rate: f64,
    /// Tenure in years
    #[arg(long)]
    pub years: f64,
    #[arg(long, default_value = "")]
    pub label: String,
    /// Include the year-by-year amortization schedule
    #[arg(long)]
    pub schedule: bool,
    /// Also show the EMI after a rate rise of this many points
    #[arg(long)]
    pub shock: Option<f64>,
}

#[derive(Serialize)]
struct EmiReport {
    clamped: Vec<ClampedField>,
    result: EmiResult,
    #[serde(skip_serializing_if = "Option::is_none")]
    schedule: Option<Vec<YearlyRow>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    rate_shock: Option<RateShockResult>,
}

pub fn emi(args: &EmiArgs, json: bool) -> Result<()> {
    let (input, clamped) = EmiInput {
        label: args.label.clone(),
        principal: args.principal,
        annual_rate_pct: args.rate,
        tenure_years: args.years,
    }
    .clamped();
    warn_clamped(&clamped);

    let report = EmiReport {
        result: emi::calculate(&input)?,
        schedule: if args.schedule { Some(emi::yearly_schedule(&input)?) } else { None },
        rate_shock: args.shock.map(|pct| emi::rate_shock(&input, pct)).transpose()?,
        clamped,
    };

    Printer::new(json, Currency::Inr).emit(&report, |p| {
        let r = &report.result;
        let mut text = TextBlock::new("Loan EMI")
            .row("Monthly EMI", p.money(r.emi))
            .row("Months", r.months)
            .row("Total interest", p.money(r.total_interest))
            .row("Total amount", p.money(r.total_amount))
            .row("Interest share", format!("{:.1}%", r.interest_share_pct));

        if let Some(shock) = &report.rate_shock {
            text = text
                .section(&format!("Rate +{:.2} points", shock.shock_pct))
                .row("Shocked EMI", p.money(shock.shocked.emi))
                .row("EMI increase", p.money(shock.emi_increase))
                .row("Extra interest", p.money(shock.extra_interest));
        }

        if let Some(rows) = &report.schedule {
            text = text.section("Year  Principal        Interest         Balance");
            for row in rows {
                text = text.line(format!(
                    "{:>4}  {:<16} {:<16} {}",
                    row.year,
                    p.money(row.principal_paid),
                    p.money(row.interest_paid),
                    p.money(row.closing_balance)
                ));
            }
        }
        text.finish()
    })
}

// ============================================================================
// payoff
// ============================================================================

#[derive(Args, Debug)]
pub struct PayoffArgs {
    /// Card balance
    #[arg(long, value_parser = amount)]
    pub balance: f64,
    /// Card APR (%)
    #[arg(long)]
    pub rate: f64,
    /// Fixed monthly payment
    #[arg(long, value_parser = amount)]
    pub payment: f64,
    /// Also report the payment that clears the card in this many months
    #[arg(long)]
    pub target_months: Option<u32>,
    #[arg(long, default_value = "")]
    pub label: String,
}

#[derive(Serialize)]
struct PayoffReport {
    clamped: Vec<ClampedField>,
    result: CreditPayoffResult,
}

pub fn payoff(args: &PayoffArgs, json: bool) -> Result<()> {
    let (input, clamped) = CreditPayoffInput {
        label: args.label.clone(),
        balance: args.balance,
        annual_rate_pct: args.rate,
        monthly_payment: args.payment,
        target_months: args.target_months,
    }
    .clamped();
    warn_clamped(&clamped);

    let report = PayoffReport {
        result: credit_payoff::calculate(&input)?,
        clamped,
    };

    Printer::new(json, Currency::Usd).emit(&report, |p| {
        let r = &report.result;
        let (years, months) = r.years_and_months();
        TextBlock::new("Credit Card Payoff")
            .row("Time to payoff", format!("{} months ({}y {}m)", r.months_to_payoff, years, months))
            .row("Total interest", p.money(r.total_interest))
            .row("Total paid", p.money(r.total_paid))
            .row("First month interest", p.money(r.first_month_interest))
            .row_if("Payment for target", r.payment_for_target.map(|m| p.money(m)))
            .finish()
    })
}

// ============================================================================
// eligibility
// ============================================================================

#[derive(Args, Debug)]
pub struct EligibilityArgs {
    /// Primary applicant's annual income
    #[arg(long, value_parser = amount)]
    pub income: f64,
    /// Co-applicant annual income
    #[arg(long, value_parser = amount)]
    pub co_income: Option<f64>,
    /// Rental or other annual income
    #[arg(long, value_parser = amount)]
    pub other_income: Option<f64>,
    /// Existing monthly EMIs
    #[arg(long, value_parser = amount)]
    pub existing_emi: Option<f64>,
    #[arg(long, value_parser = amount)]
    pub property: Option<f64>,
    /// Annual interest rate (%)
    #[arg(long)]
    pub rate: Option<f64>,
    #[arg(long)]
    pub years: Option<f64>,
    #[arg(long)]
    pub age: Option<u32>,
    /// Requested FOIR (%)
    #[arg(long)]
    pub foir: Option<f64>,
    /// Requested LTV (%)
    #[arg(long)]
    pub ltv: Option<f64>,
    /// salaried | self-employed
    #[arg(long, value_parser = serde_name::<EmploymentType>)]
    pub employment: Option<EmploymentType>,
    /// psu | private | nbfc
    #[arg(long, value_parser = serde_name::<LenderType>)]
    pub lender: Option<LenderType>,
    /// Bureau score (300-900)
    #[arg(long)]
    pub credit_score: Option<u16>,
    /// Skip processing fee, stamp duty and legal charges
    #[arg(long)]
    pub no_charges: bool,
    #[arg(long, default_value = "")]
    pub label: String,
}

pub fn eligibility(args: &EligibilityArgs, policy: &PolicySet, json: bool) -> Result<()> {
    let d = LoanEligibilityInput::default();
    let (input, clamped) = LoanEligibilityInput {
        label: args.label.clone(),
        annual_income: args.income,
        co_applicant_income: args.co_income.unwrap_or(d.co_applicant_income),
        other_income: args.other_income.unwrap_or(d.other_income),
        existing_emi: args.existing_emi.unwrap_or(d.existing_emi),
        annual_rate_pct: args.rate.unwrap_or(d.annual_rate_pct),
        tenure_years: args.years.unwrap_or(d.tenure_years),
        property_value: args.property.unwrap_or(d.property_value),
        foir_pct: args.foir.unwrap_or(d.foir_pct),
        ltv_pct: args.ltv.unwrap_or(d.ltv_pct),
        age: args.age.unwrap_or(d.age),
        employment: args.employment.unwrap_or(d.employment),
        credit_score: args.credit_score.map(CreditScoreBand::from_score).unwrap_or(d.credit_score),
        lender: args.lender.unwrap_or(d.lender),
        include_charges: !args.no_charges,
    }
    .clamped();
    warn_clamped(&clamped);

    let outcome = loan_eligibility::calculate(&input, &policy.lending)?;

    Printer::new(json, Currency::Inr).emit(&outcome, |p| match &outcome {
        EligibilityOutcome::Ineligible { message, .. } => {
            TextBlock::new("Home Loan Eligibility").row("Status", "Not eligible").line(message).finish()
        }
        EligibilityOutcome::Eligible(r) => {
            let mut text = TextBlock::new("Home Loan Eligibility")
                .row("Eligible loan", p.money(r.eligible_loan))
                .row("Monthly EMI", p.money(r.monthly_emi))
                .row("Limited by", format!("{:?}", r.limiting_factor))
                .row("By EMI capacity", p.money(r.loan_by_emi_capacity))
                .row("By LTV", p.money(r.loan_by_ltv))
                .row("Effective rate", format!("{:.2}%", r.effective_rate_pct))
                .row("Tenure", format!("{} years{}", r.effective_tenure_years, if r.tenure_capped { " (capped)" } else { "" }))
                .row("FOIR utilisation", format!("{:.1}%", r.foir_utilization_pct))
                .row("LTV used", format!("{:.1}%", r.ltv_used_pct))
                .row("Down payment", p.money(r.down_payment))
                .row("Total interest", p.money(r.total_interest))
                .row("Approval score", format!("{}/100", r.approval_score));
            if let Some(charges) = &r.charges {
                text = text
                    .section("Upfront charges")
                    .row("Processing fee + GST", p.money(charges.processing_fee + charges.gst))
                    .row("Stamp duty", p.money(charges.stamp_duty_and_registration))
                    .row("Legal", p.money(charges.legal_charges))
                    .row("Total upfront cost", p.money(r.total_upfront_cost));
            }
            text.finish()
        }
    })
}

// ============================================================================
// retirement
// ============================================================================

#[derive(Args, Debug)]
pub struct RetirementArgs {
    #[arg(long)]
    pub age: u32,
    #[arg(long)]
    pub retire_at: u32,
    /// Current 401(k) balance
    #[arg(long, value_parser = amount)]
    pub balance: Option<f64>,
    #[arg(long, value_parser = amount)]
    pub salary: f64,
    /// Employee contribution (% of salary)
    #[arg(long)]
    pub contribution: Option<f64>,
    /// Employer match rate (%)
    #[arg(long = "match")]
    pub employer_match: Option<f64>,
    /// Share of salary the employer matches (%)
    #[arg(long)]
    pub match_cap: Option<f64>,
    /// Yearly salary increase (%)
    #[arg(long)]
    pub raise: Option<f64>,
    /// conservative | average | aggressive
    #[arg(long, value_parser = serde_name::<ReturnScenario>)]
    pub scenario: Option<ReturnScenario>,
    /// Explicit annual return (%), overrides --scenario
    #[arg(long)]
    pub return_pct: Option<f64>,
    #[arg(long, default_value = "")]
    pub label: String,
}

#[derive(Serialize)]
struct RetirementReport {
    clamped: Vec<ClampedField>,
    result: RetirementResult,
}

pub fn retirement(args: &RetirementArgs, policy: &PolicySet, json: bool) -> Result<()> {
    let d = RetirementInput::default();
    let scenario = match args.return_pct {
        Some(pct) => ReturnScenario::Custom(pct),
        None => args.scenario.unwrap_or(d.scenario),
    };
    let (input, clamped) = RetirementInput {
        label: args.label.clone(),
        current_age: args.age,
        retirement_age: args.retire_at,
        current_balance: args.balance.unwrap_or(d.current_balance),
        annual_salary: args.salary,
        contribution_pct: args.contribution.unwrap_or(d.contribution_pct),
        employer_match_pct: args.employer_match.unwrap_or(d.employer_match_pct),
        match_cap_pct: args.match_cap.unwrap_or(d.match_cap_pct),
        salary_increase_pct: args.raise.unwrap_or(d.salary_increase_pct),
        scenario,
    }
    .clamped();
    warn_clamped(&clamped);

    let report = RetirementReport {
        result: retirement::calculate(&input, &policy.retirement)?,
        clamped,
    };

    Printer::new(json, Currency::Usd).emit(&report, |p| {
        let r = &report.result;
        TextBlock::new("401(k) Retirement")
            .row("Years to retirement", r.years_to_retirement)
            .row("Assumed return", format!("{:.2}%", r.return_pct))
            .row("Balance at retirement", p.money(r.final_balance))
            .row("You contribute", p.money(r.total_contributed))
            .row("Employer match", p.money(r.total_employer_match))
            .row("Investment gain", p.money(r.investment_gain))
            .row("Monthly income", p.money(r.monthly_income))
            .row("Benchmark", p.money(r.benchmark))
            .row_if("Of benchmark", r.benchmark_pct.map(|pct| format!("{:.0}%", pct)))
            .finish()
    })
}

// ============================================================================
// vat
// ============================================================================

#[derive(Args, Debug)]
pub struct VatArgs {
    /// Net amount (or gross with --remove)
    #[arg(value_parser = amount)]
    pub amount: f64,
    /// Extract VAT from a gross amount
    #[arg(long)]
    pub remove: bool,
    /// standard | reduced | zero | a percentage
    #[arg(long, value_parser = vat_rate)]
    pub rate: Option<VatRate>,
    /// VAT-registered business (can reclaim input VAT)
    #[arg(long)]
    pub business: bool,
    /// Flat Rate Scheme sector key or percentage
    #[arg(long, value_parser = flat_rate, requires = "business")]
    pub flat_rate: Option<FlatRate>,
    /// Annual taxable turnover, for the registration check
    #[arg(long, value_parser = amount)]
    pub turnover: Option<f64>,
    #[arg(long, default_value = "")]
    pub label: String,
}

#[derive(Serialize)]
struct VatReport {
    clamped: Vec<ClampedField>,
    result: VatResult,
}

pub fn vat(args: &VatArgs, policy: &PolicySet, json: bool) -> Result<()> {
    let mode = if args.remove { VatMode::Remove } else { VatMode::Add };
    let (input, clamped) = VatInput {
        label: args.label.clone(),
        rate: args.rate.unwrap_or_default(),
        business: args.business,
        flat_rate: args.flat_rate.clone(),
        annual_turnover: args.turnover,
        ..VatInput::new(mode, args.amount)
    }
    .clamped();
    warn_clamped(&clamped);

    let report = VatReport {
        result: vat::calculate(&input, &policy.vat)?,
        clamped,
    };

    Printer::new(json, Currency::Gbp).emit(&report, |p| {
        let r = &report.result;
        let mut text = TextBlock::new("VAT")
            .row("Rate", format!("{}%", r.rate_pct))
            .row("Net", p.money(r.net))
            .row("VAT", p.money(r.vat))
            .row("Gross", p.money(r.gross));
        if !r.vat_reclaimable.is_zero() {
            text = text.row("Reclaimable", p.money(r.vat_reclaimable));
        }
        if let Some(frs) = &r.flat_rate {
            text = text
                .section("Flat Rate Scheme")
                .row_if("Sector", frs.sector.as_deref())
                .row("Flat rate", format!("{}%", frs.flat_rate_pct))
                .row("Paid to HMRC", p.money(frs.flat_rate_vat))
                .row("Retained", p.money(frs.retained));
        }
        text.row_if(
            "Registration required",
            r.registration_required.map(|yes| if yes { "yes" } else { "no" }),
        )
        .finish()
    })
}

// ============================================================================
// eval / run / new / formulas
// ============================================================================

#[derive(Args, Debug)]
pub struct EvalArgs {
    /// JSON file holding one tagged calculation item
    #[arg(long, short)]
    pub input: PathBuf,
    /// Clamp fields into their bounds before evaluating
    #[arg(long)]
    pub clamp: bool,
}

#[derive(Serialize)]
struct EvalReport {
    clamped: Vec<ClampedField>,
    output: CalculationOutput,
}

pub fn eval(args: &EvalArgs, policy: &PolicySet, json: bool) -> Result<()> {
    let mut item = load_item(&args.input).with_context(|| format!("loading {}", args.input.display()))?;
    let mut clamped = Vec::new();
    if args.clamp {
        (item, clamped) = item.clamped();
        warn_clamped(&clamped);
    }

    let report = EvalReport {
        output: evaluate(&item, policy)?,
        clamped,
    };

    Printer::new(json, Currency::default()).emit(&report, |p| {
        format!("{}: {}\n", item.calc_type(), headline(&report.output, p))
    })
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Worksheet file (.fcw)
    pub worksheet: PathBuf,
}

pub fn run(args: &RunArgs, policy_override: Option<&PolicySet>, json: bool) -> Result<()> {
    let mut sheet =
        load_worksheet(&args.worksheet).with_context(|| format!("loading {}", args.worksheet.display()))?;
    if let Some(policy) = policy_override {
        tracing::info!("policy file overrides the worksheet's embedded policy");
        sheet.settings.policy = policy.clone();
    }

    let report = sheet.evaluate_all();
    let printer = Printer::new(json, report.currency);
    printer.emit(&report, |p| {
        let mut text = TextBlock::new(if report.title.is_empty() { "Worksheet" } else { report.title.as_str() });
        for entry in &report.entries {
            let label = if entry.label.is_empty() { "(unlabelled)" } else { entry.label.as_str() };
            let line = match &entry.result {
                Ok(output) => headline(output, p),
                Err(e) => format!("ERROR [{}] {}", e.error_code(), e),
            };
            text = text.line(format!("{} ({}): {}", label, entry.calc_type, line));
        }
        text.finish()
    })?;

    let failed = report.failures().count();
    if failed > 0 {
        bail!("{} of {} worksheet items failed", failed, report.entries.len());
    }
    Ok(())
}

#[derive(Args, Debug)]
pub struct NewArgs {
    /// Path of the worksheet to create (.fcw is added when missing)
    pub path: PathBuf,
    #[arg(long, default_value = "Untitled")]
    pub title: String,
    #[arg(long, default_value = "")]
    pub author: String,
    /// Overwrite an existing file
    #[arg(long)]
    pub force: bool,
    /// Also write the policy tables as an editable TOML file
    #[arg(long)]
    pub policy_template: Option<PathBuf>,
}

fn with_extension(path: &Path) -> PathBuf {
    if path.extension().is_some() {
        path.to_path_buf()
    } else {
        path.with_extension(FILE_EXTENSION)
    }
}

pub fn new(args: &NewArgs, policy: &PolicySet) -> Result<()> {
    let path = with_extension(&args.path);
    if path.exists() && !args.force {
        bail!("{} already exists (use --force to overwrite)", path.display());
    }

    let mut sheet = Worksheet::new(&args.title, &args.author);
    sheet.settings.policy = policy.clone();
    save_worksheet(&sheet, &path)?;
    println!("Created {}", path.display());

    if let Some(template) = &args.policy_template {
        std::fs::write(template, policy.to_toml_string()?)
            .with_context(|| format!("writing {}", template.display()))?;
        println!("Wrote policy template {}", template.display());
    }
    Ok(())
}

#[derive(Serialize)]
struct FormulaEntry {
    name: &'static str,
    category: &'static str,
    formula: &'static str,
    source: String,
}

pub fn formulas(json: bool) -> Result<()> {
    if !json {
        print!("{}", generate_formulas_markdown());
        return Ok(());
    }

    let entries: Vec<FormulaEntry> = ALL_FORMULAS
        .iter()
        .map(|f| {
            let meta = f.metadata();
            FormulaEntry {
                name: meta.name,
                category: meta.category.display_name(),
                formula: meta.formula_plain,
                source: format!("{}::{}", meta.source_module, meta.source_function),
            }
        })
        .collect();
    println!("{}", serde_json::to_string_pretty(&entries)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_amount_parser() {
        assert_eq!(amount("₹25,00,000").unwrap(), 2_500_000.0);
        assert!(amount("lots").is_err());
    }

    #[test]
    fn test_enum_parsers() {
        assert_eq!(serde_name::<EmploymentType>("self-employed").unwrap(), EmploymentType::SelfEmployed);
        assert_eq!(serde_name::<LenderType>("psu").unwrap(), LenderType::Psu);
        assert!(serde_name::<LenderType>("bank").is_err());

        assert_eq!(vat_rate("reduced").unwrap(), VatRate::Reduced);
        assert_eq!(vat_rate("17.5").unwrap(), VatRate::Custom(17.5));
        assert_eq!(flat_rate("it").unwrap(), FlatRate::Sector("it".to_string()));
        assert_eq!(flat_rate("12.5").unwrap(), FlatRate::Pct(12.5));
    }

    #[test]
    fn test_worksheet_extension() {
        assert_eq!(with_extension(Path::new("plan")), PathBuf::from("plan.fcw"));
        assert_eq!(with_extension(Path::new("plan.json")), PathBuf::from("plan.json"));
    }
}
