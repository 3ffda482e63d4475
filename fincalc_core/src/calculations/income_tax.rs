//! # Income Tax (India, FY 2024-25)
//!
//! Old vs new regime comparison for individual taxpayers.
//!
//! | | Old regime | New regime |
//! |---|---|---|
//! | Deductions | 80C (≤ 1.5 L), others (≤ 2 L), standard 50,000 | Standard 50,000 only |
//! | Basic exemption | 2.5 L / 3 L (60+) / 5 L (80+) | 3 L |
//!
//! Both regimes are evaluated with the same slab evaluator,
//! [`slab_tax`](crate::equations::tax::slab_tax), and attract 4% health and
//! education cess.
//!
//! ```rust
//! use fincalc_core::calculations::income_tax::{calculate, IncomeTaxInput, TaxRegime};
//! use fincalc_core::policy::IncomeTaxPolicy;
//!
//! let input = IncomeTaxInput {
//!     gross_income: 1_000_000.0,
//!     deductions_80c: 150_000.0,
//!     other_deductions: 200_000.0,
//!     ..IncomeTaxInput::default()
//! };
//! let result = calculate(&input, &IncomeTaxPolicy::default()).unwrap();
//! assert_eq!(result.better_regime, TaxRegime::Old);
//! ```

use serde::{Deserialize, Serialize};

use crate::equations::tax::{marginal_rate_pct, slab_tax};
use crate::errors::{require_non_negative, CalcResult};
use crate::policy::{IncomeTaxPolicy, TaxSlab};
use crate::units::Money;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum AgeCategory {
    #[default]
    #[serde(rename = "below60")]
    Below60,
    /// 60 to 79
    #[serde(rename = "60to80")]
    Senior,
    #[serde(rename = "above80")]
    SuperSenior,
}

impl AgeCategory {
    pub fn from_age(age: u32) -> Self {
        match age {
            0..=59 => AgeCategory::Below60,
            60..=79 => AgeCategory::Senior,
            _ => AgeCategory::SuperSenior,
        }
    }

    /// Old-regime basic exemption
    pub fn old_regime_exemption(&self, policy: &IncomeTaxPolicy) -> f64 {
        match self {
            AgeCategory::Below60 => 0.0,
            AgeCategory::Senior => policy.senior_exemption,
            AgeCategory::SuperSenior => policy.super_senior_exemption,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaxRegime {
    Old,
    New,
}

/// ## JSON Example
///
/// ```json
/// { "gross_income": 1200000.0, "deductions_80c": 150000.0, "other_deductions": 25000.0, "age": "below60" }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeTaxInput {
    pub label: String,
    pub gross_income: f64,
    /// Section 80C investments (PPF, ELSS, ...)
    pub deductions_80c: f64,
    /// 80D, HRA, home-loan interest and the like
    pub other_deductions: f64,
    pub age: AgeCategory,
}

impl Default for IncomeTaxInput {
    fn default() -> Self {
        IncomeTaxInput {
            label: String::new(),
            gross_income: 600_000.0,
            deductions_80c: 0.0,
            other_deductions: 0.0,
            age: AgeCategory::Below60,
        }
    }
}

impl IncomeTaxInput {
    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("gross_income", self.gross_income)?;
        require_non_negative("deductions_80c", self.deductions_80c)?;
        require_non_negative("other_deductions", self.other_deductions)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegimeTax {
    pub taxable_income: Money,
    /// Slab tax before cess
    pub tax: Money,
    pub cess: Money,
    pub total_tax: Money,
    pub take_home: Money,
    pub marginal_rate_pct: f64,
    /// Total tax as a share of gross income
    pub effective_rate_pct: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IncomeTaxResult {
    pub gross_income: Money,
    /// Deductions allowed after the 80C and other caps
    pub allowed_deductions: Money,
    pub old_regime: RegimeTax,
    pub new_regime: RegimeTax,
    /// Regime with the lower total tax (new on a tie)
    pub better_regime: TaxRegime,
    pub savings: Money,
}

/// Tax, cess and take-home for one regime.
pub fn regime_tax(gross: f64, taxable: f64, slabs: &[TaxSlab], exemption: f64, cess_pct: f64) -> RegimeTax {
    let tax = slab_tax(taxable, slabs, exemption);
    let cess = tax * cess_pct / 100.0;
    let total = tax + cess;
    RegimeTax {
        taxable_income: Money::from_major(taxable),
        tax: Money::from_major(tax),
        cess: Money::from_major(cess),
        total_tax: Money::from_major(total),
        take_home: Money::from_major(gross - total),
        marginal_rate_pct: marginal_rate_pct(taxable, slabs, exemption),
        effective_rate_pct: if gross > 0.0 { total / gross * 100.0 } else { 0.0 },
    }
}

pub fn calculate(input: &IncomeTaxInput, policy: &IncomeTaxPolicy) -> CalcResult<IncomeTaxResult> {
    input.validate()?;

    let gross = input.gross_income;
    let deductions = input.deductions_80c.min(policy.max_80c) + input.other_deductions.min(policy.max_other_deductions);

    let old_taxable = (gross - deductions - policy.standard_deduction).max(0.0);
    let old = regime_tax(
        gross,
        old_taxable,
        &policy.old_regime_slabs,
        input.age.old_regime_exemption(policy),
        policy.cess_pct,
    );

    let new_taxable = (gross - policy.standard_deduction).max(0.0);
    let new = regime_tax(gross, new_taxable, &policy.new_regime_slabs, 0.0, policy.cess_pct);

    let better_regime = if old.total_tax < new.total_tax { TaxRegime::Old } else { TaxRegime::New };
    let savings = (old.total_tax - new.total_tax).abs();

    tracing::debug!(label = %input.label, better = ?better_regime, savings = %savings, "regimes compared");

    Ok(IncomeTaxResult {
        gross_income: Money::from_major(gross),
        allowed_deductions: Money::from_major(deductions),
        old_regime: old,
        new_regime: new,
        better_regime,
        savings,
    })
}
