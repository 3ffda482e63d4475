//! # Policy Configuration
//!
//! Every regulatory or product constant the calculators depend on (FOIR caps,
//! LTV bands, IRS limits, VAT rates, tax slabs) lives here rather than in the
//! calculation code. Defaults reproduce the published figures; a TOML file can
//! override any subset.
//!
//! ## TOML Example
//!
//! ```toml
//! [retirement]
//! base_limit = 23500.0
//! catch_up = 7500.0
//!
//! [lending.foir_caps]
//! psu = 50.0
//! ```
//!
//! ```rust
//! use fincalc_core::policy::PolicySet;
//!
//! let policy = PolicySet::from_toml_str("[retirement]\nbase_limit = 23500.0\n").unwrap();
//! assert_eq!(policy.retirement.base_limit, 23500.0);
//! assert_eq!(policy.retirement.catch_up, 7500.0); // untouched default
//! ```

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Environment variable the CLI reads for a default policy file
pub const POLICY_ENV_VAR: &str = "FINCALC_POLICY";

/// All policy tables, grouped by calculator family.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySet {
    pub lending: LendingPolicy,
    pub retirement: RetirementLimits,
    pub vat: VatPolicy,
    pub income_tax: IncomeTaxPolicy,
    pub mortgage: MortgagePolicy,
}

impl PolicySet {
    /// Parse a (possibly partial) TOML policy document.
    pub fn from_toml_str(source: &str) -> CalcResult<Self> {
        let policy: PolicySet = toml::from_str(source).map_err(|e| CalcError::config_error(e.to_string()))?;
        policy.validate()?;
        Ok(policy)
    }

    /// Load a TOML policy file from disk.
    pub fn load(path: &Path) -> CalcResult<Self> {
        let source = fs::read_to_string(path)
            .map_err(|e| CalcError::file_error("read policy", path.display().to_string(), e.to_string()))?;
        let policy = Self::from_toml_str(&source)?;
        tracing::debug!(path = %path.display(), "loaded policy file");
        Ok(policy)
    }

    /// Serialize to TOML (used by `fincalc new` to write an editable template).
    pub fn to_toml_string(&self) -> CalcResult<String> {
        toml::to_string_pretty(self).map_err(|e| CalcError::SerializationError { reason: e.to_string() })
    }

    /// Sanity-check the tables after an override.
    pub fn validate(&self) -> CalcResult<()> {
        check_bands("lending.ltv_bands", self.lending.ltv_bands.iter().map(|b| b.up_to))?;
        check_bands("income_tax.new_regime_slabs", self.income_tax.new_regime_slabs.iter().map(|s| s.up_to))?;
        check_bands("income_tax.old_regime_slabs", self.income_tax.old_regime_slabs.iter().map(|s| s.up_to))?;

        for (field, pct) in [
            ("lending.foir_caps.psu", self.lending.foir_caps.psu),
            ("lending.foir_caps.private", self.lending.foir_caps.private),
            ("lending.foir_caps.nbfc", self.lending.foir_caps.nbfc),
            ("vat.standard_rate_pct", self.vat.standard_rate_pct),
            ("vat.reduced_rate_pct", self.vat.reduced_rate_pct),
            ("income_tax.cess_pct", self.income_tax.cess_pct),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                return Err(CalcError::config_error(format!("{} must be between 0 and 100, got {}", field, pct)));
            }
        }
        if self.retirement.base_limit < 0.0 || self.retirement.catch_up < 0.0 {
            return Err(CalcError::config_error("retirement limits cannot be negative"));
        }
        Ok(())
    }
}

/// Bands must have strictly increasing upper bounds with only the last open.
fn check_bands(name: &str, bounds: impl Iterator<Item = Option<f64>>) -> CalcResult<()> {
    let bounds: Vec<Option<f64>> = bounds.collect();
    if bounds.is_empty() {
        return Err(CalcError::config_error(format!("{} must not be empty", name)));
    }
    let mut previous = f64::NEG_INFINITY;
    for (i, bound) in bounds.iter().enumerate() {
        match bound {
            Some(b) if *b > previous => previous = *b,
            Some(_) => {
                return Err(CalcError::config_error(format!("{} upper bounds must increase", name)));
            }
            None if i + 1 == bounds.len() => {}
            None => {
                return Err(CalcError::config_error(format!("{} only the last band may be open-ended", name)));
            }
        }
    }
    if bounds.last().copied().flatten().is_some() {
        return Err(CalcError::config_error(format!("{} last band must be open-ended", name)));
    }
    Ok(())
}

// ============================================================================
// Lending (India home loan)
// ============================================================================

/// Home-loan underwriting rules (RBI LTV bands, lender FOIR caps).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LendingPolicy {
    /// Share of co-applicant income counted (0.75 = 75%)
    pub co_applicant_weight: f64,
    /// Share of other/rental income counted
    pub other_income_weight: f64,
    /// Longest tenure any lender offers, in years
    pub max_tenure_years: u32,
    pub retirement_age_salaried: u32,
    pub retirement_age_self_employed: u32,
    pub foir_caps: FoirCaps,
    /// Regulatory LTV bands by property value
    pub ltv_bands: Vec<LtvBand>,
    pub credit_score_adjustments: CreditScoreAdjustments,
    pub processing_fee_pct: f64,
    pub gst_on_fee_pct: f64,
    pub stamp_duty_pct: f64,
    pub legal_charges: f64,
}

impl Default for LendingPolicy {
    fn default() -> Self {
        LendingPolicy {
            co_applicant_weight: 0.75,
            other_income_weight: 0.60,
            max_tenure_years: 30,
            retirement_age_salaried: 60,
            retirement_age_self_employed: 65,
            foir_caps: FoirCaps::default(),
            ltv_bands: vec![
                LtvBand { up_to: Some(3_000_000.0), max_ltv_pct: 90.0 },
                LtvBand { up_to: Some(7_500_000.0), max_ltv_pct: 80.0 },
                LtvBand { up_to: None, max_ltv_pct: 75.0 },
            ],
            credit_score_adjustments: CreditScoreAdjustments::default(),
            processing_fee_pct: 0.5,
            gst_on_fee_pct: 18.0,
            stamp_duty_pct: 5.0,
            legal_charges: 15_000.0,
        }
    }
}

impl LendingPolicy {
    /// Regulatory maximum LTV% for a property value.
    pub fn max_ltv_pct(&self, property_value: f64) -> f64 {
        self.ltv_bands
            .iter()
            .find(|band| band.up_to.map_or(true, |limit| property_value <= limit))
            .map(|band| band.max_ltv_pct)
            .unwrap_or(0.0)
    }
}

/// Maximum FOIR% by lender category.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FoirCaps {
    pub psu: f64,
    pub private: f64,
    pub nbfc: f64,
}

impl Default for FoirCaps {
    fn default() -> Self {
        FoirCaps {
            psu: 55.0,
            private: 60.0,
            nbfc: 65.0,
        }
    }
}

/// One LTV band: properties valued up to `up_to` (inclusive) may be financed
/// up to `max_ltv_pct`. `None` marks the open top band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LtvBand {
    pub up_to: Option<f64>,
    pub max_ltv_pct: f64,
}

/// Interest-rate loading (percentage points) by credit-score band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CreditScoreAdjustments {
    pub excellent: f64,
    pub good: f64,
    pub fair: f64,
    pub poor: f64,
}

impl Default for CreditScoreAdjustments {
    fn default() -> Self {
        CreditScoreAdjustments {
            excellent: 0.0,
            good: 0.25,
            fair: 0.75,
            poor: 1.5,
        }
    }
}

// ============================================================================
// Retirement (US 401k)
// ============================================================================

/// IRS elective-deferral limits and projection assumptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetirementLimits {
    /// Annual employee deferral limit under the catch-up age
    pub base_limit: f64,
    /// Extra deferral allowed from `catch_up_age`
    pub catch_up: f64,
    pub catch_up_age: u32,
    /// Safe withdrawal rate used for the monthly income estimate
    pub withdrawal_rate_pct: f64,
    pub conservative_return_pct: f64,
    pub average_return_pct: f64,
    pub aggressive_return_pct: f64,
}

impl Default for RetirementLimits {
    fn default() -> Self {
        RetirementLimits {
            base_limit: 23_000.0,
            catch_up: 7_500.0,
            catch_up_age: 50,
            withdrawal_rate_pct: 4.0,
            conservative_return_pct: 4.0,
            average_return_pct: 7.0,
            aggressive_return_pct: 10.0,
        }
    }
}

impl RetirementLimits {
    /// Deferral limit for a given age
    pub fn limit_for_age(&self, age: u32) -> f64 {
        if age >= self.catch_up_age {
            self.base_limit + self.catch_up
        } else {
            self.base_limit
        }
    }
}

// ============================================================================
// VAT (UK)
// ============================================================================

/// HMRC VAT rates and Flat Rate Scheme sector percentages.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VatPolicy {
    pub standard_rate_pct: f64,
    pub reduced_rate_pct: f64,
    pub zero_rate_pct: f64,
    /// Registration threshold (annual taxable turnover)
    pub registration_threshold: f64,
    pub flat_rate_sectors: Vec<FlatRateSector>,
}

impl Default for VatPolicy {
    fn default() -> Self {
        VatPolicy {
            standard_rate_pct: 20.0,
            reduced_rate_pct: 5.0,
            zero_rate_pct: 0.0,
            registration_threshold: 85_000.0,
            flat_rate_sectors: vec![
                FlatRateSector::new("food", "Retailing food, confectionery or tobacco", 4.0),
                FlatRateSector::new("it", "IT consultancy or data processing", 12.5),
                FlatRateSector::new("business", "Business services not listed elsewhere", 14.5),
                FlatRateSector::new("limited-cost", "Limited cost business", 16.5),
            ],
        }
    }
}

impl VatPolicy {
    /// Look up a Flat Rate Scheme sector by key
    pub fn sector(&self, key: &str) -> Option<&FlatRateSector> {
        self.flat_rate_sectors.iter().find(|s| s.key.eq_ignore_ascii_case(key))
    }
}

/// A Flat Rate Scheme trade sector and its remittance percentage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRateSector {
    pub key: String,
    pub name: String,
    pub rate_pct: f64,
}

impl FlatRateSector {
    pub fn new(key: impl Into<String>, name: impl Into<String>, rate_pct: f64) -> Self {
        FlatRateSector {
            key: key.into(),
            name: name.into(),
            rate_pct,
        }
    }
}

// ============================================================================
// Income tax (India, FY 2024-25)
// ============================================================================

/// One tax slab: income up to `up_to` (inclusive) above the previous slab is
/// taxed at `rate_pct`. `None` marks the open top slab.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TaxSlab {
    pub up_to: Option<f64>,
    pub rate_pct: f64,
}

impl TaxSlab {
    pub const fn new(up_to: Option<f64>, rate_pct: f64) -> Self {
        TaxSlab { up_to, rate_pct }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IncomeTaxPolicy {
    pub standard_deduction: f64,
    pub cess_pct: f64,
    /// Section 80C cap
    pub max_80c: f64,
    /// Cap on all other deductions combined
    pub max_other_deductions: f64,
    /// Old-regime slabs for taxpayers below 60
    pub old_regime_slabs: Vec<TaxSlab>,
    /// Old-regime basic exemption for ages 60-79
    pub senior_exemption: f64,
    /// Old-regime basic exemption for ages 80+
    pub super_senior_exemption: f64,
    pub new_regime_slabs: Vec<TaxSlab>,
}

impl Default for IncomeTaxPolicy {
    fn default() -> Self {
        IncomeTaxPolicy {
            standard_deduction: 50_000.0,
            cess_pct: 4.0,
            max_80c: 150_000.0,
            max_other_deductions: 200_000.0,
            old_regime_slabs: vec![
                TaxSlab::new(Some(250_000.0), 0.0),
                TaxSlab::new(Some(500_000.0), 5.0),
                TaxSlab::new(Some(1_000_000.0), 20.0),
                TaxSlab::new(None, 30.0),
            ],
            senior_exemption: 300_000.0,
            super_senior_exemption: 500_000.0,
            new_regime_slabs: vec![
                TaxSlab::new(Some(300_000.0), 0.0),
                TaxSlab::new(Some(600_000.0), 5.0),
                TaxSlab::new(Some(900_000.0), 10.0),
                TaxSlab::new(Some(1_200_000.0), 15.0),
                TaxSlab::new(Some(1_500_000.0), 20.0),
                TaxSlab::new(None, 30.0),
            ],
        }
    }
}

// ============================================================================
// Mortgage (US / UK)
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MortgagePolicy {
    /// UK lenders' typical loan-to-income multiple
    pub uk_income_multiple: f64,
    /// Down payment (equity) % at or above which PMI is not charged
    pub pmi_equity_threshold_pct: f64,
}

impl Default for MortgagePolicy {
    fn default() -> Self {
        MortgagePolicy {
            uk_income_multiple: 4.5,
            pmi_equity_threshold_pct: 20.0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(PolicySet::default().validate().is_ok());
    }

    #[test]
    fn test_ltv_bands() {
        let lending = LendingPolicy::default();
        assert_eq!(lending.max_ltv_pct(2_000_000.0), 90.0);
        assert_eq!(lending.max_ltv_pct(3_000_000.0), 90.0);
        assert_eq!(lending.max_ltv_pct(3_000_001.0), 80.0);
        assert_eq!(lending.max_ltv_pct(7_500_000.0), 80.0);
        assert_eq!(lending.max_ltv_pct(10_000_000.0), 75.0);
    }

    #[test]
    fn test_catch_up_limit() {
        let limits = RetirementLimits::default();
        assert_eq!(limits.limit_for_age(49), 23_000.0);
        assert_eq!(limits.limit_for_age(50), 30_500.0);
    }

    #[test]
    fn test_partial_toml_override() {
        let toml = r#"
            [lending.foir_caps]
            psu = 50.0

            [vat]
            standard_rate_pct = 17.5
        "#;
        let policy = PolicySet::from_toml_str(toml).unwrap();
        assert_eq!(policy.lending.foir_caps.psu, 50.0);
        assert_eq!(policy.lending.foir_caps.nbfc, 65.0);
        assert_eq!(policy.vat.standard_rate_pct, 17.5);
        assert_eq!(policy.vat.reduced_rate_pct, 5.0);
        assert_eq!(policy.retirement, RetirementLimits::default());
    }

    #[test]
    fn test_invalid_override_rejected() {
        let err = PolicySet::from_toml_str("[vat]\nstandard_rate_pct = 120.0\n").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");

        let bands = r#"
            [lending]
            ltv_bands = [
                { up_to = 5000000.0, max_ltv_pct = 80.0 },
                { up_to = 1000000.0, max_ltv_pct = 90.0 },
            ]
        "#;
        assert!(PolicySet::from_toml_str(bands).is_err());
    }

    #[test]
    fn test_malformed_toml() {
        let err = PolicySet::from_toml_str("[retirement\nbase_limit = ").unwrap_err();
        assert_eq!(err.error_code(), "CONFIG_ERROR");
    }

    #[test]
    fn test_toml_roundtrip() {
        let policy = PolicySet::default();
        let text = policy.to_toml_string().unwrap();
        let parsed = PolicySet::from_toml_str(&text).unwrap();
        assert_eq!(parsed, policy);
    }

    #[test]
    fn test_flat_rate_sector_lookup() {
        let vat = VatPolicy::default();
        assert_eq!(vat.sector("IT").unwrap().rate_pct, 12.5);
        assert!(vat.sector("unknown").is_none());
    }
}
