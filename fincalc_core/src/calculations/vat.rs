//! # VAT (UK)
//!
//! Adds VAT to a net price or extracts it from a gross price.
//!
//! Removing VAT divides by `1 + rate`; subtracting the rate from the gross
//! figure is wrong (£120 − 20% = £96, but £120 ÷ 1.20 = £100).
//!
//! Business users also see the VAT they can reclaim and, when adding VAT
//! under the Flat Rate Scheme, the margin kept after remitting the flat
//! percentage of the gross turnover to HMRC.
//!
//! ```rust
//! use fincalc_core::calculations::vat::{calculate, VatInput, VatMode};
//! use fincalc_core::policy::VatPolicy;
//! use fincalc_core::units::Money;
//!
//! let policy = VatPolicy::default();
//! let added = calculate(&VatInput::new(VatMode::Add, 100.0), &policy).unwrap();
//! assert_eq!(added.gross, Money::from_major(120.0));
//!
//! let removed = calculate(&VatInput::new(VatMode::Remove, 120.0), &policy).unwrap();
//! assert_eq!(removed.net, Money::from_major(100.0));
//! ```

use serde::{Deserialize, Serialize};

use crate::errors::{require_non_negative, CalcError, CalcResult};
use crate::inputs::{ClampedField, Clamper, FieldBounds};
use crate::policy::VatPolicy;
use crate::units::Money;

pub const AMOUNT_BOUNDS: FieldBounds = FieldBounds::new(0.0, 10_000.0, 0.01, 100.0);
pub const RATE_BOUNDS: FieldBounds = FieldBounds::new(0.0, 25.0, 0.5, 20.0);
pub const FLAT_RATE_BOUNDS: FieldBounds = FieldBounds::new(4.0, 16.5, 0.5, 12.5);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatMode {
    /// Amount is net; compute VAT and gross
    #[default]
    Add,
    /// Amount is gross; extract net and VAT
    Remove,
}

/// VAT band.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VatRate {
    #[default]
    Standard,
    Reduced,
    Zero,
    /// Explicit rate in percent
    Custom(f64),
}

impl VatRate {
    pub fn rate_pct(&self, policy: &VatPolicy) -> f64 {
        match self {
            VatRate::Standard => policy.standard_rate_pct,
            VatRate::Reduced => policy.reduced_rate_pct,
            VatRate::Zero => policy.zero_rate_pct,
            VatRate::Custom(pct) => *pct,
        }
    }
}

/// Flat Rate Scheme percentage, by sector or given directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlatRate {
    /// Sector key from the policy (`"it"`, `"food"`, ...)
    Sector(String),
    Pct(f64),
}

impl Default for FlatRate {
    fn default() -> Self {
        FlatRate::Pct(FLAT_RATE_BOUNDS.default)
    }
}

/// ## JSON Example
///
/// ```json
/// {
///   "label": "Consulting invoice",
///   "mode": "add",
///   "amount": 1000.0,
///   "rate": "standard",
///   "business": true,
///   "flat_rate": { "sector": "it" },
///   "annual_turnover": 60000.0
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct VatInput {
    pub label: String,
    pub mode: VatMode,
    /// Net amount when adding, gross amount when removing
    pub amount: f64,
    pub rate: VatRate,
    /// VAT-registered business
    pub business: bool,
    /// Flat Rate Scheme; only applies to business users adding VAT
    pub flat_rate: Option<FlatRate>,
    /// Taxable turnover for the registration threshold check
    pub annual_turnover: Option<f64>,
}

impl VatInput {
    pub fn new(mode: VatMode, amount: f64) -> Self {
        VatInput {
            mode,
            amount,
            ..VatInput::default()
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        require_non_negative("amount", self.amount)?;
        if let VatRate::Custom(pct) = self.rate {
            require_non_negative("rate", pct)?;
        }
        if let Some(FlatRate::Pct(pct)) = self.flat_rate {
            if !(0.0..=100.0).contains(&pct) {
                return Err(CalcError::invalid_input("flat_rate", pct.to_string(), "Must be between 0 and 100"));
            }
        }
        if let Some(turnover) = self.annual_turnover {
            require_non_negative("annual_turnover", turnover)?;
        }
        Ok(())
    }

    pub fn clamped(&self) -> (Self, Vec<ClampedField>) {
        let mut c = Clamper::new();
        let rate = match self.rate {
            VatRate::Custom(pct) => VatRate::Custom(c.apply("rate", pct, &RATE_BOUNDS)),
            preset => preset,
        };
        let flat_rate = match &self.flat_rate {
            Some(FlatRate::Pct(pct)) => Some(FlatRate::Pct(c.apply("flat_rate", *pct, &FLAT_RATE_BOUNDS))),
            other => other.clone(),
        };
        let input = VatInput {
            amount: c.apply("amount", self.amount, &AMOUNT_BOUNDS),
            rate,
            flat_rate,
            ..self.clone()
        };
        (input, c.into_adjustments())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlatRateResult {
    pub flat_rate_pct: f64,
    /// Sector name when chosen by sector
    pub sector: Option<String>,
    /// VAT remitted to HMRC: gross × flat rate
    pub flat_rate_vat: Money,
    /// VAT charged minus VAT remitted
    pub retained: Money,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VatResult {
    pub mode: VatMode,
    pub rate_pct: f64,
    pub net: Money,
    pub vat: Money,
    pub gross: Money,
    /// Input VAT a registered business can reclaim (zero for personal use)
    pub vat_reclaimable: Money,
    pub flat_rate: Option<FlatRateResult>,
    /// Turnover above the registration threshold; `None` without a turnover
    pub registration_required: Option<bool>,
}

/// VAT added to a net amount, rounded to the penny.
pub fn add_vat(net: Money, rate_pct: f64) -> (Money, Money) {
    let vat = Money::from_major(net.major() * rate_pct / 100.0);
    (vat, net + vat)
}

/// Net and VAT extracted from a gross amount; the two always sum to `gross`.
pub fn remove_vat(gross: Money, rate_pct: f64) -> (Money, Money) {
    let net = Money::from_major(gross.major() / (1.0 + rate_pct / 100.0));
    (net, gross - net)
}

fn resolve_flat_rate(flat_rate: &FlatRate, policy: &VatPolicy) -> CalcResult<(f64, Option<String>)> {
    match flat_rate {
        FlatRate::Pct(pct) => Ok((*pct, None)),
        FlatRate::Sector(key) => policy
            .sector(key)
            .map(|s| (s.rate_pct, Some(s.name.clone())))
            .ok_or_else(|| CalcError::invalid_input("flat_rate", key.as_str(), "Unknown Flat Rate Scheme sector")),
    }
}

pub fn calculate(input: &VatInput, policy: &VatPolicy) -> CalcResult<VatResult> {
    input.validate()?;

    let rate_pct = input.rate.rate_pct(policy);
    let amount = Money::from_major(input.amount);

    let (net, vat, gross) = match input.mode {
        VatMode::Add => {
            let (vat, gross) = add_vat(amount, rate_pct);
            (amount, vat, gross)
        }
        VatMode::Remove => {
            let (net, vat) = remove_vat(amount, rate_pct);
            (net, vat, amount)
        }
    };

    let flat_rate = match (&input.flat_rate, input.business, input.mode) {
        (Some(choice), true, VatMode::Add) => {
            let (flat_rate_pct, sector) = resolve_flat_rate(choice, policy)?;
            let flat_rate_vat = Money::from_major(gross.major() * flat_rate_pct / 100.0);
            Some(FlatRateResult {
                flat_rate_pct,
                sector,
                flat_rate_vat,
                retained: vat - flat_rate_vat,
            })
        }
        _ => None,
    };

    let registration_required = input
        .annual_turnover
        .map(|turnover| turnover > policy.registration_threshold);

    tracing::debug!(label = %input.label, mode = ?input.mode, rate_pct, "vat computed");

    Ok(VatResult {
        mode: input.mode,
        rate_pct,
        net,
        vat,
        gross,
        vat_reclaimable: if input.business { vat } else { Money::ZERO },
        flat_rate,
        registration_required,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_add_standard() {
        let result = calculate(&VatInput::new(VatMode::Add, 100.0), &VatPolicy::default()).unwrap();
        assert_eq!(result.vat, Money::from_major(20.0));
        assert_eq!(result.gross, Money::from_major(120.0));
        assert_eq!(result.vat_reclaimable, Money::ZERO);
    }

    #[test]
    fn test_remove_divides_not_subtracts() {
        let result = calculate(&VatInput::new(VatMode::Remove, 120.0), &VatPolicy::default()).unwrap();
        assert_eq!(result.net, Money::from_major(100.0));
        assert_ne!(result.net, Money::from_major(96.0));
        assert_eq!(result.vat, Money::from_major(20.0));
    }

    #[test]
    fn test_remove_parts_sum_to_gross() {
        let input = VatInput {
            rate: VatRate::Reduced,
            ..VatInput::new(VatMode::Remove, 99.99)
        };
        let result = calculate(&input, &VatPolicy::default()).unwrap();
        // 99.99 / 1.05 = 95.2285...
        assert_eq!(result.net, Money::from_major(95.23));
        assert_eq!(result.vat, Money::from_major(4.76));
        assert_eq!(result.net + result.vat, result.gross);
    }

    #[test]
    fn test_zero_and_custom_rates() {
        let policy = VatPolicy::default();
        let zero = VatInput { rate: VatRate::Zero, ..VatInput::new(VatMode::Add, 55.0) };
        let result = calculate(&zero, &policy).unwrap();
        assert_eq!(result.gross, Money::from_major(55.0));

        let custom = VatInput { rate: VatRate::Custom(17.5), ..VatInput::new(VatMode::Add, 10.0) };
        let result = calculate(&custom, &policy).unwrap();
        assert_eq!(result.vat, Money::from_major(1.75));
    }

    #[test]
    fn test_flat_rate_scheme() {
        let input = VatInput {
            business: true,
            flat_rate: Some(FlatRate::Sector("IT".to_string())),
            ..VatInput::new(VatMode::Add, 1_000.0)
        };
        let result = calculate(&input, &VatPolicy::default()).unwrap();
        assert_eq!(result.vat_reclaimable, Money::from_major(200.0));

        let frs = result.flat_rate.unwrap();
        assert_eq!(frs.flat_rate_pct, 12.5);
        assert_eq!(frs.flat_rate_vat, Money::from_major(150.0));
        assert_eq!(frs.retained, Money::from_major(50.0));
        assert!(frs.sector.is_some());
    }

    #[test]
    fn test_flat_rate_ignored_outside_business_add() {
        let policy = VatPolicy::default();
        let personal = VatInput {
            flat_rate: Some(FlatRate::Pct(14.5)),
            ..VatInput::new(VatMode::Add, 1_000.0)
        };
        assert!(calculate(&personal, &policy).unwrap().flat_rate.is_none());

        let removing = VatInput {
            business: true,
            flat_rate: Some(FlatRate::Pct(14.5)),
            ..VatInput::new(VatMode::Remove, 1_200.0)
        };
        assert!(calculate(&removing, &policy).unwrap().flat_rate.is_none());
    }

    #[test]
    fn test_unknown_sector() {
        let input = VatInput {
            business: true,
            flat_rate: Some(FlatRate::Sector("farming".to_string())),
            ..VatInput::new(VatMode::Add, 100.0)
        };
        let err = calculate(&input, &VatPolicy::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");
    }

    #[test]
    fn test_registration_threshold() {
        let policy = VatPolicy::default();
        let input = VatInput {
            annual_turnover: Some(90_000.0),
            ..VatInput::new(VatMode::Add, 100.0)
        };
        assert_eq!(calculate(&input, &policy).unwrap().registration_required, Some(true));

        let input = VatInput {
            annual_turnover: Some(85_000.0),
            ..VatInput::new(VatMode::Add, 100.0)
        };
        assert_eq!(calculate(&input, &policy).unwrap().registration_required, Some(false));
    }

    #[test]
    fn test_negative_amount_rejected() {
        assert!(calculate(&VatInput::new(VatMode::Add, -1.0), &VatPolicy::default()).is_err());
    }

    #[test]
    fn test_amount_above_ceiling_rejected() {
        let err = calculate(&VatInput::new(VatMode::Add, 1e17), &VatPolicy::default()).unwrap_err();
        assert_eq!(err.error_code(), "INVALID_INPUT");

        let result = calculate(&VatInput::new(VatMode::Add, 1e13), &VatPolicy::default()).unwrap();
        assert_eq!(result.gross, Money::from_major(1.2e13));
    }

    #[test]
    fn test_json_shape() {
        let input: VatInput =
            serde_json::from_str(r#"{"mode": "remove", "amount": 240, "rate": {"custom": 20.0}}"#).unwrap();
        assert_eq!(input.mode, VatMode::Remove);
        assert_eq!(input.rate, VatRate::Custom(20.0));
        assert!(!input.business);
    }

    proptest! {
        #[test]
        fn prop_remove_inverts_add(pennies in 0i64..10_000_000, rate_bp in 0u32..=10_000) {
            let net = Money::from_minor(pennies);
            let rate_pct = rate_bp as f64 / 100.0;
            let (_, gross) = add_vat(net, rate_pct);
            let (recovered, _) = remove_vat(gross, rate_pct);
            prop_assert_eq!(recovered, net);
        }
    }
}
