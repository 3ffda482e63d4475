//! # Progressive Tax Slabs
//!
//! One evaluator for every slab schedule: each slab taxes the part of income
//! that falls between the previous slab's upper bound and its own.

use crate::policy::TaxSlab;

/// Tax on `income` under `slabs`.
///
/// Income up to `exemption` is untaxed regardless of the slab rates, which is
/// how age-dependent basic exemptions shift the first taxable slab.
///
/// ```rust
/// use fincalc_core::equations::tax::slab_tax;
/// use fincalc_core::policy::TaxSlab;
///
/// let slabs = [TaxSlab::new(Some(300_000.0), 0.0), TaxSlab::new(None, 10.0)];
/// assert_eq!(slab_tax(500_000.0, &slabs, 0.0), 20_000.0);
/// ```
pub fn slab_tax(income: f64, slabs: &[TaxSlab], exemption: f64) -> f64 {
    let mut tax = 0.0;
    let mut lower = 0.0_f64;
    for slab in slabs {
        let upper = slab.up_to.unwrap_or(f64::INFINITY);
        let from = lower.max(exemption);
        let to = income.min(upper);
        if to > from {
            tax += (to - from) * slab.rate_pct / 100.0;
        }
        if income <= upper {
            break;
        }
        lower = upper;
    }
    tax
}

/// Highest slab rate that applies to the last unit of `income`.
pub fn marginal_rate_pct(income: f64, slabs: &[TaxSlab], exemption: f64) -> f64 {
    if income <= exemption {
        return 0.0;
    }
    slabs
        .iter()
        .find(|slab| slab.up_to.map_or(true, |upper| income <= upper))
        .map(|slab| slab.rate_pct)
        .unwrap_or(0.0)
}
