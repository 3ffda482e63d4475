//! # Financial Formulas
//!
//! Pure functions for every formula the calculators use. Keeping them in one
//! place means each one is tested once against reference values and the
//! calculators stay free of inline algebra.
//!
//! ## Modules
//!
//! - [`annuity`] - Level-payment loans (payment, term, present value, balance)
//! - [`compound`] - Compound growth, annuity-due deposits, simple interest
//! - [`tax`] - Progressive slab tax evaluator
//! - [`registry`] - Formula metadata, usage tracking and FORMULAS.md generation
//!
//! ## Conventions
//!
//! - Rates passed to formulas are fractional per period (`0.01` = 1% a month)
//!   unless the parameter name ends in `_pct`
//! - Zero rates take an exact branch; no formula divides by a rate
//! - Formulas work in `f64`; rounding to [`Money`](crate::units::Money)
//!   happens in the calculators

pub mod annuity;
pub mod compound;
pub mod registry;
pub mod tax;

pub use annuity::{monthly_rate, payment, present_value, remaining_balance, term};

pub use compound::{
    annualized_return_pct,
    annuity_due_future_value,
    annuity_factor,
    compound_amount,
    monthly_equivalent_rate,
    real_value,
    required_deposit,
    simple_interest,
};

pub use tax::{marginal_rate_pct, slab_tax};

pub use registry::{
    generate_formulas_markdown,
    Formula,
    FormulaCategory,
    FormulaMetadata,
    FormulaTracker,
    FormulaUsage,
    Reference,
    Variable,
    ALL_FORMULAS,
};
