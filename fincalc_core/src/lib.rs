//! # fincalc_core - Personal-Finance Calculation Engine
//!
//! `fincalc_core` provides loan, deposit, investment, retirement, tax and
//! budgeting calculators behind a JSON-friendly API. Every input and result
//! type implements Serialize/Deserialize, so the same calculators serve the
//! CLI, worksheet files and any other front end.
//!
//! ## Design Philosophy
//!
//! - **Stateless**: pure functions from an input struct to a result struct
//! - **Exact money**: results are [`Money`] in integer minor units
//! - **Configurable policy**: regulatory constants live in [`policy::PolicySet`]
//! - **Rich errors**: structured [`CalcError`] values with stable codes
//!
//! ## Quick Start
//!
//! ```rust
//! use fincalc_core::calculations::emi::{calculate, EmiInput};
//!
//! let input = EmiInput {
//!     label: "Home loan".to_string(),
//!     principal: 2_500_000.0,
//!     annual_rate_pct: 8.5,
//!     tenure_years: 20.0,
//! };
//! let result = calculate(&input).unwrap();
//! println!("EMI {}", result.emi);
//! ```
//!
//! ## Modules
//!
//! - [`calculations`] - One module per calculator, plus [`CalculationItem`]
//! - [`equations`] - Pure formulas and the formula registry
//! - [`inputs`] - Field bounds, clamping and amount parsing
//! - [`policy`] - Lending, retirement, VAT and income-tax tables
//! - [`worksheet`] - Saved batches of calculator inputs
//! - [`file_io`] - Atomic worksheet saves and loading
//! - [`units`] - The [`Money`] type
//! - [`errors`] - Structured error types

pub mod calculations;
pub mod equations;
pub mod errors;
pub mod file_io;
pub mod inputs;
pub mod policy;
pub mod units;
pub mod worksheet;

pub use calculations::{evaluate, CalculationItem, CalculationOutput};
pub use errors::{CalcError, CalcResult};
pub use file_io::{load_item, load_worksheet, save_worksheet};
pub use policy::PolicySet;
pub use units::Money;
pub use worksheet::{Worksheet, WorksheetMetadata, WorksheetReport, WorksheetSettings};
