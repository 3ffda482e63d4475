//! # Error Types
//!
//! Structured error types for fincalc_core. Every variant carries enough
//! context for a caller (human, CLI or script) to see which field or
//! operation failed and why.
//!
//! ## Example
//!
//! ```rust
//! use fincalc_core::errors::{CalcError, CalcResult};
//!
//! fn validate_principal(principal: f64) -> CalcResult<()> {
//!     if principal <= 0.0 {
//!         return Err(CalcError::InvalidInput {
//!             field: "principal".to_string(),
//!             value: principal.to_string(),
//!             reason: "Principal must be positive".to_string(),
//!         });
//!     }
//!     Ok(())
//! }
//! ```

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Result type alias for fincalc_core operations
pub type CalcResult<T> = Result<T, CalcError>;

/// Structured error type for calculation operations.
#[derive(Error, Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", content = "details")]
pub enum CalcError {
    /// An input value is invalid (out of range, not finite, etc.)
    #[error("Invalid input for '{field}': {value} - {reason}")]
    InvalidInput {
        field: String,
        value: String,
        reason: String,
    },

    /// A required field is missing
    #[error("Missing required field: {field}")]
    MissingField { field: String },

    /// The payment does not cover the periodic interest, so the balance never
    /// reaches zero and the payoff term is undefined.
    #[error("Payment {payment:.2} does not exceed monthly interest {monthly_interest:.2}; the balance never amortizes")]
    NonAmortizing {
        payment: f64,
        monthly_interest: f64,
    },

    /// Calculation failed for a reason other than bad input
    #[error("Calculation failed: {calculation_type} - {reason}")]
    CalculationFailed {
        calculation_type: String,
        reason: String,
    },

    /// File I/O error
    #[error("File error: {operation} on '{path}' - {reason}")]
    FileError {
        operation: String,
        path: String,
        reason: String,
    },

    /// JSON/TOML serialization or deserialization error
    #[error("Serialization error: {reason}")]
    SerializationError { reason: String },

    /// Schema version mismatch
    #[error("Version mismatch: file version {file_version}, expected {expected_version}")]
    VersionMismatch {
        file_version: String,
        expected_version: String,
    },

    /// Policy/configuration file could not be applied
    #[error("Configuration error: {reason}")]
    ConfigError { reason: String },
}

impl CalcError {
    /// Create an InvalidInput error
    pub fn invalid_input(field: impl Into<String>, value: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::InvalidInput {
            field: field.into(),
            value: value.into(),
            reason: reason.into(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(field: impl Into<String>) -> Self {
        CalcError::MissingField {
            field: field.into(),
        }
    }

    /// Create a NonAmortizing error
    pub fn non_amortizing(payment: f64, monthly_interest: f64) -> Self {
        CalcError::NonAmortizing {
            payment,
            monthly_interest,
        }
    }

    /// Create a CalculationFailed error
    pub fn calculation_failed(calculation_type: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::CalculationFailed {
            calculation_type: calculation_type.into(),
            reason: reason.into(),
        }
    }

    /// Create a FileError
    pub fn file_error(operation: impl Into<String>, path: impl Into<String>, reason: impl Into<String>) -> Self {
        CalcError::FileError {
            operation: operation.into(),
            path: path.into(),
            reason: reason.into(),
        }
    }

    /// Create a ConfigError
    pub fn config_error(reason: impl Into<String>) -> Self {
        CalcError::ConfigError {
            reason: reason.into(),
        }
    }

    /// Check if the error is caused by the caller's input (fixable by
    /// changing a field) rather than by the environment.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            CalcError::InvalidInput { .. } | CalcError::MissingField { .. } | CalcError::NonAmortizing { .. }
        )
    }

    /// Get a short error code for programmatic handling
    pub fn error_code(&self) -> &'static str {
        match self {
            CalcError::InvalidInput { .. } => "INVALID_INPUT",
            CalcError::MissingField { .. } => "MISSING_FIELD",
            CalcError::NonAmortizing { .. } => "NON_AMORTIZING",
            CalcError::CalculationFailed { .. } => "CALCULATION_FAILED",
            CalcError::FileError { .. } => "FILE_ERROR",
            CalcError::SerializationError { .. } => "SERIALIZATION_ERROR",
            CalcError::VersionMismatch { .. } => "VERSION_MISMATCH",
            CalcError::ConfigError { .. } => "CONFIG_ERROR",
        }
    }
}

/// Largest magnitude accepted for any numeric input. Results stay well inside
/// the `i64` minor-unit range of [`Money`](crate::units::Money).
pub const MAX_INPUT_MAGNITUDE: f64 = 1e13;

/// Longest loan tenure or projection horizon, in years.
pub const MAX_HORIZON_YEARS: f64 = 100.0;

/// Oldest age accepted by the age-driven calculators.
pub const MAX_AGE: u32 = 120;

/// Reject NaN/infinite values and magnitudes above [`MAX_INPUT_MAGNITUDE`].
pub(crate) fn require_finite(field: &str, value: f64) -> CalcResult<()> {
    if !value.is_finite() {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be a finite number"));
    }
    if value.abs() > MAX_INPUT_MAGNITUDE {
        return Err(CalcError::invalid_input(
            field,
            value.to_string(),
            format!("Value exceeds the supported range of {:e}", MAX_INPUT_MAGNITUDE),
        ));
    }
    Ok(())
}

pub(crate) fn require_at_most(field: &str, value: f64, max: f64) -> CalcResult<()> {
    if value > max {
        return Err(CalcError::invalid_input(field, value.to_string(), format!("Value cannot exceed {}", max)));
    }
    Ok(())
}

pub(crate) fn require_non_negative(field: &str, value: f64) -> CalcResult<()> {
    require_finite(field, value)?;
    if value < 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value cannot be negative"));
    }
    Ok(())
}

pub(crate) fn require_positive(field: &str, value: f64) -> CalcResult<()> {
    require_finite(field, value)?;
    if value <= 0.0 {
        return Err(CalcError::invalid_input(field, value.to_string(), "Value must be positive"));
    }
    Ok(())
}
