//! # Input Handling
//!
//! Helpers shared by every calculator front end:
//!
//! - [`FieldBounds`] - min/max/step/default for a numeric field, with clamping
//! - [`parse_amount`] - lenient parsing of user-typed amounts (`"£1,000.50"`)
//!
//! Clamping is an explicit step: calculators expose `Input::clamped()`, and
//! `calculate()` validates but never silently clamps.

use serde::{Deserialize, Serialize};

use crate::errors::{CalcError, CalcResult};

/// Allowed range for a numeric input field.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FieldBounds {
    pub min: f64,
    pub max: f64,
    pub step: f64,
    pub default: f64,
}

impl FieldBounds {
    pub const fn new(min: f64, max: f64, step: f64, default: f64) -> Self {
        Self { min, max, step, default }
    }

    /// Clamp into `[min, max]`. NaN becomes `min`.
    pub fn clamp(&self, value: f64) -> f64 {
        if value.is_nan() {
            return self.min;
        }
        value.max(self.min).min(self.max)
    }

    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// Record of one field that was moved by clamping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClampedField {
    pub field: String,
    pub original: f64,
    pub clamped: f64,
}

/// Accumulates clamp adjustments so callers can report them.
#[derive(Debug, Clone, Default)]
pub struct Clamper {
    adjustments: Vec<ClampedField>,
}

impl Clamper {
    pub fn new() -> Self {
        Self::default()
    }

    /// Clamp `value` into `bounds`, recording the change if any.
    pub fn apply(&mut self, field: &'static str, value: f64, bounds: &FieldBounds) -> f64 {
        let clamped = bounds.clamp(value);
        if clamped != value {
            tracing::debug!(field, original = value, clamped, "input clamped");
            self.adjustments.push(ClampedField {
                field: field.to_string(),
                original: value,
                clamped,
            });
        }
        clamped
    }

    pub fn adjustments(&self) -> &[ClampedField] {
        &self.adjustments
    }

    pub fn into_adjustments(self) -> Vec<ClampedField> {
        self.adjustments
    }
}

/// Parse a user-typed amount.
///
/// Currency symbols, thousands separators and whitespace are stripped; any
/// other non-digit characters are dropped; only the first decimal point is
/// kept.
///
/// ```rust
/// use fincalc_core::inputs::parse_amount;
///
/// assert_eq!(parse_amount("£1,000.50").unwrap(), 1000.5);
/// assert_eq!(parse_amount("₹ 25,00,000").unwrap(), 2_500_000.0);
/// assert!(parse_amount("abc").is_err());
/// ```
pub fn parse_amount(raw: &str) -> CalcResult<f64> {
    let mut cleaned = String::with_capacity(raw.len());
    let mut seen_point = false;
    for c in raw.chars() {
        if c.is_ascii_digit() {
            cleaned.push(c);
        } else if c == '.' && !seen_point {
            seen_point = true;
            cleaned.push(c);
        }
    }

    if cleaned.is_empty() || cleaned == "." {
        return Err(CalcError::invalid_input("amount", raw, "No numeric value found"));
    }

    cleaned
        .parse::<f64>()
        .map_err(|e| CalcError::invalid_input("amount", raw, e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    const RATE: FieldBounds = FieldBounds::new(5.0, 20.0, 0.1, 8.5);

    #[test]
    fn test_clamp() {
        assert_eq!(RATE.clamp(3.0), 5.0);
        assert_eq!(RATE.clamp(25.0), 20.0);
        assert_eq!(RATE.clamp(9.0), 9.0);
        assert_eq!(RATE.clamp(f64::NAN), 5.0);
        assert!(RATE.contains(RATE.default));
    }

    #[test]
    fn test_clamper_records_changes() {
        let mut clamper = Clamper::new();
        let a = clamper.apply("rate", 25.0, &RATE);
        let b = clamper.apply("rate", 9.0, &RATE);
        assert_eq!(a, 20.0);
        assert_eq!(b, 9.0);
        assert_eq!(clamper.adjustments().len(), 1);
        assert_eq!(clamper.adjustments()[0].original, 25.0);
    }

    #[test]
    fn test_parse_amount() {
        assert_eq!(parse_amount("100").unwrap(), 100.0);
        assert_eq!(parse_amount("$1,234.56").unwrap(), 1234.56);
        assert_eq!(parse_amount("1.2.3").unwrap(), 1.23);
        assert_eq!(parse_amount(" 42 ").unwrap(), 42.0);
        assert!(parse_amount("").is_err());
        assert!(parse_amount(".").is_err());
    }
}
