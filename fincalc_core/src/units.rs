//! # Unit Types
//!
//! Money is carried as a fixed-point amount in integer minor units (paise,
//! cents, pence). Calculations run in `f64` and convert to [`Money`] exactly
//! once, at the result boundary, so repeated rounding never drifts.
//!
//! ## Serialization
//!
//! `Money` serializes as a plain decimal number in major units (`120.0`),
//! which keeps JSON readable while the in-memory value stays integral.
//!
//! ## Example
//!
//! ```rust
//! use fincalc_core::units::{Currency, Money};
//!
//! let gross = Money::from_major(119.999);
//! assert_eq!(gross.minor(), 12000);
//! assert_eq!(Currency::Gbp.format(gross), "£120.00");
//! assert_eq!(Currency::Inr.format(Money::from_major(2_500_000.0)), "₹25,00,000.00");
//! ```

use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Minor units per major unit for every supported currency
pub const MINOR_PER_MAJOR: i64 = 100;

// ============================================================================
// Money
// ============================================================================

/// Monetary amount in integer minor units. Arithmetic saturates at the
/// `i64` bounds instead of wrapping.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Money(i64);

impl Money {
    /// Zero amount
    pub const ZERO: Money = Money(0);

    /// Create from minor units (e.g. 12000 pence = £120.00)
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Create from a major-unit float, rounding half away from zero to the
    /// nearest minor unit. Non-finite input maps to zero.
    pub fn from_major(major: f64) -> Self {
        if !major.is_finite() {
            return Money::ZERO;
        }
        Money((major * MINOR_PER_MAJOR as f64).round() as i64)
    }

    /// Raw minor units
    pub const fn minor(self) -> i64 {
        self.0
    }

    /// Value in major units
    pub fn major(self) -> f64 {
        self.0 as f64 / MINOR_PER_MAJOR as f64
    }

    pub fn is_zero(self) -> bool {
        self.0 == 0
    }

    pub fn is_negative(self) -> bool {
        self.0 < 0
    }

    pub fn abs(self) -> Self {
        Money(self.0.saturating_abs())
    }

    /// Clamp negative amounts to zero
    pub fn non_negative(self) -> Self {
        Money(self.0.max(0))
    }
}

impl Add for Money {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_add(rhs.0))
    }
}

impl Sub for Money {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Money(self.0.saturating_sub(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_add(rhs.0);
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, rhs: Self) {
        self.0 = self.0.saturating_sub(rhs.0);
    }
}

impl Neg for Money {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Money(self.0.saturating_neg())
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::ZERO, |acc, m| acc + m)
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(
            f,
            "{}{}.{:02}",
            sign,
            abs / MINOR_PER_MAJOR as u64,
            abs % MINOR_PER_MAJOR as u64
        )
    }
}

impl Serialize for Money {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(self.major())
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let major = f64::deserialize(deserializer)?;
        if !major.is_finite() {
            return Err(serde::de::Error::custom("money amount must be finite"));
        }
        Ok(Money::from_major(major))
    }
}

// ============================================================================
// Currency
// ============================================================================

/// Display currency. Calculations are currency-agnostic; this only affects
/// formatting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Currency {
    /// Indian rupee, lakh/crore digit grouping
    #[default]
    #[serde(rename = "INR")]
    Inr,
    /// US dollar
    #[serde(rename = "USD")]
    Usd,
    /// Pound sterling
    #[serde(rename = "GBP")]
    Gbp,
}

impl Currency {
    pub fn symbol(&self) -> &'static str {
        match self {
            Currency::Inr => "₹",
            Currency::Usd => "$",
            Currency::Gbp => "£",
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            Currency::Inr => "INR",
            Currency::Usd => "USD",
            Currency::Gbp => "GBP",
        }
    }

    /// Format with symbol, digit grouping and two decimals.
    pub fn format(&self, amount: Money) -> String {
        let sign = if amount.is_negative() { "-" } else { "" };
        let abs = amount.minor().unsigned_abs();
        let whole = abs / MINOR_PER_MAJOR as u64;
        let frac = abs % MINOR_PER_MAJOR as u64;
        let grouped = match self {
            Currency::Inr => group_indian(whole),
            Currency::Usd | Currency::Gbp => group_thousands(whole),
        };
        format!("{}{}{}.{:02}", sign, self.symbol(), grouped, frac)
    }

    /// Short form used on result cards: `₹1.25 Cr`, `₹4.50 L`, `$12.30 K`.
    pub fn format_compact(&self, amount: Money) -> String {
        let value = amount.major();
        let abs = value.abs();
        let sign = if value < 0.0 { "-" } else { "" };
        match self {
            Currency::Inr if abs >= 10_000_000.0 => format!("{}{}{:.2} Cr", sign, self.symbol(), abs / 10_000_000.0),
            Currency::Inr if abs >= 100_000.0 => format!("{}{}{:.2} L", sign, self.symbol(), abs / 100_000.0),
            _ if abs >= 1_000_000.0 => format!("{}{}{:.2} M", sign, self.symbol(), abs / 1_000_000.0),
            _ if abs >= 1_000.0 => format!("{}{}{:.2} K", sign, self.symbol(), abs / 1_000.0),
            _ => format!("{}{}{}", sign, self.symbol(), abs.round()),
        }
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// 1234567 -> "1,234,567"
fn group_thousands(mut n: u64) -> String {
    if n < 1000 {
        return n.to_string();
    }
    let mut parts = Vec::new();
    while n >= 1000 {
        parts.push(format!("{:03}", n % 1000));
        n /= 1000;
    }
    parts.push(n.to_string());
    parts.reverse();
    parts.join(",")
}

/// 2500000 -> "25,00,000" (last three digits, then groups of two)
fn group_indian(n: u64) -> String {
    if n < 1000 {
        return n.to_string();
    }
    let last_three = n % 1000;
    let mut rest = n / 1000;
    let mut parts = Vec::new();
    while rest >= 100 {
        parts.push(format!("{:02}", rest % 100));
        rest /= 100;
    }
    parts.push(rest.to_string());
    parts.reverse();
    format!("{},{:03}", parts.join(","), last_three)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_major_rounds_half_away_from_zero() {
        assert_eq!(Money::from_major(0.005).minor(), 1);
        assert_eq!(Money::from_major(-0.005).minor(), -1);
        assert_eq!(Money::from_major(100.00000000000001).minor(), 10000);
        assert_eq!(Money::from_major(f64::NAN), Money::ZERO);
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_minor(1050);
        let b = Money::from_minor(250);
        assert_eq!((a + b).minor(), 1300);
        assert_eq!((a - b).minor(), 800);
        assert_eq!((-a).minor(), -1050);
        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.minor(), 1550);
        assert_eq!(Money::from_minor(-5).non_negative(), Money::ZERO);
    }

    #[test]
    fn test_arithmetic_saturates() {
        let huge = Money::from_major(1e17);
        assert_eq!(huge.minor(), i64::MAX);
        assert_eq!(huge + huge, Money::from_minor(i64::MAX));
        assert_eq!(-huge - huge, Money::from_minor(i64::MIN));
        assert_eq!([huge, huge, Money::from_minor(1)].into_iter().sum::<Money>(), Money::from_minor(i64::MAX));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(12000).to_string(), "120.00");
        assert_eq!(Money::from_minor(-5).to_string(), "-0.05");
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_minor(12050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "120.5");

        let roundtrip: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, roundtrip);
    }

    #[test]
    fn test_currency_format() {
        assert_eq!(Currency::Usd.format(Money::from_major(1234567.891)), "$1,234,567.89");
        assert_eq!(Currency::Inr.format(Money::from_major(2_500_000.0)), "₹25,00,000.00");
        assert_eq!(Currency::Inr.format(Money::from_major(12_345_678.0)), "₹1,23,45,678.00");
        assert_eq!(Currency::Gbp.format(Money::from_major(999.0)), "£999.00");
        assert_eq!(Currency::Gbp.format(Money::from_major(-96.0)), "-£96.00");
    }

    #[test]
    fn test_compact_format() {
        assert_eq!(Currency::Inr.format_compact(Money::from_major(25_000_000.0)), "₹2.50 Cr");
        assert_eq!(Currency::Inr.format_compact(Money::from_major(450_000.0)), "₹4.50 L");
        assert_eq!(Currency::Usd.format_compact(Money::from_major(12_300.0)), "$12.30 K");
        assert_eq!(Currency::Usd.format_compact(Money::from_major(450.0)), "$450");
    }

    #[test]
    fn test_currency_serialization() {
        assert_eq!(serde_json::to_string(&Currency::Gbp).unwrap(), "\"GBP\"");
        let c: Currency = serde_json::from_str("\"USD\"").unwrap();
        assert_eq!(c, Currency::Usd);
    }
}
