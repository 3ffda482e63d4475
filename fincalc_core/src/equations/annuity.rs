//! # Annuity Formulas
//!
//! Level-payment amortization: the relationships between principal `P`,
//! periodic rate `r`, number of periods `n` and periodic payment `M`.
//!
//! ## Notation
//!
//! - `P` = Principal (amount borrowed)
//! - `r` = Rate per period as a fraction (monthly rate = annual% / 12 / 100)
//! - `n` = Number of periods (may be fractional when solved for)
//! - `M` = Payment per period
//!
//! Every formula has an exact `r = 0` branch; none of them divide by a rate.

use crate::errors::{CalcError, CalcResult};

/// Rates at or below this are treated as zero.
pub const RATE_EPSILON: f64 = 1e-12;

/// Convert an annual percentage rate to a monthly fractional rate.
///
/// ```rust
/// use fincalc_core::equations::annuity::monthly_rate;
/// assert!((monthly_rate(12.0) - 0.01).abs() < 1e-15);
/// ```
#[inline]
pub fn monthly_rate(annual_pct: f64) -> f64 {
    annual_pct / 12.0 / 100.0
}

/// Level payment that retires `principal` in `periods` periods.
///
/// # Formula
/// - M = P·r·(1+r)^n / ((1+r)^n − 1)
/// - M = P / n when r = 0
///
/// Returns 0 for zero periods.
pub fn payment(principal: f64, rate: f64, periods: f64) -> f64 {
    if periods <= 0.0 {
        return 0.0;
    }
    if rate.abs() <= RATE_EPSILON {
        return principal / periods;
    }
    let growth = (1.0 + rate).powf(periods);
    principal * rate * growth / (growth - 1.0)
}

/// Number of periods for `payment` to retire `principal`.
///
/// # Formula
/// - n = −ln(1 − r·P/M) / ln(1+r)
/// - n = P / M when r = 0
///
/// # Errors
/// `NonAmortizing` when the payment does not exceed the first period's
/// interest (M ≤ r·P); `InvalidInput` for a non-positive payment.
pub fn term(principal: f64, rate: f64, payment: f64) -> CalcResult<f64> {
    if payment <= 0.0 || !payment.is_finite() {
        return Err(CalcError::invalid_input("payment", payment.to_string(), "Payment must be positive"));
    }
    if principal <= 0.0 {
        return Ok(0.0);
    }
    if rate.abs() <= RATE_EPSILON {
        return Ok(principal / payment);
    }
    let interest = rate * principal;
    if payment <= interest {
        return Err(CalcError::non_amortizing(payment, interest));
    }
    Ok(-(1.0 - interest / payment).ln() / (1.0 + rate).ln())
}

/// Principal a payment stream can service (annuity inverse).
///
/// # Formula
/// - P = M·((1+r)^n − 1) / (r·(1+r)^n)
/// - P = M·n when r = 0
pub fn present_value(payment: f64, rate: f64, periods: f64) -> f64 {
    if periods <= 0.0 {
        return 0.0;
    }
    if rate.abs() <= RATE_EPSILON {
        return payment * periods;
    }
    let growth = (1.0 + rate).powf(periods);
    payment * (growth - 1.0) / (rate * growth)
}

/// Outstanding balance after `paid` level payments.
///
/// # Formula
/// - B_k = P(1+r)^k − M·((1+r)^k − 1)/r
/// - B_k = P − M·k when r = 0
pub fn remaining_balance(principal: f64, rate: f64, payment: f64, paid: f64) -> f64 {
    let balance = if rate.abs() <= RATE_EPSILON {
        principal - payment * paid
    } else {
        let growth = (1.0 + rate).powf(paid);
        principal * growth - payment * (growth - 1.0) / rate
    };
    balance.max(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use proptest::prelude::*;

    #[test]
    fn test_payment_reference_values() {
        // 25 L at 8.5% for 20 years
        let m = payment(2_500_000.0, monthly_rate(8.5), 240.0);
        assert_relative_eq!(m, 21_695.580_83, epsilon = 1e-4);

        // 10 L at 10% for 10 years
        let m = payment(1_000_000.0, monthly_rate(10.0), 120.0);
        assert_relative_eq!(m, 13_215.073_7, epsilon = 1e-3);
    }

    #[test]
    fn test_zero_rate_is_exact() {
        assert_eq!(payment(120_000.0, 0.0, 24.0), 5_000.0);
        assert_eq!(term(120_000.0, 0.0, 5_000.0).unwrap(), 24.0);
        assert_eq!(present_value(5_000.0, 0.0, 24.0), 120_000.0);
    }

    #[test]
    fn test_term_reference_value() {
        let n = term(100_000.0, monthly_rate(18.0), 5_000.0).unwrap();
        assert_relative_eq!(n, 23.956_224_536_601_074, epsilon = 1e-9);
    }

    #[test]
    fn test_non_amortizing() {
        // 1.5% of 100,000 is 1,500 per month
        let err = term(100_000.0, monthly_rate(18.0), 1_500.0).unwrap_err();
        assert_eq!(err.error_code(), "NON_AMORTIZING");

        let err = term(100_000.0, monthly_rate(18.0), 1_000.0).unwrap_err();
        assert_eq!(err.error_code(), "NON_AMORTIZING");
    }

    #[test]
    fn test_term_rejects_non_positive_payment() {
        assert!(term(1000.0, 0.01, 0.0).is_err());
        assert!(term(1000.0, 0.01, -5.0).is_err());
    }

    #[test]
    fn test_remaining_balance_ends_at_zero() {
        let r = monthly_rate(9.0);
        let m = payment(500_000.0, r, 60.0);
        assert_relative_eq!(remaining_balance(500_000.0, r, m, 60.0), 0.0, epsilon = 1e-6);
        assert_relative_eq!(remaining_balance(500_000.0, r, m, 0.0), 500_000.0);
    }

    #[test]
    fn test_present_value_inverts_payment() {
        let r = monthly_rate(7.5);
        let m = payment(3_000_000.0, r, 180.0);
        assert_relative_eq!(present_value(m, r, 180.0), 3_000_000.0, max_relative = 1e-10);
    }

    proptest! {
        #[test]
        fn prop_payment_term_round_trip(
            principal in 1_000.0f64..50_000_000.0,
            annual_pct in 0.0f64..30.0,
            months in 1u32..480,
        ) {
            let r = monthly_rate(annual_pct);
            let n = months as f64;
            let m = payment(principal, r, n);
            let solved = term(principal, r, m).unwrap();
            prop_assert!((solved - n).abs() < 1e-6 * n.max(1.0), "n={} solved={}", n, solved);
        }
    }
}
