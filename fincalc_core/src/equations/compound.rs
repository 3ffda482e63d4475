//! # Compound Growth Formulas
//!
//! Deposit and investment growth: lump sums, periodic deposits and simple
//! interest. Rates are fractional per period unless a name says `_pct`.

use super::annuity::RATE_EPSILON;

/// Lump sum grown at `rate` per period for `periods` periods.
///
/// # Formula
/// A = P(1 + r)^n
#[inline]
pub fn compound_amount(principal: f64, rate: f64, periods: f64) -> f64 {
    principal * (1.0 + rate).powf(periods)
}

/// Future-value factor of an ordinary annuity, ((1+r)^n − 1)/r.
/// Degenerates to n when r = 0.
#[inline]
pub fn annuity_factor(rate: f64, periods: f64) -> f64 {
    if rate.abs() <= RATE_EPSILON {
        periods
    } else {
        ((1.0 + rate).powf(periods) - 1.0) / rate
    }
}

/// Future value of deposits made at the start of each period (annuity due),
/// as used for SIPs and recurring deposits.
///
/// # Formula
/// FV = M·((1+i)^n − 1)/i·(1+i)
pub fn annuity_due_future_value(deposit: f64, rate: f64, periods: f64) -> f64 {
    deposit * annuity_factor(rate, periods) * (1.0 + rate)
}

/// Deposit per period needed to grow from `start` to `target`
/// (end-of-period deposits). Zero if `start` already gets there.
pub fn required_deposit(target: f64, start: f64, rate: f64, periods: f64) -> f64 {
    if periods <= 0.0 {
        return 0.0;
    }
    let shortfall = target - compound_amount(start, rate, periods);
    if shortfall <= 0.0 {
        return 0.0;
    }
    shortfall / annuity_factor(rate, periods)
}

/// Simple interest I = P·r·t with `annual_pct` in percent and `years`.
#[inline]
pub fn simple_interest(principal: f64, annual_pct: f64, years: f64) -> f64 {
    principal * annual_pct / 100.0 * years
}

/// Deflate a nominal future amount by annual inflation.
///
/// # Formula
/// real = nominal / (1 + π)^t
#[inline]
pub fn real_value(nominal: f64, inflation_pct: f64, years: f64) -> f64 {
    nominal / (1.0 + inflation_pct / 100.0).powf(years)
}

/// Annualised growth rate (%) that takes `start` to `end` over `years`.
/// Returns 0 for non-positive inputs.
pub fn annualized_return_pct(start: f64, end: f64, years: f64) -> f64 {
    if start <= 0.0 || end <= 0.0 || years <= 0.0 {
        return 0.0;
    }
    ((end / start).powf(1.0 / years) - 1.0) * 100.0
}

/// Convert a nominal annual rate compounded `per_year` times into the
/// equivalent rate per month.
///
/// # Formula
/// i = (1 + r/k)^(k/12) − 1
pub fn monthly_equivalent_rate(annual_pct: f64, per_year: f64) -> f64 {
    let r = annual_pct / 100.0;
    (1.0 + r / per_year).powf(per_year / 12.0) - 1.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_compound_amount() {
        // FD 1 L at 7% quarterly for 3 years
        let a = compound_amount(100_000.0, 0.07 / 4.0, 12.0);
        assert_relative_eq!(a, 123_143.93, epsilon = 0.01);
    }

    #[test]
    fn test_annuity_due() {
        // SIP 5,000/month at 12% for 10 years
        let fv = annuity_due_future_value(5_000.0, 0.01, 120.0);
        assert_relative_eq!(fv, 1_161_695.38, epsilon = 0.01);
    }

    #[test]
    fn test_zero_rate_degenerates_to_sum() {
        assert_eq!(annuity_factor(0.0, 12.0), 12.0);
        assert_eq!(annuity_due_future_value(1_000.0, 0.0, 12.0), 12_000.0);
    }

    #[test]
    fn test_required_deposit() {
        let deposit = required_deposit(10_000.0, 0.0, 0.0, 10.0);
        assert_relative_eq!(deposit, 1_000.0);
        // Already reached
        assert_eq!(required_deposit(1_000.0, 5_000.0, 0.01, 12.0), 0.0);

        let r = 0.005;
        let d = required_deposit(50_000.0, 1_000.0, r, 60.0);
        let reached = compound_amount(1_000.0, r, 60.0) + d * annuity_factor(r, 60.0);
        assert_relative_eq!(reached, 50_000.0, max_relative = 1e-12);
    }

    #[test]
    fn test_simple_and_real() {
        assert_relative_eq!(simple_interest(10_000.0, 4.5, 2.0), 900.0);
        assert_relative_eq!(real_value(110.25, 5.0, 2.0), 100.0, epsilon = 1e-9);
        assert_relative_eq!(annualized_return_pct(100.0, 121.0, 2.0), 10.0, epsilon = 1e-9);
        assert_eq!(annualized_return_pct(0.0, 121.0, 2.0), 0.0);
    }

    #[test]
    fn test_monthly_equivalent_rate() {
        assert_relative_eq!(monthly_equivalent_rate(12.0, 12.0), 0.01, epsilon = 1e-15);
        // quarterly: (1 + r/4)^(1/3) - 1
        assert_relative_eq!(
            monthly_equivalent_rate(8.0, 4.0),
            1.02f64.powf(1.0 / 3.0) - 1.0,
            epsilon = 1e-15
        );
    }
}
