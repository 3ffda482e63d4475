//! Text and JSON output.

use std::fmt::Display;

use anyhow::Result;
use serde::Serialize;

use fincalc_core::calculations::CalculationOutput;
use fincalc_core::units::{Currency, Money};

/// Chooses between pretty JSON and a plain-text block.
pub struct Printer {
    pub json: bool,
    pub currency: Currency,
}

impl Printer {
    pub fn new(json: bool, currency: Currency) -> Self {
        Printer { json, currency }
    }

    pub fn money(&self, amount: Money) -> String {
        self.currency.format(amount)
    }

    /// Short form for headline figures: `₹1.25 Cr`, `$12.30 K`.
    pub fn compact(&self, amount: Money) -> String {
        self.currency.format_compact(amount)
    }

    /// Print `value` as JSON, or the text produced by `text`.
    pub fn emit<T: Serialize>(&self, value: &T, text: impl FnOnce(&Printer) -> String) -> Result<()> {
        if self.json {
            println!("{}", serde_json::to_string_pretty(value)?);
        } else {
            print!("{}", text(self));
        }
        Ok(())
    }
}

/// Two-column text block.
pub struct TextBlock {
    buf: String,
}

impl TextBlock {
    pub fn new(title: &str) -> Self {
        let mut buf = String::new();
        buf.push_str(title);
        buf.push('\n');
        buf.push_str(&"-".repeat(title.chars().count()));
        buf.push('\n');
        TextBlock { buf }
    }

    pub fn row(mut self, label: &str, value: impl Display) -> Self {
        self.buf.push_str(&format!("  {:<26}{}\n", label, value));
        self
    }

    pub fn row_if<T: Display>(self, label: &str, value: Option<T>) -> Self {
        match value {
            Some(v) => self.row(label, v),
            None => self,
        }
    }

    pub fn line(mut self, text: impl Display) -> Self {
        self.buf.push_str(&format!("  {}\n", text));
        self
    }

    pub fn section(mut self, title: &str) -> Self {
        self.buf.push('\n');
        self.buf.push_str(title);
        self.buf.push('\n');
        self
    }

    pub fn finish(mut self) -> String {
        self.buf.push('\n');
        self.buf
    }
}

/// One-line summary of an evaluated item.
pub fn headline(output: &CalculationOutput, p: &Printer) -> String {
    match output {
        CalculationOutput::Emi(r) => format!(
            "EMI {} over {} months, interest {}",
            p.money(r.emi),
            r.months,
            p.money(r.total_interest)
        ),
        CalculationOutput::Prepayment(r) => format!(
            "interest saved {}, {} months sooner",
            p.money(r.interest_saved),
            r.months_saved
        ),
        CalculationOutput::CreditPayoff(r) => format!(
            "paid off in {} months, interest {}",
            r.months_to_payoff,
            p.money(r.total_interest)
        ),
        CalculationOutput::LoanEligibility(outcome) => match outcome.result() {
            Some(r) => format!(
                "eligible for {} at EMI {} ({:?}-bound)",
                p.compact(r.eligible_loan),
                p.money(r.monthly_emi),
                r.limiting_factor
            ),
            None => "not eligible".to_string(),
        },
        CalculationOutput::Mortgage(r) => format!(
            "monthly {} (P&I {}), paid off {}",
            p.money(r.monthly.total),
            p.money(r.monthly.principal_interest),
            r.payoff_date
        ),
        CalculationOutput::UkAffordability(r) => format!(
            "max loan {}, payment {}",
            p.compact(r.max_loan),
            p.money(r.monthly_payment)
        ),
        CalculationOutput::FixedDeposit(r) => format!(
            "maturity {}, interest {}",
            p.money(r.maturity_amount),
            p.money(r.interest_earned)
        ),
        CalculationOutput::RecurringDeposit(r) => format!(
            "maturity {}, post-tax {}",
            p.money(r.maturity_amount),
            p.money(r.post_tax_amount)
        ),
        CalculationOutput::SavingsInterest(r) => {
            format!("interest {}, total {}", p.money(r.interest), p.money(r.total))
        }
        CalculationOutput::Sip(r) | CalculationOutput::Lumpsum(r) => format!(
            "future value {}, returns {}",
            p.compact(r.future_value),
            p.compact(r.total_returns)
        ),
        CalculationOutput::SavingsGrowth(r) => format!(
            "{} after {} years ({} in today's money)",
            p.money(r.future_value),
            r.years,
            p.money(r.real_value)
        ),
        CalculationOutput::SavingsGoal(r) => format!(
            "deposit {} per period to reach {}",
            p.money(r.required_deposit),
            p.money(r.target)
        ),
        CalculationOutput::Retirement(r) => format!(
            "{} at retirement, {} a month",
            p.compact(r.final_balance),
            p.money(r.monthly_income)
        ),
        CalculationOutput::Vat(r) => format!(
            "net {} + VAT {} = {}",
            p.money(r.net),
            p.money(r.vat),
            p.money(r.gross)
        ),
        CalculationOutput::IncomeTax(r) => format!(
            "{:?} regime saves {}",
            r.better_regime,
            p.money(r.savings)
        ),
        CalculationOutput::Budget { summary, .. } => format!(
            "saving {} a month ({:.1}%)",
            p.money(summary.net_savings),
            summary.savings_rate_pct
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fincalc_core::calculations::{evaluate, CalculationItem, LumpsumInput};
    use fincalc_core::policy::PolicySet;

    #[test]
    fn test_text_block_layout() {
        let text = TextBlock::new("VAT").row("Net", "100").row_if("Gross", None::<&str>).finish();
        assert_eq!(text, "VAT\n---\n  Net                       100\n\n");
    }

    #[test]
    fn test_headline_uses_compact_amounts() {
        let item = CalculationItem::Lumpsum(LumpsumInput {
            label: String::new(),
            amount: 1_000_000.0,
            expected_return_pct: 12.0,
            years: 10.0,
        });
        let output = evaluate(&item, &PolicySet::default()).unwrap();
        let line = headline(&output, &Printer::new(false, Currency::Inr));
        assert!(line.starts_with("future value ₹31.06 L"), "{}", line);
    }
}
