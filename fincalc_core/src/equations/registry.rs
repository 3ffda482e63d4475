//! # Formula Registry
//!
//! Central registry of every financial formula the calculators apply. Each
//! formula carries metadata (plain-text formula, variables, regulatory or
//! textbook reference, assumptions) so results can be audited and the
//! `FORMULAS.md` reference can be generated from source.
//!
//! ## Usage
//!
//! ```rust
//! use fincalc_core::equations::registry::{Formula, FormulaTracker};
//!
//! let mut tracker = FormulaTracker::new();
//! tracker.record_for_item(Formula::LoanPayment, "EMI", "Home loan");
//!
//! let meta = Formula::LoanPayment.metadata();
//! assert!(meta.formula_plain.contains("(1+r)^n"));
//! ```

use std::collections::{HashMap, HashSet};

use serde::{Deserialize, Serialize};

// ============================================================================
// References
// ============================================================================

/// Source a formula or constant is taken from.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Reference {
    /// Standard time-value-of-money mathematics
    TimeValueOfMoney,
    /// Reserve Bank of India master direction or circular
    Rbi { document: &'static str },
    /// IRS publication or code section
    Irs { document: &'static str },
    /// HMRC VAT notice
    Hmrc { notice: &'static str },
    /// Indian Income-tax Act, 1961
    IncomeTaxAct { section: &'static str },
    /// Common lender or planner practice, not codified
    IndustryPractice { note: &'static str },
}

impl Reference {
    /// Full citation for documentation
    pub fn citation(&self) -> String {
        match self {
            Reference::TimeValueOfMoney => "Time value of money (standard annuity mathematics)".to_string(),
            Reference::Rbi { document } => format!("RBI {}", document),
            Reference::Irs { document } => format!("IRS {}", document),
            Reference::Hmrc { notice } => format!("HMRC VAT Notice {}", notice),
            Reference::IncomeTaxAct { section } => format!("Income-tax Act 1961, {}", section),
            Reference::IndustryPractice { note } => format!("Industry practice: {}", note),
        }
    }

    /// Short form for inline references
    pub fn short_form(&self) -> &'static str {
        match self {
            Reference::TimeValueOfMoney => "TVM",
            Reference::Rbi { .. } => "RBI",
            Reference::Irs { .. } => "IRS",
            Reference::Hmrc { .. } => "HMRC",
            Reference::IncomeTaxAct { .. } => "IT Act",
            Reference::IndustryPractice { .. } => "Practice",
        }
    }
}

// ============================================================================
// Categories
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FormulaCategory {
    /// Amortizing loans and payoff
    Loans,
    /// Lender eligibility rules (FOIR, LTV)
    Eligibility,
    /// Mortgage costs and affordability
    Mortgages,
    /// Fixed and recurring deposits, savings
    Deposits,
    /// SIP and lump-sum investment growth
    Investments,
    /// Employer retirement plans
    Retirement,
    /// VAT and income tax
    Tax,
    /// Budget ratios
    Budgeting,
}

impl FormulaCategory {
    pub fn display_name(&self) -> &'static str {
        match self {
            FormulaCategory::Loans => "Loans",
            FormulaCategory::Eligibility => "Loan Eligibility",
            FormulaCategory::Mortgages => "Mortgages",
            FormulaCategory::Deposits => "Deposits and Savings",
            FormulaCategory::Investments => "Investments",
            FormulaCategory::Retirement => "Retirement",
            FormulaCategory::Tax => "Tax",
            FormulaCategory::Budgeting => "Budgeting",
        }
    }

    /// Sort order for generated documents (lower = earlier)
    pub fn sort_order(&self) -> u8 {
        match self {
            FormulaCategory::Loans => 1,
            FormulaCategory::Eligibility => 2,
            FormulaCategory::Mortgages => 3,
            FormulaCategory::Deposits => 4,
            FormulaCategory::Investments => 5,
            FormulaCategory::Retirement => 6,
            FormulaCategory::Tax => 7,
            FormulaCategory::Budgeting => 8,
        }
    }
}

// ============================================================================
// Variables and Metadata
// ============================================================================

#[derive(Debug, Clone)]
pub struct Variable {
    pub symbol: &'static str,
    pub description: &'static str,
    pub units: &'static str,
}

impl Variable {
    pub const fn new(symbol: &'static str, description: &'static str, units: &'static str) -> Self {
        Self { symbol, description, units }
    }
}

/// Complete metadata for a formula.
#[derive(Debug, Clone)]
pub struct FormulaMetadata {
    /// Human-readable name (e.g., "Level Loan Payment")
    pub name: &'static str,
    pub description: &'static str,
    /// The formula in plain text
    pub formula_plain: &'static str,
    pub reference: Reference,
    pub variables: Vec<Variable>,
    /// Assumptions or limitations
    pub assumptions: Vec<&'static str>,
    pub category: FormulaCategory,
    /// Source module where the formula is implemented
    pub source_module: &'static str,
    /// Function implementing the formula
    pub source_function: &'static str,
}

// ============================================================================
// Formula Enum
// ============================================================================

/// Every formula used by the calculators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[non_exhaustive]
pub enum Formula {
    // Loans
    LoanPayment,
    LoanTerm,
    LoanPresentValue,
    RemainingBalance,
    AmortizationSplit,

    // Eligibility
    WeightedIncome,
    FoirMaxEmi,
    EligibilityTenure,
    LtvCapacity,

    // Mortgages
    MonthlyHousingCost,
    PmiDropOff,
    UkAffordability,

    // Deposits
    FixedDepositMaturity,
    RecurringDepositMaturity,
    MonthlyEquivalentRate,
    PeriodicSavingsGrowth,
    RequiredDeposit,
    SimpleInterest,
    RealValue,

    // Investments
    SipFutureValue,
    LumpsumFutureValue,

    // Retirement
    EmployeeDeferral,
    EmployerMatch,
    RetirementBalance,
    SafeWithdrawal,

    // Tax
    VatAdd,
    VatRemove,
    FlatRateVat,
    SlabTax,
    HealthEducationCess,

    // Budgeting
    SavingsRate,
    DebtToIncome,
}

impl Formula {
    /// Get the full metadata for this formula
    pub fn metadata(&self) -> FormulaMetadata {
        match self {
            Formula::LoanPayment => FormulaMetadata {
                name: "Level Loan Payment (EMI)",
                description: "Fixed monthly payment that retires a loan over n months",
                formula_plain: "M = P*r*(1+r)^n / ((1+r)^n - 1); M = P/n when r = 0",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("M", "Monthly payment", "currency"),
                    Variable::new("P", "Principal", "currency"),
                    Variable::new("r", "Monthly rate (annual% / 12 / 100)", "-"),
                    Variable::new("n", "Number of months", "months"),
                ],
                assumptions: vec!["Fixed rate for the whole term", "Payments at month end"],
                category: FormulaCategory::Loans,
                source_module: "equations/annuity.rs",
                source_function: "payment",
            },

            Formula::LoanTerm => FormulaMetadata {
                name: "Payoff Term",
                description: "Months needed for a fixed payment to retire a balance",
                formula_plain: "n = -ln(1 - r*P/M) / ln(1+r); n = P/M when r = 0",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("n", "Months to payoff (fractional)", "months"),
                    Variable::new("M", "Monthly payment", "currency"),
                    Variable::new("P", "Current balance", "currency"),
                    Variable::new("r", "Monthly rate", "-"),
                ],
                assumptions: vec!["Undefined when M <= r*P (balance never falls)", "No new charges"],
                category: FormulaCategory::Loans,
                source_module: "equations/annuity.rs",
                source_function: "term",
            },

            Formula::LoanPresentValue => FormulaMetadata {
                name: "Loan Amount from Payment",
                description: "Principal a given monthly payment can service",
                formula_plain: "P = M*((1+r)^n - 1) / (r*(1+r)^n); P = M*n when r = 0",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("P", "Serviceable principal", "currency"),
                    Variable::new("M", "Affordable payment", "currency"),
                    Variable::new("n", "Number of months", "months"),
                ],
                assumptions: vec!["Fixed rate for the whole term"],
                category: FormulaCategory::Loans,
                source_module: "equations/annuity.rs",
                source_function: "present_value",
            },

            Formula::RemainingBalance => FormulaMetadata {
                name: "Outstanding Balance",
                description: "Balance left after k level payments",
                formula_plain: "B_k = P*(1+r)^k - M*((1+r)^k - 1)/r",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("B_k", "Balance after k payments", "currency"),
                    Variable::new("k", "Payments made", "months"),
                ],
                assumptions: vec!["Floored at zero"],
                category: FormulaCategory::Loans,
                source_module: "equations/annuity.rs",
                source_function: "remaining_balance",
            },

            Formula::AmortizationSplit => FormulaMetadata {
                name: "Amortization Row",
                description: "Split of one payment into interest and principal",
                formula_plain: "I_k = B_(k-1)*r; Pr_k = min(M - I_k, B_(k-1)); B_k = max(B_(k-1) - Pr_k, 0)",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("I_k", "Interest in month k", "currency"),
                    Variable::new("Pr_k", "Principal repaid in month k", "currency"),
                ],
                assumptions: vec!["Interest charged on the opening balance"],
                category: FormulaCategory::Loans,
                source_module: "calculations/emi.rs",
                source_function: "monthly_schedule",
            },

            Formula::WeightedIncome => FormulaMetadata {
                name: "Weighted Income",
                description: "Annual income a lender counts, weighting secondary sources",
                formula_plain: "Y = primary*1.00 + co_applicant*0.75 + other*0.60; monthly = Y/12",
                reference: Reference::IndustryPractice { note: "Indian housing finance underwriting" },
                variables: vec![
                    Variable::new("Y", "Effective annual income", "INR"),
                ],
                assumptions: vec!["Weights configurable via LendingPolicy"],
                category: FormulaCategory::Eligibility,
                source_module: "calculations/loan_eligibility.rs",
                source_function: "effective_income",
            },

            Formula::FoirMaxEmi => FormulaMetadata {
                name: "FOIR Payment Capacity",
                description: "Largest new EMI allowed by the fixed-obligation-to-income ratio",
                formula_plain: "EMI_max = monthly_income * min(FOIR, cap)/100 - existing_EMI",
                reference: Reference::IndustryPractice { note: "lender FOIR caps (PSU 55%, private 60%, NBFC 65%)" },
                variables: vec![
                    Variable::new("EMI_max", "Maximum new EMI", "INR/month"),
                    Variable::new("FOIR", "Requested obligation ratio", "%"),
                ],
                assumptions: vec!["Ineligible when EMI_max <= 0"],
                category: FormulaCategory::Eligibility,
                source_module: "calculations/loan_eligibility.rs",
                source_function: "calculate",
            },

            Formula::EligibilityTenure => FormulaMetadata {
                name: "Eligible Tenure",
                description: "Loan tenure limited by the borrower's retirement age",
                formula_plain: "T = min(requested, retirement_age - age, 30)",
                reference: Reference::IndustryPractice { note: "retirement age 60 salaried, 65 self-employed" },
                variables: vec![
                    Variable::new("T", "Tenure", "years"),
                ],
                assumptions: vec!["Ineligible when T <= 0"],
                category: FormulaCategory::Eligibility,
                source_module: "calculations/loan_eligibility.rs",
                source_function: "eligible_tenure",
            },

            Formula::LtvCapacity => FormulaMetadata {
                name: "LTV Loan Capacity",
                description: "Largest loan allowed against the property value",
                formula_plain: "L_ltv = value * min(LTV_requested, LTV_band)/100",
                reference: Reference::Rbi { document: "Master Circular on Housing Finance (LTV bands 90/80/75%)" },
                variables: vec![
                    Variable::new("L_ltv", "LTV-bound loan", "INR"),
                    Variable::new("LTV_band", "90% up to 30 L, 80% up to 75 L, else 75%", "%"),
                ],
                assumptions: vec!["Eligible loan = min(EMI-capacity loan, L_ltv)"],
                category: FormulaCategory::Eligibility,
                source_module: "calculations/loan_eligibility.rs",
                source_function: "calculate",
            },

            Formula::MonthlyHousingCost => FormulaMetadata {
                name: "Monthly Housing Cost (PITI)",
                description: "Principal and interest plus taxes, insurance, PMI and HOA",
                formula_plain: "C = M + price*tax%/12 + insurance/12 + PMI + HOA + other/12; PMI = loan*pmi%/12 if down < 20%",
                reference: Reference::IndustryPractice { note: "US conventional mortgage" },
                variables: vec![
                    Variable::new("C", "Total monthly cost", "USD"),
                    Variable::new("M", "Principal and interest", "USD"),
                ],
                assumptions: vec!["PMI charged only below 20% down payment"],
                category: FormulaCategory::Mortgages,
                source_module: "calculations/mortgage.rs",
                source_function: "calculate",
            },

            Formula::PmiDropOff => FormulaMetadata {
                name: "PMI Drop-off Month",
                description: "First month the balance reaches 80% of the original loan",
                formula_plain: "k* = min{k : B_k <= 0.8*L}",
                reference: Reference::IndustryPractice { note: "Homeowners Protection Act borrower-requested cancellation" },
                variables: vec![
                    Variable::new("k*", "Month PMI stops", "months"),
                    Variable::new("L", "Original loan", "USD"),
                ],
                assumptions: vec!["Scheduled payments only", "B_k from the remaining-balance formula"],
                category: FormulaCategory::Mortgages,
                source_module: "calculations/mortgage.rs",
                source_function: "pmi_drop_off_month",
            },

            Formula::UkAffordability => FormulaMetadata {
                name: "UK Borrowing Capacity",
                description: "Loan-to-income multiple less outstanding commitments",
                formula_plain: "L_max = income*4.5 - monthly_debts*12*years",
                reference: Reference::IndustryPractice { note: "UK lenders' 4.5x income multiple" },
                variables: vec![
                    Variable::new("L_max", "Maximum loan", "GBP"),
                ],
                assumptions: vec!["Zero when the result is not positive"],
                category: FormulaCategory::Mortgages,
                source_module: "calculations/mortgage.rs",
                source_function: "affordability",
            },

            Formula::FixedDepositMaturity => FormulaMetadata {
                name: "Fixed Deposit Maturity",
                description: "Quarterly-compounded maturity value of a fixed deposit",
                formula_plain: "A = P*(1 + r/4)^(4t), t = months/12",
                reference: Reference::IndustryPractice { note: "Indian bank FD quarterly compounding" },
                variables: vec![
                    Variable::new("A", "Maturity amount", "currency"),
                    Variable::new("t", "Tenure", "years"),
                ],
                assumptions: vec!["Interest reinvested quarterly"],
                category: FormulaCategory::Deposits,
                source_module: "calculations/deposits.rs",
                source_function: "fixed_deposit",
            },

            Formula::RecurringDepositMaturity => FormulaMetadata {
                name: "Recurring Deposit Maturity",
                description: "Maturity of equal monthly deposits made at the start of each month",
                formula_plain: "A = D*((1+i)^n - 1)/i*(1+i)",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("D", "Monthly deposit", "currency"),
                    Variable::new("i", "Monthly equivalent rate", "-"),
                    Variable::new("n", "Number of deposits", "months"),
                ],
                assumptions: vec!["Senior citizens earn an extra 0.5%"],
                category: FormulaCategory::Deposits,
                source_module: "calculations/deposits.rs",
                source_function: "recurring_deposit",
            },

            Formula::MonthlyEquivalentRate => FormulaMetadata {
                name: "Monthly Equivalent Rate",
                description: "Monthly rate equivalent to a nominal rate compounded k times a year",
                formula_plain: "i = (1 + r/k)^(k/12) - 1",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("k", "Compounding periods per year", "-"),
                ],
                assumptions: vec![],
                category: FormulaCategory::Deposits,
                source_module: "equations/compound.rs",
                source_function: "monthly_equivalent_rate",
            },

            Formula::PeriodicSavingsGrowth => FormulaMetadata {
                name: "Savings Growth Year",
                description: "One year of compounding with deposits spread over the compounding periods",
                formula_plain: "B' = B*(1+r)^k + d*((1+r)^k - 1)/r, r = APY/k, d = deposit*f/k",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("k", "Compounding periods per year", "-"),
                    Variable::new("f", "Deposits per year", "-"),
                ],
                assumptions: vec!["APY limited to 0-6%", "Horizon limited to 1-40 years"],
                category: FormulaCategory::Deposits,
                source_module: "calculations/savings.rs",
                source_function: "project",
            },

            Formula::RequiredDeposit => FormulaMetadata {
                name: "Required Periodic Deposit",
                description: "Deposit per period that grows the starting balance to a goal",
                formula_plain: "d = (G - P*(1+r)^n) / (((1+r)^n - 1)/r)",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("G", "Goal amount", "currency"),
                    Variable::new("d", "Deposit per period", "currency"),
                ],
                assumptions: vec!["Zero when the starting balance already reaches the goal"],
                category: FormulaCategory::Deposits,
                source_module: "equations/compound.rs",
                source_function: "required_deposit",
            },

            Formula::SimpleInterest => FormulaMetadata {
                name: "Simple Interest",
                description: "Interest without compounding",
                formula_plain: "I = P*r*t",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("I", "Interest", "currency"),
                    Variable::new("t", "Time", "years"),
                ],
                assumptions: vec![],
                category: FormulaCategory::Deposits,
                source_module: "equations/compound.rs",
                source_function: "simple_interest",
            },

            Formula::RealValue => FormulaMetadata {
                name: "Inflation-adjusted Value",
                description: "Future amount expressed in today's money",
                formula_plain: "real = nominal / (1 + inflation)^t",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("t", "Years", "years"),
                ],
                assumptions: vec!["Constant inflation"],
                category: FormulaCategory::Deposits,
                source_module: "equations/compound.rs",
                source_function: "real_value",
            },

            Formula::SipFutureValue => FormulaMetadata {
                name: "SIP Future Value",
                description: "Value of monthly investments made at the start of each month",
                formula_plain: "FV = P*((1+i)^n - 1)/i*(1+i) + initial*(1+R)^years, i = R/12",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("R", "Expected annual return", "-"),
                    Variable::new("n", "Months invested", "months"),
                ],
                assumptions: vec!["Constant return", "Sum of deposits when R = 0"],
                category: FormulaCategory::Investments,
                source_module: "calculations/sip.rs",
                source_function: "sip",
            },

            Formula::LumpsumFutureValue => FormulaMetadata {
                name: "Lump Sum Future Value",
                description: "Annually compounded growth of a single investment",
                formula_plain: "FV = P*(1+R)^t",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("t", "Years", "years"),
                ],
                assumptions: vec!["Constant return"],
                category: FormulaCategory::Investments,
                source_module: "calculations/sip.rs",
                source_function: "lumpsum",
            },

            Formula::EmployeeDeferral => FormulaMetadata {
                name: "Employee Deferral",
                description: "Employee 401(k) contribution capped by the IRS elective-deferral limit",
                formula_plain: "E = min(salary*c%, limit); limit = 23,000 (30,500 at age 50+)",
                reference: Reference::Irs { document: "IRC 402(g) and 414(v), 2024 limits" },
                variables: vec![
                    Variable::new("E", "Employee contribution", "USD/yr"),
                    Variable::new("c%", "Contribution rate", "%"),
                ],
                assumptions: vec!["Limits held constant over the projection"],
                category: FormulaCategory::Retirement,
                source_module: "calculations/retirement.rs",
                source_function: "calculate",
            },

            Formula::EmployerMatch => FormulaMetadata {
                name: "Employer Match",
                description: "Match on contributions up to the match cap",
                formula_plain: "Match = salary*min(c%, cap%)*match%",
                reference: Reference::IndustryPractice { note: "partial matching formula" },
                variables: vec![
                    Variable::new("cap%", "Salary percentage matched", "%"),
                    Variable::new("match%", "Match rate", "%"),
                ],
                assumptions: vec!["Match not subject to the employee limit"],
                category: FormulaCategory::Retirement,
                source_module: "calculations/retirement.rs",
                source_function: "calculate",
            },

            Formula::RetirementBalance => FormulaMetadata {
                name: "401(k) Balance Year",
                description: "Balance after one year of growth and contributions",
                formula_plain: "B' = B*(1 + return) + E + Match; salary' = salary*(1 + raise)",
                reference: Reference::TimeValueOfMoney,
                variables: vec![
                    Variable::new("B", "Balance at start of year", "USD"),
                ],
                assumptions: vec!["Contributions added at year end"],
                category: FormulaCategory::Retirement,
                source_module: "calculations/retirement.rs",
                source_function: "calculate",
            },

            Formula::SafeWithdrawal => FormulaMetadata {
                name: "Safe Withdrawal Income",
                description: "Monthly income from the 4% rule",
                formula_plain: "income = balance*0.04/12",
                reference: Reference::IndustryPractice { note: "Bengen 4% rule" },
                variables: vec![
                    Variable::new("income", "Monthly retirement income", "USD/month"),
                ],
                assumptions: vec!["Withdrawal rate configurable"],
                category: FormulaCategory::Retirement,
                source_module: "calculations/retirement.rs",
                source_function: "calculate",
            },

            Formula::VatAdd => FormulaMetadata {
                name: "Add VAT",
                description: "Gross price from a net price",
                formula_plain: "VAT = round(net*rate, 2); gross = net + VAT",
                reference: Reference::Hmrc { notice: "700 section 17" },
                variables: vec![
                    Variable::new("rate", "VAT rate (0.20 standard)", "-"),
                ],
                assumptions: vec!["Rounded to the penny"],
                category: FormulaCategory::Tax,
                source_module: "calculations/vat.rs",
                source_function: "calculate",
            },

            Formula::VatRemove => FormulaMetadata {
                name: "Remove VAT",
                description: "Net price from a VAT-inclusive price",
                formula_plain: "net = gross/(1 + rate); VAT = gross - net",
                reference: Reference::Hmrc { notice: "700 section 17 (VAT fraction)" },
                variables: vec![
                    Variable::new("gross", "VAT-inclusive price", "GBP"),
                ],
                assumptions: vec!["Never gross*(1 - rate)"],
                category: FormulaCategory::Tax,
                source_module: "calculations/vat.rs",
                source_function: "calculate",
            },

            Formula::FlatRateVat => FormulaMetadata {
                name: "Flat Rate Scheme VAT",
                description: "VAT remitted under the Flat Rate Scheme and the margin retained",
                formula_plain: "VAT_frs = gross*flat%; retained = VAT - VAT_frs",
                reference: Reference::Hmrc { notice: "733" },
                variables: vec![
                    Variable::new("flat%", "Sector flat rate", "%"),
                ],
                assumptions: vec!["Applied to VAT-inclusive turnover"],
                category: FormulaCategory::Tax,
                source_module: "calculations/vat.rs",
                source_function: "calculate",
            },

            Formula::SlabTax => FormulaMetadata {
                name: "Slab Income Tax",
                description: "Progressive tax where each slab taxes income within its bounds",
                formula_plain: "T = sum(rate_j * max(0, min(Y, upper_j) - max(lower_j, exemption)))",
                reference: Reference::IncomeTaxAct { section: "First Schedule and section 115BAC" },
                variables: vec![
                    Variable::new("Y", "Taxable income", "INR"),
                    Variable::new("exemption", "Age-dependent basic exemption", "INR"),
                ],
                assumptions: vec!["Rebates and surcharge not modelled"],
                category: FormulaCategory::Tax,
                source_module: "equations/tax.rs",
                source_function: "slab_tax",
            },

            Formula::HealthEducationCess => FormulaMetadata {
                name: "Health and Education Cess",
                description: "Cess levied on income tax",
                formula_plain: "total = T*(1 + 4%)",
                reference: Reference::IncomeTaxAct { section: "Finance Act cess" },
                variables: vec![
                    Variable::new("T", "Income tax before cess", "INR"),
                ],
                assumptions: vec![],
                category: FormulaCategory::Tax,
                source_module: "calculations/income_tax.rs",
                source_function: "regime_tax",
            },

            Formula::SavingsRate => FormulaMetadata {
                name: "Savings Rate",
                description: "Share of income left after expenses",
                formula_plain: "rate = (income - expenses)/income*100",
                reference: Reference::IndustryPractice { note: "personal budgeting" },
                variables: vec![
                    Variable::new("rate", "Savings rate", "%"),
                ],
                assumptions: vec!["Zero when income is zero"],
                category: FormulaCategory::Budgeting,
                source_module: "calculations/budget.rs",
                source_function: "summarize",
            },

            Formula::DebtToIncome => FormulaMetadata {
                name: "Debt-to-Income Ratio",
                description: "Share of income committed to loan EMIs",
                formula_plain: "DTI = loan_EMIs/income*100",
                reference: Reference::IndustryPractice { note: "above 40% flagged" },
                variables: vec![
                    Variable::new("DTI", "Debt-to-income ratio", "%"),
                ],
                assumptions: vec![],
                category: FormulaCategory::Budgeting,
                source_module: "calculations/budget.rs",
                source_function: "summarize",
            },
        }
    }

    /// Get all formulas in a given category
    pub fn in_category(category: FormulaCategory) -> Vec<Formula> {
        ALL_FORMULAS
            .iter()
            .filter(|f| f.metadata().category == category)
            .copied()
            .collect()
    }

    /// All categories in document order
    pub fn all_categories() -> Vec<FormulaCategory> {
        use FormulaCategory::*;
        let mut cats = vec![Loans, Eligibility, Mortgages, Deposits, Investments, Retirement, Tax, Budgeting];
        cats.sort_by_key(|c| c.sort_order());
        cats
    }
}

/// All formulas in the registry (for iteration)
pub static ALL_FORMULAS: &[Formula] = &[
    Formula::LoanPayment,
    Formula::LoanTerm,
    Formula::LoanPresentValue,
    Formula::RemainingBalance,
    Formula::AmortizationSplit,
    Formula::WeightedIncome,
    Formula::FoirMaxEmi,
    Formula::EligibilityTenure,
    Formula::LtvCapacity,
    Formula::MonthlyHousingCost,
    Formula::PmiDropOff,
    Formula::UkAffordability,
    Formula::FixedDepositMaturity,
    Formula::RecurringDepositMaturity,
    Formula::MonthlyEquivalentRate,
    Formula::PeriodicSavingsGrowth,
    Formula::RequiredDeposit,
    Formula::SimpleInterest,
    Formula::RealValue,
    Formula::SipFutureValue,
    Formula::LumpsumFutureValue,
    Formula::EmployeeDeferral,
    Formula::EmployerMatch,
    Formula::RetirementBalance,
    Formula::SafeWithdrawal,
    Formula::VatAdd,
    Formula::VatRemove,
    Formula::FlatRateVat,
    Formula::SlabTax,
    Formula::HealthEducationCess,
    Formula::SavingsRate,
    Formula::DebtToIncome,
];

// ============================================================================
// Usage Tracking
// ============================================================================

/// Record of a formula being applied while evaluating a worksheet.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FormulaUsage {
    pub formula: Formula,
    /// Where/why it was used (e.g., "Payoff term")
    pub context: String,
    /// Label of the worksheet item it was applied to
    pub item_label: Option<String>,
}

impl FormulaUsage {
    pub fn new(formula: Formula, context: impl Into<String>) -> Self {
        Self {
            formula,
            context: context.into(),
            item_label: None,
        }
    }

    pub fn for_item(formula: Formula, context: impl Into<String>, label: impl Into<String>) -> Self {
        Self {
            formula,
            context: context.into(),
            item_label: Some(label.into()),
        }
    }
}

/// Collector for formula usage across a worksheet.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FormulaTracker {
    usages: Vec<FormulaUsage>,
}

impl FormulaTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, formula: Formula, context: impl Into<String>) {
        self.usages.push(FormulaUsage::new(formula, context));
    }

    pub fn record_for_item(&mut self, formula: Formula, context: impl Into<String>, label: impl Into<String>) {
        self.usages.push(FormulaUsage::for_item(formula, context, label));
    }

    pub fn usages(&self) -> &[FormulaUsage] {
        &self.usages
    }

    /// Unique formulas used, in first-use order
    pub fn unique_formulas(&self) -> Vec<Formula> {
        let mut seen = HashSet::new();
        self.usages
            .iter()
            .filter(|u| seen.insert(u.formula))
            .map(|u| u.formula)
            .collect()
    }

    pub fn by_formula(&self) -> HashMap<Formula, Vec<&FormulaUsage>> {
        let mut map: HashMap<Formula, Vec<&FormulaUsage>> = HashMap::new();
        for usage in &self.usages {
            map.entry(usage.formula).or_default().push(usage);
        }
        map
    }

    /// Unique formulas grouped by category, categories in document order
    pub fn by_category(&self) -> Vec<(FormulaCategory, Vec<Formula>)> {
        let mut by_cat: HashMap<FormulaCategory, Vec<Formula>> = HashMap::new();
        for formula in self.unique_formulas() {
            by_cat.entry(formula.metadata().category).or_default().push(formula);
        }

        let mut result: Vec<_> = by_cat.into_iter().collect();
        result.sort_by_key(|(cat, _)| cat.sort_order());
        result
    }

    pub fn merge(&mut self, other: FormulaTracker) {
        self.usages.extend(other.usages);
    }

    /// Markdown list of the formulas applied, grouped by category, with the
    /// worksheet items each one was applied to.
    ///
    /// ```rust
    /// use fincalc_core::equations::registry::{Formula, FormulaTracker};
    ///
    /// let mut tracker = FormulaTracker::new();
    /// tracker.record_for_item(Formula::VatAdd, "Add VAT", "Invoice 42");
    ///
    /// let md = tracker.usage_markdown();
    /// assert!(md.contains("Add VAT"));
    /// assert!(md.contains("Invoice 42"));
    /// ```
    pub fn usage_markdown(&self) -> String {
        let mut output = String::from("## Formulas Applied\n\n");

        let by_category = self.by_category();
        if by_category.is_empty() {
            output.push_str("_No formulas recorded._\n");
            return output;
        }

        let usage_by_formula = self.by_formula();
        for (category, formulas) in by_category {
            output.push_str(&format!("### {}\n\n", category.display_name()));
            for formula in formulas {
                let meta = formula.metadata();
                output.push_str(&format!(
                    "- **{}**: `{}` ({})",
                    meta.name,
                    meta.formula_plain,
                    meta.reference.short_form()
                ));

                if let Some(usages) = usage_by_formula.get(&formula) {
                    let mut labels: Vec<&str> = usages.iter().filter_map(|u| u.item_label.as_deref()).collect();
                    labels.sort();
                    labels.dedup();
                    if !labels.is_empty() {
                        output.push_str(&format!(" - applied to {}", labels.join(", ")));
                    }
                }
                output.push('\n');
            }
            output.push('\n');
        }
        output
    }
}

// ============================================================================
// Markdown Generation for FORMULAS.md
// ============================================================================

/// Generate the complete FORMULAS.md reference.
///
/// ```rust
/// use fincalc_core::equations::registry::generate_formulas_markdown;
///
/// let markdown = generate_formulas_markdown();
/// assert!(markdown.contains("FinCalc Formula Reference"));
/// assert!(markdown.contains("## Loans"));
/// ```
pub fn generate_formulas_markdown() -> String {
    let mut output = String::with_capacity(24_000);

    output.push_str(
        r#"# FinCalc Formula Reference

> **Auto-generated from source code. Do not edit manually.**
>
> Regenerate with: `cargo run --bin gen-formulas`

Every formula used by the FinCalc calculators, with its source, variables and
assumptions.

## Conventions

| Quantity | Convention |
|----------|------------|
| Rates | Entered in percent; `r` denotes a fractional rate per period |
| Monthly rate | annual% / 12 / 100 |
| Money | Rounded half away from zero to minor units once, on output |
| Term | Months unless stated otherwise |

---

"#,
    );

    let categories = Formula::all_categories();

    for category in &categories {
        let formulas = Formula::in_category(*category);
        if formulas.is_empty() {
            continue;
        }

        output.push_str(&format!("## {}\n\n", category.display_name()));

        for formula in formulas {
            let meta = formula.metadata();

            output.push_str(&format!("### {}\n\n", meta.name));
            output.push_str(&format!("{}\n\n", meta.description));
            output.push_str(&format!("**Formula:** `{}`\n\n", meta.formula_plain));

            if !meta.variables.is_empty() {
                output.push_str("**Variables:**\n\n");
                output.push_str("| Symbol | Description | Units |\n");
                output.push_str("|--------|-------------|-------|\n");
                for var in &meta.variables {
                    output.push_str(&format!("| {} | {} | {} |\n", var.symbol, var.description, var.units));
                }
                output.push('\n');
            }

            output.push_str(&format!("**Reference:** {}\n\n", meta.reference.citation()));
            output.push_str(&format!(
                "**Source:** [`{}`](src/{})\n\n",
                meta.source_function, meta.source_module
            ));

            if !meta.assumptions.is_empty() {
                output.push_str("**Assumptions:**\n");
                for assumption in &meta.assumptions {
                    output.push_str(&format!("- {}\n", assumption));
                }
                output.push('\n');
            }

            output.push_str("---\n\n");
        }
    }

    output.push_str(&format!(
        "## Statistics\n\n- **Total Formulas:** {}\n- **Categories:** {}\n",
        ALL_FORMULAS.len(),
        categories.len()
    ));

    output
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_formulas_have_metadata() {
        assert_eq!(ALL_FORMULAS.len(), 32);

        for f in ALL_FORMULAS {
            let meta = f.metadata();
            assert!(!meta.name.is_empty(), "Formula {:?} has no name", f);
            assert!(!meta.formula_plain.is_empty(), "Formula {:?} has no formula", f);
            assert!(!meta.variables.is_empty(), "Formula {:?} has no variables", f);
            assert!(!meta.source_module.is_empty(), "Formula {:?} missing source_module", f);
            assert!(!meta.source_function.is_empty(), "Formula {:?} missing source_function", f);
        }

        let remove = Formula::VatRemove.metadata();
        assert!(remove.formula_plain.contains("gross/(1 + rate)"));
    }

    #[test]
    fn test_every_category_populated() {
        for cat in Formula::all_categories() {
            assert!(!Formula::in_category(cat).is_empty(), "{:?} is empty", cat);
        }
    }

    #[test]
    fn test_reference_citation() {
        let hmrc = Reference::Hmrc { notice: "733" };
        assert_eq!(hmrc.citation(), "HMRC VAT Notice 733");
        assert_eq!(Reference::TimeValueOfMoney.short_form(), "TVM");
    }

    #[test]
    fn test_tracker() {
        let mut tracker = FormulaTracker::new();
        tracker.record(Formula::LoanPayment, "EMI");
        tracker.record(Formula::SlabTax, "Old regime");
        tracker.record(Formula::LoanPayment, "Rate shock");

        assert_eq!(tracker.usages().len(), 3);
        assert_eq!(tracker.unique_formulas(), vec![Formula::LoanPayment, Formula::SlabTax]);

        let by_cat = tracker.by_category();
        assert_eq!(by_cat.len(), 2);
        assert_eq!(by_cat[0].0, FormulaCategory::Loans);
        assert_eq!(by_cat[1].0, FormulaCategory::Tax);
    }

    #[test]
    fn test_usage_markdown() {
        let mut tracker = FormulaTracker::new();
        tracker.record_for_item(Formula::LoanTerm, "Payoff term", "Visa");
        tracker.record_for_item(Formula::LoanTerm, "Payoff term", "Amex");

        let md = tracker.usage_markdown();
        assert!(md.contains("### Loans"));
        assert!(md.contains("applied to Amex, Visa"));

        assert!(FormulaTracker::new().usage_markdown().contains("No formulas recorded"));
    }

    #[test]
    fn test_generate_formulas_markdown() {
        let markdown = generate_formulas_markdown();
        assert!(markdown.contains("Auto-generated from source code"));
        for cat in Formula::all_categories() {
            assert!(markdown.contains(&format!("## {}", cat.display_name())), "missing {:?}", cat);
        }
        assert!(markdown.contains("### Level Loan Payment (EMI)"));
        assert!(markdown.contains("HMRC VAT Notice 733"));
        assert!(markdown.contains("**Total Formulas:** 32"));
        assert!(markdown.contains("**Categories:** 8"));
    }
}
