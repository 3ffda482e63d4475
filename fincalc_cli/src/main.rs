//! # fincalc
//!
//! Command-line front end for `fincalc_core`.
//!
//! ```bash
//! fincalc emi --principal 25,00,000 --rate 8.5 --years 20 --schedule
//! fincalc payoff --balance 5000 --rate 18 --payment 200
//! fincalc vat 120 --remove --json
//! fincalc eval --input item.json
//! fincalc new household.fcw && fincalc run household.fcw
//! ```
//!
//! Errors exit non-zero; with `--json` they are printed as a JSON object.

mod commands;
mod logging;
mod render;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde_json::json;

use fincalc_core::errors::CalcError;
use fincalc_core::policy::PolicySet;

use commands::{EligibilityArgs, EmiArgs, EvalArgs, NewArgs, PayoffArgs, RetirementArgs, RunArgs, VatArgs};

#[derive(Parser, Debug)]
#[command(name = "fincalc", version, about = "Personal-finance calculators")]
struct Cli {
    /// Print results and errors as JSON
    #[arg(long, global = true)]
    json: bool,

    /// TOML file overriding the built-in policy tables
    #[arg(long, global = true, env = "FINCALC_POLICY")]
    policy: Option<PathBuf>,

    /// More logging (-v debug, -vv trace); RUST_LOG takes precedence
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Loan EMI, totals and optional amortization schedule
    Emi(EmiArgs),
    /// Credit card payoff time and interest
    Payoff(PayoffArgs),
    /// Home loan eligibility (FOIR and LTV)
    Eligibility(EligibilityArgs),
    /// 401(k) balance at retirement
    Retirement(RetirementArgs),
    /// Add or remove UK VAT
    Vat(VatArgs),
    /// Evaluate one calculation item from a JSON file
    Eval(EvalArgs),
    /// Evaluate every item in a worksheet
    Run(RunArgs),
    /// Create an empty worksheet
    New(NewArgs),
    /// Print the formula reference
    Formulas,
}

fn load_policy(path: Option<&Path>) -> Result<Option<PolicySet>> {
    match path {
        Some(path) => {
            let policy = PolicySet::load(path).with_context(|| format!("loading policy {}", path.display()))?;
            Ok(Some(policy))
        }
        None => Ok(None),
    }
}

fn run(cli: &Cli) -> Result<()> {
    let policy_file = load_policy(cli.policy.as_deref())?;
    let policy = policy_file.clone().unwrap_or_default();

    match &cli.command {
        Command::Emi(args) => commands::emi(args, cli.json),
        Command::Payoff(args) => commands::payoff(args, cli.json),
        Command::Eligibility(args) => commands::eligibility(args, &policy, cli.json),
        Command::Retirement(args) => commands::retirement(args, &policy, cli.json),
        Command::Vat(args) => commands::vat(args, &policy, cli.json),
        Command::Eval(args) => commands::eval(args, &policy, cli.json),
        Command::Run(args) => commands::run(args, policy_file.as_ref(), cli.json),
        Command::New(args) => commands::new(args, &policy),
        Command::Formulas => commands::formulas(cli.json),
    }
}

fn report_error(err: &anyhow::Error, json: bool) {
    let calc_error = err.chain().find_map(|e| e.downcast_ref::<CalcError>());

    if json {
        let body = json!({
            "error": {
                "code": calc_error.map(|e| e.error_code()).unwrap_or("ERROR"),
                "message": format!("{:#}", err),
                "details": calc_error,
            }
        });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_else(|_| body.to_string()));
    } else {
        eprintln!("error: {:#}", err);
    }
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);
    tracing::debug!(command = ?cli.command, "starting");

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            report_error(&err, cli.json);
            ExitCode::FAILURE
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_vat_remove() {
        let cli = Cli::try_parse_from(["fincalc", "vat", "£120", "--remove", "--json"]).unwrap();
        assert!(cli.json);
        match cli.command {
            Command::Vat(args) => {
                assert_eq!(args.amount, 120.0);
                assert!(args.remove);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_flat_rate_requires_business() {
        assert!(Cli::try_parse_from(["fincalc", "vat", "100", "--flat-rate", "it"]).is_err());
        assert!(Cli::try_parse_from(["fincalc", "vat", "100", "--business", "--flat-rate", "it"]).is_ok());
    }

    #[test]
    fn test_json_error_carries_code() {
        let err = anyhow::Error::new(CalcError::missing_field("principal")).context("evaluating item");
        let calc_error = err.chain().find_map(|e| e.downcast_ref::<CalcError>());
        assert_eq!(calc_error.map(|e| e.error_code()), Some("MISSING_FIELD"));
    }
}
