use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;
use tracing::info;

use loan_fee_core::fee::{calculate_loan_fee, fee_schedule, LoanFeeInput, LoanTerm};

use crate::input;

/// Arguments for a single loan fee calculation
#[derive(Args)]
pub struct FeeArgs {
    /// Path to JSON input file (overrides individual flags)
    #[arg(long)]
    pub input: Option<String>,

    /// Loan term in months (12 or 24)
    #[arg(long)]
    pub term: Option<u32>,

    /// Requested principal
    #[arg(long)]
    pub amount: Option<Decimal>,

    /// Use the boundary breakpoints for amounts outside the fee table
    /// instead of failing
    #[arg(long)]
    pub clamp: bool,
}

/// Arguments for printing a fee table
#[derive(Args)]
pub struct TableArgs {
    /// Loan term in months (12 or 24)
    #[arg(long)]
    pub term: u32,
}

pub fn run_fee(args: FeeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let fee_input: LoanFeeInput = if let Some(ref path) = args.input {
        input::file::read_json(path)?
    } else if let Some(data) = input::stdin::read_stdin::<LoanFeeInput>()? {
        data
    } else {
        input_from_flags(&args)?
    };

    let result = calculate_loan_fee(&fee_input)?;
    info!(
        term = result.result.term_months,
        amount = %result.result.amount,
        fee = %result.result.fee,
        "loan fee calculated"
    );
    Ok(serde_json::to_value(result)?)
}

/// Build the calculation input from individual flags.
fn input_from_flags(args: &FeeArgs) -> Result<LoanFeeInput, Box<dyn std::error::Error>> {
    Ok(LoanFeeInput {
        term: args.term.ok_or("--term is required (or provide --input)")?,
        amount: args.amount.ok_or("--amount is required (or provide --input)")?,
        clamp_out_of_range: args.clamp,
    })
}

pub fn run_table(args: TableArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let term = LoanTerm::try_from(args.term)?;
    Ok(serde_json::to_value(fee_schedule(term))?)
}
