mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::fee::{FeeArgs, TableArgs};

/// Loan fee calculations
#[derive(Parser)]
#[command(
    name = "loanfee",
    version,
    about = "Loan fee calculations",
    long_about = "Calculates the one-off fee for a 12 or 24 month loan by linear \
                  interpolation over the fee table breakpoints, rounding the total \
                  repayable amount up to a multiple of 5."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log calculation details to stderr
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Calculate the fee for a loan term and amount
    Fee(FeeArgs),
    /// Print the fee table breakpoints for a term
    Table(TableArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();
    telemetry::init(cli.verbose);

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Fee(args) => commands::fee::run_fee(args),
        Commands::Table(args) => commands::fee::run_table(args),
        Commands::Version => {
            println!("loanfee {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
