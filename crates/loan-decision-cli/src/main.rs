mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::explain::ExplainArgs;
use commands::loan::LoanArgs;

/// Loan affordability and approval decisions
#[derive(Parser)]
#[command(
    name = "lde",
    version,
    about = "Loan affordability and approval decisions",
    long_about = "A CLI for pricing a loan's periodic payment with decimal precision, \
                  scoring the applicant's affordability and explaining the resulting \
                  approval decision."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter used when RUST_LOG is unset (e.g. info, debug)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Periodic payment, approval probability, status and reasons
    Calculate(LoanArgs),
    /// Full decision envelope with score breakdown and assumptions
    Evaluate(LoanArgs),
    /// Explain a credit score or declared finances
    ExplainScore(ExplainArgs),
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

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(2);
    }

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Calculate(args) => commands::loan::run_calculate(args),
        Commands::Evaluate(args) => commands::loan::run_evaluate(args),
        Commands::ExplainScore(args) => commands::explain::run_explain_score(args),
        Commands::Version => {
            println!("lde {}", env!("CARGO_PKG_VERSION"));
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
