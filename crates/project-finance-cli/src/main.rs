mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::model::AssumptionArgs;
use commands::sensitivity::SensitivityArgs;

/// Project finance cash-flow, return and bankability analysis
#[derive(Parser)]
#[command(
    name = "pef",
    version,
    about = "Project finance cash-flow, return and bankability analysis",
    long_about = "A CLI for building a project finance model with decimal precision: \
                  construction and operation schedule, level-payment debt service, \
                  WACC, NPV, project and equity IRR, DSCR and a bankability verdict."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Enable debug logging (RUST_LOG takes precedence)
    #[arg(long, short, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full model (schedule, indicators, verdict)
    Model(AssumptionArgs),
    /// Year-by-year income statement and cash flow schedule
    Schedule(AssumptionArgs),
    /// Debt amortization table
    Debt(AssumptionArgs),
    /// Bankability verdict with the failed thresholds
    Bankability(AssumptionArgs),
    /// Sweep one assumption and report the headline indicators
    Sensitivity(SensitivityArgs),
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

    let default_level = if cli.verbose { "debug" } else { "warn" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .init();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Model(args) => commands::model::run_model(args),
        Commands::Schedule(args) => commands::model::run_schedule(args),
        Commands::Debt(args) => commands::model::run_debt(args),
        Commands::Bankability(args) => commands::model::run_bankability(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Version => {
            println!("pef {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            log::debug!("command failed: {e:?}");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
