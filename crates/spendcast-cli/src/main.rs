//! spendcast CLI - Expense dataset analyzer
//!
//! Usage:
//!   spendcast sample                          Write the sample dataset
//!   spendcast clean --file expenses.csv       Cleaned preview and stats
//!   spendcast summary --file expenses.csv     Category totals and monthly trend
//!   spendcast forecast --file expenses.csv    Next month's spend
//!   spendcast allocate --file expenses.csv --budget 2000
//!   spendcast analyze --file expenses.csv --budget 2000

mod cli;
mod commands;


use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use cli::*;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Set up logging
    // Priority: RUST_LOG env var > --verbose flag > default (info)
    let filter = if std::env::var("RUST_LOG").is_ok() {
        EnvFilter::from_default_env()
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    // Logs go to stderr so --json output stays parseable
    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr)
                .compact(),
        )
        .init();

    let json = cli.json;
    let config = || commands::load_config(cli.config.as_deref());

    match &cli.command {
        Commands::Clean { file, rows } => commands::cmd_clean(file, &config()?, *rows, json),
        Commands::Summary { file } => commands::cmd_summary(file, json),
        Commands::Forecast { file } => commands::cmd_forecast(file, &config()?, json),
        Commands::Allocate { file, budget } => {
            commands::cmd_allocate(file, &config()?, *budget, json)
        }
        Commands::Analyze { file, budget } => {
            commands::cmd_analyze(file, &config()?, *budget, json)
        }
        Commands::Sample { output } => commands::cmd_sample(output.as_deref()),
    }
}
