//! CLI argument definitions using clap
//!
//! This module contains the clap structs for parsing CLI arguments.
//! The actual command implementations are in the `commands` module.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// spendcast - Clean, summarize and forecast an expense dataset
#[derive(Parser)]
#[command(name = "spendcast")]
#[command(about = "Expense dataset analyzer: cleaning, trends, forecast and budget allocation", long_about = None)]
#[command(version)]
pub struct Cli {
    /// Analysis config file (TOML)
    ///
    /// Defaults to the per-user override if one exists, otherwise the
    /// built-in defaults.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Print results as JSON instead of tables
    #[arg(long, global = true)]
    pub json: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Clean a dataset and show a preview with cleaning stats
    Clean {
        /// Expense file (.csv, or .xlsx/.xls/.ods)
        #[arg(short, long)]
        file: PathBuf,

        /// Preview rows to show (defaults to the config value)
        #[arg(short, long)]
        rows: Option<usize>,
    },

    /// Category totals and the monthly spending trend
    Summary {
        /// Expense file (.csv, or .xlsx/.xls/.ods)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Forecast next month's total spend
    Forecast {
        /// Expense file (.csv, or .xlsx/.xls/.ods)
        #[arg(short, long)]
        file: PathBuf,
    },

    /// Split a budget across categories
    Allocate {
        /// Expense file (.csv, or .xlsx/.xls/.ods)
        #[arg(short, long)]
        file: PathBuf,

        /// Budget to allocate
        #[arg(short, long)]
        budget: f64,
    },

    /// Run the full analysis
    Analyze {
        /// Expense file (.csv, or .xlsx/.xls/.ods)
        #[arg(short, long)]
        file: PathBuf,

        /// Budget to allocate (allocation is skipped without one)
        #[arg(short, long)]
        budget: Option<f64>,
    },

    /// Write the built-in sample dataset to disk
    Sample {
        /// Output path (defaults to sample_expense_dataset.csv)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}
