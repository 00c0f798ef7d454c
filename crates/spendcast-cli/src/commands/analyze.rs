//! Analyze command: the full report

use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{AllocationOutcome, AnalysisConfig, Analyzer};

use super::allocate::print_allocation;
use super::clean::{print_preview, print_stats};
use super::forecast::print_forecast;
use super::summary::{print_category_totals, print_month_totals, print_optional_breakdowns};
use super::{load_dataset, print_json};

pub fn cmd_analyze(
    file: &Path,
    config: &AnalysisConfig,
    budget: Option<f64>,
    json: bool,
) -> Result<()> {
    let raw = load_dataset(file)?;
    let report = Analyzer::new(config.clone())
        .run(&raw, budget)
        .with_context(|| format!("Failed to analyze {}", file.display()))?;

    if json {
        return print_json(&report);
    }

    println!();
    println!("╭─────────────────────────────────────────╮");
    println!("│         💰 spendcast Analysis           │");
    println!("╰─────────────────────────────────────────╯");
    println!("   File: {}", file.display());

    println!();
    println!("🧹 Cleaning");
    println!("   ─────────────────────────────────────────────────────────────");
    print_stats(&report.normalization);
    println!();
    print_preview(&report.preview);

    println!();
    println!("📊 Spending by Category");
    println!("   ─────────────────────────────────────────────────────────────");
    print_category_totals(&report.category_totals);
    print_optional_breakdowns(
        report.category_payment_totals.as_deref(),
        report.cash_flow.as_ref(),
    );

    println!();
    println!("📈 Monthly Trend");
    println!("   ─────────────────────────────────────────────────────────────");
    print_month_totals(&report.monthly_totals);

    println!();
    println!("🔮 Forecast");
    println!("   ─────────────────────────────────────────────────────────────");
    print_forecast(&report.forecast);

    println!();
    println!("💸 Budget Allocation");
    println!("   ─────────────────────────────────────────────────────────────");
    match &report.allocation {
        AllocationOutcome::Available {
            distribution,
            model,
        } => print_allocation(distribution, model),
        AllocationOutcome::Unavailable { reason } => {
            println!("   ⚠️  Allocation unavailable: {}", reason);
        }
        AllocationOutcome::Skipped => {
            println!("   💡 Tip: Pass --budget <amount> to split a budget across categories");
        }
    }

    println!();
    Ok(())
}
