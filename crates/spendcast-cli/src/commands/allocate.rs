//! Allocate command: split a budget across categories

use std::path::Path;

use anyhow::{Context, Result};
use spendcast_core::{
    allocate_budget, AllocationDistribution, AllocationOutcome, AnalysisConfig, CategoryModel,
    ModelDiagnostics,
};

use super::{format_amount, load_clean_dataset, print_json, truncate};

pub fn cmd_allocate(file: &Path, config: &AnalysisConfig, budget: f64, json: bool) -> Result<()> {
    if !budget.is_finite() || budget < 0.0 {
        anyhow::bail!("Budget must be a non-negative number, got {}", budget);
    }

    let dataset = load_clean_dataset(file)?;
    let model = CategoryModel::fitted(config.classifier.clone(), dataset.records())
        .context("Failed to fit category model")?;
    let distribution = allocate_budget(&model, &dataset.amounts(), budget)
        .context("Failed to allocate budget")?;
    let diagnostics = model.diagnostics()?.clone();

    if json {
        return print_json(&AllocationOutcome::Available {
            distribution,
            model: diagnostics,
        });
    }

    println!();
    println!("💸 Budget Allocation");
    println!("   File: {}", file.display());
    println!("   ─────────────────────────────────────────────────────────────");
    print_allocation(&distribution, &diagnostics);
    Ok(())
}

pub(crate) fn print_allocation(distribution: &AllocationDistribution, model: &ModelDiagnostics) {
    println!(
        "   Budget: {} across {} categories ({} historical rows)",
        format_amount(distribution.budget),
        distribution.shares.len(),
        distribution.history_rows
    );
    println!();
    println!(
        "   {:25} │ {:>12} │ {:>6} │ {:>5}",
        "Category", "Amount", "%", "Rows"
    );
    println!("   ──────────────────────────┼──────────────┼────────┼───────");
    for share in &distribution.shares {
        println!(
            "   {:25} │ {:>12} │ {:>5.1}% │ {:>5}",
            truncate(&share.category, 25),
            format_amount(share.amount),
            share.fraction * 100.0,
            share.predicted_count
        );
    }

    let omitted = model.categories.saturating_sub(distribution.shares.len());
    if omitted > 0 {
        println!();
        println!(
            "   💡 {} known {} never predicted and got no allocation",
            omitted,
            if omitted == 1 { "category was" } else { "categories were" }
        );
    }

    println!();
    print!(
        "   Model: {} categories, depth {}, {} leaves",
        model.categories, model.tree_depth, model.leaves
    );
    match model.held_out_accuracy {
        Some(acc) => println!(
            ", {:.1}% accuracy on {} held-out rows",
            acc * 100.0,
            model.held_out_size
        ),
        None => println!(),
    }
}
