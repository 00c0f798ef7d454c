//! Clean command: normalized preview and cleaning stats

use std::path::Path;

use anyhow::Result;
use spendcast_core::{AnalysisConfig, NormalizationStats, Transaction};

use super::{format_amount, load_clean_dataset, print_json, truncate};

pub fn cmd_clean(
    file: &Path,
    config: &AnalysisConfig,
    rows: Option<usize>,
    json: bool,
) -> Result<()> {
    let dataset = load_clean_dataset(file)?;
    let preview = dataset.preview(rows.unwrap_or(config.preview_rows));

    if json {
        return print_json(&serde_json::json!({
            "normalization": dataset.stats(),
            "preview": preview,
        }));
    }

    println!();
    println!("🧹 Cleaned Dataset");
    println!("   File: {}", file.display());
    println!("   ─────────────────────────────────────────────────────────────");
    print_stats(dataset.stats());

    if !dataset.has_date_column() {
        println!("   💡 Tip: Add a 'Date' column to enable trend and forecast analysis");
    }

    println!();
    print_preview(preview);
    Ok(())
}

pub(crate) fn print_stats(stats: &NormalizationStats) {
    println!("   Rows:                 {}", stats.rows);
    println!("   Imputed amounts:      {}", stats.imputed_amounts);
    if stats.invalid_amounts > 0 {
        println!("     (non-numeric):      {}", stats.invalid_amounts);
    }
    if let Some(mean) = stats.amount_mean {
        println!("   Imputation mean:      {}", format_amount(mean));
    }
    println!("   Uncategorized:        {}", stats.uncategorized);
    if stats.unparsed_dates > 0 {
        println!("   ⚠️  Unparsed dates:    {}", stats.unparsed_dates);
    }
}

pub(crate) fn print_preview(preview: &[Transaction]) {
    if preview.is_empty() {
        println!("   No rows to preview.");
        return;
    }

    println!("   {:10} │ {:25} │ {:>12}", "Date", "Category", "Amount");
    println!("   ───────────┼───────────────────────────┼─────────────");
    for tx in preview {
        let date = tx
            .date
            .map(|d| d.to_string())
            .unwrap_or_else(|| "-".to_string());
        println!(
            "   {:10} │ {:25} │ {:>12}",
            date,
            truncate(&tx.category, 25),
            format_amount(tx.amount)
        );
    }
}
