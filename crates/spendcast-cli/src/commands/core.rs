//! Shared command utilities
//!
//! This module contains:
//! - `load_config` - Resolve the analysis config (explicit path, override, defaults)
//! - `load_dataset` / `load_clean_dataset` - Read and normalize an input file
//! - `print_json` - Pretty JSON on stdout

use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use spendcast_core::{import::read_path, normalize, AnalysisConfig, CleanDataset, RawDataset};

/// Load config from an explicit path, or the per-user override, or the defaults
pub fn load_config(path: Option<&Path>) -> Result<AnalysisConfig> {
    match path {
        Some(path) => AnalysisConfig::from_path(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => AnalysisConfig::load().context("Failed to load analysis config"),
    }
}

/// Read an expense file into a raw dataset
pub fn load_dataset(file: &Path) -> Result<RawDataset> {
    let raw = read_path(file).with_context(|| format!("Failed to read {}", file.display()))?;
    tracing::debug!(rows = raw.len(), columns = raw.headers().len(), "Loaded dataset");
    Ok(raw)
}

/// Read and normalize an expense file
pub fn load_clean_dataset(file: &Path) -> Result<CleanDataset> {
    let raw = load_dataset(file)?;
    normalize(&raw).with_context(|| format!("Failed to clean {}", file.display()))
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value).context("Failed to serialize output")?;
    println!("{}", json);
    Ok(())
}

/// `$1,234.56` style amount
pub fn format_amount(amount: f64) -> String {
    let sign = if amount < 0.0 { "-" } else { "" };
    let cents = (amount.abs() * 100.0).round() as u64;
    let whole = (cents / 100).to_string();

    let mut grouped = String::new();
    for (i, c) in whole.chars().enumerate() {
        if i > 0 && (whole.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }

    format!("{}${}.{:02}", sign, grouped, cents % 100)
}
