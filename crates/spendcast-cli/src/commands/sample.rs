//! Sample command: write the built-in dataset to disk

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use spendcast_core::sample::{SAMPLE_CSV, SAMPLE_FILE_NAME};

pub fn cmd_sample(output: Option<&Path>) -> Result<()> {
    let path = output
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(SAMPLE_FILE_NAME));

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    fs::write(&path, SAMPLE_CSV).with_context(|| format!("Failed to write {}", path.display()))?;

    let rows = SAMPLE_CSV.lines().count().saturating_sub(1);
    println!("✅ Wrote sample dataset ({} rows) to {}", rows, path.display());
    println!();
    println!("Next steps:");
    println!("  1. Inspect cleaning: spendcast clean --file {}", path.display());
    println!(
        "  2. Full report:      spendcast analyze --file {} --budget 2000",
        path.display()
    );

    Ok(())
}
