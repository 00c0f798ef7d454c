//! Embedded sample dataset
//!
//! Six months of household expenses with the usual mess: inconsistent
//! category casing, a blank category, missing and non-numeric amounts and
//! one unparseable date.

use crate::error::Result;
use crate::import::read_csv;
use crate::models::RawDataset;

pub const SAMPLE_CSV: &str = include_str!("../data/sample_expenses.csv");

/// Suggested file name when writing the sample to disk
pub const SAMPLE_FILE_NAME: &str = "sample_expense_dataset.csv";

/// The sample parsed into a raw dataset
pub fn sample_dataset() -> Result<RawDataset> {
    read_csv(SAMPLE_CSV.as_bytes())
}
