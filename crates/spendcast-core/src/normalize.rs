//! Dataset normalizer
//!
//! Validates the required columns and produces a [`CleanDataset`] where every
//! row has a canonical category and a finite amount.

use tracing::{debug, warn};

use crate::error::{Error, Result};
use crate::import::{parse_amount, parse_date};
use crate::models::{
    Cell, CleanDataset, FlowMarks, NormalizationStats, RawDataset, SourceColumns, Transaction,
    AMOUNT_COLUMN, CATEGORY_COLUMN, DATE_COLUMN, EXPENSE_COLUMN, INCOME_COLUMN,
    PAYMENT_METHOD_COLUMN, UNCATEGORIZED,
};

/// Canonicalize a category label: trim, then title case.
///
/// Missing or blank labels become [`UNCATEGORIZED`]. Idempotent.
pub fn normalize_category(raw: Option<&str>) -> String {
    match raw.map(str::trim) {
        Some(s) if !s.is_empty() => title_case(s),
        _ => UNCATEGORIZED.to_string(),
    }
}

/// Uppercase the first letter of every run of letters, lowercase the rest
fn title_case(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut in_word = false;
    for c in s.chars() {
        if c.is_alphabetic() {
            if in_word {
                out.extend(c.to_lowercase());
            } else {
                // Multi-char uppercase forms (ß -> SS) keep only the lead capital
                let mut upper = c.to_uppercase();
                if let Some(first) = upper.next() {
                    out.push(first);
                }
                out.extend(upper.flat_map(char::to_lowercase));
            }
            in_word = true;
        } else {
            out.push(c);
            in_word = false;
        }
    }
    out
}

fn cell_amount(cell: &Cell) -> (Option<f64>, bool) {
    match cell {
        Cell::Empty => (None, false),
        Cell::Number(n) if n.is_finite() => (Some(*n), false),
        Cell::Text(s) => match parse_amount(s) {
            Some(v) => (Some(v), false),
            None => (None, true),
        },
        Cell::Number(_) | Cell::Date(_) => (None, true),
    }
}

/// Label text of a cell. Whole numbers print without a fraction (`5`, not `5.0`).
fn cell_label(cell: &Cell) -> Option<String> {
    match cell {
        Cell::Empty => None,
        Cell::Text(s) => Some(s.clone()),
        Cell::Number(n) => Some(n.to_string()),
        Cell::Date(d) => Some(d.to_string()),
    }
}

/// Trimmed, title-cased payment method; blank is None
fn cell_payment_method(cell: &Cell) -> Option<String> {
    cell_label(cell)
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .map(|s| title_case(&s))
}

/// Whether a marker cell reads `marker` (trimmed, case-insensitive)
fn cell_marks(cell: &Cell, marker: &str) -> bool {
    matches!(cell, Cell::Text(s) if s.trim().eq_ignore_ascii_case(marker))
}

/// Arithmetic mean that stays finite for any finite inputs
fn finite_mean(values: &[f64]) -> f64 {
    let n = values.len() as f64;
    let sum: f64 = values.iter().sum();
    if sum.is_finite() {
        sum / n
    } else {
        // The plain sum overflowed; each x / n is bounded by the largest |x|
        values.iter().map(|x| x / n).sum()
    }
}

fn cell_date(cell: &Cell) -> Option<chrono::NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Text(s) => parse_date(s),
        Cell::Empty | Cell::Number(_) => None,
    }
}

/// Clean a raw dataset.
///
/// Fails with [`Error::Schema`] when `Amount` or `Category` is absent.
pub fn normalize(raw: &RawDataset) -> Result<CleanDataset> {
    let amount_idx = raw.column_index(AMOUNT_COLUMN);
    let category_idx = raw.column_index(CATEGORY_COLUMN);

    let (amount_idx, category_idx) = match (amount_idx, category_idx) {
        (Some(a), Some(c)) => (a, c),
        _ => {
            let missing = [(AMOUNT_COLUMN, amount_idx), (CATEGORY_COLUMN, category_idx)]
                .into_iter()
                .filter(|(_, idx)| idx.is_none())
                .map(|(name, _)| name.to_string())
                .collect();
            return Err(Error::Schema { missing });
        }
    };
    let date_idx = raw.column_index(DATE_COLUMN);
    let payment_idx = raw.column_index(PAYMENT_METHOD_COLUMN);
    let income_idx = raw.column_index(INCOME_COLUMN);
    let expense_idx = raw.column_index(EXPENSE_COLUMN);

    let mut stats = NormalizationStats {
        rows: raw.len(),
        ..Default::default()
    };

    // Coerce first; the mean is taken over present values only
    let amounts: Vec<Option<f64>> = raw
        .column(amount_idx)
        .map(|cell| {
            let (value, invalid) = cell_amount(cell);
            if invalid {
                stats.invalid_amounts += 1;
            }
            value
        })
        .collect();

    let present: Vec<f64> = amounts.iter().flatten().copied().collect();
    let missing = amounts.len() - present.len();
    let mean = if present.is_empty() {
        if missing > 0 {
            warn!(
                "No numeric {} values to impute from; filling {} rows with 0",
                AMOUNT_COLUMN, missing
            );
        }
        0.0
    } else {
        finite_mean(&present)
    };
    if missing > 0 {
        stats.imputed_amounts = missing;
        stats.amount_mean = Some(mean);
        debug!("Imputed {} missing amounts with mean {:.2}", missing, mean);
    }

    let mut records = Vec::with_capacity(raw.len());
    for (row, amount) in raw.rows().iter().zip(amounts) {
        let raw_category = cell_label(&row[category_idx]);
        let category = normalize_category(raw_category.as_deref());
        if raw_category.as_deref().map_or(true, |s| s.trim().is_empty()) {
            stats.uncategorized += 1;
        }

        let date = date_idx.and_then(|idx| {
            let cell = &row[idx];
            let parsed = cell_date(cell);
            if parsed.is_none() && !cell.is_empty() {
                stats.unparsed_dates += 1;
            }
            parsed
        });

        records.push(Transaction {
            date,
            category,
            amount: amount.unwrap_or(mean),
            payment_method: payment_idx.and_then(|idx| cell_payment_method(&row[idx])),
            flow: FlowMarks {
                income: income_idx.map_or(false, |idx| cell_marks(&row[idx], INCOME_COLUMN)),
                expense: expense_idx.map_or(false, |idx| cell_marks(&row[idx], EXPENSE_COLUMN)),
            },
        });
    }

    if stats.unparsed_dates > 0 {
        warn!(
            "{} rows have unparseable dates and are excluded from trends",
            stats.unparsed_dates
        );
    }
    debug!(
        "Normalized {} rows ({} uncategorized, {} invalid amounts)",
        stats.rows, stats.uncategorized, stats.invalid_amounts
    );

    let columns = SourceColumns {
        date: date_idx.is_some(),
        payment_method: payment_idx.is_some(),
        income: income_idx.is_some(),
        expense: expense_idx.is_some(),
    };
    Ok(CleanDataset::new(records, columns, stats))
}
