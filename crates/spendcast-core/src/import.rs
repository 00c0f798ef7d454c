//! Dataset loaders and value parsers
//!
//! Loaders turn a CSV (or, with the `xlsx` feature, a spreadsheet) into a
//! [`RawDataset`]. No cleaning happens here; the normalizer owns that.

use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::{ByteRecord, ReaderBuilder};
use tracing::debug;

use crate::error::{Error, Result};
use crate::models::{Cell, RawDataset};

/// Decode a CSV field as UTF-8, falling back to Latin-1 for legacy exports
fn decode_field(bytes: &[u8]) -> String {
    match std::str::from_utf8(bytes) {
        Ok(s) => s.to_string(),
        Err(_) => bytes.iter().map(|&b| b as char).collect(),
    }
}

fn decode_record(record: &ByteRecord) -> Vec<String> {
    record.iter().map(decode_field).collect()
}

/// Read a CSV dataset with a header row
pub fn read_csv<R: Read>(reader: R) -> Result<RawDataset> {
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(reader);

    let mut headers = decode_record(rdr.byte_headers()?);
    // Strip a UTF-8 byte order mark from the first header
    if let Some(first) = headers.first_mut() {
        if let Some(stripped) = first.strip_prefix('\u{feff}') {
            *first = stripped.to_string();
        }
    }

    let mut rows = Vec::new();
    for result in rdr.byte_records() {
        let record = result?;
        let row = decode_record(&record)
            .iter()
            .map(|field| Cell::from_text(field))
            .collect();
        rows.push(row);
    }

    debug!("Read {} CSV rows with {} columns", rows.len(), headers.len());
    Ok(RawDataset::new(headers, rows))
}

/// Read a dataset from disk, choosing the loader from the file extension
pub fn read_path(path: &Path) -> Result<RawDataset> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "csv" | "txt" | "" => read_csv(File::open(path)?),
        #[cfg(feature = "xlsx")]
        "xlsx" | "xlsm" | "xls" | "ods" => read_spreadsheet(path),
        other => Err(Error::InvalidData(format!(
            "Unsupported dataset format: .{} (expected .csv{})",
            other,
            if cfg!(feature = "xlsx") {
                ", .xlsx, .xls or .ods"
            } else {
                ""
            }
        ))),
    }
}

/// Read the first worksheet of a spreadsheet; the first row holds headers
#[cfg(feature = "xlsx")]
pub fn read_spreadsheet(path: &Path) -> Result<RawDataset> {
    use calamine::{Data, Reader};

    let mut workbook = calamine::open_workbook_auto(path)
        .map_err(|e| Error::Spreadsheet(format!("Failed to open {}: {}", path.display(), e)))?;

    let sheet = workbook
        .sheet_names()
        .first()
        .cloned()
        .ok_or_else(|| Error::Spreadsheet("Workbook has no worksheets".into()))?;

    let range = workbook
        .worksheet_range(&sheet)
        .map_err(|e| Error::Spreadsheet(format!("Failed to read sheet {}: {}", sheet, e)))?;

    let mut rows_iter = range.rows();
    let headers: Vec<String> = match rows_iter.next() {
        Some(row) => row.iter().map(|c| c.to_string()).collect(),
        None => return Ok(RawDataset::default()),
    };

    let rows: Vec<Vec<Cell>> = rows_iter
        .map(|row| {
            row.iter()
                .map(|cell| match cell {
                    Data::Empty => Cell::Empty,
                    Data::Int(i) => Cell::Number(*i as f64),
                    Data::Float(f) => Cell::Number(*f),
                    Data::DateTime(dt) => excel_serial_to_date(dt.as_f64())
                        .map(Cell::Date)
                        .unwrap_or(Cell::Empty),
                    Data::String(s) | Data::DateTimeIso(s) => Cell::from_text(s),
                    other => Cell::from_text(&other.to_string()),
                })
                .collect()
        })
        .collect();

    debug!(
        "Read {} rows from sheet '{}' in {}",
        rows.len(),
        sheet,
        path.display()
    );
    Ok(RawDataset::new(headers, rows))
}

/// Convert an Excel serial day number to a date
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() {
        return None;
    }
    // Excel epoch is 1899-12-30 (accounting for the 1900 leap year bug)
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Parse a date string in one of the common export formats.
///
/// Returns None when no format matches.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    let formats = [
        "%Y-%m-%d", // 2024-01-15
        "%m/%d/%Y", // 01/15/2024
        "%m/%d/%y", // 01/15/24
        "%m-%d-%Y", // 01-15-2024
        "%d/%m/%Y", // 15/01/2024 (European)
        "%d.%m.%Y", // 15.01.2024
        "%Y/%m/%d", // 2024/01/15
        "%Y.%m.%d", // 2024.01.15
        "%d %b %Y", // 15 Jan 2024
        "%b %d, %Y", // Jan 15, 2024
        "%B %d, %Y", // January 15, 2024
        "%d-%b-%Y", // 15-Jan-2024
    ];

    for fmt in formats {
        if let Ok(date) = NaiveDate::parse_from_str(s, fmt) {
            return Some(date);
        }
    }

    let datetime_formats = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%m/%d/%Y %H:%M"];
    for fmt in datetime_formats {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt.date());
        }
    }

    // RFC 3339 with offset, e.g. 2024-01-15T10:00:00+09:00
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    // Year-month only (2024-01) maps to the first of the month
    NaiveDate::parse_from_str(&format!("{}-01", s), "%Y-%m-%d").ok()
}

/// Parse an amount string, handling currency symbols and thousands separators.
///
/// Parenthesized values are negative. Returns None for non-numeric input.
pub fn parse_amount(s: &str) -> Option<f64> {
    let cleaned: String = s
        .trim()
        .replace(['$', '₩', '€', '£', '₹', ',', ' '], "")
        .replace('(', "-")
        .replace(')', "");

    cleaned.parse::<f64>().ok().filter(|v| v.is_finite())
}
