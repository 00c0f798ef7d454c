//! Data models for spendcast

use std::fmt;
use std::str::FromStr;

use chrono::{Datelike, NaiveDate};
use serde::{Deserialize, Serialize};

/// Column holding the transaction amount
pub const AMOUNT_COLUMN: &str = "Amount";
/// Column holding the free-text category label
pub const CATEGORY_COLUMN: &str = "Category";
/// Optional column holding the transaction date
pub const DATE_COLUMN: &str = "Date";
/// Optional column naming how the transaction was paid
pub const PAYMENT_METHOD_COLUMN: &str = "Payment_Method";
/// Optional marker column; rows reading `Income` count as income
pub const INCOME_COLUMN: &str = "Income";
/// Optional marker column; rows reading `Expense` count as expenses
pub const EXPENSE_COLUMN: &str = "Expense";

/// Label given to rows with a missing or blank category
pub const UNCATEGORIZED: &str = "Uncategorized";

/// A single cell of raw tabular input
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    /// Numeric cell (spreadsheet input only)
    Number(f64),
    /// Date cell (spreadsheet input only)
    Date(NaiveDate),
}

impl Cell {
    /// Build a cell from a text field, treating blank fields as empty
    pub fn from_text(s: &str) -> Self {
        if s.trim().is_empty() {
            Cell::Empty
        } else {
            Cell::Text(s.to_string())
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Cell::Empty)
    }
}

static EMPTY_CELL: Cell = Cell::Empty;

/// Raw tabular dataset as supplied by a loader, before any cleaning
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawDataset {
    headers: Vec<String>,
    rows: Vec<Vec<Cell>>,
}

impl RawDataset {
    /// Create a dataset from headers and rows.
    ///
    /// Header names are trimmed. Short rows are padded with empty cells.
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Cell>>) -> Self {
        let headers: Vec<String> = headers.into_iter().map(|h| h.trim().to_string()).collect();
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                if row.len() < width {
                    row.resize(width, Cell::Empty);
                }
                row
            })
            .collect();
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[Vec<Cell>] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Index of a column by exact (trimmed) header name
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.column_index(name).is_some()
    }

    /// Iterate over one column's cells
    pub fn column(&self, index: usize) -> impl Iterator<Item = &Cell> + '_ {
        self.rows
            .iter()
            .map(move |row| row.get(index).unwrap_or(&EMPTY_CELL))
    }
}

/// A cleaned transaction record
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
    pub category: String,
    pub amount: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "FlowMarks::is_unmarked")]
    pub flow: FlowMarks,
}

/// Income/expense markers read from the `Income` and `Expense` columns.
///
/// The columns are independent, so a row may carry both marks or neither.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowMarks {
    pub income: bool,
    pub expense: bool,
}

impl FlowMarks {
    pub fn is_unmarked(&self) -> bool {
        !self.income && !self.expense
    }
}

/// Which optional columns the source dataset carried
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceColumns {
    pub date: bool,
    pub payment_method: bool,
    pub income: bool,
    pub expense: bool,
}

/// Counters gathered while cleaning a dataset
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NormalizationStats {
    pub rows: usize,
    /// Amounts replaced with the column mean (missing or invalid)
    pub imputed_amounts: usize,
    /// Amounts that were present but not numeric
    pub invalid_amounts: usize,
    /// Rows whose category was missing or blank
    pub uncategorized: usize,
    /// Rows with a date value that could not be parsed
    pub unparsed_dates: usize,
    /// Mean used for imputation (None if nothing was imputed)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount_mean: Option<f64>,
}

/// Output of the dataset normalizer
#[derive(Debug, Clone, PartialEq)]
pub struct CleanDataset {
    records: Vec<Transaction>,
    columns: SourceColumns,
    stats: NormalizationStats,
}

impl CleanDataset {
    pub(crate) fn new(
        records: Vec<Transaction>,
        columns: SourceColumns,
        stats: NormalizationStats,
    ) -> Self {
        Self {
            records,
            columns,
            stats,
        }
    }

    pub fn records(&self) -> &[Transaction] {
        &self.records
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether the source had a `Date` column at all
    pub fn has_date_column(&self) -> bool {
        self.columns.date
    }

    /// Whether the source had a `Payment_Method` column
    pub fn has_payment_method_column(&self) -> bool {
        self.columns.payment_method
    }

    /// Whether the source had an `Income` or `Expense` marker column
    pub fn has_flow_columns(&self) -> bool {
        self.columns.income || self.columns.expense
    }

    pub fn columns(&self) -> SourceColumns {
        self.columns
    }

    pub fn stats(&self) -> &NormalizationStats {
        &self.stats
    }

    /// The amount column, in row order
    pub fn amounts(&self) -> Vec<f64> {
        self.records.iter().map(|r| r.amount).collect()
    }

    /// Records that carry a valid date
    pub fn dated(&self) -> impl Iterator<Item = &Transaction> + '_ {
        self.records.iter().filter(|r| r.date.is_some())
    }

    /// First `n` records, for display
    pub fn preview(&self, n: usize) -> &[Transaction] {
        &self.records[..n.min(self.records.len())]
    }
}

/// Calendar month key (year, month)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MonthKey {
    pub year: i32,
    pub month: u32,
}

impl MonthKey {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn from_date(date: NaiveDate) -> Self {
        Self {
            year: date.year(),
            month: date.month(),
        }
    }

    /// First day of the month
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

impl FromStr for MonthKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (year, month) = s
            .split_once('-')
            .ok_or_else(|| format!("Invalid month: {} (expected YYYY-MM)", s))?;
        let year: i32 = year
            .parse()
            .map_err(|_| format!("Invalid year in month: {}", s))?;
        let month: u32 = month
            .parse()
            .map_err(|_| format!("Invalid month number in: {}", s))?;
        if !(1..=12).contains(&month) {
            return Err(format!("Month out of range: {}", s));
        }
        Ok(Self { year, month })
    }
}

impl Serialize for MonthKey {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for MonthKey {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_raw_dataset_pads_short_rows() {
        let raw = RawDataset::new(
            vec![" Amount ".into(), "Category".into()],
            vec![vec![Cell::from_text("10")]],
        );
        assert_eq!(raw.headers(), &["Amount".to_string(), "Category".to_string()]);
        assert_eq!(raw.rows()[0].len(), 2);
        assert!(raw.rows()[0][1].is_empty());
        assert_eq!(raw.column_index("Category"), Some(1));
        assert!(!raw.has_column("category"));
    }

    #[test]
    fn test_cell_from_text() {
        assert_eq!(Cell::from_text("   "), Cell::Empty);
        assert_eq!(Cell::from_text(" 5 "), Cell::Text(" 5 ".into()));
    }

    #[test]
    fn test_month_key_ordering_and_display() {
        let dec = MonthKey::new(2023, 12);
        let jan = MonthKey::new(2024, 1);
        assert!(dec < jan);
        assert_eq!(jan.to_string(), "2024-01");
        assert_eq!("2024-01".parse::<MonthKey>().unwrap(), jan);
        assert!("2024-13".parse::<MonthKey>().is_err());
    }

    #[test]
    fn test_month_key_serializes_as_string() {
        let json = serde_json::to_string(&MonthKey::new(2024, 3)).unwrap();
        assert_eq!(json, "\"2024-03\"");
    }
}
