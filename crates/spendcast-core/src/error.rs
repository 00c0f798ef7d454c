//! Error types for spendcast

use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Dataset is missing required column(s): {}", missing.join(", "))]
    Schema { missing: Vec<String> },

    #[error("Not enough monthly data to forecast: need {required} months, found {found}")]
    InsufficientData { required: usize, found: usize },

    #[error("Category model has not been fitted")]
    UnfittedModel,

    #[error("Cannot fit category model: no categories in dataset")]
    EmptyVocabulary,

    #[error("Cannot allocate budget: historical dataset is empty")]
    EmptyHistory,

    #[error("Invalid data: {0}")]
    InvalidData(String),

    #[error("Config error: {0}")]
    Config(String),

    #[error("CSV parsing error: {0}")]
    Csv(#[from] csv::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[cfg(feature = "xlsx")]
    #[error("Spreadsheet error: {0}")]
    Spreadsheet(String),
}

impl Error {
    /// Whether the error only disables an optional feature (forecast) rather
    /// than invalidating the whole run
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Error::InsufficientData { .. })
    }
}

pub type Result<T> = std::result::Result<T, Error>;
