//! spendcast Core Library
//!
//! Batch analysis of an expense dataset:
//! - Dataset loading (CSV, optionally spreadsheets) and normalization
//! - Monthly aggregation, category, payment method and income/expense summaries
//! - Linear trend forecast of next month's total spend
//! - Amount -> category decision tree model
//! - Budget allocation from the model's predicted category frequencies
//!
//! Everything runs synchronously on one in-memory dataset. Fitted models and
//! results are immutable once built and hold no shared state.

pub mod aggregate;
pub mod allocate;
pub mod analysis;
pub mod classifier;
pub mod config;
pub mod error;
pub mod forecast;
pub mod import;
pub mod models;
pub mod normalize;
pub mod sample;
pub mod split;

pub use aggregate::{
    aggregate_monthly, cash_flow, category_payment_totals, category_totals, CashFlowSummary,
    CategoryPaymentTotal, CategoryTotal, MonthTotal, MonthlyBucket, MonthlyCategoryTotal,
    TemporalSummary,
};
pub use allocate::{allocate_budget, AllocationDistribution, AllocationShare};
pub use analysis::{AllocationOutcome, AnalysisReport, Analyzer, ForecastOutcome};
pub use classifier::{CategoryModel, CategoryVocabulary, ModelDiagnostics};
pub use config::{AnalysisConfig, ClassifierConfig, ForecastConfig};
pub use error::{Error, Result};
pub use forecast::{ChartPoint, FitDiagnostics, Forecast, LinearRegression, PointKind, TrendForecaster};
pub use models::{
    Cell, CleanDataset, FlowMarks, MonthKey, NormalizationStats, RawDataset, SourceColumns,
    Transaction,
};
pub use normalize::{normalize, normalize_category};
