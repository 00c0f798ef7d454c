//! End-to-end analysis pipeline
//!
//! Normalizer -> Aggregator -> {Forecaster, Category model} -> Allocator.
//!
//! Normalization errors abort the run. Forecast and allocation are optional:
//! their failures are recorded in the report as `unavailable` with a reason.

use serde::{Deserialize, Serialize};

use crate::aggregate::{
    aggregate_monthly, cash_flow, category_payment_totals, category_totals, CashFlowSummary,
    CategoryPaymentTotal, CategoryTotal, MonthTotal, MonthlyCategoryTotal,
};
use crate::allocate::{allocate_budget, AllocationDistribution};
use crate::classifier::{CategoryModel, ModelDiagnostics};
use crate::config::AnalysisConfig;
use crate::error::{Error, Result};
use crate::forecast::{Forecast, TrendForecaster};
use crate::models::{CleanDataset, NormalizationStats, RawDataset, Transaction};
use crate::normalize::normalize;

/// Result of the optional forecast stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum ForecastOutcome {
    Available(Forecast),
    Unavailable { reason: String },
}

impl ForecastOutcome {
    pub fn forecast(&self) -> Option<&Forecast> {
        match self {
            ForecastOutcome::Available(f) => Some(f),
            ForecastOutcome::Unavailable { .. } => None,
        }
    }
}

/// Result of the optional allocation stage
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum AllocationOutcome {
    Available {
        distribution: AllocationDistribution,
        model: ModelDiagnostics,
    },
    Unavailable {
        reason: String,
    },
    /// No budget was requested
    Skipped,
}

impl AllocationOutcome {
    pub fn distribution(&self) -> Option<&AllocationDistribution> {
        match self {
            AllocationOutcome::Available { distribution, .. } => Some(distribution),
            _ => None,
        }
    }
}

/// Everything the rendering side needs from one run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub normalization: NormalizationStats,
    pub preview: Vec<Transaction>,
    pub category_totals: Vec<CategoryTotal>,
    pub monthly_by_category: Vec<MonthlyCategoryTotal>,
    pub monthly_totals: Vec<MonthTotal>,
    /// Present only when the source had a `Payment_Method` column
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category_payment_totals: Option<Vec<CategoryPaymentTotal>>,
    /// Present only when the source had `Income` / `Expense` columns
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cash_flow: Option<CashFlowSummary>,
    pub forecast: ForecastOutcome,
    pub allocation: AllocationOutcome,
}

/// Runs the full pipeline with one configuration
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalysisConfig,
}

impl Analyzer {
    pub fn new(config: AnalysisConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &AnalysisConfig {
        &self.config
    }

    /// Normalize `raw` and run every stage.
    ///
    /// `budget` of None skips allocation.
    pub fn run(&self, raw: &RawDataset, budget: Option<f64>) -> Result<AnalysisReport> {
        let dataset = normalize(raw)?;
        tracing::info!(
            rows = dataset.len(),
            dated = dataset.dated().count(),
            "Dataset normalized"
        );
        Ok(self.run_clean(&dataset, budget))
    }

    /// Run the post-normalization stages on an already cleaned dataset
    pub fn run_clean(&self, dataset: &CleanDataset, budget: Option<f64>) -> AnalysisReport {
        let temporal = aggregate_monthly(dataset);

        AnalysisReport {
            normalization: dataset.stats().clone(),
            preview: dataset.preview(self.config.preview_rows).to_vec(),
            category_totals: category_totals(dataset),
            monthly_by_category: temporal.category_rows(),
            monthly_totals: temporal.month_totals(),
            category_payment_totals: category_payment_totals(dataset),
            cash_flow: cash_flow(dataset),
            forecast: self.forecast_stage(dataset, &temporal.month_totals()),
            allocation: match budget {
                Some(budget) => self.allocation_stage(dataset, budget),
                None => AllocationOutcome::Skipped,
            },
        }
    }

    fn forecast_stage(&self, dataset: &CleanDataset, totals: &[MonthTotal]) -> ForecastOutcome {
        if !dataset.has_date_column() {
            tracing::info!("No Date column; trend and forecast disabled");
            return ForecastOutcome::Unavailable {
                reason: "Add a 'Date' column to enable trend and forecast analysis".to_string(),
            };
        }

        match TrendForecaster::new(self.config.forecast.clone()).forecast(totals) {
            Ok(forecast) => ForecastOutcome::Available(forecast),
            Err(e) => {
                tracing::warn!(error = %e, "Forecast unavailable");
                ForecastOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }

    fn allocation_stage(&self, dataset: &CleanDataset, budget: f64) -> AllocationOutcome {
        if dataset.is_empty() {
            tracing::warn!("Allocation unavailable: no historical rows");
            return AllocationOutcome::Unavailable {
                reason: Error::EmptyHistory.to_string(),
            };
        }

        let result = CategoryModel::fitted(self.config.classifier.clone(), dataset.records())
            .and_then(|model| {
                let distribution = allocate_budget(&model, &dataset.amounts(), budget)?;
                let diagnostics = model.diagnostics()?.clone();
                Ok((distribution, diagnostics))
            });

        match result {
            Ok((distribution, model)) => AllocationOutcome::Available {
                distribution,
                model,
            },
            Err(e) => {
                tracing::warn!(error = %e, "Allocation unavailable");
                AllocationOutcome::Unavailable {
                    reason: e.to_string(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::import::read_csv;
    use crate::sample::sample_dataset;

    #[test]
    fn test_sample_report() {
        let raw = sample_dataset().unwrap();
        let report = Analyzer::default().run(&raw, Some(2000.0)).unwrap();

        assert_eq!(report.preview.len(), 5);
        assert_eq!(report.monthly_totals.len(), 6);
        assert_eq!(report.category_totals[0].category, "Rent");

        let forecast = report.forecast.forecast().expect("forecast available");
        assert_eq!(forecast.next_index, 6);
        assert!(forecast.amount >= 0.0);

        let dist = report.allocation.distribution().expect("allocation available");
        assert!((dist.fraction_sum() - 1.0).abs() < 1e-9);
        assert!((dist.amount_sum() - 2000.0).abs() < 1e-6);
    }

    #[test]
    fn test_schema_error_stops_pipeline() {
        let raw = read_csv("Date,Amount\n2024-01-01,5\n".as_bytes()).unwrap();
        assert!(matches!(
            Analyzer::default().run(&raw, Some(100.0)),
            Err(Error::Schema { .. })
        ));
    }

    #[test]
    fn test_single_month_forecast_unavailable() {
        let raw = read_csv("Date,Category,Amount\n2024-01-01,a,5\n2024-01-20,b,7\n".as_bytes())
            .unwrap();
        let report = Analyzer::default().run(&raw, None).unwrap();

        match &report.forecast {
            ForecastOutcome::Unavailable { reason } => assert!(reason.contains("found 1")),
            other => panic!("expected unavailable forecast, got {:?}", other),
        }
        assert_eq!(report.allocation, AllocationOutcome::Skipped);
    }

    #[test]
    fn test_no_date_column() {
        let raw = read_csv("Category,Amount\nFood,5\nRent,900\n".as_bytes()).unwrap();
        let report = Analyzer::default().run(&raw, Some(10.0)).unwrap();

        assert!(report.monthly_totals.is_empty());
        assert!(report.forecast.forecast().is_none());
        assert!(report.allocation.distribution().is_some());
    }

    #[test]
    fn test_empty_dataset_allocation_unavailable() {
        let raw = read_csv("Date,Category,Amount\n".as_bytes()).unwrap();
        let report = Analyzer::default().run(&raw, Some(10.0)).unwrap();

        match &report.allocation {
            AllocationOutcome::Unavailable { reason } => {
                assert_eq!(reason, &Error::EmptyHistory.to_string())
            }
            other => panic!("expected unavailable allocation, got {:?}", other),
        }
        assert!(report.forecast.forecast().is_none());
    }

    #[test]
    fn test_report_serializes() {
        let raw = sample_dataset().unwrap();
        let report = Analyzer::default().run(&raw, Some(500.0)).unwrap();
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["forecast"]["status"], "available");
        assert_eq!(json["allocation"]["status"], "available");
        assert_eq!(json["monthly_totals"][0]["month"], "2024-01");
    }

    #[test]
    fn test_optional_column_breakdowns() {
        let raw = sample_dataset().unwrap();
        let report = Analyzer::default().run(&raw, None).unwrap();
        let by_payment = report
            .category_payment_totals
            .expect("sample has a Payment_Method column");
        assert!(!by_payment.is_empty());
        assert!(report.cash_flow.is_none());

        let raw = read_csv(
            "Category,Amount,Income,Expense\nSales,300,Income,\nRent,100,,Expense\n".as_bytes(),
        )
        .unwrap();
        let report = Analyzer::default().run(&raw, None).unwrap();
        assert!(report.category_payment_totals.is_none());
        assert_eq!(report.cash_flow.map(|c| c.profit), Some(200.0));
    }
}
