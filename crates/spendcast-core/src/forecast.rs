//! Trend forecaster
//!
//! Fits ordinary least squares of monthly total on a zero-based month index
//! and projects the next index. Month gaps are not represented: the index is
//! the bucket's position in chronological order.
//!
//! The reported forecast is the absolute value of the raw prediction, since it
//! stands for an expense magnitude. A declining trend that extrapolates below
//! zero therefore shows up as a positive amount.

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::aggregate::{MonthTotal, TemporalSummary};
use crate::config::ForecastConfig;
use crate::error::{Error, Result};
use crate::models::MonthKey;
use crate::split::train_test_split;

/// Simple linear regression `y = intercept + slope * x`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LinearRegression {
    pub intercept: f64,
    pub slope: f64,
}

impl LinearRegression {
    /// Least-squares fit.
    ///
    /// With fewer than two distinct `x` values the slope is 0 and the
    /// intercept is the mean of `y`. Returns None for empty input.
    pub fn fit(xs: &[f64], ys: &[f64]) -> Option<Self> {
        if xs.is_empty() || xs.len() != ys.len() {
            return None;
        }
        let n = xs.len() as f64;
        let mean_x = xs.iter().sum::<f64>() / n;
        let mean_y = ys.iter().sum::<f64>() / n;

        let (mut sxy, mut sxx) = (0.0, 0.0);
        for (x, y) in xs.iter().zip(ys) {
            let dx = x - mean_x;
            sxy += dx * (y - mean_y);
            sxx += dx * dx;
        }

        let slope = if sxx > 0.0 { sxy / sxx } else { 0.0 };
        Some(Self {
            intercept: mean_y - slope * mean_x,
            slope,
        })
    }

    pub fn predict(&self, x: f64) -> f64 {
        self.intercept + self.slope * x
    }

    /// Coefficient of determination on the given points (None if `y` is constant)
    pub fn r_squared(&self, xs: &[f64], ys: &[f64]) -> Option<f64> {
        if ys.is_empty() {
            return None;
        }
        let mean_y = ys.iter().sum::<f64>() / ys.len() as f64;
        let ss_tot: f64 = ys.iter().map(|y| (y - mean_y).powi(2)).sum();
        if ss_tot == 0.0 {
            return None;
        }
        let ss_res: f64 = xs
            .iter()
            .zip(ys)
            .map(|(x, y)| (y - self.predict(*x)).powi(2))
            .sum();
        Some(1.0 - ss_res / ss_tot)
    }
}

/// One month of the forecast input series
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesPoint {
    pub index: usize,
    pub month: MonthKey,
    pub amount: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PointKind {
    Actual,
    Predicted,
}

/// Chart-ready point: the actual series followed by the predicted one
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChartPoint {
    pub index: usize,
    pub amount: f64,
    pub kind: PointKind,
}

/// Fit quality bookkeeping; not used for the prediction itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FitDiagnostics {
    pub train_size: usize,
    pub validation_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_mae: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_rmse: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub train_r_squared: Option<f64>,
}

/// Next-month forecast
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Forecast {
    pub series: Vec<SeriesPoint>,
    pub next_index: usize,
    /// Signed model output at `next_index`
    pub raw_prediction: f64,
    /// Non-negative forecast amount (`|raw_prediction|`)
    pub amount: f64,
    pub model: LinearRegression,
    pub diagnostics: FitDiagnostics,
}

impl Forecast {
    /// The input series tagged `Actual` plus the forecast tagged `Predicted`
    pub fn chart_points(&self) -> Vec<ChartPoint> {
        self.series
            .iter()
            .map(|p| ChartPoint {
                index: p.index,
                amount: p.amount,
                kind: PointKind::Actual,
            })
            .chain(std::iter::once(ChartPoint {
                index: self.next_index,
                amount: self.amount,
                kind: PointKind::Predicted,
            }))
            .collect()
    }
}

/// Linear trend forecaster over month totals
#[derive(Debug, Clone, Default)]
pub struct TrendForecaster {
    config: ForecastConfig,
}

impl TrendForecaster {
    pub fn new(config: ForecastConfig) -> Self {
        Self { config }
    }

    /// Forecast from an aggregated summary
    pub fn forecast_summary(&self, summary: &TemporalSummary) -> Result<Forecast> {
        self.forecast(&summary.month_totals())
    }

    /// Forecast from chronologically ordered month totals.
    ///
    /// Fails with [`Error::InsufficientData`] below `min_months` buckets.
    pub fn forecast(&self, totals: &[MonthTotal]) -> Result<Forecast> {
        let required = self.config.min_months.max(2);
        if totals.len() < required {
            return Err(Error::InsufficientData {
                required,
                found: totals.len(),
            });
        }

        let series: Vec<SeriesPoint> = totals
            .iter()
            .enumerate()
            .map(|(index, t)| SeriesPoint {
                index,
                month: t.month,
                amount: t.amount,
            })
            .collect();

        let split = train_test_split(series.len(), self.config.test_fraction, self.config.seed);
        let pick = |rows: &[usize]| -> (Vec<f64>, Vec<f64>) {
            rows.iter()
                .map(|&i| (series[i].index as f64, series[i].amount))
                .unzip()
        };
        let (train_x, train_y) = pick(&split.train);
        let (test_x, test_y) = pick(&split.test);

        let model = LinearRegression::fit(&train_x, &train_y).ok_or(Error::InsufficientData {
            required,
            found: train_x.len(),
        })?;
        debug!(
            "Fitted trend on {} months: intercept={:.2} slope={:.2}",
            train_x.len(),
            model.intercept,
            model.slope
        );

        let diagnostics = diagnose(&model, &train_x, &train_y, &test_x, &test_y);

        let next_index = series.len();
        let raw_prediction = model.predict(next_index as f64);
        let amount = raw_prediction.abs();
        info!(
            "Forecast for month index {}: {:.2} (raw {:.2})",
            next_index, amount, raw_prediction
        );

        Ok(Forecast {
            series,
            next_index,
            raw_prediction,
            amount,
            model,
            diagnostics,
        })
    }
}

fn diagnose(
    model: &LinearRegression,
    train_x: &[f64],
    train_y: &[f64],
    test_x: &[f64],
    test_y: &[f64],
) -> FitDiagnostics {
    let (mae, rmse) = if test_x.is_empty() {
        (None, None)
    } else {
        let n = test_x.len() as f64;
        let errors: Vec<f64> = test_x
            .iter()
            .zip(test_y)
            .map(|(x, y)| y - model.predict(*x))
            .collect();
        let mae = errors.iter().map(|e| e.abs()).sum::<f64>() / n;
        let mse = errors.iter().map(|e| e * e).sum::<f64>() / n;
        (Some(mae), Some(mse.sqrt()))
    };

    FitDiagnostics {
        train_size: train_x.len(),
        validation_size: test_x.len(),
        validation_mae: mae,
        validation_rmse: rmse,
        train_r_squared: model.r_squared(train_x, train_y),
    }
}
