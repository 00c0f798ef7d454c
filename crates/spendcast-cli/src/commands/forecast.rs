//! Forecast command: next month's total spend

use std::path::Path;

use anyhow::Result;
use spendcast_core::{
    aggregate_monthly, AnalysisConfig, Forecast, ForecastOutcome, PointKind, TrendForecaster,
};

use super::{format_amount, load_clean_dataset, print_json};

const BAR_WIDTH: usize = 30;

pub fn cmd_forecast(file: &Path, config: &AnalysisConfig, json: bool) -> Result<()> {
    let dataset = load_clean_dataset(file)?;

    let outcome = if !dataset.has_date_column() {
        ForecastOutcome::Unavailable {
            reason: "Add a 'Date' column to enable trend and forecast analysis".to_string(),
        }
    } else {
        let forecaster = TrendForecaster::new(config.forecast.clone());
        match forecaster.forecast_summary(&aggregate_monthly(&dataset)) {
            Ok(forecast) => ForecastOutcome::Available(forecast),
            Err(e) if e.is_recoverable() => ForecastOutcome::Unavailable {
                reason: e.to_string(),
            },
            Err(e) => return Err(e.into()),
        }
    };

    if json {
        return print_json(&outcome);
    }

    println!();
    println!("🔮 Spending Forecast");
    println!("   File: {}", file.display());
    println!("   ─────────────────────────────────────────────────────────────");
    print_forecast(&outcome);
    Ok(())
}

pub(crate) fn print_forecast(outcome: &ForecastOutcome) {
    let forecast = match outcome {
        ForecastOutcome::Available(forecast) => forecast,
        ForecastOutcome::Unavailable { reason } => {
            println!("   ⚠️  Forecast unavailable: {}", reason);
            return;
        }
    };

    print_chart(forecast);

    println!();
    println!(
        "   Predicted spend for next month: {}",
        format_amount(forecast.amount)
    );
    if forecast.raw_prediction < 0.0 {
        println!(
            "   ⚠️  Trend line is below zero ({}); showing its magnitude",
            format_amount(forecast.raw_prediction)
        );
    }
    println!(
        "   Trend: {} per month (intercept {})",
        format_amount(forecast.model.slope),
        format_amount(forecast.model.intercept)
    );

    let d = &forecast.diagnostics;
    println!(
        "   Fit: {} months trained, {} held out",
        d.train_size, d.validation_size
    );
    if let (Some(mae), Some(rmse)) = (d.validation_mae, d.validation_rmse) {
        println!(
            "   Held-out error: MAE {} / RMSE {}",
            format_amount(mae),
            format_amount(rmse)
        );
    }
    if let Some(r2) = d.train_r_squared {
        println!("   Train R²: {:.3}", r2);
    }
}

fn print_chart(forecast: &Forecast) {
    let points = forecast.chart_points();
    let max = points.iter().map(|p| p.amount).fold(0.0_f64, f64::max);

    println!("   {:8} │ {:>12} │", "Month", "Amount");
    println!("   ─────────┼──────────────┼─{}", "─".repeat(BAR_WIDTH));
    for point in &points {
        let width = if max > 0.0 {
            ((point.amount / max) * BAR_WIDTH as f64).round() as usize
        } else {
            0
        };
        let (label, bar) = match point.kind {
            PointKind::Actual => (
                forecast
                    .series
                    .get(point.index)
                    .map(|p| p.month.to_string())
                    .unwrap_or_default(),
                "█".repeat(width),
            ),
            PointKind::Predicted => ("next".to_string(), "░".repeat(width)),
        };
        println!(
            "   {:8} │ {:>12} │ {}",
            label,
            format_amount(point.amount),
            bar
        );
    }
}
