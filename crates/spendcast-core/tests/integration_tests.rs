//! Integration tests for spendcast-core
//!
//! These tests exercise the full load -> normalize -> aggregate -> forecast /
//! allocate workflow through the public API.

use spendcast_core::{
    aggregate_monthly, allocate_budget,
    import::{read_csv, read_path},
    models::UNCATEGORIZED,
    normalize, AnalysisConfig, Analyzer, CategoryModel, ClassifierConfig, Error,
    TrendForecaster,
};

/// Three months of food spend on a perfect linear trend
fn linear_food_csv() -> &'static str {
    r#"Date,Category,Amount
2024-01-10,food,100
2024-02-10,food,150
2024-03-10,food,200"#
}

// =============================================================================
// Forecast Workflow
// =============================================================================

#[test]
fn test_linear_trend_forecast() {
    let raw = read_csv(linear_food_csv().as_bytes()).expect("Failed to parse CSV");
    let clean = normalize(&raw).expect("Failed to normalize");
    let summary = aggregate_monthly(&clean);

    let totals: Vec<f64> = summary.month_totals().iter().map(|m| m.amount).collect();
    assert_eq!(totals, vec![100.0, 150.0, 200.0]);

    let forecast = TrendForecaster::default()
        .forecast_summary(&summary)
        .expect("Forecast should be available");
    let indices: Vec<usize> = forecast.series.iter().map(|p| p.index).collect();
    assert_eq!(indices, vec![0, 1, 2]);
    assert_eq!(forecast.next_index, 3);
    assert!((forecast.amount - 250.0).abs() < 1e-6);
}

#[test]
fn test_month_gaps_are_not_numeric_gaps() {
    // January and June are adjacent indices
    let csv = "Date,Category,Amount\n2024-01-05,a,100\n2024-06-05,a,200\n";
    let clean = normalize(&read_csv(csv.as_bytes()).unwrap()).unwrap();
    let forecast = TrendForecaster::new(spendcast_core::ForecastConfig {
        test_fraction: 0.0,
        ..Default::default()
    })
    .forecast_summary(&aggregate_monthly(&clean))
    .unwrap();

    assert_eq!(forecast.series[1].index, 1);
    assert!((forecast.amount - 300.0).abs() < 1e-6);
}

#[test]
fn test_single_month_insufficient_data() {
    let csv = "Date,Category,Amount\n2024-01-05,a,100\n2024-01-25,b,50\n";
    let clean = normalize(&read_csv(csv.as_bytes()).unwrap()).unwrap();

    let err = TrendForecaster::default()
        .forecast_summary(&aggregate_monthly(&clean))
        .unwrap_err();
    assert!(matches!(err, Error::InsufficientData { found: 1, .. }));
}

// =============================================================================
// Allocation Workflow
// =============================================================================

#[test]
fn test_allocation_omits_unpredicted_category() {
    let csv = "Category,Amount\nFood,20\nFood,20\nFood,20\nRent,20\n";
    let clean = normalize(&read_csv(csv.as_bytes()).unwrap()).unwrap();

    let model = CategoryModel::fitted(ClassifierConfig::default(), clean.records()).unwrap();
    let dist = allocate_budget(&model, &clean.amounts(), 1000.0).unwrap();

    assert_eq!(dist.shares.len(), 1);
    assert_eq!(dist.shares[0].category, "Food");
    assert_eq!(dist.shares[0].fraction, 1.0);
    assert_eq!(dist.shares[0].amount, 1000.0);
}

#[test]
fn test_model_determinism_across_fits() {
    let raw = spendcast_core::sample::sample_dataset().unwrap();
    let clean = normalize(&raw).unwrap();

    let a = CategoryModel::fitted(ClassifierConfig::default(), clean.records()).unwrap();
    let b = CategoryModel::fitted(ClassifierConfig::default(), clean.records()).unwrap();
    for amount in [5.0, 19.99, 45.0, 90.0, 130.0, 700.0, 1225.0, 5000.0] {
        assert_eq!(a.predict(amount).unwrap(), b.predict(amount).unwrap());
    }
}

#[test]
fn test_model_predicts_only_known_labels() {
    let raw = spendcast_core::sample::sample_dataset().unwrap();
    let clean = normalize(&raw).unwrap();
    let model = CategoryModel::fitted(ClassifierConfig::default(), clean.records()).unwrap();
    let vocab = model.vocabulary().unwrap();

    assert!(vocab.labels().iter().any(|l| l == UNCATEGORIZED));
    for amount in [-50.0, 0.0, 1.0, 60.0, 999.0, 1e9] {
        let label = model.predict(amount).unwrap();
        assert!(vocab.encode(label).is_some());
    }
}

// =============================================================================
// Full Pipeline
// =============================================================================

#[test]
fn test_missing_category_column() {
    let raw = read_csv("Date,Amount\n2024-01-01,10\n".as_bytes()).unwrap();
    match Analyzer::default().run(&raw, Some(100.0)) {
        Err(Error::Schema { missing }) => assert_eq!(missing, vec!["Category".to_string()]),
        other => panic!("expected schema error, got {:?}", other),
    }
}

#[test]
fn test_pipeline_from_file_with_config() {
    let dir = tempfile::tempdir().unwrap();
    let data_path = dir.path().join("expenses.csv");
    std::fs::write(&data_path, spendcast_core::sample::SAMPLE_CSV).unwrap();

    let config_path = dir.path().join("analysis.toml");
    std::fs::write(
        &config_path,
        "[classifier]\nmax_depth = 2\n\n[report]\npreview_rows = 3\n",
    )
    .unwrap();

    let config = AnalysisConfig::from_path(&config_path).unwrap();
    let raw = read_path(&data_path).unwrap();
    let report = Analyzer::new(config).run(&raw, Some(3000.0)).unwrap();

    assert_eq!(report.preview.len(), 3);
    assert_eq!(report.normalization.rows, 35);

    let dist = report.allocation.distribution().expect("allocation available");
    assert!((dist.fraction_sum() - 1.0).abs() < 1e-9);
    assert!((dist.amount_sum() - 3000.0).abs() < 1e-6 * 3000.0);
    // Depth 2 has at most four leaves
    assert!(dist.shares.len() <= 4);
}

#[test]
fn test_cleaned_rows_have_no_missing_values() {
    let csv = "Date,Category,Amount\n,,\nbad,  ,abc\n2024-05-01,TRAVEL,(20.00)\n";
    let clean = normalize(&read_csv(csv.as_bytes()).unwrap()).unwrap();

    assert_eq!(clean.len(), 3);
    for row in clean.records() {
        assert!(!row.category.is_empty());
        assert!(row.amount.is_finite());
    }
    // Only one present amount, so both missing rows take it as the mean
    assert_eq!(clean.amounts(), vec![-20.0, -20.0, -20.0]);
    assert_eq!(clean.records()[2].category, "Travel");
}

// =============================================================================
// Spreadsheet Input
// =============================================================================

#[cfg(feature = "xlsx")]
fn fixture(name: &str) -> std::path::PathBuf {
    std::path::Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests")
        .join("data")
        .join(name)
}

#[cfg(feature = "xlsx")]
#[test]
fn test_xlsx_import_and_normalize() {
    use chrono::NaiveDate;
    use spendcast_core::Cell;

    let raw = read_path(&fixture("expenses.xlsx")).expect("Failed to read workbook");
    assert_eq!(raw.headers(), &["Date", "Category", "Amount", "Payment_Method"]);
    assert_eq!(raw.len(), 3);

    let jan15 = NaiveDate::from_ymd_opt(2024, 1, 15).unwrap();
    assert_eq!(raw.rows()[0][0], Cell::Date(jan15));
    assert_eq!(raw.rows()[0][2], Cell::Number(12.5));
    assert!(raw.rows()[1][1].is_empty());

    let clean = normalize(&raw).unwrap();
    let rows = clean.records();
    assert_eq!(rows[0].date, Some(jan15));
    assert_eq!(rows[0].category, "Food");
    assert_eq!(rows[0].amount, 12.5);
    assert_eq!(rows[1].date, NaiveDate::from_ymd_opt(2024, 1, 28));
    assert_eq!(rows[1].category, UNCATEGORIZED);
    assert_eq!(rows[1].amount, 100.0);
    assert_eq!(rows[2].date, NaiveDate::from_ymd_opt(2024, 2, 1));
    assert_eq!(rows[2].category, "Rent");
    assert_eq!(rows[2].payment_method.as_deref(), Some("Bank Transfer"));
    assert_eq!(clean.stats().uncategorized, 1);
    assert_eq!(clean.stats().imputed_amounts, 0);

    let totals: Vec<f64> = aggregate_monthly(&clean)
        .month_totals()
        .iter()
        .map(|m| m.amount)
        .collect();
    assert_eq!(totals, vec![112.5, 900.0]);
}

#[cfg(feature = "xlsx")]
#[test]
fn test_empty_workbook_is_empty_dataset() {
    let raw = read_path(&fixture("empty.xlsx")).unwrap();
    assert!(raw.is_empty());
    assert!(raw.headers().is_empty());
    assert!(matches!(normalize(&raw), Err(Error::Schema { .. })));
}

