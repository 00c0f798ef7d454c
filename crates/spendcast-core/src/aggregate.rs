//! Temporal aggregation and category summaries

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::models::{CleanDataset, MonthKey};

/// Totals for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyBucket {
    pub month: MonthKey,
    /// Sum of amounts per canonical category
    pub by_category: BTreeMap<String, f64>,
    pub total: f64,
}

/// One (month, category) row of the category-level monthly summary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MonthlyCategoryTotal {
    pub month: MonthKey,
    pub category: String,
    pub amount: f64,
}

/// One month of the month-level total summary
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MonthTotal {
    pub month: MonthKey,
    pub amount: f64,
}

/// Month buckets in chronological order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TemporalSummary {
    buckets: Vec<MonthlyBucket>,
}

impl TemporalSummary {
    pub fn buckets(&self) -> &[MonthlyBucket] {
        &self.buckets
    }

    /// True when no row had a valid date; trends and forecasts are unavailable
    pub fn is_empty(&self) -> bool {
        self.buckets.is_empty()
    }

    pub fn len(&self) -> usize {
        self.buckets.len()
    }

    /// Per (month, category) sums, month-major then category order
    pub fn category_rows(&self) -> Vec<MonthlyCategoryTotal> {
        self.buckets
            .iter()
            .flat_map(|b| {
                b.by_category.iter().map(move |(category, amount)| MonthlyCategoryTotal {
                    month: b.month,
                    category: category.clone(),
                    amount: *amount,
                })
            })
            .collect()
    }

    /// Per-month totals, chronologically ascending
    pub fn month_totals(&self) -> Vec<MonthTotal> {
        self.buckets
            .iter()
            .map(|b| MonthTotal {
                month: b.month,
                amount: b.total,
            })
            .collect()
    }
}

/// Bucket dated rows by calendar month
pub fn aggregate_monthly(dataset: &CleanDataset) -> TemporalSummary {
    let mut months: BTreeMap<MonthKey, BTreeMap<String, f64>> = BTreeMap::new();

    for tx in dataset.records() {
        let Some(date) = tx.date else { continue };
        *months
            .entry(MonthKey::from_date(date))
            .or_default()
            .entry(tx.category.clone())
            .or_insert(0.0) += tx.amount;
    }

    let buckets: Vec<MonthlyBucket> = months
        .into_iter()
        .map(|(month, by_category)| MonthlyBucket {
            month,
            total: by_category.values().sum(),
            by_category,
        })
        .collect();

    debug!("Aggregated dated rows into {} month buckets", buckets.len());
    TemporalSummary { buckets }
}

/// Spending for one category across the whole dataset
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryTotal {
    pub category: String,
    pub amount: f64,
    /// Share of the grand total, in percent
    pub percentage: f64,
    pub transaction_count: usize,
}

/// Sum amounts per category over all rows, largest first
pub fn category_totals(dataset: &CleanDataset) -> Vec<CategoryTotal> {
    let mut totals: BTreeMap<&str, (f64, usize)> = BTreeMap::new();
    for tx in dataset.records() {
        let entry = totals.entry(tx.category.as_str()).or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    let grand_total: f64 = totals.values().map(|(amount, _)| amount).sum();

    let mut result: Vec<CategoryTotal> = totals
        .into_iter()
        .map(|(category, (amount, count))| CategoryTotal {
            category: category.to_string(),
            amount,
            percentage: if grand_total != 0.0 {
                amount / grand_total * 100.0
            } else {
                0.0
            },
            transaction_count: count,
        })
        .collect();

    result.sort_by(|a, b| {
        b.amount
            .partial_cmp(&a.amount)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.category.cmp(&b.category))
    });
    result
}

/// Spending for one (category, payment method) pair
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CategoryPaymentTotal {
    pub category: String,
    pub payment_method: String,
    pub amount: f64,
    pub transaction_count: usize,
}

/// Sum amounts per (category, payment method), in category then method order.
///
/// None when the source had no `Payment_Method` column. Rows with a blank
/// payment method are left out of the breakdown.
pub fn category_payment_totals(dataset: &CleanDataset) -> Option<Vec<CategoryPaymentTotal>> {
    if !dataset.has_payment_method_column() {
        return None;
    }

    let mut totals: BTreeMap<(&str, &str), (f64, usize)> = BTreeMap::new();
    for tx in dataset.records() {
        let Some(method) = tx.payment_method.as_deref() else {
            continue;
        };
        let entry = totals
            .entry((tx.category.as_str(), method))
            .or_insert((0.0, 0));
        entry.0 += tx.amount;
        entry.1 += 1;
    }

    Some(
        totals
            .into_iter()
            .map(|((category, method), (amount, count))| CategoryPaymentTotal {
                category: category.to_string(),
                payment_method: method.to_string(),
                amount,
                transaction_count: count,
            })
            .collect(),
    )
}

/// Income, expenses and profit from the `Income` / `Expense` marker columns
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CashFlowSummary {
    pub total_income: f64,
    pub total_expenses: f64,
    /// `total_income - total_expenses`
    pub profit: f64,
    pub income_rows: usize,
    pub expense_rows: usize,
}

/// Totals of the income-marked and expense-marked rows.
///
/// None when the source had neither marker column. A row carrying both marks
/// counts on both sides.
pub fn cash_flow(dataset: &CleanDataset) -> Option<CashFlowSummary> {
    if !dataset.has_flow_columns() {
        return None;
    }

    let mut summary = CashFlowSummary {
        total_income: 0.0,
        total_expenses: 0.0,
        profit: 0.0,
        income_rows: 0,
        expense_rows: 0,
    };
    for tx in dataset.records() {
        if tx.flow.income {
            summary.total_income += tx.amount;
            summary.income_rows += 1;
        }
        if tx.flow.expense {
            summary.total_expenses += tx.amount;
            summary.expense_rows += 1;
        }
    }
    summary.profit = summary.total_income - summary.total_expenses;

    debug!(
        "Cash flow: income {:.2} over {} rows, expenses {:.2} over {} rows",
        summary.total_income, summary.income_rows, summary.total_expenses, summary.expense_rows
    );
    Some(summary)
}
