//! Budget allocator
//!
//! Runs the category model over every historical amount, tallies the
//! predicted labels and splits a hypothetical budget by those frequencies.
//! Categories that never get predicted are left out entirely, so the result
//! can cover fewer categories than the model's vocabulary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::classifier::CategoryModel;
use crate::error::{Error, Result};

/// One category's slice of the budget
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationShare {
    pub category: String,
    /// Historical rows predicted into this category
    pub predicted_count: usize,
    /// `predicted_count / total rows`, in (0, 1]
    pub fraction: f64,
    /// `fraction * budget`
    pub amount: f64,
}

/// Budget split across predicted categories, largest share first
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AllocationDistribution {
    pub budget: f64,
    pub history_rows: usize,
    pub shares: Vec<AllocationShare>,
}

impl AllocationDistribution {
    pub fn share(&self, category: &str) -> Option<&AllocationShare> {
        self.shares.iter().find(|s| s.category == category)
    }

    pub fn fraction_sum(&self) -> f64 {
        self.shares.iter().map(|s| s.fraction).sum()
    }

    pub fn amount_sum(&self) -> f64 {
        self.shares.iter().map(|s| s.amount).sum()
    }

    /// Category -> fraction
    pub fn fractions(&self) -> BTreeMap<&str, f64> {
        self.shares
            .iter()
            .map(|s| (s.category.as_str(), s.fraction))
            .collect()
    }

    /// Category -> absolute amount
    pub fn amounts(&self) -> BTreeMap<&str, f64> {
        self.shares
            .iter()
            .map(|s| (s.category.as_str(), s.amount))
            .collect()
    }
}

/// Allocate `budget` using the model's predictions over `history`.
///
/// Fails with [`Error::EmptyHistory`] when `history` is empty and with
/// [`Error::UnfittedModel`] when the model was never fitted.
pub fn allocate_budget(
    model: &CategoryModel,
    history: &[f64],
    budget: f64,
) -> Result<AllocationDistribution> {
    if !budget.is_finite() || budget < 0.0 {
        return Err(Error::InvalidData(format!(
            "Budget must be a non-negative number, got {}",
            budget
        )));
    }
    if history.is_empty() {
        return Err(Error::EmptyHistory);
    }

    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for label in model.predict_many(history)? {
        *counts.entry(label).or_insert(0) += 1;
    }

    let total = history.len() as f64;
    let mut shares: Vec<AllocationShare> = counts
        .into_iter()
        .map(|(category, count)| {
            let fraction = count as f64 / total;
            AllocationShare {
                category: category.to_string(),
                predicted_count: count,
                fraction,
                amount: fraction * budget,
            }
        })
        .collect();

    shares.sort_by(|a, b| {
        b.predicted_count
            .cmp(&a.predicted_count)
            .then_with(|| a.category.cmp(&b.category))
    });

    debug!(
        "Allocated {:.2} across {} predicted categories from {} rows",
        budget,
        shares.len(),
        history.len()
    );

    Ok(AllocationDistribution {
        budget,
        history_rows: history.len(),
        shares,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClassifierConfig;
    use crate::models::Transaction;

    fn tx(category: &str, amount: f64) -> Transaction {
        Transaction {
            date: None,
            category: category.to_string(),
            amount,
            payment_method: None,
            flow: Default::default(),
        }
    }

    fn fit(records: &[Transaction]) -> CategoryModel {
        CategoryModel::fitted(
            ClassifierConfig {
                test_fraction: 0.0,
                ..Default::default()
            },
            records,
        )
        .unwrap()
    }

    #[test]
    fn test_zero_frequency_category_omitted() {
        // Rent shares its amount with Food rows, so the tree never predicts it
        let records = vec![
            tx("Food", 50.0),
            tx("Food", 50.0),
            tx("Food", 50.0),
            tx("Rent", 50.0),
        ];
        let model = fit(&records);
        let history: Vec<f64> = records.iter().map(|r| r.amount).collect();

        let dist = allocate_budget(&model, &history, 1000.0).unwrap();
        assert_eq!(dist.shares.len(), 1);
        assert_eq!(dist.fractions().get("Food"), Some(&1.0));
        assert_eq!(dist.amounts().get("Food"), Some(&1000.0));
        assert!(dist.share("Rent").is_none());
        assert_eq!(model.vocabulary().unwrap().len(), 2);
    }

    #[test]
    fn test_fractions_and_amounts_sum() {
        let records: Vec<Transaction> = (0..30)
            .map(|i| {
                let cat = ["Food", "Rent", "Transport"][i % 3];
                tx(cat, (i * 13 % 47) as f64 + 0.5)
            })
            .collect();
        let model = CategoryModel::fitted(ClassifierConfig::default(), &records).unwrap();
        let history: Vec<f64> = records.iter().map(|r| r.amount).collect();

        for budget in [0.0, 1.0, 999.99, 123_456.78] {
            let dist = allocate_budget(&model, &history, budget).unwrap();
            assert!((dist.fraction_sum() - 1.0).abs() < 1e-9);
            assert!((dist.amount_sum() - budget).abs() <= 1e-6 * budget.max(1.0));
            assert!(dist.shares.iter().all(|s| s.fraction > 0.0 && s.fraction <= 1.0));
        }
    }

    #[test]
    fn test_shares_sorted_by_count() {
        let records = vec![
            tx("Coffee", 3.0),
            tx("Rent", 1000.0),
            tx("Coffee", 4.0),
            tx("Coffee", 5.0),
        ];
        let model = fit(&records);
        let history: Vec<f64> = records.iter().map(|r| r.amount).collect();

        let dist = allocate_budget(&model, &history, 400.0).unwrap();
        assert_eq!(dist.shares[0].category, "Coffee");
        assert_eq!(dist.shares[0].predicted_count, 3);
        assert_eq!(dist.shares[0].amount, 300.0);
        assert_eq!(dist.shares[1].amount, 100.0);
    }

    #[test]
    fn test_empty_history() {
        let model = fit(&[tx("Food", 1.0)]);
        assert!(matches!(
            allocate_budget(&model, &[], 100.0),
            Err(Error::EmptyHistory)
        ));
    }

    #[test]
    fn test_unfitted_model() {
        let model = CategoryModel::default();
        assert!(matches!(
            allocate_budget(&model, &[1.0], 100.0),
            Err(Error::UnfittedModel)
        ));
    }

    #[test]
    fn test_invalid_budget() {
        let model = fit(&[tx("Food", 1.0)]);
        assert!(matches!(
            allocate_budget(&model, &[1.0], -5.0),
            Err(Error::InvalidData(_))
        ));
        assert!(matches!(
            allocate_budget(&model, &[1.0], f64::INFINITY),
            Err(Error::InvalidData(_))
        ));
    }
}
