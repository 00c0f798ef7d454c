//! Category association model
//!
//! A CART decision tree (Gini impurity) over a single feature, the
//! transaction amount, predicting a category code. Codes come from a
//! [`CategoryVocabulary`] built at fit time, so the model can only emit
//! labels it was trained on.
//!
//! Predictions are not required to be monotonic or smooth in amount: nearby
//! amounts can land on different sides of a split.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::config::ClassifierConfig;
use crate::error::{Error, Result};
use crate::models::Transaction;
use crate::split::train_test_split;

/// Bijection between canonical category labels and integer codes.
///
/// Labels are sorted, so the same set of categories always gets the same codes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryVocabulary {
    labels: Vec<String>,
}

impl CategoryVocabulary {
    /// Build from the distinct labels in `labels`
    pub fn build<'a, I>(labels: I) -> Result<Self>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let distinct: BTreeSet<&str> = labels.into_iter().collect();
        if distinct.is_empty() {
            return Err(Error::EmptyVocabulary);
        }
        Ok(Self {
            labels: distinct.into_iter().map(str::to_string).collect(),
        })
    }

    pub fn encode(&self, label: &str) -> Option<u32> {
        self.labels
            .binary_search_by(|l| l.as_str().cmp(label))
            .ok()
            .map(|i| i as u32)
    }

    pub fn decode(&self, code: u32) -> Option<&str> {
        self.labels.get(code as usize).map(String::as_str)
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Node {
    Leaf {
        code: u32,
    },
    Split {
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// Decision tree over one numeric feature; nodes live in an arena, root at 0
#[derive(Debug, Clone, PartialEq)]
struct DecisionTree {
    nodes: Vec<Node>,
    depth: usize,
}

struct TreeBuilder<'a> {
    n_classes: usize,
    max_depth: Option<usize>,
    min_samples_split: usize,
    nodes: Vec<Node>,
    depth: usize,
    samples: &'a [(f64, u32)],
}

impl DecisionTree {
    /// Fit on (amount, code) samples. `samples` must be non-empty.
    fn fit(samples: &[(f64, u32)], n_classes: usize, config: &ClassifierConfig) -> Self {
        let mut sorted = samples.to_vec();
        sorted.sort_by(|a, b| a.0.total_cmp(&b.0).then(a.1.cmp(&b.1)));

        let mut builder = TreeBuilder {
            n_classes,
            max_depth: config.max_depth,
            min_samples_split: config.min_samples_split.max(2),
            nodes: Vec::new(),
            depth: 0,
            samples: &sorted,
        };
        builder.grow();

        Self {
            nodes: builder.nodes,
            depth: builder.depth,
        }
    }

    fn predict(&self, amount: f64) -> u32 {
        let mut idx = 0;
        loop {
            match &self.nodes[idx] {
                Node::Leaf { code } => return *code,
                Node::Split {
                    threshold,
                    left,
                    right,
                } => {
                    idx = if amount <= *threshold { *left } else { *right };
                }
            }
        }
    }

    fn leaf_count(&self) -> usize {
        self.nodes
            .iter()
            .filter(|n| matches!(n, Node::Leaf { .. }))
            .count()
    }
}

fn gini(counts: &[usize], total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let total = total as f64;
    1.0 - counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total;
            p * p
        })
        .sum::<f64>()
}

/// Most frequent class; ties go to the lowest code
fn majority(counts: &[usize]) -> u32 {
    let mut best = 0;
    for (code, &count) in counts.iter().enumerate() {
        if count > counts[best] {
            best = code;
        }
    }
    best as u32
}

/// Pending subtree: sorted samples `[start, end)` at `depth`, written to `node`
struct GrowTask {
    start: usize,
    end: usize,
    depth: usize,
    node: usize,
}

impl TreeBuilder<'_> {
    /// Grow the whole tree from the root.
    ///
    /// Uses an explicit work stack; a degenerate tree can be as deep as the
    /// sample count.
    fn grow(&mut self) {
        self.nodes.push(Node::Leaf { code: 0 });
        let mut stack = vec![GrowTask {
            start: 0,
            end: self.samples.len(),
            depth: 0,
            node: 0,
        }];

        while let Some(task) = stack.pop() {
            let Some((split_at, threshold)) = self.grow_node(&task) else {
                continue;
            };

            let left = self.nodes.len();
            let right = left + 1;
            self.nodes.push(Node::Leaf { code: 0 });
            self.nodes.push(Node::Leaf { code: 0 });
            self.nodes[task.node] = Node::Split {
                threshold,
                left,
                right,
            };

            let mid = task.start + split_at;
            stack.push(GrowTask {
                start: mid,
                end: task.end,
                depth: task.depth + 1,
                node: right,
            });
            stack.push(GrowTask {
                start: task.start,
                end: mid,
                depth: task.depth + 1,
                node: left,
            });
        }
    }

    /// Make `task.node` a majority leaf; returns the split to apply, if any
    fn grow_node(&mut self, task: &GrowTask) -> Option<(usize, f64)> {
        self.depth = self.depth.max(task.depth);
        let slice = &self.samples[task.start..task.end];

        let mut counts = vec![0usize; self.n_classes];
        for &(_, code) in slice {
            counts[code as usize] += 1;
        }
        self.nodes[task.node] = Node::Leaf {
            code: majority(&counts),
        };

        let pure = counts.iter().filter(|&&c| c > 0).count() <= 1;
        let depth_reached = self.max_depth.is_some_and(|max| task.depth >= max);
        if pure || depth_reached || slice.len() < self.min_samples_split {
            return None;
        }
        best_split(slice, &counts)
    }
}

/// Best Gini split of sorted samples: (left size, threshold).
///
/// Candidate thresholds are midpoints between distinct neighbouring amounts.
/// Returns None if no split lowers impurity.
fn best_split(slice: &[(f64, u32)], counts: &[usize]) -> Option<(usize, f64)> {
    let n = slice.len();
    let parent = gini(counts, n);

    let mut left = vec![0usize; counts.len()];
    let mut right = counts.to_vec();
    let mut best: Option<(usize, f64, f64)> = None;

    for i in 1..n {
        let code = slice[i - 1].1 as usize;
        left[code] += 1;
        right[code] -= 1;

        let (lo, hi) = (slice[i - 1].0, slice[i].0);
        if lo == hi {
            continue;
        }

        let weighted = (i as f64 * gini(&left, i) + (n - i) as f64 * gini(&right, n - i)) / n as f64;
        // Strict comparison keeps the lowest threshold on ties
        if best.map_or(true, |(_, _, score)| weighted < score - 1e-12) {
            let mut threshold = lo + (hi - lo) / 2.0;
            if threshold >= hi {
                threshold = lo;
            }
            best = Some((i, threshold, weighted));
        }
    }

    best.filter(|(_, _, score)| *score < parent - 1e-12)
        .map(|(i, threshold, _)| (i, threshold))
}

/// Fit quality bookkeeping for the category model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelDiagnostics {
    pub train_size: usize,
    pub held_out_size: usize,
    /// Share of held-out rows predicted correctly (None when nothing is held out)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub held_out_accuracy: Option<f64>,
    pub categories: usize,
    pub tree_depth: usize,
    pub leaves: usize,
}

#[derive(Debug, Clone, PartialEq)]
struct FittedModel {
    vocabulary: CategoryVocabulary,
    tree: DecisionTree,
    diagnostics: ModelDiagnostics,
}

/// Amount -> category classifier.
///
/// Starts unfitted; [`CategoryModel::fit`] builds the vocabulary and tree.
#[derive(Debug, Clone, Default)]
pub struct CategoryModel {
    config: ClassifierConfig,
    fitted: Option<FittedModel>,
}

impl CategoryModel {
    pub fn new(config: ClassifierConfig) -> Self {
        Self {
            config,
            fitted: None,
        }
    }

    /// Build a model and fit it in one step
    pub fn fitted(config: ClassifierConfig, records: &[Transaction]) -> Result<Self> {
        let mut model = Self::new(config);
        model.fit(records)?;
        Ok(model)
    }

    pub fn is_fitted(&self) -> bool {
        self.fitted.is_some()
    }

    /// Fit on cleaned records, replacing any previous fit.
    ///
    /// The vocabulary covers every category in `records`; the tree is trained
    /// on the training partition only.
    pub fn fit(&mut self, records: &[Transaction]) -> Result<()> {
        let vocabulary = CategoryVocabulary::build(records.iter().map(|r| r.category.as_str()))?;

        let samples: Vec<(f64, u32)> = records
            .iter()
            .map(|r| -> Result<(f64, u32)> {
                let code = vocabulary
                    .encode(&r.category)
                    .ok_or_else(|| Error::InvalidData(format!("Unknown category {}", r.category)))?;
                if !r.amount.is_finite() {
                    return Err(Error::InvalidData(format!(
                        "Non-finite amount for category {}",
                        r.category
                    )));
                }
                Ok((r.amount, code))
            })
            .collect::<Result<_>>()?;

        let split = train_test_split(samples.len(), self.config.test_fraction, self.config.seed);
        let train: Vec<(f64, u32)> = split.train.iter().map(|&i| samples[i]).collect();
        let held_out: Vec<(f64, u32)> = split.test.iter().map(|&i| samples[i]).collect();

        let tree = DecisionTree::fit(&train, vocabulary.len(), &self.config);

        let held_out_accuracy = if held_out.is_empty() {
            None
        } else {
            let correct = held_out
                .iter()
                .filter(|(amount, code)| tree.predict(*amount) == *code)
                .count();
            Some(correct as f64 / held_out.len() as f64)
        };

        let diagnostics = ModelDiagnostics {
            train_size: train.len(),
            held_out_size: held_out.len(),
            held_out_accuracy,
            categories: vocabulary.len(),
            tree_depth: tree.depth,
            leaves: tree.leaf_count(),
        };
        debug!(
            "Fitted category tree: depth={} leaves={} on {} rows",
            diagnostics.tree_depth, diagnostics.leaves, diagnostics.train_size
        );
        if let Some(acc) = held_out_accuracy {
            info!(
                "Category model held-out accuracy: {:.1}% ({} rows)",
                acc * 100.0,
                diagnostics.held_out_size
            );
        }

        self.fitted = Some(FittedModel {
            vocabulary,
            tree,
            diagnostics,
        });
        Ok(())
    }

    fn state(&self) -> Result<&FittedModel> {
        self.fitted.as_ref().ok_or(Error::UnfittedModel)
    }

    pub fn vocabulary(&self) -> Result<&CategoryVocabulary> {
        Ok(&self.state()?.vocabulary)
    }

    pub fn diagnostics(&self) -> Result<&ModelDiagnostics> {
        Ok(&self.state()?.diagnostics)
    }

    /// Predict the category code for one amount
    pub fn predict_code(&self, amount: f64) -> Result<u32> {
        let state = self.state()?;
        if !amount.is_finite() {
            return Err(Error::InvalidData(format!(
                "Cannot classify non-finite amount {}",
                amount
            )));
        }
        Ok(state.tree.predict(amount))
    }

    /// Predict the canonical category label for one amount
    pub fn predict(&self, amount: f64) -> Result<&str> {
        let code = self.predict_code(amount)?;
        self.state()?
            .vocabulary
            .decode(code)
            .ok_or_else(|| Error::InvalidData(format!("Tree emitted unknown code {}", code)))
    }

    /// Predict labels for many amounts, in order
    pub fn predict_many(&self, amounts: &[f64]) -> Result<Vec<&str>> {
        amounts.iter().map(|&a| self.predict(a)).collect()
    }
}
