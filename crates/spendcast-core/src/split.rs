//! Seeded train/held-out partitioning

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;

/// Row indices assigned to each side of a split
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a fixed seed and hold out `ceil(test_fraction * n)` rows.
///
/// At least one row always stays in the training side when `n > 0`.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Split {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    // Tolerate float noise such as 10 * 0.2 = 2.0000000000000004
    let n_test = ((n as f64) * test_fraction.clamp(0.0, 1.0) - 1e-9).ceil().max(0.0) as usize;
    let n_test = n_test.min(n.saturating_sub(1));

    let test = indices.split_off(n - n_test);
    Split {
        train: indices,
        test,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_sizes() {
        let split = train_test_split(10, 0.2, 42);
        assert_eq!(split.train.len(), 8);
        assert_eq!(split.test.len(), 2);

        let split = train_test_split(3, 0.2, 42);
        assert_eq!(split.train.len(), 2);
        assert_eq!(split.test.len(), 1);
    }

    #[test]
    fn test_split_keeps_one_training_row() {
        let split = train_test_split(1, 0.2, 42);
        assert_eq!(split.train, vec![0]);
        assert!(split.test.is_empty());

        let split = train_test_split(0, 0.2, 42);
        assert!(split.train.is_empty());
        assert!(split.test.is_empty());
    }

    #[test]
    fn test_split_is_deterministic_partition() {
        let a = train_test_split(25, 0.2, 7);
        let b = train_test_split(25, 0.2, 7);
        assert_eq!(a, b);

        let mut all: Vec<usize> = a.train.iter().chain(a.test.iter()).copied().collect();
        all.sort_unstable();
        assert_eq!(all, (0..25).collect::<Vec<_>>());
    }

    #[test]
    fn test_zero_fraction_holds_nothing_out() {
        let split = train_test_split(5, 0.0, 1);
        assert_eq!(split.train.len(), 5);
        assert!(split.test.is_empty());
    }
}
