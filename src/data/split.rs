//! Stratified train/evaluation partitioning

use crate::data::Dataset;
use crate::error::{FraudBenchError, Result};
use rand::seq::SliceRandom;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Single stratified split of a dataset into disjoint training and
/// evaluation subsets, preserving per-class proportions up to rounding.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StratifiedSplitter {
    train_fraction: f64,
    seed: Option<u64>,
}

impl Default for StratifiedSplitter {
    fn default() -> Self {
        Self::new(0.8)
    }
}

impl StratifiedSplitter {
    /// Create a splitter assigning the given fraction to training
    pub fn new(train_fraction: f64) -> Self {
        Self {
            train_fraction,
            seed: None,
        }
    }

    /// Set the shuffle seed for reproducible splits
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Split into (training, evaluation)
    pub fn split(&self, dataset: &Dataset) -> Result<(Dataset, Dataset)> {
        if !(self.train_fraction > 0.0 && self.train_fraction < 1.0) {
            return Err(FraudBenchError::ValidationError(format!(
                "train_fraction must lie in (0, 1), got {}",
                self.train_fraction
            )));
        }

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        // BTreeMap keeps class iteration order fixed so one shared RNG
        // stream produces the same shuffles for the same seed.
        let mut by_class: BTreeMap<i64, Vec<usize>> = BTreeMap::new();
        for (idx, &label) in dataset.labels().iter().enumerate() {
            by_class.entry(label).or_default().push(idx);
        }

        let mut train_indices = Vec::new();
        let mut eval_indices = Vec::new();

        for (_, mut indices) in by_class {
            indices.shuffle(&mut rng);
            let n_train = ((indices.len() as f64) * self.train_fraction).round() as usize;
            let n_train = n_train.min(indices.len());
            train_indices.extend_from_slice(&indices[..n_train]);
            eval_indices.extend_from_slice(&indices[n_train..]);
        }

        train_indices.sort_unstable();
        eval_indices.sort_unstable();

        Ok((dataset.select(&train_indices), dataset.select(&eval_indices)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::{Array1, Array2};

    fn imbalanced_dataset(n_legit: usize, n_fraud: usize) -> Dataset {
        let n = n_legit + n_fraud;
        let mut data = Vec::with_capacity(n * 2);
        let mut labels = Vec::with_capacity(n);

        for i in 0..n_legit {
            data.push(i as f64);
            data.push((i % 7) as f64);
            labels.push(0i64);
        }
        for i in 0..n_fraud {
            data.push(100.0 + i as f64);
            data.push(100.0 + (i % 3) as f64);
            labels.push(1i64);
        }

        let x = Array2::from_shape_vec((n, 2), data).unwrap();
        let y = Array1::from_vec(labels);
        let names = vec!["V1".to_string(), "V2".to_string()];
        Dataset::new(x, y, names).unwrap()
    }

    #[test]
    fn test_split_is_disjoint_and_complete() {
        let dataset = imbalanced_dataset(100, 10);
        let splitter = StratifiedSplitter::new(0.8).with_seed(42);

        let (train, eval) = splitter.split(&dataset).unwrap();
        assert_eq!(train.n_records() + eval.n_records(), dataset.n_records());

        // Feature rows were built unique, so identity can be checked by value
        let mut seen: Vec<f64> = train
            .features()
            .rows()
            .into_iter()
            .chain(eval.features().rows())
            .map(|row| row[0])
            .collect();
        seen.sort_by(|a, b| a.partial_cmp(b).unwrap());
        seen.dedup();
        assert_eq!(seen.len(), dataset.n_records());
    }

    #[test]
    fn test_split_preserves_class_proportions() {
        let dataset = imbalanced_dataset(100, 10);
        let splitter = StratifiedSplitter::new(0.8).with_seed(42);

        let (train, eval) = splitter.split(&dataset).unwrap();
        let train_balance = train.class_balance();
        let eval_balance = eval.class_balance();

        assert_eq!(train_balance.fraudulent, 8);
        assert_eq!(train_balance.non_fraudulent, 80);
        assert_eq!(eval_balance.fraudulent, 2);
        assert_eq!(eval_balance.non_fraudulent, 20);
    }

    #[test]
    fn test_split_is_deterministic_for_seed() {
        let dataset = imbalanced_dataset(50, 6);
        let splitter = StratifiedSplitter::new(0.75).with_seed(7);

        let (train_a, eval_a) = splitter.split(&dataset).unwrap();
        let (train_b, eval_b) = splitter.split(&dataset).unwrap();

        assert_eq!(train_a.features(), train_b.features());
        assert_eq!(train_a.labels(), train_b.labels());
        assert_eq!(eval_a.features(), eval_b.features());
        assert_eq!(eval_a.labels(), eval_b.labels());
    }

    #[test]
    fn test_invalid_fraction_rejected() {
        let dataset = imbalanced_dataset(10, 2);
        assert!(StratifiedSplitter::new(0.0).split(&dataset).is_err());
        assert!(StratifiedSplitter::new(1.0).split(&dataset).is_err());
        assert!(StratifiedSplitter::new(1.5).split(&dataset).is_err());
    }
}
