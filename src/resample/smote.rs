//! Synthetic minority over-sampling with majority subsampling

use crate::data::ClassLabel;
use crate::error::{FraudBenchError, Result};
use crate::resample::{ensure_both_classes, fraud_indices, legit_indices, ResampleResult, Sampler};
use ndarray::{Array1, Array2};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BinaryHeap;

/// Ordered distance/index pair for BinaryHeap-based partial sort
#[derive(Debug, Clone, Copy)]
struct DistIdx(f64, usize);

impl PartialEq for DistIdx {
    fn eq(&self, other: &Self) -> bool {
        self.0 == other.0
    }
}
impl Eq for DistIdx {}
impl PartialOrd for DistIdx {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}
impl Ord for DistIdx {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.partial_cmp(&other.0).unwrap_or(Ordering::Equal)
    }
}

/// SMOTE parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SmoteConfig {
    /// Neighbors considered per fraud record
    pub k_neighbors: usize,
    /// Synthetic records generated per original fraud record
    pub multiplier: f64,
}

impl Default for SmoteConfig {
    fn default() -> Self {
        Self {
            k_neighbors: 5,
            multiplier: 2.0,
        }
    }
}

/// SMOTE: interpolates new fraud records between nearest fraud-class
/// neighbors, then subsamples the non-fraud class toward the enlarged
/// fraud count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Smote {
    config: SmoteConfig,
    seed: Option<u64>,
}

impl Smote {
    pub fn new(config: SmoteConfig) -> Self {
        Self { config, seed: None }
    }

    /// Set the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Euclidean distance
    fn distance(a: &[f64], b: &[f64]) -> f64 {
        a.iter()
            .zip(b.iter())
            .map(|(ai, bi)| (ai - bi).powi(2))
            .sum::<f64>()
            .sqrt()
    }

    /// k nearest neighbors within `data`, excluding the point itself
    fn find_neighbors(point: &[f64], data: &[Vec<f64>], k: usize) -> Vec<usize> {
        let mut heap: BinaryHeap<DistIdx> = BinaryHeap::with_capacity(k + 1);

        for (i, d) in data.iter().enumerate() {
            let dist = Self::distance(point, d);
            if dist <= 0.0 {
                continue;
            }
            if heap.len() < k {
                heap.push(DistIdx(dist, i));
            } else if let Some(&DistIdx(max_dist, _)) = heap.peek() {
                if dist < max_dist {
                    heap.pop();
                    heap.push(DistIdx(dist, i));
                }
            }
        }

        heap.into_iter().map(|DistIdx(_, i)| i).collect()
    }

    /// Interpolate between a record and one of its neighbors
    fn generate_record(point: &[f64], neighbor: &[f64], rng: &mut ChaCha8Rng) -> Vec<f64> {
        let gap: f64 = rng.gen();
        point
            .iter()
            .zip(neighbor.iter())
            .map(|(&p, &n)| p + gap * (n - p))
            .collect()
    }

    fn validate(&self, y: &Array1<i64>) -> Result<()> {
        ensure_both_classes(y)?;
        let n_fraud = fraud_indices(y).len();
        if n_fraud < self.config.k_neighbors + 1 {
            return Err(FraudBenchError::ValidationError(format!(
                "SMOTE with k = {} needs at least {} fraud records, got {}",
                self.config.k_neighbors,
                self.config.k_neighbors + 1,
                n_fraud
            )));
        }
        Ok(())
    }
}

impl Default for Smote {
    fn default() -> Self {
        Self::new(SmoteConfig::default())
    }
}

impl Sampler for Smote {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        self.validate(y)
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        self.validate(y)?;

        let mut rng = match self.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let fraud = fraud_indices(y);
        let legit = legit_indices(y);
        let n_features = x.ncols();

        let fraud_rows: Vec<Vec<f64>> = fraud
            .iter()
            .map(|&i| x.row(i).iter().copied().collect())
            .collect();

        let n_synthetic = (fraud.len() as f64 * self.config.multiplier).round() as usize;
        let k = self.config.k_neighbors;

        let mut synthetic: Vec<Vec<f64>> = Vec::with_capacity(n_synthetic);
        for _ in 0..n_synthetic {
            let idx = rng.gen_range(0..fraud_rows.len());
            let record = &fraud_rows[idx];

            let neighbors = Self::find_neighbors(record, &fraud_rows, k);
            match neighbors.choose(&mut rng) {
                Some(&neighbor_idx) => {
                    synthetic.push(Self::generate_record(
                        record,
                        &fraud_rows[neighbor_idx],
                        &mut rng,
                    ));
                }
                // All fraud rows coincide with this one; interpolation
                // degenerates to duplication
                None => synthetic.push(record.clone()),
            }
        }

        // Subsample the non-fraud class toward the enlarged fraud count
        let target_legit = (fraud.len() + n_synthetic).min(legit.len());
        let mut kept_legit = legit;
        kept_legit.shuffle(&mut rng);
        kept_legit.truncate(target_legit);

        let mut selected: Vec<usize> = fraud;
        selected.extend(kept_legit);
        selected.sort_unstable();

        let n_selected = selected.len();
        let n_total = n_selected + synthetic.len();
        let result_x = Array2::from_shape_fn((n_total, n_features), |(i, j)| {
            if i < n_selected {
                x[[selected[i], j]]
            } else {
                synthetic[i - n_selected][j]
            }
        });

        let mut result_y: Vec<i64> = selected.iter().map(|&i| y[i]).collect();
        result_y.extend(std::iter::repeat(ClassLabel::Fraudulent.code()).take(synthetic.len()));

        Ok(ResampleResult {
            x: result_x,
            y: Array1::from_vec(result_y),
            n_added: n_synthetic,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClassBalance;

    fn imbalanced_data() -> (Array2<f64>, Array1<i64>) {
        // 40 non-fraud around the origin, 8 fraud around (10, 10)
        let mut data = Vec::new();
        let mut labels = Vec::new();

        for i in 0..40 {
            data.push((i % 8) as f64 * 0.5);
            data.push((i / 8) as f64 * 0.5);
            labels.push(0i64);
        }
        for i in 0..8 {
            data.push(10.0 + (i % 4) as f64);
            data.push(10.0 + (i / 4) as f64);
            labels.push(1i64);
        }

        let x = Array2::from_shape_vec((48, 2), data).unwrap();
        let y = Array1::from_vec(labels);
        (x, y)
    }

    #[test]
    fn test_smote_enlarges_fraud_class_by_multiplier() {
        let (x, y) = imbalanced_data();

        let mut smote = Smote::new(SmoteConfig {
            k_neighbors: 3,
            multiplier: 2.0,
        })
        .with_seed(42);

        let result = smote.fit_resample(&x, &y).unwrap();
        let balance = ClassBalance::from_labels(&result.y);

        // 8 original + round(8 * 2.0) synthetic
        assert_eq!(balance.fraudulent, 24);
        assert_eq!(result.n_added, 16);
    }

    #[test]
    fn test_smote_approaches_class_balance() {
        let (x, y) = imbalanced_data();

        let mut smote = Smote::new(SmoteConfig {
            k_neighbors: 3,
            multiplier: 2.0,
        })
        .with_seed(42);

        let result = smote.fit_resample(&x, &y).unwrap();
        let balance = ClassBalance::from_labels(&result.y);

        assert_eq!(balance.non_fraudulent, balance.fraudulent.min(40));
    }

    #[test]
    fn test_synthetic_records_lie_between_fraud_records() {
        let (x, y) = imbalanced_data();

        let mut smote = Smote::new(SmoteConfig {
            k_neighbors: 3,
            multiplier: 3.0,
        })
        .with_seed(7);

        let result = smote.fit_resample(&x, &y).unwrap();

        // Interpolation keeps every synthetic coordinate inside the
        // fraud-class bounding box
        for (i, &label) in result.y.iter().enumerate() {
            if label != 1 {
                continue;
            }
            for j in 0..result.x.ncols() {
                let v = result.x[[i, j]];
                assert!(v >= 10.0 && v <= 13.0, "coordinate {} out of range", v);
            }
        }
    }

    #[test]
    fn test_smote_rejects_tiny_fraud_class() {
        let mut data = Vec::new();
        let mut labels = Vec::new();
        for i in 0..10 {
            data.push(i as f64);
            data.push(0.0);
            labels.push(0i64);
        }
        for i in 0..3 {
            data.push(20.0 + i as f64);
            data.push(1.0);
            labels.push(1i64);
        }
        let x = Array2::from_shape_vec((13, 2), data).unwrap();
        let y = Array1::from_vec(labels);

        let mut smote = Smote::new(SmoteConfig {
            k_neighbors: 5,
            multiplier: 2.0,
        })
        .with_seed(1);

        let result = smote.fit_resample(&x, &y);
        assert!(matches!(result, Err(FraudBenchError::ValidationError(_))));
    }

    #[test]
    fn test_smote_is_deterministic_for_seed() {
        let (x, y) = imbalanced_data();
        let config = SmoteConfig {
            k_neighbors: 3,
            multiplier: 1.5,
        };

        let a = Smote::new(config.clone()).with_seed(11).fit_resample(&x, &y).unwrap();
        let b = Smote::new(config).with_seed(11).fit_resample(&x, &y).unwrap();

        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
    }
}
