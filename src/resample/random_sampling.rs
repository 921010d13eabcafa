//! Random over- and under-sampling

use crate::data::ClassLabel;
use crate::error::Result;
use crate::resample::{ensure_both_classes, fraud_indices, legit_indices, ResampleResult, Sampler};
use ndarray::{Array1, Array2, Axis};
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

fn seeded_rng(seed: Option<u64>) -> ChaCha8Rng {
    match seed {
        Some(seed) => ChaCha8Rng::seed_from_u64(seed),
        None => ChaCha8Rng::from_entropy(),
    }
}

/// Replicates fraudulent records with replacement until the class counts
/// are equal. Every original record is retained.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomOverSampler {
    seed: Option<u64>,
}

impl RandomOverSampler {
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Set the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for RandomOverSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomOverSampler {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        ensure_both_classes(y)
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        ensure_both_classes(y)?;

        let fraud = fraud_indices(y);
        let legit = legit_indices(y);
        let n_to_add = legit.len().saturating_sub(fraud.len());

        let mut rng = seeded_rng(self.seed);
        let extra: Vec<usize> = (0..n_to_add)
            .map(|_| fraud[rng.gen_range(0..fraud.len())])
            .collect();

        let n_original = x.nrows();
        let result_x = Array2::from_shape_fn((n_original + n_to_add, x.ncols()), |(i, j)| {
            if i < n_original {
                x[[i, j]]
            } else {
                x[[extra[i - n_original], j]]
            }
        });

        let mut result_y: Vec<i64> = y.iter().copied().collect();
        result_y.extend(std::iter::repeat(ClassLabel::Fraudulent.code()).take(n_to_add));

        Ok(ResampleResult {
            x: result_x,
            y: Array1::from_vec(result_y),
            n_added: n_to_add,
        })
    }
}

/// Keeps every fraudulent record and a without-replacement subset of
/// non-fraudulent records of equal size.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RandomUnderSampler {
    seed: Option<u64>,
}

impl RandomUnderSampler {
    pub fn new() -> Self {
        Self { seed: None }
    }

    /// Set the sampling seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }
}

impl Default for RandomUnderSampler {
    fn default() -> Self {
        Self::new()
    }
}

impl Sampler for RandomUnderSampler {
    fn fit(&mut self, _x: &Array2<f64>, y: &Array1<i64>) -> Result<()> {
        ensure_both_classes(y)
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        ensure_both_classes(y)?;

        let fraud = fraud_indices(y);
        let legit = legit_indices(y);
        let n_keep = fraud.len().min(legit.len());

        let mut rng = seeded_rng(self.seed);
        let mut kept_legit = legit;
        kept_legit.shuffle(&mut rng);
        kept_legit.truncate(n_keep);

        let mut selected: Vec<usize> = fraud;
        selected.extend(kept_legit);
        selected.sort_unstable();

        Ok(ResampleResult {
            x: x.select(Axis(0), &selected),
            y: y.select(Axis(0), &selected),
            n_added: 0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::ClassBalance;
    use ndarray::Array2;

    fn imbalanced_data() -> (Array2<f64>, Array1<i64>) {
        // 30 non-fraud rows with unique first features, 5 fraud rows
        let mut data = Vec::new();
        let mut labels = Vec::new();

        for i in 0..30 {
            data.push(i as f64);
            data.push((i % 6) as f64);
            labels.push(0i64);
        }
        for i in 0..5 {
            data.push(100.0 + i as f64);
            data.push(10.0 + (i % 3) as f64);
            labels.push(1i64);
        }

        let x = Array2::from_shape_vec((35, 2), data).unwrap();
        let y = Array1::from_vec(labels);
        (x, y)
    }

    #[test]
    fn test_oversampler_balances_classes() {
        let (x, y) = imbalanced_data();

        let mut sampler = RandomOverSampler::new().with_seed(42);
        let result = sampler.fit_resample(&x, &y).unwrap();

        let balance = ClassBalance::from_labels(&result.y);
        assert_eq!(balance.fraudulent, balance.non_fraudulent);
        assert_eq!(result.n_added, 25);
    }

    #[test]
    fn test_oversampler_keeps_every_original_record() {
        let (x, y) = imbalanced_data();

        let mut sampler = RandomOverSampler::new().with_seed(42);
        let result = sampler.fit_resample(&x, &y).unwrap();

        // Original rows come first, unchanged
        for i in 0..x.nrows() {
            for j in 0..x.ncols() {
                assert_eq!(result.x[[i, j]], x[[i, j]]);
            }
            assert_eq!(result.y[i], y[i]);
        }

        // Added rows all duplicate existing fraud rows
        let fraud_firsts: Vec<f64> = fraud_indices(&y).iter().map(|&i| x[[i, 0]]).collect();
        for i in x.nrows()..result.x.nrows() {
            assert_eq!(result.y[i], 1);
            assert!(fraud_firsts.contains(&result.x[[i, 0]]));
        }
    }

    #[test]
    fn test_undersampler_balances_classes() {
        let (x, y) = imbalanced_data();

        let mut sampler = RandomUnderSampler::new().with_seed(42);
        let result = sampler.fit_resample(&x, &y).unwrap();

        let balance = ClassBalance::from_labels(&result.y);
        assert_eq!(balance.fraudulent, 5);
        assert_eq!(balance.non_fraudulent, 5);
        assert_eq!(result.n_added, 0);
    }

    #[test]
    fn test_undersampler_negatives_are_strict_subset() {
        let (x, y) = imbalanced_data();

        let mut sampler = RandomUnderSampler::new().with_seed(42);
        let result = sampler.fit_resample(&x, &y).unwrap();

        // First features of non-fraud rows are unique, so duplicates and
        // membership can be checked by value
        let original: Vec<f64> = legit_indices(&y).iter().map(|&i| x[[i, 0]]).collect();
        let mut kept: Vec<f64> = result
            .y
            .iter()
            .enumerate()
            .filter(|(_, &label)| label == 0)
            .map(|(i, _)| result.x[[i, 0]])
            .collect();

        assert!(kept.iter().all(|v| original.contains(v)));
        assert!(kept.len() < original.len());

        let n_kept = kept.len();
        kept.sort_by(|a, b| a.partial_cmp(b).unwrap());
        kept.dedup();
        assert_eq!(kept.len(), n_kept, "under-sampling must not duplicate");
    }

    #[test]
    fn test_samplers_reject_single_class() {
        let x = Array2::zeros((4, 2));
        let y = Array1::from_vec(vec![0i64, 0, 0, 0]);

        assert!(RandomOverSampler::new().fit_resample(&x, &y).is_err());
        assert!(RandomUnderSampler::new().fit_resample(&x, &y).is_err());
    }

    #[test]
    fn test_sampling_is_deterministic_for_seed() {
        let (x, y) = imbalanced_data();

        let a = RandomOverSampler::new().with_seed(9).fit_resample(&x, &y).unwrap();
        let b = RandomOverSampler::new().with_seed(9).fit_resample(&x, &y).unwrap();
        assert_eq!(a.x, b.x);
        assert_eq!(a.y, b.y);
    }
}
