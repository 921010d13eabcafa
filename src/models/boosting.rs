//! Gradient-boosted trees for binary classification
//!
//! Shallow regression trees fit sequentially to the logistic-loss
//! gradient, with shrinkage and row subsampling.

use crate::error::{FraudBenchError, Result};
use crate::models::{validate_training_set, Classifier, RegressionTree};
use ndarray::{Array1, Array2};
use rand::prelude::*;
use rand_xoshiro::Xoshiro256PlusPlus;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

/// Gradient boosting configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingConfig {
    /// Number of boosting rounds (trees)
    pub n_estimators: usize,
    /// Learning rate (shrinkage)
    pub learning_rate: f64,
    /// Maximum tree depth
    pub max_depth: usize,
    /// Minimum samples per leaf
    pub min_samples_leaf: usize,
    /// Row subsample ratio per tree
    pub subsample: f64,
    /// Random seed
    pub random_state: Option<u64>,
}

impl Default for GradientBoostingConfig {
    fn default() -> Self {
        Self {
            n_estimators: 100,
            learning_rate: 0.1,
            max_depth: 3,
            min_samples_leaf: 1,
            subsample: 0.8,
            random_state: Some(42),
        }
    }
}

/// Gradient-boosted tree classifier
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GradientBoostingClassifier {
    config: GradientBoostingConfig,
    trees: Vec<RegressionTree>,
    initial_log_odds: f64,
    is_fitted: bool,
}

impl GradientBoostingClassifier {
    pub fn new(config: GradientBoostingConfig) -> Self {
        Self {
            config,
            trees: Vec::new(),
            initial_log_odds: 0.0,
            is_fitted: false,
        }
    }

    fn subsample_indices(&self, n: usize, rng: &mut Xoshiro256PlusPlus) -> Vec<usize> {
        let sample_size = ((n as f64) * self.config.subsample).ceil() as usize;
        let mut indices: Vec<usize> = (0..n).collect();
        indices.shuffle(rng);
        indices.truncate(sample_size.min(n));
        indices.sort_unstable();
        indices
    }

    fn subsample_data(
        x: &Array2<f64>,
        residuals: &Array1<f64>,
        row_indices: &[usize],
    ) -> (Array2<f64>, Array1<f64>) {
        let x_sub = x.select(ndarray::Axis(0), row_indices);
        let y_sub: Array1<f64> =
            Array1::from_vec(row_indices.iter().map(|&i| residuals[i]).collect());
        (x_sub, y_sub)
    }
}

impl Default for GradientBoostingClassifier {
    fn default() -> Self {
        Self::new(GradientBoostingConfig::default())
    }
}

impl Classifier for GradientBoostingClassifier {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_training_set(x, y)?;

        let n_samples = x.nrows();

        let p = y.mean().unwrap_or(0.5);
        self.initial_log_odds = (p / (1.0 - p + 1e-10)).ln();

        let mut log_odds = Array1::from_elem(n_samples, self.initial_log_odds);

        let mut rng = match self.config.random_state {
            Some(seed) => Xoshiro256PlusPlus::seed_from_u64(seed),
            None => Xoshiro256PlusPlus::from_entropy(),
        };

        self.trees = Vec::with_capacity(self.config.n_estimators);

        for _ in 0..self.config.n_estimators {
            // Gradient of the log loss: residual = y - p
            let residuals: Array1<f64> = if n_samples > 10_000 {
                let lo = &log_odds;
                let res: Vec<f64> = (0..n_samples)
                    .into_par_iter()
                    .map(|i| y[i] - 1.0 / (1.0 + (-lo[i]).exp()))
                    .collect();
                Array1::from_vec(res)
            } else {
                y.iter()
                    .zip(log_odds.iter())
                    .map(|(yi, &lo)| yi - 1.0 / (1.0 + (-lo).exp()))
                    .collect()
            };

            let sample_indices = self.subsample_indices(n_samples, &mut rng);
            let (x_sub, y_sub) = Self::subsample_data(x, &residuals, &sample_indices);

            let mut tree = RegressionTree::new()
                .with_max_depth(self.config.max_depth)
                .with_min_samples_leaf(self.config.min_samples_leaf);
            tree.fit(&x_sub, &y_sub)?;

            let tree_pred = tree.predict(&x_sub)?;
            for (i, &idx) in sample_indices.iter().enumerate() {
                log_odds[idx] += self.config.learning_rate * tree_pred[i];
            }

            self.trees.push(tree);
        }

        self.is_fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(FraudBenchError::ModelNotFitted);
        }

        let n = x.nrows();
        let mut log_odds = Array1::from_elem(n, self.initial_log_odds);

        for tree in &self.trees {
            let tree_pred = tree.predict(x)?;
            for i in 0..n {
                log_odds[i] += self.config.learning_rate * tree_pred[i];
            }
        }

        Ok(log_odds.mapv(|lo| 1.0 / (1.0 + (-lo).exp())))
    }
}
