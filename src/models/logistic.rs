//! Logistic regression

use crate::error::{FraudBenchError, Result};
use crate::models::{validate_training_set, Classifier};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Binary logistic regression fit by gradient descent on the
/// L2-regularized log loss
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogisticRegression {
    coefficients: Option<Array1<f64>>,
    intercept: Option<f64>,
    /// Regularization strength (L2)
    pub alpha: f64,
    /// Maximum iterations
    pub max_iter: usize,
    /// Convergence tolerance on the gradient norm
    pub tol: f64,
    /// Learning rate
    pub learning_rate: f64,
    is_fitted: bool,
}

impl Default for LogisticRegression {
    fn default() -> Self {
        Self::new()
    }
}

impl LogisticRegression {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            alpha: 0.01,
            max_iter: 1000,
            tol: 1e-6,
            learning_rate: 0.1,
            is_fitted: false,
        }
    }

    /// Set regularization strength
    pub fn with_alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    /// Set maximum iterations
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set learning rate
    pub fn with_learning_rate(mut self, lr: f64) -> Self {
        self.learning_rate = lr;
        self
    }

    fn sigmoid(z: &Array1<f64>) -> Array1<f64> {
        z.mapv(|v| 1.0 / (1.0 + (-v).exp()))
    }
}

impl Classifier for LogisticRegression {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_training_set(x, y)?;

        let n_samples = x.nrows();
        let n_features = x.ncols();

        let mut weights = Array1::zeros(n_features);
        let mut bias = 0.0;

        let lr = self.learning_rate;
        let alpha = self.alpha;

        for _iter in 0..self.max_iter {
            let linear = x.dot(&weights) + bias;
            let predictions = Self::sigmoid(&linear);

            let errors = &predictions - y;
            let dw = (x.t().dot(&errors) / n_samples as f64) + (alpha * &weights);
            let db = errors.mean().unwrap_or(0.0);

            let grad_norm = (dw.mapv(|v| v * v).sum() + db * db).sqrt();
            if grad_norm < self.tol {
                break;
            }

            weights = weights - lr * dw;
            bias -= lr * db;
        }

        self.coefficients = Some(weights);
        self.intercept = Some(bias);
        self.is_fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(FraudBenchError::ModelNotFitted);
        }

        let coefficients = self
            .coefficients
            .as_ref()
            .ok_or(FraudBenchError::ModelNotFitted)?;
        let intercept = self.intercept.unwrap_or(0.0);

        let linear = x.dot(coefficients) + intercept;
        Ok(Self::sigmoid(&linear))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let x = array![
            [0.0, 0.2],
            [0.1, 0.1],
            [0.3, 0.0],
            [0.2, 0.3],
            [5.0, 5.2],
            [5.1, 4.9],
            [4.8, 5.0],
            [5.3, 5.1],
        ];
        let y = array![0.0, 0.0, 0.0, 0.0, 1.0, 1.0, 1.0, 1.0];
        (x, y)
    }

    #[test]
    fn test_separates_clusters() {
        let (x, y) = separable_data();

        let mut model = LogisticRegression::new().with_max_iter(2000);
        model.fit(&x, &y).unwrap();

        let predictions = model.predict(&x).unwrap();
        for (p, t) in predictions.iter().zip(y.iter()) {
            assert_eq!(p, t);
        }
    }

    #[test]
    fn test_probabilities_ordered_by_class() {
        let (x, y) = separable_data();

        let mut model = LogisticRegression::new();
        model.fit(&x, &y).unwrap();

        let proba = model.predict_proba(&x).unwrap();
        let max_neg = proba
            .iter()
            .zip(y.iter())
            .filter(|(_, &t)| t < 0.5)
            .map(|(&p, _)| p)
            .fold(f64::NEG_INFINITY, f64::max);
        let min_pos = proba
            .iter()
            .zip(y.iter())
            .filter(|(_, &t)| t > 0.5)
            .map(|(&p, _)| p)
            .fold(f64::INFINITY, f64::min);
        assert!(min_pos > max_neg);
    }

    #[test]
    fn test_predict_before_fit_fails() {
        let model = LogisticRegression::new();
        let x = array![[1.0, 2.0]];
        assert!(matches!(
            model.predict_proba(&x),
            Err(FraudBenchError::ModelNotFitted)
        ));
    }

    #[test]
    fn test_single_class_rejected() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![1.0, 1.0, 1.0];

        let mut model = LogisticRegression::new();
        assert!(model.fit(&x, &y).is_err());
    }
}
