//! Fraud classifier implementations
//!
//! Provides the model types compared by the benchmark:
//! - Logistic regression
//! - Linear and quadratic discriminant analysis
//! - Gradient-boosted regression trees

mod boosting;
mod discriminant;
mod logistic;
mod tree;

pub use boosting::{GradientBoostingClassifier, GradientBoostingConfig};
pub use discriminant::{LinearDiscriminant, QuadraticDiscriminant};
pub use logistic::LogisticRegression;
pub use tree::RegressionTree;

use crate::error::{FraudBenchError, Result};
use ndarray::{Array1, Array2};

/// Trait for binary classifiers scored by probability of fraud
pub trait Classifier: Send + Sync {
    /// Fit the model to training data; labels are 0.0 or 1.0
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()>;

    /// Estimated probability of the fraudulent class per record
    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>>;

    /// Discrete labels at the 0.5 threshold
    fn predict(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        let proba = self.predict_proba(x)?;
        Ok(proba.mapv(|p| if p > 0.5 { 1.0 } else { 0.0 }))
    }
}

/// Shared fit-time validation: shapes line up and both classes are present
pub(crate) fn validate_training_set(x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
    if x.nrows() != y.len() {
        return Err(FraudBenchError::ShapeError {
            expected: format!("y length = {}", x.nrows()),
            actual: format!("y length = {}", y.len()),
        });
    }
    let n_fraud = y.iter().filter(|&&v| v > 0.5).count();
    if n_fraud == 0 || n_fraud == y.len() {
        return Err(FraudBenchError::ValidationError(
            "training set must contain both classes".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_validate_training_set() {
        let x = array![[1.0], [2.0], [3.0]];
        assert!(validate_training_set(&x, &array![0.0, 1.0, 0.0]).is_ok());
        assert!(validate_training_set(&x, &array![0.0, 0.0, 0.0]).is_err());
        assert!(validate_training_set(&x, &array![1.0, 1.0, 1.0]).is_err());
        assert!(validate_training_set(&x, &array![0.0, 1.0]).is_err());
    }
}
