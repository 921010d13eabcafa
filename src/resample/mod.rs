//! Imbalance-aware resampling strategies
//!
//! Derives alternative training sets from one imbalanced training set:
//! - Identity (imbalanced baseline)
//! - Random over-sampling of the fraud class
//! - Random under-sampling of the non-fraud class
//! - SMOTE interpolation combined with majority subsampling

mod random_sampling;
mod smote;

pub use random_sampling::{RandomOverSampler, RandomUnderSampler};
pub use smote::{Smote, SmoteConfig};

use crate::data::ClassLabel;
use crate::error::{FraudBenchError, Result};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};

/// Result of resampling one training set
#[derive(Debug, Clone)]
pub struct ResampleResult {
    /// Resampled features
    pub x: Array2<f64>,
    /// Resampled labels
    pub y: Array1<i64>,
    /// Records added relative to the input (duplicates or synthetic)
    pub n_added: usize,
}

/// Trait for resampling strategies
pub trait Sampler: Send + Sync {
    /// Validate the sampler against data before resampling
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<()>;

    /// Derive a resampled training set
    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult>;

    /// Fit and resample in one step
    fn fit_resample(&mut self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        self.fit(x, y)?;
        self.resample(x, y)
    }
}

/// Identity strategy: the unchanged training set
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct IdentitySampler;

impl Sampler for IdentitySampler {
    fn fit(&mut self, _x: &Array2<f64>, _y: &Array1<i64>) -> Result<()> {
        Ok(())
    }

    fn resample(&self, x: &Array2<f64>, y: &Array1<i64>) -> Result<ResampleResult> {
        Ok(ResampleResult {
            x: x.clone(),
            y: y.clone(),
            n_added: 0,
        })
    }
}

/// Row indices of fraudulent records
pub(crate) fn fraud_indices(y: &Array1<i64>) -> Vec<usize> {
    indices_of(y, ClassLabel::Fraudulent)
}

/// Row indices of non-fraudulent records
pub(crate) fn legit_indices(y: &Array1<i64>) -> Vec<usize> {
    indices_of(y, ClassLabel::NonFraudulent)
}

fn indices_of(y: &Array1<i64>, label: ClassLabel) -> Vec<usize> {
    y.iter()
        .enumerate()
        .filter(|(_, &v)| v == label.code())
        .map(|(i, _)| i)
        .collect()
}

/// Fail unless both classes are present
pub(crate) fn ensure_both_classes(y: &Array1<i64>) -> Result<()> {
    let fraud = y
        .iter()
        .filter(|&&v| v == ClassLabel::Fraudulent.code())
        .count();
    if fraud == 0 || fraud == y.len() {
        return Err(FraudBenchError::ValidationError(
            "resampling requires both classes in the training set".to_string(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_identity_returns_input_unchanged() {
        let x = array![[1.0, 2.0], [3.0, 4.0], [5.0, 6.0]];
        let y = array![0i64, 0, 1];

        let mut sampler = IdentitySampler;
        let result = sampler.fit_resample(&x, &y).unwrap();

        assert_eq!(result.x, x);
        assert_eq!(result.y, y);
        assert_eq!(result.n_added, 0);
    }

    #[test]
    fn test_ensure_both_classes() {
        assert!(ensure_both_classes(&array![0i64, 1, 0]).is_ok());
        assert!(ensure_both_classes(&array![0i64, 0, 0]).is_err());
        assert!(ensure_both_classes(&array![1i64, 1]).is_err());
    }
}
