//! Gaussian discriminant classifiers
//!
//! Both models assume per-class multivariate Gaussian features. Linear
//! discriminant analysis pools one covariance matrix across the classes,
//! giving a linear decision boundary; quadratic discriminant analysis
//! estimates one covariance matrix per class, giving a quadratic one.

use crate::error::{FraudBenchError, Result};
use crate::models::{validate_training_set, Classifier};
use ndarray::{Array1, Array2};
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;

/// Matrix inversion via Gauss-Jordan elimination with partial pivoting
fn matrix_inverse(m: &Array2<f64>) -> Option<Array2<f64>> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut aug = Array2::zeros((n, 2 * n));
    for i in 0..n {
        for j in 0..n {
            aug[[i, j]] = m[[i, j]];
        }
        aug[[i, n + i]] = 1.0;
    }

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if aug[[row, col]].abs() > aug[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..2 * n {
                let tmp = aug[[col, j]];
                aug[[col, j]] = aug[[max_row, j]];
                aug[[max_row, j]] = tmp;
            }
        }

        let pivot = aug[[col, col]];
        if !pivot.is_finite() || pivot.abs() < 1e-10 {
            return None;
        }

        for j in 0..2 * n {
            aug[[col, j]] /= pivot;
        }

        for row in 0..n {
            if row != col {
                let factor = aug[[row, col]];
                for j in 0..2 * n {
                    aug[[row, j]] -= factor * aug[[col, j]];
                }
            }
        }
    }

    let mut inv = Array2::zeros((n, n));
    for i in 0..n {
        for j in 0..n {
            inv[[i, j]] = aug[[i, n + j]];
        }
    }

    Some(inv)
}

/// Log-determinant of a positive-definite matrix via Gaussian elimination.
/// Returns None when the matrix is singular or not positive-definite.
fn log_determinant(m: &Array2<f64>) -> Option<f64> {
    let n = m.nrows();
    if n != m.ncols() {
        return None;
    }

    let mut a = m.clone();
    let mut log_det = 0.0;
    let mut sign = 1.0f64;

    for col in 0..n {
        let mut max_row = col;
        for row in col + 1..n {
            if a[[row, col]].abs() > a[[max_row, col]].abs() {
                max_row = row;
            }
        }

        if max_row != col {
            for j in 0..n {
                let tmp = a[[col, j]];
                a[[col, j]] = a[[max_row, j]];
                a[[max_row, j]] = tmp;
            }
            sign = -sign;
        }

        let pivot = a[[col, col]];
        if !pivot.is_finite() || pivot.abs() < 1e-12 {
            return None;
        }
        if pivot < 0.0 {
            sign = -sign;
        }
        log_det += pivot.abs().ln();

        for row in col + 1..n {
            let factor = a[[row, col]] / pivot;
            for j in col..n {
                a[[row, j]] -= factor * a[[col, j]];
            }
        }
    }

    if sign < 0.0 {
        return None;
    }
    Some(log_det)
}

/// Mean vector over the rows at the given indices
fn class_mean(x: &Array2<f64>, indices: &[usize]) -> Array1<f64> {
    let mut mean = Array1::zeros(x.ncols());
    for &i in indices {
        mean = mean + x.row(i);
    }
    mean / indices.len() as f64
}

/// Sum of outer products of centered rows (unnormalized scatter)
fn class_scatter(x: &Array2<f64>, indices: &[usize], mean: &Array1<f64>) -> Array2<f64> {
    let d = x.ncols();
    let mut scatter = Array2::zeros((d, d));
    for &i in indices {
        let centered = &x.row(i).to_owned() - mean;
        for a in 0..d {
            for b in 0..d {
                scatter[[a, b]] += centered[a] * centered[b];
            }
        }
    }
    scatter
}

fn split_by_class(y: &Array1<f64>) -> (Vec<usize>, Vec<usize>) {
    let mut legit = Vec::new();
    let mut fraud = Vec::new();
    for (i, &v) in y.iter().enumerate() {
        if v > 0.5 {
            fraud.push(i);
        } else {
            legit.push(i);
        }
    }
    (legit, fraud)
}

/// Linear discriminant analysis: shared covariance, linear log-odds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LinearDiscriminant {
    coefficients: Option<Array1<f64>>,
    intercept: Option<f64>,
    is_fitted: bool,
}

impl Default for LinearDiscriminant {
    fn default() -> Self {
        Self::new()
    }
}

impl LinearDiscriminant {
    pub fn new() -> Self {
        Self {
            coefficients: None,
            intercept: None,
            is_fitted: false,
        }
    }
}

impl Classifier for LinearDiscriminant {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_training_set(x, y)?;

        let n_samples = x.nrows();
        if n_samples < 3 {
            return Err(FraudBenchError::ValidationError(
                "pooled covariance needs at least 3 records".to_string(),
            ));
        }

        let (legit, fraud) = split_by_class(y);
        let mean_legit = class_mean(x, &legit);
        let mean_fraud = class_mean(x, &fraud);

        let scatter = class_scatter(x, &legit, &mean_legit) + class_scatter(x, &fraud, &mean_fraud);
        let pooled = scatter / (n_samples - 2) as f64;

        let precision = matrix_inverse(&pooled).ok_or_else(|| {
            FraudBenchError::ComputationError("pooled covariance matrix is singular".to_string())
        })?;

        let mean_diff = &mean_fraud - &mean_legit;
        let coefficients = precision.dot(&mean_diff);

        let prior_fraud = fraud.len() as f64 / n_samples as f64;
        let prior_legit = legit.len() as f64 / n_samples as f64;
        let midpoint = (&mean_fraud + &mean_legit) * 0.5;
        let intercept = -midpoint.dot(&coefficients) + (prior_fraud / prior_legit).ln();

        self.coefficients = Some(coefficients);
        self.intercept = Some(intercept);
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

        let log_odds = x.dot(coefficients) + intercept;
        Ok(log_odds.mapv(|v| 1.0 / (1.0 + (-v).exp())))
    }
}

/// Per-class Gaussian density parameters for quadratic discrimination
#[derive(Debug, Clone, Serialize, Deserialize)]
struct GaussianDensity {
    mean: Array1<f64>,
    precision: Array2<f64>,
    log_det: f64,
    log_prior: f64,
}

impl GaussianDensity {
    fn estimate(x: &Array2<f64>, indices: &[usize], n_total: usize, label: &str) -> Result<Self> {
        if indices.len() < 2 {
            return Err(FraudBenchError::ValidationError(format!(
                "{} class needs at least 2 records for a covariance estimate",
                label
            )));
        }

        let mean = class_mean(x, indices);
        let covariance = class_scatter(x, indices, &mean) / (indices.len() - 1) as f64;

        let precision = matrix_inverse(&covariance).ok_or_else(|| {
            FraudBenchError::ComputationError(format!(
                "{} class covariance matrix is singular",
                label
            ))
        })?;
        let log_det = log_determinant(&covariance).ok_or_else(|| {
            FraudBenchError::ComputationError(format!(
                "{} class covariance matrix is singular",
                label
            ))
        })?;

        Ok(Self {
            mean,
            precision,
            log_det,
            log_prior: (indices.len() as f64 / n_total as f64).ln(),
        })
    }

    /// Log posterior term up to the shared evidence constant
    fn log_posterior(&self, row: &Array1<f64>) -> f64 {
        let d = row.len() as f64;
        let centered = row - &self.mean;
        let quad = centered.dot(&self.precision.dot(&centered));
        self.log_prior - 0.5 * (self.log_det + quad + d * (2.0 * PI).ln())
    }
}

/// Quadratic discriminant analysis: per-class covariance, quadratic log-odds
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuadraticDiscriminant {
    legit: Option<GaussianDensity>,
    fraud: Option<GaussianDensity>,
    is_fitted: bool,
}

impl Default for QuadraticDiscriminant {
    fn default() -> Self {
        Self::new()
    }
}

impl QuadraticDiscriminant {
    pub fn new() -> Self {
        Self {
            legit: None,
            fraud: None,
            is_fitted: false,
        }
    }
}

impl Classifier for QuadraticDiscriminant {
    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<()> {
        validate_training_set(x, y)?;

        let (legit, fraud) = split_by_class(y);
        let n_total = x.nrows();

        self.legit = Some(GaussianDensity::estimate(
            x,
            &legit,
            n_total,
            "non-fraudulent",
        )?);
        self.fraud = Some(GaussianDensity::estimate(x, &fraud, n_total, "fraudulent")?);
        self.is_fitted = true;
        Ok(())
    }

    fn predict_proba(&self, x: &Array2<f64>) -> Result<Array1<f64>> {
        if !self.is_fitted {
            return Err(FraudBenchError::ModelNotFitted);
        }

        let legit = self.legit.as_ref().ok_or(FraudBenchError::ModelNotFitted)?;
        let fraud = self.fraud.as_ref().ok_or(FraudBenchError::ModelNotFitted)?;

        let proba = x
            .rows()
            .into_iter()
            .map(|row| {
                let row = row.to_owned();
                let log_odds = fraud.log_posterior(&row) - legit.log_posterior(&row);
                1.0 / (1.0 + (-log_odds).exp())
            })
            .collect();
        Ok(proba)
    }
}
