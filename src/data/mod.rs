//! Transaction dataset loading and schema validation
//!
//! Reads a labeled tabular dataset, drops the non-predictive temporal
//! column, and coerces the target column into a two-level categorical
//! label. The loaded [`Dataset`] is immutable; downstream stages derive
//! new sets from it rather than mutating it.

mod split;

pub use split::StratifiedSplitter;

use crate::error::{FraudBenchError, Result};
use ndarray::{Array1, Array2, Axis};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::Path;
use tracing::info;

/// Two-level transaction label
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClassLabel {
    NonFraudulent,
    Fraudulent,
}

impl ClassLabel {
    /// Integer code used in the raw data and in label vectors
    pub const fn code(self) -> i64 {
        match self {
            ClassLabel::NonFraudulent => 0,
            ClassLabel::Fraudulent => 1,
        }
    }

    /// Map a raw integer value to a label, if it is one of the two levels
    pub fn from_code(code: i64) -> Option<Self> {
        match code {
            0 => Some(ClassLabel::NonFraudulent),
            1 => Some(ClassLabel::Fraudulent),
            _ => None,
        }
    }
}

impl fmt::Display for ClassLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ClassLabel::NonFraudulent => write!(f, "non-fraudulent"),
            ClassLabel::Fraudulent => write!(f, "fraudulent"),
        }
    }
}

/// Loader configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetConfig {
    /// Name of the binary target column
    pub target_column: String,
    /// Columns removed before feature extraction
    pub drop_columns: Vec<String>,
}

impl Default for DatasetConfig {
    fn default() -> Self {
        Self {
            target_column: "Class".to_string(),
            drop_columns: vec!["Time".to_string()],
        }
    }
}

impl DatasetConfig {
    /// Create a config for the given target column
    pub fn new(target_column: impl Into<String>) -> Self {
        Self {
            target_column: target_column.into(),
            ..Self::default()
        }
    }

    /// Set the columns to drop before feature extraction
    pub fn with_drop_columns(mut self, columns: Vec<String>) -> Self {
        self.drop_columns = columns;
        self
    }
}

/// Class counts and imbalance ratio for one label vector
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassBalance {
    pub non_fraudulent: usize,
    pub fraudulent: usize,
    /// Share of fraudulent records, in [0, 1]
    pub fraud_ratio: f64,
}

impl ClassBalance {
    /// Count both classes in a label vector
    pub fn from_labels(y: &Array1<i64>) -> Self {
        let fraudulent = y
            .iter()
            .filter(|&&v| v == ClassLabel::Fraudulent.code())
            .count();
        let non_fraudulent = y.len() - fraudulent;
        let fraud_ratio = if y.is_empty() {
            0.0
        } else {
            fraudulent as f64 / y.len() as f64
        };
        Self {
            non_fraudulent,
            fraudulent,
            fraud_ratio,
        }
    }
}

/// A loaded transaction dataset: feature matrix, binary labels, column names
#[derive(Debug, Clone)]
pub struct Dataset {
    x: Array2<f64>,
    y: Array1<i64>,
    feature_names: Vec<String>,
}

impl Dataset {
    /// Build a dataset from pre-extracted arrays, validating the schema
    pub fn new(x: Array2<f64>, y: Array1<i64>, feature_names: Vec<String>) -> Result<Self> {
        if x.nrows() != y.len() {
            return Err(FraudBenchError::ShapeError {
                expected: format!("{} labels", x.nrows()),
                actual: format!("{} labels", y.len()),
            });
        }
        if feature_names.len() != x.ncols() {
            return Err(FraudBenchError::ShapeError {
                expected: format!("{} feature names", x.ncols()),
                actual: format!("{} feature names", feature_names.len()),
            });
        }
        for &label in y.iter() {
            if ClassLabel::from_code(label).is_none() {
                return Err(FraudBenchError::DataError(format!(
                    "target contains non-binary value {}",
                    label
                )));
            }
        }
        Ok(Self {
            x,
            y,
            feature_names,
        })
    }

    /// Extract features and labels from a DataFrame
    pub fn from_dataframe(df: &DataFrame, config: &DatasetConfig) -> Result<Self> {
        let mut df = df.clone();
        for name in &config.drop_columns {
            if df.get_column_names().iter().any(|c| c.as_str() == name.as_str()) {
                df = df.drop(name)?;
            }
        }

        let target = df
            .column(&config.target_column)
            .map_err(|_| FraudBenchError::ColumnNotFound(config.target_column.clone()))?;
        if target.null_count() > 0 {
            return Err(FraudBenchError::DataError(format!(
                "target column {} contains nulls",
                config.target_column
            )));
        }
        let target_i64 = target.cast(&DataType::Int64)?;
        let y: Array1<i64> = target_i64
            .i64()
            .map_err(|e| FraudBenchError::DataError(e.to_string()))?
            .into_iter()
            .map(|v| v.unwrap_or(0))
            .collect();

        let feature_names: Vec<String> = df
            .get_column_names()
            .into_iter()
            .filter(|name| name.as_str() != config.target_column)
            .map(|s| s.to_string())
            .collect();
        if feature_names.is_empty() {
            return Err(FraudBenchError::DataError(
                "no feature columns remain after dropping".to_string(),
            ));
        }

        let x = columns_to_array2(&df, &feature_names)?;
        let dataset = Self::new(x, y, feature_names)?;
        info!(
            rows = dataset.n_records(),
            features = dataset.n_features(),
            "loaded transaction dataset"
        );
        Ok(dataset)
    }

    /// Number of records
    pub fn n_records(&self) -> usize {
        self.x.nrows()
    }

    /// Number of feature columns
    pub fn n_features(&self) -> usize {
        self.x.ncols()
    }

    /// Feature matrix, one row per record
    pub fn features(&self) -> &Array2<f64> {
        &self.x
    }

    /// Label vector restricted to {0, 1}
    pub fn labels(&self) -> &Array1<i64> {
        &self.y
    }

    /// Feature column names
    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Class counts for the whole dataset
    pub fn class_balance(&self) -> ClassBalance {
        ClassBalance::from_labels(&self.y)
    }

    /// Subset of records by row index
    pub fn select(&self, indices: &[usize]) -> Dataset {
        Dataset {
            x: self.x.select(Axis(0), indices),
            y: self.y.select(Axis(0), indices),
            feature_names: self.feature_names.clone(),
        }
    }
}

/// Load a CSV file with a header row
pub fn load_csv(path: impl AsRef<Path>, config: &DatasetConfig) -> Result<Dataset> {
    let df = CsvReadOptions::default()
        .with_infer_schema_length(Some(1000))
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.as_ref().to_path_buf()))?
        .finish()?;
    Dataset::from_dataframe(&df, config)
}

/// Extract named columns from a DataFrame into a row-major Array2<f64>.
/// Columns must be fully populated; nulls are a schema error, not data.
fn columns_to_array2(df: &DataFrame, col_names: &[String]) -> Result<Array2<f64>> {
    let n_rows = df.height();
    let n_cols = col_names.len();

    let col_data: Vec<Vec<f64>> = col_names
        .iter()
        .map(|col_name| {
            let series = df
                .column(col_name)
                .map_err(|_| FraudBenchError::ColumnNotFound(col_name.clone()))?;
            if series.null_count() > 0 {
                return Err(FraudBenchError::DataError(format!(
                    "feature column {} contains nulls",
                    col_name
                )));
            }
            let series_f64 = series
                .cast(&DataType::Float64)
                .map_err(|e| FraudBenchError::DataError(e.to_string()))?;
            let values: Vec<f64> = series_f64
                .f64()
                .map_err(|e| FraudBenchError::DataError(e.to_string()))?
                .into_iter()
                .map(|v| v.unwrap_or(0.0))
                .collect();
            Ok(values)
        })
        .collect::<Result<Vec<Vec<f64>>>>()?;

    let col_refs: Vec<&[f64]> = col_data.iter().map(|c| c.as_slice()).collect();
    Ok(Array2::from_shape_fn((n_rows, n_cols), |(r, c)| {
        col_refs[c][r]
    }))
}
