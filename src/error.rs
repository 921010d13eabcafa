//! Error types for the fraudbench crate

use thiserror::Error;

/// Result type alias for fraudbench operations
pub type Result<T> = std::result::Result<T, FraudBenchError>;

/// Main error type for the benchmark pipeline
#[derive(Error, Debug)]
pub enum FraudBenchError {
    #[error("Data error: {0}")]
    DataError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Training error: {0}")]
    TrainingError(String),

    #[error("Computation error: {0}")]
    ComputationError(String),

    #[error("Invalid shape: expected {expected}, got {actual}")]
    ShapeError { expected: String, actual: String },

    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    #[error("Model not fitted")]
    ModelNotFitted,

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<polars::error::PolarsError> for FraudBenchError {
    fn from(err: polars::error::PolarsError) -> Self {
        FraudBenchError::DataError(err.to_string())
    }
}

impl From<serde_json::Error> for FraudBenchError {
    fn from(err: serde_json::Error) -> Self {
        FraudBenchError::SerializationError(err.to_string())
    }
}

impl From<ndarray::ShapeError> for FraudBenchError {
    fn from(err: ndarray::ShapeError) -> Self {
        FraudBenchError::ShapeError {
            expected: "valid shape".to_string(),
            actual: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = FraudBenchError::DataError("bad column".to_string());
        assert_eq!(err.to_string(), "Data error: bad column");
    }

    #[test]
    fn test_error_from_io() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let err: FraudBenchError = io_err.into();
        assert!(matches!(err, FraudBenchError::IoError(_)));
    }
}
