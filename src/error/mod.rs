//! Error handling for the readmission analytics core.
//!
//! Only structural failures are errors here: unreadable input, schema
//! mismatches and invalid configuration. Data-quality anomalies in the
//! encounters themselves are reported through
//! [`DataQualityReport`](crate::models::quality::DataQualityReport) instead.

use arrow::error::ArrowError;
use parquet::errors::ParquetError;
use std::io;

/// Specialized error type for analytics operations
#[derive(Debug, thiserror::Error)]
pub enum AnalyticsError {
    /// Error opening, reading or writing a file
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    /// Error processing Parquet data
    #[error("Parquet error: {0}")]
    Parquet(#[from] ParquetError),

    /// Error processing Arrow data
    #[error("Arrow error: {0}")]
    Arrow(#[from] ArrowError),

    /// Error converting rows to or from Arrow record batches
    #[error("Arrow serialization error: {0}")]
    SerdeArrow(#[from] serde_arrow::Error),

    /// Error reading or writing JSON documents
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A required column is missing from a record batch
    #[error("Column not found: {0}")]
    ColumnNotFound(String),

    /// A column exists but has an unsupported data type
    #[error("Invalid data type for column '{column}': expected {expected}")]
    InvalidDataType {
        /// Column name
        column: String,
        /// Expected Arrow type description
        expected: String,
    },

    /// A configuration value or call argument is out of range
    #[error("Invalid parameter: {0}")]
    InvalidParameter(String),

    /// Any other failure
    #[error("{0}")]
    Other(String),
}

impl AnalyticsError {
    /// Create a column-not-found error
    #[must_use]
    pub fn column_not_found(column: &str) -> Self {
        Self::ColumnNotFound(column.to_string())
    }

    /// Create an invalid-data-type error
    #[must_use]
    pub fn invalid_data_type(column: &str, expected: &str) -> Self {
        Self::InvalidDataType {
            column: column.to_string(),
            expected: expected.to_string(),
        }
    }

    /// Create an invalid-parameter error
    #[must_use]
    pub fn invalid_parameter(message: impl Into<String>) -> Self {
        Self::InvalidParameter(message.into())
    }
}

/// Result type for analytics operations
pub type Result<T> = std::result::Result<T, AnalyticsError>;
