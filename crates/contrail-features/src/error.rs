//! Error types for feature engineering

use contrail_data::DataError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors that can occur while deriving, reducing or selecting features
#[derive(Error, Debug)]
pub enum FeatureError {
    /// One or more required input columns are absent
    #[error("{step}: missing required columns: {}", .columns.join(", "))]
    MissingColumns {
        /// Processing step that needed the columns
        step: String,
        /// Every absent column
        columns: Vec<String>,
    },

    /// Departure hour that is null, fractional or outside 0-23
    #[error("invalid departure hour at row {row}: {value}")]
    InvalidHour {
        /// Zero-based row index
        row: usize,
        /// Offending value as read (NaN for null)
        value: f64,
    },

    /// A stateful transformer was used before being fitted
    #[error("{0} has not been fitted")]
    NotFitted(&'static str),

    /// A configuration value cannot be satisfied by the data
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Matrix or vector dimensions do not line up
    #[error("dimension mismatch: {0}")]
    Dimension(String),

    /// Error reading table data
    #[error(transparent)]
    Data(#[from] DataError),

    /// Polars error
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for feature operations
pub type Result<T> = std::result::Result<T, FeatureError>;
