//! Error types for data operations.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for data operations.
pub type Result<T> = std::result::Result<T, DataError>;

/// Errors that can occur while loading or reshaping observation tables.
#[derive(Debug, Error)]
pub enum DataError {
    /// Input file does not exist
    #[error("Data file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Input file could not be parsed as a table
    #[error("Data parsing error: {0}")]
    Parse(String),

    /// Input table has no rows
    #[error("No observations in {0}")]
    Empty(String),

    /// Required column absent from the table
    #[error("Missing column: {0}")]
    MissingColumn(String),

    /// Column exists but does not hold numbers
    #[error("Column {column} is not numeric (found {dtype})")]
    NonNumericColumn {
        /// Column name
        column: String,
        /// Polars dtype found instead
        dtype: String,
    },

    /// Column contains nulls where values are required
    #[error("Column {column} has {count} missing value(s)")]
    MissingValues {
        /// Column name
        column: String,
        /// Number of null entries
        count: usize,
    },

    /// Matrix shape does not match its column names
    #[error("Shape mismatch: {0}")]
    Shape(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Polars error
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}
