//! Error types for reporting

use contrail_output::ExportError;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors from uploading to a report sink
#[derive(Error, Debug)]
pub enum UploadError {
    /// Connection string could not be parsed
    #[error("invalid connection string: {0}")]
    InvalidConnectionString(String),

    /// No usable credentials
    #[error("authentication error: {0}")]
    Auth(String),

    /// Network error
    #[error("network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Store answered with a failure status
    #[error("upload rejected with HTTP {status}: {message}")]
    Status {
        /// HTTP status code
        status: u16,
        /// Response body
        message: String,
    },

    /// Rows could not be encoded
    #[error("export error: {0}")]
    Export(#[from] ExportError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors from configuring or preparing reports
#[derive(Error, Debug)]
pub enum ReportingError {
    /// Configuration file missing
    #[error("reporting config not found: {}", .0.display())]
    ConfigNotFound(PathBuf),

    /// Configuration present but unusable
    #[error("invalid reporting config: {0}")]
    InvalidConfig(String),

    /// Join key absent from a table
    #[error("key column '{0}' missing from comparison input")]
    MissingKey(String),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Upload error
    #[error(transparent)]
    Upload(#[from] UploadError),

    /// Polars error
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for reporting operations
pub type Result<T> = std::result::Result<T, ReportingError>;
