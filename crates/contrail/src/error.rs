//! Pipeline errors

use contrail_data::DataError;
use contrail_model::ModelError;
use contrail_output::ReportError;
use contrail_reporting::ReportingError;
use polars::prelude::PolarsError;
use thiserror::Error;

/// Errors from running the end-to-end pipeline
#[derive(Error, Debug)]
pub enum PipelineError {
    /// Loading failed
    #[error(transparent)]
    Data(#[from] DataError),

    /// Training, prediction or persistence failed
    #[error(transparent)]
    Model(#[from] ModelError),

    /// Report could not be built or written
    #[error(transparent)]
    Report(#[from] ReportError),

    /// Comparison table could not be built
    #[error(transparent)]
    Reporting(#[from] ReportingError),

    /// Polars error
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for pipeline operations
pub type Result<T> = std::result::Result<T, PipelineError>;
