//! Error types for model training and persistence

use crate::evaluation::EvaluationError;
use contrail_data::DataError;
use contrail_features::FeatureError;
use polars::prelude::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while training, applying or storing a model
#[derive(Error, Debug)]
pub enum ModelError {
    /// The model was used before [`crate::ProfitModel::train`]
    #[error("model has not been trained")]
    NotFitted,

    /// Too few rows for the requested split or folds
    #[error("insufficient data: {0}")]
    InsufficientData(String),

    /// Features and target (or matrix and model) do not line up
    #[error("shape mismatch: {0}")]
    Shape(String),

    /// No saved model at the path
    #[error("model file not found: {}", .0.display())]
    NotFound(PathBuf),

    /// Saved model could not be decoded
    #[error("corrupt model file {}: {reason}", .path.display())]
    Corrupt {
        /// File that failed to decode
        path: PathBuf,
        /// Decoder message
        reason: String,
    },

    /// Model could not be encoded
    #[error("failed to encode model: {0}")]
    Encode(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Feature pipeline error
    #[error(transparent)]
    Feature(#[from] FeatureError),

    /// Data access error
    #[error(transparent)]
    Data(#[from] DataError),

    /// Scoring error
    #[error(transparent)]
    Evaluation(#[from] EvaluationError),

    /// Polars error
    #[error("polars error: {0}")]
    Polars(#[from] PolarsError),
}

/// Result type for model operations
pub type Result<T> = std::result::Result<T, ModelError>;
