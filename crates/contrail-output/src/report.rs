//! Evaluation reports.

use chrono::{DateTime, Utc};
use contrail_model::{
    CrossValidationSummary, EvaluationError, RegressionMetrics, SummaryStatistics, evaluate,
};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during report generation.
#[derive(Debug, Error)]
pub enum ReportError {
    /// Serialization error.
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Metrics could not be computed.
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    /// A required part of the report was not supplied.
    #[error("Missing report field: {0}")]
    Incomplete(&'static str),
}

/// Importance of one model feature.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    /// Feature name.
    pub feature: String,

    /// Normalised importance.
    pub importance: f64,
}

/// Held-out evaluation of a trained model.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvaluationReport {
    /// Report generation timestamp.
    pub timestamp: DateTime<Utc>,

    /// Accuracy on the held-out rows.
    pub metrics: RegressionMetrics,

    /// Distribution of the predictions.
    pub predictions: SummaryStatistics,

    /// Distribution of the actual values.
    pub actuals: SummaryStatistics,

    /// Number of held-out rows scored.
    pub n_samples: usize,

    /// Cross-validation on the training rows, when available.
    pub cross_validation: Option<CrossValidationSummary>,

    /// Feature importances, largest first.
    pub feature_importances: Vec<FeatureImportance>,
}

impl EvaluationReport {
    /// Convert report to JSON string.
    pub fn to_json(&self) -> Result<String, ReportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Write the pretty JSON report, creating parent directories.
    pub fn write_to(&self, path: &Path) -> Result<(), ReportError> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }
        fs::write(path, self.to_json()?)?;
        Ok(())
    }
}

/// Builder for creating evaluation reports.
#[derive(Debug, Default)]
pub struct EvaluationReportBuilder {
    actual: Option<Vec<f64>>,
    predicted: Option<Vec<f64>>,
    cross_validation: Option<CrossValidationSummary>,
    feature_importances: Vec<FeatureImportance>,
}

impl EvaluationReportBuilder {
    /// Create a new report builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the actual and predicted values.
    pub fn values(mut self, actual: Vec<f64>, predicted: Vec<f64>) -> Self {
        self.actual = Some(actual);
        self.predicted = Some(predicted);
        self
    }

    /// Attach a cross-validation summary.
    pub fn cross_validation(mut self, summary: CrossValidationSummary) -> Self {
        self.cross_validation = Some(summary);
        self
    }

    /// Attach feature importances.
    pub fn feature_importances(mut self, importances: &[(String, f64)]) -> Self {
        self.feature_importances = importances
            .iter()
            .map(|(feature, importance)| FeatureImportance {
                feature: feature.clone(),
                importance: *importance,
            })
            .collect();
        self
    }

    /// Compute metrics and summaries and build the report.
    pub fn build(self) -> Result<EvaluationReport, ReportError> {
        let actual = self.actual.ok_or(ReportError::Incomplete("actual values"))?;
        let predicted = self.predicted.ok_or(ReportError::Incomplete("predicted values"))?;

        Ok(EvaluationReport {
            timestamp: Utc::now(),
            metrics: evaluate(&actual, &predicted)?,
            predictions: SummaryStatistics::from_values(&predicted)?,
            actuals: SummaryStatistics::from_values(&actual)?,
            n_samples: actual.len(),
            cross_validation: self.cross_validation,
            feature_importances: self.feature_importances,
        })
    }
}
