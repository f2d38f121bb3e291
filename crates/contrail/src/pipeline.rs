//! End-to-end training and prediction flow.

use crate::error::Result;
use contrail_data::load_observations;
use contrail_model::{ModelConfig, ProfitModel, split_features_target};
use contrail_output::{
    BatchPrediction, DiagnosticsWriter, EvaluationReport, EvaluationReportBuilder,
    PredictionAdapter, SinglePrediction,
};
use contrail_reporting::prepare_comparison_table;
use polars::prelude::*;
use serde_json::Value;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// File name of the held-out comparison table in the diagnostics directory.
pub const COMPARISON_FILE: &str = "comparison.csv";

const ROW_KEY: &str = "row";

/// Paths and settings for one pipeline run
#[derive(Debug, Clone)]
pub struct PipelineOptions {
    /// Observation CSV used for training
    pub data_path: PathBuf,
    /// Where the model is saved or loaded
    pub model_path: PathBuf,
    /// Model and feature settings
    pub model: ModelConfig,
    /// Directory for plot data, skipped when `None`
    pub diagnostics_dir: Option<PathBuf>,
    /// Path of the JSON evaluation report, skipped when `None`
    pub report_path: Option<PathBuf>,
}

impl PipelineOptions {
    /// Options with default model settings and no extra outputs.
    pub fn new(data_path: impl Into<PathBuf>, model_path: impl Into<PathBuf>) -> Self {
        Self {
            data_path: data_path.into(),
            model_path: model_path.into(),
            model: ModelConfig::default(),
            diagnostics_dir: None,
            report_path: None,
        }
    }
}

/// Result of a training run
#[derive(Debug, Clone)]
pub struct TrainingOutcome {
    /// Held-out evaluation, including cross-validation scores
    pub report: EvaluationReport,
    /// Rows used for training and testing combined
    pub n_rows: usize,
}

/// Orchestrates loading, training, evaluation and prediction
#[derive(Debug, Clone)]
pub struct ProfitPipeline {
    options: PipelineOptions,
}

impl ProfitPipeline {
    /// Create a pipeline.
    pub const fn new(options: PipelineOptions) -> Self {
        Self { options }
    }

    /// Run options.
    pub const fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Load data, train, save the model and evaluate it on held-out rows.
    pub fn train(&self) -> Result<TrainingOutcome> {
        let raw = load_observations(&self.options.data_path)?;
        let target = self.options.model.features.columns.target.clone();
        let (features, values) = split_features_target(&raw, &target)?;

        let mut model = ProfitModel::new(self.options.model.clone());
        model.train(&features, &values)?;
        model.save(&self.options.model_path)?;

        let report = self.evaluate(&model)?;
        info!(
            r2 = report.metrics.r2,
            rmse = report.metrics.rmse,
            mae = report.metrics.mae,
            mape = report.metrics.mape,
            "Held-out evaluation"
        );

        Ok(TrainingOutcome {
            report,
            n_rows: raw.height(),
        })
    }

    /// Score a trained model on its held-out partition.
    ///
    /// Writes the JSON report, plot data and comparison table when the
    /// corresponding options are set.
    pub fn evaluate(&self, model: &ProfitModel) -> Result<EvaluationReport> {
        let partition = model
            .test_partition()
            .ok_or(contrail_model::ModelError::NotFitted)?;
        let actual = partition.target().to_vec();
        let predicted = model.predict(&partition.features()?)?;
        let importances = model.feature_importances();

        let mut builder = EvaluationReportBuilder::new()
            .values(actual.clone(), predicted.clone())
            .feature_importances(&importances);
        if let Some(summary) = model.cv_summary() {
            builder = builder.cross_validation(summary.clone());
        }
        let report = builder.build()?;

        if let Some(path) = &self.options.report_path {
            report.write_to(path)?;
            info!(path = %path.display(), "Wrote evaluation report");
        }

        if let Some(dir) = &self.options.diagnostics_dir {
            DiagnosticsWriter::new(dir).write_all(&actual, &predicted, &importances);
            if let Err(e) = write_comparison(dir, &actual, &predicted) {
                warn!(error = %e, "Could not write comparison table");
            }
        }

        Ok(report)
    }

    /// Load the saved model.
    pub fn load_model(&self) -> Result<ProfitModel> {
        Ok(ProfitModel::load(&self.options.model_path)?)
    }

    /// Predict one JSON record with the saved model.
    ///
    /// A model that cannot be loaded yields an error-status result.
    pub fn predict_single(&self, record: &Value) -> SinglePrediction {
        match self.load_model() {
            Ok(model) => PredictionAdapter::new(model).process_single(record),
            Err(e) => {
                warn!(error = %e, "Model not loaded");
                SinglePrediction::Error {
                    message: format!("model not loaded: {}", e),
                }
            }
        }
    }

    /// Predict a JSON array of records with the saved model.
    ///
    /// A model that cannot be loaded yields an error-status result.
    pub fn predict_batch(&self, records: &Value) -> BatchPrediction {
        match self.load_model() {
            Ok(model) => PredictionAdapter::new(model).process_batch(records),
            Err(e) => {
                warn!(error = %e, "Model not loaded");
                BatchPrediction::Error {
                    message: format!("model not loaded: {}", e),
                }
            }
        }
    }
}

/// Held-out predictions joined with actuals by row position.
pub(crate) fn comparison_table(actual: &[f64], predicted: &[f64]) -> Result<DataFrame> {
    let rows: Vec<u32> = (0..actual.len() as u32).collect();
    let predictions = DataFrame::new(vec![
        Column::new(ROW_KEY.into(), rows.clone()),
        Column::new("profit".into(), predicted.to_vec()),
    ])?;
    let actuals = DataFrame::new(vec![
        Column::new(ROW_KEY.into(), rows),
        Column::new("profit".into(), actual.to_vec()),
    ])?;
    Ok(prepare_comparison_table(&predictions, &actuals, ROW_KEY)?)
}

fn write_comparison(dir: &Path, actual: &[f64], predicted: &[f64]) -> Result<PathBuf> {
    let mut table = comparison_table(actual, predicted)?;
    fs::create_dir_all(dir)?;
    let path = dir.join(COMPARISON_FILE);
    let mut file = File::create(&path)?;
    CsvWriter::new(&mut file).finish(&mut table)?;
    Ok(path)
}
