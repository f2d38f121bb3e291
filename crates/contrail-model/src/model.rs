//! Profit model.
//!
//! [`ProfitModel`] owns everything needed to turn raw flight rows into
//! profit predictions: the fitted feature pipeline, the forest and the
//! held-out test partition kept for later evaluation. The whole struct is the
//! persisted artifact.

use crate::cross_validation::{CrossValidationSummary, cross_validate};
use crate::error::{ModelError, Result};
use crate::forest::{ForestConfig, RandomForestRegressor};
use crate::split::{take_rows, take_values, train_test_split};
use contrail_data::TableSnapshot;
use contrail_features::{FeatureConfig, FeaturePipeline};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fs;
use std::path::Path;
use tracing::info;

/// Anything that maps raw feature rows to profit predictions
pub trait Predictor {
    /// Raw columns every input row must carry.
    fn required_columns(&self) -> Vec<String>;

    /// One prediction per row of `features`, in row order.
    fn predict(&self, features: &DataFrame) -> Result<Vec<f64>>;
}

/// Configuration for training a profit model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelConfig {
    /// Feature pipeline settings
    pub features: FeatureConfig,
    /// Forest settings
    pub forest: ForestConfig,
    /// Share of rows held out for testing (default: 0.2)
    pub test_fraction: f64,
    /// Cross-validation folds on the training partition (default: 5)
    pub cv_folds: usize,
    /// Seed of the train/test shuffle (default: 42)
    pub split_seed: u64,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            features: FeatureConfig::default(),
            forest: ForestConfig::default(),
            test_fraction: 0.2,
            cv_folds: 5,
            split_seed: 42,
        }
    }
}

/// Rows held out from training
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TestPartition {
    features: TableSnapshot,
    target: Vec<f64>,
}

impl TestPartition {
    /// Raw feature rows.
    pub fn features(&self) -> Result<DataFrame> {
        Ok(self.features.to_frame()?)
    }

    /// Actual target values, aligned with [`Self::features`].
    pub fn target(&self) -> &[f64] {
        &self.target
    }

    /// Number of held-out rows.
    pub fn len(&self) -> usize {
        self.target.len()
    }

    /// Whether no rows were held out.
    pub fn is_empty(&self) -> bool {
        self.target.is_empty()
    }
}

/// Trained airline profit model
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProfitModel {
    config: ModelConfig,
    pipeline: FeaturePipeline,
    forest: RandomForestRegressor,
    test_partition: Option<TestPartition>,
    cv_summary: Option<CrossValidationSummary>,
}

impl Default for ProfitModel {
    fn default() -> Self {
        Self::new(ModelConfig::default())
    }
}

impl ProfitModel {
    /// Create an untrained model.
    pub fn new(config: ModelConfig) -> Self {
        Self {
            pipeline: FeaturePipeline::new(config.features.clone()),
            forest: RandomForestRegressor::new(config.forest),
            test_partition: None,
            cv_summary: None,
            config,
        }
    }

    /// Training configuration.
    pub const fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Whether the model has been trained.
    pub fn is_fitted(&self) -> bool {
        self.forest.is_fitted()
    }

    /// Fitted feature pipeline.
    pub const fn pipeline(&self) -> &FeaturePipeline {
        &self.pipeline
    }

    /// Held-out rows from the last training run.
    pub const fn test_partition(&self) -> Option<&TestPartition> {
        self.test_partition.as_ref()
    }

    /// Cross-validation result from the last training run.
    pub const fn cv_summary(&self) -> Option<&CrossValidationSummary> {
        self.cv_summary.as_ref()
    }

    /// Split, fit the feature pipeline, cross-validate and fit the forest.
    ///
    /// `features` holds raw feature columns only; `target` is aligned with
    /// its rows.
    pub fn train(&mut self, features: &DataFrame, target: &[f64]) -> Result<CrossValidationSummary> {
        if target.len() != features.height() {
            return Err(ModelError::Shape(format!(
                "{} targets for {} rows",
                target.len(),
                features.height()
            )));
        }

        let split = train_test_split(
            features.height(),
            self.config.test_fraction,
            self.config.split_seed,
        )?;
        let train_features = take_rows(features, &split.train)?;
        let train_target = take_values(target, &split.train);
        let test_features = take_rows(features, &split.test)?;
        let test_target = take_values(target, &split.test);

        let mut pipeline = FeaturePipeline::new(self.config.features.clone());
        let matrix = pipeline.fit_transform(&train_features, &train_target)?;

        let summary = cross_validate(
            matrix.values().view(),
            &train_target,
            self.config.cv_folds,
            &self.config.forest,
        )?;
        info!(
            folds = summary.scores.len(),
            mean_r2 = summary.mean,
            std_r2 = summary.std,
            "Cross-validation complete"
        );

        let mut forest = RandomForestRegressor::new(self.config.forest);
        forest.fit(matrix.values().view(), &train_target)?;

        self.pipeline = pipeline;
        self.forest = forest;
        self.test_partition = Some(TestPartition {
            features: TableSnapshot::from_frame(&test_features)?,
            target: test_target,
        });
        self.cv_summary = Some(summary.clone());

        info!(
            train_rows = split.train.len(),
            test_rows = split.test.len(),
            features = self.pipeline.model_columns().len(),
            "Model trained"
        );
        Ok(summary)
    }

    /// Predict profit for raw feature rows.
    ///
    /// # Errors
    /// * [`ModelError::NotFitted`] before training
    /// * [`ModelError::Feature`] wrapping
    ///   [`contrail_features::FeatureError::MissingColumns`] for absent inputs
    pub fn predict(&self, features: &DataFrame) -> Result<Vec<f64>> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        let matrix = self.pipeline.transform(features)?;
        self.forest.predict(matrix.values().view())
    }

    /// Feature importances paired with model column names, largest first.
    pub fn feature_importances(&self) -> Vec<(String, f64)> {
        let mut pairs: Vec<(String, f64)> = self
            .pipeline
            .model_columns()
            .iter()
            .cloned()
            .zip(self.forest.feature_importances().iter().copied())
            .collect();
        pairs.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        pairs
    }

    /// Write the model to `path`, creating parent directories.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        if !self.is_fitted() {
            return Err(ModelError::NotFitted);
        }
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)?;
        }

        let bytes = bincode::serialize(self).map_err(|e| ModelError::Encode(e.to_string()))?;
        fs::write(path, &bytes)?;

        info!(path = %path.display(), bytes = bytes.len(), "Saved model");
        Ok(())
    }

    /// Read a model written by [`Self::save`].
    ///
    /// # Errors
    /// * [`ModelError::NotFound`] if nothing exists at `path`
    /// * [`ModelError::Corrupt`] if the file does not decode
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ModelError::NotFound(path.to_path_buf()));
        }

        let bytes = fs::read(path)?;
        let model: Self = bincode::deserialize(&bytes).map_err(|e| ModelError::Corrupt {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        if !model.is_fitted() {
            return Err(ModelError::Corrupt {
                path: path.to_path_buf(),
                reason: "model has no trees".to_string(),
            });
        }

        info!(path = %path.display(), "Loaded model");
        Ok(model)
    }
}

impl Predictor for ProfitModel {
    fn required_columns(&self) -> Vec<String> {
        self.pipeline.input_columns().to_vec()
    }

    fn predict(&self, features: &DataFrame) -> Result<Vec<f64>> {
        ProfitModel::predict(self, features)
    }
}
