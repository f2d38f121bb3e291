//! End-to-end feature pipeline.
//!
//! Turns raw observation rows into the numeric matrix the forest is trained
//! on: engineering, optional principal components, optional K-best
//! selection, then mean imputation. Everything learned during the fit is
//! stored, so the pipeline serializes together with the model and replays
//! the exact same transformation at prediction time.

use crate::engineer::FeatureEngineer;
use crate::error::{FeatureError, Result};
use crate::group::check_columns;
use crate::imputer::MeanImputer;
use crate::reduction::PcaReducer;
use crate::selection::FeatureSelector;
use contrail_data::{ColumnMap, FeatureMatrix, numeric_column_names};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Configuration for the feature pipeline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FeatureConfig {
    /// Raw column names
    pub columns: ColumnMap,
    /// Append this many principal components (default: none)
    pub pca_components: Option<usize>,
    /// Keep only the K best columns (default: all)
    pub select_k: Option<usize>,
}

impl Default for FeatureConfig {
    fn default() -> Self {
        Self {
            columns: ColumnMap::default(),
            pca_components: None,
            select_k: None,
        }
    }
}

/// Fitted raw-table to feature-matrix transformation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeaturePipeline {
    config: FeatureConfig,
    engineer: FeatureEngineer,
    reducer: Option<PcaReducer>,
    selector: Option<FeatureSelector>,
    imputer: MeanImputer,
    input_columns: Vec<String>,
    model_columns: Vec<String>,
}

impl Default for FeaturePipeline {
    fn default() -> Self {
        Self::new(FeatureConfig::default())
    }
}

impl FeaturePipeline {
    /// Create an unfitted pipeline.
    pub fn new(config: FeatureConfig) -> Self {
        Self {
            engineer: FeatureEngineer::new(config.columns.clone()),
            reducer: None,
            selector: None,
            imputer: MeanImputer::new(),
            input_columns: Vec::new(),
            model_columns: Vec::new(),
            config,
        }
    }

    /// Pipeline configuration.
    pub const fn config(&self) -> &FeatureConfig {
        &self.config
    }

    /// Whether [`Self::fit_transform`] has completed.
    pub const fn is_fitted(&self) -> bool {
        self.imputer.is_fitted()
    }

    /// Raw columns every table passed to [`Self::transform`] must carry.
    pub fn input_columns(&self) -> &[String] {
        &self.input_columns
    }

    /// Columns of the produced matrix, in order.
    pub fn model_columns(&self) -> &[String] {
        &self.model_columns
    }

    /// The fitted reducer, when principal components are enabled.
    pub const fn reducer(&self) -> Option<&PcaReducer> {
        self.reducer.as_ref()
    }

    /// The fitted selector, when K-best selection is enabled.
    pub const fn selector(&self) -> Option<&FeatureSelector> {
        self.selector.as_ref()
    }

    /// Learn every stateful step from a training table and transform it.
    ///
    /// `raw` holds feature columns only; `target` is aligned with its rows.
    pub fn fit_transform(&mut self, raw: &DataFrame, target: &[f64]) -> Result<FeatureMatrix> {
        if target.len() != raw.height() {
            return Err(FeatureError::Dimension(format!(
                "{} target values for {} rows",
                target.len(),
                raw.height()
            )));
        }

        let target_column = self.config.columns.target.clone();
        let mut inputs = self.engineer.required_columns();
        for name in numeric_column_names(raw, &[target_column.as_str()]) {
            if !inputs.contains(&name) {
                inputs.push(name);
            }
        }

        let mut frame = self.engineer.create_all_features(raw)?;

        self.reducer = match self.config.pca_components {
            Some(k) => {
                let mut reducer = PcaReducer::new(k).excluding([target_column.as_str()]);
                frame = reducer.reduce(&frame)?;
                Some(reducer)
            }
            None => None,
        };

        let mut columns = numeric_column_names(&frame, &[target_column.as_str()]);
        self.selector = match self.config.select_k {
            Some(k) => {
                let mut selector = FeatureSelector::new(k).excluding([target_column.as_str()]);
                let candidates = frame.select(columns.iter().map(String::as_str))?;
                columns = selector
                    .select(&candidates, target)?
                    .get_column_names()
                    .iter()
                    .map(|name| name.to_string())
                    .collect();
                Some(selector)
            }
            None => None,
        };

        let mut matrix = FeatureMatrix::from_frame(&frame, &columns)?;
        self.imputer.fit(matrix.values());
        self.imputer.transform(matrix.values_mut())?;

        info!(
            rows = matrix.n_rows(),
            inputs = inputs.len(),
            features = columns.len(),
            "Fitted feature pipeline"
        );

        self.input_columns = inputs;
        self.model_columns = columns;
        Ok(matrix)
    }

    /// Replay the fitted transformation on new rows.
    ///
    /// # Errors
    /// * [`FeatureError::NotFitted`] before [`Self::fit_transform`]
    /// * [`FeatureError::MissingColumns`] naming every absent raw input
    pub fn transform(&self, raw: &DataFrame) -> Result<FeatureMatrix> {
        if !self.is_fitted() {
            return Err(FeatureError::NotFitted("FeaturePipeline"));
        }

        let required: Vec<&str> = self.input_columns.iter().map(String::as_str).collect();
        check_columns(raw, &required, "model input")?;

        let mut frame = self.engineer.derive_features(raw)?;
        if let Some(reducer) = &self.reducer {
            frame = reducer.transform(&frame)?;
        }

        let mut matrix = FeatureMatrix::from_frame(&frame, &self.model_columns)?;
        self.imputer.transform(matrix.values_mut())?;
        Ok(matrix)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{flights, floats};
    use contrail_data::schema;

    fn features_and_target() -> (DataFrame, Vec<f64>) {
        let df = flights();
        let target = floats(&df, schema::PROFIT);
        (df.drop(schema::PROFIT).unwrap(), target)
    }

    #[test]
    fn test_matrix_has_no_missing_values() {
        let (raw, target) = features_and_target();
        let mut pipeline = FeaturePipeline::default();
        let matrix = pipeline.fit_transform(&raw, &target).unwrap();

        assert_eq!(matrix.n_rows(), 4);
        assert!(matrix.values().iter().all(|v| v.is_finite()));
        assert!(pipeline.model_columns().contains(&"maintenance_ratio".to_string()));
        assert!(!pipeline.model_columns().contains(&"day_period".to_string()));
        assert_eq!(pipeline.input_columns().len(), 7);
    }

    #[test]
    fn test_transform_replays_fit() {
        let (raw, target) = features_and_target();
        let mut pipeline = FeaturePipeline::new(FeatureConfig {
            pca_components: Some(2),
            select_k: Some(5),
            ..FeatureConfig::default()
        });
        let fitted = pipeline.fit_transform(&raw, &target).unwrap();
        let replayed = pipeline.transform(&raw).unwrap();

        assert_eq!(fitted.names(), replayed.names());
        assert_eq!(fitted.n_cols(), 5);
        for (a, b) in fitted.values().iter().zip(replayed.values()) {
            assert!((a - b).abs() < 1e-9);
        }

        // Single rows go through the same steps
        let one = raw.slice(1, 1);
        assert_eq!(pipeline.transform(&one).unwrap().n_rows(), 1);
    }

    #[test]
    fn test_transform_requires_fit() {
        let (raw, _) = features_and_target();
        assert!(matches!(
            FeaturePipeline::default().transform(&raw),
            Err(FeatureError::NotFitted(_))
        ));
    }

    #[test]
    fn test_transform_missing_inputs() {
        let (raw, target) = features_and_target();
        let mut pipeline = FeaturePipeline::default();
        pipeline.fit_transform(&raw, &target).unwrap();

        let partial = raw.drop(schema::LOAD_FACTOR).unwrap();
        match pipeline.transform(&partial) {
            Err(FeatureError::MissingColumns { columns, .. }) => {
                assert_eq!(columns, vec![schema::LOAD_FACTOR.to_string()]);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
