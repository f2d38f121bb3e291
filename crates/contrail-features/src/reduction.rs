//! Principal component reduction.
//!
//! The reducer is fitted once; later tables are projected with the stored
//! means and components even when their own distribution differs.

use crate::error::{FeatureError, Result};
use crate::group::check_columns;
use crate::linalg::{DEFAULT_TOLERANCE, covariance, finite_means, symmetric_eigen};
use contrail_data::{FeatureMatrix, numeric_column_names};
use ndarray::{Array2, Axis, Slice};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Prefix of the appended component columns
pub const COMPONENT_PREFIX: &str = "pca_";

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Projection {
    input_columns: Vec<String>,
    means: Vec<f64>,
    /// One component per column
    components: Array2<f64>,
    explained_variance: Vec<f64>,
    total_variance: f64,
}

/// Appends the leading principal components of the numeric columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PcaReducer {
    n_components: usize,
    exclude: Vec<String>,
    projection: Option<Projection>,
}

impl PcaReducer {
    /// Reducer keeping `n_components` components.
    pub const fn new(n_components: usize) -> Self {
        Self {
            n_components,
            exclude: Vec::new(),
            projection: None,
        }
    }

    /// Leave the given columns out of the projection inputs.
    pub fn excluding(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Whether a projection has been learned.
    pub const fn is_fitted(&self) -> bool {
        self.projection.is_some()
    }

    /// Names of the appended columns: `pca_1` to `pca_k`.
    pub fn component_names(&self) -> Vec<String> {
        (1..=self.n_components)
            .map(|i| format!("{COMPONENT_PREFIX}{i}"))
            .collect()
    }

    /// Columns the projection was learned from.
    pub fn input_columns(&self) -> Option<&[String]> {
        self.projection.as_ref().map(|p| p.input_columns.as_slice())
    }

    /// Share of total variance captured by each kept component.
    pub fn explained_variance_ratio(&self) -> Option<Vec<f64>> {
        self.projection.as_ref().map(|p| {
            p.explained_variance
                .iter()
                .map(|v| {
                    if p.total_variance > 0.0 {
                        v / p.total_variance
                    } else {
                        0.0
                    }
                })
                .collect()
        })
    }

    /// Learn means and components from the numeric columns of `df`.
    ///
    /// # Errors
    /// [`FeatureError::InvalidParameter`] when there are fewer inputs than
    /// components or fewer than two rows.
    pub fn fit(&mut self, df: &DataFrame) -> Result<()> {
        let exclude: Vec<&str> = self.exclude.iter().map(String::as_str).collect();
        let inputs: Vec<String> = numeric_column_names(df, &exclude)
            .into_iter()
            .filter(|name| !name.starts_with(COMPONENT_PREFIX))
            .collect();

        if self.n_components == 0 || self.n_components > inputs.len() {
            return Err(FeatureError::InvalidParameter(format!(
                "cannot keep {} components of {} numeric columns",
                self.n_components,
                inputs.len()
            )));
        }

        let matrix = FeatureMatrix::from_frame(df, &inputs)?;
        let means = finite_means(matrix.values().view());
        let centred = centre(matrix.values(), &means);
        let eigen = symmetric_eigen(&covariance(centred.view())?, DEFAULT_TOLERANCE)?;

        let k = self.n_components;
        let explained_variance: Vec<f64> = eigen.values.iter().take(k).copied().collect();
        let total_variance = eigen.values.iter().filter(|v| **v > 0.0).sum();

        debug!(
            inputs = inputs.len(),
            components = k,
            "Fitted principal components"
        );

        self.projection = Some(Projection {
            input_columns: inputs,
            means,
            components: eigen.vectors.slice_axis(Axis(1), Slice::from(..k)).to_owned(),
            explained_variance,
            total_variance,
        });
        Ok(())
    }

    /// Append `pca_1..pca_k` computed with the fitted projection.
    ///
    /// # Errors
    /// * [`FeatureError::NotFitted`] before [`Self::fit`]
    /// * [`FeatureError::MissingColumns`] if a projection input is absent
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let projection = self
            .projection
            .as_ref()
            .ok_or(FeatureError::NotFitted("PcaReducer"))?;

        let required: Vec<&str> = projection.input_columns.iter().map(String::as_str).collect();
        check_columns(df, &required, "principal components")?;

        let matrix = FeatureMatrix::from_frame(df, &projection.input_columns)?;
        let scores = centre(matrix.values(), &projection.means).dot(&projection.components);

        let mut out = df.clone();
        for (name, column) in self.component_names().into_iter().zip(scores.columns()) {
            out.with_column(Column::new(name.into(), column.to_vec()))?;
        }
        Ok(out)
    }

    /// Fit on first use, then project.
    pub fn reduce(&mut self, df: &DataFrame) -> Result<DataFrame> {
        if !self.is_fitted() {
            self.fit(df)?;
        }
        self.transform(df)
    }
}

/// Subtract column means; non-finite entries land on zero.
fn centre(values: &Array2<f64>, means: &[f64]) -> Array2<f64> {
    let mut centred = values.clone();
    for mut row in centred.rows_mut() {
        for (v, mean) in row.iter_mut().zip(means) {
            *v = if v.is_finite() { *v - mean } else { 0.0 };
        }
    }
    centred
}
