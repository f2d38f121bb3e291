//! Mean imputation of missing and undefined feature values

use crate::error::{FeatureError, Result};
use crate::linalg::finite_means;
use ndarray::Array2;
use serde::{Deserialize, Serialize};

/// Replaces non-finite entries with column means learned at fit time
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MeanImputer {
    means: Option<Vec<f64>>,
}

impl MeanImputer {
    /// Create an unfitted imputer.
    pub const fn new() -> Self {
        Self { means: None }
    }

    /// Whether [`Self::fit`] has been called.
    pub const fn is_fitted(&self) -> bool {
        self.means.is_some()
    }

    /// Learned column means.
    pub fn means(&self) -> Option<&[f64]> {
        self.means.as_deref()
    }

    /// Learn the finite mean of every column.
    pub fn fit(&mut self, values: &Array2<f64>) {
        self.means = Some(finite_means(values.view()));
    }

    /// Fill non-finite entries in place.
    ///
    /// # Errors
    /// * [`FeatureError::NotFitted`] before [`Self::fit`]
    /// * [`FeatureError::Dimension`] if the column count changed
    pub fn transform(&self, values: &mut Array2<f64>) -> Result<()> {
        let means = self.means.as_ref().ok_or(FeatureError::NotFitted("MeanImputer"))?;
        if means.len() != values.ncols() {
            return Err(FeatureError::Dimension(format!(
                "imputer fitted on {} columns, got {}",
                means.len(),
                values.ncols()
            )));
        }

        for mut row in values.rows_mut() {
            for (v, &mean) in row.iter_mut().zip(means) {
                if !v.is_finite() {
                    *v = mean;
                }
            }
        }
        Ok(())
    }
}
