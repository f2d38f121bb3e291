//! Univariate K-best feature selection.
//!
//! Each candidate column is scored by the F-statistic of a one-variable
//! linear regression on the target, `F = r^2 / (1 - r^2) * (n - 2)`. The
//! K best are kept in their original table order.

use crate::error::{FeatureError, Result};
use crate::group::check_columns;
use contrail_data::{column_values, numeric_column_names};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use tracing::debug;

/// Keeps the K numeric columns most associated with the target
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSelector {
    k: usize,
    exclude: Vec<String>,
    selected: Option<Vec<String>>,
    scores: Vec<(String, f64)>,
}

impl FeatureSelector {
    /// Selector keeping `k` columns.
    pub const fn new(k: usize) -> Self {
        Self {
            k,
            exclude: Vec::new(),
            selected: None,
            scores: Vec::new(),
        }
    }

    /// Never score or keep the given columns.
    pub fn excluding(mut self, columns: impl IntoIterator<Item = impl Into<String>>) -> Self {
        self.exclude.extend(columns.into_iter().map(Into::into));
        self
    }

    /// Whether a column set has been chosen.
    pub const fn is_fitted(&self) -> bool {
        self.selected.is_some()
    }

    /// Chosen columns in table order.
    pub fn selected_columns(&self) -> Option<&[String]> {
        self.selected.as_deref()
    }

    /// F-score of every candidate column from the fit, in table order.
    pub fn scores(&self) -> &[(String, f64)] {
        &self.scores
    }

    /// Score candidates against `target` and choose the K best.
    ///
    /// # Errors
    /// * [`FeatureError::Dimension`] if `target` length differs from the table
    /// * [`FeatureError::InvalidParameter`] if `k` is zero or exceeds the
    ///   number of candidate columns
    pub fn fit(&mut self, df: &DataFrame, target: &[f64]) -> Result<()> {
        if target.len() != df.height() {
            return Err(FeatureError::Dimension(format!(
                "{} target values for {} rows",
                target.len(),
                df.height()
            )));
        }

        let exclude: Vec<&str> = self.exclude.iter().map(String::as_str).collect();
        let candidates = numeric_column_names(df, &exclude);
        if self.k == 0 || self.k > candidates.len() {
            return Err(FeatureError::InvalidParameter(format!(
                "cannot select {} of {} numeric columns",
                self.k,
                candidates.len()
            )));
        }

        let scores = candidates
            .iter()
            .map(|name| Ok((name.clone(), f_score(&column_values(df, name)?, target))))
            .collect::<Result<Vec<_>>>()?;

        let mut ranked: Vec<usize> = (0..scores.len()).collect();
        ranked.sort_by(|&a, &b| {
            scores[b]
                .1
                .partial_cmp(&scores[a].1)
                .unwrap_or(Ordering::Equal)
                .then(a.cmp(&b))
        });
        let mut keep: Vec<usize> = ranked.into_iter().take(self.k).collect();
        keep.sort_unstable();

        let selected: Vec<String> = keep.iter().map(|&i| scores[i].0.clone()).collect();
        debug!(kept = ?selected, "Selected features");

        self.selected = Some(selected);
        self.scores = scores;
        Ok(())
    }

    /// Keep only the chosen columns.
    ///
    /// # Errors
    /// * [`FeatureError::NotFitted`] before [`Self::fit`]
    /// * [`FeatureError::MissingColumns`] if a chosen column is absent
    pub fn transform(&self, df: &DataFrame) -> Result<DataFrame> {
        let selected = self
            .selected
            .as_ref()
            .ok_or(FeatureError::NotFitted("FeatureSelector"))?;
        let names: Vec<&str> = selected.iter().map(String::as_str).collect();
        check_columns(df, &names, "feature selection")?;
        Ok(df.select(names)?)
    }

    /// Fit on first use, then keep the chosen columns.
    pub fn select(&mut self, df: &DataFrame, target: &[f64]) -> Result<DataFrame> {
        if !self.is_fitted() {
            self.fit(df, target)?;
        }
        self.transform(df)
    }
}

/// Regression F-statistic of `x` against `y`; 0 for constant columns.
///
/// Non-finite `x` entries are replaced with the finite mean of `x`.
pub fn f_score(x: &[f64], y: &[f64]) -> f64 {
    let n = x.len().min(y.len());
    if n < 3 {
        return 0.0;
    }

    let finite: Vec<f64> = x.iter().copied().filter(|v| v.is_finite()).collect();
    let x_fill = if finite.is_empty() {
        0.0
    } else {
        finite.iter().sum::<f64>() / finite.len() as f64
    };
    let x: Vec<f64> = x
        .iter()
        .take(n)
        .map(|&v| if v.is_finite() { v } else { x_fill })
        .collect();

    let mean_x = x.iter().sum::<f64>() / n as f64;
    let mean_y = y.iter().take(n).sum::<f64>() / n as f64;

    let (mut sxy, mut sxx, mut syy) = (0.0, 0.0, 0.0);
    for (xi, yi) in x.iter().zip(y) {
        let (dx, dy) = (xi - mean_x, yi - mean_y);
        sxy += dx * dy;
        sxx += dx * dx;
        syy += dy * dy;
    }
    if sxx <= 0.0 || syy <= 0.0 {
        return 0.0;
    }

    let r2 = (sxy * sxy / (sxx * syy)).min(1.0);
    if r2 >= 1.0 {
        return f64::INFINITY;
    }
    r2 / (1.0 - r2) * (n - 2) as f64
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidates() -> (DataFrame, Vec<f64>) {
        let df = DataFrame::new(vec![
            Column::new("weak".into(), vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0]),
            Column::new("strong".into(), vec![1.0, 2.1, 2.9, 4.2, 5.0, 5.8]),
            Column::new("constant".into(), vec![3.0; 6]),
            Column::new("medium".into(), vec![1.0, 3.0, 2.0, 5.0, 4.0, 6.0]),
            Column::new("carrier".into(), vec!["AA", "DL", "UA", "AA", "DL", "UA"]),
        ])
        .unwrap();
        (df, vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0])
    }

    #[test]
    fn test_keeps_best_in_table_order() {
        let (df, y) = candidates();
        let mut selector = FeatureSelector::new(2);
        let out = selector.select(&df, &y).unwrap();

        assert_eq!(selector.selected_columns().unwrap(), &["strong", "medium"]);
        let names: Vec<String> = out.get_column_names().iter().map(|n| n.to_string()).collect();
        assert_eq!(names, vec!["strong", "medium"]);
        assert_eq!(selector.scores().len(), 4);
    }

    #[test]
    fn test_reuses_first_selection() {
        let (df, y) = candidates();
        let mut selector = FeatureSelector::new(1);
        selector.select(&df, &y).unwrap();

        // A target now tracking "weak" does not change the chosen column
        let flipped = vec![1.0, -1.0, 1.0, -1.0, 1.0, -1.0];
        let out = selector.select(&df, &flipped).unwrap();
        assert_eq!(out.get_column_names().len(), 1);
        assert_eq!(selector.selected_columns().unwrap(), &["strong"]);
    }

    #[test]
    fn test_constant_column_scores_zero() {
        assert_eq!(f_score(&[2.0; 5], &[1.0, 2.0, 3.0, 4.0, 5.0]), 0.0);
    }

    #[test]
    fn test_perfect_fit_scores_infinite() {
        assert!(f_score(&[1.0, 2.0, 3.0, 4.0], &[2.0, 4.0, 6.0, 8.0]).is_infinite());
    }

    #[test]
    fn test_length_mismatch() {
        let (df, _) = candidates();
        let mut selector = FeatureSelector::new(1);
        assert!(matches!(
            selector.fit(&df, &[1.0, 2.0]),
            Err(FeatureError::Dimension(_))
        ));
    }

    #[test]
    fn test_k_too_large() {
        let (df, y) = candidates();
        let mut selector = FeatureSelector::new(5);
        assert!(matches!(
            selector.fit(&df, &y),
            Err(FeatureError::InvalidParameter(_))
        ));
    }
}
