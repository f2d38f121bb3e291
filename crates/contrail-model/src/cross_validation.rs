//! K-fold cross-validation.
//!
//! Folds are contiguous blocks of rows in their current order; the first
//! `n % k` folds hold one extra row. Scores are diagnostic only and never
//! feed back into the final model.

use crate::error::{ModelError, Result};
use crate::evaluation::r2_score;
use crate::forest::{ForestConfig, RandomForestRegressor};
use ndarray::{ArrayView2, Axis};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// R² per fold with its mean and population standard deviation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrossValidationSummary {
    /// Score of each fold, in fold order
    pub scores: Vec<f64>,
    /// Mean score
    pub mean: f64,
    /// Population standard deviation of the scores
    pub std: f64,
}

impl CrossValidationSummary {
    /// Summarise fold scores.
    pub fn from_scores(scores: Vec<f64>) -> Self {
        let n = scores.len().max(1) as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let std = (scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n).sqrt();
        Self { scores, mean, std }
    }
}

/// Contiguous `(start, end)` bounds of each fold.
pub fn fold_bounds(n: usize, folds: usize) -> Vec<(usize, usize)> {
    let base = n / folds;
    let extra = n % folds;
    let mut start = 0;
    (0..folds)
        .map(|i| {
            let size = base + usize::from(i < extra);
            let bounds = (start, start + size);
            start += size;
            bounds
        })
        .collect()
}

/// Fit a fresh forest on all but one fold and score it on that fold, for every fold.
///
/// # Errors
/// [`ModelError::InsufficientData`] if `folds < 2` or there are fewer rows than folds.
pub fn cross_validate(
    x: ArrayView2<'_, f64>,
    y: &[f64],
    folds: usize,
    config: &ForestConfig,
) -> Result<CrossValidationSummary> {
    let n = x.nrows();
    if folds < 2 || n < folds {
        return Err(ModelError::InsufficientData(format!(
            "cannot run {folds}-fold cross-validation on {n} rows"
        )));
    }
    if y.len() != n {
        return Err(ModelError::Shape(format!("{} targets for {} rows", y.len(), n)));
    }

    let mut scores = Vec::with_capacity(folds);
    for (fold, (start, end)) in fold_bounds(n, folds).into_iter().enumerate() {
        let train: Vec<usize> = (0..start).chain(end..n).collect();
        let test: Vec<usize> = (start..end).collect();

        let x_train = x.select(Axis(0), &train);
        let y_train: Vec<f64> = train.iter().map(|&i| y[i]).collect();

        let mut forest = RandomForestRegressor::new(*config);
        forest.fit(x_train.view(), &y_train)?;

        let predicted = forest.predict(x.select(Axis(0), &test).view())?;
        let score = r2_score(&y[start..end], &predicted)?;
        debug!(fold, rows = test.len(), r2 = score, "Scored fold");
        scores.push(score);
    }

    Ok(CrossValidationSummary::from_scores(scores))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use ndarray::Array2;
    use rstest::rstest;

    #[rstest]
    #[case(10, 5, vec![(0, 2), (2, 4), (4, 6), (6, 8), (8, 10)])]
    #[case(7, 3, vec![(0, 3), (3, 5), (5, 7)])]
    fn test_fold_bounds(#[case] n: usize, #[case] k: usize, #[case] expected: Vec<(usize, usize)>) {
        assert_eq!(fold_bounds(n, k), expected);
    }

    #[test]
    fn test_summary_uses_population_std() {
        let summary = CrossValidationSummary::from_scores(vec![0.5, 0.7, 0.9]);
        assert_abs_diff_eq!(summary.mean, 0.7, epsilon = 1e-12);
        assert_abs_diff_eq!(summary.std, (0.08f64 / 3.0).sqrt(), epsilon = 1e-12);
    }

    #[test]
    fn test_five_folds_on_learnable_data() {
        let n = 50;
        let mut x = Array2::zeros((n, 2));
        let mut y = Vec::with_capacity(n);
        for i in 0..n {
            // Interleave rows so every contiguous fold spans the range
            let v = ((i * 13) % n) as f64;
            x[[i, 0]] = v;
            x[[i, 1]] = (i % 3) as f64;
            y.push(2.0 * v);
        }

        let config = ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        };
        let summary = cross_validate(x.view(), &y, 5, &config).unwrap();
        assert_eq!(summary.scores.len(), 5);
        assert!(summary.mean > 0.8, "mean R² {}", summary.mean);
    }

    #[test]
    fn test_too_few_rows() {
        let x = Array2::<f64>::zeros((3, 1));
        let err = cross_validate(x.view(), &[1.0, 2.0, 3.0], 5, &ForestConfig::default()).unwrap_err();
        assert!(matches!(err, ModelError::InsufficientData(_)));
    }
}
