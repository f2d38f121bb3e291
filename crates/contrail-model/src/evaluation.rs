//! Regression metrics and summary statistics.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from scoring predictions
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EvaluationError {
    /// Actual and predicted vectors differ in length
    #[error("length mismatch: {actual} actual values, {predicted} predictions")]
    LengthMismatch {
        /// Number of actual values
        actual: usize,
        /// Number of predictions
        predicted: usize,
    },

    /// Nothing to score
    #[error("cannot evaluate an empty vector")]
    Empty,
}

/// Accuracy of predictions against actual values
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RegressionMetrics {
    /// Coefficient of determination
    pub r2: f64,
    /// Root mean squared error
    pub rmse: f64,
    /// Mean absolute error
    pub mae: f64,
    /// Mean absolute percentage error, in percent
    pub mape: f64,
}

fn check_aligned(actual: &[f64], predicted: &[f64]) -> Result<(), EvaluationError> {
    if actual.len() != predicted.len() {
        return Err(EvaluationError::LengthMismatch {
            actual: actual.len(),
            predicted: predicted.len(),
        });
    }
    if actual.is_empty() {
        return Err(EvaluationError::Empty);
    }
    Ok(())
}

/// Coefficient of determination.
///
/// A constant target scores 1.0 when predicted exactly and 0.0 otherwise.
pub fn r2_score(actual: &[f64], predicted: &[f64]) -> Result<f64, EvaluationError> {
    check_aligned(actual, predicted)?;

    let mean = actual.iter().sum::<f64>() / actual.len() as f64;
    let ss_res: f64 = actual
        .iter()
        .zip(predicted)
        .map(|(a, p)| (a - p).powi(2))
        .sum();
    let ss_tot: f64 = actual.iter().map(|a| (a - mean).powi(2)).sum();

    Ok(if ss_tot == 0.0 {
        if ss_res == 0.0 { 1.0 } else { 0.0 }
    } else {
        1.0 - ss_res / ss_tot
    })
}

/// Score predictions against actual values.
///
/// # Errors
/// * [`EvaluationError::LengthMismatch`] for unaligned vectors
/// * [`EvaluationError::Empty`] for empty vectors
pub fn evaluate(actual: &[f64], predicted: &[f64]) -> Result<RegressionMetrics, EvaluationError> {
    let r2 = r2_score(actual, predicted)?;
    let n = actual.len() as f64;

    let mut squared = 0.0;
    let mut absolute = 0.0;
    let mut percentage = 0.0;
    for (a, p) in actual.iter().zip(predicted) {
        let error = a - p;
        squared += error * error;
        absolute += error.abs();
        percentage += error.abs() / a.abs().max(f64::EPSILON);
    }

    Ok(RegressionMetrics {
        r2,
        rmse: (squared / n).sqrt(),
        mae: absolute / n,
        mape: percentage / n * 100.0,
    })
}

/// Location and spread of a vector
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SummaryStatistics {
    /// Arithmetic mean
    pub mean: f64,
    /// Population standard deviation
    pub std: f64,
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
}

impl SummaryStatistics {
    /// Summarise a non-empty vector.
    pub fn from_values(values: &[f64]) -> Result<Self, EvaluationError> {
        if values.is_empty() {
            return Err(EvaluationError::Empty);
        }
        let n = values.len() as f64;
        let mean = values.iter().sum::<f64>() / n;
        let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / n;

        Ok(Self {
            mean,
            std: variance.sqrt(),
            min: values.iter().copied().fold(f64::INFINITY, f64::min),
            max: values.iter().copied().fold(f64::NEG_INFINITY, f64::max),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use rstest::rstest;

    #[test]
    fn test_perfect_predictions() {
        let y = [120.0, -40.0, 310.5, 88.0];
        let metrics = evaluate(&y, &y).unwrap();
        assert_eq!(metrics.r2, 1.0);
        assert_eq!(metrics.rmse, 0.0);
        assert_eq!(metrics.mae, 0.0);
        assert_eq!(metrics.mape, 0.0);
    }

    #[test]
    fn test_known_errors() {
        let actual = [100.0, 200.0, 300.0, 400.0];
        let predicted = [110.0, 190.0, 330.0, 400.0];
        let metrics = evaluate(&actual, &predicted).unwrap();

        assert_abs_diff_eq!(metrics.mae, 12.5, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.rmse, (1100.0f64 / 4.0).sqrt(), epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.mape, 6.25, epsilon = 1e-12);
        assert_abs_diff_eq!(metrics.r2, 1.0 - 1100.0 / 50_000.0, epsilon = 1e-12);
    }

    #[rstest]
    #[case(&[1.0, 2.0], &[1.0])]
    #[case(&[1.0], &[1.0, 2.0, 3.0])]
    fn test_length_mismatch(#[case] actual: &[f64], #[case] predicted: &[f64]) {
        assert!(matches!(
            evaluate(actual, predicted),
            Err(EvaluationError::LengthMismatch { .. })
        ));
    }

    #[test]
    fn test_empty() {
        assert_eq!(evaluate(&[], &[]), Err(EvaluationError::Empty));
        assert_eq!(SummaryStatistics::from_values(&[]), Err(EvaluationError::Empty));
    }

    #[test]
    fn test_constant_target() {
        assert_eq!(r2_score(&[5.0, 5.0], &[5.0, 5.0]).unwrap(), 1.0);
        assert_eq!(r2_score(&[5.0, 5.0], &[4.0, 6.0]).unwrap(), 0.0);
    }

    #[test]
    fn test_zero_actual_keeps_mape_finite() {
        let metrics = evaluate(&[0.0, 10.0], &[1.0, 10.0]).unwrap();
        assert!(metrics.mape.is_finite());
    }

    #[test]
    fn test_summary_statistics() {
        let stats = SummaryStatistics::from_values(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]).unwrap();
        assert_abs_diff_eq!(stats.mean, 5.0);
        assert_abs_diff_eq!(stats.std, 2.0);
        assert_eq!(stats.min, 2.0);
        assert_eq!(stats.max, 9.0);
    }
}
