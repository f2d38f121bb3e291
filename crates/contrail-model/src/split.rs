//! Target extraction and train/test partitioning.

use crate::error::{ModelError, Result};
use contrail_data::{DataError, column_values};
use polars::prelude::*;
use rand::SeedableRng;
use rand::seq::SliceRandom;
use rand_chacha::ChaCha8Rng;

/// Separate the target column from the feature columns.
///
/// # Errors
/// * [`DataError::MissingColumn`] / [`DataError::NonNumericColumn`] for an
///   unusable target column
/// * [`DataError::MissingValues`] if any target value is null, NaN or infinite
pub fn split_features_target(df: &DataFrame, target: &str) -> Result<(DataFrame, Vec<f64>)> {
    let values = column_values(df, target)?;
    let missing = values.iter().filter(|v| !v.is_finite()).count();
    if missing > 0 {
        return Err(DataError::MissingValues {
            column: target.to_string(),
            count: missing,
        }
        .into());
    }
    Ok((df.drop(target)?, values))
}

/// Row indices of the two partitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrainTestSplit {
    /// Training rows, in shuffled order
    pub train: Vec<usize>,
    /// Held-out rows, in shuffled order
    pub test: Vec<usize>,
}

/// Shuffle `0..n` with a seeded RNG and hold out `ceil(n * test_fraction)` rows.
///
/// # Errors
/// [`ModelError::InsufficientData`] when either partition would be empty.
pub fn train_test_split(n: usize, test_fraction: f64, seed: u64) -> Result<TrainTestSplit> {
    if !(test_fraction > 0.0 && test_fraction < 1.0) {
        return Err(ModelError::InsufficientData(format!(
            "test fraction {test_fraction} must lie strictly between 0 and 1"
        )));
    }

    let n_test = (n as f64 * test_fraction).ceil() as usize;
    if n_test == 0 || n_test >= n {
        return Err(ModelError::InsufficientData(format!(
            "cannot hold out {n_test} of {n} rows"
        )));
    }

    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = ChaCha8Rng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let train = indices.split_off(n_test);
    Ok(TrainTestSplit {
        train,
        test: indices,
    })
}

/// Rows of `df` at `rows`, in that order.
pub fn take_rows(df: &DataFrame, rows: &[usize]) -> Result<DataFrame> {
    let idx = IdxCa::from_vec(
        "rows".into(),
        rows.iter().map(|&i| i as IdxSize).collect(),
    );
    Ok(df.take(&idx)?)
}

/// Values at `rows`, in that order.
pub fn take_values(values: &[f64], rows: &[usize]) -> Vec<f64> {
    rows.iter().map(|&i| values[i]).collect()
}
