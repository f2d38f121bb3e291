//! Diagnostic plot data.
//!
//! Writes the series behind the usual regression diagnostics as CSV files
//! any plotting tool can read. Diagnostics are never allowed to fail a run:
//! every error is logged at `warn` and dropped.

use crate::export::ExportError;
use contrail_features::get_feature_info;
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// Number of bins in the residual histogram
pub const HISTOGRAM_BINS: usize = 30;

#[derive(Serialize)]
struct ActualVsPredicted {
    actual: f64,
    predicted: f64,
}

#[derive(Serialize)]
struct IdentityPoint {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
struct Residual {
    predicted: f64,
    residual: f64,
}

#[derive(Serialize)]
struct HistogramBin {
    bin_start: f64,
    bin_end: f64,
    count: usize,
}

#[derive(Serialize)]
struct ImportanceBar<'a> {
    feature: &'a str,
    importance: f64,
    category: &'static str,
    description: &'static str,
}

/// Label for columns the registry does not describe.
const INPUT_CATEGORY: &str = "input";

/// Writes diagnostic plot data into a directory
#[derive(Debug, Clone)]
pub struct DiagnosticsWriter {
    dir: PathBuf,
}

impl DiagnosticsWriter {
    /// Write into `dir`, created on first use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Write every diagnostic; the importance chart only when importances exist.
    pub fn write_all(&self, actual: &[f64], predicted: &[f64], importances: &[(String, f64)]) {
        self.report("actual vs predicted", self.write_actual_vs_predicted(actual, predicted));
        self.report("residuals", self.write_residuals(actual, predicted));
        if !importances.is_empty() {
            self.report("feature importance", self.write_feature_importance(importances));
        }
    }

    fn report(&self, name: &str, result: Result<PathBuf, ExportError>) {
        match result {
            Ok(path) => info!(diagnostic = name, path = %path.display(), "Wrote diagnostic"),
            Err(e) => warn!(diagnostic = name, error = %e, "Failed to write diagnostic"),
        }
    }

    fn write_rows<T: Serialize>(&self, file: &str, rows: impl IntoIterator<Item = T>) -> Result<PathBuf, ExportError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(file);
        let mut wtr = csv::Writer::from_path(&path)?;
        for row in rows {
            wtr.serialize(row)?;
        }
        wtr.flush()?;
        Ok(path)
    }

    /// Scatter of actual against predicted, plus the identity line.
    pub fn write_actual_vs_predicted(&self, actual: &[f64], predicted: &[f64]) -> Result<PathBuf, ExportError> {
        let path = self.write_rows(
            "actual_vs_predicted.csv",
            actual
                .iter()
                .zip(predicted)
                .map(|(&actual, &predicted)| ActualVsPredicted { actual, predicted }),
        )?;

        let lo = actual.iter().copied().fold(f64::INFINITY, f64::min);
        let hi = actual.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        if lo.is_finite() && hi.is_finite() {
            self.write_rows(
                "identity_line.csv",
                [IdentityPoint { x: lo, y: lo }, IdentityPoint { x: hi, y: hi }],
            )?;
        }
        Ok(path)
    }

    /// Residual against predicted scatter and residual histogram.
    pub fn write_residuals(&self, actual: &[f64], predicted: &[f64]) -> Result<PathBuf, ExportError> {
        let residuals: Vec<f64> = actual.iter().zip(predicted).map(|(a, p)| a - p).collect();
        let path = self.write_rows(
            "residuals.csv",
            predicted
                .iter()
                .zip(&residuals)
                .map(|(&predicted, &residual)| Residual { predicted, residual }),
        )?;
        self.write_rows("residual_histogram.csv", histogram(&residuals, HISTOGRAM_BINS))?;
        Ok(path)
    }

    /// Bar chart data of feature importances, labelled from the feature
    /// registry. Raw inputs and principal components get the `input` category.
    pub fn write_feature_importance(&self, importances: &[(String, f64)]) -> Result<PathBuf, ExportError> {
        self.write_rows(
            "feature_importance.csv",
            importances.iter().map(|(feature, importance)| {
                let info = get_feature_info(feature);
                ImportanceBar {
                    feature,
                    importance: *importance,
                    category: info.as_ref().map_or(INPUT_CATEGORY, |i| i.category.label()),
                    description: info.as_ref().map_or("", |i| i.description),
                }
            }),
        )
    }
}

/// Equal-width bins over the finite range of `values`.
fn histogram(values: &[f64], bins: usize) -> Vec<HistogramBin> {
    let finite: Vec<f64> = values.iter().copied().filter(|v| v.is_finite()).collect();
    if finite.is_empty() || bins == 0 {
        return Vec::new();
    }
    let lo = finite.iter().copied().fold(f64::INFINITY, f64::min);
    let hi = finite.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = if hi > lo { (hi - lo) / bins as f64 } else { 1.0 };

    let mut counts = vec![0usize; bins];
    for v in finite {
        let index = (((v - lo) / width) as usize).min(bins - 1);
        counts[index] += 1;
    }

    counts
        .into_iter()
        .enumerate()
        .map(|(i, count)| HistogramBin {
            bin_start: lo + i as f64 * width,
            bin_end: lo + (i + 1) as f64 * width,
            count,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_histogram_counts_everything() {
        let bins = histogram(&[0.0, 1.0, 2.0, 3.0, 10.0, f64::NAN], 5);
        assert_eq!(bins.len(), 5);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 5);
        assert_eq!(bins[0].count, 2);
        assert_eq!(bins[4].count, 1);
    }

    #[test]
    fn test_constant_residuals_single_bin() {
        let bins = histogram(&[2.0, 2.0, 2.0], 3);
        assert_eq!(bins[0].count, 3);
    }

    #[test]
    fn test_write_all_files() {
        let dir = std::env::temp_dir().join("contrail_diagnostics_test");
        let writer = DiagnosticsWriter::new(&dir);
        writer.write_all(
            &[10.0, 20.0, 30.0],
            &[12.0, 19.0, 33.0],
            &[
                ("revenue_cost_ratio".to_string(), 0.6),
                ("peak_hour".to_string(), 0.4),
                ("Revenue (USD)".to_string(), 0.1),
            ],
        );

        for file in [
            "actual_vs_predicted.csv",
            "identity_line.csv",
            "residuals.csv",
            "residual_histogram.csv",
            "feature_importance.csv",
        ] {
            assert!(dir.join(file).is_file(), "missing {file}");
        }

        let importance = fs::read_to_string(dir.join("feature_importance.csv")).unwrap();
        let lines: Vec<&str> = importance.lines().collect();
        assert_eq!(lines[0], "feature,importance,category,description");
        assert_eq!(
            lines[1],
            "revenue_cost_ratio,0.6,financial,Revenue divided by operating cost"
        );
        assert!(lines[2].starts_with("peak_hour,0.4,temporal,"));
        assert_eq!(lines[3], "Revenue (USD),0.1,input,");
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_no_importance_chart_without_importances() {
        let dir = std::env::temp_dir().join("contrail_diagnostics_no_importance");
        DiagnosticsWriter::new(&dir).write_all(&[1.0], &[1.0], &[]);
        assert!(!dir.join("feature_importance.csv").exists());
        fs::remove_dir_all(dir).ok();
    }

    #[test]
    fn test_unwritable_directory_does_not_panic() {
        let file = std::env::temp_dir().join("contrail_diagnostics_blocker");
        fs::write(&file, "not a directory").unwrap();
        DiagnosticsWriter::new(file.join("nested")).write_all(&[1.0], &[2.0], &[]);
        fs::remove_file(file).ok();
    }
}
