//! Feature group abstraction.
//!
//! A feature group derives a fixed set of columns from raw inputs. Groups
//! only append columns: the input rows, their order and the existing columns
//! are left untouched.

use crate::error::{FeatureError, Result};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Available feature categories
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FeatureCategory {
    /// Revenue and cost ratios
    Financial,
    /// Fleet utilization and maintenance
    Operational,
    /// Departure time of day
    Temporal,
    /// Products and per-hour ratios across groups
    Interaction,
}

impl FeatureCategory {
    /// Lowercase label.
    pub const fn label(&self) -> &'static str {
        match self {
            Self::Financial => "financial",
            Self::Operational => "operational",
            Self::Temporal => "temporal",
            Self::Interaction => "interaction",
        }
    }
}

/// A group of derived columns computed from raw inputs
pub trait FeatureGroup {
    /// Group name used in logs and error messages.
    fn name(&self) -> &str;

    /// Category of every column the group produces.
    fn category(&self) -> FeatureCategory;

    /// Raw columns the group reads.
    fn required_columns(&self) -> Vec<&str>;

    /// Columns the group appends.
    fn output_columns(&self) -> &'static [&'static str];

    /// Append the group's columns to `data`.
    fn compute(&self, data: LazyFrame) -> Result<LazyFrame>;
}

/// `numerator / denominator`, NaN where the denominator is exactly zero.
pub fn ratio(numerator: Expr, denominator: Expr) -> Expr {
    let denominator = denominator.cast(DataType::Float64);
    when(denominator.clone().eq(lit(0.0)))
        .then(lit(f64::NAN))
        .otherwise(numerator.cast(DataType::Float64) / denominator)
}

/// Column expression cast to `f64`.
pub fn float(name: &str) -> Expr {
    col(name).cast(DataType::Float64)
}

/// Fail with every column of `required` that `df` lacks.
pub fn check_columns(df: &DataFrame, required: &[&str], step: &str) -> Result<()> {
    let missing: Vec<String> = required
        .iter()
        .filter(|name| df.column(name).is_err())
        .map(|name| name.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(FeatureError::MissingColumns {
            step: step.to_string(),
            columns: missing,
        })
    }
}

/// Run one group eagerly against a table.
pub fn apply_group(group: &dyn FeatureGroup, df: &DataFrame) -> Result<DataFrame> {
    check_columns(df, &group.required_columns(), group.name())?;
    Ok(group.compute(df.clone().lazy())?.collect()?)
}
