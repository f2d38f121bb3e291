//! Predicted versus actual comparison tables.

use crate::error::{ReportingError, Result};
use chrono::Utc;
use polars::prelude::*;

/// Name of the refresh timestamp column.
pub const LAST_UPDATED: &str = "last_updated";

fn suffixed(df: &DataFrame, key: &str, suffix: &str) -> Result<LazyFrame> {
    if df.column(key).is_err() {
        return Err(ReportingError::MissingKey(key.to_string()));
    }
    let exprs: Vec<Expr> = df
        .get_column_names()
        .into_iter()
        .map(|name| {
            let name = name.as_str();
            if name == key {
                col(name)
            } else {
                col(name).alias(format!("{}{}", name, suffix))
            }
        })
        .collect();
    Ok(df.clone().lazy().select(exprs))
}

/// Join predicted and actual tables on `key`.
///
/// Every non-key column is renamed with a `_predicted` or `_actual` suffix,
/// only keys present in both tables are kept, and a `last_updated` column
/// holds the time of the call.
///
/// # Errors
/// Returns [`ReportingError::MissingKey`] if either table lacks `key`.
pub fn prepare_comparison_table(
    predictions: &DataFrame,
    actuals: &DataFrame,
    key: &str,
) -> Result<DataFrame> {
    let left = suffixed(predictions, key, "_predicted")?;
    let right = suffixed(actuals, key, "_actual")?;
    let stamp = Utc::now().format("%Y-%m-%d %H:%M:%S").to_string();

    let joined = left
        .join(
            right,
            [col(key)],
            [col(key)],
            JoinArgs::new(JoinType::Inner),
        )
        .with_column(lit(stamp).alias(LAST_UPDATED))
        .collect()?;
    Ok(joined)
}
