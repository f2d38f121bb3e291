//! One-hot encoding of the day period.
//!
//! The encoder is stateless: every period always gets a column, so a single
//! prediction record produces the same columns as a full training table.

use crate::error::Result;
use crate::group::check_columns;
use crate::temporal::DayPeriod;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Name of the categorical column being encoded.
pub const DAY_PERIOD: &str = "day_period";

/// Expands `day_period` into one 0/1 column per period
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
pub struct DayPeriodEncoder;

impl DayPeriodEncoder {
    /// Encoded column names, in period order.
    pub fn output_columns() -> Vec<&'static str> {
        DayPeriod::ALL.iter().map(|p| p.encoded_column()).collect()
    }

    /// Append the one-hot columns lazily.
    pub fn encode_lazy(&self, data: LazyFrame) -> LazyFrame {
        let columns: Vec<Expr> = DayPeriod::ALL
            .iter()
            .map(|period| {
                when(col(DAY_PERIOD).eq(lit(period.label())))
                    .then(lit(1i32))
                    .otherwise(lit(0i32))
                    .alias(period.encoded_column())
            })
            .collect();
        data.with_columns(columns)
    }

    /// Append the one-hot columns to a table holding `day_period`.
    pub fn encode(&self, df: &DataFrame) -> Result<DataFrame> {
        check_columns(df, &[DAY_PERIOD], "day period encoding")?;
        Ok(self.encode_lazy(df.clone().lazy()).collect()?)
    }
}
