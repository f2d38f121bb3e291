//! Serializable table snapshots.
//!
//! A saved model carries its held-out test partition; polars frames are not
//! serde types without extra features, so the partition is stored column by
//! column as plain vectors.

use crate::error::Result;
use crate::matrix::is_numeric_dtype;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Values of one snapshot column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum SnapshotValues {
    /// Numeric column read as `f64`
    Numeric(Vec<Option<f64>>),
    /// Any other column read as text
    Text(Vec<Option<String>>),
}

impl SnapshotValues {
    fn len(&self) -> usize {
        match self {
            Self::Numeric(v) => v.len(),
            Self::Text(v) => v.len(),
        }
    }
}

/// One named snapshot column
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SnapshotColumn {
    /// Column name
    pub name: String,
    /// Column values
    pub values: SnapshotValues,
}

/// Owned, serde-friendly copy of a table
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TableSnapshot {
    columns: Vec<SnapshotColumn>,
}

impl TableSnapshot {
    /// Copy a polars frame.
    pub fn from_frame(df: &DataFrame) -> Result<Self> {
        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let values = if is_numeric_dtype(column.dtype()) {
                let cast = column.cast(&DataType::Float64)?;
                SnapshotValues::Numeric(cast.f64()?.into_iter().collect())
            } else {
                let cast = column.cast(&DataType::String)?;
                SnapshotValues::Text(
                    cast.str()?
                        .into_iter()
                        .map(|v| v.map(str::to_string))
                        .collect(),
                )
            };
            columns.push(SnapshotColumn {
                name: column.name().to_string(),
                values,
            });
        }
        Ok(Self { columns })
    }

    /// Rebuild the polars frame.
    pub fn to_frame(&self) -> Result<DataFrame> {
        let columns = self
            .columns
            .iter()
            .map(|c| match &c.values {
                SnapshotValues::Numeric(v) => Column::new(c.name.as_str().into(), v.clone()),
                SnapshotValues::Text(v) => Column::new(c.name.as_str().into(), v.clone()),
            })
            .collect();
        Ok(DataFrame::new(columns)?)
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    /// Column names in table order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }
}
