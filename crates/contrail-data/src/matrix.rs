//! Numeric feature matrices.
//!
//! Bridges polars tables and the `ndarray` matrices the model consumes.
//! Nulls are read as `f64::NAN`, so missing values and the NaN sentinel of
//! zero-denominator ratios look the same downstream.

use crate::error::{DataError, Result};
use ndarray::{Array2, ArrayView1};
use polars::prelude::*;

/// Whether a polars dtype can be read as `f64`.
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Float64
            | DataType::Float32
            | DataType::Int64
            | DataType::Int32
            | DataType::UInt64
            | DataType::UInt32
            | DataType::Boolean
    )
}

/// Names of all numeric columns, in table order, minus `exclude`.
pub fn numeric_column_names(df: &DataFrame, exclude: &[&str]) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|c| is_numeric_dtype(c.dtype()))
        .map(|c| c.name().to_string())
        .filter(|name| !exclude.contains(&name.as_str()))
        .collect()
}

/// Read one numeric column as `f64`, nulls become NaN.
pub fn column_values(df: &DataFrame, name: &str) -> Result<Vec<f64>> {
    let column = df
        .column(name)
        .map_err(|_| DataError::MissingColumn(name.to_string()))?;

    if !is_numeric_dtype(column.dtype()) {
        return Err(DataError::NonNumericColumn {
            column: name.to_string(),
            dtype: column.dtype().to_string(),
        });
    }

    let values = column.cast(&DataType::Float64)?;
    Ok(values
        .f64()?
        .into_iter()
        .map(|v| v.unwrap_or(f64::NAN))
        .collect())
}

/// Dense row-major matrix with named columns
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureMatrix {
    names: Vec<String>,
    values: Array2<f64>,
}

impl FeatureMatrix {
    /// Build a matrix from explicit names and values.
    ///
    /// # Errors
    /// Returns [`DataError::Shape`] when the column count differs from `names`.
    pub fn new(names: Vec<String>, values: Array2<f64>) -> Result<Self> {
        if names.len() != values.ncols() {
            return Err(DataError::Shape(format!(
                "{} names for {} columns",
                names.len(),
                values.ncols()
            )));
        }
        Ok(Self { names, values })
    }

    /// Materialise the given columns of a table, in the given order.
    pub fn from_frame(df: &DataFrame, columns: &[String]) -> Result<Self> {
        let mut values = Array2::<f64>::zeros((df.height(), columns.len()));
        for (j, name) in columns.iter().enumerate() {
            let column = column_values(df, name)?;
            for (i, v) in column.into_iter().enumerate() {
                values[[i, j]] = v;
            }
        }
        Self::new(columns.to_vec(), values)
    }

    /// Column names in matrix order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    /// Underlying values.
    pub const fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// Mutable access to the values.
    pub const fn values_mut(&mut self) -> &mut Array2<f64> {
        &mut self.values
    }

    /// Number of rows.
    pub fn n_rows(&self) -> usize {
        self.values.nrows()
    }

    /// Number of columns.
    pub fn n_cols(&self) -> usize {
        self.values.ncols()
    }

    /// Column by name.
    pub fn column(&self, name: &str) -> Option<ArrayView1<'_, f64>> {
        self.names
            .iter()
            .position(|n| n == name)
            .map(|j| self.values.column(j))
    }
}
