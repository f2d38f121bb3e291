//! CSV ingestion.
//!
//! Pure ingestion boundary: the table comes back exactly as read, no
//! columns are renamed, cast or derived here.

use crate::error::{DataError, Result};
use polars::prelude::*;
use std::path::Path;
use tracing::info;

/// Load an observation table from a CSV file with a header row.
///
/// # Errors
/// * [`DataError::NotFound`] if the file does not exist
/// * [`DataError::Parse`] if the file is not valid CSV
/// * [`DataError::Empty`] if the file has no data rows
pub fn load_observations(path: impl AsRef<Path>) -> Result<DataFrame> {
    let path = path.as_ref();
    if !path.is_file() {
        return Err(DataError::NotFound(path.to_path_buf()));
    }

    let df = CsvReadOptions::default()
        .with_has_header(true)
        .try_into_reader_with_file_path(Some(path.to_path_buf()))
        .and_then(|reader| reader.finish())
        .map_err(|e| match e {
            PolarsError::NoData(_) => DataError::Empty(path.display().to_string()),
            other => DataError::Parse(format!("{}: {}", path.display(), other)),
        })?;

    if df.height() == 0 {
        return Err(DataError::Empty(path.display().to_string()));
    }

    info!(
        path = %path.display(),
        rows = df.height(),
        columns = df.width(),
        "Loaded observations"
    );

    Ok(df)
}
