//! Prediction input parsing.

use serde_json::Value;
use std::path::Path;
use thiserror::Error;

/// Errors reading `--input`
#[derive(Debug, Error)]
pub(crate) enum InputError {
    #[error("--input is required in predict mode")]
    Missing,

    #[error("could not read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("input is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// Parse `--input` as inline JSON, or as a path when it names a `.json` file.
pub(crate) fn read_input(input: Option<&str>) -> Result<Value, InputError> {
    let input = input.map(str::trim).filter(|s| !s.is_empty()).ok_or(InputError::Missing)?;

    let path = Path::new(input);
    let is_json_file = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    if is_json_file {
        let text = std::fs::read_to_string(path).map_err(|source| InputError::Read {
            path: input.to_string(),
            source,
        })?;
        Ok(serde_json::from_str(&text)?)
    } else {
        Ok(serde_json::from_str(input)?)
    }
}
