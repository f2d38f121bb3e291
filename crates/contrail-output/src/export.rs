//! Export of prediction rows.
//!
//! A [`PredictionRow`] is one predicted profit together with the record it
//! was computed from. Input fields vary between records, so the CSV header
//! is the union of every field name in first-seen order and absent fields are
//! written as empty cells.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Errors that can occur during export operations.
#[derive(Debug, Error)]
pub enum ExportError {
    /// CSV serialization error.
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Output was not valid UTF-8.
    #[error("Invalid UTF-8 output: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

/// One prediction with the record it was made from.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PredictionRow {
    /// When the prediction was produced.
    pub timestamp: DateTime<Utc>,

    /// Position of the record in its request.
    pub row: usize,

    /// Predicted profit.
    pub predicted_profit: f64,

    /// Echoed input record.
    pub inputs: Map<String, Value>,
}

impl PredictionRow {
    /// Create a new prediction row.
    pub const fn new(
        timestamp: DateTime<Utc>,
        row: usize,
        predicted_profit: f64,
        inputs: Map<String, Value>,
    ) -> Self {
        Self {
            timestamp,
            row,
            predicted_profit,
            inputs,
        }
    }
}

/// Types that can be written as a CSV table.
pub trait Exporter {
    /// Encode as CSV with a header row.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    fn export_csv(&self) -> Result<String, ExportError>;
}

fn cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

impl Exporter for [PredictionRow] {
    fn export_csv(&self) -> Result<String, ExportError> {
        let mut fields: Vec<&str> = Vec::new();
        for row in self {
            for key in row.inputs.keys() {
                if !fields.contains(&key.as_str()) {
                    fields.push(key);
                }
            }
        }

        let mut wtr = csv::Writer::from_writer(vec![]);
        let mut header = vec!["timestamp", "row", "predicted_profit"];
        header.extend(fields.iter().copied());
        wtr.write_record(&header)?;

        for row in self {
            let mut record = vec![
                row.timestamp.to_rfc3339(),
                row.row.to_string(),
                row.predicted_profit.to_string(),
            ];
            record.extend(fields.iter().map(|f| cell(row.inputs.get(*f))));
            wtr.write_record(&record)?;
        }

        let bytes = wtr.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8(bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn rows() -> Vec<PredictionRow> {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let first = json!({"Revenue (USD)": 52000.0, "Flight Number": "AA101"});
        let second = json!({"Revenue (USD)": 48000.5, "Gate": 12});
        vec![
            PredictionRow::new(at, 0, 9800.25, first.as_object().unwrap().clone()),
            PredictionRow::new(at, 1, -120.0, second.as_object().unwrap().clone()),
        ]
    }

    #[test]
    fn test_csv_union_header() {
        let csv = rows().export_csv().unwrap();
        let lines: Vec<&str> = csv.lines().collect();

        assert_eq!(lines.len(), 3);
        assert_eq!(
            lines[0],
            "timestamp,row,predicted_profit,Flight Number,Revenue (USD),Gate"
        );
        assert_eq!(lines[1], "2024-03-01T12:00:00+00:00,0,9800.25,AA101,52000.0,");
        assert_eq!(lines[2], "2024-03-01T12:00:00+00:00,1,-120,,48000.5,12");
    }
}
