//! Prediction I/O adapter.
//!
//! Converts JSON records into model input, runs the model and wraps the
//! outcome in a result tagged by `status`. Every failure, whether a malformed
//! record or a model error, comes back as `{"status": "error", "message": ...}`.
//! A batch is all-or-nothing: one bad record fails the whole request.

use crate::export::PredictionRow;
use chrono::{DateTime, Utc};
use contrail_model::Predictor;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

/// Why a request could not be turned into model input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PredictionInputError {
    /// Batch input was not a JSON array
    #[error("batch input must be a JSON array of records")]
    NotAnArray,

    /// Batch contained no records
    #[error("batch input contains no records")]
    EmptyBatch,

    /// Record was not a JSON object
    #[error("record {index} is not a JSON object")]
    NotAnObject {
        /// Position in the request
        index: usize,
    },

    /// Record lacks a required field
    #[error("record {index} is missing required field '{field}'")]
    MissingField {
        /// Position in the request
        index: usize,
        /// Absent field
        field: String,
    },

    /// Required field is not a number
    #[error("record {index} field '{field}' must be numeric")]
    NonNumeric {
        /// Position in the request
        index: usize,
        /// Offending field
        field: String,
    },

    /// Records could not be assembled into a table
    #[error("failed to build input table: {0}")]
    Table(String),
}

/// Outcome of a single-record request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum SinglePrediction {
    /// Prediction succeeded
    Success {
        /// Predicted profit
        predicted_profit: f64,
        /// The record as received
        input_data: Map<String, Value>,
    },
    /// Prediction failed
    Error {
        /// What went wrong
        message: String,
    },
}

/// Outcome of a batch request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum BatchPrediction {
    /// Every record was predicted
    Success {
        /// One prediction per record, in request order
        predictions: Vec<f64>,
        /// The records as received
        input_data: Vec<Map<String, Value>>,
    },
    /// The batch failed as a whole
    Error {
        /// What went wrong
        message: String,
    },
}

impl SinglePrediction {
    /// Whether the request succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Flatten into export rows; empty for an error.
    pub fn prediction_rows(&self, timestamp: DateTime<Utc>) -> Vec<PredictionRow> {
        match self {
            Self::Success {
                predicted_profit,
                input_data,
            } => vec![PredictionRow::new(timestamp, 0, *predicted_profit, input_data.clone())],
            Self::Error { .. } => Vec::new(),
        }
    }
}

impl BatchPrediction {
    /// Whether the request succeeded.
    pub const fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// Flatten into export rows; empty for an error.
    pub fn prediction_rows(&self, timestamp: DateTime<Utc>) -> Vec<PredictionRow> {
        match self {
            Self::Success {
                predictions,
                input_data,
            } => predictions
                .iter()
                .zip(input_data)
                .enumerate()
                .map(|(row, (p, input))| PredictionRow::new(timestamp, row, *p, input.clone()))
                .collect(),
            Self::Error { .. } => Vec::new(),
        }
    }
}

/// Runs a predictor behind a JSON boundary
#[derive(Debug, Clone)]
pub struct PredictionAdapter<P: Predictor> {
    predictor: P,
}

impl<P: Predictor> PredictionAdapter<P> {
    /// Wrap a predictor.
    pub const fn new(predictor: P) -> Self {
        Self { predictor }
    }

    /// The wrapped predictor.
    pub const fn predictor(&self) -> &P {
        &self.predictor
    }

    /// Predict one record.
    pub fn process_single(&self, record: &Value) -> SinglePrediction {
        let Some(object) = record.as_object() else {
            return SinglePrediction::Error {
                message: PredictionInputError::NotAnObject { index: 0 }.to_string(),
            };
        };

        match self.predict_records(&[object]) {
            Ok(predictions) => match predictions.first() {
                Some(&predicted_profit) => SinglePrediction::Success {
                    predicted_profit,
                    input_data: object.clone(),
                },
                None => SinglePrediction::Error {
                    message: "model returned no prediction".to_string(),
                },
            },
            Err(message) => {
                warn!(%message, "Single prediction failed");
                SinglePrediction::Error { message }
            }
        }
    }

    /// Predict every record of a JSON array, all or nothing.
    pub fn process_batch(&self, records: &Value) -> BatchPrediction {
        let objects = match batch_objects(records) {
            Ok(objects) => objects,
            Err(e) => {
                warn!(error = %e, "Rejected batch input");
                return BatchPrediction::Error {
                    message: e.to_string(),
                };
            }
        };

        match self.predict_records(&objects) {
            Ok(predictions) if predictions.len() == objects.len() => BatchPrediction::Success {
                predictions,
                input_data: objects.into_iter().cloned().collect(),
            },
            Ok(predictions) => BatchPrediction::Error {
                message: format!(
                    "model returned {} predictions for {} records",
                    predictions.len(),
                    objects.len()
                ),
            },
            Err(message) => {
                warn!(%message, "Batch prediction failed");
                BatchPrediction::Error { message }
            }
        }
    }

    fn predict_records(&self, records: &[&Map<String, Value>]) -> Result<Vec<f64>, String> {
        let columns = self.predictor.required_columns();
        let frame = records_to_frame(records, &columns).map_err(|e| e.to_string())?;
        debug!(rows = frame.height(), "Running prediction");
        self.predictor.predict(&frame).map_err(|e| e.to_string())
    }
}

fn batch_objects(records: &Value) -> Result<Vec<&Map<String, Value>>, PredictionInputError> {
    let array = records.as_array().ok_or(PredictionInputError::NotAnArray)?;
    if array.is_empty() {
        return Err(PredictionInputError::EmptyBatch);
    }
    array
        .iter()
        .enumerate()
        .map(|(index, record)| {
            record
                .as_object()
                .ok_or(PredictionInputError::NotAnObject { index })
        })
        .collect()
}

/// Build a table holding `columns`, read as numbers from every record.
pub fn records_to_frame(
    records: &[&Map<String, Value>],
    columns: &[String],
) -> Result<DataFrame, PredictionInputError> {
    let mut table = Vec::with_capacity(columns.len());
    for field in columns {
        let values = records
            .iter()
            .enumerate()
            .map(|(index, record)| match record.get(field) {
                None => Err(PredictionInputError::MissingField {
                    index,
                    field: field.clone(),
                }),
                Some(value) => value.as_f64().ok_or_else(|| PredictionInputError::NonNumeric {
                    index,
                    field: field.clone(),
                }),
            })
            .collect::<Result<Vec<f64>, _>>()?;
        table.push(Column::new(field.as_str().into(), values));
    }
    DataFrame::new(table).map_err(|e| PredictionInputError::Table(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use contrail_model::{ModelError, Result as ModelResult};
    use rstest::rstest;
    use serde_json::json;

    /// Predicts `a + 10 * b` and fails when told to.
    struct Linear {
        fail: bool,
    }

    impl Predictor for Linear {
        fn required_columns(&self) -> Vec<String> {
            vec!["a".to_string(), "b".to_string()]
        }

        fn predict(&self, features: &DataFrame) -> ModelResult<Vec<f64>> {
            if self.fail {
                return Err(ModelError::NotFitted);
            }
            let a = features.column("a")?.f64()?;
            let b = features.column("b")?.f64()?;
            Ok(a.into_iter()
                .zip(b)
                .map(|(a, b)| a.unwrap_or(0.0) + 10.0 * b.unwrap_or(0.0))
                .collect())
        }
    }

    fn adapter() -> PredictionAdapter<Linear> {
        PredictionAdapter::new(Linear { fail: false })
    }

    #[test]
    fn test_single_success_echoes_input() {
        let record = json!({"a": 1.5, "b": 2, "note": "extra fields are kept"});
        let result = adapter().process_single(&record);

        match &result {
            SinglePrediction::Success {
                predicted_profit,
                input_data,
            } => {
                assert_eq!(*predicted_profit, 21.5);
                assert_eq!(input_data.get("note"), Some(&json!("extra fields are kept")));
            }
            other => panic!("unexpected result: {other:?}"),
        }

        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["status"], "success");
        assert_eq!(wire["predicted_profit"], 21.5);
    }

    #[test]
    fn test_single_missing_field() {
        let result = adapter().process_single(&json!({"a": 1.0}));
        match result {
            SinglePrediction::Error { message } => assert!(message.contains("'b'")),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[rstest]
    #[case::text_value(json!({"a": "1", "b": 2}))]
    #[case::array(json!([1, 2]))]
    #[case::null_value(json!({"a": null, "b": 2}))]
    fn test_single_rejects_malformed(#[case] record: Value) {
        assert!(!adapter().process_single(&record).is_success());
    }

    #[test]
    fn test_model_failure_becomes_error_status() {
        let adapter = PredictionAdapter::new(Linear { fail: true });
        let wire = serde_json::to_value(adapter.process_single(&json!({"a": 1, "b": 1}))).unwrap();
        assert_eq!(wire["status"], "error");
        assert!(wire["message"].is_string());
    }

    #[test]
    fn test_batch_preserves_order() {
        let records = json!([{"a": 1, "b": 0}, {"a": 0, "b": 1}, {"a": 2, "b": 2}]);
        match adapter().process_batch(&records) {
            BatchPrediction::Success {
                predictions,
                input_data,
            } => {
                assert_eq!(predictions, vec![1.0, 10.0, 22.0]);
                assert_eq!(input_data.len(), 3);
            }
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_batch_all_or_nothing() {
        let records = json!([{"a": 1, "b": 0}, {"a": 0}, {"a": 2, "b": 2}]);
        let result = adapter().process_batch(&records);
        assert!(!result.is_success());
        assert!(result.prediction_rows(Utc::now()).is_empty());

        let wire = serde_json::to_value(&result).unwrap();
        assert_eq!(wire["status"], "error");
        assert!(wire.get("predictions").is_none());
    }

    #[rstest]
    #[case::object(json!({"a": 1, "b": 1}))]
    #[case::empty(json!([]))]
    #[case::scalar_record(json!([{"a": 1, "b": 1}, 3]))]
    fn test_batch_shape_errors(#[case] records: Value) {
        assert!(!adapter().process_batch(&records).is_success());
    }

    #[test]
    fn test_prediction_rows() {
        let records = json!([{"a": 1, "b": 0}, {"a": 0, "b": 1}]);
        let rows = adapter().process_batch(&records).prediction_rows(Utc::now());
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[1].row, 1);
        assert_eq!(rows[1].predicted_profit, 10.0);
    }
}
