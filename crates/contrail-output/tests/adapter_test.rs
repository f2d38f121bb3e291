//! Prediction adapter against a trained profit model

use contrail_data::schema;
use contrail_model::{ForestConfig, ModelConfig, ProfitModel, split_features_target};
use contrail_output::{BatchPrediction, Exporter, PredictionAdapter, SinglePrediction};
use polars::prelude::*;
use serde_json::{Value, json};

fn trained_model() -> ProfitModel {
    let n = 40;
    let revenue: Vec<f64> = (0..n).map(|i| 40_000.0 + (i * 700) as f64).collect();
    let cost: Vec<f64> = (0..n).map(|i| 35_000.0 + ((i * 13) % 20) as f64 * 450.0).collect();
    let profit: Vec<f64> = revenue.iter().zip(&cost).map(|(r, c)| r - c).collect();

    let df = DataFrame::new(vec![
        Column::new(schema::REVENUE.into(), revenue),
        Column::new(schema::OPERATING_COST.into(), cost),
        Column::new(schema::LOAD_FACTOR.into(), (0..n).map(|i| 65.0 + (i % 30) as f64).collect::<Vec<_>>()),
        Column::new(schema::UTILIZATION.into(), (0..n).map(|i| 7.0 + (i % 6) as f64).collect::<Vec<_>>()),
        Column::new(schema::FLEET_AVAILABILITY.into(), (0..n).map(|i| 88.0 + (i % 10) as f64).collect::<Vec<_>>()),
        Column::new(schema::MAINTENANCE_DOWNTIME.into(), (0..n).map(|i| 1.0 + (i % 4) as f64).collect::<Vec<_>>()),
        Column::new(schema::DEPARTURE_HOUR.into(), (0..n).map(|i| (i % 24) as i64).collect::<Vec<_>>()),
        Column::new(schema::PROFIT.into(), profit),
    ])
    .unwrap();

    let (features, target) = split_features_target(&df, schema::PROFIT).unwrap();
    let mut model = ProfitModel::new(ModelConfig {
        forest: ForestConfig {
            n_trees: 10,
            ..ForestConfig::default()
        },
        ..ModelConfig::default()
    });
    model.train(&features, &target).unwrap();
    model
}

fn record(hour: i64) -> Value {
    json!({
        "Revenue (USD)": 52000.0,
        "Operating Cost (USD)": 41000.0,
        "Load Factor (%)": 82.5,
        "Aircraft Utilization (Hours/Day)": 11.0,
        "Fleet Availability (%)": 94.0,
        "Maintenance Downtime (Hours)": 1.5,
        "Scheduled_Departure_Hour": hour,
        "Flight Number": "AA101"
    })
}

#[test]
fn test_single_record_through_model() {
    let adapter = PredictionAdapter::new(trained_model());
    match adapter.process_single(&record(7)) {
        SinglePrediction::Success {
            predicted_profit,
            input_data,
        } => {
            assert!(predicted_profit.is_finite());
            assert_eq!(input_data["Flight Number"], "AA101");
        }
        other => panic!("unexpected result: {other:?}"),
    }
}

#[test]
fn test_invalid_hour_is_error_status() {
    let adapter = PredictionAdapter::new(trained_model());
    let result = adapter.process_single(&record(30));
    let wire = serde_json::to_value(&result).unwrap();
    assert_eq!(wire["status"], "error");
    assert!(wire["message"].as_str().unwrap().contains("hour"));
}

#[test]
fn test_batch_rows_export() {
    let adapter = PredictionAdapter::new(trained_model());
    let batch = Value::Array(vec![record(6), record(13), record(22)]);
    let result = adapter.process_batch(&batch);

    let BatchPrediction::Success { predictions, .. } = &result else {
        panic!("unexpected result: {result:?}");
    };
    assert_eq!(predictions.len(), 3);

    let rows = result.prediction_rows(chrono::Utc::now());
    let csv = rows.export_csv().unwrap();
    assert_eq!(csv.lines().count(), 4);
    assert!(csv.lines().next().unwrap().contains("Flight Number"));
}
