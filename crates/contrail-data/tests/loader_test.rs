//! Integration tests for observation loading

use contrail_data::{ColumnMap, DataError, FeatureMatrix, column_values, load_observations};
use std::fs;

const SAMPLE: &str = "\
Flight Number,Revenue (USD),Operating Cost (USD),Load Factor (%),Aircraft Utilization (Hours/Day),Fleet Availability (%),Maintenance Downtime (Hours),Scheduled_Departure_Hour,Profit
AA101,52000.5,41000.0,82.5,11.2,94.0,1.5,7,11000.5
DL202,48000.0,47500.0,67.0,9.8,90.5,2.0,13,500.0
UA303,61000.0,43000.0,91.0,12.4,97.0,0.5,18,18000.0
";

#[test]
fn test_load_airline_sample() {
    let path = std::env::temp_dir().join("contrail_loader_airline_sample.csv");
    fs::write(&path, SAMPLE).unwrap();

    let df = load_observations(&path).unwrap();
    assert_eq!(df.height(), 3);

    let columns = ColumnMap::default();
    for name in columns.raw_inputs() {
        assert!(df.column(name).is_ok(), "missing {}", name);
    }

    let profit = column_values(&df, &columns.target).unwrap();
    assert_eq!(profit, vec![11000.5, 500.0, 18000.0]);

    // Row order survives ingestion
    let matrix = FeatureMatrix::from_frame(&df, &[columns.departure_hour.clone()]).unwrap();
    assert_eq!(matrix.values().column(0).to_vec(), vec![7.0, 13.0, 18.0]);

    // Flight numbers are text and cannot be read as features
    let err = column_values(&df, "Flight Number").unwrap_err();
    assert!(matches!(err, DataError::NonNumericColumn { .. }));

    fs::remove_file(path).ok();
}
