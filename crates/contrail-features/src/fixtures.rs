//! Shared test tables

use contrail_data::schema;
use polars::prelude::*;

/// Four flights covering morning, afternoon, evening and night departures.
pub(crate) fn flights() -> DataFrame {
    DataFrame::new(vec![
        Column::new(schema::REVENUE.into(), vec![50_000.0, 40_000.0, 60_000.0, 30_000.0]),
        Column::new(
            schema::OPERATING_COST.into(),
            vec![40_000.0, 42_000.0, 45_000.0, 0.0],
        ),
        Column::new(schema::LOAD_FACTOR.into(), vec![80.0, 0.0, 90.0, 75.0]),
        Column::new(schema::UTILIZATION.into(), vec![12.0, 8.0, 0.0, 6.0]),
        Column::new(schema::FLEET_AVAILABILITY.into(), vec![95.0, 90.0, 85.0, 100.0]),
        Column::new(schema::MAINTENANCE_DOWNTIME.into(), vec![2.0, 1.0, 3.0, 0.5]),
        Column::new(schema::DEPARTURE_HOUR.into(), vec![7i64, 13, 18, 23]),
        Column::new(schema::PROFIT.into(), vec![10_000.0, -2_000.0, 15_000.0, 30_000.0]),
    ])
    .expect("valid fixture")
}

/// Values of a float column, NaN for nulls.
pub(crate) fn floats(df: &DataFrame, name: &str) -> Vec<f64> {
    contrail_data::column_values(df, name).expect("numeric column")
}
