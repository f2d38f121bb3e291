//! Temporal features
//!
//! Classifies the scheduled departure hour into a peak-hour flag and a
//! period of the day. Both classifications are total over 0-23; hours
//! outside that range are rejected by [`TemporalFeatures::validate_hours`]
//! before any column is derived.

use crate::error::{FeatureError, Result};
use crate::group::{FeatureCategory, FeatureGroup};
use contrail_data::{ColumnMap, column_values};
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Inclusive hour windows of the morning and evening departure peaks
pub const PEAK_HOUR_WINDOWS: [(u32, u32); 2] = [(6, 9), (17, 19)];

/// First hour of the morning period
pub const MORNING_START: u32 = 5;
/// First hour of the afternoon period
pub const AFTERNOON_START: u32 = 12;
/// First hour of the evening period
pub const EVENING_START: u32 = 17;
/// First hour of the night period
pub const NIGHT_START: u32 = 22;

/// Whether a departure hour falls in a peak window.
pub fn is_peak_hour(hour: u32) -> bool {
    PEAK_HOUR_WINDOWS
        .iter()
        .any(|&(start, end)| (start..=end).contains(&hour))
}

/// Period of the day a departure belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DayPeriod {
    /// 05:00 to 11:59
    Morning,
    /// 12:00 to 16:59
    Afternoon,
    /// 17:00 to 21:59
    Evening,
    /// 22:00 to 04:59
    Night,
}

impl DayPeriod {
    /// Every period, in encoding column order.
    pub const ALL: [Self; 4] = [Self::Morning, Self::Afternoon, Self::Evening, Self::Night];

    /// Classify an hour.
    pub const fn from_hour(hour: u32) -> Self {
        match hour {
            h if h >= MORNING_START && h < AFTERNOON_START => Self::Morning,
            h if h >= AFTERNOON_START && h < EVENING_START => Self::Afternoon,
            h if h >= EVENING_START && h < NIGHT_START => Self::Evening,
            _ => Self::Night,
        }
    }

    /// Label stored in the `day_period` column.
    pub const fn label(self) -> &'static str {
        match self {
            Self::Morning => "Morning",
            Self::Afternoon => "Afternoon",
            Self::Evening => "Evening",
            Self::Night => "Night",
        }
    }

    /// Name of the one-hot column for this period.
    pub const fn encoded_column(self) -> &'static str {
        match self {
            Self::Morning => "day_period_morning",
            Self::Afternoon => "day_period_afternoon",
            Self::Evening => "day_period_evening",
            Self::Night => "day_period_night",
        }
    }
}

/// Peak-hour flag and day-period label
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TemporalFeatures {
    columns: ColumnMap,
}

impl TemporalFeatures {
    /// Columns produced by this group.
    pub const OUTPUTS: &'static [&'static str] = &["peak_hour", "day_period"];

    /// Create the group over the given column names.
    pub const fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }

    /// Check every departure hour is an integer in 0-23.
    ///
    /// # Errors
    /// [`FeatureError::InvalidHour`] naming the first offending row.
    pub fn validate_hours(&self, df: &DataFrame) -> Result<()> {
        let hours = column_values(df, &self.columns.departure_hour)?;
        match hours
            .iter()
            .position(|&h| !h.is_finite() || h.fract() != 0.0 || !(0.0..=23.0).contains(&h))
        {
            Some(row) => Err(FeatureError::InvalidHour {
                row,
                value: hours[row],
            }),
            None => Ok(()),
        }
    }
}

fn hour_of(value: Option<i64>) -> Option<u32> {
    value.and_then(|h| u32::try_from(h).ok())
}

impl FeatureGroup for TemporalFeatures {
    fn name(&self) -> &str {
        "temporal"
    }

    fn category(&self) -> FeatureCategory {
        FeatureCategory::Temporal
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![self.columns.departure_hour.as_str()]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        Self::OUTPUTS
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let hour = col(self.columns.departure_hour.as_str()).cast(DataType::Int64);

        Ok(data.with_columns([
            hour.clone()
                .map(
                    |c: Column| {
                        let flags: Int32Chunked = c
                            .i64()?
                            .into_iter()
                            .map(|h| hour_of(h).map(|h| i32::from(is_peak_hour(h))))
                            .collect();
                        Ok(Some(flags.into_series().into()))
                    },
                    GetOutput::from_type(DataType::Int32),
                )
                .alias("peak_hour"),
            hour.map(
                |c: Column| {
                    let labels: StringChunked = c
                        .i64()?
                        .into_iter()
                        .map(|h| hour_of(h).map(|h| DayPeriod::from_hour(h).label()))
                        .collect();
                    Ok(Some(labels.into_series().into()))
                },
                GetOutput::from_type(DataType::String),
            )
            .alias("day_period"),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::flights;
    use crate::group::apply_group;
    use contrail_data::schema;
    use rstest::rstest;

    #[rstest]
    #[case(0, DayPeriod::Night)]
    #[case(4, DayPeriod::Night)]
    #[case(5, DayPeriod::Morning)]
    #[case(11, DayPeriod::Morning)]
    #[case(12, DayPeriod::Afternoon)]
    #[case(16, DayPeriod::Afternoon)]
    #[case(17, DayPeriod::Evening)]
    #[case(21, DayPeriod::Evening)]
    #[case(22, DayPeriod::Night)]
    #[case(23, DayPeriod::Night)]
    fn test_day_period_boundaries(#[case] hour: u32, #[case] expected: DayPeriod) {
        assert_eq!(DayPeriod::from_hour(hour), expected);
    }

    #[test]
    fn test_day_period_total_over_day() {
        for hour in 0..24 {
            assert!(DayPeriod::ALL.contains(&DayPeriod::from_hour(hour)));
        }
    }

    #[test]
    fn test_peak_hours() {
        let peaks: Vec<u32> = (0..24).filter(|&h| is_peak_hour(h)).collect();
        assert_eq!(peaks, vec![6, 7, 8, 9, 17, 18, 19]);
    }

    #[test]
    fn test_temporal_columns() {
        let out = apply_group(&TemporalFeatures::default(), &flights()).unwrap();

        let peak: Vec<Option<i32>> = out.column("peak_hour").unwrap().i32().unwrap().into_iter().collect();
        assert_eq!(peak, vec![Some(1), Some(0), Some(1), Some(0)]);

        let periods: Vec<Option<&str>> =
            out.column("day_period").unwrap().str().unwrap().into_iter().collect();
        assert_eq!(
            periods,
            vec![Some("Morning"), Some("Afternoon"), Some("Evening"), Some("Night")]
        );
    }

    #[rstest]
    #[case(vec![Some(7.0), Some(24.0)], 1)]
    #[case(vec![Some(-1.0), Some(3.0)], 0)]
    #[case(vec![Some(6.0), Some(7.5)], 1)]
    #[case(vec![None, Some(7.0)], 0)]
    fn test_invalid_hours_rejected(#[case] hours: Vec<Option<f64>>, #[case] bad_row: usize) {
        let df = DataFrame::new(vec![Column::new(schema::DEPARTURE_HOUR.into(), hours)]).unwrap();
        let err = TemporalFeatures::default().validate_hours(&df).unwrap_err();
        assert!(matches!(err, FeatureError::InvalidHour { row, .. } if row == bad_row));
    }

    #[test]
    fn test_float_encoded_hours_accepted() {
        let df = DataFrame::new(vec![Column::new(
            schema::DEPARTURE_HOUR.into(),
            vec![0.0, 12.0, 23.0],
        )])
        .unwrap();
        assert!(TemporalFeatures::default().validate_hours(&df).is_ok());
    }
}
