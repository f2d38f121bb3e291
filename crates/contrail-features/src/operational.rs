//! Operational features

use crate::error::Result;
use crate::group::{FeatureCategory, FeatureGroup, float, ratio};
use contrail_data::ColumnMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Hours in a day, the ceiling for daily utilization
pub const HOURS_PER_DAY: f64 = 24.0;

/// Utilization efficiency, asset utilization and maintenance ratio
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OperationalFeatures {
    columns: ColumnMap,
}

impl OperationalFeatures {
    /// Columns produced by this group.
    pub const OUTPUTS: &'static [&'static str] = &[
        "utilization_efficiency",
        "asset_utilization",
        "maintenance_ratio",
    ];

    /// Create the group over the given column names.
    pub const fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }
}

impl FeatureGroup for OperationalFeatures {
    fn name(&self) -> &str {
        "operational"
    }

    fn category(&self) -> FeatureCategory {
        FeatureCategory::Operational
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![
            self.columns.utilization.as_str(),
            self.columns.fleet_availability.as_str(),
            self.columns.maintenance_downtime.as_str(),
        ]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        Self::OUTPUTS
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let utilization = float(&self.columns.utilization);
        let availability = float(&self.columns.fleet_availability);
        let downtime = float(&self.columns.maintenance_downtime);

        Ok(data.with_columns([
            (utilization.clone() / lit(HOURS_PER_DAY)).alias("utilization_efficiency"),
            (utilization.clone() * availability / lit(100.0)).alias("asset_utilization"),
            ratio(downtime, utilization).alias("maintenance_ratio"),
        ]))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{flights, floats};
    use crate::group::apply_group;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_operational_values() {
        let out = apply_group(&OperationalFeatures::default(), &flights()).unwrap();

        assert_abs_diff_eq!(floats(&out, "utilization_efficiency")[0], 0.5, epsilon = 1e-12);
        assert_abs_diff_eq!(floats(&out, "asset_utilization")[0], 11.4, epsilon = 1e-12);
        assert_abs_diff_eq!(floats(&out, "maintenance_ratio")[1], 0.125, epsilon = 1e-12);
    }

    #[test]
    fn test_zero_utilization() {
        let out = apply_group(&OperationalFeatures::default(), &flights()).unwrap();
        assert_abs_diff_eq!(floats(&out, "utilization_efficiency")[2], 0.0);
        assert!(floats(&out, "maintenance_ratio")[2].is_nan());
    }
}
