//! Interaction features

use crate::error::Result;
use crate::group::{FeatureCategory, FeatureGroup, float, ratio};
use contrail_data::ColumnMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Load x utilization and revenue and cost per utilization hour
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InteractionFeatures {
    columns: ColumnMap,
}

impl InteractionFeatures {
    /// Columns produced by this group.
    pub const OUTPUTS: &'static [&'static str] =
        &["load_utilization", "revenue_per_hour", "cost_per_hour"];

    /// Create the group over the given column names.
    pub const fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }
}

impl FeatureGroup for InteractionFeatures {
    fn name(&self) -> &str {
        "interaction"
    }

    fn category(&self) -> FeatureCategory {
        FeatureCategory::Interaction
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![
            self.columns.load_factor.as_str(),
            self.columns.utilization.as_str(),
            self.columns.revenue.as_str(),
            self.columns.operating_cost.as_str(),
        ]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        Self::OUTPUTS
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let load = float(&self.columns.load_factor);
        let utilization = float(&self.columns.utilization);

        Ok(data.with_columns([
            (load * utilization.clone()).alias("load_utilization"),
            ratio(float(&self.columns.revenue), utilization.clone()).alias("revenue_per_hour"),
            ratio(float(&self.columns.operating_cost), utilization).alias("cost_per_hour"),
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
    fn test_interaction_values() {
        let out = apply_group(&InteractionFeatures::default(), &flights()).unwrap();

        assert_abs_diff_eq!(floats(&out, "load_utilization")[0], 960.0, epsilon = 1e-9);
        assert_abs_diff_eq!(floats(&out, "revenue_per_hour")[3], 5_000.0, epsilon = 1e-9);
        assert_abs_diff_eq!(floats(&out, "cost_per_hour")[1], 5_250.0, epsilon = 1e-9);
        assert!(floats(&out, "revenue_per_hour")[2].is_nan());
    }
}
