//! Financial features
//!
//! Ratios of revenue and operating cost, on their own and per percentage
//! point of load factor.

use crate::error::Result;
use crate::group::{FeatureCategory, FeatureGroup, float, ratio};
use contrail_data::ColumnMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};

/// Revenue/cost ratio, operating margin and per-seat revenue and cost
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialFeatures {
    columns: ColumnMap,
}

impl FinancialFeatures {
    /// Columns produced by this group.
    pub const OUTPUTS: &'static [&'static str] = &[
        "revenue_cost_ratio",
        "operating_margin",
        "revenue_per_seat",
        "cost_per_seat",
    ];

    /// Create the group over the given column names.
    pub const fn new(columns: ColumnMap) -> Self {
        Self { columns }
    }
}

impl FeatureGroup for FinancialFeatures {
    fn name(&self) -> &str {
        "financial"
    }

    fn category(&self) -> FeatureCategory {
        FeatureCategory::Financial
    }

    fn required_columns(&self) -> Vec<&str> {
        vec![
            self.columns.revenue.as_str(),
            self.columns.operating_cost.as_str(),
            self.columns.load_factor.as_str(),
        ]
    }

    fn output_columns(&self) -> &'static [&'static str] {
        Self::OUTPUTS
    }

    fn compute(&self, data: LazyFrame) -> Result<LazyFrame> {
        let revenue = float(&self.columns.revenue);
        let cost = float(&self.columns.operating_cost);
        let load = float(&self.columns.load_factor);

        Ok(data.with_columns([
            ratio(revenue.clone(), cost.clone()).alias("revenue_cost_ratio"),
            ratio(revenue.clone() - cost.clone(), revenue.clone()).alias("operating_margin"),
            ratio(revenue, load.clone()).alias("revenue_per_seat"),
            ratio(cost, load).alias("cost_per_seat"),
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
    fn test_financial_values() {
        let out = apply_group(&FinancialFeatures::default(), &flights()).unwrap();
        assert_eq!(out.height(), 4);

        let ratio = floats(&out, "revenue_cost_ratio");
        assert_abs_diff_eq!(ratio[0], 1.25, epsilon = 1e-12);

        let margin = floats(&out, "operating_margin");
        assert_abs_diff_eq!(margin[0], 0.2, epsilon = 1e-12);
        assert_abs_diff_eq!(margin[1], -0.05, epsilon = 1e-12);

        let per_seat = floats(&out, "revenue_per_seat");
        assert_abs_diff_eq!(per_seat[0], 625.0, epsilon = 1e-9);
        assert_abs_diff_eq!(floats(&out, "cost_per_seat")[0], 500.0, epsilon = 1e-9);
    }

    #[test]
    fn test_zero_denominators_are_nan() {
        let out = apply_group(&FinancialFeatures::default(), &flights()).unwrap();
        // Zero load factor on the second flight
        assert!(floats(&out, "revenue_per_seat")[1].is_nan());
        assert!(floats(&out, "cost_per_seat")[1].is_nan());
        // Zero operating cost on the fourth
        assert!(floats(&out, "revenue_cost_ratio")[3].is_nan());
        assert_abs_diff_eq!(floats(&out, "operating_margin")[3], 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_required_columns() {
        let group = FinancialFeatures::default();
        assert!(group.required_columns().contains(&"Revenue (USD)"));
        assert_eq!(group.output_columns().len(), 4);
    }
}
