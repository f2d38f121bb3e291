//! Feature registry
//!
//! Static metadata for every engineered column. The importance chart uses it
//! to label each bar with a category and description.

use crate::group::FeatureCategory;

/// Feature metadata
#[derive(Debug, Clone)]
pub struct FeatureInfo {
    /// Column name (unique identifier)
    pub name: &'static str,
    /// Feature category
    pub category: FeatureCategory,
    /// Brief description of what the feature measures
    pub description: &'static str,
    /// Raw inputs the feature is computed from
    pub inputs: &'static [&'static str],
}

/// Get all engineered feature info
pub fn available_features() -> Vec<FeatureInfo> {
    vec![
        // Financial
        FeatureInfo {
            name: "revenue_cost_ratio",
            category: FeatureCategory::Financial,
            description: "Revenue divided by operating cost",
            inputs: &["revenue", "operating_cost"],
        },
        FeatureInfo {
            name: "operating_margin",
            category: FeatureCategory::Financial,
            description: "Share of revenue left after operating cost",
            inputs: &["revenue", "operating_cost"],
        },
        FeatureInfo {
            name: "revenue_per_seat",
            category: FeatureCategory::Financial,
            description: "Revenue per percentage point of load factor",
            inputs: &["revenue", "load_factor"],
        },
        FeatureInfo {
            name: "cost_per_seat",
            category: FeatureCategory::Financial,
            description: "Operating cost per percentage point of load factor",
            inputs: &["operating_cost", "load_factor"],
        },
        // Operational
        FeatureInfo {
            name: "utilization_efficiency",
            category: FeatureCategory::Operational,
            description: "Daily utilization as a fraction of 24 hours",
            inputs: &["utilization"],
        },
        FeatureInfo {
            name: "asset_utilization",
            category: FeatureCategory::Operational,
            description: "Utilization weighted by fleet availability",
            inputs: &["utilization", "fleet_availability"],
        },
        FeatureInfo {
            name: "maintenance_ratio",
            category: FeatureCategory::Operational,
            description: "Maintenance downtime per utilization hour",
            inputs: &["maintenance_downtime", "utilization"],
        },
        // Temporal
        FeatureInfo {
            name: "peak_hour",
            category: FeatureCategory::Temporal,
            description: "1 for departures 06-09 or 17-19, else 0",
            inputs: &["departure_hour"],
        },
        FeatureInfo {
            name: "day_period",
            category: FeatureCategory::Temporal,
            description: "Morning, Afternoon, Evening or Night label",
            inputs: &["departure_hour"],
        },
        FeatureInfo {
            name: "day_period_morning",
            category: FeatureCategory::Temporal,
            description: "1 for departures 05-11",
            inputs: &["departure_hour"],
        },
        FeatureInfo {
            name: "day_period_afternoon",
            category: FeatureCategory::Temporal,
            description: "1 for departures 12-16",
            inputs: &["departure_hour"],
        },
        FeatureInfo {
            name: "day_period_evening",
            category: FeatureCategory::Temporal,
            description: "1 for departures 17-21",
            inputs: &["departure_hour"],
        },
        FeatureInfo {
            name: "day_period_night",
            category: FeatureCategory::Temporal,
            description: "1 for departures 22-04",
            inputs: &["departure_hour"],
        },
        // Interaction
        FeatureInfo {
            name: "load_utilization",
            category: FeatureCategory::Interaction,
            description: "Load factor times utilization",
            inputs: &["load_factor", "utilization"],
        },
        FeatureInfo {
            name: "revenue_per_hour",
            category: FeatureCategory::Interaction,
            description: "Revenue per utilization hour",
            inputs: &["revenue", "utilization"],
        },
        FeatureInfo {
            name: "cost_per_hour",
            category: FeatureCategory::Interaction,
            description: "Operating cost per utilization hour",
            inputs: &["operating_cost", "utilization"],
        },
    ]
}

/// Get feature info by name
pub fn get_feature_info(name: &str) -> Option<FeatureInfo> {
    available_features().into_iter().find(|f| f.name == name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engineer::FeatureEngineer;

    #[test]
    fn test_registry_matches_engineer() {
        let engineer = FeatureEngineer::default();
        let derived = engineer.derived_columns();
        let registered: Vec<&str> = available_features().iter().map(|f| f.name).collect();

        assert_eq!(derived.len(), registered.len());
        for name in derived {
            assert!(registered.contains(&name), "{name} not registered");
        }
    }

    #[test]
    fn test_category_sizes() {
        let features = available_features();
        let count = |category| features.iter().filter(|f| f.category == category).count();
        assert_eq!(count(FeatureCategory::Financial), 4);
        assert_eq!(count(FeatureCategory::Operational), 3);
        assert_eq!(count(FeatureCategory::Temporal), 6);
        assert_eq!(count(FeatureCategory::Interaction), 3);
    }

    #[test]
    fn test_get_feature_info() {
        let info = get_feature_info("maintenance_ratio").unwrap();
        assert_eq!(info.category, FeatureCategory::Operational);
        assert!(get_feature_info("nonexistent").is_none());
    }
}
