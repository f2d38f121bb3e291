//! Raw column names of the airline operations dataset.
//!
//! Feature formulas reference columns through a [`ColumnMap`] so datasets
//! with different headers can be used without touching the formulas.

use serde::{Deserialize, Serialize};

/// Default header for flight revenue.
pub const REVENUE: &str = "Revenue (USD)";
/// Default header for operating cost.
pub const OPERATING_COST: &str = "Operating Cost (USD)";
/// Default header for the load factor percentage.
pub const LOAD_FACTOR: &str = "Load Factor (%)";
/// Default header for daily aircraft utilization.
pub const UTILIZATION: &str = "Aircraft Utilization (Hours/Day)";
/// Default header for fleet availability percentage.
pub const FLEET_AVAILABILITY: &str = "Fleet Availability (%)";
/// Default header for maintenance downtime.
pub const MAINTENANCE_DOWNTIME: &str = "Maintenance Downtime (Hours)";
/// Default header for the scheduled departure hour.
pub const DEPARTURE_HOUR: &str = "Scheduled_Departure_Hour";
/// Default header for the prediction target.
pub const PROFIT: &str = "Profit";

/// Mapping from feature-formula inputs to dataset column names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ColumnMap {
    /// Revenue column
    pub revenue: String,
    /// Operating cost column
    pub operating_cost: String,
    /// Load factor column (percent)
    pub load_factor: String,
    /// Aircraft utilization column (hours per day)
    pub utilization: String,
    /// Fleet availability column (percent)
    pub fleet_availability: String,
    /// Maintenance downtime column (hours)
    pub maintenance_downtime: String,
    /// Scheduled departure hour column (0-23)
    pub departure_hour: String,
    /// Target column
    pub target: String,
}

impl Default for ColumnMap {
    fn default() -> Self {
        Self {
            revenue: REVENUE.to_string(),
            operating_cost: OPERATING_COST.to_string(),
            load_factor: LOAD_FACTOR.to_string(),
            utilization: UTILIZATION.to_string(),
            fleet_availability: FLEET_AVAILABILITY.to_string(),
            maintenance_downtime: MAINTENANCE_DOWNTIME.to_string(),
            departure_hour: DEPARTURE_HOUR.to_string(),
            target: PROFIT.to_string(),
        }
    }
}

impl ColumnMap {
    /// All raw input columns referenced by the feature formulas.
    pub fn raw_inputs(&self) -> Vec<&str> {
        vec![
            self.revenue.as_str(),
            self.operating_cost.as_str(),
            self.load_factor.as_str(),
            self.utilization.as_str(),
            self.fleet_availability.as_str(),
            self.maintenance_downtime.as_str(),
            self.departure_hour.as_str(),
        ]
    }
}
