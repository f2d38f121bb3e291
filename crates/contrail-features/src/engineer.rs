//! Feature engineer.
//!
//! Runs the four feature groups and the day-period encoding over an
//! observation table. Every required column is checked before anything is
//! computed, so a failing pass produces no partial output.

use crate::encoding::DayPeriodEncoder;
use crate::error::Result;
use crate::financial::FinancialFeatures;
use crate::group::{FeatureGroup, apply_group, check_columns};
use crate::interaction::InteractionFeatures;
use crate::operational::OperationalFeatures;
use crate::temporal::TemporalFeatures;
use contrail_data::ColumnMap;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Derives every engineered feature from raw flight columns
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureEngineer {
    financial: FinancialFeatures,
    operational: OperationalFeatures,
    temporal: TemporalFeatures,
    interaction: InteractionFeatures,
    encoder: DayPeriodEncoder,
    feature_list: Vec<String>,
}

impl FeatureEngineer {
    /// Create an engineer over the given column names.
    pub fn new(columns: ColumnMap) -> Self {
        Self {
            financial: FinancialFeatures::new(columns.clone()),
            operational: OperationalFeatures::new(columns.clone()),
            temporal: TemporalFeatures::new(columns.clone()),
            interaction: InteractionFeatures::new(columns),
            encoder: DayPeriodEncoder,
            feature_list: Vec::new(),
        }
    }

    fn groups(&self) -> [&dyn FeatureGroup; 4] {
        [
            &self.financial,
            &self.operational,
            &self.temporal,
            &self.interaction,
        ]
    }

    /// Union of the raw columns read by every group, without duplicates.
    pub fn required_columns(&self) -> Vec<String> {
        let mut required: Vec<String> = Vec::new();
        for group in self.groups() {
            for name in group.required_columns() {
                if !required.iter().any(|r| r == name) {
                    required.push(name.to_string());
                }
            }
        }
        required
    }

    /// Every column appended by [`Self::create_all_features`], in order.
    pub fn derived_columns(&self) -> Vec<&'static str> {
        self.groups()
            .iter()
            .flat_map(|g| g.output_columns().iter().copied())
            .chain(DayPeriodEncoder::output_columns())
            .collect()
    }

    /// Columns of the last table produced by [`Self::create_all_features`].
    pub fn feature_list(&self) -> &[String] {
        &self.feature_list
    }

    /// Append financial features.
    pub fn create_financial_features(&self, df: &DataFrame) -> Result<DataFrame> {
        apply_group(&self.financial, df)
    }

    /// Append operational features.
    pub fn create_operational_features(&self, df: &DataFrame) -> Result<DataFrame> {
        apply_group(&self.operational, df)
    }

    /// Append temporal features.
    pub fn create_temporal_features(&self, df: &DataFrame) -> Result<DataFrame> {
        check_columns(df, &self.temporal.required_columns(), self.temporal.name())?;
        self.temporal.validate_hours(df)?;
        apply_group(&self.temporal, df)
    }

    /// Append interaction features.
    pub fn create_interaction_features(&self, df: &DataFrame) -> Result<DataFrame> {
        apply_group(&self.interaction, df)
    }

    /// Append every derived and encoded column.
    ///
    /// # Errors
    /// * [`crate::FeatureError::MissingColumns`] naming every absent input
    /// * [`crate::FeatureError::InvalidHour`] for a bad departure hour
    pub fn create_all_features(&mut self, df: &DataFrame) -> Result<DataFrame> {
        let out = self.derive_features(df)?;
        self.feature_list = out
            .get_column_names()
            .iter()
            .map(|name| name.to_string())
            .collect();
        Ok(out)
    }

    /// Same as [`Self::create_all_features`] without recording the columns.
    pub fn derive_features(&self, df: &DataFrame) -> Result<DataFrame> {
        let required = self.required_columns();
        let required: Vec<&str> = required.iter().map(String::as_str).collect();
        check_columns(df, &required, "feature engineering")?;
        self.temporal.validate_hours(df)?;

        let mut lazy = df.clone().lazy();
        for group in self.groups() {
            debug!(group = group.name(), columns = ?group.output_columns(), "Deriving features");
            lazy = group.compute(lazy)?;
        }
        let out = self.encoder.encode_lazy(lazy).collect()?;
        debug!(rows = out.height(), columns = out.width(), "Feature pass complete");

        Ok(out)
    }
}
