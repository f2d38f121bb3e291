#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod encoding;
pub mod engineer;
pub mod error;
pub mod financial;
pub mod group;
pub mod imputer;
pub mod interaction;
pub mod linalg;
pub mod operational;
pub mod pipeline;
pub mod reduction;
pub mod registry;
pub mod selection;
pub mod temporal;

pub use encoding::DayPeriodEncoder;
pub use engineer::FeatureEngineer;
pub use error::{FeatureError, Result};
pub use financial::FinancialFeatures;
pub use group::{FeatureCategory, FeatureGroup};
pub use imputer::MeanImputer;
pub use interaction::InteractionFeatures;
pub use operational::OperationalFeatures;
pub use pipeline::{FeatureConfig, FeaturePipeline};
pub use reduction::PcaReducer;
pub use registry::{FeatureInfo, available_features, get_feature_info};
pub use selection::FeatureSelector;
pub use temporal::{DayPeriod, TemporalFeatures, is_peak_hour};

#[cfg(test)]
mod fixtures;
