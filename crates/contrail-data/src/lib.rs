#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/contrail-analytics/contrail/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod loader;
pub mod matrix;
pub mod schema;
pub mod snapshot;

pub use error::{DataError, Result};
pub use loader::load_observations;
pub use matrix::{FeatureMatrix, column_values, is_numeric_dtype, numeric_column_names};
pub use schema::ColumnMap;
pub use snapshot::TableSnapshot;

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
