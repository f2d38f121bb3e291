#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/contrail-analytics/contrail/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod error;
pub mod pipeline;

// Re-export main types from sub-crates
pub use contrail_data as data;
pub use contrail_features as features;
pub use contrail_model as model;
pub use contrail_output as output;
pub use contrail_reporting as reporting;

pub use error::{PipelineError, Result};
pub use pipeline::{COMPARISON_FILE, PipelineOptions, ProfitPipeline, TrainingOutcome};

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
