#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod cross_validation;
pub mod error;
pub mod evaluation;
pub mod forest;
pub mod model;
pub mod split;
pub mod tree;

pub use cross_validation::{CrossValidationSummary, cross_validate};
pub use error::{ModelError, Result};
pub use evaluation::{EvaluationError, RegressionMetrics, SummaryStatistics, evaluate, r2_score};
pub use forest::{ForestConfig, RandomForestRegressor};
pub use model::{ModelConfig, Predictor, ProfitModel, TestPartition};
pub use split::{TrainTestSplit, split_features_target, take_rows, take_values, train_test_split};
pub use tree::{RegressionTree, TreeConfig};
