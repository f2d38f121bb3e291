#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod diagnostics;
pub mod export;
pub mod prediction;
pub mod report;

pub use diagnostics::DiagnosticsWriter;
pub use export::{ExportError, Exporter, PredictionRow};
pub use prediction::{BatchPrediction, PredictionAdapter, PredictionInputError, SinglePrediction};
pub use report::{EvaluationReport, EvaluationReportBuilder, FeatureImportance, ReportError};
