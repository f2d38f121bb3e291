#![doc = include_str!("../README.md")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod comparison;
pub mod config;
pub mod error;
pub mod scheduler;
pub mod sink;

pub use comparison::prepare_comparison_table;
pub use config::{MAX_REFRESH_HOURS, ReportingConfig, SchedulerConfig, StorageConnection};
pub use error::{ReportingError, UploadError};
pub use scheduler::{RefreshHandle, RefreshScheduler, SharedRows};
pub use sink::{AzureBlobSink, ConfiguredSink, LocalDirectorySink, ReportSink, blob_name, upload_predictions};
