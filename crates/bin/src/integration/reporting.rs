//! BI reporting session for one CLI run.

use chrono::Utc;
use contrail_output::PredictionRow;
use contrail_reporting::{
    ConfiguredSink, RefreshHandle, RefreshScheduler, ReportingConfig, ReportingError,
    SchedulerConfig, SharedRows, upload_predictions,
};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

/// Sink, shared rows and refresh task
pub(crate) struct ReportingSession {
    sink: Arc<ConfiguredSink>,
    rows: SharedRows,
    refresh: RefreshHandle,
}

impl ReportingSession {
    /// Load the config, build the sink and start the refresh task.
    pub(crate) fn start(config_path: &Path, scheduler: SchedulerConfig) -> Result<Self, ReportingError> {
        let config = ReportingConfig::load(config_path)?;
        let sink = Arc::new(ConfiguredSink::from_config(&config)?);
        let rows: SharedRows = Arc::new(RwLock::new(Vec::new()));

        let refresh = RefreshScheduler::new(sink.clone(), rows.clone(), scheduler.interval()).start();
        info!(
            container = %config.container_name,
            workspace = config.workspace_id.as_deref().unwrap_or("-"),
            "Reporting enabled"
        );

        Ok(Self {
            sink,
            rows,
            refresh,
        })
    }

    /// Record new rows for the refresh task and upload them right away.
    pub(crate) async fn publish(&self, rows: Vec<PredictionRow>) {
        if rows.is_empty() {
            return;
        }
        self.rows.write().await.extend(rows.iter().cloned());

        if let Err(e) = upload_predictions(self.sink.as_ref(), &rows, Utc::now()).await {
            warn!(error = %e, "Upload of prediction results failed");
        }
    }

    /// Stop the refresh task.
    pub(crate) async fn shutdown(self) {
        let uploads = self.refresh.stop().await;
        info!(uploads, "Reporting stopped");
    }
}
