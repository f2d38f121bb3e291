//! Periodic refresh of uploaded predictions.
//!
//! The scheduler owns a tokio task that, on every tick, uploads a snapshot
//! of the shared prediction rows. The first upload happens one full interval
//! after start. The task ends when [`RefreshHandle::stop`] is awaited or the
//! handle is dropped.

use crate::config::MAX_REFRESH_HOURS;
use crate::sink::{ReportSink, upload_predictions};
use chrono::Utc;
use contrail_output::PredictionRow;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{RwLock, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

const MIN_INTERVAL: Duration = Duration::from_secs(1);
const MAX_INTERVAL: Duration = Duration::from_secs(MAX_REFRESH_HOURS * 3600);

/// Prediction rows shared between the producer and the refresh task
pub type SharedRows = Arc<RwLock<Vec<PredictionRow>>>;

/// Builder for the refresh task
#[derive(Debug)]
pub struct RefreshScheduler<S> {
    sink: Arc<S>,
    rows: SharedRows,
    interval: Duration,
}

impl<S> RefreshScheduler<S>
where
    S: ReportSink + 'static,
{
    /// Create a scheduler uploading `rows` to `sink` every `interval`.
    ///
    /// The interval is clamped to between one second and one year.
    pub fn new(sink: Arc<S>, rows: SharedRows, interval: Duration) -> Self {
        Self {
            sink,
            rows,
            interval: interval.clamp(MIN_INTERVAL, MAX_INTERVAL),
        }
    }

    /// Period between uploads.
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Spawn the refresh task on the current runtime.
    pub fn start(self) -> RefreshHandle {
        let (stop_tx, mut stop_rx) = watch::channel(false);
        let Self {
            sink,
            rows,
            interval,
        } = self;

        info!(sink = %sink.describe(), every = ?interval, "Starting refresh task");

        let task = tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut uploads = 0usize;

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if refresh(sink.as_ref(), &rows).await {
                            uploads += 1;
                        }
                    }
                    changed = stop_rx.changed() => {
                        if changed.is_err() || *stop_rx.borrow() {
                            break;
                        }
                    }
                }
            }

            debug!(uploads, "Refresh task stopped");
            uploads
        });

        RefreshHandle { stop: stop_tx, task }
    }
}

async fn refresh<S: ReportSink>(sink: &S, rows: &SharedRows) -> bool {
    let snapshot = rows.read().await.clone();
    if snapshot.is_empty() {
        debug!("No predictions to refresh");
        return false;
    }
    match upload_predictions(sink, &snapshot, Utc::now()).await {
        Ok(_) => true,
        Err(e) => {
            warn!(error = %e, "Scheduled upload failed");
            false
        }
    }
}

/// Stop handle for a running refresh task
///
/// Dropping the handle also stops the task.
#[derive(Debug)]
pub struct RefreshHandle {
    stop: watch::Sender<bool>,
    task: JoinHandle<usize>,
}

impl RefreshHandle {
    /// Signal the task to stop and wait for it.
    ///
    /// Returns the number of successful uploads.
    pub async fn stop(self) -> usize {
        let _ = self.stop.send(true);
        match self.task.await {
            Ok(uploads) => uploads,
            Err(e) => {
                warn!(error = %e, "Refresh task ended abnormally");
                0
            }
        }
    }

    /// Whether the task has exited.
    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }
}
