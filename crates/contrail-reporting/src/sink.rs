//! Upload sinks for prediction reports.

use crate::config::{ReportingConfig, StorageConnection};
use crate::error::UploadError;
use chrono::{DateTime, Utc};
use contrail_output::{Exporter, PredictionRow};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

const USER_AGENT: &str = "contrail/0.1";
const UPLOAD_TIMEOUT: Duration = Duration::from_secs(30);

/// Blob name for an upload made at `now`.
pub fn blob_name(now: DateTime<Utc>) -> String {
    format!("predictions_{}.csv", now.format("%Y%m%d_%H%M%S"))
}

/// Destination for CSV reports
pub trait ReportSink: Send + Sync {
    /// Short description for logs.
    fn describe(&self) -> String;

    /// Store `body` under `name`, replacing any previous object.
    fn upload(
        &self,
        name: &str,
        body: String,
    ) -> impl Future<Output = Result<(), UploadError>> + Send;
}

/// Encode rows as CSV and upload them under a timestamped name.
///
/// Returns the blob name used.
pub async fn upload_predictions<S: ReportSink>(
    sink: &S,
    rows: &[PredictionRow],
    now: DateTime<Utc>,
) -> Result<String, UploadError> {
    let body = rows.export_csv()?;
    let name = blob_name(now);
    sink.upload(&name, body).await?;
    info!(sink = %sink.describe(), blob = %name, rows = rows.len(), "Uploaded predictions");
    Ok(name)
}

/// Azure Blob Storage container authenticated by SAS token
#[derive(Debug, Clone)]
pub struct AzureBlobSink {
    client: reqwest::Client,
    connection: StorageConnection,
    container: String,
}

impl AzureBlobSink {
    /// Create a sink for `container` from a storage connection string.
    pub fn new(connection_string: &str, container: impl Into<String>) -> Result<Self, UploadError> {
        let connection = StorageConnection::parse(connection_string)?;
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(UPLOAD_TIMEOUT)
            .build()?;

        Ok(Self {
            client,
            connection,
            container: container.into(),
        })
    }

    /// Full signed URL of a blob.
    pub fn blob_url(&self, name: &str) -> String {
        format!(
            "{}/{}/{}?{}",
            self.connection.blob_endpoint, self.container, name, self.connection.sas_token
        )
    }
}

impl ReportSink for AzureBlobSink {
    fn describe(&self) -> String {
        format!("{}/{}", self.connection.blob_endpoint, self.container)
    }

    async fn upload(&self, name: &str, body: String) -> Result<(), UploadError> {
        debug!(blob = %name, bytes = body.len(), "PUT block blob");
        let response = self
            .client
            .put(self.blob_url(name))
            .header("x-ms-blob-type", "BlockBlob")
            .header(reqwest::header::CONTENT_TYPE, "text/csv")
            .body(body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(UploadError::Status {
                status: status.as_u16(),
                message,
            });
        }
        Ok(())
    }
}

/// Directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalDirectorySink {
    dir: PathBuf,
}

impl LocalDirectorySink {
    /// Create a sink writing into `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Target directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

impl ReportSink for LocalDirectorySink {
    fn describe(&self) -> String {
        self.dir.display().to_string()
    }

    async fn upload(&self, name: &str, body: String) -> Result<(), UploadError> {
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(name), body).await?;
        Ok(())
    }
}

/// Sink chosen from a [`ReportingConfig`]
#[derive(Debug, Clone)]
pub enum ConfiguredSink {
    /// Blob store upload
    Azure(AzureBlobSink),
    /// Local directory
    Local(LocalDirectorySink),
}

impl ConfiguredSink {
    /// Local directory sink when `local_directory` is set, blob store otherwise.
    pub fn from_config(config: &ReportingConfig) -> Result<Self, UploadError> {
        match &config.local_directory {
            Some(dir) => Ok(Self::Local(LocalDirectorySink::new(
                dir.join(&config.container_name),
            ))),
            None => Ok(Self::Azure(AzureBlobSink::new(
                &config.connection_string,
                config.container_name.clone(),
            )?)),
        }
    }
}

impl ReportSink for ConfiguredSink {
    fn describe(&self) -> String {
        match self {
            Self::Azure(sink) => sink.describe(),
            Self::Local(sink) => sink.describe(),
        }
    }

    async fn upload(&self, name: &str, body: String) -> Result<(), UploadError> {
        match self {
            Self::Azure(sink) => sink.upload(name, body).await,
            Self::Local(sink) => sink.upload(name, body).await,
        }
    }
}
