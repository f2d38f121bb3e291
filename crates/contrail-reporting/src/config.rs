//! Reporting configuration.
//!
//! [`ReportingConfig`] is read once at startup and never mutated. The
//! connection string uses the storage account `Key=Value;` format; only
//! shared access signature credentials are accepted for uploads.

use crate::error::{ReportingError, Result, UploadError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Default refresh period in hours.
pub const DEFAULT_REFRESH_HOURS: u64 = 24;
/// Longest accepted refresh period in hours (one year).
pub const MAX_REFRESH_HOURS: u64 = 8760;

const DEFAULT_PROTOCOL: &str = "https";
const DEFAULT_ENDPOINT_SUFFIX: &str = "core.windows.net";

/// Connector settings for the BI store
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportingConfig {
    /// Storage account connection string
    pub connection_string: String,
    /// Container receiving prediction blobs
    pub container_name: String,
    /// BI workspace the dataset lives in
    #[serde(default)]
    pub workspace_id: Option<String>,
    /// Write uploads to this directory instead of the blob store
    #[serde(default)]
    pub local_directory: Option<PathBuf>,
}

impl ReportingConfig {
    /// Read and validate a JSON config file.
    ///
    /// # Errors
    /// * [`ReportingError::ConfigNotFound`] if the file does not exist
    /// * [`ReportingError::Json`] if it is not valid JSON for this type
    /// * [`ReportingError::InvalidConfig`] if a required value is blank
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.is_file() {
            return Err(ReportingError::ConfigNotFound(path.to_path_buf()));
        }
        let text = std::fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&text)?;
        config.validate()?;
        Ok(config)
    }

    /// Check that required values are present.
    pub fn validate(&self) -> Result<()> {
        if self.container_name.trim().is_empty() {
            return Err(ReportingError::InvalidConfig(
                "container_name is empty".to_string(),
            ));
        }
        if self.local_directory.is_none() && self.connection_string.trim().is_empty() {
            return Err(ReportingError::InvalidConfig(
                "connection_string is empty".to_string(),
            ));
        }
        Ok(())
    }
}

/// Refresh task settings
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SchedulerConfig {
    /// Hours between uploads
    pub refresh_hours: u64,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            refresh_hours: DEFAULT_REFRESH_HOURS,
        }
    }
}

impl SchedulerConfig {
    /// Create a config with the given period.
    pub const fn new(refresh_hours: u64) -> Self {
        Self { refresh_hours }
    }

    /// Period between uploads, clamped to 1..=[`MAX_REFRESH_HOURS`] hours.
    pub const fn interval(&self) -> Duration {
        let hours = if self.refresh_hours == 0 {
            1
        } else if self.refresh_hours > MAX_REFRESH_HOURS {
            MAX_REFRESH_HOURS
        } else {
            self.refresh_hours
        };
        Duration::from_secs(hours * 3600)
    }
}

/// Parsed storage connection string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConnection {
    /// Blob service endpoint without trailing slash
    pub blob_endpoint: String,
    /// SAS query string without leading `?`
    pub sas_token: String,
}

impl StorageConnection {
    /// Parse a `Key=Value;Key=Value` connection string.
    ///
    /// The endpoint comes from `BlobEndpoint`, or is built from
    /// `AccountName` and `EndpointSuffix`.
    ///
    /// # Errors
    /// * [`UploadError::InvalidConnectionString`] if no endpoint can be derived
    /// * [`UploadError::Auth`] if no `SharedAccessSignature` is present
    pub fn parse(connection_string: &str) -> std::result::Result<Self, UploadError> {
        let mut protocol = DEFAULT_PROTOCOL.to_string();
        let mut suffix = DEFAULT_ENDPOINT_SUFFIX.to_string();
        let mut account = None;
        let mut endpoint = None;
        let mut sas = None;
        let mut has_key = false;

        for part in connection_string.split(';').map(str::trim).filter(|p| !p.is_empty()) {
            let (key, value) = part.split_once('=').ok_or_else(|| {
                UploadError::InvalidConnectionString(format!("segment '{}' has no '='", part))
            })?;
            match key.trim() {
                "DefaultEndpointsProtocol" => protocol = value.to_string(),
                "EndpointSuffix" => suffix = value.to_string(),
                "AccountName" => account = Some(value.to_string()),
                "BlobEndpoint" => endpoint = Some(value.trim_end_matches('/').to_string()),
                "SharedAccessSignature" => sas = Some(value.trim_start_matches('?').to_string()),
                "AccountKey" => has_key = true,
                _ => {}
            }
        }

        let blob_endpoint = match (endpoint, account) {
            (Some(endpoint), _) => endpoint,
            (None, Some(account)) => format!("{}://{}.blob.{}", protocol, account, suffix),
            (None, None) => {
                return Err(UploadError::InvalidConnectionString(
                    "neither BlobEndpoint nor AccountName given".to_string(),
                ));
            }
        };

        let sas_token = match sas {
            Some(token) if !token.is_empty() => token,
            _ if has_key => {
                return Err(UploadError::Auth(
                    "account key signing is not supported, provide a SharedAccessSignature"
                        .to_string(),
                ));
            }
            _ => {
                return Err(UploadError::Auth(
                    "connection string has no SharedAccessSignature".to_string(),
                ));
            }
        };

        Ok(Self {
            blob_endpoint,
            sas_token,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_parse_blob_endpoint() {
        let conn = StorageConnection::parse(
            "BlobEndpoint=https://acct.blob.core.windows.net/;SharedAccessSignature=?sv=2022&sig=abc%3D",
        )
        .unwrap();
        assert_eq!(conn.blob_endpoint, "https://acct.blob.core.windows.net");
        assert_eq!(conn.sas_token, "sv=2022&sig=abc%3D");
    }

    #[test]
    fn test_parse_account_name() {
        let conn = StorageConnection::parse(
            "DefaultEndpointsProtocol=https;AccountName=flights;EndpointSuffix=core.windows.net;SharedAccessSignature=sv=1&sig=x==",
        )
        .unwrap();
        assert_eq!(conn.blob_endpoint, "https://flights.blob.core.windows.net");
        assert_eq!(conn.sas_token, "sv=1&sig=x==");
    }

    #[rstest]
    #[case("AccountName=flights;AccountKey=c2VjcmV0")]
    #[case("AccountName=flights")]
    fn test_without_sas_is_auth_error(#[case] input: &str) {
        let err = StorageConnection::parse(input).unwrap_err();
        assert!(matches!(err, UploadError::Auth(_)));
    }

    #[rstest]
    #[case("SharedAccessSignature=sv=1")]
    #[case("garbage")]
    fn test_invalid_connection_string(#[case] input: &str) {
        let err = StorageConnection::parse(input).unwrap_err();
        assert!(matches!(err, UploadError::InvalidConnectionString(_)));
    }

    #[test]
    fn test_load_config() {
        let path = std::env::temp_dir().join("contrail_reporting_config.json");
        std::fs::write(
            &path,
            r#"{"connection_string": "AccountName=a;SharedAccessSignature=sv=1", "container_name": "predictions"}"#,
        )
        .unwrap();

        let config = ReportingConfig::load(&path).unwrap();
        assert_eq!(config.container_name, "predictions");
        assert!(config.workspace_id.is_none());

        std::fs::remove_file(path).ok();
    }

    #[test]
    fn test_load_missing_and_blank() {
        let err = ReportingConfig::load("/no/such/reporting.json").unwrap_err();
        assert!(matches!(err, ReportingError::ConfigNotFound(_)));

        let config = ReportingConfig {
            connection_string: "x".to_string(),
            container_name: " ".to_string(),
            workspace_id: None,
            local_directory: None,
        };
        assert!(matches!(config.validate(), Err(ReportingError::InvalidConfig(_))));
    }

    #[test]
    fn test_scheduler_interval() {
        assert_eq!(SchedulerConfig::default().interval(), Duration::from_secs(86_400));
        assert_eq!(SchedulerConfig::new(0).interval(), Duration::from_secs(3600));
    }

    #[rstest]
    #[case(MAX_REFRESH_HOURS + 1)]
    #[case(u64::MAX / 1000)]
    #[case(u64::MAX)]
    fn test_scheduler_interval_is_capped(#[case] hours: u64) {
        assert_eq!(
            SchedulerConfig::new(hours).interval(),
            Duration::from_secs(MAX_REFRESH_HOURS * 3600)
        );
    }
}
