//! Server configuration, read from environment variables.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use certificate_core::{ObjectLocation, DEFAULT_BUCKET, DEFAULT_REGION};

use crate::entitlements::dynamo::DEFAULT_TABLE;
use crate::pdf::{RenderLimits, DEFAULT_LAUNCH_TIMEOUT, DEFAULT_PRINT_TIMEOUT};

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:3000";
const DEFAULT_ASSETS_DIR: &str = "assets";
const DEFAULT_OFFLINE_PDF_PATH: &str = "certificate.pdf";

/// Error for an environment variable that is set but unusable.
#[derive(Debug, thiserror::Error)]
#[error("Invalid value for {name}: '{value}' ({reason})")]
pub struct ConfigError {
    pub name: &'static str,
    pub value: String,
    pub reason: String,
}

/// Runtime configuration for the certificate server.
#[derive(Debug, Clone)]
pub struct Config {
    /// Listen address when serving plain HTTP.
    pub bind_addr: SocketAddr,
    /// Directory holding `certificate.html` and `medal.png`.
    pub assets_dir: PathBuf,
    /// DynamoDB table name.
    pub table_name: String,
    /// When set, entitlements live in PostgreSQL instead of DynamoDB.
    pub database_url: Option<String>,
    /// Bucket and region certificates are published to.
    pub location: ObjectLocation,
    pub dynamodb_endpoint: Option<String>,
    pub s3_endpoint: Option<String>,
    /// Local development mode: also write each PDF to `offline_pdf_path`.
    pub offline: bool,
    pub offline_pdf_path: PathBuf,
    /// Browser binary; auto-detected when unset.
    pub chrome_executable: Option<PathBuf>,
    pub limits: RenderLimits,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: SocketAddr::from(([0, 0, 0, 0], 3000)),
            assets_dir: PathBuf::from(DEFAULT_ASSETS_DIR),
            table_name: DEFAULT_TABLE.to_string(),
            database_url: None,
            location: ObjectLocation::new(DEFAULT_BUCKET, DEFAULT_REGION),
            dynamodb_endpoint: None,
            s3_endpoint: None,
            offline: false,
            offline_pdf_path: PathBuf::from(DEFAULT_OFFLINE_PDF_PATH),
            chrome_executable: None,
            limits: RenderLimits::default(),
        }
    }
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Reads configuration through `lookup`, falling back to defaults for
    /// unset or empty variables.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let bind_addr = get("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());
        let bind_addr = bind_addr.parse::<SocketAddr>().map_err(|e| ConfigError {
            name: "BIND_ADDR",
            value: bind_addr.clone(),
            reason: e.to_string(),
        })?;

        let location = ObjectLocation::new(
            get("CERTIFICATES_BUCKET").unwrap_or_else(|| DEFAULT_BUCKET.to_string()),
            get("CERTIFICATES_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
        );

        let limits = RenderLimits {
            launch: parse_secs("RENDER_LAUNCH_TIMEOUT_SECS", get("RENDER_LAUNCH_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_LAUNCH_TIMEOUT),
            print: parse_secs("RENDER_PDF_TIMEOUT_SECS", get("RENDER_PDF_TIMEOUT_SECS"))?
                .unwrap_or(DEFAULT_PRINT_TIMEOUT),
        };

        Ok(Self {
            bind_addr,
            assets_dir: get("ASSETS_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_ASSETS_DIR)),
            table_name: get("CERTIFICATES_TABLE").unwrap_or_else(|| DEFAULT_TABLE.to_string()),
            database_url: get("DATABASE_URL"),
            location,
            dynamodb_endpoint: get("DYNAMODB_ENDPOINT"),
            s3_endpoint: get("S3_ENDPOINT"),
            offline: get("IS_OFFLINE").map(|v| is_truthy(&v)).unwrap_or(false),
            offline_pdf_path: get("OFFLINE_PDF_PATH")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OFFLINE_PDF_PATH)),
            chrome_executable: get("CHROME_EXECUTABLE").map(PathBuf::from),
            limits,
        })
    }

    /// Path for the local PDF copy, when running offline.
    pub fn offline_copy(&self) -> Option<PathBuf> {
        self.offline.then(|| self.offline_pdf_path.clone())
    }
}

fn is_truthy(value: &str) -> bool {
    !matches!(
        value.trim().to_ascii_lowercase().as_str(),
        "" | "0" | "false" | "no" | "off"
    )
}

fn parse_secs(name: &'static str, value: Option<String>) -> Result<Option<Duration>, ConfigError> {
    let Some(value) = value else {
        return Ok(None);
    };

    match value.trim().parse::<u64>() {
        Ok(0) => Err(ConfigError {
            name,
            value,
            reason: "must be greater than zero".to_string(),
        }),
        Ok(secs) => Ok(Some(Duration::from_secs(secs))),
        Err(e) => Err(ConfigError {
            name,
            value,
            reason: e.to_string(),
        }),
    }
}
