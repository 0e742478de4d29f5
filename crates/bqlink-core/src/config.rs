//! Client configuration (bqlink.toml)

use crate::credentials::CredentialSource;
use crate::error::WarehouseError;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// How the client authenticates
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CredentialsConfig {
    /// Application Default Credentials
    #[default]
    ApplicationDefault,

    /// Service-account key or user credential file
    KeyFile { path: PathBuf },

    /// Service-account key or user credential JSON inline in the config
    KeyJson { json: String },
}

/// Main configuration structure
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Billing project queries run under
    pub project_id: String,

    /// Dataset location (e.g. "US", "EU"); the service infers it when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,

    /// Rows requested per result page
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub page_size: Option<u32>,

    /// How long each query/results call waits server-side for the job
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub job_timeout_ms: Option<u32>,

    /// Request the read-only BigQuery scope for service-account and user credentials
    #[serde(default)]
    pub readonly: bool,

    /// Credentials (a TOML table, so it is kept after the plain values)
    #[serde(default)]
    pub credentials: CredentialsConfig,

    /// Directory relative key file paths resolve against
    #[serde(skip)]
    pub base_dir: PathBuf,
}

impl ClientConfig {
    /// Config for a project using Application Default Credentials
    pub fn new(project_id: impl Into<String>) -> Self {
        Self {
            project_id: project_id.into(),
            credentials: CredentialsConfig::default(),
            location: None,
            page_size: None,
            job_timeout_ms: None,
            readonly: false,
            base_dir: PathBuf::new(),
        }
    }

    /// Builder: set credentials
    pub fn with_credentials(mut self, credentials: CredentialsConfig) -> Self {
        self.credentials = credentials;
        self
    }

    /// Builder: set location
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// Builder: set page size
    pub fn with_page_size(mut self, page_size: u32) -> Self {
        self.page_size = Some(page_size);
        self
    }

    /// Load config from TOML file
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::IoError(format!("{}: {}", path.display(), e)))?;

        let mut config = Self::from_toml(&contents)?;

        // Key files are relative to the config file
        if let Some(parent) = path.parent() {
            config.base_dir = parent.to_path_buf();
        }

        Ok(config)
    }

    /// Load config from TOML string
    pub fn from_toml(toml: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(toml).map_err(|e| ConfigError::ParseError(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to TOML
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::SerializeError(e.to_string()))
    }

    /// Check invariants that serde cannot express
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.project_id.trim().is_empty() {
            return Err(ConfigError::Invalid("project_id must not be empty".to_string()));
        }
        if self.page_size == Some(0) {
            return Err(ConfigError::Invalid("page_size must be greater than zero".to_string()));
        }
        Ok(())
    }

    /// Credential source with key file paths resolved against `base_dir`
    pub fn credential_source(&self) -> CredentialSource {
        match &self.credentials {
            CredentialsConfig::ApplicationDefault => CredentialSource::ApplicationDefault,
            CredentialsConfig::KeyFile { path } if path.is_relative() => {
                CredentialSource::File(self.base_dir.join(path))
            }
            CredentialsConfig::KeyFile { path } => CredentialSource::File(path.clone()),
            CredentialsConfig::KeyJson { json } => CredentialSource::Json(json.clone().into_bytes()),
        }
    }
}

/// Config error types
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    IoError(String),

    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Serialize error: {0}")]
    SerializeError(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

impl From<ConfigError> for WarehouseError {
    fn from(err: ConfigError) -> Self {
        match err {
            ConfigError::IoError(msg) => Self::Io(msg),
            other => Self::Config(other.to_string()),
        }
    }
}
