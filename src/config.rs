//! Service configuration
//!
//! Loaded from a single JSON file. Every field except `storage_dir` has a
//! default; the loaded value is validated before anything is opened.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::auth::validate_username;
use crate::http_server::{check_share_path, HttpServerConfig};
use crate::sharing::{LinkCodec, DEFAULT_MAX_UPLOAD_BYTES};

/// Configuration errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {reason}")]
    Read { path: String, reason: String },

    #[error("Failed to write config {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("Invalid config JSON: {0}")]
    Parse(String),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Configuration file structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShareConfig {
    /// Directory holding uploaded blobs (required)
    pub storage_dir: PathBuf,

    /// Append-only audit log (default "./audit.log")
    #[serde(default = "default_audit_log")]
    pub audit_log: PathBuf,

    /// Prefix of generated share links; its path is served by the share route
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Upload ceiling in bytes (default 1GB)
    #[serde(default = "default_max_upload_bytes")]
    pub max_upload_bytes: u64,

    /// Persist registered users here; in-memory only when absent
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub credentials_file: Option<PathBuf>,

    /// Users created at boot if missing (username -> password)
    #[serde(default)]
    pub seed_users: BTreeMap<String, String>,

    #[serde(default)]
    pub http: HttpServerConfig,
}

fn default_audit_log() -> PathBuf {
    PathBuf::from("./audit.log")
}
fn default_base_url() -> String {
    "http://localhost:8501/share".to_string()
}
fn default_max_upload_bytes() -> u64 {
    DEFAULT_MAX_UPLOAD_BYTES
}

impl ShareConfig {
    /// Configuration with defaults for everything but the storage directory
    pub fn new(storage_dir: impl Into<PathBuf>) -> Self {
        Self {
            storage_dir: storage_dir.into(),
            audit_log: default_audit_log(),
            base_url: default_base_url(),
            max_upload_bytes: default_max_upload_bytes(),
            credentials_file: None,
            seed_users: BTreeMap::new(),
            http: HttpServerConfig::default(),
        }
    }

    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path).map_err(|e| ConfigError::Read {
            path: path.display().to_string(),
            reason: e.to_string(),
        })?;

        let config: ShareConfig =
            serde_json::from_str(&content).map_err(|e| ConfigError::Parse(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    /// Write configuration as pretty JSON
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let json = serde_json::to_string_pretty(self).map_err(|e| ConfigError::Parse(e.to_string()))?;
        fs::write(path, json + "\n").map_err(|e| ConfigError::Write {
            path: path.display().to_string(),
            reason: e.to_string(),
        })
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage_dir.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("storage_dir must not be empty".into()));
        }

        if self.max_upload_bytes == 0 {
            return Err(ConfigError::Invalid("max_upload_bytes must be > 0".into()));
        }

        if !(self.base_url.starts_with("http://") || self.base_url.starts_with("https://")) {
            return Err(ConfigError::Invalid(format!(
                "base_url must be an http(s) URL, got '{}'",
                self.base_url
            )));
        }

        check_share_path(LinkCodec::new(self.base_url.as_str()).path())
            .map_err(|e| ConfigError::Invalid(format!("base_url: {}", e)))?;

        self.http.validate().map_err(|e| ConfigError::Invalid(format!("http: {}", e)))?;

        for username in self.seed_users.keys() {
            validate_username(username)
                .map_err(|e| ConfigError::Invalid(format!("seed_users: {}", e)))?;
        }

        Ok(())
    }
}
