//! HTTP surface settings
//!
//! Where the API listens, which browser origins may call it, and how long
//! a bearer-token session stays valid.

use std::net::SocketAddr;

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::auth::DEFAULT_SESSION_TTL_SECS;

/// Longest accepted session lifetime: one year
pub const MAX_SESSION_TTL_SECS: u64 = 365 * 24 * 60 * 60;

/// Settings for the HTTP API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpServerConfig {
    /// Listen address (default "127.0.0.1")
    #[serde(default = "default_host")]
    pub host: String,

    /// Listen port (default 8501)
    #[serde(default = "default_port")]
    pub port: u16,

    /// Origins allowed by CORS; empty allows any origin
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Lifetime of a login session in seconds (default one day)
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    8501
}
fn default_cors_origins() -> Vec<String> {
    vec![
        "http://localhost:8501".to_string(),
        "http://127.0.0.1:8501".to_string(),
    ]
}
fn default_session_ttl_secs() -> u64 {
    DEFAULT_SESSION_TTL_SECS
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            cors_origins: default_cors_origins(),
            session_ttl_secs: default_session_ttl_secs(),
        }
    }
}

impl HttpServerConfig {
    /// Defaults, listening on `port`
    pub fn with_port(port: u16) -> Self {
        Self {
            port,
            ..Default::default()
        }
    }

    /// `host:port` as configured
    pub fn socket_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Parsed listen address
    pub fn bind_addr(&self) -> Result<SocketAddr, String> {
        self.socket_addr()
            .parse()
            .map_err(|e| format!("invalid listen address '{}': {}", self.socket_addr(), e))
    }

    /// Session lifetime as a duration
    pub fn session_ttl(&self) -> Duration {
        let secs = self.session_ttl_secs.min(MAX_SESSION_TTL_SECS);
        Duration::seconds(secs as i64)
    }

    /// Reject settings the server could not start with
    pub fn validate(&self) -> Result<(), String> {
        self.bind_addr()?;

        if self.session_ttl_secs == 0 || self.session_ttl_secs > MAX_SESSION_TTL_SECS {
            return Err(format!(
                "session_ttl_secs must be between 1 and {}",
                MAX_SESSION_TTL_SECS
            ));
        }

        if let Some(origin) = self
            .cors_origins
            .iter()
            .find(|o| !(o.starts_with("http://") || o.starts_with("https://")))
        {
            return Err(format!("cors origin '{}' is not an http(s) origin", origin));
        }

        Ok(())
    }
}
