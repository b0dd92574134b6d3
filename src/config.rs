//! Configuration for the broker gateway
//!
//! Two layers: [`ConnectionConfig`] describes one broker endpoint (the unit
//! the registry accepts at runtime), and [`GatewayConfig`] is the TOML file
//! loaded at startup with a `[gateway]` section plus one `[connections.<id>]`
//! table per pre-registered connection.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;

/// Default broker management/web-console port
pub const DEFAULT_MANAGEMENT_PORT: u16 = 8161;

/// Configuration for one broker connection
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ConnectionConfig {
    /// Broker hostname or IP address
    pub host: String,
    /// Management port (default: 8161)
    #[serde(default = "default_port")]
    pub port: u16,
    /// Basic-auth username
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Basic-auth password
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
    /// Use HTTPS for broker endpoints
    #[serde(default)]
    pub ssl: bool,
    /// Per-request timeout in milliseconds (default: 30000)
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

fn default_port() -> u16 {
    DEFAULT_MANAGEMENT_PORT
}

fn default_timeout_ms() -> u64 {
    30_000
}

impl ConnectionConfig {
    /// Create a config for a host on the default management port
    pub fn new<S: Into<String>>(host: S) -> Self {
        Self {
            host: host.into(),
            port: DEFAULT_MANAGEMENT_PORT,
            username: None,
            password: None,
            ssl: false,
            timeout_ms: default_timeout_ms(),
        }
    }

    /// Validate the invariants a config must satisfy before use
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.host.trim().is_empty() {
            return Err(ConfigError::InvalidConnection(
                "host must be a non-empty string".to_string(),
            ));
        }
        if self.port == 0 {
            return Err(ConfigError::InvalidConnection(
                "port must be a positive integer".to_string(),
            ));
        }
        Ok(())
    }

    /// Base URL for this broker's HTTP endpoints
    pub fn base_url(&self) -> String {
        let scheme = if self.ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.host, self.port)
    }
}

/// Gateway-level settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GatewaySection {
    /// Interval between health-check sweeps in seconds (default: 30)
    #[serde(default = "default_health_interval")]
    pub health_check_interval_secs: u64,
}

fn default_health_interval() -> u64 {
    30
}

impl Default for GatewaySection {
    fn default() -> Self {
        Self {
            health_check_interval_secs: default_health_interval(),
        }
    }
}

/// Top-level gateway configuration file
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct GatewayConfig {
    #[serde(default)]
    pub gateway: GatewaySection,
    /// Named connections established at startup
    #[serde(default)]
    pub connections: HashMap<String, ConnectionConfig>,
}

/// Configuration loading errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    FileRead(#[from] std::io::Error),
    #[error("Failed to parse TOML: {0}")]
    TomlParse(#[from] toml::de::Error),
    #[error("Invalid connection config: {0}")]
    InvalidConnection(String),
    #[error("Invalid connection id: {0}")]
    InvalidConnectionId(String),
}

impl GatewayConfig {
    /// Load configuration from a TOML file and validate every entry
    pub fn load_from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: GatewayConfig = toml::from_str(&content)?;

        for (id, connection) in &config.connections {
            if id.trim().is_empty() {
                return Err(ConfigError::InvalidConnectionId(
                    "connection id must be non-empty".to_string(),
                ));
            }
            connection
                .validate()
                .map_err(|e| ConfigError::InvalidConnection(format!("'{id}': {e}")))?;
        }

        Ok(config)
    }
}
