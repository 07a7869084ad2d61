//! Client configuration.
//!
//! Configuration is loaded in the following order (later overrides earlier):
//! 1. Default values
//! 2. YAML config file (if specified via DURASTREAM_CONFIG or --config)
//! 3. Environment variables

use crate::client::{BridgeConfig, DEFAULT_REQUEST_TIMEOUT};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// Default server URL.
pub const DEFAULT_SERVER_URL: &str = "nats://127.0.0.1:4222";

/// Client configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Server connection.
    pub connection: ConnectionSettings,
    /// API subjects and request timing.
    pub api: ApiSettings,
    /// TLS.
    pub tls: TlsSettings,
}

impl Config {
    /// Loads configuration from file, then applies environment variable overrides.
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_with(|key| std::env::var(key).ok())
    }

    fn load_with(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = match lookup("DURASTREAM_CONFIG") {
            Some(path) => Self::from_file(&path)?,
            None => Self::default(),
        };

        config.apply_overrides(&lookup);
        Ok(config)
    }

    /// Loads configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
        serde_yaml::from_str(&content)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))
    }

    /// Applies environment variable overrides to the configuration.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides(|key| std::env::var(key).ok());
    }

    fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        self.connection.apply_overrides(&lookup);
        self.api.apply_overrides(&lookup);
        self.tls.apply_overrides(&lookup);
    }

    /// Checks the configuration for values that cannot work.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connection.url.trim().is_empty() {
            return Err(ConfigError::Validation("server url is empty".to_string()));
        }
        if self.api.request_timeout_ms == 0 {
            return Err(ConfigError::Validation(
                "request timeout must be greater than zero".to_string(),
            ));
        }
        if self.api.prefix.chars().any(char::is_whitespace) {
            return Err(ConfigError::Validation(
                "api prefix must not contain whitespace".to_string(),
            ));
        }
        self.tls.validate()
    }

    /// Returns the bridge settings.
    pub fn bridge_config(&self) -> BridgeConfig {
        BridgeConfig::new()
            .with_prefix(self.api.prefix.clone())
            .with_request_timeout(self.api.request_timeout())
    }

    /// Returns the settings for opening a NATS connection.
    #[cfg(feature = "nats")]
    pub fn connection_config(&self) -> crate::connection::ConnectionConfig {
        use crate::connection::{ConnectionConfig, TlsClientConfig};

        let mut config = ConnectionConfig::new(self.connection.url.clone())
            .with_connect_timeout(self.connection.connect_timeout());
        if let Some(ref name) = self.connection.client_name {
            config = config.with_client_name(name.clone());
        }
        if let Some(ref token) = self.connection.token {
            config = config.with_auth_token(token.clone());
        }
        if self.tls.enabled {
            config = config.with_tls(TlsClientConfig {
                enabled: true,
                ca_cert_path: self.tls.ca_path.clone(),
                client_cert_path: self.tls.cert_path.clone(),
                client_key_path: self.tls.key_path.clone(),
            });
        }
        config
    }

    /// Saves configuration to a YAML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();
        let content = serde_yaml::to_string(self)
            .map_err(|e| ConfigError::Parse(path.to_path_buf(), e.to_string()))?;
        std::fs::write(path, content).map_err(|e| ConfigError::Io(path.to_path_buf(), e))
    }
}

/// Server connection settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// Server URL.
    pub url: String,
    /// Connect timeout in seconds.
    pub connect_timeout_secs: u64,
    /// Name announced to the server.
    pub client_name: Option<String>,
    /// Authentication token.
    pub token: Option<String>,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            url: DEFAULT_SERVER_URL.to_string(),
            connect_timeout_secs: 10,
            client_name: None,
            token: None,
        }
    }
}

impl ConnectionSettings {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup("DURASTREAM_URL") {
            self.url = url;
        }
        if let Some(secs) = lookup("DURASTREAM_CONNECT_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.connect_timeout_secs = secs;
        }
        if let Some(name) = lookup("DURASTREAM_CLIENT_NAME") {
            self.client_name = Some(name);
        }
        if let Some(token) = lookup("DURASTREAM_TOKEN") {
            self.token = Some(token);
        }
    }

    /// Returns the connect timeout as Duration.
    pub fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.connect_timeout_secs)
    }
}

/// API settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiSettings {
    /// Prefix placed in front of every API subject.
    pub prefix: String,
    /// Request timeout in milliseconds.
    pub request_timeout_ms: u64,
}

impl Default for ApiSettings {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            request_timeout_ms: DEFAULT_REQUEST_TIMEOUT.as_millis() as u64,
        }
    }
}

impl ApiSettings {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(prefix) = lookup("DURASTREAM_API_PREFIX") {
            self.prefix = prefix;
        }
        if let Some(ms) = lookup("DURASTREAM_REQUEST_TIMEOUT_MS").and_then(|v| v.parse().ok()) {
            self.request_timeout_ms = ms;
        }
    }

    /// Returns the request timeout as Duration.
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }
}

/// TLS settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TlsSettings {
    /// Require TLS.
    pub enabled: bool,
    /// Path to PEM-encoded CA certificate(s). System roots are used when unset.
    pub ca_path: Option<PathBuf>,
    /// Path to PEM-encoded client certificate (mTLS).
    pub cert_path: Option<PathBuf>,
    /// Path to PEM-encoded client private key (mTLS).
    pub key_path: Option<PathBuf>,
}

impl TlsSettings {
    fn apply_overrides(&mut self, lookup: &impl Fn(&str) -> Option<String>) {
        if let Some(enabled) = lookup("DURASTREAM_TLS_ENABLED") {
            self.enabled = enabled == "1" || enabled.to_lowercase() == "true";
        }
        if let Some(path) = lookup("DURASTREAM_TLS_CA") {
            self.ca_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("DURASTREAM_TLS_CERT") {
            self.cert_path = Some(PathBuf::from(path));
        }
        if let Some(path) = lookup("DURASTREAM_TLS_KEY") {
            self.key_path = Some(PathBuf::from(path));
        }
    }

    /// Validates TLS configuration.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.enabled {
            return Ok(());
        }
        if self.cert_path.is_some() != self.key_path.is_some() {
            return Err(ConfigError::Validation(
                "client certificate and key must be set together".to_string(),
            ));
        }
        Ok(())
    }
}

/// Configuration error.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file '{}': {1}", .0.display())]
    Io(PathBuf, #[source] std::io::Error),

    #[error("failed to parse config file '{}': {1}", .0.display())]
    Parse(PathBuf, String),

    #[error("configuration validation failed: {0}")]
    Validation(String),
}
