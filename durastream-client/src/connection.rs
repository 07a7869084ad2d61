//! NATS-backed transport.

use crate::error::TransportError;
use crate::transport::Transport;
use async_nats::{ConnectOptions, HeaderMap, RequestError, RequestErrorKind};
use async_trait::async_trait;
use durastream_protocol::{Headers, Message};
use std::path::PathBuf;
use std::time::Duration;

pub use crate::config::DEFAULT_SERVER_URL as DEFAULT_URL;

/// TLS configuration for client connections.
#[derive(Debug, Clone, Default)]
pub struct TlsClientConfig {
    /// Require TLS for the connection.
    pub enabled: bool,
    /// Path to PEM-encoded CA certificate(s) for server verification.
    /// If None, system roots are used.
    pub ca_cert_path: Option<PathBuf>,
    /// Path to PEM-encoded client certificate (for mTLS).
    pub client_cert_path: Option<PathBuf>,
    /// Path to PEM-encoded client private key (for mTLS).
    pub client_key_path: Option<PathBuf>,
}

impl TlsClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert_path = Some(path.into());
        self.enabled = true;
        self
    }

    pub fn with_client_cert(
        mut self,
        cert_path: impl Into<PathBuf>,
        key_path: impl Into<PathBuf>,
    ) -> Self {
        self.client_cert_path = Some(cert_path.into());
        self.client_key_path = Some(key_path.into());
        self.enabled = true;
        self
    }
}

/// Connection configuration.
#[derive(Debug, Clone)]
pub struct ConnectionConfig {
    /// Server URL.
    pub url: String,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Client name announced to the server.
    pub client_name: Option<String>,
    /// Authentication token (optional).
    pub auth_token: Option<String>,
    /// TLS configuration (optional).
    pub tls: Option<TlsClientConfig>,
}

impl ConnectionConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            connect_timeout: Duration::from_secs(10),
            client_name: None,
            auth_token: None,
            tls: None,
        }
    }

    pub fn with_client_name(mut self, name: impl Into<String>) -> Self {
        self.client_name = Some(name.into());
        self
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_auth_token(mut self, token: impl Into<String>) -> Self {
        self.auth_token = Some(token.into());
        self
    }

    pub fn with_tls(mut self, tls_config: TlsClientConfig) -> Self {
        self.tls = Some(tls_config);
        self
    }

    fn connect_options(&self) -> ConnectOptions {
        let mut options = ConnectOptions::new().connection_timeout(self.connect_timeout);

        if let Some(ref name) = self.client_name {
            options = options.name(name);
        }
        if let Some(ref token) = self.auth_token {
            options = options.token(token.clone());
        }
        if let Some(ref tls) = self.tls {
            if tls.enabled {
                options = options.require_tls(true);
                if let Some(ref ca) = tls.ca_cert_path {
                    options = options.add_root_certificates(ca.clone());
                }
                if let (Some(cert), Some(key)) = (&tls.client_cert_path, &tls.client_key_path) {
                    options = options.add_client_certificate(cert.clone(), key.clone());
                }
            }
        }

        options
    }
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self::new(DEFAULT_URL)
    }
}

/// A connection to a NATS server.
pub struct Connection {
    config: ConnectionConfig,
    client: async_nats::Client,
}

impl Connection {
    /// Connects to the server.
    pub async fn connect(config: ConnectionConfig) -> Result<Self, TransportError> {
        tracing::debug!("Connecting to {}...", config.url);

        let client = config
            .connect_options()
            .connect(config.url.as_str())
            .await
            .map_err(|e| {
                tracing::debug!("Connection failed: {}", e);
                TransportError::Connect(e.to_string())
            })?;

        tracing::debug!("Connected to {}", config.url);
        Ok(Self { config, client })
    }

    /// Returns the configuration this connection was opened with.
    pub fn config(&self) -> &ConnectionConfig {
        &self.config
    }

    /// Returns whether the connection is established.
    pub fn is_connected(&self) -> bool {
        self.client.connection_state() == async_nats::connection::State::Connected
    }

    /// Flushes buffered outbound messages.
    pub async fn flush(&self) -> Result<(), TransportError> {
        self.client
            .flush()
            .await
            .map_err(|e| TransportError::Other(e.to_string()))
    }
}

fn to_header_map(headers: &Headers) -> HeaderMap {
    let mut map = HeaderMap::new();
    for (name, value) in headers.iter() {
        map.insert(name, value);
    }
    map
}

/// Maps a NATS request failure onto the transport taxonomy.
fn request_error(err: RequestError) -> TransportError {
    match err.kind() {
        RequestErrorKind::NoResponders => TransportError::NoResponders,
        RequestErrorKind::TimedOut => TransportError::Timeout,
        _ => TransportError::Other(err.to_string()),
    }
}

#[async_trait]
impl Transport for Connection {
    async fn request(&self, message: Message, timeout: Duration) -> Result<Message, TransportError> {
        tracing::debug!(
            "Sending request to {} ({} bytes)",
            message.subject,
            message.payload.len()
        );

        let mut request = async_nats::Request::new()
            .payload(message.payload)
            .timeout(Some(timeout));
        if let Some(ref headers) = message.headers {
            request = request.headers(to_header_map(headers));
        }

        let reply = self
            .client
            .send_request(message.subject.clone(), request)
            .await
            .map_err(|e| {
                tracing::debug!("Request to {} failed: {}", message.subject, e);
                request_error(e)
            })?;

        tracing::debug!(
            "Reply on {} ({} bytes)",
            reply.subject,
            reply.payload.len()
        );
        Ok(Message::new(reply.subject.to_string(), reply.payload))
    }
}
