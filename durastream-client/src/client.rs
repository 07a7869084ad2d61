//! The bridge client and its availability probe.

use crate::error::BridgeError;
use crate::transport::Transport;
use bytes::Bytes;
use durastream_protocol::subject::is_valid_name;
use durastream_protocol::{AccountInfo, ApiSubject, Decoder, Message};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Duration;

/// Default timeout for API and publish requests.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(5);

/// Bridge configuration, fixed for the lifetime of a [`Client`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BridgeConfig {
    /// Prefix placed in front of every API subject.
    pub prefix: String,
    /// Timeout applied to every request.
    pub request_timeout: Duration,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            prefix: String::new(),
            request_timeout: DEFAULT_REQUEST_TIMEOUT,
        }
    }
}

impl BridgeConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefix = prefix.into();
        self
    }

    pub fn with_request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }
}

/// Management and publish bridge over a request/reply transport.
///
/// A `Client` is only handed out after the subsystem answered the
/// availability probe. It holds no mutable state, so concurrent calls do not
/// interact; each call sends one request and waits for one reply.
pub struct Client<T> {
    transport: Arc<T>,
    config: BridgeConfig,
}

impl<T> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: self.transport.clone(),
            config: self.config.clone(),
        }
    }
}

impl<T: Transport> Client<T> {
    /// Creates a client and probes the subsystem.
    ///
    /// Fails if the probe fails; no client is returned for an unreachable
    /// subsystem.
    pub async fn connect(transport: T, config: BridgeConfig) -> Result<Self, BridgeError> {
        let client = Self {
            transport: Arc::new(transport),
            config,
        };
        client.check_available().await?;
        tracing::debug!("Durable-stream subsystem available");
        Ok(client)
    }

    /// Returns the bridge configuration.
    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    /// Returns the underlying transport.
    pub fn transport(&self) -> Arc<T> {
        self.transport.clone()
    }

    // =========================================================================
    // Helper methods
    // =========================================================================

    /// Sends one message and waits for its reply with the configured timeout.
    pub(crate) async fn send(&self, message: Message) -> Result<Message, BridgeError> {
        tracing::debug!("Request to {}", message.subject);
        let subject = message.subject.clone();

        self.transport
            .request(message, self.config.request_timeout)
            .await
            .map_err(|e| {
                tracing::debug!("Request to {} failed: {}", subject, e);
                BridgeError::from(e)
            })
    }

    /// Sends an API request under the configured prefix.
    pub(crate) async fn api_request(
        &self,
        subject: ApiSubject<'_>,
        body: Option<Bytes>,
    ) -> Result<Message, BridgeError> {
        let subject = subject.render(&self.config.prefix);
        self.send(Message::new(subject, body.unwrap_or_default()))
            .await
    }

    /// Sends an API request and strictly decodes the reply into `R`.
    pub(crate) async fn api_call<R: DeserializeOwned>(
        &self,
        subject: ApiSubject<'_>,
        body: Option<Bytes>,
    ) -> Result<R, BridgeError> {
        let reply = self.api_request(subject, body).await?;
        Ok(Decoder::decode_as(&reply.payload)?)
    }

    // =========================================================================
    // Availability
    // =========================================================================

    /// Checks that the durable-stream subsystem is present and ready.
    pub async fn check_available(&self) -> Result<(), BridgeError> {
        let reply = self.api_request(ApiSubject::AccountInfo, None).await?;
        let response = Decoder::decode(&reply.payload, false)?;

        match response.error {
            Some(err) if err.is_not_ready() => {
                tracing::warn!("Subsystem reported not ready: {}", err.description);
                Err(BridgeError::Unavailable {
                    message: format!("subsystem reported not ready: {}", err.description),
                    source: None,
                })
            }
            Some(err) => Err(BridgeError::Protocol {
                code: err.code,
                description: err.description,
            }),
            None => Ok(()),
        }
    }

    /// Gets the account's resource usage and limits.
    pub async fn account_info(&self) -> Result<AccountInfo, BridgeError> {
        let reply = self.api_request(ApiSubject::AccountInfo, None).await?;
        let response = Decoder::decode(&reply.payload, false)?;

        if let Some(err) = response.error.as_ref().filter(|e| e.is_not_ready()) {
            return Err(BridgeError::Unavailable {
                message: format!("subsystem reported not ready: {}", err.description),
                source: None,
            });
        }

        Ok(response.into_result()?)
    }
}

/// Fails with `InvalidArgument` unless `name` can be used in an API subject.
pub(crate) fn require_name(kind: &str, name: &str) -> Result<(), BridgeError> {
    if name.is_empty() {
        return Err(BridgeError::invalid(format!("{kind} is required")));
    }
    if !is_valid_name(name) {
        return Err(BridgeError::invalid(format!("{kind} '{name}' is not a valid name")));
    }
    Ok(())
}
