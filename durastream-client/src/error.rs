//! Client error types.

use durastream_protocol::CodecError;
use thiserror::Error;

/// Failures reported by a [`Transport`](crate::transport::Transport).
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("no responders available for request")]
    NoResponders,

    #[error("request timeout")]
    Timeout,

    #[error("not connected")]
    NotConnected,

    #[error("connection failed: {0}")]
    Connect(String),

    #[error("transport error: {0}")]
    Other(String),
}

/// Errors returned by the bridge.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// A required identifier or configuration was missing or malformed.
    /// Detected locally; no request was sent.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The durable-stream subsystem is absent or not ready.
    #[error("subsystem unavailable: {message}")]
    Unavailable {
        message: String,
        #[source]
        source: Option<TransportError>,
    },

    /// The subsystem rejected the request.
    #[error("protocol error: {code} - {description}")]
    Protocol { code: u16, description: String },

    /// The request could not be carried out or its reply could not be read.
    #[error("communication failure: {message}")]
    Communication {
        message: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync + 'static>,
    },
}

impl BridgeError {
    pub(crate) fn invalid(message: impl Into<String>) -> Self {
        BridgeError::InvalidArgument(message.into())
    }

    /// Returns whether repeating the call later may succeed.
    ///
    /// The bridge never retries on its own.
    pub fn is_retryable(&self) -> bool {
        match self {
            BridgeError::Unavailable { .. } => true,
            BridgeError::Communication { .. } => true,
            BridgeError::Protocol { code, .. } => *code >= 500,
            BridgeError::InvalidArgument(_) => false,
        }
    }

    /// Returns the broker error code, for protocol errors.
    pub fn code(&self) -> Option<u16> {
        match self {
            BridgeError::Protocol { code, .. } => Some(*code),
            _ => None,
        }
    }
}

impl From<TransportError> for BridgeError {
    fn from(err: TransportError) -> Self {
        match err {
            TransportError::NoResponders => BridgeError::Unavailable {
                message: "durable-stream subsystem is not available".to_string(),
                source: Some(err),
            },
            TransportError::Timeout => BridgeError::Unavailable {
                message: "durable-stream subsystem did not respond".to_string(),
                source: Some(err),
            },
            other => BridgeError::Communication {
                message: "an error occurred communicating with the subsystem".to_string(),
                source: Box::new(other),
            },
        }
    }
}

impl From<CodecError> for BridgeError {
    fn from(err: CodecError) -> Self {
        match err {
            CodecError::Api(api) => BridgeError::Protocol {
                code: api.code,
                description: api.description,
            },
            other => BridgeError::Communication {
                message: "failed to process reply".to_string(),
                source: Box::new(other),
            },
        }
    }
}
