//! Codec errors and broker error objects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error code the subsystem uses to report that it is not ready.
pub const NOT_READY: u16 = 503;

/// Errors raised while encoding request bodies or decoding replies.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("empty reply payload")]
    EmptyPayload,

    #[error("reply is not a JSON object")]
    NotAnObject,

    #[error("API error: {0}")]
    Api(ApiError),
}

/// Error object carried by a reply envelope.
///
/// The code and description are reported verbatim; the broker owns both.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{code} - {description}")]
pub struct ApiError {
    /// HTTP-like status code.
    pub code: u16,

    /// Human-readable description.
    #[serde(default)]
    pub description: String,

    /// Finer-grained broker error code, when the server sends one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub err_code: Option<u16>,
}

impl ApiError {
    pub fn new(code: u16, description: impl Into<String>) -> Self {
        Self {
            code,
            description: description.into(),
            err_code: None,
        }
    }

    /// Returns whether this error means the subsystem is not ready.
    pub fn is_not_ready(&self) -> bool {
        self.code == NOT_READY
    }
}
