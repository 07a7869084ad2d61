//! Encoder for request bodies and decoder for reply envelopes.

use crate::error::{ApiError, CodecError};
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

/// Encodes configuration objects into request bodies.
pub struct Encoder;

impl Encoder {
    /// Encodes any JSON-serializable value.
    ///
    /// Output is deterministic for a given value: struct fields are written in
    /// declaration order.
    pub fn encode_json<T: Serialize>(value: &T) -> Result<Bytes, CodecError> {
        Ok(Bytes::from(serde_json::to_vec(value)?))
    }
}

/// A decoded reply envelope.
///
/// `error` is set when the reply carries an error object; otherwise `body`
/// holds the success payload.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub error: Option<ApiError>,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Returns the error code, if the reply carries one.
    pub fn error_code(&self) -> Option<u16> {
        self.error.as_ref().map(|e| e.code)
    }

    /// Interprets the success payload as `T`, or fails with the carried error.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, CodecError> {
        if let Some(err) = self.error {
            return Err(CodecError::Api(err));
        }
        Ok(serde_json::from_value(self.body)?)
    }
}

/// Decodes reply envelopes.
pub struct Decoder;

impl Decoder {
    /// Parses a reply payload into an envelope.
    ///
    /// When `strict` is set, a reply carrying an error object fails with
    /// [`CodecError::Api`] before any of the success payload is looked at.
    /// Otherwise the envelope is returned for the caller to inspect.
    pub fn decode(payload: &[u8], strict: bool) -> Result<ApiResponse, CodecError> {
        if payload.is_empty() {
            return Err(CodecError::EmptyPayload);
        }

        let mut body: Value = serde_json::from_slice(payload)?;
        let object = body.as_object_mut().ok_or(CodecError::NotAnObject)?;

        let error = match object.remove("error") {
            Some(Value::Null) | None => None,
            Some(err) => Some(serde_json::from_value::<ApiError>(err)?),
        };

        if strict {
            if let Some(err) = error {
                return Err(CodecError::Api(err));
            }
        }

        Ok(ApiResponse { error, body })
    }

    /// Strictly decodes a reply and interprets the success payload as `T`.
    pub fn decode_as<T: DeserializeOwned>(payload: &[u8]) -> Result<T, CodecError> {
        Self::decode(payload, true)?.into_result()
    }
}
