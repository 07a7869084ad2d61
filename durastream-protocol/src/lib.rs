//! # durastream-protocol
//!
//! Wire-level types for the durable-stream management API.
//!
//! This crate provides:
//! - API subject templates and the durable/ephemeral consumer route
//! - Message headers and the publish precondition merge
//! - Reply envelope decoding and request body encoding
//! - Stream, consumer, and account payload types

pub mod api;
pub mod codec;
pub mod error;
pub mod message;
pub mod publish;
pub mod subject;

pub use api::{
    AccountInfo, AccountLimits, ConsumerConfig, ConsumerCreateRequest, ConsumerInfo,
    PurgeResponse, StreamConfig, StreamInfo, StreamState, SuccessResponse,
};
pub use codec::{ApiResponse, Decoder, Encoder};
pub use error::{ApiError, CodecError, NOT_READY};
pub use message::{Headers, Message};
pub use publish::{merge_headers, PublishAck, PublishOptions};
pub use subject::{ApiSubject, ConsumerRoute};
