//! Request/reply transport boundary.

use crate::error::TransportError;
use async_trait::async_trait;
use durastream_protocol::Message;
use std::sync::Arc;
use std::time::Duration;

/// A publish/subscribe transport that can send a message and await one reply.
///
/// Implementations must report "nothing is listening on this subject" as
/// [`TransportError::NoResponders`] and an expired wait as
/// [`TransportError::Timeout`]; the bridge relies on both to tell an absent
/// subsystem from other failures.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Sends `message` and waits up to `timeout` for its reply.
    async fn request(&self, message: Message, timeout: Duration) -> Result<Message, TransportError>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn request(&self, message: Message, timeout: Duration) -> Result<Message, TransportError> {
        (**self).request(message, timeout).await
    }
}
