//! In-memory transport double for tests.

use crate::client::{BridgeConfig, Client};
use crate::error::TransportError;
use crate::transport::Transport;
use async_trait::async_trait;
use durastream_protocol::Message;
use parking_lot::Mutex;
use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

/// A request seen by the mock.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub message: Message,
    pub timeout: Duration,
}

impl RecordedRequest {
    pub fn body_json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.message.payload).unwrap()
    }
}

/// Replays queued replies in order and records every request.
#[derive(Default)]
pub struct MockTransport {
    replies: Mutex<VecDeque<Result<Message, TransportError>>>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queues a reply with a JSON body.
    pub fn reply_json(&self, body: serde_json::Value) {
        self.reply_raw(body.to_string());
    }

    /// Queues a reply with a raw body.
    pub fn reply_raw(&self, body: impl Into<bytes::Bytes>) {
        self.replies
            .lock()
            .push_back(Ok(Message::new("_INBOX.reply", body)));
    }

    /// Queues a transport failure.
    pub fn fail(&self, err: TransportError) {
        self.replies.lock().push_back(Err(err));
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().len()
    }

    pub fn last_request(&self) -> Option<RecordedRequest> {
        self.requests.lock().last().cloned()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, message: Message, timeout: Duration) -> Result<Message, TransportError> {
        self.requests
            .lock()
            .push(RecordedRequest { message, timeout });
        self.replies
            .lock()
            .pop_front()
            .unwrap_or(Err(TransportError::NoResponders))
    }
}

/// Returns a client whose availability probe has already succeeded.
pub async fn connected(mock: &Arc<MockTransport>) -> Client<Arc<MockTransport>> {
    mock.reply_json(serde_json::json!({"streams": 0, "consumers": 0}));
    Client::connect(mock.clone(), BridgeConfig::default())
        .await
        .unwrap()
}
