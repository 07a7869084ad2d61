//! Publish preconditions, their header encoding, and the publish acknowledgment.

use crate::message::Headers;
use serde::{Deserialize, Serialize};

/// Header carrying the expected id of the last message in the stream.
pub const EXPECTED_LAST_MSG_ID_HEADER: &str = "Nats-Expected-Last-Msg-Id";

/// Header carrying the expected sequence of the last message in the stream.
pub const EXPECTED_LAST_SEQ_HEADER: &str = "Nats-Expected-Last-Sequence";

/// Header carrying the name of the stream the subject must map to.
pub const EXPECTED_STREAM_HEADER: &str = "Nats-Expected-Stream";

/// Header carrying the deduplication id of the message.
pub const MSG_ID_HEADER: &str = "Nats-Msg-Id";

/// Optimistic-concurrency preconditions for a publish.
///
/// Every field is optional and independent. Empty strings count as unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublishOptions {
    /// Id of the message the stream must currently end with.
    pub expected_last_msg_id: Option<String>,
    /// Sequence the stream must currently end at.
    pub expected_last_seq: Option<u64>,
    /// Stream the subject must be bound to.
    pub expected_stream: Option<String>,
    /// Deduplication id for this message.
    pub msg_id: Option<String>,
}

impl PublishOptions {
    /// Options with no precondition set.
    pub const DEFAULT: PublishOptions = PublishOptions {
        expected_last_msg_id: None,
        expected_last_seq: None,
        expected_stream: None,
        msg_id: None,
    };

    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_expected_last_msg_id(mut self, id: impl Into<String>) -> Self {
        self.expected_last_msg_id = Some(id.into());
        self
    }

    pub fn with_expected_last_seq(mut self, seq: u64) -> Self {
        self.expected_last_seq = Some(seq);
        self
    }

    pub fn with_expected_stream(mut self, stream: impl Into<String>) -> Self {
        self.expected_stream = Some(stream.into());
        self
    }

    pub fn with_msg_id(mut self, id: impl Into<String>) -> Self {
        self.msg_id = Some(id.into());
        self
    }

    /// Returns whether no precondition is set.
    pub fn is_empty(&self) -> bool {
        non_empty(&self.expected_last_msg_id).is_none()
            && self.expected_last_seq.is_none()
            && non_empty(&self.expected_stream).is_none()
            && non_empty(&self.msg_id).is_none()
    }
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().filter(|v| !v.is_empty())
}

/// Merges publish preconditions into message headers.
///
/// Returns `headers` untouched when `options` is `None` or carries no
/// precondition. A new header map is only created when a precondition must be
/// written and `headers` is `None`. Entries unrelated to preconditions are
/// never removed or rewritten.
pub fn merge_headers(headers: Option<Headers>, options: Option<&PublishOptions>) -> Option<Headers> {
    let Some(options) = options else {
        return headers;
    };

    let mut headers = headers;

    if let Some(id) = non_empty(&options.expected_last_msg_id) {
        headers
            .get_or_insert_with(Headers::new)
            .set(EXPECTED_LAST_MSG_ID_HEADER, id);
    }
    if let Some(seq) = options.expected_last_seq {
        headers
            .get_or_insert_with(Headers::new)
            .set(EXPECTED_LAST_SEQ_HEADER, seq.to_string());
    }
    if let Some(stream) = non_empty(&options.expected_stream) {
        headers
            .get_or_insert_with(Headers::new)
            .set(EXPECTED_STREAM_HEADER, stream);
    }
    if let Some(id) = non_empty(&options.msg_id) {
        headers.get_or_insert_with(Headers::new).set(MSG_ID_HEADER, id);
    }

    headers
}

/// Acknowledgment returned for a stored message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishAck {
    /// Stream that stored the message.
    pub stream: String,
    /// Sequence assigned to the message.
    pub seq: u64,
    /// Set when the deduplication id matched an earlier publish.
    #[serde(default)]
    pub duplicate: bool,
    /// Domain of the stream, if the server runs in one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub domain: Option<String>,
}
