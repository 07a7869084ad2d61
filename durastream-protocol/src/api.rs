//! JSON payloads of the stream and consumer management API.
//!
//! Field names follow the server's JSON API. Durations travel as integer
//! nanoseconds and timestamps as RFC 3339 strings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::time::Duration;

fn unlimited() -> i64 {
    -1
}

fn unlimited_i32() -> i32 {
    -1
}

fn one() -> usize {
    1
}

fn is_zero(value: &u64) -> bool {
    *value == 0
}

// ============================================================================
// Streams
// ============================================================================

/// How long messages are retained by a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RetentionPolicy {
    /// Keep messages until a limit is reached.
    #[default]
    Limits,
    /// Keep messages while consumers are interested in them.
    Interest,
    /// Remove each message once it has been acknowledged.
    WorkQueue,
}

/// Backing storage of a stream.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageType {
    #[default]
    File,
    Memory,
}

/// What a stream discards once a limit is reached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscardPolicy {
    /// Drop the oldest messages.
    #[default]
    Old,
    /// Reject new messages.
    New,
}

/// Configuration of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamConfig {
    /// Stream name, also part of the API subject.
    #[serde(default)]
    pub name: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Subjects captured by the stream.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub subjects: Vec<String>,

    #[serde(default)]
    pub retention: RetentionPolicy,

    /// Maximum number of consumers (-1 = unlimited).
    #[serde(default = "unlimited")]
    pub max_consumers: i64,

    /// Maximum number of messages (-1 = unlimited).
    #[serde(default = "unlimited")]
    pub max_msgs: i64,

    /// Maximum total size in bytes (-1 = unlimited).
    #[serde(default = "unlimited")]
    pub max_bytes: i64,

    /// Maximum message age (zero = unlimited).
    #[serde(default, with = "nanos")]
    pub max_age: Duration,

    /// Maximum size of a single message (-1 = unlimited).
    #[serde(default = "unlimited_i32")]
    pub max_msg_size: i32,

    #[serde(default)]
    pub storage: StorageType,

    #[serde(default = "one")]
    pub num_replicas: usize,

    /// Disable publish acknowledgments.
    #[serde(default)]
    pub no_ack: bool,

    #[serde(default)]
    pub discard: DiscardPolicy,

    /// Window in which deduplication ids are tracked (zero = server default).
    #[serde(default, with = "nanos")]
    pub duplicate_window: Duration,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: None,
            subjects: Vec::new(),
            retention: RetentionPolicy::Limits,
            max_consumers: -1,
            max_msgs: -1,
            max_bytes: -1,
            max_age: Duration::ZERO,
            max_msg_size: -1,
            storage: StorageType::File,
            num_replicas: 1,
            no_ack: false,
            discard: DiscardPolicy::Old,
            duplicate_window: Duration::ZERO,
        }
    }
}

impl StreamConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_subjects<I, S>(mut self, subjects: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subjects = subjects.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_storage(mut self, storage: StorageType) -> Self {
        self.storage = storage;
        self
    }

    pub fn with_retention(mut self, retention: RetentionPolicy) -> Self {
        self.retention = retention;
        self
    }

    pub fn with_max_age(mut self, max_age: Duration) -> Self {
        self.max_age = max_age;
        self
    }

    pub fn with_duplicate_window(mut self, window: Duration) -> Self {
        self.duplicate_window = window;
        self
    }
}

/// Message counters of a stream.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamState {
    #[serde(default)]
    pub messages: u64,
    #[serde(default)]
    pub bytes: u64,
    #[serde(default)]
    pub first_seq: u64,
    #[serde(rename = "first_ts")]
    pub first_time: DateTime<Utc>,
    #[serde(default)]
    pub last_seq: u64,
    #[serde(rename = "last_ts")]
    pub last_time: DateTime<Utc>,
    #[serde(default)]
    pub consumer_count: usize,
}

/// Stream configuration and state as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreamInfo {
    pub config: StreamConfig,
    pub created: DateTime<Utc>,
    pub state: StreamState,
}

/// Result of purging a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PurgeResponse {
    pub success: bool,
    /// Number of messages removed.
    #[serde(default)]
    pub purged: u64,
}

/// Result of a delete request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessResponse {
    #[serde(default)]
    pub success: bool,
}

// ============================================================================
// Consumers
// ============================================================================

/// Where in the stream a consumer starts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliverPolicy {
    #[default]
    All,
    Last,
    New,
    ByStartSequence,
    ByStartTime,
}

/// How deliveries must be acknowledged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AckPolicy {
    None,
    All,
    #[default]
    Explicit,
}

/// Pace at which stored messages are replayed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReplayPolicy {
    #[default]
    Instant,
    Original,
}

/// Configuration of a consumer.
///
/// A consumer with a `durable_name` survives client restarts and is created
/// through the durable route; without one it is ephemeral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub durable_name: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Subject deliveries are pushed to (push consumers only).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deliver_subject: Option<String>,

    #[serde(default)]
    pub deliver_policy: DeliverPolicy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_start_seq: Option<u64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opt_start_time: Option<DateTime<Utc>>,

    #[serde(default)]
    pub ack_policy: AckPolicy,

    /// Time to wait for an acknowledgment before redelivering.
    #[serde(default, with = "nanos")]
    pub ack_wait: Duration,

    /// Maximum delivery attempts (-1 = unlimited).
    #[serde(default = "unlimited")]
    pub max_deliver: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filter_subject: Option<String>,

    #[serde(default)]
    pub replay_policy: ReplayPolicy,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sample_freq: Option<String>,

    /// Delivery rate limit in bits per second (zero = unlimited).
    #[serde(default, skip_serializing_if = "is_zero")]
    pub rate_limit_bps: u64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ack_pending: Option<i64>,
}

impl Default for ConsumerConfig {
    fn default() -> Self {
        Self {
            durable_name: None,
            description: None,
            deliver_subject: None,
            deliver_policy: DeliverPolicy::All,
            opt_start_seq: None,
            opt_start_time: None,
            ack_policy: AckPolicy::Explicit,
            ack_wait: Duration::ZERO,
            max_deliver: -1,
            filter_subject: None,
            replay_policy: ReplayPolicy::Instant,
            sample_freq: None,
            rate_limit_bps: 0,
            max_ack_pending: None,
        }
    }
}

impl ConsumerConfig {
    /// Creates a config for a durable consumer.
    pub fn durable(name: impl Into<String>) -> Self {
        Self {
            durable_name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Creates a config for an ephemeral consumer.
    pub fn ephemeral() -> Self {
        Self::default()
    }

    pub fn with_deliver_subject(mut self, subject: impl Into<String>) -> Self {
        self.deliver_subject = Some(subject.into());
        self
    }

    pub fn with_filter_subject(mut self, subject: impl Into<String>) -> Self {
        self.filter_subject = Some(subject.into());
        self
    }

    pub fn with_deliver_policy(mut self, policy: DeliverPolicy) -> Self {
        self.deliver_policy = policy;
        self
    }

    pub fn with_ack_policy(mut self, policy: AckPolicy) -> Self {
        self.ack_policy = policy;
        self
    }

    pub fn with_ack_wait(mut self, wait: Duration) -> Self {
        self.ack_wait = wait;
        self
    }

    /// Returns the durable name, if any.
    pub fn durable_name(&self) -> Option<&str> {
        self.durable_name.as_deref()
    }
}

/// Body of a consumer creation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerCreateRequest {
    pub stream_name: String,
    pub config: ConsumerConfig,
}

impl ConsumerCreateRequest {
    pub fn new(stream_name: impl Into<String>, config: ConsumerConfig) -> Self {
        Self {
            stream_name: stream_name.into(),
            config,
        }
    }
}

/// Consumer and stream sequence pair.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SequencePair {
    #[serde(default)]
    pub consumer_seq: u64,
    #[serde(default)]
    pub stream_seq: u64,
}

/// Consumer configuration and delivery state as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConsumerInfo {
    pub stream_name: String,
    pub name: String,
    pub created: DateTime<Utc>,
    pub config: ConsumerConfig,
    #[serde(default)]
    pub delivered: SequencePair,
    #[serde(default)]
    pub ack_floor: SequencePair,
    #[serde(default)]
    pub num_ack_pending: usize,
    #[serde(default)]
    pub num_redelivered: usize,
    #[serde(default)]
    pub num_waiting: usize,
    #[serde(default)]
    pub num_pending: u64,
}

// ============================================================================
// Account
// ============================================================================

/// Resource limits of an account (-1 = unlimited).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLimits {
    #[serde(default = "unlimited")]
    pub max_memory: i64,
    #[serde(default = "unlimited")]
    pub max_storage: i64,
    #[serde(default = "unlimited")]
    pub max_streams: i64,
    #[serde(default = "unlimited")]
    pub max_consumers: i64,
}

impl Default for AccountLimits {
    fn default() -> Self {
        Self {
            max_memory: -1,
            max_storage: -1,
            max_streams: -1,
            max_consumers: -1,
        }
    }
}

/// Resource usage of an account.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountInfo {
    #[serde(default)]
    pub memory: u64,
    #[serde(default)]
    pub storage: u64,
    #[serde(default)]
    pub streams: usize,
    #[serde(default)]
    pub consumers: usize,
    #[serde(default)]
    pub limits: AccountLimits,
}

/// Serde module for durations encoded as integer nanoseconds.
mod nanos {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let nanos = u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX);
        serializer.serialize_u64(nanos)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        // Negative values mean "unset" on the server side.
        let nanos = i64::deserialize(deserializer)?;
        Ok(Duration::from_nanos(nanos.max(0) as u64))
    }
}
