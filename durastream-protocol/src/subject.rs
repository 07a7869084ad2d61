//! API subjects.
//!
//! Every management request is addressed to a fixed subject template with the
//! stream and consumer names substituted in. The whole subject is prefixed by
//! the account prefix configured on the client (empty by default).

use crate::api::ConsumerConfig;

/// Account information and availability probe.
pub const JSAPI_ACCOUNT_INFO: &str = "$JS.API.INFO";
/// `STREAM.CREATE.{stream}`
pub const JSAPI_STREAM_CREATE: &str = "$JS.API.STREAM.CREATE";
/// `STREAM.UPDATE.{stream}`
pub const JSAPI_STREAM_UPDATE: &str = "$JS.API.STREAM.UPDATE";
/// `STREAM.DELETE.{stream}`
pub const JSAPI_STREAM_DELETE: &str = "$JS.API.STREAM.DELETE";
/// `STREAM.INFO.{stream}`
pub const JSAPI_STREAM_INFO: &str = "$JS.API.STREAM.INFO";
/// `STREAM.PURGE.{stream}`
pub const JSAPI_STREAM_PURGE: &str = "$JS.API.STREAM.PURGE";
/// `CONSUMER.CREATE.{stream}`, for ephemeral consumers.
pub const JSAPI_CONSUMER_CREATE: &str = "$JS.API.CONSUMER.CREATE";
/// `CONSUMER.DURABLECREATE.{stream}.{durable}`, for durable consumers.
pub const JSAPI_DURABLE_CREATE: &str = "$JS.API.CONSUMER.DURABLECREATE";
/// `CONSUMER.DELETE.{stream}.{consumer}`
pub const JSAPI_CONSUMER_DELETE: &str = "$JS.API.CONSUMER.DELETE";
/// `CONSUMER.INFO.{stream}.{consumer}`
pub const JSAPI_CONSUMER_INFO: &str = "$JS.API.CONSUMER.INFO";

/// A management API subject with its parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiSubject<'a> {
    AccountInfo,
    StreamCreate(&'a str),
    StreamUpdate(&'a str),
    StreamDelete(&'a str),
    StreamInfo(&'a str),
    StreamPurge(&'a str),
    ConsumerCreate(&'a str),
    DurableCreate(&'a str, &'a str),
    ConsumerDelete(&'a str, &'a str),
    ConsumerInfo(&'a str, &'a str),
}

impl ApiSubject<'_> {
    /// Returns the subject template without parameters.
    pub fn template(&self) -> &'static str {
        match self {
            ApiSubject::AccountInfo => JSAPI_ACCOUNT_INFO,
            ApiSubject::StreamCreate(_) => JSAPI_STREAM_CREATE,
            ApiSubject::StreamUpdate(_) => JSAPI_STREAM_UPDATE,
            ApiSubject::StreamDelete(_) => JSAPI_STREAM_DELETE,
            ApiSubject::StreamInfo(_) => JSAPI_STREAM_INFO,
            ApiSubject::StreamPurge(_) => JSAPI_STREAM_PURGE,
            ApiSubject::ConsumerCreate(_) => JSAPI_CONSUMER_CREATE,
            ApiSubject::DurableCreate(..) => JSAPI_DURABLE_CREATE,
            ApiSubject::ConsumerDelete(..) => JSAPI_CONSUMER_DELETE,
            ApiSubject::ConsumerInfo(..) => JSAPI_CONSUMER_INFO,
        }
    }

    /// Renders the full subject under the given account prefix.
    pub fn render(&self, prefix: &str) -> String {
        let template = self.template();
        match *self {
            ApiSubject::AccountInfo => format!("{prefix}{template}"),
            ApiSubject::StreamCreate(stream)
            | ApiSubject::StreamUpdate(stream)
            | ApiSubject::StreamDelete(stream)
            | ApiSubject::StreamInfo(stream)
            | ApiSubject::StreamPurge(stream)
            | ApiSubject::ConsumerCreate(stream) => format!("{prefix}{template}.{stream}"),
            ApiSubject::DurableCreate(stream, consumer)
            | ApiSubject::ConsumerDelete(stream, consumer)
            | ApiSubject::ConsumerInfo(stream, consumer) => {
                format!("{prefix}{template}.{stream}.{consumer}")
            }
        }
    }
}

/// Creation route of a consumer, decided by whether it has a durable name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConsumerRoute<'a> {
    Durable { stream: &'a str, durable: &'a str },
    Ephemeral { stream: &'a str },
}

impl<'a> ConsumerRoute<'a> {
    pub fn resolve(stream: &'a str, config: &'a ConsumerConfig) -> Self {
        match config.durable_name() {
            Some(durable) => ConsumerRoute::Durable { stream, durable },
            None => ConsumerRoute::Ephemeral { stream },
        }
    }

    pub fn subject(&self) -> ApiSubject<'a> {
        match *self {
            ConsumerRoute::Durable { stream, durable } => ApiSubject::DurableCreate(stream, durable),
            ConsumerRoute::Ephemeral { stream } => ApiSubject::ConsumerCreate(stream),
        }
    }

    pub fn is_durable(&self) -> bool {
        matches!(self, ConsumerRoute::Durable { .. })
    }
}

/// Returns whether a stream or consumer name can be embedded in a subject.
///
/// Names must be non-empty and free of token separators, wildcards, and
/// whitespace.
pub fn is_valid_name(name: &str) -> bool {
    !name.is_empty()
        && !name
            .chars()
            .any(|c| c == '.' || c == '*' || c == '>' || c.is_whitespace())
}
