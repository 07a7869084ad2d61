//! Publishing with preconditions.

use crate::client::Client;
use crate::error::BridgeError;
use crate::transport::Transport;
use async_trait::async_trait;
use bytes::Bytes;
use durastream_protocol::{merge_headers, Decoder, Message, PublishAck, PublishOptions};

/// Publishes messages to streams and waits for the acknowledgment.
#[async_trait]
pub trait Publisher: Send + Sync {
    /// Publishes `payload` to `subject`.
    ///
    /// `options` become precondition headers; the server rejects the message
    /// when one of them does not hold.
    async fn publish(
        &self,
        subject: &str,
        payload: Bytes,
        options: Option<&PublishOptions>,
    ) -> Result<PublishAck, BridgeError>;

    /// Publishes a prepared message, keeping the headers it already carries.
    async fn publish_message(
        &self,
        message: Message,
        options: Option<&PublishOptions>,
    ) -> Result<PublishAck, BridgeError>;
}

#[async_trait]
impl<T: Transport> Publisher for Client<T> {
    async fn publish(
        &self,
        subject: &str,
        payload: Bytes,
        options: Option<&PublishOptions>,
    ) -> Result<PublishAck, BridgeError> {
        self.publish_message(Message::new(subject, payload), options)
            .await
    }

    async fn publish_message(
        &self,
        mut message: Message,
        options: Option<&PublishOptions>,
    ) -> Result<PublishAck, BridgeError> {
        if message.subject.is_empty() {
            return Err(BridgeError::invalid("subject is required"));
        }

        let default = PublishOptions::DEFAULT;
        let options = options.unwrap_or(&default);
        message.headers = merge_headers(message.headers.take(), Some(options));

        let reply = self.send(message).await?;
        let ack: PublishAck = Decoder::decode_as(&reply.payload)?;

        tracing::debug!(
            "Published to stream {} seq={} duplicate={}",
            ack.stream,
            ack.seq,
            ack.duplicate
        );
        Ok(ack)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::mock::{connected, MockTransport};
    use durastream_protocol::message::Headers;
    use durastream_protocol::publish::{
        EXPECTED_LAST_MSG_ID_HEADER, EXPECTED_LAST_SEQ_HEADER, EXPECTED_STREAM_HEADER,
        MSG_ID_HEADER,
    };
    use serde_json::json;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_publish_with_expected_sequence() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"stream": "S1", "seq": 6}));
        let options = PublishOptions::new().with_expected_last_seq(5);
        let ack = client
            .publish("S1", Bytes::from_static(b"order-6"), Some(&options))
            .await
            .unwrap();

        assert_eq!(
            ack,
            PublishAck {
                stream: "S1".to_string(),
                seq: 6,
                duplicate: false,
                domain: None,
            }
        );

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.message.subject, "S1");
        assert_eq!(sent.message.payload, Bytes::from_static(b"order-6"));
        let headers = sent.message.headers.unwrap();
        assert_eq!(headers.len(), 1);
        assert_eq!(headers.get(EXPECTED_LAST_SEQ_HEADER), Some("5"));
    }

    #[tokio::test]
    async fn test_publish_rejected_precondition() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"error": {"code": 400, "description": "wrong last sequence"}}));
        let options = PublishOptions::new().with_expected_last_seq(5);
        let err = client
            .publish("S1", Bytes::from_static(b"x"), Some(&options))
            .await
            .unwrap_err();

        match err {
            BridgeError::Protocol { code, description } => {
                assert_eq!(code, 400);
                assert_eq!(description, "wrong last sequence");
            }
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_publish_without_options_sends_no_headers() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"stream": "S1", "seq": 1}));
        client
            .publish("orders.new", Bytes::from_static(b"{}"), None)
            .await
            .unwrap();

        assert!(mock.last_request().unwrap().message.headers.is_none());
    }

    #[tokio::test]
    async fn test_publish_all_preconditions() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"stream": "ORDERS", "seq": 10, "duplicate": true}));
        let options = PublishOptions::new()
            .with_expected_last_msg_id("m-9")
            .with_expected_last_seq(9)
            .with_expected_stream("ORDERS")
            .with_msg_id("m-10");
        let ack = client
            .publish("orders.new", Bytes::from_static(b"{}"), Some(&options))
            .await
            .unwrap();
        assert!(ack.duplicate);

        let headers = mock.last_request().unwrap().message.headers.unwrap();
        assert_eq!(headers.get(EXPECTED_LAST_MSG_ID_HEADER), Some("m-9"));
        assert_eq!(headers.get(EXPECTED_LAST_SEQ_HEADER), Some("9"));
        assert_eq!(headers.get(EXPECTED_STREAM_HEADER), Some("ORDERS"));
        assert_eq!(headers.get(MSG_ID_HEADER), Some("m-10"));
    }

    #[tokio::test]
    async fn test_publish_message_keeps_caller_headers() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"stream": "ORDERS", "seq": 3}));
        let message = Message::new("orders.new", "payload")
            .with_headers(Headers::new().with("Trace-Id", "t-1"));
        let options = PublishOptions::new().with_msg_id("m-3");
        client
            .publish_message(message, Some(&options))
            .await
            .unwrap();

        let headers = mock.last_request().unwrap().message.headers.unwrap();
        assert_eq!(headers.len(), 2);
        assert_eq!(headers.get("Trace-Id"), Some("t-1"));
        assert_eq!(headers.get(MSG_ID_HEADER), Some("m-3"));
    }

    #[tokio::test]
    async fn test_publish_message_default_options_untouched() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"stream": "ORDERS", "seq": 4}));
        let message = Message::new("orders.new", "payload")
            .with_headers(Headers::new().with("Trace-Id", "t-2"));
        client.publish_message(message, None).await.unwrap();

        let headers = mock.last_request().unwrap().message.headers.unwrap();
        assert_eq!(headers, Headers::new().with("Trace-Id", "t-2"));
    }

    #[tokio::test]
    async fn test_publish_surfaces_transport_failures() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.fail(TransportError::Timeout);
        let err = client
            .publish("orders.new", Bytes::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Unavailable { .. }));

        mock.fail(TransportError::Other("reset".into()));
        let err = client
            .publish("orders.new", Bytes::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::Communication { .. }));

        // One probe plus two publishes; nothing was retried.
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_publish_empty_subject_sends_nothing() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        let err = client
            .publish("", Bytes::new(), None)
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_publish_through_trait_object() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;
        let publisher: Box<dyn Publisher> = Box::new(client);

        mock.reply_json(json!({"stream": "S1", "seq": 1}));
        let ack = publisher
            .publish("S1", Bytes::from_static(b"a"), None)
            .await
            .unwrap();
        assert_eq!(ack.seq, 1);
    }
}
