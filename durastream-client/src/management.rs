//! Stream and consumer management.

use crate::client::{require_name, Client};
use crate::error::BridgeError;
use crate::transport::Transport;
use async_trait::async_trait;
use durastream_protocol::{
    ApiSubject, ConsumerConfig, ConsumerCreateRequest, ConsumerInfo, ConsumerRoute, Encoder,
    PurgeResponse, StreamConfig, StreamInfo, SuccessResponse,
};

/// Administrative operations on streams and consumers.
#[async_trait]
pub trait StreamManager: Send + Sync {
    /// Creates a stream.
    async fn add_stream(&self, config: &StreamConfig) -> Result<StreamInfo, BridgeError>;

    /// Updates the configuration of an existing stream.
    async fn update_stream(&self, config: &StreamConfig) -> Result<StreamInfo, BridgeError>;

    /// Deletes a stream and all of its messages.
    async fn delete_stream(&self, stream: &str) -> Result<bool, BridgeError>;

    /// Gets a stream's configuration and state.
    async fn stream_info(&self, stream: &str) -> Result<StreamInfo, BridgeError>;

    /// Removes all messages from a stream.
    async fn purge_stream(&self, stream: &str) -> Result<PurgeResponse, BridgeError>;

    /// Creates a consumer on a stream.
    ///
    /// Consumers with a durable name go through the durable creation route.
    async fn add_consumer(
        &self,
        stream: &str,
        config: &ConsumerConfig,
    ) -> Result<ConsumerInfo, BridgeError>;

    /// Deletes a consumer.
    async fn delete_consumer(&self, stream: &str, consumer: &str) -> Result<bool, BridgeError>;

    /// Gets a consumer's configuration and delivery state.
    async fn consumer_info(&self, stream: &str, consumer: &str)
        -> Result<ConsumerInfo, BridgeError>;
}

#[async_trait]
impl<T: Transport> StreamManager for Client<T> {
    async fn add_stream(&self, config: &StreamConfig) -> Result<StreamInfo, BridgeError> {
        require_name("stream name", &config.name)?;

        let body = Encoder::encode_json(config)?;
        self.api_call(ApiSubject::StreamCreate(&config.name), Some(body))
            .await
    }

    async fn update_stream(&self, config: &StreamConfig) -> Result<StreamInfo, BridgeError> {
        require_name("stream name", &config.name)?;

        let body = Encoder::encode_json(config)?;
        self.api_call(ApiSubject::StreamUpdate(&config.name), Some(body))
            .await
    }

    async fn delete_stream(&self, stream: &str) -> Result<bool, BridgeError> {
        require_name("stream name", stream)?;

        let response: SuccessResponse = self
            .api_call(ApiSubject::StreamDelete(stream), None)
            .await?;
        Ok(response.success)
    }

    async fn stream_info(&self, stream: &str) -> Result<StreamInfo, BridgeError> {
        require_name("stream name", stream)?;

        self.api_call(ApiSubject::StreamInfo(stream), None).await
    }

    async fn purge_stream(&self, stream: &str) -> Result<PurgeResponse, BridgeError> {
        require_name("stream name", stream)?;

        self.api_call(ApiSubject::StreamPurge(stream), None).await
    }

    async fn add_consumer(
        &self,
        stream: &str,
        config: &ConsumerConfig,
    ) -> Result<ConsumerInfo, BridgeError> {
        require_name("stream name", stream)?;
        if let Some(durable) = config.durable_name() {
            require_name("durable name", durable)?;
        }

        let route = ConsumerRoute::resolve(stream, config);
        tracing::debug!(
            "Creating {} consumer on {}",
            if route.is_durable() { "durable" } else { "ephemeral" },
            stream
        );

        let body = Encoder::encode_json(&ConsumerCreateRequest::new(stream, config.clone()))?;
        self.api_call(route.subject(), Some(body)).await
    }

    async fn delete_consumer(&self, stream: &str, consumer: &str) -> Result<bool, BridgeError> {
        require_name("stream name", stream)?;
        require_name("consumer name", consumer)?;

        let response: SuccessResponse = self
            .api_call(ApiSubject::ConsumerDelete(stream, consumer), None)
            .await?;
        Ok(response.success)
    }

    async fn consumer_info(
        &self,
        stream: &str,
        consumer: &str,
    ) -> Result<ConsumerInfo, BridgeError> {
        require_name("stream name", stream)?;
        require_name("consumer name", consumer)?;

        self.api_call(ApiSubject::ConsumerInfo(stream, consumer), None)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::TransportError;
    use crate::mock::{connected, MockTransport};
    use serde_json::{json, Value};
    use std::sync::Arc;

    fn stream_info_reply(name: &str) -> Value {
        json!({
            "type": "io.nats.jetstream.api.v1.stream_create_response",
            "config": {"name": name, "subjects": ["orders.>"]},
            "created": "2026-03-01T10:00:00Z",
            "state": {
                "messages": 0,
                "bytes": 0,
                "first_seq": 0,
                "first_ts": "0001-01-01T00:00:00Z",
                "last_seq": 0,
                "last_ts": "0001-01-01T00:00:00Z",
                "consumer_count": 0
            }
        })
    }

    fn consumer_info_reply(stream: &str, name: &str) -> Value {
        json!({
            "stream_name": stream,
            "name": name,
            "created": "2026-03-01T10:00:00Z",
            "config": {"durable_name": name},
            "delivered": {"consumer_seq": 0, "stream_seq": 0},
            "ack_floor": {"consumer_seq": 0, "stream_seq": 0},
            "num_ack_pending": 0,
            "num_redelivered": 0,
            "num_waiting": 0,
            "num_pending": 0
        })
    }

    #[tokio::test]
    async fn test_add_stream() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(stream_info_reply("ORDERS"));
        let config = StreamConfig::new("ORDERS").with_subjects(["orders.>"]);
        let info = client.add_stream(&config).await.unwrap();
        assert_eq!(info.config.name, "ORDERS");

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.message.subject, "$JS.API.STREAM.CREATE.ORDERS");
        assert_eq!(sent.body_json()["subjects"], json!(["orders.>"]));
        assert!(sent.message.headers.is_none());
    }

    #[tokio::test]
    async fn test_update_stream() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(stream_info_reply("ORDERS"));
        let config = StreamConfig::new("ORDERS").with_description("v2");
        client.update_stream(&config).await.unwrap();

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.message.subject, "$JS.API.STREAM.UPDATE.ORDERS");
        assert_eq!(sent.body_json()["description"], "v2");
    }

    #[tokio::test]
    async fn test_add_stream_without_name_sends_nothing() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        let err = client.add_stream(&StreamConfig::default()).await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));

        let err = client
            .update_stream(&StreamConfig::new("bad.name"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));

        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_add_consumer_invalid_arguments_send_nothing() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        let err = client
            .add_consumer("", &ConsumerConfig::durable("D1"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));

        let err = client
            .add_consumer("S", &ConsumerConfig::durable(""))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));

        let err = client
            .add_consumer("S", &ConsumerConfig::durable("D.1"))
            .await
            .unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));

        assert_eq!(mock.request_count(), 1);
    }

    #[tokio::test]
    async fn test_add_durable_consumer() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(consumer_info_reply("ORDERS", "D1"));
        let info = client
            .add_consumer("ORDERS", &ConsumerConfig::durable("D1"))
            .await
            .unwrap();
        assert_eq!(info.name, "D1");

        let sent = mock.last_request().unwrap();
        assert_eq!(
            sent.message.subject,
            "$JS.API.CONSUMER.DURABLECREATE.ORDERS.D1"
        );
        let body = sent.body_json();
        assert_eq!(body["stream_name"], "ORDERS");
        assert_eq!(body["config"]["durable_name"], "D1");
    }

    #[tokio::test]
    async fn test_add_ephemeral_consumer() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(consumer_info_reply("ORDERS", "eph-1"));
        let config = ConsumerConfig::ephemeral().with_deliver_subject("deliver.orders");
        client.add_consumer("ORDERS", &config).await.unwrap();

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.message.subject, "$JS.API.CONSUMER.CREATE.ORDERS");
        let body = sent.body_json();
        assert_eq!(body["stream_name"], "ORDERS");
        assert!(body["config"].get("durable_name").is_none());
        assert_eq!(body["config"]["deliver_subject"], "deliver.orders");
    }

    #[tokio::test]
    async fn test_delete_stream_success_flag() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"success": true}));
        assert!(client.delete_stream("ORDERS").await.unwrap());

        mock.reply_json(json!({"success": false}));
        assert!(!client.delete_stream("ORDERS").await.unwrap());

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.message.subject, "$JS.API.STREAM.DELETE.ORDERS");
        assert!(sent.message.payload.is_empty());
    }

    #[tokio::test]
    async fn test_delete_stream_error_is_protocol() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"error": {"code": 404, "description": "stream not found"}}));
        let err = client.delete_stream("MISSING").await.unwrap_err();
        match err {
            BridgeError::Protocol { code, description } => {
                assert_eq!(code, 404);
                assert_eq!(description, "stream not found");
            }
            other => panic!("expected Protocol, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_stream_info_and_purge() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(stream_info_reply("ORDERS"));
        client.stream_info("ORDERS").await.unwrap();
        assert_eq!(
            mock.last_request().unwrap().message.subject,
            "$JS.API.STREAM.INFO.ORDERS"
        );

        mock.reply_json(json!({"success": true, "purged": 12}));
        let purge = client.purge_stream("ORDERS").await.unwrap();
        assert!(purge.success);
        assert_eq!(purge.purged, 12);
        assert_eq!(
            mock.last_request().unwrap().message.subject,
            "$JS.API.STREAM.PURGE.ORDERS"
        );
    }

    #[tokio::test]
    async fn test_consumer_info_and_delete() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(consumer_info_reply("ORDERS", "D1"));
        let info = client.consumer_info("ORDERS", "D1").await.unwrap();
        assert_eq!(info.stream_name, "ORDERS");
        assert_eq!(
            mock.last_request().unwrap().message.subject,
            "$JS.API.CONSUMER.INFO.ORDERS.D1"
        );

        mock.reply_json(json!({"success": true}));
        assert!(client.delete_consumer("ORDERS", "D1").await.unwrap());
        assert_eq!(
            mock.last_request().unwrap().message.subject,
            "$JS.API.CONSUMER.DELETE.ORDERS.D1"
        );

        let err = client.consumer_info("ORDERS", "").await.unwrap_err();
        assert!(matches!(err, BridgeError::InvalidArgument(_)));
        assert_eq!(mock.request_count(), 3);
    }

    #[tokio::test]
    async fn test_not_ready_on_management_call_is_protocol() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"error": {"code": 503, "description": "not ready"}}));
        let err = client.stream_info("ORDERS").await.unwrap_err();
        assert_eq!(err.code(), Some(503));
    }

    #[tokio::test]
    async fn test_management_uses_prefix_and_timeout() {
        use crate::client::BridgeConfig;
        use std::time::Duration;

        let mock = Arc::new(MockTransport::new());
        mock.reply_json(json!({}));
        let config = BridgeConfig::new()
            .with_prefix("hub.")
            .with_request_timeout(Duration::from_millis(750));
        let client = Client::connect(mock.clone(), config).await.unwrap();

        mock.reply_json(json!({"success": true}));
        client.delete_consumer("ORDERS", "D1").await.unwrap();

        let sent = mock.last_request().unwrap();
        assert_eq!(sent.message.subject, "hub.$JS.API.CONSUMER.DELETE.ORDERS.D1");
        assert_eq!(sent.timeout, Duration::from_millis(750));
    }

    #[tokio::test]
    async fn test_management_transport_failures() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.fail(TransportError::NoResponders);
        let err = client.stream_info("ORDERS").await.unwrap_err();
        assert!(matches!(err, BridgeError::Unavailable { .. }));

        mock.reply_raw("not json");
        let err = client.stream_info("ORDERS").await.unwrap_err();
        assert!(matches!(err, BridgeError::Communication { .. }));
    }

    #[tokio::test]
    async fn test_concurrent_calls_are_independent() {
        let mock = Arc::new(MockTransport::new());
        let client = connected(&mock).await;

        mock.reply_json(json!({"success": true}));
        mock.reply_json(json!({"success": true}));
        let (a, b) = tokio::join!(
            client.delete_stream("A"),
            client.delete_consumer("B", "C")
        );
        assert!(a.unwrap());
        assert!(b.unwrap());
        assert_eq!(mock.request_count(), 3);
    }
}
