//! Message source abstraction and its Kafka implementation

use crate::consumer::config::ConsumerConfig;
use crate::consumer::error::{ConsumerError, ConsumerResult};
use async_trait::async_trait;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::BorrowedMessage;
use rdkafka::{ClientConfig, Message, Offset, TopicPartitionList};
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

/// A record fetched from the topic, detached from the client
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InboundMessage {
    /// Source topic
    pub topic: String,
    /// Source partition
    pub partition: i32,
    /// Offset within the partition
    pub offset: i64,
    /// Record key, the article ID for well-formed records
    pub key: Option<Vec<u8>>,
    /// Record value
    pub payload: Option<Vec<u8>>,
    /// Broker timestamp in milliseconds, when present
    pub timestamp: Option<i64>,
}

impl InboundMessage {
    fn from_kafka(message: &BorrowedMessage<'_>) -> Self {
        Self {
            topic: message.topic().to_string(),
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(<[u8]>::to_vec),
            payload: message.payload().map(<[u8]>::to_vec),
            timestamp: message.timestamp().to_millis(),
        }
    }

    /// Record key as UTF-8, if it is valid UTF-8
    pub fn key_str(&self) -> Option<&str> {
        self.key.as_deref().and_then(|k| std::str::from_utf8(k).ok())
    }
}

/// Ordered source of messages with explicit commits.
///
/// `fetch` is the consumer's only suspension point and must be cancel-safe:
/// dropping its future must not lose a message.
#[async_trait]
pub trait MessageStream: Send {
    /// Wait for the next message
    async fn fetch(&mut self) -> ConsumerResult<InboundMessage>;

    /// Mark `message` (and everything before it on its partition) as processed
    async fn commit(&mut self, message: &InboundMessage) -> ConsumerResult<()>;

    /// Release broker resources
    async fn close(&mut self) {}
}

/// [`MessageStream`] over an rdkafka `StreamConsumer` in a consumer group
pub struct KafkaMessageStream {
    consumer: Arc<StreamConsumer>,
    topic: String,
}

impl std::fmt::Debug for KafkaMessageStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaMessageStream")
            .field("topic", &self.topic)
            .finish_non_exhaustive()
    }
}

impl KafkaMessageStream {
    /// Create the group consumer and subscribe to `config.topic`
    pub async fn connect(config: &ConsumerConfig) -> ConsumerResult<Self> {
        config.validate().map_err(ConsumerError::ConfigError)?;

        let mut client_config = ClientConfig::new();
        client_config
            .set("bootstrap.servers", &config.brokers)
            .set("group.id", &config.group_id)
            .set("enable.auto.commit", "false")
            .set("enable.partition.eof", "false")
            .set("session.timeout.ms", config.session_timeout_ms.to_string())
            .set("auto.offset.reset", &config.auto_offset_reset)
            .set("fetch.min.bytes", config.fetch_min_bytes.to_string())
            .set("fetch.max.bytes", config.fetch_max_bytes.to_string())
            .set(
                "fetch.wait.max.ms",
                config.fetch_max_wait.as_millis().to_string(),
            );

        for (key, value) in &config.kafka_properties {
            client_config.set(key, value);
        }

        let consumer: StreamConsumer = client_config
            .create()
            .map_err(|e| ConsumerError::ConnectionError(format!("Failed to create consumer: {}", e)))?;

        tokio::time::timeout(Duration::from_secs(30), async {
            consumer
                .subscribe(&[config.topic.as_str()])
                .map_err(|e| ConsumerError::ConnectionError(format!("Failed to subscribe: {}", e)))
        })
        .await
        .map_err(|_| ConsumerError::ConnectionError("Subscription timeout".to_string()))??;

        info!(
            "Kafka consumer initialized for broker {}, topic {}, group {}",
            config.brokers, config.topic, config.group_id
        );

        Ok(Self {
            consumer: Arc::new(consumer),
            topic: config.topic.clone(),
        })
    }
}

#[async_trait]
impl MessageStream for KafkaMessageStream {
    async fn fetch(&mut self) -> ConsumerResult<InboundMessage> {
        let message = self
            .consumer
            .recv()
            .await
            .map_err(|e| ConsumerError::FetchError(e.to_string()))?;
        Ok(InboundMessage::from_kafka(&message))
    }

    async fn commit(&mut self, message: &InboundMessage) -> ConsumerResult<()> {
        // Kafka commits the offset of the next message to read
        let mut tpl = TopicPartitionList::new();
        tpl.add_partition_offset(
            &message.topic,
            message.partition,
            Offset::Offset(message.offset + 1),
        )
        .map_err(|e| ConsumerError::CommitError(e.to_string()))?;

        let consumer = self.consumer.clone();
        tokio::task::spawn_blocking(move || consumer.commit(&tpl, CommitMode::Sync))
            .await
            .map_err(|e| ConsumerError::CommitError(e.to_string()))?
            .map_err(|e| ConsumerError::CommitError(e.to_string()))
    }

    async fn close(&mut self) {
        info!("Closing Kafka consumer for topic {}", self.topic);
        self.consumer.unsubscribe();
    }
}
