//! Kafka producer for scraped articles
//!
//! Each article is written synchronously: [`ArticlePublisher::publish`] only
//! returns once the broker has acknowledged the record (or failed to). The
//! record key is the article ID, so every revision of one article lands on
//! the same partition.
//!
//! # Example
//!
//! ```no_run
//! use newswire::producer::{ArticlePublisher, KafkaPublisher, ProducerConfig};
//! use newswire::article::Article;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let publisher = KafkaPublisher::new(ProducerConfig::new("localhost:9092", "news-updates"))?;
//! let article = Article::new("VnExpress", "Headline", "https://vnexpress.net/a.html", None);
//! publisher.publish(&article).await?;
//! publisher.close().await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod error;

pub use config::ProducerConfig;
pub use error::{ProducerError, ProducerResult};

use crate::article::Article;
use crate::wire::{encode_article, message_key};
use async_trait::async_trait;
use chrono::Utc;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use rdkafka::ClientConfig;
use tracing::{debug, info};

/// Where a published record ended up
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PublishReceipt {
    /// Partition the record was written to
    pub partition: i32,
    /// Offset assigned by the broker
    pub offset: i64,
}

/// Sink for scraped articles
#[async_trait]
pub trait ArticlePublisher: Send + Sync {
    /// Publish one article and wait for the acknowledgement.
    ///
    /// Errors are returned as-is; retry policy belongs to the caller.
    async fn publish(&self, article: &Article) -> ProducerResult<PublishReceipt>;
}

/// [`ArticlePublisher`] backed by an rdkafka `FutureProducer`
pub struct KafkaPublisher {
    producer: FutureProducer,
    config: ProducerConfig,
}

impl std::fmt::Debug for KafkaPublisher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KafkaPublisher")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl KafkaPublisher {
    /// Create a producer for `config.topic`
    pub fn new(config: ProducerConfig) -> ProducerResult<Self> {
        config.validate().map_err(ProducerError::ConfigError)?;

        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", &config.brokers)
            .set("acks", &config.acks)
            .set("partitioner", &config.partitioner)
            .set(
                "message.timeout.ms",
                config.delivery_timeout.as_millis().to_string(),
            )
            .create()
            .map_err(|e| ProducerError::ConnectionError(format!("Failed to create producer: {}", e)))?;

        info!(
            "Kafka producer initialized for broker {}, topic {}",
            config.brokers, config.topic
        );

        Ok(Self { producer, config })
    }

    /// Flush outstanding deliveries and release the client
    pub async fn close(self) -> ProducerResult<()> {
        info!("Closing Kafka producer");
        let producer = self.producer;
        let timeout = self.config.flush_timeout;
        tokio::task::spawn_blocking(move || producer.flush(Timeout::After(timeout)))
            .await
            .map_err(|e| ProducerError::Flush(e.to_string()))?
            .map_err(|e| ProducerError::Flush(e.to_string()))
    }
}

#[async_trait]
impl ArticlePublisher for KafkaPublisher {
    async fn publish(&self, article: &Article) -> ProducerResult<PublishReceipt> {
        let payload = encode_article(article)?;
        let record = FutureRecord::to(&self.config.topic)
            .key(message_key(article))
            .payload(payload.as_slice())
            .timestamp(Utc::now().timestamp_millis());

        let (partition, offset) = self
            .producer
            .send(record, Timeout::After(self.config.delivery_timeout))
            .await
            .map_err(|(e, _)| ProducerError::Delivery(e.to_string()))?;

        debug!(
            article_id = %article.id,
            partition,
            offset,
            "Produced article '{}'",
            article.title
        );

        Ok(PublishReceipt { partition, offset })
    }
}
