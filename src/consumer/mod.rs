//! Kafka consumer feeding the article window
//!
//! This module provides:
//! - Group consumption with explicit, per-message offset commits
//! - Skip-and-commit handling of undecodable (poison) records
//! - Cancellation at the fetch boundary
//! - Lock-free counters for observability
//!
//! # Example
//!
//! ```no_run
//! use newswire::consumer::{ArticleConsumer, ConsumerConfig, KafkaMessageStream};
//! use newswire::shutdown::Shutdown;
//! use newswire::store::WindowStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let config = ConsumerConfig::builder()
//!     .brokers("localhost:9092")
//!     .group_id("news-aggregator-group")
//!     .topic("news-updates")
//!     .build();
//!
//! let store = Arc::new(WindowStore::new(100));
//! let stream = KafkaMessageStream::connect(&config).await?;
//! let mut consumer = ArticleConsumer::new(stream, store, config.fetch_error_backoff);
//!
//! let shutdown = Shutdown::new();
//! consumer.run(&shutdown).await;
//! consumer.close().await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod consumer;
pub mod error;
pub mod metrics;
pub mod stream;

pub use config::{ConsumerConfig, ConsumerConfigBuilder};
pub use consumer::ArticleConsumer;
pub use error::{ConsumerError, ConsumerResult};
pub use metrics::{ConsumerMetrics, MetricsSnapshot};
pub use stream::{InboundMessage, KafkaMessageStream, MessageStream};
