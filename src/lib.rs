//! Two-stage news pipeline over Kafka
//!
//! A scraper process fetches a news listing on a timer and publishes each
//! article to a topic, keyed by article ID. An API process consumes that
//! topic into a bounded in-memory window and serves it over HTTP behind a
//! per-client token-bucket rate limiter.
//!
//! # Scraper side
//!
//! ```no_run
//! use newswire::producer::{KafkaPublisher, ProducerConfig};
//! use newswire::scraper::{FetcherConfig, ScrapeDriver, VnExpressSource};
//! use newswire::shutdown::Shutdown;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let publisher = KafkaPublisher::new(ProducerConfig::new("kafka:9092", "news-updates"))?;
//! let driver = ScrapeDriver::new(VnExpressSource::new(FetcherConfig::default())?, publisher);
//! driver.start(Duration::from_secs(300), Shutdown::new()).await;
//! # Ok(())
//! # }
//! ```
//!
//! # API side
//!
//! ```no_run
//! use newswire::consumer::{ArticleConsumer, ConsumerConfig, KafkaMessageStream};
//! use newswire::ratelimit::{RateLimitConfig, RateLimiter};
//! use newswire::service::{ApiServer, ApiService, ServerConfig};
//! use newswire::shutdown::Shutdown;
//! use newswire::store::WindowStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let shutdown = Shutdown::new();
//! let store = Arc::new(WindowStore::new(100));
//!
//! let config = ConsumerConfig::default();
//! let stream = KafkaMessageStream::connect(&config).await?;
//! let mut consumer = ArticleConsumer::new(stream, store.clone(), config.fetch_error_backoff);
//! let consumer_shutdown = shutdown.clone();
//! tokio::spawn(async move { consumer.run(&consumer_shutdown).await });
//!
//! let limiter = Arc::new(RateLimiter::new(RateLimitConfig::default()));
//! let server = ApiServer::bind(&ServerConfig::default(), ApiService::new(store, limiter)).await?;
//! server.run(shutdown).await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![deny(unsafe_code)]
#![warn(clippy::all)]
#![allow(clippy::module_inception)]

pub use article::{generate_id, Article};
pub use shutdown::Shutdown;
pub use store::{AddOutcome, WindowStore};

/// Article model and ID derivation
pub mod article;

/// Topic message encoding
pub mod wire;

/// Error types
pub mod error;

/// Kafka producer
pub mod producer;

/// Kafka consumer
pub mod consumer;

/// Bounded window of recent articles
pub mod store;

/// Per-client rate limiting
pub mod ratelimit;

/// HTTP API
pub mod service;

/// News-site fetching and the scrape loop
pub mod scraper;

/// Shutdown signalling
pub mod shutdown;

/// Logging setup
pub mod telemetry;

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
