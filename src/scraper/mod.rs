//! Article fetching and the periodic scrape driver
//!
//! [`ArticleSource`] is the seam between the driver and a concrete site.
//! [`VnExpressSource`] implements it with `reqwest` and `scraper`;
//! [`ScrapeDriver`] pulls from any source and pushes through any
//! [`ArticlePublisher`](crate::producer::ArticlePublisher).
//!
//! ```no_run
//! use newswire::producer::{KafkaPublisher, ProducerConfig};
//! use newswire::scraper::{FetcherConfig, ScrapeDriver, VnExpressSource};
//! use newswire::shutdown::Shutdown;
//! use std::time::Duration;
//!
//! # async fn example() -> anyhow::Result<()> {
//! let source = VnExpressSource::new(FetcherConfig::default())?;
//! let publisher = KafkaPublisher::new(ProducerConfig::new("kafka:9092", "news-updates"))?;
//! let driver = ScrapeDriver::new(source, publisher);
//!
//! driver.start(Duration::from_secs(300), Shutdown::new()).await;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod driver;
pub mod vnexpress;

pub use config::FetcherConfig;
pub use driver::{ScrapeDriver, TickReport, DEFAULT_TICK_TIMEOUT};
pub use vnexpress::{parse_published, VnExpressSource};

use crate::article::Article;
use crate::error::FetchError;
use async_trait::async_trait;

/// A site that can list its latest articles
#[async_trait]
pub trait ArticleSource: Send + Sync {
    /// Source tag, used in logs
    fn name(&self) -> &str;

    /// Fetch the listing and return its articles with bodies attached.
    ///
    /// IDs must be deterministic from the URL. A body that cannot be fetched
    /// leaves `content` empty rather than failing the listing.
    async fn list_latest(&self) -> Result<Vec<Article>, FetchError>;

    /// Fetch the body text of one article
    async fn fetch_body(&self, url: &str) -> Result<String, FetchError>;
}
