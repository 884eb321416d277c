//! Periodic scrape-and-publish loop

use crate::producer::ArticlePublisher;
use crate::scraper::ArticleSource;
use crate::shutdown::Shutdown;
use serde::Serialize;
use std::time::Duration;
use tokio::time::{timeout_at, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

/// Default upper bound on a whole tick, fetch and publish included
pub const DEFAULT_TICK_TIMEOUT: Duration = Duration::from_secs(120);

/// Outcome of one tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct TickReport {
    /// Articles returned by the source
    pub fetched: usize,
    /// Articles acknowledged by the broker
    pub published: usize,
    /// Articles whose publish failed or was cut off by the tick timeout
    pub failed: usize,
}

/// Drives `source` into `publisher` on a fixed interval
#[derive(Debug)]
pub struct ScrapeDriver<S, P> {
    source: S,
    publisher: P,
    tick_timeout: Duration,
}

impl<S, P> ScrapeDriver<S, P>
where
    S: ArticleSource,
    P: ArticlePublisher,
{
    /// Create a driver with the default tick timeout
    pub fn new(source: S, publisher: P) -> Self {
        Self {
            source,
            publisher,
            tick_timeout: DEFAULT_TICK_TIMEOUT,
        }
    }

    /// Override the tick timeout
    pub fn with_tick_timeout(mut self, tick_timeout: Duration) -> Self {
        self.tick_timeout = tick_timeout;
        self
    }

    /// Give back the publisher, e.g. to flush it on exit
    pub fn into_publisher(self) -> P {
        self.publisher
    }

    /// Fetch once and publish every article.
    ///
    /// A failed fetch yields an empty report. A failed publish is logged and
    /// counted without stopping the rest of the batch.
    pub async fn run_tick(&self) -> TickReport {
        let deadline = Instant::now() + self.tick_timeout;
        let mut report = TickReport::default();

        let articles = match timeout_at(deadline, self.source.list_latest()).await {
            Ok(Ok(articles)) => articles,
            Ok(Err(e)) => {
                error!("Failed to fetch articles from {}: {}", self.source.name(), e);
                return report;
            }
            Err(_) => {
                error!(
                    "Fetching from {} exceeded {:?}, skipping tick",
                    self.source.name(),
                    self.tick_timeout
                );
                return report;
            }
        };
        report.fetched = articles.len();

        for (index, article) in articles.iter().enumerate() {
            match timeout_at(deadline, self.publisher.publish(article)).await {
                Ok(Ok(receipt)) => {
                    report.published += 1;
                    debug!(
                        article_id = %article.id,
                        partition = receipt.partition,
                        offset = receipt.offset,
                        "Published article"
                    );
                }
                Ok(Err(e)) => {
                    report.failed += 1;
                    warn!(article_id = %article.id, "Failed to publish article: {}", e);
                }
                Err(_) => {
                    let remaining = articles.len() - index;
                    report.failed += remaining;
                    warn!(
                        "Tick exceeded {:?}, {} articles left unpublished",
                        self.tick_timeout, remaining
                    );
                    break;
                }
            }
        }

        report
    }

    /// Tick every `interval` until `shutdown` fires. The first tick runs
    /// immediately; a slow tick delays the next one instead of overlapping it.
    pub async fn start(&self, interval: Duration, shutdown: Shutdown) {
        // tokio rejects a zero period
        let mut ticker = tokio::time::interval(interval.max(Duration::from_millis(1)));
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        info!(
            "Scraping {} every {:?}",
            self.source.name(),
            interval
        );

        loop {
            tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                _ = ticker.tick() => {}
            }

            let report = tokio::select! {
                biased;
                _ = shutdown.triggered() => {
                    info!("Shutdown during scrape tick, abandoning it");
                    break;
                }
                report = self.run_tick() => report,
            };

            info!(
                "Tick complete: fetched {}, published {}, failed {}",
                report.fetched, report.published, report.failed
            );
        }

        info!("Scrape driver stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::article::Article;
    use crate::error::{FetchError, ProducerError};
    use crate::producer::{ProducerResult, PublishReceipt};
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    fn article(n: usize) -> Article {
        Article::new(
            "VnExpress",
            &format!("Story {}", n),
            format!("https://vnexpress.net/story-{}.html", n),
            None,
        )
    }

    struct FakeSource {
        articles: Vec<Article>,
        fail: bool,
        delay: Duration,
        calls: Arc<AtomicUsize>,
    }

    impl FakeSource {
        fn with(count: usize) -> Self {
            Self {
                articles: (0..count).map(article).collect(),
                fail: false,
                delay: Duration::ZERO,
                calls: Arc::new(AtomicUsize::new(0)),
            }
        }
    }

    #[async_trait]
    impl ArticleSource for FakeSource {
        fn name(&self) -> &str {
            "fake"
        }

        async fn list_latest(&self) -> Result<Vec<Article>, FetchError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            tokio::time::sleep(self.delay).await;
            if self.fail {
                return Err(FetchError::Status {
                    url: "https://vnexpress.net/thoi-su".to_string(),
                    status: 503,
                });
            }
            Ok(self.articles.clone())
        }

        async fn fetch_body(&self, _url: &str) -> Result<String, FetchError> {
            Ok(String::new())
        }
    }

    #[derive(Default)]
    struct FakePublisher {
        published: Mutex<Vec<String>>,
        reject: Option<String>,
    }

    #[async_trait]
    impl ArticlePublisher for FakePublisher {
        async fn publish(&self, article: &Article) -> ProducerResult<PublishReceipt> {
            if self.reject.as_deref() == Some(article.title.as_str()) {
                return Err(ProducerError::Delivery("broker unavailable".to_string()));
            }
            let mut published = self.published.lock();
            published.push(article.id.clone());
            Ok(PublishReceipt {
                partition: 0,
                offset: published.len() as i64 - 1,
            })
        }
    }

    #[tokio::test]
    async fn test_tick_publishes_every_article() {
        let driver = ScrapeDriver::new(FakeSource::with(3), FakePublisher::default());

        let report = driver.run_tick().await;

        assert_eq!(
            report,
            TickReport {
                fetched: 3,
                published: 3,
                failed: 0
            }
        );
        let expected: Vec<String> = (0..3).map(|n| article(n).id).collect();
        assert_eq!(*driver.into_publisher().published.lock(), expected);
    }

    #[tokio::test]
    async fn test_publish_failure_does_not_abort_batch() {
        let publisher = FakePublisher {
            reject: Some("Story 1".to_string()),
            ..Default::default()
        };
        let driver = ScrapeDriver::new(FakeSource::with(3), publisher);

        let report = driver.run_tick().await;

        assert_eq!(report.published, 2);
        assert_eq!(report.failed, 1);
    }

    #[tokio::test]
    async fn test_fetch_failure_skips_tick() {
        let mut source = FakeSource::with(3);
        source.fail = true;
        let driver = ScrapeDriver::new(source, FakePublisher::default());

        assert_eq!(driver.run_tick().await, TickReport::default());
        assert!(driver.into_publisher().published.lock().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_slow_fetch_hits_tick_timeout() {
        let mut source = FakeSource::with(3);
        source.delay = Duration::from_secs(600);
        let driver = ScrapeDriver::new(source, FakePublisher::default())
            .with_tick_timeout(Duration::from_secs(5));

        assert_eq!(driver.run_tick().await, TickReport::default());
    }

    #[tokio::test]
    async fn test_start_ticks_immediately_and_stops_on_shutdown() {
        let source = FakeSource::with(1);
        let calls = source.calls.clone();
        let driver = Arc::new(ScrapeDriver::new(source, FakePublisher::default()));
        let shutdown = Shutdown::new();

        let task = {
            let driver = driver.clone();
            let shutdown = shutdown.clone();
            tokio::spawn(async move { driver.start(Duration::from_secs(3600), shutdown).await })
        };

        tokio::time::sleep(Duration::from_millis(100)).await;
        assert_eq!(calls.load(Ordering::SeqCst), 1);

        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), task)
            .await
            .unwrap()
            .unwrap();
    }
}
