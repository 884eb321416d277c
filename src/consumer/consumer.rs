//! Main consume loop: fetch, decode, store, commit

use crate::consumer::{
    error::ConsumerError,
    metrics::ConsumerMetrics,
    stream::{InboundMessage, MessageStream},
};
use crate::shutdown::Shutdown;
use crate::store::WindowStore;
use crate::wire::decode_article;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, error, info, warn};

/// At-least-once consumer feeding the window store.
///
/// Offsets are committed only after the article has been handed to the
/// store, so a crash in between re-delivers the record; the store's ID dedup
/// makes the replay harmless. Records that cannot be decoded are committed
/// and dropped.
pub struct ArticleConsumer<S: MessageStream> {
    stream: S,
    store: Arc<WindowStore>,
    metrics: Arc<ConsumerMetrics>,
    fetch_error_backoff: Duration,
}

impl<S: MessageStream> std::fmt::Debug for ArticleConsumer<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ArticleConsumer")
            .field("metrics", &self.metrics.snapshot())
            .field("fetch_error_backoff", &self.fetch_error_backoff)
            .finish_non_exhaustive()
    }
}

impl<S: MessageStream> ArticleConsumer<S> {
    /// Create a consumer writing into `store`
    pub fn new(stream: S, store: Arc<WindowStore>, fetch_error_backoff: Duration) -> Self {
        Self {
            stream,
            store,
            metrics: Arc::new(ConsumerMetrics::new()),
            fetch_error_backoff,
        }
    }

    /// Shared handle to the consumer's counters
    pub fn metrics(&self) -> Arc<ConsumerMetrics> {
        self.metrics.clone()
    }

    /// Consume until `shutdown` fires.
    ///
    /// Cancellation is only observed while waiting on a fetch (or the
    /// back-off after a failed one); a message already fetched is always
    /// decoded, stored and committed before the loop exits.
    pub async fn run(&mut self, shutdown: &Shutdown) {
        info!("Article consumer started");

        while !shutdown.is_triggered() {
            let fetched = tokio::select! {
                biased;
                _ = shutdown.triggered() => break,
                result = self.stream.fetch() => result,
            };

            match fetched {
                Ok(message) => self.handle(message).await,
                Err(e) => {
                    error!("Error fetching message from Kafka: {}", e);
                    self.metrics.increment_fetch_errors();
                    if !shutdown.sleep(self.fetch_error_backoff).await {
                        break;
                    }
                }
            }
        }

        info!(
            "Article consumer shutting down: {:?}",
            self.metrics.snapshot()
        );
    }

    /// Release the underlying stream
    pub async fn close(mut self) {
        self.stream.close().await;
    }

    async fn handle(&mut self, message: InboundMessage) {
        self.metrics.increment_consumed();

        match decode_article(message.payload.as_deref()) {
            Ok(article) => {
                let id = article.id.clone();
                let title = article.title.clone();
                if self.store.add(article).is_admitted() {
                    self.metrics.increment_stored();
                    info!(
                        article_id = %id,
                        partition = message.partition,
                        offset = message.offset,
                        "Consumed article '{}'. Total articles: {}",
                        title,
                        self.store.count()
                    );
                } else {
                    self.metrics.increment_duplicates();
                    debug!(article_id = %id, offset = message.offset, "Duplicate article ignored");
                }
            }
            Err(e) => {
                self.metrics.increment_poison();
                warn!(
                    partition = message.partition,
                    offset = message.offset,
                    key = message.key_str().unwrap_or("<none>"),
                    "Skipping undecodable message: {}",
                    e
                );
            }
        }

        self.commit(&message).await;
    }

    async fn commit(&mut self, message: &InboundMessage) {
        match self.stream.commit(message).await {
            Ok(()) => self.metrics.record_commit(message.offset),
            Err(e) => {
                // Not retried: the next successful commit on this partition covers it
                self.metrics.increment_commit_errors();
                log_commit_error(message, &e);
            }
        }
    }
}

fn log_commit_error(message: &InboundMessage, e: &ConsumerError) {
    error!(
        partition = message.partition,
        offset = message.offset,
        "Error committing offset: {}",
        e
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consumer::error::ConsumerResult;
    use parking_lot::Mutex;
    use std::collections::VecDeque;

    /// Scripted stream: yields queued results, then blocks forever
    struct ScriptedStream {
        script: VecDeque<ConsumerResult<InboundMessage>>,
        commits: Arc<Mutex<Vec<i64>>>,
    }

    #[async_trait::async_trait]
    impl MessageStream for ScriptedStream {
        async fn fetch(&mut self) -> ConsumerResult<InboundMessage> {
            match self.script.pop_front() {
                Some(result) => result,
                None => std::future::pending().await,
            }
        }

        async fn commit(&mut self, message: &InboundMessage) -> ConsumerResult<()> {
            self.commits.lock().push(message.offset);
            Ok(())
        }
    }

    fn message(offset: i64, payload: &[u8]) -> InboundMessage {
        InboundMessage {
            topic: "news-updates".to_string(),
            partition: 0,
            offset,
            key: None,
            payload: Some(payload.to_vec()),
            timestamp: None,
        }
    }

    #[tokio::test]
    async fn test_fetch_error_does_not_commit() {
        let commits = Arc::new(Mutex::new(Vec::new()));
        let stream = ScriptedStream {
            script: VecDeque::from(vec![Err(ConsumerError::FetchError("broker down".into()))]),
            commits: commits.clone(),
        };
        let store = Arc::new(WindowStore::new(10));
        let mut consumer = ArticleConsumer::new(stream, store, Duration::from_millis(1));
        let metrics = consumer.metrics();

        let shutdown = Shutdown::new();
        let stopper = shutdown.clone();
        let handle = tokio::spawn(async move {
            consumer.run(&stopper).await;
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        shutdown.trigger();
        tokio::time::timeout(Duration::from_secs(1), handle)
            .await
            .unwrap()
            .unwrap();

        assert_eq!(metrics.snapshot().fetch_errors, 1);
        assert!(commits.lock().is_empty());
    }

    #[tokio::test]
    async fn test_exits_immediately_when_already_stopped() {
        let stream = ScriptedStream {
            script: VecDeque::from(vec![Ok(message(0, b"{}"))]),
            commits: Arc::new(Mutex::new(Vec::new())),
        };
        let mut consumer =
            ArticleConsumer::new(stream, Arc::new(WindowStore::new(1)), Duration::from_millis(1));
        let shutdown = Shutdown::new();
        shutdown.trigger();

        tokio::time::timeout(Duration::from_millis(200), consumer.run(&shutdown))
            .await
            .unwrap();
        assert_eq!(consumer.metrics().snapshot().consumed, 0);
    }
}
