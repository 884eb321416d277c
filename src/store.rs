//! Bounded window of the most recently admitted articles
//!
//! The consumer is the only writer; HTTP handlers are readers. The id-mapping
//! is pruned together with the ordered sequence, so memory stays bounded by
//! the window capacity for the lifetime of the process.

use crate::article::Article;
use parking_lot::RwLock;
use std::collections::{HashMap, VecDeque};
use tracing::debug;

/// Outcome of [`WindowStore::add`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddOutcome {
    /// Article was admitted
    Admitted,
    /// Article was admitted and the oldest entry was evicted to make room
    AdmittedWithEviction,
    /// An article with the same ID is already in the window
    Duplicate,
}

impl AddOutcome {
    /// Whether the article entered the window
    pub fn is_admitted(self) -> bool {
        !matches!(self, AddOutcome::Duplicate)
    }
}

/// Bounded FIFO of recent articles with ID-based dedup
#[derive(Debug)]
pub struct WindowStore {
    capacity: usize,
    inner: RwLock<WindowInner>,
}

#[derive(Debug)]
struct WindowInner {
    /// id -> article, same key set as `order`
    by_id: HashMap<String, Article>,
    /// Admission order, oldest first
    order: VecDeque<String>,
    /// Number of admissions since construction
    admitted: usize,
}

impl WindowStore {
    /// Create a store holding at most `capacity` articles.
    ///
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            inner: RwLock::new(WindowInner {
                by_id: HashMap::with_capacity(capacity),
                order: VecDeque::with_capacity(capacity),
                admitted: 0,
            }),
        }
    }

    /// Admit an article unless its ID is already present (first write wins).
    ///
    /// When the window is full the oldest article is evicted from both the
    /// sequence and the mapping.
    pub fn add(&self, article: Article) -> AddOutcome {
        let mut inner = self.inner.write();

        if inner.by_id.contains_key(&article.id) {
            return AddOutcome::Duplicate;
        }

        let mut outcome = AddOutcome::Admitted;
        if inner.order.len() >= self.capacity {
            if let Some(oldest) = inner.order.pop_front() {
                inner.by_id.remove(&oldest);
                debug!(article_id = %oldest, "Evicted article from window");
                outcome = AddOutcome::AdmittedWithEviction;
            }
        }

        inner.order.push_back(article.id.clone());
        inner.by_id.insert(article.id.clone(), article);
        inner.admitted += 1;
        outcome
    }

    /// Snapshot of the window, oldest first
    pub fn latest(&self) -> Vec<Article> {
        let inner = self.inner.read();
        inner
            .order
            .iter()
            .filter_map(|id| inner.by_id.get(id).cloned())
            .collect()
    }

    /// Number of articles admitted since construction
    pub fn count(&self) -> usize {
        self.inner.read().admitted
    }

    /// Look up an article currently in the window
    pub fn get(&self, id: &str) -> Option<Article> {
        self.inner.read().by_id.get(id).cloned()
    }

    /// Number of articles currently in the window
    pub fn len(&self) -> usize {
        self.inner.read().order.len()
    }

    /// Whether the window is empty
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Maximum number of articles held
    pub fn capacity(&self) -> usize {
        self.capacity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use pretty_assertions::assert_eq;

    fn article(id: &str, title: &str) -> Article {
        Article {
            id: id.to_string(),
            title: title.to_string(),
            url: format!("https://example.com/{}", id),
            source: "test".to_string(),
            published: Utc::now(),
            content: String::new(),
        }
    }

    fn ids(store: &WindowStore) -> Vec<String> {
        store.latest().into_iter().map(|a| a.id).collect()
    }

    #[test]
    fn test_duplicate_ids_are_ignored() {
        let store = WindowStore::new(10);
        assert_eq!(store.add(article("a", "T")), AddOutcome::Admitted);
        assert_eq!(store.add(article("a", "T")), AddOutcome::Duplicate);
        assert_eq!(store.add(article("b", "U")), AddOutcome::Admitted);

        assert_eq!(ids(&store), vec!["a", "b"]);
        assert_eq!(store.count(), 2);
    }

    #[test]
    fn test_first_write_wins() {
        let store = WindowStore::new(10);
        store.add(article("a", "first"));
        store.add(article("a", "second"));
        assert_eq!(store.get("a").unwrap().title, "first");
    }

    #[test]
    fn test_eviction_keeps_most_recent() {
        let store = WindowStore::new(2);
        store.add(article("a", "A"));
        store.add(article("b", "B"));
        assert_eq!(
            store.add(article("c", "C")),
            AddOutcome::AdmittedWithEviction
        );

        assert_eq!(ids(&store), vec!["b", "c"]);
        assert_eq!(store.count(), 3);
        assert_eq!(store.len(), 2);
        assert!(store.get("a").is_none());
    }

    #[test]
    fn test_latest_is_a_copy() {
        let store = WindowStore::new(4);
        store.add(article("a", "A"));

        let mut snapshot = store.latest();
        snapshot[0].title = "mutated".to_string();
        snapshot.clear();

        assert_eq!(store.latest()[0].title, "A");
    }

    #[test]
    fn test_zero_capacity_is_raised() {
        let store = WindowStore::new(0);
        assert_eq!(store.capacity(), 1);
        store.add(article("a", "A"));
        store.add(article("b", "B"));
        assert_eq!(ids(&store), vec!["b"]);
        assert!(!store.is_empty());
    }
}
