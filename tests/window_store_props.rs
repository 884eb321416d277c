//! Property and concurrency tests for the latest-articles window

use newswire::{Article, WindowStore};
use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::collections::VecDeque;
use std::sync::Arc;
use std::thread;

fn article(n: u32) -> Article {
    Article::new(
        "VnExpress",
        &format!("Story {}", n),
        format!("https://vnexpress.net/story-{}.html", n),
        None,
    )
}

fn ids(articles: &[Article]) -> Vec<String> {
    articles.iter().map(|a| a.id.clone()).collect()
}

/// Reference model: a FIFO of at most `capacity` distinct IDs
fn model(capacity: usize, inserts: &[u32]) -> (Vec<String>, usize) {
    let mut window: VecDeque<String> = VecDeque::new();
    let mut admitted = 0;
    for &n in inserts {
        let id = article(n).id;
        if window.contains(&id) {
            continue;
        }
        if window.len() == capacity {
            window.pop_front();
        }
        window.push_back(id);
        admitted += 1;
    }
    (window.into_iter().collect(), admitted)
}

proptest! {
    #[test]
    fn window_is_bounded_distinct_and_ordered(
        capacity in 1usize..8,
        inserts in prop::collection::vec(0u32..12, 0..64)
    ) {
        let store = WindowStore::new(capacity);
        for &n in &inserts {
            store.add(article(n));
        }

        let latest = store.latest();
        prop_assert!(latest.len() <= capacity);

        let mut seen = std::collections::HashSet::new();
        for a in &latest {
            prop_assert!(seen.insert(a.id.clone()), "duplicate id {}", a.id);
        }

        let (expected, admitted) = model(capacity, &inserts);
        prop_assert_eq!(ids(&latest), expected);
        prop_assert_eq!(store.count(), admitted);
        prop_assert_eq!(store.len(), latest.len());
    }

    #[test]
    fn repeated_add_is_idempotent(
        capacity in 1usize..8,
        prefix in prop::collection::vec(0u32..12, 0..32),
        n in 0u32..12
    ) {
        let once = WindowStore::new(capacity);
        let twice = WindowStore::new(capacity);
        for &p in &prefix {
            once.add(article(p));
            twice.add(article(p));
        }

        once.add(article(n));
        twice.add(article(n));
        twice.add(article(n));

        prop_assert_eq!(ids(&once.latest()), ids(&twice.latest()));
        prop_assert_eq!(once.count(), twice.count());
    }

    #[test]
    fn latest_is_an_independent_copy(inserts in prop::collection::vec(0u32..12, 1..32)) {
        let store = WindowStore::new(5);
        for &n in &inserts {
            store.add(article(n));
        }

        let before = ids(&store.latest());
        let mut snapshot = store.latest();
        snapshot.clear();
        snapshot.push(article(999));

        prop_assert_eq!(ids(&store.latest()), before);
    }
}

#[test]
fn dedup_scenario() {
    let store = WindowStore::new(10);
    let a = article(1);
    let b = article(2);

    store.add(a.clone());
    store.add(a.clone());
    store.add(b.clone());

    assert_eq!(ids(&store.latest()), vec![a.id, b.id]);
    assert_eq!(store.count(), 2);
}

#[test]
fn eviction_scenario() {
    let store = WindowStore::new(2);
    let (a, b, c) = (article(1), article(2), article(3));

    store.add(a);
    store.add(b.clone());
    store.add(c.clone());

    assert_eq!(ids(&store.latest()), vec![b.id, c.id]);
    assert_eq!(store.count(), 3);
}

#[test]
fn concurrent_readers_see_contiguous_windows() {
    const CAPACITY: usize = 8;
    const WRITES: u32 = 2_000;

    let store = Arc::new(WindowStore::new(CAPACITY));
    let order: Vec<String> = (0..WRITES).map(|n| article(n).id).collect();
    let articles: Vec<Article> = (0..WRITES).map(article).collect();

    let writer = {
        let store = store.clone();
        thread::spawn(move || {
            for a in articles {
                store.add(a);
            }
        })
    };

    let readers: Vec<_> = (0..4)
        .map(|_| {
            let store = store.clone();
            let order = order.clone();
            thread::spawn(move || {
                for _ in 0..500 {
                    let snapshot = ids(&store.latest());
                    let Some(first) = snapshot.first() else {
                        continue;
                    };

                    // Every snapshot must equal the window after some prefix
                    // of the serial write sequence
                    let start = order.iter().position(|id| id == first).unwrap();
                    let end = start + snapshot.len();
                    assert_eq!(snapshot.as_slice(), &order[start..end]);
                    assert!(snapshot.len() == CAPACITY || start == 0);
                }
            })
        })
        .collect();

    writer.join().unwrap();
    for reader in readers {
        reader.join().unwrap();
    }

    assert_eq!(store.latest().len(), CAPACITY);
    assert_eq!(store.count(), WRITES as usize);
}
