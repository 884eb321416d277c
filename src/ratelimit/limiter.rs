//! Per-client limiter with idle-client eviction

use crate::ratelimit::bucket::TokenBucket;
use crate::ratelimit::config::RateLimitConfig;
use crate::shutdown::Shutdown;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Instant;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// Current instant on tokio's clock, so a paused test runtime also pauses
/// refill and eviction
fn now() -> Instant {
    tokio::time::Instant::now().into_std()
}

#[derive(Debug)]
struct ClientState {
    bucket: Arc<TokenBucket>,
    last_seen: Instant,
}

/// One token bucket per client, behind a single mutex.
///
/// The mutex only guards the map; the bucket decision runs after it is
/// released.
#[derive(Debug)]
pub struct RateLimiter {
    config: RateLimitConfig,
    clients: Mutex<HashMap<String, ClientState>>,
}

impl RateLimiter {
    /// Create a limiter with no known clients
    pub fn new(config: RateLimitConfig) -> Self {
        Self {
            config,
            clients: Mutex::new(HashMap::new()),
        }
    }

    /// Active configuration
    pub fn config(&self) -> &RateLimitConfig {
        &self.config
    }

    /// Decide whether `client` may make a request now
    pub fn allow(&self, client: &str) -> bool {
        self.allow_at(client, now())
    }

    /// Decide whether `client` may make a request at instant `now`
    pub fn allow_at(&self, client: &str, now: Instant) -> bool {
        let bucket = {
            let mut clients = self.clients.lock();
            let state = clients
                .entry(client.to_string())
                .or_insert_with(|| ClientState {
                    bucket: Arc::new(TokenBucket::new_at(self.config.rps, self.config.burst, now)),
                    last_seen: now,
                });
            state.last_seen = state.last_seen.max(now);
            state.bucket.clone()
        };

        bucket.allow_at(now)
    }

    /// Remove clients idle for longer than the TTL as of `now`; returns how many
    pub fn sweep(&self, now: Instant) -> usize {
        let ttl = self.config.idle_ttl;
        let mut clients = self.clients.lock();
        let before = clients.len();
        clients.retain(|client, state| {
            let keep = now.saturating_duration_since(state.last_seen) <= ttl;
            if !keep {
                debug!(client = %client, "Cleaned up inactive client");
            }
            keep
        });
        before - clients.len()
    }

    /// Number of clients currently tracked
    pub fn client_count(&self) -> usize {
        self.clients.lock().len()
    }

    /// Sweep every `sweep_interval` until `shutdown` fires
    pub fn spawn_sweeper(self: &Arc<Self>, shutdown: Shutdown) -> JoinHandle<()> {
        let limiter = Arc::clone(self);
        let period = self.config.sweep_interval;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval_at(tokio::time::Instant::now() + period, period);
            ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let removed = limiter.sweep(now());
                        if removed > 0 {
                            info!(
                                "Evicted {} idle rate-limit clients, {} remaining",
                                removed,
                                limiter.client_count()
                            );
                        }
                    }
                    _ = shutdown.triggered() => break,
                }
            }

            debug!("Rate-limit sweeper stopped");
        })
    }
}
