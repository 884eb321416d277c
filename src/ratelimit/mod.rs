//! Per-client token-bucket rate limiting
//!
//! - [`TokenBucket`]: the refill/consume primitive
//! - [`RateLimiter`]: one bucket per client plus a background sweeper that
//!   forgets idle clients
//! - [`rate_limit`]: axum middleware answering 429 when a bucket is empty

pub mod bucket;
pub mod config;
pub mod limiter;
pub mod middleware;

pub use bucket::TokenBucket;
pub use config::{ClientIpPolicy, RateLimitConfig};
pub use limiter::RateLimiter;
pub use middleware::{client_id, rate_limit};
