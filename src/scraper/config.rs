//! Fetcher configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Settings for the news-site fetcher
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FetcherConfig {
    /// Listing page to scrape each tick
    pub listing_url: String,
    /// Base against which relative article links are resolved
    pub base_url: String,
    /// Source tag stamped on every article
    pub source: String,
    /// Per-request timeout on the HTTP client
    pub request_timeout: Duration,
    /// `User-Agent` header sent with every request
    pub user_agent: String,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            listing_url: "https://vnexpress.net/thoi-su".to_string(),
            base_url: "https://vnexpress.net".to_string(),
            source: "VnExpress".to_string(),
            request_timeout: Duration::from_secs(15),
            user_agent: concat!("newswire/", env!("CARGO_PKG_VERSION")).to_string(),
        }
    }
}

impl FetcherConfig {
    /// Validate the configuration
    pub fn validate(&self) -> Result<(), String> {
        for (name, value) in [("listing_url", &self.listing_url), ("base_url", &self.base_url)] {
            let parsed = url::Url::parse(value)
                .map_err(|e| format!("{} '{}' is not a valid URL: {}", name, value, e))?;
            if !parsed.has_host() {
                return Err(format!("{} '{}' must be absolute", name, value));
            }
        }

        if self.source.trim().is_empty() {
            return Err("source cannot be empty".to_string());
        }

        if self.request_timeout.is_zero() {
            return Err("request_timeout must be greater than 0".to_string());
        }

        Ok(())
    }
}
