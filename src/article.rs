//! Article model shared by the scraper and the API
//!
//! An [`Article`] is the unit of content that travels over the topic. Its `id`
//! is derived from the canonical URL so that re-scraping an unchanged listing
//! yields identical IDs.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use url::Url;

/// Validation errors for articles
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ArticleError {
    /// Title is empty after trimming
    #[error("article {id} has an empty title")]
    EmptyTitle {
        /// ID of the offending article
        id: String,
    },

    /// ID is empty
    #[error("article has an empty id")]
    EmptyId,

    /// URL is not an absolute URL
    #[error("article {id} has a non-absolute url '{url}'")]
    RelativeUrl {
        /// ID of the offending article
        id: String,
        /// The rejected URL
        url: String,
    },
}

/// A news article
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Article {
    /// Stable identifier derived from the canonical URL
    pub id: String,
    /// Trimmed, non-empty headline
    pub title: String,
    /// Absolute article URL
    pub url: String,
    /// Origin name, e.g. `VnExpress`
    pub source: String,
    /// Publication instant, or the fetch instant when the page has none
    pub published: DateTime<Utc>,
    /// Body text, possibly empty
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub content: String,
}

impl Article {
    /// Build an article from listing data, deriving its ID from `url`.
    ///
    /// `published` falls back to the current instant when `None`.
    pub fn new(
        source: impl Into<String>,
        title: &str,
        url: impl Into<String>,
        published: Option<DateTime<Utc>>,
    ) -> Self {
        let source = source.into();
        let url = url.into();
        Self {
            id: generate_id(&source, &url),
            title: title.trim().to_string(),
            url,
            source,
            published: published.unwrap_or_else(Utc::now),
            content: String::new(),
        }
    }

    /// Attach body text
    pub fn with_content(mut self, content: impl Into<String>) -> Self {
        self.content = content.into();
        self
    }

    /// Check the model invariants: non-empty id and title, absolute url
    pub fn validate(&self) -> Result<(), ArticleError> {
        if self.id.is_empty() {
            return Err(ArticleError::EmptyId);
        }
        if self.title.trim().is_empty() {
            return Err(ArticleError::EmptyTitle {
                id: self.id.clone(),
            });
        }
        match Url::parse(&self.url) {
            Ok(parsed) if parsed.has_host() => Ok(()),
            _ => Err(ArticleError::RelativeUrl {
                id: self.id.clone(),
                url: self.url.clone(),
            }),
        }
    }
}

/// Derive a deterministic article ID from its source tag and URL.
///
/// The URL is base64url-encoded rather than rewritten, so distinct URLs
/// always map to distinct IDs.
pub fn generate_id(source: &str, url: &str) -> String {
    format!(
        "{}-{}",
        source.to_ascii_lowercase(),
        URL_SAFE_NO_PAD.encode(url.as_bytes())
    )
}
