//! VnExpress listing and article scraper

use crate::article::Article;
use crate::error::FetchError;
use crate::scraper::config::FetcherConfig;
use crate::scraper::ArticleSource;
use ::scraper::{Html, Selector};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveTime, TimeZone, Utc};
use reqwest::{Client, StatusCode};
use tracing::{debug, info, warn};
use url::Url;

const ITEM_SELECTOR: &str = "article.item-news";
const LINK_SELECTOR: &str = "h3.title-news a, h2.title-news a";
const TIME_SELECTOR: &str = "span.time, p.description";
const BODY_SELECTOR: &str = "article.fck_detail p";

/// Vietnam local time, in which the site prints its timestamps
const SITE_UTC_OFFSET_SECS: i32 = 7 * 3600;

#[derive(Debug)]
struct Selectors {
    item: Selector,
    link: Selector,
    time: Selector,
    body: Selector,
}

impl Selectors {
    fn compile() -> Result<Self, FetchError> {
        Ok(Self {
            item: compile(ITEM_SELECTOR)?,
            link: compile(LINK_SELECTOR)?,
            time: compile(TIME_SELECTOR)?,
            body: compile(BODY_SELECTOR)?,
        })
    }
}

fn compile(selector: &str) -> Result<Selector, FetchError> {
    Selector::parse(selector).map_err(|e| FetchError::Selector {
        selector: selector.to_string(),
        message: e.to_string(),
    })
}

/// Scrapes the VnExpress section listing and each linked article
#[derive(Debug)]
pub struct VnExpressSource {
    client: Client,
    config: FetcherConfig,
    base: Url,
    selectors: Selectors,
}

impl VnExpressSource {
    /// Build the HTTP client and compile selectors
    pub fn new(config: FetcherConfig) -> Result<Self, FetchError> {
        config.validate().map_err(FetchError::ConfigError)?;

        let base = Url::parse(&config.base_url)
            .map_err(|e| FetchError::ConfigError(format!("invalid base_url: {}", e)))?;

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.request_timeout)
            .build()
            .map_err(|source| FetchError::Http {
                url: config.listing_url.clone(),
                source,
            })?;

        Ok(Self {
            client,
            base,
            selectors: Selectors::compile()?,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &FetcherConfig {
        &self.config
    }

    async fn get_page(&self, url: &str) -> Result<String, FetchError> {
        let http_err = |source| FetchError::Http {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(http_err)?;
        if response.status() != StatusCode::OK {
            return Err(FetchError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        response.text().await.map_err(http_err)
    }

    /// Extract articles from a listing page. Entries without a link or title
    /// are skipped; `fetched_at` stands in for unparseable timestamps.
    pub fn parse_listing(&self, html: &str, fetched_at: DateTime<Utc>) -> Vec<Article> {
        let document = Html::parse_document(html);
        let mut articles = Vec::new();

        for item in document.select(&self.selectors.item) {
            let Some(link) = item.select(&self.selectors.link).next() else {
                continue;
            };

            let Some(href) = link
                .value()
                .attr("href")
                .map(str::trim)
                .filter(|href| !href.is_empty())
            else {
                continue;
            };

            let mut title = link.text().collect::<String>();
            if title.trim().is_empty() {
                title = link.value().attr("title").unwrap_or_default().to_string();
            }
            if title.trim().is_empty() {
                continue;
            }

            let url = match self.base.join(href) {
                Ok(url) => url,
                Err(e) => {
                    debug!("Skipping unresolvable link '{}': {}", href, e);
                    continue;
                }
            };

            let published = item
                .select(&self.selectors.time)
                .find_map(|time| parse_published(&time.text().collect::<String>()))
                .unwrap_or(fetched_at);

            articles.push(Article::new(
                self.config.source.as_str(),
                &title,
                url.to_string(),
                Some(published),
            ));
        }

        articles
    }

    /// Extract body text: non-empty paragraphs separated by a blank line
    pub fn parse_body(&self, html: &str) -> String {
        let document = Html::parse_document(html);

        document
            .select(&self.selectors.body)
            .map(|p| p.text().collect::<String>())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

#[async_trait]
impl ArticleSource for VnExpressSource {
    fn name(&self) -> &str {
        &self.config.source
    }

    async fn list_latest(&self) -> Result<Vec<Article>, FetchError> {
        let html = self.get_page(&self.config.listing_url).await?;
        let listed = self.parse_listing(&html, Utc::now());
        info!("Found {} articles on {}", listed.len(), self.config.listing_url);

        let mut articles = Vec::with_capacity(listed.len());
        for article in listed {
            match self.fetch_body(&article.url).await {
                Ok(content) => articles.push(article.with_content(content)),
                Err(e) => {
                    warn!(article_id = %article.id, "Failed to fetch article body: {}", e);
                    articles.push(article);
                }
            }
        }

        Ok(articles)
    }

    async fn fetch_body(&self, url: &str) -> Result<String, FetchError> {
        let html = self.get_page(url).await?;
        Ok(self.parse_body(&html))
    }
}

/// Best-effort parse of a listing timestamp.
///
/// Accepts RFC 3339, or the site's `dd/mm/yyyy, HH:MM` (local time, UTC+7)
/// anywhere in a comma-separated string such as
/// `Thứ hai, 17/10/2026, 08:30 (GMT+7)`.
pub fn parse_published(text: &str) -> Option<DateTime<Utc>> {
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    if let Ok(ts) = DateTime::parse_from_rfc3339(text) {
        return Some(ts.with_timezone(&Utc));
    }

    let parts: Vec<&str> = text.split(',').map(str::trim).collect();
    parts.windows(2).find_map(|pair| {
        let date = NaiveDate::parse_from_str(pair[0], "%d/%m/%Y").ok()?;
        let clock = pair[1].split_whitespace().next()?;
        let time = NaiveTime::parse_from_str(clock, "%H:%M").ok()?;
        let offset = FixedOffset::east_opt(SITE_UTC_OFFSET_SECS)?;
        offset
            .from_local_datetime(&date.and_time(time))
            .single()
            .map(|local| local.with_timezone(&Utc))
    })
}
