use crate::parser::FeedParser;
use crate::rss_utils;
use crate::traits::FeedSource;
use crate::types::{AggregatorError, FetchConfig, RawFeedItem, Result};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;
use tracing::{debug, info};

/// HTTP feed fetcher. One GET per call, no retries, no caching.
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout())
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    pub async fn fetch_feed(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        let start_time = Instant::now();
        debug!("Fetching feed: {}", url);

        if !rss_utils::url::is_valid_feed_url(url) {
            return Err(AggregatorError::feed_fetch(url, "not an http(s) URL"));
        }

        let body = self
            .fetch_body(url)
            .await
            .map_err(|e| AggregatorError::feed_fetch(url, e))?;

        let items = FeedParser::parse(&body).map_err(|e| AggregatorError::feed_fetch(url, e))?;

        info!(
            "Fetched feed: {} ({} bytes, {} items, {}ms)",
            url,
            body.len(),
            items.len(),
            start_time.elapsed().as_millis()
        );
        Ok(items)
    }

    async fn fetch_body(&self, url: &str) -> Result<Vec<u8>> {
        let response = self.client.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            return Err(AggregatorError::Status {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("Unknown").to_string(),
            });
        }

        let limit = self.config.max_feed_bytes();
        if let Some(content_length) = response.content_length() {
            if content_length as usize > limit {
                return Err(AggregatorError::FeedTooLarge {
                    size_bytes: content_length as usize,
                });
            }
        }

        let body = response.bytes().await?;
        if body.len() > limit {
            return Err(AggregatorError::FeedTooLarge { size_bytes: body.len() });
        }

        Ok(body.to_vec())
    }
}

#[async_trait]
impl FeedSource for Fetcher {
    fn source_name(&self) -> &str {
        "http"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        self.fetch_feed(url).await
    }
}
