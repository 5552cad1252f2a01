#![allow(dead_code)]

use async_trait::async_trait;
use feed_aggregator::{AggregatorError, FeedSource, RawFeedItem, Result};
use std::collections::HashMap;
use std::sync::Once;
use std::time::Duration;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

enum StubFeed {
    Items { items: Vec<RawFeedItem>, delay: Duration },
    Fail(String),
}

/// In-memory `FeedSource` keyed by URL. Unknown URLs fail like a dead host.
#[derive(Default)]
pub struct StubSource {
    feeds: HashMap<String, StubFeed>,
}

impl StubSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_items(self, url: &str, items: Vec<RawFeedItem>) -> Self {
        self.with_delayed_items(url, items, Duration::ZERO)
    }

    pub fn with_delayed_items(mut self, url: &str, items: Vec<RawFeedItem>, delay: Duration) -> Self {
        self.feeds.insert(url.to_string(), StubFeed::Items { items, delay });
        self
    }

    pub fn with_failure(mut self, url: &str, cause: &str) -> Self {
        self.feeds.insert(url.to_string(), StubFeed::Fail(cause.to_string()));
        self
    }
}

#[async_trait]
impl FeedSource for StubSource {
    fn source_name(&self) -> &str {
        "stub"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        match self.feeds.get(url) {
            Some(StubFeed::Items { items, delay }) => {
                if !delay.is_zero() {
                    tokio::time::sleep(*delay).await;
                }
                Ok(items.clone())
            }
            Some(StubFeed::Fail(cause)) => Err(AggregatorError::feed_fetch(url, cause)),
            None => Err(AggregatorError::feed_fetch(url, "connection refused")),
        }
    }
}

pub fn item(title: &str) -> RawFeedItem {
    RawFeedItem {
        title: Some(title.to_string()),
        link: Some(format!("https://example.com/{}", title.to_lowercase().replace(' ', "-"))),
        snippet_text: Some(format!("About {}", title)),
        ..Default::default()
    }
}

pub fn item_with_enclosure(title: &str, enclosure: &str) -> RawFeedItem {
    RawFeedItem {
        enclosure_url: Some(enclosure.to_string()),
        ..item(title)
    }
}
