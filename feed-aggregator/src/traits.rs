use crate::types::{RawFeedItem, Result};
use async_trait::async_trait;

/// Anything that can turn a source URL into raw feed items.
///
/// Implementations report every failure (network, status, parse) as
/// `AggregatorError::FeedFetch` carrying the URL; they never retry.
#[async_trait]
pub trait FeedSource: Send + Sync {
    /// Human-readable name for this source implementation
    fn source_name(&self) -> &str;

    /// Fetch and parse the document behind `url`
    async fn fetch(&self, url: &str) -> Result<Vec<RawFeedItem>>;
}
