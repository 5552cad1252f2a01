use crate::fetcher::Fetcher;
use crate::sources::synthetic::{SyntheticSource, SYNTHETIC_SCHEME};
use crate::traits::FeedSource;
use crate::types::{AggregatorError, FetchConfig, RawFeedItem, Result};
use async_trait::async_trait;
use tracing::debug;
use url::Url;

/// Routes `synthetic://` URLs to the [`SyntheticSource`] and everything
/// else to the HTTP [`Fetcher`].
pub struct SourceRouter {
    http: Fetcher,
    synthetic: SyntheticSource,
}

impl SourceRouter {
    pub fn new(config: FetchConfig) -> Result<Self> {
        Ok(Self {
            http: Fetcher::new(config)?,
            synthetic: SyntheticSource::default(),
        })
    }

    pub fn with_synthetic(mut self, synthetic: SyntheticSource) -> Self {
        self.synthetic = synthetic;
        self
    }

    fn route(&self, url: &str) -> Result<&dyn FeedSource> {
        let parsed = Url::parse(url)?;
        match parsed.scheme() {
            "http" | "https" => Ok(&self.http),
            scheme if scheme == SYNTHETIC_SCHEME => Ok(&self.synthetic),
            other => Err(AggregatorError::UnsupportedScheme(other.to_string())),
        }
    }
}

#[async_trait]
impl FeedSource for SourceRouter {
    fn source_name(&self) -> &str {
        "router"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        let source = self.route(url).map_err(|e| AggregatorError::feed_fetch(url, e))?;
        debug!("Routing {} to {} source", url, source.source_name());
        source.fetch(url).await
    }
}
