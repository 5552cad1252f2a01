use crate::normalizer::FeedNormalizer;
use crate::traits::FeedSource;
use crate::types::{AggregationRequest, AggregatorError, CanonicalPost, Result};
use futures::future::join_all;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Fans a request out over its sources and folds the results into one
/// deduplicated, bounded post list. Holds no state between calls.
pub struct Aggregator {
    source: Arc<dyn FeedSource>,
    fetch_timeout: Duration,
}

impl Aggregator {
    pub fn new(source: Arc<dyn FeedSource>, fetch_timeout: Duration) -> Self {
        Self { source, fetch_timeout }
    }

    /// Never fails: a source that errors is logged and contributes nothing.
    pub async fn aggregate(&self, request: &AggregationRequest) -> Vec<CanonicalPost> {
        if request.count == 0 || request.sources.is_empty() {
            return Vec::new();
        }

        let fetches = request
            .sources
            .iter()
            .map(|url| self.collect_source(url, request));

        // join_all yields results in source-list order regardless of which
        // fetch finished first.
        let per_source = join_all(fetches).await;

        let total_sources = per_source.len();
        let mut failed_sources = 0;
        let mut posts = Vec::new();
        for (url, result) in request.sources.iter().zip(per_source) {
            match result {
                Ok(mut batch) => {
                    debug!("Collected {} posts from {}", batch.len(), url);
                    posts.append(&mut batch);
                }
                Err(e) => {
                    failed_sources += 1;
                    warn!("Skipping source {}: {}", url, e);
                }
            }
        }

        if failed_sources == total_sources {
            warn!("All {} sources failed; returning an empty result", total_sources);
        }

        if let Some(keyword) = &request.keyword {
            posts = filter_by_keyword(posts, keyword);
        }

        let mut posts = dedupe_by_title(posts);
        posts.truncate(request.count);

        info!(
            "Aggregated {} posts from {}/{} sources",
            posts.len(),
            total_sources - failed_sources,
            total_sources
        );
        posts
    }

    async fn collect_source(&self, url: &str, request: &AggregationRequest) -> Result<Vec<CanonicalPost>> {
        let items = tokio::time::timeout(self.fetch_timeout, self.source.fetch(url))
            .await
            .map_err(|_| AggregatorError::feed_fetch(url, format!("timed out after {:?}", self.fetch_timeout)))??;

        Ok(items
            .iter()
            .take(request.count)
            .map(|item| FeedNormalizer::normalize(item, url, &request.placeholder_title))
            .collect())
    }
}

/// Keep posts whose title or description contains `keyword`, ignoring case.
pub fn filter_by_keyword(posts: Vec<CanonicalPost>, keyword: &str) -> Vec<CanonicalPost> {
    let needle = keyword.to_lowercase();
    posts
        .into_iter()
        .filter(|post| {
            post.title.to_lowercase().contains(&needle)
                || post.description.to_lowercase().contains(&needle)
        })
        .collect()
}

/// First occurrence of each lowercased title wins.
pub fn dedupe_by_title(posts: Vec<CanonicalPost>) -> Vec<CanonicalPost> {
    let before = posts.len();
    let mut seen_titles = HashSet::new();
    let unique: Vec<CanonicalPost> = posts
        .into_iter()
        .filter(|post| seen_titles.insert(post.title.to_lowercase()))
        .collect();

    let removed = before - unique.len();
    if removed > 0 {
        debug!("Removed {} duplicate posts", removed);
    }
    unique
}
