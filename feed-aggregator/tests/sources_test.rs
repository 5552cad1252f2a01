mod common;

use common::init_tracing;
use feed_aggregator::{
    AggregationRequest, Aggregator, AggregatorError, FeedSource, FetchConfig, Fetcher, SourceRouter,
    SyntheticSource,
};
use std::sync::Arc;
use std::time::Duration;

#[test]
fn test_synthetic_items_are_labelled() {
    let source = SyntheticSource::new(3);
    let items = tokio_test::block_on(source.fetch("synthetic://social/memes")).expect("synthetic fetch");

    assert_eq!(items.len(), 3);
    for item in &items {
        assert!(item.title.as_deref().is_some_and(|t| t.starts_with("[synthetic] ")));
        assert!(item.snippet_text.as_deref().is_some_and(|s| s.contains("Synthetic memes post")));
        assert_eq!(item.link, None);
        assert_eq!(item.enclosure_url, None);
        assert!(item.media_thumbnails.is_empty());
    }
}

#[test]
fn test_synthetic_rejects_other_schemes() {
    let source = SyntheticSource::default();
    let err = tokio_test::block_on(source.fetch("https://example.com/feed")).expect_err("wrong scheme");
    assert!(matches!(err, AggregatorError::FeedFetch { .. }));
}

#[tokio::test]
async fn test_router_rejects_unsupported_scheme() {
    init_tracing();

    let router = SourceRouter::new(FetchConfig::default()).expect("client builds");
    for url in ["ftp://files.example.com/feed.xml", "not a url at all"] {
        match router.fetch(url).await {
            Err(AggregatorError::FeedFetch { url: failed, .. }) => assert_eq!(failed, url),
            other => panic!("{} gave {:?}", url, other),
        }
    }
}

#[tokio::test]
async fn test_router_serves_synthetic_through_aggregator() {
    init_tracing();

    let router = SourceRouter::new(FetchConfig::default())
        .expect("client builds")
        .with_synthetic(SyntheticSource::new(4));
    let aggregator = Aggregator::new(Arc::new(router), Duration::from_secs(5));

    let request = AggregationRequest::new(vec!["synthetic://social/memes".to_string()], 10, "Untitled Post");
    let posts = aggregator.aggregate(&request).await;

    assert!(!posts.is_empty() && posts.len() <= 4);
    for post in &posts {
        assert!(post.title.starts_with("[synthetic] "));
        assert_eq!(post.link, "#");
        assert_eq!(post.thumbnail, None);
        assert_eq!(post.source, "social");
    }
}

#[tokio::test]
async fn test_fetcher_rejects_non_http_urls_without_a_request() {
    init_tracing();

    let fetcher = Fetcher::new(FetchConfig::default()).expect("client builds");
    assert_eq!(fetcher.config().max_feed_bytes(), 10 * 1024 * 1024);

    let err = fetcher
        .fetch_feed("file:///etc/passwd")
        .await
        .expect_err("file URLs are not fetched");
    assert!(matches!(err, AggregatorError::FeedFetch { .. }));
}

#[test]
fn test_fetch_config_defaults() {
    let config = FetchConfig::default();
    assert_eq!(config.user_agent, "Feed-Aggregator/1.0");
    assert_eq!(config.timeout(), Duration::from_secs(15));
    assert_eq!(config.max_redirects, 5);
}
