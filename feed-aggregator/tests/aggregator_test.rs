mod common;

use common::{init_tracing, item, item_with_enclosure, StubSource};
use feed_aggregator::{AggregationRequest, Aggregator, FeedNormalizer, RawFeedItem};
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

const FEED_A: &str = "https://feeds.example.com/a.rss";
const FEED_B: &str = "https://www.other.example.org/b.xml";

fn aggregator(source: StubSource) -> Aggregator {
    Aggregator::new(Arc::new(source), Duration::from_secs(5))
}

fn request(sources: &[&str], count: usize) -> AggregationRequest {
    AggregationRequest::new(sources.iter().map(|s| s.to_string()).collect(), count, "Untitled Meme")
}

#[tokio::test]
async fn test_failing_source_is_isolated() {
    init_tracing();

    let source = StubSource::new()
        .with_failure(FEED_A, "503 Service Unavailable")
        .with_items(FEED_B, vec![item("One"), item("Two"), item("Three")]);

    let posts = aggregator(source).aggregate(&request(&[FEED_A, FEED_B], 10)).await;

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["One", "Two", "Three"]);
    assert!(posts.iter().all(|p| p.source == "other.example.org"));
}

#[tokio::test]
async fn test_total_failure_yields_empty_list() {
    init_tracing();

    let source = StubSource::new().with_failure(FEED_A, "dns error");
    let posts = aggregator(source).aggregate(&request(&[FEED_A, FEED_B], 10)).await;

    assert!(posts.is_empty());
}

#[tokio::test]
async fn test_duplicate_title_keeps_first_occurrence() {
    init_tracing();

    let mut second = item("Cat meme");
    second.snippet_text = Some("a completely different body".to_string());

    let source = StubSource::new().with_items(
        FEED_A,
        vec![item_with_enclosure("Cat meme", "http://x.com/a.jpg"), second],
    );

    let posts = aggregator(source).aggregate(&request(&[FEED_A], 5)).await;

    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].title, "Cat meme");
    assert_eq!(posts[0].thumbnail.as_deref(), Some("http://x.com/a.jpg"));
}

#[tokio::test]
async fn test_dedupe_is_case_insensitive_across_sources() {
    init_tracing();

    let source = StubSource::new()
        .with_items(FEED_A, vec![item("Dog Meme"), item("Unique A")])
        .with_items(FEED_B, vec![item("dog meme"), item("DOG MEME"), item("Unique B")]);

    let posts = aggregator(source).aggregate(&request(&[FEED_A, FEED_B], 10)).await;

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Dog Meme", "Unique A", "Unique B"]);
    assert_eq!(posts[0].source, "feeds.example.com");

    let lowered: HashSet<String> = posts.iter().map(|p| p.title.to_lowercase()).collect();
    assert_eq!(lowered.len(), posts.len());
}

#[tokio::test]
async fn test_output_follows_source_order_not_completion_order() {
    init_tracing();

    // The first source answers last.
    let source = StubSource::new()
        .with_delayed_items(FEED_A, vec![item("Slow 1"), item("Slow 2")], Duration::from_millis(150))
        .with_items(FEED_B, vec![item("Fast 1")]);

    let posts = aggregator(source).aggregate(&request(&[FEED_A, FEED_B], 10)).await;

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Slow 1", "Slow 2", "Fast 1"]);
}

#[tokio::test]
async fn test_count_bounds_every_stage() {
    init_tracing();

    let many: Vec<RawFeedItem> = (0..20).map(|i| item(&format!("Post {}", i))).collect();
    let source = StubSource::new()
        .with_items(FEED_A, many.clone())
        .with_items(FEED_B, many);
    let aggregator = aggregator(source);

    for count in [0usize, 1, 3, 7, 25] {
        let posts = aggregator.aggregate(&request(&[FEED_A, FEED_B], count)).await;
        assert!(posts.len() <= count, "count {} produced {}", count, posts.len());
    }

    // Per-source cap: only the first 3 items of each source are considered,
    // and source B repeats source A's titles.
    let posts = aggregator.aggregate(&request(&[FEED_A, FEED_B], 3)).await;
    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Post 0", "Post 1", "Post 2"]);
}

#[tokio::test]
async fn test_keyword_filter_matches_title_or_description() {
    init_tracing();

    let mut described = item("Something else");
    described.snippet_text = Some("features a CAT in a box".to_string());

    let source = StubSource::new().with_items(
        FEED_A,
        vec![item("Cat stretches"), item("Dog sleeps"), described],
    );

    let request = request(&[FEED_A], 10).with_keyword(Some("cat".to_string()));
    let posts = aggregator(source).aggregate(&request).await;

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["Cat stretches", "Something else"]);
}

#[tokio::test]
async fn test_slow_source_times_out_without_sinking_others() {
    init_tracing();

    let source = StubSource::new()
        .with_delayed_items(FEED_A, vec![item("Too late")], Duration::from_secs(2))
        .with_items(FEED_B, vec![item("On time")]);
    let aggregator = Aggregator::new(Arc::new(source), Duration::from_millis(100));

    let posts = aggregator.aggregate(&request(&[FEED_A, FEED_B], 10)).await;

    let titles: Vec<&str> = posts.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(titles, vec!["On time"]);
}

#[test]
fn test_normalize_is_idempotent_and_applies_defaults() {
    let bare = RawFeedItem::default();
    let first = FeedNormalizer::normalize(&bare, "not a url", "Untitled Meme");
    let second = FeedNormalizer::normalize(&bare, "not a url", "Untitled Meme");

    assert_eq!(first, second);
    assert_eq!(first.title, "Untitled Meme");
    assert_eq!(first.description, "");
    assert_eq!(first.link, "#");
    assert_eq!(first.pub_date, "");
    assert_eq!(first.source, "Unknown");
    assert_eq!(first.thumbnail, None);
}

#[test]
fn test_normalize_prefers_snippet_over_markup() {
    let raw = RawFeedItem {
        title: Some("  Spaced title  ".to_string()),
        description_html: Some("<p>Marked <b>up</b></p>".to_string()),
        snippet_text: Some("Plain text".to_string()),
        published_at: Some("Mon, 01 Jan 2024 10:00:00 +0000".to_string()),
        ..Default::default()
    };
    let post = FeedNormalizer::normalize(&raw, "https://WWW.Example.com/feed", "Untitled");

    assert_eq!(post.title, "Spaced title");
    assert_eq!(post.description, "Plain text");
    assert_eq!(post.pub_date, "2024-01-01T10:00:00+00:00");
    assert_eq!(post.source, "example.com");

    let markup_only = RawFeedItem {
        description_html: Some("<p>Marked <b>up</b></p>".to_string()),
        ..Default::default()
    };
    let post = FeedNormalizer::normalize(&markup_only, "https://example.com/feed", "Untitled");
    assert_eq!(post.description, "Marked up");
}
