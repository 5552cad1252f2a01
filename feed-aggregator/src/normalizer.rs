use crate::extractor::ThumbnailExtractor;
use crate::rss_utils;
use crate::types::{CanonicalPost, RawFeedItem};
use chrono::DateTime;

/// Maps raw feed items onto [`CanonicalPost`]. Each field degrades to its
/// default on its own; nothing here can fail.
pub struct FeedNormalizer;

impl FeedNormalizer {
    pub fn normalize(item: &RawFeedItem, source_url: &str, placeholder_title: &str) -> CanonicalPost {
        CanonicalPost {
            title: non_blank(item.title.as_deref())
                .map(|t| t.to_string())
                .unwrap_or_else(|| placeholder_title.to_string()),
            description: description(item),
            link: non_blank(item.link.as_deref())
                .map(|l| l.to_string())
                .unwrap_or_else(|| "#".to_string()),
            pub_date: item
                .published_at
                .as_deref()
                .and_then(|d| non_blank(Some(d)))
                .map(normalize_date)
                .unwrap_or_default(),
            source: rss_utils::url::source_label(source_url),
            thumbnail: ThumbnailExtractor::extract(item),
        }
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

fn description(item: &RawFeedItem) -> String {
    if let Some(snippet) = non_blank(item.snippet_text.as_deref()) {
        return snippet.to_string();
    }

    item.description_html
        .as_deref()
        .map(rss_utils::feed::extract_text_from_html)
        .unwrap_or_default()
}

/// RFC 2822 (RSS) and RFC 3339 (Atom) dates come out as RFC 3339; anything
/// else is passed through as the feed wrote it.
fn normalize_date(raw: &str) -> String {
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .map(|d| d.to_rfc3339())
        .unwrap_or_else(|_| raw.to_string())
}
