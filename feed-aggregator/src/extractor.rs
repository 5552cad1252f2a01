//! Best-effort thumbnail selection for a single raw feed item.
//!
//! Strategies run in a fixed priority order and the first one that finds a
//! structurally present candidate decides the outcome. The candidate is then
//! validated; a candidate that fails validation means "no thumbnail" for the
//! item, lower-priority strategies are not consulted.

use crate::types::{MediaContent, MediaThumbnail, RawFeedItem};
use regex::Regex;
use std::sync::LazyLock;
use tracing::debug;

static IMG_SRC_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?i)<img\b[^>]*?\ssrc\s*=\s*["']([^"']+)["']"#).expect("valid img pattern")
});

const MIN_URL_LEN: usize = 10;

/// Which strategy produced a candidate. Exposed for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThumbnailStrategy {
    Enclosure,
    MediaThumbnail,
    MediaContent,
    ThumbnailField,
    InlineImage,
}

pub struct ThumbnailExtractor;

impl ThumbnailExtractor {
    /// Validated absolute image URL for `item`, or `None`.
    pub fn extract(item: &RawFeedItem) -> Option<String> {
        let (strategy, candidate) = Self::candidate(item)?;
        let validated = candidate.as_deref().and_then(validate);
        if validated.is_none() {
            debug!("Discarding {:?} thumbnail candidate {:?}", strategy, candidate);
        }
        validated
    }

    /// The first strategy whose structure is present on `item`, with the URL
    /// it yields before validation. A matched strategy with no usable URL
    /// still ends the chain.
    pub fn candidate(item: &RawFeedItem) -> Option<(ThumbnailStrategy, Option<String>)> {
        if let Some(url) = &item.enclosure_url {
            return Some((ThumbnailStrategy::Enclosure, Some(url.clone())));
        }

        if !item.media_thumbnails.is_empty() {
            return Some((
                ThumbnailStrategy::MediaThumbnail,
                largest_thumbnail(&item.media_thumbnails),
            ));
        }

        if !item.media_contents.is_empty() {
            return Some((
                ThumbnailStrategy::MediaContent,
                first_media_content(&item.media_contents),
            ));
        }

        if let Some(field) = &item.thumbnail {
            return Some((ThumbnailStrategy::ThumbnailField, field.url().map(str::to_string)));
        }

        [item.description_html.as_deref(), item.snippet_text.as_deref()]
            .into_iter()
            .flatten()
            .find_map(first_img_src)
            .map(|url| (ThumbnailStrategy::InlineImage, Some(url)))
    }
}

/// URL of the widest descriptor; on equal widths the earlier one wins.
fn largest_thumbnail(thumbnails: &[MediaThumbnail]) -> Option<String> {
    let mut best: Option<(&MediaThumbnail, u64)> = None;

    for thumb in thumbnails {
        let width = thumb.declared_width();
        match best {
            Some((_, best_width)) if width <= best_width => {}
            _ => best = Some((thumb, width)),
        }
    }

    best.and_then(|(thumb, _)| thumb.url.clone())
}

/// First direct URL, or the first nested descriptor's URL, in entry order.
fn first_media_content(contents: &[MediaContent]) -> Option<String> {
    contents.iter().find_map(|content| {
        content
            .url
            .clone()
            .or_else(|| content.thumbnails.first().and_then(|t| t.url.clone()))
    })
}

pub fn first_img_src(text: &str) -> Option<String> {
    IMG_SRC_PATTERN
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Trimmed candidate if it is an absolute http(s) URL longer than ten
/// characters.
pub fn validate(candidate: &str) -> Option<String> {
    let trimmed = candidate.trim();
    if trimmed.chars().count() <= MIN_URL_LEN {
        return None;
    }

    let lower = trimmed.to_ascii_lowercase();
    if lower.starts_with("http://") || lower.starts_with("https://") {
        Some(trimmed.to_string())
    } else {
        None
    }
}
