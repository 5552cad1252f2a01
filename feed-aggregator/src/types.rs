use serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use std::time::Duration;

/// One entry of a parsed feed, in whatever shape the feed dialect gave us.
///
/// Every field is optional; consumers probe the fields they care about and
/// treat absence as "try the next thing", never as an error.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawFeedItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub description_html: Option<String>,
    pub snippet_text: Option<String>,
    pub published_at: Option<String>,
    pub enclosure_url: Option<String>,
    pub media_thumbnails: Vec<MediaThumbnail>,
    pub media_contents: Vec<MediaContent>,
    pub thumbnail: Option<ThumbnailField>,
}

/// A `media:thumbnail`-style descriptor. `width` is kept as declared in the
/// document and only interpreted numerically at selection time.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaThumbnail {
    pub url: Option<String>,
    pub width: Option<String>,
}

impl MediaThumbnail {
    pub fn new(url: impl Into<String>, width: Option<&str>) -> Self {
        Self {
            url: Some(url.into()),
            width: width.map(|w| w.to_string()),
        }
    }

    /// Leading numeric part of the declared width (`"800px"` is 800);
    /// anything unreadable is 0.
    pub fn declared_width(&self) -> u64 {
        self.width
            .as_deref()
            .map(str::trim)
            .map(|w| {
                let end = w
                    .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                    .unwrap_or(w.len());
                &w[..end]
            })
            .and_then(|digits| digits.parse::<f64>().ok())
            .filter(|w| w.is_finite() && *w > 0.0)
            .map(|w| w as u64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct MediaContent {
    pub url: Option<String>,
    pub thumbnails: Vec<MediaThumbnail>,
}

/// Loose `thumbnail` field: some feeds put the URL in the element text,
/// others hang it off a `url` attribute.
#[derive(Debug, Clone, PartialEq)]
pub enum ThumbnailField {
    Url(String),
    Object { url: Option<String> },
}

impl ThumbnailField {
    pub fn url(&self) -> Option<&str> {
        match self {
            ThumbnailField::Url(url) => Some(url.as_str()),
            ThumbnailField::Object { url } => url.as_deref(),
        }
    }
}

/// The normalized output record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct CanonicalPost {
    pub title: String,
    pub description: String,
    pub link: String,
    #[serde(rename = "pubDate")]
    pub pub_date: String,
    #[serde(rename = "_source")]
    pub source: String,
    pub thumbnail: Option<String>,
}

/// Everything one aggregation run needs. Built fresh per invocation.
#[derive(Debug, Clone)]
pub struct AggregationRequest {
    pub sources: Vec<String>,
    pub count: usize,
    pub keyword: Option<String>,
    pub placeholder_title: String,
}

impl AggregationRequest {
    pub fn new(sources: Vec<String>, count: usize, placeholder_title: &str) -> Self {
        Self {
            sources,
            count,
            keyword: None,
            placeholder_title: placeholder_title.to_string(),
        }
    }

    pub fn with_keyword(mut self, keyword: Option<String>) -> Self {
        self.keyword = keyword
            .map(|k| k.trim().to_string())
            .filter(|k| !k.is_empty());
        self
    }
}

#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub user_agent: String,
    pub timeout_seconds: u64,
    pub max_feed_size_mb: usize,
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            user_agent: "Feed-Aggregator/1.0".to_string(),
            timeout_seconds: 15,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

impl FetchConfig {
    /// Defaults overlaid with `FEED_USER_AGENT`, `FEED_TIMEOUT_SECS`,
    /// `FEED_MAX_SIZE_MB` and `FEED_MAX_REDIRECTS` when set and parseable.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(user_agent) = std::env::var("FEED_USER_AGENT") {
            if !user_agent.trim().is_empty() {
                config.user_agent = user_agent;
            }
        }
        if let Some(timeout) = env_parse("FEED_TIMEOUT_SECS") {
            config.timeout_seconds = timeout;
        }
        if let Some(size) = env_parse("FEED_MAX_SIZE_MB") {
            config.max_feed_size_mb = size;
        }
        if let Some(redirects) = env_parse("FEED_MAX_REDIRECTS") {
            config.max_redirects = redirects;
        }

        config
    }

    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    pub fn max_feed_bytes(&self) -> usize {
        self.max_feed_size_mb * 1024 * 1024
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.trim().parse().ok())
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("HTTP status {status}: {reason}")]
    Status { status: u16, reason: String },

    #[error("Feed size exceeds limit: {size_bytes} bytes")]
    FeedTooLarge { size_bytes: usize },

    #[error("Failed to fetch feed {url}: {cause}")]
    FeedFetch { url: String, cause: String },

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Unsupported URL scheme: {0}")]
    UnsupportedScheme(String),

    #[error("Invalid input for {operation}: {message}")]
    InvalidInput { operation: String, message: String },

    #[error("Unknown operation: {0}")]
    UnknownOperation(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AggregatorError {
    pub fn feed_fetch(url: &str, cause: impl std::fmt::Display) -> Self {
        AggregatorError::FeedFetch {
            url: url.to_string(),
            cause: cause.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
