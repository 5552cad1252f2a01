use super::{OperationInput, OperationSpec, SourcePlan};
use crate::sources::synthetic::SYNTHETIC_SCHEME;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use url::Url;

pub const MAX_COUNT: u32 = 50;
const DEFAULT_COUNT: u32 = 10;
const REDDIT_BASE: &str = "https://www.reddit.com";

fn default_count() -> u32 {
    DEFAULT_COUNT
}

fn default_topic() -> String {
    "memes".to_string()
}

fn validate_count(count: u32) -> Result<(), String> {
    if (1..=MAX_COUNT).contains(&count) {
        Ok(())
    } else {
        Err(format!("count must be between 1 and {}, got {}", MAX_COUNT, count))
    }
}

fn subreddit_feed(subreddit: &str, listing: &str) -> String {
    format!("{}/r/{}/{}.rss", REDDIT_BASE, subreddit, listing)
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum MemeCategory {
    #[default]
    Memes,
    Dankmemes,
    Wholesomememes,
    #[serde(rename = "me_irl")]
    MeIrl,
    Programmerhumor,
    Animemes,
}

impl MemeCategory {
    pub const ALL: [MemeCategory; 6] = [
        MemeCategory::Memes,
        MemeCategory::Dankmemes,
        MemeCategory::Wholesomememes,
        MemeCategory::MeIrl,
        MemeCategory::Programmerhumor,
        MemeCategory::Animemes,
    ];

    pub fn subreddit(self) -> &'static str {
        match self {
            MemeCategory::Memes => "memes",
            MemeCategory::Dankmemes => "dankmemes",
            MemeCategory::Wholesomememes => "wholesomememes",
            MemeCategory::MeIrl => "me_irl",
            MemeCategory::Programmerhumor => "ProgrammerHumor",
            MemeCategory::Animemes => "Animemes",
        }
    }
}

/// Hot and top-of-the-day memes from one meme subreddit.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct TrendingMemesInput {
    /// Meme community to pull from
    #[serde(default)]
    pub category: MemeCategory,
    /// Maximum number of memes to return (1-50)
    #[serde(default = "default_count")]
    pub count: u32,
}

impl OperationInput for TrendingMemesInput {
    fn validate(&self) -> Result<(), String> {
        validate_count(self.count)
    }

    fn plan(self) -> SourcePlan {
        let subreddit = self.category.subreddit();
        SourcePlan {
            sources: vec![
                subreddit_feed(subreddit, ""),
                format!("{}?t=day", subreddit_feed(subreddit, "top/")),
            ],
            count: self.count as usize,
            keyword: None,
        }
    }
}

/// Memes across every known meme community matching a free-text query.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SearchMemesInput {
    /// Text that must appear in the title or description; empty matches everything
    #[serde(default)]
    pub query: String,
    /// Maximum number of memes to return (1-50)
    #[serde(default = "default_count")]
    pub count: u32,
}

impl OperationInput for SearchMemesInput {
    fn validate(&self) -> Result<(), String> {
        validate_count(self.count)
    }

    fn plan(self) -> SourcePlan {
        let query = self.query.trim().to_string();
        let subreddits: Vec<&str> = MemeCategory::ALL.iter().map(|c| c.subreddit()).collect();

        let mut sources = Vec::new();
        if !query.is_empty() {
            let search_base = format!("{}/r/{}/search.rss", REDDIT_BASE, subreddits.join("+"));
            if let Ok(search) = Url::parse_with_params(
                &search_base,
                &[("q", query.as_str()), ("restrict_sr", "on"), ("sort", "relevance")],
            ) {
                sources.push(search.to_string());
            }
        }
        sources.extend(subreddits.iter().map(|s| subreddit_feed(s, "")));

        SourcePlan {
            sources,
            count: self.count as usize,
            keyword: Some(query),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NewsGenre {
    #[default]
    InternetCulture,
    Gaming,
    Tech,
    Entertainment,
}

impl NewsGenre {
    pub fn feeds(self) -> &'static [&'static str] {
        match self {
            NewsGenre::InternetCulture => &[
                "https://knowyourmeme.com/newsfeed.rss",
                "https://www.dailydot.com/feed/",
            ],
            NewsGenre::Gaming => &[
                "https://kotaku.com/rss",
                "https://www.polygon.com/rss/index.xml",
            ],
            NewsGenre::Tech => &[
                "https://www.theverge.com/rss/index.xml",
                "https://feeds.arstechnica.com/arstechnica/index",
            ],
            NewsGenre::Entertainment => &[
                "https://www.avclub.com/rss",
                "https://variety.com/feed/",
            ],
        }
    }
}

/// Articles about meme and internet culture, grouped by genre.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct MemeNewsInput {
    /// News genre to pull from
    #[serde(default)]
    pub genre: NewsGenre,
    /// Optional keyword filter on title or description
    #[serde(default)]
    pub keyword: String,
    /// Maximum number of articles to return (1-50)
    #[serde(default = "default_count")]
    pub count: u32,
}

impl OperationInput for MemeNewsInput {
    fn validate(&self) -> Result<(), String> {
        validate_count(self.count)
    }

    fn plan(self) -> SourcePlan {
        SourcePlan {
            sources: self.genre.feeds().iter().map(|s| s.to_string()).collect(),
            count: self.count as usize,
            keyword: Some(self.keyword),
        }
    }
}

/// Newest posts from one community, optionally padded with synthetic posts.
#[derive(Debug, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct SocialPostsInput {
    /// Community name (letters, digits and underscores)
    #[serde(default = "default_topic")]
    pub topic: String,
    /// Also include clearly labelled synthetic posts
    #[serde(default)]
    pub include_synthetic: bool,
    /// Maximum number of posts to return (1-50)
    #[serde(default = "default_count")]
    pub count: u32,
}

impl OperationInput for SocialPostsInput {
    fn validate(&self) -> Result<(), String> {
        validate_count(self.count)?;

        let topic = self.topic.trim();
        let valid = (2..=21).contains(&topic.len())
            && topic.chars().all(|c| c.is_ascii_alphanumeric() || c == '_');
        if valid {
            Ok(())
        } else {
            Err(format!(
                "topic must be 2-21 letters, digits or underscores, got {:?}",
                self.topic
            ))
        }
    }

    fn plan(self) -> SourcePlan {
        let topic = self.topic.trim();
        let mut sources = vec![subreddit_feed(topic, "new/")];
        if self.include_synthetic {
            sources.push(format!("{}://social/{}", SYNTHETIC_SCHEME, topic));
        }

        SourcePlan {
            sources,
            count: self.count as usize,
            keyword: None,
        }
    }
}

pub fn default_operations() -> Vec<OperationSpec> {
    vec![
        OperationSpec::new::<TrendingMemesInput>(
            "get_trending_memes",
            "Trending memes from a meme community, with a thumbnail per meme when one can be found",
            "memes",
            "Untitled Meme",
        ),
        OperationSpec::new::<SearchMemesInput>(
            "search_memes",
            "Search memes across all known meme communities by keyword",
            "memes",
            "Untitled Meme",
        ),
        OperationSpec::new::<MemeNewsInput>(
            "get_meme_news",
            "Internet culture news articles for a genre, optionally filtered by keyword",
            "articles",
            "Untitled Article",
        ),
        OperationSpec::new::<SocialPostsInput>(
            "get_social_posts",
            "Newest posts from a community, optionally including synthetic placeholder posts",
            "posts",
            "Untitled Post",
        ),
    ]
}
