use crate::traits::FeedSource;
use crate::types::{AggregatorError, RawFeedItem, Result};
use async_trait::async_trait;
use chrono::{Duration, Utc};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::info;
use url::Url;

pub const SYNTHETIC_SCHEME: &str = "synthetic";

const OPENERS: &[&str] = &[
    "When the",
    "Nobody:",
    "Me explaining why",
    "POV: the",
    "That moment when the",
];

const SUBJECTS: &[&str] = &[
    "build finally passes",
    "cat discovers the keyboard",
    "group chat goes silent",
    "coffee kicks in at 4pm",
    "wifi drops mid-meeting",
    "weekend lasts exactly one hour",
];

/// In-process source for `synthetic://<kind>/<topic>` URLs.
///
/// Produces randomized placeholder posts for upstreams that have no real
/// feed. Every title is prefixed with `[synthetic]` and every item has no
/// link and no media, so the data can never pass for a real post.
pub struct SyntheticSource {
    batch_size: usize,
}

impl SyntheticSource {
    pub fn new(batch_size: usize) -> Self {
        Self { batch_size }
    }

    fn generate(&self, topic: &str) -> Vec<RawFeedItem> {
        let mut rng = rand::thread_rng();
        let now = Utc::now();

        (0..self.batch_size)
            .map(|i| {
                let opener = OPENERS.choose(&mut rng).copied().unwrap_or("When the");
                let subject = SUBJECTS.choose(&mut rng).copied().unwrap_or("meme appears");
                let upvotes: u32 = rng.gen_range(10..10_000);
                let published = now - Duration::minutes(rng.gen_range(1..(60 * 24)));

                RawFeedItem {
                    title: Some(format!("[synthetic] {} {} #{}", opener, subject, i + 1)),
                    snippet_text: Some(format!(
                        "Synthetic {} post generated locally ({} upvotes). Not from a live feed.",
                        topic, upvotes
                    )),
                    published_at: Some(published.to_rfc3339()),
                    ..Default::default()
                }
            })
            .collect()
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(5)
    }
}

#[async_trait]
impl FeedSource for SyntheticSource {
    fn source_name(&self) -> &str {
        "synthetic"
    }

    async fn fetch(&self, url: &str) -> Result<Vec<RawFeedItem>> {
        let parsed = Url::parse(url).map_err(|e| AggregatorError::feed_fetch(url, e))?;
        if parsed.scheme() != SYNTHETIC_SCHEME {
            return Err(AggregatorError::feed_fetch(url, "not a synthetic:// URL"));
        }

        let topic = parsed
            .path_segments()
            .and_then(|mut segments| segments.find(|s| !s.is_empty()))
            .unwrap_or("general")
            .to_string();

        let items = self.generate(&topic);
        info!("Generated {} synthetic items for {}", items.len(), url);
        Ok(items)
    }
}
