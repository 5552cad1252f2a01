use crate::rss_utils;
use crate::types::{AggregatorError, MediaContent, MediaThumbnail, RawFeedItem, Result, ThumbnailField};
use std::collections::BTreeMap;
use tracing::debug;

/// Namespaced extension elements as both `rss` and `atom_syndication` expose
/// them: prefix -> local name -> elements.
type ExtensionMap<E> = BTreeMap<String, BTreeMap<String, Vec<E>>>;

/// Read-only view over an XML extension element, so the media namespace
/// mapping can be shared between the RSS and Atom readers.
trait ExtensionNode: Sized {
    fn attr(&self, name: &str) -> Option<&str>;
    fn text(&self) -> Option<&str>;
    fn child_nodes(&self, name: &str) -> &[Self];
}

impl ExtensionNode for rss::extension::Extension {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs().get(name).map(String::as_str)
    }

    fn text(&self) -> Option<&str> {
        self.value()
    }

    fn child_nodes(&self, name: &str) -> &[Self] {
        local_children(self.children(), name)
    }
}

impl ExtensionNode for atom_syndication::extension::Extension {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs().get(name).map(String::as_str)
    }

    fn text(&self) -> Option<&str> {
        self.value()
    }

    fn child_nodes(&self, name: &str) -> &[Self] {
        local_children(self.children(), name)
    }
}

/// Children keyed either by local name or by `prefix:name`, depending on
/// the reader.
fn local_children<'a, E>(children: &'a BTreeMap<String, Vec<E>>, name: &str) -> &'a [E] {
    children
        .iter()
        .find(|(key, _)| key.rsplit(':').next() == Some(name))
        .map(|(_, nodes)| nodes.as_slice())
        .unwrap_or(&[])
}

#[derive(Default)]
struct MediaFields {
    thumbnails: Vec<MediaThumbnail>,
    contents: Vec<MediaContent>,
    thumbnail: Option<ThumbnailField>,
}

pub struct FeedParser;

impl FeedParser {
    /// Parse a feed document into raw items. RSS 2.0 is tried first, then
    /// Atom, then feed-rs for the remaining dialects (RSS 1.0, JSON Feed).
    pub fn parse(content: &[u8]) -> Result<Vec<RawFeedItem>> {
        debug!("Parsing feed content ({} bytes)", content.len());

        if let Ok(channel) = rss::Channel::read_from(content) {
            debug!("Parsed RSS channel with {} items", channel.items().len());
            return Ok(channel.items().iter().map(Self::from_rss_item).collect());
        }

        if let Ok(feed) = atom_syndication::Feed::read_from(content) {
            debug!("Parsed Atom feed with {} entries", feed.entries().len());
            return Ok(feed.entries().iter().map(Self::from_atom_entry).collect());
        }

        let feed = feed_rs::parser::parse(content)
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;
        debug!("Parsed {:?} feed with {} entries", feed.feed_type, feed.entries.len());
        Ok(feed.entries.into_iter().map(Self::from_generic_entry).collect())
    }

    fn from_rss_item(item: &rss::Item) -> RawFeedItem {
        let media = media_fields(item.extensions());

        let published_at = item
            .pub_date()
            .map(str::to_string)
            .or_else(|| {
                item.dublin_core_ext()
                    .and_then(|dc| dc.dates().first().cloned())
            });

        let thumbnail = media.thumbnail.or_else(|| {
            item.itunes_ext()
                .and_then(|itunes| itunes.image())
                .map(|image| ThumbnailField::Url(image.to_string()))
        });

        RawFeedItem {
            title: item.title().map(str::to_string),
            link: item.link().map(str::to_string),
            description_html: item.description().or(item.content()).map(str::to_string),
            snippet_text: snippet(item.content().or(item.description())),
            published_at,
            enclosure_url: item.enclosure().map(|e| e.url().to_string()),
            media_thumbnails: media.thumbnails,
            media_contents: media.contents,
            thumbnail,
        }
    }

    fn from_atom_entry(entry: &atom_syndication::Entry) -> RawFeedItem {
        let media = media_fields(entry.extensions());

        let link = entry
            .links()
            .iter()
            .find(|l| l.rel() == "alternate")
            .or_else(|| entry.links().first())
            .map(|l| l.href().to_string());

        let enclosure_url = entry
            .links()
            .iter()
            .find(|l| l.rel() == "enclosure")
            .map(|l| l.href().to_string());

        let summary = entry.summary().map(|s| s.as_str());
        let content = entry.content().and_then(|c| c.value());

        let published_at = entry
            .published()
            .unwrap_or_else(|| entry.updated())
            .to_rfc3339();

        RawFeedItem {
            title: Some(entry.title().as_str().to_string()),
            link,
            description_html: summary.or(content).map(str::to_string),
            snippet_text: snippet(content.or(summary)),
            published_at: Some(published_at),
            enclosure_url,
            media_thumbnails: media.thumbnails,
            media_contents: media.contents,
            thumbnail: media.thumbnail,
        }
    }

    fn from_generic_entry(entry: feed_rs::model::Entry) -> RawFeedItem {
        let link = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref().map_or(true, |r| r == "alternate"))
            .map(|l| l.href.clone());

        let enclosure_url = entry
            .links
            .iter()
            .find(|l| l.rel.as_deref() == Some("enclosure"))
            .map(|l| l.href.clone());

        let summary = entry.summary.map(|s| s.content);
        let content = entry.content.and_then(|c| c.body);

        let mut media_thumbnails = Vec::new();
        let mut media_contents = Vec::new();
        for object in &entry.media {
            for thumb in &object.thumbnails {
                let width = thumb.image.width.map(|w| w.to_string());
                media_thumbnails.push(MediaThumbnail::new(thumb.image.uri.clone(), width.as_deref()));
            }
            for content in &object.content {
                media_contents.push(MediaContent {
                    url: content.url.as_ref().map(|u| u.to_string()),
                    thumbnails: Vec::new(),
                });
            }
        }

        RawFeedItem {
            title: entry.title.map(|t| t.content),
            link,
            snippet_text: snippet(content.as_deref().or(summary.as_deref())),
            description_html: summary.or(content),
            published_at: entry.published.or(entry.updated).map(|d| d.to_rfc3339()),
            enclosure_url,
            media_thumbnails,
            media_contents,
            thumbnail: None,
        }
    }
}

fn snippet(html: Option<&str>) -> Option<String> {
    html.map(rss_utils::feed::extract_text_from_html)
        .filter(|text| !text.is_empty())
}

fn thumbnail_descriptor<E: ExtensionNode>(node: &E) -> MediaThumbnail {
    MediaThumbnail {
        url: node.attr("url").map(str::to_string),
        width: node.attr("width").map(str::to_string),
    }
}

fn content_descriptor<E: ExtensionNode>(node: &E) -> MediaContent {
    MediaContent {
        url: node.attr("url").map(str::to_string),
        thumbnails: node.child_nodes("thumbnail").iter().map(thumbnail_descriptor).collect(),
    }
}

/// Collect `media:thumbnail`, `media:content` (item level first, then
/// inside `media:group`) and the first `<prefix>:thumbnail` from any other
/// namespace.
fn media_fields<E: ExtensionNode>(extensions: &ExtensionMap<E>) -> MediaFields {
    let mut fields = MediaFields::default();

    if let Some(media) = extensions.get("media") {
        let groups = media.get("group").map(Vec::as_slice).unwrap_or(&[]);

        let top_thumbs = media.get("thumbnail").map(Vec::as_slice).unwrap_or(&[]);
        fields.thumbnails.extend(top_thumbs.iter().map(thumbnail_descriptor));
        for group in groups {
            fields.thumbnails.extend(group.child_nodes("thumbnail").iter().map(thumbnail_descriptor));
        }

        let top_contents = media.get("content").map(Vec::as_slice).unwrap_or(&[]);
        fields.contents.extend(top_contents.iter().map(content_descriptor));
        for group in groups {
            fields.contents.extend(group.child_nodes("content").iter().map(content_descriptor));
        }
    }

    fields.thumbnail = extensions
        .iter()
        .filter(|(prefix, _)| prefix.as_str() != "media")
        .filter_map(|(_, elements)| elements.get("thumbnail").and_then(|v| v.first()))
        .find_map(|node| match node.attr("url") {
            Some(url) => Some(ThumbnailField::Object { url: Some(url.to_string()) }),
            None => node
                .text()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(|t| ThumbnailField::Url(t.to_string())),
        });

    fields
}

#[cfg(test)]
mod tests {
    use super::*;

    const MEDIA_ATOM: &str = r#"<?xml version="1.0" encoding="utf-8"?>
<feed xmlns="http://www.w3.org/2005/Atom" xmlns:media="http://search.yahoo.com/mrss/">
  <title>Clips</title>
  <id>urn:clips</id>
  <updated>2024-05-01T12:30:00Z</updated>
  <entry>
    <title>Clip one</title>
    <id>urn:clips:1</id>
    <updated>2024-05-01T12:30:00Z</updated>
    <link rel="alternate" href="https://clips.example.com/1"/>
    <link rel="enclosure" type="image/jpeg" href="https://clips.example.com/1.jpg"/>
    <media:group>
      <media:title>Clip one</media:title>
      <media:content url="https://clips.example.com/1.mp4" type="video/mp4" width="640" height="390"/>
      <media:thumbnail url="https://clips.example.com/1-hq.jpg" width="480" height="360"/>
    </media:group>
  </entry>
</feed>"#;

    #[test]
    fn generic_entry_keeps_enclosure_and_thumbnail_widths() {
        let feed = feed_rs::parser::parse(MEDIA_ATOM.as_bytes()).expect("feed-rs parses atom");
        let entry = feed.entries.into_iter().next().expect("one entry");

        let item = FeedParser::from_generic_entry(entry);
        assert_eq!(item.title.as_deref(), Some("Clip one"));
        assert_eq!(item.link.as_deref(), Some("https://clips.example.com/1"));
        assert_eq!(item.enclosure_url.as_deref(), Some("https://clips.example.com/1.jpg"));
        assert_eq!(
            item.media_thumbnails,
            vec![MediaThumbnail::new("https://clips.example.com/1-hq.jpg", Some("480"))]
        );
        assert_eq!(
            item.media_contents.first().and_then(|c| c.url.as_deref()),
            Some("https://clips.example.com/1.mp4")
        );
        assert_eq!(item.published_at.as_deref(), Some("2024-05-01T12:30:00+00:00"));
    }
}
