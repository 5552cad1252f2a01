/// Feed-specific utility functions shared by the parser, normalizer and
/// operation rendering.

/// URL utilities for feed sources
pub mod url {
    use url::Url;

    /// Label for a feed source: lowercase host without a leading `www.`.
    /// Falls back to `"Unknown"` when the URL has no parseable host.
    pub fn source_label(url_str: &str) -> String {
        Url::parse(url_str)
            .ok()
            .and_then(|url| url.host_str().map(|h| h.to_lowercase()))
            .filter(|host| !host.is_empty())
            .map(|host| match host.strip_prefix("www.") {
                Some(stripped) => stripped.to_string(),
                None => host,
            })
            .unwrap_or_else(|| "Unknown".to_string())
    }

    /// Validate feed URL format
    pub fn is_valid_feed_url(url_str: &str) -> bool {
        if let Ok(url) = Url::parse(url_str) {
            url.scheme() == "http" || url.scheme() == "https"
        } else {
            false
        }
    }
}

/// HTML-to-text helpers for feed item bodies
pub mod feed {
    /// Extract clean text content from HTML
    pub fn extract_text_from_html(html: &str) -> String {
        let stripped = html
            .chars()
            .fold((String::new(), false), |(mut text, in_tag), c| match c {
                '<' => (text, true),
                '>' if in_tag => {
                    // keep words on either side of a tag apart
                    text.push(' ');
                    (text, false)
                }
                _ if !in_tag => {
                    text.push(c);
                    (text, in_tag)
                }
                _ => (text, in_tag),
            })
            .0;

        decode_entities(&stripped)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Decode the handful of entities that show up in feed descriptions.
    pub fn decode_entities(text: &str) -> String {
        text.replace("&nbsp;", " ")
            .replace("&lt;", "<")
            .replace("&gt;", ">")
            .replace("&quot;", "\"")
            .replace("&#39;", "'")
            .replace("&#039;", "'")
            .replace("&apos;", "'")
            .replace("&#32;", " ")
            .replace("&amp;", "&")
    }
}

/// Text utilities
pub mod text {
    /// Truncate to at most `max_chars` characters, backing off to the last
    /// word boundary and appending an ellipsis when anything was cut.
    pub fn truncate_words(text: &str, max_chars: usize) -> String {
        if text.chars().count() <= max_chars {
            return text.to_string();
        }

        let cut: String = text.chars().take(max_chars).collect();
        let kept = match cut.rfind(char::is_whitespace) {
            Some(idx) if idx > 0 => &cut[..idx],
            _ => cut.as_str(),
        };
        format!("{}...", kept.trim_end())
    }
}
