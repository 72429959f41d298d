//! Live podcast data: iTunes directory search and RSS feed parsing.

use super::http::{send_json, send_text};
use crate::config::Subscription;
use crate::error::Result;
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, instrument, warn};

const ITUNES_URL: &str = "https://itunes.apple.com/search";

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ItunesResponse {
    results: Vec<ItunesShow>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct ItunesShow {
    collection_name: Option<String>,
    feed_url: Option<String>,
    artist_name: Option<String>,
    description: Option<String>,
    artwork_url600: Option<String>,
    genres: Vec<String>,
}

/// A podcast found in the iTunes directory.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Show {
    pub name: String,
    pub rss_url: String,
    pub artist: String,
    pub description: String,
    pub artwork: String,
    pub genres: Vec<String>,
}

/// Keep only shows that publish a feed.
fn parse_itunes(response: ItunesResponse) -> Vec<Show> {
    response
        .results
        .into_iter()
        .filter_map(|show| {
            let rss_url = show.feed_url.filter(|u| !u.is_empty())?;
            Some(Show {
                name: show.collection_name.unwrap_or_else(|| "Unknown".to_string()),
                rss_url,
                artist: show.artist_name.unwrap_or_else(|| "Unknown".to_string()),
                description: show
                    .description
                    .unwrap_or_else(|| "No description".to_string()),
                artwork: show.artwork_url600.unwrap_or_default(),
                genres: show.genres,
            })
        })
        .collect()
}

/// Search the iTunes podcast directory.
#[instrument(skip(client))]
pub async fn search_itunes(
    client: &reqwest::Client,
    term: &str,
    limit: u32,
    country: &str,
) -> Result<Vec<Show>> {
    let limit = limit.to_string();
    let request = client.get(ITUNES_URL).query(&[
        ("term", term),
        ("media", "podcast"),
        ("limit", limit.as_str()),
        ("country", country),
    ]);
    let response: ItunesResponse = send_json("iTunes", request).await?;
    Ok(parse_itunes(response))
}

/// One entry from a subscribed feed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedEpisode {
    pub title: String,
    pub description: String,
    pub podcast: String,
    pub published: String,
    pub audio_url: Option<String>,
    pub link: String,
    pub tags: Vec<String>,
    #[serde(skip)]
    pub published_at: DateTime<Utc>,
}

/// A feed entry before it is tied to a subscription.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedEntry {
    pub title: String,
    pub description: String,
    pub link: String,
    pub audio_url: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// Minimal RSS/Atom reader.
///
/// Handles `<item>` and `<entry>` blocks, CDATA sections and the common
/// character entities. Entries without a parseable date are kept with no
/// timestamp so callers can decide what to do with them.
pub struct FeedParser {
    entry: Regex,
    cdata: Regex,
    tag: Regex,
    enclosure: Regex,
    atom_link: Regex,
}

impl Default for FeedParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedParser {
    pub fn new() -> Self {
        Self {
            entry: Regex::new(r"(?is)<(?:item|entry)\b[^>]*>(.*?)</(?:item|entry)>")
                .expect("Invalid regex"),
            cdata: Regex::new(r"(?s)<!\[CDATA\[(.*?)\]\]>").expect("Invalid regex"),
            tag: Regex::new(r"(?s)<[^>]+>").expect("Invalid regex"),
            enclosure: Regex::new(r#"(?i)<enclosure\b[^>]*\burl\s*=\s*["']([^"']+)["']"#)
                .expect("Invalid regex"),
            atom_link: Regex::new(r#"(?i)<link\b[^>]*\bhref\s*=\s*["']([^"']+)["']"#)
                .expect("Invalid regex"),
        }
    }

    /// Parse up to `limit` entries, in feed order.
    pub fn parse(&self, xml: &str, limit: usize) -> Vec<FeedEntry> {
        self.entries(xml, limit)
            .into_iter()
            .map(|body| self.parse_entry(body))
            .collect()
    }

    /// Raw bodies of up to `limit` `<item>`/`<entry>` blocks.
    pub fn entries<'a>(&self, xml: &'a str, limit: usize) -> Vec<&'a str> {
        self.entry
            .captures_iter(xml)
            .take(limit)
            .filter_map(|caps| caps.get(1))
            .map(|body| body.as_str())
            .collect()
    }

    fn parse_entry(&self, body: &str) -> FeedEntry {
        let title = self
            .element(body, "title")
            .unwrap_or_else(|| "Untitled".to_string());
        let description = self
            .element(body, "description")
            .or_else(|| self.element(body, "summary"))
            .or_else(|| self.element(body, "itunes:summary"))
            .map(|d| self.strip_tags(&d))
            .unwrap_or_else(|| "No description".to_string());
        let link = self
            .element(body, "link")
            .filter(|l| !l.is_empty())
            .or_else(|| {
                self.atom_link
                    .captures(body)
                    .and_then(|c| c.get(1))
                    .map(|m| decode_entities(m.as_str()))
            })
            .unwrap_or_default();
        let audio_url = self
            .enclosure
            .captures(body)
            .and_then(|c| c.get(1))
            .map(|m| decode_entities(m.as_str()));
        let published_at = ["pubDate", "published", "updated"]
            .iter()
            .find_map(|name| self.element(body, name))
            .and_then(|raw| parse_date(&raw));

        FeedEntry {
            title,
            description,
            link,
            audio_url,
            published_at,
        }
    }

    /// Text content of the first `<name>` element.
    pub fn element(&self, body: &str, name: &str) -> Option<String> {
        self.element_from(body, name, 0).map(|(text, _)| text)
    }

    /// Text content of every `<name>` element, in document order.
    pub fn elements(&self, body: &str, name: &str) -> Vec<String> {
        let mut found = Vec::new();
        let mut from = 0;
        while let Some((text, end)) = self.element_from(body, name, from) {
            found.push(text);
            from = end;
        }
        found
    }

    /// First `<name>` element at or after byte `from`, with the offset just past it.
    fn element_from(&self, body: &str, name: &str, from: usize) -> Option<(String, usize)> {
        let open = format!("<{}", name);
        let close = format!("</{}>", name);

        let mut search_from = from;
        let start = loop {
            let idx = search_from + body[search_from..].find(&open)?;
            let after = body[idx + open.len()..].chars().next()?;
            // Reject prefixes such as <link> matching <linkage>.
            if after == '>' || after.is_whitespace() || after == '/' {
                break idx;
            }
            search_from = idx + open.len();
        };

        let tag_end = start + body[start..].find('>')?;
        if body[start..=tag_end].ends_with("/>") {
            return None;
        }
        let content_start = tag_end + 1;
        let content_end = content_start + body[content_start..].find(&close)?;
        let raw = &body[content_start..content_end];

        let text = match self.cdata.captures(raw) {
            Some(caps) => caps.get(1).map_or("", |m| m.as_str()).to_string(),
            None => decode_entities(raw),
        };
        Some((text.trim().to_string(), content_end + close.len()))
    }

    fn strip_tags(&self, html: &str) -> String {
        let text = self.tag.replace_all(html, " ");
        decode_entities(&text)
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }
}

fn decode_entities(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&apos;", "'")
        .replace("&nbsp;", " ")
        .replace("&amp;", "&")
}

/// Parse RSS (RFC 2822) or Atom (RFC 3339) dates.
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    DateTime::parse_from_rfc2822(raw)
        .or_else(|_| DateTime::parse_from_rfc3339(raw))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// Entries published after `cutoff`, tied to their subscription.
pub fn recent_episodes(
    subscription: &Subscription,
    entries: Vec<FeedEntry>,
    cutoff: DateTime<Utc>,
) -> Vec<FeedEpisode> {
    entries
        .into_iter()
        .filter_map(|entry| {
            let published_at = entry.published_at.filter(|at| *at > cutoff)?;
            Some(FeedEpisode {
                title: entry.title,
                description: entry.description,
                podcast: subscription.name.clone(),
                published: published_at.format("%Y-%m-%d %H:%M").to_string(),
                audio_url: entry.audio_url,
                link: entry.link,
                tags: subscription.tags.clone(),
                published_at,
            })
        })
        .collect()
}

/// Outcome of polling every subscription.
#[derive(Debug, Default, Clone, Serialize)]
pub struct FeedReport {
    pub episodes: Vec<FeedEpisode>,
    /// Subscriptions that could not be fetched, with the reason.
    pub failed: Vec<FeedFailure>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedFailure {
    pub podcast: String,
    pub error: String,
}

/// Fetch each subscription's feed and collect entries newer than `cutoff`.
///
/// A failing feed is logged and reported but never aborts the others.
#[instrument(skip_all, fields(feeds = subscriptions.len()))]
pub async fn fetch_subscriptions(
    client: &reqwest::Client,
    parser: &FeedParser,
    subscriptions: &[Subscription],
    entries_per_feed: usize,
    cutoff: DateTime<Utc>,
) -> FeedReport {
    let mut report = FeedReport::default();

    for subscription in subscriptions {
        debug!("Fetching feed for {}", subscription.name);
        let request = client.get(&subscription.rss_url);
        match send_text(&subscription.name, request).await {
            Ok(xml) => {
                let entries = parser.parse(&xml, entries_per_feed);
                if entries.is_empty() {
                    warn!("No entries found in feed for {}", subscription.name);
                }
                report
                    .episodes
                    .extend(recent_episodes(subscription, entries, cutoff));
            }
            Err(e) => {
                warn!("Error fetching {}: {}", subscription.name, e);
                report.failed.push(FeedFailure {
                    podcast: subscription.name.clone(),
                    error: e.to_string(),
                });
            }
        }
    }

    report
}
