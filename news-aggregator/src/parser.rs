use crate::rss_utils::feed::extract_text_from_html;
use crate::types::{AggregatorError, ParsedEntry, ParsedFeed, Result};
use feed_rs::parser;
use tracing::{debug, info};

pub struct FeedParser;

impl FeedParser {
    /// Parses an RSS/Atom document, keeping entries in document order.
    pub fn parse_feed(content: &str) -> Result<ParsedFeed> {
        debug!("Parsing feed content ({} bytes)", content.len());

        let feed = parser::parse(content.as_bytes())
            .map_err(|e| AggregatorError::Parse(format!("Failed to parse feed: {}", e)))?;

        let title = feed.title.map(|t| t.content);
        let description = feed.description.map(|d| d.content);

        let entries: Vec<ParsedEntry> = feed.entries.into_iter().map(Self::parse_entry).collect();

        info!("Parsed feed with {} entries", entries.len());

        Ok(ParsedFeed {
            title,
            description,
            entries,
        })
    }

    fn parse_entry(entry: feed_rs::model::Entry) -> ParsedEntry {
        let title = entry
            .title
            .map(|t| t.content.trim().to_string())
            .filter(|t| !t.is_empty());

        let link = entry
            .links
            .first()
            .map(|l| l.href.trim().to_string())
            .filter(|href| !href.is_empty());

        let guid = if entry.id.is_empty() {
            None
        } else {
            Some(entry.id)
        };

        // Plain-text snippet, like the contentSnippet of common feed readers
        let summary = entry
            .summary
            .map(|s| extract_text_from_html(&s.content))
            .filter(|s| !s.is_empty());

        let content = entry.content.and_then(|c| c.body);

        let author = entry
            .authors
            .first()
            .map(|a| a.name.trim().to_string())
            .filter(|name| !name.is_empty());

        let categories = entry
            .categories
            .into_iter()
            .map(|c| c.term)
            .filter(|term| !term.trim().is_empty())
            .collect();

        ParsedEntry {
            guid,
            link,
            title,
            summary,
            content,
            author,
            published_at: entry.published.or(entry.updated),
            categories,
        }
    }
}
