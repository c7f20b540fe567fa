use crate::config::SourceConfig;
use crate::parser::FeedParser;
use crate::rss_utils;
use crate::traits::PullFeed;
use crate::types::{PullBatch, RawItem, Result};
use crate::Fetcher;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use interfaces::SourceName;
use tracing::{info, warn};

/// Generic RSS/Atom feed source
pub struct RssFeedSource {
    pub name: SourceName,
    pub url: String,
    pub max_items: usize,
    fetcher: Fetcher,
    last_fetch: Option<DateTime<Utc>>,
}

impl RssFeedSource {
    pub fn new(name: SourceName, url: String, fetcher: Fetcher, max_items: usize) -> Self {
        Self {
            name,
            url,
            max_items,
            fetcher,
            last_fetch: None,
        }
    }

    pub fn from_config(config: &SourceConfig, fetcher: Fetcher) -> Self {
        Self::new(config.name, config.url.clone(), fetcher, config.max_items)
    }

    pub fn last_fetch(&self) -> Option<DateTime<Utc>> {
        self.last_fetch
    }

    /// Converts parsed document content into raw items, capped at `max_items`.
    pub fn items_from_content(&self, content: &str) -> Result<PullBatch> {
        let parsed_feed = FeedParser::parse_feed(content)?;
        let mut batch = PullBatch::default();

        for entry in parsed_feed.entries.into_iter().take(self.max_items) {
            let Some(link) = entry.link.filter(|l| rss_utils::url::is_resolvable(l)) else {
                warn!(
                    "Skipping {} entry without a usable link: {}",
                    self.name,
                    entry.title.as_deref().unwrap_or("(untitled)")
                );
                batch.skipped += 1;
                continue;
            };

            batch.items.push(RawItem {
                title: entry.title,
                url: link,
                summary: entry.summary,
                body: entry.content,
                published_at: entry.published_at,
                author: entry.author,
                categories: entry.categories,
                guid: entry.guid,
                external_id: None,
                popularity: None,
            });
        }

        Ok(batch)
    }
}

#[async_trait]
impl PullFeed for RssFeedSource {
    fn source_name(&self) -> SourceName {
        self.name
    }

    async fn pull(&mut self) -> Result<PullBatch> {
        info!(
            "Pulling {} feed: {} ({})",
            self.name,
            self.url,
            rss_utils::url::extract_domain(&self.url).unwrap_or_default()
        );

        let document = self.fetcher.fetch_feed(&self.url).await?;
        self.last_fetch = Some(document.fetch_time);

        let batch = self.items_from_content(&document.content)?;

        info!(
            "Pulled {} items from {} ({} skipped, {}ms)",
            batch.items.len(),
            self.name,
            batch.skipped,
            document.response_time_ms
        );
        Ok(batch)
    }
}
