use crate::config::SourceConfig;
use crate::rss_utils;
use crate::traits::PullFeed;
use crate::types::{PullBatch, RawItem, Result};
use crate::Fetcher;
use async_trait::async_trait;
use chrono::DateTime;
use interfaces::SourceName;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Item payload of the tree-fetch API. Every field is optional upstream.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct HnItem {
    pub id: Option<i64>,
    #[serde(rename = "type")]
    pub kind: Option<String>,
    pub url: Option<String>,
    pub title: Option<String>,
    pub text: Option<String>,
    pub time: Option<i64>,
    pub by: Option<String>,
    pub score: Option<i64>,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub dead: bool,
}

/// Index-plus-detail source: one request for the id list, one per item.
pub struct HackerNewsSource {
    pub name: SourceName,
    pub base_url: String,
    pub max_items: usize,
    pub item_delay: Duration,
    fetcher: Fetcher,
}

impl HackerNewsSource {
    pub fn new(
        name: SourceName,
        base_url: String,
        fetcher: Fetcher,
        max_items: usize,
        item_delay: Duration,
    ) -> Self {
        Self {
            name,
            base_url: base_url.trim_end_matches('/').to_string(),
            max_items,
            item_delay,
            fetcher,
        }
    }

    pub fn from_config(config: &SourceConfig, fetcher: Fetcher) -> Self {
        Self::new(
            config.name,
            config.url.clone(),
            fetcher,
            config.max_items,
            Duration::from_millis(config.item_delay_ms),
        )
    }

    fn top_stories_url(&self) -> String {
        format!("{}/topstories.json", self.base_url)
    }

    fn item_url(&self, id: i64) -> String {
        format!("{}/item/{}.json", self.base_url, id)
    }

    /// Keeps live stories that link somewhere; everything else is skipped.
    pub fn story_to_raw_item(item: HnItem, requested_id: i64) -> Option<RawItem> {
        if item.deleted || item.dead {
            return None;
        }
        if item.kind.as_deref() != Some("story") {
            return None;
        }
        let url = item.url.filter(|u| rss_utils::url::is_resolvable(u))?;
        let id = item.id.unwrap_or(requested_id);

        Some(RawItem {
            title: item.title,
            url,
            summary: item.text.as_deref().map(rss_utils::feed::extract_text_from_html),
            body: item.text,
            published_at: item.time.and_then(|secs| DateTime::from_timestamp(secs, 0)),
            author: item.by,
            categories: Vec::new(),
            guid: None,
            external_id: Some(id.to_string()),
            popularity: item.score,
        })
    }
}

#[async_trait]
impl PullFeed for HackerNewsSource {
    fn source_name(&self) -> SourceName {
        self.name
    }

    async fn pull(&mut self) -> Result<PullBatch> {
        info!("Pulling {} story index: {}", self.name, self.top_stories_url());

        let mut ids: Vec<i64> = self.fetcher.fetch_json(&self.top_stories_url()).await?;
        ids.truncate(self.max_items);

        let mut batch = PullBatch::default();

        for (index, id) in ids.into_iter().enumerate() {
            if index > 0 && !self.item_delay.is_zero() {
                tokio::time::sleep(self.item_delay).await;
            }

            let item: Option<HnItem> = match self.fetcher.fetch_json(&self.item_url(id)).await {
                Ok(item) => item,
                Err(e) => {
                    warn!("Failed to fetch {} item {}: {}", self.name, id, e);
                    batch.failed += 1;
                    continue;
                }
            };

            match item.and_then(|item| Self::story_to_raw_item(item, id)) {
                Some(raw) => batch.items.push(raw),
                None => {
                    debug!("Skipping {} item {} (absent, not a story, or no url)", self.name, id);
                    batch.skipped += 1;
                }
            }
        }

        info!(
            "Pulled {} items from {} ({} skipped, {} failed)",
            batch.items.len(),
            self.name,
            batch.skipped,
            batch.failed
        );
        Ok(batch)
    }
}
