use crate::types::{AggregatorError, Result};
use interfaces::SourceName;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Adapter shape used to poll a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    /// One syndication document per run.
    Feed,
    /// An id index followed by one request per item.
    TreeFetch,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub name: SourceName,
    pub kind: SourceKind,
    pub url: String,
    #[serde(default = "default_enabled")]
    pub enabled: bool,
    #[serde(default = "default_max_items")]
    pub max_items: usize,
    #[serde(default)]
    pub item_delay_ms: u64,
    #[serde(default)]
    pub default_categories: Vec<String>,
}

fn default_enabled() -> bool {
    true
}

fn default_max_items() -> usize {
    DEFAULT_MAX_ITEMS
}

pub const DEFAULT_MAX_ITEMS: usize = 30;

impl SourceConfig {
    pub fn feed(name: SourceName, url: impl Into<String>) -> Self {
        Self {
            name,
            kind: SourceKind::Feed,
            url: url.into(),
            enabled: true,
            max_items: DEFAULT_MAX_ITEMS,
            item_delay_ms: 0,
            default_categories: Vec::new(),
        }
    }

    pub fn tree_fetch(name: SourceName, base_url: impl Into<String>) -> Self {
        Self {
            name,
            kind: SourceKind::TreeFetch,
            url: base_url.into(),
            enabled: true,
            max_items: DEFAULT_MAX_ITEMS,
            item_delay_ms: 100,
            default_categories: vec!["Technology".to_string(), "Programming".to_string()],
        }
    }

    pub fn with_max_items(mut self, max_items: usize) -> Self {
        self.max_items = max_items;
        self
    }

    pub fn with_item_delay_ms(mut self, delay_ms: u64) -> Self {
        self.item_delay_ms = delay_ms;
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }

    /// The built-in source list, in polling order.
    pub fn defaults() -> Vec<SourceConfig> {
        vec![
            SourceConfig::feed(SourceName::TechCrunch, "https://techcrunch.com/feed/"),
            SourceConfig::feed(
                SourceName::ArsTechnica,
                "https://feeds.arstechnica.com/arstechnica/index",
            ),
            SourceConfig::tree_fetch(
                SourceName::HackerNews,
                "https://hacker-news.firebaseio.com/v0",
            ),
        ]
    }

    /// Reads a JSON array of source configs, validating every URL.
    pub fn load_from_file(path: &Path) -> Result<Vec<SourceConfig>> {
        let raw = std::fs::read_to_string(path)?;
        let sources: Vec<SourceConfig> = serde_json::from_str(&raw)?;
        for source in &sources {
            url::Url::parse(&source.url)?;
            if source.max_items == 0 {
                return Err(AggregatorError::Config(format!(
                    "source {} has max_items = 0",
                    source.name
                )));
            }
        }
        Ok(sources)
    }
}

/// Settings for the translation pass.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub target_lang: String,
    pub batch_size: usize,
    /// Pause after every external translation call.
    pub call_delay: Duration,
    /// Enables the second-stage paraphrase for summaries shorter than this many characters.
    pub enrich_below_chars: Option<usize>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            target_lang: "JA".to_string(),
            batch_size: 5,
            call_delay: Duration::from_secs(1),
            enrich_below_chars: None,
        }
    }
}
