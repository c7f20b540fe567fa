use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub use interfaces::{
    is_sentinel, ArticleQuery, ArticleRecord, CategoryCount, NewArticle, RawItem, SourceCount,
    SourceName, TranslationUpdate, NO_TRANSLATION_PREFIX, TRANSLATION_FAILED_PREFIX,
};

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
            user_agent: "News-Aggregator/1.0".to_string(),
            timeout_seconds: 10,
            max_feed_size_mb: 10,
            max_redirects: 5,
        }
    }
}

/// Body and cache headers of one successful HTTP fetch.
#[derive(Debug, Clone)]
pub struct FetchedDocument {
    pub url: String,
    pub content: String,
    pub http_status: u16,
    pub etag: Option<String>,
    pub last_modified: Option<String>,
    pub fetch_time: DateTime<Utc>,
    pub response_time_ms: u64,
}

#[derive(Debug)]
pub struct ParsedFeed {
    pub title: Option<String>,
    pub description: Option<String>,
    pub entries: Vec<ParsedEntry>,
}

/// A syndication entry with every field optional, in document order.
#[derive(Debug, Clone, Default)]
pub struct ParsedEntry {
    pub guid: Option<String>,
    pub link: Option<String>,
    pub title: Option<String>,
    pub summary: Option<String>,
    pub content: Option<String>,
    pub author: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub categories: Vec<String>,
}

/// What one adapter produced in one run.
#[derive(Debug, Clone, Default)]
pub struct PullBatch {
    pub items: Vec<RawItem>,
    /// Entries dropped for lacking a link, wrong type, or absence.
    pub skipped: usize,
    /// Per-item fetches that failed and were swallowed.
    pub failed: usize,
}

/// Per-source counters reported by the ingestion coordinator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceOutcome {
    pub source_name: SourceName,
    pub new_count: usize,
    pub duplicate_count: usize,
    pub error_count: usize,
    pub skipped_count: usize,
    pub last_error: Option<String>,
}

impl SourceOutcome {
    pub fn new(source_name: SourceName) -> Self {
        Self {
            source_name,
            new_count: 0,
            duplicate_count: 0,
            error_count: 0,
            skipped_count: 0,
            last_error: None,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AggregatorError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("HTTP {status} from {url}")]
    HttpStatus { status: u16, url: String },

    #[error("Feed parse error: {0}")]
    Parse(String),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    #[error("Duplicate key: {key}")]
    Duplicate { key: String },

    #[error("Article not found: {id}")]
    NotFound { id: uuid::Uuid },

    #[error("Translation error (status {status:?}): {message}")]
    Translation { status: Option<u16>, message: String },

    #[error("Feed size exceeds limit: {size_mb}MB")]
    FeedTooLarge { size_mb: usize },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("General error: {0}")]
    General(String),
}

impl AggregatorError {
    pub fn is_duplicate(&self) -> bool {
        matches!(self, AggregatorError::Duplicate { .. })
    }
}

pub type Result<T> = std::result::Result<T, AggregatorError>;
