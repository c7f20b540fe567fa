use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Prefix stored in place of a translation when the service call failed.
pub const TRANSLATION_FAILED_PREFIX: &str = "[translation failed] ";

/// Prefix stored in place of a translation when no credential is configured.
pub const NO_TRANSLATION_PREFIX: &str = "[no translation] ";

pub const DEFAULT_TITLE: &str = "No Title";
pub const DEFAULT_AUTHOR: &str = "Unknown";

/// Returns true when `text` is a placeholder rather than a real translation.
pub fn is_sentinel(text: &str) -> bool {
    text.starts_with(TRANSLATION_FAILED_PREFIX) || text.starts_with(NO_TRANSLATION_PREFIX)
}

/// Upstream sources known to the pipeline.
///
/// The serialized form is the display label stored alongside each record.
/// Adding a variant here also requires a matching `SourceConfig` entry,
/// otherwise the source is simply never polled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SourceName {
    #[serde(rename = "TechCrunch")]
    TechCrunch,
    #[serde(rename = "Ars Technica")]
    ArsTechnica,
    #[serde(rename = "Hacker News")]
    HackerNews,
}

impl SourceName {
    pub const ALL: [SourceName; 3] = [
        SourceName::TechCrunch,
        SourceName::ArsTechnica,
        SourceName::HackerNews,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceName::TechCrunch => "TechCrunch",
            SourceName::ArsTechnica => "Ars Technica",
            SourceName::HackerNews => "Hacker News",
        }
    }
}

impl fmt::Display for SourceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownSource(pub String);

impl fmt::Display for UnknownSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown source: {}", self.0)
    }
}

impl std::error::Error for UnknownSource {}

impl FromStr for SourceName {
    type Err = UnknownSource;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SourceName::ALL
            .into_iter()
            .find(|name| name.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| UnknownSource(s.to_string()))
    }
}

/// Source-native item as produced by an adapter, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RawItem {
    pub title: Option<String>,
    pub url: String,
    pub summary: Option<String>,
    pub body: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
    pub author: Option<String>,
    pub categories: Vec<String>,
    pub guid: Option<String>,
    pub external_id: Option<String>,
    pub popularity: Option<i64>,
}

/// A normalized candidate awaiting the dedup check.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewArticle {
    pub title: String,
    pub summary: String,
    pub body: Option<String>,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
    pub categories: Vec<String>,
    pub guid: Option<String>,
    pub external_id: Option<String>,
    pub source_name: SourceName,
    pub popularity_score: i64,
    pub estimated_read_minutes: i32,
}

/// A persisted article.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArticleRecord {
    pub id: Uuid,
    pub title: String,
    pub title_translated: Option<String>,
    pub summary: String,
    pub summary_translated: Option<String>,
    pub body: Option<String>,
    pub source_url: String,
    pub published_at: DateTime<Utc>,
    pub author: String,
    pub categories: Vec<String>,
    pub guid: Option<String>,
    pub external_id: Option<String>,
    pub source_name: SourceName,
    pub popularity_score: i64,
    pub is_translated: bool,
    pub translated_at: Option<DateTime<Utc>>,
    pub estimated_read_minutes: i32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ArticleRecord {
    pub fn from_new(article: NewArticle, now: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            title: article.title,
            title_translated: None,
            summary: article.summary,
            summary_translated: None,
            body: article.body,
            source_url: article.source_url,
            published_at: article.published_at,
            author: article.author,
            categories: article.categories,
            guid: article.guid,
            external_id: article.external_id,
            source_name: article.source_name,
            popularity_score: article.popularity_score,
            is_translated: false,
            translated_at: None,
            estimated_read_minutes: article.estimated_read_minutes.max(1),
            created_at: now,
            updated_at: now,
        }
    }

    pub fn display_title(&self) -> &str {
        self.title_translated.as_deref().unwrap_or(&self.title)
    }

    pub fn display_summary(&self) -> &str {
        self.summary_translated.as_deref().unwrap_or(&self.summary)
    }

    /// True when either translated field holds a placeholder.
    pub fn has_sentinel_translation(&self) -> bool {
        self.title_translated.as_deref().is_some_and(is_sentinel)
            || self.summary_translated.as_deref().is_some_and(is_sentinel)
    }

    pub fn apply_translation(&mut self, update: TranslationUpdate, now: DateTime<Utc>) {
        self.title_translated = Some(update.title_translated);
        self.summary_translated = update.summary_translated;
        self.is_translated = true;
        self.translated_at = Some(now);
        self.updated_at = now;
    }

    pub fn clear_translation(&mut self, now: DateTime<Utc>) {
        self.title_translated = None;
        self.summary_translated = None;
        self.is_translated = false;
        self.translated_at = None;
        self.updated_at = now;
    }
}

/// Fields written back by the translation pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranslationUpdate {
    pub title_translated: String,
    pub summary_translated: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceCount {
    pub source: SourceName,
    pub count: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub name: String,
    pub count: i64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn candidate() -> NewArticle {
        NewArticle {
            title: "Title".to_string(),
            summary: "Summary".to_string(),
            body: None,
            source_url: "https://example.com/a".to_string(),
            published_at: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            author: DEFAULT_AUTHOR.to_string(),
            categories: Vec::new(),
            guid: None,
            external_id: None,
            source_name: SourceName::ArsTechnica,
            popularity_score: 0,
            estimated_read_minutes: 0,
        }
    }

    #[test]
    fn source_names_use_display_labels() {
        assert_eq!(serde_json::to_string(&SourceName::ArsTechnica).unwrap(), "\"Ars Technica\"");
        let parsed: SourceName = serde_json::from_str("\"Hacker News\"").unwrap();
        assert_eq!(parsed, SourceName::HackerNews);
        assert_eq!("techcrunch".parse::<SourceName>(), Ok(SourceName::TechCrunch));
        assert!("Slashdot".parse::<SourceName>().is_err());
    }

    #[test]
    fn sentinels() {
        assert!(is_sentinel("[translation failed] Hello"));
        assert!(is_sentinel("[no translation] Hello"));
        assert!(!is_sentinel("こんにちは"));
    }

    #[test]
    fn translation_lifecycle() {
        let now = Utc::now();
        let mut record = ArticleRecord::from_new(candidate(), now);
        assert_eq!(record.estimated_read_minutes, 1);
        assert!(!record.is_translated);
        assert_eq!(record.display_title(), "Title");

        record.apply_translation(
            TranslationUpdate {
                title_translated: format!("{}Title", TRANSLATION_FAILED_PREFIX),
                summary_translated: None,
            },
            now,
        );
        assert!(record.is_translated);
        assert!(record.has_sentinel_translation());
        assert_eq!(record.display_summary(), "Summary");

        record.clear_translation(now);
        assert!(!record.is_translated);
        assert!(record.translated_at.is_none());
        assert!(!record.has_sentinel_translation());
    }
}
