use crate::defs::{ArticleRecord, SourceName};
use serde::{Deserialize, Serialize};

/// Field-equality filter plus paging used by read-side store queries.
///
/// Results are always ordered by `published_at`, most recent first.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ArticleQuery {
    pub category: Option<String>,
    pub source: Option<SourceName>,
    pub translated: Option<bool>,
    pub offset: usize,
    pub limit: Option<usize>,
}

impl ArticleQuery {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn source(mut self, source: SourceName) -> Self {
        self.source = Some(source);
        self
    }

    pub fn translated(mut self, translated: bool) -> Self {
        self.translated = Some(translated);
        self
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Filter check only; paging is applied by the store.
    pub fn matches(&self, record: &ArticleRecord) -> bool {
        if let Some(category) = &self.category {
            if !record.categories.iter().any(|c| c == category) {
                return false;
            }
        }
        if let Some(source) = self.source {
            if record.source_name != source {
                return false;
            }
        }
        if let Some(translated) = self.translated {
            if record.is_translated != translated {
                return false;
            }
        }
        true
    }
}
