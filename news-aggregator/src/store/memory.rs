use crate::store::ArticleStore;
use crate::types::{
    AggregatorError, ArticleQuery, ArticleRecord, CategoryCount, NewArticle, Result, SourceCount,
    TranslationUpdate,
};
use async_trait::async_trait;
use chrono::Utc;
use interfaces::SourceName;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-process store with the same uniqueness rules as the Postgres one.
#[derive(Default)]
pub struct MemoryArticleStore {
    records: RwLock<Vec<ArticleRecord>>,
    closed: AtomicBool,
}

impl MemoryArticleStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    /// Snapshot of every record in insertion order.
    pub async fn all(&self) -> Vec<ArticleRecord> {
        self.records.read().await.clone()
    }

    fn sorted_matches(records: &[ArticleRecord], query: &ArticleQuery) -> Vec<ArticleRecord> {
        let mut matches: Vec<ArticleRecord> = records
            .iter()
            .filter(|r| query.matches(r))
            .cloned()
            .collect();
        matches.sort_by(|a, b| b.published_at.cmp(&a.published_at));
        matches
    }

    fn source_counts<'a>(records: impl Iterator<Item = &'a ArticleRecord>) -> Vec<SourceCount> {
        let mut counts: BTreeMap<&'static str, (SourceName, i64)> = BTreeMap::new();
        for record in records {
            counts
                .entry(record.source_name.as_str())
                .or_insert((record.source_name, 0))
                .1 += 1;
        }
        counts
            .into_values()
            .map(|(source, count)| SourceCount { source, count })
            .collect()
    }

    fn category_map(records: &[ArticleRecord], translated_only: bool) -> BTreeMap<String, i64> {
        let mut counts = BTreeMap::new();
        for record in records.iter().filter(|r| !translated_only || r.is_translated) {
            for category in &record.categories {
                *counts.entry(category.clone()).or_insert(0) += 1;
            }
        }
        counts
    }
}

#[async_trait]
impl ArticleStore for MemoryArticleStore {
    async fn find_existing(
        &self,
        source_url: &str,
        external_id: Option<&str>,
    ) -> Result<Option<ArticleRecord>> {
        let records = self.records.read().await;
        Ok(records
            .iter()
            .find(|r| {
                r.source_url == source_url
                    || (external_id.is_some() && r.external_id.as_deref() == external_id)
            })
            .cloned())
    }

    async fn insert(&self, article: NewArticle) -> Result<ArticleRecord> {
        let mut records = self.records.write().await;

        if records.iter().any(|r| r.source_url == article.source_url) {
            return Err(AggregatorError::Duplicate {
                key: format!("source_url={}", article.source_url),
            });
        }
        if let Some(external_id) = article.external_id.as_deref() {
            if records.iter().any(|r| r.external_id.as_deref() == Some(external_id)) {
                return Err(AggregatorError::Duplicate {
                    key: format!("external_id={}", external_id),
                });
            }
        }

        let record = ArticleRecord::from_new(article, Utc::now());
        records.push(record.clone());
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<ArticleRecord> {
        self.records
            .read()
            .await
            .iter()
            .find(|r| r.id == id)
            .cloned()
            .ok_or(AggregatorError::NotFound { id })
    }

    async fn untranslated(&self, limit: usize) -> Result<Vec<ArticleRecord>> {
        let records = self.records.read().await;
        let mut backlog = Self::sorted_matches(&records, &ArticleQuery::new().translated(false));
        backlog.truncate(limit);
        Ok(backlog)
    }

    async fn mark_translated(&self, id: Uuid, update: TranslationUpdate) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AggregatorError::NotFound { id })?;
        record.apply_translation(update, Utc::now());
        Ok(())
    }

    async fn reset_translation(&self, id: Uuid) -> Result<()> {
        let mut records = self.records.write().await;
        let record = records
            .iter_mut()
            .find(|r| r.id == id)
            .ok_or(AggregatorError::NotFound { id })?;
        record.clear_translation(Utc::now());
        Ok(())
    }

    async fn reset_sentinel_translations(&self) -> Result<u64> {
        let mut records = self.records.write().await;
        let now = Utc::now();
        let mut reset = 0;
        for record in records.iter_mut().filter(|r| r.has_sentinel_translation()) {
            record.clear_translation(now);
            reset += 1;
        }
        Ok(reset)
    }

    async fn count(&self, query: &ArticleQuery) -> Result<i64> {
        let records = self.records.read().await;
        Ok(records.iter().filter(|r| query.matches(r)).count() as i64)
    }

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<ArticleRecord>> {
        let records = self.records.read().await;
        let page = Self::sorted_matches(&records, query)
            .into_iter()
            .skip(query.offset)
            .take(query.limit.unwrap_or(usize::MAX))
            .collect();
        Ok(page)
    }

    async fn distinct_categories(&self, translated_only: bool) -> Result<Vec<String>> {
        let records = self.records.read().await;
        Ok(Self::category_map(&records, translated_only).into_keys().collect())
    }

    async fn category_counts(&self, translated_only: bool) -> Result<Vec<CategoryCount>> {
        let records = self.records.read().await;
        let mut counts: Vec<CategoryCount> = Self::category_map(&records, translated_only)
            .into_iter()
            .map(|(name, count)| CategoryCount { name, count })
            .collect();
        counts.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.name.cmp(&b.name)));
        Ok(counts)
    }

    async fn count_by_source(&self) -> Result<Vec<SourceCount>> {
        let records = self.records.read().await;
        Ok(Self::source_counts(records.iter()))
    }

    async fn translated_count_by_source(&self) -> Result<Vec<SourceCount>> {
        let records = self.records.read().await;
        Ok(Self::source_counts(records.iter().filter(|r| r.is_translated)))
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}
