pub mod memory;
pub mod postgres;

pub use memory::MemoryArticleStore;
pub use postgres::PgArticleStore;

use crate::types::{
    ArticleQuery, ArticleRecord, CategoryCount, NewArticle, Result, SourceCount, TranslationUpdate,
};
use async_trait::async_trait;
use uuid::Uuid;

/// Persistent collection of articles keyed by `source_url`.
///
/// Implementations enforce uniqueness of `source_url` and of `external_id`
/// when present, and report a violation as `AggregatorError::Duplicate`.
#[async_trait]
pub trait ArticleStore: Send + Sync {
    /// Looks up a record by url, or by external id when one is given.
    async fn find_existing(
        &self,
        source_url: &str,
        external_id: Option<&str>,
    ) -> Result<Option<ArticleRecord>>;

    async fn insert(&self, article: NewArticle) -> Result<ArticleRecord>;

    async fn get(&self, id: Uuid) -> Result<ArticleRecord>;

    /// Untranslated records, most recently published first.
    async fn untranslated(&self, limit: usize) -> Result<Vec<ArticleRecord>>;

    async fn mark_translated(&self, id: Uuid, update: TranslationUpdate) -> Result<()>;

    /// Clears translation fields so the record re-enters the backlog.
    async fn reset_translation(&self, id: Uuid) -> Result<()>;

    /// Resets every record whose title or summary translation is a sentinel.
    async fn reset_sentinel_translations(&self) -> Result<u64>;

    async fn count(&self, query: &ArticleQuery) -> Result<i64>;

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<ArticleRecord>>;

    async fn distinct_categories(&self, translated_only: bool) -> Result<Vec<String>>;

    /// Categories with record counts, largest first.
    async fn category_counts(&self, translated_only: bool) -> Result<Vec<CategoryCount>>;

    async fn count_by_source(&self) -> Result<Vec<SourceCount>>;

    async fn translated_count_by_source(&self) -> Result<Vec<SourceCount>>;

    /// Releases the underlying connection. Called once per run.
    async fn close(&self);
}
