#![allow(dead_code)]

use async_trait::async_trait;
use axum::Router;
use chrono::{TimeZone, Utc};
use news_aggregator::types::*;
use news_aggregator::{ArticleStore, MemoryArticleStore};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, Once};
use uuid::Uuid;

static INIT: Once = Once::new();

pub fn init_tracing() {
    INIT.call_once(|| {
        tracing_subscriber::fmt()
            .with_max_level(tracing::Level::DEBUG)
            .with_test_writer()
            .try_init()
            .ok();
    });
}

/// Serves `app` on an ephemeral local port and returns its base URL.
pub async fn spawn_server(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

pub const THREE_ENTRY_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:dc="http://purl.org/dc/elements/1.1/">
  <channel>
    <title>Fake Tech</title>
    <link>https://example.com</link>
    <description>Fake technology news</description>
    <item>
      <title>First story</title>
      <link>https://example.com/first</link>
      <description>&lt;p&gt;A short summary of the &lt;b&gt;first&lt;/b&gt; story.&lt;/p&gt;</description>
      <pubDate>Mon, 06 Jan 2025 10:00:00 GMT</pubDate>
      <dc:creator>Alice</dc:creator>
      <category>AI</category>
      <category>Startups</category>
      <guid>https://example.com/first</guid>
    </item>
    <item>
      <title>Second story</title>
      <link>https://example.com/second</link>
      <description>Second summary.</description>
      <pubDate>Tue, 07 Jan 2025 10:00:00 GMT</pubDate>
      <guid isPermaLink="false">second-guid</guid>
    </item>
    <item>
      <title>No link here</title>
      <description>This entry has nowhere to point.</description>
      <guid isPermaLink="false">third-guid</guid>
    </item>
  </channel>
</rss>"#;

pub fn new_article(n: u32, source_name: SourceName) -> NewArticle {
    NewArticle {
        title: format!("Article {}", n),
        summary: format!("Summary of article {}", n),
        body: None,
        source_url: format!("https://example.com/articles/{}", n),
        published_at: Utc.with_ymd_and_hms(2025, 1, n.clamp(1, 28), 12, 0, 0).unwrap(),
        author: "Unknown".to_string(),
        categories: vec!["Technology".to_string()],
        guid: None,
        external_id: None,
        source_name,
        popularity_score: 0,
        estimated_read_minutes: 1,
    }
}

/// Reports "not found" on lookup, then loses the insert race to a concurrent writer.
pub struct RacingStore {
    pub inner: MemoryArticleStore,
}

#[async_trait]
impl ArticleStore for RacingStore {
    async fn find_existing(
        &self,
        _source_url: &str,
        _external_id: Option<&str>,
    ) -> Result<Option<ArticleRecord>> {
        Ok(None)
    }

    async fn insert(&self, article: NewArticle) -> Result<ArticleRecord> {
        self.inner.insert(article).await
    }

    async fn get(&self, id: Uuid) -> Result<ArticleRecord> {
        self.inner.get(id).await
    }

    async fn untranslated(&self, limit: usize) -> Result<Vec<ArticleRecord>> {
        self.inner.untranslated(limit).await
    }

    async fn mark_translated(&self, id: Uuid, update: TranslationUpdate) -> Result<()> {
        self.inner.mark_translated(id, update).await
    }

    async fn reset_translation(&self, id: Uuid) -> Result<()> {
        self.inner.reset_translation(id).await
    }

    async fn reset_sentinel_translations(&self) -> Result<u64> {
        self.inner.reset_sentinel_translations().await
    }

    async fn count(&self, query: &ArticleQuery) -> Result<i64> {
        self.inner.count(query).await
    }

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<ArticleRecord>> {
        self.inner.list(query).await
    }

    async fn distinct_categories(&self, translated_only: bool) -> Result<Vec<String>> {
        self.inner.distinct_categories(translated_only).await
    }

    async fn category_counts(&self, translated_only: bool) -> Result<Vec<CategoryCount>> {
        self.inner.category_counts(translated_only).await
    }

    async fn count_by_source(&self) -> Result<Vec<SourceCount>> {
        self.inner.count_by_source().await
    }

    async fn translated_count_by_source(&self) -> Result<Vec<SourceCount>> {
        self.inner.translated_count_by_source().await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

/// Every operation fails as if the database went away; `close` is still tracked.
#[derive(Default)]
pub struct BrokenStore {
    closed: AtomicBool,
}

impl BrokenStore {
    pub fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }

    fn down<T>() -> Result<T> {
        Err(AggregatorError::Database(sqlx::Error::PoolClosed))
    }
}

#[async_trait]
impl ArticleStore for BrokenStore {
    async fn find_existing(
        &self,
        _source_url: &str,
        _external_id: Option<&str>,
    ) -> Result<Option<ArticleRecord>> {
        Self::down()
    }

    async fn insert(&self, _article: NewArticle) -> Result<ArticleRecord> {
        Self::down()
    }

    async fn get(&self, _id: Uuid) -> Result<ArticleRecord> {
        Self::down()
    }

    async fn untranslated(&self, _limit: usize) -> Result<Vec<ArticleRecord>> {
        Self::down()
    }

    async fn mark_translated(&self, _id: Uuid, _update: TranslationUpdate) -> Result<()> {
        Self::down()
    }

    async fn reset_translation(&self, _id: Uuid) -> Result<()> {
        Self::down()
    }

    async fn reset_sentinel_translations(&self) -> Result<u64> {
        Self::down()
    }

    async fn count(&self, _query: &ArticleQuery) -> Result<i64> {
        Self::down()
    }

    async fn list(&self, _query: &ArticleQuery) -> Result<Vec<ArticleRecord>> {
        Self::down()
    }

    async fn distinct_categories(&self, _translated_only: bool) -> Result<Vec<String>> {
        Self::down()
    }

    async fn category_counts(&self, _translated_only: bool) -> Result<Vec<CategoryCount>> {
        Self::down()
    }

    async fn count_by_source(&self) -> Result<Vec<SourceCount>> {
        Self::down()
    }

    async fn translated_count_by_source(&self) -> Result<Vec<SourceCount>> {
        Self::down()
    }

    async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }
}

/// Refuses the translation write for one chosen record; everything else is in memory.
#[derive(Default)]
pub struct FailingWriteStore {
    pub inner: MemoryArticleStore,
    fail_id: Mutex<Option<Uuid>>,
}

impl FailingWriteStore {
    pub fn fail_writes_for(&self, id: Uuid) {
        *self.fail_id.lock().unwrap() = Some(id);
    }
}

#[async_trait]
impl ArticleStore for FailingWriteStore {
    async fn find_existing(
        &self,
        source_url: &str,
        external_id: Option<&str>,
    ) -> Result<Option<ArticleRecord>> {
        self.inner.find_existing(source_url, external_id).await
    }

    async fn insert(&self, article: NewArticle) -> Result<ArticleRecord> {
        self.inner.insert(article).await
    }

    async fn get(&self, id: Uuid) -> Result<ArticleRecord> {
        self.inner.get(id).await
    }

    async fn untranslated(&self, limit: usize) -> Result<Vec<ArticleRecord>> {
        self.inner.untranslated(limit).await
    }

    async fn mark_translated(&self, id: Uuid, update: TranslationUpdate) -> Result<()> {
        if *self.fail_id.lock().unwrap() == Some(id) {
            return Err(AggregatorError::Database(sqlx::Error::PoolTimedOut));
        }
        self.inner.mark_translated(id, update).await
    }

    async fn reset_translation(&self, id: Uuid) -> Result<()> {
        self.inner.reset_translation(id).await
    }

    async fn reset_sentinel_translations(&self) -> Result<u64> {
        self.inner.reset_sentinel_translations().await
    }

    async fn count(&self, query: &ArticleQuery) -> Result<i64> {
        self.inner.count(query).await
    }

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<ArticleRecord>> {
        self.inner.list(query).await
    }

    async fn distinct_categories(&self, translated_only: bool) -> Result<Vec<String>> {
        self.inner.distinct_categories(translated_only).await
    }

    async fn category_counts(&self, translated_only: bool) -> Result<Vec<CategoryCount>> {
        self.inner.category_counts(translated_only).await
    }

    async fn count_by_source(&self) -> Result<Vec<SourceCount>> {
        self.inner.count_by_source().await
    }

    async fn translated_count_by_source(&self) -> Result<Vec<SourceCount>> {
        self.inner.translated_count_by_source().await
    }

    async fn close(&self) {
        self.inner.close().await
    }
}

pub fn memory_store() -> Arc<MemoryArticleStore> {
    Arc::new(MemoryArticleStore::new())
}
