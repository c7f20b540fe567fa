use crate::store::ArticleStore;
use crate::types::{
    AggregatorError, ArticleQuery, ArticleRecord, CategoryCount, NewArticle, Result, SourceCount,
    TranslationUpdate,
};
use async_trait::async_trait;
use chrono::Utc;
use interfaces::{SourceName, NO_TRANSLATION_PREFIX, TRANSLATION_FAILED_PREFIX};
use sqlx::postgres::{PgPoolOptions, PgRow};
use sqlx::{PgPool, Postgres, QueryBuilder, Row};
use tracing::{debug, info};
use uuid::Uuid;

const UNIQUE_VIOLATION: &str = "23505";

const SCHEMA: &[&str] = &[
    r#"
    CREATE TABLE IF NOT EXISTS articles (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        title_translated TEXT,
        summary TEXT NOT NULL DEFAULT '',
        summary_translated TEXT,
        body TEXT,
        source_url TEXT NOT NULL,
        published_at TIMESTAMPTZ NOT NULL,
        author TEXT NOT NULL DEFAULT 'Unknown',
        categories TEXT[] NOT NULL DEFAULT '{}',
        guid TEXT,
        external_id TEXT,
        source_name TEXT NOT NULL,
        popularity_score BIGINT NOT NULL DEFAULT 0,
        is_translated BOOLEAN NOT NULL DEFAULT FALSE,
        translated_at TIMESTAMPTZ,
        estimated_read_minutes INTEGER NOT NULL DEFAULT 1 CHECK (estimated_read_minutes >= 1),
        created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
        updated_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
    )
    "#,
    "CREATE UNIQUE INDEX IF NOT EXISTS articles_source_url_key ON articles (source_url)",
    "CREATE UNIQUE INDEX IF NOT EXISTS articles_external_id_key ON articles (external_id) \
     WHERE external_id IS NOT NULL",
    "CREATE INDEX IF NOT EXISTS articles_published_at_idx ON articles (published_at DESC)",
    "CREATE INDEX IF NOT EXISTS articles_is_translated_idx ON articles (is_translated)",
    "CREATE INDEX IF NOT EXISTS articles_source_translated_idx \
     ON articles (source_name, is_translated)",
    "CREATE INDEX IF NOT EXISTS articles_categories_idx ON articles USING GIN (categories)",
];

pub struct PgArticleStore {
    db: PgPool,
}

impl PgArticleStore {
    pub async fn connect(database_url: &str) -> Result<Self> {
        let db = PgPoolOptions::new()
            .max_connections(5)
            .connect(database_url)
            .await?;
        Ok(Self { db })
    }

    pub fn from_pool(db: PgPool) -> Self {
        Self { db }
    }

    pub fn get_db_pool(&self) -> &PgPool {
        &self.db
    }

    /// Creates the articles table and its indexes if they are missing.
    pub async fn setup_schema(&self) -> Result<()> {
        for (i, statement) in SCHEMA.iter().enumerate() {
            sqlx::query(statement).execute(&self.db).await?;
            debug!("Applied schema statement {}", i);
        }
        info!("Article schema ready");
        Ok(())
    }

    fn row_to_record(row: &PgRow) -> Result<ArticleRecord> {
        let source_name: String = row.try_get("source_name")?;
        let source_name = source_name
            .parse::<SourceName>()
            .map_err(|e| AggregatorError::Database(sqlx::Error::Decode(Box::new(e))))?;

        Ok(ArticleRecord {
            id: row.try_get("id")?,
            title: row.try_get("title")?,
            title_translated: row.try_get("title_translated")?,
            summary: row.try_get("summary")?,
            summary_translated: row.try_get("summary_translated")?,
            body: row.try_get("body")?,
            source_url: row.try_get("source_url")?,
            published_at: row.try_get("published_at")?,
            author: row.try_get("author")?,
            categories: row.try_get("categories")?,
            guid: row.try_get("guid")?,
            external_id: row.try_get("external_id")?,
            source_name,
            popularity_score: row.try_get("popularity_score")?,
            is_translated: row.try_get("is_translated")?,
            translated_at: row.try_get("translated_at")?,
            estimated_read_minutes: row.try_get("estimated_read_minutes")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }

    fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, query: &ArticleQuery) {
        builder.push(" WHERE TRUE");
        if let Some(category) = &query.category {
            builder.push(" AND ");
            builder.push_bind(category.clone());
            builder.push(" = ANY(categories)");
        }
        if let Some(source) = query.source {
            builder.push(" AND source_name = ");
            builder.push_bind(source.as_str());
        }
        if let Some(translated) = query.translated {
            builder.push(" AND is_translated = ");
            builder.push_bind(translated);
        }
    }

    fn map_write_error(error: sqlx::Error, article: &NewArticle) -> AggregatorError {
        if let sqlx::Error::Database(db_error) = &error {
            if db_error.code().as_deref() == Some(UNIQUE_VIOLATION) {
                let key = match db_error.constraint() {
                    Some("articles_external_id_key") => format!(
                        "external_id={}",
                        article.external_id.as_deref().unwrap_or_default()
                    ),
                    _ => format!("source_url={}", article.source_url),
                };
                return AggregatorError::Duplicate { key };
            }
        }
        AggregatorError::Database(error)
    }

    async fn source_counts(&self, translated_only: bool) -> Result<Vec<SourceCount>> {
        let sql = if translated_only {
            "SELECT source_name, COUNT(*) AS count FROM articles WHERE is_translated = TRUE \
             GROUP BY source_name ORDER BY source_name"
        } else {
            "SELECT source_name, COUNT(*) AS count FROM articles \
             GROUP BY source_name ORDER BY source_name"
        };

        let rows = sqlx::query(sql).fetch_all(&self.db).await?;
        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            let name: String = row.try_get("source_name")?;
            let source = name
                .parse::<SourceName>()
                .map_err(|e| AggregatorError::Database(sqlx::Error::Decode(Box::new(e))))?;
            counts.push(SourceCount {
                source,
                count: row.try_get("count")?,
            });
        }
        Ok(counts)
    }
}

#[async_trait]
impl ArticleStore for PgArticleStore {
    async fn find_existing(
        &self,
        source_url: &str,
        external_id: Option<&str>,
    ) -> Result<Option<ArticleRecord>> {
        let row = sqlx::query(
            r#"
            SELECT * FROM articles
            WHERE source_url = $1 OR ($2::TEXT IS NOT NULL AND external_id = $2)
            LIMIT 1
            "#,
        )
        .bind(source_url)
        .bind(external_id)
        .fetch_optional(&self.db)
        .await?;

        row.as_ref().map(Self::row_to_record).transpose()
    }

    async fn insert(&self, article: NewArticle) -> Result<ArticleRecord> {
        let record = ArticleRecord::from_new(article.clone(), Utc::now());

        sqlx::query(
            r#"
            INSERT INTO articles (
                id, title, summary, body, source_url, published_at, author, categories,
                guid, external_id, source_name, popularity_score, is_translated,
                estimated_read_minutes, created_at, updated_at
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, FALSE, $13, $14, $15)
            "#,
        )
        .bind(record.id)
        .bind(&record.title)
        .bind(&record.summary)
        .bind(&record.body)
        .bind(&record.source_url)
        .bind(record.published_at)
        .bind(&record.author)
        .bind(&record.categories)
        .bind(&record.guid)
        .bind(&record.external_id)
        .bind(record.source_name.as_str())
        .bind(record.popularity_score)
        .bind(record.estimated_read_minutes)
        .bind(record.created_at)
        .bind(record.updated_at)
        .execute(&self.db)
        .await
        .map_err(|e| Self::map_write_error(e, &article))?;

        debug!("Inserted article {} ({})", record.id, record.source_url);
        Ok(record)
    }

    async fn get(&self, id: Uuid) -> Result<ArticleRecord> {
        let row = sqlx::query("SELECT * FROM articles WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.db)
            .await?;

        match row {
            Some(row) => Self::row_to_record(&row),
            None => Err(AggregatorError::NotFound { id }),
        }
    }

    async fn untranslated(&self, limit: usize) -> Result<Vec<ArticleRecord>> {
        let rows = sqlx::query(
            "SELECT * FROM articles WHERE is_translated = FALSE \
             ORDER BY published_at DESC LIMIT $1",
        )
        .bind(limit as i64)
        .fetch_all(&self.db)
        .await?;

        rows.iter().map(Self::row_to_record).collect()
    }

    async fn mark_translated(&self, id: Uuid, update: TranslationUpdate) -> Result<()> {
        let now = Utc::now();
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title_translated = $1, summary_translated = $2, is_translated = TRUE,
                translated_at = $3, updated_at = $3
            WHERE id = $4
            "#,
        )
        .bind(update.title_translated)
        .bind(update.summary_translated)
        .bind(now)
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AggregatorError::NotFound { id });
        }
        Ok(())
    }

    async fn reset_translation(&self, id: Uuid) -> Result<()> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title_translated = NULL, summary_translated = NULL, is_translated = FALSE,
                translated_at = NULL, updated_at = NOW()
            WHERE id = $1
            "#,
        )
        .bind(id)
        .execute(&self.db)
        .await?;

        if result.rows_affected() == 0 {
            return Err(AggregatorError::NotFound { id });
        }
        Ok(())
    }

    async fn reset_sentinel_translations(&self) -> Result<u64> {
        let result = sqlx::query(
            r#"
            UPDATE articles
            SET title_translated = NULL, summary_translated = NULL, is_translated = FALSE,
                translated_at = NULL, updated_at = NOW()
            WHERE title_translated LIKE $1 OR title_translated LIKE $2
               OR summary_translated LIKE $1 OR summary_translated LIKE $2
            "#,
        )
        .bind(format!("{}%", TRANSLATION_FAILED_PREFIX))
        .bind(format!("{}%", NO_TRANSLATION_PREFIX))
        .execute(&self.db)
        .await?;

        info!("Reset {} articles with placeholder translations", result.rows_affected());
        Ok(result.rows_affected())
    }

    async fn count(&self, query: &ArticleQuery) -> Result<i64> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM articles");
        Self::push_filters(&mut builder, query);

        let count = builder.build_query_scalar::<i64>().fetch_one(&self.db).await?;
        Ok(count)
    }

    async fn list(&self, query: &ArticleQuery) -> Result<Vec<ArticleRecord>> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM articles");
        Self::push_filters(&mut builder, query);
        builder.push(" ORDER BY published_at DESC");
        if let Some(limit) = query.limit {
            builder.push(" LIMIT ");
            builder.push_bind(limit as i64);
        }
        builder.push(" OFFSET ");
        builder.push_bind(query.offset as i64);

        let rows = builder.build().fetch_all(&self.db).await?;
        rows.iter().map(Self::row_to_record).collect()
    }

    async fn distinct_categories(&self, translated_only: bool) -> Result<Vec<String>> {
        let categories = sqlx::query_scalar::<_, String>(
            r#"
            SELECT DISTINCT category
            FROM articles, unnest(categories) AS category
            WHERE ($1 = FALSE OR is_translated = TRUE)
            ORDER BY category
            "#,
        )
        .bind(translated_only)
        .fetch_all(&self.db)
        .await?;

        Ok(categories)
    }

    async fn category_counts(&self, translated_only: bool) -> Result<Vec<CategoryCount>> {
        let rows = sqlx::query(
            r#"
            SELECT category AS name, COUNT(*) AS count
            FROM articles, unnest(categories) AS category
            WHERE ($1 = FALSE OR is_translated = TRUE)
            GROUP BY category
            ORDER BY count DESC, name
            "#,
        )
        .bind(translated_only)
        .fetch_all(&self.db)
        .await?;

        let mut counts = Vec::with_capacity(rows.len());
        for row in rows {
            counts.push(CategoryCount {
                name: row.try_get("name")?,
                count: row.try_get("count")?,
            });
        }
        Ok(counts)
    }

    async fn count_by_source(&self) -> Result<Vec<SourceCount>> {
        self.source_counts(false).await
    }

    async fn translated_count_by_source(&self) -> Result<Vec<SourceCount>> {
        self.source_counts(true).await
    }

    async fn close(&self) {
        self.db.close().await;
        info!("Database connection closed");
    }
}
