mod common;

use axum::http::header;
use axum::routing::get;
use axum::Router;
use common::{init_tracing, memory_store, spawn_server, BrokenStore, THREE_ENTRY_FEED};
use news_aggregator::config::SourceConfig;
use news_aggregator::types::*;
use news_aggregator::{
    ArticleStore, FetchConfig, Fetcher, IngestionCoordinator, MockTranslator, PipelineConfig,
    RunMode, Runner, TranslationPipeline,
};
use std::sync::Arc;
use std::time::Duration;

fn pipeline_config() -> PipelineConfig {
    PipelineConfig {
        call_delay: Duration::ZERO,
        batch_size: 5,
        ..PipelineConfig::default()
    }
}

async fn feed_sources() -> Vec<SourceConfig> {
    let app = Router::new().route(
        "/feed",
        get(|| async { ([(header::CONTENT_TYPE, "application/rss+xml")], THREE_ENTRY_FEED) }),
    );
    let base = spawn_server(app).await;
    vec![SourceConfig::feed(SourceName::TechCrunch, format!("{}/feed", base))]
}

fn runner(store: Arc<dyn ArticleStore>, sources: Vec<SourceConfig>, translate: bool) -> Runner {
    let fetcher = Fetcher::new(FetchConfig::default()).unwrap();
    let ingestion = IngestionCoordinator::from_configs(store.clone(), sources, fetcher);
    let translator = if translate {
        Some(Arc::new(MockTranslator::new("runner")) as Arc<dyn news_aggregator::Translator>)
    } else {
        None
    };
    let translation = TranslationPipeline::new(store.clone(), translator, pipeline_config());
    Runner::new(store, ingestion, translation)
}

#[test]
fn test_run_mode_flags() {
    assert_eq!(RunMode::default(), RunMode::Fetch);
    assert!(RunMode::Fetch.ingests() && !RunMode::Fetch.translates());
    assert!(!RunMode::Translate.ingests() && RunMode::Translate.translates());
    assert!(RunMode::Both.ingests() && RunMode::Both.translates());
    assert!(!RunMode::Reset.ingests() && !RunMode::Reset.translates());
    assert_eq!(RunMode::Both.to_string(), "both");
}

#[tokio::test]
async fn test_fetch_run_reports_counts_and_closes_store() {
    init_tracing();
    let store = memory_store();

    let stats = runner(store.clone(), feed_sources().await, true)
        .run(RunMode::Fetch)
        .await
        .unwrap();

    assert_eq!(stats.mode, RunMode::Fetch);
    assert_eq!(stats.new_count(), 2);
    assert_eq!(stats.duplicate_count(), 0);
    assert_eq!(stats.error_count(), 0);
    assert_eq!(stats.attempted, 0);
    assert_eq!(stats.total, 2);
    assert_eq!(stats.translated, 0);
    assert_eq!(stats.untranslated, 2);
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_both_mode_ingests_then_translates() {
    init_tracing();
    let store = memory_store();

    let stats = runner(store.clone(), feed_sources().await, true)
        .run(RunMode::Both)
        .await
        .unwrap();

    assert_eq!(stats.new_count(), 2);
    assert_eq!(stats.attempted, 2);
    assert_eq!(stats.translated, 2);
    assert_eq!(stats.untranslated, 0);
    assert_eq!(
        stats.translated_by_source,
        vec![SourceCount {
            source: SourceName::TechCrunch,
            count: 2
        }]
    );
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_translate_mode_skips_ingestion() {
    init_tracing();
    let store = memory_store();
    store.insert(common::new_article(1, SourceName::ArsTechnica)).await.unwrap();

    let stats = runner(store.clone(), feed_sources().await, false)
        .run(RunMode::Translate)
        .await
        .unwrap();

    assert!(stats.outcomes.is_empty());
    assert_eq!(stats.attempted, 1);
    assert_eq!(stats.total, 1);

    let record = &store.all().await[0];
    assert!(record.title_translated.as_deref().unwrap().starts_with(NO_TRANSLATION_PREFIX));
}

#[tokio::test]
async fn test_reset_mode_requeues_placeholders() {
    init_tracing();
    let store = memory_store();
    for n in 1..=3 {
        store.insert(common::new_article(n, SourceName::HackerNews)).await.unwrap();
    }

    runner(store.clone(), Vec::new(), false)
        .run(RunMode::Translate)
        .await
        .unwrap();
    assert_eq!(store.untranslated(10).await.unwrap().len(), 0);

    let stats = runner(store.clone(), Vec::new(), false)
        .run(RunMode::Reset)
        .await
        .unwrap();

    assert_eq!(stats.reset_count, 3);
    assert_eq!(stats.translated, 0);
    assert_eq!(stats.untranslated, 3);
}

#[tokio::test]
async fn test_failed_run_still_closes_store() {
    init_tracing();
    let store = Arc::new(BrokenStore::default());

    let result = runner(store.clone(), Vec::new(), true).run(RunMode::Translate).await;

    assert!(matches!(result, Err(AggregatorError::Database(_))));
    assert!(store.is_closed());
}

#[tokio::test]
async fn test_fetch_run_survives_unreachable_source() {
    init_tracing();
    let store = memory_store();
    let sources = vec![SourceConfig::feed(SourceName::TechCrunch, "http://127.0.0.1:1/feed")];

    let stats = runner(store.clone(), sources, false).run(RunMode::Fetch).await.unwrap();

    assert_eq!(stats.error_count(), 1);
    assert!(stats.outcomes[0].last_error.is_some());
    assert_eq!(stats.total, 0);
    assert!(store.is_closed());
}
