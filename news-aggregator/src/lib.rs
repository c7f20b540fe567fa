pub mod types;
pub mod config;
pub mod fetcher;
pub mod parser;
pub mod rss_utils;
pub mod normalize;
pub mod traits;
pub mod sources;
pub mod store;
pub mod translation;
pub mod pipeline;
pub mod ingest;
pub mod orchestrator;

pub use types::*;
pub use config::{PipelineConfig, SourceConfig, SourceKind};
pub use fetcher::Fetcher;
pub use parser::FeedParser;
pub use traits::PullFeed;
pub use sources::{HackerNewsSource, RssFeedSource, Source};
pub use store::{ArticleStore, MemoryArticleStore, PgArticleStore};
pub use translation::{DeepLTranslator, Enricher, MockTranslator, ParaphraseEnricher, Translator};
pub use pipeline::TranslationPipeline;
pub use ingest::IngestionCoordinator;
pub use orchestrator::{RunMode, RunStats, Runner};
