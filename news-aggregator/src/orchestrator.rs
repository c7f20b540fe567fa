use crate::ingest::IngestionCoordinator;
use crate::pipeline::TranslationPipeline;
use crate::store::ArticleStore;
use crate::types::{ArticleQuery, Result, SourceCount, SourceOutcome};
use clap::ValueEnum;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{error, info};

/// What a single invocation does.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum RunMode {
    /// Ingest new articles from every enabled source.
    #[default]
    Fetch,
    /// Translate the untranslated backlog.
    Translate,
    /// Ingest, then translate.
    Both,
    /// Return placeholder-translated articles to the backlog.
    Reset,
}

impl RunMode {
    pub fn ingests(self) -> bool {
        matches!(self, RunMode::Fetch | RunMode::Both)
    }

    pub fn translates(self) -> bool {
        matches!(self, RunMode::Translate | RunMode::Both)
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            RunMode::Fetch => "fetch",
            RunMode::Translate => "translate",
            RunMode::Both => "both",
            RunMode::Reset => "reset",
        };
        f.write_str(name)
    }
}

/// Summary of one run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunStats {
    pub mode: RunMode,
    pub outcomes: Vec<SourceOutcome>,
    pub attempted: usize,
    pub reset_count: u64,
    pub total: i64,
    pub translated: i64,
    pub untranslated: i64,
    pub translated_by_source: Vec<SourceCount>,
    pub elapsed: Duration,
}

impl RunStats {
    pub fn new_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.new_count).sum()
    }

    pub fn duplicate_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.duplicate_count).sum()
    }

    pub fn error_count(&self) -> usize {
        self.outcomes.iter().map(|o| o.error_count).sum()
    }
}

/// Drives ingestion and translation over one store handle.
///
/// The handle is closed when `run` returns, on success and on failure.
pub struct Runner {
    store: Arc<dyn ArticleStore>,
    ingestion: IngestionCoordinator,
    translation: TranslationPipeline,
}

impl Runner {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        ingestion: IngestionCoordinator,
        translation: TranslationPipeline,
    ) -> Self {
        Self {
            store,
            ingestion,
            translation,
        }
    }

    pub async fn run(mut self, mode: RunMode) -> Result<RunStats> {
        info!("Starting {} run", mode);
        let started = Instant::now();

        let result = self.run_inner(mode, started).await;
        if let Err(e) = &result {
            error!("{} run failed: {:?}", mode, e);
        }

        self.store.close().await;
        result
    }

    async fn run_inner(&mut self, mode: RunMode, started: Instant) -> Result<RunStats> {
        let mut stats = RunStats {
            mode,
            ..RunStats::default()
        };

        if mode.ingests() {
            stats.outcomes = self.ingestion.run_ingestion().await;
        }

        if mode.translates() {
            let batch_size = self.translation.config().batch_size;
            stats.attempted = self.translation.translate_backlog(batch_size).await?;
        }

        if mode == RunMode::Reset {
            stats.reset_count = self.store.reset_sentinel_translations().await?;
        }

        stats.total = self.store.count(&ArticleQuery::new()).await?;
        stats.translated = self.store.count(&ArticleQuery::new().translated(true)).await?;
        stats.untranslated = stats.total - stats.translated;
        stats.translated_by_source = self.store.translated_count_by_source().await?;
        stats.elapsed = started.elapsed();

        log_summary(&stats);
        Ok(stats)
    }
}

fn log_summary(stats: &RunStats) {
    for outcome in &stats.outcomes {
        info!(
            "  {}: new={} duplicate={} errors={} skipped={}",
            outcome.source_name,
            outcome.new_count,
            outcome.duplicate_count,
            outcome.error_count,
            outcome.skipped_count
        );
        if let Some(last_error) = &outcome.last_error {
            info!("    last error: {}", last_error);
        }
    }
    if stats.mode.translates() {
        info!("  translation attempted: {}", stats.attempted);
    }
    if stats.mode == RunMode::Reset {
        info!("  translations reset: {}", stats.reset_count);
    }
    info!(
        "Articles: {} total, {} translated, {} untranslated",
        stats.total, stats.translated, stats.untranslated
    );
    for count in &stats.translated_by_source {
        info!("  {} translated: {}", count.source, count.count);
    }
    info!("Run finished in {:.2}s", stats.elapsed.as_secs_f64());
}
