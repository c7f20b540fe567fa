use crate::config::SourceConfig;
use crate::normalize::normalize;
use crate::sources::Source;
use crate::store::ArticleStore;
use crate::traits::PullFeed;
use crate::types::{NewArticle, SourceOutcome};
use crate::Fetcher;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, error, info, warn};

struct RegisteredSource {
    config: SourceConfig,
    adapter: Box<dyn PullFeed>,
}

/// Pulls every enabled source in registration order and stores new articles.
pub struct IngestionCoordinator {
    store: Arc<dyn ArticleStore>,
    sources: Vec<RegisteredSource>,
}

impl IngestionCoordinator {
    pub fn new(store: Arc<dyn ArticleStore>) -> Self {
        Self {
            store,
            sources: Vec::new(),
        }
    }

    /// Builds the adapter for each config with a shared fetcher.
    pub fn from_configs(
        store: Arc<dyn ArticleStore>,
        configs: Vec<SourceConfig>,
        fetcher: Fetcher,
    ) -> Self {
        let mut coordinator = Self::new(store);
        for config in configs {
            let adapter = Source::from_config(&config, fetcher.clone());
            coordinator.add_source(config, Box::new(adapter));
        }
        coordinator
    }

    pub fn add_source(&mut self, config: SourceConfig, adapter: Box<dyn PullFeed>) {
        info!("Registered source {} ({:?}, {})", config.name, config.kind, config.url);
        self.sources.push(RegisteredSource { config, adapter });
    }

    pub fn source_count(&self) -> usize {
        self.sources.len()
    }

    /// Runs one ingestion pass. A failing source is recorded in its outcome
    /// and the remaining sources still run.
    pub async fn run_ingestion(&mut self) -> Vec<SourceOutcome> {
        let mut outcomes = Vec::with_capacity(self.sources.len());

        for source in self.sources.iter_mut() {
            if !source.config.enabled {
                debug!("Skipping disabled source {}", source.config.name);
                continue;
            }

            let mut outcome = SourceOutcome::new(source.config.name);

            let batch = match source.adapter.pull().await {
                Ok(batch) => batch,
                Err(e) => {
                    error!("Source {} failed: {}", source.config.name, e);
                    outcome.error_count += 1;
                    outcome.last_error = Some(e.to_string());
                    outcomes.push(outcome);
                    continue;
                }
            };

            outcome.skipped_count = batch.skipped;
            outcome.error_count = batch.failed;

            let now = Utc::now();
            for raw in batch.items {
                let config = &source.config;
                let candidate = normalize(raw, config.name, &config.default_categories, now);
                Self::store_candidate(self.store.as_ref(), candidate, &mut outcome).await;
            }

            info!(
                "{}: {} new, {} duplicate, {} errors, {} skipped",
                outcome.source_name,
                outcome.new_count,
                outcome.duplicate_count,
                outcome.error_count,
                outcome.skipped_count
            );
            outcomes.push(outcome);
        }

        outcomes
    }

    async fn store_candidate(
        store: &dyn ArticleStore,
        candidate: NewArticle,
        outcome: &mut SourceOutcome,
    ) {
        match store
            .find_existing(&candidate.source_url, candidate.external_id.as_deref())
            .await
        {
            Ok(Some(_)) => {
                outcome.duplicate_count += 1;
                return;
            }
            Ok(None) => {}
            Err(e) => {
                warn!("Lookup failed for {}: {}", candidate.source_url, e);
                outcome.error_count += 1;
                outcome.last_error = Some(e.to_string());
                return;
            }
        }

        let url = candidate.source_url.clone();
        match store.insert(candidate).await {
            Ok(record) => {
                debug!("Stored new article {}: {}", record.id, record.title);
                outcome.new_count += 1;
            }
            Err(e) if e.is_duplicate() => {
                debug!("Concurrent insert already stored {}", url);
                outcome.duplicate_count += 1;
            }
            Err(e) => {
                warn!("Failed to store {}: {}", url, e);
                outcome.error_count += 1;
                outcome.last_error = Some(e.to_string());
            }
        }
    }
}
