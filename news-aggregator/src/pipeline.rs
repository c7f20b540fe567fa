use crate::config::PipelineConfig;
use crate::store::ArticleStore;
use crate::translation::{Enricher, Translator};
use crate::types::{ArticleRecord, Result, TranslationUpdate};
use interfaces::{is_sentinel, NO_TRANSLATION_PREFIX, TRANSLATION_FAILED_PREFIX};
use std::sync::Arc;
use tokio::time::{sleep, Duration};
use tracing::{debug, error, info, warn};

/// Spaces consecutive external calls by a fixed delay.
struct Pacer {
    delay: Duration,
    called: bool,
}

impl Pacer {
    fn new(delay: Duration) -> Self {
        Self { delay, called: false }
    }

    async fn before_call(&mut self) {
        if self.called && !self.delay.is_zero() {
            sleep(self.delay).await;
        }
        self.called = true;
    }
}

/// Works through the untranslated backlog one record at a time.
///
/// Every record selected is attempted exactly once. Service failures become
/// sentinel-prefixed text, and a failed store write is logged and skipped.
pub struct TranslationPipeline {
    store: Arc<dyn ArticleStore>,
    translator: Option<Arc<dyn Translator>>,
    enricher: Option<Arc<dyn Enricher>>,
    config: PipelineConfig,
}

impl TranslationPipeline {
    pub fn new(
        store: Arc<dyn ArticleStore>,
        translator: Option<Arc<dyn Translator>>,
        config: PipelineConfig,
    ) -> Self {
        Self {
            store,
            translator,
            enricher: None,
            config,
        }
    }

    pub fn with_enricher(mut self, enricher: Arc<dyn Enricher>) -> Self {
        self.enricher = Some(enricher);
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn has_translator(&self) -> bool {
        self.translator.is_some()
    }

    /// Translates up to `batch_size` records, most recently published first.
    ///
    /// Returns the number of records attempted.
    pub async fn translate_backlog(&self, batch_size: usize) -> Result<usize> {
        let backlog = self.store.untranslated(batch_size).await?;
        if backlog.is_empty() {
            info!("Translation backlog is empty");
            return Ok(0);
        }

        match &self.translator {
            Some(translator) => info!(
                "Translating {} articles to {} with {}",
                backlog.len(),
                self.config.target_lang,
                translator.translator_name()
            ),
            None => warn!(
                "No translation credential configured; marking {} articles with placeholders",
                backlog.len()
            ),
        }

        let mut pacer = Pacer::new(self.config.call_delay);

        for record in &backlog {
            let update = self.translate_record(record, &mut pacer).await;
            match self.store.mark_translated(record.id, update).await {
                Ok(()) => debug!("Stored translation for {}", record.source_url),
                Err(e) => error!("Failed to store translation for {}: {}", record.source_url, e),
            }
        }

        info!("Attempted translation of {} articles", backlog.len());
        Ok(backlog.len())
    }

    async fn translate_record(
        &self,
        record: &ArticleRecord,
        pacer: &mut Pacer,
    ) -> TranslationUpdate {
        debug!("Translating: {}", record.title);

        let title_translated = self.translate_text(&record.title, pacer).await;

        let summary_translated = if record.summary.trim().is_empty() {
            None
        } else {
            let first_stage = self.translate_text(&record.summary, pacer).await;
            Some(self.maybe_enrich(first_stage, pacer).await)
        };

        TranslationUpdate {
            title_translated,
            summary_translated,
        }
    }

    /// Single-stage translation that always yields a value.
    async fn translate_text(&self, text: &str, pacer: &mut Pacer) -> String {
        let Some(translator) = &self.translator else {
            return format!("{}{}", NO_TRANSLATION_PREFIX, text);
        };

        pacer.before_call().await;
        match translator.translate(text, &self.config.target_lang, None).await {
            Ok(translated) if !translated.trim().is_empty() => translated,
            Ok(_) => {
                warn!("Translation service returned empty text");
                format!("{}{}", TRANSLATION_FAILED_PREFIX, text)
            }
            Err(e) => {
                warn!("Translation failed, storing fallback: {}", e);
                format!("{}{}", TRANSLATION_FAILED_PREFIX, text)
            }
        }
    }

    async fn maybe_enrich(&self, first_stage: String, pacer: &mut Pacer) -> String {
        let Some(enricher) = &self.enricher else {
            return first_stage;
        };
        let Some(threshold) = self.config.enrich_below_chars else {
            return first_stage;
        };
        if is_sentinel(&first_stage) || first_stage.chars().count() >= threshold {
            return first_stage;
        }

        pacer.before_call().await;
        match enricher.enrich(&first_stage, &self.config.target_lang).await {
            Ok(expanded) if !expanded.trim().is_empty() => expanded,
            Ok(_) => first_stage,
            Err(e) => {
                debug!("Enrichment failed, keeping first-stage translation: {}", e);
                first_stage
            }
        }
    }
}
