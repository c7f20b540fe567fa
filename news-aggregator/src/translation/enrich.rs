use crate::translation::{Enricher, Translator};
use crate::types::Result;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

const EXPAND_INSTRUCTION: &str = "Explain the following in more detail";

/// Removes an echoed instruction from the start of a service response.
///
/// Looks for the last ASCII or full-width colon on the first line and keeps
/// what follows. Returns `None` when there is no such delimiter or nothing
/// is left after it.
pub fn strip_preamble(response: &str) -> Option<String> {
    let trimmed = response.trim();
    let first_line = trimmed.lines().next().unwrap_or_default();
    let cut = first_line.rfind([':', '：'])?;
    let delimiter_len = first_line[cut..].chars().next()?.len_utf8();

    let payload = trimmed[cut + delimiter_len..].trim();
    if payload.is_empty() {
        None
    } else {
        Some(payload.to_string())
    }
}

/// Asks the translation service for a same-language expanded paraphrase.
pub struct ParaphraseEnricher {
    translator: Arc<dyn Translator>,
}

impl ParaphraseEnricher {
    pub fn new(translator: Arc<dyn Translator>) -> Self {
        Self { translator }
    }
}

#[async_trait]
impl Enricher for ParaphraseEnricher {
    async fn enrich(&self, translated: &str, lang: &str) -> Result<String> {
        let prompt = format!("{}: {}", EXPAND_INSTRUCTION, translated);
        let response = self.translator.translate(&prompt, lang, Some(lang)).await?;

        match strip_preamble(&response) {
            Some(expanded) if expanded != translated => Ok(expanded),
            _ => {
                debug!("Enrichment response had no separable payload, keeping first-stage text");
                Ok(translated.to_string())
            }
        }
    }
}
