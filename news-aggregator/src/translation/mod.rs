pub mod deepl;
pub mod enrich;
pub mod mock;

pub use deepl::DeepLTranslator;
pub use enrich::{strip_preamble, ParaphraseEnricher};
pub use mock::{MockCall, MockReply, MockTranslator};

use crate::types::Result;
use async_trait::async_trait;

/// A machine-translation backend.
#[async_trait]
pub trait Translator: Send + Sync {
    fn translator_name(&self) -> String;

    /// Translates `text` into `target_lang`.
    ///
    /// `source_lang` is passed through when known; `None` lets the service detect it.
    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<String>;
}

/// Second-stage pass that expands an already translated summary.
///
/// The output format of the underlying service is not guaranteed, so an
/// implementation returns the input unchanged when it cannot isolate a
/// usable expansion.
#[async_trait]
pub trait Enricher: Send + Sync {
    async fn enrich(&self, translated: &str, lang: &str) -> Result<String>;
}
