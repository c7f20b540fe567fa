use crate::translation::Translator;
use crate::types::{AggregatorError, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

pub const DEEPL_FREE_ENDPOINT: &str = "https://api-free.deepl.com/v2/translate";
pub const DEEPL_PRO_ENDPOINT: &str = "https://api.deepl.com/v2/translate";

/// Keys issued for the free tier carry this suffix.
const FREE_KEY_SUFFIX: &str = ":fx";

#[derive(Debug, Deserialize)]
struct DeepLResponse {
    translations: Vec<DeepLTranslation>,
}

#[derive(Debug, Deserialize)]
struct DeepLTranslation {
    text: String,
}

/// Form-encoded client for the DeepL v2 translate endpoint.
pub struct DeepLTranslator {
    client: Client,
    auth_key: String,
    endpoint: String,
}

impl DeepLTranslator {
    pub fn new(client: Client, auth_key: impl Into<String>) -> Self {
        let auth_key = auth_key.into();
        let endpoint = Self::endpoint_for_key(&auth_key).to_string();
        Self {
            client,
            auth_key,
            endpoint,
        }
    }

    /// Points the translator at a different URL, e.g. a local fake.
    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn endpoint_for_key(auth_key: &str) -> &'static str {
        if auth_key.ends_with(FREE_KEY_SUFFIX) {
            DEEPL_FREE_ENDPOINT
        } else {
            DEEPL_PRO_ENDPOINT
        }
    }

    pub fn is_free_tier(&self) -> bool {
        self.auth_key.ends_with(FREE_KEY_SUFFIX)
    }
}

#[async_trait]
impl Translator for DeepLTranslator {
    fn translator_name(&self) -> String {
        let tier = if self.is_free_tier() { "free" } else { "pro" };
        format!("DeepL ({})", tier)
    }

    async fn translate(
        &self,
        text: &str,
        target_lang: &str,
        source_lang: Option<&str>,
    ) -> Result<String> {
        let mut params = vec![
            ("auth_key", self.auth_key.as_str()),
            ("text", text),
            ("target_lang", target_lang),
        ];
        if let Some(source_lang) = source_lang {
            params.push(("source_lang", source_lang));
        }

        debug!("Requesting translation of {} chars to {}", text.chars().count(), target_lang);

        let response = self
            .client
            .post(&self.endpoint)
            .form(&params)
            .send()
            .await
            .map_err(|e| AggregatorError::Translation {
                status: None,
                message: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(AggregatorError::Translation {
                status: Some(status.as_u16()),
                message: if body.is_empty() {
                    status.to_string()
                } else {
                    body
                },
            });
        }

        let payload: DeepLResponse =
            response.json().await.map_err(|e| AggregatorError::Translation {
                status: Some(status.as_u16()),
                message: format!("malformed response: {}", e),
            })?;

        payload
            .translations
            .into_iter()
            .next()
            .map(|t| t.text)
            .ok_or_else(|| AggregatorError::Translation {
                status: Some(status.as_u16()),
                message: "response contained no translations".to_string(),
            })
    }
}
