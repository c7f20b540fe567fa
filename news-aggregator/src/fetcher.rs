use crate::types::{AggregatorError, FetchConfig, FetchedDocument, Result};
use chrono::Utc;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::{Duration, Instant};
use tracing::{debug, info};
use url::Url;

/// Thin HTTP layer shared by every source adapter.
///
/// Each call is a single attempt bounded by the configured timeout; a timeout
/// or non-2xx status surfaces as an error for the caller to count.
#[derive(Clone)]
pub struct Fetcher {
    client: Client,
    config: FetchConfig,
}

impl Fetcher {
    pub fn new(config: FetchConfig) -> Result<Self> {
        let client = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(Duration::from_secs(config.timeout_seconds))
            .gzip(true)
            .deflate(true)
            .brotli(true)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .build()?;

        Ok(Self { client, config })
    }

    pub fn client(&self) -> &Client {
        &self.client
    }

    pub fn config(&self) -> &FetchConfig {
        &self.config
    }

    /// Fetches a syndication document as text.
    pub async fn fetch_feed(&self, url: &str) -> Result<FetchedDocument> {
        Url::parse(url)?;
        let start_time = Instant::now();
        let fetch_time = Utc::now();

        debug!("Fetching feed: {}", url);

        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response, url)?;
        let status = response.status();

        let etag = response
            .headers()
            .get("etag")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let last_modified = response
            .headers()
            .get("last-modified")
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        if let Some(content_length) = response.content_length() {
            self.check_size(content_length as usize)?;
        }

        let content = response.text().await?;
        self.check_size(content.len())?;

        info!("Fetched feed: {} ({} bytes)", url, content.len());

        Ok(FetchedDocument {
            url: url.to_string(),
            content,
            http_status: status.as_u16(),
            etag,
            last_modified,
            fetch_time,
            response_time_ms: start_time.elapsed().as_millis() as u64,
        })
    }

    /// GETs `url` and decodes the JSON body.
    pub async fn fetch_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        debug!("Fetching JSON: {}", url);

        let response = self.client.get(url).send().await?;
        let response = Self::ensure_success(response, url)?;
        let bytes = response.bytes().await?;
        Ok(serde_json::from_slice(&bytes)?)
    }

    fn ensure_success(response: Response, url: &str) -> Result<Response> {
        let status = response.status();
        if !status.is_success() {
            return Err(AggregatorError::HttpStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }
        Ok(response)
    }

    fn check_size(&self, bytes: usize) -> Result<()> {
        const MIB: usize = 1024 * 1024;
        if bytes > self.config.max_feed_size_mb.saturating_mul(MIB) {
            return Err(AggregatorError::FeedTooLarge { size_mb: bytes.div_ceil(MIB) });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fetcher(max_feed_size_mb: usize) -> Fetcher {
        Fetcher::new(FetchConfig {
            max_feed_size_mb,
            ..FetchConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn size_limit_counts_partial_megabytes() {
        let fetcher = fetcher(1);
        assert!(fetcher.check_size(1024 * 1024).is_ok());

        let err = fetcher.check_size(1024 * 1024 + 1).unwrap_err();
        assert!(matches!(err, AggregatorError::FeedTooLarge { size_mb: 2 }));
        assert!(fetcher.check_size(2 * 1024 * 1024 - 1).is_err());
    }

    #[test]
    fn zero_limit_rejects_any_content() {
        let fetcher = fetcher(0);
        assert!(fetcher.check_size(0).is_ok());
        assert!(matches!(
            fetcher.check_size(512),
            Err(AggregatorError::FeedTooLarge { size_mb: 1 })
        ));
    }
}
