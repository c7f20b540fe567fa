pub mod hacker_news;
pub mod rss_feed;

pub use hacker_news::{HackerNewsSource, HnItem};
pub use rss_feed::RssFeedSource;

use crate::config::{SourceConfig, SourceKind};
use crate::traits::PullFeed;
use crate::types::{PullBatch, Result};
use crate::Fetcher;
use async_trait::async_trait;
use interfaces::SourceName;

/// The closed set of adapter shapes, chosen by `SourceConfig::kind`.
pub enum Source {
    Feed(RssFeedSource),
    TreeFetch(HackerNewsSource),
}

impl Source {
    pub fn from_config(config: &SourceConfig, fetcher: Fetcher) -> Self {
        match config.kind {
            SourceKind::Feed => Source::Feed(RssFeedSource::from_config(config, fetcher)),
            SourceKind::TreeFetch => {
                Source::TreeFetch(HackerNewsSource::from_config(config, fetcher))
            }
        }
    }

    pub fn kind(&self) -> SourceKind {
        match self {
            Source::Feed(_) => SourceKind::Feed,
            Source::TreeFetch(_) => SourceKind::TreeFetch,
        }
    }
}

#[async_trait]
impl PullFeed for Source {
    fn source_name(&self) -> SourceName {
        match self {
            Source::Feed(s) => s.source_name(),
            Source::TreeFetch(s) => s.source_name(),
        }
    }

    async fn pull(&mut self) -> Result<PullBatch> {
        match self {
            Source::Feed(s) => s.pull().await,
            Source::TreeFetch(s) => s.pull().await,
        }
    }
}
