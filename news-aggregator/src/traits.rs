use crate::types::{PullBatch, Result};
use async_trait::async_trait;
use interfaces::SourceName;

/// Trait for pulling candidate items from an upstream source
#[async_trait]
pub trait PullFeed: Send + Sync {
    /// Source identity stamped on every record this feed produces
    fn source_name(&self) -> SourceName;

    /// Fetch the current window of items from the source.
    ///
    /// An `Err` means the whole source failed for this run; individual item
    /// failures are reported through `PullBatch::failed` instead.
    async fn pull(&mut self) -> Result<PullBatch>;
}
