//! The external data source, seen from the cache.
//!
//! Building requests and parsing response documents live behind this
//! trait; the cache only ever asks for the option vocabulary or for the
//! records of one partition.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::FetchError;
use crate::options::SearchOptions;
use crate::record::Record;

/// Remote source of search options and partitioned records.
#[async_trait]
pub trait PartitionFetcher: Send + Sync {
    /// Fetch the option vocabulary with a single non-partitioned request.
    async fn fetch_options(&self) -> Result<SearchOptions, FetchError>;

    /// Fetch every record of one partition, in the order the source lists them.
    ///
    /// Implementations report request failures as [`FetchError::Transport`]
    /// and unusable responses as [`FetchError::Parse`].
    async fn fetch_partition(&self, partition: &str) -> Result<Vec<Record>, FetchError>;
}

/// Shared handle to a fetcher, cloned into each fetch task.
pub type SharedFetcher = Arc<dyn PartitionFetcher>;
