//! Cached search option vocabulary.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use rostra_core::{
    PersistenceError, RostraResult, SearchOptions, SharedFetcher, OPTIONS_CACHE_FILENAME,
};
use tracing::debug;

use super::info::CacheInfo;
use super::persist::{decode_envelope, encode_envelope};
use super::traits::PersistentCache;

/// The search form's option vocabulary, persisted to `options_cache.json`.
///
/// Its subject keys are the partition list for a full record refresh.
pub struct OptionsCache {
    info: CacheInfo,
    options: SearchOptions,
    fetcher: SharedFetcher,
}

impl OptionsCache {
    pub fn new(directory: impl Into<PathBuf>, interval: Duration, fetcher: SharedFetcher) -> Self {
        Self {
            info: CacheInfo::new(directory, OPTIONS_CACHE_FILENAME, interval),
            options: SearchOptions::default(),
            fetcher,
        }
    }

    pub fn options(&self) -> &SearchOptions {
        &self.options
    }

    /// Every partition a full record refresh must fetch.
    pub fn list_partition_keys(&self) -> BTreeSet<String> {
        self.options.partition_keys()
    }

    pub(crate) fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.info.set_directory(directory);
    }
}

#[async_trait]
impl PersistentCache for OptionsCache {
    fn info(&self) -> &CacheInfo {
        &self.info
    }

    fn to_json(&self) -> Result<Vec<u8>, PersistenceError> {
        encode_envelope(&self.info, &self.options)
    }

    fn load_json(&mut self, blob: &[u8]) -> Result<(), PersistenceError> {
        let (timestamp, options) = decode_envelope(blob)?;
        self.options = options;
        self.info.set_timestamp(timestamp);
        Ok(())
    }

    async fn fetch_data(&mut self) -> RostraResult<()> {
        let options = self.fetcher.fetch_options().await?;
        debug!(subjects = options.subjects.len(), "search options fetched");
        self.options = options;
        self.info.touch();
        Ok(())
    }
}

impl std::fmt::Debug for OptionsCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OptionsCache")
            .field("info", &self.info)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
