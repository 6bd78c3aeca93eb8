//! Cached record set with full and targeted refresh.

use std::path::Path;

use async_trait::async_trait;
use rostra_core::{
    CacheSettings, ConfigError, PersistenceError, RecordKey, RecordSet, RostraResult,
    SearchOptions, SharedFetcher, RECORD_CACHE_FILENAME,
};
use rostra_fetch::FetchCoordinator;
use tracing::{debug, info, warn};

use super::info::CacheInfo;
use super::options::OptionsCache;
use super::persist::{self, decode_envelope, encode_envelope, RestoreOutcome};
use super::traits::PersistentCache;

/// Outcome of restoring both caches.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestoreReport {
    pub options: RestoreOutcome,
    pub records: RestoreOutcome,
}

/// Every known record, persisted to `record_cache.json`.
///
/// Owns the [`OptionsCache`] that lists the partitions to fetch.
#[derive(Debug)]
pub struct RecordCache {
    info: CacheInfo,
    records: RecordSet,
    options: OptionsCache,
    coordinator: FetchCoordinator,
}

impl RecordCache {
    /// Create empty caches rooted at the configured directory.
    ///
    /// Nothing is read or fetched until [`RecordCache::restore`].
    pub fn new(settings: &CacheSettings, fetcher: SharedFetcher) -> Self {
        let directory = settings.cache_directory();
        Self {
            info: CacheInfo::new(
                directory.clone(),
                RECORD_CACHE_FILENAME,
                settings.record_refresh_interval(),
            ),
            records: RecordSet::new(),
            options: OptionsCache::new(
                directory,
                settings.options_refresh_interval(),
                fetcher.clone(),
            ),
            coordinator: FetchCoordinator::new(fetcher).with_policy(settings.partition_errors),
        }
    }

    pub fn records(&self) -> &RecordSet {
        &self.records
    }

    pub fn options(&self) -> &SearchOptions {
        self.options.options()
    }

    pub fn options_cache(&self) -> &OptionsCache {
        &self.options
    }

    /// Point both cache files at `directory`, which must already exist.
    pub fn set_directory(&mut self, directory: &Path) -> Result<(), ConfigError> {
        let directory = persist::resolve_directory(directory)?;
        debug!(directory = %directory.display(), "cache directory set");
        self.options.set_directory(directory.clone());
        self.info.set_directory(directory);
        Ok(())
    }

    /// Restore the options cache, then the records.
    pub async fn restore(&mut self) -> RostraResult<RestoreReport> {
        let options = persist::restore(&mut self.options).await?;
        let records = persist::restore(&mut *self).await?;
        info!(
            ?options,
            ?records,
            total = self.records.len(),
            "caches restored"
        );
        Ok(RestoreReport { options, records })
    }

    /// Write the record cache file.
    pub fn store(&self) -> Result<(), PersistenceError> {
        persist::store(self)
    }

    /// Remove both cache files.
    pub fn discard(&self) -> Result<(), PersistenceError> {
        persist::discard(&self.options)?;
        persist::discard(self)
    }

    /// Refresh only the partitions holding `keys` and merge the results.
    ///
    /// Unknown keys fail before anything is fetched. When some partitions
    /// fail, the ones that succeeded are still merged and stored before the
    /// failure is returned. Returns the number of records merged.
    pub async fn fetch_updates(&mut self, keys: &[RecordKey]) -> RostraResult<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let outcome = self.coordinator.fetch_for_keys(&self.records, keys).await?;
        let (fetched, error) = outcome.into_parts();
        let merged = self.records.merge(&fetched)?;
        self.store()?;
        debug!(requested = keys.len(), merged, "targeted refresh merged");

        match error {
            Some(error) => {
                warn!(%error, merged, "targeted refresh incomplete");
                Err(error.into())
            }
            None => Ok(merged),
        }
    }
}

#[async_trait]
impl PersistentCache for RecordCache {
    fn info(&self) -> &CacheInfo {
        &self.info
    }

    fn to_json(&self) -> Result<Vec<u8>, PersistenceError> {
        encode_envelope(&self.info, &self.records)
    }

    fn load_json(&mut self, blob: &[u8]) -> Result<(), PersistenceError> {
        let (timestamp, records) = decode_envelope(blob)?;
        self.records = records;
        self.info.set_timestamp(timestamp);
        Ok(())
    }

    /// Fetch every partition listed by the options cache.
    ///
    /// On failure the previous records and timestamp are kept.
    async fn fetch_data(&mut self) -> RostraResult<()> {
        let records = self
            .coordinator
            .fetch_partitions(self.options.list_partition_keys())
            .await
            .into_result()?;
        self.records = records;
        self.info.touch();
        Ok(())
    }
}
