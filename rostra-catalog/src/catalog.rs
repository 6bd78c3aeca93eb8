//! The catalog service object.
//!
//! A [`Catalog`] is either backed by the persistent caches or, when caching
//! is disabled, by a coordinator that fetches everything live on every
//! call. Callers construct one explicitly and pass it where it is needed.

use std::path::Path;

use rostra_core::{
    CacheSettings, ConfigError, FilterCriteria, RecordKey, RecordSet, RostraResult,
    SharedFetcher,
};
use rostra_fetch::FetchCoordinator;
use rostra_storage::{RecordCache, RestoreReport};
use tracing::{debug, info};

enum Backing {
    Cached(RecordCache),
    Live(FetchCoordinator),
}

/// Record lookup and search over cached or live data.
pub struct Catalog {
    backing: Backing,
    settings: CacheSettings,
}

impl Catalog {
    /// Validate `settings` and open the catalog.
    ///
    /// With caching enabled the cache directory is checked and both caches
    /// are restored, fetching live where the files are missing, invalid or
    /// stale.
    pub async fn open(settings: CacheSettings, fetcher: SharedFetcher) -> RostraResult<Self> {
        settings.validate()?;

        if settings.caching_disabled {
            info!(policy = ?settings.partition_errors, "catalog opened without caching");
            let coordinator = FetchCoordinator::new(fetcher).with_policy(settings.partition_errors);
            return Ok(Self {
                backing: Backing::Live(coordinator),
                settings,
            });
        }

        let mut cache = RecordCache::new(&settings, fetcher);
        cache.set_directory(&settings.cache_directory())?;
        let report = cache.restore().await?;
        info!(
            directory = %settings.cache_directory().display(),
            records = cache.records().len(),
            options = ?report.options,
            record_cache = ?report.records,
            "catalog opened"
        );
        Ok(Self {
            backing: Backing::Cached(cache),
            settings,
        })
    }

    pub fn is_caching(&self) -> bool {
        matches!(self.backing, Backing::Cached(_))
    }

    pub fn settings(&self) -> &CacheSettings {
        &self.settings
    }

    /// The record cache, when caching is enabled.
    pub fn cache(&self) -> Option<&RecordCache> {
        match &self.backing {
            Backing::Cached(cache) => Some(cache),
            Backing::Live(_) => None,
        }
    }

    /// Every known record.
    ///
    /// With caching enabled, a non-empty `keys` first refreshes the
    /// partitions holding those keys. Without caching, every call fetches
    /// the options and all partitions live and `keys` is not consulted.
    pub async fn records(&mut self, keys: &[RecordKey]) -> RostraResult<RecordSet> {
        match &mut self.backing {
            Backing::Cached(cache) => {
                if !keys.is_empty() {
                    cache.fetch_updates(keys).await?;
                }
                Ok(cache.records().clone())
            }
            Backing::Live(coordinator) => {
                let options = coordinator.fetch_options().await?;
                let records = coordinator.fetch_all(&options).await.into_result()?;
                debug!(records = records.len(), "live fetch finished");
                Ok(records)
            }
        }
    }

    /// Current state of exactly the given records.
    pub async fn check(&mut self, keys: &[RecordKey]) -> RostraResult<RecordSet> {
        if keys.is_empty() {
            return Err(ConfigError::NoKeysGiven.into());
        }
        let records = self.records(keys).await?;
        let criteria = FilterCriteria::new().with_keys(keys.iter().copied());
        Ok(records.filter(&criteria))
    }

    /// Records matching `criteria`.
    ///
    /// With `update` and caching enabled, the partitions of the matches are
    /// refreshed and the matches re-evaluated against the fresh data.
    pub async fn search(
        &mut self,
        criteria: &FilterCriteria,
        update: bool,
    ) -> RostraResult<RecordSet> {
        let found = self.records(&[]).await?.filter(criteria);
        if !update || !self.is_caching() || found.is_empty() {
            return Ok(found);
        }

        let keys: Vec<RecordKey> = found.keys().collect();
        debug!(matches = keys.len(), "refreshing search matches");
        let refreshed = self.records(&keys).await?;
        let restricted = criteria.clone().with_keys(keys);
        Ok(refreshed.filter(&restricted))
    }

    /// Delete both cache files and restore from a live fetch.
    pub async fn force_refresh(&mut self) -> RostraResult<RestoreReport> {
        match &mut self.backing {
            Backing::Cached(cache) => {
                cache.discard()?;
                Ok(cache.restore().await?)
            }
            Backing::Live(_) => Err(ConfigError::CachingDisabled.into()),
        }
    }

    /// Move both cache files to `directory`, which must already exist.
    ///
    /// Existing files are not copied; the next store writes to the new place.
    pub fn set_directory(&mut self, directory: &Path) -> RostraResult<()> {
        match &mut self.backing {
            Backing::Cached(cache) => {
                cache.set_directory(directory)?;
                self.settings.directory = Some(directory.to_path_buf());
                Ok(())
            }
            Backing::Live(_) => Err(ConfigError::CachingDisabled.into()),
        }
    }
}

impl std::fmt::Debug for Catalog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Catalog")
            .field("caching", &self.is_caching())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}
