//! Restore, refresh and targeted update of the on-disk caches.

use std::fs;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use rostra_core::{
    CacheSettings, ConfigError, FetchError, RecordKey, RecordSetError, RostraError,
    SharedFetcher, OPTIONS_CACHE_FILENAME, RECORD_CACHE_FILENAME,
};
use rostra_storage::{PersistentCache, RecordCache, RefreshReason, RestoreOutcome};
use rostra_test_utils::{cse_records, sample_fetcher, section, ScriptedFetcher};
use tempfile::TempDir;

fn settings(dir: &TempDir) -> CacheSettings {
    CacheSettings::new()
        .with_directory(dir.path())
        .with_record_refresh(Duration::from_secs(3600))
        .with_options_refresh(Duration::from_secs(7 * 24 * 3600))
}

fn cache(dir: &TempDir, fetcher: &Arc<ScriptedFetcher>) -> RecordCache {
    let shared: SharedFetcher = fetcher.clone();
    RecordCache::new(&settings(dir), shared)
}

fn keys(cache: &RecordCache) -> Vec<u32> {
    cache.records().keys().map(RecordKey::get).collect()
}

fn age_file(path: &Path, by: chrono::Duration) {
    let blob = fs::read(path).unwrap();
    let mut value: serde_json::Value = serde_json::from_slice(&blob).unwrap();
    value["timestamp"] = serde_json::json!((Utc::now() - by).to_rfc3339());
    fs::write(path, serde_json::to_vec(&value).unwrap()).unwrap();
}

#[tokio::test]
async fn missing_files_are_fetched_once_and_persisted() {
    let dir = TempDir::new().unwrap();
    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);

    let report = cache.restore().await.unwrap();

    assert_eq!(report.options, RestoreOutcome::Refreshed(RefreshReason::Missing));
    assert_eq!(report.records, RestoreOutcome::Refreshed(RefreshReason::Missing));
    assert_eq!(fetcher.options_calls(), 1);
    assert_eq!(fetcher.sorted_partition_calls(), vec!["CSE", "MATH", "PHYS"]);
    assert_eq!(cache.records().len(), 5);
    assert!(dir.path().join(RECORD_CACHE_FILENAME).is_file());
    assert!(dir.path().join(OPTIONS_CACHE_FILENAME).is_file());
}

#[tokio::test]
async fn fresh_files_are_loaded_without_fetching() {
    let dir = TempDir::new().unwrap();
    let first = sample_fetcher().shared();
    let mut original = cache(&dir, &first);
    original.restore().await.unwrap();

    let idle = ScriptedFetcher::new().shared();
    let mut reloaded = cache(&dir, &idle);
    let report = reloaded.restore().await.unwrap();

    assert_eq!(report.options, RestoreOutcome::Loaded);
    assert_eq!(report.records, RestoreOutcome::Loaded);
    assert_eq!(idle.options_calls(), 0);
    assert!(idle.partition_calls().is_empty());

    // Both the lookup map and the list order survive the file.
    assert_eq!(reloaded.records(), original.records());
    assert_eq!(keys(&reloaded), keys(&original));
    assert_eq!(reloaded.options(), original.options());
    assert_eq!(reloaded.info().timestamp(), original.info().timestamp());
}

#[tokio::test]
async fn corrupt_file_is_refreshed() {
    let dir = TempDir::new().unwrap();
    cache(&dir, &sample_fetcher().shared()).restore().await.unwrap();
    fs::write(dir.path().join(RECORD_CACHE_FILENAME), b"{\"timestamp\": 12").unwrap();

    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);
    let report = cache.restore().await.unwrap();

    assert_eq!(report.options, RestoreOutcome::Loaded);
    assert_eq!(report.records, RestoreOutcome::Refreshed(RefreshReason::Invalid));
    assert_eq!(fetcher.options_calls(), 0);
    assert_eq!(fetcher.partition_calls().len(), 3);
    assert_eq!(cache.records().len(), 5);

    // The rewritten file is valid again.
    let idle = ScriptedFetcher::new().shared();
    let report = self::cache(&dir, &idle).restore().await.unwrap();
    assert_eq!(report.records, RestoreOutcome::Loaded);
}

#[tokio::test]
async fn stale_file_is_refreshed() {
    let dir = TempDir::new().unwrap();
    cache(&dir, &sample_fetcher().shared()).restore().await.unwrap();
    age_file(&dir.path().join(RECORD_CACHE_FILENAME), chrono::Duration::days(2));

    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);
    let report = cache.restore().await.unwrap();

    assert_eq!(report.options, RestoreOutcome::Loaded);
    assert_eq!(report.records, RestoreOutcome::Refreshed(RefreshReason::Stale));
    assert_eq!(fetcher.partition_calls().len(), 3);
    assert!(!cache.info().is_stale());
}

#[tokio::test]
async fn configured_interval_wins_over_the_file() {
    let dir = TempDir::new().unwrap();
    cache(&dir, &sample_fetcher().shared()).restore().await.unwrap();
    age_file(&dir.path().join(RECORD_CACHE_FILENAME), chrono::Duration::minutes(10));

    let fetcher = sample_fetcher().shared();
    let shared: SharedFetcher = fetcher.clone();
    let mut cache = RecordCache::new(
        &settings(&dir).with_record_refresh(Duration::from_secs(60)),
        shared,
    );
    let report = cache.restore().await.unwrap();

    assert_eq!(report.records, RestoreOutcome::Refreshed(RefreshReason::Stale));
    assert_eq!(cache.info().interval(), Duration::from_secs(60));
}

#[tokio::test]
async fn failed_refresh_writes_nothing() {
    let dir = TempDir::new().unwrap();
    let fetcher = sample_fetcher()
        .with_partition_error("MATH", FetchError::transport("MATH", "503"))
        .shared();
    let mut cache = cache(&dir, &fetcher);

    let err = cache.restore().await.unwrap_err();

    assert!(matches!(err, RostraError::Fetch(FetchError::Transport { .. })));
    assert!(cache.records().is_empty());
    assert!(!dir.path().join(RECORD_CACHE_FILENAME).exists());
    // Options restored fine before the record refresh failed.
    assert!(dir.path().join(OPTIONS_CACHE_FILENAME).is_file());
}

#[tokio::test]
async fn failed_full_refresh_keeps_previous_records() {
    let dir = TempDir::new().unwrap();
    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);
    cache.restore().await.unwrap();
    let before = cache.records().clone();
    let stamp = cache.info().timestamp();

    fetcher.set_partition("PHYS", Err(FetchError::transport("PHYS", "reset")));
    assert!(cache.fetch_data().await.is_err());

    assert_eq!(cache.records(), &before);
    assert_eq!(cache.info().timestamp(), stamp);
}

#[tokio::test]
async fn set_directory_requires_an_existing_directory() {
    let dir = TempDir::new().unwrap();
    let mut cache = cache(&dir, &sample_fetcher().shared());

    let missing = dir.path().join("nope");
    assert!(matches!(
        cache.set_directory(&missing),
        Err(ConfigError::InvalidDirectory { .. })
    ));

    let file = dir.path().join("plain.txt");
    fs::write(&file, b"x").unwrap();
    assert_eq!(
        cache.set_directory(&file),
        Err(ConfigError::NotADirectory { path: file.clone() })
    );

    let nested = dir.path().join("nested");
    fs::create_dir(&nested).unwrap();
    cache.set_directory(&nested).unwrap();
    assert_eq!(cache.info().filepath(), nested.join(RECORD_CACHE_FILENAME));
    assert_eq!(
        cache.options_cache().info().filepath(),
        nested.join(OPTIONS_CACHE_FILENAME)
    );
}

#[tokio::test]
async fn targeted_update_merges_touched_partition_in_place() {
    let dir = TempDir::new().unwrap();
    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);
    cache.restore().await.unwrap();
    let order = keys(&cache);
    fetcher.reset_calls();

    let mut updated = cse_records();
    updated[0] = section(20345, "CSE 20289 01", "Systems Programming", 0);
    fetcher.set_partition("CSE", Ok(updated));

    let merged = cache.fetch_updates(&[RecordKey::new(20345)]).await.unwrap();

    assert_eq!(merged, 2);
    assert_eq!(fetcher.partition_calls(), vec!["CSE"]);
    assert!(!cache.records().get(RecordKey::new(20345)).unwrap().is_open());
    assert_eq!(keys(&cache), order);

    // The merged payload was stored.
    let idle = ScriptedFetcher::new().shared();
    let mut reloaded = self::cache(&dir, &idle);
    reloaded.restore().await.unwrap();
    assert!(!reloaded.records().get(RecordKey::new(20345)).unwrap().is_open());
}

#[tokio::test]
async fn targeted_update_with_no_keys_does_nothing() {
    let dir = TempDir::new().unwrap();
    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);
    cache.restore().await.unwrap();
    fetcher.reset_calls();

    assert_eq!(cache.fetch_updates(&[]).await.unwrap(), 0);
    assert!(fetcher.partition_calls().is_empty());
}

#[tokio::test]
async fn targeted_update_with_unknown_key_fetches_nothing() {
    let dir = TempDir::new().unwrap();
    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);
    cache.restore().await.unwrap();
    fetcher.reset_calls();

    let err = cache
        .fetch_updates(&[RecordKey::new(20345), RecordKey::new(11111)])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RostraError::RecordSet(RecordSetError::KeyNotFound {
            key: RecordKey::new(11111)
        })
    );
    assert!(fetcher.partition_calls().is_empty());
}

#[tokio::test]
async fn targeted_update_keeps_partitions_that_succeeded() {
    let dir = TempDir::new().unwrap();
    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);
    cache.restore().await.unwrap();

    fetcher.set_partition(
        "CSE",
        Ok(vec![
            section(20345, "CSE 20289 01", "Systems Programming", 0),
            section(20346, "CSE 30341 01", "Operating System Principles", 9),
        ]),
    );
    fetcher.set_partition("MATH", Err(FetchError::transport("MATH", "timed out")));

    let err = cache
        .fetch_updates(&[RecordKey::new(20346), RecordKey::new(30110)])
        .await
        .unwrap_err();

    assert_eq!(
        err,
        RostraError::Fetch(FetchError::transport("MATH", "timed out"))
    );
    assert!(cache.records().get(RecordKey::new(20346)).unwrap().is_open());
    assert!(cache.records().get(RecordKey::new(30110)).unwrap().is_open());

    let idle = ScriptedFetcher::new().shared();
    let mut reloaded = self::cache(&dir, &idle);
    reloaded.restore().await.unwrap();
    assert!(reloaded.records().get(RecordKey::new(20346)).unwrap().is_open());
}

#[tokio::test]
async fn targeted_update_rejects_records_not_already_cached() {
    let dir = TempDir::new().unwrap();
    let fetcher = sample_fetcher().shared();
    let mut cache = cache(&dir, &fetcher);
    cache.restore().await.unwrap();
    let before = cache.records().clone();

    let mut grown = cse_records();
    grown.push(section(29999, "CSE 40001 01", "New Section", 5));
    fetcher.set_partition("CSE", Ok(grown));

    let err = cache
        .fetch_updates(&[RecordKey::new(20345)])
        .await
        .unwrap_err();

    assert!(matches!(err, RostraError::RecordSet(RecordSetError::KeyNotFound { .. })));
    assert_eq!(cache.records(), &before);
}

#[tokio::test]
async fn discard_removes_both_files() {
    let dir = TempDir::new().unwrap();
    let mut cache = cache(&dir, &sample_fetcher().shared());
    cache.restore().await.unwrap();

    cache.discard().unwrap();
    assert!(!dir.path().join(RECORD_CACHE_FILENAME).exists());
    assert!(!dir.path().join(OPTIONS_CACHE_FILENAME).exists());

    // Discarding again is not an error.
    cache.discard().unwrap();
}
