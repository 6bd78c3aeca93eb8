//! Reading, writing and refreshing cache files.
//!
//! These functions drive any [`PersistentCache`]. A cache file is a JSON
//! envelope holding the fetch time, the refresh interval that was in force
//! when it was written, and the payload itself.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rostra_core::{ConfigError, PersistenceError, RostraResult};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::info::CacheInfo;
use super::traits::PersistentCache;

/// Why a cache had to be fetched live during restore.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshReason {
    /// No cache file existed.
    Missing,
    /// The cache file could not be read or decoded.
    Invalid,
    /// The cache file decoded but its refresh interval had elapsed.
    Stale,
}

impl std::fmt::Display for RefreshReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let reason = match self {
            Self::Missing => "missing",
            Self::Invalid => "invalid",
            Self::Stale => "stale",
        };
        f.write_str(reason)
    }
}

/// What [`restore`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RestoreOutcome {
    /// The file was fresh and its payload was adopted.
    Loaded,
    /// The payload was fetched live and persisted.
    Refreshed(RefreshReason),
}

impl RestoreOutcome {
    pub fn was_refreshed(&self) -> bool {
        matches!(self, Self::Refreshed(_))
    }
}

#[derive(Serialize)]
struct EnvelopeRef<'a, T> {
    timestamp: DateTime<Utc>,
    refresh_interval: u64,
    payload: &'a T,
}

#[derive(Deserialize)]
struct Envelope<T> {
    timestamp: DateTime<Utc>,
    #[allow(dead_code)]
    refresh_interval: u64,
    payload: T,
}

/// Encode a payload together with the timing in `info`.
pub fn encode_envelope<T: Serialize>(
    info: &CacheInfo,
    payload: &T,
) -> Result<Vec<u8>, PersistenceError> {
    let envelope = EnvelopeRef {
        timestamp: info.timestamp(),
        refresh_interval: info.interval().as_secs(),
        payload,
    };
    serde_json::to_vec(&envelope).map_err(|e| PersistenceError::Encode {
        reason: e.to_string(),
    })
}

/// Decode a cache file into its fetch time and payload.
///
/// The interval recorded in the file is ignored; the configured one wins.
pub fn decode_envelope<T: DeserializeOwned>(
    blob: &[u8],
) -> Result<(DateTime<Utc>, T), PersistenceError> {
    let envelope: Envelope<T> =
        serde_json::from_slice(blob).map_err(|e| PersistenceError::Decode {
            reason: e.to_string(),
        })?;
    Ok((envelope.timestamp, envelope.payload))
}

/// Serialize `cache` and atomically replace its file.
///
/// The bytes go to a sibling temporary file that is then renamed over
/// the target, so readers see either the old file or the new one.
pub fn store<C: PersistentCache + ?Sized>(cache: &C) -> Result<(), PersistenceError> {
    let path = cache.info().filepath();
    let blob = cache.to_json()?;
    write_atomic(&path, &blob)?;
    debug!(path = %path.display(), bytes = blob.len(), "cache stored");
    Ok(())
}

fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), PersistenceError> {
    let tmp = temp_path(path);
    fs::write(&tmp, contents).map_err(|e| PersistenceError::Write {
        path: tmp.clone(),
        reason: e.to_string(),
    })?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(PersistenceError::Write {
            path: path.to_path_buf(),
            reason: e.to_string(),
        });
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_default();
    path.with_file_name(format!(".{}.tmp", name))
}

/// Load `cache` from its file, fetching live when the file is missing,
/// invalid or stale.
///
/// Only a failed live fetch or a failed store is an error.
pub async fn restore<C: PersistentCache + ?Sized>(cache: &mut C) -> RostraResult<RestoreOutcome> {
    let path = cache.info().filepath();

    let reason = match fs::read(&path) {
        Err(e) if e.kind() == ErrorKind::NotFound => Some(RefreshReason::Missing),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "cache file unreadable");
            Some(RefreshReason::Invalid)
        }
        Ok(blob) => match cache.load_json(&blob) {
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cache file invalid");
                Some(RefreshReason::Invalid)
            }
            Ok(()) if cache.info().is_stale() => Some(RefreshReason::Stale),
            Ok(()) => None,
        },
    };

    match reason {
        None => {
            debug!(path = %path.display(), "cache loaded from disk");
            Ok(RestoreOutcome::Loaded)
        }
        Some(reason) => {
            info!(path = %path.display(), %reason, "refreshing cache");
            cache.fetch_data().await?;
            store(cache)?;
            Ok(RestoreOutcome::Refreshed(reason))
        }
    }
}

/// Remove the cache file if it exists.
pub fn discard<C: PersistentCache + ?Sized>(cache: &C) -> Result<(), PersistenceError> {
    let path = cache.info().filepath();
    match fs::remove_file(&path) {
        Ok(()) => {
            debug!(path = %path.display(), "cache file removed");
            Ok(())
        }
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(PersistenceError::Remove {
            path,
            reason: e.to_string(),
        }),
    }
}

/// Check that `path` exists and is a directory.
pub fn resolve_directory(path: &Path) -> Result<PathBuf, ConfigError> {
    let metadata = fs::metadata(path).map_err(|e| ConfigError::InvalidDirectory {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;
    if !metadata.is_dir() {
        return Err(ConfigError::NotADirectory {
            path: path.to_path_buf(),
        });
    }
    Ok(path.to_path_buf())
}
