//! Cache timing and location metadata.
//!
//! Every persisted cache carries a [`CacheInfo`]: when its payload was
//! last fetched, how long that payload stays usable, and where its file
//! lives. Staleness is a pure function of the clock, exposed both against
//! the wall clock and against a caller-supplied instant.

use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Timestamp, refresh interval and file location of one cache.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheInfo {
    /// When the payload was last fetched successfully.
    timestamp: DateTime<Utc>,
    /// How long a payload stays fresh.
    interval: Duration,
    directory: PathBuf,
    filename: String,
}

impl CacheInfo {
    /// Create cache info stamped with the current time.
    pub fn new(directory: impl Into<PathBuf>, filename: impl Into<String>, interval: Duration) -> Self {
        Self {
            timestamp: Utc::now(),
            interval,
            directory: directory.into(),
            filename: filename.into(),
        }
    }

    pub fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn directory(&self) -> &Path {
        &self.directory
    }

    pub fn filename(&self) -> &str {
        &self.filename
    }

    /// Full path of the cache file.
    pub fn filepath(&self) -> PathBuf {
        self.directory.join(&self.filename)
    }

    /// Age of the payload at `now`. A timestamp in the future counts as age zero.
    pub fn age_at(&self, now: DateTime<Utc>) -> Duration {
        if now > self.timestamp {
            (now - self.timestamp).to_std().unwrap_or(Duration::ZERO)
        } else {
            Duration::ZERO
        }
    }

    pub fn age(&self) -> Duration {
        self.age_at(Utc::now())
    }

    /// True once the payload's age reaches the refresh interval.
    pub fn is_stale_at(&self, now: DateTime<Utc>) -> bool {
        self.age_at(now) >= self.interval
    }

    pub fn is_stale(&self) -> bool {
        self.is_stale_at(Utc::now())
    }

    /// Mark the payload as fetched now.
    pub fn touch(&mut self) {
        self.timestamp = Utc::now();
    }

    /// Adopt the fetch time recorded in a cache file.
    pub fn set_timestamp(&mut self, timestamp: DateTime<Utc>) {
        self.timestamp = timestamp;
    }

    pub fn set_directory(&mut self, directory: impl Into<PathBuf>) {
        self.directory = directory.into();
    }
}
