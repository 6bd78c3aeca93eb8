//! Error types for rostra operations

use crate::RecordKey;
use std::path::PathBuf;
use thiserror::Error;

/// Configuration and caller-input errors.
///
/// These fail fast: no fetch or filesystem work is attempted once one of
/// them is raised.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Invalid directory {path:?}: {reason}")]
    InvalidDirectory { path: PathBuf, reason: String },

    #[error("Not a directory: {path:?}")]
    NotADirectory { path: PathBuf },

    #[error("Invalid value for {field}: {reason}")]
    InvalidValue { field: String, reason: String },

    #[error("Failed to read config file {path:?}: {reason}")]
    Unreadable { path: PathBuf, reason: String },

    #[error("Failed to parse config: {reason}")]
    Parse { reason: String },

    #[error("Caching is disabled")]
    CachingDisabled,

    #[error("No record keys given")]
    NoKeysGiven,

    #[error("Failed to initialize logging: {reason}")]
    Telemetry { reason: String },
}

/// Failures reported by a partition fetcher.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The request itself failed (network, process, HTTP status).
    #[error("Transport failure for {target}: {reason}")]
    Transport { target: String, reason: String },

    /// The request succeeded but the response could not be turned into records.
    #[error("Parse failure for {target}: {reason}")]
    Parse { target: String, reason: String },

    /// The worker fetching a partition died before reporting.
    #[error("Fetch aborted: {reason}")]
    Aborted { reason: String },
}

impl FetchError {
    /// Create a transport error for the given partition or page.
    pub fn transport(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Transport {
            target: target.into(),
            reason: reason.into(),
        }
    }

    /// Create a parse error for the given partition or page.
    pub fn parse(target: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Parse {
            target: target.into(),
            reason: reason.into(),
        }
    }

    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Transport { .. })
    }

    pub fn is_parse(&self) -> bool {
        matches!(self, Self::Parse { .. })
    }
}

/// Cache file encoding and filesystem errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PersistenceError {
    #[error("Failed to encode cache payload: {reason}")]
    Encode { reason: String },

    #[error("Failed to decode cache payload: {reason}")]
    Decode { reason: String },

    #[error("Failed to read {path:?}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Failed to write {path:?}: {reason}")]
    Write { path: PathBuf, reason: String },

    #[error("Failed to remove {path:?}: {reason}")]
    Remove { path: PathBuf, reason: String },
}

/// Record set consistency errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RecordSetError {
    #[error("Record not found: {key}")]
    KeyNotFound { key: RecordKey },

    #[error("Duplicate record: {key}")]
    DuplicateKey { key: RecordKey },
}

/// Filter construction errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FilterError {
    #[error("Invalid {field} pattern {pattern:?}: {reason}")]
    InvalidPattern {
        field: &'static str,
        pattern: String,
        reason: String,
    },
}

/// Master error type for all rostra errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RostraError {
    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Fetch error: {0}")]
    Fetch(#[from] FetchError),

    #[error("Persistence error: {0}")]
    Persistence(#[from] PersistenceError),

    #[error("Record set error: {0}")]
    RecordSet(#[from] RecordSetError),

    #[error("Filter error: {0}")]
    Filter(#[from] FilterError),
}

/// Result type alias for rostra operations.
pub type RostraResult<T> = Result<T, RostraError>;

// =============================================================================
// TESTS
// =============================================================================
