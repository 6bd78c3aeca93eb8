//! Rostra Storage - Persistent Caches
//!
//! File-backed caches for the record set and the search option vocabulary.
//! Each cache restores from its JSON file when that file is present, valid
//! and fresh, and otherwise fetches live and rewrites the file atomically.

pub mod cache;

pub use cache::{
    discard, resolve_directory, restore, store, CacheInfo, OptionsCache, PersistentCache,
    RecordCache, RefreshReason, RestoreOutcome, RestoreReport,
};
