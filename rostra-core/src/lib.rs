//! Rostra Core - Record Types
//!
//! Records, the dual-indexed record set, filters, the search option
//! vocabulary, the fetcher trait and configuration. Every other rostra
//! crate depends on this one; it performs no I/O beyond reading a config
//! file.

pub mod config;
pub mod error;
pub mod fetcher;
pub mod filter;
pub mod options;
pub mod record;
pub mod record_set;

pub use config::{
    CacheSettings, PartitionErrorPolicy, DEFAULT_OPTIONS_REFRESH_SECS,
    DEFAULT_RECORD_REFRESH_SECS, OPTIONS_CACHE_FILENAME, RECORD_CACHE_FILENAME,
};
pub use error::{
    ConfigError, FetchError, FilterError, PersistenceError, RecordSetError, RostraError,
    RostraResult,
};
pub use fetcher::{PartitionFetcher, SharedFetcher};
pub use filter::FilterCriteria;
pub use options::{OptionCategory, SearchOptions};
pub use record::{Record, RecordKey};
pub use record_set::RecordSet;
