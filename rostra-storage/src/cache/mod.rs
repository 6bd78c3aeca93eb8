//! Persistent caches
//!
//! - [`info`]: timestamp, interval and file location
//! - [`traits`]: the four-operation cache protocol
//! - [`persist`]: store, restore, discard and directory checks
//! - [`options`]: the search option vocabulary
//! - [`records`]: the record set, owning the options cache

pub mod info;
pub mod options;
pub mod persist;
pub mod records;
pub mod traits;

pub use info::CacheInfo;
pub use options::OptionsCache;
pub use persist::{discard, resolve_directory, restore, store, RefreshReason, RestoreOutcome};
pub use records::{RecordCache, RestoreReport};
pub use traits::PersistentCache;
