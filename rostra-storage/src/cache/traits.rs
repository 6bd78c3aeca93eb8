//! The persistent cache protocol.
//!
//! Any payload that can report its [`CacheInfo`], encode itself, decode
//! itself and fetch fresh data live can be driven by
//! [`super::persist::restore`] and [`super::persist::store`].

use async_trait::async_trait;
use rostra_core::{PersistenceError, RostraResult};

use super::info::CacheInfo;

/// A cache payload with a file representation and a live source.
///
/// # Implementation Requirements
///
/// - `load_json` must leave `self` unchanged when it fails
/// - `fetch_data` must only touch the timestamp when it succeeds
#[async_trait]
pub trait PersistentCache: Send {
    /// Timing and location of this cache.
    fn info(&self) -> &CacheInfo;

    /// Encode the payload and its fetch time for the cache file.
    fn to_json(&self) -> Result<Vec<u8>, PersistenceError>;

    /// Replace the payload and fetch time with the contents of a cache file.
    fn load_json(&mut self, blob: &[u8]) -> Result<(), PersistenceError>;

    /// Replace the payload with live data.
    async fn fetch_data(&mut self) -> RostraResult<()>;
}
