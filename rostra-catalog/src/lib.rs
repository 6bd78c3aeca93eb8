//! Rostra Catalog - Record Lookup Service
//!
//! [`Catalog`] ties the caches, the fetch coordinator and filtering
//! together: look up records by key, search them by criteria, refresh
//! them on demand, or bypass the caches entirely.

pub mod catalog;
pub mod telemetry;

pub use catalog::Catalog;
pub use telemetry::init_tracing;
