//! Rostra Fetch - Partitioned Fetch Coordination
//!
//! Turns a set of partition keys into one aggregated [`rostra_core::RecordSet`]
//! by fetching every partition concurrently through a
//! [`rostra_core::PartitionFetcher`].

pub mod coordinator;

pub use coordinator::{FetchCoordinator, FetchOutcome};
