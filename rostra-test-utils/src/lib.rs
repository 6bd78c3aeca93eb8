//! Rostra Test Utilities
//!
//! Shared test infrastructure for the rostra workspace:
//! - A scripted [`PartitionFetcher`] with call counters
//! - Fixtures for a small three-subject catalog
//! - Proptest generators for records and record sets

pub use rostra_core::{
    FetchError, OptionCategory, PartitionFetcher, Record, RecordKey, RecordSet, SearchOptions,
    SharedFetcher,
};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

// ============================================================================
// SCRIPTED FETCHER
// ============================================================================

/// In-memory fetcher returning canned responses.
///
/// Partitions without a scripted response return no records. Responses
/// can be swapped between calls to simulate the remote source changing.
#[derive(Debug, Default)]
pub struct ScriptedFetcher {
    options: Mutex<Option<Result<SearchOptions, FetchError>>>,
    partitions: Mutex<HashMap<String, Result<Vec<Record>, FetchError>>>,
    delays: Mutex<HashMap<String, Duration>>,
    options_calls: AtomicUsize,
    partition_calls: Mutex<Vec<String>>,
}

impl ScriptedFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_options(self, options: SearchOptions) -> Self {
        self.set_options(Ok(options));
        self
    }

    pub fn with_partition(self, partition: impl Into<String>, records: Vec<Record>) -> Self {
        self.set_partition(partition, Ok(records));
        self
    }

    pub fn with_partition_error(self, partition: impl Into<String>, error: FetchError) -> Self {
        self.set_partition(partition, Err(error));
        self
    }

    /// Delay the response for one partition.
    pub fn with_delay(self, partition: impl Into<String>, delay: Duration) -> Self {
        self.delays.lock().unwrap().insert(partition.into(), delay);
        self
    }

    pub fn set_options(&self, options: Result<SearchOptions, FetchError>) {
        *self.options.lock().unwrap() = Some(options);
    }

    pub fn set_partition(
        &self,
        partition: impl Into<String>,
        response: Result<Vec<Record>, FetchError>,
    ) {
        self.partitions
            .lock()
            .unwrap()
            .insert(partition.into(), response);
    }

    /// Number of `fetch_options` calls so far.
    pub fn options_calls(&self) -> usize {
        self.options_calls.load(Ordering::SeqCst)
    }

    /// Partitions requested so far, in call order.
    pub fn partition_calls(&self) -> Vec<String> {
        self.partition_calls.lock().unwrap().clone()
    }

    /// Partitions requested so far, sorted.
    pub fn sorted_partition_calls(&self) -> Vec<String> {
        let mut calls = self.partition_calls();
        calls.sort();
        calls
    }

    pub fn reset_calls(&self) {
        self.options_calls.store(0, Ordering::SeqCst);
        self.partition_calls.lock().unwrap().clear();
    }

    pub fn shared(self) -> Arc<Self> {
        Arc::new(self)
    }
}

#[async_trait]
impl PartitionFetcher for ScriptedFetcher {
    async fn fetch_options(&self) -> Result<SearchOptions, FetchError> {
        self.options_calls.fetch_add(1, Ordering::SeqCst);
        self.options
            .lock()
            .unwrap()
            .clone()
            .unwrap_or_else(|| Ok(SearchOptions::default()))
    }

    async fn fetch_partition(&self, partition: &str) -> Result<Vec<Record>, FetchError> {
        self.partition_calls
            .lock()
            .unwrap()
            .push(partition.to_string());
        let delay = self.delays.lock().unwrap().get(partition).copied();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        self.partitions
            .lock()
            .unwrap()
            .get(partition)
            .cloned()
            .unwrap_or_else(|| Ok(Vec::new()))
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

/// Build a section record.
pub fn section(key: u32, section: &str, title: &str, open_seats: u32) -> Record {
    Record::new(RecordKey::new(key), section, title)
        .with_credits("3")
        .with_seats(30, open_seats)
        .with_instructor("Staff")
        .with_schedule("MW 11:00A - 12:15P", "DeBartolo Hall 101")
}

/// Options listing the given subject codes.
pub fn options_with_subjects(subjects: &[&str]) -> SearchOptions {
    let mut options = SearchOptions::new();
    options.insert(OptionCategory::Term, "201910", "Fall Semester 2019");
    options.insert(OptionCategory::Division, "A", "All");
    options.insert(OptionCategory::Campus, "M", "Main");
    for subject in subjects {
        options.insert(OptionCategory::Subject, *subject, format!("{} Department", subject));
    }
    options
}

pub fn cse_records() -> Vec<Record> {
    vec![
        section(20345, "CSE 20289 01", "Systems Programming", 4).with_instructor("Peter Bui"),
        section(20346, "CSE 30341 01", "Operating System Principles", 0)
            .with_instructor("Douglas Thain"),
    ]
}

pub fn math_records() -> Vec<Record> {
    vec![
        section(30110, "MATH 10550 01", "Calculus I", 12).with_instructor("Sonja Mapes"),
        section(30111, "MATH 20580 01", "Linear Algebra", 0).with_instructor("Brian Hall"),
    ]
}

pub fn phys_records() -> Vec<Record> {
    vec![section(40220, "PHYS 10310 01", "General Physics I", 3).with_instructor("Mark Caprio")]
}

/// Fetcher serving CSE, MATH and PHYS with five records in total.
pub fn sample_fetcher() -> ScriptedFetcher {
    ScriptedFetcher::new()
        .with_options(options_with_subjects(&["CSE", "MATH", "PHYS"]))
        .with_partition("CSE", cse_records())
        .with_partition("MATH", math_records())
        .with_partition("PHYS", phys_records())
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    use super::*;
    use proptest::prelude::*;
    use std::collections::BTreeSet;

    pub fn arb_record_key() -> impl Strategy<Value = RecordKey> {
        (10_000u32..99_999).prop_map(RecordKey::new)
    }

    pub fn arb_subject() -> impl Strategy<Value = String> {
        "[A-Z]{2,4}"
    }

    pub fn arb_record_with_key(key: RecordKey) -> impl Strategy<Value = Record> {
        (arb_subject(), 10_000u32..99_999, "[A-Za-z ]{1,24}", 0u32..40, "[A-Za-z ]{0,16}")
            .prop_map(move |(subject, number, title, open, instructor)| {
                Record::new(key, format!("{} {} 01", subject, number), title)
                    .with_seats(40, open)
                    .with_instructor(instructor)
            })
    }

    pub fn arb_record() -> impl Strategy<Value = Record> {
        arb_record_key().prop_flat_map(arb_record_with_key)
    }

    /// Record sets with unique keys, up to `max` records.
    pub fn arb_record_set(max: usize) -> impl Strategy<Value = RecordSet> {
        proptest::collection::btree_set(arb_record_key(), 0..=max)
            .prop_flat_map(|keys: BTreeSet<RecordKey>| {
                keys.into_iter()
                    .map(arb_record_with_key)
                    .collect::<Vec<_>>()
            })
            .prop_map(|records| {
                RecordSet::from_records(records).expect("generated keys are unique")
            })
    }
}
