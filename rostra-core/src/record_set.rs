//! Keyed and ordered record storage.
//!
//! A [`RecordSet`] keeps an insertion-ordered list of records plus a
//! key -> position index into that list. Every mutation goes through a
//! method that updates both views, so a key is indexed iff it occupies
//! exactly one list slot.
//!
//! Serialization writes the ordered list only. Deserialization rebuilds
//! the index and rejects a list that repeats a key.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};

use crate::error::RecordSetError;
use crate::filter::FilterCriteria;
use crate::record::{Record, RecordKey};

/// Dual-view record collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Record>", into = "Vec<Record>")]
pub struct RecordSet {
    records: Vec<Record>,
    index: HashMap<RecordKey, usize>,
}

impl RecordSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::with_capacity(capacity),
            index: HashMap::with_capacity(capacity),
        }
    }

    /// Build a set from an ordered list, rejecting repeated keys.
    pub fn from_records(records: Vec<Record>) -> Result<Self, RecordSetError> {
        let mut set = Self::with_capacity(records.len());
        for record in records {
            set.insert_new(record)?;
        }
        Ok(set)
    }

    /// Append a record whose key is not yet present.
    pub fn insert_new(&mut self, record: Record) -> Result<(), RecordSetError> {
        let key = record.key;
        if self.index.contains_key(&key) {
            return Err(RecordSetError::DuplicateKey { key });
        }
        self.index.insert(key, self.records.len());
        self.records.push(record);
        Ok(())
    }

    /// Replace a record whose key is already present, keeping its position.
    pub fn update_existing(&mut self, record: Record) -> Result<(), RecordSetError> {
        let key = record.key;
        let slot = *self
            .index
            .get(&key)
            .ok_or(RecordSetError::KeyNotFound { key })?;
        self.records[slot] = record;
        Ok(())
    }

    /// Update in place if the key is known, otherwise append.
    ///
    /// Returns true if an existing record was replaced.
    pub fn upsert(&mut self, record: Record) -> bool {
        match self.index.get(&record.key) {
            Some(&slot) => {
                self.records[slot] = record;
                true
            }
            None => {
                self.index.insert(record.key, self.records.len());
                self.records.push(record);
                false
            }
        }
    }

    /// Overwrite every record of `source` into `self`.
    ///
    /// Only keys `self` already holds are accepted: if any key of
    /// `source` is unknown the merge fails and `self` is left untouched.
    /// List order is preserved and keys absent from `source` are kept.
    /// Returns the number of records updated.
    pub fn merge(&mut self, source: &RecordSet) -> Result<usize, RecordSetError> {
        if let Some(key) = source.keys().find(|key| !self.contains(*key)) {
            return Err(RecordSetError::KeyNotFound { key });
        }
        for record in &source.records {
            let slot = self.index[&record.key];
            self.records[slot] = record.clone();
        }
        Ok(source.len())
    }

    /// New set holding every record that passes `criteria`, in list order.
    pub fn filter(&self, criteria: &FilterCriteria) -> RecordSet {
        let mut filtered = RecordSet::new();
        for record in self.records.iter().filter(|record| criteria.matches(record)) {
            filtered.upsert(record.clone());
        }
        filtered
    }

    /// Partition keys of the given records.
    ///
    /// Fails on the first key this set does not hold.
    pub fn group_partition_keys(
        &self,
        keys: &[RecordKey],
    ) -> Result<BTreeSet<String>, RecordSetError> {
        keys.iter()
            .map(|key| {
                self.get(*key)
                    .map(|record| record.partition_key().to_string())
                    .ok_or(RecordSetError::KeyNotFound { key: *key })
            })
            .collect()
    }

    /// Every partition key present in the set.
    pub fn partition_keys(&self) -> BTreeSet<String> {
        self.records
            .iter()
            .map(|record| record.partition_key().to_string())
            .collect()
    }

    pub fn get(&self, key: RecordKey) -> Option<&Record> {
        self.index.get(&key).map(|&slot| &self.records[slot])
    }

    pub fn contains(&self, key: RecordKey) -> bool {
        self.index.contains_key(&key)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Records in list order.
    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }

    /// Keys in list order.
    pub fn keys(&self) -> impl Iterator<Item = RecordKey> + '_ {
        self.records.iter().map(|record| record.key)
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn into_records(self) -> Vec<Record> {
        self.records
    }
}

impl TryFrom<Vec<Record>> for RecordSet {
    type Error = RecordSetError;

    fn try_from(records: Vec<Record>) -> Result<Self, Self::Error> {
        Self::from_records(records)
    }
}

impl From<RecordSet> for Vec<Record> {
    fn from(set: RecordSet) -> Self {
        set.records
    }
}

impl<'a> IntoIterator for &'a RecordSet {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}
