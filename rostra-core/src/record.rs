//! Course section records as returned by the class search service.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique record identifier (the section's CRN).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordKey(u32);

impl RecordKey {
    pub const fn new(value: u32) -> Self {
        Self(value)
    }

    pub const fn get(self) -> u32 {
        self.0
    }
}

impl fmt::Display for RecordKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for RecordKey {
    fn from(value: u32) -> Self {
        Self(value)
    }
}

impl std::str::FromStr for RecordKey {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// A single course section.
///
/// Records are immutable once fetched; a refresh replaces them whole.
/// Only [`Record::key`] and [`Record::partition_key`] carry meaning for
/// the cache, every other field is passed through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    /// Section label, e.g. `"CSE 20289 01"`. The partition key is derived from it.
    pub section: String,
    pub title: String,
    pub credits: String,
    /// Maximum enrollment.
    pub capacity: u32,
    /// Seats still available.
    pub open_seats: u32,
    pub key: RecordKey,
    pub instructor: String,
    pub schedule: String,
    pub location: String,
}

impl Record {
    /// Create a record with the identifying fields set and the rest empty.
    pub fn new(key: RecordKey, section: impl Into<String>, title: impl Into<String>) -> Self {
        Self {
            section: section.into(),
            title: title.into(),
            credits: String::new(),
            capacity: 0,
            open_seats: 0,
            key,
            instructor: String::new(),
            schedule: String::new(),
            location: String::new(),
        }
    }

    pub fn key(&self) -> RecordKey {
        self.key
    }

    /// Subject code the section belongs to: the leading run of ASCII
    /// uppercase letters of `section` (`"CSE 20289 01"` -> `"CSE"`).
    pub fn partition_key(&self) -> &str {
        let end = self
            .section
            .bytes()
            .position(|b| !b.is_ascii_uppercase())
            .unwrap_or(self.section.len());
        &self.section[..end]
    }

    pub fn is_open(&self) -> bool {
        self.open_seats > 0
    }

    pub fn with_instructor(mut self, instructor: impl Into<String>) -> Self {
        self.instructor = instructor.into();
        self
    }

    pub fn with_seats(mut self, capacity: u32, open_seats: u32) -> Self {
        self.capacity = capacity;
        self.open_seats = open_seats;
        self
    }

    pub fn with_credits(mut self, credits: impl Into<String>) -> Self {
        self.credits = credits.into();
        self
    }

    pub fn with_schedule(mut self, schedule: impl Into<String>, location: impl Into<String>) -> Self {
        self.schedule = schedule.into();
        self.location = location.into();
        self
    }
}
