//! Caller-supplied record predicates.
//!
//! A [`FilterCriteria`] is built per request and never persisted. Each
//! pattern list is OR-matched internally and the lists are AND-ed
//! together; an empty list places no constraint on its field.

use regex::Regex;

use crate::error::FilterError;
use crate::record::{Record, RecordKey};

/// Predicate specification applied by [`crate::RecordSet::filter`].
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Keep only records with open seats.
    pub open_only: bool,
    /// Keep only these keys (empty means any key).
    pub keys: Vec<RecordKey>,
    /// Patterns matched against the lower-cased title.
    pub titles: Vec<Regex>,
    /// Patterns matched against the lower-cased instructor.
    pub instructors: Vec<Regex>,
    /// Patterns matched against the lower-cased partition key.
    pub partitions: Vec<Regex>,
}

impl FilterCriteria {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn open_only(mut self, open_only: bool) -> Self {
        self.open_only = open_only;
        self
    }

    pub fn with_keys(mut self, keys: impl IntoIterator<Item = RecordKey>) -> Self {
        self.keys = keys.into_iter().collect();
        self
    }

    pub fn with_title_patterns<S: AsRef<str>>(mut self, patterns: &[S]) -> Result<Self, FilterError> {
        self.titles = compile_patterns("title", patterns)?;
        Ok(self)
    }

    pub fn with_instructor_patterns<S: AsRef<str>>(
        mut self,
        patterns: &[S],
    ) -> Result<Self, FilterError> {
        self.instructors = compile_patterns("instructor", patterns)?;
        Ok(self)
    }

    pub fn with_partition_patterns<S: AsRef<str>>(
        mut self,
        patterns: &[S],
    ) -> Result<Self, FilterError> {
        self.partitions = compile_patterns("partition", patterns)?;
        Ok(self)
    }

    /// Returns true if `record` passes every constraint.
    pub fn matches(&self, record: &Record) -> bool {
        if self.open_only && !record.is_open() {
            return false;
        }
        if !self.keys.is_empty() && !self.keys.contains(&record.key) {
            return false;
        }
        any_match(&self.titles, &record.title)
            && any_match(&self.instructors, &record.instructor)
            && any_match(&self.partitions, record.partition_key())
    }

    /// Returns true if no constraint is set.
    pub fn is_unconstrained(&self) -> bool {
        !self.open_only
            && self.keys.is_empty()
            && self.titles.is_empty()
            && self.instructors.is_empty()
            && self.partitions.is_empty()
    }
}

fn any_match(patterns: &[Regex], field: &str) -> bool {
    if patterns.is_empty() {
        return true;
    }
    let lowered = field.to_lowercase();
    patterns.iter().any(|pattern| pattern.is_match(&lowered))
}

/// Compile user patterns case-insensitively by lower-casing them, the
/// same way the matched fields are lower-cased.
fn compile_patterns<S: AsRef<str>>(
    field: &'static str,
    patterns: &[S],
) -> Result<Vec<Regex>, FilterError> {
    patterns
        .iter()
        .map(|pattern| {
            let pattern = pattern.as_ref();
            Regex::new(&pattern.to_lowercase()).map_err(|err| FilterError::InvalidPattern {
                field,
                pattern: pattern.to_string(),
                reason: err.to_string(),
            })
        })
        .collect()
}
