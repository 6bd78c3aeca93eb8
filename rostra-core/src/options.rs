//! Search option vocabulary published by the class search service.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

/// A named option category on the search form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OptionCategory {
    Term,
    Division,
    Campus,
    /// Subjects double as the partition vocabulary.
    Subject,
    Attribute,
    Credit,
}

impl OptionCategory {
    pub const ALL: [OptionCategory; 6] = [
        OptionCategory::Term,
        OptionCategory::Division,
        OptionCategory::Campus,
        OptionCategory::Subject,
        OptionCategory::Attribute,
        OptionCategory::Credit,
    ];

    /// Name of the form field carrying this category.
    pub fn field_name(self) -> &'static str {
        match self {
            OptionCategory::Term => "TERM",
            OptionCategory::Division => "DIVS",
            OptionCategory::Campus => "CAMPUS",
            OptionCategory::Subject => "SUBJ",
            OptionCategory::Attribute => "ATTR",
            OptionCategory::Credit => "CREDIT",
        }
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|category| category.field_name().eq_ignore_ascii_case(name))
    }
}

impl fmt::Display for OptionCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// Machine key -> human label, per category.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchOptions {
    #[serde(default)]
    pub terms: BTreeMap<String, String>,
    #[serde(default)]
    pub divisions: BTreeMap<String, String>,
    #[serde(default)]
    pub campuses: BTreeMap<String, String>,
    #[serde(default)]
    pub subjects: BTreeMap<String, String>,
    #[serde(default)]
    pub attributes: BTreeMap<String, String>,
    #[serde(default)]
    pub credits: BTreeMap<String, String>,
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn category(&self, category: OptionCategory) -> &BTreeMap<String, String> {
        match category {
            OptionCategory::Term => &self.terms,
            OptionCategory::Division => &self.divisions,
            OptionCategory::Campus => &self.campuses,
            OptionCategory::Subject => &self.subjects,
            OptionCategory::Attribute => &self.attributes,
            OptionCategory::Credit => &self.credits,
        }
    }

    pub fn category_mut(&mut self, category: OptionCategory) -> &mut BTreeMap<String, String> {
        match category {
            OptionCategory::Term => &mut self.terms,
            OptionCategory::Division => &mut self.divisions,
            OptionCategory::Campus => &mut self.campuses,
            OptionCategory::Subject => &mut self.subjects,
            OptionCategory::Attribute => &mut self.attributes,
            OptionCategory::Credit => &mut self.credits,
        }
    }

    pub fn insert(
        &mut self,
        category: OptionCategory,
        key: impl Into<String>,
        label: impl Into<String>,
    ) -> &mut Self {
        self.category_mut(category).insert(key.into(), label.into());
        self
    }

    /// Every subject key; one fetch is issued per entry on a full refresh.
    pub fn partition_keys(&self) -> BTreeSet<String> {
        self.subjects.keys().cloned().collect()
    }

    pub fn label(&self, category: OptionCategory, key: &str) -> Option<&str> {
        self.category(category).get(key).map(String::as_str)
    }

    pub fn is_empty(&self) -> bool {
        OptionCategory::ALL
            .into_iter()
            .all(|category| self.category(category).is_empty())
    }
}
