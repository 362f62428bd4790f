//! Query descriptions shared by the view, export and label endpoints.
//!
//! These are plain data: the pipeline in the backend interprets them. Column
//! names are free-form strings because the dataset's columns only exist at
//! runtime.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Column name -> case-insensitive substring pattern.
///
/// An empty pattern places no constraint on its column.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FilterSpec {
    patterns: BTreeMap<String, String>,
}

impl FilterSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, column: impl Into<String>, pattern: impl Into<String>) -> Self {
        self.insert(column, pattern);
        self
    }

    pub fn insert(&mut self, column: impl Into<String>, pattern: impl Into<String>) {
        self.patterns.insert(column.into(), pattern.into());
    }

    /// Pairs with a non-empty pattern.
    pub fn active(&self) -> impl Iterator<Item = (&str, &str)> {
        self.patterns
            .iter()
            .filter(|(_, p)| !p.is_empty())
            .map(|(c, p)| (c.as_str(), p.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.active().next().is_none()
    }
}

/// How values of a sort column compare.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortKind {
    /// Numeric when both sides parse as numbers, lexicographic otherwise.
    Natural,
    /// Chronological, parsing values with the given `chrono` format.
    Date(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortKey {
    pub column: String,
    pub ascending: bool,
    pub kind: SortKind,
}

impl SortKey {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
            kind: SortKind::Natural,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            ascending: false,
            ..Self::asc(column)
        }
    }

    pub fn date(column: impl Into<String>, format: impl Into<String>) -> Self {
        Self {
            kind: SortKind::Date(format.into()),
            ..Self::asc(column)
        }
    }
}

/// Ordered sort keys, compared lexicographically.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SortSpec(pub Vec<SortKey>);

impl SortSpec {
    pub fn new(keys: Vec<SortKey>) -> Self {
        Self(keys)
    }

    /// Parses a selector such as `RMS,PIN,-NAME`. A leading `-` sorts that
    /// column descending; blank entries are ignored.
    pub fn parse(selector: &str) -> Self {
        Self(
            selector
                .split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty() && *s != "-")
                .map(|s| match s.strip_prefix('-') {
                    Some(col) => SortKey::desc(col.trim()),
                    None => SortKey::asc(s),
                })
                .collect(),
        )
    }

    pub fn keys(&self) -> &[SortKey] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

/// Which columns decide that two records are duplicates.
///
/// Both policies are in use by different operations and are kept apart on
/// purpose: the view's "clear repetitions" action compares whole rows, the
/// expired-customers export compares contact details only.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DedupKey {
    AllColumns,
    Columns(Vec<String>),
}

impl DedupKey {
    pub const CONTACT_COLUMNS: [&'static str; 3] = ["NAME", "ADDRESS", "PHONE"];

    /// Name + address + phone.
    pub fn contact() -> Self {
        Self::Columns(Self::CONTACT_COLUMNS.iter().map(|c| c.to_string()).collect())
    }
}

/// Relative order of the sort and dedup steps.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StepOrder {
    #[default]
    SortThenDedup,
    DedupThenSort,
}

/// Label sheet layout.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LabelLayout {
    /// One record per page with sender and recipient blocks.
    #[default]
    Envelope,
    /// 50 records per page in a 5 x 10 grid.
    Grid,
}
