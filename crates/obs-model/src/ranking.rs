//! Category rankings and top-N limits.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use crate::error::ModelError;
use crate::field::Field;

/// How many ranking entries to keep.
///
/// Serialized as a bare number or `"all"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(try_from = "LimitRepr")]
pub enum Limit {
    Top(usize),
    All,
}

impl Limit {
    /// Choices offered for top-N selectors.
    pub const CHOICES: [Limit; 4] = [Limit::Top(10), Limit::Top(20), Limit::Top(30), Limit::All];

    /// Maximum number of entries, `None` for unlimited.
    pub const fn cap(self) -> Option<usize> {
        match self {
            Limit::Top(n) => Some(n),
            Limit::All => None,
        }
    }
}

impl Default for Limit {
    fn default() -> Self {
        Limit::Top(10)
    }
}

impl fmt::Display for Limit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Limit::Top(n) => write!(f, "{n}"),
            Limit::All => f.write_str("all"),
        }
    }
}

impl FromStr for Limit {
    type Err = ModelError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if ["all", "todos", "todas"]
            .iter()
            .any(|word| trimmed.eq_ignore_ascii_case(word))
        {
            return Ok(Limit::All);
        }
        trimmed
            .parse::<usize>()
            .map(Limit::Top)
            .map_err(|_| ModelError::InvalidLimit {
                value: s.to_string(),
            })
    }
}

impl Serialize for Limit {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Limit::Top(n) => serializer.serialize_u64(*n as u64),
            Limit::All => serializer.serialize_str("all"),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum LimitRepr {
    Number(usize),
    Text(String),
}

impl TryFrom<LimitRepr> for Limit {
    type Error = ModelError;

    fn try_from(repr: LimitRepr) -> Result<Self, Self::Error> {
        match repr {
            LimitRepr::Number(n) => Ok(Limit::Top(n)),
            LimitRepr::Text(text) => text.parse(),
        }
    }
}

/// One category with its occurrence count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RankEntry {
    pub value: String,
    pub count: usize,
}

impl RankEntry {
    pub fn new(value: impl Into<String>, count: usize) -> Self {
        Self {
            value: value.into(),
            count,
        }
    }
}

/// Categories of one field ordered by descending count.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ranking {
    pub field: Field,
    pub entries: Vec<RankEntry>,
}

impl Ranking {
    pub fn new(field: Field, entries: Vec<RankEntry>) -> Self {
        Self { field, entries }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all counts.
    pub fn total(&self) -> usize {
        self.entries.iter().map(|entry| entry.count).sum()
    }

    pub fn values(&self) -> Vec<&str> {
        self.entries.iter().map(|entry| entry.value.as_str()).collect()
    }

    pub fn count_of(&self, value: &str) -> Option<usize> {
        self.entries
            .iter()
            .find(|entry| entry.value == value)
            .map(|entry| entry.count)
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RankEntry> {
        self.entries.iter()
    }
}
