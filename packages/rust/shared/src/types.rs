//! Core domain types for formfill.

use std::fmt;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Storage key under which the whole [`FormData`] mapping is persisted.
pub const FORM_DATA_KEY: &str = "formData";

// ---------------------------------------------------------------------------
// FormData
// ---------------------------------------------------------------------------

/// The persisted string-to-string dictionary driving auto-fill.
///
/// Iterates in insertion order. Replacing the value of an existing key keeps
/// the key at its original position. Serialized as a single JSON object.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FormData(IndexMap<String, String>);

impl FormData {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Look up the value stored for `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Set `key` to `value`, returning the previous value if there was one.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.0.insert(key.into(), value.into())
    }

    /// Iterate `(key, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FormData {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}

// ---------------------------------------------------------------------------
// DateOrder
// ---------------------------------------------------------------------------

/// How a `D/M/YYYY`-style answer is read before it is written to a date input.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DateOrder {
    /// `DD/MM/YYYY`.
    #[default]
    DayFirst,
    /// `MM/DD/YYYY`.
    MonthFirst,
}

impl fmt::Display for DateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DayFirst => write!(f, "day-first"),
            Self::MonthFirst => write!(f, "month-first"),
        }
    }
}

impl std::str::FromStr for DateOrder {
    type Err = crate::FormFillError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "day-first" => Ok(Self::DayFirst),
            "month-first" => Ok(Self::MonthFirst),
            other => Err(crate::FormFillError::config(format!(
                "unknown date order '{other}': expected 'day-first' or 'month-first'"
            ))),
        }
    }
}
