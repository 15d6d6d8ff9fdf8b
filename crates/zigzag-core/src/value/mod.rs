//! Module: value
//! Responsibility: dynamic, totally ordered slot value for keys and projections.
//! Does not own: stream ordering policy (see `key`) or cursor storage layout.
//! Boundary: the merger is generic over slot values; this type is the default.

mod compare;


use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

///
/// Value
///
/// Opaque index slot value. Cross-variant order follows a fixed rank
/// (`Null < Bool < numeric < Text < Blob < List`); signed and unsigned
/// integers share one numeric rank and compare by magnitude.
///

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub enum Value {
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Uint(u64),
    Text(String),
    Blob(Vec<u8>),
    List(Vec<Self>),
}

impl Value {
    /// Stable cross-variant rank used by the total order.
    #[must_use]
    pub const fn canonical_rank(&self) -> u8 {
        compare::canonical_rank(self)
    }

    /// Total canonical comparator.
    #[must_use]
    pub fn canonical_cmp(left: &Self, right: &Self) -> Ordering {
        compare::canonical_cmp(left, right)
    }

    #[must_use]
    pub const fn is_null(&self) -> bool {
        matches!(self, Self::Null)
    }

    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        compare::canonical_cmp(self, other).is_eq()
    }
}

impl Eq for Value {}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        compare::canonical_cmp(self, other)
    }
}

impl From<bool> for Value {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<u64> for Value {
    fn from(value: u64) -> Self {
        Self::Uint(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<Vec<u8>> for Value {
    fn from(value: Vec<u8>) -> Self {
        Self::Blob(value)
    }
}

impl From<Vec<Self>> for Value {
    fn from(value: Vec<Self>) -> Self {
        Self::List(value)
    }
}
