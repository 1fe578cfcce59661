// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The document-store's typed attribute value — a closed sum type mirroring
//! the wire shape every provider speaks: `{"S": "text"}`, `{"N": "42"}`,
//! `{"BOOL": true}`, `{"L": [...]}`, `{"M": {...}}`, `{"SS": [...]}`,
//! `{"NS": [...]}`, `{"NULL": true}`.
//!
//! Numbers are kept as their original decimal string (never parsed into
//! `f64`) so round-tripping never loses precision; arithmetic parses lazily.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use thiserror::Error;

/// A single attribute value in the closed sum type the document store speaks.
///
/// `M` uses an [`IndexMap`] rather than a `HashMap` so that items round-trip
/// with a stable key order, which matters for deterministic test fixtures
/// and for `size()` semantics that never depend on hash iteration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AttributeValue {
    S(String),
    /// Kept as the original decimal string; never normalized.
    N(String),
    B(Vec<u8>),
    #[serde(rename = "BOOL")]
    Bool(bool),
    #[serde(rename = "NULL")]
    Null,
    L(Vec<AttributeValue>),
    M(IndexMap<String, AttributeValue>),
    SS(Vec<String>),
    NS(Vec<String>),
    BS(Vec<Vec<u8>>),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AttributeError {
    #[error("value is not numeric: {0:?}")]
    NotNumeric(String),
    #[error("value is not a set")]
    NotASet,
}

impl AttributeValue {
    pub fn s(v: impl Into<String>) -> Self {
        AttributeValue::S(v.into())
    }

    pub fn n(v: impl Into<String>) -> Self {
        AttributeValue::N(v.into())
    }

    pub fn bool(v: bool) -> Self {
        AttributeValue::Bool(v)
    }

    /// Parses the numeric payload as an `f64`. DynamoDB-style number
    /// attributes are arbitrary-precision decimals in principle; an `f64`
    /// is sufficient fidelity for an emulator and matches what the
    /// evaluator needs for comparisons and arithmetic.
    pub fn as_number(&self) -> Result<f64, AttributeError> {
        match self {
            AttributeValue::N(s) => {
                s.parse::<f64>().map_err(|_| AttributeError::NotNumeric(s.clone()))
            }
            _ => Err(AttributeError::NotNumeric(format!("{self:?}"))),
        }
    }

    /// Parses the numeric payload as an `f64`, also accepting a string
    /// attribute holding a decimal value — the coercion spec.md §4.4.2
    /// requires when one side of a comparison or arithmetic expression is
    /// numeric and the other is its stringified form.
    pub fn as_number_coerced(&self) -> Result<f64, AttributeError> {
        match self {
            AttributeValue::N(s) | AttributeValue::S(s) => {
                s.parse::<f64>().map_err(|_| AttributeError::NotNumeric(s.clone()))
            }
            _ => Err(AttributeError::NotNumeric(format!("{self:?}"))),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttributeValue::S(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, AttributeValue::Null)
    }

    /// `size()` per spec.md §4.4.2: string -> chars, list/map/set -> count,
    /// everything else (including missing, handled by the caller) -> 0.
    pub fn size(&self) -> usize {
        match self {
            AttributeValue::S(s) => s.chars().count(),
            AttributeValue::L(items) => items.len(),
            AttributeValue::M(map) => map.len(),
            AttributeValue::SS(items) => items.len(),
            AttributeValue::NS(items) => items.len(),
            AttributeValue::BS(items) => items.len(),
            AttributeValue::B(bytes) => bytes.len(),
            _ => 0,
        }
    }

    /// Membership test used by `contains()` and set `DELETE`/`ADD`.
    pub fn contains(&self, needle: &AttributeValue) -> bool {
        match self {
            AttributeValue::S(s) => needle.as_str().is_some_and(|n| s.contains(n)),
            AttributeValue::L(items) => items.contains(needle),
            AttributeValue::SS(items) => {
                needle.as_str().is_some_and(|n| items.iter().any(|i| i == n))
            }
            AttributeValue::NS(items) => match needle.as_number() {
                Ok(n) => items.iter().any(|i| i.parse::<f64>().map(|v| v == n).unwrap_or(false)),
                Err(_) => false,
            },
            AttributeValue::BS(items) => match needle {
                AttributeValue::B(b) => items.contains(b),
                _ => false,
            },
            _ => false,
        }
    }

    /// Numeric-aware equality used by comparisons: a numeric attribute
    /// compares equal to a string attribute holding the same decimal
    /// value, per spec.md §4.4.2's mixed-type coercion rule. Two plain
    /// strings are never coerced against each other — only a comparison
    /// involving an actual `N` attribute coerces the other side.
    pub fn loose_eq(&self, other: &AttributeValue) -> bool {
        if self == other {
            return true;
        }
        if self.is_numeric_comparison_with(other) {
            if let (Ok(a), Ok(b)) = (self.as_number_coerced(), other.as_number_coerced()) {
                return a == b;
            }
        }
        false
    }

    /// Total ordering used by comparisons, honoring the same numeric
    /// coercion as [`loose_eq`](Self::loose_eq). Returns `None` when the
    /// two values aren't comparable (different, non-coercible types).
    pub fn partial_cmp_loose(&self, other: &AttributeValue) -> Option<Ordering> {
        if self.is_numeric_comparison_with(other) {
            if let (Ok(a), Ok(b)) = (self.as_number_coerced(), other.as_number_coerced()) {
                return a.partial_cmp(&b);
            }
        }
        match (self, other) {
            (AttributeValue::S(a), AttributeValue::S(b)) => a.partial_cmp(b),
            (AttributeValue::B(a), AttributeValue::B(b)) => a.partial_cmp(b),
            (AttributeValue::Bool(a), AttributeValue::Bool(b)) => a.partial_cmp(b),
            _ => None,
        }
    }

    /// True when at least one side is an `N` attribute, meaning a
    /// numeric coercion of the other side should be attempted. Guards
    /// [`loose_eq`](Self::loose_eq)/[`partial_cmp_loose`](Self::partial_cmp_loose)
    /// so two `S` attributes are never coerced against each other and
    /// fall through to plain lexical comparison instead.
    fn is_numeric_comparison_with(&self, other: &AttributeValue) -> bool {
        matches!(self, AttributeValue::N(_)) || matches!(other, AttributeValue::N(_))
    }

    /// Union used by `ADD` on a set (or numeric addition for `N`).
    pub fn set_union(&self, other: &AttributeValue) -> Result<AttributeValue, AttributeError> {
        match (self, other) {
            (AttributeValue::SS(a), AttributeValue::SS(b)) => {
                let mut out = a.clone();
                for v in b {
                    if !out.contains(v) {
                        out.push(v.clone());
                    }
                }
                Ok(AttributeValue::SS(out))
            }
            (AttributeValue::NS(a), AttributeValue::NS(b)) => {
                let mut out = a.clone();
                for v in b {
                    let present = out.iter().any(|x| {
                        x.parse::<f64>().ok().zip(v.parse::<f64>().ok()).is_some_and(|(x, y)| x == y)
                    });
                    if !present {
                        out.push(v.clone());
                    }
                }
                Ok(AttributeValue::NS(out))
            }
            (AttributeValue::BS(a), AttributeValue::BS(b)) => {
                let mut out = a.clone();
                for v in b {
                    if !out.contains(v) {
                        out.push(v.clone());
                    }
                }
                Ok(AttributeValue::BS(out))
            }
            _ => Err(AttributeError::NotASet),
        }
    }

    /// Difference used by `DELETE` on a set.
    pub fn set_difference(&self, other: &AttributeValue) -> Result<AttributeValue, AttributeError> {
        match (self, other) {
            (AttributeValue::SS(a), AttributeValue::SS(b)) => {
                Ok(AttributeValue::SS(a.iter().filter(|v| !b.contains(v)).cloned().collect()))
            }
            (AttributeValue::NS(a), AttributeValue::NS(b)) => Ok(AttributeValue::NS(
                a.iter()
                    .filter(|v| {
                        let vn: Option<f64> = v.parse().ok();
                        !b.iter().any(|o| {
                            vn.zip(o.parse::<f64>().ok()).is_some_and(|(x, y)| x == y)
                        })
                    })
                    .cloned()
                    .collect(),
            )),
            (AttributeValue::BS(a), AttributeValue::BS(b)) => {
                Ok(AttributeValue::BS(a.iter().filter(|v| !b.contains(v)).cloned().collect()))
            }
            _ => Err(AttributeError::NotASet),
        }
    }
}

#[cfg(test)]
#[path = "attribute_tests.rs"]
mod tests;
