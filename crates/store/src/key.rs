// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Composite-key extraction and canonicalisation (spec.md §3
//! "Document-store entities", invariant: "every item contains the full
//! composite key"). A table's primary index, and each GSI's auxiliary
//! index, are keyed by a [`KeyTuple`] — a hashable, orderable stand-in for
//! the typed partition (and optional sort) attribute values, since
//! [`lc_core::AttributeValue`] itself derives neither `Hash` nor `Ord`
//! (numbers are kept as decimal strings, not floats, precisely so they
//! never need a `Hash`/`Eq` impl elsewhere).

use lc_core::AttributeValue;
use lc_expr::Item;

use crate::error::StoreError;
use crate::types::KeySchema;

/// A canonicalised, hashable/orderable stand-in for one typed attribute
/// value, used only as a map key — never handed back to a caller as data.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum KeyPart {
    S(String),
    /// Numbers are re-parsed and re-formatted through
    /// [`lc_core::AttributeValue::as_number`] so that `"5"` and `"5.0"`
    /// canonicalise to the same key, matching the numeric-coercion rule
    /// the expression evaluator applies everywhere else.
    N(String),
    B(Vec<u8>),
}

impl KeyPart {
    pub fn from_attribute(value: &AttributeValue) -> Result<Self, StoreError> {
        match value {
            AttributeValue::S(s) => Ok(KeyPart::S(s.clone())),
            AttributeValue::N(_) => {
                let n = value.as_number().map_err(|e| StoreError::Validation(e.to_string()))?;
                Ok(KeyPart::N(format!("{n:.12e}")))
            }
            AttributeValue::B(b) => Ok(KeyPart::B(b.clone())),
            other => Err(StoreError::Validation(format!("key attributes must be S, N, or B, got {other:?}"))),
        }
    }
}

/// The hashable key an item is addressed by: the partition key part, plus
/// a sort key part when the schema has one.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct KeyTuple {
    pub partition: KeyPart,
    pub sort: Option<KeyPart>,
}

/// Extracts the full composite key from `item` per `schema`. Fails if a
/// required key attribute is missing (spec.md §3 invariant).
pub fn extract_key(item: &Item, schema: &KeySchema) -> Result<KeyTuple, StoreError> {
    let partition_attr = item
        .get(&schema.partition)
        .ok_or_else(|| StoreError::MissingKeyAttribute(schema.partition.clone()))?;
    let partition = KeyPart::from_attribute(partition_attr)?;

    let sort = match &schema.sort {
        Some(sort_name) => {
            let sort_attr = item.get(sort_name).ok_or_else(|| StoreError::MissingKeyAttribute(sort_name.clone()))?;
            Some(KeyPart::from_attribute(sort_attr)?)
        }
        None => None,
    };

    Ok(KeyTuple { partition, sort })
}

/// Like [`extract_key`], but returns `None` rather than an error when a key
/// attribute is missing or mistyped, for GSIs (spec.md §4.4.1: "an item
/// missing a GSI's key attributes is simply absent from that index" —
/// DynamoDB's sparse-index behaviour).
pub fn try_extract_key(item: &Item, schema: &KeySchema) -> Option<KeyTuple> {
    extract_key(item, schema).ok()
}

/// Extracts just the key attributes from `item` into their own `Item`, as
/// carried on a [`crate::types::StreamRecord`]'s `keys` field.
pub fn key_attributes(item: &Item, schema: &KeySchema) -> Item {
    let mut keys = Item::new();
    if let Some(v) = item.get(&schema.partition) {
        keys.insert(schema.partition.clone(), v.clone());
    }
    if let Some(sort_name) = &schema.sort {
        if let Some(v) = item.get(sort_name) {
            keys.insert(sort_name.clone(), v.clone());
        }
    }
    keys
}

#[cfg(test)]
#[path = "key_tests.rs"]
mod tests;
