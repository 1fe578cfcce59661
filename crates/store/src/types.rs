// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The shapes a table is configured with (spec.md §4.4.1, §4.4.5) and the
//! records its change stream emits.

use lc_expr::Item;
use serde::{Deserialize, Serialize};

/// Names the partition (and, optionally, sort) attribute of a table or a
/// GSI. Key attributes are always `S`, `N`, or `B` (spec.md §6, "typed
/// attribute values everywhere").
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KeySchema {
    pub partition: String,
    pub sort: Option<String>,
}

impl KeySchema {
    pub fn new(partition: impl Into<String>) -> Self {
        KeySchema { partition: partition.into(), sort: None }
    }

    pub fn with_sort(partition: impl Into<String>, sort: impl Into<String>) -> Self {
        KeySchema { partition: partition.into(), sort: Some(sort.into()) }
    }
}

/// A global secondary index: its own composite key over the table's
/// items, with a pointer back to the base row (spec.md §4.4.1).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GsiDef {
    pub name: String,
    pub key_schema: KeySchema,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TableDef {
    pub name: String,
    pub key_schema: KeySchema,
    #[serde(default)]
    pub gsis: Vec<GsiDef>,
}

impl TableDef {
    pub fn new(name: impl Into<String>, key_schema: KeySchema) -> Self {
        TableDef { name: name.into(), key_schema, gsis: Vec::new() }
    }

    pub fn gsi(&self, name: &str) -> Option<&GsiDef> {
        self.gsis.iter().find(|g| g.name == name)
    }
}

/// Which images a stream record carries (spec.md §4.4.5).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamViewType {
    KeysOnly,
    NewImage,
    OldImage,
    NewAndOld,
}

/// A table's change-stream configuration: just the view type. Window and
/// buffer sizing live in [`lc_fabric::StreamDispatcherConfig`], which a
/// table's stream dispatcher is built with independently.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct StreamConfig {
    pub view: StreamViewType,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StreamEventName {
    Insert,
    Modify,
    Remove,
}

/// One change-stream record (spec.md §4.4.5): event-id, event-name, the
/// key attributes, images per the table's view type, a monotone
/// per-table sequence number, and an approximate creation time.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StreamRecord {
    pub event_id: String,
    pub event_name: StreamEventName,
    pub table_name: String,
    pub keys: Item,
    pub new_image: Option<Item>,
    pub old_image: Option<Item>,
    pub sequence_number: u64,
    pub approx_creation_time_ms: i64,
}
