// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory storage for one table: the primary index plus one auxiliary
//! index per GSI (spec.md §4.4.1). Held behind a single `RwLock` per table
//! so a write sees a consistent view of the primary index and every GSI it
//! touches — the same `RwLock`-guarded mutable state pattern used for a
//! single resource, generalized to a table with secondary indexes.

use std::collections::HashMap;

use indexmap::IndexMap;
use parking_lot::RwLock;

use crate::key::{self, KeyTuple};
use crate::types::TableDef;
use crate::Item;

#[derive(Default)]
struct TableState {
    items: IndexMap<KeyTuple, Item>,
    /// GSI name -> (gsi key -> primary keys mapping to it). A `Vec` because
    /// a GSI's key schema need not be unique across items (spec.md §4.4.1).
    gsi_indexes: HashMap<String, IndexMap<KeyTuple, Vec<KeyTuple>>>,
}

pub struct Table {
    def: TableDef,
    state: RwLock<TableState>,
}

impl Table {
    pub fn new(def: TableDef) -> Self {
        let gsi_indexes = def.gsis.iter().map(|g| (g.name.clone(), IndexMap::new())).collect();
        Table { def, state: RwLock::new(TableState { items: IndexMap::new(), gsi_indexes }) }
    }

    pub fn def(&self) -> &TableDef {
        &self.def
    }

    pub fn get(&self, primary_key: &KeyTuple) -> Option<Item> {
        self.state.read().items.get(primary_key).cloned()
    }

    pub fn len(&self) -> usize {
        self.state.read().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.state.read().items.is_empty()
    }

    /// Inserts or replaces the item at `primary_key`, re-indexing every
    /// GSI it belongs to, and returns the image it replaced (if any).
    pub fn put(&self, primary_key: KeyTuple, item: Item) -> Option<Item> {
        let mut state = self.state.write();
        let old = state.items.insert(primary_key.clone(), item.clone());
        Self::reindex(&self.def, &mut state, &primary_key, old.as_ref(), Some(&item));
        old
    }

    /// Removes the item at `primary_key` from the table and every GSI,
    /// returning the image that was removed (if any).
    pub fn delete(&self, primary_key: &KeyTuple) -> Option<Item> {
        let mut state = self.state.write();
        let old = state.items.shift_remove(primary_key);
        if old.is_some() {
            Self::reindex(&self.def, &mut state, primary_key, old.as_ref(), None);
        }
        old
    }

    fn reindex(
        def: &TableDef,
        state: &mut TableState,
        primary_key: &KeyTuple,
        old_item: Option<&Item>,
        new_item: Option<&Item>,
    ) {
        for gsi in &def.gsis {
            let index = state.gsi_indexes.entry(gsi.name.clone()).or_default();
            if let Some(old_item) = old_item {
                if let Some(old_gsi_key) = key::try_extract_key(old_item, &gsi.key_schema) {
                    if let Some(bucket) = index.get_mut(&old_gsi_key) {
                        bucket.retain(|k| k != primary_key);
                        if bucket.is_empty() {
                            index.shift_remove(&old_gsi_key);
                        }
                    }
                }
            }
            if let Some(new_item) = new_item {
                if let Some(new_gsi_key) = key::try_extract_key(new_item, &gsi.key_schema) {
                    index.entry(new_gsi_key).or_default().push(primary_key.clone());
                }
            }
        }
    }

    /// Every item in the table, in primary-index insertion order (spec.md
    /// §4.4.4, `Scan`).
    pub fn scan(&self) -> Vec<Item> {
        self.state.read().items.values().cloned().collect()
    }

    /// All items sharing `partition`, sorted by sort key ascending (spec.md
    /// §4.4.4, `Query`). A linear scan: fine for an emulator's data
    /// volumes, and keeps the primary index a plain insertion-ordered map
    /// rather than a partition-bucketed structure.
    pub fn query_partition(&self, partition: &key::KeyPart) -> Vec<(KeyTuple, Item)> {
        let state = self.state.read();
        let mut matches: Vec<(KeyTuple, Item)> =
            state.items.iter().filter(|(k, _)| &k.partition == partition).map(|(k, v)| (k.clone(), v.clone())).collect();
        matches.sort_by(|(a, _), (b, _)| a.sort.cmp(&b.sort));
        matches
    }

    /// All items sharing `partition` on `gsi_name`'s index, sorted by the
    /// GSI's sort key ascending. Returns `None` if no GSI with that name
    /// exists.
    pub fn query_gsi_partition(&self, gsi_name: &str, partition: &key::KeyPart) -> Option<Vec<(KeyTuple, Item)>> {
        let state = self.state.read();
        let index = state.gsi_indexes.get(gsi_name)?;
        let mut matches: Vec<(KeyTuple, Item)> = index
            .iter()
            .filter(|(gsi_key, _)| &gsi_key.partition == partition)
            .flat_map(|(gsi_key, primary_keys)| {
                primary_keys.iter().filter_map(|pk| state.items.get(pk).map(|item| (gsi_key.clone(), item.clone())))
            })
            .collect();
        matches.sort_by(|(a, _), (b, _)| a.sort.cmp(&b.sort));
        Some(matches)
    }
}

#[cfg(test)]
#[path = "table_tests.rs"]
mod tests;
