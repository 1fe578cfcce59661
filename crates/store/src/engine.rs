// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The document-store engine (spec.md §4.4): owns every table in one
//! database, dispatches reads/writes/queries/scans through `lc-expr`, and
//! persists a best-effort snapshot after each committing write, the same
//! top-level subsystem-owning-struct shape generalized from a single
//! state store to many named tables.

use std::cmp::Ordering;
use std::path::PathBuf;
use std::sync::Arc;

use indexmap::IndexMap;
use lc_core::AttributeValue;
use lc_fabric::{BatchHandler, StreamDispatcherConfig};
use parking_lot::RwLock;

use crate::error::StoreError;
use crate::key::{self, KeyTuple};
use crate::persistence::{self, DatabaseSnapshot, TableSnapshot};
use crate::stream::StreamHandler;
use crate::table::Table;
use crate::types::{KeySchema, StreamEventName, StreamRecord, StreamViewType, TableDef};
use crate::Item;

/// Name/value substitution maps for a single request's expressions,
/// bundled so callers don't thread four parameters through every method.
/// Mirrors [`lc_expr::Context`]'s shape exactly, owned instead of borrowed.
#[derive(Debug, Clone, Default)]
pub struct ExprContext {
    pub names: IndexMap<String, String>,
    pub values: IndexMap<String, AttributeValue>,
}

impl ExprContext {
    pub fn as_ctx(&self) -> lc_expr::Context<'_> {
        lc_expr::Context::empty(&self.names, &self.values)
    }
}

struct TableHandle {
    table: Table,
    stream: Option<StreamHandler>,
}

#[derive(Debug, Clone)]
pub enum BatchWriteOp {
    Put { table: String, item: Item },
    Delete { table: String, key: Item },
}

#[derive(Debug, Clone)]
pub enum TransactWriteOp {
    Put { table: String, item: Item, condition: Option<String>, ctx: ExprContext },
    Update { table: String, key: Item, update: String, condition: Option<String>, ctx: ExprContext },
    Delete { table: String, key: Item, condition: Option<String>, ctx: ExprContext },
    ConditionCheck { table: String, key: Item, condition: String, ctx: ExprContext },
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn evaluate_condition(condition: Option<&str>, existing: Option<&Item>, ctx: &ExprContext) -> Result<bool, StoreError> {
    let Some(src) = condition else { return Ok(true) };
    let expr = lc_expr::parse_filter(src)?;
    let empty = Item::new();
    let item_ref = existing.unwrap_or(&empty);
    Ok(lc_expr::eval_bool(&expr, item_ref, &ctx.as_ctx()))
}

fn check_condition(condition: Option<&str>, existing: Option<&Item>, ctx: &ExprContext) -> Result<(), StoreError> {
    if evaluate_condition(condition, existing, ctx)? {
        Ok(())
    } else {
        Err(StoreError::ConditionalCheckFailed)
    }
}

fn emit_change(handle: &TableHandle, table: &str, schema: &KeySchema, old: Option<Item>, new: Option<Item>) {
    let Some(stream) = &handle.stream else { return };
    let event_name = match (&old, &new) {
        (None, Some(_)) => StreamEventName::Insert,
        (Some(_), Some(_)) => StreamEventName::Modify,
        (Some(_), None) => StreamEventName::Remove,
        (None, None) => return,
    };
    let keys = match new.as_ref().or(old.as_ref()) {
        Some(item) => key::key_attributes(item, schema),
        None => return,
    };
    stream.emit(table, event_name, keys, old, new, now_ms());
}

/// A sort-key bound check against a query's key-condition, evaluated
/// against the candidate item's actual attribute value (spec.md §4.4.2).
fn sort_matches(
    bounds: &lc_expr::KeyConditionBounds,
    item: &Item,
    sort_key: Option<&str>,
    ctx: &lc_expr::Context,
) -> bool {
    let Some((cmp, lo, hi)) = &bounds.sort else { return true };
    let Some(sort_key) = sort_key else { return true };
    let Some(actual) = item.get(sort_key).cloned() else { return false };
    let lo_val = lc_expr::eval_operand(lo, item, ctx);
    match cmp {
        lc_expr::SortKeyCmp::Eq => lo_val.is_some_and(|v| actual.loose_eq(&v)),
        lc_expr::SortKeyCmp::Lt => lo_val.is_some_and(|v| actual.partial_cmp_loose(&v) == Some(Ordering::Less)),
        lc_expr::SortKeyCmp::Gt => lo_val.is_some_and(|v| actual.partial_cmp_loose(&v) == Some(Ordering::Greater)),
        lc_expr::SortKeyCmp::Le => {
            lo_val.is_some_and(|v| matches!(actual.partial_cmp_loose(&v), Some(Ordering::Less | Ordering::Equal)))
        }
        lc_expr::SortKeyCmp::Ge => {
            lo_val.is_some_and(|v| matches!(actual.partial_cmp_loose(&v), Some(Ordering::Greater | Ordering::Equal)))
        }
        lc_expr::SortKeyCmp::Between => {
            let hi_val = hi.as_ref().and_then(|h| lc_expr::eval_operand(h, item, ctx));
            match (lo_val, hi_val) {
                (Some(lo), Some(hi)) => {
                    matches!(actual.partial_cmp_loose(&lo), Some(Ordering::Greater | Ordering::Equal))
                        && matches!(actual.partial_cmp_loose(&hi), Some(Ordering::Less | Ordering::Equal))
                }
                _ => false,
            }
        }
        lc_expr::SortKeyCmp::BeginsWith => match (&actual, lo_val) {
            (AttributeValue::S(s), Some(AttributeValue::S(prefix))) => s.starts_with(&prefix),
            _ => false,
        },
    }
}

fn operand_to_key_part(operand: &lc_expr::Operand, ctx: &lc_expr::Context) -> Result<key::KeyPart, StoreError> {
    let empty = Item::new();
    let value = lc_expr::eval_operand(operand, &empty, ctx)
        .ok_or_else(|| StoreError::Validation("key-condition partition value is unresolvable".to_string()))?;
    key::KeyPart::from_attribute(&value)
}

/// Owns every table in one database (spec.md §6, "document-store databases
/// live at `<data>/dynamodb/<db>.db`"). One instance per emulated database.
pub struct DocumentStore {
    db_name: String,
    data_dir: Option<PathBuf>,
    tables: RwLock<IndexMap<String, Arc<TableHandle>>>,
}

impl DocumentStore {
    /// Opens (or, if `data_dir` is `None`, starts in-memory-only) the named
    /// database, replaying any on-disk snapshot. Stream handlers are not
    /// restored from disk — they are attached per-boot from the deployment
    /// model via `create_table`'s `stream` parameter.
    pub fn new(db_name: impl Into<String>, data_dir: Option<PathBuf>) -> Self {
        let db_name = db_name.into();
        let mut tables = IndexMap::new();
        if let Some(dir) = &data_dir {
            let snapshot = persistence::load(&persistence::db_path(dir, &db_name)).unwrap_or_default();
            for t in snapshot.tables {
                let table = Table::new(t.def.clone());
                for item in t.items {
                    if let Ok(primary_key) = key::extract_key(&item, &t.def.key_schema) {
                        table.put(primary_key, item);
                    }
                }
                tables.insert(t.def.name.clone(), Arc::new(TableHandle { table, stream: None }));
            }
        }
        DocumentStore { db_name, data_dir, tables: RwLock::new(tables) }
    }

    pub fn db_name(&self) -> &str {
        &self.db_name
    }

    pub fn list_tables(&self) -> Vec<String> {
        self.tables.read().keys().cloned().collect()
    }

    pub fn describe_table(&self, name: &str) -> Option<TableDef> {
        self.tables.read().get(name).map(|h| h.table.def().clone())
    }

    /// Creates a table, optionally wiring a change-stream dispatcher
    /// (spec.md §4.4.5). Fails if a table with this name already exists.
    pub fn create_table(&self, def: TableDef, stream: Option<(StreamViewType, StreamDispatcherConfig)>) -> Result<(), StoreError> {
        let mut tables = self.tables.write();
        if tables.contains_key(&def.name) {
            return Err(StoreError::TableAlreadyExists(def.name));
        }
        let stream_handler = stream.map(|(view, config)| {
            let handler = StreamHandler::new(view, config);
            handler.start();
            handler
        });
        tables.insert(def.name.clone(), Arc::new(TableHandle { table: Table::new(def), stream: stream_handler }));
        Ok(())
    }

    /// Deletes a table and stops its stream dispatcher, flushing whatever
    /// was already buffered.
    pub async fn delete_table(&self, name: &str) -> Result<(), StoreError> {
        let removed = self.tables.write().shift_remove(name);
        match removed {
            Some(handle) => {
                if let Some(stream) = &handle.stream {
                    stream.stop().await;
                }
                self.persist();
                Ok(())
            }
            None => Err(StoreError::TableNotFound(name.to_string())),
        }
    }

    /// Registers an additional change-stream batch handler on an
    /// already-created table with a stream configured.
    pub fn register_stream_handler(&self, table: &str, handler: Arc<dyn BatchHandler<StreamRecord>>) -> Result<(), StoreError> {
        let tables = self.tables.read();
        let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        match &handle.stream {
            Some(stream) => {
                stream.register(handler);
                Ok(())
            }
            None => Err(StoreError::Validation(format!("table {table:?} has no stream configured"))),
        }
    }

    /// Deletes every item in a table without dropping the table
    /// definition or its stream wiring (used by the `Provider` adapter's
    /// `clear_state`, and by test fixtures).
    pub fn clear_table(&self, name: &str) -> Result<(), StoreError> {
        let tables = self.tables.read();
        let handle = tables.get(name).ok_or_else(|| StoreError::TableNotFound(name.to_string()))?;
        for item in handle.table.scan() {
            if let Ok(primary_key) = key::extract_key(&item, &handle.table.def().key_schema) {
                handle.table.delete(&primary_key);
            }
        }
        Ok(())
    }

    pub fn put_item(&self, table: &str, item: Item, condition: Option<&str>, ctx: &ExprContext) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read();
        let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let schema = handle.table.def().key_schema.clone();
        let primary_key = key::extract_key(&item, &schema)?;
        let existing = handle.table.get(&primary_key);
        check_condition(condition, existing.as_ref(), ctx)?;
        let old = handle.table.put(primary_key, item.clone());
        emit_change(handle, table, &schema, old.clone(), Some(item));
        drop(tables);
        self.persist();
        Ok(old)
    }

    pub fn get_item(&self, table: &str, key_item: &Item) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read();
        let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let primary_key = key::extract_key(key_item, &handle.table.def().key_schema)?;
        Ok(handle.table.get(&primary_key))
    }

    pub fn delete_item(
        &self,
        table: &str,
        key_item: &Item,
        condition: Option<&str>,
        ctx: &ExprContext,
    ) -> Result<Option<Item>, StoreError> {
        let tables = self.tables.read();
        let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let schema = handle.table.def().key_schema.clone();
        let primary_key = key::extract_key(key_item, &schema)?;
        let existing = handle.table.get(&primary_key);
        check_condition(condition, existing.as_ref(), ctx)?;
        let old = handle.table.delete(&primary_key);
        emit_change(handle, table, &schema, old.clone(), None);
        drop(tables);
        self.persist();
        Ok(old)
    }

    pub fn update_item(
        &self,
        table: &str,
        key_item: &Item,
        update_src: &str,
        condition: Option<&str>,
        ctx: &ExprContext,
    ) -> Result<Item, StoreError> {
        let update = lc_expr::parse_update(update_src)?;
        let tables = self.tables.read();
        let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let schema = handle.table.def().key_schema.clone();
        let primary_key = key::extract_key(key_item, &schema)?;
        let existing = handle.table.get(&primary_key);
        check_condition(condition, existing.as_ref(), ctx)?;
        let mut next = existing.clone().unwrap_or_else(|| key_item.clone());
        lc_expr::apply_update(&mut next, &update, &ctx.as_ctx());
        handle.table.put(primary_key, next.clone());
        emit_change(handle, table, &schema, existing, Some(next.clone()));
        drop(tables);
        self.persist();
        Ok(next)
    }

    /// Runs a key-condition (and optional filter) query against a table's
    /// primary index or a named GSI (spec.md §4.4.2, §4.4.4).
    pub fn query(
        &self,
        table: &str,
        key_condition_src: &str,
        filter_src: Option<&str>,
        gsi_name: Option<&str>,
        ctx: &ExprContext,
    ) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read();
        let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let def = handle.table.def();
        let (partition_key, sort_key) = match gsi_name {
            Some(name) => {
                let gsi = def.gsi(name).ok_or_else(|| StoreError::IndexNotFound(name.to_string()))?;
                (gsi.key_schema.partition.as_str(), gsi.key_schema.sort.as_deref())
            }
            None => (def.key_schema.partition.as_str(), def.key_schema.sort.as_deref()),
        };
        let expr_ctx = ctx.as_ctx();
        let bounds = lc_expr::parse_key_condition(key_condition_src, partition_key, sort_key, &expr_ctx)?;
        let partition_part = operand_to_key_part(&bounds.partition_value, &expr_ctx)?;

        let rows = match gsi_name {
            Some(name) => handle.table.query_gsi_partition(name, &partition_part).unwrap_or_default(),
            None => handle.table.query_partition(&partition_part),
        };

        let within_bounds: Vec<Item> = rows
            .into_iter()
            .filter(|(_, item)| sort_matches(&bounds, item, sort_key, &expr_ctx))
            .map(|(_, item)| item)
            .collect();

        match filter_src {
            Some(src) => {
                let expr = lc_expr::parse_filter(src)?;
                Ok(within_bounds.into_iter().filter(|item| lc_expr::eval_bool(&expr, item, &expr_ctx)).collect())
            }
            None => Ok(within_bounds),
        }
    }

    pub fn scan(&self, table: &str, filter_src: Option<&str>, ctx: &ExprContext) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read();
        let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
        let rows = handle.table.scan();
        match filter_src {
            Some(src) => {
                let expr = lc_expr::parse_filter(src)?;
                let expr_ctx = ctx.as_ctx();
                Ok(rows.into_iter().filter(|item| lc_expr::eval_bool(&expr, item, &expr_ctx)).collect())
            }
            None => Ok(rows),
        }
    }

    /// N key lookups, returning only the items that exist (spec.md §4.4.4,
    /// `BatchGet`: "no error on misses").
    pub fn batch_get(&self, requests: &[(String, Item)]) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read();
        let mut out = Vec::with_capacity(requests.len());
        for (table, key_item) in requests {
            let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.clone()))?;
            let primary_key = key::extract_key(key_item, &handle.table.def().key_schema)?;
            if let Some(item) = handle.table.get(&primary_key) {
                out.push(item);
            }
        }
        Ok(out)
    }

    /// A mix of puts and deletes applied sequentially; no atomicity across
    /// items (spec.md §4.4.4, `BatchWrite`).
    pub fn batch_write(&self, ops: Vec<BatchWriteOp>) -> Result<(), StoreError> {
        for op in ops {
            match op {
                BatchWriteOp::Put { table, item } => {
                    self.put_item(&table, item, None, &ExprContext::default())?;
                }
                BatchWriteOp::Delete { table, key } => {
                    self.delete_item(&table, &key, None, &ExprContext::default())?;
                }
            }
        }
        Ok(())
    }

    /// N reads that all succeed or the call fails (spec.md §4.4.4,
    /// `TransactGet`).
    pub fn transact_get(&self, requests: &[(String, Item)]) -> Result<Vec<Item>, StoreError> {
        let tables = self.tables.read();
        let mut out = Vec::with_capacity(requests.len());
        for (table, key_item) in requests {
            let handle = tables.get(table).ok_or_else(|| StoreError::TableNotFound(table.clone()))?;
            let primary_key = key::extract_key(key_item, &handle.table.def().key_schema)?;
            let item = handle
                .table
                .get(&primary_key)
                .ok_or_else(|| StoreError::Validation(format!("transact-get: item not found in {table:?}")))?;
            out.push(item);
        }
        Ok(out)
    }

    /// Evaluates every op's condition against a snapshot first; if any
    /// fails, cancels with per-item reasons and applies nothing; otherwise
    /// commits all writes (spec.md §4.4.4, `TransactWrite`).
    pub fn transact_write(&self, ops: Vec<TransactWriteOp>) -> Result<(), StoreError> {
        let tables = self.tables.read();

        let mut resolved: Vec<(String, Arc<TableHandle>, KeyTuple, Option<Item>)> = Vec::with_capacity(ops.len());
        let mut reasons: Vec<Option<String>> = Vec::with_capacity(ops.len());
        let mut any_failed = false;

        for op in &ops {
            let (table, key_source, condition, ctx): (&str, &Item, Option<&str>, &ExprContext) = match op {
                TransactWriteOp::Put { table, item, condition, ctx } => (table, item, condition.as_deref(), ctx),
                TransactWriteOp::Update { table, key, condition, ctx, .. } => (table, key, condition.as_deref(), ctx),
                TransactWriteOp::Delete { table, key, condition, ctx } => (table, key, condition.as_deref(), ctx),
                TransactWriteOp::ConditionCheck { table, key, condition, ctx } => (table, key, Some(condition.as_str()), ctx),
            };
            let handle = tables.get(table).cloned().ok_or_else(|| StoreError::TableNotFound(table.to_string()))?;
            let primary_key = key::extract_key(key_source, &handle.table.def().key_schema)?;
            let existing = handle.table.get(&primary_key);
            let passed = evaluate_condition(condition, existing.as_ref(), ctx)?;
            if !passed {
                any_failed = true;
            }
            reasons.push(if passed { None } else { Some("ConditionalCheckFailed".to_string()) });
            resolved.push((table.to_string(), handle, primary_key, existing));
        }

        if any_failed {
            return Err(StoreError::TransactionCancelled(reasons));
        }

        for (op, (table, handle, primary_key, existing)) in ops.into_iter().zip(resolved.into_iter()) {
            let schema = handle.table.def().key_schema.clone();
            match op {
                TransactWriteOp::Put { item, .. } => {
                    let old = handle.table.put(primary_key, item.clone());
                    emit_change(&handle, &table, &schema, old, Some(item));
                }
                TransactWriteOp::Update { update, ctx, .. } => {
                    let parsed = lc_expr::parse_update(&update)?;
                    let mut next = existing.clone().unwrap_or_default();
                    lc_expr::apply_update(&mut next, &parsed, &ctx.as_ctx());
                    handle.table.put(primary_key, next.clone());
                    emit_change(&handle, &table, &schema, existing, Some(next));
                }
                TransactWriteOp::Delete { .. } => {
                    let old = handle.table.delete(&primary_key);
                    emit_change(&handle, &table, &schema, old, None);
                }
                TransactWriteOp::ConditionCheck { .. } => {}
            }
        }

        drop(tables);
        self.persist();
        Ok(())
    }

    /// Best-effort: failures are logged by `persistence::save` and never
    /// propagate back to a caller whose write already succeeded in memory.
    fn persist(&self) {
        let Some(dir) = &self.data_dir else { return };
        let tables = self.tables.read();
        let snapshot = DatabaseSnapshot {
            tables: tables.values().map(|h| TableSnapshot { def: h.table.def().clone(), items: h.table.scan() }).collect(),
        };
        drop(tables);
        persistence::save(&persistence::db_path(dir, &self.db_name), &snapshot);
    }
}

#[cfg(test)]
#[path = "engine_tests.rs"]
mod tests;
