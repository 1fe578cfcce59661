// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Best-effort on-disk persistence for one database: a single JSON file at
//! `<data_dir>/dynamodb/<db>.db` (spec.md §6) holding every table's
//! definition and item set. Writes go to a temp file in the same directory
//! and are renamed into place, so a crash mid-write never corrupts the
//! previous snapshot (spec.md §4.4, "Non-goals": no WAL or durability
//! beyond this), simplified from a snapshot/WAL split to a single
//! whole-database snapshot since this engine makes no durability
//! guarantee beyond "best effort".

use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::StoreError;
use crate::types::TableDef;
use crate::Item;

#[derive(Debug, Serialize, Deserialize)]
pub struct TableSnapshot {
    pub def: TableDef,
    pub items: Vec<Item>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
pub struct DatabaseSnapshot {
    pub tables: Vec<TableSnapshot>,
}

pub fn db_path(data_dir: &Path, db_name: &str) -> PathBuf {
    data_dir.join("dynamodb").join(format!("{db_name}.db"))
}

/// Loads a database snapshot from disk. A missing file is an empty
/// database, not an error — the first run of a fresh data directory.
pub fn load(path: &Path) -> Result<DatabaseSnapshot, StoreError> {
    match fs::read(path) {
        Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| StoreError::Validation(format!("corrupt snapshot at {path:?}: {e}"))),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(DatabaseSnapshot::default()),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read database snapshot, starting empty");
            Ok(DatabaseSnapshot::default())
        }
    }
}

/// Writes `snapshot` to `path` via a temp-file-then-rename, creating parent
/// directories as needed. Failures are logged and swallowed: persistence
/// is best-effort and must never fail a write request that already
/// succeeded in memory.
pub fn save(path: &Path, snapshot: &DatabaseSnapshot) {
    if let Err(e) = save_inner(path, snapshot) {
        warn!(path = %path.display(), error = %e, "failed to persist database snapshot");
    }
}

fn save_inner(path: &Path, snapshot: &DatabaseSnapshot) -> std::io::Result<()> {
    let Some(parent) = path.parent() else { return Ok(()) };
    fs::create_dir_all(parent)?;
    let tmp_path = parent.join(format!(".{}.tmp", path.file_name().and_then(|n| n.to_str()).unwrap_or("snapshot")));
    let bytes = serde_json::to_vec_pretty(snapshot)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::InvalidData, e))?;
    fs::write(&tmp_path, bytes)?;
    fs::rename(&tmp_path, path)?;
    Ok(())
}

#[cfg(test)]
#[path = "persistence_tests.rs"]
mod tests;
