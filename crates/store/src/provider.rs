// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Adapts one table of a [`DocumentStore`] to the orchestrator's
//! `Provider` lifecycle contract (spec.md §3 "doc_table" resource kind),
//! so the dependency graph can start, stop, health-check, and reset it
//! alongside every other provider. The table itself is created ahead of
//! time from the deployment model; this adapter only tracks lifecycle
//! state and forwards `clear_state` to the underlying store.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lc_core::LifecycleState;
use lc_graph::{Provider, ProviderResult};

use crate::engine::DocumentStore;

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

pub struct DocumentTableProvider {
    store: Arc<DocumentStore>,
    table_name: String,
    state: AtomicU8,
}

impl DocumentTableProvider {
    pub fn new(store: Arc<DocumentStore>, table_name: impl Into<String>) -> Self {
        DocumentTableProvider { store, table_name: table_name.into(), state: AtomicU8::new(STOPPED) }
    }

    pub fn store(&self) -> &Arc<DocumentStore> {
        &self.store
    }

    pub fn table_name(&self) -> &str {
        &self.table_name
    }
}

#[async_trait]
impl Provider for DocumentTableProvider {
    fn name(&self) -> &str {
        &self.table_name
    }

    fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => LifecycleState::Running,
            _ => LifecycleState::Stopped,
        }
    }

    async fn start(&self) -> ProviderResult<()> {
        if self.store.describe_table(&self.table_name).is_none() {
            return Err(format!("table {:?} was not created before its provider started", self.table_name).into());
        }
        self.state.store(RUNNING, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> ProviderResult<()> {
        self.state.store(STOPPED, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_state(&self) -> ProviderResult<()> {
        self.store.clear_table(&self.table_name).map_err(|e| Box::new(e) as _)
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
