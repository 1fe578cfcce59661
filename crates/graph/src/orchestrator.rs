// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Orchestrator` (spec.md §4.1): owns the registry, starts providers
//! in topological order, stops them in reverse, propagates health, and
//! exposes `reset()` for test fixtures. The start/stop sequencing follows
//! a daemon lifecycle's start/stop ordering, generalized from one fixed
//! subsystem list to an arbitrary dependency-ordered set of providers.

use std::sync::Arc;

use lc_core::ResourceId;
use tracing::{error, info, warn};

use crate::error::GraphError;
use crate::graph::DependencyGraph;
use crate::provider::Provider;
use crate::registry::{Registry, ResourceAttributes};

#[derive(Debug, Clone, Default)]
pub struct HealthReport {
    pub healthy: Vec<ResourceId>,
    pub unhealthy: Vec<ResourceId>,
}

impl HealthReport {
    pub fn is_fully_healthy(&self) -> bool {
        self.unhealthy.is_empty()
    }
}

/// Owns the [`Registry`] and the [`DependencyGraph`] that determines
/// startup/shutdown order. One instance per running emulator process.
pub struct Orchestrator {
    graph: DependencyGraph,
    registry: Registry,
    /// Ids started successfully so far this run, in start order — used by
    /// `start_all`'s fail-fast rollback and by `stop_all`'s reverse order.
    started: parking_lot::Mutex<Vec<ResourceId>>,
}

impl Orchestrator {
    pub fn new(graph: DependencyGraph) -> Self {
        Orchestrator { graph, registry: Registry::new(), started: parking_lot::Mutex::new(Vec::new()) }
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn graph(&self) -> &DependencyGraph {
        &self.graph
    }

    /// Adds a provider to the set (spec.md §4.1). Fails if `id` is
    /// already registered.
    pub fn register<P>(&self, id: ResourceId, provider: Arc<P>, attributes: ResourceAttributes) -> Result<(), GraphError>
    where
        P: Provider + 'static,
    {
        self.registry.register(id, provider, attributes)
    }

    /// Starts every registered provider in topological order, then runs
    /// each provider's post-wire hook once all are running (spec.md
    /// §4.1). Fails fast: on any start failure, stops everything started
    /// so far in reverse order and returns the error.
    pub async fn start_all(&self) -> Result<(), GraphError> {
        let order = self.graph.topological_sort();
        for id in order {
            let Some(provider) = self.registry.provider(&id) else {
                // A graph node with no registered provider yet (e.g. a
                // route-set node that has no lifecycle of its own) is
                // simply skipped.
                continue;
            };
            info!(resource = %id, "starting provider");
            match provider.start().await {
                Ok(()) => {
                    self.started.lock().push(id);
                }
                Err(cause) => {
                    error!(resource = %id, error = %cause, "provider failed to start, rolling back");
                    self.stop_started_so_far().await;
                    return Err(GraphError::StartupFailed { provider: id, cause: cause.to_string() });
                }
            }
        }

        let started = self.started.lock().clone();
        for id in &started {
            if let Some(provider) = self.registry.provider(id) {
                if let Err(cause) = provider.post_wire(&self.registry).await {
                    error!(resource = %id, error = %cause, "provider post-wire hook failed, rolling back");
                    self.stop_started_so_far().await;
                    return Err(GraphError::StartupFailed { provider: id.clone(), cause: cause.to_string() });
                }
            }
        }
        Ok(())
    }

    async fn stop_started_so_far(&self) {
        let started = std::mem::take(&mut *self.started.lock());
        for id in started.into_iter().rev() {
            if let Some(provider) = self.registry.provider(&id) {
                if let Err(e) = provider.stop().await {
                    warn!(resource = %id, error = %e, "error stopping provider during rollback");
                }
            }
        }
    }

    /// Stops providers in reverse start order. Errors are logged and
    /// never prevent subsequent stops (spec.md §4.1).
    pub async fn stop_all(&self) {
        let started = std::mem::take(&mut *self.started.lock());
        for id in started.into_iter().rev() {
            if let Some(provider) = self.registry.provider(&id) {
                info!(resource = %id, "stopping provider");
                if let Err(e) = provider.stop().await {
                    warn!(resource = %id, error = %e, "error stopping provider");
                }
            }
        }
    }

    /// Calls every provider's health predicate (spec.md §4.1). Individual
    /// failures are surfaced in the report but non-fatal.
    pub async fn health_report(&self) -> HealthReport {
        let mut report = HealthReport::default();
        for id in self.registry.ids() {
            if let Some(provider) = self.registry.provider(&id) {
                if provider.health().await {
                    report.healthy.push(id);
                } else {
                    report.unhealthy.push(id);
                }
            }
        }
        report
    }

    /// Invokes `clear_state` on every provider that has clearable state.
    /// Never used in normal lifecycle (spec.md §4.1) — test fixtures and
    /// a management `/reset` endpoint are its only callers.
    pub async fn reset(&self) {
        for id in self.registry.ids() {
            if let Some(provider) = self.registry.provider(&id) {
                if let Err(e) = provider.clear_state().await {
                    warn!(resource = %id, error = %e, "error clearing provider state during reset");
                }
            }
        }
    }

    #[cfg(any(test, feature = "test-support"))]
    pub fn started_order(&self) -> Vec<ResourceId> {
        self.started.lock().clone()
    }
}

#[cfg(test)]
#[path = "orchestrator_tests.rs"]
mod tests;
