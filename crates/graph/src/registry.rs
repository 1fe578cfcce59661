// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The orchestrator-owned `Registry` (spec.md §3 "Resource identifier",
//! GLOSSARY "Registry"): maps `(service, name)` to a running provider
//! instance and to optional attributes (endpoint URL, generated
//! identifier, tags). Cross-provider references (pubsub subscribing to
//! compute, workflow tasks calling compute, queue event-sources calling
//! compute) are resolved through this registry rather than held as direct
//! provider references, so provider lifecycle stays independent
//! (spec.md §9 "Design notes").
//!
//! Read-mostly: reads take a shared lock; register/deregister take an
//! exclusive one (spec.md §5, "Shared-resource policy").

use std::any::Any;
use std::collections::BTreeMap;
use std::sync::Arc;

use lc_core::ResourceId;
use parking_lot::RwLock;

use crate::error::GraphError;
use crate::provider::Provider;

#[derive(Debug, Clone, Default)]
pub struct ResourceAttributes {
    pub endpoint: Option<String>,
    pub generated_id: Option<String>,
    pub tags: BTreeMap<String, String>,
}

/// A registered provider, held as `dyn Any` alongside the `dyn Provider`
/// so callers can `downcast` to the concrete capability type (e.g.
/// `lc_providers::ObjectStoreProvider`) they actually need to invoke.
struct Entry {
    provider: Arc<dyn Provider>,
    any: Arc<dyn Any + Send + Sync>,
    attributes: ResourceAttributes,
}

#[derive(Default)]
pub struct Registry {
    entries: RwLock<BTreeMap<ResourceId, Entry>>,
}

impl Registry {
    pub fn new() -> Self {
        Registry::default()
    }

    /// Registers a provider under `id` with both its `Provider` lifecycle
    /// handle and its concrete type (for capability downcasting). Fails
    /// if `id` is already registered (spec.md §4.1, "fails if a provider
    /// with the same name already exists").
    pub fn register<P>(&self, id: ResourceId, provider: Arc<P>, attributes: ResourceAttributes) -> Result<(), GraphError>
    where
        P: Provider + 'static,
    {
        let mut entries = self.entries.write();
        if entries.contains_key(&id) {
            return Err(GraphError::DuplicateProvider(id));
        }
        entries.insert(
            id,
            Entry { provider: provider.clone() as Arc<dyn Provider>, any: provider, attributes },
        );
        Ok(())
    }

    pub fn deregister(&self, id: &ResourceId) -> Option<()> {
        self.entries.write().remove(id).map(|_| ())
    }

    pub fn provider(&self, id: &ResourceId) -> Option<Arc<dyn Provider>> {
        self.entries.read().get(id).map(|e| e.provider.clone())
    }

    /// Resolves `id` to its concrete provider type `P`, e.g. a workflow
    /// provider looking up the compute function its Task state invokes.
    pub fn resolve<P: Send + Sync + 'static>(&self, id: &ResourceId) -> Option<Arc<P>> {
        let entries = self.entries.read();
        let entry = entries.get(id)?;
        Arc::clone(&entry.any).downcast::<P>().ok()
    }

    pub fn attributes(&self, id: &ResourceId) -> Option<ResourceAttributes> {
        self.entries.read().get(id).map(|e| e.attributes.clone())
    }

    pub fn ids(&self) -> Vec<ResourceId> {
        self.entries.read().keys().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
