// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Resource addressing and lifecycle state shared by the dependency graph
//! and every provider it manages.

use serde::{Deserialize, Serialize};
use std::fmt;

/// The nine service kinds a provider in this emulator can implement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    #[serde(rename = "compute_fn")]
    ComputeFunction,
    #[serde(rename = "doc_table")]
    DocumentTable,
    #[serde(rename = "http_route_set")]
    HttpRouteSet,
    Queue,
    #[serde(rename = "object_bucket")]
    ObjectBucket,
    #[serde(rename = "pubsub_topic")]
    PubsubTopic,
    #[serde(rename = "event_bus")]
    EventBus,
    Workflow,
    #[serde(rename = "container_service")]
    ContainerService,
}

crate::simple_display! {
    ResourceKind {
        ComputeFunction => "compute_fn",
        DocumentTable => "doc_table",
        HttpRouteSet => "http_route_set",
        Queue => "queue",
        ObjectBucket => "object_bucket",
        PubsubTopic => "pubsub_topic",
        EventBus => "event_bus",
        Workflow => "workflow",
        ContainerService => "container_service",
    }
}

/// A fully-qualified address for a managed resource: its kind, plus the
/// name the orchestrator's dependency graph and every provider agree to
/// call it by.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResourceId {
    pub kind: ResourceKind,
    pub name: String,
}

impl ResourceId {
    pub fn new(kind: ResourceKind, name: impl Into<String>) -> Self {
        ResourceId { kind, name: name.into() }
    }
}

impl fmt::Display for ResourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.kind, self.name)
    }
}

/// Lifecycle state reported by a provider's health check and tracked by
/// the orchestrator's registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LifecycleState {
    Stopped,
    Starting,
    Running,
    Error,
}

crate::simple_display! {
    LifecycleState {
        Stopped => "stopped",
        Starting => "starting",
        Running => "running",
        Error => "error",
    }
}

impl LifecycleState {
    /// Whether this state accepts traffic. Only `Running` does; a
    /// provider stuck `Starting` or `Error` must reject requests rather
    /// than serve against half-initialized state.
    pub fn is_serviceable(self) -> bool {
        matches!(self, LifecycleState::Running)
    }
}

#[cfg(test)]
#[path = "resource_tests.rs"]
mod tests;
