// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The parsed deployment model `DependencyGraph::build` consumes
//! (spec.md §4.2: "ingest a parsed deployment model (whose schema is
//! external)"). The model's *source* — a config file, a cloud-assembly
//! manifest, whatever an external loader produces — is out of scope; this
//! is only the shape the graph builder needs to see.

use serde_json::Value;
use std::collections::BTreeMap;

/// One Lambda-equivalent compute function: its logical name and the
/// environment variables the graph builder inspects for data-dependency
/// inference (spec.md §4.2, "a compute env-var referencing a table name
/// ⇒ data-dependency").
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ModelFunction {
    pub logical_id: String,
    pub environment: BTreeMap<String, String>,
}

/// One document-store table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelTable {
    pub logical_id: String,
    pub table_name: String,
}

/// One HTTP route-set entry: a route pointing at a handler by name
/// (spec.md §4.2, "a route targeting a handler ⇒ trigger").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelRoute {
    pub route_set_id: String,
    pub handler_name: String,
    pub method: String,
    pub path: String,
}

/// One queue, optionally wired to a compute handler via an
/// event-source-mapping (spec.md §4.2, "queue/stream referenced by
/// event-source-mapping ⇒ event-source").
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelQueue {
    pub name: String,
    pub event_source_target: Option<String>,
}

/// A catch-all for the remaining resource kinds (buckets, topics, event
/// buses, workflows, container services) that only need a node, with no
/// inference rules of their own yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModelResource {
    pub kind: lc_core::ResourceKind,
    pub name: String,
    pub config: BTreeMap<String, Value>,
}

/// The external deployment model, already parsed into the shapes the
/// graph builder's inference rules understand. An external loader (a
/// config-file parser, a cloud-assembly reader) is responsible for
/// producing this; `lc-graph` never reads a file itself.
#[derive(Debug, Clone, Default)]
pub struct DeploymentModel {
    pub functions: Vec<ModelFunction>,
    pub tables: Vec<ModelTable>,
    pub routes: Vec<ModelRoute>,
    pub queues: Vec<ModelQueue>,
    pub resources: Vec<ModelResource>,
}
