// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The dependency graph (spec.md §3 "Dependency graph", §4.2): nodes are
//! resources, edges are inferred relationships. Kahn's algorithm drives
//! topological order for startup; tri-colour DFS finds cycles. Grounded on
//! `examples/original_source/src/lws/graph/builder.py`'s `AppGraph`, kept
//! in the same shape (adjacency built fresh per query rather than
//! incrementally maintained, since graphs here are small and rebuilt once
//! at boot).

use std::collections::{BTreeMap, BTreeSet, VecDeque};

use indexmap::IndexMap;
use lc_core::{ResourceId, ResourceKind};
use serde_json::Value;

use crate::model::DeploymentModel;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EdgeKind {
    Trigger,
    DataDependency,
    Permission,
    EventSource,
}

#[derive(Debug, Clone)]
pub struct Node {
    pub id: ResourceId,
    pub config: BTreeMap<String, Value>,
}

#[derive(Debug, Clone)]
pub struct Edge {
    pub source: ResourceId,
    pub target: ResourceId,
    pub kind: EdgeKind,
    pub metadata: BTreeMap<String, Value>,
}

/// Directed graph of resources and their relationships (spec.md §3). Node
/// order is insertion order (`IndexMap`) so that `topological_sort`'s
/// tie-break "by node id" is deterministic without needing a secondary
/// sort key — ids happen to be unique strings, but callers should not
/// rely on insertion order for anything besides tie-breaking readability.
#[derive(Debug, Clone, Default)]
pub struct DependencyGraph {
    nodes: IndexMap<ResourceId, Node>,
    edges: Vec<Edge>,
}

impl DependencyGraph {
    pub fn new() -> Self {
        DependencyGraph::default()
    }

    pub fn add_node(&mut self, node: Node) {
        self.nodes.insert(node.id.clone(), node);
    }

    /// Adds a directed edge. Per spec.md §3 invariants, self-loops are
    /// rejected and both endpoints must already exist; callers that built
    /// the model by best-effort name-matching should check
    /// `contains(id)` first if they want to silently drop an unmatched
    /// reference rather than get an error back.
    pub fn add_edge(&mut self, edge: Edge) -> Result<(), crate::GraphError> {
        if edge.source == edge.target {
            return Err(crate::GraphError::DanglingEdge(format!("self-loop on {}", edge.source)));
        }
        if !self.nodes.contains_key(&edge.source) {
            return Err(crate::GraphError::DanglingEdge(edge.source.to_string()));
        }
        if !self.nodes.contains_key(&edge.target) {
            return Err(crate::GraphError::DanglingEdge(edge.target.to_string()));
        }
        self.edges.push(edge);
        Ok(())
    }

    pub fn contains(&self, id: &ResourceId) -> bool {
        self.nodes.contains_key(id)
    }

    pub fn node(&self, id: &ResourceId) -> Option<&Node> {
        self.nodes.get(id)
    }

    pub fn nodes(&self) -> impl Iterator<Item = &Node> {
        self.nodes.values()
    }

    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    /// Resources `id` depends on: the targets of its outgoing
    /// `data-dependency` edges (spec.md §4.2).
    pub fn dependencies_of(&self, id: &ResourceId) -> Vec<ResourceId> {
        self.edges
            .iter()
            .filter(|e| &e.source == id && e.kind == EdgeKind::DataDependency)
            .map(|e| e.target.clone())
            .collect()
    }

    /// Resources that depend on `id`: sources of incoming
    /// `data-dependency` edges.
    pub fn dependents_of(&self, id: &ResourceId) -> Vec<ResourceId> {
        self.edges
            .iter()
            .filter(|e| &e.target == id && e.kind == EdgeKind::DataDependency)
            .map(|e| e.source.clone())
            .collect()
    }

    /// Kahn's algorithm over `data-dependency` edges only: a node's
    /// dependencies must precede it, so in-degree counts *incoming*
    /// dependency edges reversed — concretely, for edge `u -> v`
    /// ("u depends on v"), v must come before u, so we count each such
    /// edge against `u`'s in-degree in the reversed sense used below.
    ///
    /// Contract (spec.md §8): for a DAG, every node id appears exactly
    /// once and `index(v) < index(u)` for every `data-dependency` edge
    /// `u -> v`. For a cyclic graph, returns a (possibly empty) prefix —
    /// the acyclic portion — rather than erroring.
    pub fn topological_sort(&self) -> Vec<ResourceId> {
        let mut in_degree: BTreeMap<ResourceId, usize> =
            self.nodes.keys().map(|id| (id.clone(), 0)).collect();
        let mut dependents: BTreeMap<ResourceId, Vec<ResourceId>> =
            self.nodes.keys().map(|id| (id.clone(), Vec::new())).collect();

        for edge in &self.edges {
            if edge.kind != EdgeKind::DataDependency {
                continue;
            }
            // edge.source depends on edge.target: target must be emitted
            // first, so source's in-degree counts this dependency.
            if let Some(deg) = in_degree.get_mut(&edge.source) {
                *deg += 1;
            }
            dependents.entry(edge.target.clone()).or_default().push(edge.source.clone());
        }

        let mut ready: VecDeque<ResourceId> =
            in_degree.iter().filter(|(_, deg)| **deg == 0).map(|(id, _)| id.clone()).collect();
        ready.make_contiguous().sort();

        let mut order = Vec::with_capacity(self.nodes.len());
        while let Some(id) = ready.pop_front() {
            order.push(id.clone());
            if let Some(deps) = dependents.get(&id) {
                let mut newly_ready = Vec::new();
                for dependent in deps {
                    if let Some(deg) = in_degree.get_mut(dependent) {
                        *deg -= 1;
                        if *deg == 0 {
                            newly_ready.push(dependent.clone());
                        }
                    }
                }
                newly_ready.sort();
                for id in newly_ready {
                    let pos = ready.partition_point(|existing| existing < &id);
                    ready.insert(pos, id);
                }
            }
        }
        order
    }

    /// Tri-colour DFS cycle detection over `data-dependency` edges
    /// (spec.md §4.2). Returns every elementary cycle found as the slice
    /// of the DFS stack from the back-edge's target to the current node.
    pub fn detect_cycles(&self) -> Vec<Vec<ResourceId>> {
        #[derive(Clone, Copy, PartialEq, Eq)]
        enum Color {
            White,
            Gray,
            Black,
        }

        let mut adjacency: BTreeMap<ResourceId, Vec<ResourceId>> =
            self.nodes.keys().map(|id| (id.clone(), Vec::new())).collect();
        for edge in &self.edges {
            if edge.kind == EdgeKind::DataDependency {
                adjacency.entry(edge.source.clone()).or_default().push(edge.target.clone());
            }
        }

        let mut color: BTreeMap<ResourceId, Color> =
            self.nodes.keys().map(|id| (id.clone(), Color::White)).collect();
        let mut path: Vec<ResourceId> = Vec::new();
        let mut cycles: Vec<Vec<ResourceId>> = Vec::new();

        fn dfs(
            node: &ResourceId,
            adjacency: &BTreeMap<ResourceId, Vec<ResourceId>>,
            color: &mut BTreeMap<ResourceId, Color>,
            path: &mut Vec<ResourceId>,
            cycles: &mut Vec<Vec<ResourceId>>,
        ) {
            color.insert(node.clone(), Color::Gray);
            path.push(node.clone());

            if let Some(neighbours) = adjacency.get(node) {
                for neighbour in neighbours {
                    match color.get(neighbour) {
                        Some(Color::Gray) => {
                            let start = path.iter().position(|n| n == neighbour).unwrap_or(0);
                            let mut cycle = path[start..].to_vec();
                            cycle.push(neighbour.clone());
                            cycles.push(cycle);
                        }
                        Some(Color::White) => dfs(neighbour, adjacency, color, path, cycles),
                        _ => {}
                    }
                }
            }

            path.pop();
            color.insert(node.clone(), Color::Black);
        }

        let ids: Vec<ResourceId> = self.nodes.keys().cloned().collect();
        for id in &ids {
            if color.get(id) == Some(&Color::White) {
                dfs(id, &adjacency, &mut color, &mut path, &mut cycles);
            }
        }
        cycles
    }

    /// Builds a graph from a parsed deployment model (spec.md §4.2).
    /// Inference rules are best-effort name-matching: a function's
    /// environment variable whose value matches a table's name becomes a
    /// data-dependency edge; a route whose handler name matches a
    /// function becomes a trigger edge; a queue with an event-source
    /// target becomes an event-source edge. Unmatched references are
    /// silently dropped — an external validator reports those, not this
    /// builder (spec.md §4.2).
    pub fn build(model: &DeploymentModel) -> Self {
        let mut graph = DependencyGraph::new();

        for table in &model.tables {
            graph.add_node(Node {
                id: ResourceId::new(ResourceKind::DocumentTable, table.table_name.clone()),
                config: BTreeMap::new(),
            });
        }
        for queue in &model.queues {
            graph.add_node(Node {
                id: ResourceId::new(ResourceKind::Queue, queue.name.clone()),
                config: BTreeMap::new(),
            });
        }
        for resource in &model.resources {
            graph.add_node(Node {
                id: ResourceId::new(resource.kind, resource.name.clone()),
                config: resource.config.clone(),
            });
        }
        for func in &model.functions {
            let mut config = BTreeMap::new();
            config.insert(
                "environment".to_string(),
                Value::Object(func.environment.iter().map(|(k, v)| (k.clone(), Value::String(v.clone()))).collect()),
            );
            graph.add_node(Node { id: ResourceId::new(ResourceKind::ComputeFunction, func.logical_id.clone()), config });
        }
        for route_set_id in model.routes.iter().map(|r| r.route_set_id.clone()).collect::<BTreeSet<_>>() {
            graph.add_node(Node { id: ResourceId::new(ResourceKind::HttpRouteSet, route_set_id), config: BTreeMap::new() });
        }

        // Function env-var -> table name: data-dependency.
        for func in &model.functions {
            let fn_id = ResourceId::new(ResourceKind::ComputeFunction, func.logical_id.clone());
            for (env_key, env_value) in &func.environment {
                let table_id = ResourceId::new(ResourceKind::DocumentTable, env_value.clone());
                if graph.contains(&table_id) {
                    let mut metadata = BTreeMap::new();
                    metadata.insert("env_var".to_string(), Value::String(env_key.clone()));
                    let _ = graph.add_edge(Edge { source: fn_id.clone(), target: table_id, kind: EdgeKind::DataDependency, metadata });
                }
            }
        }

        // Route -> handler: trigger.
        for route in &model.routes {
            let route_set_id = ResourceId::new(ResourceKind::HttpRouteSet, route.route_set_id.clone());
            let fn_id = ResourceId::new(ResourceKind::ComputeFunction, route.handler_name.clone());
            if graph.contains(&fn_id) {
                let mut metadata = BTreeMap::new();
                metadata.insert("method".to_string(), Value::String(route.method.clone()));
                metadata.insert("path".to_string(), Value::String(route.path.clone()));
                let _ = graph.add_edge(Edge { source: route_set_id, target: fn_id, kind: EdgeKind::Trigger, metadata });
            }
        }

        // Queue event-source-mapping -> target: event-source.
        for queue in &model.queues {
            let Some(target) = &queue.event_source_target else { continue };
            let queue_id = ResourceId::new(ResourceKind::Queue, queue.name.clone());
            let fn_id = ResourceId::new(ResourceKind::ComputeFunction, target.clone());
            if graph.contains(&fn_id) {
                let _ = graph.add_edge(Edge {
                    source: queue_id,
                    target: fn_id,
                    kind: EdgeKind::EventSource,
                    metadata: BTreeMap::new(),
                });
            }
        }

        graph
    }
}

#[cfg(test)]
#[path = "graph_tests.rs"]
mod tests;
