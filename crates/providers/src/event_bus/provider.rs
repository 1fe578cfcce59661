// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The event-bus provider (spec.md §3 resource kind "event-bus", §1
//! "cross-wiring events between emulated services"). Grounded on
//! `examples/original_source/src/lws/providers/eventbridge/routes.py`:
//! bus/rule/target CRUD plus `PutEvents`, which matches each entry
//! against every enabled rule's event pattern on that bus and fans out
//! to the rule's compute targets, fire-and-forget, the same shape as
//! [`crate::topic::TopicProvider::publish`] (spec.md §4.7) but matched
//! by structured event pattern instead of a flat attribute filter
//! policy.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lc_core::{Arn, LifecycleState};
use lc_graph::{Provider, ProviderResult as GraphResult};
use lc_wire::EventSource;
use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::compute::{records_envelope, ComputeFunctionProvider};
use crate::error::{ProviderError, ProviderResult};

use super::types::{event_pattern_matches, PutEventsEntry, Rule, RuleTarget};

pub const DEFAULT_BUS_NAME: &str = "default";

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

/// Selects a subtree of `value` along a `$`/`$.key`/`$.key.nested` path,
/// the same dotted subset the workflow engine's `InputPath` supports
/// (spec.md §4.5.2), reimplemented minimally here since `lc-workflow`
/// does not export its path module across the crate boundary. No array
/// indices: rule `InputPath` templates in the original only ever select
/// object subtrees.
fn select_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let rest = path.strip_prefix('$')?;
    let mut current = value;
    for segment in rest.split('.').filter(|s| !s.is_empty()) {
        current = current.as_object()?.get(segment)?;
    }
    Some(current)
}

/// The emulated event-bus service. One instance serves every named bus;
/// a `"default"` bus always exists, matching EventBridge's own
/// convention that `PutEvents` with no `EventBusName` targets it.
pub struct EventBusProvider {
    buses: RwLock<BTreeMap<String, Arn>>,
    rules: RwLock<BTreeMap<(String, String), Rule>>,
    compute: RwLock<Option<Arc<ComputeFunctionProvider>>>,
    state: AtomicU8,
}

impl Default for EventBusProvider {
    fn default() -> Self {
        let mut buses = BTreeMap::new();
        buses.insert(DEFAULT_BUS_NAME.to_string(), bus_arn(DEFAULT_BUS_NAME));
        EventBusProvider { buses: RwLock::new(buses), rules: RwLock::new(BTreeMap::new()), compute: RwLock::new(None), state: AtomicU8::new(STOPPED) }
    }
}

fn bus_arn(name: &str) -> Arn {
    Arn::with_resource_type("events", "event-bus", name)
}

fn rule_arn(bus_name: &str, rule_name: &str) -> Arn {
    Arn::with_resource_type("events", "rule", &format!("{bus_name}/{rule_name}"))
}

impl EventBusProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wire_compute(&self, compute: Arc<ComputeFunctionProvider>) {
        *self.compute.write() = Some(compute);
    }

    /// Idempotent, like `TopicProvider::create_topic` (spec.md §4.7's
    /// sibling idempotence law, spec.md §8).
    pub fn create_event_bus(&self, name: &str) -> String {
        let mut buses = self.buses.write();
        if let Some(arn) = buses.get(name) {
            return arn.to_string();
        }
        let arn = bus_arn(name);
        buses.insert(name.to_string(), arn.clone());
        arn.to_string()
    }

    /// Fails on the `"default"` bus and on any bus that still has rules,
    /// mirroring `ObjectStoreProvider::delete_bucket`'s non-empty check
    /// (spec.md §4.3's round-trip laws, applied here by analogy).
    pub fn delete_event_bus(&self, name: &str) -> ProviderResult<()> {
        if name == DEFAULT_BUS_NAME {
            return Err(ProviderError::Validation("the default event bus cannot be deleted".to_string()));
        }
        if self.rules.read().keys().any(|(bus, _)| bus == name) {
            return Err(ProviderError::Validation(format!("event bus {name:?} still has rules")));
        }
        self.buses.write().remove(name).map(|_| ()).ok_or_else(|| ProviderError::NoSuchEventBus(name.to_string()))
    }

    pub fn describe_event_bus(&self, name: &str) -> ProviderResult<String> {
        self.buses.read().get(name).map(|arn| arn.to_string()).ok_or_else(|| ProviderError::NoSuchEventBus(name.to_string()))
    }

    pub fn list_buses(&self) -> Vec<String> {
        self.buses.read().keys().cloned().collect()
    }

    fn require_bus(&self, bus_name: &str) -> ProviderResult<()> {
        if self.buses.read().contains_key(bus_name) {
            Ok(())
        } else {
            Err(ProviderError::NoSuchEventBus(bus_name.to_string()))
        }
    }

    /// `put_rule(name, bus, pattern?, schedule?)` → rule ARN. Creating an
    /// existing rule name on the same bus overwrites its pattern/schedule
    /// but preserves its targets, mirroring the original's upsert
    /// behaviour for `PutRule`.
    pub fn put_rule(&self, rule_name: &str, bus_name: &str, event_pattern: Option<Value>, schedule_expression: Option<String>) -> ProviderResult<String> {
        self.require_bus(bus_name)?;
        let mut rules = self.rules.write();
        let key = (bus_name.to_string(), rule_name.to_string());
        let targets = rules.get(&key).map(|r| r.targets.clone()).unwrap_or_default();
        rules.insert(
            key,
            Rule { name: rule_name.to_string(), bus_name: bus_name.to_string(), event_pattern, schedule_expression, enabled: true, targets },
        );
        Ok(rule_arn(bus_name, rule_name).to_string())
    }

    pub fn delete_rule(&self, rule_name: &str, bus_name: &str) -> ProviderResult<()> {
        self.rules
            .write()
            .remove(&(bus_name.to_string(), rule_name.to_string()))
            .map(|_| ())
            .ok_or_else(|| ProviderError::NoSuchRule(rule_name.to_string()))
    }

    pub fn describe_rule(&self, rule_name: &str, bus_name: &str) -> ProviderResult<Rule> {
        self.rules.read().get(&(bus_name.to_string(), rule_name.to_string())).cloned().ok_or_else(|| ProviderError::NoSuchRule(rule_name.to_string()))
    }

    pub fn list_rules(&self, bus_name: &str) -> Vec<Rule> {
        self.rules.read().values().filter(|r| r.bus_name == bus_name).cloned().collect()
    }

    pub fn enable_rule(&self, rule_name: &str, bus_name: &str) -> ProviderResult<()> {
        self.set_rule_enabled(rule_name, bus_name, true)
    }

    pub fn disable_rule(&self, rule_name: &str, bus_name: &str) -> ProviderResult<()> {
        self.set_rule_enabled(rule_name, bus_name, false)
    }

    fn set_rule_enabled(&self, rule_name: &str, bus_name: &str, enabled: bool) -> ProviderResult<()> {
        let mut rules = self.rules.write();
        let rule = rules.get_mut(&(bus_name.to_string(), rule_name.to_string())).ok_or_else(|| ProviderError::NoSuchRule(rule_name.to_string()))?;
        rule.enabled = enabled;
        Ok(())
    }

    /// `put_targets(rule, bus, targets)`. Re-adding a target id on the
    /// same rule replaces it, matching the original's upsert-by-id
    /// semantics for `PutTargets`.
    pub fn put_targets(&self, rule_name: &str, bus_name: &str, targets: Vec<RuleTarget>) -> ProviderResult<()> {
        let mut rules = self.rules.write();
        let rule = rules.get_mut(&(bus_name.to_string(), rule_name.to_string())).ok_or_else(|| ProviderError::NoSuchRule(rule_name.to_string()))?;
        for target in targets {
            rule.targets.retain(|t| t.id != target.id);
            rule.targets.push(target);
        }
        Ok(())
    }

    pub fn remove_targets(&self, rule_name: &str, bus_name: &str, target_ids: &[String]) -> ProviderResult<()> {
        let mut rules = self.rules.write();
        let rule = rules.get_mut(&(bus_name.to_string(), rule_name.to_string())).ok_or_else(|| ProviderError::NoSuchRule(rule_name.to_string()))?;
        rule.targets.retain(|t| !target_ids.iter().any(|id| id == &t.id));
        Ok(())
    }

    pub fn list_targets_by_rule(&self, rule_name: &str, bus_name: &str) -> ProviderResult<Vec<RuleTarget>> {
        Ok(self.describe_rule(rule_name, bus_name)?.targets)
    }

    /// `put_events(entries)` (spec.md §1, "cross-wiring"): each entry is
    /// matched against every enabled rule on its bus whose pattern
    /// matches (a rule with no pattern matches everything, like an
    /// unconditional EventBridge rule), and dispatched to that rule's
    /// compute targets as independent detached tasks — fire-and-forget,
    /// the same delivery model as `TopicProvider::publish` (spec.md
    /// §4.7).
    pub fn put_events(&self, entries: Vec<PutEventsEntry>) -> Vec<String> {
        let mut event_ids = Vec::with_capacity(entries.len());
        for entry in entries {
            let event_id = uuid::Uuid::new_v4().to_string();
            event_ids.push(event_id.clone());
            let event_body = json!({
                "id": event_id,
                "source": entry.source,
                "detail-type": entry.detail_type,
                "detail": entry.detail,
            });

            let matching: Vec<RuleTarget> = {
                let rules = self.rules.read();
                rules
                    .values()
                    .filter(|r| r.bus_name == entry.bus_name && r.enabled)
                    .filter(|r| r.event_pattern.as_ref().is_none_or(|pattern| event_pattern_matches(pattern, &event_body)))
                    .flat_map(|r| r.targets.clone())
                    .collect()
            };

            for target in matching {
                let Some(compute) = self.compute.read().clone() else {
                    tracing::warn!(function = %target.function_name, "no compute provider wired for event bus target");
                    continue;
                };
                let payload = match &target.input_path {
                    Some(path) => select_path(&event_body, path).cloned().unwrap_or(Value::Null),
                    None => event_body.clone(),
                };
                tokio::spawn(async move {
                    let envelope = records_envelope(EventSource::EventBus, payload);
                    if let Err(err) = compute.invoke(&target.function_name, envelope).await {
                        tracing::warn!(function = %target.function_name, error = %err, "event-bus target invocation failed");
                    }
                });
            }
        }
        event_ids
    }
}

#[async_trait]
impl Provider for EventBusProvider {
    fn name(&self) -> &str {
        "event_bus"
    }

    fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => LifecycleState::Running,
            _ => LifecycleState::Stopped,
        }
    }

    async fn start(&self) -> GraphResult<()> {
        self.state.store(RUNNING, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> GraphResult<()> {
        self.state.store(STOPPED, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_state(&self) -> GraphResult<()> {
        self.rules.write().clear();
        let mut buses = self.buses.write();
        buses.clear();
        buses.insert(DEFAULT_BUS_NAME.to_string(), bus_arn(DEFAULT_BUS_NAME));
        Ok(())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
