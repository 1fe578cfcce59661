// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-bus value types (spec.md §3 "event-bus" resource kind, §4.2
//! "event-source" edges). Grounded on
//! `examples/original_source/src/lws/providers/eventbridge/routes.py`,
//! the only surviving fragment of the original EventBridge-equivalent
//! provider — its handler signatures (`put_rule`, `put_targets`,
//! `put_events`, `Name`/`EventBusName`/`EventPattern`/`Targets` fields)
//! are reconstructed here as the provider's Rust shape, in `lc-providers`'
//! idiom rather than the original's FastAPI routing.

use serde_json::Value;

/// One routing target on a [`Rule`]: an emulated compute function,
/// mirroring every other event source in this emulator bottoming out in
/// a compute invocation (spec.md §1, "queue messages trigger compute
/// handlers").
#[derive(Debug, Clone)]
pub struct RuleTarget {
    pub id: String,
    pub function_name: String,
    /// A dotted JSONPath-subset path selecting the subtree of the
    /// matched event handed to the target, mirrored from the original's
    /// `InputPath` (spec.md §4.5.2 "Path utilities" covers the same
    /// subset elsewhere in this emulator).
    pub input_path: Option<String>,
}

/// `{name, event-bus, event-pattern?, schedule?, enabled, targets}`.
#[derive(Debug, Clone)]
pub struct Rule {
    pub name: String,
    pub bus_name: String,
    pub event_pattern: Option<Value>,
    pub schedule_expression: Option<String>,
    pub enabled: bool,
    pub targets: Vec<RuleTarget>,
}

/// One `PutEvents` entry: `{source, detail-type, detail, bus-name?}`
/// (spec.md §6, the same `{"Records": [...]}`-adjacent event shape every
/// other provider emits, here on the producer side).
#[derive(Debug, Clone)]
pub struct PutEventsEntry {
    pub source: String,
    pub detail_type: String,
    pub detail: Value,
    pub bus_name: String,
}

/// Matches an EventBridge-style content filter against an event. Only
/// exact-value and list-of-accepted-values matching is supported —
/// prefix/anything-but/numeric-range operators are not (spec.md §4.7's
/// SNS filter policy is the closest sibling dialect in this emulator and
/// is equally exact-match-only). A pattern key absent from the event
/// fails the match; extra event keys not named in the pattern are
/// ignored.
pub fn event_pattern_matches(pattern: &Value, event: &Value) -> bool {
    let Some(pattern_obj) = pattern.as_object() else {
        return false;
    };
    let Some(event_obj) = event.as_object() else {
        return false;
    };
    pattern_obj.iter().all(|(key, expected)| match event_obj.get(key) {
        Some(actual) => match expected {
            Value::Object(_) => event_pattern_matches(expected, actual),
            Value::Array(accepted) => accepted.iter().any(|v| v == actual),
            other => other == actual,
        },
        None => false,
    })
}

#[cfg(test)]
#[path = "types_tests.rs"]
mod tests;
