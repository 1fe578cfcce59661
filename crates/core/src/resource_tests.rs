// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn resource_id_display_combines_kind_and_name() {
    let id = ResourceId::new(ResourceKind::DocumentTable, "orders");
    assert_eq!(id.to_string(), "doc_table:orders");
}

#[test]
fn resource_kind_display_matches_serde_rename() {
    assert_eq!(ResourceKind::ObjectBucket.to_string(), "object_bucket");
    let json = serde_json::to_string(&ResourceKind::ObjectBucket).unwrap();
    assert_eq!(json, "\"object_bucket\"");
}

#[test]
fn lifecycle_state_only_running_is_serviceable() {
    assert!(LifecycleState::Running.is_serviceable());
    assert!(!LifecycleState::Starting.is_serviceable());
    assert!(!LifecycleState::Stopped.is_serviceable());
    assert!(!LifecycleState::Error.is_serviceable());
}

#[test]
fn lifecycle_state_serde_uses_snake_case() {
    let json = serde_json::to_string(&LifecycleState::Starting).unwrap();
    assert_eq!(json, "\"starting\"");
}

#[test]
fn resource_id_equality_is_structural() {
    let a = ResourceId::new(ResourceKind::Queue, "jobs");
    let b = ResourceId::new(ResourceKind::Queue, "jobs");
    assert_eq!(a, b);
}
