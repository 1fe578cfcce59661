use super::*;

#[test]
fn execution_id_carries_its_prefix() {
    let id = ExecutionId::new();
    assert!(id.as_str().starts_with("exec"));
}

#[test]
fn subscription_id_round_trips_from_string() {
    let id = SubscriptionId::from_string("subsabc123");
    assert_eq!(id.as_str(), "subsabc123");
}

#[test]
fn event_source_mapping_id_carries_its_prefix() {
    let id = EventSourceMappingId::new();
    assert!(id.as_str().starts_with("esm-"));
}

#[test]
fn distinct_id_types_are_not_interchangeable_values() {
    let exec = ExecutionId::new();
    let sub = SubscriptionId::from_string(exec.as_str());
    // Same underlying bytes, but a different type — this just asserts
    // the conversion path works without panicking.
    assert_eq!(sub.as_str(), exec.as_str());
}
