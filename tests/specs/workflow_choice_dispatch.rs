//! spec.md §8 scenario 5: Choice dispatch on `$.x NumericGreaterThan 10`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use lc_workflow::{ComputeBridge, ExecutionStatus, StateMachineType, TaskError, WorkflowEngine};

struct UnusedBridge;

#[async_trait]
impl ComputeBridge for UnusedBridge {
    async fn invoke(&self, resource: &str, _input: Value) -> Result<Value, TaskError> {
        Err(TaskError::generic(format!("no Task state should call compute, got {resource}")))
    }
}

const DEFINITION: &str = r#"{
    "StartAt": "C",
    "States": {
        "C": {
            "Type": "Choice",
            "Choices": [
                {"Variable": "$.x", "NumericGreaterThan": 10, "Next": "Big"}
            ],
            "Default": "Small"
        },
        "Big": {"Type": "Pass", "Result": {"branch": "big"}, "End": true},
        "Small": {"Type": "Pass", "Result": {"branch": "small"}, "End": true}
    }
}"#;

#[tokio::test]
async fn input_above_threshold_visits_big() {
    let engine = WorkflowEngine::new(Arc::new(UnusedBridge), Duration::from_secs(5));
    engine.create_state_machine("threshold", StateMachineType::Express, DEFINITION).unwrap();

    let execution = engine.start_sync_execution("threshold", json!({"x": 15})).await.unwrap();

    assert_eq!(execution.status(), ExecutionStatus::Succeeded);
    assert_eq!(execution.output.read().clone(), Some(json!({"branch": "big"})));
}

#[tokio::test]
async fn input_below_threshold_visits_small_via_default() {
    let engine = WorkflowEngine::new(Arc::new(UnusedBridge), Duration::from_secs(5));
    engine.create_state_machine("threshold2", StateMachineType::Express, DEFINITION).unwrap();

    let execution = engine.start_sync_execution("threshold2", json!({"x": 5})).await.unwrap();

    assert_eq!(execution.status(), ExecutionStatus::Succeeded);
    assert_eq!(execution.output.read().clone(), Some(json!({"branch": "small"})));
}
