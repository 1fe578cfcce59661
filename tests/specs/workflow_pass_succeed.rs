//! spec.md §8 scenario 4: Pass -> Succeed.

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

#[tokio::test]
async fn pass_then_succeed_yields_the_pass_result() {
    let engine = WorkflowEngine::new(Arc::new(UnusedBridge), Duration::from_secs(5));
    engine
        .create_state_machine(
            "greet",
            StateMachineType::Express,
            r#"{"StartAt":"P","States":{"P":{"Type":"Pass","Result":{"ok":true},"Next":"S"},"S":{"Type":"Succeed"}}}"#,
        )
        .unwrap();

    let execution = engine.start_sync_execution("greet", json!({})).await.unwrap();

    assert_eq!(execution.status(), ExecutionStatus::Succeeded);
    assert_eq!(execution.output.read().clone(), Some(json!({"ok": true})));
}
