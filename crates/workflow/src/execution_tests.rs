use std::sync::Arc;
use std::time::Duration;

use serde_json::json;

use super::*;
use crate::interp::{ComputeBridge, TaskError};

struct Echo;

#[async_trait::async_trait]
impl ComputeBridge for Echo {
    async fn invoke(&self, _resource: &str, input: Value) -> Result<Value, TaskError> {
        Ok(input)
    }
}

struct AlwaysFails;

#[async_trait::async_trait]
impl ComputeBridge for AlwaysFails {
    async fn invoke(&self, _resource: &str, _input: Value) -> Result<Value, TaskError> {
        Err(TaskError::new("States.TaskFailed", "nope"))
    }
}

fn pass_through_definition() -> String {
    json!({
        "StartAt": "Identity",
        "States": {
            "Identity": {"Type": "Pass", "End": true},
        },
    })
    .to_string()
}

fn engine(bridge: impl ComputeBridge + 'static) -> WorkflowEngine {
    WorkflowEngine::new(Arc::new(bridge), Duration::from_secs(5))
}

#[test]
fn create_state_machine_is_idempotent_by_name() {
    let eng = engine(Echo);
    let arn1 = eng.create_state_machine("my-machine", StateMachineType::Standard, &pass_through_definition()).unwrap();
    let arn2 = eng.create_state_machine("my-machine", StateMachineType::Express, "{\"StartAt\":\"X\",\"States\":{}}").unwrap();
    assert_eq!(arn1, arn2);
    assert_eq!(eng.list_state_machines().len(), 1);
}

#[test]
fn create_state_machine_rejects_malformed_definition() {
    let eng = engine(Echo);
    let err = eng.create_state_machine("bad", StateMachineType::Standard, "not json");
    assert!(err.is_err());
}

#[test]
fn describe_state_machine_reports_not_found() {
    let eng = engine(Echo);
    let err = eng.describe_state_machine("missing").unwrap_err();
    assert!(matches!(err, WorkflowError::NotFound(_)));
}

#[test]
fn delete_state_machine_removes_it_from_the_list() {
    let eng = engine(Echo);
    eng.create_state_machine("temp", StateMachineType::Standard, &pass_through_definition()).unwrap();
    eng.delete_state_machine("temp").unwrap();
    assert!(eng.list_state_machines().is_empty());
}

#[tokio::test]
async fn start_sync_execution_blocks_until_completion_and_records_output() {
    let eng = engine(Echo);
    eng.create_state_machine("sync-machine", StateMachineType::Express, &pass_through_definition()).unwrap();
    let exec = eng.start_sync_execution("sync-machine", json!({"a": 1})).await.unwrap();
    assert_eq!(exec.status(), ExecutionStatus::Succeeded);
    assert_eq!(exec.output.read().clone(), Some(json!({"a": 1})));
    assert!(exec.end_time_ms.read().is_some());
}

#[tokio::test]
async fn start_sync_execution_records_failure() {
    let eng = engine(AlwaysFails);
    let def = json!({
        "StartAt": "Invoke",
        "States": {
            "Invoke": {"Type": "Task", "Resource": "fn", "End": true},
        },
    })
    .to_string();
    eng.create_state_machine("failing", StateMachineType::Express, &def).unwrap();
    let exec = eng.start_sync_execution("failing", json!({})).await.unwrap();
    assert_eq!(exec.status(), ExecutionStatus::Failed);
    assert_eq!(exec.error.read().clone(), Some("States.TaskFailed".to_string()));
}

#[tokio::test]
async fn start_execution_is_queryable_by_arn_once_it_completes() {
    let eng = engine(Echo);
    eng.create_state_machine("async-machine", StateMachineType::Standard, &pass_through_definition()).unwrap();
    let arn = eng.start_execution("async-machine", json!({"b": 2})).unwrap();

    for _ in 0..100 {
        if eng.describe_execution(&arn).unwrap().status() != ExecutionStatus::Running {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    let exec = eng.describe_execution(&arn).unwrap();
    assert_eq!(exec.status(), ExecutionStatus::Succeeded);
    assert_eq!(exec.output.read().clone(), Some(json!({"b": 2})));
    assert_eq!(eng.list_executions("async-machine").len(), 1);
}

#[tokio::test]
async fn stop_execution_cancels_a_running_execution() {
    struct NeverReturns;
    #[async_trait::async_trait]
    impl ComputeBridge for NeverReturns {
        async fn invoke(&self, _resource: &str, _input: Value) -> Result<Value, TaskError> {
            tokio::time::sleep(Duration::from_secs(60)).await;
            Ok(json!({}))
        }
    }
    let def = json!({
        "StartAt": "Wait",
        "States": {
            "Wait": {"Type": "Wait", "Seconds": 60, "Next": "Invoke"},
            "Invoke": {"Type": "Task", "Resource": "fn", "End": true},
        },
    })
    .to_string();
    let eng = engine(NeverReturns);
    eng.create_state_machine("stoppable", StateMachineType::Standard, &def).unwrap();
    let arn = eng.start_execution("stoppable", json!({})).unwrap();
    eng.stop_execution(&arn, Some("Manual".to_string()), Some("requested by test".to_string())).unwrap();

    for _ in 0..100 {
        if eng.describe_execution(&arn).unwrap().status() != ExecutionStatus::Running {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert_eq!(eng.describe_execution(&arn).unwrap().status(), ExecutionStatus::Aborted);
}

#[test]
fn describe_execution_reports_not_found() {
    let eng = engine(Echo);
    let err = eng.describe_execution("arn:aws:states:us-east-1:000000000000:execution:none:none").unwrap_err();
    assert!(matches!(err, WorkflowError::ExecutionNotFound(_)));
}

#[test]
fn clear_removes_all_state_machines_and_executions() {
    let eng = engine(Echo);
    eng.create_state_machine("m", StateMachineType::Standard, &pass_through_definition()).unwrap();
    eng.clear();
    assert!(eng.list_state_machines().is_empty());
}
