// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow engine's management surface (spec.md §3 "StateMachine",
//! "Execution", §4.5.4 "Execution modes"): a named registry of parsed
//! state machines, synchronous and asynchronous execution, and
//! ARN-addressed execution tracking with a best-effort history.
//!
//! `CreateStateMachine`/`DescribeStateMachine`/`ListStateMachines` are not
//! in spec.md's prose but are cheap, idiomatic additions restored from the
//! original Python reference
//! (`examples/original_source/src/lws/providers/stepfunctions/provider.py`)
//! per `SPEC_FULL.md`'s "Supplemented features".

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use indexmap::IndexMap;
use parking_lot::RwLock;
use serde_json::Value;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use lc_core::{Arn, ExecutionId};

use crate::ast::StateMachine;
use crate::error::WorkflowError;
use crate::interp::{ComputeBridge, Interpreter, RunConfig};
use crate::parser;

/// `{name, type, start-at, states}` (spec.md §3). `start_at`/`states` live
/// on the parsed [`StateMachine`]; this wraps it with the bits the
/// management API needs: its source definition (for `Describe`), its
/// execution mode, and its ARN.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StateMachineType {
    Standard,
    Express,
}

pub struct StateMachineDef {
    pub name: String,
    pub machine_type: StateMachineType,
    pub definition: String,
    pub parsed: StateMachine,
    pub arn: Arn,
}

/// `{execution-arn, state-machine-name, start-time, end-time?, status,
/// input, output?, error?, cause?, history}` (spec.md §3 "Execution").
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecutionStatus {
    Running,
    Succeeded,
    Failed,
    TimedOut,
    Aborted,
}

/// One entry in an execution's best-effort history (spec.md §3
/// "Execution", "history: [event]"). Not ASL's full event taxonomy — just
/// enough to answer "what happened" for a `DescribeExecution`-style query.
#[derive(Debug, Clone)]
pub struct HistoryEvent {
    pub timestamp_ms: i64,
    pub detail: String,
}

pub struct Execution {
    pub execution_arn: String,
    pub state_machine_name: String,
    pub start_time_ms: i64,
    pub end_time_ms: RwLock<Option<i64>>,
    pub status: RwLock<ExecutionStatus>,
    pub input: Value,
    pub output: RwLock<Option<Value>>,
    pub error: RwLock<Option<String>>,
    pub cause: RwLock<Option<String>>,
    pub history: RwLock<Vec<HistoryEvent>>,
    cancel: CancellationToken,
}

impl Execution {
    fn push_history(&self, detail: impl Into<String>) {
        self.history.write().push(HistoryEvent { timestamp_ms: now_ms(), detail: detail.into() });
    }

    pub fn status(&self) -> ExecutionStatus {
        self.status.read().clone()
    }

    /// Signals the interpreter running this execution to stop at the next
    /// checkpoint (spec.md §5, "checks a cancellation flag between states
    /// and after each retry wait"). In-flight task invocations are not
    /// interrupted; their results are discarded because the execution is
    /// already terminal by the time they'd apply.
    pub fn stop(&self, error: Option<String>, cause: Option<String>) {
        self.cancel.cancel();
        self.push_history("stop requested");
        let _ = (error, cause);
    }
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

/// The management surface over one region's worth of state machines and
/// their executions (spec.md §4.5). One instance per emulated
/// step-functions-equivalent provider.
pub struct WorkflowEngine {
    compute: Arc<dyn ComputeBridge>,
    max_wait: Duration,
    machines: RwLock<IndexMap<String, Arc<StateMachineDef>>>,
    executions: RwLock<BTreeMap<String, Arc<Execution>>>,
    seq: AtomicI64,
    running: RwLock<Vec<JoinHandle<()>>>,
}

impl WorkflowEngine {
    pub fn new(compute: Arc<dyn ComputeBridge>, max_wait: Duration) -> Self {
        WorkflowEngine {
            compute,
            max_wait,
            machines: RwLock::new(IndexMap::new()),
            executions: RwLock::new(BTreeMap::new()),
            seq: AtomicI64::new(0),
            running: RwLock::new(Vec::new()),
        }
    }

    /// Parses and registers a state machine. Idempotent: re-creating a
    /// name that already exists returns the existing ARN rather than
    /// erroring, matching the original's `CreateStateMachine` behaviour
    /// (`SPEC_FULL.md` "Supplemented features").
    pub fn create_state_machine(&self, name: &str, machine_type: StateMachineType, definition: &str) -> Result<Arn, WorkflowError> {
        if let Some(existing) = self.machines.read().get(name) {
            return Ok(existing.arn.clone());
        }
        let parsed = parser::parse_definition(definition)?;
        let arn = Arn::with_resource_type("states", "stateMachine", name);
        let def = Arc::new(StateMachineDef { name: name.to_string(), machine_type, definition: definition.to_string(), parsed, arn: arn.clone() });
        self.machines.write().insert(name.to_string(), def);
        info!(state_machine = %name, %arn, "state machine created");
        Ok(arn)
    }

    pub fn describe_state_machine(&self, name: &str) -> Result<Arc<StateMachineDef>, WorkflowError> {
        self.machines.read().get(name).cloned().ok_or_else(|| WorkflowError::NotFound(name.to_string()))
    }

    pub fn list_state_machines(&self) -> Vec<Arc<StateMachineDef>> {
        self.machines.read().values().cloned().collect()
    }

    pub fn delete_state_machine(&self, name: &str) -> Result<(), WorkflowError> {
        self.machines.write().shift_remove(name).map(|_| ()).ok_or_else(|| WorkflowError::NotFound(name.to_string()))
    }

    fn next_execution_name(&self, state_machine_name: &str) -> String {
        let n = self.seq.fetch_add(1, Ordering::SeqCst);
        let id = ExecutionId::new();
        format!("{state_machine_name}-{n}-{}", id.suffix())
    }

    fn new_execution(&self, def: &StateMachineDef, input: Value) -> (Arc<Execution>, CancellationToken) {
        let exec_name = self.next_execution_name(&def.name);
        let execution_arn = Arn::new("states", format_args!("execution:{}:{}", def.name, exec_name)).to_string();
        let cancel = CancellationToken::new();
        let execution = Arc::new(Execution {
            execution_arn: execution_arn.clone(),
            state_machine_name: def.name.clone(),
            start_time_ms: now_ms(),
            end_time_ms: RwLock::new(None),
            status: RwLock::new(ExecutionStatus::Running),
            input,
            output: RwLock::new(None),
            error: RwLock::new(None),
            cause: RwLock::new(None),
            history: RwLock::new(vec![HistoryEvent { timestamp_ms: now_ms(), detail: "ExecutionStarted".to_string() }]),
            cancel: cancel.clone(),
        });
        self.executions.write().insert(execution_arn, Arc::clone(&execution));
        (execution, cancel)
    }

    /// Synchronous ("express") execution (spec.md §4.5.4): blocks the
    /// caller until the interpreter returns; the final status and
    /// output/error are part of the single response.
    pub async fn start_sync_execution(&self, state_machine_name: &str, input: Value) -> Result<Arc<Execution>, WorkflowError> {
        let def = self.describe_state_machine(state_machine_name)?;
        let (execution, cancel) = self.new_execution(&def, input);
        drive_to_completion(Arc::clone(&self.compute), self.max_wait, def, Arc::clone(&execution), cancel).await;
        Ok(execution)
    }

    /// Asynchronous ("standard") execution (spec.md §4.5.4): returns the
    /// execution ARN immediately; the interpreter runs on a background
    /// task and the execution is queryable by ARN as it progresses.
    pub fn start_execution(&self, state_machine_name: &str, input: Value) -> Result<String, WorkflowError> {
        let def = self.describe_state_machine(state_machine_name)?;
        let (execution, cancel) = self.new_execution(&def, input);
        let arn = execution.execution_arn.clone();
        let compute = Arc::clone(&self.compute);
        let max_wait = self.max_wait;
        let handle = tokio::spawn(drive_to_completion(compute, max_wait, def, Arc::clone(&execution), cancel));
        self.running.write().push(handle);
        Ok(arn)
    }

    pub fn describe_execution(&self, execution_arn: &str) -> Result<Arc<Execution>, WorkflowError> {
        self.executions.read().get(execution_arn).cloned().ok_or_else(|| WorkflowError::ExecutionNotFound(execution_arn.to_string()))
    }

    pub fn list_executions(&self, state_machine_name: &str) -> Vec<Arc<Execution>> {
        self.executions.read().values().filter(|e| e.state_machine_name == state_machine_name).cloned().collect()
    }

    /// Stops a running execution by ARN (spec.md §5, "Cancellation and
    /// timeouts"): signals its cancellation token so the interpreter exits
    /// at its next checkpoint. A no-op (besides the status flip) if the
    /// execution already reached a terminal state.
    pub fn stop_execution(&self, execution_arn: &str, error: Option<String>, cause: Option<String>) -> Result<(), WorkflowError> {
        let execution = self.describe_execution(execution_arn)?;
        if matches!(execution.status(), ExecutionStatus::Running) {
            execution.stop(error, cause);
        }
        Ok(())
    }

    /// Clears all state machines and executions (spec.md §4.1
    /// `Orchestrator::reset`). Running background executions are left to
    /// finish; their results are simply no longer reachable by ARN.
    pub fn clear(&self) {
        self.machines.write().clear();
        let finished: Vec<_> = self.running.write().drain(..).collect();
        for handle in finished {
            if !handle.is_finished() {
                warn!("clearing workflow engine state with an execution still in flight");
            }
        }
        self.executions.write().clear();
    }
}

/// Runs one execution's interpreter loop to completion, writing the
/// outcome onto `execution` rather than returning it — shared by the
/// synchronous (awaited inline) and asynchronous (spawned) start paths.
async fn drive_to_completion(compute: Arc<dyn ComputeBridge>, max_wait: Duration, def: Arc<StateMachineDef>, execution: Arc<Execution>, cancel: CancellationToken) {
    let interp = Interpreter::new(compute, cancel, max_wait);
    let cfg = RunConfig {
        execution_id: execution.execution_arn.clone(),
        state_machine_name: def.name.clone(),
        start_time_ms: execution.start_time_ms,
        max_wait,
    };
    let result = interp.run(&def.parsed, execution.input.clone(), &cfg).await;
    *execution.end_time_ms.write() = Some(now_ms());
    match result {
        Ok(output) => {
            *execution.status.write() = ExecutionStatus::Succeeded;
            *execution.output.write() = Some(output);
            execution.push_history("ExecutionSucceeded");
        }
        Err(err) => {
            let code = err.error_code();
            let status = match code.as_str() {
                "States.Aborted" => ExecutionStatus::Aborted,
                "States.Timeout" => ExecutionStatus::TimedOut,
                _ => ExecutionStatus::Failed,
            };
            *execution.status.write() = status;
            *execution.error.write() = Some(code.clone());
            *execution.cause.write() = Some(err.cause());
            execution.push_history(format!("ExecutionFailed: {code}"));
        }
    }
}

#[cfg(test)]
#[path = "execution_tests.rs"]
mod tests;
