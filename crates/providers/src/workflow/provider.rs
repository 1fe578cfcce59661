// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The workflow (step-functions-equivalent) provider (spec.md §3
//! "Provider" capability list — "Workflow", §4.5, §4.9 "workflow needs
//! compute"): wraps `lc_workflow::WorkflowEngine` with the same
//! `Provider` lifecycle every other emulated service gets, and bridges
//! its `Task` states to compute through
//! [`crate::compute::ComputeFunctionProvider`] — the same "resolve a
//! named capability, delegate the call" shape `ObjectEventComputeTarget`
//! (spec.md §4.3/§4.8) and `TopicProvider`'s subscriber fan-out (spec.md
//! §4.7) already use for their own cross-wiring to compute.

use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lc_core::{Arn, LifecycleState};
use lc_graph::{Provider, ProviderResult as GraphResult};
use lc_workflow::{ComputeBridge, Execution, StateMachineDef, StateMachineType, TaskError, WorkflowEngine, WorkflowError};
use serde_json::Value;

use crate::compute::ComputeFunctionProvider;

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

/// Adapts a named [`ComputeFunctionProvider`] to [`ComputeBridge`] so a
/// Task state's `Resource` field — a plain function name in this
/// emulator, not a full ARN — invokes compute directly, mirroring
/// `crate::compute::RegistryComputeBridge` but wired at construction
/// time against one concrete provider instead of resolved per-call
/// through the orchestrator's registry.
struct ComputeProviderBridge {
    compute: Arc<ComputeFunctionProvider>,
}

#[async_trait]
impl ComputeBridge for ComputeProviderBridge {
    async fn invoke(&self, resource: &str, input: Value) -> Result<Value, TaskError> {
        let result = self.compute.invoke(resource, input).await.map_err(|e| TaskError::generic(e.to_string()))?;
        result.outcome.map_err(|env| TaskError::new(env.code, env.message))
    }
}

/// The emulated step-functions-equivalent service (spec.md §4.5).
/// Management (`CreateStateMachine`/`DescribeStateMachine`/
/// `ListStateMachines`) and execution (sync and async) are delegated
/// straight through to the wrapped [`WorkflowEngine`]; this type only
/// adds the `Provider` lifecycle and the compute wiring.
pub struct WorkflowProvider {
    engine: Arc<WorkflowEngine>,
    state: AtomicU8,
}

impl WorkflowProvider {
    pub fn new(compute: Arc<ComputeFunctionProvider>, max_wait: Duration) -> Self {
        let bridge: Arc<dyn ComputeBridge> = Arc::new(ComputeProviderBridge { compute });
        WorkflowProvider { engine: Arc::new(WorkflowEngine::new(bridge, max_wait)), state: AtomicU8::new(STOPPED) }
    }

    pub fn engine(&self) -> &WorkflowEngine {
        &self.engine
    }

    pub fn create_state_machine(&self, name: &str, machine_type: StateMachineType, definition: &str) -> Result<Arn, WorkflowError> {
        self.engine.create_state_machine(name, machine_type, definition)
    }

    pub fn describe_state_machine(&self, name: &str) -> Result<Arc<StateMachineDef>, WorkflowError> {
        self.engine.describe_state_machine(name)
    }

    pub fn list_state_machines(&self) -> Vec<Arc<StateMachineDef>> {
        self.engine.list_state_machines()
    }

    pub fn delete_state_machine(&self, name: &str) -> Result<(), WorkflowError> {
        self.engine.delete_state_machine(name)
    }

    /// Synchronous ("express") execution (spec.md §4.5.4).
    pub async fn start_sync_execution(&self, state_machine_name: &str, input: Value) -> Result<Arc<Execution>, WorkflowError> {
        self.engine.start_sync_execution(state_machine_name, input).await
    }

    /// Asynchronous ("standard") execution (spec.md §4.5.4).
    pub fn start_execution(&self, state_machine_name: &str, input: Value) -> Result<String, WorkflowError> {
        self.engine.start_execution(state_machine_name, input)
    }

    pub fn describe_execution(&self, execution_arn: &str) -> Result<Arc<Execution>, WorkflowError> {
        self.engine.describe_execution(execution_arn)
    }

    pub fn list_executions(&self, state_machine_name: &str) -> Vec<Arc<Execution>> {
        self.engine.list_executions(state_machine_name)
    }

    pub fn stop_execution(&self, execution_arn: &str, error: Option<String>, cause: Option<String>) -> Result<(), WorkflowError> {
        self.engine.stop_execution(execution_arn, error, cause)
    }
}

#[async_trait]
impl Provider for WorkflowProvider {
    fn name(&self) -> &str {
        "workflow"
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
        self.engine.clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
