// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The compute provider (spec.md §4.9): resolves a function name to an
//! invocable target, delivers an event and context, and returns a
//! structured result. The execution substrate is opaque to the core —
//! here it is an in-process async handler, the same shape as an
//! in-process agent backend generalized from "run an agent session" to
//! "run one function invocation". A container-backed or
//! subprocess-backed substrate would implement the same
//! [`ComputeHandler`] trait without the rest of the
//! stack noticing.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Instant;

use async_trait::async_trait;
use lc_core::{Arn, LifecycleState, ResourceId, ResourceKind};
use lc_graph::{Provider, ProviderResult, Registry};
use lc_wire::{ErrorEnvelope, EventRecord, EventSource, RecordsEnvelope};
use parking_lot::RwLock;
use serde_json::Value;
use uuid::Uuid;

use crate::error::{ProviderError, ProviderResult as Res};

/// Ambient metadata handed to every invocation (spec.md §4.9, "The context
/// carries function name, memory limit, timeout, request id, and invoked
/// ARN").
#[derive(Debug, Clone)]
pub struct InvocationContext {
    pub function_name: String,
    pub memory_limit_mb: u32,
    pub timeout_seconds: f64,
    pub request_id: String,
    pub invoked_arn: String,
}

impl InvocationContext {
    pub fn new(function_name: impl Into<String>) -> Self {
        let function_name = function_name.into();
        let invoked_arn = Arn::with_resource_type("lambda", "function", &function_name).to_string();
        InvocationContext {
            function_name,
            memory_limit_mb: 128,
            timeout_seconds: 30.0,
            request_id: Uuid::new_v4().to_string(),
            invoked_arn,
        }
    }
}

/// `{payload | error, duration_ms, request_id}` (spec.md §4.9).
#[derive(Debug, Clone)]
pub struct InvokeResult {
    pub outcome: Result<Value, ErrorEnvelope>,
    pub duration_ms: u64,
    pub request_id: String,
}

/// The execution substrate's contract. Implemented once per handler
/// registered with a [`ComputeFunctionProvider`]; how it actually runs
/// (in-process future, child process, container) is invisible beyond this
/// boundary.
#[async_trait]
pub trait ComputeHandler: Send + Sync {
    async fn invoke(&self, event: Value, ctx: &InvocationContext) -> Result<Value, String>;
}

/// Wraps a plain async closure as a [`ComputeHandler`], the common case for
/// in-process test fixtures and simple emulated handlers.
pub struct FnHandler<F>(F);

impl<F> FnHandler<F> {
    pub fn new(f: F) -> Self {
        FnHandler(f)
    }
}

#[async_trait]
impl<F, Fut> ComputeHandler for FnHandler<F>
where
    F: Fn(Value) -> Fut + Send + Sync,
    Fut: std::future::Future<Output = Result<Value, String>> + Send,
{
    async fn invoke(&self, event: Value, _ctx: &InvocationContext) -> Result<Value, String> {
        (self.0)(event).await
    }
}

/// One emulated compute function: a name, its resource limits, and the
/// handler bound to it.
struct FunctionEntry {
    memory_limit_mb: u32,
    timeout_seconds: f64,
    handler: Arc<dyn ComputeHandler>,
}

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

/// The compute provider (spec.md §4.9): a registry of named functions.
/// Every event source in the emulator (notifications, queue pollers,
/// pub/sub, workflow tasks) bottoms out in a call to
/// [`ComputeFunctionProvider::invoke`].
pub struct ComputeFunctionProvider {
    functions: RwLock<BTreeMap<String, FunctionEntry>>,
    state: AtomicU8,
}

impl Default for ComputeFunctionProvider {
    fn default() -> Self {
        ComputeFunctionProvider { functions: RwLock::new(BTreeMap::new()), state: AtomicU8::new(STOPPED) }
    }
}

impl ComputeFunctionProvider {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a handler under `name`. Re-registering overwrites.
    pub fn register(&self, name: impl Into<String>, handler: Arc<dyn ComputeHandler>) {
        self.register_with_limits(name, 128, 30.0, handler);
    }

    pub fn register_with_limits(&self, name: impl Into<String>, memory_limit_mb: u32, timeout_seconds: f64, handler: Arc<dyn ComputeHandler>) {
        self.functions.write().insert(name.into(), FunctionEntry { memory_limit_mb, timeout_seconds, handler });
    }

    pub fn deregister(&self, name: &str) {
        self.functions.write().remove(name);
    }

    pub fn has_function(&self, name: &str) -> bool {
        self.functions.read().contains_key(name)
    }

    /// Invokes `function_name` with `event`, timing the call and applying
    /// its configured timeout. Errors are never propagated as `Err` here —
    /// per spec.md §4.9 the result is always a structured
    /// success-or-error [`InvokeResult`]; only an unknown function name is
    /// a hard error since there is nothing to invoke.
    pub async fn invoke(&self, function_name: &str, event: Value) -> Res<InvokeResult> {
        let entry_handler;
        let ctx;
        {
            let functions = self.functions.read();
            let entry = functions.get(function_name).ok_or_else(|| ProviderError::NoSuchFunction(function_name.to_string()))?;
            entry_handler = Arc::clone(&entry.handler);
            let mut c = InvocationContext::new(function_name);
            c.memory_limit_mb = entry.memory_limit_mb;
            c.timeout_seconds = entry.timeout_seconds;
            ctx = c;
        }

        let started = Instant::now();
        let timeout = std::time::Duration::from_secs_f64(ctx.timeout_seconds.max(0.0));
        let outcome = match tokio::time::timeout(timeout, entry_handler.invoke(event, &ctx)).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(message)) => Err(ErrorEnvelope::new("Unhandled", message)),
            Err(_) => Err(ErrorEnvelope::new("States.Timeout", format!("function {function_name:?} exceeded its {:.3}s timeout", ctx.timeout_seconds))),
        };
        Ok(InvokeResult { outcome, duration_ms: started.elapsed().as_millis() as u64, request_id: ctx.request_id })
    }
}

#[async_trait]
impl Provider for ComputeFunctionProvider {
    fn name(&self) -> &str {
        "compute"
    }

    fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => LifecycleState::Running,
            _ => LifecycleState::Stopped,
        }
    }

    async fn start(&self) -> ProviderResult<()> {
        self.state.store(RUNNING, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> ProviderResult<()> {
        self.state.store(STOPPED, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_state(&self) -> ProviderResult<()> {
        self.functions.write().clear();
        Ok(())
    }
}

/// Looks up a [`ComputeFunctionProvider`] through the registry and
/// invokes it, adapting a resource name to the `ResourceId` the registry
/// indexes compute functions by (spec.md §9, "resolved via the registry,
/// not via direct provider references").
pub async fn invoke_via_registry(registry: &Registry, function_name: &str, event: Value) -> Res<InvokeResult> {
    let id = ResourceId::new(ResourceKind::ComputeFunction, function_name);
    let provider = registry
        .resolve::<ComputeFunctionProvider>(&id)
        .ok_or_else(|| ProviderError::NoSuchFunction(function_name.to_string()))?;
    provider.invoke(function_name, event).await
}

/// Adapts [`invoke_via_registry`] to [`lc_workflow::ComputeBridge`] so a
/// workflow's Task states can call compute without `lc-workflow` knowing
/// anything about the registry (spec.md §4.9, §9).
pub struct RegistryComputeBridge {
    registry: Arc<Registry>,
}

impl RegistryComputeBridge {
    pub fn new(registry: Arc<Registry>) -> Self {
        RegistryComputeBridge { registry }
    }
}

#[async_trait]
impl lc_workflow::ComputeBridge for RegistryComputeBridge {
    async fn invoke(&self, resource: &str, input: Value) -> Result<Value, lc_workflow::TaskError> {
        let result = invoke_via_registry(&self.registry, resource, input)
            .await
            .map_err(|e| lc_workflow::TaskError::generic(e.to_string()))?;
        result.outcome.map_err(|env| lc_workflow::TaskError::new(env.code, env.message))
    }
}

/// Builds the `{"Records": [...]}` envelope an event source hands to
/// compute (spec.md §6). Shared by the object-store notification bridge,
/// the document-stream bridge, and pub/sub fan-out.
pub fn records_envelope(source: EventSource, body: Value) -> Value {
    serde_json::to_value(RecordsEnvelope::single(EventRecord { event_source: source, body })).unwrap_or(Value::Null)
}

#[cfg(test)]
#[path = "compute_tests.rs"]
mod tests;
