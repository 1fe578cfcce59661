// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The state-machine interpreter (spec.md §4.5.4). Walks a [`StateMachine`]
//! from `StartAt`, applying each state's input/output processing, task
//! invocation, retry/catch, and transition rules until a Succeed, Fail, or
//! `End: true` state is reached. The state-dispatch loop is reworked
//! around a typed AST instead of dict-shaped ASL.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::stream::FuturesUnordered;
use futures_util::StreamExt;
use serde_json::{json, Value};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::ast::{CatchConfig, MapState, ParallelState, PassState, RetryConfig, StateDef, StateMachine, TaskState, WaitState};
use crate::choice;
use crate::error::WorkflowError;
use crate::path;
use crate::retry;

/// Resolves a Task state's `Resource` field to an invocation, without this
/// crate depending on any concrete compute provider (spec.md §4.9's bridge
/// is wired in by whatever crate owns the registry).
#[async_trait]
pub trait ComputeBridge: Send + Sync {
    async fn invoke(&self, resource: &str, input: Value) -> Result<Value, TaskError>;
}

/// A task failure carrying an ASL-style error code and cause, the unit the
/// retry/catch machinery matches against (spec.md §4.5.5).
#[derive(Debug, Clone)]
pub struct TaskError {
    pub error: String,
    pub cause: String,
}

impl TaskError {
    pub fn new(error: impl Into<String>, cause: impl Into<String>) -> Self {
        TaskError { error: error.into(), cause: cause.into() }
    }

    pub fn generic(cause: impl Into<String>) -> Self {
        TaskError { error: "States.TaskFailed".to_string(), cause: cause.into() }
    }
}

impl From<TaskError> for WorkflowError {
    fn from(err: TaskError) -> Self {
        WorkflowError::States { error: err.error, cause: err.cause }
    }
}

/// Parameters fixed for one execution's run (spec.md §3 "Execution"):
/// identity for `$.Execution` context fields, and the wall-clock cap on
/// Wait durations so a test suite or a long-idle emulator doesn't actually
/// block for days.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub execution_id: String,
    pub state_machine_name: String,
    pub start_time_ms: i64,
    pub max_wait: Duration,
}

fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn execution_context(cfg: &RunConfig, state_name: &str) -> Value {
    json!({
        "Execution": {
            "Id": cfg.execution_id,
            "Name": cfg.execution_id,
            "StartTime": cfg.start_time_ms,
        },
        "State": {
            "Name": state_name,
            "EnteredTime": now_ms(),
        },
        "StateMachine": {
            "Name": cfg.state_machine_name,
        },
    })
}

fn with_map_item(ctx: &Value, index: usize, item: &Value) -> Value {
    let mut out = ctx.clone();
    if let Value::Object(obj) = &mut out {
        obj.insert("Map".to_string(), json!({"Item": {"Index": index, "Value": item}}));
    }
    out
}

/// What executing one state produced: either a named successor with its
/// output to feed forward, or a terminal output ending the run (Succeed, or
/// `End: true`).
enum StateOutcome {
    Next { state: String, output: Value },
    Terminal { output: Value },
}

/// The result of running a retryable/catchable unit of work: either it
/// succeeded, or a `Catch` rule redirected it to a named state with the
/// error placed at its `ResultPath`. An unmatched error propagates as
/// `Err` instead.
enum Recovered {
    Success(Value),
    Caught { next_state: String, output: Value },
}

pub struct Interpreter {
    compute: Arc<dyn ComputeBridge>,
    cancel: CancellationToken,
    max_wait: Duration,
}

impl Interpreter {
    pub fn new(compute: Arc<dyn ComputeBridge>, cancel: CancellationToken, max_wait: Duration) -> Self {
        Interpreter { compute, cancel, max_wait }
    }

    fn check_cancelled(&self) -> Result<(), WorkflowError> {
        if self.cancel.is_cancelled() {
            return Err(WorkflowError::States { error: "States.Aborted".to_string(), cause: "execution was stopped".to_string() });
        }
        Ok(())
    }

    /// Runs `machine` to completion, returning its final output or the
    /// unhandled error that ended it. Boxed because Parallel branches and
    /// Map iterations recurse back into this same method.
    pub fn run<'a>(&'a self, machine: &'a StateMachine, input: Value, cfg: &'a RunConfig) -> Pin<Box<dyn Future<Output = Result<Value, WorkflowError>> + Send + 'a>> {
        Box::pin(async move {
            let mut current = machine.start_at.clone();
            let mut state_input = input;
            loop {
                self.check_cancelled()?;
                let state = machine.states.get(&current).ok_or_else(|| WorkflowError::Parse(format!("state {current:?} not found in state machine")))?;
                let ctx = execution_context(cfg, &current);
                debug!(state = %current, "entering state");
                let outcome = self.execute_state(machine, state, state_input, &ctx, cfg).await?;
                match outcome {
                    StateOutcome::Next { state, output } => {
                        current = state;
                        state_input = output;
                    }
                    StateOutcome::Terminal { output } => return Ok(output),
                }
            }
        })
    }

    fn execute_state<'a>(
        &'a self,
        machine: &'a StateMachine,
        state: &'a StateDef,
        state_input: Value,
        ctx: &'a Value,
        cfg: &'a RunConfig,
    ) -> Pin<Box<dyn Future<Output = Result<StateOutcome, WorkflowError>> + Send + 'a>> {
        Box::pin(async move {
            match state {
                StateDef::Task(task) => self.execute_task(task, state_input, ctx).await,
                StateDef::Choice(choice_state) => {
                    let data = path::input_path(&state_input, choice_state.input_path.as_deref())?;
                    let next = choice::resolve_next(choice_state, &data)?;
                    let output = path::output_path(&data, choice_state.output_path.as_deref())?;
                    Ok(StateOutcome::Next { state: next, output })
                }
                StateDef::Wait(wait) => self.execute_wait(wait, state_input).await,
                StateDef::Pass(pass) => self.execute_pass(pass, state_input, ctx),
                StateDef::Parallel(parallel) => self.execute_parallel(parallel, state_input, cfg).await,
                StateDef::Map(map) => self.execute_map(machine, map, state_input, cfg).await,
                StateDef::Succeed(succeed) => {
                    let data = path::input_path(&state_input, succeed.input_path.as_deref())?;
                    let output = path::output_path(&data, succeed.output_path.as_deref())?;
                    Ok(StateOutcome::Terminal { output })
                }
                StateDef::Fail(fail) => Err(WorkflowError::States {
                    error: fail.error.clone().unwrap_or_else(|| "States.Fail".to_string()),
                    cause: fail.cause.clone().unwrap_or_default(),
                }),
            }
        })
    }

    fn execute_pass(&self, pass: &PassState, state_input: Value, ctx: &Value) -> Result<StateOutcome, WorkflowError> {
        let data = path::input_path(&state_input, pass.input_path.as_deref())?;
        let shaped = match &pass.parameters {
            Some(tpl) => path::context_parameters(tpl, &data, ctx)?,
            None => data,
        };
        let result = pass.result.clone().unwrap_or(shaped);
        let merged = path::result_path(&state_input, result, pass.result_path.as_deref())?;
        let output = path::output_path(&merged, pass.output_path.as_deref())?;
        Ok(self.next_or_terminal(pass.next.as_deref(), pass.end, output))
    }

    async fn execute_wait(&self, wait: &WaitState, state_input: Value) -> Result<StateOutcome, WorkflowError> {
        let data = path::input_path(&state_input, wait.input_path.as_deref())?;
        let requested = self.wait_duration(wait, &data)?;
        let capped = requested.min(self.max_wait);
        if capped < requested {
            warn!(requested_secs = requested.as_secs_f64(), capped_secs = capped.as_secs_f64(), "wait duration capped");
        }
        tokio::select! {
            _ = tokio::time::sleep(capped) => {}
            _ = self.cancel.cancelled() => {
                return Err(WorkflowError::States { error: "States.Aborted".to_string(), cause: "execution was stopped".to_string() });
            }
        }
        let output = path::output_path(&data, wait.output_path.as_deref())?;
        Ok(self.next_or_terminal(wait.next.as_deref(), wait.end, output))
    }

    fn wait_duration(&self, wait: &WaitState, data: &Value) -> Result<Duration, WorkflowError> {
        if let Some(secs) = wait.seconds {
            return Ok(Duration::from_secs_f64(secs.max(0.0)));
        }
        if let Some(path_expr) = &wait.seconds_path {
            let value = path::input_path(data, Some(path_expr))?;
            let secs = value.as_f64().ok_or_else(|| WorkflowError::Parse(format!("SecondsPath {path_expr:?} did not resolve to a number")))?;
            return Ok(Duration::from_secs_f64(secs.max(0.0)));
        }
        let timestamp = wait
            .timestamp
            .clone()
            .or_else(|| {
                wait.timestamp_path.as_ref().and_then(|p| path::input_path(data, Some(p)).ok()).and_then(|v| v.as_str().map(str::to_string))
            })
            .ok_or_else(|| WorkflowError::Parse("Wait state has no Seconds, SecondsPath, Timestamp, or TimestampPath".to_string()))?;
        let target = chrono::DateTime::parse_from_rfc3339(&timestamp).map_err(|e| WorkflowError::Parse(format!("bad Wait timestamp {timestamp:?}: {e}")))?;
        let delta = target.timestamp_millis() - now_ms();
        Ok(Duration::from_millis(delta.max(0) as u64))
    }

    async fn execute_task(&self, task: &TaskState, state_input: Value, ctx: &Value) -> Result<StateOutcome, WorkflowError> {
        let data = path::input_path(&state_input, task.input_path.as_deref())?;
        let effective_input = match &task.parameters {
            Some(tpl) => path::context_parameters(tpl, &data, ctx)?,
            None => data,
        };
        let timeout = task.timeout_seconds.map(Duration::from_secs_f64);
        let resource = task.resource.clone();
        let recovered = self
            .run_with_retry_catch(&task.retry, &task.catch, &state_input, timeout, || {
                let compute = Arc::clone(&self.compute);
                let resource = resource.clone();
                let input = effective_input.clone();
                async move { compute.invoke(&resource, input).await }
            })
            .await?;

        match recovered {
            Recovered::Success(raw_result) => {
                let selected = match &task.result_selector {
                    Some(tpl) => path::parameters(tpl, &raw_result)?,
                    None => raw_result,
                };
                let merged = path::result_path(&state_input, selected, task.result_path.as_deref())?;
                let output = path::output_path(&merged, task.output_path.as_deref())?;
                Ok(self.next_or_terminal(task.next.as_deref(), task.end, output))
            }
            Recovered::Caught { next_state, output } => Ok(StateOutcome::Next { state: next_state, output }),
        }
    }

    async fn execute_parallel(&self, parallel: &ParallelState, state_input: Value, cfg: &RunConfig) -> Result<StateOutcome, WorkflowError> {
        let data = path::input_path(&state_input, parallel.input_path.as_deref())?;
        let branches = &parallel.branches;
        let state_input_for_catch = state_input.clone();

        let recovered = self
            .run_with_retry_catch(&parallel.retry, &parallel.catch, &state_input_for_catch, None, || {
                let data = data.clone();
                async move {
                    // Polling a `FuturesUnordered` concurrently, rather than
                    // awaiting each branch in turn, is what makes this
                    // actually run the branches side by side; dropping it on
                    // the first error cancels whichever branches hadn't
                    // finished yet (spec.md §4.5.4, "first-failing branch
                    // cancels the others").
                    let mut pending: FuturesUnordered<_> =
                        branches.iter().enumerate().map(|(i, b)| { let data = data.clone(); async move { (i, self.run(b, data, cfg).await) } }).collect();
                    let mut outputs = vec![Value::Null; branches.len()];
                    while let Some((i, result)) = pending.next().await {
                        match result {
                            Ok(out) => outputs[i] = out,
                            Err(err) => return Err(TaskError::new(err.error_code(), err.cause())),
                        }
                    }
                    Ok(Value::Array(outputs))
                }
            })
            .await?;

        match recovered {
            Recovered::Success(raw_result) => {
                let selected = match &parallel.result_selector {
                    Some(tpl) => path::parameters(tpl, &raw_result)?,
                    None => raw_result,
                };
                let merged = path::result_path(&state_input, selected, parallel.result_path.as_deref())?;
                let output = path::output_path(&merged, parallel.output_path.as_deref())?;
                Ok(self.next_or_terminal(parallel.next.as_deref(), parallel.end, output))
            }
            Recovered::Caught { next_state, output } => Ok(StateOutcome::Next { state: next_state, output }),
        }
    }

    async fn execute_map(&self, _outer: &StateMachine, map: &MapState, state_input: Value, cfg: &RunConfig) -> Result<StateOutcome, WorkflowError> {
        let data = path::input_path(&state_input, map.input_path.as_deref())?;
        let items = path::input_path(&data, map.items_path.as_deref())?;
        let items = items.as_array().cloned().ok_or_else(|| WorkflowError::Parse("Map state's ItemsPath did not resolve to an array".to_string()))?;

        let iterator = &map.iterator;
        let concurrency = if map.max_concurrency == 0 { items.len().max(1) } else { map.max_concurrency };

        let recovered = self
            .run_with_retry_catch(&map.retry, &map.catch, &state_input, None, || {
                let items = items.clone();
                async move {
                    let mut outputs = vec![Value::Null; items.len()];
                    let mut index = 0usize;
                    while index < items.len() {
                        let batch_end = (index + concurrency).min(items.len());
                        let mut pending = FuturesUnordered::new();
                        for (offset, item) in items[index..batch_end].iter().enumerate() {
                            let item_input = match &map.parameters {
                                Some(tpl) => path::parameters(tpl, item).map_err(|e| TaskError::new(e.error_code(), e.cause()))?,
                                None => item.clone(),
                            };
                            pending.push(async move { (offset, self.run(iterator, item_input, cfg).await) });
                        }
                        while let Some((offset, result)) = pending.next().await {
                            match result {
                                Ok(out) => outputs[index + offset] = out,
                                Err(err) => return Err(TaskError::new(err.error_code(), err.cause())),
                            }
                        }
                        index = batch_end;
                    }
                    Ok(Value::Array(outputs))
                }
            })
            .await?;

        match recovered {
            Recovered::Success(raw_result) => {
                let selected = match &map.result_selector {
                    Some(tpl) => path::parameters(tpl, &raw_result)?,
                    None => raw_result,
                };
                let merged = path::result_path(&state_input, selected, map.result_path.as_deref())?;
                let output = path::output_path(&merged, map.output_path.as_deref())?;
                Ok(self.next_or_terminal(map.next.as_deref(), map.end, output))
            }
            Recovered::Caught { next_state, output } => Ok(StateOutcome::Next { state: next_state, output }),
        }
    }

    fn next_or_terminal(&self, next: Option<&str>, _end: bool, output: Value) -> StateOutcome {
        match next {
            Some(name) => StateOutcome::Next { state: name.to_string(), output },
            None => StateOutcome::Terminal { output },
        }
    }

    /// Runs `invoke` under the given retry/catch policy (spec.md §4.5.5),
    /// applying an optional per-attempt timeout. Shared by Task, Parallel,
    /// and Map, which all carry the same `Retry`/`Catch` shape.
    async fn run_with_retry_catch<F, Fut>(
        &self,
        retry_list: &[RetryConfig],
        catch_list: &[CatchConfig],
        state_input: &Value,
        timeout: Option<Duration>,
        mut invoke: F,
    ) -> Result<Recovered, WorkflowError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<Value, TaskError>>,
    {
        let mut attempts = vec![0u32; retry_list.len()];
        loop {
            self.check_cancelled()?;
            let fut = invoke();
            let outcome = match timeout {
                Some(d) => match tokio::time::timeout(d, fut).await {
                    Ok(r) => r,
                    Err(_) => Err(TaskError::new("States.Timeout", format!("task exceeded {:.3}s", d.as_secs_f64()))),
                },
                None => fut.await,
            };

            let task_err = match outcome {
                Ok(value) => return Ok(Recovered::Success(value)),
                Err(err) => err,
            };

            let mut retried = false;
            for (i, r) in retry_list.iter().enumerate() {
                if let Some((_, delay)) = retry::matching_retry(std::slice::from_ref(r), &task_err.error, attempts[i]) {
                    attempts[i] += 1;
                    let capped = delay.min(self.max_wait);
                    tokio::select! {
                        _ = tokio::time::sleep(capped) => {}
                        _ = self.cancel.cancelled() => {
                            return Err(WorkflowError::States { error: "States.Aborted".to_string(), cause: "execution was stopped".to_string() });
                        }
                    }
                    retried = true;
                    break;
                }
            }
            if retried {
                continue;
            }

            if let Some(c) = retry::matching_catch(catch_list, &task_err.error) {
                let error_value = json!({"Error": task_err.error, "Cause": task_err.cause});
                let output = path::result_path(state_input, error_value, c.result_path.as_deref())?;
                return Ok(Recovered::Caught { next_state: c.next_state.clone(), output });
            }

            return Err(task_err.into());
        }
    }
}

#[cfg(test)]
#[path = "interp_tests.rs"]
mod tests;
