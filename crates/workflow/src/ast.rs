// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The parsed state-machine tree (spec.md §3 "Workflow entities", §4.5.1).
//! A tagged union over state types; branches and iterators are themselves
//! nested [`StateMachine`] trees, so the interpreter recurses over this
//! shape directly.

use indexmap::IndexMap;
use serde_json::Value;

#[derive(Debug, Clone)]
pub struct StateMachine {
    pub start_at: String,
    pub states: IndexMap<String, StateDef>,
    pub comment: Option<String>,
}

#[derive(Debug, Clone)]
pub enum StateDef {
    Task(TaskState),
    Choice(ChoiceState),
    Wait(WaitState),
    Parallel(ParallelState),
    Map(MapState),
    Pass(PassState),
    Succeed(SucceedState),
    Fail(FailState),
}

impl StateDef {
    /// The `Next` state name, if this state isn't terminal and isn't
    /// itself a terminator (Choice resolves its own next; Succeed/Fail end
    /// the execution outright).
    pub fn next(&self) -> Option<&str> {
        match self {
            StateDef::Task(s) => s.next.as_deref(),
            StateDef::Wait(s) => s.next.as_deref(),
            StateDef::Parallel(s) => s.next.as_deref(),
            StateDef::Map(s) => s.next.as_deref(),
            StateDef::Pass(s) => s.next.as_deref(),
            StateDef::Choice(_) | StateDef::Succeed(_) | StateDef::Fail(_) => None,
        }
    }

    pub fn is_end(&self) -> bool {
        match self {
            StateDef::Task(s) => s.end,
            StateDef::Wait(s) => s.end,
            StateDef::Parallel(s) => s.end,
            StateDef::Map(s) => s.end,
            StateDef::Pass(s) => s.end,
            StateDef::Choice(_) | StateDef::Succeed(_) | StateDef::Fail(_) => true,
        }
    }
}

/// `{error-equals, interval-seconds, max-attempts, backoff-rate}`
/// (spec.md §3). Defaults match the ASL spec: interval 1s, backoff 2.0.
#[derive(Debug, Clone)]
pub struct RetryConfig {
    pub error_equals: Vec<String>,
    pub interval_seconds: f64,
    pub max_attempts: u32,
    pub backoff_rate: f64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        RetryConfig { error_equals: vec!["States.ALL".to_string()], interval_seconds: 1.0, max_attempts: 3, backoff_rate: 2.0 }
    }
}

/// `{error-equals, next-state, result-path}` (spec.md §3).
#[derive(Debug, Clone)]
pub struct CatchConfig {
    pub error_equals: Vec<String>,
    pub next_state: String,
    pub result_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct TaskState {
    pub resource: String,
    pub next: Option<String>,
    pub end: bool,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_path: Option<String>,
    pub parameters: Option<Value>,
    pub result_selector: Option<Value>,
    pub retry: Vec<RetryConfig>,
    pub catch: Vec<CatchConfig>,
    /// `TimeoutSeconds` (spec.md §5, "Cancellation and timeouts"). `None`
    /// means no per-state timeout is enforced.
    pub timeout_seconds: Option<f64>,
}

#[derive(Debug, Clone)]
pub struct ChoiceState {
    pub choices: Vec<ChoiceRule>,
    pub default: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
}

/// A single comparison rule within a Choice state, or a combinator over
/// nested rules (spec.md §4.5.3).
#[derive(Debug, Clone)]
pub struct ChoiceRule {
    pub next_state: String,
    pub kind: ChoiceRuleKind,
}

#[derive(Debug, Clone)]
pub enum ChoiceRuleKind {
    Leaf { variable: String, operator: ComparisonOp, value: Value },
    And(Vec<ChoiceRule>),
    Or(Vec<ChoiceRule>),
    Not(Box<ChoiceRule>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    StringEquals,
    StringGreaterThan,
    StringLessThan,
    StringGreaterThanEquals,
    StringLessThanEquals,
    NumericEquals,
    NumericGreaterThan,
    NumericLessThan,
    NumericGreaterThanEquals,
    NumericLessThanEquals,
    BooleanEquals,
    TimestampEquals,
    TimestampGreaterThan,
    TimestampLessThan,
    TimestampGreaterThanEquals,
    TimestampLessThanEquals,
    IsPresent,
    IsNull,
    IsString,
    IsNumeric,
    IsBoolean,
}

#[derive(Debug, Clone)]
pub struct WaitState {
    pub next: Option<String>,
    pub end: bool,
    pub seconds: Option<f64>,
    pub timestamp: Option<String>,
    pub seconds_path: Option<String>,
    pub timestamp_path: Option<String>,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct ParallelState {
    pub branches: Vec<StateMachine>,
    pub next: Option<String>,
    pub end: bool,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_path: Option<String>,
    pub result_selector: Option<Value>,
    pub retry: Vec<RetryConfig>,
    pub catch: Vec<CatchConfig>,
}

#[derive(Debug, Clone)]
pub struct MapState {
    pub iterator: StateMachine,
    pub items_path: Option<String>,
    pub max_concurrency: usize,
    pub next: Option<String>,
    pub end: bool,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_path: Option<String>,
    pub parameters: Option<Value>,
    pub result_selector: Option<Value>,
    pub retry: Vec<RetryConfig>,
    pub catch: Vec<CatchConfig>,
}

#[derive(Debug, Clone)]
pub struct PassState {
    pub result: Option<Value>,
    pub next: Option<String>,
    pub end: bool,
    pub input_path: Option<String>,
    pub output_path: Option<String>,
    pub result_path: Option<String>,
    pub parameters: Option<Value>,
}

#[derive(Debug, Clone)]
pub struct SucceedState {
    pub input_path: Option<String>,
    pub output_path: Option<String>,
}

#[derive(Debug, Clone)]
pub struct FailState {
    pub error: Option<String>,
    pub cause: Option<String>,
}

#[cfg(test)]
#[path = "ast_tests.rs"]
mod tests;
