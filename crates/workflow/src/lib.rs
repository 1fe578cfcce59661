// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lc-workflow: the state-machine engine (spec.md §2 "L2 Providers" /
//! §4.5) — an ASL-style JSON definition parser, a JSONPath-subset path
//! evaluator, a Choice-state rule evaluator, a retry/catch policy
//! executor, and the single-execution interpreter that ties them
//! together. [`execution`] layers state-machine registration and
//! execution tracking (synchronous and asynchronous, by ARN) on top.
//!
//! This crate has no notion of *how* a Task state's `Resource` gets
//! invoked; it only defines the [`interp::ComputeBridge`] contract. The
//! concrete bridge — resolving a resource name against the running
//! deployment's compute providers — is assembled by whatever crate owns
//! the registry (spec.md §4.1, §4.9).

mod ast;
mod choice;
mod error;
mod execution;
mod interp;
mod parser;
mod path;
mod retry;

pub use ast::{
    CatchConfig, ChoiceRule, ChoiceRuleKind, ChoiceState, ComparisonOp, FailState, MapState, ParallelState, PassState,
    RetryConfig, StateDef, StateMachine, SucceedState, TaskState, WaitState,
};
pub use error::WorkflowError;
pub use execution::{Execution, ExecutionStatus, HistoryEvent, StateMachineDef, StateMachineType, WorkflowEngine};
pub use interp::{ComputeBridge, Interpreter, RunConfig, TaskError};
pub use parser::parse_definition;
