// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Parses an ASL-style JSON state machine definition into a [`StateMachine`]
//! tree (spec.md §4.5.1), reworked as a typed recursive-descent walk over
//! `serde_json::Value` instead of dataclasses.

use indexmap::IndexMap;
use serde_json::Value;

use crate::ast::{
    CatchConfig, ChoiceRule, ChoiceRuleKind, ChoiceState, ComparisonOp, FailState, MapState, ParallelState, PassState,
    RetryConfig, StateDef, StateMachine, SucceedState, TaskState, WaitState,
};
use crate::error::WorkflowError;

pub fn parse_definition(src: &str) -> Result<StateMachine, WorkflowError> {
    let value: Value = serde_json::from_str(src)?;
    parse_state_machine(&value)
}

fn parse_state_machine(data: &Value) -> Result<StateMachine, WorkflowError> {
    let obj = data.as_object().ok_or_else(|| WorkflowError::Parse("state machine definition must be a JSON object".to_string()))?;
    let start_at = obj
        .get("StartAt")
        .and_then(Value::as_str)
        .ok_or_else(|| WorkflowError::Parse("missing required field StartAt".to_string()))?
        .to_string();

    let mut states = IndexMap::new();
    let states_obj = obj.get("States").and_then(Value::as_object).ok_or_else(|| WorkflowError::Parse("missing required field States".to_string()))?;
    for (name, state_data) in states_obj {
        states.insert(name.clone(), parse_state(state_data)?);
    }

    let comment = obj.get("Comment").and_then(Value::as_str).map(str::to_string);
    Ok(StateMachine { start_at, states, comment })
}

fn parse_state(data: &Value) -> Result<StateDef, WorkflowError> {
    let state_type = data.get("Type").and_then(Value::as_str).ok_or_else(|| WorkflowError::Parse("state is missing required field Type".to_string()))?;
    match state_type {
        "Task" => Ok(StateDef::Task(parse_task_state(data)?)),
        "Choice" => Ok(StateDef::Choice(parse_choice_state(data)?)),
        "Wait" => Ok(StateDef::Wait(parse_wait_state(data))),
        "Parallel" => Ok(StateDef::Parallel(parse_parallel_state(data)?)),
        "Map" => Ok(StateDef::Map(parse_map_state(data)?)),
        "Pass" => Ok(StateDef::Pass(parse_pass_state(data))),
        "Succeed" => Ok(StateDef::Succeed(parse_succeed_state(data))),
        "Fail" => Ok(StateDef::Fail(parse_fail_state(data))),
        other => Err(WorkflowError::Parse(format!("unknown state type: {other:?}"))),
    }
}

fn str_field(data: &Value, key: &str) -> Option<String> {
    data.get(key).and_then(Value::as_str).map(str::to_string)
}

fn path_field(data: &Value, key: &str) -> Option<String> {
    match data.get(key) {
        Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        None => Some("$".to_string()),
        Some(_) => Some("$".to_string()),
    }
}

fn bool_field(data: &Value, key: &str) -> bool {
    data.get(key).and_then(Value::as_bool).unwrap_or(false)
}

fn parse_retry_list(data: &Value) -> Result<Vec<RetryConfig>, WorkflowError> {
    let Some(arr) = data.get("Retry").and_then(Value::as_array) else { return Ok(Vec::new()) };
    arr.iter()
        .map(|r| {
            let error_equals = r
                .get("ErrorEquals")
                .and_then(Value::as_array)
                .ok_or_else(|| WorkflowError::Parse("Retry entry missing ErrorEquals".to_string()))?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            Ok(RetryConfig {
                error_equals,
                interval_seconds: r.get("IntervalSeconds").and_then(Value::as_f64).unwrap_or(1.0),
                max_attempts: r.get("MaxAttempts").and_then(Value::as_u64).unwrap_or(3) as u32,
                backoff_rate: r.get("BackoffRate").and_then(Value::as_f64).unwrap_or(2.0),
            })
        })
        .collect()
}

fn parse_catch_list(data: &Value) -> Result<Vec<CatchConfig>, WorkflowError> {
    let Some(arr) = data.get("Catch").and_then(Value::as_array) else { return Ok(Vec::new()) };
    arr.iter()
        .map(|c| {
            let error_equals = c
                .get("ErrorEquals")
                .and_then(Value::as_array)
                .ok_or_else(|| WorkflowError::Parse("Catch entry missing ErrorEquals".to_string()))?
                .iter()
                .filter_map(Value::as_str)
                .map(str::to_string)
                .collect();
            let next_state = c.get("Next").and_then(Value::as_str).ok_or_else(|| WorkflowError::Parse("Catch entry missing Next".to_string()))?.to_string();
            let result_path = match c.get("ResultPath") {
                Some(Value::Null) => None,
                Some(Value::String(s)) => Some(s.clone()),
                None => Some("$.Error".to_string()),
                Some(_) => Some("$.Error".to_string()),
            };
            Ok(CatchConfig { error_equals, next_state, result_path })
        })
        .collect()
}

fn parse_task_state(data: &Value) -> Result<TaskState, WorkflowError> {
    let resource = data.get("Resource").and_then(Value::as_str).ok_or_else(|| WorkflowError::Parse("Task state missing required field Resource".to_string()))?.to_string();
    Ok(TaskState {
        resource,
        next: str_field(data, "Next"),
        end: bool_field(data, "End"),
        input_path: path_field(data, "InputPath"),
        output_path: path_field(data, "OutputPath"),
        result_path: path_field(data, "ResultPath"),
        parameters: data.get("Parameters").cloned(),
        result_selector: data.get("ResultSelector").cloned(),
        retry: parse_retry_list(data)?,
        catch: parse_catch_list(data)?,
        timeout_seconds: data.get("TimeoutSeconds").and_then(Value::as_f64),
    })
}

fn parse_choice_state(data: &Value) -> Result<ChoiceState, WorkflowError> {
    let choices = match data.get("Choices").and_then(Value::as_array) {
        Some(arr) => arr.iter().map(parse_choice_rule).collect::<Result<Vec<_>, _>>()?,
        None => Vec::new(),
    };
    Ok(ChoiceState { choices, default: str_field(data, "Default"), input_path: path_field(data, "InputPath"), output_path: path_field(data, "OutputPath") })
}

fn parse_choice_rule(rule: &Value) -> Result<ChoiceRule, WorkflowError> {
    let next_state = str_field(rule, "Next").unwrap_or_default();
    let obj = rule.as_object().ok_or_else(|| WorkflowError::Parse("choice rule must be a JSON object".to_string()))?;

    if let Some(and) = obj.get("And").and_then(Value::as_array) {
        let rules = and.iter().map(parse_choice_rule).collect::<Result<Vec<_>, _>>()?;
        return Ok(ChoiceRule { next_state, kind: ChoiceRuleKind::And(rules) });
    }
    if let Some(or) = obj.get("Or").and_then(Value::as_array) {
        let rules = or.iter().map(parse_choice_rule).collect::<Result<Vec<_>, _>>()?;
        return Ok(ChoiceRule { next_state, kind: ChoiceRuleKind::Or(rules) });
    }
    if let Some(not) = obj.get("Not") {
        let rule = parse_choice_rule(not)?;
        return Ok(ChoiceRule { next_state, kind: ChoiceRuleKind::Not(Box::new(rule)) });
    }

    let variable = str_field(rule, "Variable").ok_or_else(|| WorkflowError::Parse("choice rule missing Variable".to_string()))?;
    let (operator, value) = extract_comparison(obj)?;
    Ok(ChoiceRule { next_state, kind: ChoiceRuleKind::Leaf { variable, operator, value } })
}

const COMPARISON_OPS: &[(&str, ComparisonOp)] = &[
    ("StringEquals", ComparisonOp::StringEquals),
    ("StringGreaterThan", ComparisonOp::StringGreaterThan),
    ("StringLessThan", ComparisonOp::StringLessThan),
    ("StringGreaterThanEquals", ComparisonOp::StringGreaterThanEquals),
    ("StringLessThanEquals", ComparisonOp::StringLessThanEquals),
    ("NumericEquals", ComparisonOp::NumericEquals),
    ("NumericGreaterThan", ComparisonOp::NumericGreaterThan),
    ("NumericLessThan", ComparisonOp::NumericLessThan),
    ("NumericGreaterThanEquals", ComparisonOp::NumericGreaterThanEquals),
    ("NumericLessThanEquals", ComparisonOp::NumericLessThanEquals),
    ("BooleanEquals", ComparisonOp::BooleanEquals),
    ("IsPresent", ComparisonOp::IsPresent),
    ("IsNull", ComparisonOp::IsNull),
    ("IsString", ComparisonOp::IsString),
    ("IsNumeric", ComparisonOp::IsNumeric),
    ("IsBoolean", ComparisonOp::IsBoolean),
    ("TimestampEquals", ComparisonOp::TimestampEquals),
    ("TimestampGreaterThan", ComparisonOp::TimestampGreaterThan),
    ("TimestampLessThan", ComparisonOp::TimestampLessThan),
    ("TimestampGreaterThanEquals", ComparisonOp::TimestampGreaterThanEquals),
    ("TimestampLessThanEquals", ComparisonOp::TimestampLessThanEquals),
];

fn extract_comparison(obj: &serde_json::Map<String, Value>) -> Result<(ComparisonOp, Value), WorkflowError> {
    for (key, op) in COMPARISON_OPS {
        if let Some(value) = obj.get(*key) {
            return Ok((*op, value.clone()));
        }
    }
    Err(WorkflowError::Parse("choice rule has no recognized comparison operator".to_string()))
}

fn parse_wait_state(data: &Value) -> WaitState {
    WaitState {
        next: str_field(data, "Next"),
        end: bool_field(data, "End"),
        seconds: data.get("Seconds").and_then(Value::as_f64),
        timestamp: str_field(data, "Timestamp"),
        seconds_path: str_field(data, "SecondsPath"),
        timestamp_path: str_field(data, "TimestampPath"),
        input_path: path_field(data, "InputPath"),
        output_path: path_field(data, "OutputPath"),
    }
}

fn parse_parallel_state(data: &Value) -> Result<ParallelState, WorkflowError> {
    let branches = data
        .get("Branches")
        .and_then(Value::as_array)
        .ok_or_else(|| WorkflowError::Parse("Parallel state missing required field Branches".to_string()))?
        .iter()
        .map(parse_state_machine)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ParallelState {
        branches,
        next: str_field(data, "Next"),
        end: bool_field(data, "End"),
        input_path: path_field(data, "InputPath"),
        output_path: path_field(data, "OutputPath"),
        result_path: path_field(data, "ResultPath"),
        result_selector: data.get("ResultSelector").cloned(),
        retry: parse_retry_list(data)?,
        catch: parse_catch_list(data)?,
    })
}

fn parse_map_state(data: &Value) -> Result<MapState, WorkflowError> {
    let iterator_data = data.get("Iterator").ok_or_else(|| WorkflowError::Parse("Map state missing required field Iterator".to_string()))?;
    let iterator = parse_state_machine(iterator_data)?;
    Ok(MapState {
        iterator,
        items_path: path_field(data, "ItemsPath"),
        max_concurrency: data.get("MaxConcurrency").and_then(Value::as_u64).unwrap_or(0) as usize,
        next: str_field(data, "Next"),
        end: bool_field(data, "End"),
        input_path: path_field(data, "InputPath"),
        output_path: path_field(data, "OutputPath"),
        result_path: path_field(data, "ResultPath"),
        parameters: data.get("Parameters").cloned(),
        result_selector: data.get("ResultSelector").cloned(),
        retry: parse_retry_list(data)?,
        catch: parse_catch_list(data)?,
    })
}

fn parse_pass_state(data: &Value) -> PassState {
    PassState {
        result: data.get("Result").cloned(),
        next: str_field(data, "Next"),
        end: bool_field(data, "End"),
        input_path: path_field(data, "InputPath"),
        output_path: path_field(data, "OutputPath"),
        result_path: path_field(data, "ResultPath"),
        parameters: data.get("Parameters").cloned(),
    }
}

fn parse_succeed_state(data: &Value) -> SucceedState {
    SucceedState { input_path: path_field(data, "InputPath"), output_path: path_field(data, "OutputPath") }
}

fn parse_fail_state(data: &Value) -> FailState {
    FailState { error: str_field(data, "Error"), cause: str_field(data, "Cause") }
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
