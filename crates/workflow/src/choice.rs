// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Evaluates a Choice state's rules against the current state input
//! (spec.md §4.5.3). A missing variable or a type mismatch makes a leaf
//! rule false rather than raising; the first matching rule's `Next` wins.

use chrono::DateTime;
use serde_json::Value;

use crate::ast::{ChoiceRule, ChoiceRuleKind, ChoiceState, ComparisonOp};
use crate::error::WorkflowError;
use crate::path;

/// Resolves the `Next` state for a Choice, or `States.NoChoiceMatched` if
/// no rule matches and there is no `Default`.
pub fn resolve_next(choice: &ChoiceState, input: &Value) -> Result<String, WorkflowError> {
    for rule in &choice.choices {
        if evaluate_rule(rule, input) {
            return Ok(rule.next_state.clone());
        }
    }
    choice.default.clone().ok_or_else(WorkflowError::no_choice_matched)
}

fn evaluate_rule(rule: &ChoiceRule, input: &Value) -> bool {
    match &rule.kind {
        ChoiceRuleKind::And(rules) => rules.iter().all(|r| evaluate_rule(r, input)),
        ChoiceRuleKind::Or(rules) => rules.iter().any(|r| evaluate_rule(r, input)),
        ChoiceRuleKind::Not(inner) => !evaluate_rule(inner, input),
        ChoiceRuleKind::Leaf { variable, operator, value } => {
            let actual = path::input_path(input, Some(variable)).ok();
            evaluate_leaf(*operator, actual.as_ref(), value)
        }
    }
}

fn evaluate_leaf(op: ComparisonOp, actual: Option<&Value>, expected: &Value) -> bool {
    match op {
        ComparisonOp::IsPresent => {
            let want_present = expected.as_bool().unwrap_or(true);
            actual.is_some() == want_present
        }
        ComparisonOp::IsNull => actual.is_some_and(Value::is_null) == expected.as_bool().unwrap_or(true),
        ComparisonOp::IsString => actual.is_some_and(Value::is_string) == expected.as_bool().unwrap_or(true),
        ComparisonOp::IsNumeric => actual.is_some_and(Value::is_number) == expected.as_bool().unwrap_or(true),
        ComparisonOp::IsBoolean => actual.is_some_and(Value::is_boolean) == expected.as_bool().unwrap_or(true),
        _ => {
            let Some(actual) = actual else { return false };
            match op {
                ComparisonOp::StringEquals | ComparisonOp::StringGreaterThan | ComparisonOp::StringLessThan
                | ComparisonOp::StringGreaterThanEquals | ComparisonOp::StringLessThanEquals => {
                    compare_strings(op, actual, expected)
                }
                ComparisonOp::NumericEquals | ComparisonOp::NumericGreaterThan | ComparisonOp::NumericLessThan
                | ComparisonOp::NumericGreaterThanEquals | ComparisonOp::NumericLessThanEquals => {
                    compare_numbers(op, actual, expected)
                }
                ComparisonOp::BooleanEquals => match (actual.as_bool(), expected.as_bool()) {
                    (Some(a), Some(b)) => a == b,
                    _ => false,
                },
                ComparisonOp::TimestampEquals | ComparisonOp::TimestampGreaterThan | ComparisonOp::TimestampLessThan
                | ComparisonOp::TimestampGreaterThanEquals | ComparisonOp::TimestampLessThanEquals => {
                    compare_timestamps(op, actual, expected)
                }
                ComparisonOp::IsPresent | ComparisonOp::IsNull | ComparisonOp::IsString | ComparisonOp::IsNumeric | ComparisonOp::IsBoolean => {
                    unreachable!("handled above")
                }
            }
        }
    }
}

fn compare_strings(op: ComparisonOp, actual: &Value, expected: &Value) -> bool {
    let (Some(a), Some(b)) = (actual.as_str(), expected.as_str()) else { return false };
    match op {
        ComparisonOp::StringEquals => a == b,
        ComparisonOp::StringGreaterThan => a > b,
        ComparisonOp::StringLessThan => a < b,
        ComparisonOp::StringGreaterThanEquals => a >= b,
        ComparisonOp::StringLessThanEquals => a <= b,
        _ => false,
    }
}

fn compare_numbers(op: ComparisonOp, actual: &Value, expected: &Value) -> bool {
    let (Some(a), Some(b)) = (actual.as_f64(), expected.as_f64()) else { return false };
    match op {
        ComparisonOp::NumericEquals => a == b,
        ComparisonOp::NumericGreaterThan => a > b,
        ComparisonOp::NumericLessThan => a < b,
        ComparisonOp::NumericGreaterThanEquals => a >= b,
        ComparisonOp::NumericLessThanEquals => a <= b,
        _ => false,
    }
}

fn compare_timestamps(op: ComparisonOp, actual: &Value, expected: &Value) -> bool {
    let (Some(a), Some(b)) = (actual.as_str(), expected.as_str()) else { return false };
    let (Ok(a), Ok(b)) = (DateTime::parse_from_rfc3339(a), DateTime::parse_from_rfc3339(b)) else { return false };
    match op {
        ComparisonOp::TimestampEquals => a == b,
        ComparisonOp::TimestampGreaterThan => a > b,
        ComparisonOp::TimestampLessThan => a < b,
        ComparisonOp::TimestampGreaterThanEquals => a >= b,
        ComparisonOp::TimestampLessThanEquals => a <= b,
        _ => false,
    }
}

#[cfg(test)]
#[path = "choice_tests.rs"]
mod tests;
