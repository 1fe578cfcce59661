// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JSONPath subset the interpreter uses to shape state input/output
//! (spec.md §4.5.2): `$`, `$.key`, `$.key.nested`, `$.arr[0]`. No
//! wildcards, filters, or slices.

use serde_json::{Map, Value};

use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Segment<'a> {
    Key(&'a str),
    Index(usize),
}

fn parse_segments(path: &str) -> Result<Vec<Segment<'_>>, WorkflowError> {
    let rest = path.strip_prefix('$').ok_or_else(|| WorkflowError::Parse(format!("path {path:?} must start with $")))?;
    let mut segments = Vec::new();
    let mut chars = rest.char_indices().peekable();
    while let Some(&(i, c)) = chars.peek() {
        match c {
            '.' => {
                chars.next();
                let start = i + 1;
                let mut end = start;
                while let Some(&(j, c)) = chars.peek() {
                    if c == '.' || c == '[' {
                        break;
                    }
                    end = j + c.len_utf8();
                    chars.next();
                }
                if start == end {
                    return Err(WorkflowError::Parse(format!("empty path segment in {path:?}")));
                }
                segments.push(Segment::Key(&rest[start..end]));
            }
            '[' => {
                chars.next();
                let start = i + 1;
                let mut end = start;
                while let Some(&(j, c)) = chars.peek() {
                    if c == ']' {
                        break;
                    }
                    end = j + c.len_utf8();
                    chars.next();
                }
                chars.next();
                let idx: usize = rest[start..end].parse().map_err(|_| WorkflowError::Parse(format!("bad array index in {path:?}")))?;
                segments.push(Segment::Index(idx));
            }
            _ => return Err(WorkflowError::Parse(format!("unsupported path syntax in {path:?}"))),
        }
    }
    Ok(segments)
}

fn get_path<'a>(data: &'a Value, path: &str) -> Result<&'a Value, WorkflowError> {
    if path == "$" {
        return Ok(data);
    }
    let segments = parse_segments(path)?;
    let mut current = data;
    for seg in segments {
        current = match seg {
            Segment::Key(key) => current
                .as_object()
                .and_then(|m| m.get(key))
                .ok_or_else(|| WorkflowError::Parse(format!("path {path:?} references missing key {key:?}")))?,
            Segment::Index(idx) => current
                .as_array()
                .and_then(|a| a.get(idx))
                .ok_or_else(|| WorkflowError::Parse(format!("path {path:?} references out-of-range index {idx}")))?,
        };
    }
    Ok(current)
}

/// Selects the subtree at `path`. A `None` path yields an empty map; a
/// missing key along the way is an error (spec.md §4.5.2).
pub fn input_path(data: &Value, path: Option<&str>) -> Result<Value, WorkflowError> {
    match path {
        None => Ok(Value::Object(Map::new())),
        Some(path) => get_path(data, path).cloned(),
    }
}

/// Shapes the value that leaves a state. Same semantics as `input_path`.
pub fn output_path(data: &Value, path: Option<&str>) -> Result<Value, WorkflowError> {
    input_path(data, path)
}

/// Places `result` relative to `input` at `path`: `None` discards the
/// result (input passes through unchanged); `$` replaces the input
/// outright; `$.a.b` places the result there, preserving the rest of the
/// input (spec.md §4.5.2).
pub fn result_path(input: &Value, result: Value, path: Option<&str>) -> Result<Value, WorkflowError> {
    let Some(path) = path else { return Ok(input.clone()) };
    if path == "$" {
        return Ok(result);
    }
    let segments = parse_segments(path)?;
    let mut out = input.clone();
    set_path(&mut out, &segments, result)?;
    Ok(out)
}

fn set_path(root: &mut Value, segments: &[Segment<'_>], value: Value) -> Result<(), WorkflowError> {
    let Some((first, rest)) = segments.split_first() else {
        *root = value;
        return Ok(());
    };
    match first {
        Segment::Key(key) => {
            if !root.is_object() {
                *root = Value::Object(Map::new());
            }
            let Value::Object(obj) = root else { unreachable!() };
            if rest.is_empty() {
                obj.insert((*key).to_string(), value);
            } else {
                let entry = obj.entry((*key).to_string()).or_insert(Value::Object(Map::new()));
                set_path(entry, rest, value)?;
            }
        }
        Segment::Index(idx) => {
            if !root.is_array() {
                *root = Value::Array(Vec::new());
            }
            let Value::Array(arr) = root else { unreachable!() };
            while arr.len() <= *idx {
                arr.push(Value::Null);
            }
            if rest.is_empty() {
                arr[*idx] = value;
            } else {
                set_path(&mut arr[*idx], rest, value)?;
            }
        }
    }
    Ok(())
}

/// Walks `template`; any key ending in `.$` is replaced by the value its
/// string-value path resolves to in `data`; other values are kept
/// literally (spec.md §4.5.2).
pub fn parameters(template: &Value, data: &Value) -> Result<Value, WorkflowError> {
    resolve_template(template, data, None)
}

/// Like `parameters`, but string values starting with `$$.` resolve
/// against `ctx` (the execution's context object) instead of `data`.
pub fn context_parameters(template: &Value, data: &Value, ctx: &Value) -> Result<Value, WorkflowError> {
    resolve_template(template, data, Some(ctx))
}

fn resolve_template(template: &Value, data: &Value, ctx: Option<&Value>) -> Result<Value, WorkflowError> {
    match template {
        Value::Object(obj) => {
            let mut out = Map::new();
            for (key, value) in obj {
                if let Some(field) = key.strip_suffix(".$") {
                    let path = value.as_str().ok_or_else(|| WorkflowError::Parse(format!("{key:?} must have a string path value")))?;
                    let resolved = if let (Some(ctx), Some(cpath)) = (ctx, path.strip_prefix("$$")) {
                        get_path(ctx, &format!("${cpath}"))?.clone()
                    } else {
                        get_path(data, path)?.clone()
                    };
                    out.insert(field.to_string(), resolved);
                } else {
                    out.insert(key.clone(), resolve_template(value, data, ctx)?);
                }
            }
            Ok(Value::Object(out))
        }
        Value::Array(arr) => Ok(Value::Array(arr.iter().map(|v| resolve_template(v, data, ctx)).collect::<Result<_, _>>()?)),
        other => Ok(other.clone()),
    }
}

#[cfg(test)]
#[path = "path_tests.rs"]
mod tests;
