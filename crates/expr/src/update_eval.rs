// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Applies a parsed [`UpdateExpr`] to an item snapshot (spec.md §4.4.3).
//! All four clause types are applied in a fixed order — SET, REMOVE, ADD,
//! DELETE — against one in-memory snapshot, which the caller then
//! persists atomically. Like the filter dialect, this is total: a missing
//! path reads as `NULL` rather than raising, so two `SET` actions on
//! disjoint paths commute regardless of what either referenced (spec.md
//! §8, "update commutativity within clause order").

use indexmap::IndexMap;
use lc_core::AttributeValue;

use crate::ast::PathSegment;
use crate::eval::{resolve_attr_name, resolve_path, Context, Item};
use crate::update::{ArithOp, UpdateExpr, ValueAtom, ValueExpr};

enum ResolvedSeg {
    Key(String),
    Index(usize),
}

fn resolve_segments(path: &[PathSegment], ctx: &Context) -> Vec<ResolvedSeg> {
    path.iter()
        .map(|seg| match seg {
            PathSegment::Key(k) => ResolvedSeg::Key(resolve_attr_name(k, ctx)),
            PathSegment::Index(i) => ResolvedSeg::Index(*i),
        })
        .collect()
}

pub fn apply_update(item: &mut Item, update: &UpdateExpr, ctx: &Context) {
    for set in &update.sets {
        let segs = resolve_segments(&set.path, ctx);
        let value = eval_value_expr(&set.value, item, ctx);
        set_at(item, &segs, value);
    }
    for remove in &update.removes {
        let segs = resolve_segments(&remove.path, ctx);
        remove_at(item, &segs);
    }
    for add in &update.adds {
        let segs = resolve_segments(&add.path, ctx);
        let addend = eval_value_atom(&add.value, item, ctx);
        let current = get_at(item, &segs);
        let next = match &addend {
            AttributeValue::N(_) => {
                let base = current.as_ref().and_then(|v| v.as_number_coerced().ok()).unwrap_or(0.0);
                let delta = addend.as_number_coerced().unwrap_or(0.0);
                AttributeValue::N(format_number(base + delta))
            }
            AttributeValue::SS(_) | AttributeValue::NS(_) | AttributeValue::BS(_) => match &current {
                Some(existing) => existing.set_union(&addend).unwrap_or_else(|_| addend.clone()),
                None => addend.clone(),
            },
            other => other.clone(),
        };
        set_at(item, &segs, next);
    }
    for delete in &update.deletes {
        let segs = resolve_segments(&delete.path, ctx);
        let subtrahend = eval_value_atom(&delete.value, item, ctx);
        if let Some(current) = get_at(item, &segs) {
            if let Ok(diff) = current.set_difference(&subtrahend) {
                set_at(item, &segs, diff);
            }
            // Missing or non-set target: a no-op, per spec.md §4.4.3.
        }
    }
}

fn format_number(n: f64) -> String {
    if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{}", n as i64)
    } else {
        n.to_string()
    }
}

fn eval_value_expr(ve: &ValueExpr, item: &Item, ctx: &Context) -> AttributeValue {
    let head = eval_value_atom(&ve.head, item, ctx);
    match &ve.tail {
        None => head,
        Some((op, atom)) => {
            let rhs = eval_value_atom(atom, item, ctx);
            let base = head.as_number_coerced().unwrap_or(0.0);
            let delta = rhs.as_number_coerced().unwrap_or(0.0);
            let result = match op {
                ArithOp::Add => base + delta,
                ArithOp::Sub => base - delta,
            };
            AttributeValue::N(format_number(result))
        }
    }
}

fn eval_value_atom(atom: &ValueAtom, item: &Item, ctx: &Context) -> AttributeValue {
    match atom {
        ValueAtom::Path(path) => resolve_path(item, path, ctx).unwrap_or(AttributeValue::Null),
        ValueAtom::ValueRef(name) => ctx.values.get(name).cloned().unwrap_or(AttributeValue::Null),
        ValueAtom::Literal(v) => v.clone(),
        ValueAtom::IfNotExists(path, default) => {
            let segs = resolve_segments(path, ctx);
            match get_at(item, &segs) {
                Some(v) => v,
                None => eval_value_expr(default, item, ctx),
            }
        }
        ValueAtom::ListAppend(a, b) => {
            let to_list = |v: AttributeValue| match v {
                AttributeValue::L(items) => items,
                AttributeValue::Null => Vec::new(),
                other => vec![other],
            };
            let mut out = to_list(eval_value_expr(a, item, ctx));
            out.extend(to_list(eval_value_expr(b, item, ctx)));
            AttributeValue::L(out)
        }
    }
}

fn get_at(item: &Item, segs: &[ResolvedSeg]) -> Option<AttributeValue> {
    let mut iter = segs.iter();
    let first = iter.next()?;
    let mut current = match first {
        ResolvedSeg::Key(k) => item.get(k)?,
        ResolvedSeg::Index(_) => return None,
    };
    for seg in iter {
        current = match seg {
            ResolvedSeg::Key(k) => match current {
                AttributeValue::M(m) => m.get(k)?,
                _ => return None,
            },
            ResolvedSeg::Index(idx) => match current {
                AttributeValue::L(l) => l.get(*idx)?,
                _ => return None,
            },
        };
    }
    Some(current.clone())
}

/// Writes `value` at `segs`, creating intermediate maps as needed (spec.md
/// §4.4.3, "missing intermediates are created as maps"). A top-level
/// `Index` segment (impossible in a well-formed item, whose root is
/// always a map) is a no-op.
fn set_at(item: &mut Item, segs: &[ResolvedSeg], value: AttributeValue) {
    let Some((first, rest)) = segs.split_first() else { return };
    let ResolvedSeg::Key(key) = first else { return };
    if rest.is_empty() {
        item.insert(key.clone(), value);
        return;
    }
    let slot = item.entry(key.clone()).or_insert_with(|| AttributeValue::M(IndexMap::new()));
    set_at_inner(slot, rest, value);
}

fn set_at_inner(container: &mut AttributeValue, segs: &[ResolvedSeg], value: AttributeValue) {
    let Some((first, rest)) = segs.split_first() else { return };
    match first {
        ResolvedSeg::Key(key) => {
            if !matches!(container, AttributeValue::M(_)) {
                *container = AttributeValue::M(IndexMap::new());
            }
            let AttributeValue::M(map) = container else { unreachable!() };
            if rest.is_empty() {
                map.insert(key.clone(), value);
            } else {
                let slot = map.entry(key.clone()).or_insert_with(|| AttributeValue::M(IndexMap::new()));
                set_at_inner(slot, rest, value);
            }
        }
        ResolvedSeg::Index(idx) => {
            if !matches!(container, AttributeValue::L(_)) {
                *container = AttributeValue::L(Vec::new());
            }
            let AttributeValue::L(list) = container else { unreachable!() };
            while list.len() <= *idx {
                list.push(AttributeValue::Null);
            }
            if rest.is_empty() {
                list[*idx] = value;
            } else {
                set_at_inner(&mut list[*idx], rest, value);
            }
        }
    }
}

/// Deletes the leaf at `segs`; missing is a no-op (spec.md §4.4.3).
fn remove_at(item: &mut Item, segs: &[ResolvedSeg]) {
    let Some((first, rest)) = segs.split_first() else { return };
    if rest.is_empty() {
        if let ResolvedSeg::Key(key) = first {
            item.shift_remove(key);
        }
        return;
    }
    let ResolvedSeg::Key(key) = first else { return };
    let Some(container) = item.get_mut(key) else { return };
    remove_at_inner(container, rest);
}

fn remove_at_inner(container: &mut AttributeValue, segs: &[ResolvedSeg]) {
    let Some((first, rest)) = segs.split_first() else { return };
    if rest.is_empty() {
        match (first, container) {
            (ResolvedSeg::Key(key), AttributeValue::M(map)) => {
                map.shift_remove(key);
            }
            (ResolvedSeg::Index(idx), AttributeValue::L(list)) => {
                if *idx < list.len() {
                    list.remove(*idx);
                }
            }
            _ => {}
        }
        return;
    }
    match (first, container) {
        (ResolvedSeg::Key(key), AttributeValue::M(map)) => {
            if let Some(inner) = map.get_mut(key) {
                remove_at_inner(inner, rest);
            }
        }
        (ResolvedSeg::Index(idx), AttributeValue::L(list)) => {
            if let Some(inner) = list.get_mut(*idx) {
                remove_at_inner(inner, rest);
            }
        }
        _ => {}
    }
}

#[cfg(test)]
#[path = "update_eval_tests.rs"]
mod tests;
