// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Total evaluation of a parsed filter/key-condition [`Expr`] against an
//! item (spec.md §4.4.2, §8: "evaluation returns true or false on any
//! item, never raises"). Comparisons, `BETWEEN`, and `IN` against a
//! missing attribute are false, never an error.

use std::cmp::Ordering;

use indexmap::IndexMap;
use lc_core::AttributeValue;

use crate::ast::{CmpOp, Expr, FunctionCall, FunctionName, Operand, Path, PathSegment};

pub type Item = IndexMap<String, AttributeValue>;

/// Name (`#alias` -> real attribute name) and value (`:alias` -> typed
/// value) substitution maps supplied by the caller, keyed without their
/// sigil (i.e. `names["p"]`, not `names["#p"]`).
pub struct Context<'a> {
    pub names: &'a IndexMap<String, String>,
    pub values: &'a IndexMap<String, AttributeValue>,
}

impl<'a> Context<'a> {
    pub fn empty(names: &'a IndexMap<String, String>, values: &'a IndexMap<String, AttributeValue>) -> Self {
        Context { names, values }
    }

    fn resolve_key<'k>(&self, key: &'k str) -> &'k str
    where
        'a: 'k,
    {
        match key.strip_prefix('#') {
            Some(alias) => self.names.get(alias).map(|s| s.as_str()).unwrap_or(key),
            None => key,
        }
    }
}

/// Resolve one path-segment key against `ctx.names` if it carries a `#`
/// sigil; otherwise returns it unchanged. Exposed for [`crate::keycond`],
/// which needs to compare a path's resolved name against the table's key
/// schema without walking an item.
pub fn resolve_attr_name(key: &str, ctx: &Context) -> String {
    ctx.resolve_key(key).to_string()
}

/// Walk `path` through `item`, resolving `#alias` key segments against
/// `ctx.names`. Returns `None` if any segment is missing or the value at
/// any intermediate step isn't the expected container shape.
pub fn resolve_path(item: &Item, path: &Path, ctx: &Context) -> Option<AttributeValue> {
    let mut segments = path.iter();
    let first = segments.next()?;
    let mut current: &AttributeValue = match first {
        PathSegment::Key(k) => item.get(ctx.resolve_key(k))?,
        PathSegment::Index(_) => return None,
    };
    for seg in segments {
        current = match seg {
            PathSegment::Key(k) => match current {
                AttributeValue::M(map) => map.get(ctx.resolve_key(k))?,
                _ => return None,
            },
            PathSegment::Index(idx) => match current {
                AttributeValue::L(items) => items.get(*idx)?,
                _ => return None,
            },
        };
    }
    Some(current.clone())
}

/// Evaluate one [`Operand`] against `item`. Exposed for [`crate::keycond`]
/// consumers that need to resolve a [`crate::keycond::KeyConditionBounds`]
/// value operand (always a value-ref or literal per the key-condition
/// grammar, never a path) without an item in hand.
pub fn eval_operand(operand: &Operand, item: &Item, ctx: &Context) -> Option<AttributeValue> {
    match operand {
        Operand::Path(path) => resolve_path(item, path, ctx),
        Operand::ValueRef(name) => ctx.values.get(name).cloned(),
        Operand::Literal(v) => Some(v.clone()),
        Operand::Function(call) => eval_function(call, item, ctx),
    }
}

fn eval_function(call: &FunctionCall, item: &Item, ctx: &Context) -> Option<AttributeValue> {
    match call.name {
        FunctionName::Size => {
            let size = call.args.first().and_then(|a| eval_operand(a, item, ctx)).map(|v| v.size()).unwrap_or(0);
            Some(AttributeValue::N(size.to_string()))
        }
        FunctionName::AttributeExists => {
            let exists = call.args.first().is_some_and(|a| eval_operand(a, item, ctx).is_some());
            Some(AttributeValue::Bool(exists))
        }
        FunctionName::AttributeNotExists => {
            let missing = call.args.first().is_none_or(|a| eval_operand(a, item, ctx).is_none());
            Some(AttributeValue::Bool(missing))
        }
        FunctionName::BeginsWith => {
            let prefix_matches = match (
                call.args.first().and_then(|a| eval_operand(a, item, ctx)),
                call.args.get(1).and_then(|a| eval_operand(a, item, ctx)),
            ) {
                (Some(AttributeValue::S(s)), Some(AttributeValue::S(prefix))) => s.starts_with(&prefix),
                _ => false,
            };
            Some(AttributeValue::Bool(prefix_matches))
        }
        FunctionName::Contains => {
            let found = match call.args.first().and_then(|a| eval_operand(a, item, ctx)) {
                Some(haystack) => match call.args.get(1).and_then(|a| eval_operand(a, item, ctx)) {
                    Some(needle) => haystack.contains(&needle),
                    None => false,
                },
                None => false,
            };
            Some(AttributeValue::Bool(found))
        }
    }
}

fn compare(op: CmpOp, lhs: Option<AttributeValue>, rhs: Option<AttributeValue>) -> bool {
    let (Some(l), Some(r)) = (lhs, rhs) else {
        return false;
    };
    match op {
        CmpOp::Eq => l.loose_eq(&r),
        CmpOp::Ne => !l.loose_eq(&r),
        CmpOp::Lt => l.partial_cmp_loose(&r) == Some(Ordering::Less),
        CmpOp::Gt => l.partial_cmp_loose(&r) == Some(Ordering::Greater),
        CmpOp::Le => matches!(l.partial_cmp_loose(&r), Some(Ordering::Less | Ordering::Equal)),
        CmpOp::Ge => matches!(l.partial_cmp_loose(&r), Some(Ordering::Greater | Ordering::Equal)),
    }
}

/// Evaluate `expr` against `item`, total over any syntactically valid
/// expression: never panics, never returns an error.
pub fn eval_bool(expr: &Expr, item: &Item, ctx: &Context) -> bool {
    match expr {
        Expr::And(l, r) => eval_bool(l, item, ctx) && eval_bool(r, item, ctx),
        Expr::Or(l, r) => eval_bool(l, item, ctx) || eval_bool(r, item, ctx),
        Expr::Not(e) => !eval_bool(e, item, ctx),
        Expr::Compare { op, l, r } => compare(*op, eval_operand(l, item, ctx), eval_operand(r, item, ctx)),
        Expr::Between { operand, low, high } => {
            let v = eval_operand(operand, item, ctx);
            let lo = eval_operand(low, item, ctx);
            let hi = eval_operand(high, item, ctx);
            let (Some(v), Some(lo), Some(hi)) = (v, lo, hi) else {
                return false;
            };
            matches!(v.partial_cmp_loose(&lo), Some(Ordering::Greater | Ordering::Equal))
                && matches!(v.partial_cmp_loose(&hi), Some(Ordering::Less | Ordering::Equal))
        }
        Expr::In { operand, list } => {
            let Some(v) = eval_operand(operand, item, ctx) else {
                return false;
            };
            // An empty value list is always false (spec.md §8 boundary
            // behaviour), which `any()` over an empty iterator gives for
            // free.
            list.iter().any(|candidate| eval_operand(candidate, item, ctx).is_some_and(|c| c.loose_eq(&v)))
        }
        Expr::Predicate(call) => matches!(eval_function(call, item, ctx), Some(AttributeValue::Bool(true))),
    }
}

#[cfg(test)]
#[path = "eval_tests.rs"]
mod tests;
