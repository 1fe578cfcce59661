// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Key-condition validation (spec.md §4.4.2): the same grammar as the
//! filter dialect, but restricted to exactly one equality on the
//! partition key and at most one condition on the sort key. The validated
//! shape is reduced to [`KeyConditionBounds`], which the document-store
//! engine uses to drive an index scan; any further filtering is done by
//! a separate, unrestricted filter expression applied after the scan.

use crate::ast::{CmpOp, Expr, FunctionName, Operand};
use crate::eval::{resolve_attr_name, Context};
use crate::error::ExprError;
use crate::filter::parse_filter;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKeyCmp {
    Eq,
    Lt,
    Gt,
    Le,
    Ge,
    Between,
    BeginsWith,
}

impl SortKeyCmp {
    fn from_cmp_op(op: CmpOp) -> Self {
        match op {
            CmpOp::Eq => SortKeyCmp::Eq,
            CmpOp::Lt => SortKeyCmp::Lt,
            CmpOp::Gt => SortKeyCmp::Gt,
            CmpOp::Le => SortKeyCmp::Le,
            CmpOp::Ge => SortKeyCmp::Ge,
            // `<>` on a sort key has no scan-bound meaning; rejected by
            // the caller before this conversion is ever reached.
            CmpOp::Ne => SortKeyCmp::Eq,
        }
    }
}

/// The extracted scan bounds: the partition key's required value, plus
/// an optional sort-key condition (comparator, and one or two operands —
/// `BETWEEN` carries both a low and a high bound).
#[derive(Debug, Clone)]
pub struct KeyConditionBounds {
    pub partition_value: Operand,
    pub sort: Option<(SortKeyCmp, Operand, Option<Operand>)>,
}

/// Parse and validate a key-condition expression against a table's key
/// schema, producing the bounds an index scan needs.
pub fn parse_key_condition(
    src: &str,
    partition_key: &str,
    sort_key: Option<&str>,
    ctx: &Context,
) -> Result<KeyConditionBounds, ExprError> {
    let expr = parse_filter(src)?;
    let conjuncts = split_conjuncts(&expr);
    if conjuncts.len() > 2 {
        return Err(ExprError::KeyConditionTooManyConditions);
    }

    let mut partition_value = None;
    let mut sort = None;

    for conjunct in conjuncts {
        match conjunct {
            Expr::Compare { op, l, r } => {
                let (path, value) = pick_path_and_value(l, r)?;
                let name = path_name(path, ctx)?;
                if name == partition_key {
                    if *op != CmpOp::Eq {
                        return Err(ExprError::KeyConditionPartitionNotEquality);
                    }
                    if partition_value.replace(value.clone()).is_some() {
                        return Err(ExprError::KeyConditionTooManyConditions);
                    }
                } else if Some(name.as_str()) == sort_key {
                    if sort.replace((SortKeyCmp::from_cmp_op(*op), value.clone(), None)).is_some() {
                        return Err(ExprError::KeyConditionTooManyConditions);
                    }
                } else {
                    return Err(ExprError::UnexpectedToken {
                        pos: 0,
                        found: name,
                        expected: "partition or sort key attribute",
                    });
                }
            }
            Expr::Between { operand, low, high } => {
                let name = path_name(operand, ctx)?;
                if Some(name.as_str()) != sort_key {
                    return Err(ExprError::UnexpectedToken {
                        pos: 0,
                        found: name,
                        expected: "BETWEEN is only valid on the sort key",
                    });
                }
                if sort.replace((SortKeyCmp::Between, low.clone(), Some(high.clone()))).is_some() {
                    return Err(ExprError::KeyConditionTooManyConditions);
                }
            }
            Expr::Predicate(call) if call.name == FunctionName::BeginsWith => {
                let name = path_name(&call.args[0], ctx)?;
                if Some(name.as_str()) != sort_key {
                    return Err(ExprError::UnexpectedToken {
                        pos: 0,
                        found: name,
                        expected: "begins_with is only valid on the sort key",
                    });
                }
                if sort.replace((SortKeyCmp::BeginsWith, call.args[1].clone(), None)).is_some() {
                    return Err(ExprError::KeyConditionTooManyConditions);
                }
            }
            _ => {
                return Err(ExprError::UnexpectedToken {
                    pos: 0,
                    found: format!("{conjunct:?}"),
                    expected: "an equality or supported sort-key comparison",
                })
            }
        }
    }

    let partition_value = partition_value.ok_or(ExprError::KeyConditionMissingPartitionEquality)?;
    Ok(KeyConditionBounds { partition_value, sort })
}

fn split_conjuncts(expr: &Expr) -> Vec<&Expr> {
    match expr {
        Expr::And(l, r) => {
            let mut out = split_conjuncts(l);
            out.extend(split_conjuncts(r));
            out
        }
        other => vec![other],
    }
}

fn pick_path_and_value<'a>(l: &'a Operand, r: &'a Operand) -> Result<(&'a Operand, &'a Operand), ExprError> {
    match (l, r) {
        (Operand::Path(_), _) => Ok((l, r)),
        (_, Operand::Path(_)) => Ok((r, l)),
        _ => Err(ExprError::UnexpectedToken {
            pos: 0,
            found: format!("{l:?} / {r:?}"),
            expected: "one side of a key-condition comparison must be an attribute path",
        }),
    }
}

fn path_name(operand: &Operand, ctx: &Context) -> Result<String, ExprError> {
    match operand {
        Operand::Path(path) if path.len() == 1 => match &path[0] {
            crate::ast::PathSegment::Key(k) => Ok(resolve_attr_name(k, ctx)),
            crate::ast::PathSegment::Index(_) => Err(ExprError::UnexpectedToken {
                pos: 0,
                found: "[index]".to_string(),
                expected: "a bare attribute name",
            }),
        },
        _ => Err(ExprError::UnexpectedToken {
            pos: 0,
            found: format!("{operand:?}"),
            expected: "a bare attribute name",
        }),
    }
}

#[cfg(test)]
#[path = "keycond_tests.rs"]
mod tests;
