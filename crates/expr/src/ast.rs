// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The filter/key-condition AST (spec.md §9 "Expression AST"): a tagged
//! union over node kinds. Update-expression node types live in
//! [`crate::update`] since that dialect's grammar and semantics are
//! distinct enough to warrant their own tree.

use lc_core::AttributeValue;

/// One segment of a dotted attribute path. `Key` carries the raw token
/// text, which may itself be a `#name` placeholder requiring resolution
/// against the caller's name map at evaluation time.
#[derive(Debug, Clone, PartialEq)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

pub type Path = Vec<PathSegment>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CmpOp {
    Eq,
    Ne,
    Lt,
    Gt,
    Le,
    Ge,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FunctionName {
    AttributeExists,
    AttributeNotExists,
    BeginsWith,
    Contains,
    Size,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FunctionCall {
    pub name: FunctionName,
    pub args: Vec<Operand>,
}

/// A value-producing leaf of the filter grammar: `operand ← func_call |
/// value_ref | name_ref | path | literal | "(" expr ")"` (spec.md §4.4.2).
/// Parenthesized sub-expressions are represented directly as [`Expr`] and
/// do not need their own operand variant — they are only ever used where
/// a full boolean expression is expected.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    Path(Path),
    ValueRef(String),
    Literal(AttributeValue),
    Function(FunctionCall),
}

#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Not(Box<Expr>),
    Compare { op: CmpOp, l: Operand, r: Operand },
    Between { operand: Operand, low: Operand, high: Operand },
    In { operand: Operand, list: Vec<Operand> },
    /// A function call used as a standalone predicate, e.g.
    /// `attribute_exists(#p)` or `contains(#tags, :v)` with no comparison
    /// operator following it.
    Predicate(FunctionCall),
}
