// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lc-expr: the document-store's three expression dialects (spec.md §4.4.2,
//! §4.4.3) — a shared lexer and AST, a recursive-descent parser for the
//! filter/key-condition grammar and a separate one for the update grammar,
//! and evaluators for both.
//!
//! Evaluation is total for the filter dialect (spec.md §8: "evaluation
//! returns true or false on any item, never raises"); only parsing can
//! fail, and parse errors carry the offending token's position (spec.md
//! §7).

mod ast;
mod error;
mod eval;
mod filter;
mod keycond;
mod lexer;
mod update;
mod update_eval;

pub use ast::{CmpOp, Expr, FunctionCall, FunctionName, Operand, Path, PathSegment};
pub use error::ExprError;
pub use eval::{eval_bool, eval_operand, resolve_attr_name, resolve_path, Context, Item};
pub use filter::parse_filter;
pub use keycond::{parse_key_condition, KeyConditionBounds, SortKeyCmp};
pub use update::{
    parse_update, AddAction, ArithOp, DeleteAction, RemoveAction, SetAction, UpdateExpr, ValueAtom, ValueExpr,
};
pub use update_eval::apply_update;
