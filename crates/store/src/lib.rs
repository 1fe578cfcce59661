// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lc-store: the document-store engine (spec.md §2 "L2 Providers" /
//! §4.4) — persistent table storage with secondary indexes, batch and
//! transactional writes, and a change-stream dispatcher, built on
//! `lc-expr` for query/update evaluation.

mod engine;
mod error;
mod key;
mod persistence;
mod provider;
mod stream;
mod table;
mod types;

pub use engine::{BatchWriteOp, DocumentStore, ExprContext, TransactWriteOp};
pub use error::StoreError;
pub use provider::DocumentTableProvider;
pub use stream::StreamHandler;
pub use types::{GsiDef, KeySchema, StreamConfig, StreamEventName, StreamRecord, StreamViewType, TableDef};

pub use lc_expr::Item;
