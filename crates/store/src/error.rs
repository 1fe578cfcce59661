// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors the document-store engine raises (spec.md §7): not-found and
//! conflict are service-specific codes at the wire layer, so this stays a
//! small internal taxonomy the adaptor maps onto HTTP status and `__type`.

use lc_expr::ExprError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("table {0:?} not found")]
    TableNotFound(String),

    #[error("table {0:?} already exists")]
    TableAlreadyExists(String),

    #[error("secondary index {0:?} not found")]
    IndexNotFound(String),

    #[error("item is missing required key attribute {0:?}")]
    MissingKeyAttribute(String),

    #[error("validation error: {0}")]
    Validation(String),

    #[error("the conditional request failed")]
    ConditionalCheckFailed,

    #[error("transaction cancelled: {0:?}")]
    TransactionCancelled(Vec<Option<String>>),

    #[error(transparent)]
    Expr(#[from] ExprError),
}
