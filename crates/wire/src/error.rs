// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The error envelope every adaptor dialect converges on (spec.md §7).
//!
//! Typed-JSON services reply with this shape verbatim; form-action
//! (XML) services translate [`ErrorKind`] into their own `<Error>` element.
//! Either way the core only ever hands the adaptor an [`ErrorEnvelope`].

use serde::{Deserialize, Serialize};

/// The taxonomy from spec.md §7, minus the HTTP status (carried alongside,
/// not inside, the envelope — the adaptor decides whether that status is
/// spelled `404` or `<Error><Code>`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    NotFound,
    Conflict,
    DependentFailure,
    Internal,
}

impl ErrorKind {
    /// The HTTP status an adaptor should use for this class of error.
    /// Conflict is usually 409 but some dialects (DynamoDB) use 400 for it;
    /// adaptors that need the narrower mapping should match on the
    /// service-specific `__type` instead of relying on this default.
    pub fn default_http_status(self) -> u16 {
        match self {
            ErrorKind::Validation => 400,
            ErrorKind::NotFound => 404,
            ErrorKind::Conflict => 409,
            ErrorKind::DependentFailure => 400,
            ErrorKind::Internal => 500,
        }
    }
}

/// `{"__type": "<Code>", "message": "<text>"}` — the typed-JSON error body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    #[serde(rename = "__type")]
    pub code: String,
    pub message: String,
}

impl ErrorEnvelope {
    pub fn new(code: impl Into<String>, message: impl Into<String>) -> Self {
        ErrorEnvelope { code: code.into(), message: message.into() }
    }
}

#[cfg(test)]
#[path = "error_tests.rs"]
mod tests;
