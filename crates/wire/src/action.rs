// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `(protocol, action)` dispatch key from spec.md §9 Open Question 2:
//! "An implementer may choose to route both [typed-JSON and form-action]
//! wire formats through a common action-handler table keyed by
//! `(protocol, action)`." This crate defines that key; the (out-of-scope)
//! HTTP adaptor owns the table and the handlers.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Which of the three dispatch rules from spec.md §6 an inbound request
/// used to reach the core.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WireProtocol {
    /// `X-Amz-Target: <Service>.<Action>` + JSON body.
    TypedJson,
    /// `application/x-www-form-urlencoded`, `Action=<name>`.
    FormAction,
    /// RESTful URL shapes (object store, path-proxied document store).
    RestPath,
}

/// A dispatch key identifying one action within one protocol, e.g.
/// `(TypedJson, "PutItem")` and `(FormAction, "SendMessage")` are distinct
/// keys even when the underlying provider operation is the same.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ActionKey {
    pub protocol: WireProtocol,
    pub action: String,
}

impl ActionKey {
    pub fn new(protocol: WireProtocol, action: impl Into<String>) -> Self {
        ActionKey { protocol, action: action.into() }
    }
}

impl fmt::Display for ActionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}/{}", self.protocol, self.action)
    }
}

#[cfg(test)]
#[path = "action_tests.rs"]
mod tests;
