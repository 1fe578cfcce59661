// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The fields a presigned object-store URL carries in its query string
//! (spec.md §4.3, §6). `lc-providers::object_store` computes and verifies
//! the HMAC signature; this crate only pins the field shape so an HTTP
//! adaptor can serialize/parse the query string consistently.
//!
//! Per spec.md §9 Open Question 3, this is HMAC-SHA256 over a canonical
//! string, not SigV4-compatible.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresignedUrlFields {
    pub method: String,
    pub bucket: String,
    pub key: String,
    /// Unix seconds at which the URL stops validating.
    pub expires_at: u64,
    /// Hex-encoded HMAC-SHA256 signature over the canonical string.
    pub signature: String,
}

impl PresignedUrlFields {
    /// The canonical string signed and verified: method, bucket, key, and
    /// expiry joined by newlines. Stable field order matters — it is what
    /// both `sign` and `validate` hash.
    pub fn canonical_string(method: &str, bucket: &str, key: &str, expires_at: u64) -> String {
        format!("{method}\n{bucket}\n{key}\n{expires_at}")
    }
}

#[cfg(test)]
#[path = "presign_tests.rs"]
mod tests;
