// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Event-type glob matching shared by every dispatcher: `*` after the
//! colon matches any sub-type (spec.md §4.8), e.g. `ObjectCreated:*`
//! matches `ObjectCreated:Put` and `ObjectCreated:CompleteMultipartUpload`.

/// Does `event_type` match `pattern`? Exact string match unless `pattern`
/// ends in `:*`, in which case only the prefix before the colon must
/// match.
pub fn event_type_matches(pattern: &str, event_type: &str) -> bool {
    match pattern.strip_suffix(":*") {
        Some(prefix) => event_type
            .split_once(':')
            .map(|(event_prefix, _)| event_prefix == prefix)
            .unwrap_or(false),
        None => pattern == event_type,
    }
}

#[cfg(test)]
#[path = "glob_tests.rs"]
mod tests;
