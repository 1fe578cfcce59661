// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn star_suffix_matches_any_subtype() {
    assert!(event_type_matches("ObjectCreated:*", "ObjectCreated:Put"));
    assert!(event_type_matches("ObjectCreated:*", "ObjectCreated:CompleteMultipartUpload"));
    assert!(!event_type_matches("ObjectCreated:*", "ObjectRemoved:Delete"));
}

#[test]
fn exact_pattern_requires_exact_match() {
    assert!(event_type_matches("ObjectRemoved:Delete", "ObjectRemoved:Delete"));
    assert!(!event_type_matches("ObjectRemoved:Delete", "ObjectRemoved:DeleteMarkerCreated"));
}

#[test]
fn pattern_without_colon_never_matches_star_form() {
    assert!(!event_type_matches("ObjectCreated:*", "ObjectCreatedPut"));
}
