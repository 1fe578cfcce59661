// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The retry/catch policy executor (spec.md §4.5.5): on a task error, try
//! each `RetryConfig` in order with exponential backoff, then fall back to
//! each `CatchConfig` in order, placing the caught error at `ResultPath`.

use std::time::Duration;

use crate::ast::{CatchConfig, RetryConfig};

/// `States.ALL` matches any error code (spec.md §4.5.5).
const MATCH_ALL: &str = "States.ALL";

fn error_matches(error_equals: &[String], error_code: &str) -> bool {
    error_equals.iter().any(|e| e == MATCH_ALL || e == error_code)
}

/// The first `RetryConfig` whose `error_equals` matches `error_code` and
/// whose attempt counter (0-indexed, `attempts_so_far`) is still below
/// `max_attempts`, along with the backoff delay for this attempt
/// (spec.md §4.5.5, step 1: `interval * backoff_rate^attempt`).
pub fn matching_retry<'a>(retries: &'a [RetryConfig], error_code: &str, attempts_so_far: u32) -> Option<(&'a RetryConfig, Duration)> {
    retries.iter().find_map(|r| {
        if !error_matches(&r.error_equals, error_code) || attempts_so_far >= r.max_attempts {
            return None;
        }
        let delay_secs = r.interval_seconds * r.backoff_rate.powi(attempts_so_far as i32);
        Some((r, Duration::from_secs_f64(delay_secs.max(0.0))))
    })
}

/// The first `CatchConfig` whose `error_equals` matches `error_code`
/// (spec.md §4.5.5, step 2).
pub fn matching_catch<'a>(catches: &'a [CatchConfig], error_code: &str) -> Option<&'a CatchConfig> {
    catches.iter().find(|c| error_matches(&c.error_equals, error_code))
}

#[cfg(test)]
#[path = "retry_tests.rs"]
mod tests;
