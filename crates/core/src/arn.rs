// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! ARN formatting. A single placeholder account and region are hardcoded
//! into every ARN minted here
//! (`arn:aws:states:us-east-1:000000000000:stateMachine:{name}`) rather
//! than inventing per-instance account IDs nothing downstream ever
//! checks.

use std::fmt;

pub const DEFAULT_ACCOUNT_ID: &str = "000000000000";
pub const DEFAULT_REGION: &str = "us-east-1";

/// A minted Amazon-Resource-Name-shaped identifier.
///
/// `Arn` never validates the partition/service/resource strings passed to
/// it; it only formats them consistently. Callers own the responsibility
/// of using the right service namespace and resource-type segment.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Arn(String);

impl Arn {
    /// Builds `arn:aws:{service}:{region}:{account_id}:{resource}`.
    pub fn new(service: &str, resource: impl fmt::Display) -> Self {
        Arn(format!(
            "arn:aws:{service}:{region}:{account}:{resource}",
            service = service,
            region = DEFAULT_REGION,
            account = DEFAULT_ACCOUNT_ID,
            resource = resource,
        ))
    }

    /// Builds an ARN with an explicit resource-type segment, e.g.
    /// `arn:aws:states:us-east-1:000000000000:stateMachine:my-machine`.
    pub fn with_resource_type(service: &str, resource_type: &str, name: &str) -> Self {
        Arn::new(service, format_args!("{resource_type}:{name}"))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Arn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for Arn {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
#[path = "arn_tests.rs"]
mod tests;
