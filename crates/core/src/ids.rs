// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-provider identifiers minted by the event fabric and the workflow
//! engine (spec.md §3 "Event fabric entities", "Workflow entities"),
//! reusing the `define_id!`/`IdBuf` pattern rather than inventing a
//! second ID scheme.

crate::define_id! {
    /// Identifies one workflow execution (spec.md §3 "Execution").
    pub struct ExecutionId("exec");
}

crate::define_id! {
    /// Identifies one pub/sub subscription (spec.md §3 "Subscription").
    pub struct SubscriptionId("subs");
}

crate::define_id! {
    /// Identifies one event-source mapping binding a queue or stream to a
    /// compute target (spec.md §3 "Event-source mapping").
    pub struct EventSourceMappingId("esm-");
}

#[cfg(test)]
#[path = "ids_tests.rs"]
mod tests;
