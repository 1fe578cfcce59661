// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Errors raised by the dependency graph and the orchestrator (spec.md
//! §4.1, §4.2, §7). Startup failures are fatal; cycle and duplicate
//! registration are validation errors surfaced before anything starts.

use lc_core::ResourceId;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("provider {0} is already registered")]
    DuplicateProvider(ResourceId),

    #[error("provider {0} is not registered")]
    UnknownProvider(ResourceId),

    #[error("dependency graph has a cycle: {0:?}")]
    Cycle(Vec<ResourceId>),

    #[error("edge references unknown node {0}")]
    DanglingEdge(String),

    #[error("provider {provider} failed to start: {cause}")]
    StartupFailed { provider: ResourceId, cause: String },

    #[error("provider {0} is not running")]
    ProviderNotRunning(ResourceId),
}
