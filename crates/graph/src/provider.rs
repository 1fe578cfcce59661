// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `Provider` lifecycle contract (spec.md §3 "Provider", §4.1) every
//! emulated service implements: a name, a lifecycle state, a health
//! predicate, `start`/`stop`, and an optional post-wire hook for
//! capabilities that need cross-provider references (spec.md §4.1,
//! "call a post-wire hook on each provider whose capability requires
//! cross-references"). Capability-specific methods (put/get, send/receive,
//! publish, invoke, ...) live on each concrete provider type in
//! `lc-providers`, `lc-store`, `lc-workflow`, not on this trait.

use async_trait::async_trait;
use lc_core::LifecycleState;

use crate::registry::Registry;

/// Result alias providers use for lifecycle operations. The error type is
/// a boxed `std::error::Error` rather than `GraphError` because the
/// failure originates in the provider's own domain (a file-system error
/// opening its data directory, say); the orchestrator only needs the
/// message to report a fatal startup failure (spec.md §4.1).
pub type ProviderResult<T> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

#[async_trait]
pub trait Provider: Send + Sync {
    /// Stable name this provider is registered under.
    fn name(&self) -> &str;

    /// Current lifecycle state. The orchestrator polls this; a provider
    /// is responsible for keeping it accurate across `start`/`stop`.
    fn state(&self) -> LifecycleState;

    /// Bring the provider up. Called in dependency order by
    /// `Orchestrator::start_all`. Must leave `state()` at `Running` on
    /// success, `Error` on failure.
    async fn start(&self) -> ProviderResult<()>;

    /// Tear the provider down. Called in reverse dependency order.
    /// Errors are logged by the orchestrator and never block subsequent
    /// stops (spec.md §4.1).
    async fn stop(&self) -> ProviderResult<()>;

    /// Health predicate (spec.md §4.1, "call each provider's health
    /// predicate"). Default defers to the lifecycle state; providers with
    /// a real liveness check (e.g. pinging a subprocess) override this.
    async fn health(&self) -> bool {
        self.state().is_serviceable()
    }

    /// Called once, after every provider in the dependency graph has
    /// reached `Running`, for providers whose capability needs
    /// cross-provider references resolved via the registry (compute
    /// needs the registry; pubsub needs the queue provider; workflow
    /// needs compute — spec.md §4.1). Default no-op for providers with no
    /// such wiring.
    async fn post_wire(&self, _registry: &Registry) -> ProviderResult<()> {
        Ok(())
    }

    /// Clears all provider-owned state. Exposed for `Orchestrator::reset`
    /// (spec.md §4.1, "never used in normal lifecycle" — test fixtures
    /// and the management `/reset` endpoint are its only callers).
    /// Default no-op; providers with clearable state override this.
    async fn clear_state(&self) -> ProviderResult<()> {
        Ok(())
    }
}
