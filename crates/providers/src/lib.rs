// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! lc-providers: one provider per emulated service (spec.md §2 "L2
//! Providers", §4.3, §4.6, §4.7, §4.9) plus the compute bridge that ties
//! every event source in the emulator back to compute. The same
//! one-capability-bound-to-several-backends shape an agent-execution
//! adapter crate would use, except here it binds several capabilities
//! (object storage, queueing, pub/sub, event bus, workflow, compute) to
//! the registry `lc-graph` owns.
//!
//! Parameter store, secret store, identity pool, and container-service
//! lifecycle are explicitly out of core scope (spec.md §1, "provider-
//! specific mock stubs ... are external") — this crate exposes the
//! `ProviderError` variants an external stub would need
//! (`NoSuchParameter`, `NoSuchSecret`) but does not implement those
//! services itself.

pub mod compute;
pub mod error;
pub mod event_bus;
pub mod object_store;
pub mod queue;
pub mod topic;
pub mod workflow;

pub use compute::{
    records_envelope, ComputeFunctionProvider, ComputeHandler, FnHandler, InvocationContext, InvokeResult,
    RegistryComputeBridge,
};
pub use error::{ProviderError, ProviderResult};
pub use event_bus::{event_pattern_matches, EventBusProvider, PutEventsEntry, Rule, RuleTarget, DEFAULT_BUS_NAME};
pub use object_store::{
    md5_hex, presign, validate, BucketStorage, GetObjectOutput, ListObjectsOutput, ObjectEvent,
    ObjectEventComputeTarget, ObjectMetadata, ObjectStoreProvider, ObjectSummary,
};
pub use queue::{MessageAttributeValue, QueueConfig, QueueProvider, ReceivedMessage};
pub use topic::{FilterPolicy, Subscription, SubscriptionProtocol, TopicProvider};
pub use workflow::WorkflowProvider;
