// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The object-store provider (spec.md §4.3): bucket CRUD, object
//! put/get/head/delete/list, presigned URLs, and event notifications on
//! create/remove fanning out to compute (spec.md §4.8). Storage is
//! delegated to [`super::storage::BucketStorage`]; this type adds bucket
//! bookkeeping, the notification dispatcher, and the `Provider` lifecycle.

use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lc_core::{Clock, LifecycleState, SystemClock};
use lc_fabric::NotificationDispatcher;
use lc_graph::{Provider, ProviderResult as GraphResult};
use lc_wire::EventSource;
use parking_lot::RwLock;
use serde_json::{json, Value};

use crate::compute::{records_envelope, ComputeFunctionProvider};
use crate::error::{ProviderError, ProviderResult};

use super::presign;
use super::storage::{BucketStorage, GetObjectOutput, ListObjectsOutput, ObjectMetadata};

/// `(event_type, bucket, key)` delivered to a registered notification
/// target. Mirrors an `ObjectCreated:Put` / `ObjectRemoved:Delete`
/// record (spec.md §4.3, §4.8, §6).
#[derive(Debug, Clone)]
pub struct ObjectEvent {
    pub event_type: &'static str,
    pub bucket: String,
    pub key: String,
    pub size: u64,
    pub etag: String,
}

impl ObjectEvent {
    fn to_record_body(&self) -> Value {
        json!({
            "eventName": self.event_type,
            "s3": {
                "bucket": { "name": self.bucket },
                "object": { "key": self.key, "size": self.size, "eTag": self.etag },
            },
        })
    }
}

/// Bridges object-store notifications to a named compute function,
/// invoking it fire-and-forget via the shared [`ComputeFunctionProvider`]
/// (spec.md §4.8, "notifications invoke compute").
pub struct ObjectEventComputeTarget {
    compute: Arc<ComputeFunctionProvider>,
    function_name: String,
}

impl ObjectEventComputeTarget {
    pub fn new(compute: Arc<ComputeFunctionProvider>, function_name: impl Into<String>) -> Self {
        ObjectEventComputeTarget { compute, function_name: function_name.into() }
    }
}

#[async_trait]
impl lc_fabric::NotificationHandler<ObjectEvent> for ObjectEventComputeTarget {
    async fn handle(&self, event: ObjectEvent) {
        let envelope = records_envelope(EventSource::ObjectStore, event.to_record_body());
        if let Err(err) = self.compute.invoke(&self.function_name, envelope).await {
            tracing::warn!(function = %self.function_name, bucket = %event.bucket, key = %event.key, error = %err, "object notification invocation failed");
        }
    }
}

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

/// The emulated object store (spec.md §4.3). One instance serves every
/// bucket; bucket existence is tracked separately from the key-value
/// payload storage so `create_bucket`/`delete_bucket` can be idempotent
/// and empty-check without scanning the filesystem twice.
pub struct ObjectStoreProvider {
    storage: BucketStorage,
    buckets: RwLock<BTreeSet<String>>,
    notifications: NotificationDispatcher<ObjectEvent>,
    signing_key: String,
    clock: SystemClock,
    state: AtomicU8,
}

impl ObjectStoreProvider {
    pub fn new(data_dir: impl Into<PathBuf>, signing_key: impl Into<String>) -> Self {
        ObjectStoreProvider {
            storage: BucketStorage::new(data_dir),
            buckets: RwLock::new(BTreeSet::new()),
            notifications: NotificationDispatcher::new(),
            signing_key: signing_key.into(),
            clock: SystemClock,
            state: AtomicU8::new(STOPPED),
        }
    }

    /// Registers a notification binding so `(event-type glob, prefix?,
    /// suffix?)` matches fire `function_name` (spec.md §4.3
    /// "put_bucket_notification", §4.8).
    pub fn put_bucket_notification(
        &self,
        bucket: &str,
        event_type_glob: impl Into<String>,
        prefix: Option<String>,
        suffix: Option<String>,
        compute: Arc<ComputeFunctionProvider>,
        function_name: impl Into<String>,
    ) {
        self.notifications.register(
            bucket,
            event_type_glob,
            prefix,
            suffix,
            Arc::new(ObjectEventComputeTarget::new(compute, function_name)),
        );
    }

    /// Creates a bucket. Idempotent: creating an already-existing bucket
    /// is not an error (spec.md §4.3, "round-trip / idempotence laws").
    pub fn create_bucket(&self, bucket: &str) -> ProviderResult<()> {
        self.buckets.write().insert(bucket.to_string());
        Ok(())
    }

    /// Deletes an empty bucket. Fails with [`ProviderError::BucketNotEmpty`]
    /// if it still holds objects (spec.md §4.3).
    pub fn delete_bucket(&self, bucket: &str) -> ProviderResult<()> {
        if !self.storage.is_empty(bucket) {
            return Err(ProviderError::BucketNotEmpty(bucket.to_string()));
        }
        self.buckets.write().remove(bucket);
        self.notifications.clear_bucket(bucket);
        Ok(())
    }

    pub fn bucket_exists(&self, bucket: &str) -> bool {
        self.buckets.read().contains(bucket)
    }

    pub fn list_buckets(&self) -> Vec<String> {
        self.buckets.read().iter().cloned().collect()
    }

    fn require_bucket(&self, bucket: &str) -> ProviderResult<()> {
        if self.bucket_exists(bucket) {
            Ok(())
        } else {
            Err(ProviderError::NoSuchBucket(bucket.to_string()))
        }
    }

    pub fn put_object(
        &self,
        bucket: &str,
        key: &str,
        bytes: &[u8],
        content_type: Option<String>,
        user_metadata: std::collections::BTreeMap<String, String>,
    ) -> ProviderResult<ObjectMetadata> {
        self.require_bucket(bucket)?;
        let metadata = self.storage.put_object(bucket, key, bytes, content_type, user_metadata, self.clock.epoch_ms() as i64)?;
        self.notifications.dispatch(
            bucket,
            "ObjectCreated:Put",
            key,
            ObjectEvent { event_type: "ObjectCreated:Put", bucket: bucket.to_string(), key: key.to_string(), size: metadata.size, etag: metadata.etag.clone() },
        );
        Ok(metadata)
    }

    pub fn get_object(&self, bucket: &str, key: &str) -> ProviderResult<GetObjectOutput> {
        self.require_bucket(bucket)?;
        self.storage.get_object(bucket, key)?.ok_or_else(|| ProviderError::NoSuchKey { bucket: bucket.to_string(), key: key.to_string() })
    }

    pub fn head_object(&self, bucket: &str, key: &str) -> ProviderResult<Option<ObjectMetadata>> {
        self.require_bucket(bucket)?;
        self.storage.head_object(bucket, key)
    }

    pub fn delete_object(&self, bucket: &str, key: &str) -> ProviderResult<bool> {
        self.require_bucket(bucket)?;
        let meta = self.storage.head_object(bucket, key)?;
        let existed = self.storage.delete_object(bucket, key)?;
        if existed {
            let meta = meta.unwrap_or_else(|| ObjectMetadata {
                content_type: String::new(),
                size: 0,
                etag: String::new(),
                user_metadata: Default::default(),
                last_modified_ms: 0,
            });
            self.notifications.dispatch(
                bucket,
                "ObjectRemoved:Delete",
                key,
                ObjectEvent { event_type: "ObjectRemoved:Delete", bucket: bucket.to_string(), key: key.to_string(), size: meta.size, etag: meta.etag },
            );
        }
        Ok(existed)
    }

    pub fn list_objects(&self, bucket: &str, prefix: Option<&str>, max_keys: usize, continuation_token: Option<&str>) -> ProviderResult<ListObjectsOutput> {
        self.require_bucket(bucket)?;
        Ok(self.storage.list_objects(bucket, prefix, max_keys, continuation_token))
    }

    pub fn presign(&self, method: &str, bucket: &str, key: &str, expires_in_secs: u64) -> ProviderResult<lc_wire::PresignedUrlFields> {
        presign::presign(&self.signing_key, method, bucket, key, self.clock.epoch_ms() / 1000, expires_in_secs)
    }

    pub fn validate_presigned(&self, fields: &lc_wire::PresignedUrlFields) -> ProviderResult<()> {
        presign::validate(&self.signing_key, fields, self.clock.epoch_ms() / 1000)
    }
}

#[async_trait]
impl Provider for ObjectStoreProvider {
    fn name(&self) -> &str {
        "object_store"
    }

    fn state(&self) -> LifecycleState {
        match self.state.load(Ordering::SeqCst) {
            RUNNING => LifecycleState::Running,
            _ => LifecycleState::Stopped,
        }
    }

    async fn start(&self) -> GraphResult<()> {
        self.state.store(RUNNING, Ordering::SeqCst);
        Ok(())
    }

    async fn stop(&self) -> GraphResult<()> {
        self.state.store(STOPPED, Ordering::SeqCst);
        Ok(())
    }

    async fn clear_state(&self) -> GraphResult<()> {
        self.buckets.write().clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
