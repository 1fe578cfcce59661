use super::*;
use crate::compute::FnHandler;
use serde_json::Value;
use std::collections::BTreeMap;

fn provider() -> (ObjectStoreProvider, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    (ObjectStoreProvider::new(dir.path(), "signing-key"), dir)
}

#[test]
fn create_bucket_is_idempotent() {
    let (provider, _dir) = provider();
    provider.create_bucket("b").unwrap();
    provider.create_bucket("b").unwrap();
    assert!(provider.bucket_exists("b"));
}

#[test]
fn operations_on_missing_bucket_error() {
    let (provider, _dir) = provider();
    let err = provider.put_object("nope", "k", b"x", None, BTreeMap::new()).unwrap_err();
    assert!(matches!(err, ProviderError::NoSuchBucket(_)));
}

#[test]
fn delete_nonempty_bucket_fails() {
    let (provider, _dir) = provider();
    provider.create_bucket("b").unwrap();
    provider.put_object("b", "k", b"x", None, BTreeMap::new()).unwrap();
    let err = provider.delete_bucket("b").unwrap_err();
    assert!(matches!(err, ProviderError::BucketNotEmpty(_)));
}

#[test]
fn get_missing_key_errors() {
    let (provider, _dir) = provider();
    provider.create_bucket("b").unwrap();
    let err = provider.get_object("b", "missing").unwrap_err();
    assert!(matches!(err, ProviderError::NoSuchKey { .. }));
}

#[test]
fn put_get_delete_round_trip() {
    let (provider, _dir) = provider();
    provider.create_bucket("b").unwrap();
    provider.put_object("b", "k", b"hello", None, BTreeMap::new()).unwrap();
    let got = provider.get_object("b", "k").unwrap();
    assert_eq!(got.bytes, b"hello");
    assert!(provider.delete_object("b", "k").unwrap());
    assert!(provider.get_object("b", "k").is_err());
}

#[test]
fn presign_then_validate_round_trips() {
    let (provider, _dir) = provider();
    let fields = provider.presign("GET", "b", "k", 60).unwrap();
    assert!(provider.validate_presigned(&fields).is_ok());
}

#[tokio::test]
async fn put_object_fires_notification_to_compute() {
    let (provider, _dir) = provider();
    provider.create_bucket("b").unwrap();

    let compute = Arc::new(ComputeFunctionProvider::new());
    let invoked = Arc::new(tokio::sync::Notify::new());
    let invoked_clone = Arc::clone(&invoked);
    compute.register(
        "on-put",
        Arc::new(FnHandler::new(move |_event: Value| {
            let invoked = Arc::clone(&invoked_clone);
            async move {
                invoked.notify_one();
                Ok(Value::Null)
            }
        })),
    );

    provider.put_bucket_notification("b", "ObjectCreated:*", None, None, Arc::clone(&compute), "on-put");
    provider.put_object("b", "uploads/file.txt", b"data", None, BTreeMap::new()).unwrap();

    tokio::time::timeout(std::time::Duration::from_secs(1), invoked.notified()).await.unwrap();
}

#[tokio::test]
async fn notification_respects_prefix_filter() {
    let (provider, _dir) = provider();
    provider.create_bucket("b").unwrap();

    let compute = Arc::new(ComputeFunctionProvider::new());
    let invoked = Arc::new(tokio::sync::Notify::new());
    let invoked_clone = Arc::clone(&invoked);
    compute.register(
        "on-put",
        Arc::new(FnHandler::new(move |_event: Value| {
            let invoked = Arc::clone(&invoked_clone);
            async move {
                invoked.notify_one();
                Ok(Value::Null)
            }
        })),
    );

    provider.put_bucket_notification("b", "ObjectCreated:*", Some("uploads/".to_string()), None, Arc::clone(&compute), "on-put");
    provider.put_object("b", "other/file.txt", b"data", None, BTreeMap::new()).unwrap();

    let result = tokio::time::timeout(std::time::Duration::from_millis(100), invoked.notified()).await;
    assert!(result.is_err(), "non-matching prefix must not fire the handler");
}
