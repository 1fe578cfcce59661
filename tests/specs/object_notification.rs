//! spec.md §8 scenario 6: object notification prefix filtering — a put
//! under the matching prefix delivers one record; a put outside it
//! delivers none.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lc_providers::{ComputeFunctionProvider, FnHandler, ObjectStoreProvider};
use serde_json::Value;

#[tokio::test]
async fn prefix_filtered_notification_fires_only_for_matching_keys() {
    let dir = tempfile::tempdir().unwrap();
    let store = ObjectStoreProvider::new(dir.path(), "test-signing-key");
    store.create_bucket("b").unwrap();

    let compute = Arc::new(ComputeFunctionProvider::new());
    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&invocations);
    compute.register(
        "on-image-upload",
        Arc::new(FnHandler::new(move |_event: Value| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Null)
            }
        })),
    );

    store.put_bucket_notification("b", "ObjectCreated:*", Some("images/".to_string()), None, Arc::clone(&compute), "on-image-upload");

    store.put_object("b", "images/a.jpg", b"jpeg-bytes", None, Default::default()).unwrap();
    store.put_object("b", "docs/a.txt", b"text-bytes", None, Default::default()).unwrap();

    // Dispatch is a detached task (spec.md §4.8); give it a beat to run.
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}
