// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

#[derive(Clone)]
struct Evt(&'static str);

struct CountingHandler(Arc<AtomicUsize>);

#[async_trait]
impl NotificationHandler<Evt> for CountingHandler {
    async fn handle(&self, _event: Evt) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn dispatches_to_matching_prefix_and_suffix() {
    let dispatcher = NotificationDispatcher::<Evt>::new();
    let count = Arc::new(AtomicUsize::new(0));
    dispatcher.register(
        "images",
        "ObjectCreated:*",
        Some("images/".to_string()),
        None,
        Arc::new(CountingHandler(Arc::clone(&count))),
    );

    dispatcher.dispatch("images", "ObjectCreated:Put", "images/a.jpg", Evt("put"));
    dispatcher.dispatch("images", "ObjectCreated:Put", "docs/a.txt", Evt("put"));
    dispatcher.dispatch("other-bucket", "ObjectCreated:Put", "images/a.jpg", Evt("put"));

    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}

#[tokio::test(flavor = "multi_thread")]
async fn event_type_glob_gates_delivery() {
    let dispatcher = NotificationDispatcher::<Evt>::new();
    let count = Arc::new(AtomicUsize::new(0));
    dispatcher.register(
        "b",
        "ObjectRemoved:*",
        None,
        None,
        Arc::new(CountingHandler(Arc::clone(&count))),
    );
    dispatcher.dispatch("b", "ObjectCreated:Put", "k", Evt("put"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn clear_bucket_removes_all_its_bindings() {
    let dispatcher = NotificationDispatcher::<Evt>::new();
    let count = Arc::new(AtomicUsize::new(0));
    dispatcher.register(
        "b",
        "ObjectCreated:*",
        None,
        None,
        Arc::new(CountingHandler(Arc::clone(&count))),
    );
    dispatcher.clear_bucket("b");
    dispatcher.dispatch("b", "ObjectCreated:Put", "k", Evt("put"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(count.load(Ordering::SeqCst), 0);
}

#[tokio::test(flavor = "multi_thread")]
async fn suffix_filter_rejects_non_matching_keys() {
    let dispatcher = NotificationDispatcher::<Evt>::new();
    let count = Arc::new(AtomicUsize::new(0));
    dispatcher.register(
        "b",
        "ObjectCreated:*",
        None,
        Some(".jpg".to_string()),
        Arc::new(CountingHandler(Arc::clone(&count))),
    );
    dispatcher.dispatch("b", "ObjectCreated:Put", "a.png", Evt("put"));
    dispatcher.dispatch("b", "ObjectCreated:Put", "a.jpg", Evt("put"));
    tokio::time::sleep(Duration::from_millis(30)).await;
    assert_eq!(count.load(Ordering::SeqCst), 1);
}
