// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

struct CountingHandler {
    batches: Arc<AtomicUsize>,
    records: Arc<AtomicUsize>,
}

#[async_trait]
impl BatchHandler<u32> for CountingHandler {
    async fn handle_batch(&self, records: Vec<u32>) {
        self.batches.fetch_add(1, Ordering::SeqCst);
        self.records.fetch_add(records.len(), Ordering::SeqCst);
    }
}

#[tokio::test(flavor = "multi_thread")]
async fn flushes_buffered_records_within_window() {
    let dispatcher = StreamDispatcher::<u32>::new(StreamDispatcherConfig {
        window: Duration::from_millis(20),
        buffer_size: 64,
    });
    let batches = Arc::new(AtomicUsize::new(0));
    let records = Arc::new(AtomicUsize::new(0));
    dispatcher.register(Arc::new(CountingHandler {
        batches: Arc::clone(&batches),
        records: Arc::clone(&records),
    }));
    dispatcher.start();

    dispatcher.emit(1);
    dispatcher.emit(2);
    dispatcher.emit(3);

    tokio::time::sleep(Duration::from_millis(100)).await;

    assert_eq!(records.load(Ordering::SeqCst), 3);
    assert!(batches.load(Ordering::SeqCst) >= 1);
    dispatcher.stop().await;
}

#[tokio::test(flavor = "multi_thread")]
async fn drops_records_past_buffer_capacity_without_blocking() {
    let dispatcher =
        StreamDispatcher::<u32>::new(StreamDispatcherConfig { window: Duration::from_secs(60), buffer_size: 2 });
    // No worker started: emits must still return immediately rather than
    // block once the bounded channel fills up.
    dispatcher.emit(1);
    dispatcher.emit(2);
    dispatcher.emit(3);
}

#[tokio::test(flavor = "multi_thread")]
async fn multiple_handlers_each_receive_the_batch() {
    let dispatcher = StreamDispatcher::<u32>::new(StreamDispatcherConfig {
        window: Duration::from_millis(10),
        buffer_size: 64,
    });
    let a_batches = Arc::new(AtomicUsize::new(0));
    let b_batches = Arc::new(AtomicUsize::new(0));
    dispatcher.register(Arc::new(CountingHandler {
        batches: Arc::clone(&a_batches),
        records: Arc::new(AtomicUsize::new(0)),
    }));
    dispatcher.register(Arc::new(CountingHandler {
        batches: Arc::clone(&b_batches),
        records: Arc::new(AtomicUsize::new(0)),
    }));
    dispatcher.start();
    dispatcher.emit(42);
    tokio::time::sleep(Duration::from_millis(80)).await;
    assert!(a_batches.load(Ordering::SeqCst) >= 1);
    assert!(b_batches.load(Ordering::SeqCst) >= 1);
    dispatcher.stop().await;
}
