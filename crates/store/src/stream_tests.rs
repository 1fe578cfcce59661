use super::*;
use async_trait::async_trait;
use lc_core::AttributeValue;
use parking_lot::Mutex;
use std::time::Duration;

struct Recording(Arc<Mutex<Vec<StreamRecord>>>);

#[async_trait]
impl BatchHandler<StreamRecord> for Recording {
    async fn handle_batch(&self, records: Vec<StreamRecord>) {
        self.0.lock().extend(records);
    }
}

fn keys() -> Item {
    let mut item = Item::new();
    item.insert("pk".to_string(), AttributeValue::s("a"));
    item
}

#[tokio::test]
async fn keys_only_view_drops_both_images() {
    let handler = StreamHandler::new(StreamViewType::KeysOnly, StreamDispatcherConfig { window: Duration::from_millis(10), buffer_size: 16 });
    let seen = Arc::new(Mutex::new(Vec::new()));
    handler.register(Arc::new(Recording(seen.clone())));
    handler.start();

    handler.emit("Orders", StreamEventName::Insert, keys(), None, Some(keys()), 1000);
    tokio::time::sleep(Duration::from_millis(40)).await;

    let records = seen.lock().clone();
    assert_eq!(records.len(), 1);
    assert!(records[0].new_image.is_none());
    assert!(records[0].old_image.is_none());
    assert_eq!(records[0].sequence_number, 1);
}

#[tokio::test]
async fn new_and_old_view_keeps_both_images() {
    let handler = StreamHandler::new(StreamViewType::NewAndOld, StreamDispatcherConfig { window: Duration::from_millis(10), buffer_size: 16 });
    let seen = Arc::new(Mutex::new(Vec::new()));
    handler.register(Arc::new(Recording(seen.clone())));
    handler.start();

    handler.emit("Orders", StreamEventName::Modify, keys(), Some(keys()), Some(keys()), 1000);
    tokio::time::sleep(Duration::from_millis(40)).await;

    let records = seen.lock().clone();
    assert_eq!(records.len(), 1);
    assert!(records[0].new_image.is_some());
    assert!(records[0].old_image.is_some());
}

#[tokio::test]
async fn sequence_numbers_increase_monotonically() {
    let handler = StreamHandler::new(StreamViewType::KeysOnly, StreamDispatcherConfig { window: Duration::from_millis(10), buffer_size: 16 });
    let seen = Arc::new(Mutex::new(Vec::new()));
    handler.register(Arc::new(Recording(seen.clone())));
    handler.start();

    for _ in 0..3 {
        handler.emit("Orders", StreamEventName::Insert, keys(), None, None, 1000);
    }
    tokio::time::sleep(Duration::from_millis(40)).await;

    let mut sequence_numbers: Vec<_> = seen.lock().iter().map(|r| r.sequence_number).collect();
    sequence_numbers.sort_unstable();
    assert_eq!(sequence_numbers, vec![1, 2, 3]);
}
