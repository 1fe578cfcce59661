//! Exercises spec.md §1's cross-wiring fabric end to end: "topics fan out
//! to queues and compute" feeding into "queue messages trigger compute
//! handlers" — a topic publish lands on a subscribed queue, and that
//! queue's event-source mapping invokes compute with the message.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use lc_providers::{ComputeFunctionProvider, FnHandler, QueueConfig, QueueProvider, SubscriptionProtocol, TopicProvider};
use serde_json::Value;

#[tokio::test]
async fn topic_publish_fans_out_through_a_queue_to_compute() {
    let topic = Arc::new(TopicProvider::new());
    let queue = Arc::new(QueueProvider::new());
    let compute = Arc::new(ComputeFunctionProvider::new());

    queue.create_queue("orders-fanout", QueueConfig::default());
    topic.wire_queue(Arc::clone(&queue));
    topic.create_topic("orders");
    topic.subscribe("orders", SubscriptionProtocol::Queue("orders-fanout".to_string()), None).unwrap();

    let received = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&received);
    compute.register(
        "process-order",
        Arc::new(FnHandler::new(move |_event: Value| {
            let counter = Arc::clone(&counter);
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                Ok(Value::Null)
            }
        })),
    );

    topic.publish("orders", "order placed", None, Default::default()).unwrap();
    // Topic fan-out is a detached task (spec.md §4.7); give it a beat.
    tokio::time::sleep(Duration::from_millis(50)).await;
    assert_eq!(queue.approximate_message_count("orders-fanout").unwrap(), 1);

    let handle = queue.start_event_source_mapping("orders-fanout", 10, Arc::clone(&compute), "process-order");
    tokio::time::sleep(Duration::from_millis(200)).await;
    handle.abort();

    assert_eq!(received.load(Ordering::SeqCst), 1);
    assert_eq!(queue.approximate_message_count("orders-fanout").unwrap(), 0);
}
