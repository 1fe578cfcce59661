// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The queue provider (spec.md §4.6): FIFO-or-best-effort delivery with
//! visibility timeouts and long-poll receive. Grounded on
//! `examples/original_source/src/ldk/providers/sqs/routes.py` for the
//! operation surface and `src/lws/providers/ecs/provider.py`'s
//! subprocess-polling idiom for the background event-source poller.

use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lc_core::{Clock, LifecycleState, SystemClock};
use lc_graph::{Provider, ProviderResult as GraphResult};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::compute::{records_envelope, ComputeFunctionProvider};
use crate::error::{ProviderError, ProviderResult};

use super::types::{MessageAttributeValue, QueueConfig, ReceivedMessage};

/// One enqueued message, tracked whether visible or in-flight.
#[derive(Debug, Clone)]
struct Message {
    id: String,
    body: String,
    attributes: BTreeMap<String, MessageAttributeValue>,
    available_at_ms: i64,
    receive_count: u32,
}

struct InFlight {
    message: Message,
    visible_at_ms: i64,
}

#[derive(Default)]
struct QueueState {
    visible: VecDeque<Message>,
    in_flight: BTreeMap<String, InFlight>,
}

impl QueueState {
    /// Moves every in-flight message whose visibility deadline has
    /// passed back onto the visible queue (spec.md §4.6, "Visibility
    /// expiration returns a message to visible").
    fn reap_expired(&mut self, now_ms: i64) {
        let expired: Vec<String> = self.in_flight.iter().filter(|(_, f)| f.visible_at_ms <= now_ms).map(|(h, _)| h.clone()).collect();
        for handle in expired {
            if let Some(flight) = self.in_flight.remove(&handle) {
                self.visible.push_back(flight.message);
            }
        }
    }
}

struct Queue {
    config: QueueConfig,
    state: Mutex<QueueState>,
}

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

/// The emulated queue service (spec.md §4.6): many named queues, each
/// independently serialized (spec.md §5, "Each queue is serialised:
/// receive-and-hide plus delete form the critical region").
pub struct QueueProvider {
    queues: Mutex<BTreeMap<String, Arc<Queue>>>,
    clock: SystemClock,
    state: AtomicU8,
}

impl Default for QueueProvider {
    fn default() -> Self {
        QueueProvider { queues: Mutex::new(BTreeMap::new()), clock: SystemClock, state: AtomicU8::new(STOPPED) }
    }
}

impl QueueProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn create_queue(&self, name: &str, config: QueueConfig) {
        self.queues.lock().entry(name.to_string()).or_insert_with(|| Arc::new(Queue { config, state: Mutex::new(QueueState::default()) }));
    }

    pub fn delete_queue(&self, name: &str) {
        self.queues.lock().remove(name);
    }

    pub fn queue_exists(&self, name: &str) -> bool {
        self.queues.lock().contains_key(name)
    }

    fn queue(&self, name: &str) -> ProviderResult<Arc<Queue>> {
        self.queues.lock().get(name).cloned().ok_or_else(|| ProviderError::NoSuchQueue(name.to_string()))
    }

    /// `send(queue, body, delay?, attrs?)` (spec.md §4.6).
    pub fn send(&self, queue_name: &str, body: impl Into<String>, delay_secs: u64, attributes: BTreeMap<String, MessageAttributeValue>) -> ProviderResult<String> {
        let queue = self.queue(queue_name)?;
        let now = self.clock.epoch_ms() as i64;
        let message_id = Uuid::new_v4().to_string();
        let message = Message { id: message_id.clone(), body: body.into(), attributes, available_at_ms: now + (delay_secs as i64) * 1000, receive_count: 0 };
        queue.state.lock().visible.push_back(message);
        Ok(message_id)
    }

    /// `receive(queue, max, wait-seconds, visibility-override?)`
    /// (spec.md §4.6). Polls at a fixed interval up to `wait_seconds`,
    /// the "at most one waiter per call blocking until a message is
    /// available" long-poll contract.
    pub async fn receive(&self, queue_name: &str, max: usize, wait_seconds: u64, visibility_override_secs: Option<u64>) -> ProviderResult<Vec<ReceivedMessage>> {
        let queue = self.queue(queue_name)?;
        let deadline = std::time::Instant::now() + Duration::from_secs(wait_seconds);
        loop {
            let batch = self.drain_visible(&queue, max, visibility_override_secs);
            if !batch.is_empty() || std::time::Instant::now() >= deadline {
                return Ok(batch);
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    }

    fn drain_visible(&self, queue: &Queue, max: usize, visibility_override_secs: Option<u64>) -> Vec<ReceivedMessage> {
        let now = self.clock.epoch_ms() as i64;
        let visibility_secs = visibility_override_secs.unwrap_or(queue.config.visibility_timeout_secs);
        let mut state = queue.state.lock();
        state.reap_expired(now);

        let mut taken = Vec::new();
        let mut remaining = VecDeque::new();
        while let Some(message) = state.visible.pop_front() {
            if taken.len() < max && message.available_at_ms <= now {
                taken.push(message);
            } else {
                remaining.push_back(message);
            }
        }
        state.visible = remaining;

        taken
            .into_iter()
            .map(|mut message| {
                message.receive_count += 1;
                let receipt_handle = Uuid::new_v4().to_string();
                let received = ReceivedMessage {
                    message_id: message.id.clone(),
                    receipt_handle: receipt_handle.clone(),
                    body: message.body.clone(),
                    attributes: message.attributes.clone(),
                    receive_count: message.receive_count,
                };
                state.in_flight.insert(receipt_handle, InFlight { message, visible_at_ms: now + (visibility_secs as i64) * 1000 });
                received
            })
            .collect()
    }

    /// `delete(queue, receipt-handle)`: no-op if already expired or
    /// deleted (spec.md §4.6).
    pub fn delete(&self, queue_name: &str, receipt_handle: &str) -> ProviderResult<()> {
        let queue = self.queue(queue_name)?;
        queue.state.lock().in_flight.remove(receipt_handle);
        Ok(())
    }

    /// `change_visibility(queue, receipt-handle, seconds)` (spec.md §4.6,
    /// §9 Open Question 1 — implemented as a direct setter rather than a
    /// relative extension).
    pub fn change_visibility(&self, queue_name: &str, receipt_handle: &str, seconds: u64) -> ProviderResult<()> {
        let queue = self.queue(queue_name)?;
        let now = self.clock.epoch_ms() as i64;
        let mut state = queue.state.lock();
        let flight = state.in_flight.get_mut(receipt_handle).ok_or_else(|| ProviderError::InvalidReceiptHandle(receipt_handle.to_string()))?;
        flight.visible_at_ms = now + (seconds as i64) * 1000;
        Ok(())
    }

    /// `purge(queue)`: drop all messages, visible or in-flight
    /// (spec.md §4.6).
    pub fn purge(&self, queue_name: &str) -> ProviderResult<()> {
        let queue = self.queue(queue_name)?;
        let mut state = queue.state.lock();
        state.visible.clear();
        state.in_flight.clear();
        Ok(())
    }

    pub fn approximate_message_count(&self, queue_name: &str) -> ProviderResult<usize> {
        let queue = self.queue(queue_name)?;
        let now = self.clock.epoch_ms() as i64;
        let mut state = queue.state.lock();
        state.reap_expired(now);
        Ok(state.visible.len())
    }

    /// Wires `queue_name` as an event-source mapping: a background poller
    /// receives in batches of `batch_size`, invokes `function_name`, and
    /// deletes on success; on handler error the messages return to
    /// visible via the standard timeout (spec.md §4.6, "When a queue is
    /// wired as an event-source mapping").
    pub fn start_event_source_mapping(self: &Arc<Self>, queue_name: impl Into<String>, batch_size: usize, compute: Arc<ComputeFunctionProvider>, function_name: impl Into<String>) -> tokio::task::JoinHandle<()> {
        let provider = Arc::clone(self);
        let queue_name = queue_name.into();
        let function_name = function_name.into();
        tokio::spawn(async move {
            loop {
                let batch = match provider.receive(&queue_name, batch_size, 5, None).await {
                    Ok(batch) => batch,
                    Err(_) => break,
                };
                if batch.is_empty() {
                    continue;
                }
                let records: Vec<serde_json::Value> = batch
                    .iter()
                    .map(|m| {
                        serde_json::json!({
                            "messageId": m.message_id,
                            "receiptHandle": m.receipt_handle,
                            "body": m.body,
                        })
                    })
                    .collect();
                let envelope = records_envelope(lc_wire::EventSource::Queue, serde_json::json!({ "batch": records }));
                let succeeded = matches!(compute.invoke(&function_name, envelope).await, Ok(result) if result.outcome.is_ok());
                if succeeded {
                    for m in &batch {
                        let _ = provider.delete(&queue_name, &m.receipt_handle);
                    }
                }
            }
        })
    }
}

#[async_trait]
impl Provider for QueueProvider {
    fn name(&self) -> &str {
        "queue"
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
        self.queues.lock().clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
