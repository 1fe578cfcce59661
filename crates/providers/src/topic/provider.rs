// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The pub/sub topic provider (spec.md §4.7). Grounded on
//! `examples/original_source/src/lws/providers/sns/provider.py`: topic
//! and subscription CRUD, filter-policy matching, and fire-and-forget
//! fan-out to compute and queue subscribers via independent tasks.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use lc_core::{Clock, LifecycleState, SubscriptionId, SystemClock};
use lc_graph::{Provider, ProviderResult as GraphResult};
use lc_wire::EventSource;
use parking_lot::RwLock;
use serde_json::json;
use uuid::Uuid;

use crate::compute::{records_envelope, ComputeFunctionProvider};
use crate::error::{ProviderError, ProviderResult};
use crate::queue::{MessageAttributeValue, QueueProvider};

use super::types::{filter_policy_matches, FilterPolicy, Subscription, SubscriptionProtocol};

struct Topic {
    arn: String,
    subscriptions: Vec<Subscription>,
    custom_attributes: BTreeMap<String, String>,
}

const STOPPED: u8 = 0;
const RUNNING: u8 = 1;

/// The emulated pub/sub service (spec.md §4.7). Compute and queue fan-out
/// targets are wired in directly after construction (`wire_compute`,
/// `wire_queue`), mirroring the original's `set_compute_providers`/
/// `set_queue_provider` setters rather than a registry lookup, since both
/// targets are process-wide singletons here.
pub struct TopicProvider {
    topics: RwLock<BTreeMap<String, Topic>>,
    compute: RwLock<Option<Arc<ComputeFunctionProvider>>>,
    queue: RwLock<Option<Arc<QueueProvider>>>,
    clock: SystemClock,
    state: AtomicU8,
}

impl Default for TopicProvider {
    fn default() -> Self {
        TopicProvider { topics: RwLock::new(BTreeMap::new()), compute: RwLock::new(None), queue: RwLock::new(None), clock: SystemClock, state: AtomicU8::new(STOPPED) }
    }
}

impl TopicProvider {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn wire_compute(&self, compute: Arc<ComputeFunctionProvider>) {
        *self.compute.write() = Some(compute);
    }

    pub fn wire_queue(&self, queue: Arc<QueueProvider>) {
        *self.queue.write() = Some(queue);
    }

    /// Idempotent: creating an already-existing topic returns its
    /// existing ARN rather than erroring (spec.md §4.7, grounded on the
    /// original's `create_topic`).
    pub fn create_topic(&self, topic_name: &str) -> String {
        let mut topics = self.topics.write();
        if let Some(topic) = topics.get(topic_name) {
            return topic.arn.clone();
        }
        let arn = format!("arn:aws:sns:{}:{}:{}", lc_core::DEFAULT_REGION, lc_core::DEFAULT_ACCOUNT_ID, topic_name);
        topics.insert(topic_name.to_string(), Topic { arn: arn.clone(), subscriptions: Vec::new(), custom_attributes: BTreeMap::new() });
        arn
    }

    pub fn delete_topic(&self, topic_name: &str) -> ProviderResult<()> {
        self.topics.write().remove(topic_name).map(|_| ()).ok_or_else(|| ProviderError::NoSuchTopic(topic_name.to_string()))
    }

    pub fn topic_exists(&self, topic_name: &str) -> bool {
        self.topics.read().contains_key(topic_name)
    }

    pub fn list_topics(&self) -> Vec<String> {
        self.topics.read().keys().cloned().collect()
    }

    pub fn get_topic_attributes(&self, topic_name: &str) -> ProviderResult<BTreeMap<String, String>> {
        let topics = self.topics.read();
        let topic = topics.get(topic_name).ok_or_else(|| ProviderError::NoSuchTopic(topic_name.to_string()))?;
        let mut attrs = BTreeMap::new();
        attrs.insert("TopicArn".to_string(), topic.arn.clone());
        attrs.insert("DisplayName".to_string(), topic_name.to_string());
        attrs.insert("SubscriptionsConfirmed".to_string(), topic.subscriptions.len().to_string());
        attrs.extend(topic.custom_attributes.clone());
        Ok(attrs)
    }

    pub fn set_topic_attribute(&self, topic_name: &str, name: &str, value: &str) -> ProviderResult<()> {
        let mut topics = self.topics.write();
        let topic = topics.get_mut(topic_name).ok_or_else(|| ProviderError::NoSuchTopic(topic_name.to_string()))?;
        topic.custom_attributes.insert(name.to_string(), value.to_string());
        Ok(())
    }

    /// `subscribe(topic_name, protocol, endpoint, filter_policy)` →
    /// subscription ARN (spec.md §4.7).
    pub fn subscribe(&self, topic_name: &str, protocol: SubscriptionProtocol, filter_policy: Option<FilterPolicy>) -> ProviderResult<String> {
        let mut topics = self.topics.write();
        let topic = topics.get_mut(topic_name).ok_or_else(|| ProviderError::NoSuchTopic(topic_name.to_string()))?;
        let subscription_arn = format!("{}:{}", topic.arn, SubscriptionId::new());
        topic.subscriptions.push(Subscription { subscription_arn: subscription_arn.clone(), protocol, filter_policy, custom_attributes: BTreeMap::new() });
        Ok(subscription_arn)
    }

    /// Removes a subscription by ARN across all topics. Returns whether
    /// one was found (spec.md §4.7, grounded on the original's
    /// `unsubscribe`, which searches all topics since subscription ARNs
    /// are globally unique).
    pub fn unsubscribe(&self, subscription_arn: &str) -> bool {
        let mut topics = self.topics.write();
        for topic in topics.values_mut() {
            let before = topic.subscriptions.len();
            topic.subscriptions.retain(|s| s.subscription_arn != subscription_arn);
            if topic.subscriptions.len() != before {
                return true;
            }
        }
        false
    }

    pub fn list_subscriptions(&self, topic_name: &str) -> ProviderResult<Vec<String>> {
        let topics = self.topics.read();
        let topic = topics.get(topic_name).ok_or_else(|| ProviderError::NoSuchTopic(topic_name.to_string()))?;
        Ok(topic.subscriptions.iter().map(|s| s.subscription_arn.clone()).collect())
    }

    pub fn get_subscription_attributes(&self, subscription_arn: &str) -> ProviderResult<BTreeMap<String, String>> {
        let topics = self.topics.read();
        for topic in topics.values() {
            if let Some(sub) = topic.subscriptions.iter().find(|s| s.subscription_arn == subscription_arn) {
                let mut attrs = BTreeMap::new();
                attrs.insert("SubscriptionArn".to_string(), sub.subscription_arn.clone());
                attrs.insert("TopicArn".to_string(), topic.arn.clone());
                attrs.insert("Protocol".to_string(), sub.protocol.protocol_name().to_string());
                attrs.insert("Endpoint".to_string(), sub.protocol.endpoint().to_string());
                if let Some(policy) = &sub.filter_policy {
                    attrs.insert("FilterPolicy".to_string(), serde_json::to_string(policy).unwrap_or_default());
                }
                attrs.extend(sub.custom_attributes.clone());
                return Ok(attrs);
            }
        }
        Err(ProviderError::NoSuchSubscription(subscription_arn.to_string()))
    }

    pub fn set_subscription_attribute(&self, subscription_arn: &str, name: &str, value: &str) -> ProviderResult<()> {
        let mut topics = self.topics.write();
        for topic in topics.values_mut() {
            if let Some(sub) = topic.subscriptions.iter_mut().find(|s| s.subscription_arn == subscription_arn) {
                sub.custom_attributes.insert(name.to_string(), value.to_string());
                return Ok(());
            }
        }
        Err(ProviderError::NoSuchSubscription(subscription_arn.to_string()))
    }

    /// `publish(topic_name, message, subject?, attrs?)` → message id
    /// (spec.md §4.7). Matching subscribers are dispatched as independent
    /// detached tasks; publish itself never waits on delivery.
    pub fn publish(&self, topic_name: &str, message: &str, subject: Option<&str>, attributes: BTreeMap<String, MessageAttributeValue>) -> ProviderResult<String> {
        let (topic_arn, matching) = {
            let topics = self.topics.read();
            let topic = topics.get(topic_name).ok_or_else(|| ProviderError::NoSuchTopic(topic_name.to_string()))?;
            let matching: Vec<SubscriptionProtocol> = topic
                .subscriptions
                .iter()
                .filter(|s| s.filter_policy.as_ref().is_none_or(|policy| filter_policy_matches(policy, &attributes)))
                .map(|s| s.protocol.clone())
                .collect();
            (topic.arn.clone(), matching)
        };

        let message_id = Uuid::new_v4().to_string();
        let timestamp_ms = self.clock.epoch_ms();
        let attrs_json: BTreeMap<String, serde_json::Value> = attributes
            .iter()
            .map(|(k, v)| {
                let shaped = match v {
                    MessageAttributeValue::String(s) => json!({ "Type": "String", "Value": s }),
                    MessageAttributeValue::Number(n) => json!({ "Type": "Number", "Value": n }),
                    MessageAttributeValue::Binary(b) => json!({ "Type": "Binary", "Value": base64_encode(b) }),
                };
                (k.clone(), shaped)
            })
            .collect();

        for protocol in matching {
            let compute = self.compute.read().clone();
            let queue = self.queue.read().clone();
            let topic_arn = topic_arn.clone();
            let message = message.to_string();
            let message_id = message_id.clone();
            let subject = subject.map(str::to_string);
            let attrs_json = attrs_json.clone();

            tokio::spawn(async move {
                match protocol {
                    SubscriptionProtocol::Compute(function_name) => {
                        let Some(compute) = compute else {
                            tracing::warn!(function = %function_name, "no compute provider wired for topic subscription");
                            return;
                        };
                        let body = json!({
                            "Type": "Notification",
                            "TopicArn": topic_arn,
                            "MessageId": message_id,
                            "Subject": subject,
                            "Message": message,
                            "Timestamp": timestamp_ms,
                            "MessageAttributes": attrs_json,
                        });
                        let envelope = records_envelope(EventSource::Topic, body);
                        if let Err(err) = compute.invoke(&function_name, envelope).await {
                            tracing::warn!(function = %function_name, error = %err, "topic notification invocation failed");
                        }
                    }
                    SubscriptionProtocol::Queue(queue_name) => {
                        let Some(queue) = queue else {
                            tracing::warn!(queue = %queue_name, "no queue provider wired for topic subscription");
                            return;
                        };
                        let envelope = json!({
                            "Type": "Notification",
                            "TopicArn": topic_arn,
                            "MessageId": message_id,
                            "Subject": subject,
                            "Message": message,
                            "Timestamp": timestamp_ms,
                            "MessageAttributes": attrs_json,
                        })
                        .to_string();
                        if let Err(err) = queue.send(&queue_name, envelope, 0, BTreeMap::new()) {
                            tracing::warn!(queue = %queue_name, error = %err, "topic-to-queue dispatch failed");
                        }
                    }
                }
            });
        }

        Ok(message_id)
    }
}

fn base64_encode(bytes: &[u8]) -> String {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    STANDARD.encode(bytes)
}

#[async_trait]
impl Provider for TopicProvider {
    fn name(&self) -> &str {
        "topic"
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
        self.topics.write().clear();
        Ok(())
    }
}

#[cfg(test)]
#[path = "provider_tests.rs"]
mod tests;
