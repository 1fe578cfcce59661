// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Pub/sub topic value types (spec.md §4.7). Grounded on
//! `examples/original_source/src/lws/providers/sns/provider.py`'s
//! `TopicConfig`/`Subscription` shapes.

use std::collections::BTreeMap;

use crate::queue::MessageAttributeValue;

/// Where a subscription's matching messages are delivered.
#[derive(Debug, Clone)]
pub enum SubscriptionProtocol {
    /// Invokes a named compute function with a records envelope
    /// (spec.md §4.7, "compute-fn subscribers receive an event shaped
    /// as a records envelope").
    Compute(String),
    /// Sends an SQS-style message whose body is the stringified
    /// notification envelope (spec.md §4.7, "queue subscribers receive
    /// an SQS-style message").
    Queue(String),
}

impl SubscriptionProtocol {
    pub fn protocol_name(&self) -> &'static str {
        match self {
            SubscriptionProtocol::Compute(_) => "lambda",
            SubscriptionProtocol::Queue(_) => "sqs",
        }
    }

    pub fn endpoint(&self) -> &str {
        match self {
            SubscriptionProtocol::Compute(endpoint) | SubscriptionProtocol::Queue(endpoint) => endpoint,
        }
    }
}

/// A filter policy: a message passes only if, for every key present in
/// the policy, the message attribute's value is among the accepted
/// values (spec.md §4.7). A policy key with no matching message
/// attribute never passes.
pub type FilterPolicy = BTreeMap<String, Vec<String>>;

pub fn filter_policy_matches(policy: &FilterPolicy, attributes: &BTreeMap<String, MessageAttributeValue>) -> bool {
    policy.iter().all(|(key, accepted)| {
        attributes
            .get(key)
            .and_then(MessageAttributeValue::as_filter_value)
            .is_some_and(|value| accepted.iter().any(|a| a == value))
    })
}

#[derive(Debug, Clone)]
pub struct Subscription {
    pub subscription_arn: String,
    pub protocol: SubscriptionProtocol,
    pub filter_policy: Option<FilterPolicy>,
    pub custom_attributes: BTreeMap<String, String>,
}
