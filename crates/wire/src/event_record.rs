// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The `{"Records": [...]}` envelope every event source (object store,
//! topic, queue, document stream) wraps its payload in before calling
//! compute (spec.md §6, "Wire shapes the core must preserve").

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `EventSource` discriminators as they appear on the wire. Each emitting
/// provider sets this field so a single compute handler can dispatch on
/// the origin of an event without inspecting the rest of the record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EventSource {
    #[serde(rename = "aws:s3")]
    ObjectStore,
    #[serde(rename = "aws:sns")]
    Topic,
    #[serde(rename = "aws:sqs")]
    Queue,
    #[serde(rename = "aws:dynamodb")]
    DocumentStream,
    #[serde(rename = "aws:events")]
    EventBus,
}

/// One record inside a [`RecordsEnvelope`]. The `body` is dialect-specific
/// (an S3 notification shape, an SNS notification shape, an SQS message,
/// or a DynamoDB stream record) and is left as [`Value`] here — each
/// provider in `lc-providers`/`lc-store` is responsible for shaping its
/// own record body; this type only pins the common envelope fields every
/// dialect shares.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventRecord {
    #[serde(rename = "EventSource")]
    pub event_source: EventSource,
    #[serde(flatten)]
    pub body: Value,
}

/// `{"Records": [record, ...]}` — the envelope delivered to compute.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecordsEnvelope {
    #[serde(rename = "Records")]
    pub records: Vec<EventRecord>,
}

impl RecordsEnvelope {
    pub fn new(records: Vec<EventRecord>) -> Self {
        RecordsEnvelope { records }
    }

    pub fn single(record: EventRecord) -> Self {
        RecordsEnvelope { records: vec![record] }
    }
}

#[cfg(test)]
#[path = "event_record_tests.rs"]
mod tests;
