// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-table change-stream handler (spec.md §4.4.5): wraps an
//! [`lc_fabric::StreamDispatcher`] specialised to [`StreamRecord`], shaping
//! each record's images according to the table's configured
//! [`StreamViewType`] and stamping it with a monotone per-table sequence
//! number before handing it to the dispatcher.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use lc_fabric::{BatchHandler, StreamDispatcher, StreamDispatcherConfig};
use uuid::Uuid;

use crate::types::{StreamEventName, StreamRecord, StreamViewType};
use crate::Item;

pub struct StreamHandler {
    dispatcher: StreamDispatcher<StreamRecord>,
    view: StreamViewType,
    sequence: AtomicU64,
}

impl StreamHandler {
    pub fn new(view: StreamViewType, config: StreamDispatcherConfig) -> Self {
        StreamHandler { dispatcher: StreamDispatcher::new(config), view, sequence: AtomicU64::new(0) }
    }

    pub fn register(&self, handler: Arc<dyn BatchHandler<StreamRecord>>) {
        self.dispatcher.register(handler);
    }

    pub fn start(&self) {
        self.dispatcher.start();
    }

    pub async fn stop(&self) {
        self.dispatcher.stop().await;
    }

    /// Shapes and emits one change record. `old_image`/`new_image` are the
    /// full pre/post item; this trims them to whatever the table's view
    /// type actually carries (spec.md §4.4.5).
    #[allow(clippy::too_many_arguments)]
    pub fn emit(
        &self,
        table_name: &str,
        event_name: StreamEventName,
        keys: Item,
        old_image: Option<Item>,
        new_image: Option<Item>,
        approx_creation_time_ms: i64,
    ) {
        let (new_image, old_image) = match self.view {
            StreamViewType::KeysOnly => (None, None),
            StreamViewType::NewImage => (new_image, None),
            StreamViewType::OldImage => (None, old_image),
            StreamViewType::NewAndOld => (new_image, old_image),
        };
        let sequence_number = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        self.dispatcher.emit(StreamRecord {
            event_id: Uuid::new_v4().to_string(),
            event_name,
            table_name: table_name.to_string(),
            keys,
            new_image,
            old_image,
            sequence_number,
            approx_creation_time_ms,
        });
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
