// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The change-stream dispatcher (spec.md §4.4.5, §4.8): records are
//! `emit`ted into a per-table bounded buffer; a background worker drains it
//! every `window_ms` and delivers one batch to each registered handler.
//! Never blocks the producer; drops the oldest... no — drops the *new*
//! record with a logged warning when the buffer is full (spec.md §4.8,
//! "drop only with logged warning when the buffer is full").

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::RwLock;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

/// A handler invoked with one flushed batch of records. Implemented by the
/// compute bridge; generic here so `lc-fabric` stays free of `lc-providers`.
#[async_trait]
pub trait BatchHandler<R>: Send + Sync {
    async fn handle_batch(&self, records: Vec<R>);
}

#[derive(Debug, Clone, Copy)]
pub struct StreamDispatcherConfig {
    /// How often the worker drains the buffer and flushes a batch.
    pub window: Duration,
    /// Buffer capacity before new records are dropped with a warning.
    pub buffer_size: usize,
}

impl Default for StreamDispatcherConfig {
    fn default() -> Self {
        StreamDispatcherConfig { window: Duration::from_millis(100), buffer_size: 1024 }
    }
}

/// Per-table (or, more generally, per-event-source) change-stream
/// dispatcher. `start()` spawns the draining worker; `stop()` cancels it
/// after flushing whatever is still buffered.
pub struct StreamDispatcher<R> {
    config: StreamDispatcherConfig,
    sender: mpsc::Sender<R>,
    receiver: parking_lot::Mutex<Option<mpsc::Receiver<R>>>,
    handlers: Arc<RwLock<Vec<Arc<dyn BatchHandler<R>>>>>,
    worker: parking_lot::Mutex<Option<JoinHandle<()>>>,
    stopping: CancellationToken,
}

impl<R: Clone + Send + Sync + 'static> StreamDispatcher<R> {
    pub fn new(config: StreamDispatcherConfig) -> Self {
        let (sender, receiver) = mpsc::channel(config.buffer_size);
        StreamDispatcher {
            config,
            sender,
            receiver: parking_lot::Mutex::new(Some(receiver)),
            handlers: Arc::new(RwLock::new(Vec::new())),
            worker: parking_lot::Mutex::new(None),
            stopping: CancellationToken::new(),
        }
    }

    pub fn register(&self, handler: Arc<dyn BatchHandler<R>>) {
        self.handlers.write().push(handler);
    }

    /// Enqueue one record. Never blocks: a full buffer drops the record
    /// with a logged warning rather than apply backpressure to the writer
    /// that produced it.
    pub fn emit(&self, record: R) {
        if let Err(mpsc::error::TrySendError::Full(_)) = self.sender.try_send(record) {
            warn!("stream dispatcher buffer full, dropping record");
        }
    }

    /// Spawn the background worker that drains the buffer every
    /// `window_ms` and flushes one batch per registered handler. No-op if
    /// already started.
    pub fn start(&self) {
        let mut worker = self.worker.lock();
        if worker.is_some() {
            return;
        }
        let Some(mut receiver) = self.receiver.lock().take() else {
            return;
        };
        let handlers = Arc::clone(&self.handlers);
        let window = self.config.window;
        let stopping = self.stopping.clone();
        let handle = tokio::spawn(async move {
            let mut pending = Vec::new();
            let mut tick = tokio::time::interval(window);
            loop {
                tokio::select! {
                    _ = tick.tick() => {
                        flush(&handlers, &mut pending).await;
                    }
                    maybe = receiver.recv() => {
                        match maybe {
                            Some(record) => pending.push(record),
                            None => break,
                        }
                    }
                    _ = stopping.cancelled() => break,
                }
            }
            // Drain whatever is already queued — `stop()` must flush all
            // pending batches rather than discard them (spec.md §4.8).
            while let Ok(record) = receiver.try_recv() {
                pending.push(record);
            }
            flush(&handlers, &mut pending).await;
        });
        *worker = Some(handle);
    }

    /// Stop the worker: signals it to exit its select loop, drain whatever
    /// is already buffered, and flush it — then awaits that flush before
    /// returning, so no pending batch is silently dropped (spec.md §4.8).
    pub async fn stop(&self) {
        self.stopping.cancel();
        let handle = self.worker.lock().take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }
}

async fn flush<R: Clone + Send + Sync + 'static>(
    handlers: &Arc<RwLock<Vec<Arc<dyn BatchHandler<R>>>>>,
    pending: &mut Vec<R>,
) {
    if pending.is_empty() {
        return;
    }
    let batch = std::mem::take(pending);
    let targets: Vec<_> = handlers.read().iter().cloned().collect();
    for handler in targets {
        let batch = batch.clone();
        tokio::spawn(async move {
            handler.handle_batch(batch).await;
        });
    }
}

#[cfg(test)]
#[path = "stream_tests.rs"]
mod tests;
