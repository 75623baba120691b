//! The sync worker: drains the write queue against the remote gateway.
//!
//! A single background task owns the drain timer. Each round it sleeps for
//! the current backoff interval, then attempts one drain: select the
//! eligible batch, deliver it, and either remove the confirmed items (fast
//! retry interval) or leave the queue untouched (exponential backoff).
//! A guard flag enforces at most one in-flight delivery even if a manual
//! trigger races the timer; the worker runs for the lifetime of the
//! session and is only stopped by context teardown.

use crate::gateway::RemoteGateway;
use crate::notice::{self, NoticeKind, NoticeSender};
use crate::storage::Storage;
use rollstock_engine::{Backoff, ItemId, WriteQueue};
use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;

/// State shared between the application context and the sync worker.
pub(crate) struct SyncState {
    /// The pending write queue
    pub queue: Mutex<WriteQueue>,
    /// Retry-interval state, owned logically by the worker but collapsible
    /// by manual sync and connectivity events
    pub backoff: Mutex<Backoff>,
    /// Connectivity as reported by the host shell
    pub online: AtomicBool,
    /// Set before the delivery call suspends, cleared after it resolves.
    /// Guarantees at most one in-flight batch delivery.
    pub drain_in_flight: AtomicBool,
    /// Wakes the worker so it re-reads a collapsed interval
    pub wake: Notify,
    /// Observable: current queue size
    pub queue_length: watch::Sender<usize>,
    /// Observable: items queued since the queue last became empty
    pub session_total: watch::Sender<u64>,
    /// Observable: a delivery is in flight
    pub is_syncing: watch::Sender<bool>,
}

/// The background drain loop.
pub(crate) struct SyncWorker {
    state: Arc<SyncState>,
    storage: Arc<Storage>,
    gateway: Arc<dyn RemoteGateway>,
    notices: NoticeSender,
    batch_size: usize,
}

impl SyncWorker {
    pub(crate) fn spawn(
        state: Arc<SyncState>,
        storage: Arc<Storage>,
        gateway: Arc<dyn RemoteGateway>,
        notices: NoticeSender,
        batch_size: usize,
    ) -> JoinHandle<()> {
        let worker = Self {
            state,
            storage,
            gateway,
            notices,
            batch_size,
        };
        tokio::spawn(worker.run())
    }

    async fn run(self) {
        loop {
            let wait_ms = self.state.backoff.lock().await.current_ms();
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_millis(wait_ms)) => {
                    self.drain_once().await;
                }
                _ = self.state.wake.notified() => {
                    // Interval was collapsed; restart the wait with the
                    // new value.
                }
            }
        }
    }

    /// One drain attempt. Rejects immediately, with no state change, when
    /// offline, when a drain is already in flight, or when the queue is
    /// empty.
    async fn drain_once(&self) {
        if !self.state.online.load(Ordering::SeqCst) {
            return;
        }
        if self.state.drain_in_flight.swap(true, Ordering::SeqCst) {
            return;
        }

        let batch = {
            let queue = self.state.queue.lock().await;
            queue.select_batch(self.batch_size)
        };
        let Some(batch) = batch else {
            self.state.drain_in_flight.store(false, Ordering::SeqCst);
            return;
        };

        let _ = self.state.is_syncing.send(true);
        tracing::debug!(
            items = batch.item_count(),
            lines = batch.line_count(),
            destination = %batch.destination,
            "sending batch"
        );

        let outcome = self
            .gateway
            .save_batch(&batch.lines, &batch.destination)
            .await;

        let ids: HashSet<ItemId> = batch.item_ids.iter().cloned().collect();
        match outcome {
            Ok(response) if response.success => {
                self.on_delivered(&ids, batch.line_count(), &batch.destination)
                    .await;
            }
            Ok(response) => {
                let reason = response
                    .message
                    .unwrap_or_else(|| "unknown API error".to_string());
                self.on_failed(&ids, &reason).await;
            }
            Err(err) => {
                self.on_failed(&ids, &err.to_string()).await;
            }
        }

        self.state.drain_in_flight.store(false, Ordering::SeqCst);
        let _ = self.state.is_syncing.send(false);
    }

    /// The batch was confirmed: remove its items by identity, persist the
    /// shrunken queue, and speed the timer up to drain the backlog.
    async fn on_delivered(&self, ids: &HashSet<ItemId>, lines: usize, destination: &str) {
        let mut queue = self.state.queue.lock().await;
        queue.remove_ids(ids);
        if let Err(err) = self.storage.set_queue(queue.items()).await {
            tracing::warn!(error = %err, "failed to persist queue after drain");
        }
        let _ = self.state.queue_length.send(queue.len());

        let mut backoff = self.state.backoff.lock().await;
        if queue.is_empty() {
            let _ = self.state.session_total.send(0);
            backoff.reset();
        } else {
            backoff.on_success();
        }
        drop(backoff);
        drop(queue);

        tracing::info!(lines, destination, "batch delivered");
        notice::send(
            &self.notices,
            NoticeKind::Success,
            format!("Updated {lines} lines to '{destination}'"),
        );
    }

    /// Delivery failed: the queue keeps every item of the batch, the retry
    /// counters are bumped, and the interval backs off. Nothing blocking
    /// reaches the user; the queue persists and will retry automatically.
    async fn on_failed(&self, ids: &HashSet<ItemId>, reason: &str) {
        let mut queue = self.state.queue.lock().await;
        queue.mark_failed(ids);
        if let Err(err) = self.storage.set_queue(queue.items()).await {
            tracing::warn!(error = %err, "failed to persist queue after failed drain");
        }
        drop(queue);

        let mut backoff = self.state.backoff.lock().await;
        backoff.on_failure();
        let next_retry_ms = backoff.current_ms();
        drop(backoff);

        tracing::warn!(%reason, next_retry_ms, "batch delivery failed; will retry");
    }
}
