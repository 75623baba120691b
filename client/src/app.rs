//! The application context.
//!
//! [`InventoryApp`] owns the lookup cache, the write queue, the durable
//! store, the gateway handle and the sync worker, and exposes the surface
//! the presentation layer calls. It is constructed once at process start
//! and passed by handle to the screens; there are no ambient singletons.

use crate::config::Config;
use crate::error::{Error, Result};
use crate::gateway::RemoteGateway;
use crate::notice::{self, NoticeKind, NoticeReceiver, NoticeSender};
use crate::session::{self, User};
use crate::storage::Storage;
use crate::sync::{SyncState, SyncWorker};
use rollstock_engine::{
    Backoff, ExportLine, FieldValue, InventoryRecord, LookupCache, Payload, QueueItem,
    ReImportEntry, ReImportLine, WriteQueue, DESTINATION_EXPORT, DESTINATION_RE_IMPORT,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{watch, Mutex, Notify};
use tokio::task::JoinHandle;
use uuid::Uuid;

/// The core handle: cache, queue, sync engine and session in one place.
pub struct InventoryApp {
    config: Config,
    storage: Arc<Storage>,
    gateway: Arc<dyn RemoteGateway>,
    state: Arc<SyncState>,
    cache: Mutex<LookupCache>,
    current: Mutex<Option<InventoryRecord>>,
    user: Mutex<Option<User>>,
    notices: NoticeSender,
    queue_length: watch::Receiver<usize>,
    session_total: watch::Receiver<u64>,
    is_syncing: watch::Receiver<bool>,
    worker: JoinHandle<()>,
}

impl InventoryApp {
    /// Build the context: restore the durable state, start the sync
    /// worker, and hand back the notice channel for the UI to consume.
    pub async fn new(
        config: Config,
        gateway: Arc<dyn RemoteGateway>,
    ) -> Result<(Self, NoticeReceiver)> {
        let storage = Arc::new(Storage::new(&config.data_dir));
        storage.init().await?;

        // Durable state is best-effort on the way in: a torn document is
        // logged and replaced by an empty one, never fatal.
        let queue = match storage.get_queue().await {
            Ok(items) => WriteQueue::from_items(items),
            Err(err) => {
                tracing::error!(error = %err, "failed to load queue; starting empty");
                WriteQueue::new()
            }
        };
        let cache = match storage.get_cache().await {
            Ok(entries) => LookupCache::from_entries(entries),
            Err(err) => {
                tracing::error!(error = %err, "failed to load cache; starting empty");
                LookupCache::new()
            }
        };
        let user = match storage.get_user().await {
            Ok(user) => user,
            Err(err) => {
                tracing::error!(error = %err, "failed to load session");
                None
            }
        };
        if queue.len() > 0 {
            tracing::info!(pending = queue.len(), "restored unsynced queue");
        }
        if let Some(user) = &user {
            tracing::info!(name = %user.name, "session restored");
        }

        // Items restored from a previous run still count toward session
        // progress.
        let (queue_length_tx, queue_length) = watch::channel(queue.len());
        let (session_total_tx, session_total) = watch::channel(queue.len() as u64);
        let (is_syncing_tx, is_syncing) = watch::channel(false);

        let state = Arc::new(SyncState {
            queue: Mutex::new(queue),
            backoff: Mutex::new(Backoff::new()),
            online: AtomicBool::new(true),
            drain_in_flight: AtomicBool::new(false),
            wake: Notify::new(),
            queue_length: queue_length_tx,
            session_total: session_total_tx,
            is_syncing: is_syncing_tx,
        });

        let (notices, notice_rx) = notice::channel();
        let worker = SyncWorker::spawn(
            state.clone(),
            storage.clone(),
            gateway.clone(),
            notices.clone(),
            config.batch_size,
        );

        let app = Self {
            config,
            storage,
            gateway,
            state,
            cache: Mutex::new(cache),
            current: Mutex::new(None),
            user: Mutex::new(user),
            notices,
            queue_length,
            session_total,
            is_syncing,
            worker,
        };
        Ok((app, notice_rx))
    }

    /// The configuration this context was built with.
    pub fn config(&self) -> &Config {
        &self.config
    }

    // --- session ---

    /// Authenticate against the gateway and persist the session.
    pub async fn login(&self, username: &str, password: &str) -> Result<User> {
        let response = self.gateway.login(username, password).await?;
        if !response.success {
            return Err(Error::Rejected("login request failed".into()));
        }
        if !response.is_valid {
            return Err(Error::InvalidCredentials);
        }

        let user = User::staff(username);
        if let Err(err) = self.storage.set_user(&user).await {
            tracing::warn!(error = %err, "failed to persist session");
        }
        *self.user.lock().await = Some(user.clone());
        notice::send(
            &self.notices,
            NoticeKind::Success,
            format!("Welcome, {username}!"),
        );
        Ok(user)
    }

    /// Drop the session and the current result. The queue is untouched;
    /// pending items still sync.
    pub async fn logout(&self) {
        *self.user.lock().await = None;
        self.clear_result().await;
        if let Err(err) = self.storage.remove_user().await {
            tracing::warn!(error = %err, "failed to remove persisted session");
        }
        notice::send(&self.notices, NoticeKind::Info, "Logged out");
    }

    /// The restored or logged-in operator, if any.
    pub async fn current_user(&self) -> Option<User> {
        self.user.lock().await.clone()
    }

    // --- lookup ---

    /// Search by scanned or typed code: cache first, gateway on a miss.
    ///
    /// A cache hit returns without contacting the gateway at all, which is
    /// also the offline read path. A remote hit is written into the cache
    /// before it is returned.
    pub async fn search(&self, code: &str) -> Result<InventoryRecord> {
        if let Some(record) = self.cache.lock().await.get(code).cloned() {
            tracing::debug!(code, "serving search from cache");
            *self.current.lock().await = Some(record.clone());
            return Ok(record);
        }

        let response = match self.gateway.search(code).await {
            Ok(response) => response,
            Err(err) => {
                notice::send(
                    &self.notices,
                    NoticeKind::Error,
                    format!("Connection error: {err}"),
                );
                return Err(err);
            }
        };

        match response.data {
            Some(record) if response.success && response.found => {
                self.remember(record.clone()).await;
                *self.current.lock().await = Some(record.clone());
                Ok(record)
            }
            _ => {
                // Not negatively cached; a later fetch may succeed.
                notice::send(
                    &self.notices,
                    NoticeKind::Error,
                    format!("Code not found: {code}"),
                );
                Err(Error::NotFound(code.to_string()))
            }
        }
    }

    /// Apply a field-level edit to the currently displayed record.
    ///
    /// The edit is cache-visible immediately but stays local until an
    /// explicit save enqueues it; many edits may precede one save.
    pub async fn update_field(&self, field: &str, value: FieldValue) -> Result<InventoryRecord> {
        let mut current = self.current.lock().await;
        let record = current.as_mut().ok_or(Error::NoActiveRecord)?;
        record.set_field(field, value)?;
        let updated = record.clone();
        drop(current);

        self.remember(updated.clone()).await;
        Ok(updated)
    }

    /// Drop the currently displayed record.
    pub async fn clear_result(&self) {
        *self.current.lock().await = None;
    }

    /// The currently displayed record, if any.
    pub async fn current_record(&self) -> Option<InventoryRecord> {
        self.current.lock().await.clone()
    }

    // --- save paths ---

    /// Queue the currently displayed record for delivery, stamped with the
    /// operator's name and the local time, then clear the view.
    pub async fn save_update(&self, destination: Option<&str>) -> Result<()> {
        let record = self
            .current
            .lock()
            .await
            .clone()
            .ok_or(Error::NoActiveRecord)?;
        let stamped = self.stamp_and_queue(record, destination).await?;
        self.clear_result().await;
        notice::send(
            &self.notices,
            NoticeKind::Success,
            format!("Saved {} (queued)", stamped.sku),
        );
        Ok(())
    }

    /// Queue a caller-modified record without touching the current view.
    /// Used by screens that edit a copy, such as the location view.
    pub async fn save_record(
        &self,
        record: InventoryRecord,
        destination: Option<&str>,
    ) -> Result<()> {
        self.stamp_and_queue(record, destination).await?;
        Ok(())
    }

    async fn stamp_and_queue(
        &self,
        mut record: InventoryRecord,
        destination: Option<&str>,
    ) -> Result<InventoryRecord> {
        let user = self.user.lock().await.clone().ok_or(Error::NotLoggedIn)?;
        record.importer = user.name;
        record.updated_at = session::update_stamp();

        // Cache before queueing so the UI reflects the save instantly.
        self.remember(record.clone()).await;
        self.enqueue(Payload::Update(record.clone()), destination)
            .await;
        Ok(record)
    }

    /// Queue a package of re-import lines. Only sku, weight and quantity
    /// reach the wire.
    pub async fn save_re_import(&self, entries: &[ReImportEntry]) -> Result<()> {
        if self.user.lock().await.is_none() {
            return Err(Error::NotLoggedIn);
        }
        if entries.is_empty() {
            return Ok(());
        }

        let lines: Vec<ReImportLine> = entries.iter().map(ReImportLine::from).collect();
        let count = lines.len();
        self.enqueue(Payload::ReImport(lines), Some(DESTINATION_RE_IMPORT))
            .await;
        notice::send(
            &self.notices,
            NoticeKind::Success,
            format!("Saved package of {count} lines (queued)"),
        );
        Ok(())
    }

    /// Queue a package of export lines. Only sku and quantity reach the
    /// wire.
    pub async fn save_export(&self, entries: &[ReImportEntry]) -> Result<()> {
        if self.user.lock().await.is_none() {
            return Err(Error::NotLoggedIn);
        }
        if entries.is_empty() {
            return Ok(());
        }

        let lines: Vec<ExportLine> = entries.iter().map(ExportLine::from).collect();
        let count = lines.len();
        self.enqueue(Payload::Export(lines), Some(DESTINATION_EXPORT))
            .await;
        notice::send(
            &self.notices,
            NoticeKind::Success,
            format!("Saved package of {count} lines (queued)"),
        );
        Ok(())
    }

    /// Append one payload to the write queue and persist it.
    ///
    /// One call is one queue item and one unit of session progress,
    /// however many lines the payload carries. Once this returns, the item
    /// is the durability boundary: the user is told it is safely queued
    /// regardless of eventual sync outcome.
    pub async fn enqueue(&self, payload: Payload, destination: Option<&str>) {
        let now = session::now_millis();
        let id = format!("q-{}-{}", now, Uuid::new_v4());
        let item = QueueItem::new(id, payload, destination, now);

        let mut queue = self.state.queue.lock().await;
        queue.push(item);
        let _ = self.state.queue_length.send(queue.len());
        self.state.session_total.send_modify(|total| *total += 1);

        if let Err(err) = self.storage.set_queue(queue.items()).await {
            // Best-effort durability: in-memory state stays authoritative
            // for the rest of the session.
            tracing::warn!(error = %err, "failed to persist queue");
        }
    }

    // --- sync control ---

    /// Ask for a near-immediate drain. Offline and empty-queue cases only
    /// produce a notice.
    pub async fn force_sync(&self) {
        if !self.is_online() {
            notice::send(&self.notices, NoticeKind::Error, "No network connection");
            return;
        }
        if self.state.queue.lock().await.is_empty() {
            notice::send(
                &self.notices,
                NoticeKind::Success,
                "Everything is already synced",
            );
            return;
        }

        notice::send(&self.notices, NoticeKind::Info, "Syncing...");
        self.state.backoff.lock().await.collapse();
        self.state.wake.notify_one();
    }

    /// Report connectivity. Regaining it with a non-empty queue schedules
    /// a near-immediate drain; the short collapsed wait coalesces bursts.
    pub async fn set_online(&self, online: bool) {
        let was_online = self.state.online.swap(online, Ordering::SeqCst);
        if online && !was_online && !self.state.queue.lock().await.is_empty() {
            tracing::info!("connectivity regained; scheduling drain");
            self.state.backoff.lock().await.collapse();
            self.state.wake.notify_one();
        }
    }

    /// Current connectivity as last reported by the host shell.
    pub fn is_online(&self) -> bool {
        self.state.online.load(Ordering::SeqCst)
    }

    // --- observables ---

    /// Number of items waiting in the queue.
    pub fn queue_length(&self) -> usize {
        *self.queue_length.borrow()
    }

    /// Items queued since the queue last became empty.
    pub fn session_total(&self) -> u64 {
        *self.session_total.borrow()
    }

    /// Whether a batch delivery is in flight.
    pub fn is_syncing(&self) -> bool {
        *self.is_syncing.borrow()
    }

    /// Subscribe to queue-length changes.
    pub fn watch_queue_length(&self) -> watch::Receiver<usize> {
        self.queue_length.clone()
    }

    /// Subscribe to session-total changes.
    pub fn watch_session_total(&self) -> watch::Receiver<u64> {
        self.session_total.clone()
    }

    /// Subscribe to the syncing indicator.
    pub fn watch_is_syncing(&self) -> watch::Receiver<bool> {
        self.is_syncing.clone()
    }

    /// Snapshot of the pending queue, oldest first. The dashboard lists
    /// these while they wait.
    pub async fn pending_items(&self) -> Vec<QueueItem> {
        self.state.queue.lock().await.items().to_vec()
    }

    /// Stop the sync worker. Dropping the context does the same.
    pub fn shutdown(&self) {
        self.worker.abort();
    }

    /// Write a record into the cache, indexing both keys, and persist the
    /// mapping best-effort.
    async fn remember(&self, record: InventoryRecord) {
        let mut cache = self.cache.lock().await;
        if let Err(err) = cache.insert(record) {
            tracing::warn!(error = %err, "record not cacheable");
            return;
        }
        let entries = cache.entries();
        drop(cache);

        if let Err(err) = self.storage.set_cache(&entries).await {
            tracing::warn!(error = %err, "failed to persist cache");
        }
    }
}

impl Drop for InventoryApp {
    fn drop(&mut self) {
        self.worker.abort();
    }
}
