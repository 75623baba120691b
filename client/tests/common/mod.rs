//! Shared test fixtures: a scripted gateway and app construction.
#![allow(dead_code)]

use async_trait::async_trait;
use rollstock_client::{
    Config, Error, InventoryApp, InventoryRecord, LoginResponse, NoticeReceiver, RemoteGateway,
    Result, SaveResponse, SearchResponse,
};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::time::Instant;

/// Outcome of one scripted `save_batch` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveScript {
    /// `{success: true}`
    Deliver,
    /// `{success: false, message}` - a business rejection
    Reject,
    /// The call itself errors, like an unreachable network
    Fail,
}

/// One recorded `save_batch` call.
#[derive(Debug, Clone)]
pub struct SaveCall {
    pub lines: Vec<serde_json::Value>,
    pub destination: String,
    pub at: Instant,
}

/// A gateway with scripted responses and a full call log.
pub struct MockGateway {
    pub accept_login: bool,
    /// Record returned by search, or None for found=false
    pub search_result: Mutex<Option<InventoryRecord>>,
    pub search_calls: AtomicUsize,
    /// Per-call outcomes, consumed front to back; empty falls back to
    /// `default_save`
    pub save_script: Mutex<VecDeque<SaveScript>>,
    pub default_save: SaveScript,
    pub save_calls: Mutex<Vec<SaveCall>>,
    /// Artificial latency inside save_batch
    pub save_delay: Duration,
    pub in_flight: AtomicUsize,
    pub max_in_flight: AtomicUsize,
}

impl Default for MockGateway {
    fn default() -> Self {
        Self {
            accept_login: true,
            search_result: Mutex::new(None),
            search_calls: AtomicUsize::new(0),
            save_script: Mutex::new(VecDeque::new()),
            default_save: SaveScript::Deliver,
            save_calls: Mutex::new(Vec::new()),
            save_delay: Duration::ZERO,
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
        }
    }
}

impl MockGateway {
    pub fn set_search_result(&self, record: Option<InventoryRecord>) {
        *self.search_result.lock().unwrap() = record;
    }

    pub fn script_saves(&self, outcomes: &[SaveScript]) {
        self.save_script
            .lock()
            .unwrap()
            .extend(outcomes.iter().copied());
    }

    pub fn save_call_count(&self) -> usize {
        self.save_calls.lock().unwrap().len()
    }

    pub fn save_call(&self, index: usize) -> SaveCall {
        self.save_calls.lock().unwrap()[index].clone()
    }
}

#[async_trait]
impl RemoteGateway for MockGateway {
    async fn login(&self, _username: &str, _password: &str) -> Result<LoginResponse> {
        Ok(LoginResponse {
            success: true,
            is_valid: self.accept_login,
        })
    }

    async fn search(&self, _code: &str) -> Result<SearchResponse> {
        self.search_calls.fetch_add(1, Ordering::SeqCst);
        match self.search_result.lock().unwrap().clone() {
            Some(record) => Ok(SearchResponse {
                success: true,
                found: true,
                data: Some(record),
            }),
            None => Ok(SearchResponse {
                success: true,
                found: false,
                data: None,
            }),
        }
    }

    async fn save_batch(
        &self,
        lines: &[serde_json::Value],
        destination: &str,
    ) -> Result<SaveResponse> {
        let concurrent = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(concurrent, Ordering::SeqCst);

        if !self.save_delay.is_zero() {
            tokio::time::sleep(self.save_delay).await;
        }
        self.in_flight.fetch_sub(1, Ordering::SeqCst);

        self.save_calls.lock().unwrap().push(SaveCall {
            lines: lines.to_vec(),
            destination: destination.to_string(),
            at: Instant::now(),
        });

        let script = self
            .save_script
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or(self.default_save);
        match script {
            SaveScript::Deliver => Ok(SaveResponse {
                success: true,
                message: None,
            }),
            SaveScript::Reject => Ok(SaveResponse {
                success: false,
                message: Some("sheet is locked".into()),
            }),
            SaveScript::Fail => Err(Error::Rejected("connection refused".into())),
        }
    }
}

/// Build an app over a fresh temp data directory.
pub async fn make_app(
    gateway: Arc<MockGateway>,
) -> (InventoryApp, NoticeReceiver, tempfile::TempDir) {
    let dir = tempfile::tempdir().unwrap();
    let (app, notices) = make_app_in(gateway, dir.path()).await;
    (app, notices, dir)
}

/// Build an app over an existing data directory, as after a restart.
pub async fn make_app_in(
    gateway: Arc<MockGateway>,
    dir: &std::path::Path,
) -> (InventoryApp, NoticeReceiver) {
    let config = Config::new("http://localhost/unused", dir);
    InventoryApp::new(config, gateway)
        .await
        .expect("app construction")
}

/// A sample record with both lookup keys.
pub fn sample_record(sku: &str, package_id: &str, location: &str) -> InventoryRecord {
    InventoryRecord {
        sku: sku.into(),
        package_id: package_id.into(),
        location: location.into(),
        ..Default::default()
    }
}
