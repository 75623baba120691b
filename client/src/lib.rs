//! # Rollstock Client
//!
//! The offline-first core of the Rollstock warehouse data-entry app.
//!
//! Operators scan or type a code, view and edit a paper-roll record, and
//! queue changes for delivery to the spreadsheet-backed remote API. The
//! client works while intermittently offline: writes are queued locally,
//! persisted across restarts, and drained opportunistically with retry
//! and backoff, while a read-through cache answers repeat lookups without
//! the network.
//!
//! The entry point is [`InventoryApp`]: construct it once with a
//! [`Config`] and a [`RemoteGateway`] implementation (normally
//! [`HttpGateway`]), then hand it by reference to the screens.
//!
//! ```no_run
//! use rollstock_client::{Config, HttpGateway, InventoryApp};
//! use std::sync::Arc;
//!
//! # async fn start() -> rollstock_client::Result<()> {
//! let config = Config::from_env()?;
//! let gateway = Arc::new(HttpGateway::new(&config)?);
//! let (app, mut notices) = InventoryApp::new(config, gateway).await?;
//!
//! tokio::spawn(async move {
//!     while let Some(notice) = notices.recv().await {
//!         println!("[{:?}] {}", notice.kind, notice.message);
//!     }
//! });
//!
//! let record = app.search("SKU-001").await?;
//! println!("{} is at {}", record.sku, record.location);
//! # Ok(())
//! # }
//! ```
//!
//! Pure queue, cache and backoff logic lives in the `rollstock-engine`
//! crate; this crate adds storage, networking and the background worker.

pub mod app;
pub mod config;
pub mod error;
pub mod gateway;
pub mod notice;
pub mod session;
pub mod storage;
mod sync;

pub use app::InventoryApp;
pub use config::{Config, ConfigError};
pub use error::{Error, Result};
pub use gateway::{HttpGateway, LoginResponse, RemoteGateway, SaveResponse, SearchResponse};
pub use notice::{Notice, NoticeKind, NoticeReceiver};
pub use session::{Role, User};
pub use storage::Storage;

// The domain types flow through the whole surface; re-export them so
// embedders need only one crate.
pub use rollstock_engine::{
    ExportLine, FieldValue, InventoryRecord, Payload, QueueItem, ReImportEntry, ReImportLine,
    DESTINATION_DEFAULT, DESTINATION_EXPORT, DESTINATION_RE_IMPORT,
};
