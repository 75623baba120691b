//! The durable store: three JSON documents under one data directory.
//!
//! The store survives process restarts and holds the current user session,
//! the lookup cache (as an ordered list of key/record pairs), and the
//! pending write queue. Each persist call rewrites one whole document
//! atomically (temp file + rename), so a crash can lose the latest
//! mutation but never leaves a partial record behind. There is no
//! cross-document transaction.

use crate::error::Result;
use crate::session::User;
use rollstock_engine::{InventoryRecord, QueueItem};
use serde::{de::DeserializeOwned, Serialize};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

const USER_FILE: &str = "user.json";
const CACHE_FILE: &str = "cache.json";
const QUEUE_FILE: &str = "queue.json";

/// File-backed key-value persistence for the core's three logical records.
#[derive(Debug, Clone)]
pub struct Storage {
    dir: PathBuf,
}

impl Storage {
    /// Create a store rooted at `dir`. Call [`Storage::init`] before use.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Ensure the data directory exists.
    pub async fn init(&self) -> Result<()> {
        fs::create_dir_all(&self.dir).await?;
        Ok(())
    }

    fn path(&self, name: &str) -> PathBuf {
        self.dir.join(name)
    }

    async fn read_json<T: DeserializeOwned>(&self, name: &str) -> Result<Option<T>> {
        let raw = match fs::read(self.path(name)).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(err.into()),
        };
        Ok(Some(serde_json::from_slice(&raw)?))
    }

    /// Serialize and persist one document atomically: write a sibling temp
    /// file, then rename over the target.
    async fn write_json<T: Serialize>(&self, name: &str, value: &T) -> Result<()> {
        let target = self.path(name);
        let tmp = self.path(&format!("{name}.tmp"));
        let raw = serde_json::to_vec(value)?;
        fs::write(&tmp, &raw).await?;
        fs::rename(&tmp, &target).await?;
        Ok(())
    }

    async fn remove(&self, name: &str) -> Result<()> {
        match fs::remove_file(self.path(name)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }

    // --- user session ---

    pub async fn get_user(&self) -> Result<Option<User>> {
        self.read_json(USER_FILE).await
    }

    pub async fn set_user(&self, user: &User) -> Result<()> {
        self.write_json(USER_FILE, user).await
    }

    pub async fn remove_user(&self) -> Result<()> {
        self.remove(USER_FILE).await
    }

    // --- lookup cache ---

    pub async fn get_cache(&self) -> Result<Vec<(String, InventoryRecord)>> {
        Ok(self.read_json(CACHE_FILE).await?.unwrap_or_default())
    }

    pub async fn set_cache(&self, entries: &[(String, InventoryRecord)]) -> Result<()> {
        self.write_json(CACHE_FILE, &entries).await
    }

    // --- write queue ---

    pub async fn get_queue(&self) -> Result<Vec<QueueItem>> {
        Ok(self.read_json(QUEUE_FILE).await?.unwrap_or_default())
    }

    pub async fn set_queue(&self, items: &[QueueItem]) -> Result<()> {
        self.write_json(QUEUE_FILE, &items).await
    }

    /// The data directory this store writes under.
    pub fn dir(&self) -> &Path {
        &self.dir
    }
}
