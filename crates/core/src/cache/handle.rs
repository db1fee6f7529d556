//! Lazily acquired, memoized store handle.
//!
//! The database is opened on first demand and the handle is reused by every
//! later call. A failed acquisition is reported to the caller that triggered
//! it and the cell stays empty, so the next caller tries again.

use std::path::PathBuf;

use async_trait::async_trait;
use tokio::sync::OnceCell;

use super::connection::{CacheDb, DEFAULT_QUOTA_BYTES};
use super::key::StorageKey;
use super::settings::SettingsStore;
use super::store::PersistentStore;
use crate::Error;

/// Where the backing database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    File(PathBuf),
    Memory,
}

#[derive(Debug)]
pub struct StoreHandle {
    location: StoreLocation,
    quota_bytes: u64,
    db: OnceCell<CacheDb>,
}

impl StoreHandle {
    pub fn new(location: StoreLocation) -> Self {
        Self { location, quota_bytes: DEFAULT_QUOTA_BYTES, db: OnceCell::new() }
    }

    pub fn in_memory() -> Self {
        Self::new(StoreLocation::Memory)
    }

    pub fn with_quota(mut self, quota_bytes: u64) -> Self {
        self.quota_bytes = quota_bytes;
        self
    }

    /// Open the database on first use; later calls return the same handle.
    pub async fn acquire(&self) -> Result<&CacheDb, Error> {
        self.db
            .get_or_try_init(|| async {
                let db = match &self.location {
                    StoreLocation::File(path) => CacheDb::open(path).await,
                    StoreLocation::Memory => CacheDb::open_in_memory().await,
                };
                match db {
                    Ok(db) => {
                        tracing::debug!(location = ?self.location, quota = self.quota_bytes, "asset store opened");
                        Ok(db.with_quota(self.quota_bytes))
                    }
                    Err(e) => {
                        tracing::error!(location = ?self.location, error = %e, "failed to open asset store");
                        Err(e)
                    }
                }
            })
            .await
    }

    pub fn quota_bytes(&self) -> u64 {
        self.quota_bytes
    }

    pub fn is_acquired(&self) -> bool {
        self.db.initialized()
    }
}

#[async_trait]
impl PersistentStore for StoreHandle {
    async fn read(&self, key: &StorageKey) -> Result<String, Error> {
        self.acquire().await?.read(key).await
    }

    async fn write_atomic(&self, key: &StorageKey, content: &str) -> Result<(), Error> {
        self.acquire().await?.write_atomic(key, content).await
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), Error> {
        self.acquire().await?.remove(key).await
    }

    async fn list_all(&self) -> Result<Vec<StorageKey>, Error> {
        self.acquire().await?.list_all().await
    }
}

#[async_trait]
impl SettingsStore for StoreHandle {
    async fn get_string(&self, name: &str) -> Result<Option<String>, Error> {
        self.acquire().await?.get_string(name).await
    }

    async fn set_string(&self, name: &str, value: &str) -> Result<(), Error> {
        self.acquire().await?.set_string(name, value).await
    }
}
