//! Flat key/text persistent store.
//!
//! [`PersistentStore`] is the only path through which asset bytes reach disk.
//! Each write is a single UPSERT inside an immediate transaction, so a reader
//! sees either the previous row or the new one. Concurrent writers to the same
//! key resolve last-writer-wins.

use async_trait::async_trait;
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite::{self, TransactionBehavior};

use super::connection::CacheDb;
use super::key::StorageKey;
use crate::Error;

/// Storage capability used by the synchronizer, reader and updater.
#[async_trait]
pub trait PersistentStore: Send + Sync {
    /// Read the text stored under `key`.
    ///
    /// Fails with [`Error::NotFound`] when no entry exists.
    async fn read(&self, key: &StorageKey) -> Result<String, Error>;

    /// Replace the entry under `key` as a whole, or not at all.
    async fn write_atomic(&self, key: &StorageKey, content: &str) -> Result<(), Error>;

    /// Delete the entry under `key`. Removing an absent key succeeds.
    async fn remove(&self, key: &StorageKey) -> Result<(), Error>;

    /// Snapshot of every key currently stored.
    async fn list_all(&self) -> Result<Vec<StorageKey>, Error>;
}

#[async_trait]
impl PersistentStore for CacheDb {
    async fn read(&self, key: &StorageKey) -> Result<String, Error> {
        let key = key.as_str().to_string();
        self.conn
            .call(move |conn| -> Result<String, Error> {
                let result = conn.query_row("SELECT content FROM assets WHERE key = ?1", params![key], |row| {
                    row.get::<_, String>(0)
                });

                match result {
                    Ok(content) => Ok(content),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Err(Error::NotFound(key)),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    async fn write_atomic(&self, key: &StorageKey, content: &str) -> Result<(), Error> {
        let key = key.as_str().to_string();
        let content = content.to_string();
        let quota = self.quota_bytes;
        self.conn
            .call(move |conn| -> Result<(), Error> {
                let tx = conn.transaction_with_behavior(TransactionBehavior::Immediate)?;

                let others: i64 = tx.query_row(
                    "SELECT COALESCE(SUM(size), 0) FROM assets WHERE key != ?1",
                    params![key],
                    |row| row.get(0),
                )?;
                let size = content.len() as u64;
                let needed = others as u64 + size;
                if needed > quota {
                    return Err(Error::QuotaExceeded { needed, quota });
                }

                tx.execute(
                    "INSERT INTO assets (key, content, size, updated_at) VALUES (?1, ?2, ?3, ?4)
                     ON CONFLICT(key) DO UPDATE SET
                        content = excluded.content,
                        size = excluded.size,
                        updated_at = excluded.updated_at",
                    params![key, content, size as i64, chrono::Utc::now().to_rfc3339()],
                )?;
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn remove(&self, key: &StorageKey) -> Result<(), Error> {
        let key = key.as_str().to_string();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute("DELETE FROM assets WHERE key = ?1", params![key])?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    async fn list_all(&self) -> Result<Vec<StorageKey>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<StorageKey>, Error> {
                let mut stmt = conn.prepare("SELECT key FROM assets ORDER BY key")?;
                let keys = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .map(|key| key.map(StorageKey::from_raw))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(keys)
            })
            .await
            .map_err(Error::from)
    }
}

impl CacheDb {
    /// Total bytes of content currently stored.
    pub async fn usage_bytes(&self) -> Result<u64, Error> {
        self.conn
            .call(|conn| -> Result<u64, Error> {
                let total: i64 = conn.query_row("SELECT COALESCE(SUM(size), 0) FROM assets", [], |row| row.get(0))?;
                Ok(total as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(raw: &str) -> StorageKey {
        StorageKey::from_raw(raw)
    }

    #[tokio::test]
    async fn test_write_and_read() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.write_atomic(&key("assets___x.txt"), "hello").await.unwrap();
        assert_eq!(db.read(&key("assets___x.txt")).await.unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_read_missing_is_not_found() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let err = db.read(&key("nonexistent")).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_write_replaces_whole_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.write_atomic(&key("k"), "a much longer first version").await.unwrap();
        db.write_atomic(&key("k"), "v2").await.unwrap();

        assert_eq!(db.read(&key("k")).await.unwrap(), "v2");
        assert_eq!(db.list_all().await.unwrap(), vec![key("k")]);
        assert_eq!(db.usage_bytes().await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_quota_rejects_and_keeps_previous() {
        let db = CacheDb::open_in_memory().await.unwrap().with_quota(10);
        db.write_atomic(&key("a"), "12345").await.unwrap();
        db.write_atomic(&key("b"), "12345").await.unwrap();

        let err = db.write_atomic(&key("b"), "123456").await.unwrap_err();
        assert!(matches!(err, Error::QuotaExceeded { needed: 11, quota: 10 }));
        assert_eq!(db.read(&key("b")).await.unwrap(), "12345");
    }

    #[tokio::test]
    async fn test_quota_counts_replaced_entry_once() {
        let db = CacheDb::open_in_memory().await.unwrap().with_quota(5);
        db.write_atomic(&key("a"), "12345").await.unwrap();
        db.write_atomic(&key("a"), "54321").await.unwrap();
        assert_eq!(db.read(&key("a")).await.unwrap(), "54321");
    }

    #[tokio::test]
    async fn test_remove_is_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.write_atomic(&key("a"), "x").await.unwrap();

        db.remove(&key("a")).await.unwrap();
        db.remove(&key("a")).await.unwrap();
        db.remove(&key("never-written")).await.unwrap();

        assert!(db.list_all().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_list_all_snapshot() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.write_atomic(&key("b"), "2").await.unwrap();
        db.write_atomic(&key("a"), "1").await.unwrap();

        let keys = db.list_all().await.unwrap();
        db.remove(&key("a")).await.unwrap();

        assert_eq!(keys, vec![key("a"), key("b")]);
        assert_eq!(db.list_all().await.unwrap(), vec![key("b")]);
    }

    #[tokio::test]
    async fn test_concurrent_writes_same_key_leave_one_version() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let writes = (0..8).map(|i| {
            let db = db.clone();
            tokio::spawn(async move { db.write_atomic(&key("shared"), &format!("version-{i}")).await })
        });
        for handle in writes.collect::<Vec<_>>() {
            handle.await.unwrap().unwrap();
        }

        let content = db.read(&key("shared")).await.unwrap();
        assert!((0..8).any(|i| content == format!("version-{i}")));
        assert_eq!(db.list_all().await.unwrap().len(), 1);
    }
}
