//! Verified remote updates and direct cache writes.

use std::sync::Arc;

use super::{AssetPath, AssetRecord, ManifestEntry, RemoteSource};
use crate::Error;
use crate::cache::hash::{content_hash, hashes_match};
use crate::cache::{PersistentStore, key};

/// Outcome of a batch update run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UpdateSummary {
    pub records: Vec<AssetRecord>,
    /// Committed updates whose content differs from what was cached before.
    pub changed_count: usize,
}

/// Fetches, verifies and commits assets.
///
/// Updates to the same path are not serialized here; the last write to
/// complete wins.
#[derive(Clone)]
pub struct AssetUpdater {
    store: Arc<dyn PersistentStore>,
    remote: Arc<dyn RemoteSource>,
    user_prefix: AssetPath,
}

impl AssetUpdater {
    pub fn new(store: Arc<dyn PersistentStore>, remote: Arc<dyn RemoteSource>, user_prefix: AssetPath) -> Self {
        Self { store, remote, user_prefix }
    }

    pub fn user_prefix(&self) -> &AssetPath {
        &self.user_prefix
    }

    /// Fetch `entry` from the remote root and commit it if the hash checks out.
    ///
    /// On fetch or hash failure the cache is untouched and the record carries
    /// the generic error. On a storage failure the fetched content is still
    /// returned, with the storage error code in `error`.
    pub async fn update(&self, entry: &ManifestEntry) -> AssetRecord {
        let path = &entry.path;

        let content = match self.remote.fetch_asset(path).await {
            Ok(content) => content,
            Err(e) => {
                tracing::error!(path = %path, error = %e, "update: remote fetch failed");
                return AssetRecord::failed(path.clone());
            }
        };

        if let Err(e) = self.verify(entry, &content) {
            tracing::warn!(path = %path, error = %e, "update: rejected download");
            return AssetRecord::failed(path.clone());
        }

        self.commit(path, content).await
    }

    /// Write user-supplied content straight into the cache.
    pub async fn put(&self, path: &AssetPath, content: String) -> AssetRecord {
        self.commit(path, content).await
    }

    /// Run [`update`](Self::update) for every entry, independently and in order.
    pub async fn update_all(&self, entries: &[ManifestEntry]) -> UpdateSummary {
        let mut summary = UpdateSummary::default();

        for entry in entries {
            let before = self.store.read(&key::encode(&entry.path)).await.ok();
            let record = self.update(entry).await;
            if record.is_ok() && before.as_deref() != Some(record.content.as_str()) {
                summary.changed_count += 1;
            }
            summary.records.push(record);
        }

        tracing::info!(total = entries.len(), changed = summary.changed_count, "update run finished");
        summary
    }

    fn verify(&self, entry: &ManifestEntry, content: &str) -> Result<(), Error> {
        let Some(expected) = entry.expected_hash() else {
            return Ok(());
        };

        let actual = content_hash(content);
        if hashes_match(expected, &actual) {
            Ok(())
        } else {
            Err(Error::Integrity { expected: expected.to_string(), actual })
        }
    }

    async fn commit(&self, path: &AssetPath, content: String) -> AssetRecord {
        match self.store.write_atomic(&key::encode(path), &content).await {
            Ok(()) => {
                tracing::debug!(path = %path, bytes = content.len(), "asset committed to cache");
                AssetRecord::ok(path.clone(), content)
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "cache write failed");
                AssetRecord::with_error(path.clone(), content, e.code())
            }
        }
    }
}
