//! Local-first asset reads.

use std::sync::Arc;

use super::{AssetPath, AssetRecord, BundledSource, GENERIC_ERROR, RemoteSource};
use crate::Error;
use crate::cache::{PersistentStore, key};

/// Serves asset text from the cache, falling back to the bundled copy.
#[derive(Clone)]
pub struct AssetReader {
    store: Arc<dyn PersistentStore>,
    bundle: Arc<dyn BundledSource>,
    remote: Arc<dyn RemoteSource>,
}

impl AssetReader {
    pub fn new(store: Arc<dyn PersistentStore>, bundle: Arc<dyn BundledSource>, remote: Arc<dyn RemoteSource>) -> Self {
        Self { store, bundle, remote }
    }

    /// Cache hit wins, then the bundled copy. Never touches the network and
    /// never writes the bundled copy into the cache.
    pub async fn get(&self, path: &AssetPath) -> AssetRecord {
        match self.store.read(&key::encode(path)).await {
            Ok(content) => {
                tracing::debug!(path = %path, "asset served from cache");
                return AssetRecord::ok(path.clone(), content);
            }
            Err(e) if e.is_not_found() => tracing::debug!(path = %path, "asset not cached"),
            Err(e) => tracing::error!(path = %path, error = %e, "cache read failed, using bundled copy"),
        }

        match self.bundle.read_bundled(path).await {
            Ok(content) => {
                tracing::debug!(path = %path, "asset served from bundle");
                AssetRecord::ok(path.clone(), content)
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "bundled read failed");
                AssetRecord::failed(path.clone())
            }
        }
    }

    /// Current remote text, bypassing cache and bundle. For inspection only;
    /// nothing is stored.
    pub async fn get_remote(&self, path: &AssetPath) -> AssetRecord {
        match self.remote.fetch_asset(path).await {
            Ok(content) => AssetRecord::ok(path.clone(), content),
            Err(Error::Http { status, reason }) => {
                tracing::error!(path = %path, status, "remote read rejected");
                let detail = if reason.is_empty() { status.to_string() } else { reason };
                AssetRecord::with_error(path.clone(), String::new(), format!("{GENERIC_ERROR} {detail}"))
            }
            Err(e) => {
                tracing::error!(path = %path, error = %e, "remote read failed");
                AssetRecord::failed(path.clone())
            }
        }
    }
}
