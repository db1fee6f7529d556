//! Seam to the remote asset origin.

use async_trait::async_trait;

use super::AssetPath;
use crate::Error;

/// Fetches the current remote text of an asset.
///
/// Implementations resolve `path` against their configured remote root and
/// must defeat intermediate HTTP caches. No retries happen at this layer.
#[async_trait]
pub trait RemoteSource: Send + Sync {
    async fn fetch_asset(&self, path: &AssetPath) -> Result<String, Error>;
}
