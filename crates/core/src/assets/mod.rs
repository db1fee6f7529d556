//! Layered asset access on top of the persistent store.
//!
//! - Reads try the cache, then the bundled copy, and never hit the network.
//! - Updates fetch from the remote root, verify the content hash and only
//!   then commit to the cache.
//! - A one-time sweep purges non-user entries after a package upgrade.

pub mod bundled;
pub mod context;
pub mod path;
pub mod reader;
pub mod remote;
pub mod sync;
pub mod updater;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub use bundled::{BundledSource, DirBundle};
pub use context::{Assets, AssetsOptions};
pub use path::AssetPath;
pub use reader::AssetReader;
pub use remote::RemoteSource;
pub use sync::{CacheSynchronizer, SweepReport, SyncOutcome, SyncState};
pub use updater::{AssetUpdater, UpdateSummary};

/// Generic error marker reported when every layer failed.
pub const GENERIC_ERROR: &str = "Error";

/// Result of every asset operation.
///
/// A copy of the data; holding one gives no access to the store. `error` is
/// `None` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct AssetRecord {
    #[schemars(with = "String")]
    pub path: AssetPath,
    pub content: String,
    pub error: Option<String>,
}

impl AssetRecord {
    pub fn ok(path: AssetPath, content: String) -> Self {
        Self { path, content, error: None }
    }

    /// Empty content with the generic error marker.
    pub fn failed(path: AssetPath) -> Self {
        Self::with_error(path, String::new(), GENERIC_ERROR)
    }

    pub fn with_error(path: AssetPath, content: String, error: impl Into<String>) -> Self {
        Self { path, content, error: Some(error.into()) }
    }

    pub fn is_ok(&self) -> bool {
        self.error.is_none()
    }
}

/// An asset eligible for remote update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct ManifestEntry {
    #[schemars(with = "String")]
    pub path: AssetPath,

    /// Lowercase hex SHA-256 of the expected content. Absent or blank means
    /// the download is committed unverified.
    #[serde(default)]
    pub expected_hash: Option<String>,

    #[serde(default)]
    pub title: Option<String>,
}

impl ManifestEntry {
    pub fn new(path: AssetPath) -> Self {
        Self { path, expected_hash: None, title: None }
    }

    pub fn with_hash(mut self, hash: impl Into<String>) -> Self {
        self.expected_hash = Some(hash.into());
        self
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The expected hash, treating a blank value as unset.
    pub fn expected_hash(&self) -> Option<&str> {
        self.expected_hash.as_deref().map(str::trim).filter(|h| !h.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failed_record() {
        let record = AssetRecord::failed(AssetPath::new("assets/x.txt").unwrap());
        assert_eq!(record.content, "");
        assert_eq!(record.error.as_deref(), Some("Error"));
        assert!(!record.is_ok());
    }

    #[test]
    fn test_manifest_entry_deserialize_defaults() {
        let entry: ManifestEntry = serde_json::from_str(r#"{"path": "assets/ublock/filters.txt"}"#).unwrap();
        assert_eq!(entry.path.as_str(), "assets/ublock/filters.txt");
        assert_eq!(entry.expected_hash(), None);
        assert_eq!(entry.title, None);
    }

    #[test]
    fn test_blank_expected_hash_is_unset() {
        let entry = ManifestEntry::new(AssetPath::new("assets/x.txt").unwrap()).with_hash("  ");
        assert_eq!(entry.expected_hash(), None);
    }
}
