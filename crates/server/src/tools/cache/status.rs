//! cache_status tool implementation.
//!
//! Reports the package version, synchronizer state and what the store holds.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sieve_core::Assets;
use sieve_core::assets::SyncOutcome;
use sieve_core::cache::{PersistentStore, key};

use crate::tools::json_result;

/// Output from the cache_status tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct CacheStatusOutput {
    pub package_version: String,

    /// "unchecked", "up_to_date", "skipped" or "swept".
    pub sync: String,

    /// Entries removed by the upgrade sweep, when one ran.
    pub swept: Option<usize>,

    /// Decoded asset paths currently cached, in key order.
    pub entries: Vec<String>,

    /// Stored keys that do not decode to an asset path.
    pub undecodable: usize,

    pub usage_bytes: u64,
    pub quota_bytes: u64,
}

/// Implementation of the cache_status tool.
pub async fn status_impl(assets: &Assets) -> Result<CallToolResult, McpError> {
    let store = assets.store();
    let keys = store.list_all().await?;
    let usage_bytes = store.acquire().await?.usage_bytes().await?;

    let mut entries = Vec::with_capacity(keys.len());
    let mut undecodable = 0;
    for stored in &keys {
        match key::decode(stored) {
            Ok(path) => entries.push(path.to_string()),
            Err(_) => undecodable += 1,
        }
    }

    let (sync, swept) = match assets.sync_outcome() {
        None => ("unchecked", None),
        Some(SyncOutcome::UpToDate) => ("up_to_date", None),
        Some(SyncOutcome::Skipped) => ("skipped", None),
        Some(SyncOutcome::Swept(report)) => ("swept", Some(report.removed)),
    };

    let output = CacheStatusOutput {
        package_version: assets.package_version().to_string(),
        sync: sync.to_string(),
        swept,
        entries,
        undecodable,
        usage_bytes,
        quota_bytes: store.quota_bytes(),
    };
    json_result(&output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;
    use sieve_core::{AssetPath, StorageKey};

    #[tokio::test]
    async fn test_status_empty_store() {
        let (assets, _dir) = testing::assets(None);
        let result = status_impl(&assets).await.unwrap();
        let output: CacheStatusOutput = testing::decode(&result);
        assert_eq!(output.package_version, "0.2.0");
        assert_eq!(output.sync, "unchecked");
        assert!(output.entries.is_empty());
        assert_eq!(output.usage_bytes, 0);
    }

    #[tokio::test]
    async fn test_status_lists_entries() {
        let (assets, _dir) = testing::assets(None);
        assets.put(&AssetPath::new("assets/user/my_list.txt").unwrap(), "abc".into()).await;
        assets.store().write_atomic(&StorageKey::from_raw("bad_key"), "x").await.unwrap();
        assets.synchronize().await;

        let result = status_impl(&assets).await.unwrap();
        let output: CacheStatusOutput = testing::decode(&result);
        assert_eq!(output.entries, vec!["assets/user/my_list.txt".to_string()]);
        assert_eq!(output.undecodable, 1);
        assert_eq!(output.usage_bytes, 4);
        assert_ne!(output.sync, "unchecked");
    }
}
