//! asset_put tool implementation.
//!
//! Writes content straight into the cache, without fetching or verifying.
//! Meant for user-authored assets.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sieve_core::Assets;

use super::parse_path;
use crate::tools::json_result;

/// Parameters for the asset_put tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetPutParams {
    /// Relative asset path, e.g. "assets/user/filters.txt".
    pub path: String,

    /// Text to store.
    pub content: String,
}

/// Implementation of the asset_put tool.
pub async fn put_impl(assets: &Assets, params: AssetPutParams) -> Result<CallToolResult, McpError> {
    let path = parse_path(&params.path)?;
    if !path.starts_with(assets.user_prefix()) {
        tracing::warn!(path = %path, "direct write outside the user namespace; it will be purged on upgrade");
    }
    json_result(&assets.put(&path, params.content).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::assets::{AssetGetParams, get_impl};
    use crate::tools::testing;
    use sieve_core::AssetRecord;

    #[tokio::test]
    async fn test_put_then_get() {
        let (assets, _dir) = testing::assets(None);
        let params = AssetPutParams { path: "assets/user/filters.txt".into(), content: "||example.org^".into() };
        let result = put_impl(&assets, params).await.unwrap();
        let record: AssetRecord = testing::decode(&result);
        assert!(record.is_ok());

        let result = get_impl(&assets, AssetGetParams { path: "assets/user/filters.txt".into() })
            .await
            .unwrap();
        let record: AssetRecord = testing::decode(&result);
        assert_eq!(record.content, "||example.org^");
    }

    #[tokio::test]
    async fn test_put_invalid_path() {
        let (assets, _dir) = testing::assets(None);
        let params = AssetPutParams { path: String::new(), content: "x".into() };
        assert!(put_impl(&assets, params).await.is_err());
    }
}
