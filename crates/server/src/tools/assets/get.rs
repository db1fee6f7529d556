//! asset_get and asset_get_remote tool implementations.
//!
//! `asset_get` reads the cached copy, falling back to the bundled one.
//! `asset_get_remote` fetches from the remote root without touching the cache.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sieve_core::{AssetPath, Assets};

use super::parse_path;
use crate::tools::json_result;

/// Parameters for the asset_get and asset_get_remote tools.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetGetParams {
    /// Relative asset path, e.g. "assets/ublock/filters.txt".
    pub path: String,
}

/// Implementation of the asset_get tool.
pub async fn get_impl(assets: &Assets, params: AssetGetParams) -> Result<CallToolResult, McpError> {
    let path: AssetPath = parse_path(&params.path)?;
    json_result(&assets.get(&path).await)
}

/// Implementation of the asset_get_remote tool.
pub async fn get_remote_impl(assets: &Assets, params: AssetGetParams) -> Result<CallToolResult, McpError> {
    let path = parse_path(&params.path)?;
    json_result(&assets.get_remote(&path).await)
}
