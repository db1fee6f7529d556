//! asset_update and asset_update_all tool implementations.
//!
//! Fetches from the remote root, verifies the SHA-256 content hash and
//! commits to the cache only when it matches.

use rmcp::{ErrorData as McpError, model::CallToolResult};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use sieve_core::{AssetRecord, Assets, ManifestEntry};

use super::parse_path;
use crate::error::ToolError;
use crate::tools::json_result;

/// Parameters for the asset_update tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetUpdateParams {
    /// Relative asset path, e.g. "assets/ublock/filters.txt".
    pub path: String,

    /// Lowercase hex SHA-256 of the expected content. Omit to commit unverified.
    pub expected_hash: Option<String>,

    /// Human-readable title, informational only.
    pub title: Option<String>,
}

impl AssetUpdateParams {
    fn into_entry(self) -> Result<ManifestEntry, ToolError> {
        let mut entry = ManifestEntry::new(parse_path(&self.path)?);
        entry.expected_hash = self.expected_hash;
        entry.title = self.title;
        Ok(entry)
    }
}

/// Parameters for the asset_update_all tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct AssetUpdateAllParams {
    /// Entries to update, processed in order.
    pub entries: Vec<AssetUpdateParams>,
}

/// Output from the asset_update_all tool.
#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
pub struct UpdateAllOutput {
    pub records: Vec<AssetRecord>,

    /// Committed updates whose content changed.
    pub changed_count: usize,
}

/// Implementation of the asset_update tool.
pub async fn update_impl(assets: &Assets, params: AssetUpdateParams) -> Result<CallToolResult, McpError> {
    let entry = params.into_entry()?;
    json_result(&assets.update(&entry).await)
}

/// Implementation of the asset_update_all tool.
pub async fn update_all_impl(assets: &Assets, params: AssetUpdateAllParams) -> Result<CallToolResult, McpError> {
    if params.entries.is_empty() {
        return Err(ToolError::InvalidInput("entries must not be empty".to_string()).into());
    }

    let entries = params
        .entries
        .into_iter()
        .map(AssetUpdateParams::into_entry)
        .collect::<Result<Vec<_>, _>>()?;

    let summary = assets.update_all(&entries).await;
    json_result(&UpdateAllOutput { records: summary.records, changed_count: summary.changed_count })
}
