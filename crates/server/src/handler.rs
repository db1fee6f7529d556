//! MCP server handler implementation.
//!
//! This module defines the main server handler that
//! routes tool calls to the asset operations.
use std::sync::Arc;

use crate::tools::assets::{
    AssetGetParams, AssetPutParams, AssetUpdateAllParams, AssetUpdateParams, get_impl, get_remote_impl, put_impl,
    update_all_impl, update_impl,
};
use crate::tools::cache::status_impl;

use rmcp::{
    ErrorData as McpError, ServerHandler,
    handler::server::{
        tool::{ToolCallContext, ToolRouter},
        wrapper::Parameters,
    },
    model::{
        CallToolRequestParam, CallToolResult, Implementation, ListToolsResult, PaginatedRequestParam, ProtocolVersion,
        ServerCapabilities, ServerInfo,
    },
    service::{RequestContext, RoleServer},
    tool, tool_router,
};
use sieve_core::Assets;

/// The main MCP server handler for sieve-assets.
#[derive(Clone)]
pub struct SieveServer {
    assets: Arc<Assets>,
    tool_router: ToolRouter<Self>,
}

/// Tool router implementation using the #[tool_router] macro.
///
/// This macro generates the routing logic that maps tool names to handler methods.
#[tool_router]
impl SieveServer {
    /// Create a new server handler around a shared asset context.
    pub fn new(assets: Arc<Assets>) -> Self {
        Self { assets, tool_router: Self::tool_router() }
    }

    #[tool(description = "Read an asset from the local cache, falling back to the bundled copy. Never hits the network.")]
    async fn asset_get(&self, params: Parameters<AssetGetParams>) -> Result<CallToolResult, McpError> {
        get_impl(&self.assets, params.0).await
    }

    #[tool(description = "Fetch an asset from the remote root, bypassing HTTP caches. The result is not cached.")]
    async fn asset_get_remote(&self, params: Parameters<AssetGetParams>) -> Result<CallToolResult, McpError> {
        get_remote_impl(&self.assets, params.0).await
    }

    #[tool(description = "Write content directly into the cache. Intended for user-authored assets.")]
    async fn asset_put(&self, params: Parameters<AssetPutParams>) -> Result<CallToolResult, McpError> {
        put_impl(&self.assets, params.0).await
    }

    /// Fetch one asset and commit it only if its SHA-256 matches.
    #[tool(
        description = "Fetch an asset from the remote root and commit it to the cache if its SHA-256 matches expected_hash."
    )]
    async fn asset_update(&self, params: Parameters<AssetUpdateParams>) -> Result<CallToolResult, McpError> {
        update_impl(&self.assets, params.0).await
    }

    #[tool(description = "Run asset_update for each entry in order. Returns every record and the number that changed.")]
    async fn asset_update_all(&self, params: Parameters<AssetUpdateAllParams>) -> Result<CallToolResult, McpError> {
        update_all_impl(&self.assets, params.0).await
    }

    #[tool(description = "Report the package version, upgrade sweep state, cached asset paths and storage usage.")]
    async fn cache_status(&self) -> Result<CallToolResult, McpError> {
        status_impl(&self.assets).await
    }
}

impl ServerHandler for SieveServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            server_info: Implementation {
                name: "sieve-assets".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                ..Default::default()
            },
            protocol_version: ProtocolVersion::LATEST,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            ..Default::default()
        }
    }

    async fn list_tools(
        &self, _request: Option<PaginatedRequestParam>, _context: RequestContext<RoleServer>,
    ) -> Result<ListToolsResult, rmcp::model::ErrorData> {
        Ok(ListToolsResult { meta: None, tools: self.tool_router.list_all(), next_cursor: None })
    }

    async fn call_tool(
        &self, request: CallToolRequestParam, context: RequestContext<RoleServer>,
    ) -> Result<CallToolResult, rmcp::model::ErrorData> {
        self.tool_router
            .call(ToolCallContext::new(self, request, context))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::testing;

    #[test]
    fn test_router_lists_all_tools() {
        let (assets, _dir) = testing::assets(None);
        let server = SieveServer::new(Arc::new(assets));

        let mut names: Vec<String> = server
            .tool_router
            .list_all()
            .into_iter()
            .map(|tool| tool.name.to_string())
            .collect();
        names.sort();
        assert_eq!(
            names,
            ["asset_get", "asset_get_remote", "asset_put", "asset_update", "asset_update_all", "cache_status"]
        );
    }

    #[test]
    fn test_server_info() {
        let (assets, _dir) = testing::assets(None);
        let info = SieveServer::new(Arc::new(assets)).get_info();
        assert_eq!(info.server_info.name, "sieve-assets");
    }
}
