//! Asset tools: local reads, remote reads, direct writes and verified updates.

pub mod get;
pub mod put;
pub mod update;

use sieve_core::AssetPath;

use crate::error::ToolError;

pub use get::{AssetGetParams, get_impl, get_remote_impl};
pub use put::{AssetPutParams, put_impl};
pub use update::{AssetUpdateAllParams, AssetUpdateParams, UpdateAllOutput, update_all_impl, update_impl};

fn parse_path(raw: &str) -> Result<AssetPath, ToolError> {
    AssetPath::new(raw).map_err(|e| ToolError::InvalidInput(e.to_string()))
}
