//! Cache-related MCP tools.
//!
//! This module provides tools for inspecting the SQLite asset store.

pub mod status;

pub use status::{CacheStatusOutput, status_impl};
