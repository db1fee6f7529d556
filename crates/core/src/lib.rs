//! Core types and shared functionality for sieve.
//!
//! This crate provides:
//! - The quota-limited SQLite asset store and its key codec
//! - Layered reads, verified updates and the upgrade purge
//! - Unified error types
//! - Configuration structures

pub mod assets;
pub mod cache;
pub mod config;
pub mod error;

pub use assets::{AssetPath, AssetRecord, Assets, AssetsOptions, ManifestEntry};
pub use cache::{CacheDb, StorageKey, StoreHandle};
pub use config::AppConfig;
pub use error::Error;
