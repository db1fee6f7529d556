//! SQLite-backed persistent store for cached assets.
//!
//! This module provides the flat, quota-limited key space that holds cached
//! asset text, using SQLite with async access via tokio-rusqlite:
//!
//! - Bijective path-to-key flattening (`key`)
//! - Atomic whole-entry replacement (`store`)
//! - A small settings table for the cache version marker (`settings`)
//! - Lazy, memoized acquisition of the database (`handle`)
//! - Automatic schema migrations and WAL mode

pub mod connection;
pub mod handle;
pub mod hash;
pub mod key;
pub mod migrations;
pub mod settings;
pub mod store;

pub use crate::Error;

pub use connection::{CacheDb, DEFAULT_QUOTA_BYTES};
pub use handle::{StoreHandle, StoreLocation};
pub use key::StorageKey;
pub use settings::SettingsStore;
pub use store::PersistentStore;
