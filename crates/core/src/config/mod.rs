//! Application configuration with layered loading.
//!
//! This module provides configuration management using figment for layered
//! configuration loading from multiple sources:
//!
//! 1. Environment variables (SIEVE_*)
//! 2. TOML config file (if SIEVE_CONFIG_FILE set)
//! 3. Built-in defaults

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};

use crate::cache::DEFAULT_QUOTA_BYTES;

mod validation;

pub use validation::ConfigError;

/// Application configuration with layered loading.
///
/// Loading precedence (highest wins):
/// 1. Environment variables (SIEVE_*)
/// 2. TOML config file (if SIEVE_CONFIG_FILE set)
/// 3. Built-in defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// Path to the SQLite asset store.
    ///
    /// Set via SIEVE_DB_PATH environment variable.
    #[serde(default = "default_db_path")]
    pub db_path: PathBuf,

    /// Install directory holding the bundled copies of assets.
    ///
    /// Set via SIEVE_BUNDLE_ROOT environment variable.
    #[serde(default = "default_bundle_root")]
    pub bundle_root: PathBuf,

    /// Remote root that asset paths are resolved against. Must end in `/`.
    ///
    /// Set via SIEVE_REMOTE_ROOT environment variable.
    #[serde(default = "default_remote_root")]
    pub remote_root: String,

    /// Path prefix of user-authored assets.
    ///
    /// Set via SIEVE_USER_PREFIX environment variable.
    #[serde(default = "default_user_prefix")]
    pub user_prefix: String,

    /// Version of the running package; defaults to the crate version.
    ///
    /// Set via SIEVE_PACKAGE_VERSION environment variable.
    #[serde(default)]
    pub package_version: Option<String>,

    /// Maximum total bytes held by the asset store.
    ///
    /// Set via SIEVE_QUOTA_BYTES environment variable.
    #[serde(default = "default_quota_bytes")]
    pub quota_bytes: u64,

    /// User-Agent string for HTTP requests.
    ///
    /// Set via SIEVE_USER_AGENT environment variable.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// HTTP request timeout in milliseconds.
    ///
    /// Set via SIEVE_TIMEOUT_MS environment variable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,

    /// Maximum bytes to fetch per request.
    ///
    /// Set via SIEVE_MAX_BYTES environment variable.
    #[serde(default = "default_max_bytes")]
    pub max_bytes: usize,

    /// Query parameter appended to remote URLs to bypass HTTP caches.
    ///
    /// Set via SIEVE_CACHE_BUST_PARAM environment variable.
    #[serde(default = "default_cache_bust_param")]
    pub cache_bust_param: String,
}

fn default_db_path() -> PathBuf {
    PathBuf::from("./sieve-assets.sqlite")
}

fn default_bundle_root() -> PathBuf {
    PathBuf::from(".")
}

fn default_remote_root() -> String {
    "https://raw.githubusercontent.com/gorhill/uBlock/master/".into()
}

fn default_user_prefix() -> String {
    "assets/user".into()
}

fn default_quota_bytes() -> u64 {
    DEFAULT_QUOTA_BYTES
}

fn default_user_agent() -> String {
    "sieve/0.1".into()
}

fn default_timeout_ms() -> u64 {
    20_000
}

fn default_max_bytes() -> usize {
    5_242_880 // 5MB
}

fn default_cache_bust_param() -> String {
    "sieve".into()
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bundle_root: default_bundle_root(),
            remote_root: default_remote_root(),
            user_prefix: default_user_prefix(),
            package_version: None,
            quota_bytes: default_quota_bytes(),
            user_agent: default_user_agent(),
            timeout_ms: default_timeout_ms(),
            max_bytes: default_max_bytes(),
            cache_bust_param: default_cache_bust_param(),
        }
    }
}

impl AppConfig {
    /// Timeout as Duration for use with reqwest/tokio.
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    /// The running package version used by the cache synchronizer.
    pub fn package_version(&self) -> &str {
        self.package_version.as_deref().unwrap_or(env!("CARGO_PKG_VERSION"))
    }

    /// Load configuration from all sources with layered precedence.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the file or environment cannot be parsed,
    /// or if validation fails after loading.
    pub fn load() -> Result<Self, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Ok(config_path) = std::env::var("SIEVE_CONFIG_FILE") {
            figment = figment.merge(Toml::file(&config_path));
        }

        figment = figment.merge(
            Env::prefixed("SIEVE_")
                .ignore(&["CONFIG_FILE"])
                .map(|key| key.as_str().to_lowercase().into())
                .split("__"),
        );

        let config: Self = figment.extract().map_err(|e| ConfigError::LoadFailed(e.to_string()))?;

        config.validate()?;

        Ok(config)
    }
}
