//! Configuration validation rules.
//!
//! This module provides validation logic for `AppConfig` values
//! after they have been loaded from environment, files, or defaults.

use crate::assets::AssetPath;
use crate::config::AppConfig;
use thiserror::Error;

/// Configuration validation errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    LoadFailed(String),

    #[error("invalid configuration: {field} - {reason}")]
    Invalid { field: String, reason: String },

    #[error("missing required configuration: {field} ({hint})")]
    Missing { field: String, hint: String },
}

fn invalid(field: &str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid { field: field.into(), reason: reason.into() }
}

impl AppConfig {
    /// Validate configuration values after loading.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Invalid` if:
    /// - `remote_root` is not an absolute http(s) URL ending in `/`
    /// - `user_prefix` is not a well-formed asset path
    /// - `package_version` is set but blank
    /// - `quota_bytes` is 0 or exceeds 1GiB
    /// - `max_bytes` is 0 or exceeds 50MB
    /// - `timeout_ms` is less than 100ms or exceeds 5 minutes
    /// - `user_agent` or `cache_bust_param` is empty
    ///
    /// Returns `ConfigError::Missing` if `remote_root` is empty.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.remote_root.is_empty() {
            return Err(ConfigError::Missing {
                field: "remote_root".into(),
                hint: "Set SIEVE_REMOTE_ROOT environment variable".into(),
            });
        }
        if !(self.remote_root.starts_with("https://") || self.remote_root.starts_with("http://")) {
            return Err(invalid("remote_root", "must be an http or https URL"));
        }
        if !self.remote_root.ends_with('/') {
            return Err(invalid("remote_root", "must end with '/'"));
        }

        if let Err(e) = AssetPath::new(self.user_prefix.clone()) {
            return Err(invalid("user_prefix", e.to_string()));
        }

        if self.package_version.as_deref().is_some_and(|v| v.trim().is_empty()) {
            return Err(invalid("package_version", "must not be blank when set"));
        }

        if self.quota_bytes == 0 {
            return Err(invalid("quota_bytes", "must be greater than 0"));
        }
        if self.quota_bytes > 1024 * 1024 * 1024 {
            return Err(invalid("quota_bytes", "must not exceed 1GiB"));
        }

        if self.max_bytes == 0 {
            return Err(invalid("max_bytes", "must be greater than 0"));
        }
        if self.max_bytes > 50 * 1024 * 1024 {
            return Err(invalid("max_bytes", "must not exceed 50MB"));
        }

        if self.timeout_ms < 100 {
            return Err(invalid("timeout_ms", "must be at least 100ms"));
        }
        if self.timeout_ms > 300_000 {
            return Err(invalid("timeout_ms", "must not exceed 5 minutes (300000ms)"));
        }

        if self.user_agent.is_empty() {
            return Err(invalid("user_agent", "must not be empty"));
        }
        if self.cache_bust_param.is_empty() {
            return Err(invalid("cache_bust_param", "must not be empty"));
        }

        if self.max_bytes as u64 > self.quota_bytes {
            tracing::warn!(
                max_bytes = self.max_bytes,
                quota_bytes = self.quota_bytes,
                "max_bytes exceeds quota_bytes; the largest downloads can never be cached"
            );
        }

        Ok(())
    }
}
