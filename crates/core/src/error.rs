//! Unified error types for sieve.
//!
//! Every variant renders with a stable upper-case code prefix; the bare code
//! is what ends up in an [`AssetRecord`](crate::AssetRecord) error field.

use rmcp::model::{ErrorCode, ErrorData as McpError};
use tokio_rusqlite::rusqlite;

/// Unified error types for the asset cache.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Invalid input parameters (e.g., empty content for a tool call).
    #[error("INVALID_INPUT: {0}")]
    InvalidInput(String),

    /// No cached entry exists for the given storage key.
    #[error("NOT_FOUND: {0}")]
    NotFound(String),

    /// Storage operation failed.
    #[error("CACHE_ERROR: {0}")]
    Database(tokio_rusqlite::Error),

    /// Migration failed to apply.
    #[error("CACHE_ERROR: migration failed: {0}")]
    MigrationFailed(String),

    /// Write rejected because the store would grow past its quota.
    #[error("QUOTA_EXCEEDED: {needed} bytes needed, quota is {quota}")]
    QuotaExceeded { needed: u64, quota: u64 },

    /// The bundled copy of an asset could not be read.
    #[error("BUNDLE_ERROR: {0}")]
    Bundle(String),

    /// Transport failure talking to the remote root.
    #[error("NETWORK_ERROR: {0}")]
    Network(String),

    /// Fetch timeout.
    #[error("FETCH_TIMEOUT: {0}")]
    FetchTimeout(String),

    /// Fetch response too large.
    #[error("FETCH_TOO_LARGE: {0}")]
    FetchTooLarge(String),

    /// Non-2xx HTTP response.
    #[error("HTTP_ERROR: {status} {reason}")]
    Http { status: u16, reason: String },

    /// Invalid URL.
    #[error("INVALID_URL: {0}")]
    InvalidUrl(String),

    /// Downloaded content does not match the manifest hash.
    #[error("INTEGRITY_ERROR: expected {expected}, computed {actual}")]
    Integrity { expected: String, actual: String },

    /// Programmer misuse: malformed asset path or storage key.
    #[error("PACKAGE_ERROR: {0}")]
    Package(String),
}

impl Error {
    /// The bare error code, without the message.
    pub fn code(&self) -> &'static str {
        match self {
            Error::InvalidInput(_) => "INVALID_INPUT",
            Error::NotFound(_) => "NOT_FOUND",
            Error::Database(_) | Error::MigrationFailed(_) => "CACHE_ERROR",
            Error::QuotaExceeded { .. } => "QUOTA_EXCEEDED",
            Error::Bundle(_) => "BUNDLE_ERROR",
            Error::Network(_) => "NETWORK_ERROR",
            Error::FetchTimeout(_) => "FETCH_TIMEOUT",
            Error::FetchTooLarge(_) => "FETCH_TOO_LARGE",
            Error::Http { .. } => "HTTP_ERROR",
            Error::InvalidUrl(_) => "INVALID_URL",
            Error::Integrity { .. } => "INTEGRITY_ERROR",
            Error::Package(_) => "PACKAGE_ERROR",
        }
    }

    /// Whether this is the expected "nothing cached yet" outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

impl From<tokio_rusqlite::Error<Error>> for Error {
    fn from(err: tokio_rusqlite::Error<Error>) -> Self {
        match err {
            tokio_rusqlite::Error::Error(e) => e,
            tokio_rusqlite::Error::ConnectionClosed => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
            tokio_rusqlite::Error::Close(c) => Error::Database(tokio_rusqlite::Error::Close(c)),
            _ => Error::Database(tokio_rusqlite::Error::ConnectionClosed),
        }
    }
}

impl From<tokio_rusqlite::Error<rusqlite::Error>> for Error {
    fn from(err: tokio_rusqlite::Error<rusqlite::Error>) -> Self {
        Error::Database(err)
    }
}

impl From<rusqlite::Error> for Error {
    fn from(err: rusqlite::Error) -> Self {
        Error::Database(tokio_rusqlite::Error::Error(err))
    }
}

impl From<Error> for McpError {
    fn from(err: Error) -> Self {
        let code = match &err {
            Error::InvalidInput(_) | Error::Package(_) | Error::InvalidUrl(_) => -32602,
            Error::NotFound(_) => -32001,
            Error::Database(_) | Error::MigrationFailed(_) => -32002,
            Error::QuotaExceeded { .. } => -32003,
            Error::Bundle(_) => -32004,
            Error::Network(_) => -32005,
            Error::FetchTimeout(_) => -32006,
            Error::FetchTooLarge(_) => -32007,
            Error::Http { .. } => -32008,
            Error::Integrity { .. } => -32009,
        };

        McpError { code: ErrorCode(code), message: err.to_string().into(), data: None }
    }
}
