//! Cache-busting HTTP fetch of remote assets.
//!
//! ### Cache bypass
//! - Every request carries a `<param>=<millis>-<seq>` query pair that is
//!   unique per call, so no intermediate HTTP cache can answer it.
//! - `Cache-Control: no-cache` and `Pragma: no-cache` are sent as well.
//!
//! ### Limits
//! - Max redirects: 5
//! - Max body bytes: 5MB (configurable)
//! - Timeouts surface as `FETCH_TIMEOUT`, other transport faults as
//!   `NETWORK_ERROR`, non-2xx statuses as `HTTP_ERROR`.
//!
//! No retries happen here.

pub mod url;

use async_trait::async_trait;
use bytes::Bytes;
use reqwest::Url;
use reqwest::{Client, StatusCode, header};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

pub use self::url::{UrlError, asset_url, cache_busted, parse_remote_root};

use sieve_core::assets::RemoteSource;
use sieve_core::{AppConfig, AssetPath, Error};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// Root that asset paths are resolved against.
    pub remote_root: Url,

    /// Name of the cache-busting query parameter (default: "sieve")
    pub cache_bust_param: String,

    /// User agent string (default: "sieve/0.1")
    pub user_agent: String,

    /// Maximum response body size in bytes (default: 5MB)
    pub max_bytes: usize,

    /// Request timeout (default: 20s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,

    /// Honour HTTP(S)_PROXY from the environment (default: true)
    pub use_system_proxy: bool,
}

impl FetchConfig {
    /// Derive the fetch settings from the application configuration.
    pub fn from_app_config(config: &AppConfig) -> Result<Self, Error> {
        let remote_root = parse_remote_root(&config.remote_root).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        Ok(Self {
            cache_bust_param: config.cache_bust_param.clone(),
            user_agent: config.user_agent.clone(),
            max_bytes: config.max_bytes,
            timeout: config.timeout(),
            ..Self::with_root(remote_root)
        })
    }

    /// Defaults for everything except the remote root.
    pub fn with_root(remote_root: Url) -> Self {
        Self {
            remote_root,
            cache_bust_param: "sieve".to_string(),
            user_agent: "sieve/0.1".to_string(),
            max_bytes: 5 * 1024 * 1024,
            timeout: Duration::from_millis(20000),
            max_redirects: 5,
            use_system_proxy: true,
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested, including the cache-busting pair
    pub url: Url,
    /// The final URL after redirects
    pub final_url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Content-Type header
    pub content_type: Option<String>,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as UTF-8; invalid sequences become U+FFFD.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// HTTP client for the remote asset root.
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
    sequence: AtomicU64,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let mut builder = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true);
        if !config.use_system_proxy {
            builder = builder.no_proxy();
        }
        let http = builder
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {}", e)))?;

        Ok(Self { http, config, sequence: AtomicU64::new(0) })
    }

    /// Unique per call: wall-clock millis plus a per-client sequence number.
    fn cache_bust_token(&self) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::Relaxed);
        format!("{}-{}", chrono::Utc::now().timestamp_millis(), seq)
    }

    /// Cache-bypassing GET of `url`.
    pub async fn fetch(&self, url: &Url) -> Result<FetchResponse, Error> {
        let start = Instant::now();
        let url = cache_busted(url, &self.config.cache_bust_param, &self.cache_bust_token());

        let response = self
            .http
            .get(url.as_str())
            .header(header::ACCEPT, "text/plain, */*;q=0.8")
            .header(header::CACHE_CONTROL, "no-cache")
            .header(header::PRAGMA, "no-cache")
            .send()
            .await
            .map_err(transport_error)?;

        let status = response.status();

        if !status.is_success() {
            return Err(Error::Http {
                status: status.as_u16(),
                reason: status.canonical_reason().unwrap_or("").to_string(),
            });
        }

        if let Some(len) = response.content_length()
            && len as usize > self.config.max_bytes
        {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", len, self.config.max_bytes)));
        }

        let final_url = response.url().clone();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.to_string());

        let bytes = response.bytes().await.map_err(transport_error)?;

        if bytes.len() > self.config.max_bytes {
            return Err(Error::FetchTooLarge(format!("{} bytes exceeds {}", bytes.len(), self.config.max_bytes)));
        }

        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, final_url, fetch_ms, bytes.len());

        Ok(FetchResponse { url, final_url, status, content_type, bytes, fetch_ms })
    }

    /// Cache-bypassing GET of `url`, decoded as text.
    pub async fn fetch_text(&self, url: &Url) -> Result<String, Error> {
        Ok(self.fetch(url).await?.text())
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}

fn transport_error(err: reqwest::Error) -> Error {
    if err.is_timeout() {
        Error::FetchTimeout(err.to_string())
    } else {
        Error::Network(err.to_string())
    }
}

#[async_trait]
impl RemoteSource for FetchClient {
    async fn fetch_asset(&self, path: &AssetPath) -> Result<String, Error> {
        let url = asset_url(&self.config.remote_root, path).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        self.fetch_text(&url).await
    }
}
