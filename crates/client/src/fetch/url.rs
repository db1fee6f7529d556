//! Remote URL construction.

use sieve_core::AssetPath;

/// Error type for remote URL failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("remote root must end with '/': {0}")]
    NotADirectory(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Parse and normalize the remote root asset paths are resolved against.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Require an http or https scheme
/// 3. Lowercase the host
/// 4. Remove fragment (#...) and query
/// 5. Require the path to end in `/`
pub fn parse_remote_root(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let mut parsed = url::Url::parse(trimmed).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(host) = parsed.host_str().map(str::to_lowercase) {
        parsed
            .set_host(Some(&host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);
    parsed.set_query(None);

    if !parsed.path().ends_with('/') {
        return Err(UrlError::NotADirectory(parsed.to_string()));
    }

    Ok(parsed)
}

/// Resolve an asset path under `root`, one URL segment per path segment.
///
/// Segments are percent-encoded, so characters such as `?`, `#` or `:` in an
/// asset name can never change the URL structure.
pub fn asset_url(root: &url::Url, path: &AssetPath) -> Result<url::Url, UrlError> {
    let mut url = root.clone();
    url.path_segments_mut()
        .map_err(|_| UrlError::InvalidUrl(format!("cannot-be-a-base URL: {root}")))?
        .pop_if_empty()
        .extend(path.segments());
    Ok(url)
}

/// Append a cache-busting query pair, keeping any existing query.
pub fn cache_busted(url: &url::Url, param: &str, token: &str) -> url::Url {
    let mut busted = url.clone();
    busted.query_pairs_mut().append_pair(param, token);
    busted
}
