//! URL canonicalization and cache-key derivation.
//!
//! Original URLs are treated as opaque cache keys after normalization:
//! lowercase host, no trailing slash, fragment stripped, query preserved.

use sha2::{Digest, Sha256};

/// Error type for URL canonicalization failures.
#[derive(Debug, Clone, thiserror::Error)]
pub enum UrlError {
    #[error("empty URL")]
    Empty,

    #[error("unsupported scheme: {0}")]
    UnsupportedScheme(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),
}

/// Canonicalize a URL string for consistent caching and provider queries.
///
/// Normalization steps:
/// 1. Trim leading/trailing whitespace
/// 2. Default scheme to https:// if missing
/// 3. Lowercase the host
/// 4. Remove fragment (#...)
/// 5. Keep query string intact (do not reorder)
pub fn canonicalize(input: &str) -> Result<url::Url, UrlError> {
    let trimmed = input.trim();

    if trimmed.is_empty() {
        return Err(UrlError::Empty);
    }

    let url_str = if trimmed.contains("://") { trimmed.to_string() } else { format!("https://{trimmed}") };

    let mut parsed = url::Url::parse(&url_str).map_err(|e| UrlError::InvalidUrl(e.to_string()))?;

    match parsed.scheme() {
        "http" | "https" => {}
        scheme => return Err(UrlError::UnsupportedScheme(scheme.to_string())),
    }

    if let Some(mut host) = parsed.host_str() {
        let h = host.to_lowercase();
        host = h.as_str();
        parsed
            .set_host(Some(host))
            .map_err(|e| UrlError::InvalidUrl(e.to_string()))?;
    }

    parsed.set_fragment(None);

    Ok(parsed)
}

/// Render a canonical URL without its trailing slash.
///
/// `url::Url` cannot represent an empty path, so the "no trailing slash"
/// normalization happens at the string level, both for cache keys and for
/// splicing the original URL into archive URL templates.
pub fn normalized_str(url: &url::Url) -> String {
    let s = url.as_str();
    if url.query().is_none() && s.ends_with('/') { s.trim_end_matches('/').to_string() } else { s.to_string() }
}

/// Derive the opaque cache key for a canonical URL.
///
/// The key is a SHA-256 hex digest of the normalized URL string.
pub fn cache_key(url: &url::Url) -> String {
    let mut hasher = Sha256::new();
    hasher.update(normalized_str(url).as_bytes());
    hex::encode(hasher.finalize())
}
