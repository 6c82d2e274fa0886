//! HTTP fetch pipeline shared by all providers.
//!
//! One `reqwest::Client` per engine instance, with a configured User-Agent,
//! timeout, and redirect limit. Unlike a general-purpose fetcher, `get` does
//! NOT treat non-2xx statuses as errors: a 404 from a probe endpoint is a
//! meaningful answer, so status interpretation belongs to the caller.
//! [`FetchError`] is reserved for transport failures and for statuses a
//! provider decides are fatal.

pub mod url;

use bytes::Bytes;
use reqwest::{Client, StatusCode, Url, header};
use std::sync::Arc;
use std::time::{Duration, Instant};

pub use url::{UrlError, cache_key, canonicalize, normalized_str};

use snapseek_core::{Error, ErrorKind};

/// Configuration for the fetch client.
#[derive(Debug, Clone)]
pub struct FetchConfig {
    /// User agent string (default: "snapseek/0.1")
    pub user_agent: String,

    /// Request timeout (default: 10s)
    pub timeout: Duration,

    /// Maximum number of redirects to follow (default: 5)
    pub max_redirects: usize,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self { user_agent: "snapseek/0.1".to_string(), timeout: Duration::from_millis(10_000), max_redirects: 5 }
    }
}

/// Transport-level failure raised at the provider boundary.
#[derive(Debug, Clone, thiserror::Error)]
pub enum FetchError {
    /// HTTP status a provider could not work with. The body is kept for the
    /// classifier (CAPTCHA markers, rate-limit messages).
    #[error("HTTP error: status {status}")]
    Http { status: u16, body: String },

    /// Request timeout.
    #[error("request timeout")]
    Timeout,

    /// Network error.
    #[error("network error: {0}")]
    Network(Arc<reqwest::Error>),
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() { FetchError::Timeout } else { FetchError::Network(Arc::new(err)) }
    }
}

impl FetchError {
    /// Build an HTTP-status error, truncating the body to what the classifier
    /// could plausibly need.
    pub fn http(status: StatusCode, body: impl Into<String>) -> Self {
        let mut body = body.into();
        if body.len() > 2048 {
            let mut end = 2048;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            body.truncate(end);
        }
        FetchError::Http { status: status.as_u16(), body }
    }

    /// Classify this failure into the closed error taxonomy.
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::Http { status, body } => ErrorKind::classify(Some(*status), body),
            FetchError::Timeout => ErrorKind::classify(None, "request timeout"),
            FetchError::Network(err) => ErrorKind::classify(None, &format!("network error: {err}")),
        }
    }
}

/// Response from a fetch operation.
#[derive(Debug, Clone)]
pub struct FetchResponse {
    /// The URL requested
    pub url: Url,
    /// HTTP status code
    pub status: StatusCode,
    /// Response body bytes
    pub bytes: Bytes,
    /// Time taken to fetch in milliseconds
    pub fetch_ms: u64,
}

impl FetchResponse {
    /// Body decoded as (lossy) UTF-8.
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.bytes).into_owned()
    }
}

/// HTTP fetch client shared across providers.
#[derive(Debug)]
pub struct FetchClient {
    http: Client,
    config: FetchConfig,
}

impl FetchClient {
    /// Create a new fetch client with the given configuration.
    pub fn new(config: FetchConfig) -> Result<Self, Error> {
        let http = Client::builder()
            .user_agent(&config.user_agent)
            .timeout(config.timeout)
            .redirect(reqwest::redirect::Policy::limited(config.max_redirects))
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::HttpClient(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    /// Fetch a URL with the client-wide timeout.
    pub async fn get(&self, url: &Url) -> Result<FetchResponse, FetchError> {
        self.request(url, None).await
    }

    /// Fetch a URL with a per-request timeout override (title fetches).
    pub async fn get_with_timeout(&self, url: &Url, timeout: Duration) -> Result<FetchResponse, FetchError> {
        self.request(url, Some(timeout)).await
    }

    async fn request(&self, url: &Url, timeout: Option<Duration>) -> Result<FetchResponse, FetchError> {
        let start = Instant::now();

        let mut request = self.http.get(url.clone()).header(
            header::ACCEPT,
            "text/html,application/xhtml+xml,application/json;q=0.9,*/*;q=0.8",
        );
        if let Some(timeout) = timeout {
            request = request.timeout(timeout);
        }

        let response = request.send().await?;
        let status = response.status();
        let bytes = response.bytes().await?;
        let fetch_ms = start.elapsed().as_millis() as u64;

        tracing::debug!("fetched {} -> {} in {}ms ({} bytes)", url, status, fetch_ms, bytes.len());

        Ok(FetchResponse { url: url.clone(), status, bytes, fetch_ms })
    }

    /// Get reference to the configuration.
    pub fn config(&self) -> &FetchConfig {
        &self.config
    }
}
