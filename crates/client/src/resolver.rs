//! Resolution orchestration.
//!
//! The resolver composes the caches, the rate limiter, the provider registry,
//! and the scorer into the single public operation `resolve_archive`. A
//! lookup can always fail; what it can never do is crash the caller. Every
//! failure folds into a negative [`Resolution`], with `rate_limited` set when
//! the service pushed back.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use snapseek_core::{AppConfig, ArchiveService, Error, ErrorKind, LruCache, Resolution, Snapshot, TtlCache, is_archive_url};
use tokio::time::Instant;
use url::Url;

use crate::fetch::{FetchClient, FetchConfig, cache_key, canonicalize};
use crate::limit::RateLimiter;
use crate::provider::{SnapshotProvider, default_registry};
use crate::{score, title};

/// Resolution results (positive and negative) live this long.
pub const RESULT_CACHE_TTL: Duration = Duration::from_secs(5 * 60);
/// Scraped titles live this long.
pub const TITLE_CACHE_TTL: Duration = Duration::from_secs(24 * 60 * 60);
/// Bound on the title cache; past this, the least-recently-read entry goes.
pub const TITLE_CACHE_CAPACITY: usize = 256;

/// Transient failures are retried this many times, with 1s/2s backoff.
const MAX_RETRIES: u32 = 2;

/// The engine's shared mutable state: result cache, title cache, and the
/// per-service rate windows. Owned by the resolver rather than living as
/// globals, so tests and concurrent ports get isolated instances.
#[derive(Debug)]
pub struct Stores {
    pub results: TtlCache<Resolution>,
    pub titles: LruCache<String>,
    pub limiter: RateLimiter,
}

impl Stores {
    pub fn new() -> Self {
        Self {
            results: TtlCache::new(RESULT_CACHE_TTL),
            titles: LruCache::new(TITLE_CACHE_TTL, TITLE_CACHE_CAPACITY),
            limiter: RateLimiter::new(),
        }
    }
}

impl Default for Stores {
    fn default() -> Self {
        Self::new()
    }
}

/// Archive snapshot resolver.
pub struct Resolver {
    config: AppConfig,
    fetch: Arc<FetchClient>,
    providers: HashMap<ArchiveService, Box<dyn SnapshotProvider>>,
    stores: Stores,
}

impl Resolver {
    /// Build a resolver with the default provider registry.
    pub fn new(config: AppConfig) -> Result<Self, Error> {
        config.validate()?;

        let fetch = Arc::new(FetchClient::new(FetchConfig {
            user_agent: config.user_agent.clone(),
            timeout: config.timeout(),
            ..Default::default()
        })?);
        let providers = default_registry(fetch.clone(), config.max_snapshots);

        Ok(Self { config, fetch, providers, stores: Stores::new() })
    }

    /// Replace the provider registry. Seam for tests and for callers that
    /// bring their own service implementations.
    pub fn with_providers(mut self, providers: HashMap<ArchiveService, Box<dyn SnapshotProvider>>) -> Self {
        self.providers = providers;
        self
    }

    /// Resolve a URL to its existing archived snapshots.
    ///
    /// Returns `Err` only for malformed input or a service with no provider;
    /// lookup failures come back as a negative `Resolution`. Results are
    /// cached for [`RESULT_CACHE_TTL`], negative ones included; rate-limited
    /// outcomes are never cached, so a later manual retry is not suppressed.
    pub async fn resolve_archive(&self, original_url: &str) -> Result<Resolution, Error> {
        let url = canonicalize(original_url).map_err(|e| Error::InvalidUrl(e.to_string()))?;
        let key = cache_key(&url);

        if let Some(cached) = self.stores.results.get(&key).await {
            tracing::debug!(url = %url, "result cache hit");
            return Ok(cached);
        }

        let service = self.config.service;
        let provider = self
            .providers
            .get(&service)
            .ok_or_else(|| Error::UnsupportedService(service.to_string()))?;

        let mut retry = 0u32;
        loop {
            self.stores.limiter.wait_if_needed(service).await;

            let started = Instant::now();
            match provider.fetch_candidates(&url).await {
                Ok(candidates) => {
                    tracing::debug!(
                        service = %service,
                        candidates = candidates.len(),
                        elapsed = ?started.elapsed(),
                        "provider query complete"
                    );
                    let resolution = self.build_resolution(candidates, &url);
                    self.stores.results.insert(key, resolution.clone()).await;
                    return Ok(resolution);
                }
                Err(err) => {
                    let kind = err.kind();

                    if kind == ErrorKind::RateLimited {
                        // Retrying would worsen the condition; the caller's
                        // batch loop uses the flag as its stop signal.
                        tracing::warn!(service = %service, "rate limited, aborting lookup");
                        return Ok(Resolution::rate_limited());
                    }

                    if kind.is_retryable() && retry < MAX_RETRIES {
                        let backoff = Duration::from_secs(1 << retry);
                        tracing::debug!(service = %service, ?kind, ?backoff, "transient failure, backing off");
                        tokio::time::sleep(backoff).await;
                        retry += 1;
                        continue;
                    }

                    tracing::warn!(service = %service, ?kind, error = %err, "lookup failed");
                    return Ok(Resolution::miss());
                }
            }
        }
    }

    /// Best-effort page title for a URL; never fails. See [`crate::title`].
    pub async fn extract_title(&self, url: &str) -> String {
        title::extract_title(&self.fetch, &self.stores.titles, self.config.title_timeout(), url).await
    }

    /// Drop all cached results and titles. Rate windows are left alone: the
    /// remote services don't care that our caches were cleared.
    pub async fn clear_caches(&self) {
        self.stores.results.clear().await;
        self.stores.titles.clear().await;
    }

    /// Rank candidates, drop anything not on a recognized archive domain,
    /// and truncate to the configured maximum.
    fn build_resolution(&self, candidates: Vec<Snapshot>, url: &Url) -> Resolution {
        let recognized: Vec<Snapshot> = candidates
            .into_iter()
            .filter(|snapshot| {
                let ok = is_archive_url(&snapshot.url);
                if !ok {
                    tracing::warn!(url = %snapshot.url, "dropping candidate outside archive domains");
                }
                ok
            })
            .collect();

        if recognized.is_empty() {
            return Resolution::miss();
        }

        let mut ranked = score::rank(recognized, url);
        ranked.truncate(self.config.max_snapshots);
        Resolution::hit(ranked)
    }
}
