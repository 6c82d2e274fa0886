//! Snapshot providers, one per archive service.
//!
//! A provider knows how to query one service and parse its response into
//! snapshot candidates. Parse trouble is not an error: a provider that cannot
//! recognize a snapshot in a response returns an empty list, reserving
//! [`FetchError`] for genuine transport failures (timeouts, unexpected
//! statuses, resets). The resolver re-ranks candidates itself, so providers
//! make no ordering promises.

pub mod ghostarchive;
pub mod wayback;

pub use ghostarchive::GhostArchiveProvider;
pub use wayback::WaybackProvider;

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use snapseek_core::{ArchiveService, Snapshot};
use url::Url;

use crate::fetch::{FetchClient, FetchError};

/// Capability to query one archive service for snapshot candidates.
#[async_trait]
pub trait SnapshotProvider: Send + Sync {
    /// The service this provider speaks for.
    fn service(&self) -> ArchiveService;

    /// Query the service for snapshots of `url`.
    ///
    /// An empty list means "the service has no snapshot" (or the response was
    /// unparseable); an error means the request itself failed.
    async fn fetch_candidates(&self, url: &Url) -> Result<Vec<Snapshot>, FetchError>;
}

/// Build the default provider registry over a shared fetch client.
///
/// Adding a service means adding an entry here; the resolver dispatches
/// through the registry and never names providers directly.
pub fn default_registry(
    fetch: Arc<FetchClient>, result_limit: usize,
) -> HashMap<ArchiveService, Box<dyn SnapshotProvider>> {
    let mut registry: HashMap<ArchiveService, Box<dyn SnapshotProvider>> = HashMap::new();
    registry.insert(ArchiveService::Wayback, Box::new(WaybackProvider::new(fetch.clone(), result_limit)));
    registry.insert(ArchiveService::GhostArchive, Box::new(GhostArchiveProvider::new(fetch)));
    registry
}
