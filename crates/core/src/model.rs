//! Domain model: archive services, snapshots, and resolution results.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Hosts recognized as archive destinations. A snapshot URL must resolve to
/// one of these (or a subdomain) to be considered valid.
const ARCHIVE_HOSTS: &[&str] = &["web.archive.org", "archive.org", "ghostarchive.org"];

/// Archive services the engine knows how to query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArchiveService {
    /// Internet Archive Wayback Machine (CDX index API).
    Wayback,
    /// ghostarchive.org (direct probe + search page scrape).
    GhostArchive,
}

impl ArchiveService {
    /// All known services, in preference order.
    pub const ALL: &[ArchiveService] = &[ArchiveService::Wayback, ArchiveService::GhostArchive];

    /// Stable identifier used in configuration and logging.
    pub fn as_str(&self) -> &'static str {
        match self {
            ArchiveService::Wayback => "wayback",
            ArchiveService::GhostArchive => "ghostarchive",
        }
    }

    /// Minimum gap between consecutive requests to this service.
    ///
    /// The machine-readable Wayback index tolerates 1 req/s; GhostArchive is
    /// scraped HTML and gets a wider berth. These are properties of the
    /// remote services, not caller configuration.
    pub fn min_request_gap(&self) -> Duration {
        match self {
            ArchiveService::Wayback => Duration::from_secs(1),
            ArchiveService::GhostArchive => Duration::from_secs(2),
        }
    }

    /// Parse a configuration string into a service.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "wayback" => Some(ArchiveService::Wayback),
            "ghostarchive" => Some(ArchiveService::GhostArchive),
            _ => None,
        }
    }
}

impl fmt::Display for ArchiveService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Check whether a URL points at a recognized archive host.
pub fn is_archive_url(url: &str) -> bool {
    let Ok(parsed) = url::Url::parse(url) else {
        return false;
    };
    let Some(host) = parsed.host_str() else {
        return false;
    };
    ARCHIVE_HOSTS
        .iter()
        .any(|h| host == *h || host.ends_with(&format!(".{h}")))
}

/// A single archived copy of a page, as reported by one provider.
///
/// Immutable once created; several may exist for the same original URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// Absolute URL of the archived copy.
    pub url: String,
    /// Capture timestamp in the service's own format (14-digit for Wayback,
    /// free-form scraped text for GhostArchive, "unknown" when absent).
    pub timestamp: String,
    /// Page title, when the service reports one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

impl Snapshot {
    pub fn new(url: impl Into<String>, timestamp: impl Into<String>) -> Self {
        Self { url: url.into(), timestamp: timestamp.into(), title: None }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }
}

/// Terminal value of a resolution: the ranked snapshots, or a structured miss.
///
/// Cached verbatim (including the negative case) to suppress repeated failing
/// lookups within the cache window.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Resolution {
    /// Whether at least one snapshot was found.
    pub found: bool,
    /// URL of the best-ranked snapshot; equals `snapshots[0].url` when `found`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub best_url: Option<String>,
    /// Snapshots sorted by descending relevance.
    pub snapshots: Vec<Snapshot>,
    /// Set when the service refused us; the caller should stop the batch.
    pub rate_limited: bool,
}

impl Resolution {
    /// Build a positive result from ranked snapshots. Falls back to a miss if
    /// the list is empty.
    pub fn hit(snapshots: Vec<Snapshot>) -> Self {
        match snapshots.first() {
            Some(best) => Self {
                found: true,
                best_url: Some(best.url.clone()),
                snapshots,
                rate_limited: false,
            },
            None => Self::miss(),
        }
    }

    /// No snapshot exists (or the lookup failed non-recoverably).
    pub fn miss() -> Self {
        Self { found: false, best_url: None, snapshots: Vec::new(), rate_limited: false }
    }

    /// The service rate-limited us; never cached.
    pub fn rate_limited() -> Self {
        Self { found: false, best_url: None, snapshots: Vec::new(), rate_limited: true }
    }
}
