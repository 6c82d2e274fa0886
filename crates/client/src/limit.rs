//! Per-service request spacing.
//!
//! Archive services tolerate a bounded request rate; the limiter enforces the
//! minimum inter-request gap each service declares. One lane per service: the
//! lock is held across the sleep, so even racing callers exit in single file
//! with at least the gap between consecutive completions.

use std::collections::HashMap;

use snapseek_core::ArchiveService;
use tokio::sync::Mutex;
use tokio::time::Instant;

/// Tracks the last request instant per service and enforces the minimum gap.
///
/// The per-service gaps come from [`ArchiveService::min_request_gap`]; they
/// model the remote service and are not caller-configurable. State lives for
/// the life of the process.
#[derive(Debug, Default)]
pub struct RateLimiter {
    last_request: Mutex<HashMap<ArchiveService, Instant>>,
}

impl RateLimiter {
    pub fn new() -> Self {
        Self { last_request: Mutex::new(HashMap::new()) }
    }

    /// Suspend the caller until the service's minimum gap has elapsed since
    /// its previous request, then stamp the window with `now`. The first call
    /// for a service never waits.
    pub async fn wait_if_needed(&self, service: ArchiveService) {
        let mut last = self.last_request.lock().await;

        if let Some(prev) = last.get(&service) {
            let gap = service.min_request_gap();
            let elapsed = prev.elapsed();
            if elapsed < gap {
                tracing::debug!(service = %service, wait = ?(gap - elapsed), "rate limiter waiting");
                tokio::time::sleep(gap - elapsed).await;
            }
        }

        last.insert(service, Instant::now());
    }
}
