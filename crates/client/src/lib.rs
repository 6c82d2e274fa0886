//! Archive snapshot resolution engine for snapseek.
//!
//! This crate resolves web URLs to existing archived snapshots: it queries a
//! configured archive service through a provider registry, ranks the
//! candidates, and memoizes outcomes, while respecting each service's rate
//! limits and folding failures into a closed error taxonomy.

pub mod fetch;
pub mod limit;
pub mod provider;
pub mod resolver;
pub mod score;
pub mod title;

pub use fetch::{FetchClient, FetchConfig, FetchError, FetchResponse, cache_key, canonicalize};
pub use limit::RateLimiter;
pub use provider::{GhostArchiveProvider, SnapshotProvider, WaybackProvider};
pub use resolver::{Resolver, Stores};
