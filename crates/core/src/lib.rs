//! Core types and shared functionality for snapseek.
//!
//! This crate provides:
//! - Domain model: archive services, snapshots, resolution results
//! - Error taxonomy and the failure classifier
//! - In-memory TTL and LRU caches
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod model;

pub use cache::{LruCache, TtlCache};
pub use config::AppConfig;
pub use error::{Error, ErrorKind};
pub use model::{ArchiveService, Resolution, Snapshot, is_archive_url};
