//! In-memory caches with lazy TTL expiry.
//!
//! Two shapes, both keyed by opaque strings and guarded by a tokio mutex so
//! the same instances can be shared across tasks:
//!
//! - [`TtlCache`]: unbounded, entries expire a fixed duration after insert.
//!   Used for resolution results (short TTL, including negative results).
//! - [`LruCache`]: TTL plus a hard capacity; inserting past capacity evicts
//!   the least-recently-read entry. Used for scraped page titles (long TTL).
//!
//! Expiry is lazy: an expired entry found on `get` is deleted and reported as
//! a miss. Nothing sweeps proactively.

use std::collections::HashMap;
use tokio::sync::Mutex;
use tokio::time::{Duration, Instant};

/// A cached value with its insertion timestamp.
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
}

impl<T> CacheEntry<T> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

/// TTL-bounded memoization keyed by string.
#[derive(Debug)]
pub struct TtlCache<T> {
    entries: Mutex<HashMap<String, CacheEntry<T>>>,
    ttl: Duration,
}

impl<T: Clone> TtlCache<T> {
    pub fn new(ttl: Duration) -> Self {
        Self { entries: Mutex::new(HashMap::new()), ttl }
    }

    /// Look up a key. Expired entries are deleted and reported as misses.
    pub async fn get(&self, key: &str) -> Option<T> {
        let mut entries = self.entries.lock().await;

        let expired = entries.get(key)?.is_expired(self.ttl);
        if expired {
            entries.remove(key);
            return None;
        }

        entries.get(key).map(|entry| entry.value.clone())
    }

    /// Store a value, replacing any previous entry wholesale.
    pub async fn insert(&self, key: impl Into<String>, value: T) {
        let mut entries = self.entries.lock().await;
        entries.insert(key.into(), CacheEntry { value, stored_at: Instant::now() });
    }

    pub async fn clear(&self) {
        self.entries.lock().await.clear();
    }

    /// Number of entries currently held, expired or not.
    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }
}

#[derive(Debug)]
struct LruEntry<T> {
    value: T,
    stored_at: Instant,
    last_used: u64,
}

impl<T> LruEntry<T> {
    fn is_expired(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() > ttl
    }
}

#[derive(Debug)]
struct LruState<T> {
    entries: HashMap<String, LruEntry<T>>,
    tick: u64,
}

/// Size-bounded TTL cache with least-recently-used eviction.
///
/// Every successful `get` touches the entry, moving it to the
/// most-recently-used position.
#[derive(Debug)]
pub struct LruCache<T> {
    state: Mutex<LruState<T>>,
    ttl: Duration,
    capacity: usize,
}

impl<T: Clone> LruCache<T> {
    /// `capacity` must be at least 1.
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        assert!(capacity > 0, "LruCache capacity must be at least 1");
        Self {
            state: Mutex::new(LruState { entries: HashMap::new(), tick: 0 }),
            ttl,
            capacity,
        }
    }

    pub async fn get(&self, key: &str) -> Option<T> {
        let mut state = self.state.lock().await;

        let expired = state.entries.get(key)?.is_expired(self.ttl);
        if expired {
            state.entries.remove(key);
            return None;
        }

        state.tick += 1;
        let tick = state.tick;
        let entry = state.entries.get_mut(key)?;
        entry.last_used = tick;
        Some(entry.value.clone())
    }

    /// Insert a value, evicting the least-recently-used entry if the cache is
    /// at capacity and the key is new.
    pub async fn insert(&self, key: impl Into<String>, value: T) {
        let key = key.into();
        let mut state = self.state.lock().await;

        if !state.entries.contains_key(&key)
            && state.entries.len() >= self.capacity
            && let Some(coldest) = state
                .entries
                .iter()
                .min_by_key(|(_, entry)| entry.last_used)
                .map(|(k, _)| k.clone())
        {
            tracing::debug!(key = %coldest, "cache at capacity, evicting least-recently-used entry");
            state.entries.remove(&coldest);
        }

        state.tick += 1;
        let tick = state.tick;
        state
            .entries
            .insert(key, LruEntry { value, stored_at: Instant::now(), last_used: tick });
    }

    pub async fn clear(&self) {
        self.state.lock().await.entries.clear();
    }

    pub async fn len(&self) -> usize {
        self.state.lock().await.entries.len()
    }
}
