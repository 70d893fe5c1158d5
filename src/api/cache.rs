//! In-memory response cache keyed by request URL.
//!
//! Entries expire after a fixed TTL. Every read sweeps expired entries
//! first, so the cache never serves stale payloads and does not need a
//! background task. Capacity is bounded; the least recently used entry is
//! evicted when the bound is hit.
use lru::LruCache;
use std::num::NonZeroUsize;
use std::time::{Duration, Instant};

/// Distinct URLs kept by default. The plugin touches a few dozen endpoints
/// in a typical browsing session.
const DEFAULT_CAPACITY: usize = 128;

#[derive(Debug)]
struct CacheSlot {
    body: String,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct ResponseCache {
    entries: LruCache<String, CacheSlot>,
    ttl: Duration,
}

impl ResponseCache {
    pub fn new(ttl: Duration) -> Self {
        Self::with_capacity(DEFAULT_CAPACITY, ttl)
    }

    pub fn with_capacity(capacity: usize, ttl: Duration) -> Self {
        let capacity = NonZeroUsize::new(capacity).unwrap_or(NonZeroUsize::MIN);
        Self {
            entries: LruCache::new(capacity),
            ttl,
        }
    }

    /// Returns the body stored for `url`, dropping every expired entry
    /// first.
    pub fn get(&mut self, url: &str) -> Option<String> {
        self.sweep();
        self.entries.get(url).map(|slot| slot.body.clone())
    }

    pub fn put(&mut self, url: &str, body: String) {
        self.entries.put(
            url.to_string(),
            CacheSlot {
                body,
                stored_at: Instant::now(),
            },
        );
    }

    fn sweep(&mut self) {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, slot)| slot.stored_at.elapsed() > self.ttl)
            .map(|(url, _)| url.clone())
            .collect();
        for url in expired {
            self.entries.pop(&url);
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}
