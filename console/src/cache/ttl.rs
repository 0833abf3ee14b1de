//! Time-bounded read cache
//!
//! Holds recently read documents for a short while so a dashboard render does
//! not download the same file several times. Entries expire after the
//! configured lifetime; a lifetime of zero disables the cache entirely.

use std::collections::HashMap;
use std::sync::RwLock;
use std::time::{Duration, Instant};

/// Cache entry
#[derive(Debug, Clone)]
struct TtlCacheEntry<V> {
    value: V,
    cached_at: Instant,
}

/// In-memory cache with per-entry expiry
pub struct TtlCache<V> {
    entries: RwLock<HashMap<String, TtlCacheEntry<V>>>,
    ttl: Duration,
    capacity: usize,
}

impl<V: Clone> TtlCache<V> {
    /// Create a new cache
    pub fn new(ttl: Duration, capacity: usize) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            ttl,
            capacity,
        }
    }

    pub fn is_enabled(&self) -> bool {
        !self.ttl.is_zero() && self.capacity > 0
    }

    /// Get a live entry
    pub fn get(&self, key: &str) -> Option<V> {
        if !self.is_enabled() {
            return None;
        }
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|e| e.cached_at.elapsed() < self.ttl)
            .map(|e| e.value.clone())
    }

    /// Insert an entry, evicting expired ones first and then the oldest
    pub fn insert(&self, key: impl Into<String>, value: V) {
        if !self.is_enabled() {
            return;
        }
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let key = key.into();

        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            let ttl = self.ttl;
            entries.retain(|_, e| e.cached_at.elapsed() < ttl);
        }
        if entries.len() >= self.capacity && !entries.contains_key(&key) {
            if let Some(oldest) = entries
                .iter()
                .min_by_key(|(_, e)| e.cached_at)
                .map(|(k, _)| k.clone())
            {
                entries.remove(&oldest);
            }
        }

        entries.insert(
            key,
            TtlCacheEntry {
                value,
                cached_at: Instant::now(),
            },
        );
    }

    /// Remove an entry
    pub fn invalidate(&self, key: &str) {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key);
    }

    /// Number of stored entries, live or not
    #[cfg(test)]
    fn len(&self) -> usize {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries.len()
    }
}
