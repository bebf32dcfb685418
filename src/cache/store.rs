//! Cache Store Module
//!
//! In-memory map from cache key to the last successfully fetched payload.

use std::collections::HashMap;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, trace};

use crate::cache::{CacheEntry, CacheKey, CacheStats};

// == Cache Store ==
/// Response cache consulted by the read path.
///
/// Entries are only ever replaced or removed: a store overwrites whatever was
/// under the key, and [`CacheStore::clear`] removes by prefix. Stale entries
/// are left in place because staleness depends on the TTL of each read.
#[derive(Debug, Default)]
pub struct CacheStore {
    /// Key-payload storage
    entries: HashMap<CacheKey, CacheEntry>,
    /// Read-path statistics
    stats: CacheStats,
}

impl CacheStore {
    // == Constructor ==
    /// Creates an empty CacheStore.
    pub fn new() -> Self {
        Self::default()
    }

    // == Get Fresh ==
    /// Returns the entry under `key` if it is younger than `ttl`.
    ///
    /// Counts a hit or a miss.
    pub fn get_fresh(&mut self, key: &CacheKey, ttl: Duration) -> Option<CacheEntry> {
        match self.entries.get(key) {
            Some(entry) if entry.is_fresh(ttl) => {
                trace!(key = %key, age_ms = entry.age().as_millis() as u64, "cache hit");
                self.stats.record_hit();
                Some(entry.clone())
            }
            _ => {
                trace!(key = %key, "cache miss");
                self.stats.record_miss();
                None
            }
        }
    }

    // == Insert ==
    /// Stores a payload under `key`, replacing any previous entry.
    pub fn insert(&mut self, key: CacheKey, payload: Value) {
        trace!(key = %key, "cache store");
        self.entries.insert(key, CacheEntry::new(payload));
        self.stats.record_store();
    }

    // == Clear ==
    /// Removes every entry, or only those whose key starts with `prefix`.
    ///
    /// An empty prefix behaves like no prefix. Returns the number of entries
    /// removed; clearing an empty cache is a no-op.
    pub fn clear(&mut self, prefix: Option<&str>) -> usize {
        let before = self.entries.len();
        match prefix.filter(|p| !p.is_empty()) {
            None => self.entries.clear(),
            Some(prefix) => self.entries.retain(|key, _| !key.starts_with(prefix)),
        }
        let removed = before - self.entries.len();
        debug!(prefix = prefix.unwrap_or(""), removed, "cache cleared");
        removed
    }

    /// Counts a read that joined another call's pending fetch.
    pub fn record_coalesced(&mut self) {
        self.stats.record_coalesced();
    }

    /// Returns true if an entry exists under `key`, fresh or not.
    pub fn contains(&self, key: &CacheKey) -> bool {
        self.entries.contains_key(key)
    }

    // == Stats ==
    /// Returns current cache statistics.
    pub fn stats(&self) -> CacheStats {
        let mut stats = self.stats.clone();
        stats.set_total_entries(self.entries.len());
        stats
    }

    // == Length ==
    /// Returns the current number of entries in the cache.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    // == Is Empty ==
    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::thread::sleep;

    const TTL: Duration = Duration::from_secs(60);

    fn key(path: &str) -> CacheKey {
        CacheKey::new(path, None)
    }

    #[test]
    fn test_store_new() {
        let store = CacheStore::new();
        assert_eq!(store.len(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_insert_and_get() {
        let mut store = CacheStore::new();

        store.insert(key("/a"), json!({"v": 1}));
        let entry = store.get_fresh(&key("/a"), TTL).unwrap();

        assert_eq!(entry.payload, json!({"v": 1}));
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_get_missing() {
        let mut store = CacheStore::new();
        assert!(store.get_fresh(&key("/missing"), TTL).is_none());
    }

    #[test]
    fn test_store_overwrite_replaces_payload() {
        let mut store = CacheStore::new();

        store.insert(key("/a"), json!({"first": true, "shared": 1}));
        store.insert(key("/a"), json!({"shared": 2}));

        let entry = store.get_fresh(&key("/a"), TTL).unwrap();
        assert_eq!(entry.payload, json!({"shared": 2}), "entries are replaced, never merged");
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_store_stale_entry_is_a_miss_but_kept() {
        let mut store = CacheStore::new();

        store.insert(key("/a"), json!(1));
        sleep(Duration::from_millis(120));

        assert!(store.get_fresh(&key("/a"), Duration::from_millis(100)).is_none());
        assert!(store.contains(&key("/a")));
        assert!(store.get_fresh(&key("/a"), TTL).is_some());
    }

    #[test]
    fn test_clear_all() {
        let mut store = CacheStore::new();
        store.insert(key("/api/foo"), json!(1));
        store.insert(key("/api/bar"), json!(2));

        assert_eq!(store.clear(None), 2);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_empty_prefix_clears_all() {
        let mut store = CacheStore::new();
        store.insert(key("/api/foo"), json!(1));

        assert_eq!(store.clear(Some("")), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_clear_by_prefix() {
        let mut store = CacheStore::new();
        store.insert(key("/api/foo"), json!(1));
        store.insert(CacheKey::new("/api/foo/1", Some(&json!({"x": 1}))), json!(2));
        store.insert(key("/api/bar"), json!(3));

        assert_eq!(store.clear(Some("/api/foo")), 2);
        assert_eq!(store.len(), 1);
        assert!(store.contains(&key("/api/bar")));
    }

    #[test]
    fn test_clear_is_idempotent() {
        let mut store = CacheStore::new();
        assert_eq!(store.clear(None), 0);
        assert_eq!(store.clear(Some("/api")), 0);
    }

    #[test]
    fn test_store_stats() {
        let mut store = CacheStore::new();

        store.insert(key("/a"), json!(1));
        store.get_fresh(&key("/a"), TTL); // hit
        store.get_fresh(&key("/b"), TTL); // miss
        store.record_coalesced();

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.stores, 1);
        assert_eq!(stats.coalesced, 1);
        assert_eq!(stats.total_entries, 1);
    }
}
