//! Fixed-TTL memoization for slowly-changing device facts.
//!
//! Freshness is computed at read time: `get` only returns an entry younger
//! than the TTL. Stale entries are ignored rather than evicted, so the map
//! can grow by one entry per distinct key over the client's lifetime.

use std::collections::HashMap;
use std::time::{Duration, Instant};

use super::types::{DeviceMemory, StorageInfo};

/// How long a cached device fact stays fresh.
pub const DEFAULT_TTL: Duration = Duration::from_secs(5 * 60);

/// The value shapes the facade memoizes.
#[derive(Debug, Clone)]
pub enum CacheValue {
    Text(String),
    Memory(DeviceMemory),
    Storage(Vec<StorageInfo>),
}

#[derive(Debug)]
struct CacheEntry {
    value: CacheValue,
    stored_at: Instant,
}

#[derive(Debug)]
pub struct TtlCache {
    entries: HashMap<String, CacheEntry>,
    ttl: Duration,
}

impl TtlCache {
    pub fn new() -> Self {
        Self::with_ttl(DEFAULT_TTL)
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        TtlCache {
            entries: HashMap::new(),
            ttl,
        }
    }

    /// Returns the cached value iff one exists and is younger than the TTL.
    pub fn get(&self, key: &str) -> Option<&CacheValue> {
        let entry = self.entries.get(key)?;
        if entry.stored_at.elapsed() < self.ttl {
            Some(&entry.value)
        } else {
            None
        }
    }

    pub fn set(&mut self, key: &str, value: CacheValue) {
        self.entries.insert(
            key.to_string(),
            CacheEntry {
                value,
                stored_at: Instant::now(),
            },
        );
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for TtlCache {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn get_after_set_within_ttl() {
        let mut cache = TtlCache::new();
        cache.set("name", CacheValue::Text("walleye".to_string()));
        match cache.get("name") {
            Some(CacheValue::Text(v)) => assert_eq!(v, "walleye"),
            other => panic!("unexpected cache state: {other:?}"),
        }
    }

    #[test]
    fn get_missing_key() {
        let cache = TtlCache::new();
        assert!(cache.get("name").is_none());
    }

    #[test]
    fn expired_entry_is_ignored_but_kept() {
        let mut cache = TtlCache::with_ttl(Duration::from_millis(20));
        cache.set("memory", CacheValue::Text("snapshot".to_string()));
        assert!(cache.get("memory").is_some());

        std::thread::sleep(Duration::from_millis(40));

        assert!(cache.get("memory").is_none(), "stale entry must read as absent");
        assert_eq!(cache.len(), 1, "stale entry stays in the map");
    }

    #[test]
    fn set_refreshes_timestamp() {
        let mut cache = TtlCache::with_ttl(Duration::from_millis(60));
        cache.set("props", CacheValue::Text("old".to_string()));
        std::thread::sleep(Duration::from_millis(40));

        cache.set("props", CacheValue::Text("new".to_string()));
        std::thread::sleep(Duration::from_millis(40));

        // 80ms after the first set, but only 40ms after the refresh.
        match cache.get("props") {
            Some(CacheValue::Text(v)) => assert_eq!(v, "new"),
            other => panic!("unexpected cache state: {other:?}"),
        }
        assert_eq!(cache.len(), 1);
    }
}
