//! Time-boxed memoization.
//!
//! - An entry is served only while `elapsed < ttl` since it was last stored
//! - Expired entries are dropped lazily on `put`
//! - Values are cloned out; callers never hold a lock

use std::collections::HashMap;
use std::hash::Hash;
use std::sync::RwLock;
use std::time::{Duration, Instant};

#[derive(Debug, Clone)]
struct Entry<V> {
    value: V,
    stored_at: Instant,
    ttl: Duration,
}

impl<V> Entry<V> {
    fn is_live(&self, now: Instant) -> bool {
        now.saturating_duration_since(self.stored_at) < self.ttl
    }
}

/// A map whose entries expire a fixed time after they are stored
#[derive(Debug)]
pub struct TtlCache<K, V> {
    entries: RwLock<HashMap<K, Entry<V>>>,
}

impl<K, V> TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Value for `key` if present and not expired
    pub fn get(&self, key: &K) -> Option<V> {
        let entries = self.entries.read().unwrap_or_else(|e| e.into_inner());
        entries
            .get(key)
            .filter(|entry| entry.is_live(Instant::now()))
            .map(|entry| entry.value.clone())
    }

    /// Store `value`, replacing any previous entry and restarting its clock
    pub fn put(&self, key: K, value: V, ttl: Duration) {
        let now = Instant::now();
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.retain(|_, entry| entry.is_live(now));
        entries.insert(
            key,
            Entry {
                value,
                stored_at: now,
                ttl,
            },
        );
    }

    /// Drop the entry for `key`; returns whether one existed
    pub fn invalidate(&self, key: &K) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        entries.remove(key).is_some()
    }

    /// Drop every entry whose key matches; returns how many were dropped
    pub fn invalidate_where(&self, mut pred: impl FnMut(&K) -> bool) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(|e| e.into_inner());
        let before = entries.len();
        entries.retain(|key, _| !pred(key));
        before - entries.len()
    }

}

impl<K, V> Default for TtlCache<K, V>
where
    K: Eq + Hash,
    V: Clone,
{
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const LONG: Duration = Duration::from_secs(60);

    #[test]
    fn test_get_returns_live_entry() {
        let cache = TtlCache::new();
        cache.put("freios", 1, LONG);
        assert_eq!(cache.get(&"freios"), Some(1));
        assert_eq!(cache.get(&"motor"), None);
    }

    #[test]
    fn test_zero_ttl_is_never_served() {
        let cache = TtlCache::new();
        cache.put("freios", 1, Duration::ZERO);
        assert_eq!(cache.get(&"freios"), None);

        // The next put sweeps it out
        cache.put("motor", 2, LONG);
        assert!(!cache.invalidate(&"freios"));
    }

    #[test]
    fn test_put_replaces_value() {
        let cache = TtlCache::new();
        cache.put("freios", 1, LONG);
        cache.put("freios", 2, LONG);
        assert_eq!(cache.get(&"freios"), Some(2));
        assert!(cache.invalidate(&"freios"));
        assert!(!cache.invalidate(&"freios"));
    }

    #[test]
    fn test_invalidate() {
        let cache = TtlCache::new();
        cache.put("freios", 1, LONG);
        assert!(cache.invalidate(&"freios"));
        assert!(!cache.invalidate(&"freios"));
        assert_eq!(cache.get(&"freios"), None);
    }

    #[test]
    fn test_invalidate_where() {
        let cache = TtlCache::new();
        cache.put(("freios", 1), "a", LONG);
        cache.put(("freios", 2), "b", LONG);
        cache.put(("motor", 1), "c", LONG);

        assert_eq!(cache.invalidate_where(|(page, _)| *page == "freios"), 2);
        assert_eq!(cache.get(&("motor", 1)), Some("c"));
    }

    #[test]
    fn test_expiry_after_sleep() {
        let cache = TtlCache::new();
        cache.put("freios", 1, Duration::from_millis(20));
        std::thread::sleep(Duration::from_millis(40));
        assert_eq!(cache.get(&"freios"), None);
    }
}
