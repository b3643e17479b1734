//! HashMap-based memoization table.
//!
//! Wraps an `FxHashMap`: no collisions, automatic resizing. Hit and miss
//! counters are atomics so that lookups only need shared access (the
//! manager consults caches under a read lock).

use std::hash::Hash;
use std::sync::atomic::{AtomicUsize, Ordering};

use rustc_hash::FxHashMap;

/// A cache backed by [FxHashMap].
pub struct HashMapCache<K, V> {
    map: FxHashMap<K, V>,
    hits: AtomicUsize,
    misses: AtomicUsize,
}

impl<K, V> Default for HashMapCache<K, V> {
    fn default() -> Self {
        Self::new(14)
    }
}

impl<K, V> HashMapCache<K, V> {
    /// Creates a new cache with room for `2^bits` entries before the first resize.
    pub fn new(bits: usize) -> Self {
        Self::with_capacity(1 << bits.min(24))
    }

    /// Creates a new cache with pre-allocated capacity.
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            map: FxHashMap::with_capacity_and_hasher(capacity, Default::default()),
            hits: AtomicUsize::new(0),
            misses: AtomicUsize::new(0),
        }
    }

    /// Returns the number of entries in the cache.
    pub fn len(&self) -> usize {
        self.map.len()
    }

    /// Returns true if the cache is empty.
    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    /// Returns the number of cache hits.
    pub fn hits(&self) -> usize {
        self.hits.load(Ordering::Relaxed)
    }

    /// Returns the number of cache misses.
    pub fn misses(&self) -> usize {
        self.misses.load(Ordering::Relaxed)
    }

    /// Clears all entries from the cache. Counters are kept.
    pub fn clear(&mut self) {
        self.map.clear();
    }
}

impl<K, V> HashMapCache<K, V>
where
    K: Hash + Eq,
    V: Copy,
{
    /// Looks up a key in the cache.
    #[inline]
    pub fn get(&self, key: &K) -> Option<V> {
        match self.map.get(key) {
            Some(&v) => {
                self.hits.fetch_add(1, Ordering::Relaxed);
                Some(v)
            }
            None => {
                self.misses.fetch_add(1, Ordering::Relaxed);
                None
            }
        }
    }

    /// Inserts a key-value pair into the cache.
    #[inline]
    pub fn insert(&mut self, key: K, value: V) {
        self.map.insert(key, value);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hashmap_cache_basic() {
        let mut cache = HashMapCache::<(u64, u64), i32>::new(4);

        cache.insert((1, 2), 42);
        cache.insert((3, 4), 99);

        assert_eq!(cache.get(&(1, 2)), Some(42));
        assert_eq!(cache.get(&(3, 4)), Some(99));
        assert_eq!(cache.get(&(5, 6)), None);

        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
    }

    #[test]
    fn test_hashmap_cache_clear() {
        let mut cache = HashMapCache::<(u64, u64), i32>::new(4);

        cache.insert((1, 2), 42);
        assert_eq!(cache.get(&(1, 2)), Some(42));

        cache.clear();
        assert_eq!(cache.get(&(1, 2)), None);
        assert!(cache.is_empty());
    }

    #[test]
    fn test_hashmap_cache_no_collisions() {
        let mut cache = HashMapCache::<(u64, u64), i32>::new(2);

        for i in 0..1000 {
            cache.insert((i, 0), i as i32);
        }

        for i in 0..1000 {
            assert_eq!(cache.get(&(i, 0)), Some(i as i32));
        }
        assert_eq!(cache.len(), 1000);
    }
}
