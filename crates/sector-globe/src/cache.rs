//! Keyed cache for built geometry and materials.
//!
//! Tile geometry and materials are pure functions of their inputs, so entries
//! are built lazily on first use and never invalidated. The cache lives on
//! the frame thread and needs no locking.

use std::collections::HashMap;
use std::hash::Hash;

/// A build-once cache keyed by a deterministic key.
#[derive(Debug, Clone)]
pub struct KeyedCache<K, V> {
    entries: HashMap<K, V>,
    hits: u64,
    misses: u64,
}

impl<K: Eq + Hash, V> KeyedCache<K, V> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            entries: HashMap::new(),
            hits: 0,
            misses: 0,
        }
    }

    /// Get the entry for `key`, building it with `build` if absent.
    pub fn get_or_insert_with(&mut self, key: K, build: impl FnOnce() -> V) -> &V {
        if self.entries.contains_key(&key) {
            self.hits += 1;
        } else {
            self.misses += 1;
        }
        self.entries.entry(key).or_insert_with(build)
    }

    /// Get an entry without building it.
    #[must_use]
    pub fn get(&self, key: &K) -> Option<&V> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Lookups that found an existing entry.
    #[must_use]
    pub fn hits(&self) -> u64 {
        self.hits
    }

    /// Lookups that had to build an entry.
    #[must_use]
    pub fn misses(&self) -> u64 {
        self.misses
    }

    /// Drop every entry. Statistics are kept.
    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl<K: Eq + Hash, V> Default for KeyedCache<K, V> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::patch::{PatchParams, build_tile_patch};

    #[test]
    fn test_builds_once() {
        let mut cache = KeyedCache::new();
        let mut builds = 0;
        for _ in 0..3 {
            let value = *cache.get_or_insert_with("a", || {
                builds += 1;
                42
            });
            assert_eq!(value, 42);
        }
        assert_eq!(builds, 1);
        assert_eq!(cache.hits(), 2);
        assert_eq!(cache.misses(), 1);
        assert_eq!(cache.len(), 1);
    }

    #[test]
    fn test_patch_keys_share_geometry() {
        let params = PatchParams {
            lat0: -90.0,
            lat1: 90.0,
            lon0: -180.0,
            lon1: -108.0,
            radius: 3.01,
            segments: 12,
        };
        let mut cache = KeyedCache::new();
        let first = cache.get_or_insert_with(params.key(), || build_tile_patch(&params)).positions.len();
        let again = cache.get_or_insert_with(params.key(), || build_tile_patch(&params)).positions.len();
        assert_eq!(first, again);
        assert_eq!(cache.len(), 1);

        let other = PatchParams { segments: 6, ..params };
        cache.get_or_insert_with(other.key(), || build_tile_patch(&other));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_clear() {
        let mut cache: KeyedCache<u32, u32> = KeyedCache::default();
        cache.get_or_insert_with(1, || 1);
        assert!(cache.get(&1).is_some());
        cache.clear();
        assert!(cache.is_empty());
        assert_eq!(cache.misses(), 1);
    }
}
