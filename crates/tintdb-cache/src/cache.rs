//! LRU cache for resolved color names.
//!
//! Capacity is fixed at construction; capacity 0 disables caching entirely,
//! turning every call into a pass-through. Counters for hits, misses,
//! evictions, and invalidations provide the instrumentation hook used by the
//! consistency and eviction tests.

use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use tintdb_store::Rgb;

/// Default number of cached resolutions.
pub const DEFAULT_CAPACITY: usize = 2048;

// ---------------------------------------------------------------------------
// CacheStats
// ---------------------------------------------------------------------------

/// Counters observing cache behavior.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Lookups answered from the cache.
    pub hits: u64,
    /// Lookups that fell through to the store.
    pub misses: u64,
    /// Entries evicted by the LRU policy.
    pub evictions: u64,
    /// Entries removed by explicit invalidation.
    pub invalidations: u64,
}

// ---------------------------------------------------------------------------
// NameCache
// ---------------------------------------------------------------------------

/// Bounded LRU cache of resolved lookups.
///
/// The cached value is `Option<String>`: `None` records a confirmed store
/// miss (negative caching).
pub struct NameCache {
    /// `None` when constructed with capacity 0 (caching disabled).
    entries: Option<LruCache<Rgb, Option<String>>>,
    stats: CacheStats,
}

impl NameCache {
    /// Creates a cache holding at most `capacity` resolutions.
    ///
    /// Capacity 0 disables caching: every `get` misses and `insert` is a
    /// no-op.
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: NonZeroUsize::new(capacity).map(LruCache::new),
            stats: CacheStats::default(),
        }
    }

    /// Creates a cache with [`DEFAULT_CAPACITY`].
    #[must_use]
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CAPACITY)
    }

    /// Looks up a cached resolution, refreshing its recency.
    ///
    /// The outer `Option` is hit/miss; the inner one is the resolved value
    /// (`None` = cached negative result).
    pub fn get(&mut self, rgb: Rgb) -> Option<Option<String>> {
        let Some(entries) = self.entries.as_mut() else {
            self.stats.misses += 1;
            return None;
        };

        match entries.get(&rgb) {
            Some(resolved) => {
                self.stats.hits += 1;
                debug!(rgb = %rgb, "cache hit");
                Some(resolved.clone())
            }
            None => {
                self.stats.misses += 1;
                None
            }
        }
    }

    /// Caches a resolution, evicting the least-recently-used entry at
    /// capacity.
    pub fn insert(&mut self, rgb: Rgb, resolved: Option<String>) {
        let Some(entries) = self.entries.as_mut() else {
            return;
        };

        if let Some((displaced, _)) = entries.push(rgb, resolved) {
            // push returns the old pair when the key already existed; only a
            // different key is a true eviction.
            if displaced != rgb {
                self.stats.evictions += 1;
                debug!(evicted = %displaced, "LRU eviction");
            }
        }
    }

    /// Removes the entry for `rgb`, if present.
    ///
    /// Every mutation path must call this (or [`clear`](Self::clear)) before
    /// the mutation is considered complete, so a stale resolution is never
    /// served after a write.
    pub fn invalidate(&mut self, rgb: Rgb) {
        if let Some(entries) = self.entries.as_mut() {
            if entries.pop(&rgb).is_some() {
                self.stats.invalidations += 1;
                debug!(rgb = %rgb, "cache entry invalidated");
            }
        }
    }

    /// Empties the cache. No effect on the store; counters are kept.
    pub fn clear(&mut self) {
        if let Some(entries) = self.entries.as_mut() {
            entries.clear();
            debug!("cache cleared");
        }
    }

    /// Number of currently cached resolutions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.as_ref().map_or(0, LruCache::len)
    }

    /// Returns `true` if nothing is cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// The fixed capacity (0 when caching is disabled).
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.entries.as_ref().map_or(0, |e| e.cap().get())
    }

    /// A snapshot of the observation counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_and_get() {
        let mut cache = NameCache::new(4);
        cache.insert(Rgb::new(255, 0, 0), Some("Red".to_string()));

        let hit = cache.get(Rgb::new(255, 0, 0));
        assert_eq!(hit, Some(Some("Red".to_string())));
        assert_eq!(cache.stats().hits, 1);
    }

    #[test]
    fn negative_result_is_cached() {
        let mut cache = NameCache::new(4);
        cache.insert(Rgb::new(9, 9, 9), None);

        // Hit on the sentinel: the cache answers "known missing".
        assert_eq!(cache.get(Rgb::new(9, 9, 9)), Some(None));
        assert_eq!(cache.stats().hits, 1);
        assert_eq!(cache.stats().misses, 0);
    }

    #[test]
    fn miss_counts() {
        let mut cache = NameCache::new(4);
        assert!(cache.get(Rgb::new(1, 2, 3)).is_none());
        assert_eq!(cache.stats().misses, 1);
    }

    #[test]
    fn lru_eviction_drops_least_recently_used() {
        let mut cache = NameCache::new(2);
        cache.insert(Rgb::new(1, 0, 0), Some("A".to_string()));
        cache.insert(Rgb::new(2, 0, 0), Some("B".to_string()));

        // Touch A so B becomes the least recently used.
        cache.get(Rgb::new(1, 0, 0));
        cache.insert(Rgb::new(3, 0, 0), Some("C".to_string()));

        assert_eq!(cache.stats().evictions, 1);
        assert!(cache.get(Rgb::new(2, 0, 0)).is_none());
        assert!(cache.get(Rgb::new(1, 0, 0)).is_some());
        assert!(cache.get(Rgb::new(3, 0, 0)).is_some());
    }

    #[test]
    fn overwrite_same_key_is_not_an_eviction() {
        let mut cache = NameCache::new(2);
        cache.insert(Rgb::new(1, 0, 0), Some("A".to_string()));
        cache.insert(Rgb::new(1, 0, 0), Some("A2".to_string()));

        assert_eq!(cache.stats().evictions, 0);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get(Rgb::new(1, 0, 0)), Some(Some("A2".to_string())));
    }

    #[test]
    fn invalidate_removes_entry() {
        let mut cache = NameCache::new(4);
        cache.insert(Rgb::new(1, 2, 3), Some("X".to_string()));
        cache.invalidate(Rgb::new(1, 2, 3));

        assert!(cache.get(Rgb::new(1, 2, 3)).is_none());
        assert_eq!(cache.stats().invalidations, 1);

        // Invalidating an absent entry is a no-op.
        cache.invalidate(Rgb::new(7, 7, 7));
        assert_eq!(cache.stats().invalidations, 1);
    }

    #[test]
    fn clear_empties_cache() {
        let mut cache = NameCache::new(4);
        cache.insert(Rgb::new(1, 0, 0), Some("A".to_string()));
        cache.insert(Rgb::new(2, 0, 0), None);

        cache.clear();
        assert!(cache.is_empty());
        assert!(cache.get(Rgb::new(1, 0, 0)).is_none());
    }

    #[test]
    fn zero_capacity_disables_caching() {
        let mut cache = NameCache::new(0);
        cache.insert(Rgb::new(1, 0, 0), Some("A".to_string()));

        assert!(cache.get(Rgb::new(1, 0, 0)).is_none());
        assert_eq!(cache.len(), 0);
        assert_eq!(cache.capacity(), 0);
    }

    #[test]
    fn default_capacity() {
        let cache = NameCache::with_default_capacity();
        assert_eq!(cache.capacity(), DEFAULT_CAPACITY);
    }

    #[test]
    fn recency_refresh_on_get() {
        let mut cache = NameCache::new(2);
        cache.insert(Rgb::new(1, 0, 0), Some("A".to_string()));
        cache.insert(Rgb::new(2, 0, 0), Some("B".to_string()));

        // Without the refresh A would be evicted; with it, B is.
        cache.get(Rgb::new(1, 0, 0));
        cache.insert(Rgb::new(3, 0, 0), Some("C".to_string()));

        assert!(cache.get(Rgb::new(1, 0, 0)).is_some());
        assert!(cache.get(Rgb::new(2, 0, 0)).is_none());
    }
}
