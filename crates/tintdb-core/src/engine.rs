//! The lookup engine: cached exact resolution, similarity search, and bulk
//! import/export.
//!
//! Control flow for an exact lookup:
//!
//! 1. The cache is checked; a hit (including a cached negative result)
//!    returns immediately and refreshes recency.
//! 2. On a miss the store is queried and the result -- found or not -- is
//!    written back into the cache.
//!
//! Similarity search is an explicit, separate call: it bypasses the cache and
//! scans the store directly. Every mutation path invalidates the affected
//! cache entries (or clears the cache wholesale for batch imports) before it
//! returns, so a lookup through this engine instance never observes a stale
//! name.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use tintdb_cache::{CacheStats, NameCache};
use tintdb_store::{ColorStore, Rgb};

use crate::config::TintdbConfig;
use crate::loader::{self, ImportReport};
use crate::{EngineError, EngineResult};

// ---------------------------------------------------------------------------
// SimilarityResult
// ---------------------------------------------------------------------------

/// A stored color within the similarity threshold of a query triple.
///
/// Computed per call; never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimilarityResult {
    /// The stored (r, g, b) key.
    pub rgb: Rgb,
    /// The stored name.
    pub name: String,
    /// Manhattan distance from the query triple.
    pub distance: u32,
}

// ---------------------------------------------------------------------------
// ColorEngine
// ---------------------------------------------------------------------------

/// The color-name lookup engine.
///
/// Owns one [`ColorStore`] and one [`NameCache`]; the cache is never shared
/// ambient state. One instance per logical client -- sharing an instance
/// across threads for concurrent mutation requires external synchronization.
pub struct ColorEngine {
    store: ColorStore,
    cache: NameCache,
    similarity_threshold: u32,
}

impl ColorEngine {
    /// Opens (or creates) the engine over the store file named in `config`.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Store`] if the database cannot be opened.
    pub fn open(config: &TintdbConfig) -> EngineResult<Self> {
        let store = ColorStore::open(&config.store.effective_path())?;
        Ok(Self::assemble(store, config))
    }

    /// Creates an engine over an in-memory store (useful for testing).
    pub fn in_memory(config: &TintdbConfig) -> EngineResult<Self> {
        let store = ColorStore::in_memory()?;
        Ok(Self::assemble(store, config))
    }

    fn assemble(store: ColorStore, config: &TintdbConfig) -> Self {
        info!(
            cache_capacity = config.cache.capacity,
            threshold = config.similarity.threshold,
            "color engine ready"
        );
        Self {
            store,
            cache: NameCache::new(config.cache.capacity),
            similarity_threshold: config.similarity.threshold,
        }
    }

    /// Resolves an exact (r, g, b) triple to its name.
    ///
    /// A miss is `Ok(None)`, not an error. Out-of-range channels resolve to
    /// `Ok(None)` without touching the store -- such a triple can never have
    /// been stored.
    pub fn lookup(&mut self, r: u16, g: u16, b: u16) -> EngineResult<Option<String>> {
        let rgb = Rgb::new(r, g, b);
        if !rgb.in_range() {
            return Ok(None);
        }

        if let Some(resolved) = self.cache.get(rgb) {
            return Ok(resolved);
        }

        let resolved = self.store.get(rgb)?;
        // Negative results are cached too, so unknown colors do not
        // round-trip to the store on every lookup.
        self.cache.insert(rgb, resolved.clone());
        Ok(resolved)
    }

    /// Adds or renames a color (upsert by triple).
    ///
    /// The cache entry is invalidated before this returns, so the next
    /// lookup of the triple observes the write.
    pub fn add_color(&mut self, r: u16, g: u16, b: u16, name: &str) -> EngineResult<()> {
        let rgb = Rgb::new(r, g, b);
        self.store.put(rgb, name)?;
        self.cache.invalidate(rgb);
        Ok(())
    }

    /// Removes a color. Returns `true` if it existed.
    pub fn remove_color(&mut self, r: u16, g: u16, b: u16) -> EngineResult<bool> {
        let rgb = Rgb::new(r, g, b);
        let removed = self.store.delete(rgb)?;
        self.cache.invalidate(rgb);
        Ok(removed)
    }

    /// Finds stored colors within `threshold` Manhattan distance of the
    /// query triple, sorted by non-decreasing distance.
    ///
    /// Bypasses the cache and scans the whole store: cost is linear in store
    /// size, which is the intended trade-off for small and medium color
    /// tables. Ties keep the store's (r, g, b) scan order, so output is
    /// reproducible. A threshold of 0 degenerates to exact-match semantics.
    pub fn find_similar(
        &self,
        r: u16,
        g: u16,
        b: u16,
        threshold: u32,
    ) -> EngineResult<Vec<SimilarityResult>> {
        let query = Rgb::new(r, g, b);

        let mut results: Vec<SimilarityResult> = self
            .store
            .scan_all()?
            .into_iter()
            .filter_map(|entry| {
                let distance = query.manhattan(entry.rgb);
                (distance <= threshold).then_some(SimilarityResult {
                    rgb: entry.rgb,
                    name: entry.name,
                    distance,
                })
            })
            .collect();

        // Stable sort preserves scan order among equal distances.
        results.sort_by_key(|result| result.distance);

        debug!(query = %query, threshold, matches = results.len(), "similarity scan");
        Ok(results)
    }

    /// [`find_similar`](Self::find_similar) with the configured default
    /// threshold.
    pub fn find_similar_default(
        &self,
        r: u16,
        g: u16,
        b: u16,
    ) -> EngineResult<Vec<SimilarityResult>> {
        self.find_similar(r, g, b, self.similarity_threshold)
    }

    /// Imports a `"r,g,b" -> name` mapping.
    ///
    /// Malformed entries are skipped and reported; the valid remainder is
    /// written in one atomic transaction, after which the cache is cleared
    /// wholesale. A nonempty mapping whose entries are *all* malformed is
    /// rejected with [`EngineError::ImportRejected`] and nothing is written.
    pub fn import(&mut self, mapping: &BTreeMap<String, String>) -> EngineResult<ImportReport> {
        let (entries, skipped) = loader::parse_mapping(mapping);

        if entries.is_empty() {
            if skipped.is_empty() {
                return Ok(ImportReport {
                    imported: 0,
                    skipped,
                });
            }
            return Err(EngineError::ImportRejected(skipped.len()));
        }

        let imported = self.store.put_many(&entries)?;
        self.cache.clear();

        info!(imported, skipped = skipped.len(), "bulk import complete");
        Ok(ImportReport { imported, skipped })
    }

    /// Imports a mapping from a JSON file (`{"r,g,b": "name", ...}`).
    pub fn import_json_file(&mut self, path: &Path) -> EngineResult<ImportReport> {
        let content = std::fs::read_to_string(path)?;
        let mapping: BTreeMap<String, String> = serde_json::from_str(&content)?;
        self.import(&mapping)
    }

    /// Produces the import mapping shape from a full store scan.
    pub fn export(&self) -> EngineResult<BTreeMap<String, String>> {
        Ok(self.store.export_map()?)
    }

    /// Writes the export mapping to a JSON file.
    pub fn export_json_file(&self, path: &Path) -> EngineResult<()> {
        let mapping = self.export()?;
        let json = serde_json::to_string_pretty(&mapping)?;
        std::fs::write(path, json)?;
        Ok(())
    }

    /// Number of stored colors.
    pub fn len(&self) -> EngineResult<u64> {
        Ok(self.store.len()?)
    }

    /// Returns `true` if the store has no colors.
    pub fn is_empty(&self) -> EngineResult<bool> {
        Ok(self.store.is_empty()?)
    }

    /// Cache observation counters (instrumentation hook).
    #[must_use]
    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
