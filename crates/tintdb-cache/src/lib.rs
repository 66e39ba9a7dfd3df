//! Tintdb Cache -- bounded in-memory LRU cache in front of exact lookups.
//!
//! The cache maps an [`Rgb`](tintdb_store::Rgb) key to a resolved
//! `Option<String>`: `Some(name)` for a known color, `None` as the sentinel
//! for a confirmed store miss, so repeated lookups of unknown colors do not
//! round-trip to the store. Eviction is purely by recency and capacity --
//! there is no time-based expiry.

pub mod cache;

pub use cache::{CacheStats, NameCache, DEFAULT_CAPACITY};
