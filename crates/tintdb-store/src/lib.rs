//! Tintdb Store -- persistent (r, g, b) to color-name mapping with SQLite storage.
//!
//! This crate owns the durable table, its schema creation, and the read/write
//! operations the rest of tintdb builds on: exact lookups, upserts, atomic
//! batch writes, and full-table scans for the similarity search.

use std::fmt;

use serde::{Deserialize, Serialize};

pub mod store;

pub use store::{ColorStore, MAX_CHANNEL};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Error type for store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// The underlying database cannot be opened or written.
    #[error("store unavailable: {0}")]
    Unavailable(String),

    /// A query or statement failed.
    #[error("database error: {0}")]
    Database(String),

    /// A channel value lies outside the accepted 0..=MAX_CHANNEL domain.
    #[error("channel value out of range in {rgb}: maximum is {max}")]
    ConstraintViolation { rgb: Rgb, max: u16 },

    /// A color name was empty.
    #[error("empty name for color {rgb}")]
    EmptyName { rgb: Rgb },

    /// A batch write was rolled back; `rgb` identifies the offending entry.
    #[error("batch write rolled back at {rgb}: {reason}")]
    TransactionFailed { rgb: Rgb, reason: String },
}

// ---------------------------------------------------------------------------
// Rgb
// ---------------------------------------------------------------------------

/// An (r, g, b) triple -- the unique key of every stored color.
///
/// Channels are `u16` because the accepted domain is `0..=999`
/// ([`MAX_CHANNEL`]), wider than canonical 8-bit RGB.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u16,
    pub g: u16,
    pub b: u16,
}

impl Rgb {
    /// Creates a new triple. No range check; see [`Rgb::in_range`].
    #[must_use]
    pub const fn new(r: u16, g: u16, b: u16) -> Self {
        Self { r, g, b }
    }

    /// Returns `true` if every channel lies within `0..=MAX_CHANNEL`.
    #[must_use]
    pub const fn in_range(self) -> bool {
        self.r <= MAX_CHANNEL && self.g <= MAX_CHANNEL && self.b <= MAX_CHANNEL
    }

    /// Manhattan distance: sum of absolute per-channel differences.
    #[must_use]
    pub fn manhattan(self, other: Rgb) -> u32 {
        u32::from(self.r.abs_diff(other.r))
            + u32::from(self.g.abs_diff(other.g))
            + u32::from(self.b.abs_diff(other.b))
    }

    /// Renders the triple in the bulk-import key format: `"r,g,b"`.
    #[must_use]
    pub fn key(self) -> String {
        format!("{},{},{}", self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({},{},{})", self.r, self.g, self.b)
    }
}

// ---------------------------------------------------------------------------
// ColorEntry
// ---------------------------------------------------------------------------

/// A named color as stored in the database.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ColorEntry {
    /// The unique (r, g, b) key.
    pub rgb: Rgb,
    /// Human-assigned name; never empty.
    pub name: String,
}

impl ColorEntry {
    /// Creates a new entry.
    #[must_use]
    pub fn new(rgb: Rgb, name: impl Into<String>) -> Self {
        Self {
            rgb,
            name: name.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
