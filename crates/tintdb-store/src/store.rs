//! SQLite-backed persistent color store.
//!
//! One table keyed by the composite (r, g, b), name stored as text.
//! Uniqueness is enforced by the primary key; inserts use `INSERT OR REPLACE`
//! so re-adding an existing triple overwrites its name (upsert semantics).

use std::collections::BTreeMap;
use std::path::Path;

use rusqlite::{params, Connection};
use tracing::{debug, info};

use crate::{ColorEntry, Rgb, StoreError};

/// Upper bound of the accepted channel domain (inclusive).
///
/// The documented domain is 0..=999 rather than canonical 8-bit 0..=255;
/// hex conversion narrows further (see `tintdb-core::convert`).
pub const MAX_CHANNEL: u16 = 999;

// ---------------------------------------------------------------------------
// ColorStore
// ---------------------------------------------------------------------------

/// SQLite-backed color-name store.
pub struct ColorStore {
    conn: Connection,
}

impl ColorStore {
    /// Opens or creates a store database at the given path.
    ///
    /// An absent file triggers schema creation, not an error.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Unavailable`] if the database cannot be opened.
    pub fn open(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path)
            .map_err(|e| StoreError::Unavailable(format!("cannot open '{}': {e}", path.display())))?;
        let store = Self { conn };
        store.init_schema()?;
        info!(path = %path.display(), "color store opened");
        Ok(store)
    }

    /// Creates an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn = Connection::open_in_memory()
            .map_err(|e| StoreError::Unavailable(format!("cannot open in-memory store: {e}")))?;
        let store = Self { conn };
        store.init_schema()?;
        Ok(store)
    }

    /// Initializes the store schema.
    fn init_schema(&self) -> Result<(), StoreError> {
        self.conn
            .execute_batch(
                "CREATE TABLE IF NOT EXISTS colors (
                    r INTEGER NOT NULL,
                    g INTEGER NOT NULL,
                    b INTEGER NOT NULL,
                    name TEXT NOT NULL,
                    PRIMARY KEY (r, g, b)
                );
                CREATE INDEX IF NOT EXISTS idx_colors_rgb ON colors(r, g, b);",
            )
            .map_err(|e| StoreError::Database(format!("init schema: {e}")))?;
        Ok(())
    }

    /// Validates an entry against the channel domain and name constraint.
    fn validate(entry: &ColorEntry) -> Result<(), StoreError> {
        if !entry.rgb.in_range() {
            return Err(StoreError::ConstraintViolation {
                rgb: entry.rgb,
                max: MAX_CHANNEL,
            });
        }
        if entry.name.is_empty() {
            return Err(StoreError::EmptyName { rgb: entry.rgb });
        }
        Ok(())
    }

    /// Looks up the name for an exact (r, g, b) triple.
    ///
    /// A miss is `Ok(None)`, not an error.
    pub fn get(&self, rgb: Rgb) -> Result<Option<String>, StoreError> {
        let result = self.conn.query_row(
            "SELECT name FROM colors WHERE r = ?1 AND g = ?2 AND b = ?3",
            params![rgb.r, rgb.g, rgb.b],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(name) => Ok(Some(name)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(StoreError::Database(format!("get: {e}"))),
        }
    }

    /// Upserts a single color. Rejects out-of-range channels and empty names
    /// immediately, before touching the database.
    pub fn put(&self, rgb: Rgb, name: &str) -> Result<(), StoreError> {
        Self::validate(&ColorEntry::new(rgb, name))?;
        self.conn
            .execute(
                "INSERT OR REPLACE INTO colors (r, g, b, name) VALUES (?1, ?2, ?3, ?4)",
                params![rgb.r, rgb.g, rgb.b, name],
            )
            .map_err(|e| StoreError::Database(format!("put: {e}")))?;
        debug!(rgb = %rgb, name, "color stored");
        Ok(())
    }

    /// Upserts a batch of colors inside a single transaction.
    ///
    /// Every entry is validated up front, so a malformed entry is reported
    /// with its triple and nothing is written. If a statement fails mid-batch
    /// the transaction is rolled back on drop.
    ///
    /// Returns the number of rows written.
    pub fn put_many(&mut self, entries: &[ColorEntry]) -> Result<usize, StoreError> {
        // 先逐筆驗證，違規的 entry 會讓整批拒絕
        for entry in entries {
            Self::validate(entry)?;
        }

        let tx = self
            .conn
            .transaction()
            .map_err(|e| StoreError::Database(format!("begin transaction: {e}")))?;

        let mut written = 0usize;
        for entry in entries {
            tx.execute(
                "INSERT OR REPLACE INTO colors (r, g, b, name) VALUES (?1, ?2, ?3, ?4)",
                params![entry.rgb.r, entry.rgb.g, entry.rgb.b, entry.name],
            )
            .map_err(|e| StoreError::TransactionFailed {
                rgb: entry.rgb,
                reason: e.to_string(),
            })?;
            written += 1;
        }

        tx.commit()
            .map_err(|e| StoreError::Database(format!("commit: {e}")))?;

        debug!(written, "batch write committed");
        Ok(written)
    }

    /// Deletes a color. Returns `true` if a row was removed.
    pub fn delete(&self, rgb: Rgb) -> Result<bool, StoreError> {
        let removed = self
            .conn
            .execute(
                "DELETE FROM colors WHERE r = ?1 AND g = ?2 AND b = ?3",
                params![rgb.r, rgb.g, rgb.b],
            )
            .map_err(|e| StoreError::Database(format!("delete: {e}")))?;
        Ok(removed > 0)
    }

    /// Returns every stored color, ordered by (r, g, b).
    ///
    /// A single statement, so the result is a consistent snapshot. The fixed
    /// ordering keeps similarity-search ties deterministic.
    pub fn scan_all(&self) -> Result<Vec<ColorEntry>, StoreError> {
        let mut stmt = self
            .conn
            .prepare("SELECT r, g, b, name FROM colors ORDER BY r, g, b")
            .map_err(|e| StoreError::Database(format!("scan: {e}")))?;

        let rows = stmt
            .query_map([], |row| {
                Ok(ColorEntry {
                    rgb: Rgb::new(row.get(0)?, row.get(1)?, row.get(2)?),
                    name: row.get(3)?,
                })
            })
            .map_err(|e| StoreError::Database(format!("scan: {e}")))?;

        let mut entries = Vec::new();
        for row in rows {
            entries.push(row.map_err(|e| StoreError::Database(format!("scan row: {e}")))?);
        }
        Ok(entries)
    }

    /// Produces the bulk-import mapping shape (`"r,g,b"` -> name) from a full
    /// scan. The inverse of `tintdb-core`'s import.
    pub fn export_map(&self) -> Result<BTreeMap<String, String>, StoreError> {
        let mut map = BTreeMap::new();
        for entry in self.scan_all()? {
            map.insert(entry.rgb.key(), entry.name);
        }
        Ok(map)
    }

    /// Returns the number of stored colors.
    pub fn len(&self) -> Result<u64, StoreError> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM colors", [], |row| row.get(0))
            .map_err(|e| StoreError::Database(format!("count: {e}")))?;
        Ok(count as u64)
    }

    /// Returns `true` if the store has no colors.
    pub fn is_empty(&self) -> Result<bool, StoreError> {
        self.len().map(|n| n == 0)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_and_get() {
        let store = ColorStore::in_memory().unwrap();
        store.put(Rgb::new(255, 0, 0), "Bright Red").unwrap();

        let name = store.get(Rgb::new(255, 0, 0)).unwrap();
        assert_eq!(name.as_deref(), Some("Bright Red"));
    }

    #[test]
    fn get_miss_is_none() {
        let store = ColorStore::in_memory().unwrap();
        assert!(store.get(Rgb::new(1, 2, 3)).unwrap().is_none());
    }

    #[test]
    fn put_upserts_existing_triple() {
        let store = ColorStore::in_memory().unwrap();
        store.put(Rgb::new(0, 0, 255), "Blue").unwrap();
        store.put(Rgb::new(0, 0, 255), "Deep Blue").unwrap();

        assert_eq!(
            store.get(Rgb::new(0, 0, 255)).unwrap().as_deref(),
            Some("Deep Blue")
        );
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn put_rejects_out_of_range_channel() {
        let store = ColorStore::in_memory().unwrap();
        let result = store.put(Rgb::new(1000, 0, 0), "Too Red");
        assert!(matches!(
            result,
            Err(StoreError::ConstraintViolation { .. })
        ));
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn put_rejects_empty_name() {
        let store = ColorStore::in_memory().unwrap();
        let result = store.put(Rgb::new(1, 2, 3), "");
        assert!(matches!(result, Err(StoreError::EmptyName { .. })));
    }

    #[test]
    fn put_accepts_extended_domain() {
        // domain 上限是 0..=999，不是 8-bit RGB 的 255
        let store = ColorStore::in_memory().unwrap();
        store.put(Rgb::new(999, 999, 999), "Max White").unwrap();
        assert_eq!(
            store.get(Rgb::new(999, 999, 999)).unwrap().as_deref(),
            Some("Max White")
        );
    }

    #[test]
    fn put_many_commits_all() {
        let mut store = ColorStore::in_memory().unwrap();
        let entries = vec![
            ColorEntry::new(Rgb::new(255, 0, 0), "Red"),
            ColorEntry::new(Rgb::new(0, 255, 0), "Green"),
            ColorEntry::new(Rgb::new(0, 0, 255), "Blue"),
        ];

        let written = store.put_many(&entries).unwrap();
        assert_eq!(written, 3);
        assert_eq!(store.len().unwrap(), 3);
    }

    #[test]
    fn put_many_rolls_back_on_invalid_entry() {
        let mut store = ColorStore::in_memory().unwrap();
        let entries = vec![
            ColorEntry::new(Rgb::new(255, 0, 0), "Red"),
            ColorEntry::new(Rgb::new(1000, 0, 0), "Out Of Range"),
        ];

        let result = store.put_many(&entries);
        assert!(matches!(
            result,
            Err(StoreError::ConstraintViolation { rgb, .. }) if rgb == Rgb::new(1000, 0, 0)
        ));
        // 整批回滾：連合法的第一筆也不能寫入
        assert!(store.is_empty().unwrap());
    }

    #[test]
    fn put_many_empty_batch_is_noop() {
        let mut store = ColorStore::in_memory().unwrap();
        assert_eq!(store.put_many(&[]).unwrap(), 0);
    }

    #[test]
    fn delete_removes_row() {
        let store = ColorStore::in_memory().unwrap();
        store.put(Rgb::new(5, 5, 5), "Near Black").unwrap();

        assert!(store.delete(Rgb::new(5, 5, 5)).unwrap());
        assert!(!store.delete(Rgb::new(5, 5, 5)).unwrap());
        assert!(store.get(Rgb::new(5, 5, 5)).unwrap().is_none());
    }

    #[test]
    fn scan_all_is_ordered() {
        let store = ColorStore::in_memory().unwrap();
        store.put(Rgb::new(9, 0, 0), "C").unwrap();
        store.put(Rgb::new(1, 0, 0), "A").unwrap();
        store.put(Rgb::new(1, 5, 0), "B").unwrap();

        let entries = store.scan_all().unwrap();
        let keys: Vec<Rgb> = entries.iter().map(|e| e.rgb).collect();
        assert_eq!(
            keys,
            vec![Rgb::new(1, 0, 0), Rgb::new(1, 5, 0), Rgb::new(9, 0, 0)]
        );
    }

    #[test]
    fn export_map_shape() {
        let store = ColorStore::in_memory().unwrap();
        store.put(Rgb::new(255, 0, 0), "Red").unwrap();
        store.put(Rgb::new(0, 255, 0), "Green").unwrap();

        let map = store.export_map().unwrap();
        assert_eq!(map.get("255,0,0").map(String::as_str), Some("Red"));
        assert_eq!(map.get("0,255,0").map(String::as_str), Some("Green"));
        assert_eq!(map.len(), 2);
    }

    #[test]
    fn file_based_store_roundtrip() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("colors.db");

        {
            let store = ColorStore::open(&db_path).unwrap();
            store.put(Rgb::new(255, 0, 0), "Red").unwrap();
        }

        // Reopen and verify persistence.
        {
            let store = ColorStore::open(&db_path).unwrap();
            assert_eq!(
                store.get(Rgb::new(255, 0, 0)).unwrap().as_deref(),
                Some("Red")
            );
        }
    }

    #[test]
    fn open_creates_schema_for_absent_file() {
        let dir = tempfile::tempdir().unwrap();
        let db_path = dir.path().join("fresh.db");
        assert!(!db_path.exists());

        let store = ColorStore::open(&db_path).unwrap();
        assert!(store.is_empty().unwrap());
        assert!(db_path.exists());
    }
}
