//! Configuration loading and merging for tintdb.
//!
//! Configuration is resolved from `.tintdb.yaml` files with
//! project > home > defaults precedence; callers may still override any field
//! programmatically after loading.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::EngineError;

/// Default store file name, used when no path is configured.
pub const DEFAULT_STORE_PATH: &str = "colors.db";

/// Default similarity threshold (Manhattan distance).
pub const DEFAULT_THRESHOLD: u32 = 50;

// ---------------------------------------------------------------------------
// Top-level Config
// ---------------------------------------------------------------------------

/// Top-level tintdb configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct TintdbConfig {
    /// Persistent store settings.
    pub store: StoreConfig,
    /// Lookup cache settings.
    pub cache: CacheConfig,
    /// Similarity search settings.
    pub similarity: SimilarityConfig,
}

// ---------------------------------------------------------------------------
// StoreConfig
// ---------------------------------------------------------------------------

/// Persistent store settings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the store database file. `None` means [`DEFAULT_STORE_PATH`].
    pub path: Option<String>,
}

impl StoreConfig {
    /// The effective store path.
    #[must_use]
    pub fn effective_path(&self) -> PathBuf {
        PathBuf::from(self.path.as_deref().unwrap_or(DEFAULT_STORE_PATH))
    }
}

// ---------------------------------------------------------------------------
// CacheConfig
// ---------------------------------------------------------------------------

/// Lookup cache settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Maximum number of cached resolutions. 0 disables caching.
    pub capacity: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            capacity: tintdb_cache::DEFAULT_CAPACITY,
        }
    }
}

// ---------------------------------------------------------------------------
// SimilarityConfig
// ---------------------------------------------------------------------------

/// Similarity search settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SimilarityConfig {
    /// Default Manhattan-distance threshold.
    pub threshold: u32,
}

impl Default for SimilarityConfig {
    fn default() -> Self {
        Self {
            threshold: DEFAULT_THRESHOLD,
        }
    }
}

// ---------------------------------------------------------------------------
// Config loading
// ---------------------------------------------------------------------------

/// Load and merge configuration from multiple sources.
///
/// Resolution order (highest priority first):
/// 1. Programmatic overrides (applied by the caller after loading)
/// 2. `.tintdb.yaml` in the project directory
/// 3. `.tintdb.yaml` in the user home directory
/// 4. Built-in defaults
///
/// # Errors
///
/// Returns [`EngineError::Config`] if a config file exists but is malformed.
pub fn load_config(project_dir: Option<&Path>) -> Result<TintdbConfig, EngineError> {
    let mut config = TintdbConfig::default();

    // Layer 1: Home directory config.
    if let Some(home) = home_dir() {
        let home_config = home.join(".tintdb.yaml");
        if home_config.is_file() {
            debug!(path = %home_config.display(), "loading home config");
            let layer = load_config_file(&home_config)?;
            config = merge_config(config, layer);
        }
    }

    // Layer 2: Project directory config.
    if let Some(dir) = project_dir {
        let project_config = dir.join(".tintdb.yaml");
        if project_config.is_file() {
            debug!(path = %project_config.display(), "loading project config");
            let layer = load_config_file(&project_config)?;
            config = merge_config(config, layer);
        }
    }

    Ok(config)
}

/// Load a single config file and deserialize it.
fn load_config_file(path: &Path) -> Result<TintdbConfig, EngineError> {
    let content = std::fs::read_to_string(path).map_err(|e| {
        EngineError::Config(format!(
            "failed to read config file '{}': {e}",
            path.display()
        ))
    })?;

    serde_yml::from_str(&content).map_err(|e| {
        EngineError::Config(format!(
            "failed to parse config file '{}': {e}",
            path.display()
        ))
    })
}

/// Merge `overlay` on top of `base`. Non-default values in `overlay` win.
fn merge_config(base: TintdbConfig, overlay: TintdbConfig) -> TintdbConfig {
    TintdbConfig {
        store: StoreConfig {
            path: overlay.store.path.or(base.store.path),
        },
        cache: overlay.cache,
        similarity: overlay.similarity,
    }
}

/// Get the user home directory.
fn home_dir() -> Option<PathBuf> {
    std::env::var_os("HOME")
        .or_else(|| std::env::var_os("USERPROFILE"))
        .map(PathBuf::from)
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
