//! Tintdb Core -- the color-name lookup engine.
//!
//! Ties together the persistent store (`tintdb-store`) and the bounded LRU
//! cache (`tintdb-cache`), and adds the pieces with no home of their own:
//! similarity search over the full table, bulk import/export of the
//! `"r,g,b" -> name` mapping, hex conversion, configuration loading, and the
//! error taxonomy.
//!
//! One [`ColorEngine`](engine::ColorEngine) instance is a single logical
//! owner: operations are synchronous and blocking, and concurrent mutation
//! across threads requires external synchronization (each concurrent user is
//! expected to hold its own instance).

pub mod config;
pub mod convert;
pub mod engine;
pub mod loader;

pub use engine::{ColorEngine, SimilarityResult};
pub use loader::{ImportReport, SkippedEntry};
pub use tintdb_cache::{CacheStats, NameCache};
pub use tintdb_store::{ColorEntry, ColorStore, Rgb, StoreError, MAX_CHANNEL};

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Top-level error type for the tintdb-core crate.
///
/// An exact-lookup miss is *not* an error: `lookup` returns `Ok(None)`.
#[derive(Debug, thiserror::Error)]
pub enum EngineError {
    /// A malformed hex string or bulk-import key.
    #[error("invalid format: {0}")]
    InvalidFormat(String),

    /// A channel value cannot be represented as two hex digits.
    #[error("channel value {0} exceeds 255 and cannot be hex-encoded")]
    OutOfRange(u16),

    /// An error from the persistent store.
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Every entry of a nonempty bulk import was malformed.
    #[error("import rejected: all {0} entries were malformed")]
    ImportRejected(usize),

    /// An I/O error occurred reading or writing a mapping file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A serialization or deserialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A configuration error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Tracing/logging initialization failed.
    #[error("tracing initialization error: {0}")]
    TracingInit(String),
}

/// Convenience alias for `Result<T, EngineError>`.
pub type EngineResult<T> = Result<T, EngineError>;

// ---------------------------------------------------------------------------
// Tracing / Logging
// ---------------------------------------------------------------------------

/// Initialize structured tracing with the given verbosity level.
///
/// `verbose` selects TRACE, `quiet` selects ERROR, otherwise INFO.
/// `json_output` switches to JSON-formatted log lines. The `RUST_LOG`
/// environment variable, when set, takes precedence over the programmatic
/// level selection.
///
/// # Errors
///
/// Returns [`EngineError::TracingInit`] if the global subscriber has already
/// been set (i.e. this function was called more than once in the same
/// process).
pub fn init_tracing(verbose: bool, quiet: bool, json_output: bool) -> Result<(), EngineError> {
    use tracing_subscriber::{fmt, EnvFilter};

    let default_level = if verbose {
        "trace"
    } else if quiet {
        "error"
    } else {
        "info"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    if json_output {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init()
            .map_err(|e| EngineError::TracingInit(e.to_string()))
    } else {
        fmt()
            .compact()
            .with_env_filter(env_filter)
            .with_target(true)
            .try_init()
            .map_err(|e| EngineError::TracingInit(e.to_string()))
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn store_error_converts() {
        let err: EngineError = StoreError::Database("boom".to_string()).into();
        assert!(err.to_string().contains("boom"));
    }

    #[test]
    fn import_rejected_display() {
        let err = EngineError::ImportRejected(3);
        assert!(err.to_string().contains("all 3 entries"));
    }

    #[test]
    fn init_tracing_returns_error_on_double_init() {
        // First call -- may succeed or fail if another test already set the
        // global subscriber; either outcome is acceptable.
        let _ = init_tracing(false, false, false);

        // Second call must fail.
        let result = init_tracing(false, false, false);
        assert!(result.is_err());
        if let Err(EngineError::TracingInit(msg)) = result {
            assert!(!msg.is_empty());
        } else {
            panic!("expected EngineError::TracingInit");
        }
    }
}
