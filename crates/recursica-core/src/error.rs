// ABOUTME: Error types for lookups, the key/value store, and source loading
// ABOUTME: LookupMiss is a normal outcome; builders choose their own fallback per field

use std::path::PathBuf;

/// Why a value could not be resolved to a scalar
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LookupMiss {
    #[error("value is empty")]
    Empty,

    #[error("nothing found at '{path}'")]
    NotFound { path: String },

    #[error("reference chain exceeded depth {limit}")]
    DepthExceeded { limit: usize },

    #[error("value is a collection, not a scalar")]
    Collection,

    #[error("brand reference resolved without a theme accessor")]
    NoThemeAccessor,

    #[error("'{value}' is not a hex color")]
    NotAColor { value: String },
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("failed to read store file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("store file {path} is not valid JSON: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("store file {path} must contain a JSON object")]
    NotAnObject { path: PathBuf },
}

#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("failed to read {kind} source {path}: {source}")]
    Io {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{kind} source {path} is not valid JSON: {source}")]
    Parse {
        kind: &'static str,
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}
