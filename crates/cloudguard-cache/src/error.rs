use std::path::PathBuf;

/// Errors that can occur while loading or querying a result cache.
///
/// # Examples
///
/// ```rust
/// use cloudguard_cache::error::CacheError;
///
/// let err = CacheError::InvalidSnapshot("top-level value is not an object".to_string());
/// assert!(err.to_string().contains("not an object"));
/// ```
#[derive(Debug, thiserror::Error)]
pub enum CacheError {
    /// The snapshot file could not be read.
    #[error("Cache: failed to read snapshot {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The snapshot is not valid JSON or does not match the cache layout.
    #[error("Cache: JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// The snapshot parsed but violates the collection/operation/region layout.
    #[error("Cache: invalid snapshot: {0}")]
    InvalidSnapshot(String),
}

/// Convenience `Result` alias for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
