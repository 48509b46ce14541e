//! Error types for the loading cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache load outcomes.
///
/// The engine broadcasts one load outcome to every caller coalesced onto the
/// same in-flight load, so this type is `Clone`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// The loader reported that the key is absent from the data source
    #[error("Key not found in source: {0}")]
    NotFound(String),

    /// The loader failed (source unreachable, query error, ...)
    #[error("Load failed: {0}")]
    LoadFailed(String),

    /// The in-flight load was dropped before producing an outcome
    #[error("Load aborted for key: {0}")]
    LoadAborted(String),
}

// == Result Type Alias ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;
