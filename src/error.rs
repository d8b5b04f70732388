//! Error types for the cache
//!
//! Provides unified error handling using thiserror.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for the cache.
///
/// Lookups never produce an error: a missing, expired or corrupted entry is
/// reported as an absent value instead.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Capacity must be at least one entry
    #[error("Invalid capacity: {0} (must be greater than zero)")]
    InvalidCapacity(usize),

    /// Eviction policy name is not recognised
    #[error("Unknown eviction policy: {0}")]
    UnknownPolicy(String),

    /// Snapshot bytes could not be parsed
    #[error("Invalid snapshot: {0}")]
    InvalidSnapshot(String),

    /// A value or argument list could not be encoded as JSON
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The compression codec failed
    #[error("Compression error: {0}")]
    Compression(#[from] std::io::Error),
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
