//! Error types for the cache
//!
//! Provides unified error handling using thiserror. Ordinary absence and
//! expiry are never errors; only construction can fail.

use thiserror::Error;

// == Cache Error Enum ==
/// Unified error type for cache construction.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    /// Capacity must hold at least one entry
    #[error("Invalid capacity: {0} (must be at least 1)")]
    InvalidCapacity(usize),

    /// Notification queue must hold at least one event
    #[error("Invalid notification queue size: {0} (must be at least 1)")]
    InvalidQueueSize(usize),

    /// A listener was requested outside of a tokio runtime
    #[error("No tokio runtime available to run the eviction listener")]
    NoRuntime,
}

// == Result Type Alias ==
/// Convenience Result type for the cache.
pub type Result<T> = std::result::Result<T, CacheError>;
