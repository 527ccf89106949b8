//! Error types for the lookup client
//!
//! Provides unified error handling using thiserror.

use std::path::PathBuf;

use thiserror::Error;

// == Cache Error Enum ==
/// Errors raised by an expiring key-value store.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed TTL expression, raised before any I/O
    #[error("Invalid expiration time: {0}")]
    Configuration(String),

    /// Backing file could not be created
    #[error("Cache storage unavailable at {path:?}: {source}")]
    StorageUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Backing file unreadable, corrupt, or payload of the wrong shape
    #[error("Cache read failed: {0}")]
    StorageRead(String),

    /// Entry could not be serialized or persisted
    #[error("Cache write failed: {0}")]
    StorageWrite(String),

    /// Key absent or expired
    #[error("Key not found: {0}")]
    NotFound(String),
}

impl CacheError {
    /// True for the normal absent-or-stale outcome.
    pub fn is_not_found(&self) -> bool {
        matches!(self, CacheError::NotFound(_))
    }
}

// == Lookup Error Enum ==
/// Errors raised while resolving a call sign.
#[derive(Error, Debug)]
pub enum LookupError {
    /// The directory answered authoritatively that the call sign is unknown
    #[error("{callsign} not found: {reason}")]
    RemoteNotFound { callsign: String, reason: String },

    /// Nothing left to look up after trimming
    #[error("Invalid call sign: {0:?}")]
    InvalidCallsign(String),

    /// Login refused, session expired, or no session yet
    #[error("Session error: {0}")]
    RemoteSession(String),

    /// HTTP transport failure
    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// Response could not be understood
    #[error("Protocol error: {0}")]
    Protocol(String),

    /// Store failure that could not be bypassed
    #[error(transparent)]
    Cache(#[from] CacheError),
}

// == Result Type Aliases ==
/// Convenience Result type for cache operations.
pub type Result<T> = std::result::Result<T, CacheError>;

/// Convenience Result type for lookup operations.
pub type LookupResult<T> = std::result::Result<T, LookupError>;
