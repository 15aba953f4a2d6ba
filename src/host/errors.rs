//! Host collaborator errors

use thiserror::Error;

/// Result type for host operations
pub type HostResult<T> = Result<T, HostError>;

/// Errors surfaced by the host ledger runtime.
///
/// None of these are retried locally; the contract wraps them and returns
/// them to the transaction dispatcher.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// Point read failed
    #[error("failed to read state for key {key:?}: {reason}")]
    StateRead { key: String, reason: String },

    /// Point write failed
    #[error("failed to write state for key {key:?}: {reason}")]
    StateWrite { key: String, reason: String },

    /// Range iteration could not be opened or advanced
    #[error("failed iterating state: {reason}")]
    Iteration { reason: String },

    /// Composite key could not be built or split
    #[error("invalid composite key: {reason}")]
    InvalidCompositeKey { reason: String },

    /// The transaction carries no timestamp
    #[error("transaction timestamp unavailable")]
    TimestampUnavailable,

    /// Durable world state could not be loaded or saved
    #[error("world state persistence failed: {reason}")]
    Persistence { reason: String },

    /// Another invocation holds the data directory
    #[error("data directory locked by another invocation: {path}")]
    Locked { path: String },
}

impl HostError {
    /// Create a read failure
    pub fn state_read(key: impl Into<String>, reason: impl Into<String>) -> Self {
        HostError::StateRead {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create a write failure
    pub fn state_write(key: impl Into<String>, reason: impl Into<String>) -> Self {
        HostError::StateWrite {
            key: key.into(),
            reason: reason.into(),
        }
    }

    /// Create an iteration failure
    pub fn iteration(reason: impl Into<String>) -> Self {
        HostError::Iteration {
            reason: reason.into(),
        }
    }

    /// Create a composite key failure
    pub fn invalid_composite_key(reason: impl Into<String>) -> Self {
        HostError::InvalidCompositeKey {
            reason: reason.into(),
        }
    }

    /// Create a lock contention failure
    pub fn locked(path: impl Into<String>) -> Self {
        HostError::Locked { path: path.into() }
    }

    /// Create a persistence failure
    pub fn persistence(reason: impl Into<String>) -> Self {
        HostError::Persistence {
            reason: reason.into(),
        }
    }
}
