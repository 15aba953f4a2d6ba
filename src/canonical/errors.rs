//! Canonicalizer error types

use thiserror::Error;

/// Result type for canonicalization
pub type CanonicalResult<T> = Result<T, CanonicalError>;

/// Canonicalization errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CanonicalError {
    /// Input is not syntactically valid JSON
    #[error("payload is not valid JSON: {reason}")]
    InvalidPayload { reason: String },

    /// Input may be fine but could not be processed on this host
    #[error("canonicalizer unavailable: {reason}")]
    Unavailable { reason: String },
}

impl CanonicalError {
    /// Create an invalid payload error
    pub fn invalid_payload(reason: impl Into<String>) -> Self {
        CanonicalError::InvalidPayload {
            reason: reason.into(),
        }
    }

    /// Create an unavailable error
    pub fn unavailable(reason: impl Into<String>) -> Self {
        CanonicalError::Unavailable {
            reason: reason.into(),
        }
    }

    /// Returns the underlying reason string
    pub fn reason(&self) -> &str {
        match self {
            CanonicalError::InvalidPayload { reason } | CanonicalError::Unavailable { reason } => {
                reason
            }
        }
    }
}

impl From<serde_json::Error> for CanonicalError {
    fn from(e: serde_json::Error) -> Self {
        CanonicalError::invalid_payload(e.to_string())
    }
}
