//! Ledger error types
//!
//! Error codes:
//! - LEDGER_VALIDATION (REJECT)
//! - LEDGER_INVALID_PAYLOAD (REJECT)
//! - LEDGER_CONFLICT (REJECT)
//! - LEDGER_NOT_FOUND (REJECT)
//! - LEDGER_STORAGE (RETRY)
//! - LEDGER_HASH_MISMATCH (TAMPER)
//! - LEDGER_CORRUPT_DATA (TAMPER)
//!
//! Nothing is retried inside the contract. The disposition tells the client
//! what to do with a failure.

use std::error::Error as StdError;
use std::fmt;

use crate::canonical::CanonicalError;
use crate::host::HostError;

/// How a client should react to an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// The request itself is wrong; resubmitting it unchanged fails again
    Reject,
    /// The host failed; the same request may succeed later
    Retry,
    /// Digest evidence does not line up; report, do not retry
    Tamper,
}

impl Disposition {
    pub fn as_str(&self) -> &'static str {
        match self {
            Disposition::Reject => "REJECT",
            Disposition::Retry => "RETRY",
            Disposition::Tamper => "TAMPER",
        }
    }
}

impl fmt::Display for Disposition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Ledger error codes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerErrorCode {
    /// Missing or malformed caller input
    Validation,
    /// Payload is not syntactically valid JSON
    InvalidPayload,
    /// A record with this id already exists
    Conflict,
    /// Asserted digest differs from the computed digest
    HashMismatch,
    /// Host key/value I/O or runtime resources failed
    Storage,
    /// No record for the requested id
    NotFound,
    /// Stored bytes do not form a valid record
    CorruptData,
}

impl LedgerErrorCode {
    /// Returns the string code
    pub fn code(&self) -> &'static str {
        match self {
            LedgerErrorCode::Validation => "LEDGER_VALIDATION",
            LedgerErrorCode::InvalidPayload => "LEDGER_INVALID_PAYLOAD",
            LedgerErrorCode::Conflict => "LEDGER_CONFLICT",
            LedgerErrorCode::HashMismatch => "LEDGER_HASH_MISMATCH",
            LedgerErrorCode::Storage => "LEDGER_STORAGE",
            LedgerErrorCode::NotFound => "LEDGER_NOT_FOUND",
            LedgerErrorCode::CorruptData => "LEDGER_CORRUPT_DATA",
        }
    }

    /// Returns the client disposition for this code
    pub fn disposition(&self) -> Disposition {
        match self {
            LedgerErrorCode::Validation
            | LedgerErrorCode::InvalidPayload
            | LedgerErrorCode::Conflict
            | LedgerErrorCode::NotFound => Disposition::Reject,
            LedgerErrorCode::Storage => Disposition::Retry,
            LedgerErrorCode::HashMismatch | LedgerErrorCode::CorruptData => Disposition::Tamper,
        }
    }
}

impl fmt::Display for LedgerErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

/// Ledger error with full context
#[derive(Debug)]
pub struct LedgerError {
    code: LedgerErrorCode,
    message: String,
    /// (asserted, computed) for hash mismatches
    digests: Option<(String, String)>,
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl LedgerError {
    fn new(code: LedgerErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            digests: None,
            source: None,
        }
    }

    fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Malformed or empty caller input
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(LedgerErrorCode::Validation, message)
    }

    /// Payload could not be canonicalized.
    ///
    /// A payload the host could not process (as opposed to malformed JSON)
    /// is a retryable `Storage` failure.
    pub fn invalid_payload(cause: CanonicalError) -> Self {
        let code = match cause {
            CanonicalError::InvalidPayload { .. } => LedgerErrorCode::InvalidPayload,
            CanonicalError::Unavailable { .. } => LedgerErrorCode::Storage,
        };
        Self::new(code, cause.to_string()).with_source(cause)
    }

    /// Record id already taken
    pub fn conflict(id: &str) -> Self {
        Self::new(
            LedgerErrorCode::Conflict,
            format!("decision '{}' already exists", id),
        )
    }

    /// Asserted and computed digests differ
    pub fn hash_mismatch(asserted: impl Into<String>, computed: impl Into<String>) -> Self {
        let asserted = asserted.into();
        let computed = computed.into();
        let mut err = Self::new(
            LedgerErrorCode::HashMismatch,
            format!("hash mismatch: asserted={} computed={}", asserted, computed),
        );
        err.digests = Some((asserted, computed));
        err
    }

    /// Host key/value failure
    pub fn storage(message: impl Into<String>, cause: HostError) -> Self {
        Self::new(LedgerErrorCode::Storage, message).with_source(cause)
    }

    /// Record could not be encoded for storage
    pub fn encoding(message: impl Into<String>, cause: serde_json::Error) -> Self {
        Self::new(LedgerErrorCode::Storage, message).with_source(cause)
    }

    /// No record for `id`
    pub fn not_found(id: &str) -> Self {
        Self::new(
            LedgerErrorCode::NotFound,
            format!("decision '{}' does not exist", id),
        )
    }

    /// Stored bytes are not a record
    pub fn corrupt_data(id: &str, cause: serde_json::Error) -> Self {
        Self::new(
            LedgerErrorCode::CorruptData,
            format!("failed to unmarshal decision '{}'", id),
        )
        .with_source(cause)
    }

    /// Stored record is readable but its digests do not line up
    pub fn integrity(id: &str, reason: impl Into<String>) -> Self {
        Self::new(
            LedgerErrorCode::CorruptData,
            format!("decision '{}' failed integrity check: {}", id, reason.into()),
        )
    }

    /// Returns the error code
    pub fn code(&self) -> LedgerErrorCode {
        self.code
    }

    /// Returns the client disposition
    pub fn disposition(&self) -> Disposition {
        self.code.disposition()
    }

    /// Returns the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Asserted digest, for hash mismatches
    pub fn asserted_digest(&self) -> Option<&str> {
        self.digests.as_ref().map(|(a, _)| a.as_str())
    }

    /// Computed digest, for hash mismatches
    pub fn computed_digest(&self) -> Option<&str> {
        self.digests.as_ref().map(|(_, c)| c.as_str())
    }
}

impl fmt::Display for LedgerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)?;
        // InvalidPayload already embeds its cause in the message
        if self.code != LedgerErrorCode::InvalidPayload {
            if let Some(ref source) = self.source {
                write!(f, " (caused by: {})", source)?;
            }
        }
        Ok(())
    }
}

impl StdError for LedgerError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

/// Result type for ledger operations
pub type LedgerResult<T> = Result<T, LedgerError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        assert_eq!(LedgerErrorCode::Validation.code(), "LEDGER_VALIDATION");
        assert_eq!(LedgerErrorCode::InvalidPayload.code(), "LEDGER_INVALID_PAYLOAD");
        assert_eq!(LedgerErrorCode::Conflict.code(), "LEDGER_CONFLICT");
        assert_eq!(LedgerErrorCode::HashMismatch.code(), "LEDGER_HASH_MISMATCH");
        assert_eq!(LedgerErrorCode::Storage.code(), "LEDGER_STORAGE");
        assert_eq!(LedgerErrorCode::NotFound.code(), "LEDGER_NOT_FOUND");
        assert_eq!(LedgerErrorCode::CorruptData.code(), "LEDGER_CORRUPT_DATA");
    }

    #[test]
    fn test_dispositions() {
        assert_eq!(LedgerError::validation("x").disposition(), Disposition::Reject);
        assert_eq!(LedgerError::conflict("d1").disposition(), Disposition::Reject);
        assert_eq!(
            LedgerError::storage("x", HostError::TimestampUnavailable).disposition(),
            Disposition::Retry
        );
        assert_eq!(
            LedgerError::hash_mismatch("a", "b").disposition(),
            Disposition::Tamper
        );
    }

    #[test]
    fn test_hash_mismatch_carries_both_digests() {
        let err = LedgerError::hash_mismatch("00ff", "abcd");
        assert_eq!(err.asserted_digest(), Some("00ff"));
        assert_eq!(err.computed_digest(), Some("abcd"));
        let display = err.to_string();
        assert!(display.contains("LEDGER_HASH_MISMATCH"));
        assert!(display.contains("asserted=00ff"));
        assert!(display.contains("computed=abcd"));
    }

    #[test]
    fn test_storage_error_wraps_cause() {
        let err = LedgerError::storage(
            "failed to store decision 'd1'",
            HostError::state_write("d1", "disk full"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().contains("disk full"));
    }

    #[test]
    fn test_canonicalizer_unavailable_is_retryable() {
        let err = LedgerError::invalid_payload(CanonicalError::unavailable("worker panicked"));
        assert_eq!(err.code(), LedgerErrorCode::Storage);
        assert_eq!(err.disposition(), Disposition::Retry);
    }

    #[test]
    fn test_invalid_payload_not_duplicated() {
        let cause = CanonicalError::invalid_payload("EOF while parsing");
        let err = LedgerError::invalid_payload(cause);
        assert_eq!(err.to_string().matches("EOF while parsing").count(), 1);
    }
}
