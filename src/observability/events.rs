//! Observable events of the decision ledger
//!
//! Events are explicit and typed; each maps to one stable string.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Contract operations
    /// Record and index entry staged for commit
    DecisionSubmitted,
    /// Submission refused before any write
    DecisionRejected,
    /// Asserted digest differs from the recomputed one
    HashMismatch,
    /// Record returned by id
    DecisionQueried,
    /// Digest index scanned
    HashIndexQueried,
    /// Digest preview computed
    DigestComputed,
    /// Host had no timestamp; record stores an empty one
    TimestampUnavailable,
    /// Stored record failed to deserialize
    CorruptRecord,

    // Host
    /// Configuration loaded
    ConfigLoaded,
    /// World state loaded from disk
    StateLoaded,
    /// Write set applied and persisted
    StateCommitted,
    /// Invocation failed, write set dropped
    StateDiscarded,
}

impl Event {
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::DecisionSubmitted => "DECISION_SUBMITTED",
            Event::DecisionRejected => "DECISION_REJECTED",
            Event::HashMismatch => "HASH_MISMATCH",
            Event::DecisionQueried => "DECISION_QUERIED",
            Event::HashIndexQueried => "HASH_INDEX_QUERIED",
            Event::DigestComputed => "DIGEST_COMPUTED",
            Event::TimestampUnavailable => "TIMESTAMP_UNAVAILABLE",
            Event::CorruptRecord => "CORRUPT_RECORD",
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StateLoaded => "STATE_LOADED",
            Event::StateCommitted => "STATE_COMMITTED",
            Event::StateDiscarded => "STATE_DISCARDED",
        }
    }

    /// Default severity for this event
    pub fn severity(&self) -> Severity {
        match self {
            Event::DecisionRejected
            | Event::HashMismatch
            | Event::TimestampUnavailable
            | Event::StateDiscarded => Severity::Warn,
            Event::CorruptRecord => Severity::Error,
            Event::DecisionQueried | Event::HashIndexQueried | Event::DigestComputed => {
                Severity::Trace
            }
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
