//! Verifiable decision ledger
//!
//! Accepts a JSON payload together with a caller-computed digest, recomputes
//! the digest over the canonical payload, and commits the record only when
//! both agree. Committed records are immutable and can be found by id or by
//! digest.
//!
//! # Design Principles
//!
//! - Append-only: records are never updated or deleted
//! - Verify before write: every check runs before the first `put_state`
//! - Host atomicity: the contract issues writes, the host commits them
//!
//! # Invariants
//!
//! - `id` is unique; a second submission for it fails with no writes
//! - `computedDigest == assertedDigest` for every committed record
//! - Stored `payload` is always canonical
//! - Exactly one `hash~id` index entry per record, written after the record

mod contract;
mod errors;
mod index;
mod record;

pub use contract::DecisionContract;
pub use errors::{Disposition, LedgerError, LedgerErrorCode, LedgerResult};
pub use index::{index_key, indexed_id, HASH_INDEX_NAMESPACE, INDEX_SENTINEL};
pub use record::{DecisionRecord, SOURCE_TAG};
