//! Digest index over committed records
//!
//! One entry per record, keyed by the composite key `(computedDigest, id)`
//! in the `hash~id` namespace, with a one-byte sentinel value. A partial-key
//! scan on `[digest]` yields every id carrying that digest, ordered by id.

use crate::host::{HostResult, TransactionContext};

/// Composite key namespace of the digest index
pub const HASH_INDEX_NAMESPACE: &str = "hash~id";

/// Value stored under every index key
pub const INDEX_SENTINEL: &[u8] = &[0];

/// Composite key for the index entry of `(digest, id)`
pub fn index_key(ctx: &dyn TransactionContext, digest: &str, id: &str) -> HostResult<String> {
    ctx.create_composite_key(HASH_INDEX_NAMESPACE, &[digest, id])
}

/// Recover the record id from an index key.
///
/// Returns `Ok(None)` for keys that are well-formed composite keys but not
/// `(digest, id)` entries of this index; callers skip those.
pub fn indexed_id(ctx: &dyn TransactionContext, key: &str) -> HostResult<Option<String>> {
    let (namespace, mut components) = ctx.split_composite_key(key)?;
    if namespace != HASH_INDEX_NAMESPACE || components.len() != 2 {
        return Ok(None);
    }
    Ok(components.pop())
}
