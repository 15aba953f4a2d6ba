//! Decision contract operations
//!
//! # Write Path (`submit_decision`)
//!
//! 1. Validate id, asserted digest, payload (no I/O)
//! 2. Refuse an id that already has a record
//! 3. Canonicalize the payload
//! 4. Compare the recomputed digest with the asserted one
//! 5. Build the record from the host transaction id and timestamp
//! 6. Write the record under its id
//! 7. Write the index entry under `(computedDigest, id)`
//!
//! Any failure before step 6 leaves the write set empty. The record is
//! always written before its index entry, so a partially applied write set
//! can lack an index entry but never point at a missing record.
//!
//! # Read Paths
//!
//! `query_decision`, `query_by_hash` and `verify_decision` only read.
//! `compute_ledger_hash` touches no state at all.

use std::sync::Arc;

use crate::canonical;
use crate::digest::{digest_hex, is_well_formed, normalize_digest};
use crate::host::{TransactionContext, COMPOSITE_KEY_SEPARATOR, MAX_UNICODE_RUNE};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};

use super::errors::{LedgerError, LedgerErrorCode, LedgerResult};
use super::index::{index_key, indexed_id, HASH_INDEX_NAMESPACE, INDEX_SENTINEL};
use super::record::{DecisionRecord, SOURCE_TAG};

/// The verifiable decision ledger contract.
///
/// Stateless apart from an optional metrics registry; all state lives behind
/// the `TransactionContext` passed to each call.
#[derive(Debug, Default, Clone)]
pub struct DecisionContract {
    metrics: Option<Arc<MetricsRegistry>>,
}

fn has_reserved_char(s: &str) -> bool {
    s.contains(COMPOSITE_KEY_SEPARATOR) || s.contains(MAX_UNICODE_RUNE)
}

/// Trim and check a record id.
///
/// Ids holding U+0000 or U+10FFFF are refused: they could not be placed in
/// the digest index and could alias composite keys.
fn validate_id(raw: &str) -> LedgerResult<&str> {
    let id = raw.trim();
    if id.is_empty() {
        return Err(LedgerError::validation("decision id is required"));
    }
    if has_reserved_char(id) {
        return Err(LedgerError::validation(
            "decision id must not contain U+0000 or U+10FFFF",
        ));
    }
    Ok(id)
}

impl DecisionContract {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach a metrics registry
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    fn metrics(&self) -> Option<&MetricsRegistry> {
        self.metrics.as_deref()
    }

    /// Verify and commit a new decision.
    ///
    /// Returns the record as staged for commit.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty id, digest or payload
    /// - `Conflict` if `id` already has a record
    /// - `InvalidPayload` if `payload` is not valid JSON
    /// - `HashMismatch` if the recomputed digest differs from `asserted_digest`
    /// - `Storage` if a host read or write fails
    pub fn submit_decision(
        &self,
        ctx: &mut dyn TransactionContext,
        id: &str,
        payload: &str,
        asserted_digest: &str,
    ) -> LedgerResult<DecisionRecord> {
        let result = self.submit_inner(ctx, id, payload, asserted_digest);

        match &result {
            Ok(record) => {
                if let Some(m) = self.metrics() {
                    m.increment_submissions_accepted();
                }
                log_event_with_fields(
                    Event::DecisionSubmitted,
                    &[
                        ("digest", record.computed_digest.as_str()),
                        ("id", record.id.as_str()),
                        ("tx_id", record.tx_id.as_str()),
                    ],
                );
            }
            Err(err) => {
                if let Some(m) = self.metrics() {
                    m.increment_submissions_rejected();
                    match err.code() {
                        LedgerErrorCode::HashMismatch => m.increment_hash_mismatches(),
                        LedgerErrorCode::Conflict => m.increment_conflicts(),
                        LedgerErrorCode::Storage => m.increment_storage_failures(),
                        _ => {}
                    }
                }
                if err.code() != LedgerErrorCode::HashMismatch {
                    log_event_with_fields(
                        Event::DecisionRejected,
                        &[
                            ("code", err.code().code()),
                            ("id", id.trim()),
                            ("reason", err.message()),
                        ],
                    );
                }
            }
        }

        result
    }

    fn submit_inner(
        &self,
        ctx: &mut dyn TransactionContext,
        id: &str,
        payload: &str,
        asserted_digest: &str,
    ) -> LedgerResult<DecisionRecord> {
        let id = validate_id(id)?;
        let asserted = normalize_digest(asserted_digest);
        if asserted.is_empty() {
            return Err(LedgerError::validation("asserted digest is required"));
        }
        if payload.is_empty() {
            return Err(LedgerError::validation("payload is required"));
        }

        let existing = ctx
            .get_state(id)
            .map_err(|e| LedgerError::storage("failed reading existing state", e))?;
        if existing.is_some() {
            return Err(LedgerError::conflict(id));
        }

        let canonical_payload =
            canonical::canonicalize_to_string(payload).map_err(LedgerError::invalid_payload)?;

        let computed = digest_hex(canonical_payload.as_bytes());
        if computed != asserted {
            log_event_with_fields(
                Event::HashMismatch,
                &[
                    ("asserted", asserted.as_str()),
                    ("computed", computed.as_str()),
                    ("id", id),
                    (
                        "well_formed",
                        if is_well_formed(&asserted) { "true" } else { "false" },
                    ),
                ],
            );
            return Err(LedgerError::hash_mismatch(asserted, computed));
        }

        let tx_timestamp = match ctx.tx_timestamp() {
            Ok(ts) => ts.to_string(),
            Err(e) => {
                log_event_with_fields(
                    Event::TimestampUnavailable,
                    &[("id", id), ("reason", e.to_string().as_str())],
                );
                String::new()
            }
        };

        let record = DecisionRecord {
            id: id.to_string(),
            payload: canonical_payload,
            asserted_digest: asserted,
            computed_digest: computed,
            tx_id: ctx.tx_id(),
            tx_timestamp,
            source: SOURCE_TAG.to_string(),
        };

        let record_bytes = record
            .to_bytes()
            .map_err(|e| LedgerError::encoding("failed to marshal decision record", e))?;

        ctx.put_state(id, &record_bytes).map_err(|e| {
            LedgerError::storage(format!("failed to store decision '{}'", id), e)
        })?;

        let idx_key = index_key(&*ctx, &record.computed_digest, id)
            .map_err(|e| LedgerError::storage("failed to create hash index key", e))?;
        ctx.put_state(&idx_key, INDEX_SENTINEL)
            .map_err(|e| LedgerError::storage("failed to store hash index", e))?;

        Ok(record)
    }

    /// Fetch a record by id.
    ///
    /// # Errors
    ///
    /// - `Validation` for an empty id
    /// - `NotFound` if no record exists
    /// - `CorruptData` if the stored bytes are not a record
    /// - `Storage` if the host read fails
    pub fn query_decision(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
    ) -> LedgerResult<DecisionRecord> {
        let id = validate_id(id)?;
        if let Some(m) = self.metrics() {
            m.increment_queries_by_id();
        }
        let record = self.load_record(ctx, id)?;
        log_event_with_fields(Event::DecisionQueried, &[("id", id)]);
        Ok(record)
    }

    fn load_record(&self, ctx: &dyn TransactionContext, id: &str) -> LedgerResult<DecisionRecord> {
        let bytes = ctx
            .get_state(id)
            .map_err(|e| LedgerError::storage(format!("failed to read decision '{}'", id), e))?
            .ok_or_else(|| LedgerError::not_found(id))?;

        DecisionRecord::from_bytes(&bytes).map_err(|e| {
            log_event_with_fields(Event::CorruptRecord, &[("id", id)]);
            LedgerError::corrupt_data(id, e)
        })
    }

    /// Every record whose computed digest equals `hash`, ordered by id.
    ///
    /// An unknown digest yields an empty list. A referenced record that
    /// cannot be loaded aborts the whole query with that error.
    pub fn query_by_hash(
        &self,
        ctx: &dyn TransactionContext,
        hash: &str,
    ) -> LedgerResult<Vec<DecisionRecord>> {
        let hash = normalize_digest(hash);
        if hash.is_empty() {
            return Err(LedgerError::validation("hash is required"));
        }
        if has_reserved_char(&hash) {
            return Err(LedgerError::validation(
                "hash must not contain U+0000 or U+10FFFF",
            ));
        }
        if let Some(m) = self.metrics() {
            m.increment_queries_by_hash();
        }

        let mut iter = ctx
            .state_by_partial_composite_key(HASH_INDEX_NAMESPACE, &[hash.as_str()])
            .map_err(|e| LedgerError::storage("failed to query by hash index", e))?;

        let mut results = Vec::new();
        while let Some(kv) = iter
            .next_entry()
            .map_err(|e| LedgerError::storage("failed iterating hash index", e))?
        {
            let id = match indexed_id(ctx, &kv.key)
                .map_err(|e| LedgerError::storage("failed parsing hash index key", e))?
            {
                Some(id) => id,
                None => continue,
            };
            results.push(self.load_record(ctx, &id)?);
        }

        iter.close()
            .map_err(|e| LedgerError::storage("failed closing hash index iterator", e))?;

        if let Some(m) = self.metrics() {
            m.add_index_hits(results.len() as u64);
        }
        log_event_with_fields(
            Event::HashIndexQueried,
            &[("hash", hash.as_str()), ("matches", results.len().to_string().as_str())],
        );

        Ok(results)
    }

    /// Digest the caller must assert for `payload`. Reads and writes nothing.
    ///
    /// # Errors
    ///
    /// - `Validation` for a blank payload
    /// - `InvalidPayload` if `payload` is not valid JSON
    pub fn compute_ledger_hash(&self, payload: &str) -> LedgerResult<String> {
        if payload.trim().is_empty() {
            return Err(LedgerError::validation("payload is required"));
        }
        let canonical_payload = canonical::canonicalize(payload).map_err(LedgerError::invalid_payload)?;
        let digest = digest_hex(&canonical_payload);

        if let Some(m) = self.metrics() {
            m.increment_digests_computed();
        }
        log_event_with_fields(Event::DigestComputed, &[("digest", digest.as_str())]);

        Ok(digest)
    }

    /// Fetch a record and re-check it against its own digests.
    ///
    /// # Errors
    ///
    /// Everything `query_decision` returns, plus `CorruptData` when the stored
    /// payload no longer hashes to the stored digests or is not canonical.
    pub fn verify_decision(
        &self,
        ctx: &dyn TransactionContext,
        id: &str,
    ) -> LedgerResult<DecisionRecord> {
        let record = self.query_decision(ctx, id)?;
        record.check_integrity().map_err(|reason| {
            log_event_with_fields(
                Event::CorruptRecord,
                &[("id", record.id.as_str()), ("reason", reason.as_str())],
            );
            LedgerError::integrity(&record.id, reason)
        })?;
        Ok(record)
    }
}
