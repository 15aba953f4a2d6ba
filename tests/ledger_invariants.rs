//! Ledger Invariant Tests
//!
//! Tests for the record store:
//! - Commit gate: new id, valid JSON, matching digest, or nothing is written
//! - Uniqueness of ids
//! - Round-trip of committed records
//! - Error dispositions

use decision_ledger::canonical::canonicalize;
use decision_ledger::digest::digest_hex;
use decision_ledger::host::{FaultPlan, TransactionContext, TxTimestamp, WorldState};
use decision_ledger::ledger::{
    DecisionContract, DecisionRecord, Disposition, LedgerErrorCode, SOURCE_TAG,
};

// =============================================================================
// Helper Functions
// =============================================================================

fn digest_of(raw: &str) -> String {
    digest_hex(&canonicalize(raw).unwrap())
}

fn ts() -> Option<TxTimestamp> {
    Some(TxTimestamp::new(1_700_000_000, 5))
}

/// Runs one submission in its own transaction, committing only on success.
fn submit(
    state: &mut WorldState,
    id: &str,
    payload: &str,
    hash: &str,
) -> Result<DecisionRecord, LedgerErrorCode> {
    let contract = DecisionContract::new();
    let mut tx = state.begin(format!("tx-{}", id), ts());
    match contract.submit_decision(&mut tx, id, payload, hash) {
        Ok(record) => {
            let writes = tx.into_writes();
            state.commit(writes);
            Ok(record)
        }
        Err(err) => {
            assert!(tx.writes().is_empty(), "failed submission staged writes");
            tx.discard();
            Err(err.code())
        }
    }
}

fn query(state: &WorldState, id: &str) -> Result<DecisionRecord, LedgerErrorCode> {
    let tx = state.begin("read", None);
    DecisionContract::new()
        .query_decision(&tx, id)
        .map_err(|e| e.code())
}

// =============================================================================
// Example Scenarios
// =============================================================================

/// Out-of-order payload commits in canonical order.
#[test]
fn test_submit_then_query_canonical() {
    let mut state = WorldState::new();
    let hash = digest_of(r#"{"a":1,"b":2}"#);

    submit(&mut state, "d1", r#"{"b":2,"a":1}"#, &hash).unwrap();

    let record = query(&state, "d1").unwrap();
    assert_eq!(record.payload, r#"{"a":1,"b":2}"#);
    assert_eq!(record.computed_digest, hash);
    assert_eq!(record.asserted_digest, hash);
    assert_eq!(record.tx_id, "tx-d1");
    assert_eq!(record.tx_timestamp, "1700000000.000000005");
    assert_eq!(record.source, SOURCE_TAG);
}

/// Reused id is a conflict whatever the payload.
#[test]
fn test_duplicate_id_conflicts() {
    let mut state = WorldState::new();
    submit(&mut state, "d1", "{}", &digest_of("{}")).unwrap();

    for payload in ["{}", r#"{"other":true}"#, "not json"] {
        let hash = "ab".repeat(32);
        assert_eq!(
            submit(&mut state, "d1", payload, &hash).unwrap_err(),
            LedgerErrorCode::Conflict
        );
    }
    assert_eq!(state.len(), 2);
}

/// Wrong digest writes nothing and the id stays unknown.
#[test]
fn test_hash_mismatch_leaves_no_record() {
    let mut state = WorldState::new();
    let zeros = "0".repeat(64);

    assert_eq!(
        submit(&mut state, "d2", r#"{"a":1,"b":2}"#, &zeros).unwrap_err(),
        LedgerErrorCode::HashMismatch
    );
    assert_eq!(query(&state, "d2").unwrap_err(), LedgerErrorCode::NotFound);
    assert!(state.is_empty());
}

/// Mismatch carries both digests and is classified as tamper.
#[test]
fn test_hash_mismatch_reports_both_digests() {
    let state = WorldState::new();
    let mut tx = state.begin("tx", ts());
    let zeros = "0".repeat(64);

    let err = DecisionContract::new()
        .submit_decision(&mut tx, "d2", r#"{"a":1}"#, &zeros)
        .unwrap_err();

    assert_eq!(err.disposition(), Disposition::Tamper);
    assert_eq!(err.asserted_digest(), Some(zeros.as_str()));
    assert_eq!(err.computed_digest(), Some(digest_of(r#"{"a":1}"#).as_str()));
}

/// Malformed payload is InvalidPayload.
#[test]
fn test_malformed_payload() {
    let mut state = WorldState::new();
    assert_eq!(
        submit(&mut state, "d3", r#"{"a":1"#, &"0".repeat(64)).unwrap_err(),
        LedgerErrorCode::InvalidPayload
    );
    assert!(state.is_empty());
}

/// Digest preview matches what a submission must assert.
#[test]
fn test_compute_hash_matches_submission() {
    let mut state = WorldState::new();
    let contract = DecisionContract::new();

    let preview = contract.compute_ledger_hash(r#"{"a":1,"b":2}"#).unwrap();
    assert!(state.is_empty());

    let record = submit(&mut state, "d1", r#"{"b":2,"a":1}"#, &preview).unwrap();
    assert_eq!(record.computed_digest, preview);
}

// =============================================================================
// Commit Gate Tests
// =============================================================================

/// Asserted digest is trimmed and lowercased before comparison.
#[test]
fn test_asserted_digest_normalized() {
    let mut state = WorldState::new();
    let hash = digest_of("[true]");
    let shouted = format!("  {}\n", hash.to_uppercase());

    let record = submit(&mut state, "d1", "[true]", &shouted).unwrap();
    assert_eq!(record.asserted_digest, hash);
}

/// Blank inputs fail validation before any host call.
#[test]
fn test_blank_inputs_are_validation_errors() {
    let state = WorldState::new();
    let contract = DecisionContract::new();
    let mut tx = state
        .begin("tx", ts())
        .with_faults(FaultPlan::none().fail_reads());

    for (id, payload, hash) in [("", "{}", "ab"), (" ", "{}", "ab"), ("d1", "{}", ""), ("d1", "", "ab")] {
        let err = contract.submit_decision(&mut tx, id, payload, hash).unwrap_err();
        assert_eq!(err.code(), LedgerErrorCode::Validation);
        assert_eq!(err.disposition(), Disposition::Reject);
    }
    assert!(tx.writes().is_empty());
}

/// Read failure during the conflict check is a retryable storage error.
#[test]
fn test_read_failure_is_storage_error() {
    let state = WorldState::new();
    let mut tx = state
        .begin("tx", ts())
        .with_faults(FaultPlan::none().fail_reads());

    let err = DecisionContract::new()
        .submit_decision(&mut tx, "d1", "{}", &digest_of("{}"))
        .unwrap_err();

    assert_eq!(err.code(), LedgerErrorCode::Storage);
    assert_eq!(err.disposition(), Disposition::Retry);
    assert!(tx.writes().is_empty());
}

/// Record write failure stages nothing.
#[test]
fn test_record_write_failure_stages_nothing() {
    let state = WorldState::new();
    let mut tx = state
        .begin("tx", ts())
        .with_faults(FaultPlan::none().fail_write_at(0));

    let err = DecisionContract::new()
        .submit_decision(&mut tx, "d1", "{}", &digest_of("{}"))
        .unwrap_err();

    assert_eq!(err.code(), LedgerErrorCode::Storage);
    assert!(tx.writes().is_empty());
}

/// Index write failure leaves the record staged but never the index alone.
#[test]
fn test_index_write_failure_is_index_missing() {
    let state = WorldState::new();
    let mut tx = state
        .begin("tx", ts())
        .with_faults(FaultPlan::none().fail_write_at(1));

    let err = DecisionContract::new()
        .submit_decision(&mut tx, "d1", "{}", &digest_of("{}"))
        .unwrap_err();

    assert_eq!(err.code(), LedgerErrorCode::Storage);
    let keys: Vec<&str> = tx.writes().keys().collect();
    assert_eq!(keys, vec!["d1"]);
}

/// Success issues exactly two writes: record first, then index.
#[test]
fn test_success_writes_record_then_index() {
    let state = WorldState::new();
    let mut tx = state.begin("tx", ts());
    let hash = digest_of("{}");

    DecisionContract::new()
        .submit_decision(&mut tx, "d1", "{}", &hash)
        .unwrap();

    let keys: Vec<String> = tx.writes().keys().map(str::to_string).collect();
    assert_eq!(keys.len(), 2);
    assert_eq!(keys[0], "d1");
    assert_eq!(
        keys[1],
        tx.create_composite_key("hash~id", &[hash.as_str(), "d1"]).unwrap()
    );
}

/// Missing host timestamp degrades to an empty field.
#[test]
fn test_missing_timestamp_stored_empty() {
    let mut state = WorldState::new();
    let contract = DecisionContract::new();
    let mut tx = state.begin("tx", None);

    let record = contract
        .submit_decision(&mut tx, "d1", "1", &digest_of("1"))
        .unwrap();
    let writes = tx.into_writes();
    state.commit(writes);

    assert_eq!(record.tx_timestamp, "");
    assert_eq!(query(&state, "d1").unwrap().tx_timestamp, "");
}

// =============================================================================
// Read Path Tests
// =============================================================================

/// Query trims the id.
#[test]
fn test_query_trims_id() {
    let mut state = WorldState::new();
    submit(&mut state, "d1", "{}", &digest_of("{}")).unwrap();
    assert_eq!(query(&state, "  d1 ").unwrap().id, "d1");
}

/// Unknown and blank ids.
#[test]
fn test_query_not_found_and_blank() {
    let state = WorldState::new();
    assert_eq!(query(&state, "nope").unwrap_err(), LedgerErrorCode::NotFound);
    assert_eq!(query(&state, "   ").unwrap_err(), LedgerErrorCode::Validation);
}

/// Unparseable stored bytes are corrupt data.
#[test]
fn test_corrupt_record_detected() {
    let mut state = WorldState::new();
    let mut tx = state.begin("seed", None);
    tx.put_state("d1", b"{not a record").unwrap();
    let writes = tx.into_writes();
    state.commit(writes);

    assert_eq!(query(&state, "d1").unwrap_err(), LedgerErrorCode::CorruptData);
}

/// Verification catches a record whose payload was altered after commit.
#[test]
fn test_verify_detects_tampered_payload() {
    let mut state = WorldState::new();
    let mut record = submit(&mut state, "d1", r#"{"a":1}"#, &digest_of(r#"{"a":1}"#)).unwrap();

    let tx = state.begin("read", None);
    assert!(DecisionContract::new().verify_decision(&tx, "d1").is_ok());
    tx.discard();

    record.payload = r#"{"a":2}"#.to_string();
    let mut tx = state.begin("tamper", None);
    tx.put_state("d1", &record.to_bytes().unwrap()).unwrap();
    let writes = tx.into_writes();
    state.commit(writes);

    let tx = state.begin("read", None);
    let err = DecisionContract::new().verify_decision(&tx, "d1").unwrap_err();
    assert_eq!(err.code(), LedgerErrorCode::CorruptData);
    assert_eq!(err.disposition(), Disposition::Tamper);
}
