//! decision-ledger - a verifiable, content-addressed decision record ledger
//!
//! Payloads are canonicalized, hashed, checked against the caller's digest,
//! and committed append-only with a secondary index by digest.

pub mod canonical;
pub mod cli;
pub mod digest;
pub mod host;
pub mod ledger;
pub mod observability;
