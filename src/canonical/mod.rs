//! Canonicalizer subsystem
//!
//! Turns an arbitrary JSON text into the one byte encoding that every
//! semantically equal document shares. The digest of a decision is always
//! computed over these bytes, never over what the caller sent.
//!
//! # Canonical Form
//!
//! - Object keys in byte-wise UTF-8 order, last duplicate wins
//! - No insignificant whitespace
//! - Numbers as doubles in ECMAScript shortest form (see `number`)
//! - Strings with short escapes, `\u00XX` for other control characters,
//!   and `<`, `>`, `&`, U+2028, U+2029 escaped as `\uXXXX`
//!
//! # Invariants
//!
//! - Pure: no I/O, no shared state
//! - `canonicalize(a) == canonicalize(b)` whenever `a` and `b` parse to
//!   equal documents
//! - Canonical output re-canonicalizes to itself

mod encoder;
mod errors;
mod number;

pub use encoder::canonicalize_value;
pub use errors::{CanonicalError, CanonicalResult};
pub use number::format_number;

use std::thread;

use serde::Deserialize;
use serde_json::Value;

/// Deepest array/object nesting accepted, same as the deployed ledger's decoder
pub const MAX_NESTING_DEPTH: usize = 10_000;

/// Documents nested deeper than this run on a dedicated thread
const INLINE_NESTING_DEPTH: usize = 128;

/// Stack reserved for the dedicated thread. Only touched pages are committed.
const DEEP_STACK_BYTES: usize = 512 * 1024 * 1024;

/// Parse `raw` as JSON and return its canonical bytes.
///
/// Any JSON value is accepted at the top level, not just objects.
///
/// # Errors
///
/// Returns `CanonicalError::InvalidPayload` if `raw` is not valid JSON
/// (including trailing garbage, numbers outside the double range and
/// nesting deeper than `MAX_NESTING_DEPTH`).
pub fn canonicalize(raw: &str) -> CanonicalResult<Vec<u8>> {
    canonicalize_to_string(raw).map(String::into_bytes)
}

/// Canonicalize into a `String`.
///
/// The encoder only ever produces UTF-8, so this is `canonicalize` without
/// the byte conversion.
pub fn canonicalize_to_string(raw: &str) -> CanonicalResult<String> {
    let depth = nesting_depth(raw);
    if depth > MAX_NESTING_DEPTH {
        return Err(CanonicalError::invalid_payload(format!(
            "exceeded max depth {} (found {})",
            MAX_NESTING_DEPTH, depth
        )));
    }
    if depth <= INLINE_NESTING_DEPTH {
        return parse_and_encode(raw);
    }

    // Parsing, encoding and dropping the value all recurse once per level
    thread::scope(|scope| {
        let worker = thread::Builder::new()
            .name("canonicalize-deep".to_string())
            .stack_size(DEEP_STACK_BYTES)
            .spawn_scoped(scope, || parse_and_encode(raw))
            .map_err(|e| CanonicalError::unavailable(format!("failed to spawn worker: {}", e)))?;
        worker
            .join()
            .map_err(|_| CanonicalError::unavailable("worker panicked"))?
    })
}

fn parse_and_encode(raw: &str) -> CanonicalResult<String> {
    let mut de = serde_json::Deserializer::from_str(raw);
    de.disable_recursion_limit();
    let value = Value::deserialize(&mut de)?;
    de.end()?;
    canonicalize_value(&value)
}

/// Maximum array/object nesting of `raw`, ignoring brackets inside strings.
///
/// Malformed input still gets a number; the parser reports the real error.
fn nesting_depth(raw: &str) -> usize {
    let mut depth = 0usize;
    let mut max_depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for b in raw.bytes() {
        if in_string {
            if escaped {
                escaped = false;
            } else if b == b'\\' {
                escaped = true;
            } else if b == b'"' {
                in_string = false;
            }
            continue;
        }
        match b {
            b'"' => in_string = true,
            b'[' | b'{' => {
                depth += 1;
                max_depth = max_depth.max(depth);
            }
            b']' | b'}' => depth = depth.saturating_sub(1),
            _ => {}
        }
    }

    max_depth
}
