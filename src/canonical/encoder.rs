//! Canonical JSON encoder
//!
//! Walks a parsed `serde_json::Value` and writes the single canonical text
//! for it. Nothing here relies on the serializer defaults of `serde_json`:
//! key order, number form and string escaping are all decided explicitly.

use serde_json::{Map, Value};

use super::errors::{CanonicalError, CanonicalResult};
use super::number::format_number;

/// Serialize a value to canonical JSON text.
///
/// # Errors
///
/// Returns `CanonicalError::InvalidPayload` for a number with no finite
/// double value.
pub fn canonicalize_value(value: &Value) -> CanonicalResult<String> {
    let mut output = String::new();
    write_value(value, &mut output)?;
    Ok(output)
}

fn write_value(value: &Value, output: &mut String) -> CanonicalResult<()> {
    match value {
        Value::Null => output.push_str("null"),
        Value::Bool(true) => output.push_str("true"),
        Value::Bool(false) => output.push_str("false"),
        Value::Number(n) => {
            let as_double = n.as_f64().ok_or_else(|| {
                CanonicalError::invalid_payload(format!("number {} has no double value", n))
            })?;
            output.push_str(&format_number(as_double)?);
        }
        Value::String(s) => write_string(s, output),
        Value::Array(items) => write_array(items, output)?,
        Value::Object(map) => write_object(map, output)?,
    }
    Ok(())
}

/// Write a string literal with canonical escaping.
///
/// `<`, `>` and `&` are escaped along with U+2028/U+2029 so the canonical
/// bytes match the HTML-safe output of the deployed ledger.
fn write_string(s: &str, output: &mut String) {
    output.push('"');
    for ch in s.chars() {
        match ch {
            '"' => output.push_str("\\\""),
            '\\' => output.push_str("\\\\"),
            '\x08' => output.push_str("\\b"),
            '\x0C' => output.push_str("\\f"),
            '\n' => output.push_str("\\n"),
            '\r' => output.push_str("\\r"),
            '\t' => output.push_str("\\t"),
            '<' | '>' | '&' | '\u{2028}' | '\u{2029}' => {
                output.push_str(&format!("\\u{:04x}", ch as u32));
            }
            c if c < '\x20' => {
                output.push_str(&format!("\\u{:04x}", c as u32));
            }
            c => output.push(c),
        }
    }
    output.push('"');
}

fn write_array(items: &[Value], output: &mut String) -> CanonicalResult<()> {
    output.push('[');
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        write_value(item, output)?;
    }
    output.push(']');
    Ok(())
}

/// Write an object with keys in byte-wise UTF-8 order.
fn write_object(map: &Map<String, Value>, output: &mut String) -> CanonicalResult<()> {
    let mut keys: Vec<&String> = map.keys().collect();
    keys.sort_unstable_by(|a, b| a.as_bytes().cmp(b.as_bytes()));

    output.push('{');
    for (i, key) in keys.iter().enumerate() {
        if i > 0 {
            output.push(',');
        }
        write_string(key, output);
        output.push(':');
        if let Some(v) = map.get(key.as_str()) {
            write_value(v, output)?;
        }
    }
    output.push('}');
    Ok(())
}
