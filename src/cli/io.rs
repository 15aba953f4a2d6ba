//! JSON I/O handling for CLI
//!
//! - Output: single JSON object per invocation on stdout
//! - Payloads may be passed inline or via stdin with "-"
//! - UTF-8 only

use std::io::{self, Read, Write};

use serde_json::{json, Value};

use super::errors::{CliError, CliResult};

/// Resolve a payload argument, reading stdin when it is "-"
pub fn read_payload(arg: &str) -> CliResult<String> {
    if arg != "-" {
        return Ok(arg.to_string());
    }
    let mut payload = String::new();
    io::stdin().lock().read_to_string(&mut payload)?;
    Ok(payload)
}

/// Build the success envelope
pub fn ok_response(data: Value) -> Value {
    json!({
        "status": "ok",
        "data": data
    })
}

/// Build the error envelope
pub fn error_response(err: &CliError) -> Value {
    let mut response = json!({
        "status": "error",
        "code": err.code_str(),
        "message": err.message()
    });
    if let Some(details) = err.details() {
        response["details"] = details.clone();
    }
    response
}

/// Write one JSON value followed by a newline, then flush
pub fn write_json_line<W: Write>(out: &mut W, value: &Value) -> CliResult<()> {
    serde_json::to_writer(&mut *out, value)?;
    writeln!(out)?;
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::LedgerError;

    #[test]
    fn test_inline_payload() {
        assert_eq!(read_payload(r#"{"a":1}"#).unwrap(), r#"{"a":1}"#);
    }

    #[test]
    fn test_ok_envelope() {
        let response = ok_response(json!({"digest": "ab"}));
        assert_eq!(response["status"], "ok");
        assert_eq!(response["data"]["digest"], "ab");
    }

    #[test]
    fn test_json_line() {
        let mut buffer = Vec::new();
        write_json_line(&mut buffer, &json!({"a": 1})).unwrap();
        assert_eq!(String::from_utf8(buffer).unwrap(), "{\"a\":1}\n");
    }

    #[test]
    fn test_error_envelope() {
        let err = CliError::from(LedgerError::not_found("d9"));
        let response = error_response(&err);
        assert_eq!(response["status"], "error");
        assert_eq!(response["code"], "LEDGER_NOT_FOUND");
        assert_eq!(response["details"]["disposition"], "REJECT");
        assert!(response["message"].as_str().unwrap().contains("d9"));
    }
}
