//! Structured JSON logger
//!
//! - One log line = one JSON object
//! - `event` first, `severity` second, remaining fields sorted by key
//! - Synchronous, no buffering
//! - Destination chosen once per process via `LogSink`

use std::fmt;
use std::io::{self, Write};
use std::sync::atomic::{AtomicU8, Ordering};

/// Log severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Severity {
    /// Debug-level detail
    Trace = 0,
    /// Normal operations
    Info = 1,
    /// Rejected requests and degraded behaviour
    Warn = 2,
    /// Operation failures
    Error = 3,
    /// Unrecoverable, process exits
    Fatal = 4,
}

impl Severity {
    /// Returns the string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Trace => "TRACE",
            Severity::Info => "INFO",
            Severity::Warn => "WARN",
            Severity::Error => "ERROR",
            Severity::Fatal => "FATAL",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Where log lines go. Defaults to `Stderr`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogSink {
    /// TRACE/INFO/WARN to stdout, ERROR/FATAL to stderr
    Stdout,
    /// Everything to stderr
    Stderr,
    /// Nothing is written
    Quiet,
}

impl LogSink {
    fn as_u8(self) -> u8 {
        match self {
            LogSink::Stdout => 0,
            LogSink::Stderr => 1,
            LogSink::Quiet => 2,
        }
    }

    fn from_u8(v: u8) -> Self {
        match v {
            0 => LogSink::Stdout,
            2 => LogSink::Quiet,
            _ => LogSink::Stderr,
        }
    }

    /// Parse a config value (`stdout`, `stderr`, `quiet`)
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "stdout" => Some(LogSink::Stdout),
            "stderr" => Some(LogSink::Stderr),
            "quiet" => Some(LogSink::Quiet),
            _ => None,
        }
    }
}

static SINK: AtomicU8 = AtomicU8::new(1);

/// A structured logger that outputs JSON logs
pub struct Logger;

impl Logger {
    /// Select the process-wide destination
    pub fn set_sink(sink: LogSink) {
        SINK.store(sink.as_u8(), Ordering::Relaxed);
    }

    /// Current process-wide destination
    pub fn sink() -> LogSink {
        LogSink::from_u8(SINK.load(Ordering::Relaxed))
    }

    /// Log an event with the given severity and fields
    ///
    /// Fields are output in deterministic order (alphabetical by key)
    pub fn log(severity: Severity, event: &str, fields: &[(&str, &str)]) {
        match Self::sink() {
            LogSink::Quiet => {}
            LogSink::Stderr => Self::log_to_writer(severity, event, fields, &mut io::stderr()),
            LogSink::Stdout if severity >= Severity::Error => {
                Self::log_to_writer(severity, event, fields, &mut io::stderr())
            }
            LogSink::Stdout => Self::log_to_writer(severity, event, fields, &mut io::stdout()),
        }
    }

    fn log_to_writer<W: Write>(
        severity: Severity,
        event: &str,
        fields: &[(&str, &str)],
        writer: &mut W,
    ) {
        let line = Self::render(severity, event, fields);
        // Logging never fails the caller
        let _ = writer.write_all(line.as_bytes());
        let _ = writer.flush();
    }

    /// Render one log line, newline included
    fn render(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
        let mut output = String::with_capacity(256);

        output.push_str("{\"event\":\"");
        Self::escape_json_string(&mut output, event);
        output.push_str("\",\"severity\":\"");
        output.push_str(severity.as_str());
        output.push('"');

        let mut sorted_fields: Vec<_> = fields.iter().collect();
        sorted_fields.sort_by_key(|(k, _)| *k);

        for (key, value) in sorted_fields {
            output.push_str(",\"");
            Self::escape_json_string(&mut output, key);
            output.push_str("\":\"");
            Self::escape_json_string(&mut output, value);
            output.push('"');
        }

        output.push_str("}\n");
        output
    }

    fn escape_json_string(output: &mut String, s: &str) {
        for c in s.chars() {
            match c {
                '"' => output.push_str("\\\""),
                '\\' => output.push_str("\\\\"),
                '\n' => output.push_str("\\n"),
                '\r' => output.push_str("\\r"),
                '\t' => output.push_str("\\t"),
                c if c.is_control() => {
                    output.push_str(&format!("\\u{:04x}", c as u32));
                }
                c => output.push(c),
            }
        }
    }

    pub fn trace(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Trace, event, fields);
    }

    pub fn info(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Info, event, fields);
    }

    pub fn warn(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Warn, event, fields);
    }

    pub fn error(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Error, event, fields);
    }

    pub fn fatal(event: &str, fields: &[(&str, &str)]) {
        Self::log(Severity::Fatal, event, fields);
    }
}

/// Capture logs to a buffer for testing
#[cfg(test)]
pub fn capture_log(severity: Severity, event: &str, fields: &[(&str, &str)]) -> String {
    let mut buffer = Vec::new();
    Logger::log_to_writer(severity, event, fields, &mut buffer);
    String::from_utf8(buffer).unwrap()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_severity_ordering() {
        assert!(Severity::Trace < Severity::Info);
        assert!(Severity::Info < Severity::Warn);
        assert!(Severity::Warn < Severity::Error);
        assert!(Severity::Error < Severity::Fatal);
    }

    #[test]
    fn test_log_json_format() {
        let output = capture_log(Severity::Info, "DECISION_SUBMITTED", &[("id", "d1")]);

        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["event"], "DECISION_SUBMITTED");
        assert_eq!(parsed["severity"], "INFO");
        assert_eq!(parsed["id"], "d1");
    }

    #[test]
    fn test_log_deterministic_ordering() {
        let output1 = capture_log(
            Severity::Warn,
            "HASH_MISMATCH",
            &[("id", "d2"), ("asserted", "00"), ("computed", "ff")],
        );
        let output2 = capture_log(
            Severity::Warn,
            "HASH_MISMATCH",
            &[("computed", "ff"), ("id", "d2"), ("asserted", "00")],
        );
        assert_eq!(output1, output2);

        let asserted_pos = output1.find("asserted").unwrap();
        let computed_pos = output1.find("computed").unwrap();
        let id_pos = output1.find("\"id\"").unwrap();
        assert!(asserted_pos < computed_pos);
        assert!(computed_pos < id_pos);
    }

    #[test]
    fn test_log_escapes_control_characters() {
        let output = capture_log(
            Severity::Info,
            "TEST",
            &[("key", "\u{0}hash~id\u{0}"), ("message", "a \"b\"\nc")],
        );
        let parsed: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["key"], "\u{0}hash~id\u{0}");
        assert_eq!(parsed["message"], "a \"b\"\nc");
    }

    #[test]
    fn test_log_one_line() {
        let output = capture_log(Severity::Info, "TEST", &[("a", "1"), ("b", "2")]);
        assert_eq!(output.chars().filter(|c| *c == '\n').count(), 1);
        assert!(output.ends_with('\n'));
    }

    #[test]
    fn test_sink_parse() {
        assert_eq!(LogSink::parse("stdout"), Some(LogSink::Stdout));
        assert_eq!(LogSink::parse("stderr"), Some(LogSink::Stderr));
        assert_eq!(LogSink::parse("quiet"), Some(LogSink::Quiet));
        assert_eq!(LogSink::parse("syslog"), None);
    }
}
