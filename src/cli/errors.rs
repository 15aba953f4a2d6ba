//! CLI-specific error types
//!
//! Ledger failures keep their own code (`LEDGER_*`) so client tooling can
//! branch on it; everything else is a `CLI_*` code.

use std::fmt;
use std::io;

use serde_json::{json, Value};

use crate::host::HostError;
use crate::ledger::LedgerError;

/// CLI error codes
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CliErrorCode {
    /// Configuration file error
    ConfigError,
    /// I/O error (stdin/stdout)
    IoError,
    /// Already initialized
    AlreadyInitialized,
    /// Not initialized
    NotInitialized,
    /// World state could not be loaded or saved
    StateError,
    /// Contract operation failed
    Ledger(&'static str),
}

impl CliErrorCode {
    /// Get the error code string
    pub fn code(&self) -> &'static str {
        match self {
            Self::ConfigError => "CLI_CONFIG_ERROR",
            Self::IoError => "CLI_IO_ERROR",
            Self::AlreadyInitialized => "CLI_ALREADY_INITIALIZED",
            Self::NotInitialized => "CLI_NOT_INITIALIZED",
            Self::StateError => "CLI_STATE_ERROR",
            Self::Ledger(code) => code,
        }
    }
}

/// CLI error
#[derive(Debug)]
pub struct CliError {
    code: CliErrorCode,
    message: String,
    details: Option<Value>,
}

impl CliError {
    /// Create a new CLI error
    pub fn new(code: CliErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    /// Config error
    pub fn config_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::ConfigError, msg)
    }

    /// I/O error
    pub fn io_error(msg: impl Into<String>) -> Self {
        Self::new(CliErrorCode::IoError, msg)
    }

    /// Already initialized
    pub fn already_initialized() -> Self {
        Self::new(
            CliErrorCode::AlreadyInitialized,
            "World state already initialized",
        )
    }

    /// Not initialized
    pub fn not_initialized() -> Self {
        Self::new(
            CliErrorCode::NotInitialized,
            "World state not initialized. Run 'decision-ledger init' first.",
        )
    }

    /// Get the error code
    pub fn code(&self) -> &CliErrorCode {
        &self.code
    }

    /// Get the error code string
    pub fn code_str(&self) -> &'static str {
        self.code.code()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Structured extras for the error response, if any
    pub fn details(&self) -> Option<&Value> {
        self.details.as_ref()
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code.code(), self.message)
    }
}

impl std::error::Error for CliError {}

impl From<io::Error> for CliError {
    fn from(e: io::Error) -> Self {
        Self::io_error(e.to_string())
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        Self::io_error(format!("JSON error: {}", e))
    }
}

impl From<HostError> for CliError {
    fn from(e: HostError) -> Self {
        Self::new(CliErrorCode::StateError, e.to_string())
    }
}

impl From<LedgerError> for CliError {
    fn from(e: LedgerError) -> Self {
        let mut details = json!({ "disposition": e.disposition().as_str() });
        if let (Some(asserted), Some(computed)) = (e.asserted_digest(), e.computed_digest()) {
            details["assertedDigest"] = json!(asserted);
            details["computedDigest"] = json!(computed);
        }
        Self {
            code: CliErrorCode::Ledger(e.code().code()),
            message: e.to_string(),
            details: Some(details),
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;
