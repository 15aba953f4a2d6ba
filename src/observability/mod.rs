//! Observability subsystem
//!
//! - Structured logging (JSON, one line per event)
//! - Counter metrics
//! - Typed lifecycle events
//!
//! # Principles
//!
//! 1. Observability is read-only
//! 2. No side effects on contract execution
//! 3. No async or background threads
//! 4. Deterministic output
//!
//! # Usage
//!
//! ```ignore
//! use decision_ledger::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::DecisionSubmitted, &[("id", "d1")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{LogSink, Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log a lifecycle event at its default severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log a lifecycle event with fields at its default severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}
