//! Observability
//!
//! - Structured JSON logging to stderr
//! - Typed events
//! - Atomic counters
//!
//! Observability is read-only: nothing here changes what a call returns.
//!
//! ```ignore
//! use couchbatch::observability::{log_event_with_fields, Event};
//!
//! log_event_with_fields(Event::BatchSubmit, &[("documents", "3")]);
//! ```

mod events;
mod logger;
mod metrics;

pub use events::Event;
pub use logger::{Logger, Severity};
pub use metrics::{MetricsRegistry, MetricsSnapshot};

/// Log an event at its own severity
pub fn log_event(event: Event) {
    Logger::log(event.severity(), event.as_str(), &[]);
}

/// Log an event with fields at its own severity
pub fn log_event_with_fields(event: Event, fields: &[(&str, &str)]) {
    Logger::log(event.severity(), event.as_str(), fields);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_event() {
        // No panic
        log_event(Event::StoreOpen);
        log_event_with_fields(Event::BatchComplete, &[("accepted", "3")]);
    }
}
