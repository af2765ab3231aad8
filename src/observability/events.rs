//! Observable events
//!
//! Every log line the crate writes carries one of these names.

use std::fmt;

use super::logger::Severity;

/// Observable events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    // Lifecycle
    /// Configuration file loaded
    ConfigLoaded,
    /// Store handle opened
    StoreOpen,
    /// Store handle closed
    StoreClose,

    // Bulk writes
    /// Batch passed validation and is being sent
    BatchSubmit,
    /// Batch outcomes produced
    BatchComplete,
    /// Batch failed local validation
    BatchRejected,
    /// Store round trip exceeded the timeout
    BatchTimeout,
    /// Store failed the call
    BatchStoreError,
    /// One document in a batch was not accepted
    DocumentNotAccepted,
}

impl Event {
    /// Returns the event name
    pub fn as_str(&self) -> &'static str {
        match self {
            Event::ConfigLoaded => "CONFIG_LOADED",
            Event::StoreOpen => "STORE_OPEN",
            Event::StoreClose => "STORE_CLOSE",
            Event::BatchSubmit => "BATCH_SUBMIT",
            Event::BatchComplete => "BATCH_COMPLETE",
            Event::BatchRejected => "BATCH_REJECTED",
            Event::BatchTimeout => "BATCH_TIMEOUT",
            Event::BatchStoreError => "BATCH_STORE_ERROR",
            Event::DocumentNotAccepted => "DOCUMENT_NOT_ACCEPTED",
        }
    }

    /// Severity the event is logged at
    pub fn severity(&self) -> Severity {
        match self {
            Event::DocumentNotAccepted => Severity::Trace,
            Event::BatchRejected | Event::BatchTimeout => Severity::Warn,
            Event::BatchStoreError => Severity::Error,
            _ => Severity::Info,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
