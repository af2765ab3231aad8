//! # Store Errors

use thiserror::Error;

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Document store errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StoreError {
    // Connection
    #[error("Transport error: {0}")]
    Transport(String),

    #[error("Request timed out")]
    Timeout,

    #[error("Store is closed")]
    Closed,

    #[error("Database not found: {0}")]
    DatabaseNotFound(String),

    // Server responses
    #[error("Server error {status}: {error}: {reason}")]
    Server {
        status: u16,
        error: String,
        reason: String,
    },

    /// The store rejected the whole all-or-nothing batch
    #[error("Batch aborted: {0}")]
    Aborted(String),

    /// Response did not match the request
    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl StoreError {
    /// Short machine-readable reason, used for per-document outcomes.
    pub fn reason(&self) -> String {
        match self {
            StoreError::Timeout => "timeout".to_string(),
            StoreError::Closed => "closed".to_string(),
            StoreError::Transport(msg) => format!("transport: {}", msg),
            StoreError::DatabaseNotFound(db) => format!("not_found: {}", db),
            StoreError::Server { error, reason, .. } => format!("{}: {}", error, reason),
            StoreError::Aborted(msg) => format!("aborted: {}", msg),
            StoreError::Protocol(msg) => format!("protocol: {}", msg),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reason_strings() {
        assert_eq!(StoreError::Timeout.reason(), "timeout");
        assert_eq!(
            StoreError::Server {
                status: 500,
                error: "internal".into(),
                reason: "boom".into()
            }
            .reason(),
            "internal: boom"
        );
    }

    #[test]
    fn test_display() {
        let err = StoreError::DatabaseNotFound("missing".into());
        assert_eq!(err.to_string(), "Database not found: missing");
    }
}
