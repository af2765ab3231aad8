//! # Bulk Write Errors
//!
//! Only call-level failures live here. Per-document conflicts and errors
//! are reported as [`WriteOutcome`](super::WriteOutcome) values instead.

use thiserror::Error;

use crate::document::DocumentError;
use crate::store::StoreError;

/// Result type for bulk write operations
pub type BulkResult<T> = Result<T, BulkError>;

/// Call-level bulk write errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BulkError {
    /// Batch had no documents
    #[error("Batch is empty")]
    EmptyBatch,

    /// A document failed local validation; nothing was sent
    #[error("Invalid document at index {index}: {source}")]
    InvalidDocument {
        index: usize,
        #[source]
        source: DocumentError,
    },

    /// The store failed the call as a whole
    #[error("Store error: {0}")]
    Store(#[from] StoreError),
}

impl BulkError {
    /// True for errors raised before any store interaction
    pub fn is_validation(&self) -> bool {
        matches!(self, BulkError::EmptyBatch | BulkError::InvalidDocument { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_classification() {
        assert!(BulkError::EmptyBatch.is_validation());
        assert!(BulkError::InvalidDocument {
            index: 2,
            source: DocumentError::DeletedNotBool,
        }
        .is_validation());
        assert!(!BulkError::Store(StoreError::Timeout).is_validation());
    }

    #[test]
    fn test_display_names_index() {
        let err = BulkError::InvalidDocument {
            index: 1,
            source: DocumentError::IdNotString("number"),
        };
        assert_eq!(
            err.to_string(),
            "Invalid document at index 1: _id must be a string, got number"
        );
    }
}
