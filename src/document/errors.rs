//! # Document Errors
//!
//! Validation failures for documents. These are raised locally, before a
//! document ever reaches a store.

use thiserror::Error;

/// Result type for document operations
pub type DocumentResult<T> = Result<T, DocumentError>;

/// Document validation errors
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DocumentError {
    /// Top-level value is not a JSON object
    #[error("Document must be a JSON object, got {0}")]
    NotAnObject(&'static str),

    /// `_id` present but not a string
    #[error("_id must be a string, got {0}")]
    IdNotString(&'static str),

    /// `_id` string violates the identifier rules
    #[error("Invalid document id: {0:?}")]
    InvalidId(String),

    /// `_rev` present but not a string
    #[error("_rev must be a string, got {0}")]
    RevNotString(&'static str),

    /// `_rev` string is not `<generation>-<hash>`
    #[error("Invalid revision: {0:?}")]
    InvalidRevision(String),

    /// `_deleted` present but not a boolean
    #[error("_deleted must be a boolean")]
    DeletedNotBool,

    /// `_attachments` present but not an object
    #[error("_attachments must be an object")]
    AttachmentsNotObject,

    /// Field starting with `_` that the store does not recognise
    #[error("Reserved field not allowed: {0}")]
    UnknownReservedField(String),
}

/// Name of a JSON value's type, for error messages
pub(crate) fn json_type_name(value: &serde_json::Value) -> &'static str {
    use serde_json::Value;
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_json_type_names() {
        assert_eq!(json_type_name(&json!(null)), "null");
        assert_eq!(json_type_name(&json!([1, 2])), "array");
        assert_eq!(json_type_name(&json!({"a": 1})), "object");
        assert_eq!(json_type_name(&json!(7)), "number");
    }

    #[test]
    fn test_error_messages() {
        let err = DocumentError::UnknownReservedField("_type".into());
        assert_eq!(err.to_string(), "Reserved field not allowed: _type");

        let err = DocumentError::IdNotString("number");
        assert_eq!(err.to_string(), "_id must be a string, got number");
    }
}
