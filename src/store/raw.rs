//! Native store records
//!
//! These mirror the JSON the server returns, without interpretation.

use serde::{Deserialize, Serialize};

/// Per-document result of a bulk write, as the store reports it.
///
/// Success: `{"id": "...", "rev": "...", "ok": true}`
/// Failure: `{"id": "...", "error": "conflict", "reason": "..."}`
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RawResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rev: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ok: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl RawResult {
    /// Successful write record.
    pub fn ok(id: impl Into<String>, rev: impl Into<String>) -> Self {
        Self {
            id: Some(id.into()),
            rev: Some(rev.into()),
            ok: Some(true),
            ..Default::default()
        }
    }

    /// Failed write record.
    pub fn error(id: Option<String>, error: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            id,
            error: Some(error.into()),
            reason: Some(reason.into()),
            ..Default::default()
        }
    }

    /// Conflict record with the server's standard reason text.
    pub fn conflict(id: impl Into<String>) -> Self {
        Self::error(Some(id.into()), "conflict", "Document update conflict.")
    }

    /// True when the record reports no error.
    pub fn is_ok(&self) -> bool {
        self.error.is_none() && self.ok != Some(false)
    }
}

/// Database metadata from `GET /{db}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatabaseInfo {
    pub db_name: String,
    #[serde(default)]
    pub doc_count: u64,
    #[serde(default)]
    pub doc_del_count: u64,
    /// Servers differ on type (integer vs opaque string)
    #[serde(default)]
    pub update_seq: serde_json::Value,
}
