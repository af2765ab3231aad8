//! Document - open field map with validated reserved keys
//!
//! A document is any JSON object. Top-level keys starting with `_` are
//! reserved for the store and are checked explicitly by [`Document::validate`].

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::errors::{json_type_name, DocumentError, DocumentResult};
use super::id::DocId;
use super::revision::Revision;

/// Document identifier field
pub const ID_FIELD: &str = "_id";
/// Revision token field
pub const REV_FIELD: &str = "_rev";
/// Tombstone marker field
pub const DELETED_FIELD: &str = "_deleted";
/// Inline or stub attachments
pub const ATTACHMENTS_FIELD: &str = "_attachments";
/// Conflicting leaf revisions, reported on read
pub const CONFLICTS_FIELD: &str = "_conflicts";

/// Reserved fields a writer may send.
const WRITABLE_RESERVED: &[&str] = &[ID_FIELD, REV_FIELD, DELETED_FIELD, ATTACHMENTS_FIELD];

/// Reserved fields a store adds on read. Tolerated on input, never sent.
const READ_ONLY_RESERVED: &[&str] = &[
    CONFLICTS_FIELD,
    "_deleted_conflicts",
    "_revisions",
    "_revs_info",
    "_local_seq",
];

/// A single document.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    fields: Map<String, Value>,
}

impl Document {
    /// Creates an empty document. The store will assign an `_id`.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates an empty document with the given id.
    pub fn with_id(id: impl Into<String>) -> Self {
        let mut doc = Self::new();
        doc.fields.insert(ID_FIELD.to_string(), Value::String(id.into()));
        doc
    }

    /// Wraps a JSON value. Fails if it is not an object.
    ///
    /// Reserved fields are not checked here; see [`Document::validate`].
    pub fn from_value(value: Value) -> DocumentResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self { fields }),
            other => Err(DocumentError::NotAnObject(json_type_name(&other))),
        }
    }

    /// Wraps an existing field map.
    pub fn from_map(fields: Map<String, Value>) -> Self {
        Self { fields }
    }

    /// Checks every reserved field.
    pub fn validate(&self) -> DocumentResult<()> {
        self.doc_id()?;
        self.revision()?;

        match self.fields.get(DELETED_FIELD) {
            None | Some(Value::Bool(_)) => {}
            Some(_) => return Err(DocumentError::DeletedNotBool),
        }

        match self.fields.get(ATTACHMENTS_FIELD) {
            None | Some(Value::Object(_)) => {}
            Some(_) => return Err(DocumentError::AttachmentsNotObject),
        }

        for key in self.fields.keys() {
            if key.starts_with('_')
                && !WRITABLE_RESERVED.contains(&key.as_str())
                && !READ_ONLY_RESERVED.contains(&key.as_str())
            {
                return Err(DocumentError::UnknownReservedField(key.clone()));
            }
        }

        Ok(())
    }

    /// Parsed `_id`, if present.
    pub fn doc_id(&self) -> DocumentResult<Option<DocId>> {
        match self.fields.get(ID_FIELD) {
            None => Ok(None),
            Some(Value::String(s)) => DocId::parse(s.as_str()).map(Some),
            Some(other) => Err(DocumentError::IdNotString(json_type_name(other))),
        }
    }

    /// Parsed `_rev`, if present.
    pub fn revision(&self) -> DocumentResult<Option<Revision>> {
        match self.fields.get(REV_FIELD) {
            None => Ok(None),
            Some(Value::String(s)) => s.parse().map(Some),
            Some(other) => Err(DocumentError::RevNotString(json_type_name(other))),
        }
    }

    /// Raw `_id` text, without validation.
    pub fn id(&self) -> Option<&str> {
        self.fields.get(ID_FIELD).and_then(Value::as_str)
    }

    /// Raw `_rev` text, without validation.
    pub fn rev(&self) -> Option<&str> {
        self.fields.get(REV_FIELD).and_then(Value::as_str)
    }

    /// True when `_deleted` is `true`.
    pub fn is_deleted(&self) -> bool {
        matches!(self.fields.get(DELETED_FIELD), Some(Value::Bool(true)))
    }

    /// Conflicting revisions reported by the store, in the order given.
    pub fn conflicts(&self) -> Vec<&str> {
        match self.fields.get(CONFLICTS_FIELD) {
            Some(Value::Array(revs)) => revs.iter().filter_map(Value::as_str).collect(),
            _ => Vec::new(),
        }
    }

    /// True when the store reported a `_conflicts` field.
    pub fn has_conflicts(&self) -> bool {
        self.fields.contains_key(CONFLICTS_FIELD)
    }

    /// Sets `_id`.
    pub fn set_id(&mut self, id: impl Into<String>) {
        self.fields.insert(ID_FIELD.to_string(), Value::String(id.into()));
    }

    /// Sets `_rev`.
    pub fn set_rev(&mut self, rev: &Revision) {
        self.fields
            .insert(REV_FIELD.to_string(), Value::String(rev.to_string()));
    }

    /// Reads a field.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Sets a field, returning the previous value.
    pub fn insert(&mut self, field: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(field.into(), value.into())
    }

    /// Copy suitable for a write request: read-only metadata dropped.
    pub fn write_body(&self) -> Document {
        let fields = self
            .fields
            .iter()
            .filter(|(k, _)| !READ_ONLY_RESERVED.contains(&k.as_str()))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        Document { fields }
    }

    /// User content only: every `_`-prefixed field except attachments dropped.
    pub fn content(&self) -> Map<String, Value> {
        self.fields
            .iter()
            .filter(|(k, _)| !k.starts_with('_') || k.as_str() == ATTACHMENTS_FIELD)
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }
}

impl From<Map<String, Value>> for Document {
    fn from(fields: Map<String, Value>) -> Self {
        Self::from_map(fields)
    }
}

impl TryFrom<Value> for Document {
    type Error = DocumentError;

    fn try_from(value: Value) -> DocumentResult<Self> {
        Self::from_value(value)
    }
}
