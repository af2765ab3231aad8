//! DocId - validated document identifier
//!
//! Rules:
//! - Non-empty string
//! - May not begin with `_`, except for the `_design/` and `_local/`
//!   namespaces, which need a non-empty name after the prefix

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::{DocumentError, DocumentResult};

const DESIGN_PREFIX: &str = "_design/";
const LOCAL_PREFIX: &str = "_local/";

/// A document identifier that passed validation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DocId(String);

impl DocId {
    /// Validates and wraps an identifier.
    pub fn parse(id: impl Into<String>) -> DocumentResult<Self> {
        let id = id.into();

        if id.is_empty() {
            return Err(DocumentError::InvalidId(id));
        }

        if id.starts_with('_') {
            let name = id
                .strip_prefix(DESIGN_PREFIX)
                .or_else(|| id.strip_prefix(LOCAL_PREFIX));
            match name {
                Some(name) if !name.is_empty() => {}
                _ => return Err(DocumentError::InvalidId(id)),
            }
        }

        Ok(Self(id))
    }

    /// Returns the identifier text.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True for `_local/...` documents.
    pub fn is_local(&self) -> bool {
        self.0.starts_with(LOCAL_PREFIX)
    }

    /// URL path segments addressing this document.
    ///
    /// Namespaced ids keep their prefix as a separate segment so that the
    /// slash is not percent-encoded.
    pub fn path_segments(&self) -> Vec<&str> {
        for prefix in [DESIGN_PREFIX, LOCAL_PREFIX] {
            if let Some(name) = self.0.strip_prefix(prefix) {
                return vec![&prefix[..prefix.len() - 1], name];
            }
        }
        vec![&self.0]
    }

    /// Consumes the id, returning the inner string.
    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for DocId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DocId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Serialize for DocId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.0)
    }
}

impl<'de> Deserialize<'de> for DocId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        DocId::parse(raw).map_err(serde::de::Error::custom)
    }
}
