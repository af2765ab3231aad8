//! Revision - `<generation>-<hash>` revision token
//!
//! Revisions are immutable once assigned by a store. The generation counts
//! edits along a branch; the hash distinguishes siblings.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::errors::DocumentError;

/// A parsed revision token.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Revision {
    generation: u64,
    hash: String,
}

impl Revision {
    /// Creates a revision from its parts.
    ///
    /// The hash is lowercased. Callers are expected to pass hex text.
    pub fn new(generation: u64, hash: impl Into<String>) -> Self {
        Self {
            generation,
            hash: hash.into().to_ascii_lowercase(),
        }
    }

    /// Returns the generation number.
    #[inline]
    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Returns the hash part.
    #[inline]
    pub fn hash(&self) -> &str {
        &self.hash
    }
}

impl FromStr for Revision {
    type Err = DocumentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || DocumentError::InvalidRevision(s.to_string());

        let (generation, hash) = s.split_once('-').ok_or_else(invalid)?;
        if generation.is_empty() || !generation.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }
        let generation: u64 = generation.parse().map_err(|_| invalid())?;
        if generation == 0 {
            return Err(invalid());
        }
        if hash.is_empty() || !hash.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(invalid());
        }

        Ok(Self::new(generation, hash))
    }
}

impl fmt::Display for Revision {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.generation, self.hash)
    }
}

/// Generation first, then hash.
impl Ord for Revision {
    fn cmp(&self, other: &Self) -> Ordering {
        self.generation
            .cmp(&other.generation)
            .then_with(|| self.hash.cmp(&other.hash))
    }
}

impl PartialOrd for Revision {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Serialize for Revision {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Revision {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}
