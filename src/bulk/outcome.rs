//! Write modes and per-document outcomes

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::document::Revision;

/// Conflict policy for one batch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WriteMode {
    /// Each document is checked against the current revision on its own.
    #[default]
    BestEffort,
    /// Every document is written; duplicates become conflicting siblings.
    AllOrNothing,
}

impl WriteMode {
    /// True for [`WriteMode::AllOrNothing`].
    pub fn is_all_or_nothing(self) -> bool {
        self == WriteMode::AllOrNothing
    }

    /// Returns the string representation
    pub fn as_str(self) -> &'static str {
        match self {
            WriteMode::BestEffort => "best_effort",
            WriteMode::AllOrNothing => "all_or_nothing",
        }
    }
}

impl From<bool> for WriteMode {
    fn from(all_or_nothing: bool) -> Self {
        if all_or_nothing {
            WriteMode::AllOrNothing
        } else {
            WriteMode::BestEffort
        }
    }
}

impl fmt::Display for WriteMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result for one document of a batch.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum WriteOutcome {
    /// Stored under `id` as revision `rev`.
    Accepted { id: String, rev: Revision },
    /// Rejected: `id` already has a different current revision.
    Conflict { id: String },
    /// Not stored. `id` is absent when the store never assigned one.
    Error { id: Option<String>, reason: String },
}

impl WriteOutcome {
    /// Timeout outcome for a document.
    pub fn timeout(id: Option<String>) -> Self {
        WriteOutcome::Error {
            id,
            reason: "timeout".to_string(),
        }
    }

    /// Document id, when known.
    pub fn id(&self) -> Option<&str> {
        match self {
            WriteOutcome::Accepted { id, .. } | WriteOutcome::Conflict { id } => Some(id.as_str()),
            WriteOutcome::Error { id, .. } => id.as_deref(),
        }
    }

    /// New revision of an accepted document.
    pub fn rev(&self) -> Option<&Revision> {
        match self {
            WriteOutcome::Accepted { rev, .. } => Some(rev),
            _ => None,
        }
    }

    pub fn is_accepted(&self) -> bool {
        matches!(self, WriteOutcome::Accepted { .. })
    }

    pub fn is_conflict(&self) -> bool {
        matches!(self, WriteOutcome::Conflict { .. })
    }

    pub fn is_error(&self) -> bool {
        matches!(self, WriteOutcome::Error { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_mode_from_bool() {
        assert_eq!(WriteMode::from(true), WriteMode::AllOrNothing);
        assert_eq!(WriteMode::from(false), WriteMode::BestEffort);
        assert_eq!(WriteMode::default(), WriteMode::BestEffort);
        assert!(WriteMode::AllOrNothing.is_all_or_nothing());
    }

    #[test]
    fn test_outcome_accessors() {
        let accepted = WriteOutcome::Accepted {
            id: "a".into(),
            rev: Revision::new(1, "abc"),
        };
        assert!(accepted.is_accepted());
        assert_eq!(accepted.id(), Some("a"));
        assert_eq!(accepted.rev().unwrap().generation(), 1);

        let conflict = WriteOutcome::Conflict { id: "b".into() };
        assert!(conflict.is_conflict());
        assert!(conflict.rev().is_none());

        let timeout = WriteOutcome::timeout(None);
        assert!(timeout.is_error());
        assert_eq!(timeout.id(), None);
    }

    #[test]
    fn test_outcome_json_shape() {
        let accepted = WriteOutcome::Accepted {
            id: "a".into(),
            rev: Revision::new(2, "ff"),
        };
        assert_eq!(
            serde_json::to_value(&accepted).unwrap(),
            json!({"outcome": "accepted", "id": "a", "rev": "2-ff"})
        );

        let error = WriteOutcome::Error {
            id: Some("c".into()),
            reason: "timeout".into(),
        };
        assert_eq!(
            serde_json::to_value(&error).unwrap(),
            json!({"outcome": "error", "id": "c", "reason": "timeout"})
        );
    }
}
