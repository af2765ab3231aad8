//! Bulk writes
//!
//! Two conflict policies:
//!
//! - **Best-effort**: each document is checked on its own. A missing or
//!   stale `_rev` on an existing id is a conflict; within one batch the
//!   first document for an id is written and later ones conflict.
//! - **All-or-nothing**: every document becomes a new revision. Documents
//!   sharing an id become sibling revisions, and all but one are reported
//!   as `_conflicts` on read.
//!
//! Outcomes are reported per document, in input order. Only local
//! validation, and store failures in all-or-nothing mode, fail the call.

mod coordinator;
mod errors;
mod outcome;

pub use coordinator::{BulkWriteCoordinator, CoordinatorOptions};
pub use errors::{BulkError, BulkResult};
pub use outcome::{WriteMode, WriteOutcome};
