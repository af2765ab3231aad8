//! Document model
//!
//! Documents are open JSON objects. The store owns the `_`-prefixed
//! namespace:
//!
//! - `_id`: identifier, assigned by the store when absent
//! - `_rev`: revision token, assigned by the store on every write
//! - `_deleted`: tombstone marker
//! - `_attachments`: passed through untouched
//! - `_conflicts` and friends: reported on read, never written

mod document;
mod errors;
mod id;
mod revision;

pub use document::{
    Document, ATTACHMENTS_FIELD, CONFLICTS_FIELD, DELETED_FIELD, ID_FIELD, REV_FIELD,
};
pub use errors::{DocumentError, DocumentResult};
pub use id::DocId;
pub use revision::Revision;
