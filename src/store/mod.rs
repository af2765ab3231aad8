//! Document store collaborator
//!
//! The coordinator never talks to a server directly. It goes through the
//! [`DocumentStore`] trait, which has two implementations:
//!
//! - [`HttpStore`]: a remote database over HTTP
//! - [`MemoryStore`]: an in-process store with the same revision and
//!   conflict rules, used for deterministic single-writer runs
//!
//! Both handles are explicit: callers construct them, `open` them before
//! use and `close` them when done. Nothing is global.

mod errors;
mod http;
mod memory;
mod raw;

pub use errors::{StoreError, StoreResult};
pub use http::HttpStore;
pub use memory::MemoryStore;
pub use raw::{DatabaseInfo, RawResult};

use async_trait::async_trait;

use crate::document::{DocId, Document};

/// A database that accepts document batches.
#[async_trait]
pub trait DocumentStore: Send + Sync {
    /// Prepares the handle for use.
    async fn open(&self) -> StoreResult<()>;

    /// Releases the handle. Later calls fail with [`StoreError::Closed`].
    async fn close(&self) -> StoreResult<()>;

    /// Writes a batch in one round trip.
    ///
    /// Returns one record per input document, in input order. With
    /// `all_or_nothing`, revision checks are skipped and the store either
    /// applies every document or rejects the call as a whole.
    async fn bulk_write(
        &self,
        documents: &[Document],
        all_or_nothing: bool,
    ) -> StoreResult<Vec<RawResult>>;

    /// Reads the current revision of a document.
    ///
    /// With `include_conflicts`, losing leaf revisions are listed under
    /// `_conflicts` (absent when there are none). Deleted and missing
    /// documents read as `None`.
    async fn read_document(
        &self,
        id: &DocId,
        include_conflicts: bool,
    ) -> StoreResult<Option<Document>>;

    /// Database metadata.
    async fn info(&self) -> StoreResult<DatabaseInfo>;
}
