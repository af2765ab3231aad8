//! couchbatch - bulk document writes for CouchDB-style databases
//!
//! A batch of documents goes to a store in one request, under one of two
//! conflict policies, and comes back as one outcome per document.
//!
//! ```ignore
//! use couchbatch::bulk::{BulkWriteCoordinator, CoordinatorOptions, WriteMode};
//! use couchbatch::document::Document;
//! use couchbatch::store::MemoryStore;
//!
//! let store = MemoryStore::new("mydb");
//! let coordinator = BulkWriteCoordinator::open(store, CoordinatorOptions::default()).await?;
//! let outcomes = coordinator
//!     .submit(&[Document::with_id("a"), Document::with_id("b")], WriteMode::BestEffort)
//!     .await?;
//! coordinator.close().await?;
//! ```

pub mod bulk;
pub mod cli;
pub mod config;
pub mod document;
pub mod observability;
pub mod store;
