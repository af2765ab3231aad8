//! Bulk Write Coordinator
//!
//! Flow of one `submit`:
//! 1. Validate the batch locally (non-empty, every document well-formed)
//! 2. One `bulk_write` round trip, bounded by the request timeout
//! 3. Reconcile raw results with the input, position by position
//! 4. Map each raw result to a [`WriteOutcome`]
//!
//! Failure policy:
//! - Validation errors abort the call before any I/O
//! - A timeout yields `Error{reason: "timeout"}` for every document
//! - Other store failures are per-document in best-effort mode and
//!   call-level in all-or-nothing mode
//!
//! The coordinator keeps no state between calls besides counters. Which of
//! several same-`_id` documents wins is decided by the store; the
//! in-memory store lets the earliest one in input order win.

use std::sync::Arc;
use std::time::Duration;

use crate::config::ClientConfig;
use crate::document::{DocId, Document, Revision};
use crate::observability::{log_event_with_fields, Event, MetricsRegistry};
use crate::store::{DocumentStore, RawResult, StoreError, StoreResult};

use super::errors::{BulkError, BulkResult};
use super::outcome::{WriteMode, WriteOutcome};

/// Error tag stores use for revision conflicts
const CONFLICT_ERROR: &str = "conflict";

/// Coordinator settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoordinatorOptions {
    /// Upper bound on one store round trip. `None` waits indefinitely.
    pub request_timeout: Option<Duration>,
}

impl Default for CoordinatorOptions {
    fn default() -> Self {
        Self {
            request_timeout: Some(Duration::from_secs(30)),
        }
    }
}

impl CoordinatorOptions {
    /// Options taken from a client config.
    pub fn from_config(config: &ClientConfig) -> Self {
        Self {
            request_timeout: Some(config.request_timeout()),
        }
    }
}

/// Writes document batches through an explicit store handle.
pub struct BulkWriteCoordinator<S: DocumentStore> {
    store: S,
    options: CoordinatorOptions,
    metrics: Arc<MetricsRegistry>,
}

impl<S: DocumentStore> BulkWriteCoordinator<S> {
    /// Opens `store` and wraps it.
    pub async fn open(store: S, options: CoordinatorOptions) -> BulkResult<Self> {
        store.open().await?;
        log_event_with_fields(Event::StoreOpen, &[]);

        Ok(Self {
            store,
            options,
            metrics: Arc::new(MetricsRegistry::new()),
        })
    }

    /// Records counters into a shared registry instead of a private one.
    pub fn with_metrics(mut self, metrics: Arc<MetricsRegistry>) -> Self {
        self.metrics = metrics;
        self
    }

    /// Closes the store and hands it back.
    pub async fn close(self) -> BulkResult<S> {
        self.store.close().await?;
        log_event_with_fields(Event::StoreClose, &[]);
        Ok(self.store)
    }

    /// The store handle.
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Counters for this coordinator.
    pub fn metrics(&self) -> &Arc<MetricsRegistry> {
        &self.metrics
    }

    /// Current options.
    pub fn options(&self) -> &CoordinatorOptions {
        &self.options
    }

    /// Writes `batch` and reports one outcome per document, in input order.
    pub async fn submit(
        &self,
        batch: &[Document],
        mode: impl Into<WriteMode>,
    ) -> BulkResult<Vec<WriteOutcome>> {
        let mode = mode.into();

        let expected = match validate_batch(batch) {
            Ok(ids) => ids,
            Err(e) => {
                self.metrics.increment_batches_rejected();
                log_event_with_fields(Event::BatchRejected, &[("reason", e.to_string().as_str())]);
                return Err(e);
            }
        };

        let size = batch.len().to_string();
        log_event_with_fields(
            Event::BatchSubmit,
            &[("documents", size.as_str()), ("mode", mode.as_str())],
        );
        self.metrics.increment_batches_submitted();

        let response = self
            .round_trip(batch, mode)
            .await
            .and_then(|raw| reconcile(&expected, raw));

        let outcomes = match response {
            Ok(outcomes) => outcomes,
            Err(StoreError::Timeout) => {
                self.metrics.increment_batch_timeouts();
                log_event_with_fields(Event::BatchTimeout, &[("documents", size.as_str())]);
                expected.into_iter().map(WriteOutcome::timeout).collect()
            }
            Err(e) => {
                let reason = e.reason();
                log_event_with_fields(
                    Event::BatchStoreError,
                    &[("mode", mode.as_str()), ("reason", reason.as_str())],
                );
                if mode.is_all_or_nothing() {
                    self.metrics.increment_batches_failed();
                    return Err(BulkError::Store(e));
                }
                expected
                    .into_iter()
                    .map(|id| WriteOutcome::Error {
                        id,
                        reason: reason.clone(),
                    })
                    .collect()
            }
        };

        self.record(&outcomes);
        Ok(outcomes)
    }

    async fn round_trip(&self, batch: &[Document], mode: WriteMode) -> StoreResult<Vec<RawResult>> {
        let call = self.store.bulk_write(batch, mode.is_all_or_nothing());
        match self.options.request_timeout {
            Some(limit) => tokio::time::timeout(limit, call)
                .await
                .unwrap_or(Err(StoreError::Timeout)),
            None => call.await,
        }
    }

    fn record(&self, outcomes: &[WriteOutcome]) {
        let mut accepted = 0u64;
        let mut conflicted = 0u64;
        let mut errored = 0u64;

        for outcome in outcomes {
            match outcome {
                WriteOutcome::Accepted { .. } => accepted += 1,
                WriteOutcome::Conflict { id } => {
                    conflicted += 1;
                    log_event_with_fields(
                        Event::DocumentNotAccepted,
                        &[("id", id.as_str()), ("reason", CONFLICT_ERROR)],
                    );
                }
                WriteOutcome::Error { id, reason } => {
                    errored += 1;
                    log_event_with_fields(
                        Event::DocumentNotAccepted,
                        &[("id", id.as_deref().unwrap_or("")), ("reason", reason.as_str())],
                    );
                }
            }
        }

        self.metrics.add_documents(accepted, conflicted, errored);
        log_event_with_fields(
            Event::BatchComplete,
            &[
                ("accepted", accepted.to_string().as_str()),
                ("conflicts", conflicted.to_string().as_str()),
                ("errors", errored.to_string().as_str()),
            ],
        );
    }
}

/// Checks every document, returning each caller-supplied `_id`.
fn validate_batch(batch: &[Document]) -> BulkResult<Vec<Option<String>>> {
    if batch.is_empty() {
        return Err(BulkError::EmptyBatch);
    }

    batch
        .iter()
        .enumerate()
        .map(|(index, doc)| {
            doc.validate()
                .and_then(|_| doc.doc_id())
                .map(|id| id.map(DocId::into_string))
                .map_err(|source| BulkError::InvalidDocument { index, source })
        })
        .collect()
}

/// Pairs raw results with the input and maps them to outcomes.
fn reconcile(expected: &[Option<String>], raw: Vec<RawResult>) -> StoreResult<Vec<WriteOutcome>> {
    if raw.len() != expected.len() {
        return Err(StoreError::Protocol(format!(
            "expected {} results, got {}",
            expected.len(),
            raw.len()
        )));
    }

    expected
        .iter()
        .zip(raw)
        .enumerate()
        .map(|(index, (sent, result))| {
            if let (Some(sent), Some(got)) = (sent, &result.id) {
                if sent != got {
                    return Err(StoreError::Protocol(format!(
                        "result {} is for '{}', expected '{}'",
                        index, got, sent
                    )));
                }
            }
            to_outcome(index, sent.clone(), result)
        })
        .collect()
}

fn to_outcome(index: usize, sent: Option<String>, raw: RawResult) -> StoreResult<WriteOutcome> {
    let id = raw.id.or(sent);

    match raw.error {
        None if raw.ok != Some(false) => {
            let id = id.ok_or_else(|| {
                StoreError::Protocol(format!("result {} accepted without an id", index))
            })?;
            let rev: Revision = raw
                .rev
                .as_deref()
                .ok_or_else(|| {
                    StoreError::Protocol(format!("result {} accepted without a rev", index))
                })?
                .parse()
                .map_err(|e| StoreError::Protocol(format!("result {}: {}", index, e)))?;
            Ok(WriteOutcome::Accepted { id, rev })
        }
        Some(error) if error == CONFLICT_ERROR => match id {
            Some(id) => Ok(WriteOutcome::Conflict { id }),
            None => Ok(WriteOutcome::Error {
                id: None,
                reason: CONFLICT_ERROR.to_string(),
            }),
        },
        error => {
            let error = error.unwrap_or_else(|| "unknown_error".to_string());
            let reason = match raw.reason {
                Some(reason) if !reason.is_empty() => format!("{}: {}", error, reason),
                _ => error,
            };
            Ok(WriteOutcome::Error { id, reason })
        }
    }
}
