//! MemoryStore - in-process document store
//!
//! Revision model:
//! - Each document id owns a set of leaf revisions
//! - The current ("winning") leaf is the live leaf with the highest
//!   generation; ties go to the leaf written first
//! - Every other live leaf is a conflict, reported in write order
//!
//! In best-effort mode only the first document for an id in a batch is
//! considered; later ones conflict.
//!
//! Writes within a batch are applied in input order, under one lock, so a
//! batch is atomic with respect to other batches.
//!
//! Clones share state. Closing one handle closes all of them.

use std::collections::{BTreeMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::document::{DocId, Document, Revision, CONFLICTS_FIELD};

use super::errors::{StoreError, StoreResult};
use super::raw::{DatabaseInfo, RawResult};
use super::DocumentStore;

/// Hex characters kept from the revision digest
const REV_HASH_LEN: usize = 32;

#[derive(Debug, Clone)]
struct Leaf {
    rev: Revision,
    deleted: bool,
    content: Map<String, Value>,
    /// Store-wide update sequence at which this leaf was written
    seq: u64,
}

#[derive(Debug, Default)]
struct Entry {
    leaves: Vec<Leaf>,
}

impl Entry {
    /// Live beats deleted, then higher generation, then earlier write.
    fn winner(&self) -> Option<&Leaf> {
        self.leaves.iter().max_by(|a, b| {
            (!a.deleted, a.rev.generation())
                .cmp(&(!b.deleted, b.rev.generation()))
                .then_with(|| b.seq.cmp(&a.seq))
        })
    }

    fn leaf_index(&self, rev: &Revision) -> Option<usize> {
        self.leaves.iter().position(|l| &l.rev == rev)
    }

    /// Live leaves other than the winner, in write order.
    fn conflicts(&self) -> Vec<&Leaf> {
        let winner = match self.winner() {
            Some(w) => w.rev.clone(),
            None => return Vec::new(),
        };
        let mut losers: Vec<&Leaf> = self
            .leaves
            .iter()
            .filter(|l| !l.deleted && l.rev != winner)
            .collect();
        losers.sort_by_key(|l| l.seq);
        losers
    }
}

/// A write request after local checks.
struct Prepared {
    id: Option<String>,
    rev: Option<Revision>,
    deleted: bool,
    content: Map<String, Value>,
}

#[derive(Debug, Default)]
struct State {
    open: bool,
    update_seq: u64,
    docs: BTreeMap<String, Entry>,
}

impl State {
    fn ensure_open(&self) -> StoreResult<()> {
        if self.open {
            Ok(())
        } else {
            Err(StoreError::Closed)
        }
    }

    /// Adds a leaf, replacing `parent` when it is one of the current leaves.
    fn write_leaf(
        &mut self,
        id: &str,
        parent: Option<&Revision>,
        prepared: Prepared,
    ) -> RawResult {
        self.update_seq += 1;
        let seq = self.update_seq;

        let generation = parent.map_or(1, |p| p.generation() + 1);
        let rev = Revision::new(
            generation,
            revision_hash(parent, prepared.deleted, &prepared.content, seq),
        );

        let entry = self.docs.entry(id.to_string()).or_default();
        if let Some(idx) = parent.and_then(|p| entry.leaf_index(p)) {
            entry.leaves.remove(idx);
        }
        entry.leaves.push(Leaf {
            rev: rev.clone(),
            deleted: prepared.deleted,
            content: prepared.content,
            seq,
        });

        RawResult::ok(id, rev.to_string())
    }

    /// Best-effort write: the revision must name the winning leaf.
    ///
    /// A deletion may also name a losing live leaf, which removes that
    /// conflict.
    fn checked_write(&mut self, prepared: Prepared) -> RawResult {
        let id = prepared.id.clone().unwrap_or_else(new_doc_id);

        let parent = match self.docs.get(&id).and_then(Entry::winner) {
            None => match prepared.rev {
                None => None,
                Some(_) => return RawResult::conflict(id),
            },
            Some(winner) if winner.deleted => match &prepared.rev {
                None => Some(winner.rev.clone()),
                Some(rev) if self.docs[&id].leaf_index(rev).is_some() => Some(rev.clone()),
                Some(_) => return RawResult::conflict(id),
            },
            Some(winner) => {
                let entry = &self.docs[&id];
                match &prepared.rev {
                    Some(rev) if *rev == winner.rev => Some(rev.clone()),
                    // A losing branch may only be deleted
                    Some(rev)
                        if prepared.deleted
                            && entry
                                .leaf_index(rev)
                                .is_some_and(|idx| !entry.leaves[idx].deleted) =>
                    {
                        Some(rev.clone())
                    }
                    _ => return RawResult::conflict(id),
                }
            }
        };

        self.write_leaf(&id, parent.as_ref(), prepared)
    }

    /// All-or-nothing write: never rejected for revision reasons.
    ///
    /// A revision naming a current leaf extends it; anything else grows a
    /// new sibling branch.
    fn forced_write(&mut self, prepared: Prepared) -> RawResult {
        let id = prepared.id.clone().unwrap_or_else(new_doc_id);
        let parent = prepared.rev.clone();
        self.write_leaf(&id, parent.as_ref(), prepared)
    }

    fn read(&self, id: &str, include_conflicts: bool) -> Option<Document> {
        let entry = self.docs.get(id)?;
        let winner = entry.winner()?;
        if winner.deleted {
            return None;
        }

        let mut doc = Document::from_map(winner.content.clone());
        doc.set_id(id);
        doc.set_rev(&winner.rev);

        if include_conflicts {
            let conflicts: Vec<Value> = entry
                .conflicts()
                .into_iter()
                .map(|l| Value::String(l.rev.to_string()))
                .collect();
            if !conflicts.is_empty() {
                doc.insert(CONFLICTS_FIELD, Value::Array(conflicts));
            }
        }

        Some(doc)
    }
}

/// Deterministic in-memory document store.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    name: Arc<str>,
    max_document_bytes: Option<usize>,
    state: Arc<Mutex<State>>,
}

impl MemoryStore {
    /// Creates an empty, closed store.
    pub fn new(name: impl Into<String>) -> Self {
        let name: String = name.into();
        Self {
            name: Arc::from(name),
            max_document_bytes: None,
            state: Arc::new(Mutex::new(State::default())),
        }
    }

    /// Rejects documents whose serialized content exceeds `limit` bytes.
    pub fn with_max_document_bytes(mut self, limit: usize) -> Self {
        self.max_document_bytes = Some(limit);
        self
    }

    /// Database name.
    pub fn name(&self) -> &str {
        &self.name
    }

    fn state(&self) -> StoreResult<MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| StoreError::Transport("memory store lock poisoned".to_string()))
    }

    fn prepare(&self, doc: &Document) -> Result<Prepared, RawResult> {
        let raw_id = doc.id().map(str::to_string);
        let bad = |reason: String| RawResult::error(raw_id.clone(), "bad_request", reason);

        if let Err(e) = doc.validate() {
            return Err(bad(e.to_string()));
        }
        let id = doc.doc_id().map_err(|e| bad(e.to_string()))?;
        let rev = doc.revision().map_err(|e| bad(e.to_string()))?;
        let content = doc.content();

        if let Some(limit) = self.max_document_bytes {
            let size = serde_json::to_vec(&content).map(|b| b.len()).unwrap_or(0);
            if size > limit {
                return Err(RawResult::error(
                    raw_id,
                    "document_too_large",
                    format!("Document is {} bytes, limit is {}", size, limit),
                ));
            }
        }

        Ok(Prepared {
            id: id.map(DocId::into_string),
            rev,
            deleted: doc.is_deleted(),
            content,
        })
    }

    fn apply(&self, documents: &[Document], all_or_nothing: bool) -> StoreResult<Vec<RawResult>> {
        let mut state = self.state()?;
        state.ensure_open()?;

        if all_or_nothing {
            let mut prepared = Vec::with_capacity(documents.len());
            for (idx, doc) in documents.iter().enumerate() {
                match self.prepare(doc) {
                    Ok(p) => prepared.push(p),
                    Err(raw) => {
                        return Err(StoreError::Aborted(format!(
                            "document {} rejected: {}",
                            idx,
                            raw.reason.unwrap_or_default()
                        )))
                    }
                }
            }
            Ok(prepared.into_iter().map(|p| state.forced_write(p)).collect())
        } else {
            let mut seen = HashSet::new();
            Ok(documents
                .iter()
                .map(|doc| {
                    // Only the first occurrence of an id in the batch is tried
                    if let Some(id) = doc.id() {
                        if !seen.insert(id) {
                            return RawResult::conflict(id);
                        }
                    }
                    match self.prepare(doc) {
                        Ok(p) => state.checked_write(p),
                        Err(raw) => raw,
                    }
                })
                .collect())
        }
    }

    fn database_info(&self) -> StoreResult<DatabaseInfo> {
        let state = self.state()?;
        state.ensure_open()?;

        let mut doc_count = 0;
        let mut doc_del_count = 0;
        for (id, entry) in &state.docs {
            if DocId::parse(id).is_ok_and(|d| d.is_local()) {
                continue;
            }
            match entry.winner() {
                Some(w) if w.deleted => doc_del_count += 1,
                Some(_) => doc_count += 1,
                None => {}
            }
        }

        Ok(DatabaseInfo {
            db_name: self.name.to_string(),
            doc_count,
            doc_del_count,
            update_seq: Value::from(state.update_seq),
        })
    }
}

#[async_trait]
impl DocumentStore for MemoryStore {
    async fn open(&self) -> StoreResult<()> {
        self.state()?.open = true;
        Ok(())
    }

    async fn close(&self) -> StoreResult<()> {
        self.state()?.open = false;
        Ok(())
    }

    async fn bulk_write(
        &self,
        documents: &[Document],
        all_or_nothing: bool,
    ) -> StoreResult<Vec<RawResult>> {
        self.apply(documents, all_or_nothing)
    }

    async fn read_document(
        &self,
        id: &DocId,
        include_conflicts: bool,
    ) -> StoreResult<Option<Document>> {
        let state = self.state()?;
        state.ensure_open()?;
        Ok(state.read(id.as_str(), include_conflicts))
    }

    async fn info(&self) -> StoreResult<DatabaseInfo> {
        self.database_info()
    }
}

fn new_doc_id() -> String {
    Uuid::new_v4().simple().to_string()
}

fn revision_hash(
    parent: Option<&Revision>,
    deleted: bool,
    content: &Map<String, Value>,
    seq: u64,
) -> String {
    let mut hasher = Sha256::new();
    if let Some(p) = parent {
        hasher.update(p.to_string().as_bytes());
    }
    hasher.update([deleted as u8]);
    hasher.update(Value::Object(content.clone()).to_string().as_bytes());
    hasher.update(seq.to_be_bytes());
    let mut hex = format!("{:x}", hasher.finalize());
    hex.truncate(REV_HASH_LEN);
    hex
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: Value) -> Document {
        Document::from_value(value).unwrap()
    }

    async fn open_store() -> MemoryStore {
        let store = MemoryStore::new("memtest");
        store.open().await.unwrap();
        store
    }

    fn id(s: &str) -> DocId {
        DocId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let store = MemoryStore::new("closed");
        let err = store.bulk_write(&[Document::new()], false).await.unwrap_err();
        assert_eq!(err, StoreError::Closed);

        store.open().await.unwrap();
        store.close().await.unwrap();
        assert_eq!(store.info().await.unwrap_err(), StoreError::Closed);
    }

    #[tokio::test]
    async fn test_assigns_ids_and_revisions() {
        let store = open_store().await;
        let results = store
            .bulk_write(&[Document::new(), Document::new()], false)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        for r in &results {
            assert!(r.is_ok());
            assert_eq!(r.id.as_ref().unwrap().len(), 32);
            let rev: Revision = r.rev.as_ref().unwrap().parse().unwrap();
            assert_eq!(rev.generation(), 1);
            assert_eq!(rev.hash().len(), REV_HASH_LEN);
        }
        assert_ne!(results[0].id, results[1].id);
    }

    #[tokio::test]
    async fn test_update_requires_current_rev() {
        let store = open_store().await;
        let first = store
            .bulk_write(&[doc(json!({"_id": "a", "v": 1}))], false)
            .await
            .unwrap();
        let rev1 = first[0].rev.clone().unwrap();

        let no_rev = store
            .bulk_write(&[doc(json!({"_id": "a", "v": 2}))], false)
            .await
            .unwrap();
        assert_eq!(no_rev[0], RawResult::conflict("a"));

        let ok = store
            .bulk_write(&[doc(json!({"_id": "a", "_rev": rev1, "v": 2}))], false)
            .await
            .unwrap();
        assert!(ok[0].is_ok());
        assert!(ok[0].rev.as_ref().unwrap().starts_with("2-"));

        let stale = store
            .bulk_write(&[doc(json!({"_id": "a", "_rev": rev1, "v": 3}))], false)
            .await
            .unwrap();
        assert_eq!(stale[0], RawResult::conflict("a"));

        let current = store.read_document(&id("a"), true).await.unwrap().unwrap();
        assert_eq!(current.get("v"), Some(&json!(2)));
        assert!(!current.has_conflicts());
    }

    #[tokio::test]
    async fn test_rev_on_missing_document_conflicts() {
        let store = open_store().await;
        let results = store
            .bulk_write(&[doc(json!({"_id": "ghost", "_rev": "1-abc"}))], false)
            .await
            .unwrap();
        assert_eq!(results[0], RawResult::conflict("ghost"));
    }

    #[tokio::test]
    async fn test_forced_duplicates_create_conflicts_first_wins() {
        let store = open_store().await;
        let results = store
            .bulk_write(
                &[
                    doc(json!({"_id": "test", "type": "male"})),
                    doc(json!({"_id": "test", "type": "female"})),
                    doc(json!({"_id": "test", "type": "both"})),
                ],
                true,
            )
            .await
            .unwrap();
        assert!(results.iter().all(RawResult::is_ok));

        let current = store.read_document(&id("test"), true).await.unwrap().unwrap();
        assert_eq!(current.get("type"), Some(&json!("male")));
        assert_eq!(current.rev(), results[0].rev.as_deref());
        assert_eq!(
            current.conflicts(),
            vec![
                results[1].rev.as_deref().unwrap(),
                results[2].rev.as_deref().unwrap()
            ]
        );

        let plain = store.read_document(&id("test"), false).await.unwrap().unwrap();
        assert!(!plain.has_conflicts());
    }

    #[tokio::test]
    async fn test_identical_forced_duplicates_still_distinct() {
        let store = open_store().await;
        let results = store
            .bulk_write(
                &[doc(json!({"_id": "same"})), doc(json!({"_id": "same"}))],
                true,
            )
            .await
            .unwrap();
        assert_ne!(results[0].rev, results[1].rev);

        let current = store.read_document(&id("same"), true).await.unwrap().unwrap();
        assert_eq!(current.conflicts().len(), 1);
    }

    #[tokio::test]
    async fn test_deleting_loser_resolves_conflict() {
        let store = open_store().await;
        let results = store
            .bulk_write(&[doc(json!({"_id": "c", "n": 1})), doc(json!({"_id": "c", "n": 2}))], true)
            .await
            .unwrap();
        let loser = results[1].rev.clone().unwrap();

        let deleted = store
            .bulk_write(&[doc(json!({"_id": "c", "_rev": loser, "_deleted": true}))], false)
            .await
            .unwrap();
        assert!(deleted[0].is_ok());

        let current = store.read_document(&id("c"), true).await.unwrap().unwrap();
        assert!(!current.has_conflicts());
        assert_eq!(current.get("n"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_update_on_losing_branch_conflicts() {
        let store = open_store().await;
        let results = store
            .bulk_write(&[doc(json!({"_id": "t", "n": 1})), doc(json!({"_id": "t", "n": 2}))], true)
            .await
            .unwrap();
        let loser = results[1].rev.clone().unwrap();

        let update = store
            .bulk_write(&[doc(json!({"_id": "t", "_rev": loser, "n": 9}))], false)
            .await
            .unwrap();
        assert_eq!(update[0], RawResult::conflict("t"));

        let current = store.read_document(&id("t"), true).await.unwrap().unwrap();
        assert_eq!(current.rev(), results[0].rev.as_deref());
        assert_eq!(current.get("n"), Some(&json!(1)));
        assert_eq!(current.conflicts(), vec![loser.as_str()]);
    }

    #[tokio::test]
    async fn test_repeated_id_after_rejected_first_conflicts() {
        let store = open_store().await;
        let first = store
            .bulk_write(&[doc(json!({"_id": "x", "v": 1}))], false)
            .await
            .unwrap();
        let rev = first[0].rev.clone().unwrap();

        let results = store
            .bulk_write(
                &[
                    doc(json!({"_id": "x", "v": 2})),
                    doc(json!({"_id": "x", "_rev": rev, "v": 3})),
                ],
                false,
            )
            .await
            .unwrap();
        assert_eq!(results, vec![RawResult::conflict("x"), RawResult::conflict("x")]);

        let current = store.read_document(&id("x"), false).await.unwrap().unwrap();
        assert_eq!(current.get("v"), Some(&json!(1)));
    }

    #[tokio::test]
    async fn test_delete_and_recreate() {
        let store = open_store().await;
        let created = store.bulk_write(&[doc(json!({"_id": "d"}))], false).await.unwrap();
        let rev = created[0].rev.clone().unwrap();

        store
            .bulk_write(&[doc(json!({"_id": "d", "_rev": rev, "_deleted": true}))], false)
            .await
            .unwrap();
        assert!(store.read_document(&id("d"), false).await.unwrap().is_none());

        let info = store.info().await.unwrap();
        assert_eq!(info.doc_count, 0);
        assert_eq!(info.doc_del_count, 1);

        let revived = store
            .bulk_write(&[doc(json!({"_id": "d", "back": true}))], false)
            .await
            .unwrap();
        assert!(revived[0].rev.as_ref().unwrap().starts_with("3-"));
        assert_eq!(store.info().await.unwrap().doc_count, 1);
    }

    #[tokio::test]
    async fn test_size_limit_per_document_in_best_effort() {
        let store = MemoryStore::new("limited").with_max_document_bytes(16);
        store.open().await.unwrap();

        let results = store
            .bulk_write(
                &[
                    doc(json!({"_id": "small"})),
                    doc(json!({"_id": "big", "payload": "x".repeat(64)})),
                ],
                false,
            )
            .await
            .unwrap();
        assert!(results[0].is_ok());
        assert_eq!(results[1].error.as_deref(), Some("document_too_large"));
        assert_eq!(results[1].id.as_deref(), Some("big"));
    }

    #[tokio::test]
    async fn test_size_limit_aborts_all_or_nothing() {
        let store = MemoryStore::new("limited").with_max_document_bytes(16);
        store.open().await.unwrap();

        let err = store
            .bulk_write(
                &[
                    doc(json!({"_id": "small"})),
                    doc(json!({"_id": "big", "payload": "x".repeat(64)})),
                ],
                true,
            )
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::Aborted(_)));

        // Nothing applied
        assert_eq!(store.info().await.unwrap().doc_count, 0);
        assert!(store.read_document(&id("small"), false).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_local_documents_not_counted() {
        let store = open_store().await;
        store
            .bulk_write(&[doc(json!({"_id": "_local/cp"})), doc(json!({"_id": "x"}))], false)
            .await
            .unwrap();
        let info = store.info().await.unwrap();
        assert_eq!(info.doc_count, 1);
        assert_eq!(info.db_name, "memtest");
        assert_eq!(info.update_seq, json!(2));
    }

    #[tokio::test]
    async fn test_clones_share_state() {
        let store = open_store().await;
        let other = store.clone();
        store.bulk_write(&[doc(json!({"_id": "shared"}))], false).await.unwrap();
        assert!(other.read_document(&id("shared"), false).await.unwrap().is_some());
    }
}
