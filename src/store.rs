//! Shared in-memory scan session collection
//!
//! The store is mutated by the session manager (poll merges) and the history
//! engine (loads and deletes). Deleted IDs are tombstoned so late poll
//! responses for them are discarded instead of resurrecting the session.

use std::collections::HashSet;
use std::sync::Arc;

use log::debug;
use tokio::sync::RwLock;

use crate::client::models::ScanSession;

#[derive(Debug, Default)]
struct StoreInner {
    /// Sessions in insertion order
    sessions: Vec<ScanSession>,
    /// IDs removed by an acknowledged delete
    tombstones: HashSet<String>,
}

impl StoreInner {
    fn position(&self, id: &str) -> Option<usize> {
        self.sessions.iter().position(|s| s.id == id)
    }
}

/// Counts from merging a remote listing into the store
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MergeSummary {
    pub added: usize,
    pub updated: usize,
    pub dropped: usize,
}

/// Cloneable handle to the session collection
#[derive(Debug, Clone, Default)]
pub struct SessionStore {
    inner: Arc<RwLock<StoreInner>>,
}

impl SessionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new session. Returns false if the ID exists or was deleted.
    pub async fn insert(&self, session: ScanSession) -> bool {
        let mut inner = self.inner.write().await;
        if inner.tombstones.contains(&session.id) || inner.position(&session.id).is_some() {
            return false;
        }
        inner.sessions.push(session);
        true
    }

    pub async fn get(&self, id: &str) -> Option<ScanSession> {
        let inner = self.inner.read().await;
        inner.position(id).map(|i| inner.sessions[i].clone())
    }

    pub async fn contains(&self, id: &str) -> bool {
        self.inner.read().await.position(id).is_some()
    }

    /// True once a delete for `id` has been acknowledged.
    pub async fn is_deleted(&self, id: &str) -> bool {
        self.inner.read().await.tombstones.contains(id)
    }

    pub async fn len(&self) -> usize {
        self.inner.read().await.sessions.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }

    /// Clone of every session, in insertion order.
    pub async fn snapshot(&self) -> Vec<ScanSession> {
        self.inner.read().await.sessions.clone()
    }

    /// Mutate one session in place.
    ///
    /// Returns `None` without calling `f` when the session is missing or
    /// tombstoned.
    pub async fn update<R>(&self, id: &str, f: impl FnOnce(&mut ScanSession) -> R) -> Option<R> {
        let mut inner = self.inner.write().await;
        if inner.tombstones.contains(id) {
            return None;
        }
        let index = inner.position(id)?;
        Some(f(&mut inner.sessions[index]))
    }

    /// Remove a session after the engine acknowledged its deletion.
    pub async fn remove(&self, id: &str) -> Option<ScanSession> {
        let mut inner = self.inner.write().await;
        inner.tombstones.insert(id.to_string());
        let index = inner.position(id)?;
        debug!("Removed scan {} from store", id);
        Some(inner.sessions.remove(index))
    }

    /// Replace the collection with a full remote listing.
    ///
    /// Local sessions at an equal or more advanced status are kept, local
    /// terminal sessions missing remotely are dropped, and live local
    /// sessions missing remotely are kept (the engine may not have
    /// persisted them yet). Tombstoned IDs are skipped.
    pub async fn merge_loaded(&self, remote: Vec<ScanSession>) -> MergeSummary {
        let mut inner = self.inner.write().await;
        let mut summary = MergeSummary::default();

        let remote_ids: HashSet<String> = remote.iter().map(|s| s.id.clone()).collect();
        let before = inner.sessions.len();
        inner
            .sessions
            .retain(|s| !s.is_terminal() || remote_ids.contains(&s.id));
        summary.dropped = before - inner.sessions.len();

        for incoming in remote {
            match upsert(&mut inner, incoming) {
                Upsert::Added => summary.added += 1,
                Upsert::Updated => summary.updated += 1,
                Upsert::Unchanged | Upsert::Skipped => {}
            }
        }

        debug!(
            "Merged remote listing: {} added, {} updated, {} dropped",
            summary.added, summary.updated, summary.dropped
        );
        summary
    }

    /// Merge a partial remote listing (for example search results).
    ///
    /// Nothing is dropped. Returns the stored version of each input session
    /// that is not tombstoned, in input order.
    pub async fn upsert_all(&self, remote: Vec<ScanSession>) -> Vec<ScanSession> {
        let mut inner = self.inner.write().await;
        let ids: Vec<String> = remote.iter().map(|s| s.id.clone()).collect();

        for incoming in remote {
            upsert(&mut inner, incoming);
        }

        ids.iter()
            .filter_map(|id| inner.position(id).map(|i| inner.sessions[i].clone()))
            .collect()
    }
}

enum Upsert {
    Added,
    Updated,
    Unchanged,
    Skipped,
}

fn upsert(inner: &mut StoreInner, incoming: ScanSession) -> Upsert {
    if inner.tombstones.contains(&incoming.id) {
        return Upsert::Skipped;
    }
    let incoming = incoming.normalize();

    match inner.position(&incoming.id) {
        None => {
            inner.sessions.push(incoming);
            Upsert::Added
        }
        Some(index) => {
            let local = &mut inner.sessions[index];
            if !local.status.can_advance_to(incoming.status) {
                return Upsert::Unchanged;
            }
            // Logs never shrink: start from the local log and append.
            let mut merged = incoming;
            let remote_logs = std::mem::replace(&mut merged.logs, std::mem::take(&mut local.logs));
            merged.append_logs(&remote_logs);
            if merged.options.is_none() {
                merged.options = local.options.take();
            }
            *local = merged;
            Upsert::Updated
        }
    }
}
