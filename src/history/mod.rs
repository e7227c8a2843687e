//! Scan history: loading, querying, selection and bulk actions
//!
//! Queries are pure projections over a snapshot of the [`SessionStore`];
//! only `load`, `search_remote` and `delete` change the collection.

mod query;
mod selection;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::{DateTime, Local, TimeZone};
use log::{debug, info};
use tokio::sync::Mutex;

use crate::client::models::{
    AiReport, ExportFormat, ExportOptions, ReportDetail, ScanSession, ScanStatus,
};
use crate::client::parallel::{BatchOutcome, DEFAULT_BATCH_CONCURRENCY, run_batch};
use crate::client::WatchdogApi;
use crate::error::{ApiError, BatchFailure, Result, ValidationError};
use crate::store::{MergeSummary, SessionStore};

pub use query::{DateFilter, HistoryFilter, SortBy, StatusFilter, project};
pub use selection::Selection;

/// Loads, filters and bulk-manages stored scans
pub struct HistoryEngine<C> {
    client: Arc<C>,
    store: SessionStore,
    selection: Mutex<Selection>,
    delete_concurrency: usize,
}

impl<C: WatchdogApi + 'static> HistoryEngine<C> {
    pub fn new(client: Arc<C>, store: SessionStore) -> Self {
        Self {
            client,
            store,
            selection: Mutex::new(Selection::new()),
            delete_concurrency: DEFAULT_BATCH_CONCURRENCY,
        }
    }

    /// Limit concurrent delete calls (minimum 1).
    pub fn delete_concurrency(mut self, max_concurrent: usize) -> Self {
        self.delete_concurrency = max_concurrent.max(1);
        self
    }

    pub fn store(&self) -> &SessionStore {
        &self.store
    }

    /// Load every stored scan from the engine and merge it into the collection.
    pub async fn load(&self) -> Result<MergeSummary> {
        let remote = self.client.get_all_scans().await?;
        debug!("Engine returned {} stored scan(s)", remote.len());

        let summary = self.store.merge_loaded(remote).await;

        let known: HashSet<String> = self
            .store
            .snapshot()
            .await
            .into_iter()
            .map(|s| s.id)
            .collect();
        self.selection
            .lock()
            .await
            .retain(|id| known.contains(id));

        Ok(summary)
    }

    /// Project the current collection using the local clock and time zone.
    pub async fn query(&self, filter: &HistoryFilter) -> Vec<ScanSession> {
        self.query_at(filter, &Local::now()).await
    }

    /// Project the current collection at a fixed instant.
    pub async fn query_at<Tz: TimeZone>(
        &self,
        filter: &HistoryFilter,
        now: &DateTime<Tz>,
    ) -> Vec<ScanSession> {
        let sessions = self.store.snapshot().await;
        project(&sessions, filter, now)
            .into_iter()
            .cloned()
            .collect()
    }

    /// Server-side search; matching sessions are merged into the collection.
    pub async fn search_remote(&self, query: &str) -> Result<Vec<ScanSession>> {
        let found = self.client.search_scans(query).await?;
        debug!("Search for {:?} returned {} scan(s)", query, found.len());
        Ok(self.store.upsert_all(found).await)
    }

    // ========================================================================
    // Selection
    // ========================================================================

    /// Flip selection of one known session. Returns true if now selected.
    #[allow(dead_code)]
    pub async fn toggle(&self, id: &str) -> Result<bool> {
        if !self.store.contains(id).await {
            return Err(ValidationError::UnknownSession(id.to_string()).into());
        }
        Ok(self.selection.lock().await.toggle(id))
    }

    #[allow(dead_code)]
    pub async fn clear_selection(&self) {
        self.selection.lock().await.clear();
    }

    /// Select exactly the sessions matching `filter`. Returns the count.
    pub async fn select_all(&self, filter: &HistoryFilter) -> usize {
        self.select_all_at(filter, &Local::now()).await
    }

    pub async fn select_all_at<Tz: TimeZone>(
        &self,
        filter: &HistoryFilter,
        now: &DateTime<Tz>,
    ) -> usize {
        let sessions = self.store.snapshot().await;
        let view = project(&sessions, filter, now);
        let mut selection = self.selection.lock().await;
        selection.select_all(&view);
        selection.len()
    }

    /// Clear when every matching session is selected, else select them all.
    #[allow(dead_code)]
    pub async fn toggle_all_at<Tz: TimeZone>(
        &self,
        filter: &HistoryFilter,
        now: &DateTime<Tz>,
    ) -> usize {
        let sessions = self.store.snapshot().await;
        let view = project(&sessions, filter, now);
        let mut selection = self.selection.lock().await;
        selection.toggle_all(&view);
        selection.len()
    }

    /// Currently selected IDs, sorted.
    pub async fn selected(&self) -> Vec<String> {
        self.selection.lock().await.ids()
    }

    // ========================================================================
    // Bulk delete
    // ========================================================================

    /// Delete each ID through the engine, at most `delete_concurrency` at once.
    ///
    /// Only IDs the engine acknowledged leave the collection and the
    /// selection. IDs unknown locally fail without an engine call.
    pub async fn delete(&self, ids: &[String]) -> BatchOutcome {
        let mut seen = HashSet::new();
        let mut known = Vec::new();
        let mut unknown = Vec::new();
        for id in ids {
            if !seen.insert(id.as_str()) {
                continue;
            }
            if self.store.contains(id).await {
                known.push(id.clone());
            } else {
                unknown.push(BatchFailure {
                    id: id.clone(),
                    reason: ValidationError::UnknownSession(id.clone()).to_string(),
                });
            }
        }

        info!(
            "Deleting {} scan(s) ({} unknown)",
            known.len(),
            unknown.len()
        );

        let client = Arc::clone(&self.client);
        let store = self.store.clone();
        let mut outcome = run_batch(
            known,
            move |id| {
                let client = Arc::clone(&client);
                let store = store.clone();
                async move {
                    client.delete_scan(&id).await?;
                    store.remove(&id).await;
                    Ok(())
                }
            },
            self.delete_concurrency,
        )
        .await;

        self.selection.lock().await.remove(&outcome.succeeded);

        // Report failures in the caller's order.
        outcome.failed.extend(unknown);
        let order = |id: &str| ids.iter().position(|i| i == id).unwrap_or(usize::MAX);
        outcome.failed.sort_by_key(|f| order(&f.id));

        outcome
    }

    /// Delete every selected session.
    pub async fn delete_selected(&self) -> BatchOutcome {
        let ids = self.selected().await;
        self.delete(&ids).await
    }

    // ========================================================================
    // Reports
    // ========================================================================

    /// Export a report for a completed scan and return the written file name.
    pub async fn export(
        &self,
        id: &str,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<String> {
        self.require_completed(id, "export").await?;

        let filename = self.client.export_report(id, format, options).await?;
        if filename.is_empty() {
            return Err(ApiError::NotFound(format!("No result to export for scan {}", id)).into());
        }

        info!("Exported scan {} to {}", id, filename);
        Ok(filename)
    }

    /// Generate an AI analysis of a completed scan.
    pub async fn ai_report(&self, id: &str, detail: ReportDetail) -> Result<AiReport> {
        self.require_completed(id, "AI report").await?;
        self.client.generate_ai_report(id, detail).await
    }

    /// Reject sessions known locally that are not completed.
    ///
    /// Sessions missing locally are left for the engine to resolve.
    async fn require_completed(&self, id: &str, action: &'static str) -> Result<()> {
        match self.store.get(id).await {
            Some(session) if session.status != ScanStatus::Completed => {
                Err(ValidationError::InvalidState {
                    id: id.to_string(),
                    status: session.status.to_string(),
                    action,
                }
                .into())
            }
            _ => Ok(()),
        }
    }
}
