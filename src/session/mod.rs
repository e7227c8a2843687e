//! Scan session lifecycle
//!
//! The [`SessionManager`] starts scans, merges status polls into the shared
//! [`SessionStore`], cancels scans on request, and owns one cancellable poll
//! schedule per watched session.
//!
//! Lifecycle: `pending → running → {completed, failed, cancelled}`, with
//! pending allowed to jump straight to a terminal status. A session becomes
//! `completed` locally only once its result is attached.

mod target;
mod watch;

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;

use chrono::Utc;
use log::{debug, info, warn};
use tokio::sync::{Mutex, watch as channel};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::client::WatchdogApi;
use crate::client::models::{ScanOptions, ScanResult, ScanSession, ScanStatus, ScanStatusReport};
use crate::error::{ApiError, Result, ValidationError};
use crate::store::SessionStore;

pub use target::normalize_target;
pub use watch::WatchHandle;

/// Default interval between status polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(2);

/// Outcome of a single poll
#[derive(Debug, Clone)]
pub enum PollOutcome {
    /// Status merged; the session is still live
    Updated(ScanSession),
    /// The session is terminal (possibly already before this poll)
    Terminal(ScanSession),
    /// Another poll for this session was already in flight
    Skipped,
    /// The session was deleted; the response was discarded
    Deleted,
}

impl PollOutcome {
    /// The session snapshot, when the poll produced one.
    #[allow(dead_code)]
    pub fn session(&self) -> Option<&ScanSession> {
        match self {
            PollOutcome::Updated(s) | PollOutcome::Terminal(s) => Some(s),
            PollOutcome::Skipped | PollOutcome::Deleted => None,
        }
    }

    /// True if polling this session should stop.
    pub fn is_final(&self) -> bool {
        matches!(self, PollOutcome::Terminal(_) | PollOutcome::Deleted)
    }
}

struct WatchEntry {
    generation: u64,
    token: CancellationToken,
    sender: channel::Sender<ScanSession>,
}

struct Shared<C> {
    client: Arc<C>,
    store: SessionStore,
    poll_interval: Duration,
    /// IDs with a status request outstanding
    in_flight: StdMutex<HashSet<String>>,
    watchers: Mutex<HashMap<String, WatchEntry>>,
    next_generation: StdMutex<u64>,
}

/// Releases the in-flight slot for a session when dropped.
struct InFlightGuard<'a> {
    set: &'a StdMutex<HashSet<String>>,
    id: String,
}

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        let mut set = self.set.lock().unwrap_or_else(|e| e.into_inner());
        set.remove(&self.id);
    }
}

/// Drives scan sessions through their lifecycle
pub struct SessionManager<C> {
    shared: Arc<Shared<C>>,
}

impl<C> Clone for SessionManager<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
        }
    }
}

impl<C: WatchdogApi + 'static> SessionManager<C> {
    /// Create a manager polling every [`DEFAULT_POLL_INTERVAL`].
    pub fn new(client: Arc<C>, store: SessionStore) -> Self {
        Self::with_poll_interval(client, store, DEFAULT_POLL_INTERVAL)
    }

    pub fn with_poll_interval(client: Arc<C>, store: SessionStore, poll_interval: Duration) -> Self {
        Self {
            shared: Arc::new(Shared {
                client,
                store,
                poll_interval,
                in_flight: StdMutex::new(HashSet::new()),
                watchers: Mutex::new(HashMap::new()),
                next_generation: StdMutex::new(0),
            }),
        }
    }

    pub fn store(&self) -> &SessionStore {
        &self.shared.store
    }

    pub fn poll_interval(&self) -> Duration {
        self.shared.poll_interval
    }

    /// Start a scan against `target`.
    ///
    /// Input is validated before any engine call. The session exists locally
    /// only after the engine accepted it.
    pub async fn start(&self, target: &str, options: ScanOptions) -> Result<String> {
        let target = normalize_target(target)?;
        options.validate()?;

        info!("Starting scan of {}", target);
        let id = self.shared.client.start_scan(&target, &options).await?;

        let session = ScanSession::pending(id.clone(), target, Utc::now(), options);
        if !self.shared.store.insert(session).await {
            return Err(ApiError::InvalidResponse(format!(
                "Engine returned an already known session ID: {}",
                id
            ))
            .into());
        }

        debug!("Scan {} is pending", id);
        Ok(id)
    }

    /// Fetch the engine status for one session and merge it.
    ///
    /// Terminal sessions return immediately without an engine call. On
    /// error the local session keeps its last known state.
    pub async fn poll(&self, id: &str) -> Result<PollOutcome> {
        let local = match self.shared.store.get(id).await {
            Some(session) => session,
            None if self.shared.store.is_deleted(id).await => return Ok(PollOutcome::Deleted),
            None => return Err(ValidationError::UnknownSession(id.to_string()).into()),
        };
        if local.is_terminal() {
            return Ok(PollOutcome::Terminal(local));
        }

        let Some(_guard) = self.acquire_in_flight(id) else {
            debug!("Poll for {} already in flight; skipping", id);
            return Ok(PollOutcome::Skipped);
        };

        let report = self.shared.client.get_scan_status(id).await?;

        let mut fetch_error = None;
        let result = if report.status == ScanStatus::Completed {
            match self.shared.client.get_scan_result(id).await {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Scan {} completed but its result is unavailable: {}", id, e);
                    fetch_error = Some(e);
                    None
                }
            }
        } else {
            None
        };

        let merged = self
            .shared
            .store
            .update(id, |session| {
                apply_report(session, &report, result);
                session.clone()
            })
            .await;

        let Some(session) = merged else {
            debug!("Discarding status for deleted scan {}", id);
            return Ok(PollOutcome::Deleted);
        };

        self.publish(&session).await;

        if let Some(e) = fetch_error {
            return Err(e);
        }

        if session.is_terminal() {
            info!("Scan {} finished: {}", id, session.status);
            Ok(PollOutcome::Terminal(session))
        } else {
            Ok(PollOutcome::Updated(session))
        }
    }

    /// Adopt a session this process did not start, such as one started by
    /// an earlier invocation.
    ///
    /// Known IDs return the local copy without an engine call. A completed
    /// report whose result cannot be fetched is tracked as running at 100%.
    pub async fn track(&self, id: &str) -> Result<ScanSession> {
        if let Some(session) = self.shared.store.get(id).await {
            return Ok(session);
        }
        if self.shared.store.is_deleted(id).await {
            return Err(ValidationError::UnknownSession(id.to_string()).into());
        }

        let report = self.shared.client.get_scan_status(id).await?;
        let result = if report.status == ScanStatus::Completed {
            match self.shared.client.get_scan_result(id).await {
                Ok(result) => Some(result),
                Err(e) => {
                    warn!("Result for scan {} is unavailable: {}", id, e);
                    None
                }
            }
        } else {
            None
        };

        let mut session = ScanSession::from_report(id, &report);
        apply_report(&mut session, &report, result);

        if !self.shared.store.insert(session.clone()).await {
            // Raced with another insert; the stored copy wins
            if let Some(existing) = self.shared.store.get(id).await {
                return Ok(existing);
            }
        }
        debug!("Tracking scan {} ({})", id, session.status);
        Ok(session)
    }

    /// Ask the engine to cancel a pending or running session.
    ///
    /// The local status changes only after the engine confirms.
    pub async fn cancel(&self, id: &str) -> Result<ScanSession> {
        let local = self
            .shared
            .store
            .get(id)
            .await
            .ok_or_else(|| ValidationError::UnknownSession(id.to_string()))?;

        if !local.status.is_cancellable() {
            return Err(ValidationError::InvalidState {
                id: id.to_string(),
                status: local.status.to_string(),
                action: "cancel",
            }
            .into());
        }

        self.shared.client.cancel_scan(id).await?;

        let updated = self
            .shared
            .store
            .update(id, |session| {
                if session.status.is_cancellable() {
                    mark_cancelled(session);
                }
                session.clone()
            })
            .await;

        // Deleted while the cancel was in flight: the engine still confirmed it
        let Some(session) = updated else {
            debug!("Scan {} was deleted during cancel", id);
            let mut session = local;
            mark_cancelled(&mut session);
            return Ok(session);
        };

        info!("Scan {} is {}", id, session.status);
        self.publish(&session).await;
        Ok(session)
    }

    /// Poll `id` on a schedule until it is terminal, deleted, or unwatched.
    ///
    /// Watching an ID that already has a live schedule returns a handle to
    /// the existing one.
    pub async fn watch(&self, id: &str) -> Result<WatchHandle> {
        let session = self
            .shared
            .store
            .get(id)
            .await
            .ok_or_else(|| ValidationError::UnknownSession(id.to_string()))?;

        let mut watchers = self.shared.watchers.lock().await;
        if let Some(entry) = watchers.get(id) {
            if !entry.token.is_cancelled() {
                return Ok(WatchHandle::new(
                    entry.sender.subscribe(),
                    entry.token.clone(),
                ));
            }
        }

        let token = CancellationToken::new();
        let (sender, receiver) = channel::channel(session);
        let generation = self.next_generation();

        watchers.insert(
            id.to_string(),
            WatchEntry {
                generation,
                token: token.clone(),
                sender,
            },
        );
        drop(watchers);

        debug!(
            "Watching scan {} every {:?}",
            id, self.shared.poll_interval
        );
        let manager = self.clone();
        let task_id = id.to_string();
        let task_token = token.clone();
        tokio::spawn(async move {
            manager.run_schedule(task_id, generation, task_token).await;
        });

        Ok(WatchHandle::new(receiver, token))
    }

    /// Stop the schedule for one session, if any.
    pub async fn unwatch(&self, id: &str) {
        if let Some(entry) = self.shared.watchers.lock().await.remove(id) {
            debug!("Unwatching scan {}", id);
            entry.token.cancel();
        }
    }

    /// Stop every live schedule. Later calls to `watch` start fresh ones.
    pub async fn stop(&self) {
        let stopped: Vec<WatchEntry> = self
            .shared
            .watchers
            .lock()
            .await
            .drain()
            .map(|(_, entry)| entry)
            .collect();
        debug!("Stopping {} schedule(s)", stopped.len());
        for entry in stopped {
            entry.token.cancel();
        }
    }

    /// True while `id` has a live schedule.
    #[allow(dead_code)]
    pub async fn is_watching(&self, id: &str) -> bool {
        self.shared
            .watchers
            .lock()
            .await
            .get(id)
            .is_some_and(|e| !e.token.is_cancelled())
    }

    /// Watch `id` and wait for a terminal status.
    ///
    /// Returns `None` if the session is deleted or the watch is stopped first.
    #[allow(dead_code)]
    pub async fn wait_for_terminal(&self, id: &str) -> Result<Option<ScanSession>> {
        let handle = self.watch(id).await?;
        Ok(handle.wait_for_terminal().await)
    }

    async fn run_schedule(&self, id: String, generation: u64, token: CancellationToken) {
        let mut ticker = tokio::time::interval(self.shared.poll_interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                _ = token.cancelled() => {
                    debug!("Schedule for {} cancelled", id);
                    break;
                }
                _ = ticker.tick() => {}
            }

            match self.poll(&id).await {
                Ok(outcome) if outcome.is_final() => break,
                Ok(_) => {}
                Err(e) => warn!("Poll for scan {} failed: {}", id, e),
            }
        }

        token.cancel();
        let mut watchers = self.shared.watchers.lock().await;
        if watchers.get(&id).is_some_and(|e| e.generation == generation) {
            watchers.remove(&id);
        }
    }

    async fn publish(&self, session: &ScanSession) {
        if let Some(entry) = self.shared.watchers.lock().await.get(&session.id) {
            entry.sender.send_replace(session.clone());
        }
    }

    fn acquire_in_flight(&self, id: &str) -> Option<InFlightGuard<'_>> {
        let mut set = self
            .shared
            .in_flight
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        if !set.insert(id.to_string()) {
            return None;
        }
        Some(InFlightGuard {
            set: &self.shared.in_flight,
            id: id.to_string(),
        })
    }

    fn next_generation(&self) -> u64 {
        let mut next = self
            .shared
            .next_generation
            .lock()
            .unwrap_or_else(|e| e.into_inner());
        *next += 1;
        *next
    }
}

/// Merge a status report (and the result, when fetched) into a session.
///
/// Status never moves backward, logs only grow, and `completed` is set only
/// together with its result.
fn apply_report(session: &mut ScanSession, report: &ScanStatusReport, result: Option<ScanResult>) {
    if session.is_terminal() {
        return;
    }

    if let Some(logs) = &report.logs {
        session.append_logs(logs);
    }
    if let Some(step) = &report.current_step {
        session.current_step = Some(step.clone());
    }
    if let Some(progress) = report.progress {
        session.progress = progress.clamp(0.0, 100.0);
    }

    match report.status {
        ScanStatus::Pending => {}
        ScanStatus::Running => {
            if session.status.can_advance_to(ScanStatus::Running) {
                session.status = ScanStatus::Running;
            }
        }
        ScanStatus::Completed => match result {
            Some(result) => {
                session.status = ScanStatus::Completed;
                session.progress = 100.0;
                session.current_step = None;
                session.result = Some(result);
            }
            None => {
                if session.status.can_advance_to(ScanStatus::Running) {
                    session.status = ScanStatus::Running;
                }
                session.progress = 100.0;
            }
        },
        ScanStatus::Failed => {
            session.status = ScanStatus::Failed;
            session.current_step = None;
            session.error = Some(
                report
                    .error
                    .clone()
                    .filter(|e| !e.trim().is_empty())
                    .unwrap_or_else(|| "Scan failed".to_string()),
            );
        }
        ScanStatus::Cancelled => mark_cancelled(session),
    }
}

fn mark_cancelled(session: &mut ScanSession) {
    session.status = ScanStatus::Cancelled;
    session.current_step = None;
}
