//! Handles to per-session poll schedules

use tokio::sync::watch;
use tokio_util::sync::CancellationToken;

use crate::client::models::ScanSession;

/// Handle to a running poll schedule.
///
/// Dropping the handle does not stop the schedule; call
/// [`SessionManager::unwatch`](super::SessionManager::unwatch) for that.
#[derive(Debug, Clone)]
pub struct WatchHandle {
    receiver: watch::Receiver<ScanSession>,
    token: CancellationToken,
}

impl WatchHandle {
    pub(crate) fn new(receiver: watch::Receiver<ScanSession>, token: CancellationToken) -> Self {
        Self { receiver, token }
    }

    /// Latest published snapshot of the session.
    pub fn latest(&self) -> ScanSession {
        self.receiver.borrow().clone()
    }

    /// True while the schedule is still polling.
    #[allow(dead_code)]
    pub fn is_active(&self) -> bool {
        !self.token.is_cancelled()
    }

    /// Wait for the next snapshot.
    ///
    /// Returns `None` once the schedule has ended.
    pub async fn changed(&mut self) -> Option<ScanSession> {
        tokio::select! {
            biased;
            res = self.receiver.changed() => match res {
                Ok(()) => Some(self.receiver.borrow_and_update().clone()),
                Err(_) => None,
            },
            _ = self.token.cancelled() => None,
        }
    }

    /// Wait until the session reaches a terminal status.
    ///
    /// Returns `None` if the schedule ends first (the session was deleted
    /// or the watch was stopped).
    #[allow(dead_code)]
    pub async fn wait_for_terminal(mut self) -> Option<ScanSession> {
        loop {
            {
                let current = self.receiver.borrow_and_update();
                if current.is_terminal() {
                    return Some(current.clone());
                }
            }
            if self.changed().await.is_none() {
                let last = self.receiver.borrow().clone();
                return last.is_terminal().then_some(last);
            }
        }
    }
}
