//! Dashboard statistics derived from the scan collection
//!
//! Everything here is recomputed from a store snapshot on each call.

use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Local, TimeZone};

use crate::client::WatchdogApi;
use crate::client::models::{
    DashboardStats, ScanSession, ScanStatus, SecurityGrade, Severity, TrendPeriod, TrendPoint,
};
use crate::error::Result;
use crate::store::SessionStore;

/// Number of sessions shown in the dashboard's recent list
pub const RECENT_SCANS: usize = 5;

/// Compute summary statistics over `sessions`.
///
/// The average score covers completed sessions carrying a result; sessions
/// without a score are left out of both sum and count.
pub fn aggregate(sessions: &[ScanSession]) -> DashboardStats {
    let mut stats = DashboardStats {
        total_scans: sessions.len(),
        score_distribution: SecurityGrade::ALL
            .iter()
            .map(|g| (g.to_string(), 0))
            .collect(),
        ..Default::default()
    };

    let mut score_sum = 0u64;
    let mut scored = 0u64;

    for session in sessions {
        match session.status {
            ScanStatus::Pending => stats.pending_scans += 1,
            ScanStatus::Running => stats.running_scans += 1,
            ScanStatus::Completed => stats.completed_scans += 1,
            ScanStatus::Failed => stats.failed_scans += 1,
            ScanStatus::Cancelled => stats.cancelled_scans += 1,
        }

        let Some(result) = session.result.as_ref() else {
            continue;
        };
        if session.status != ScanStatus::Completed {
            continue;
        }

        score_sum += u64::from(result.security_score);
        scored += 1;
        *stats
            .score_distribution
            .entry(SecurityGrade::from_score(result.security_score).to_string())
            .or_default() += 1;

        stats.total_vulns += result.vulnerabilities.len();
        stats.critical_vulns += result.count_severity(Severity::Critical);
        stats.high_vulns += result.count_severity(Severity::High);
        stats.medium_vulns += result.count_severity(Severity::Medium);
        stats.low_vulns += result.count_severity(Severity::Low);
    }

    if scored > 0 {
        stats.average_score = score_sum as f64 / scored as f64;
    }
    stats
}

/// The `n` most recently started sessions, newest first.
pub fn recent(sessions: &[ScanSession], n: usize) -> Vec<&ScanSession> {
    let mut view: Vec<&ScanSession> = sessions.iter().collect();
    view.sort_by(|a, b| b.start_time.cmp(&a.start_time));
    view.truncate(n);
    view
}

/// Group completed, scored sessions into periods of `tz` local time.
///
/// Buckets are keyed `2025-01-15` (daily), `2025-W03` (ISO week) or
/// `2025-01` (monthly) and returned oldest first.
pub fn trends<Tz: TimeZone>(
    sessions: &[ScanSession],
    period: TrendPeriod,
    tz: &Tz,
) -> Vec<TrendPoint> {
    #[derive(Default)]
    struct Bucket {
        score_sum: u64,
        vulns: usize,
        scans: usize,
    }

    let mut buckets: BTreeMap<String, Bucket> = BTreeMap::new();
    for session in sessions {
        let Some(result) = session.result.as_ref() else {
            continue;
        };
        if session.status != ScanStatus::Completed {
            continue;
        }

        let date = session.start_time.with_timezone(tz).date_naive();
        let key = match period {
            TrendPeriod::Daily => date.format("%Y-%m-%d").to_string(),
            TrendPeriod::Weekly => {
                let week = date.iso_week();
                format!("{}-W{:02}", week.year(), week.week())
            }
            TrendPeriod::Monthly => date.format("%Y-%m").to_string(),
        };

        let bucket = buckets.entry(key).or_default();
        bucket.score_sum += u64::from(result.security_score);
        bucket.vulns += result.vulnerabilities.len();
        bucket.scans += 1;
    }

    buckets
        .into_iter()
        .map(|(period, b)| TrendPoint {
            period,
            average_score: b.score_sum as f64 / b.scans as f64,
            vulnerability_count: b.vulns,
            scan_count: b.scans,
        })
        .collect()
}

/// Dashboard views over the shared store, plus the engine's own stats
pub struct Dashboard<C> {
    client: Arc<C>,
    store: SessionStore,
}

impl<C: WatchdogApi> Dashboard<C> {
    pub fn new(client: Arc<C>, store: SessionStore) -> Self {
        Self { client, store }
    }

    /// Statistics over the local collection.
    pub async fn stats(&self) -> DashboardStats {
        aggregate(&self.store.snapshot().await)
    }

    /// Statistics as computed by the engine.
    pub async fn remote_stats(&self) -> Result<DashboardStats> {
        self.client.get_dashboard_stats().await
    }

    pub async fn recent(&self, n: usize) -> Vec<ScanSession> {
        let sessions = self.store.snapshot().await;
        recent(&sessions, n).into_iter().cloned().collect()
    }

    /// Trend buckets in the local time zone.
    pub async fn trends(&self, period: TrendPeriod) -> Vec<TrendPoint> {
        trends(&self.store.snapshot().await, period, &Local)
    }
}
