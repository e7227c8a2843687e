//! Scan session models

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ScanOptions;

/// Lifecycle status of a scan session.
///
/// Status only moves forward: `pending → running → {completed, failed, cancelled}`.
/// A pending session may also go straight to a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScanStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Cancelled,
}

impl ScanStatus {
    /// Whether polling should stop at this status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            ScanStatus::Completed | ScanStatus::Failed | ScanStatus::Cancelled
        )
    }

    /// Whether a cancel request is meaningful.
    pub fn is_cancellable(self) -> bool {
        matches!(self, ScanStatus::Pending | ScanStatus::Running)
    }

    fn rank(self) -> u8 {
        match self {
            ScanStatus::Pending => 0,
            ScanStatus::Running => 1,
            ScanStatus::Completed | ScanStatus::Failed | ScanStatus::Cancelled => 2,
        }
    }

    /// Check whether `next` is a legal forward transition from `self`.
    pub fn can_advance_to(self, next: ScanStatus) -> bool {
        self.rank() < next.rank()
    }

    /// Lowercase wire name.
    pub fn as_str(self) -> &'static str {
        match self {
            ScanStatus::Pending => "pending",
            ScanStatus::Running => "running",
            ScanStatus::Completed => "completed",
            ScanStatus::Failed => "failed",
            ScanStatus::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for ScanStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ScanStatus {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "pending" => Ok(ScanStatus::Pending),
            "running" => Ok(ScanStatus::Running),
            "completed" | "complete" => Ok(ScanStatus::Completed),
            "failed" => Ok(ScanStatus::Failed),
            "cancelled" | "canceled" => Ok(ScanStatus::Cancelled),
            other => Err(format!("unknown scan status: {}", other)),
        }
    }
}

/// One line of scan engine output
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LogEntry {
    /// When the engine emitted the line
    pub timestamp: DateTime<Utc>,

    /// Log message
    pub message: String,
}

/// Vulnerability severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Critical,
    High,
    Medium,
    Low,
    #[serde(other)]
    Info,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Critical => "critical",
            Severity::High => "high",
            Severity::Medium => "medium",
            Severity::Low => "low",
            Severity::Info => "info",
        };
        f.write_str(s)
    }
}

/// A finding reported by the scan engine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Vulnerability {
    /// CVE identifier, when one applies
    #[serde(default)]
    pub cve: String,

    /// Severity bucket
    pub severity: Severity,

    /// CVSS-like score
    #[serde(default)]
    pub score: f64,

    /// Short title
    #[serde(default)]
    pub title: String,

    #[serde(default)]
    pub description: String,

    #[serde(default)]
    pub remediation: String,

    #[serde(default)]
    pub references: Vec<String>,

    #[serde(default)]
    pub exploit_available: bool,

    #[serde(default)]
    pub patch_available: bool,
}

/// A technology fingerprinted on the target
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Technology {
    pub name: String,

    #[serde(default)]
    pub version: String,

    /// framework, library, server, database, cms, other
    #[serde(default)]
    pub category: String,

    /// Detection confidence (0.0 - 1.0)
    #[serde(default)]
    pub confidence: f64,

    #[serde(default)]
    pub deprecated: bool,
}

/// Final result of a completed scan
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanResult {
    /// Overall score, 0 - 100
    pub security_score: u32,

    #[serde(default)]
    pub vulnerabilities: Vec<Vulnerability>,

    #[serde(default)]
    pub technologies: Vec<Technology>,

    /// Scan duration in seconds
    #[serde(default)]
    pub scan_duration: u64,

    /// Number of checks the engine executed
    #[serde(default)]
    pub total_checks: u32,
}

impl ScanResult {
    /// Count vulnerabilities with the given severity.
    pub fn count_severity(&self, severity: Severity) -> usize {
        self.vulnerabilities
            .iter()
            .filter(|v| v.severity == severity)
            .count()
    }
}

/// Status snapshot returned by `GetScanStatus`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanStatusReport {
    pub status: ScanStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub progress: Option<f64>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub logs: Option<Vec<LogEntry>>,

    pub target: String,

    pub start_time: DateTime<Utc>,
}

/// One invocation of the scan engine against a target URL
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScanSession {
    /// Opaque session ID
    pub id: String,

    /// Target URL
    pub target: String,

    pub status: ScanStatus,

    /// Percentage complete, meaningful only while running
    #[serde(default)]
    pub progress: f64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_step: Option<String>,

    pub start_time: DateTime<Utc>,

    /// Present iff status is failed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,

    /// Append-only engine output
    #[serde(default)]
    pub logs: Vec<LogEntry>,

    /// Present iff status is completed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub result: Option<ScanResult>,

    /// Options captured when the scan was started
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<ScanOptions>,
}

impl ScanSession {
    /// A freshly started session, before the first poll.
    pub fn pending(
        id: impl Into<String>,
        target: impl Into<String>,
        start_time: DateTime<Utc>,
        options: ScanOptions,
    ) -> Self {
        Self {
            id: id.into(),
            target: target.into(),
            status: ScanStatus::Pending,
            progress: 0.0,
            current_step: None,
            start_time,
            error: None,
            logs: Vec::new(),
            result: None,
            options: Some(options),
        }
    }

    /// Build a session from a status report for an ID not yet in the collection.
    ///
    /// Only non-terminal reports are accepted here; terminal state is
    /// reached through the normal merge so its payload invariants hold.
    pub fn from_report(id: impl Into<String>, report: &ScanStatusReport) -> Self {
        Self {
            id: id.into(),
            target: report.target.clone(),
            status: ScanStatus::Pending,
            progress: 0.0,
            current_step: None,
            start_time: report.start_time,
            error: None,
            logs: Vec::new(),
            result: None,
            options: None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Security score, present only for completed sessions.
    pub fn security_score(&self) -> Option<u32> {
        self.result.as_ref().map(|r| r.security_score)
    }

    /// Check the payload invariants: result ⇔ completed, error ⇔ failed.
    #[allow(dead_code)]
    pub fn is_consistent(&self) -> bool {
        let completed = self.status == ScanStatus::Completed;
        let failed = self.status == ScanStatus::Failed;
        completed == self.result.is_some() && failed == self.error.is_some()
    }

    /// Append log lines not already present, keeping existing order.
    ///
    /// Returns the number of lines added.
    pub fn append_logs(&mut self, incoming: &[LogEntry]) -> usize {
        let mut seen: HashSet<&LogEntry> = self.logs.iter().collect();
        let added: Vec<LogEntry> = incoming
            .iter()
            .filter(|entry| seen.insert(*entry))
            .cloned()
            .collect();
        let count = added.len();
        self.logs.extend(added);
        count
    }

    /// Repair a session loaded from the engine so the payload invariants hold.
    ///
    /// A completed session without a result is demoted to running at 100%
    /// so the next poll fetches the result; a failed session without an
    /// error gets a generic message; stray payloads are dropped.
    pub fn normalize(mut self) -> Self {
        match self.status {
            ScanStatus::Completed if self.result.is_none() => {
                self.status = ScanStatus::Running;
                self.progress = 100.0;
            }
            ScanStatus::Failed if self.error.is_none() => {
                self.error = Some("Scan failed".to_string());
            }
            _ => {}
        }
        if self.status != ScanStatus::Completed {
            self.result = None;
        }
        if self.status != ScanStatus::Failed {
            self.error = None;
        }
        self
    }
}
