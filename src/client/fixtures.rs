//! Test fixtures and builders for scan engine model types
//!
//! Provides builder patterns for creating test data with sensible defaults.
//! Import via `use crate::client::fixtures::*` in test modules.

#![allow(dead_code)]

use chrono::{DateTime, Duration, TimeZone, Utc};

use super::models::{
    LogEntry, ScanOptions, ScanResult, ScanSession, ScanStatus, ScanStatusReport, Severity,
    Technology, Vulnerability,
};

/// Fixed reference instant used by fixtures: 2025-01-15 12:00:00 UTC.
pub fn reference_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 15, 12, 0, 0)
        .single()
        .unwrap_or_else(Utc::now)
}

// ============================================================================
// ScanResultBuilder
// ============================================================================

/// Builder for creating test ScanResult instances.
///
/// # Example
/// ```ignore
/// let result = ScanResultBuilder::new(82)
///     .vuln(Severity::High)
///     .vuln(Severity::Low)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ScanResultBuilder {
    security_score: u32,
    vulnerabilities: Vec<Vulnerability>,
    technologies: Vec<Technology>,
    scan_duration: u64,
    total_checks: u32,
}

impl ScanResultBuilder {
    /// Create a new builder with the given score.
    pub fn new(security_score: u32) -> Self {
        Self {
            security_score,
            vulnerabilities: Vec::new(),
            technologies: Vec::new(),
            scan_duration: 42,
            total_checks: 120,
        }
    }

    /// Add a vulnerability of the given severity.
    pub fn vuln(mut self, severity: Severity) -> Self {
        let n = self.vulnerabilities.len() + 1;
        self.vulnerabilities.push(Vulnerability {
            cve: format!("CVE-2024-{:04}", n),
            severity,
            score: 5.0,
            title: format!("Finding {}", n),
            description: String::new(),
            remediation: String::new(),
            references: Vec::new(),
            exploit_available: false,
            patch_available: true,
        });
        self
    }

    /// Add a detected technology.
    pub fn technology(mut self, name: &str, version: &str) -> Self {
        self.technologies.push(Technology {
            name: name.to_string(),
            version: version.to_string(),
            category: "server".to_string(),
            confidence: 0.9,
            deprecated: false,
        });
        self
    }

    /// Build the ScanResult.
    pub fn build(self) -> ScanResult {
        ScanResult {
            security_score: self.security_score,
            vulnerabilities: self.vulnerabilities,
            technologies: self.technologies,
            scan_duration: self.scan_duration,
            total_checks: self.total_checks,
        }
    }
}

// ============================================================================
// ScanSessionBuilder
// ============================================================================

/// Builder for creating test ScanSession instances.
///
/// Terminal builders attach the payload their status requires, so built
/// sessions are consistent unless a test deliberately breaks them.
///
/// # Example
/// ```ignore
/// let session = ScanSessionBuilder::new("scan-1")
///     .target("https://example.com")
///     .completed(85)
///     .started_minutes_ago(30)
///     .build();
/// ```
#[derive(Debug, Clone)]
pub struct ScanSessionBuilder {
    id: String,
    target: String,
    status: ScanStatus,
    progress: f64,
    current_step: Option<String>,
    start_time: DateTime<Utc>,
    error: Option<String>,
    logs: Vec<LogEntry>,
    result: Option<ScanResult>,
}

impl ScanSessionBuilder {
    /// Create a new pending session builder with the given ID.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            target: format!("https://{}.example.com", id),
            id,
            status: ScanStatus::Pending,
            progress: 0.0,
            current_step: None,
            start_time: reference_time(),
            error: None,
            logs: Vec::new(),
            result: None,
        }
    }

    /// Set the target URL.
    pub fn target(mut self, target: impl Into<String>) -> Self {
        self.target = target.into();
        self
    }

    /// Set the start time.
    pub fn start_time(mut self, start_time: DateTime<Utc>) -> Self {
        self.start_time = start_time;
        self
    }

    /// Start `minutes` before the reference time.
    pub fn started_minutes_ago(mut self, minutes: i64) -> Self {
        self.start_time = reference_time() - Duration::minutes(minutes);
        self
    }

    /// Mark as running with the given progress.
    pub fn running(mut self, progress: f64) -> Self {
        self.status = ScanStatus::Running;
        self.progress = progress;
        self.current_step = Some("Checking headers".to_string());
        self
    }

    /// Mark as completed with a result carrying `score`.
    pub fn completed(self, score: u32) -> Self {
        self.completed_with(ScanResultBuilder::new(score).build())
    }

    /// Mark as completed with the given result.
    pub fn completed_with(mut self, result: ScanResult) -> Self {
        self.status = ScanStatus::Completed;
        self.progress = 100.0;
        self.result = Some(result);
        self.error = None;
        self
    }

    /// Mark as failed with an error message.
    pub fn failed(mut self, error: impl Into<String>) -> Self {
        self.status = ScanStatus::Failed;
        self.error = Some(error.into());
        self.result = None;
        self
    }

    /// Mark as cancelled.
    pub fn cancelled(mut self) -> Self {
        self.status = ScanStatus::Cancelled;
        self
    }

    /// Append a log line.
    pub fn log(mut self, message: &str) -> Self {
        let offset = self.logs.len() as i64;
        self.logs.push(LogEntry {
            timestamp: self.start_time + Duration::seconds(offset),
            message: message.to_string(),
        });
        self
    }

    /// Build the ScanSession.
    pub fn build(self) -> ScanSession {
        ScanSession {
            id: self.id,
            target: self.target,
            status: self.status,
            progress: self.progress,
            current_step: self.current_step,
            start_time: self.start_time,
            error: self.error,
            logs: self.logs,
            result: self.result,
            options: Some(ScanOptions::default()),
        }
    }
}

// ============================================================================
// StatusReportBuilder
// ============================================================================

/// Builder for creating test ScanStatusReport instances.
#[derive(Debug, Clone)]
pub struct StatusReportBuilder {
    status: ScanStatus,
    progress: Option<f64>,
    current_step: Option<String>,
    error: Option<String>,
    logs: Option<Vec<LogEntry>>,
    target: String,
    start_time: DateTime<Utc>,
}

impl StatusReportBuilder {
    /// Create a report with the given status.
    pub fn new(status: ScanStatus) -> Self {
        Self {
            status,
            progress: None,
            current_step: None,
            error: None,
            logs: None,
            target: "https://example.com".to_string(),
            start_time: reference_time(),
        }
    }

    /// Running at the given progress.
    pub fn running(progress: f64) -> Self {
        Self::new(ScanStatus::Running).progress(progress)
    }

    pub fn progress(mut self, progress: f64) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn step(mut self, step: &str) -> Self {
        self.current_step = Some(step.to_string());
        self
    }

    pub fn error(mut self, error: &str) -> Self {
        self.error = Some(error.to_string());
        self
    }

    pub fn target(mut self, target: &str) -> Self {
        self.target = target.to_string();
        self
    }

    /// Report the full log so far; lines are stamped one second apart.
    pub fn logs(mut self, messages: &[&str]) -> Self {
        self.logs = Some(
            messages
                .iter()
                .enumerate()
                .map(|(i, m)| LogEntry {
                    timestamp: self.start_time + Duration::seconds(i as i64),
                    message: m.to_string(),
                })
                .collect(),
        );
        self
    }

    /// Build the ScanStatusReport.
    pub fn build(self) -> ScanStatusReport {
        ScanStatusReport {
            status: self.status,
            progress: self.progress,
            current_step: self.current_step,
            error: self.error,
            logs: self.logs,
            target: self.target,
            start_time: self.start_time,
        }
    }
}

// ============================================================================
// Convenience Functions
// ============================================================================

/// Create `n` completed sessions with scores `base, base+1, ...`, one minute apart.
pub fn completed_sessions(n: usize, base: u32) -> Vec<ScanSession> {
    (0..n)
        .map(|i| {
            ScanSessionBuilder::new(format!("done-{}", i))
                .started_minutes_ago(i as i64)
                .completed(base + i as u32)
                .build()
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_builder_defaults() {
        let session = ScanSessionBuilder::new("scan-1").build();
        assert_eq!(session.id, "scan-1");
        assert_eq!(session.target, "https://scan-1.example.com");
        assert_eq!(session.status, ScanStatus::Pending);
        assert!(session.is_consistent());
    }

    #[test]
    fn test_session_builder_terminal_states_are_consistent() {
        assert!(ScanSessionBuilder::new("a").completed(90).build().is_consistent());
        assert!(ScanSessionBuilder::new("b").failed("timeout").build().is_consistent());
        assert!(ScanSessionBuilder::new("c").cancelled().build().is_consistent());
    }

    #[test]
    fn test_result_builder_counts() {
        let result = ScanResultBuilder::new(70)
            .vuln(Severity::Critical)
            .vuln(Severity::High)
            .vuln(Severity::High)
            .build();
        assert_eq!(result.count_severity(Severity::High), 2);
        assert_eq!(result.vulnerabilities[0].cve, "CVE-2024-0001");
    }

    #[test]
    fn test_status_report_builder_logs() {
        let report = StatusReportBuilder::running(40.0)
            .logs(&["resolving", "connecting"])
            .build();
        let logs = report.logs.unwrap();
        assert_eq!(logs.len(), 2);
        assert!(logs[0].timestamp < logs[1].timestamp);
    }

    #[test]
    fn test_completed_sessions_helper() {
        let sessions = completed_sessions(3, 80);
        assert_eq!(sessions.len(), 3);
        assert_eq!(sessions[2].security_score(), Some(82));
    }
}
