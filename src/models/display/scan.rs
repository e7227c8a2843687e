//! Scan display models and helpers

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::common::{or_dash, truncate_string};
use crate::cli::OutputFormat;
use crate::client::models::{AiReport, ScanResult, ScanSession, Severity, Vulnerability};
use crate::error::Result;
use crate::output::formatters::{
    colorize_score, colorize_status, format_duration_seconds, format_progress,
    format_timestamp_local,
};
use crate::output::{Formattable, json};

/// Log lines shown in the pretty scan view
const TAIL_LOG_LINES: usize = 5;

/// Scan display model for table/JSON output.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct ScanDisplay {
    /// Scan ID
    #[tabled(rename = "SCAN ID")]
    pub id: String,

    /// Target URL
    #[tabled(rename = "TARGET")]
    pub target: String,

    /// Scan status
    #[tabled(rename = "STATUS")]
    pub status: String,

    /// Progress percentage
    #[tabled(rename = "PROGRESS")]
    pub progress: String,

    /// Security score, when completed
    #[tabled(rename = "SCORE")]
    pub score: String,

    /// Findings summary (e.g., "1C 2H 0M 3L")
    #[tabled(rename = "FINDINGS")]
    pub findings: String,

    /// Local start time
    #[tabled(rename = "STARTED")]
    pub started: String,
}

impl From<&ScanSession> for ScanDisplay {
    fn from(session: &ScanSession) -> Self {
        Self {
            id: session.id.clone(),
            target: truncate_string(&session.target, 40),
            status: session.status.to_string(),
            progress: format_progress(session.progress),
            score: session
                .security_score()
                .map(|s| s.to_string())
                .unwrap_or_else(|| "--".to_string()),
            findings: session
                .result
                .as_ref()
                .map(format_findings)
                .unwrap_or_else(|| "--".to_string()),
            started: format_timestamp_local(&session.start_time),
        }
    }
}

impl From<ScanSession> for ScanDisplay {
    fn from(session: ScanSession) -> Self {
        ScanDisplay::from(&session)
    }
}

/// Compact per-severity counts (e.g., "1C 2H 0M 3L").
pub fn format_findings(result: &ScanResult) -> String {
    format!(
        "{}C {}H {}M {}L",
        result.count_severity(Severity::Critical),
        result.count_severity(Severity::High),
        result.count_severity(Severity::Medium),
        result.count_severity(Severity::Low)
    )
}

/// Vulnerability row for result tables.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct VulnerabilityDisplay {
    #[tabled(rename = "SEVERITY")]
    pub severity: String,

    #[tabled(rename = "CVE")]
    pub cve: String,

    #[tabled(rename = "TITLE")]
    pub title: String,

    #[tabled(rename = "SCORE")]
    pub score: String,
}

impl From<&Vulnerability> for VulnerabilityDisplay {
    fn from(vuln: &Vulnerability) -> Self {
        Self {
            severity: vuln.severity.to_string(),
            cve: or_dash(Some(&vuln.cve)),
            title: truncate_string(&vuln.title, 60),
            score: format!("{:.1}", vuln.score),
        }
    }
}

/// Single-scan view (`scan status`, `scan watch` final output).
#[derive(Debug, Clone)]
pub struct ScanDetail {
    pub session: ScanSession,
}

impl ScanDetail {
    pub fn new(session: ScanSession) -> Self {
        Self { session }
    }

    fn format_pretty(&self) -> String {
        let s = &self.session;
        let mut out = String::new();

        out.push_str(&format!("{} {}\n", "Scan".bold(), s.id.bold()));
        out.push_str(&format!("Target:   {}\n", s.target));
        out.push_str(&format!("Status:   {}\n", colorize_status(s.status)));
        out.push_str(&format!("Started:  {}\n", format_timestamp_local(&s.start_time)));

        if !s.is_terminal() {
            out.push_str(&format!("Progress: {}\n", format_progress(s.progress)));
        }
        if let Some(step) = &s.current_step {
            out.push_str(&format!("Step:     {}\n", step));
        }
        if let Some(result) = &s.result {
            out.push_str(&format!(
                "Score:    {}\n",
                colorize_score(result.security_score)
            ));
            out.push_str(&format!("Findings: {}\n", format_findings(result)));
        }
        if let Some(error) = &s.error {
            out.push_str(&format!("Error:    {}\n", error.red()));
        }

        if !s.logs.is_empty() {
            out.push_str(&format!("\n{}\n", "Recent log".bold()));
            let skip = s.logs.len().saturating_sub(TAIL_LOG_LINES);
            for entry in &s.logs[skip..] {
                out.push_str(&format!(
                    "  {} {}\n",
                    entry.timestamp.format("%H:%M:%S").to_string().dimmed(),
                    entry.message
                ));
            }
        }

        out.trim_end().to_string()
    }
}

impl Formattable for ScanDetail {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json(&self.session)?),
            OutputFormat::Table => vec![ScanDisplay::from(&self.session)].format(format),
            OutputFormat::Pretty => Ok(self.format_pretty()),
        }
    }
}

/// Full result of a completed scan (`scan result`).
#[derive(Debug, Clone)]
pub struct ScanResultView {
    pub id: String,
    pub result: ScanResult,
}

impl ScanResultView {
    fn vulnerability_rows(&self) -> Vec<VulnerabilityDisplay> {
        let mut vulns: Vec<&Vulnerability> = self.result.vulnerabilities.iter().collect();
        vulns.sort_by_key(|v| v.severity);
        vulns.into_iter().map(VulnerabilityDisplay::from).collect()
    }
}

impl Formattable for ScanResultView {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json(&self.result)?),
            OutputFormat::Table => self.vulnerability_rows().format(format),
            OutputFormat::Pretty => {
                let r = &self.result;
                let mut out = String::new();
                out.push_str(&format!("{} {}\n", "Result for scan".bold(), self.id.bold()));
                out.push_str(&format!("Score:    {}\n", colorize_score(r.security_score)));
                out.push_str(&format!("Checks:   {}\n", r.total_checks));
                out.push_str(&format!(
                    "Duration: {}\n",
                    format_duration_seconds(r.scan_duration)
                ));

                if !r.technologies.is_empty() {
                    let techs: Vec<String> = r
                        .technologies
                        .iter()
                        .map(|t| {
                            if t.version.is_empty() {
                                t.name.clone()
                            } else {
                                format!("{} {}", t.name, t.version)
                            }
                        })
                        .collect();
                    out.push_str(&format!("Stack:    {}\n", techs.join(", ")));
                }

                out.push_str(&format!(
                    "\n{} ({})\n",
                    "Vulnerabilities".bold(),
                    r.vulnerabilities.len()
                ));
                out.push_str(&self.vulnerability_rows().format(OutputFormat::Table)?);
                Ok(out)
            }
        }
    }
}

/// AI analysis of a scan (`history report`).
#[derive(Debug, Clone)]
pub struct AiReportView {
    pub report: AiReport,
}

impl Formattable for AiReportView {
    fn format(&self, format: OutputFormat) -> Result<String> {
        if let OutputFormat::Json = format {
            return Ok(json::format_json(&self.report)?);
        }

        let r = &self.report;
        let mut out = String::new();
        out.push_str(&format!("{}\n{}\n", "Summary".bold(), r.summary));
        if let Some(risk) = &r.risk_level {
            out.push_str(&format!("\nRisk level: {}\n", risk.bold()));
        }
        if !r.recommendations.is_empty() {
            out.push_str(&format!("\n{}\n", "Recommendations".bold()));
            for rec in &r.recommendations {
                out.push_str(&format!("  • {}\n", rec));
            }
        }
        Ok(out.trim_end().to_string())
    }
}
