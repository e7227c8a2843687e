//! Dashboard display models

use colored::Colorize;
use serde::Serialize;
use tabled::Tabled;

use super::scan::ScanDisplay;
use crate::cli::OutputFormat;
use crate::client::models::{DashboardStats, TrendPoint};
use crate::error::Result;
use crate::output::formatters::format_relative_time;
use crate::output::{Formattable, json, table};

/// Trend bucket row.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct TrendDisplay {
    #[tabled(rename = "PERIOD")]
    pub period: String,

    #[tabled(rename = "SCANS")]
    pub scans: usize,

    #[tabled(rename = "AVG SCORE")]
    pub average_score: String,

    #[tabled(rename = "VULNS")]
    pub vulns: usize,
}

impl From<&TrendPoint> for TrendDisplay {
    fn from(point: &TrendPoint) -> Self {
        Self {
            period: point.period.clone(),
            scans: point.scan_count,
            average_score: format!("{:.1}", point.average_score),
            vulns: point.vulnerability_count,
        }
    }
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "METRIC")]
    metric: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// Everything `watchdog dashboard` shows.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub stats: DashboardStats,
    pub recent: Vec<ScanDisplay>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trends: Vec<TrendPoint>,
    /// Start times of `recent`, for relative display
    #[serde(skip)]
    pub recent_started: Vec<chrono::DateTime<chrono::Utc>>,
}

impl DashboardView {
    fn metric_rows(&self) -> Vec<MetricRow> {
        let s = &self.stats;
        let row = |metric, value: String| MetricRow { metric, value };
        vec![
            row("total", s.total_scans.to_string()),
            row("pending", s.pending_scans.to_string()),
            row("running", s.running_scans.to_string()),
            row("completed", s.completed_scans.to_string()),
            row("failed", s.failed_scans.to_string()),
            row("cancelled", s.cancelled_scans.to_string()),
            row("average score", format!("{:.1}", s.average_score)),
            row("vulnerabilities", s.total_vulns.to_string()),
            row("critical", s.critical_vulns.to_string()),
            row("high", s.high_vulns.to_string()),
            row("medium", s.medium_vulns.to_string()),
            row("low", s.low_vulns.to_string()),
        ]
    }

    fn format_pretty(&self) -> Result<String> {
        let s = &self.stats;
        let now = chrono::Utc::now();
        let mut out = String::new();

        out.push_str(&format!("{}\n", "Scans".bold()));
        out.push_str(&format!(
            "  {} total  {} running  {} completed  {} failed  {} cancelled\n",
            s.total_scans,
            s.running_scans.to_string().cyan(),
            s.completed_scans.to_string().green(),
            s.failed_scans.to_string().red(),
            s.cancelled_scans.to_string().yellow()
        ));
        out.push_str(&format!("  Average score: {:.1}\n", s.average_score));

        out.push_str(&format!("\n{}\n", "Vulnerabilities".bold()));
        out.push_str(&format!(
            "  {} critical  {} high  {} medium  {} low\n",
            s.critical_vulns.to_string().red().bold(),
            s.high_vulns.to_string().red(),
            s.medium_vulns.to_string().yellow(),
            s.low_vulns
        ));

        let grades: Vec<String> = s
            .score_distribution
            .iter()
            .map(|(grade, count)| format!("{}: {}", grade, count))
            .collect();
        if !grades.is_empty() {
            out.push_str(&format!("\n{}\n  {}\n", "Grades".bold(), grades.join("  ")));
        }

        out.push_str(&format!("\n{}\n", "Recent scans".bold()));
        if self.recent.is_empty() {
            out.push_str("  No scans yet.\n");
        }
        for (i, scan) in self.recent.iter().enumerate() {
            let when = self
                .recent_started
                .get(i)
                .map(|t| format_relative_time(t, &now))
                .unwrap_or_else(|| scan.started.clone());
            out.push_str(&format!(
                "  {:<12} {:<10} {:>5}  {}  {}\n",
                scan.id, scan.status, scan.score, scan.target, when.dimmed()
            ));
        }

        if !self.trends.is_empty() {
            out.push_str(&format!("\n{}\n", "Trends".bold()));
            let rows: Vec<TrendDisplay> = self.trends.iter().map(TrendDisplay::from).collect();
            out.push_str(&table::format_table(&rows));
        }

        Ok(out.trim_end().to_string())
    }
}

impl Formattable for DashboardView {
    fn format(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Json => Ok(json::format_json(self)?),
            OutputFormat::Pretty => self.format_pretty(),
            OutputFormat::Table => {
                let mut out = table::format_table(&self.metric_rows());
                if !self.trends.is_empty() {
                    let rows: Vec<TrendDisplay> =
                        self.trends.iter().map(TrendDisplay::from).collect();
                    out.push('\n');
                    out.push_str(&table::format_table(&rows));
                }
                Ok(out)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::ScanSessionBuilder;
    use crate::dashboard::aggregate;

    fn view(trends: Vec<TrendPoint>) -> DashboardView {
        let sessions = vec![
            ScanSessionBuilder::new("a").completed(80).build(),
            ScanSessionBuilder::new("b").failed("timeout").build(),
        ];
        DashboardView {
            stats: aggregate(&sessions),
            recent: sessions.iter().map(ScanDisplay::from).collect(),
            recent_started: sessions.iter().map(|s| s.start_time).collect(),
            trends,
        }
    }

    #[test]
    fn test_table_lists_metrics() {
        let output = view(Vec::new()).format(OutputFormat::Table).unwrap();
        assert!(output.contains("average score"));
        assert!(output.contains("80.0"));
        assert!(!output.contains("PERIOD"));
    }

    #[test]
    fn test_trends_rendered_when_present() {
        let trends = vec![TrendPoint {
            period: "2025-W03".to_string(),
            average_score: 72.5,
            vulnerability_count: 4,
            scan_count: 2,
        }];
        let output = view(trends).format(OutputFormat::Table).unwrap();
        assert!(output.contains("2025-W03"));
        assert!(output.contains("72.5"));
    }

    #[test]
    fn test_pretty_lists_recent_scans() {
        colored::control::set_override(false);
        let output = view(Vec::new()).format(OutputFormat::Pretty).unwrap();
        assert!(output.contains("Recent scans"));
        assert!(output.contains("failed"));
        assert!(output.contains("A: 1"));
    }

    #[test]
    fn test_json_skips_empty_trends() {
        let output = view(Vec::new()).format(OutputFormat::Json).unwrap();
        assert!(output.contains("\"averageScore\": 80.0"));
        assert!(!output.contains("\"trends\""));
    }
}
