//! Dashboard statistics models

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Letter grade derived from a security score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SecurityGrade {
    #[serde(rename = "A+")]
    APlus,
    A,
    B,
    C,
    D,
    F,
}

impl SecurityGrade {
    /// All grades, best first.
    pub const ALL: [SecurityGrade; 6] = [
        SecurityGrade::APlus,
        SecurityGrade::A,
        SecurityGrade::B,
        SecurityGrade::C,
        SecurityGrade::D,
        SecurityGrade::F,
    ];

    pub fn from_score(score: u32) -> Self {
        match score {
            90.. => SecurityGrade::APlus,
            80..=89 => SecurityGrade::A,
            70..=79 => SecurityGrade::B,
            60..=69 => SecurityGrade::C,
            50..=59 => SecurityGrade::D,
            _ => SecurityGrade::F,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SecurityGrade::APlus => "A+",
            SecurityGrade::A => "A",
            SecurityGrade::B => "B",
            SecurityGrade::C => "C",
            SecurityGrade::D => "D",
            SecurityGrade::F => "F",
        }
    }
}

impl fmt::Display for SecurityGrade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Aggregate statistics over a scan collection.
///
/// Produced locally by the dashboard aggregator and also returned by the
/// engine's `GetDashboardStats`; both share this shape.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DashboardStats {
    pub total_scans: usize,
    pub pending_scans: usize,
    pub running_scans: usize,
    pub completed_scans: usize,
    pub failed_scans: usize,
    pub cancelled_scans: usize,

    /// Mean score of completed scans carrying a result, 0 when there are none
    pub average_score: f64,

    pub total_vulns: usize,
    pub critical_vulns: usize,
    pub high_vulns: usize,
    pub medium_vulns: usize,
    pub low_vulns: usize,

    /// Completed scans per grade, keyed by grade label
    pub score_distribution: BTreeMap<String, usize>,
}

/// Trend grouping granularity
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum TrendPeriod {
    #[default]
    Daily,
    Weekly,
    Monthly,
}

/// One bucket of trend data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TrendPoint {
    /// `2025-01-15`, `2025-W03` or `2025-01` depending on the period
    pub period: String,
    pub average_score: f64,
    pub vulnerability_count: usize,
    pub scan_count: usize,
}
