//! Report export and AI analysis models

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Export file format supported by the engine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Pdf,
    Json,
}

impl fmt::Display for ExportFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExportFormat::Pdf => f.write_str("pdf"),
            ExportFormat::Json => f.write_str("json"),
        }
    }
}

/// Content switches for an exported report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    #[serde(rename = "includeAI")]
    pub include_ai: bool,
    pub include_charts: bool,
}

/// Level of detail requested from the AI report generator
#[derive(
    Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum ReportDetail {
    Basic,
    #[default]
    Detailed,
    Comprehensive,
}

/// AI-generated analysis of a completed scan.
///
/// Fields beyond the summary vary by provider and are preserved verbatim.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AiReport {
    pub summary: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<String>,

    #[serde(default)]
    pub recommendations: Vec<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
