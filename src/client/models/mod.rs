//! Scan engine data models
//!
//! Domain types exchanged with the Watchdog scan engine, organized by
//! resource type.

mod config;
mod keys;
mod options;
mod report;
mod scan;
mod stats;

pub use config::{AppConfig, AppConfigUpdate};
pub use keys::{BUILTIN_PROVIDERS, KeyRequest, KeyTestResponse, ProviderKeys};
pub use options::{DEFAULT_SCAN_TIMEOUT, ScanOptions};
pub use report::{AiReport, ExportFormat, ExportOptions, ReportDetail};
pub use scan::{ScanResult, ScanSession, ScanStatus, ScanStatusReport, Severity, Vulnerability};
#[cfg(test)]
pub use scan::{LogEntry, Technology};
pub use stats::{DashboardStats, SecurityGrade, TrendPeriod, TrendPoint};
