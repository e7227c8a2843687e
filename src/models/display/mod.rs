//! Display model implementations for table and JSON output
//!
//! Display models transform engine and core types into CLI-friendly formats
//! with appropriate column names and serialization.

mod common;
mod credential;
mod scan;
mod settings;
mod stats;

// Re-export all display types used by CLI commands
pub use credential::CredentialDisplay;
pub use scan::{AiReportView, ScanDetail, ScanDisplay, ScanResultView};
pub use settings::SettingDisplay;
pub use stats::DashboardView;
