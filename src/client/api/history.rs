//! Scan history API trait

use async_trait::async_trait;

use crate::client::models::{
    AiReport, DashboardStats, ExportFormat, ExportOptions, ReportDetail, ScanSession,
};
use crate::error::Result;

/// Operations over the engine's stored scans
#[async_trait]
pub trait HistoryApi: Send + Sync {
    /// List every stored scan session
    async fn get_all_scans(&self) -> Result<Vec<ScanSession>>;

    /// Server-side text search over stored scans
    async fn search_scans(&self, query: &str) -> Result<Vec<ScanSession>>;

    /// Delete one stored scan
    async fn delete_scan(&self, scan_id: &str) -> Result<()>;

    /// Export a report and return the written file name.
    ///
    /// An empty file name means the engine had no result to export.
    async fn export_report(
        &self,
        scan_id: &str,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<String>;

    /// Generate an AI analysis of a completed scan
    async fn generate_ai_report(&self, scan_id: &str, detail: ReportDetail) -> Result<AiReport>;

    /// Engine-computed dashboard statistics
    async fn get_dashboard_stats(&self) -> Result<DashboardStats>;
}
