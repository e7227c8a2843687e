//! Scan lifecycle API trait

use async_trait::async_trait;

use crate::client::models::{ScanOptions, ScanResult, ScanStatusReport};
use crate::error::Result;

/// Scan lifecycle operations for the scan engine
#[async_trait]
pub trait ScanApi: Send + Sync {
    /// Start a scan and return the engine-assigned session ID
    async fn start_scan(&self, target: &str, options: &ScanOptions) -> Result<String>;

    /// Get the current status snapshot of a session
    async fn get_scan_status(&self, scan_id: &str) -> Result<ScanStatusReport>;

    /// Get the final result of a completed session
    async fn get_scan_result(&self, scan_id: &str) -> Result<ScanResult>;

    /// Ask the engine to cancel a pending or running session
    async fn cancel_scan(&self, scan_id: &str) -> Result<()>;
}
