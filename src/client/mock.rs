//! Mock scan engine client for testing
//!
//! Provides a mock implementation of the API traits for unit testing
//! without making real engine calls.

use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::Mutex;

use super::api::{HistoryApi, ScanApi, SettingsApi};
use super::models::{
    AiReport, AppConfig, AppConfigUpdate, DashboardStats, ExportFormat, ExportOptions,
    ProviderKeys, ReportDetail, ScanOptions, ScanResult, ScanSession, ScanStatus,
    ScanStatusReport,
};
use crate::error::{ApiError, Result};

/// Mock API client for testing.
///
/// Configure expected responses via builder methods, then use in tests.
///
/// # Example
/// ```ignore
/// let mock = MockWatchdogClient::new()
///     .with_status_sequence("scan-1", vec![
///         StatusReportBuilder::running(50.0).build(),
///         StatusReportBuilder::new(ScanStatus::Completed).build(),
///     ])
///     .await
///     .with_result("scan-1", ScanResultBuilder::new(88).build())
///     .await;
/// ```
pub struct MockWatchdogClient {
    /// Stored sessions returned from get_all_scans and search_scans
    scans: Arc<Mutex<Vec<ScanSession>>>,
    /// Scripted status reports per session, consumed front to back
    status_scripts: Arc<Mutex<HashMap<String, VecDeque<ScanStatusReport>>>>,
    /// Results returned from get_scan_result
    results: Arc<Mutex<HashMap<String, ScanResult>>>,
    /// IDs handed out by start_scan, consumed in order
    next_ids: Arc<Mutex<VecDeque<String>>>,
    /// Stored provider keys
    keys: Arc<Mutex<ProviderKeys>>,
    /// Keys that test_api_key reports as valid
    valid_keys: Arc<Mutex<HashSet<String>>>,
    /// Remote application configuration
    config: Arc<Mutex<AppConfig>>,
    /// Stats returned from get_dashboard_stats
    stats: Arc<Mutex<DashboardStats>>,
    /// File name returned from export_report
    export_filename: Arc<Mutex<String>>,
    /// Error to return (if any) - consumed on first use
    error: Arc<Mutex<Option<ApiError>>>,
    /// Persistent errors keyed by method name
    failures: Arc<Mutex<HashMap<&'static str, ApiError>>>,
    /// Persistent delete failures keyed by scan ID
    delete_failures: Arc<Mutex<HashMap<String, ApiError>>>,
    /// Artificial latency applied to every call
    delay: Arc<Mutex<Option<Duration>>>,
    /// Track number of calls for verification
    call_count: Arc<Mutex<CallCounts>>,
    /// Captured requests for test assertions
    captured_requests: Arc<Mutex<Vec<CapturedRequest>>>,
}

impl Default for MockWatchdogClient {
    fn default() -> Self {
        Self {
            scans: Arc::new(Mutex::new(Vec::new())),
            status_scripts: Arc::new(Mutex::new(HashMap::new())),
            results: Arc::new(Mutex::new(HashMap::new())),
            next_ids: Arc::new(Mutex::new(VecDeque::new())),
            keys: Arc::new(Mutex::new(ProviderKeys::new())),
            valid_keys: Arc::new(Mutex::new(HashSet::new())),
            config: Arc::new(Mutex::new(AppConfig::default())),
            stats: Arc::new(Mutex::new(DashboardStats::default())),
            export_filename: Arc::new(Mutex::new("watchdog-report.pdf".to_string())),
            error: Arc::new(Mutex::new(None)),
            failures: Arc::new(Mutex::new(HashMap::new())),
            delete_failures: Arc::new(Mutex::new(HashMap::new())),
            delay: Arc::new(Mutex::new(None)),
            call_count: Arc::new(Mutex::new(CallCounts::default())),
            captured_requests: Arc::new(Mutex::new(Vec::new())),
        }
    }
}

/// Tracks API call counts for test verification
#[derive(Default, Debug, Clone)]
pub struct CallCounts {
    pub start_scan: usize,
    pub get_scan_status: usize,
    pub get_scan_result: usize,
    pub cancel_scan: usize,
    pub get_all_scans: usize,
    pub search_scans: usize,
    pub delete_scan: usize,
    pub export_report: usize,
    pub generate_ai_report: usize,
    pub get_dashboard_stats: usize,
    pub get_api_keys: usize,
    pub save_api_key: usize,
    pub test_api_key: usize,
    pub get_config: usize,
    pub update_config: usize,
}

impl CallCounts {
    /// Get total number of API calls made.
    pub fn total(&self) -> usize {
        self.start_scan
            + self.get_scan_status
            + self.get_scan_result
            + self.cancel_scan
            + self.get_all_scans
            + self.search_scans
            + self.delete_scan
            + self.export_report
            + self.generate_ai_report
            + self.get_dashboard_stats
            + self.get_api_keys
            + self.save_api_key
            + self.test_api_key
            + self.get_config
            + self.update_config
    }
}

/// A captured API request for test assertions.
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    /// The API method called (e.g., "delete_scan", "save_api_key")
    pub method: &'static str,
    /// Scan ID or provider key, when the call takes one
    pub subject: Option<String>,
    /// Secondary argument (target URL, key value, query), when present
    pub argument: Option<String>,
}

impl MockWatchdogClient {
    /// Create a new mock client with default (empty) responses.
    pub fn new() -> Self {
        Self::default()
    }

    /// Configure stored sessions returned from get_all_scans.
    pub async fn with_scans(self, scans: Vec<ScanSession>) -> Self {
        *self.scans.lock().await = scans;
        self
    }

    /// Script the status reports returned for one session.
    ///
    /// Reports are returned in order; the last one repeats once the
    /// script is exhausted.
    pub async fn with_status_sequence(self, id: &str, reports: Vec<ScanStatusReport>) -> Self {
        self.status_scripts
            .lock()
            .await
            .insert(id.to_string(), reports.into());
        self
    }

    /// Configure the result returned for one session.
    pub async fn with_result(self, id: &str, result: ScanResult) -> Self {
        self.results.lock().await.insert(id.to_string(), result);
        self
    }

    /// Configure IDs handed out by start_scan, in order.
    pub async fn with_session_ids(self, ids: &[&str]) -> Self {
        *self.next_ids.lock().await = ids.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Configure stored provider keys.
    pub async fn with_keys(self, keys: &[(&str, &str)]) -> Self {
        *self.keys.lock().await = keys
            .iter()
            .map(|(p, k)| (p.to_string(), k.to_string()))
            .collect();
        self
    }

    /// Mark a key value as valid for test_api_key.
    pub async fn with_valid_key(self, key: &str) -> Self {
        self.valid_keys.lock().await.insert(key.to_string());
        self
    }

    /// Configure the remote application configuration.
    pub async fn with_config(self, config: AppConfig) -> Self {
        *self.config.lock().await = config;
        self
    }

    /// Configure stats returned from get_dashboard_stats.
    pub async fn with_stats(self, stats: DashboardStats) -> Self {
        *self.stats.lock().await = stats;
        self
    }

    /// Configure the file name returned from export_report.
    pub async fn with_export_filename(self, filename: &str) -> Self {
        *self.export_filename.lock().await = filename.to_string();
        self
    }

    /// Configure an error to return on the next API call.
    /// The error is consumed after one use.
    pub async fn with_error(self, error: ApiError) -> Self {
        *self.error.lock().await = Some(error);
        self
    }

    /// Make every call to `method` fail with `error`.
    pub async fn with_failure(self, method: &'static str, error: ApiError) -> Self {
        self.failures.lock().await.insert(method, error);
        self
    }

    /// Make delete_scan fail for one ID.
    pub async fn with_delete_failure(self, id: &str, error: ApiError) -> Self {
        self.delete_failures
            .lock()
            .await
            .insert(id.to_string(), error);
        self
    }

    /// Delay every call by `delay` before it completes.
    pub async fn with_delay(self, delay: Duration) -> Self {
        *self.delay.lock().await = Some(delay);
        self
    }

    /// Fail the next call with `error` (non-consuming form of `with_error`).
    pub async fn set_error(&self, error: ApiError) {
        *self.error.lock().await = Some(error);
    }

    /// Change the artificial latency after construction.
    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    /// Clear a persistent failure configured with `with_failure`.
    pub async fn clear_failure(&self, method: &'static str) {
        self.failures.lock().await.remove(method);
    }

    /// Get the call counts for verification in tests.
    pub async fn call_counts(&self) -> CallCounts {
        self.call_count.lock().await.clone()
    }

    /// Get all captured requests for test assertions.
    pub async fn captured_requests(&self) -> Vec<CapturedRequest> {
        self.captured_requests.lock().await.clone()
    }

    /// Current stored keys.
    pub async fn stored_keys(&self) -> ProviderKeys {
        self.keys.lock().await.clone()
    }

    /// Count the call, capture it, apply the delay, then check injected errors.
    async fn enter(
        &self,
        method: &'static str,
        subject: Option<&str>,
        argument: Option<&str>,
    ) -> Result<()> {
        {
            let mut counts = self.call_count.lock().await;
            match method {
                "start_scan" => counts.start_scan += 1,
                "get_scan_status" => counts.get_scan_status += 1,
                "get_scan_result" => counts.get_scan_result += 1,
                "cancel_scan" => counts.cancel_scan += 1,
                "get_all_scans" => counts.get_all_scans += 1,
                "search_scans" => counts.search_scans += 1,
                "delete_scan" => counts.delete_scan += 1,
                "export_report" => counts.export_report += 1,
                "generate_ai_report" => counts.generate_ai_report += 1,
                "get_dashboard_stats" => counts.get_dashboard_stats += 1,
                "get_api_keys" => counts.get_api_keys += 1,
                "save_api_key" => counts.save_api_key += 1,
                "test_api_key" => counts.test_api_key += 1,
                "get_config" => counts.get_config += 1,
                "update_config" => counts.update_config += 1,
                _ => {}
            }
        }

        self.captured_requests.lock().await.push(CapturedRequest {
            method,
            subject: subject.map(str::to_string),
            argument: argument.map(str::to_string),
        });

        let delay = *self.delay.lock().await;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if let Some(e) = self.error.lock().await.take() {
            return Err(e.into());
        }
        if let Some(e) = self.failures.lock().await.get(method) {
            return Err(e.clone().into());
        }
        Ok(())
    }

    async fn find_scan(&self, id: &str) -> Option<ScanSession> {
        self.scans
            .lock()
            .await
            .iter()
            .find(|s| s.id == id)
            .cloned()
    }
}

fn report_from_session(session: &ScanSession) -> ScanStatusReport {
    ScanStatusReport {
        status: session.status,
        progress: Some(session.progress),
        current_step: session.current_step.clone(),
        error: session.error.clone(),
        logs: Some(session.logs.clone()),
        target: session.target.clone(),
        start_time: session.start_time,
    }
}

// ============================================================================
// ScanApi Implementation
// ============================================================================

#[async_trait]
impl ScanApi for MockWatchdogClient {
    async fn start_scan(&self, target: &str, options: &ScanOptions) -> Result<String> {
        self.enter("start_scan", None, Some(target)).await?;

        let id = {
            let mut ids = self.next_ids.lock().await;
            match ids.pop_front() {
                Some(id) => id,
                None => format!("scan-{}", self.call_count.lock().await.start_scan),
            }
        };

        self.scans.lock().await.push(ScanSession::pending(
            id.clone(),
            target,
            chrono::Utc::now(),
            options.clone(),
        ));
        Ok(id)
    }

    async fn get_scan_status(&self, scan_id: &str) -> Result<ScanStatusReport> {
        self.enter("get_scan_status", Some(scan_id), None).await?;

        {
            let mut scripts = self.status_scripts.lock().await;
            if let Some(script) = scripts.get_mut(scan_id) {
                let report = if script.len() > 1 {
                    script.pop_front()
                } else {
                    script.front().cloned()
                };
                if let Some(report) = report {
                    return Ok(report);
                }
            }
        }

        match self.find_scan(scan_id).await {
            Some(session) => Ok(report_from_session(&session)),
            None => Err(ApiError::NotFound(format!("Scan {}", scan_id)).into()),
        }
    }

    async fn get_scan_result(&self, scan_id: &str) -> Result<ScanResult> {
        self.enter("get_scan_result", Some(scan_id), None).await?;

        if let Some(result) = self.results.lock().await.get(scan_id) {
            return Ok(result.clone());
        }
        self.find_scan(scan_id)
            .await
            .and_then(|s| s.result)
            .ok_or_else(|| ApiError::NotFound(format!("Result for scan {}", scan_id)).into())
    }

    async fn cancel_scan(&self, scan_id: &str) -> Result<()> {
        self.enter("cancel_scan", Some(scan_id), None).await?;

        let mut scans = self.scans.lock().await;
        if let Some(session) = scans.iter_mut().find(|s| s.id == scan_id) {
            session.status = ScanStatus::Cancelled;
        }
        Ok(())
    }
}

// ============================================================================
// HistoryApi Implementation
// ============================================================================

#[async_trait]
impl HistoryApi for MockWatchdogClient {
    async fn get_all_scans(&self) -> Result<Vec<ScanSession>> {
        self.enter("get_all_scans", None, None).await?;
        Ok(self.scans.lock().await.clone())
    }

    async fn search_scans(&self, query: &str) -> Result<Vec<ScanSession>> {
        self.enter("search_scans", None, Some(query)).await?;

        let needle = query.to_lowercase();
        Ok(self
            .scans
            .lock()
            .await
            .iter()
            .filter(|s| {
                s.target.to_lowercase().contains(&needle) || s.id.to_lowercase().contains(&needle)
            })
            .cloned()
            .collect())
    }

    async fn delete_scan(&self, scan_id: &str) -> Result<()> {
        self.enter("delete_scan", Some(scan_id), None).await?;

        if let Some(e) = self.delete_failures.lock().await.get(scan_id) {
            return Err(e.clone().into());
        }

        let mut scans = self.scans.lock().await;
        let before = scans.len();
        scans.retain(|s| s.id != scan_id);
        if scans.len() == before {
            return Err(ApiError::NotFound(format!("Scan {}", scan_id)).into());
        }
        Ok(())
    }

    async fn export_report(
        &self,
        scan_id: &str,
        format: ExportFormat,
        _options: &ExportOptions,
    ) -> Result<String> {
        let fmt = format.to_string();
        self.enter("export_report", Some(scan_id), Some(&fmt))
            .await?;
        Ok(self.export_filename.lock().await.clone())
    }

    async fn generate_ai_report(&self, scan_id: &str, detail: ReportDetail) -> Result<AiReport> {
        let detail = serde_json::to_string(&detail).unwrap_or_default();
        self.enter("generate_ai_report", Some(scan_id), Some(&detail))
            .await?;
        Ok(AiReport {
            summary: format!("Analysis of {}", scan_id),
            risk_level: Some("medium".to_string()),
            recommendations: vec!["Enable HSTS".to_string()],
            extra: Default::default(),
        })
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        self.enter("get_dashboard_stats", None, None).await?;
        Ok(self.stats.lock().await.clone())
    }
}

// ============================================================================
// SettingsApi Implementation
// ============================================================================

#[async_trait]
impl SettingsApi for MockWatchdogClient {
    async fn get_api_keys(&self) -> Result<ProviderKeys> {
        self.enter("get_api_keys", None, None).await?;
        Ok(self.keys.lock().await.clone())
    }

    async fn save_api_key(&self, provider: &str, key: &str) -> Result<()> {
        self.enter("save_api_key", Some(provider), Some(key))
            .await?;
        self.keys
            .lock()
            .await
            .insert(provider.to_string(), key.to_string());
        Ok(())
    }

    async fn test_api_key(&self, provider: &str, key: &str) -> Result<bool> {
        self.enter("test_api_key", Some(provider), Some(key))
            .await?;
        Ok(self.valid_keys.lock().await.contains(key))
    }

    async fn get_config(&self) -> Result<AppConfig> {
        self.enter("get_config", None, None).await?;
        Ok(self.config.lock().await.clone())
    }

    async fn update_config(&self, update: &AppConfigUpdate) -> Result<AppConfig> {
        self.enter("update_config", None, None).await?;
        let mut config = self.config.lock().await;
        update.apply_to(&mut config);
        Ok(config.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::fixtures::{ScanSessionBuilder, StatusReportBuilder};

    #[tokio::test]
    async fn test_mock_start_assigns_ids_in_order() {
        let mock = MockWatchdogClient::new()
            .with_session_ids(&["first", "second"])
            .await;

        let a = mock.start_scan("https://a.test", &ScanOptions::default()).await.unwrap();
        let b = mock.start_scan("https://b.test", &ScanOptions::default()).await.unwrap();
        let c = mock.start_scan("https://c.test", &ScanOptions::default()).await.unwrap();

        assert_eq!(a, "first");
        assert_eq!(b, "second");
        assert_eq!(c, "scan-3");
        assert_eq!(mock.get_all_scans().await.unwrap().len(), 3);
    }

    #[tokio::test]
    async fn test_mock_status_script_repeats_last() {
        let mock = MockWatchdogClient::new()
            .with_status_sequence(
                "s1",
                vec![
                    StatusReportBuilder::running(10.0).build(),
                    StatusReportBuilder::running(60.0).build(),
                ],
            )
            .await;

        let p1 = mock.get_scan_status("s1").await.unwrap().progress;
        let p2 = mock.get_scan_status("s1").await.unwrap().progress;
        let p3 = mock.get_scan_status("s1").await.unwrap().progress;

        assert_eq!(p1, Some(10.0));
        assert_eq!(p2, Some(60.0));
        assert_eq!(p3, Some(60.0));
        assert_eq!(mock.call_counts().await.get_scan_status, 3);
    }

    #[tokio::test]
    async fn test_mock_error_is_consumed() {
        let mock = MockWatchdogClient::new()
            .with_error(ApiError::ServerError("boom".into()))
            .await;

        assert!(mock.get_all_scans().await.is_err());
        assert!(mock.get_all_scans().await.is_ok());
        assert_eq!(mock.call_counts().await.total(), 2);
    }

    #[tokio::test]
    async fn test_mock_delete_unknown_is_not_found() {
        let mock = MockWatchdogClient::new()
            .with_scans(vec![ScanSessionBuilder::new("a").build()])
            .await;

        assert!(mock.delete_scan("a").await.is_ok());
        assert!(mock.delete_scan("a").await.is_err());
    }

    #[tokio::test]
    async fn test_mock_captures_requests() {
        let mock = MockWatchdogClient::new();
        mock.save_api_key("openai", "sk-1").await.unwrap();

        let captured = mock.captured_requests().await;
        assert_eq!(
            captured,
            vec![CapturedRequest {
                method: "save_api_key",
                subject: Some("openai".to_string()),
                argument: Some("sk-1".to_string()),
            }]
        );
        assert_eq!(mock.stored_keys().await.get("openai").map(String::as_str), Some("sk-1"));
    }
}
