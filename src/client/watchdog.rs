//! Watchdog scan engine HTTP client

use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use log::debug;
use reqwest::{Client as HttpClient, Method, RequestBuilder, StatusCode};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::json;
use url::Url;

use super::api::{HistoryApi, ScanApi, SettingsApi};
use super::models::{
    AiReport, AppConfig, AppConfigUpdate, DashboardStats, ExportFormat, ExportOptions,
    KeyRequest, KeyTestResponse, ProviderKeys, ReportDetail, ScanOptions, ScanResult,
    ScanSession, ScanStatusReport,
};
use crate::error::{ApiError, ConfigError, Result};

/// Default local scan engine address
pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8484/api/v1";

/// Requests per second allowed toward the engine
const RATE_LIMIT_PER_SECOND: NonZeroU32 = match NonZeroU32::new(10) {
    Some(n) => n,
    None => NonZeroU32::MIN,
};

/// Per-request timeout
const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Error body returned by the engine on non-2xx responses
#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

/// HTTP client for the Watchdog scan engine
pub struct WatchdogClient {
    http: HttpClient,
    base_url: Url,
    token: Option<String>,
    rate_limiter: Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>,
}

impl WatchdogClient {
    /// Create a client for the engine at `base_url`.
    pub fn new(base_url: &str, token: Option<String>) -> Result<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| ConfigError::Invalid(format!("api_url `{}`: {}", base_url, e)))?;
        if !matches!(base_url.scheme(), "http" | "https") || base_url.cannot_be_a_base() {
            return Err(ConfigError::Invalid(format!(
                "api_url must be an http or https URL (got `{}`)",
                base_url
            ))
            .into());
        }

        let http = HttpClient::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        let quota = Quota::per_second(RATE_LIMIT_PER_SECOND);
        let rate_limiter = Arc::new(RateLimiter::direct(quota));

        Ok(Self {
            http,
            base_url,
            token,
            rate_limiter,
        })
    }

    /// Engine base URL without a trailing slash
    pub fn base_url(&self) -> &str {
        self.base_url.as_str().trim_end_matches('/')
    }

    /// Build the URL for a path below the base, percent-encoding each segment.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }

    fn builder(&self, method: Method, segments: &[&str]) -> RequestBuilder {
        let builder = self.http.request(method, self.url(segments));
        match &self.token {
            Some(token) => builder.bearer_auth(token),
            None => builder,
        }
    }

    /// Send a request and return the successful response body as text.
    async fn send(&self, request: RequestBuilder) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let response = request.send().await.map_err(ApiError::from)?;
        let status = response.status();

        let retry_after = response
            .headers()
            .get("retry-after")
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.parse::<u64>().ok());

        let body = response
            .text()
            .await
            .map_err(|e| ApiError::InvalidResponse(format!("Failed to read response: {}", e)))?;

        if status.is_success() {
            Ok(body)
        } else {
            debug!("Engine returned {}: {}", status, body);
            Err(map_error_status(status, &body, retry_after).into())
        }
    }

    async fn request<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T> {
        let body = self.send(request).await?;
        serde_json::from_str(&body).map_err(|e| {
            ApiError::InvalidResponse(format!("Failed to parse response: {}", e)).into()
        })
    }
}

/// Map a non-2xx status and body to an API error.
fn map_error_status(status: StatusCode, body: &str, retry_after: Option<u64>) -> ApiError {
    let message = serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error)
        .ok()
        .filter(|m| !m.trim().is_empty());

    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Unauthorized,
        StatusCode::NOT_FOUND => {
            ApiError::NotFound(message.unwrap_or_else(|| "Resource not found".to_string()))
        }
        StatusCode::TOO_MANY_REQUESTS => {
            ApiError::RateLimit(Duration::from_secs(retry_after.unwrap_or(60)))
        }
        StatusCode::BAD_REQUEST | StatusCode::UNPROCESSABLE_ENTITY => match message {
            Some(msg) => ApiError::Remote(msg),
            None => ApiError::BadRequest(body.to_string()),
        },
        status if status.is_server_error() => match message {
            Some(msg) => ApiError::Remote(msg),
            None => ApiError::ServerError(format!("{}", status)),
        },
        _ => ApiError::InvalidResponse(format!("Unexpected status code: {}", status)),
    }
}

#[async_trait]
impl ScanApi for WatchdogClient {
    async fn start_scan(&self, target: &str, options: &ScanOptions) -> Result<String> {
        #[derive(Deserialize)]
        #[serde(rename_all = "camelCase")]
        struct StartResponse {
            session_id: String,
        }

        let request = self
            .builder(Method::POST, &["scans"])
            .json(&json!({ "target": target, "options": options }));
        let response: StartResponse = self.request(request).await?;

        if response.session_id.trim().is_empty() {
            return Err(
                ApiError::InvalidResponse("Engine returned an empty session ID".into()).into(),
            );
        }
        Ok(response.session_id)
    }

    async fn get_scan_status(&self, scan_id: &str) -> Result<ScanStatusReport> {
        let request = self.builder(Method::GET, &["scans", scan_id, "status"]);
        self.request(request).await
    }

    async fn get_scan_result(&self, scan_id: &str) -> Result<ScanResult> {
        let request = self.builder(Method::GET, &["scans", scan_id, "result"]);
        let result: ScanResult = self.request(request).await?;
        if result.security_score > 100 {
            return Err(ApiError::InvalidResponse(format!(
                "Security score {} is outside 0-100",
                result.security_score
            ))
            .into());
        }
        Ok(result)
    }

    async fn cancel_scan(&self, scan_id: &str) -> Result<()> {
        let request = self.builder(Method::POST, &["scans", scan_id, "cancel"]);
        self.send(request).await?;
        Ok(())
    }
}

#[async_trait]
impl HistoryApi for WatchdogClient {
    async fn get_all_scans(&self) -> Result<Vec<ScanSession>> {
        self.request(self.builder(Method::GET, &["scans"])).await
    }

    async fn search_scans(&self, query: &str) -> Result<Vec<ScanSession>> {
        let request = self
            .builder(Method::GET, &["scans", "search"])
            .query(&[("q", query)]);
        self.request(request).await
    }

    async fn delete_scan(&self, scan_id: &str) -> Result<()> {
        self.send(self.builder(Method::DELETE, &["scans", scan_id]))
            .await?;
        Ok(())
    }

    async fn export_report(
        &self,
        scan_id: &str,
        format: ExportFormat,
        options: &ExportOptions,
    ) -> Result<String> {
        #[derive(Deserialize)]
        struct ExportResponse {
            #[serde(default)]
            filename: String,
        }

        let request = self
            .builder(Method::POST, &["scans", scan_id, "export"])
            .json(&json!({ "format": format, "options": options }));
        let response: ExportResponse = self.request(request).await?;
        Ok(response.filename)
    }

    async fn generate_ai_report(&self, scan_id: &str, detail: ReportDetail) -> Result<AiReport> {
        let request = self
            .builder(Method::POST, &["scans", scan_id, "ai-report"])
            .json(&json!({ "detailLevel": detail }));
        self.request(request).await
    }

    async fn get_dashboard_stats(&self) -> Result<DashboardStats> {
        self.request(self.builder(Method::GET, &["dashboard", "stats"]))
            .await
    }
}

#[async_trait]
impl SettingsApi for WatchdogClient {
    async fn get_api_keys(&self) -> Result<ProviderKeys> {
        self.request(self.builder(Method::GET, &["keys"])).await
    }

    async fn save_api_key(&self, provider: &str, key: &str) -> Result<()> {
        let request = self.builder(Method::PUT, &["keys", provider]).json(&KeyRequest {
            key: key.to_string(),
        });
        self.send(request).await?;
        Ok(())
    }

    async fn test_api_key(&self, provider: &str, key: &str) -> Result<bool> {
        let request = self.builder(Method::POST, &["keys", provider, "test"]).json(&KeyRequest {
            key: key.to_string(),
        });
        let response: KeyTestResponse = self.request(request).await?;
        Ok(response.valid)
    }

    async fn get_config(&self) -> Result<AppConfig> {
        self.request(self.builder(Method::GET, &["config"])).await
    }

    async fn update_config(&self, update: &AppConfigUpdate) -> Result<AppConfig> {
        let request = self.builder(Method::PATCH, &["config"]).json(update);
        self.request(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_creation() {
        let client = WatchdogClient::new(DEFAULT_API_URL, None);
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_trims_trailing_slash() {
        let client = WatchdogClient::new("http://localhost:9000/api/", None).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9000/api");
    }

    #[test]
    fn test_client_rejects_bad_base_url() {
        assert!(WatchdogClient::new("not a url", None).is_err());
        assert!(WatchdogClient::new("ftp://engine.local", None).is_err());
    }

    #[test]
    fn test_url_encodes_segments() {
        let client = WatchdogClient::new("http://localhost:9000/api/v1/", None).unwrap();
        let url = client.url(&["scans", "a/b c", "status"]);
        assert_eq!(url.as_str(), "http://localhost:9000/api/v1/scans/a%2Fb%20c/status");
    }

    #[test]
    fn test_url_without_base_path() {
        let client = WatchdogClient::new("http://localhost:9000", None).unwrap();
        assert_eq!(client.url(&["keys"]).as_str(), "http://localhost:9000/keys");
    }

    #[test]
    fn test_map_error_uses_engine_message() {
        let err = map_error_status(
            StatusCode::INTERNAL_SERVER_ERROR,
            r#"{"error": "scanner crashed"}"#,
            None,
        );
        assert_eq!(err.to_string(), "scanner crashed");
    }

    #[test]
    fn test_map_error_without_body() {
        match map_error_status(StatusCode::BAD_GATEWAY, "", None) {
            ApiError::ServerError(msg) => assert!(msg.contains("502")),
            other => panic!("Expected ServerError, got {:?}", other),
        }
        match map_error_status(StatusCode::NOT_FOUND, "", None) {
            ApiError::NotFound(msg) => assert_eq!(msg, "Resource not found"),
            other => panic!("Expected NotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_map_error_rate_limit_and_auth() {
        match map_error_status(StatusCode::TOO_MANY_REQUESTS, "", Some(12)) {
            ApiError::RateLimit(d) => assert_eq!(d, Duration::from_secs(12)),
            other => panic!("Expected RateLimit, got {:?}", other),
        }
        assert!(matches!(
            map_error_status(StatusCode::UNAUTHORIZED, "", None),
            ApiError::Unauthorized
        ));
    }
}
