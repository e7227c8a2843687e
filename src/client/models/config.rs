//! Remote application configuration models

use serde::{Deserialize, Serialize};

use super::ReportDetail;
use crate::error::ValidationError;

/// Application configuration held by the scan engine
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AppConfig {
    /// Defaults applied to new scans by the engine
    pub default_scan_config: DefaultScanConfig,

    pub export_settings: ExportSettings,

    /// dark, light, auto
    pub theme: String,

    pub notifications: NotificationSettings,

    /// Default scan timeout in seconds
    pub default_timeout: u32,

    pub max_concurrent_scans: u32,

    pub enable_deep_scan: bool,

    /// Consumed by the engine; the client never retries on its own
    pub retry_failed_scans: bool,

    pub max_stored_scans: u32,

    pub auto_delete_old_scans: bool,

    /// Directory the engine writes exported reports to
    pub export_path: String,

    pub default_ai_provider: String,

    pub ai_report_detail: ReportDetail,

    pub auto_generate_ai_report: bool,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            default_scan_config: DefaultScanConfig::default(),
            export_settings: ExportSettings::default(),
            theme: "dark".to_string(),
            notifications: NotificationSettings::default(),
            default_timeout: 300,
            max_concurrent_scans: 3,
            enable_deep_scan: false,
            retry_failed_scans: false,
            max_stored_scans: 100,
            auto_delete_old_scans: false,
            export_path: String::new(),
            default_ai_provider: "openai".to_string(),
            ai_report_detail: ReportDetail::Detailed,
            auto_generate_ai_report: false,
        }
    }
}

/// Engine-side scan defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DefaultScanConfig {
    /// quick, standard, deep, custom
    pub scan_type: String,
    pub include_subdomains: bool,
    pub max_depth: u32,
    pub timeout: u32,
    pub user_agent: String,
    pub exclude_paths: Vec<String>,
    pub technical_scan: bool,
    pub vulnerability_scan: bool,
    pub compliance_scan: bool,
    pub performance_scan: bool,
}

impl Default for DefaultScanConfig {
    fn default() -> Self {
        Self {
            scan_type: "standard".to_string(),
            include_subdomains: false,
            max_depth: 3,
            timeout: 30,
            user_agent: "Watchdog/1.0".to_string(),
            exclude_paths: Vec::new(),
            technical_scan: true,
            vulnerability_scan: true,
            compliance_scan: false,
            performance_scan: false,
        }
    }
}

/// Report export defaults
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportSettings {
    pub default_format: String,
    pub include_charts: bool,
    #[serde(rename = "includeAIAnalysis")]
    pub include_ai_analysis: bool,
    pub company_name: String,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            default_format: "pdf".to_string(),
            include_charts: true,
            include_ai_analysis: true,
            company_name: "Watchdog Security".to_string(),
        }
    }
}

/// Notification preferences (delivered by the engine, not this client)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationSettings {
    pub scan_complete: bool,
    pub vulnerability_found: bool,
    pub high_risk_detected: bool,
    pub email: String,
    pub webhook: String,
}

impl Default for NotificationSettings {
    fn default() -> Self {
        Self {
            scan_complete: true,
            vulnerability_found: true,
            high_risk_detected: true,
            email: String::new(),
            webhook: String::new(),
        }
    }
}

/// Partial configuration update sent with `UpdateConfig`.
///
/// Only fields that are `Some` are sent and applied.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppConfigUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_timeout: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_concurrent_scans: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub enable_deep_scan: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub retry_failed_scans: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_stored_scans: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_delete_old_scans: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_path: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_ai_provider: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_report_detail: Option<ReportDetail>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub auto_generate_ai_report: Option<bool>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub notifications: Option<NotificationSettings>,
}

fn check_range(
    field: &'static str,
    value: Option<u32>,
    min: u32,
    max: u32,
) -> std::result::Result<(), ValidationError> {
    match value {
        Some(v) if !(min..=max).contains(&v) => Err(ValidationError::OutOfRange {
            field,
            value: i64::from(v),
            min: i64::from(min),
            max: i64::from(max),
        }),
        _ => Ok(()),
    }
}

impl AppConfigUpdate {
    /// True when no field is set.
    pub fn is_empty(&self) -> bool {
        *self == AppConfigUpdate::default()
    }

    /// Validate numeric settings against the ranges the engine accepts.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        check_range("defaultTimeout", self.default_timeout, 60, 1800)?;
        check_range("maxConcurrentScans", self.max_concurrent_scans, 1, 10)?;
        check_range("maxStoredScans", self.max_stored_scans, 10, 1000)?;
        Ok(())
    }

    /// Layer `newer` on top of this update; fields set in `newer` win.
    pub fn merge(&mut self, newer: AppConfigUpdate) {
        macro_rules! take {
            ($($field:ident),*) => {
                $(if newer.$field.is_some() { self.$field = newer.$field; })*
            };
        }
        take!(
            theme,
            default_timeout,
            max_concurrent_scans,
            enable_deep_scan,
            retry_failed_scans,
            max_stored_scans,
            auto_delete_old_scans,
            export_path,
            default_ai_provider,
            ai_report_detail,
            auto_generate_ai_report,
            notifications
        );
    }

    /// Apply the set fields to a full configuration.
    pub fn apply_to(&self, config: &mut AppConfig) {
        macro_rules! put {
            ($($field:ident),*) => {
                $(if let Some(ref v) = self.$field { config.$field = v.clone(); })*
            };
        }
        put!(
            theme,
            default_timeout,
            max_concurrent_scans,
            enable_deep_scan,
            retry_failed_scans,
            max_stored_scans,
            auto_delete_old_scans,
            export_path,
            default_ai_provider,
            ai_report_detail,
            auto_generate_ai_report,
            notifications
        );
    }
}
