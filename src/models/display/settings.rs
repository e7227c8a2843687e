//! Engine settings display model

use serde::Serialize;
use tabled::Tabled;

use super::common::or_dash;
use crate::client::models::AppConfig;

/// One `key = value` row for `settings show`.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct SettingDisplay {
    #[tabled(rename = "SETTING")]
    pub setting: String,

    #[tabled(rename = "VALUE")]
    pub value: String,
}

impl SettingDisplay {
    fn new(setting: &str, value: impl ToString) -> Self {
        Self {
            setting: setting.to_string(),
            value: value.to_string(),
        }
    }

    /// Flatten the configuration into rows. Keys match `settings set`
    /// except the read-only `notify-*` rows.
    pub fn rows(config: &AppConfig) -> Vec<SettingDisplay> {
        let detail = serde_json::to_value(config.ai_report_detail)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default();

        vec![
            Self::new("theme", &config.theme),
            Self::new("default-timeout", config.default_timeout),
            Self::new("max-concurrent-scans", config.max_concurrent_scans),
            Self::new("enable-deep-scan", config.enable_deep_scan),
            Self::new("retry-failed-scans", config.retry_failed_scans),
            Self::new("max-stored-scans", config.max_stored_scans),
            Self::new("auto-delete-old-scans", config.auto_delete_old_scans),
            Self::new("export-path", or_dash(Some(&config.export_path))),
            Self::new("default-ai-provider", or_dash(Some(&config.default_ai_provider))),
            Self::new("ai-report-detail", detail),
            Self::new("auto-generate-ai-report", config.auto_generate_ai_report),
            Self::new("notify-scan-complete", config.notifications.scan_complete),
            Self::new("notify-email", or_dash(Some(&config.notifications.email))),
            Self::new("notify-webhook", or_dash(Some(&config.notifications.webhook))),
        ]
    }
}
