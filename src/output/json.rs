//! JSON output formatting
//!
//! Every JSON result is wrapped as `{"data": ..., "meta": {...}}` so scripts
//! can tell which build produced it and when.

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Envelope around JSON results
#[derive(Debug, Serialize)]
pub struct JsonOutput<T> {
    pub data: T,
    pub meta: Metadata,
}

#[derive(Debug, Serialize)]
pub struct Metadata {
    /// When the output was rendered (RFC 3339, UTC)
    pub timestamp: DateTime<Utc>,

    /// Always `watchdog`
    pub generator: &'static str,

    pub version: &'static str,
}

impl<T> JsonOutput<T> {
    pub fn new(data: T) -> Self {
        Self {
            data,
            meta: Metadata {
                timestamp: Utc::now(),
                generator: env!("CARGO_PKG_NAME"),
                version: env!("CARGO_PKG_VERSION"),
            },
        }
    }
}

/// Wrap `data` and pretty-print it
pub fn format_json<T: Serialize + ?Sized>(data: &T) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&JsonOutput::new(data))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Serialize, Clone)]
    struct ScanRow {
        id: String,
        target: String,
    }

    #[test]
    fn test_json_output_new() {
        let output = JsonOutput::new(vec!["scan-1", "scan-2"]);

        assert_eq!(output.data, vec!["scan-1", "scan-2"]);
        assert_eq!(output.meta.version, env!("CARGO_PKG_VERSION"));
        assert_eq!(output.meta.generator, "watchdog");
        assert!(output.meta.timestamp <= Utc::now());
    }

    #[test]
    fn test_format_json_wraps_data() {
        let rows = vec![ScanRow {
            id: "scan-1".to_string(),
            target: "https://example.com".to_string(),
        }];

        let result = format_json(&rows).unwrap();

        assert!(result.contains("\"data\""));
        assert!(result.contains("\"meta\""));
        assert!(result.contains("\"id\": \"scan-1\""));
        assert!(result.contains("\"target\": \"https://example.com\""));
        assert!(result.contains("\"timestamp\""));
        assert!(result.contains("\"generator\": \"watchdog\""));
    }

    #[test]
    fn test_format_json_empty_vec() {
        let rows: Vec<ScanRow> = vec![];
        let result = format_json(&rows).unwrap();

        assert!(result.contains("\"data\": []"));
    }
}
