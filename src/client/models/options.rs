//! Scan option models

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Shortest scan timeout the engine accepts, in seconds
pub const MIN_SCAN_TIMEOUT: u32 = 60;

/// Longest scan timeout the engine accepts, in seconds
pub const MAX_SCAN_TIMEOUT: u32 = 1800;

/// Timeout used when none is given
pub const DEFAULT_SCAN_TIMEOUT: u32 = 300;

/// Check categories and timeout for a single scan.
///
/// Captured once at start and never mutated afterwards. The timeout is
/// forwarded to the engine; the client does not enforce it locally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanOptions {
    /// SSL/TLS analysis
    #[serde(rename = "enableSSL", default)]
    pub enable_ssl: bool,

    /// Known-vulnerability checks
    #[serde(rename = "enableVulnScan", default)]
    pub enable_vuln_scan: bool,

    /// Technology fingerprinting
    #[serde(rename = "enableTechStack", default)]
    pub enable_tech_stack: bool,

    /// DNS record collection
    #[serde(rename = "enableDNSInfo", default)]
    pub enable_dns_info: bool,

    /// Comprehensive (slower) analysis
    #[serde(rename = "deepScan", default)]
    pub deep_scan: bool,

    /// Engine-side timeout in seconds
    #[serde(rename = "scanTimeout", default = "default_scan_timeout")]
    pub scan_timeout: u32,
}

fn default_scan_timeout() -> u32 {
    DEFAULT_SCAN_TIMEOUT
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            enable_ssl: true,
            enable_vuln_scan: true,
            enable_tech_stack: true,
            enable_dns_info: true,
            deep_scan: false,
            scan_timeout: DEFAULT_SCAN_TIMEOUT,
        }
    }
}

impl ScanOptions {
    /// Create options with the recommended checks enabled.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the engine-side timeout (seconds).
    pub fn timeout(mut self, seconds: u32) -> Self {
        self.scan_timeout = seconds;
        self
    }

    /// Enable or disable deep scanning.
    pub fn deep(mut self, enabled: bool) -> Self {
        self.deep_scan = enabled;
        self
    }

    /// Reject a timeout outside the engine's supported range.
    pub fn validate(&self) -> std::result::Result<(), ValidationError> {
        if !(MIN_SCAN_TIMEOUT..=MAX_SCAN_TIMEOUT).contains(&self.scan_timeout) {
            return Err(ValidationError::OutOfRange {
                field: "scanTimeout",
                value: i64::from(self.scan_timeout),
                min: i64::from(MIN_SCAN_TIMEOUT),
                max: i64::from(MAX_SCAN_TIMEOUT),
            });
        }
        Ok(())
    }
}
