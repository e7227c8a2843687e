//! Configuration management for Watchdog

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::client::DEFAULT_API_URL;
use crate::client::parallel::DEFAULT_BATCH_CONCURRENCY;
use crate::error::{ConfigError, Result};

/// Client configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Scan engine API base URL
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_url: Option<String>,

    /// Bearer token for engines that require one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_token: Option<String>,

    /// User preferences
    #[serde(default)]
    pub preferences: Preferences,
}

/// User preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Preferences {
    /// Default output format
    #[serde(skip_serializing_if = "Option::is_none")]
    pub format: Option<String>,

    /// Interval between status polls while watching a scan
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,

    /// Maximum concurrent delete calls in bulk deletes
    #[serde(default = "default_delete_concurrency")]
    pub delete_concurrency: usize,
}

fn default_poll_interval_ms() -> u64 {
    2000
}

fn default_delete_concurrency() -> usize {
    DEFAULT_BATCH_CONCURRENCY
}

impl Default for Preferences {
    fn default() -> Self {
        Self {
            format: None,
            poll_interval_ms: default_poll_interval_ms(),
            delete_concurrency: default_delete_concurrency(),
        }
    }
}

impl Config {
    /// Get the default config file path
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir().ok_or(ConfigError::Invalid(
            "Could not determine home directory".to_string(),
        ))?;

        Ok(home.join(".watchdog").join("config.yaml"))
    }

    /// Resolve an explicit path, falling back to the default location
    pub fn resolve_path(path: Option<&str>) -> Result<PathBuf> {
        match path {
            Some(p) => Ok(PathBuf::from(p)),
            None => Self::default_path(),
        }
    }

    /// Load configuration, using defaults when no file exists yet
    pub fn load_or_default_at(path: Option<&str>) -> Result<Self> {
        let path = Self::resolve_path(path)?;
        if !path.exists() {
            log::debug!("No config at {}, using defaults", path.display());
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load configuration from a specific path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(ConfigError::NotFound.into());
        }

        let contents = std::fs::read_to_string(path)?;
        let config: Config = serde_yaml::from_str(&contents).map_err(ConfigError::from)?;
        config.validate()?;

        Ok(config)
    }

    /// Save configuration to `path` (or the default location)
    pub fn save_at(&self, path: Option<&str>) -> Result<PathBuf> {
        let path = Self::resolve_path(path)?;
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save configuration to a specific path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let contents =
            serde_yaml::to_string(self).map_err(|e| ConfigError::SaveError(e.to_string()))?;

        std::fs::write(path, contents)?;

        // The file may hold an API token
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            let mut perms = std::fs::metadata(path)?.permissions();
            perms.set_mode(0o600);
            std::fs::set_permissions(path, perms)?;
        }

        Ok(())
    }

    /// Check values the client depends on
    pub fn validate(&self) -> Result<()> {
        if let Some(url) = &self.api_url {
            url::Url::parse(url)
                .map_err(|e| ConfigError::Invalid(format!("api_url `{}`: {}", url, e)))?;
        }
        if self.preferences.poll_interval_ms < 100 {
            return Err(ConfigError::Invalid(
                "poll_interval_ms must be at least 100".to_string(),
            )
            .into());
        }
        if self.preferences.delete_concurrency == 0 {
            return Err(
                ConfigError::Invalid("delete_concurrency must be at least 1".to_string()).into(),
            );
        }
        Ok(())
    }

    /// Engine URL from the file, or the local default
    pub fn api_url(&self) -> &str {
        self.api_url.as_deref().unwrap_or(DEFAULT_API_URL)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.preferences.poll_interval_ms)
    }
}
