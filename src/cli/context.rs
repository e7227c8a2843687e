//! Command execution context
//!
//! Resolves configuration once and hands commands the engine client, the
//! shared session store and the effective output format.

use std::sync::Arc;

use log::debug;

use crate::cli::OutputFormat;
use crate::cli::args::GlobalOptions;
use crate::client::WatchdogClient;
use crate::config::Config;
use crate::credentials::CredentialManager;
use crate::dashboard::Dashboard;
use crate::error::Result;
use crate::history::HistoryEngine;
use crate::session::SessionManager;
use crate::settings::SettingsDraft;
use crate::store::SessionStore;

/// Context for command execution containing config, client, and runtime options.
pub struct CommandContext {
    /// Loaded configuration with CLI overrides applied
    pub config: Config,
    /// Engine client (Arc-wrapped for concurrent requests)
    pub client: Arc<WatchdogClient>,
    /// Scan collection shared by the session manager and history engine
    pub store: SessionStore,
    /// Output format preference
    pub format: OutputFormat,
}

impl CommandContext {
    /// Create a new command context.
    ///
    /// A missing config file is not an error; the engine runs locally and
    /// defaults apply.
    ///
    /// # Errors
    /// Returns error if the config file is invalid or the engine URL does
    /// not parse.
    pub fn new(opts: &GlobalOptions) -> Result<Self> {
        let mut config = Config::load_or_default_at(opts.config_ref())?;

        if let Some(url) = opts.api_url_ref() {
            config.api_url = Some(url.to_string());
            config.validate()?;
        }

        let format = resolve_format(opts.format, &config);
        debug!("Using engine at {} (format {:?})", config.api_url(), format);

        let client = Arc::new(WatchdogClient::new(
            config.api_url(),
            config.api_token.clone(),
        )?);

        Ok(Self {
            config,
            client,
            store: SessionStore::new(),
            format,
        })
    }

    pub fn sessions(&self) -> SessionManager<WatchdogClient> {
        SessionManager::with_poll_interval(
            self.client.clone(),
            self.store.clone(),
            self.config.poll_interval(),
        )
    }

    pub fn history(&self) -> HistoryEngine<WatchdogClient> {
        HistoryEngine::new(self.client.clone(), self.store.clone())
            .delete_concurrency(self.config.preferences.delete_concurrency)
    }

    pub fn credentials(&self) -> CredentialManager<WatchdogClient> {
        CredentialManager::new(self.client.clone())
    }

    pub fn settings(&self) -> SettingsDraft<WatchdogClient> {
        SettingsDraft::new(self.client.clone())
    }

    pub fn dashboard(&self) -> Dashboard<WatchdogClient> {
        Dashboard::new(self.client.clone(), self.store.clone())
    }
}

/// Flag or env first, then the config file preference, then the default.
///
/// An unparseable file preference falls back to the default.
pub fn resolve_format(flag: Option<OutputFormat>, config: &Config) -> OutputFormat {
    flag.or_else(|| {
        config
            .preferences
            .format
            .as_deref()
            .and_then(|f| f.parse().ok())
    })
    .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Preferences;

    fn config_with_format(format: Option<&str>) -> Config {
        Config {
            preferences: Preferences {
                format: format.map(str::to_string),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn test_format_precedence() {
        let config = config_with_format(Some("json"));
        assert_eq!(
            resolve_format(Some(OutputFormat::Pretty), &config),
            OutputFormat::Pretty
        );
        assert_eq!(resolve_format(None, &config), OutputFormat::Json);
        assert_eq!(
            resolve_format(None, &config_with_format(None)),
            OutputFormat::Table
        );
        assert_eq!(
            resolve_format(None, &config_with_format(Some("yaml"))),
            OutputFormat::Table
        );
    }

    #[test]
    fn test_api_url_override() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("config.yaml");
        let opts = GlobalOptions {
            format: None,
            config: Some(path.to_string_lossy().into_owned()),
            api_url: Some("http://10.1.1.1:9000/api/v1".to_string()),
        };

        let ctx = CommandContext::new(&opts).unwrap();
        assert_eq!(ctx.client.base_url(), "http://10.1.1.1:9000/api/v1");
    }

    #[test]
    fn test_invalid_api_url_override() {
        let opts = GlobalOptions {
            api_url: Some("not a url".to_string()),
            config: Some("/nonexistent/watchdog.yaml".to_string()),
            ..Default::default()
        };
        assert!(CommandContext::new(&opts).is_err());
    }
}
