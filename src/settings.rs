//! Remote application settings with staged edits
//!
//! Edits are staged locally and sent in one `UpdateConfig` call on commit.
//! A failed commit keeps the staged edits.

use std::sync::Arc;

use log::{debug, info};

use crate::client::WatchdogApi;
use crate::client::models::{AppConfig, AppConfigUpdate};
use crate::error::Result;

/// Saved engine configuration plus staged, uncommitted changes
pub struct SettingsDraft<C> {
    client: Arc<C>,
    saved: AppConfig,
    pending: AppConfigUpdate,
}

impl<C: WatchdogApi> SettingsDraft<C> {
    pub fn new(client: Arc<C>) -> Self {
        Self {
            client,
            saved: AppConfig::default(),
            pending: AppConfigUpdate::default(),
        }
    }

    /// Fetch the saved configuration. Staged edits are kept.
    pub async fn load(&mut self) -> Result<&AppConfig> {
        self.saved = self.client.get_config().await?;
        debug!("Loaded engine configuration");
        Ok(&self.saved)
    }

    pub fn saved(&self) -> &AppConfig {
        &self.saved
    }

    pub fn pending(&self) -> &AppConfigUpdate {
        &self.pending
    }

    pub fn has_changes(&self) -> bool {
        !self.pending.is_empty()
    }

    /// Stage an edit on top of any earlier staged edits.
    pub fn stage(&mut self, update: AppConfigUpdate) {
        self.pending.merge(update);
    }

    /// Drop staged edits.
    pub fn discard(&mut self) {
        self.pending = AppConfigUpdate::default();
    }

    /// The saved configuration with staged edits applied.
    pub fn preview(&self) -> AppConfig {
        let mut config = self.saved.clone();
        self.pending.apply_to(&mut config);
        config
    }

    /// Validate and send staged edits.
    ///
    /// On success the engine's returned configuration becomes the saved
    /// one and staged edits are cleared. Nothing to commit is a no-op.
    pub async fn commit(&mut self) -> Result<&AppConfig> {
        if !self.has_changes() {
            return Ok(&self.saved);
        }
        self.pending.validate()?;

        self.saved = self.client.update_config(&self.pending).await?;
        self.pending = AppConfigUpdate::default();
        info!("Updated engine configuration");
        Ok(&self.saved)
    }
}
