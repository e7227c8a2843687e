//! Settings API trait

use async_trait::async_trait;

use crate::client::models::{AppConfig, AppConfigUpdate, ProviderKeys};
use crate::error::Result;

/// Provider key and configuration operations
#[async_trait]
pub trait SettingsApi: Send + Sync {
    // ========================================================================
    // Provider keys
    // ========================================================================

    /// Stored keys for every provider the engine knows about
    async fn get_api_keys(&self) -> Result<ProviderKeys>;

    /// Persist a key for one provider
    async fn save_api_key(&self, provider: &str, key: &str) -> Result<()>;

    /// Check a key against its provider without storing it
    async fn test_api_key(&self, provider: &str, key: &str) -> Result<bool>;

    // ========================================================================
    // Application configuration
    // ========================================================================

    async fn get_config(&self) -> Result<AppConfig>;

    /// Apply a partial update and return the resulting configuration
    async fn update_config(&self, update: &AppConfigUpdate) -> Result<AppConfig>;
}
