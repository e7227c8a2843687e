//! AI provider credentials with saved and pending slots
//!
//! Each provider has a `saved` secret (last value the engine accepted) and a
//! `pending` edit. Saving commits pending to saved only after the engine
//! confirms; a failed save keeps the edit. Saves for one provider are
//! serialized; key tests never touch local state and may run at any time.

use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, Mutex as StdMutex, MutexGuard, PoisonError};

use log::{debug, info};
use tokio::sync::Mutex;

use crate::client::WatchdogApi;
use crate::client::models::BUILTIN_PROVIDERS;
use crate::error::{Result, ValidationError};

/// Saved and pending secret for one provider
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialEntry {
    pub provider_key: String,
    pub display_name: String,
    /// Last secret committed through the engine
    pub saved: String,
    /// In-progress edit
    pub pending: String,
    /// Show the secret in clear text. Never persisted.
    pub visible: bool,
    pub endpoint: Option<String>,
    pub description: Option<String>,
    /// Added by the user rather than shipped with the engine
    pub custom: bool,
}

impl CredentialEntry {
    fn new(provider_key: &str, display_name: &str) -> Self {
        Self {
            provider_key: provider_key.to_string(),
            display_name: display_name.to_string(),
            saved: String::new(),
            pending: String::new(),
            visible: false,
            endpoint: None,
            description: None,
            custom: false,
        }
    }

    pub fn has_unsaved_change(&self) -> bool {
        self.pending != self.saved
    }

    pub fn is_configured(&self) -> bool {
        !self.saved.is_empty()
    }

    /// Saved secret for display: clear text when visible, otherwise masked.
    pub fn display_value(&self) -> String {
        if self.visible {
            self.saved.clone()
        } else {
            mask_secret(&self.saved)
        }
    }
}

/// Mask a secret for display.
///
/// Keeps the first and last four characters of secrets longer than eight
/// characters. Shorter secrets become `****`; empty stays empty.
pub fn mask_secret(secret: &str) -> String {
    let chars: Vec<char> = secret.chars().collect();
    match chars.len() {
        0 => String::new(),
        n if n > 8 => {
            let head: String = chars[..4].iter().collect();
            let tail: String = chars[n - 4..].iter().collect();
            format!("{}...{}", head, tail)
        }
        _ => "****".to_string(),
    }
}

/// Derive a provider key from a display name.
///
/// `"My Custom  AI"` becomes `my_custom_ai`.
pub fn provider_key(display_name: &str) -> String {
    display_name
        .trim()
        .to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("_")
}

/// Provider credential state, keyed by provider key
pub struct CredentialManager<C> {
    client: Arc<C>,
    entries: StdMutex<BTreeMap<String, CredentialEntry>>,
    save_locks: StdMutex<HashMap<String, Arc<Mutex<()>>>>,
}

impl<C: WatchdogApi> CredentialManager<C> {
    /// Create a manager holding the built-in providers with empty slots.
    pub fn new(client: Arc<C>) -> Self {
        let entries = BUILTIN_PROVIDERS
            .iter()
            .map(|(key, name)| (key.to_string(), CredentialEntry::new(key, name)))
            .collect();
        Self {
            client,
            entries: StdMutex::new(entries),
            save_locks: StdMutex::new(HashMap::new()),
        }
    }

    fn entries(&self) -> MutexGuard<'_, BTreeMap<String, CredentialEntry>> {
        self.entries.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn save_lock(&self, provider: &str) -> Arc<Mutex<()>> {
        let mut locks = self.save_locks.lock().unwrap_or_else(PoisonError::into_inner);
        locks.entry(provider.to_string()).or_default().clone()
    }

    /// Reload saved secrets from the engine.
    ///
    /// Providers the engine reports with a secret but this manager does not
    /// know yet are added as custom providers. Unsaved edits survive the
    /// reload.
    pub async fn load(&self) -> Result<()> {
        let keys = self.client.get_api_keys().await?;
        debug!("Engine reported keys for {} provider(s)", keys.len());

        let mut entries = self.entries();
        for (provider, secret) in keys {
            if secret.is_empty() && !entries.contains_key(&provider) {
                continue;
            }
            let entry = entries.entry(provider.clone()).or_insert_with(|| {
                let mut entry = CredentialEntry::new(&provider, &provider);
                entry.custom = true;
                entry
            });
            if !entry.has_unsaved_change() {
                entry.pending = secret.clone();
            }
            entry.saved = secret;
        }
        Ok(())
    }

    /// All entries, ordered by provider key.
    pub fn entries_snapshot(&self) -> Vec<CredentialEntry> {
        self.entries().values().cloned().collect()
    }

    pub fn get(&self, provider: &str) -> Option<CredentialEntry> {
        self.entries().get(provider).cloned()
    }

    pub fn has_unsaved_change(&self, provider: &str) -> bool {
        self.entries()
            .get(provider)
            .is_some_and(CredentialEntry::has_unsaved_change)
    }

    /// Replace the pending edit for a provider.
    pub fn set_pending(&self, provider: &str, value: impl Into<String>) -> Result<()> {
        let mut entries = self.entries();
        let entry = entries
            .get_mut(provider)
            .ok_or_else(|| ValidationError::UnknownProvider(provider.to_string()))?;
        entry.pending = value.into();
        Ok(())
    }

    /// Flip clear-text display. Returns the new visibility.
    pub fn toggle_visibility(&self, provider: &str) -> Result<bool> {
        let mut entries = self.entries();
        let entry = entries
            .get_mut(provider)
            .ok_or_else(|| ValidationError::UnknownProvider(provider.to_string()))?;
        entry.visible = !entry.visible;
        Ok(entry.visible)
    }

    /// Commit the pending edit through the engine.
    ///
    /// A second save for the same provider waits for the first to finish.
    /// On failure `saved` and `pending` are left as they were.
    pub async fn save(&self, provider: &str) -> Result<()> {
        let lock = self.save_lock(provider);
        let _guard = lock.lock().await;

        let value = self
            .get(provider)
            .map(|e| e.pending)
            .ok_or_else(|| ValidationError::UnknownProvider(provider.to_string()))?;

        self.client.save_api_key(provider, &value).await?;

        if let Some(entry) = self.entries().get_mut(provider) {
            entry.saved = value;
        }
        info!("Saved API key for {}", provider);
        Ok(())
    }

    /// Check a secret against the engine without changing local state.
    pub async fn test(&self, provider: &str, value: &str) -> Result<bool> {
        if !self.entries().contains_key(provider) {
            return Err(ValidationError::UnknownProvider(provider.to_string()).into());
        }
        if value.trim().is_empty() {
            return Err(ValidationError::MissingField("API key").into());
        }
        let valid = self.client.test_api_key(provider, value).await?;
        debug!("Key test for {}: valid={}", provider, valid);
        Ok(valid)
    }

    /// Test the pending edit for a provider.
    pub async fn test_pending(&self, provider: &str) -> Result<bool> {
        let value = self
            .get(provider)
            .map(|e| e.pending)
            .ok_or_else(|| ValidationError::UnknownProvider(provider.to_string()))?;
        self.test(provider, &value).await
    }

    /// Register a custom provider. Returns its derived key.
    pub fn add_custom(
        &self,
        name: &str,
        endpoint: &str,
        description: Option<&str>,
    ) -> Result<String> {
        let name = name.trim();
        let endpoint = endpoint.trim();
        if name.is_empty() {
            return Err(ValidationError::MissingField("Provider name").into());
        }
        if endpoint.is_empty() {
            return Err(ValidationError::MissingField("Endpoint").into());
        }
        url::Url::parse(endpoint).map_err(ValidationError::from)?;

        let key = provider_key(name);
        let mut entries = self.entries();
        if entries.contains_key(&key) {
            return Err(ValidationError::DuplicateProvider(key).into());
        }

        let mut entry = CredentialEntry::new(&key, name);
        entry.endpoint = Some(endpoint.to_string());
        entry.description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        entry.custom = true;
        entries.insert(key.clone(), entry);

        info!("Added custom provider {}", key);
        Ok(key)
    }

    /// Remove a custom provider. Built-in providers cannot be removed.
    pub fn remove_custom(&self, provider: &str) -> Result<CredentialEntry> {
        let mut entries = self.entries();
        match entries.get(provider).map(|e| e.custom) {
            Some(true) => {}
            Some(false) => return Err(ValidationError::BuiltinProvider(provider.to_string()).into()),
            None => return Err(ValidationError::UnknownProvider(provider.to_string()).into()),
        }
        let removed = entries
            .remove(provider)
            .ok_or_else(|| ValidationError::UnknownProvider(provider.to_string()))?;
        info!("Removed custom provider {}", provider);
        Ok(removed)
    }
}
