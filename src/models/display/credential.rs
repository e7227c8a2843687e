//! Provider credential display models

use serde::Serialize;
use tabled::Tabled;

use super::common::or_dash;
use crate::credentials::CredentialEntry;

/// Credential row for `keys list`.
///
/// Only the masked (or explicitly revealed) secret is carried, so JSON
/// output never leaks a hidden key.
#[derive(Debug, Clone, Tabled, Serialize)]
pub struct CredentialDisplay {
    #[tabled(rename = "PROVIDER")]
    pub provider: String,

    #[tabled(rename = "NAME")]
    pub name: String,

    #[tabled(rename = "KEY")]
    pub key: String,

    #[tabled(rename = "STATUS")]
    pub status: String,

    #[tabled(rename = "ENDPOINT")]
    pub endpoint: String,
}

impl From<&CredentialEntry> for CredentialDisplay {
    fn from(entry: &CredentialEntry) -> Self {
        let status = if entry.has_unsaved_change() {
            "unsaved changes"
        } else if entry.is_configured() {
            "saved"
        } else {
            "not set"
        };

        Self {
            provider: entry.provider_key.clone(),
            name: entry.display_name.clone(),
            key: or_dash(Some(&entry.display_value())),
            status: status.to_string(),
            endpoint: or_dash(entry.endpoint.as_deref()),
        }
    }
}
