//! AI provider credential models

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Provider key to stored secret, as returned by `GetAPIKeys`
pub type ProviderKeys = BTreeMap<String, String>;

/// Built-in AI providers, in display order
pub const BUILTIN_PROVIDERS: [(&str, &str); 3] = [
    ("openai", "OpenAI"),
    ("gemini", "Google Gemini"),
    ("claude", "Anthropic Claude"),
];

/// Body sent with `SaveAPIKey` and `TestAPIKey`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct KeyRequest {
    pub key: String,
}

/// Response from `TestAPIKey`
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct KeyTestResponse {
    pub valid: bool,
}
