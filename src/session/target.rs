//! Scan target validation

use url::Url;

use crate::error::ValidationError;

/// Validate a user-entered scan target and coerce bare hosts to HTTPS.
///
/// `example.com` becomes `https://example.com`; anything that already
/// carries a scheme must use http or https and name a host. The returned
/// string keeps the user's spelling apart from the added prefix.
pub fn normalize_target(input: &str) -> std::result::Result<String, ValidationError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTarget);
    }

    let candidate = if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("https://{}", trimmed)
    };

    let url = Url::parse(&candidate)?;
    match url.scheme() {
        "http" | "https" => {}
        other => return Err(ValidationError::UnsupportedScheme(other.to_string())),
    }

    match url.host_str() {
        Some(host) if !host.is_empty() => Ok(candidate),
        _ => Err(ValidationError::InvalidUrl(candidate)),
    }
}
