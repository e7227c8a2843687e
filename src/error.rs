//! Error types for the Watchdog client

use std::fmt;
use std::time::Duration;
use thiserror::Error;

/// Result type alias for Watchdog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for the application
#[derive(Debug, Error)]
pub enum Error {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Batch(#[from] BatchError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("Interactive prompt error: {0}")]
    Dialoguer(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl From<dialoguer::Error> for Error {
    fn from(err: dialoguer::Error) -> Self {
        Error::Dialoguer(err.to_string())
    }
}

/// Errors returned by the remote scan gateway.
///
/// Local state is left at its last-known-good value whenever one of these
/// is returned from a core operation.
#[derive(Debug, Clone, Error)]
pub enum ApiError {
    #[error("Authentication failed. Run `watchdog init` to configure an API token.")]
    Unauthorized,

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Rate limit exceeded. Retry after {0:?}")]
    RateLimit(Duration),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Server error: {0}")]
    ServerError(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Invalid API response: {0}")]
    InvalidResponse(String),

    #[error("{0}")]
    Remote(String),
}

impl From<reqwest::Error> for ApiError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Network("Request timed out".to_string())
        } else if err.is_connect() {
            ApiError::Network("Failed to connect to scan engine".to_string())
        } else {
            ApiError::Network(err.to_string())
        }
    }
}

/// Input rejected before any remote call is made
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("URL is required")]
    EmptyTarget,

    #[error("Please enter a valid URL: {0}")]
    InvalidUrl(String),

    #[error("Only HTTP and HTTPS URLs are supported (got `{0}`)")]
    UnsupportedScheme(String),

    #[error("{field} must be between {min} and {max} (got {value})")]
    OutOfRange {
        field: &'static str,
        value: i64,
        min: i64,
        max: i64,
    },

    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("Scan {id} is {status}; {action} is not allowed")]
    InvalidState {
        id: String,
        status: String,
        action: &'static str,
    },

    #[error("Unknown scan: {0}")]
    UnknownSession(String),

    #[error("Invalid setting {0}")]
    InvalidSetting(String),

    #[error("The key for {0} was rejected")]
    InvalidKey(String),

    #[error("Unknown provider: {0}")]
    UnknownProvider(String),

    #[error("A provider with key `{0}` already exists")]
    DuplicateProvider(String),

    #[error("Built-in provider `{0}` cannot be removed")]
    BuiltinProvider(String),
}

impl From<url::ParseError> for ValidationError {
    fn from(err: url::ParseError) -> Self {
        ValidationError::InvalidUrl(err.to_string())
    }
}

/// A single failed item in a batch operation
#[derive(Debug, Clone)]
pub struct BatchFailure {
    /// Item ID that failed
    pub id: String,
    /// Human-readable failure reason
    pub reason: String,
}

/// Bulk operation that completed for only part of its items
#[derive(Debug, Clone, Error)]
pub struct BatchError {
    /// IDs that succeeded
    pub succeeded: Vec<String>,
    /// IDs that failed, with reasons
    pub failed: Vec<BatchFailure>,
}

impl fmt::Display for BatchError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let total = self.succeeded.len() + self.failed.len();
        write!(
            f,
            "{} of {} item(s) failed:",
            self.failed.len(),
            total
        )?;
        for failure in &self.failed {
            write!(f, " {} ({});", failure.id, failure.reason)?;
        }
        Ok(())
    }
}

/// Configuration-related errors
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration file not found. Run `watchdog init` to set up.")]
    NotFound,

    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to save configuration: {0}")]
    SaveError(String),
}

impl From<serde_yaml::Error> for ConfigError {
    fn from(err: serde_yaml::Error) -> Self {
        ConfigError::ParseError(err.to_string())
    }
}
