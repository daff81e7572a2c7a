//! Error hierarchy for Banter.

use thiserror::Error;

/// Errors from calls to the model sidecar (generation, tokenization,
/// content and quality classifiers).
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error("Rate limited (retry after {retry_after_ms:?}ms)")]
    RateLimited { retry_after_ms: Option<u64> },

    #[error("Model backend overloaded")]
    Overloaded,

    #[error("Server error: {status} {message}")]
    Server { status: u16, message: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Request timeout")]
    Timeout,

    #[error("Response decode error: {0}")]
    Decode(String),
}

/// Errors from the chat transport.
#[derive(Debug, Error)]
pub enum TransportError {
    #[error("Bot API error {code}: {description}")]
    Api { code: i64, description: String },

    #[error("Network error: {0}")]
    Network(String),

    #[error("Response decode error: {0}")]
    Decode(String),
}

/// Errors from configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config file parse error at {path}: {message}")]
    Parse { path: String, message: String },

    #[error("Missing required configuration: {key}")]
    MissingKey { key: String },

    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },
}
