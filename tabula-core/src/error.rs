//! Error types for the Tabula core library.
//!
//! Uses `thiserror` for public API error types with structured variants
//! covering configuration, suggestion-fetch, and weather-fetch domains.
//!
//! Note that query resolution is deliberately infallible: every input string
//! resolves to some [`crate::query::QueryDescriptor`] variant, so the
//! resolver has no error type at all.

use std::path::PathBuf;

/// Top-level error type for the Tabula core library.
#[derive(Debug, thiserror::Error)]
pub enum TabulaError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Suggestion error: {0}")]
    Suggest(#[from] SuggestError),

    #[error("Weather error: {0}")]
    Weather(#[from] WeatherError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors from the configuration system and registry validation.
///
/// Registry defects (duplicate keys, bad aliases) are surfaced here because
/// they are configuration-time problems: the registry is validated once at
/// load and never re-checked at query time.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Configuration parse error: {message}")]
    ParseError { message: String },

    #[error("Duplicate command key: {key}")]
    DuplicateKey { key: String },

    #[error("Command '{key}' has neither a url nor an alias")]
    MissingUrl { key: String },

    #[error("Command '{key}' aliases unknown key '{target}'")]
    UnknownAlias { key: String, target: String },

    #[error("Alias cycle detected starting at command '{key}'")]
    AliasCycle { key: String },

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },
}

/// Errors from the remote autocomplete service.
///
/// These never reach the user: the suggestion engine degrades to an empty
/// remote set and renders whatever static suggestions it has.
#[derive(Debug, thiserror::Error)]
pub enum SuggestError {
    #[error("Autocomplete request failed: {message}")]
    Request { message: String },

    #[error("Autocomplete payload malformed: {message}")]
    Payload { message: String },
}

/// Errors from the weather service.
#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("Weather request failed: {message}")]
    Request { message: String },

    #[error("Weather payload malformed: {message}")]
    Payload { message: String },
}

/// A type alias for results using the top-level `TabulaError`.
pub type Result<T> = std::result::Result<T, TabulaError>;
