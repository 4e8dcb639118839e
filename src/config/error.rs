//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid service base URL: {0}")]
    InvalidBaseUrl(String),

    #[error("Invalid {field}: {value}s is outside 1..=3600")]
    InvalidTimeout { field: &'static str, value: u64 },

    #[error("Maximum ad file size must be greater than zero")]
    InvalidFileLimit,

    #[error("Invalid log level: {0}")]
    InvalidLogLevel(String),
}
