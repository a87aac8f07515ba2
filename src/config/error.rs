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
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Platform base URL must use HTTPS in production")]
    PlatformMustBeHttps,

    #[error("Webhook shared secret is required in production")]
    WebhookSecretRequired,

    #[error("Poller interval must be non-zero")]
    InvalidPollInterval,

    #[error("Poller attempt budget must be non-zero")]
    InvalidPollBudget,
}
