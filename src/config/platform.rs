//! Entity-store platform configuration

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Configuration for the hosted entity-store platform.
///
/// The platform owns user accounts and the entitlement fields on them; this
/// service talks to it over HTTP with a service-role key.
#[derive(Debug, Clone, Deserialize)]
pub struct PlatformConfig {
    /// Base URL of the platform API
    pub base_url: String,

    /// Service-role API key used for entitlement reads and writes
    pub service_role_key: SecretString,
}

impl PlatformConfig {
    /// Validate platform configuration
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.base_url.is_empty() {
            return Err(ValidationError::MissingRequired("PLATFORM_BASE_URL"));
        }
        if self.service_role_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("PLATFORM_SERVICE_ROLE_KEY"));
        }
        if *environment == Environment::Production && !self.base_url.starts_with("https://") {
            return Err(ValidationError::PlatformMustBeHttps);
        }
        Ok(())
    }
}
