//! Payment gateway configuration (Korapay)

use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use super::error::ValidationError;
use super::server::Environment;

/// Payment gateway configuration.
///
/// The secret key authenticates outbound charge-initialization calls; the
/// public key is handed to the browser for the embedded checkout widget; the
/// webhook secret keys the HMAC signature check on inbound callbacks.
#[derive(Debug, Clone, Deserialize)]
pub struct GatewayConfig {
    /// Gateway secret API key (server-side only)
    pub secret_key: SecretString,

    /// Gateway public key (safe to embed client-side)
    #[serde(default)]
    pub public_key: String,

    /// Shared secret for webhook signature verification.
    ///
    /// When unset, signature verification is skipped. That fallback is only
    /// acceptable outside production and is refused by `validate()` there.
    pub webhook_secret: Option<SecretString>,

    /// Gateway API base URL (override for testing against a stub)
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,
}

impl GatewayConfig {
    /// Validate gateway configuration against the running environment
    pub fn validate(&self, environment: &Environment) -> Result<(), ValidationError> {
        if self.secret_key.expose_secret().is_empty() {
            return Err(ValidationError::MissingRequired("GATEWAY_SECRET_KEY"));
        }

        match &self.webhook_secret {
            Some(secret) if secret.expose_secret().is_empty() => {
                return Err(ValidationError::MissingRequired("GATEWAY_WEBHOOK_SECRET"));
            }
            None if *environment == Environment::Production => {
                return Err(ValidationError::WebhookSecretRequired);
            }
            _ => {}
        }

        Ok(())
    }

    /// True when webhook signatures will actually be enforced
    pub fn verifies_webhooks(&self) -> bool {
        self.webhook_secret.is_some()
    }
}

fn default_api_base_url() -> String {
    "https://api.korapay.com".to_string()
}
