//! Korapay adapter for hosted checkout.
//!
//! Implements the `PaymentGateway` port against Korapay's charge API. One
//! call matters here: `POST /merchant/api/v1/charges/initialize`, which
//! returns the hosted checkout URL. Settlement arrives later on the webhook
//! path, signed with the merchant webhook secret.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::ports::{CreateChargeRequest, GatewayError, HostedCheckout, PaymentGateway};

/// Configuration for the Korapay adapter.
#[derive(Debug, Clone)]
pub struct KorapayConfig {
    /// Secret key, sent as a bearer token on every API call.
    pub secret_key: SecretString,

    /// Base URL (default: https://api.korapay.com).
    pub base_url: String,

    /// Request timeout.
    pub timeout: Duration,
}

impl KorapayConfig {
    pub fn new(secret_key: SecretString) -> Self {
        Self {
            secret_key,
            base_url: "https://api.korapay.com".to_string(),
            timeout: Duration::from_secs(30),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

/// Korapay charge API adapter.
pub struct KorapayGateway {
    config: KorapayConfig,
    client: Client,
}

impl KorapayGateway {
    pub fn new(config: KorapayConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn initialize_url(&self) -> String {
        format!(
            "{}/merchant/api/v1/charges/initialize",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

/// Korapay's response envelope: `status` is a boolean, failures carry the
/// reason in `message`.
#[derive(Debug, Deserialize)]
struct KorapayResponse {
    #[serde(default)]
    status: bool,

    #[serde(default)]
    message: String,

    data: Option<KorapayChargeData>,
}

#[derive(Debug, Deserialize)]
struct KorapayChargeData {
    checkout_url: Option<String>,
}

#[async_trait]
impl PaymentGateway for KorapayGateway {
    async fn initialize_charge(
        &self,
        request: CreateChargeRequest,
    ) -> Result<HostedCheckout, GatewayError> {
        let reference = request.reference.clone();

        let response = self
            .client
            .post(self.initialize_url())
            .bearer_auth(self.config.secret_key.expose_secret())
            .json(&request)
            .send()
            .await
            .map_err(|e| GatewayError::Unreachable(e.to_string()))?;

        let body: KorapayResponse = response
            .json()
            .await
            .map_err(|e| GatewayError::Unreachable(format!("invalid gateway response: {e}")))?;

        if !body.status {
            // Pass the gateway's reason through untouched
            return Err(GatewayError::Rejected(body.message));
        }

        let checkout_url = body
            .data
            .and_then(|d| d.checkout_url)
            .ok_or_else(|| GatewayError::Rejected("no checkout URL in response".to_string()))?;

        Ok(HostedCheckout {
            checkout_url,
            reference,
        })
    }
}
