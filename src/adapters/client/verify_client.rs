//! HTTP entitlement fetcher.
//!
//! Implements the poller's fetch port by calling the verify endpoint with the
//! user's own bearer token, so polling sees exactly what the client sees.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};

use crate::adapters::http::dto::VerifyResponse;
use crate::domain::billing::EntitlementView;
use crate::ports::{EntitlementFetcher, FetchError};

/// Fetcher over `GET /api/billing/verify`.
pub struct HttpEntitlementFetcher {
    base_url: String,
    bearer_token: SecretString,
    client: Client,
}

impl HttpEntitlementFetcher {
    pub fn new(base_url: impl Into<String>, bearer_token: SecretString) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into(),
            bearer_token,
            client,
        }
    }

    fn verify_url(&self) -> String {
        format!(
            "{}/api/billing/verify",
            self.base_url.trim_end_matches('/')
        )
    }
}

#[async_trait]
impl EntitlementFetcher for HttpEntitlementFetcher {
    async fn fetch_entitlement(&self) -> Result<EntitlementView, FetchError> {
        let response = self
            .client
            .get(self.verify_url())
            .bearer_auth(self.bearer_token.expose_secret())
            .send()
            .await
            .map_err(|e| FetchError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::OK => {}
            status => {
                return Err(FetchError::Unavailable(format!(
                    "verify endpoint returned {status}"
                )))
            }
        }

        let body: VerifyResponse = response
            .json()
            .await
            .map_err(|e| FetchError::InvalidResponse(e.to_string()))?;

        Ok(body.into_view())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_url_strips_trailing_slash() {
        let fetcher = HttpEntitlementFetcher::new(
            "https://vibeflix.app/",
            SecretString::new("token".to_string()),
        );
        assert_eq!(fetcher.verify_url(), "https://vibeflix.app/api/billing/verify");
    }
}
