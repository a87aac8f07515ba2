//! Platform-backed auth provider.
//!
//! Resolves bearer tokens by calling the platform's `/api/auth/me` with the
//! caller's token. The platform owns sessions; this service never decodes
//! tokens locally.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;

use crate::domain::billing::SubscriberRole;
use crate::ports::{AuthError, AuthProvider, CurrentUser};

/// Auth provider over the platform's session endpoint.
pub struct PlatformAuthProvider {
    base_url: String,
    client: Client,
}

impl PlatformAuthProvider {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(10))
            .build()
            .expect("Failed to create HTTP client");

        Self {
            base_url: base_url.into(),
            client,
        }
    }

    fn me_url(&self) -> String {
        format!("{}/api/auth/me", self.base_url.trim_end_matches('/'))
    }
}

#[derive(Debug, Deserialize)]
struct MeResponse {
    id: String,
    email: String,
    #[serde(default)]
    full_name: Option<String>,
    #[serde(default)]
    role: SubscriberRole,
}

#[async_trait]
impl AuthProvider for PlatformAuthProvider {
    async fn authenticate(&self, bearer_token: &str) -> Result<CurrentUser, AuthError> {
        let response = self
            .client
            .get(self.me_url())
            .bearer_auth(bearer_token)
            .send()
            .await
            .map_err(|e| AuthError::Unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(AuthError::Unauthenticated)
            }
            status if !status.is_success() => {
                return Err(AuthError::Unavailable(format!(
                    "auth endpoint returned {status}"
                )))
            }
            _ => {}
        }

        let me: MeResponse = response
            .json()
            .await
            .map_err(|e| AuthError::Unavailable(format!("invalid auth response: {e}")))?;

        Ok(CurrentUser {
            id: me.id,
            email: me.email,
            full_name: me.full_name,
            role: me.role,
        })
    }
}
