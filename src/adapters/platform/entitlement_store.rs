//! Platform-backed entitlement store.
//!
//! Implements the `EntitlementStore` port against the platform's user API
//! using a service-role key. The platform exposes lookup by email and a
//! partial-update PATCH on the user record.
//!
//! The platform API has no conditional update, so the idempotency check here
//! is read-then-write rather than a single atomic operation. The window
//! between check and write is narrow and a lost race only rewrites the same
//! four fields with equivalent values from the same charge; the in-memory
//! store used in tests performs the check and write under one lock, which is
//! the contract backends should meet where they can.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;

use crate::domain::billing::{EntitlementUpdate, Subscriber};
use crate::ports::{ApplyOutcome, EntitlementStore, StoreError};

/// Configuration for the platform store adapter.
#[derive(Debug, Clone)]
pub struct PlatformStoreConfig {
    /// Platform API base URL.
    pub base_url: String,

    /// Service-role key with read/write access to user records.
    pub service_role_key: SecretString,

    /// Request timeout.
    pub timeout: Duration,
}

impl PlatformStoreConfig {
    pub fn new(base_url: impl Into<String>, service_role_key: SecretString) -> Self {
        Self {
            base_url: base_url.into(),
            service_role_key,
            timeout: Duration::from_secs(15),
        }
    }
}

/// Entitlement store over the platform's user API.
pub struct PlatformEntitlementStore {
    config: PlatformStoreConfig,
    client: Client,
}

impl PlatformEntitlementStore {
    pub fn new(config: PlatformStoreConfig) -> Self {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .expect("Failed to create HTTP client");

        Self { config, client }
    }

    fn users_url(&self) -> String {
        format!(
            "{}/api/entities/User",
            self.config.base_url.trim_end_matches('/')
        )
    }

    fn user_url(&self, id: &str) -> String {
        format!("{}/{}", self.users_url(), id)
    }

    fn key(&self) -> &str {
        self.config.service_role_key.expose_secret()
    }
}

/// PATCH body for the entitlement write. Status is always `active`; the
/// platform stores whatever strings we send, so field names match the
/// subscriber schema exactly.
#[derive(Debug, Serialize)]
struct EntitlementPatch<'a> {
    subscription_status: &'static str,
    subscription_plan: &'a str,
    subscription_expires_at: String,
    last_payment_reference: &'a str,
}

#[async_trait]
impl EntitlementStore for PlatformEntitlementStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError> {
        let response = self
            .client
            .get(self.users_url())
            .bearer_auth(self.key())
            .query(&[("email", email)])
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "user lookup returned {}",
                response.status()
            )));
        }

        let matches: Vec<Subscriber> = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        // The platform matches email exactly; a list of 0 or 1 comes back
        Ok(matches.into_iter().next())
    }

    async fn apply_entitlement(
        &self,
        subscriber_id: &str,
        update: &EntitlementUpdate,
    ) -> Result<ApplyOutcome, StoreError> {
        // Re-read by id so the duplicate check sees the latest write
        let response = self
            .client
            .get(self.user_url(subscriber_id))
            .bearer_auth(self.key())
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Err(StoreError::InvalidResponse(format!(
                "subscriber {subscriber_id} vanished between lookup and update"
            )));
        }
        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "user fetch returned {}",
                response.status()
            )));
        }

        let current: Subscriber = response
            .json()
            .await
            .map_err(|e| StoreError::InvalidResponse(e.to_string()))?;

        if current.last_payment_reference.as_deref() == Some(update.payment_reference.as_str()) {
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        let patch = EntitlementPatch {
            subscription_status: "active",
            subscription_plan: update.plan.as_str(),
            subscription_expires_at: update.expires_at.to_rfc3339(),
            last_payment_reference: &update.payment_reference,
        };

        let response = self
            .client
            .patch(self.user_url(subscriber_id))
            .bearer_auth(self.key())
            .json(&patch)
            .send()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;

        if !response.status().is_success() {
            return Err(StoreError::Unavailable(format!(
                "entitlement update returned {}",
                response.status()
            )));
        }

        Ok(ApplyOutcome::Applied)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::billing::SubscriptionPlan;
    use chrono::{TimeZone, Utc};

    fn store() -> PlatformEntitlementStore {
        PlatformEntitlementStore::new(PlatformStoreConfig::new(
            "https://platform.test/",
            SecretString::new("srk_test".to_string()),
        ))
    }

    #[test]
    fn urls_strip_trailing_slash() {
        let store = store();
        assert_eq!(store.users_url(), "https://platform.test/api/entities/User");
        assert_eq!(
            store.user_url("usr_9"),
            "https://platform.test/api/entities/User/usr_9"
        );
    }

    #[test]
    fn patch_body_writes_all_four_fields() {
        let update = EntitlementUpdate {
            plan: SubscriptionPlan::SixMonths,
            expires_at: Utc.with_ymd_and_hms(2024, 9, 1, 0, 0, 0).unwrap(),
            payment_reference: "SUB_6months_1_usr_1".to_string(),
        };
        let patch = EntitlementPatch {
            subscription_status: "active",
            subscription_plan: update.plan.as_str(),
            subscription_expires_at: update.expires_at.to_rfc3339(),
            last_payment_reference: &update.payment_reference,
        };

        let json = serde_json::to_value(&patch).unwrap();
        assert_eq!(json["subscription_status"], "active");
        assert_eq!(json["subscription_plan"], "6months");
        assert_eq!(json["subscription_expires_at"], "2024-09-01T00:00:00+00:00");
        assert_eq!(json["last_payment_reference"], "SUB_6months_1_usr_1");
    }
}
