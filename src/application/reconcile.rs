//! Webhook reconciliation.
//!
//! The single authority for entitlement activation. Pipeline order is fixed:
//! verify the signature over the raw bytes, parse, filter for settled
//! charges, extract fields, then look up and idempotently apply the update.
//! The gateway redelivers on non-2xx, so every response code here is chosen
//! with redelivery in mind.

use std::sync::Arc;

use chrono::Utc;

use crate::domain::billing::{
    ChargeEvent, EntitlementUpdate, SubscriptionPlan, WebhookError, WebhookVerifier,
};
use crate::ports::{ApplyOutcome, EntitlementStore, StoreError};

/// Outcome of reconciling one webhook delivery.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ReconcileOutcome {
    /// The entitlement was activated (or extended) by this delivery.
    Applied {
        email: String,
        plan: SubscriptionPlan,
        expires_at: chrono::DateTime<chrono::Utc>,
    },

    /// A redelivery of an already-applied reference; no state changed.
    AlreadyApplied,

    /// Not a settled charge; acknowledged without touching state.
    Ignored,
}

/// Handler that turns signed gateway deliveries into entitlement updates.
pub struct ReconcileChargeHandler {
    store: Arc<dyn EntitlementStore>,
    verifier: WebhookVerifier,
}

impl ReconcileChargeHandler {
    pub fn new(store: Arc<dyn EntitlementStore>, verifier: WebhookVerifier) -> Self {
        Self { store, verifier }
    }

    /// Reconciles one raw webhook delivery.
    ///
    /// `signature` is the value of the gateway's signature header, verified
    /// against the untouched body bytes before any parsing happens.
    ///
    /// # Errors
    ///
    /// Every variant of [`WebhookError`]; see its `status_code` mapping for
    /// what the gateway is told.
    pub async fn handle(
        &self,
        payload: &[u8],
        signature: Option<&str>,
    ) -> Result<ReconcileOutcome, WebhookError> {
        self.verifier.verify(payload, signature)?;

        let event = ChargeEvent::from_payload(payload)?;

        if !event.is_successful_charge() {
            tracing::debug!(event = %event.event, "ignoring non-settlement event");
            return Ok(ReconcileOutcome::Ignored);
        }

        let reference = event.reference()?;
        let email = event.subscriber_email()?;
        let plan = event.plan()?;
        let expires_at = plan.expires_from(Utc::now());

        let subscriber = self
            .store
            .find_by_email(email)
            .await
            .map_err(store_error)?
            .ok_or_else(|| {
                // A settled payment with no matching account: money was taken
                // and nobody got entitled. Loud log, terminal status.
                tracing::error!(
                    email = %email,
                    reference = %reference,
                    "payment settled for unknown subscriber"
                );
                WebhookError::SubscriberNotFound(email.to_string())
            })?;

        // Cheap pre-check; the store repeats it atomically with the write.
        if subscriber.last_payment_reference.as_deref() == Some(reference) {
            tracing::info!(
                email = %email,
                reference = %reference,
                "duplicate delivery, entitlement already applied"
            );
            return Ok(ReconcileOutcome::AlreadyApplied);
        }

        let update = EntitlementUpdate {
            plan,
            expires_at,
            payment_reference: reference.to_string(),
        };

        let outcome = self
            .store
            .apply_entitlement(&subscriber.id, &update)
            .await
            .map_err(store_error)?;

        match outcome {
            ApplyOutcome::Applied => {
                tracing::info!(
                    email = %email,
                    plan = %plan,
                    expires_at = %expires_at,
                    reference = %reference,
                    "entitlement activated"
                );
                Ok(ReconcileOutcome::Applied {
                    email: email.to_string(),
                    plan,
                    expires_at,
                })
            }
            ApplyOutcome::AlreadyApplied => Ok(ReconcileOutcome::AlreadyApplied),
        }
    }
}

fn store_error(err: StoreError) -> WebhookError {
    WebhookError::Store(err.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::platform::InMemoryEntitlementStore;
    use crate::domain::billing::{sign_payload, SubscriptionStatus};
    use secrecy::SecretString;
    use serde_json::json;

    const SECRET: &str = "whsec_reconcile_tests";

    fn handler(store: Arc<InMemoryEntitlementStore>) -> ReconcileChargeHandler {
        ReconcileChargeHandler::new(
            store,
            WebhookVerifier::new(Some(SecretString::new(SECRET.to_string()))),
        )
    }

    fn settled_charge(email: &str, plan: &str, reference: &str) -> Vec<u8> {
        serde_json::to_vec(&json!({
            "event": "charge.success",
            "data": {
                "status": "success",
                "reference": reference,
                "customer": { "name": "Viewer", "email": email },
                "metadata": { "userEmail": email, "plan": plan }
            }
        }))
        .unwrap()
    }

    async fn deliver(
        handler: &ReconcileChargeHandler,
        payload: &[u8],
    ) -> Result<ReconcileOutcome, WebhookError> {
        let signature = sign_payload(SECRET, payload);
        handler.handle(payload, Some(&signature)).await
    }

    // ══════════════════════════════════════════════════════════════
    // Activation Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn settled_charge_activates_entitlement() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        let handler = handler(store.clone());

        let payload = settled_charge("viewer@example.com", "monthly", "SUB_monthly_1_usr_1");
        let outcome = deliver(&handler, &payload).await.unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Applied { .. }));
        let subscriber = store.get("viewer@example.com").unwrap();
        assert_eq!(subscriber.subscription_status, SubscriptionStatus::Active);
        assert_eq!(subscriber.subscription_plan, Some(SubscriptionPlan::Monthly));
        assert_eq!(
            subscriber.last_payment_reference.as_deref(),
            Some("SUB_monthly_1_usr_1")
        );
        assert!(subscriber.subscription_expires_at.unwrap() > Utc::now());
    }

    #[tokio::test]
    async fn email_lookup_uses_metadata_over_customer() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("account@example.com");
        let handler = handler(store.clone());

        let payload = serde_json::to_vec(&json!({
            "event": "charge.success",
            "data": {
                "status": "success",
                "reference": "SUB_x",
                "customer": { "email": "card-holder@example.com" },
                "metadata": { "userEmail": "account@example.com", "plan": "annual" }
            }
        }))
        .unwrap();

        let outcome = deliver(&handler, &payload).await.unwrap();
        assert!(matches!(outcome, ReconcileOutcome::Applied { email, .. } if email == "account@example.com"));
    }

    // ══════════════════════════════════════════════════════════════
    // Idempotency Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn redelivery_does_not_extend_expiry() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        let handler = handler(store.clone());

        let payload = settled_charge("viewer@example.com", "6months", "SUB_6months_9_usr_1");
        deliver(&handler, &payload).await.unwrap();
        let first_expiry = store
            .get("viewer@example.com")
            .unwrap()
            .subscription_expires_at;

        for _ in 0..5 {
            let outcome = deliver(&handler, &payload).await.unwrap();
            assert_eq!(outcome, ReconcileOutcome::AlreadyApplied);
        }

        let final_expiry = store
            .get("viewer@example.com")
            .unwrap()
            .subscription_expires_at;
        assert_eq!(first_expiry, final_expiry);
    }

    #[tokio::test]
    async fn new_reference_extends_an_existing_subscription() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        let handler = handler(store.clone());

        let first = settled_charge("viewer@example.com", "monthly", "SUB_monthly_1_usr_1");
        deliver(&handler, &first).await.unwrap();

        let second = settled_charge("viewer@example.com", "annual", "SUB_annual_2_usr_1");
        let outcome = deliver(&handler, &second).await.unwrap();

        assert!(matches!(outcome, ReconcileOutcome::Applied { .. }));
        let subscriber = store.get("viewer@example.com").unwrap();
        assert_eq!(subscriber.subscription_plan, Some(SubscriptionPlan::Annual));
        assert_eq!(
            subscriber.last_payment_reference.as_deref(),
            Some("SUB_annual_2_usr_1")
        );
    }

    // ══════════════════════════════════════════════════════════════
    // Filtering Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn failed_charge_is_acknowledged_without_changes() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        let handler = handler(store.clone());

        let payload = serde_json::to_vec(&json!({
            "event": "charge.failed",
            "data": {
                "status": "failed",
                "reference": "SUB_x",
                "metadata": { "userEmail": "viewer@example.com", "plan": "monthly" }
            }
        }))
        .unwrap();

        let outcome = deliver(&handler, &payload).await.unwrap();
        assert_eq!(outcome, ReconcileOutcome::Ignored);
        let subscriber = store.get("viewer@example.com").unwrap();
        assert_eq!(subscriber.subscription_status, SubscriptionStatus::None);
    }

    // ══════════════════════════════════════════════════════════════
    // Rejection Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn invalid_signature_never_reaches_the_store() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        let handler = handler(store.clone());

        let payload = settled_charge("viewer@example.com", "monthly", "SUB_x");
        let result = handler.handle(&payload, Some("deadbeef")).await;

        assert!(matches!(result, Err(WebhookError::InvalidSignature)));
        let subscriber = store.get("viewer@example.com").unwrap();
        assert_eq!(subscriber.subscription_status, SubscriptionStatus::None);
    }

    #[tokio::test]
    async fn unknown_subscriber_is_not_found() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let handler = handler(store);

        let payload = settled_charge("nobody@example.com", "monthly", "SUB_x");
        let result = deliver(&handler, &payload).await;

        assert!(
            matches!(result, Err(WebhookError::SubscriberNotFound(email)) if email == "nobody@example.com")
        );
    }

    #[tokio::test]
    async fn unknown_plan_on_settled_charge_is_rejected() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        let handler = handler(store.clone());

        let payload = settled_charge("viewer@example.com", "weekly", "SUB_x");
        let result = deliver(&handler, &payload).await;

        assert!(matches!(result, Err(WebhookError::UnknownPlan(_))));
        let subscriber = store.get("viewer@example.com").unwrap();
        assert_eq!(subscriber.subscription_status, SubscriptionStatus::None);
    }

    #[tokio::test]
    async fn store_outage_is_retryable() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        store.fail_next_operations();
        let handler = handler(store);

        let payload = settled_charge("viewer@example.com", "monthly", "SUB_x");
        let result = deliver(&handler, &payload).await;

        match result {
            Err(err @ WebhookError::Store(_)) => assert!(err.is_retryable()),
            other => panic!("expected store error, got {other:?}"),
        }
    }
}
