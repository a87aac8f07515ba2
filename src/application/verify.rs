//! Entitlement verification queries.
//!
//! Read side of the pipeline: project a subscriber record into the view the
//! client renders, evaluating expiry lazily at read time. Also carries the
//! admin inspection query used to debug stuck activations.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use thiserror::Error;

use crate::domain::billing::{EntitlementView, Subscriber};
use crate::ports::{CurrentUser, EntitlementStore};

/// Errors from entitlement queries.
#[derive(Debug, Error)]
pub enum VerifyError {
    #[error("Admin access required")]
    AdminRequired,

    #[error("No subscriber found for {0}")]
    SubscriberNotFound(String),

    #[error("Store error: {0}")]
    Store(String),
}

impl VerifyError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            VerifyError::AdminRequired => StatusCode::FORBIDDEN,
            VerifyError::SubscriberNotFound(_) => StatusCode::NOT_FOUND,
            VerifyError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Admin inspection of a subscriber's raw billing fields.
#[derive(Debug, Clone, PartialEq)]
pub struct SubscriptionInspection {
    pub subscriber: Subscriber,
    pub has_access: bool,
    pub is_expired: bool,
    pub expires_in_days: Option<i64>,
}

/// Handler for the client-facing verify query and admin inspection.
pub struct VerifyEntitlementHandler {
    store: Arc<dyn EntitlementStore>,
}

impl VerifyEntitlementHandler {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    /// Current entitlement of the authenticated caller.
    ///
    /// An account with no billing record at all is a valid answer (access
    /// denied), not an error; clients poll this right after signup.
    pub async fn verify(&self, user: &CurrentUser) -> Result<EntitlementView, VerifyError> {
        let subscriber = self
            .store
            .find_by_email(&user.email)
            .await
            .map_err(|e| VerifyError::Store(e.to_string()))?;

        let view = match subscriber {
            Some(subscriber) => EntitlementView::of(&subscriber, Utc::now()),
            None => EntitlementView::none(),
        };

        Ok(view)
    }

    /// Raw subscriber record plus derived access fields; admin only.
    pub async fn inspect(
        &self,
        caller: &CurrentUser,
        target_email: &str,
    ) -> Result<SubscriptionInspection, VerifyError> {
        if !caller.is_admin() {
            return Err(VerifyError::AdminRequired);
        }

        let subscriber = self
            .store
            .find_by_email(target_email)
            .await
            .map_err(|e| VerifyError::Store(e.to_string()))?
            .ok_or_else(|| VerifyError::SubscriberNotFound(target_email.to_string()))?;

        let now = Utc::now();
        Ok(SubscriptionInspection {
            has_access: subscriber.has_access(now),
            is_expired: subscriber.is_expired(now),
            expires_in_days: subscriber.expires_in_days(now),
            subscriber,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::platform::InMemoryEntitlementStore;
    use crate::domain::billing::{
        EntitlementUpdate, SubscriberRole, SubscriptionPlan, SubscriptionStatus,
    };

    fn user(email: &str) -> CurrentUser {
        CurrentUser {
            id: "usr_1".to_string(),
            email: email.to_string(),
            full_name: None,
            role: SubscriberRole::User,
        }
    }

    fn admin() -> CurrentUser {
        CurrentUser {
            id: "usr_admin".to_string(),
            email: "ops@vibeflix.app".to_string(),
            full_name: None,
            role: SubscriberRole::Admin,
        }
    }

    async fn activate(store: &InMemoryEntitlementStore, email: &str, plan: SubscriptionPlan) {
        let subscriber = store.get(email).unwrap();
        let update = EntitlementUpdate {
            plan,
            expires_at: plan.expires_from(Utc::now()),
            payment_reference: "SUB_test".to_string(),
        };
        store
            .apply_entitlement(&subscriber.id, &update)
            .await
            .unwrap();
    }

    // ══════════════════════════════════════════════════════════════
    // Verify Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn active_subscriber_has_access() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        activate(&store, "viewer@example.com", SubscriptionPlan::Monthly).await;
        let handler = VerifyEntitlementHandler::new(store);

        let view = handler.verify(&user("viewer@example.com")).await.unwrap();

        assert!(view.has_access);
        assert_eq!(view.status, SubscriptionStatus::Active);
        assert_eq!(view.plan, Some(SubscriptionPlan::Monthly));
        assert!(view.expires_at.is_some());
    }

    #[tokio::test]
    async fn never_subscribed_account_is_denied_not_an_error() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("fresh@example.com");
        let handler = VerifyEntitlementHandler::new(store);

        let view = handler.verify(&user("fresh@example.com")).await.unwrap();

        assert!(!view.has_access);
        assert_eq!(view.status, SubscriptionStatus::None);
    }

    #[tokio::test]
    async fn unknown_account_gets_the_empty_view() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let handler = VerifyEntitlementHandler::new(store);

        let view = handler.verify(&user("ghost@example.com")).await.unwrap();

        assert!(!view.has_access);
        assert!(view.plan.is_none());
    }

    #[tokio::test]
    async fn expired_subscription_is_denied_at_read_time() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("lapsed@example.com");
        let subscriber = store.get("lapsed@example.com").unwrap();
        store
            .apply_entitlement(
                &subscriber.id,
                &EntitlementUpdate {
                    plan: SubscriptionPlan::Monthly,
                    expires_at: Utc::now() - chrono::Duration::days(1),
                    payment_reference: "SUB_old".to_string(),
                },
            )
            .await
            .unwrap();
        let handler = VerifyEntitlementHandler::new(store);

        let view = handler.verify(&user("lapsed@example.com")).await.unwrap();

        // Status stays active in storage; access is computed lazily
        assert_eq!(view.status, SubscriptionStatus::Active);
        assert!(!view.has_access);
    }

    // ══════════════════════════════════════════════════════════════
    // Inspection Tests
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn admin_inspection_exposes_raw_fields() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        activate(&store, "viewer@example.com", SubscriptionPlan::Annual).await;
        let handler = VerifyEntitlementHandler::new(store);

        let inspection = handler
            .inspect(&admin(), "viewer@example.com")
            .await
            .unwrap();

        assert!(inspection.has_access);
        assert!(!inspection.is_expired);
        assert_eq!(
            inspection.subscriber.last_payment_reference.as_deref(),
            Some("SUB_test")
        );
        assert!(inspection.expires_in_days.unwrap() > 300);
    }

    #[tokio::test]
    async fn inspection_flags_expired_records() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("lapsed@example.com");
        let subscriber = store.get("lapsed@example.com").unwrap();
        store
            .apply_entitlement(
                &subscriber.id,
                &EntitlementUpdate {
                    plan: SubscriptionPlan::Monthly,
                    expires_at: Utc::now() - chrono::Duration::days(3),
                    payment_reference: "SUB_old".to_string(),
                },
            )
            .await
            .unwrap();
        let handler = VerifyEntitlementHandler::new(store);

        let inspection = handler.inspect(&admin(), "lapsed@example.com").await.unwrap();

        assert!(inspection.is_expired);
        assert!(!inspection.has_access);
        assert!(inspection.expires_in_days.unwrap() < 0);
    }

    #[tokio::test]
    async fn inspection_requires_admin() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        store.seed_subscriber("viewer@example.com");
        let handler = VerifyEntitlementHandler::new(store);

        let result = handler
            .inspect(&user("viewer@example.com"), "viewer@example.com")
            .await;

        assert!(matches!(result, Err(VerifyError::AdminRequired)));
    }

    #[tokio::test]
    async fn inspecting_unknown_email_is_not_found() {
        let store = Arc::new(InMemoryEntitlementStore::new());
        let handler = VerifyEntitlementHandler::new(store);

        let result = handler.inspect(&admin(), "ghost@example.com").await;

        assert!(matches!(result, Err(VerifyError::SubscriberNotFound(_))));
    }
}
