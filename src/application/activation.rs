//! Manual entitlement activation.
//!
//! Break-glass path for when the webhook fails terminally (settled payment,
//! unmatched account) or for operator grants. Reuses the same entitlement
//! write as reconciliation, with a `MANUAL_` reference so a later webhook for
//! a real payment still applies.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::domain::billing::{PaymentReference, SubscriptionPlan};
use crate::domain::billing::EntitlementUpdate;
use crate::ports::{CurrentUser, EntitlementStore};

/// Errors from manual activation.
#[derive(Debug, Error)]
pub enum ActivationError {
    /// Caller is not an admin but the target is another account.
    #[error("Admin access required")]
    AdminRequired,

    /// No account matches the target email.
    #[error("No subscriber found for {0}")]
    SubscriberNotFound(String),

    /// Plan outside the fixed plan table.
    #[error("Invalid plan: {0}")]
    UnknownPlan(String),

    /// Store temporarily unavailable.
    #[error("Store error: {0}")]
    Store(String),
}

impl ActivationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            ActivationError::AdminRequired => StatusCode::FORBIDDEN,
            ActivationError::SubscriberNotFound(_) => StatusCode::NOT_FOUND,
            ActivationError::UnknownPlan(_) => StatusCode::BAD_REQUEST,
            ActivationError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

/// Result of a manual activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManualActivation {
    pub email: String,
    pub plan: SubscriptionPlan,
    pub expires_at: DateTime<Utc>,
    pub reference: String,
}

/// Handler for self-service and admin manual activation.
pub struct ManualActivationHandler {
    store: Arc<dyn EntitlementStore>,
}

impl ManualActivationHandler {
    pub fn new(store: Arc<dyn EntitlementStore>) -> Self {
        Self { store }
    }

    /// Activates the caller's own account.
    ///
    /// Exists for the stuck-after-payment case: the user paid, the webhook
    /// did not land, and support walks them through self-activation.
    pub async fn activate_self(
        &self,
        user: &CurrentUser,
        plan: &str,
    ) -> Result<ManualActivation, ActivationError> {
        self.activate(&user.email, plan).await
    }

    /// Activates an arbitrary account; caller must be an admin.
    pub async fn activate_for(
        &self,
        caller: &CurrentUser,
        target_email: &str,
        plan: &str,
    ) -> Result<ManualActivation, ActivationError> {
        if !caller.is_admin() {
            tracing::warn!(
                caller = %caller.email,
                target = %target_email,
                "non-admin attempted admin activation"
            );
            return Err(ActivationError::AdminRequired);
        }
        self.activate(target_email, plan).await
    }

    async fn activate(&self, email: &str, plan: &str) -> Result<ManualActivation, ActivationError> {
        let plan = SubscriptionPlan::parse(plan)
            .ok_or_else(|| ActivationError::UnknownPlan(plan.to_string()))?;

        let subscriber = self
            .store
            .find_by_email(email)
            .await
            .map_err(|e| ActivationError::Store(e.to_string()))?
            .ok_or_else(|| ActivationError::SubscriberNotFound(email.to_string()))?;

        let now = Utc::now();
        let expires_at = plan.expires_from(now);
        let reference = PaymentReference::manual(now).into_string();

        let update = EntitlementUpdate {
            plan,
            expires_at,
            payment_reference: reference.clone(),
        };

        self.store
            .apply_entitlement(&subscriber.id, &update)
            .await
            .map_err(|e| ActivationError::Store(e.to_string()))?;

        tracing::warn!(
            email = %email,
            plan = %plan,
            expires_at = %expires_at,
            reference = %reference,
            "entitlement manually activated"
        );

        Ok(ManualActivation {
            email: email.to_string(),
            plan,
            expires_at,
            reference,
        })
    }
}
