//! HTTP DTOs for the billing endpoints.
//!
//! JSON boundary between clients and the application layer. The `hasAccess`
//! and `userEmail` fields keep their camelCase wire names; existing clients
//! depend on them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::application::SubscriptionInspection;
use crate::domain::billing::{EntitlementView, SubscriptionPlan, SubscriptionStatus};

// ════════════════════════════════════════════════════════════════════════════════
// Request DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Request to start hosted checkout.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    /// Requested plan; validated against the plan table server-side.
    pub plan: String,
}

/// Request to manually activate the caller's own account.
#[derive(Debug, Clone, Deserialize)]
pub struct SelfActivateRequest {
    pub plan: String,
}

/// Admin request to activate an arbitrary account.
#[derive(Debug, Clone, Deserialize)]
pub struct AdminActivateRequest {
    #[serde(rename = "userEmail")]
    pub user_email: String,
    pub plan: String,
}

/// Admin request to inspect an account's raw billing fields.
#[derive(Debug, Clone, Deserialize)]
pub struct InspectRequest {
    #[serde(rename = "userEmail")]
    pub user_email: String,
}

// ════════════════════════════════════════════════════════════════════════════════
// Response DTOs
// ════════════════════════════════════════════════════════════════════════════════

/// Response for checkout initiation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckoutResponse {
    pub success: bool,

    /// Hosted checkout URL to redirect the browser to.
    pub checkout_url: String,

    /// Reference the settlement webhook will carry.
    pub reference: String,
}

/// Response for the entitlement verify endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,

    #[serde(rename = "hasAccess")]
    pub has_access: bool,

    pub subscription: SubscriptionBody,
}

/// Subscription fields nested inside [`VerifyResponse`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubscriptionBody {
    pub status: SubscriptionStatus,
    pub plan: Option<SubscriptionPlan>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl VerifyResponse {
    pub fn from_view(view: EntitlementView) -> Self {
        Self {
            success: true,
            has_access: view.has_access,
            subscription: SubscriptionBody {
                status: view.status,
                plan: view.plan,
                expires_at: view.expires_at,
            },
        }
    }

    /// Converts back to the domain view; used by the polling client, which
    /// reads the same endpoint.
    pub fn into_view(self) -> EntitlementView {
        EntitlementView {
            has_access: self.has_access,
            status: self.subscription.status,
            plan: self.subscription.plan,
            expires_at: self.subscription.expires_at,
        }
    }
}

/// Public gateway configuration served to browsers.
///
/// Only the public key crosses this boundary; secret key and webhook secret
/// never appear in any response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfigResponse {
    pub success: bool,
    pub public_key: String,
}

/// Response for manual activation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub success: bool,
    pub email: String,
    pub plan: SubscriptionPlan,
    pub expires_at: DateTime<Utc>,
    pub reference: String,
}

/// Admin inspection response: raw stored fields plus derived access and the
/// webhook endpoint the gateway dashboard must point at.
#[derive(Debug, Clone, Serialize)]
pub struct InspectResponse {
    pub success: bool,
    pub email: String,
    pub subscription_status: SubscriptionStatus,
    pub subscription_plan: Option<SubscriptionPlan>,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub last_payment_reference: Option<String>,
    #[serde(rename = "hasAccess")]
    pub has_access: bool,
    pub is_expired: bool,
    pub expires_in_days: Option<i64>,

    /// Settlement webhook URL for this deployment; the most common cause of a
    /// stuck activation is the gateway pointing somewhere else.
    pub webhook_url: String,
}

impl InspectResponse {
    pub fn new(inspection: SubscriptionInspection, webhook_url: String) -> Self {
        Self {
            success: true,
            email: inspection.subscriber.email.clone(),
            subscription_status: inspection.subscriber.subscription_status,
            subscription_plan: inspection.subscriber.subscription_plan,
            subscription_expires_at: inspection.subscriber.subscription_expires_at,
            last_payment_reference: inspection.subscriber.last_payment_reference.clone(),
            has_access: inspection.has_access,
            is_expired: inspection.is_expired,
            expires_in_days: inspection.expires_in_days,
            webhook_url,
        }
    }
}

/// Uniform error body for every failure response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }
}
