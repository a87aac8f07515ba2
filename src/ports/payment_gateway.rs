//! Payment gateway port.
//!
//! The gateway hosts checkout: given an amount, reference, and callback URLs
//! it returns a redirect URL, then calls back asynchronously with a signed
//! webhook once the charge settles. Initiating a charge creates no local
//! state, so a failed initiation needs no compensation.

use async_trait::async_trait;
use serde::Serialize;
use thiserror::Error;

use crate::domain::billing::SubscriptionPlan;

/// Request to open a hosted checkout session.
#[derive(Debug, Clone, Serialize)]
pub struct CreateChargeRequest {
    /// Amount in the currency's major unit.
    pub amount: u32,

    /// ISO currency code, `NGN` for the current market.
    pub currency: String,

    /// Unique payment reference for this attempt.
    pub reference: String,

    pub customer: ChargeCustomerInfo,

    /// Absolute HTTPS URL the gateway posts the settlement webhook to.
    pub notification_url: String,

    /// Absolute HTTPS URL the browser is redirected to after payment.
    pub redirect_url: String,

    /// Echoed back verbatim in the webhook; carries what reconciliation needs.
    pub metadata: ChargeMetadataInfo,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargeCustomerInfo {
    pub name: Option<String>,
    pub email: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct ChargeMetadataInfo {
    #[serde(rename = "userEmail")]
    pub user_email: String,
    pub plan: SubscriptionPlan,
}

/// Hosted checkout session returned by the gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostedCheckout {
    /// URL the browser is sent to for payment.
    pub checkout_url: String,

    /// The reference the settlement webhook will carry.
    pub reference: String,
}

/// Errors from gateway operations.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    /// The gateway refused the request; its message is surfaced verbatim.
    #[error("{0}")]
    Rejected(String),

    /// Could not reach the gateway at all.
    #[error("payment gateway unreachable: {0}")]
    Unreachable(String),
}

/// Port for the hosted payment gateway.
#[async_trait]
pub trait PaymentGateway: Send + Sync {
    /// Open a checkout session. Pure gateway call, no store side effects.
    async fn initialize_charge(
        &self,
        request: CreateChargeRequest,
    ) -> Result<HostedCheckout, GatewayError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_gateway_is_object_safe() {
        fn _accepts_dyn(_gateway: &dyn PaymentGateway) {}
    }

    #[test]
    fn metadata_serializes_with_camel_case_user_email() {
        let metadata = ChargeMetadataInfo {
            user_email: "a@b.c".to_string(),
            plan: SubscriptionPlan::Monthly,
        };
        let json = serde_json::to_value(&metadata).unwrap();
        assert_eq!(json["userEmail"], "a@b.c");
        assert_eq!(json["plan"], "monthly");
    }

    #[test]
    fn rejected_error_displays_gateway_message_verbatim() {
        let err = GatewayError::Rejected("Invalid merchant configuration".to_string());
        assert_eq!(err.to_string(), "Invalid merchant configuration");
    }
}
