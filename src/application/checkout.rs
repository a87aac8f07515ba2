//! Checkout initiation.
//!
//! Validates the requested plan, derives a unique payment reference, and asks
//! the gateway for a hosted checkout URL. No local state is created; the
//! settlement webhook is the only thing that changes entitlement.

use std::sync::Arc;

use axum::http::StatusCode;
use chrono::Utc;
use thiserror::Error;

use crate::domain::billing::{PaymentReference, SubscriptionPlan};
use crate::ports::{
    ChargeCustomerInfo, ChargeMetadataInfo, CreateChargeRequest, CurrentUser, GatewayError,
    HostedCheckout, PaymentGateway,
};

/// Errors from checkout initiation.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// Requested plan is outside the fixed plan table.
    #[error("Invalid plan: {0}")]
    UnknownPlan(String),

    /// The gateway refused the charge; its message is passed through verbatim
    /// so operators see the real rejection reason.
    #[error("{0}")]
    GatewayRejected(String),

    /// The gateway could not be reached.
    #[error("Payment gateway unavailable")]
    GatewayUnavailable(String),
}

impl CheckoutError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            CheckoutError::UnknownPlan(_) | CheckoutError::GatewayRejected(_) => {
                StatusCode::BAD_REQUEST
            }
            CheckoutError::GatewayUnavailable(_) => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Command to start a checkout for the authenticated user.
#[derive(Debug, Clone)]
pub struct InitiateCheckoutCommand {
    pub user: CurrentUser,

    /// Requested plan as sent by the client, validated here.
    pub plan: String,

    /// Host header of the incoming request; callback URLs are built from it so
    /// each deployment points the gateway back at itself.
    pub host: String,
}

/// Handler for starting hosted checkout sessions.
pub struct InitiateCheckoutHandler {
    gateway: Arc<dyn PaymentGateway>,
}

impl InitiateCheckoutHandler {
    pub fn new(gateway: Arc<dyn PaymentGateway>) -> Self {
        Self { gateway }
    }

    /// Starts a checkout session and returns the gateway's redirect URL.
    ///
    /// # Errors
    ///
    /// - `UnknownPlan` - the plan is not in the plan table
    /// - `GatewayRejected` - the gateway refused the initiation
    /// - `GatewayUnavailable` - the gateway could not be reached
    pub async fn handle(
        &self,
        command: InitiateCheckoutCommand,
    ) -> Result<HostedCheckout, CheckoutError> {
        let plan = SubscriptionPlan::parse(&command.plan)
            .ok_or_else(|| CheckoutError::UnknownPlan(command.plan.clone()))?;

        let reference = PaymentReference::for_checkout(plan, &command.user.id, Utc::now());

        tracing::info!(
            email = %command.user.email,
            plan = %plan,
            reference = %reference,
            "initiating checkout"
        );

        let request = CreateChargeRequest {
            amount: plan.price_ngn(),
            currency: "NGN".to_string(),
            reference: reference.into_string(),
            customer: ChargeCustomerInfo {
                name: command.user.full_name.clone(),
                email: command.user.email.clone(),
            },
            notification_url: format!("https://{}/api/webhooks/payment", command.host),
            redirect_url: format!("https://{}/subscription-success", command.host),
            metadata: ChargeMetadataInfo {
                user_email: command.user.email.clone(),
                plan,
            },
        };

        let checkout = self
            .gateway
            .initialize_charge(request)
            .await
            .map_err(|e| match e {
                GatewayError::Rejected(message) => CheckoutError::GatewayRejected(message),
                GatewayError::Unreachable(message) => CheckoutError::GatewayUnavailable(message),
            })?;

        tracing::info!(
            reference = %checkout.reference,
            "checkout session created"
        );

        Ok(checkout)
    }
}
