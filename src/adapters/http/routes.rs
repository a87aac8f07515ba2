//! Axum router configuration for billing endpoints.

use axum::{
    routing::{get, post},
    Router,
};

use super::handlers::{
    activate_self, admin_activate, admin_inspect, create_checkout, get_gateway_config,
    handle_payment_webhook, verify_entitlement, BillingAppState,
};

/// Create the billing API router.
///
/// # Routes
///
/// ## User Endpoints (require authentication)
/// - `POST /checkout` - Start hosted checkout
/// - `GET /verify` - Current entitlement
/// - `GET /config` - Gateway public key
/// - `POST /activate` - Self-service manual activation
///
/// ## Admin Endpoints (require admin role)
/// - `POST /admin/activate` - Activate any account
/// - `POST /admin/inspect` - Raw billing fields for an account
pub fn billing_routes() -> Router<BillingAppState> {
    Router::new()
        .route("/checkout", post(create_checkout))
        .route("/verify", get(verify_entitlement))
        .route("/config", get(get_gateway_config))
        .route("/activate", post(activate_self))
        .route("/admin/activate", post(admin_activate))
        .route("/admin/inspect", post(admin_inspect))
}

/// Create the webhook router.
///
/// Separate from the billing routes because webhook deliveries carry no user
/// auth; authenticity comes from the signature over the raw body.
///
/// # Routes
/// - `POST /payment` - Gateway settlement webhook
pub fn webhook_routes() -> Router<BillingAppState> {
    Router::new().route("/payment", post(handle_payment_webhook))
}

/// Create the complete billing module router, mounted under `/api`.
pub fn billing_router() -> Router<BillingAppState> {
    Router::new()
        .nest("/billing", billing_routes())
        .nest("/webhooks", webhook_routes())
}
