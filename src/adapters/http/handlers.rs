//! HTTP handlers for the billing endpoints.
//!
//! These handlers connect Axum routes to the application layer. The webhook
//! handler is the only one that reads the raw body; signature verification
//! needs the exact bytes the gateway signed.

use std::sync::Arc;

use axum::extract::{Json, State};
use axum::http::{HeaderMap, StatusCode};
use axum::response::IntoResponse;

use crate::application::{
    ActivationError, CheckoutError, InitiateCheckoutCommand, InitiateCheckoutHandler,
    ManualActivationHandler, ReconcileChargeHandler, VerifyEntitlementHandler, VerifyError,
};
use crate::domain::billing::{WebhookError, WebhookVerifier};
use crate::ports::{AuthError, AuthProvider, CurrentUser, EntitlementStore, PaymentGateway};

use super::dto::{
    ActivationResponse, AdminActivateRequest, CheckoutRequest, CheckoutResponse, ErrorResponse,
    GatewayConfigResponse, InspectRequest, InspectResponse, SelfActivateRequest, VerifyResponse,
};

/// Signature header the gateway sets on webhook deliveries.
const SIGNATURE_HEADER: &str = "x-korapay-signature";

// ════════════════════════════════════════════════════════════════════════════════
// Application State
// ════════════════════════════════════════════════════════════════════════════════

/// Shared state for all billing routes, cloned per request.
#[derive(Clone)]
pub struct BillingAppState {
    pub store: Arc<dyn EntitlementStore>,
    pub gateway: Arc<dyn PaymentGateway>,
    pub auth: Arc<dyn AuthProvider>,
    pub verifier: Arc<WebhookVerifier>,

    /// Public key served to browsers for the gateway's client SDK.
    pub gateway_public_key: String,
}

impl BillingAppState {
    pub fn checkout_handler(&self) -> InitiateCheckoutHandler {
        InitiateCheckoutHandler::new(self.gateway.clone())
    }

    pub fn reconcile_handler(&self) -> ReconcileChargeHandler {
        ReconcileChargeHandler::new(self.store.clone(), (*self.verifier).clone())
    }

    pub fn activation_handler(&self) -> ManualActivationHandler {
        ManualActivationHandler::new(self.store.clone())
    }

    pub fn verify_handler(&self) -> VerifyEntitlementHandler {
        VerifyEntitlementHandler::new(self.store.clone())
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Authentication Extractor
// ════════════════════════════════════════════════════════════════════════════════

/// Authenticated user, resolved from the bearer token via the auth port.
#[derive(Debug, Clone)]
pub struct AuthenticatedUser(pub CurrentUser);

impl axum::extract::FromRequestParts<BillingAppState> for AuthenticatedUser {
    type Rejection = BillingApiError;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        state: &'life1 BillingAppState,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        let auth = state.auth.clone();
        Box::pin(async move {
            let token = parts
                .headers
                .get(axum::http::header::AUTHORIZATION)
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.strip_prefix("Bearer "))
                .ok_or(BillingApiError::from(AuthError::Unauthenticated))?;

            let user = auth.authenticate(token).await?;
            Ok(AuthenticatedUser(user))
        })
    }
}

// ════════════════════════════════════════════════════════════════════════════════
// Handlers
// ════════════════════════════════════════════════════════════════════════════════

/// POST /api/billing/checkout - Start a hosted checkout session
pub async fn create_checkout(
    State(state): State<BillingAppState>,
    axum::extract::Host(host): axum::extract::Host,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<CheckoutRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.checkout_handler();
    let command = InitiateCheckoutCommand {
        user,
        plan: request.plan,
        host,
    };

    let checkout = handler.handle(command).await?;

    let response = CheckoutResponse {
        success: true,
        checkout_url: checkout.checkout_url,
        reference: checkout.reference,
    };

    Ok(Json(response))
}

/// POST /api/webhooks/payment - Reconcile a gateway settlement webhook
///
/// No user auth; authenticity comes from the HMAC signature over the raw
/// body. Responses are status-only: 200 acknowledges (including ignored and
/// duplicate events), 4xx tells the gateway to stop, 5xx asks for redelivery.
pub async fn handle_payment_webhook(
    State(state): State<BillingAppState>,
    headers: HeaderMap,
    body: axum::body::Bytes,
) -> Result<impl IntoResponse, BillingApiError> {
    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok());

    let handler = state.reconcile_handler();
    handler.handle(&body, signature).await?;

    // Applied, already-applied, and ignored all acknowledge identically; the
    // gateway only needs to know not to redeliver
    Ok(Json(serde_json::json!({ "success": true })))
}

/// GET /api/billing/verify - Current caller's entitlement
pub async fn verify_entitlement(
    State(state): State<BillingAppState>,
    AuthenticatedUser(user): AuthenticatedUser,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.verify_handler();
    let view = handler.verify(&user).await?;

    Ok(Json(VerifyResponse::from_view(view)))
}

/// GET /api/billing/config - Gateway configuration for the signed-in client
///
/// Authenticated: the public key is only handed to accounts that can start a
/// checkout with it.
pub async fn get_gateway_config(
    State(state): State<BillingAppState>,
    AuthenticatedUser(_user): AuthenticatedUser,
) -> impl IntoResponse {
    Json(GatewayConfigResponse {
        success: true,
        public_key: state.gateway_public_key.clone(),
    })
}

/// POST /api/billing/activate - Self-service manual activation
pub async fn activate_self(
    State(state): State<BillingAppState>,
    AuthenticatedUser(user): AuthenticatedUser,
    Json(request): Json<SelfActivateRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.activation_handler();
    let activation = handler.activate_self(&user, &request.plan).await?;

    Ok(Json(ActivationResponse {
        success: true,
        email: activation.email,
        plan: activation.plan,
        expires_at: activation.expires_at,
        reference: activation.reference,
    }))
}

/// POST /api/billing/admin/activate - Admin activation of any account
pub async fn admin_activate(
    State(state): State<BillingAppState>,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<AdminActivateRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.activation_handler();
    let activation = handler
        .activate_for(&caller, &request.user_email, &request.plan)
        .await?;

    Ok(Json(ActivationResponse {
        success: true,
        email: activation.email,
        plan: activation.plan,
        expires_at: activation.expires_at,
        reference: activation.reference,
    }))
}

/// POST /api/billing/admin/inspect - Raw billing fields for an account
pub async fn admin_inspect(
    State(state): State<BillingAppState>,
    axum::extract::Host(host): axum::extract::Host,
    AuthenticatedUser(caller): AuthenticatedUser,
    Json(request): Json<InspectRequest>,
) -> Result<impl IntoResponse, BillingApiError> {
    let handler = state.verify_handler();
    let inspection = handler.inspect(&caller, &request.user_email).await?;

    // Same endpoint checkout registers as the notification URL
    let webhook_url = format!("https://{host}/api/webhooks/payment");

    Ok(Json(InspectResponse::new(inspection, webhook_url)))
}

// ════════════════════════════════════════════════════════════════════════════════
// Error Handling
// ════════════════════════════════════════════════════════════════════════════════

/// API error carrying the status and client-visible message.
#[derive(Debug)]
pub struct BillingApiError {
    status: StatusCode,
    message: String,
}

impl BillingApiError {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<CheckoutError> for BillingApiError {
    fn from(err: CheckoutError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

impl From<WebhookError> for BillingApiError {
    fn from(err: WebhookError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

impl From<ActivationError> for BillingApiError {
    fn from(err: ActivationError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

impl From<VerifyError> for BillingApiError {
    fn from(err: VerifyError) -> Self {
        Self::new(err.status_code(), err.to_string())
    }
}

impl From<AuthError> for BillingApiError {
    fn from(err: AuthError) -> Self {
        let status = match err {
            AuthError::Unauthenticated => StatusCode::UNAUTHORIZED,
            AuthError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
        };
        Self::new(status, err.to_string())
    }
}

impl IntoResponse for BillingApiError {
    fn into_response(self) -> axum::response::Response {
        let body = ErrorResponse::new(self.message);
        (self.status, Json(body)).into_response()
    }
}
