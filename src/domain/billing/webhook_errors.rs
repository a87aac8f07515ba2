//! Webhook error taxonomy.
//!
//! Every rejection point in the reconciliation pipeline maps to a status code
//! the gateway understands: 4xx means do not redeliver, 5xx means redeliver
//! later (safe under the idempotency contract).

use axum::http::StatusCode;
use thiserror::Error;

/// Errors that occur while reconciling a gateway webhook.
#[derive(Debug, Error)]
pub enum WebhookError {
    /// A shared secret is configured but the signature header is absent.
    #[error("Missing signature header")]
    MissingSignature,

    /// Signature did not match the HMAC of the raw body.
    #[error("Invalid signature")]
    InvalidSignature,

    /// Body was not valid JSON (or not the expected shape).
    #[error("Parse error: {0}")]
    ParseError(String),

    /// Required field missing from an otherwise-authentic event.
    #[error("Missing field: {0}")]
    MissingField(&'static str),

    /// Plan value outside the fixed plan table.
    #[error("Unknown plan: {0}")]
    UnknownPlan(String),

    /// Payment settled but no account matches the email. A paid customer did
    /// not get entitled; surfaced for manual reconciliation, never retried.
    #[error("No subscriber found for {0}")]
    SubscriberNotFound(String),

    /// Entitlement store temporarily unavailable.
    #[error("Store error: {0}")]
    Store(String),
}

impl WebhookError {
    /// Returns true if the gateway should redeliver this webhook.
    ///
    /// Only transient store failures are retryable; an unmatched subscriber is
    /// an unrecoverable mismatch and retrying would loop forever.
    pub fn is_retryable(&self) -> bool {
        matches!(self, WebhookError::Store(_))
    }

    /// Maps the error to the HTTP status the gateway sees.
    ///
    /// - 4xx: non-retryable, the gateway stops redelivering
    /// - 5xx: retryable, the gateway will redeliver
    pub fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::MissingSignature | WebhookError::InvalidSignature => {
                StatusCode::UNAUTHORIZED
            }

            WebhookError::ParseError(_)
            | WebhookError::MissingField(_)
            | WebhookError::UnknownPlan(_) => StatusCode::BAD_REQUEST,

            WebhookError::SubscriberNotFound(_) => StatusCode::NOT_FOUND,

            WebhookError::Store(_) => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}
