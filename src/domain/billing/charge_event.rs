//! Gateway charge-event schema.
//!
//! Shape of the webhook payload delivered by the payment gateway. Only a
//! successful `charge.success` drives entitlement changes; everything else is
//! acknowledged and ignored. The gateway redelivers on timeout or non-2xx,
//! so extraction feeds an idempotent reconciliation, never a blind apply.

use serde::Deserialize;

use super::plan::SubscriptionPlan;
use super::webhook_errors::WebhookError;

/// Event type string that drives entitlement activation.
const CHARGE_SUCCESS: &str = "charge.success";

/// Top-level webhook event from the gateway.
#[derive(Debug, Clone, Deserialize)]
pub struct ChargeEvent {
    /// Event type, e.g. `charge.success`, `charge.failed`.
    #[serde(default)]
    pub event: String,

    #[serde(default)]
    pub data: ChargeData,
}

/// Nested charge payload.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargeData {
    /// Charge status, `success` once the payment settled.
    #[serde(default)]
    pub status: String,

    /// The payment reference issued at checkout (or the gateway's charge id).
    #[serde(default)]
    pub reference: Option<String>,

    #[serde(default)]
    pub customer: Option<ChargeCustomer>,

    #[serde(default)]
    pub metadata: Option<ChargeMetadata>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargeCustomer {
    #[serde(default)]
    pub name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,
}

/// Metadata echoed back from checkout initiation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChargeMetadata {
    #[serde(default, rename = "userEmail")]
    pub user_email: Option<String>,

    #[serde(default)]
    pub plan: Option<String>,
}

impl ChargeEvent {
    /// Parses a raw webhook body.
    pub fn from_payload(payload: &[u8]) -> Result<Self, WebhookError> {
        serde_json::from_slice(payload).map_err(|e| WebhookError::ParseError(e.to_string()))
    }

    /// True only for a settled `charge.success`; everything else is ignored.
    pub fn is_successful_charge(&self) -> bool {
        self.event == CHARGE_SUCCESS && self.data.status == "success"
    }

    /// The payment reference, required on successful charges.
    pub fn reference(&self) -> Result<&str, WebhookError> {
        self.data
            .reference
            .as_deref()
            .filter(|r| !r.is_empty())
            .ok_or(WebhookError::MissingField("data.reference"))
    }

    /// The subscriber's email.
    ///
    /// Canonical source order: `metadata.userEmail` first, falling back to
    /// `customer.email`. Older checkout variants only populated one of the
    /// two shapes.
    pub fn subscriber_email(&self) -> Result<&str, WebhookError> {
        let from_metadata = self
            .data
            .metadata
            .as_ref()
            .and_then(|m| m.user_email.as_deref());
        let from_customer = self
            .data
            .customer
            .as_ref()
            .and_then(|c| c.email.as_deref());

        from_metadata
            .or(from_customer)
            .filter(|e| !e.is_empty())
            .ok_or(WebhookError::MissingField("customer.email"))
    }

    /// The purchased plan from `metadata.plan`.
    ///
    /// Missing or unrecognized plans are rejected; a paid charge with an
    /// unparseable plan is an operator-attention case, not a silent default.
    pub fn plan(&self) -> Result<SubscriptionPlan, WebhookError> {
        let raw = self
            .data
            .metadata
            .as_ref()
            .and_then(|m| m.plan.as_deref())
            .ok_or(WebhookError::MissingField("metadata.plan"))?;

        SubscriptionPlan::parse(raw).ok_or_else(|| WebhookError::UnknownPlan(raw.to_string()))
    }
}
