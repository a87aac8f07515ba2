//! Billing domain: plans, entitlements, references, and webhook semantics.

mod charge_event;
mod plan;
mod reference;
mod subscriber;
mod webhook_errors;
mod webhook_verifier;

pub use charge_event::{ChargeCustomer, ChargeData, ChargeEvent, ChargeMetadata};
pub use plan::SubscriptionPlan;
pub use reference::PaymentReference;
pub use subscriber::{
    EntitlementUpdate, EntitlementView, Subscriber, SubscriberRole, SubscriptionStatus,
};
pub use webhook_errors::WebhookError;
pub use webhook_verifier::{sign_payload, WebhookVerifier};
