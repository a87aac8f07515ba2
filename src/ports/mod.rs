//! Ports: async traits the application layer depends on.
//!
//! Adapters in [`crate::adapters`] implement these against the real payment
//! gateway and platform APIs; tests swap in in-memory versions.

mod auth_provider;
mod entitlement_fetcher;
mod entitlement_store;
mod payment_gateway;

pub use auth_provider::{AuthError, AuthProvider, CurrentUser};
pub use entitlement_fetcher::{EntitlementFetcher, FetchError};
pub use entitlement_store::{ApplyOutcome, EntitlementStore, StoreError};
pub use payment_gateway::{
    ChargeCustomerInfo, ChargeMetadataInfo, CreateChargeRequest, GatewayError, HostedCheckout,
    PaymentGateway,
};
