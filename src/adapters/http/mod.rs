//! HTTP adapters: Axum routes, handlers, and DTOs for the billing API.

pub mod dto;
pub mod handlers;
pub mod routes;
pub mod serve;

pub use handlers::{AuthenticatedUser, BillingApiError, BillingAppState};
pub use routes::{billing_router, billing_routes, webhook_routes};
pub use serve::{build_app, start};
