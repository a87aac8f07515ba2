//! Client-side adapters.

mod verify_client;

pub use verify_client::HttpEntitlementFetcher;
