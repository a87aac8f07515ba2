//! Adapters over the platform's user and session APIs.

mod auth;
mod entitlement_store;
mod in_memory;
mod mock_auth;

pub use auth::PlatformAuthProvider;
pub use entitlement_store::{PlatformEntitlementStore, PlatformStoreConfig};
pub use in_memory::InMemoryEntitlementStore;
pub use mock_auth::MockAuthProvider;
