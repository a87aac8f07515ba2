//! Entitlement fetcher port, consumed by the post-checkout poller.
//!
//! Separate from [`super::EntitlementStore`]: the poller observes entitlement
//! through the same read path a client would use, not through store
//! credentials it should not hold.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::billing::EntitlementView;

/// Errors from fetching the current entitlement.
#[derive(Debug, Clone, Error)]
pub enum FetchError {
    #[error("entitlement fetch failed: {0}")]
    Unavailable(String),

    #[error("unexpected entitlement response: {0}")]
    InvalidResponse(String),
}

/// Port for reading the caller's current entitlement.
#[async_trait]
pub trait EntitlementFetcher: Send + Sync {
    /// Fetch the entitlement as the verify endpoint reports it right now.
    async fn fetch_entitlement(&self) -> Result<EntitlementView, FetchError>;
}
