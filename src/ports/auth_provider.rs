//! Authentication port.
//!
//! Billing endpoints trust the platform to resolve bearer tokens into user
//! identities; this service never inspects tokens itself.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::billing::SubscriberRole;

/// The authenticated caller of a billing endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    pub id: String,
    pub email: String,
    pub full_name: Option<String>,
    pub role: SubscriberRole,
}

impl CurrentUser {
    pub fn is_admin(&self) -> bool {
        self.role == SubscriberRole::Admin
    }
}

/// Errors from authentication.
#[derive(Debug, Clone, Error)]
pub enum AuthError {
    /// Token missing, expired, or rejected by the platform.
    #[error("authentication required")]
    Unauthenticated,

    /// The platform's auth endpoint could not be reached.
    #[error("authentication service unavailable: {0}")]
    Unavailable(String),
}

/// Port for resolving bearer tokens into users.
#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Resolve a bearer token to the user it belongs to.
    async fn authenticate(&self, bearer_token: &str) -> Result<CurrentUser, AuthError>;
}
