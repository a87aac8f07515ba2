//! Token-table auth provider for tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::ports::{AuthError, AuthProvider, CurrentUser};

/// Auth provider that resolves tokens from a fixed table.
pub struct MockAuthProvider {
    tokens: Mutex<HashMap<String, CurrentUser>>,
}

impl MockAuthProvider {
    pub fn new() -> Self {
        Self {
            tokens: Mutex::new(HashMap::new()),
        }
    }

    /// Registers a token that resolves to the given user.
    pub fn register(&self, token: &str, user: CurrentUser) {
        self.tokens.lock().unwrap().insert(token.to_string(), user);
    }
}

impl Default for MockAuthProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AuthProvider for MockAuthProvider {
    async fn authenticate(&self, bearer_token: &str) -> Result<CurrentUser, AuthError> {
        self.tokens
            .lock()
            .unwrap()
            .get(bearer_token)
            .cloned()
            .ok_or(AuthError::Unauthenticated)
    }
}
