//! In-memory entitlement store for tests.
//!
//! Performs the duplicate-reference check and the write under one lock, which
//! is the strongest form of the port's atomicity contract.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::domain::billing::{
    EntitlementUpdate, Subscriber, SubscriberRole, SubscriptionStatus,
};
use crate::ports::{ApplyOutcome, EntitlementStore, StoreError};

#[derive(Default)]
struct State {
    // Keyed by subscriber id
    subscribers: HashMap<String, Subscriber>,
    fail_operations: bool,
}

/// Mutex-guarded store backed by a `HashMap`.
pub struct InMemoryEntitlementStore {
    state: Mutex<State>,
}

impl InMemoryEntitlementStore {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(State::default()),
        }
    }

    /// Inserts a fresh subscriber with no entitlement, id derived from email.
    pub fn seed_subscriber(&self, email: &str) {
        let id = format!("usr_{email}");
        self.insert(Subscriber {
            id: id.clone(),
            email: email.to_string(),
            full_name: None,
            role: SubscriberRole::User,
            subscription_status: SubscriptionStatus::None,
            subscription_plan: None,
            subscription_expires_at: None,
            last_payment_reference: None,
        });
    }

    /// Inserts a complete subscriber record.
    pub fn insert(&self, subscriber: Subscriber) {
        self.state
            .lock()
            .unwrap()
            .subscribers
            .insert(subscriber.id.clone(), subscriber);
    }

    /// Snapshot of a subscriber by email.
    pub fn get(&self, email: &str) -> Option<Subscriber> {
        self.state
            .lock()
            .unwrap()
            .subscribers
            .values()
            .find(|s| s.email == email)
            .cloned()
    }

    /// Makes all subsequent operations fail as unavailable.
    pub fn fail_next_operations(&self) {
        self.state.lock().unwrap().fail_operations = true;
    }

    /// Restores normal operation after [`Self::fail_next_operations`].
    pub fn recover(&self) {
        self.state.lock().unwrap().fail_operations = false;
    }
}

impl Default for InMemoryEntitlementStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl EntitlementStore for InMemoryEntitlementStore {
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError> {
        let state = self.state.lock().unwrap();
        if state.fail_operations {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }
        Ok(state
            .subscribers
            .values()
            .find(|s| s.email == email)
            .cloned())
    }

    async fn apply_entitlement(
        &self,
        subscriber_id: &str,
        update: &EntitlementUpdate,
    ) -> Result<ApplyOutcome, StoreError> {
        let mut state = self.state.lock().unwrap();
        if state.fail_operations {
            return Err(StoreError::Unavailable("store offline".to_string()));
        }

        let subscriber = state.subscribers.get_mut(subscriber_id).ok_or_else(|| {
            StoreError::InvalidResponse(format!("no subscriber with id {subscriber_id}"))
        })?;

        if subscriber.last_payment_reference.as_deref()
            == Some(update.payment_reference.as_str())
        {
            return Ok(ApplyOutcome::AlreadyApplied);
        }

        subscriber.subscription_status = SubscriptionStatus::Active;
        subscriber.subscription_plan = Some(update.plan);
        subscriber.subscription_expires_at = Some(update.expires_at);
        subscriber.last_payment_reference = Some(update.payment_reference.clone());

        Ok(ApplyOutcome::Applied)
    }
}
