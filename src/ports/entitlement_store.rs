//! Entitlement store port.
//!
//! The store is the platform's user table viewed through two operations:
//! lookup by email and an entitlement update. Single-row updates are strongly
//! consistent; a write is visible to the next read on the same backend.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::billing::{EntitlementUpdate, Subscriber};

/// Outcome of applying an entitlement update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApplyOutcome {
    /// The four entitlement fields were written.
    Applied,

    /// The subscriber already carried this payment reference; nothing written.
    /// This is the store-level half of the idempotency contract.
    AlreadyApplied,
}

/// Errors from entitlement store operations.
#[derive(Debug, Clone, Error)]
pub enum StoreError {
    /// Store temporarily unreachable; the caller should surface a retryable
    /// status so the gateway redelivers.
    #[error("entitlement store unavailable: {0}")]
    Unavailable(String),

    /// The store answered with something this service cannot interpret.
    #[error("unexpected store response: {0}")]
    InvalidResponse(String),
}

/// Port over the platform's per-user entitlement record.
#[async_trait]
pub trait EntitlementStore: Send + Sync {
    /// Look up a subscriber by email, the system's stable key.
    async fn find_by_email(&self, email: &str) -> Result<Option<Subscriber>, StoreError>;

    /// Activate an entitlement: write status, plan, expiry, and payment
    /// reference as one update.
    ///
    /// Implementations must skip the write and return `AlreadyApplied` when
    /// the stored `last_payment_reference` already equals the update's
    /// reference, and must make that check atomic with the write wherever the
    /// backend allows, so two concurrent deliveries of the same reference
    /// cannot both advance the expiry.
    async fn apply_entitlement(
        &self,
        subscriber_id: &str,
        update: &EntitlementUpdate,
    ) -> Result<ApplyOutcome, StoreError>;
}
