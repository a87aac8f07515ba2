//! Subscription plan definitions.
//!
//! A plan fixes the price charged at checkout and the calendar duration added
//! to the entitlement when a charge for it settles.

use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

/// Subscription plan purchased through checkout.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SubscriptionPlan {
    /// One calendar month of access.
    #[serde(rename = "monthly")]
    Monthly,

    /// Six calendar months of access.
    #[serde(rename = "6months")]
    SixMonths,

    /// One calendar year of access.
    #[serde(rename = "annual")]
    Annual,
}

impl SubscriptionPlan {
    /// Parses the wire name of a plan.
    ///
    /// Returns `None` for anything outside the fixed plan table. Unknown plans
    /// are rejected at every call site; there is no fallback to `monthly`.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "monthly" => Some(SubscriptionPlan::Monthly),
            "6months" => Some(SubscriptionPlan::SixMonths),
            "annual" => Some(SubscriptionPlan::Annual),
            _ => None,
        }
    }

    /// Wire name of this plan, as used in references, metadata, and storage.
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionPlan::Monthly => "monthly",
            SubscriptionPlan::SixMonths => "6months",
            SubscriptionPlan::Annual => "annual",
        }
    }

    /// Price in Nigerian naira charged at checkout.
    pub fn price_ngn(&self) -> u32 {
        match self {
            SubscriptionPlan::Monthly => 2_000,
            SubscriptionPlan::SixMonths => 11_000,
            SubscriptionPlan::Annual => 22_000,
        }
    }

    /// Entitlement duration in calendar months.
    pub fn duration_months(&self) -> u32 {
        match self {
            SubscriptionPlan::Monthly => 1,
            SubscriptionPlan::SixMonths => 6,
            SubscriptionPlan::Annual => 12,
        }
    }

    /// Computes the entitlement expiry for a charge settled at `now`.
    ///
    /// Calendar-month arithmetic with the day-of-month clamped to the end of
    /// shorter months: Jan 31 + 1 month = Feb 28 (or Feb 29 in a leap year).
    pub fn expires_from(&self, now: DateTime<Utc>) -> DateTime<Utc> {
        now.checked_add_months(Months::new(self.duration_months()))
            .expect("expiry within chrono's supported range")
    }
}

impl std::fmt::Display for SubscriptionPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
