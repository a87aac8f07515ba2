//! Subscriber entitlement state.
//!
//! A `Subscriber` is the billing-relevant view onto the platform's user
//! record, keyed by email. There is no background sweep that flips expired
//! rows back to `none`; every reader computes access from status plus expiry.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::plan::SubscriptionPlan;

/// Entitlement status stored on the subscriber record.
///
/// Absence of the field means `None`; a record can be `Active` yet already
/// expired, which is why access checks never trust the status alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    #[default]
    None,
    Active,
}

/// Role carried on the platform user record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriberRole {
    #[default]
    User,
    Admin,
}

/// Billing view of a platform user account.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Subscriber {
    /// Platform record id.
    pub id: String,

    /// Stable key across the system.
    pub email: String,

    #[serde(default)]
    pub full_name: Option<String>,

    #[serde(default)]
    pub role: SubscriberRole,

    #[serde(default)]
    pub subscription_status: SubscriptionStatus,

    #[serde(default)]
    pub subscription_plan: Option<SubscriptionPlan>,

    #[serde(default)]
    pub subscription_expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub last_payment_reference: Option<String>,
}

impl Subscriber {
    /// Whether the stored expiry lies in the past (or is unset).
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        match self.subscription_expires_at {
            Some(expires_at) => expires_at <= now,
            None => true,
        }
    }

    /// Lazily-evaluated access check: active status AND unexpired.
    pub fn has_access(&self, now: DateTime<Utc>) -> bool {
        self.subscription_status == SubscriptionStatus::Active && !self.is_expired(now)
    }

    /// Whole days until expiry, negative once past. `None` when unset.
    pub fn expires_in_days(&self, now: DateTime<Utc>) -> Option<i64> {
        self.subscription_expires_at
            .map(|expires_at| (expires_at - now).num_days())
    }

    pub fn is_admin(&self) -> bool {
        self.role == SubscriberRole::Admin
    }
}

/// The four entitlement fields written as one atomic update.
///
/// Status is implicitly `active`; the write either lands whole or not at all,
/// so a reader never observes `active` paired with a stale expiry.
#[derive(Debug, Clone, PartialEq)]
pub struct EntitlementUpdate {
    pub plan: SubscriptionPlan,
    pub expires_at: DateTime<Utc>,
    pub payment_reference: String,
}

/// Read-model of a subscriber's entitlement, as served to clients.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitlementView {
    pub has_access: bool,
    pub status: SubscriptionStatus,
    pub plan: Option<SubscriptionPlan>,
    pub expires_at: Option<DateTime<Utc>>,
}

impl EntitlementView {
    /// Projects a subscriber record at the given instant.
    pub fn of(subscriber: &Subscriber, now: DateTime<Utc>) -> Self {
        Self {
            has_access: subscriber.has_access(now),
            status: subscriber.subscription_status,
            plan: subscriber.subscription_plan,
            expires_at: subscriber.subscription_expires_at,
        }
    }

    /// View for an account with no entitlement record at all.
    pub fn none() -> Self {
        Self {
            has_access: false,
            status: SubscriptionStatus::None,
            plan: None,
            expires_at: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn subscriber(status: SubscriptionStatus, expires_at: Option<DateTime<Utc>>) -> Subscriber {
        Subscriber {
            id: "usr_1".to_string(),
            email: "viewer@example.com".to_string(),
            full_name: Some("Test Viewer".to_string()),
            role: SubscriberRole::User,
            subscription_status: status,
            subscription_plan: Some(SubscriptionPlan::Monthly),
            subscription_expires_at: expires_at,
            last_payment_reference: None,
        }
    }

    // ══════════════════════════════════════════════════════════════
    // Access Check Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn active_and_unexpired_has_access() {
        let now = Utc::now();
        let sub = subscriber(SubscriptionStatus::Active, Some(now + Duration::days(10)));
        assert!(sub.has_access(now));
    }

    #[test]
    fn active_but_expired_has_no_access() {
        // Lazy expiry: the row still says active, readers must not trust it
        let now = Utc::now();
        let sub = subscriber(SubscriptionStatus::Active, Some(now - Duration::hours(1)));
        assert!(!sub.has_access(now));
        assert!(sub.is_expired(now));
    }

    #[test]
    fn active_without_expiry_has_no_access() {
        let now = Utc::now();
        let sub = subscriber(SubscriptionStatus::Active, None);
        assert!(!sub.has_access(now));
    }

    #[test]
    fn inactive_with_future_expiry_has_no_access() {
        let now = Utc::now();
        let sub = subscriber(SubscriptionStatus::None, Some(now + Duration::days(30)));
        assert!(!sub.has_access(now));
    }

    #[test]
    fn expiry_boundary_is_exclusive() {
        let now = Utc::now();
        let sub = subscriber(SubscriptionStatus::Active, Some(now));
        assert!(!sub.has_access(now));
    }

    #[test]
    fn expires_in_days_counts_whole_days() {
        let now = Utc::now();
        let sub = subscriber(
            SubscriptionStatus::Active,
            Some(now + Duration::days(7) + Duration::hours(3)),
        );
        assert_eq!(sub.expires_in_days(now), Some(7));
    }

    // ══════════════════════════════════════════════════════════════
    // Deserialization Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn absent_entitlement_fields_default_to_none() {
        // Platform records created before any checkout carry no billing fields
        let json = r#"{"id": "usr_2", "email": "new@example.com"}"#;
        let sub: Subscriber = serde_json::from_str(json).unwrap();
        assert_eq!(sub.subscription_status, SubscriptionStatus::None);
        assert!(sub.subscription_plan.is_none());
        assert!(sub.subscription_expires_at.is_none());
        assert!(!sub.has_access(Utc::now()));
    }

    #[test]
    fn role_defaults_to_user() {
        let json = r#"{"id": "usr_3", "email": "x@example.com"}"#;
        let sub: Subscriber = serde_json::from_str(json).unwrap();
        assert!(!sub.is_admin());
    }

    #[test]
    fn admin_role_round_trips() {
        let json = r#"{"id": "usr_4", "email": "ops@example.com", "role": "admin"}"#;
        let sub: Subscriber = serde_json::from_str(json).unwrap();
        assert!(sub.is_admin());
    }

    // ══════════════════════════════════════════════════════════════
    // Entitlement View Tests
    // ══════════════════════════════════════════════════════════════

    #[test]
    fn view_projects_subscriber_fields() {
        let now = Utc::now();
        let sub = subscriber(SubscriptionStatus::Active, Some(now + Duration::days(3)));
        let view = EntitlementView::of(&sub, now);
        assert!(view.has_access);
        assert_eq!(view.status, SubscriptionStatus::Active);
        assert_eq!(view.plan, Some(SubscriptionPlan::Monthly));
    }

    #[test]
    fn none_view_denies_access() {
        let view = EntitlementView::none();
        assert!(!view.has_access);
        assert_eq!(view.status, SubscriptionStatus::None);
    }
}
