//! Payment reference generation.
//!
//! A reference is unique with overwhelming probability per checkout attempt:
//! it combines the plan, wall-clock milliseconds, and the caller's identity,
//! so two concurrent checkouts by the same user cannot collide.

use chrono::{DateTime, Utc};

use super::plan::SubscriptionPlan;

/// External payment reference attached to a checkout or manual activation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaymentReference(String);

impl PaymentReference {
    /// Reference for a gateway checkout: `SUB_{plan}_{millis}_{user_id}`.
    pub fn for_checkout(plan: SubscriptionPlan, user_id: &str, now: DateTime<Utc>) -> Self {
        Self(format!(
            "SUB_{}_{}_{}",
            plan.as_str(),
            now.timestamp_millis(),
            user_id
        ))
    }

    /// Reference for a manual activation: `MANUAL_{millis}`.
    pub fn manual(now: DateTime<Utc>) -> Self {
        Self(format!("MANUAL_{}", now.timestamp_millis()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl std::fmt::Display for PaymentReference {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn checkout_reference_embeds_plan_time_and_identity() {
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        let reference =
            PaymentReference::for_checkout(SubscriptionPlan::SixMonths, "usr_42", now);
        assert_eq!(
            reference.as_str(),
            format!("SUB_6months_{}_usr_42", now.timestamp_millis())
        );
    }

    #[test]
    fn concurrent_checkouts_by_same_user_differ_across_millis() {
        let t1 = Utc.timestamp_millis_opt(1_700_000_000_000).unwrap();
        let t2 = Utc.timestamp_millis_opt(1_700_000_000_001).unwrap();
        let a = PaymentReference::for_checkout(SubscriptionPlan::Monthly, "usr_1", t1);
        let b = PaymentReference::for_checkout(SubscriptionPlan::Monthly, "usr_1", t2);
        assert_ne!(a, b);
    }

    #[test]
    fn different_plans_produce_different_references() {
        let now = Utc::now();
        let a = PaymentReference::for_checkout(SubscriptionPlan::Monthly, "usr_1", now);
        let b = PaymentReference::for_checkout(SubscriptionPlan::Annual, "usr_1", now);
        assert_ne!(a, b);
    }

    #[test]
    fn manual_reference_is_prefixed() {
        let now = Utc::now();
        let reference = PaymentReference::manual(now);
        assert!(reference.as_str().starts_with("MANUAL_"));
    }
}
