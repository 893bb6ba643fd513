//! Subscription state as supplied by the billing collaborator.
//!
//! The engine only reads these values; it never mutates or persists them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    Active,
    Trial,
    Expired,
    Canceled,
}

impl SubscriptionStatus {
    /// Whether the subscription currently entitles the account to use the platform.
    pub fn is_usable(&self) -> bool {
        matches!(self, SubscriptionStatus::Active | SubscriptionStatus::Trial)
    }
}

impl fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SubscriptionStatus::Active => "active",
            SubscriptionStatus::Trial => "trial",
            SubscriptionStatus::Expired => "expired",
            SubscriptionStatus::Canceled => "canceled",
        };
        f.write_str(name)
    }
}

/// Subscription tier. Unknown tier names fall back to `Basic`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum SubscriptionTier {
    #[default]
    Basic,
    Professional,
    Enterprise,
    University,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Professional => "professional",
            SubscriptionTier::Enterprise => "enterprise",
            SubscriptionTier::University => "university",
        }
    }
}

impl From<String> for SubscriptionTier {
    fn from(input: String) -> Self {
        match input.to_lowercase().as_str() {
            "professional" => SubscriptionTier::Professional,
            "enterprise" => SubscriptionTier::Enterprise,
            "university" => SubscriptionTier::University,
            _ => SubscriptionTier::Basic,
        }
    }
}

impl From<SubscriptionTier> for String {
    fn from(tier: SubscriptionTier) -> Self {
        tier.as_str().to_string()
    }
}

impl fmt::Display for SubscriptionTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscriptionState {
    pub status: SubscriptionStatus,
    #[serde(default)]
    pub tier: SubscriptionTier,
    /// Iterated in lexicographic order when building the overlay.
    #[serde(default)]
    pub plan_ids: BTreeSet<String>,
}

impl SubscriptionState {
    pub fn new(status: SubscriptionStatus, tier: SubscriptionTier) -> Self {
        Self {
            status,
            tier,
            plan_ids: BTreeSet::new(),
        }
    }

    pub fn with_plan(mut self, plan_id: impl Into<String>) -> Self {
        self.plan_ids.insert(plan_id.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usable_statuses() {
        assert!(SubscriptionStatus::Active.is_usable());
        assert!(SubscriptionStatus::Trial.is_usable());
        assert!(!SubscriptionStatus::Expired.is_usable());
        assert!(!SubscriptionStatus::Canceled.is_usable());
    }

    #[test]
    fn test_missing_and_unknown_tier_default_to_basic() {
        let missing: SubscriptionState = serde_json::from_str(r#"{"status":"active"}"#).unwrap();
        assert_eq!(missing.tier, SubscriptionTier::Basic);
        assert!(missing.plan_ids.is_empty());

        let unknown: SubscriptionState =
            serde_json::from_str(r#"{"status":"trial","tier":"platinum"}"#).unwrap();
        assert_eq!(unknown.tier, SubscriptionTier::Basic);
    }

    #[test]
    fn test_plan_ids_deserialize_into_ordered_set() {
        let state: SubscriptionState = serde_json::from_str(
            r#"{"status":"active","tier":"professional","planIds":["z_plan","a_plan","z_plan"]}"#,
        )
        .unwrap();
        let ids: Vec<&str> = state.plan_ids.iter().map(String::as_str).collect();
        assert_eq!(ids, vec!["a_plan", "z_plan"]);
    }

    #[test]
    fn test_unknown_status_is_rejected_at_parse_time() {
        let result: Result<SubscriptionState, _> =
            serde_json::from_str(r#"{"status":"paused","tier":"basic"}"#);
        assert!(result.is_err());
    }
}
