use crate::errors::{AccessError, AccessResult};
use crate::overrides::CustomOverrides;
use crate::role::Role;
use crate::subscription::SubscriptionState;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// The engine's sole input: who the user is, what they pay for, and any
/// administrator-set exceptions. Supplied by the caller per request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub role: Role,
    pub subscription_state: SubscriptionState,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub custom_overrides: Option<CustomOverrides>,
}

impl User {
    pub fn new(id: impl Into<String>, role: Role, subscription_state: SubscriptionState) -> Self {
        Self {
            id: id.into(),
            role,
            subscription_state,
            custom_overrides: None,
        }
    }

    pub fn with_overrides(mut self, overrides: CustomOverrides) -> Self {
        self.custom_overrides = Some(overrides);
        self
    }

    /// Load a user record from a JSON file
    pub fn from_file<P: AsRef<Path>>(path: P) -> AccessResult<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .map_err(|e| AccessError::io(format!("reading user record {}", path.display()), e))?;
        serde_json::from_str(&content)
            .map_err(|e| AccessError::serialization(format!("parsing user record {}", path.display()), e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subscription::{SubscriptionStatus, SubscriptionTier};
    use std::io::Write;

    #[test]
    fn test_parse_full_record() {
        let json = r#"{
            "id": "disp-003",
            "role": "dispatcher",
            "subscriptionState": {"status": "active", "tier": "professional", "planIds": ["professional_dispatcher"]},
            "customOverrides": {"driverManagement": {"canManageDriverOnboarding": false}}
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.role, Role::Dispatcher);
        assert_eq!(user.subscription_state.tier, SubscriptionTier::Professional);
        assert_eq!(user.custom_overrides.as_ref().map(CustomOverrides::len), Some(1));
    }

    #[test]
    fn test_overrides_are_optional() {
        let json = r#"{"id":"d1","role":"driver","subscriptionState":{"status":"expired"}}"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert!(user.custom_overrides.is_none());
        assert_eq!(user.subscription_state.status, SubscriptionStatus::Expired);
    }

    #[test]
    fn test_record_with_bad_override_is_rejected() {
        let json = r#"{
            "id": "x",
            "role": "broker",
            "subscriptionState": {"status": "active"},
            "customOverrides": {"brokerBox": {"canPostLoadz": true}}
        }"#;
        assert!(serde_json::from_str::<User>(json).is_err());
    }

    #[test]
    fn test_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"{{"id":"a1","role":"admin","subscriptionState":{{"status":"canceled"}}}}"#
        )
        .unwrap();
        let user = User::from_file(file.path()).unwrap();
        assert_eq!(user.role, Role::Admin);

        let missing = User::from_file("/nonexistent/user.json");
        assert!(matches!(missing, Err(AccessError::Io { .. })));
    }
}
