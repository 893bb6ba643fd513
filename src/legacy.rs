//! Named composite checks kept for older call sites.
//!
//! Each check only aliases matrix cells (or an OR of two). The set is closed:
//! an unrecognized name is an error, never an implicit grant.

use crate::engine::PermissionEngine;
use crate::errors::{AccessError, AccessResult};
use crate::schema::{FeatureArea, PermissionMatrix};
use crate::user::User;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LegacyCheck {
    HasManagementAccess,
    HasAnalyticsAccess,
    HasFinancialsAccess,
    CanEditLoads,
    CanViewFinancials,
}

impl LegacyCheck {
    pub const ALL: [LegacyCheck; 5] = [
        LegacyCheck::HasManagementAccess,
        LegacyCheck::HasAnalyticsAccess,
        LegacyCheck::HasFinancialsAccess,
        LegacyCheck::CanEditLoads,
        LegacyCheck::CanViewFinancials,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            LegacyCheck::HasManagementAccess => "hasManagementAccess",
            LegacyCheck::HasAnalyticsAccess => "hasAnalyticsAccess",
            LegacyCheck::HasFinancialsAccess => "hasFinancialsAccess",
            LegacyCheck::CanEditLoads => "canEditLoads",
            LegacyCheck::CanViewFinancials => "canViewFinancials",
        }
    }

    /// Evaluate against an already resolved matrix.
    pub fn evaluate(&self, permissions: &PermissionMatrix) -> bool {
        let cell = |area, name| permissions.get_named(area, name).unwrap_or(false);
        match self {
            LegacyCheck::HasManagementAccess => {
                cell(FeatureArea::Analytics, "canViewRevenueAnalytics")
                    || cell(FeatureArea::Financials, "canViewInvoicing")
            }
            LegacyCheck::HasAnalyticsAccess => cell(FeatureArea::Analytics, "canViewRevenueAnalytics"),
            LegacyCheck::HasFinancialsAccess | LegacyCheck::CanViewFinancials => {
                cell(FeatureArea::Financials, "canViewInvoicing")
            }
            LegacyCheck::CanEditLoads => cell(FeatureArea::DispatchCentral, "canCreateLoads"),
        }
    }
}

impl FromStr for LegacyCheck {
    type Err = AccessError;

    fn from_str(input: &str) -> Result<LegacyCheck, Self::Err> {
        LegacyCheck::ALL
            .into_iter()
            .find(|check| check.as_str() == input)
            .ok_or_else(|| AccessError::unknown_legacy_check(input))
    }
}

impl fmt::Display for LegacyCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl PermissionEngine {
    pub fn check_legacy(&self, user: &User, check: LegacyCheck) -> bool {
        check.evaluate(&self.resolve(user))
    }

    /// Parse `name` and evaluate it; unknown names fail instead of granting.
    pub fn check_legacy_named(&self, user: &User, name: &str) -> AccessResult<bool> {
        let check: LegacyCheck = name.parse()?;
        Ok(self.check_legacy(user, check))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::role::Role;
    use crate::subscription::{SubscriptionState, SubscriptionStatus, SubscriptionTier};

    fn user(role: Role) -> User {
        User::new(
            "legacy",
            role,
            SubscriptionState::new(SubscriptionStatus::Active, SubscriptionTier::Basic),
        )
    }

    #[test]
    fn test_every_legacy_cell_exists_in_schema() {
        // evaluate() reads missing keys as false, so all-true must satisfy every check
        for check in LegacyCheck::ALL {
            assert!(check.evaluate(&PermissionMatrix::all_true()), "{check}");
            assert!(!check.evaluate(&PermissionMatrix::all_false()), "{check}");
        }
    }

    #[test]
    fn test_names_round_trip() {
        for check in LegacyCheck::ALL {
            assert_eq!(check.as_str().parse::<LegacyCheck>().unwrap(), check);
        }
    }

    #[test]
    fn test_unknown_name_fails_loudly() {
        let engine = PermissionEngine::standard().unwrap();
        let err = engine
            .check_legacy_named(&user(Role::Admin), "hasEverythingAccess")
            .unwrap_err();
        assert!(matches!(err, AccessError::UnknownLegacyCheck { .. }));
    }

    #[test]
    fn test_role_outcomes() {
        let engine = PermissionEngine::standard().unwrap();
        assert!(engine.check_legacy(&user(Role::Manager), LegacyCheck::HasManagementAccess));
        assert!(engine.check_legacy(&user(Role::Manager), LegacyCheck::CanEditLoads));
        assert!(!engine.check_legacy(&user(Role::Dispatcher), LegacyCheck::CanEditLoads));
        assert!(!engine.check_legacy(&user(Role::Broker), LegacyCheck::HasFinancialsAccess));
        assert!(engine
            .check_legacy_named(&user(Role::Admin), "canViewFinancials")
            .unwrap());
    }
}
