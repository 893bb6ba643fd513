use crate::errors::AccessResult;
use crate::role::Role;
use crate::schema::{AreaGrant, FeatureArea, PermissionMatrix};
use std::collections::HashMap;
use tracing::warn;

type RoleGrants = &'static [(FeatureArea, AreaGrant)];

const DASHBOARD_OPERATIONAL: AreaGrant = AreaGrant::Only(&[
    "canViewLoadStatistics",
    "canViewPerformanceCharts",
    "canViewQuickActions",
    "canViewAlerts",
    "canViewRecentActivity",
]);

const TRAINING_LEARNER: AreaGrant = AreaGrant::Only(&[
    "canViewTrainingModules",
    "canTakeQuizzes",
    "canViewCertificates",
    "canViewProgress",
]);

const ADMIN: RoleGrants = &[
    (FeatureArea::Dashboard, AreaGrant::All),
    (FeatureArea::DispatchCentral, AreaGrant::All),
    (FeatureArea::BrokerBox, AreaGrant::All),
    (FeatureArea::DriverManagement, AreaGrant::All),
    (FeatureArea::FleetFlow, AreaGrant::All),
    (FeatureArea::Analytics, AreaGrant::All),
    (FeatureArea::Financials, AreaGrant::All),
    (FeatureArea::Settings, AreaGrant::All),
    (FeatureArea::Training, AreaGrant::All),
    (FeatureArea::Compliance, AreaGrant::All),
    (FeatureArea::Accounting, AreaGrant::All),
];

const MANAGER: RoleGrants = &[
    (FeatureArea::Dashboard, AreaGrant::All),
    (FeatureArea::DispatchCentral, AreaGrant::All),
    (FeatureArea::BrokerBox, AreaGrant::All),
    (FeatureArea::DriverManagement, AreaGrant::All),
    (FeatureArea::FleetFlow, AreaGrant::All),
    (FeatureArea::Analytics, AreaGrant::All),
    (FeatureArea::Financials, AreaGrant::AllExcept(&["canProcessPayments"])),
    // Permission editing, system, integrations, security, backup and developer tools are admin only
    (
        FeatureArea::Settings,
        AreaGrant::Only(&[
            "canViewUserManagement",
            "canCreateUsers",
            "canViewAuditLogs",
            "canManageCompanySettings",
        ]),
    ),
    (FeatureArea::Training, AreaGrant::All),
    (FeatureArea::Compliance, AreaGrant::All),
    (
        FeatureArea::Accounting,
        AreaGrant::AllExcept(&["canProcessPayments", "canAccessFinancialSettings"]),
    ),
];

const DISPATCHER: RoleGrants = &[
    (FeatureArea::Dashboard, DASHBOARD_OPERATIONAL),
    // Dispatchers receive loads from brokers rather than creating them
    (FeatureArea::DispatchCentral, AreaGrant::AllExcept(&["canCreateLoads"])),
    (FeatureArea::DriverManagement, AreaGrant::AllExcept(&["canViewDriverFinancials"])),
    (
        FeatureArea::FleetFlow,
        AreaGrant::AllExcept(&[
            "canViewFuelManagement",
            "canViewFleetAnalytics",
            "canAccessFleetReporting",
        ]),
    ),
    (FeatureArea::Training, TRAINING_LEARNER),
    (
        FeatureArea::Compliance,
        AreaGrant::AllExcept(&["canAccessAuditPrep", "canViewComplianceAnalytics"]),
    ),
];

const BROKER: RoleGrants = &[
    (FeatureArea::Dashboard, DASHBOARD_OPERATIONAL),
    (FeatureArea::BrokerBox, AreaGrant::All),
    (FeatureArea::Training, TRAINING_LEARNER),
    (FeatureArea::Compliance, AreaGrant::Only(&["canViewDOTCompliance"])),
];

const DRIVER: RoleGrants = &[
    (FeatureArea::Dashboard, DASHBOARD_OPERATIONAL),
    (FeatureArea::DriverManagement, AreaGrant::Only(&["canAccessDriverPortal"])),
    (FeatureArea::Training, TRAINING_LEARNER),
    (
        FeatureArea::Compliance,
        AreaGrant::Only(&[
            "canViewDOTCompliance",
            "canViewSafetyRecords",
            "canAccessInspectionReports",
            "canViewViolationTracking",
        ]),
    ),
];

const INSTRUCTOR: RoleGrants = &[
    (
        FeatureArea::Dashboard,
        AreaGrant::Only(&[
            "canViewPerformanceCharts",
            "canViewQuickActions",
            "canViewAlerts",
            "canViewRecentActivity",
        ]),
    ),
    (FeatureArea::Settings, AreaGrant::Only(&["canViewUserManagement"])),
    (FeatureArea::Training, AreaGrant::All),
    (
        FeatureArea::Compliance,
        AreaGrant::Only(&["canViewDOTCompliance", "canViewSafetyRecords"]),
    ),
];

fn grants_for(role: &Role) -> RoleGrants {
    match role {
        Role::Admin => ADMIN,
        Role::Manager => MANAGER,
        Role::Dispatcher => DISPATCHER,
        Role::Broker => BROKER,
        Role::Driver => DRIVER,
        Role::Instructor => INSTRUCTOR,
        Role::Unprovisioned(_) => &[],
    }
}

/// Baseline permission matrix for each provisioned role.
///
/// Areas a role's grant list does not mention are denied entirely.
#[derive(Debug, Clone)]
pub struct RoleDefaultTable {
    defaults: HashMap<Role, PermissionMatrix>,
}

impl RoleDefaultTable {
    /// Build the standard table, validating every grant against the catalog.
    pub fn standard() -> AccessResult<Self> {
        let mut defaults = HashMap::new();
        for role in Role::PROVISIONED {
            let context = format!("role default for {role}");
            let mut matrix = PermissionMatrix::all_false();
            for (area, grant) in grants_for(&role) {
                for key in grant.expand(&context, *area)? {
                    matrix.set(key, true);
                }
            }
            defaults.insert(role, matrix);
        }
        Ok(Self { defaults })
    }

    /// Baseline matrix for `role`; roles without an entry are denied everything.
    pub fn role_defaults(&self, role: &Role) -> PermissionMatrix {
        match self.defaults.get(role) {
            Some(matrix) => *matrix,
            None => {
                warn!(role = %role, "role is not provisioned, resolving to deny-all");
                PermissionMatrix::all_false()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::CapabilityKey;

    fn cell(matrix: &PermissionMatrix, area: FeatureArea, name: &str) -> bool {
        matrix.get_named(area, name).expect("key in catalog")
    }

    #[test]
    fn test_standard_table_builds_for_every_role() {
        let table = RoleDefaultTable::standard().unwrap();
        assert_eq!(table.defaults.len(), Role::PROVISIONED.len());
    }

    #[test]
    fn test_admin_is_all_true() {
        let table = RoleDefaultTable::standard().unwrap();
        assert!(table.role_defaults(&Role::Admin).is_all_true());
    }

    #[test]
    fn test_unprovisioned_role_is_all_false() {
        let table = RoleDefaultTable::standard().unwrap();
        let matrix = table.role_defaults(&Role::Unprovisioned("auditor".into()));
        assert!(matrix.is_all_false());
    }

    #[test]
    fn test_manager_restrictions() {
        let table = RoleDefaultTable::standard().unwrap();
        let m = table.role_defaults(&Role::Manager);
        assert!(!cell(&m, FeatureArea::Financials, "canProcessPayments"));
        assert!(cell(&m, FeatureArea::Financials, "canViewInvoicing"));
        assert!(!cell(&m, FeatureArea::Settings, "canEditPermissions"));
        assert!(cell(&m, FeatureArea::Settings, "canCreateUsers"));
        assert!(!cell(&m, FeatureArea::Accounting, "canProcessPayments"));
        assert!(!cell(&m, FeatureArea::Accounting, "canAccessFinancialSettings"));
        assert!(cell(&m, FeatureArea::Accounting, "canViewAccountingAudit"));
    }

    #[test]
    fn test_dispatcher_defaults() {
        let table = RoleDefaultTable::standard().unwrap();
        let d = table.role_defaults(&Role::Dispatcher);
        assert!(cell(&d, FeatureArea::DispatchCentral, "canAssignDrivers"));
        assert!(!cell(&d, FeatureArea::DispatchCentral, "canCreateLoads"));
        assert!(!cell(&d, FeatureArea::DriverManagement, "canViewDriverFinancials"));
        assert!(!cell(&d, FeatureArea::Dashboard, "canViewRevenue"));
        assert!(!cell(&d, FeatureArea::FleetFlow, "canViewFuelManagement"));
        assert!(d.area(FeatureArea::Financials).values().all(|v| !v));
        assert!(d.area(FeatureArea::BrokerBox).values().all(|v| !v));
    }

    #[test]
    fn test_broker_has_no_dispatch_access() {
        let table = RoleDefaultTable::standard().unwrap();
        let b = table.role_defaults(&Role::Broker);
        assert!(b.area(FeatureArea::DispatchCentral).values().all(|v| !v));
        assert!(b.area(FeatureArea::BrokerBox).values().all(|v| *v));
        assert!(cell(&b, FeatureArea::Compliance, "canViewDOTCompliance"));
        assert!(!cell(&b, FeatureArea::Compliance, "canViewCSAScores"));
    }

    #[test]
    fn test_driver_sees_only_own_portal() {
        let table = RoleDefaultTable::standard().unwrap();
        let d = table.role_defaults(&Role::Driver);
        let granted: Vec<CapabilityKey> = d
            .granted()
            .filter(|k| k.area() == FeatureArea::DriverManagement)
            .collect();
        assert_eq!(granted.len(), 1);
        assert_eq!(granted[0].name(), "canAccessDriverPortal");
    }

    #[test]
    fn test_instructor_owns_training() {
        let table = RoleDefaultTable::standard().unwrap();
        let i = table.role_defaults(&Role::Instructor);
        assert!(i.area(FeatureArea::Training).values().all(|v| *v));
        assert!(cell(&i, FeatureArea::Settings, "canViewUserManagement"));
        assert!(!cell(&i, FeatureArea::Dashboard, "canViewLoadStatistics"));
    }
}
