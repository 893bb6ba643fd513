//! Capability schema
//!
//! The static catalog of feature areas and the capability keys each one
//! defines. Every matrix in the crate is sized and addressed through this
//! catalog, so a key outside of it cannot be represented once parsed.

use crate::errors::{AccessError, AccessResult};
use serde::ser::{Serialize, SerializeMap, Serializer};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

const DASHBOARD: &[&str] = &[
    "canViewRevenue",
    "canViewLoadStatistics",
    "canViewPerformanceCharts",
    "canViewQuickActions",
    "canViewAlerts",
    "canViewRecentActivity",
    "canExportData",
];

const DISPATCH_CENTRAL: &[&str] = &[
    "canViewLoadBoard",
    "canCreateLoads",
    "canAssignDrivers",
    "canViewDriverLocations",
    "canAccessRoutePlanning",
    "canViewCommunicationHub",
    "canGenerateDocuments",
    "canViewRealTimeTracking",
    "canManageDispatchFees",
    "canViewLoadHistory",
];

const BROKER_BOX: &[&str] = &[
    "canViewShipperManagement",
    "canCreateQuotes",
    "canPostLoads",
    "canViewMarketRates",
    "canAccessRfxCenter",
    "canViewPerformanceAnalytics",
    "canManageCustomerRelations",
    "canAccessLoadMatching",
    "canViewCommissionTracking",
    "canManageBrokerTools",
];

const DRIVER_MANAGEMENT: &[&str] = &[
    "canViewDriverList",
    "canCreateDriverProfiles",
    "canEditDriverDetails",
    "canViewDriverPerformance",
    "canManageDriverScheduling",
    "canAccessDriverCommunication",
    "canViewDriverDocuments",
    "canManageDriverOnboarding",
    "canViewDriverFinancials",
    "canAccessDriverPortal",
];

const FLEET_FLOW: &[&str] = &[
    "canViewRouteOptimization",
    "canCreateRoutes",
    "canViewVehicleManagement",
    "canAccessMaintenanceScheduling",
    "canViewFuelManagement",
    "canAccessFleetTracking",
    "canViewFleetAnalytics",
    "canManageVehicleDocuments",
    "canViewFleetPerformance",
    "canAccessFleetReporting",
];

const ANALYTICS: &[&str] = &[
    "canViewRevenueAnalytics",
    "canViewPerformanceMetrics",
    "canViewCustomerAnalytics",
    "canViewOperationalAnalytics",
    "canViewProfitabilityAnalysis",
    "canViewTrendAnalysis",
    "canCreateCustomReports",
    "canExportAnalyticsData",
    "canViewRealTimeMetrics",
    "canAccessPredictiveAnalytics",
];

const FINANCIALS: &[&str] = &[
    "canViewInvoicing",
    "canViewAccountsReceivable",
    "canViewAccountsPayable",
    "canViewPayroll",
    "canViewCashFlow",
    "canViewProfitLoss",
    "canViewTaxDocuments",
    "canProcessPayments",
    "canViewFinancialReports",
    "canAccessAuditTrail",
];

const SETTINGS: &[&str] = &[
    "canViewUserManagement",
    "canCreateUsers",
    "canEditPermissions",
    "canViewSystemSettings",
    "canManageIntegrations",
    "canViewSecuritySettings",
    "canAccessBackupSettings",
    "canViewAuditLogs",
    "canManageCompanySettings",
    "canAccessDeveloperTools",
];

const TRAINING: &[&str] = &[
    "canViewTrainingModules",
    "canTakeQuizzes",
    "canViewCertificates",
    "canViewProgress",
    "canAccessInstructor",
    "canManageTrainingContent",
    "canViewAllUserProgress",
    "canAssignTraining",
    "canGenerateCertificates",
    "canAccessTrainingAnalytics",
];

const COMPLIANCE: &[&str] = &[
    "canViewDOTCompliance",
    "canManageDriverQualifications",
    "canViewSafetyRecords",
    "canAccessInspectionReports",
    "canViewViolationTracking",
    "canManageComplianceDocuments",
    "canViewCSAScores",
    "canAccessAuditPrep",
    "canViewComplianceAnalytics",
    "canManageComplianceAlerts",
];

const ACCOUNTING: &[&str] = &[
    "canViewRevenueDashboard",
    "canViewExpenseTracking",
    "canViewInvoiceManagement",
    "canViewPayrollProcessing",
    "canViewTaxManagement",
    "canViewFinancialReporting",
    "canViewCashFlowAnalysis",
    "canProcessPayments",
    "canViewAccountingAudit",
    "canAccessFinancialSettings",
];

/// Total number of capability keys across every feature area.
pub const CAPABILITY_COUNT: usize = 107;

/// A named grouping of related capabilities, one per dashboard page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, serde::Serialize)]
#[serde(rename_all = "camelCase")]
pub enum FeatureArea {
    Dashboard,
    DispatchCentral,
    BrokerBox,
    DriverManagement,
    FleetFlow,
    Analytics,
    Financials,
    Settings,
    Training,
    Compliance,
    Accounting,
}

impl FeatureArea {
    /// Every area in catalog order.
    pub const ALL: [FeatureArea; 11] = [
        FeatureArea::Dashboard,
        FeatureArea::DispatchCentral,
        FeatureArea::BrokerBox,
        FeatureArea::DriverManagement,
        FeatureArea::FleetFlow,
        FeatureArea::Analytics,
        FeatureArea::Financials,
        FeatureArea::Settings,
        FeatureArea::Training,
        FeatureArea::Compliance,
        FeatureArea::Accounting,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureArea::Dashboard => "dashboard",
            FeatureArea::DispatchCentral => "dispatchCentral",
            FeatureArea::BrokerBox => "brokerBox",
            FeatureArea::DriverManagement => "driverManagement",
            FeatureArea::FleetFlow => "fleetFlow",
            FeatureArea::Analytics => "analytics",
            FeatureArea::Financials => "financials",
            FeatureArea::Settings => "settings",
            FeatureArea::Training => "training",
            FeatureArea::Compliance => "compliance",
            FeatureArea::Accounting => "accounting",
        }
    }

    /// Capability key names defined for this area, in catalog order.
    pub fn key_names(&self) -> &'static [&'static str] {
        match self {
            FeatureArea::Dashboard => DASHBOARD,
            FeatureArea::DispatchCentral => DISPATCH_CENTRAL,
            FeatureArea::BrokerBox => BROKER_BOX,
            FeatureArea::DriverManagement => DRIVER_MANAGEMENT,
            FeatureArea::FleetFlow => FLEET_FLOW,
            FeatureArea::Analytics => ANALYTICS,
            FeatureArea::Financials => FINANCIALS,
            FeatureArea::Settings => SETTINGS,
            FeatureArea::Training => TRAINING,
            FeatureArea::Compliance => COMPLIANCE,
            FeatureArea::Accounting => ACCOUNTING,
        }
    }

    /// Capability keys defined for this area.
    pub fn keys(self) -> impl Iterator<Item = CapabilityKey> {
        let offset = self.offset();
        self.key_names()
            .iter()
            .enumerate()
            .map(move |(i, name)| CapabilityKey {
                area: self,
                name: *name,
                index: offset + i,
            })
    }

    fn offset(&self) -> usize {
        FeatureArea::ALL
            .iter()
            .take_while(|area| *area != self)
            .map(|area| area.key_names().len())
            .sum()
    }
}

impl FromStr for FeatureArea {
    type Err = AccessError;

    fn from_str(input: &str) -> Result<FeatureArea, Self::Err> {
        FeatureArea::ALL
            .iter()
            .copied()
            .find(|area| area.as_str() == input)
            .ok_or_else(|| AccessError::unknown_area(input))
    }
}

impl fmt::Display for FeatureArea {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One boolean-valued permission within a feature area.
///
/// Only obtainable through the catalog, so holding a `CapabilityKey` proves
/// the area/key pair exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CapabilityKey {
    area: FeatureArea,
    name: &'static str,
    index: usize,
}

impl CapabilityKey {
    /// Find a key by area and name, `None` when the catalog does not define it.
    pub fn lookup(area: FeatureArea, name: &str) -> Option<Self> {
        area.keys().find(|key| key.name == name)
    }

    /// Resolve a key, treating an unknown pair as a schema violation.
    pub fn resolve(context: &str, area: FeatureArea, name: &str) -> AccessResult<Self> {
        Self::lookup(area, name)
            .ok_or_else(|| AccessError::schema_violation(context, area.as_str(), name))
    }

    /// Parse a key from string area and name.
    pub fn parse(context: &str, area: &str, name: &str) -> AccessResult<Self> {
        let feature_area = FeatureArea::from_str(area)
            .map_err(|_| AccessError::schema_violation(context, area, name))?;
        Self::resolve(context, feature_area, name)
    }

    /// Every key in the catalog, in catalog order.
    pub fn all() -> impl Iterator<Item = CapabilityKey> {
        FeatureArea::ALL.into_iter().flat_map(FeatureArea::keys)
    }

    pub fn area(&self) -> FeatureArea {
        self.area
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub(crate) fn index(&self) -> usize {
        self.index
    }
}

impl fmt::Display for CapabilityKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.area, self.name)
    }
}

/// Compact description of which keys of one area a static table grants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AreaGrant {
    All,
    Only(&'static [&'static str]),
    AllExcept(&'static [&'static str]),
}

impl AreaGrant {
    /// Expand into concrete keys, rejecting any listed name the area does not define.
    pub fn expand(&self, context: &str, area: FeatureArea) -> AccessResult<Vec<CapabilityKey>> {
        match self {
            AreaGrant::All => Ok(area.keys().collect()),
            AreaGrant::Only(names) => names
                .iter()
                .map(|name| CapabilityKey::resolve(context, area, name))
                .collect(),
            AreaGrant::AllExcept(names) => {
                let excluded = names
                    .iter()
                    .map(|name| CapabilityKey::resolve(context, area, name))
                    .collect::<AccessResult<Vec<_>>>()?;
                Ok(area.keys().filter(|key| !excluded.contains(key)).collect())
            }
        }
    }
}

/// A total assignment of a boolean to every key in the catalog.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PermissionMatrix {
    cells: [bool; CAPABILITY_COUNT],
}

impl PermissionMatrix {
    pub fn all_false() -> Self {
        Self {
            cells: [false; CAPABILITY_COUNT],
        }
    }

    pub fn all_true() -> Self {
        Self {
            cells: [true; CAPABILITY_COUNT],
        }
    }

    pub fn get(&self, key: CapabilityKey) -> bool {
        self.cells[key.index()]
    }

    pub fn set(&mut self, key: CapabilityKey, value: bool) {
        self.cells[key.index()] = value;
    }

    /// Look up a cell by area and key name; `None` if the key is not in the catalog.
    pub fn get_named(&self, area: FeatureArea, name: &str) -> Option<bool> {
        CapabilityKey::lookup(area, name).map(|key| self.get(key))
    }

    pub fn iter(&self) -> impl Iterator<Item = (CapabilityKey, bool)> + '_ {
        CapabilityKey::all().map(move |key| (key, self.get(key)))
    }

    /// Keys whose value is `true`.
    pub fn granted(&self) -> impl Iterator<Item = CapabilityKey> + '_ {
        self.iter().filter(|(_, value)| *value).map(|(key, _)| key)
    }

    /// Snapshot of one area as `key -> value`.
    pub fn area(&self, area: FeatureArea) -> BTreeMap<&'static str, bool> {
        area.keys().map(|key| (key.name(), self.get(key))).collect()
    }

    /// Whether every cell in this matrix is `false`.
    pub fn is_all_false(&self) -> bool {
        self.cells.iter().all(|cell| !cell)
    }

    /// Whether every cell in this matrix is `true`.
    pub fn is_all_true(&self) -> bool {
        self.cells.iter().all(|cell| *cell)
    }
}

impl Serialize for PermissionMatrix {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(FeatureArea::ALL.len()))?;
        for area in FeatureArea::ALL {
            map.serialize_entry(area.as_str(), &self.area(area))?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_size_matches_constant() {
        let total: usize = FeatureArea::ALL.iter().map(|a| a.key_names().len()).sum();
        assert_eq!(total, CAPABILITY_COUNT);
        assert_eq!(CapabilityKey::all().count(), CAPABILITY_COUNT);
    }

    #[test]
    fn test_indices_are_dense_and_unique() {
        let indices: HashSet<usize> = CapabilityKey::all().map(|k| k.index()).collect();
        assert_eq!(indices.len(), CAPABILITY_COUNT);
        assert!(indices.iter().all(|i| *i < CAPABILITY_COUNT));
    }

    #[test]
    fn test_key_names_unique_within_area() {
        for area in FeatureArea::ALL {
            let names: HashSet<&str> = area.key_names().iter().copied().collect();
            assert_eq!(names.len(), area.key_names().len(), "duplicate key in {area}");
        }
    }

    #[test]
    fn test_area_round_trips_through_str() {
        for area in FeatureArea::ALL {
            assert_eq!(area.as_str().parse::<FeatureArea>().unwrap(), area);
        }
        assert!("payroll".parse::<FeatureArea>().is_err());
    }

    #[test]
    fn test_lookup_rejects_keys_from_other_areas() {
        assert!(CapabilityKey::lookup(FeatureArea::Financials, "canViewInvoicing").is_some());
        assert!(CapabilityKey::lookup(FeatureArea::Dashboard, "canViewInvoicing").is_none());

        let err = CapabilityKey::parse("test", "financials", "canViewInvoicng").unwrap_err();
        assert!(matches!(err, AccessError::SchemaViolation { .. }));
    }

    #[test]
    fn test_same_name_in_two_areas_is_two_keys() {
        let fin = CapabilityKey::lookup(FeatureArea::Financials, "canProcessPayments").unwrap();
        let acc = CapabilityKey::lookup(FeatureArea::Accounting, "canProcessPayments").unwrap();
        assert_ne!(fin, acc);

        let mut matrix = PermissionMatrix::all_false();
        matrix.set(acc, true);
        assert!(!matrix.get(fin));
        assert!(matrix.get(acc));
    }

    #[test]
    fn test_constructors_are_uniform() {
        assert!(PermissionMatrix::all_false().is_all_false());
        assert!(PermissionMatrix::all_true().is_all_true());
        assert_eq!(PermissionMatrix::all_true().granted().count(), CAPABILITY_COUNT);
    }

    #[test]
    fn test_area_grant_expansion() {
        let all = AreaGrant::All.expand("t", FeatureArea::Dashboard).unwrap();
        assert_eq!(all.len(), 7);

        let except = AreaGrant::AllExcept(&["canExportData"])
            .expand("t", FeatureArea::Dashboard)
            .unwrap();
        assert_eq!(except.len(), 6);
        assert!(except.iter().all(|k| k.name() != "canExportData"));

        let typo = AreaGrant::Only(&["canExportDat"]).expand("t", FeatureArea::Dashboard);
        assert!(matches!(typo, Err(AccessError::SchemaViolation { .. })));

        let typo_except = AreaGrant::AllExcept(&["canFly"]).expand("t", FeatureArea::Settings);
        assert!(typo_except.is_err());
    }

    #[test]
    fn test_serializes_as_nested_areas() {
        let value = serde_json::to_value(PermissionMatrix::all_false()).unwrap();
        let areas = value.as_object().unwrap();
        assert_eq!(areas.len(), 11);
        assert_eq!(areas["dashboard"].as_object().unwrap().len(), 7);
        assert_eq!(value["financials"]["canViewInvoicing"], false);
    }
}
