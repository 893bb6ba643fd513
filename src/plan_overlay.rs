//! Subscription overlay resolver
//!
//! Maps a subscription tier and the set of purchased plan ids to an additive
//! overlay matrix. Overlays only ever switch capabilities on; see
//! [`monotonic_or`].

use crate::errors::{AccessError, AccessResult};
use crate::schema::{AreaGrant, CapabilityKey, FeatureArea, PermissionMatrix};
use crate::subscription::SubscriptionTier;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, warn};

/// Suffix the billing catalog appends to yearly variants of a monthly plan.
pub const ANNUAL_SUFFIX: &str = "-annual";

/// How fragments from several plans touching the same area are combined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlayMergeMode {
    /// Union of every granted key across all plans.
    #[default]
    KeyUnion,
    /// A later plan's fragment for an area replaces an earlier plan's
    /// fragment for that area wholesale, dropping keys it does not repeat.
    AreaReplace,
}

/// Grants a single plan contributes, grouped by area.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PlanFragment {
    areas: BTreeMap<FeatureArea, BTreeSet<CapabilityKey>>,
}

impl PlanFragment {
    fn from_grants(plan_id: &str, grants: &[(FeatureArea, AreaGrant)]) -> AccessResult<Self> {
        let context = format!("plan {plan_id}");
        let mut areas = BTreeMap::new();
        for (area, grant) in grants {
            let keys: BTreeSet<CapabilityKey> = grant.expand(&context, *area)?.into_iter().collect();
            areas.insert(*area, keys);
        }
        Ok(Self { areas })
    }

    /// Validate a fragment given as `area -> [key, ...]` names, as read from configuration.
    pub fn from_names(plan_id: &str, raw: &BTreeMap<String, Vec<String>>) -> AccessResult<Self> {
        let context = format!("configured plan {plan_id}");
        let mut areas = BTreeMap::new();
        for (area_name, key_names) in raw {
            let area: FeatureArea = area_name
                .parse()
                .map_err(|_| AccessError::schema_violation(&context, area_name, "*"))?;
            let keys = key_names
                .iter()
                .map(|name| CapabilityKey::resolve(&context, area, name))
                .collect::<AccessResult<BTreeSet<_>>>()?;
            areas.insert(area, keys);
        }
        Ok(Self { areas })
    }

    pub fn areas(&self) -> impl Iterator<Item = (FeatureArea, &BTreeSet<CapabilityKey>)> {
        self.areas.iter().map(|(area, keys)| (*area, keys))
    }

    pub fn grants(&self, key: CapabilityKey) -> bool {
        self.areas
            .get(&key.area())
            .is_some_and(|keys| keys.contains(&key))
    }
}

type PlanGrants = &'static [(FeatureArea, AreaGrant)];

const BUILTIN_PLANS: &[(&str, PlanGrants)] = &[
    (
        "university",
        &[
            (
                FeatureArea::Training,
                AreaGrant::Only(&[
                    "canViewTrainingModules",
                    "canTakeQuizzes",
                    "canViewCertificates",
                    "canViewProgress",
                ]),
            ),
            (
                FeatureArea::Compliance,
                AreaGrant::Only(&["canViewDOTCompliance", "canViewSafetyRecords"]),
            ),
            (
                FeatureArea::Dashboard,
                AreaGrant::Only(&["canViewQuickActions", "canViewAlerts", "canViewRecentActivity"]),
            ),
        ],
    ),
    (
        "professional_dispatcher",
        &[
            (FeatureArea::DispatchCentral, AreaGrant::All),
            (
                FeatureArea::DriverManagement,
                AreaGrant::AllExcept(&["canViewDriverFinancials"]),
            ),
            (
                FeatureArea::FleetFlow,
                AreaGrant::AllExcept(&[
                    "canViewFuelManagement",
                    "canViewFleetAnalytics",
                    "canAccessFleetReporting",
                ]),
            ),
            (FeatureArea::Dashboard, AreaGrant::AllExcept(&["canViewRevenue", "canExportData"])),
            (
                FeatureArea::Compliance,
                AreaGrant::AllExcept(&["canAccessAuditPrep", "canViewComplianceAnalytics"]),
            ),
        ],
    ),
    (
        "solo_dispatcher_premium",
        &[
            (FeatureArea::DispatchCentral, AreaGrant::All),
            (FeatureArea::DriverManagement, AreaGrant::All),
            (FeatureArea::FleetFlow, AreaGrant::All),
            (FeatureArea::Dashboard, AreaGrant::All),
            (
                FeatureArea::Analytics,
                AreaGrant::Only(&[
                    "canViewPerformanceMetrics",
                    "canViewOperationalAnalytics",
                    "canCreateCustomReports",
                    "canExportAnalyticsData",
                    "canViewRealTimeMetrics",
                ]),
            ),
        ],
    ),
    (
        "professional_brokerage",
        &[
            (FeatureArea::BrokerBox, AreaGrant::All),
            (FeatureArea::Dashboard, AreaGrant::AllExcept(&["canExportData"])),
            (
                FeatureArea::Analytics,
                AreaGrant::Only(&[
                    "canViewRevenueAnalytics",
                    "canViewPerformanceMetrics",
                    "canViewCustomerAnalytics",
                    "canViewTrendAnalysis",
                ]),
            ),
            (
                FeatureArea::Accounting,
                AreaGrant::Only(&[
                    "canViewRevenueDashboard",
                    "canViewInvoiceManagement",
                    "canViewFinancialReporting",
                ]),
            ),
        ],
    ),
    (
        "solo_broker_premium",
        &[
            (FeatureArea::BrokerBox, AreaGrant::All),
            (FeatureArea::Dashboard, AreaGrant::All),
            (FeatureArea::Analytics, AreaGrant::All),
            (
                FeatureArea::Accounting,
                AreaGrant::AllExcept(&["canProcessPayments", "canAccessFinancialSettings"]),
            ),
        ],
    ),
    (
        "team_dispatch_starter",
        &[
            (
                FeatureArea::DispatchCentral,
                AreaGrant::AllExcept(&["canManageDispatchFees"]),
            ),
            (
                FeatureArea::DriverManagement,
                AreaGrant::Only(&[
                    "canViewDriverList",
                    "canViewDriverPerformance",
                    "canManageDriverScheduling",
                    "canAccessDriverCommunication",
                    "canViewDriverDocuments",
                ]),
            ),
            (
                FeatureArea::Dashboard,
                AreaGrant::Only(&["canViewLoadStatistics", "canViewQuickActions", "canViewAlerts"]),
            ),
        ],
    ),
    (
        "team_brokerage_starter",
        &[
            (
                FeatureArea::BrokerBox,
                AreaGrant::AllExcept(&["canViewCommissionTracking", "canManageBrokerTools"]),
            ),
            (
                FeatureArea::Dashboard,
                AreaGrant::Only(&["canViewLoadStatistics", "canViewQuickActions", "canViewAlerts"]),
            ),
            (FeatureArea::Analytics, AreaGrant::Only(&["canViewPerformanceMetrics"])),
        ],
    ),
    (
        "dispatch_management",
        &[(
            FeatureArea::DispatchCentral,
            AreaGrant::Only(&[
                "canViewLoadBoard",
                "canCreateLoads",
                "canAssignDrivers",
                "canViewLoadHistory",
            ]),
        )],
    ),
    (
        "crm_suite",
        &[(
            FeatureArea::BrokerBox,
            AreaGrant::Only(&["canViewShipperManagement", "canManageCustomerRelations"]),
        )],
    ),
    (
        "broker_operations",
        &[(
            FeatureArea::BrokerBox,
            AreaGrant::Only(&[
                "canCreateQuotes",
                "canPostLoads",
                "canViewMarketRates",
                "canAccessLoadMatching",
            ]),
        )],
    ),
    ("advanced_analytics", &[(FeatureArea::Analytics, AreaGrant::All)]),
    (
        "real_time_tracking",
        &[
            (
                FeatureArea::DispatchCentral,
                AreaGrant::Only(&["canViewDriverLocations", "canViewRealTimeTracking"]),
            ),
            (FeatureArea::FleetFlow, AreaGrant::Only(&["canAccessFleetTracking"])),
        ],
    ),
    (
        "training_certification",
        &[(
            FeatureArea::Training,
            AreaGrant::Only(&[
                "canViewTrainingModules",
                "canTakeQuizzes",
                "canViewCertificates",
                "canViewProgress",
                "canGenerateCertificates",
            ]),
        )],
    ),
];

/// Plan id to fragment lookup plus the rule for combining fragments.
#[derive(Debug, Clone)]
pub struct PlanCatalog {
    plans: BTreeMap<String, PlanFragment>,
    merge_mode: OverlayMergeMode,
    annual_aliases: bool,
}

impl PlanCatalog {
    /// Catalog of the built-in plans, validated against the capability schema.
    pub fn standard() -> AccessResult<Self> {
        let mut plans = BTreeMap::new();
        for (plan_id, grants) in BUILTIN_PLANS {
            plans.insert(plan_id.to_string(), PlanFragment::from_grants(plan_id, grants)?);
        }
        Ok(Self {
            plans,
            merge_mode: OverlayMergeMode::default(),
            annual_aliases: true,
        })
    }

    pub fn with_merge_mode(mut self, mode: OverlayMergeMode) -> Self {
        self.merge_mode = mode;
        self
    }

    pub fn with_annual_aliases(mut self, enabled: bool) -> Self {
        self.annual_aliases = enabled;
        self
    }

    /// Add a plan or replace an existing plan's fragment.
    pub fn insert_plan(&mut self, plan_id: impl Into<String>, fragment: PlanFragment) {
        self.plans.insert(plan_id.into(), fragment);
    }

    pub fn merge_mode(&self) -> OverlayMergeMode {
        self.merge_mode
    }

    pub fn plan_ids(&self) -> impl Iterator<Item = &str> {
        self.plans.keys().map(String::as_str)
    }

    /// Fragment for a plan id; yearly ids fall back to their monthly plan when enabled.
    pub fn fragment(&self, plan_id: &str) -> Option<&PlanFragment> {
        self.plans.get(plan_id).or_else(|| {
            if !self.annual_aliases {
                return None;
            }
            plan_id
                .strip_suffix(ANNUAL_SUFFIX)
                .and_then(|monthly| self.plans.get(monthly))
        })
    }

    /// Overlay matrix granted by `tier` and `plan_ids`.
    ///
    /// Enterprise grants everything regardless of plans. Other tiers only
    /// contribute through their plan fragments; unknown plan ids are skipped.
    pub fn overlay(&self, tier: SubscriptionTier, plan_ids: &BTreeSet<String>) -> PermissionMatrix {
        if tier == SubscriptionTier::Enterprise {
            return PermissionMatrix::all_true();
        }

        let fragments = plan_ids.iter().filter_map(|plan_id| {
            let fragment = self.fragment(plan_id);
            if fragment.is_none() {
                warn!(plan_id = %plan_id, "plan has no permission fragment, skipping");
            }
            fragment
        });

        let mut overlay = PermissionMatrix::all_false();
        match self.merge_mode {
            OverlayMergeMode::KeyUnion => {
                for fragment in fragments {
                    for (_, keys) in fragment.areas() {
                        keys.iter().for_each(|key| overlay.set(*key, true));
                    }
                }
            }
            OverlayMergeMode::AreaReplace => {
                let mut by_area: BTreeMap<FeatureArea, &BTreeSet<CapabilityKey>> = BTreeMap::new();
                for fragment in fragments {
                    for (area, keys) in fragment.areas() {
                        by_area.insert(area, keys);
                    }
                }
                for keys in by_area.values() {
                    keys.iter().for_each(|key| overlay.set(*key, true));
                }
            }
        }

        debug!(
            tier = %tier,
            plans = plan_ids.len(),
            granted = overlay.granted().count(),
            "built subscription overlay"
        );
        overlay
    }
}

/// Apply an overlay on top of a baseline: cells the overlay grants become
/// `true`, every other cell keeps the baseline value.
pub fn monotonic_or(base: &PermissionMatrix, overlay: &PermissionMatrix) -> PermissionMatrix {
    let mut merged = *base;
    for key in overlay.granted() {
        merged.set(key, true);
    }
    merged
}
