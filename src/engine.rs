//! Resolution engine
//!
//! Orchestrates the lockdown gate, role defaults, subscription overlay and
//! custom overrides into one pure function of a [`User`]. The engine holds
//! only immutable tables, so a single instance can be shared across threads
//! and called concurrently without locking.

use crate::errors::AccessResult;
use crate::lockdown::is_locked;
use crate::overrides::apply_overrides;
use crate::plan_overlay::{monotonic_or, PlanCatalog};
use crate::role::Role;
use crate::role_defaults::RoleDefaultTable;
use crate::schema::{CapabilityKey, FeatureArea, PermissionMatrix};
use crate::user::User;
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// The resolved matrix for one user at one point in time. Never persisted.
pub type EffectivePermissions = PermissionMatrix;

#[derive(Debug, Clone)]
pub struct PermissionEngine {
    roles: RoleDefaultTable,
    plans: PlanCatalog,
}

impl PermissionEngine {
    pub fn new(roles: RoleDefaultTable, plans: PlanCatalog) -> Self {
        Self { roles, plans }
    }

    /// Engine over the built-in role and plan tables.
    pub fn standard() -> AccessResult<Self> {
        let engine = Self::new(RoleDefaultTable::standard()?, PlanCatalog::standard()?);
        info!(
            plans = engine.plans.plan_ids().count(),
            merge_mode = ?engine.plans.merge_mode(),
            "permission engine ready"
        );
        Ok(engine)
    }

    pub fn roles(&self) -> &RoleDefaultTable {
        &self.roles
    }

    pub fn plans(&self) -> &PlanCatalog {
        &self.plans
    }

    /// Compute the effective permissions for `user`.
    pub fn resolve(&self, user: &User) -> EffectivePermissions {
        let state = &user.subscription_state;
        if is_locked(state, &user.role) {
            debug!(user_id = %user.id, role = %user.role, status = %state.status, "subscription lockdown");
            return PermissionMatrix::all_false();
        }

        let base = self.roles.role_defaults(&user.role);
        let overlay = self.plans.overlay(state.tier, &state.plan_ids);
        let merged = monotonic_or(&base, &overlay);
        let effective = apply_overrides(&merged, user.custom_overrides.as_ref());

        debug!(
            user_id = %user.id,
            role = %user.role,
            granted = effective.granted().count(),
            "resolved permissions"
        );
        effective
    }

    /// Single-cell query.
    pub fn can(&self, user: &User, key: CapabilityKey) -> bool {
        self.resolve(user).get(key)
    }

    /// Single-cell query by area and key name; names outside the schema are an error.
    pub fn can_named(&self, user: &User, area: FeatureArea, name: &str) -> AccessResult<bool> {
        let key = CapabilityKey::resolve("capability query", area, name)?;
        Ok(self.can(user, key))
    }

    /// Resolve `user` and record which layer decided every cell.
    pub fn explain(&self, user: &User) -> ResolutionTrace {
        let state = &user.subscription_state;
        let locked = is_locked(state, &user.role);

        let mut decisions: BTreeMap<&'static str, BTreeMap<&'static str, Decision>> = BTreeMap::new();
        let mut permissions = PermissionMatrix::all_false();

        if locked {
            for key in CapabilityKey::all() {
                record(&mut decisions, key, false, DecisionSource::Lockdown);
            }
        } else {
            let base = self.roles.role_defaults(&user.role);
            let overlay = self.plans.overlay(state.tier, &state.plan_ids);
            let overrides = user.custom_overrides.as_ref();

            for key in CapabilityKey::all() {
                let (value, source) = match overrides.and_then(|o| o.get(key)) {
                    Some(value) => (value, DecisionSource::CustomOverride),
                    None if base.get(key) => (true, DecisionSource::RoleDefault),
                    None if overlay.get(key) => (true, DecisionSource::SubscriptionOverlay),
                    None => (false, DecisionSource::RoleDefault),
                };
                permissions.set(key, value);
                record(&mut decisions, key, value, source);
            }
        }

        ResolutionTrace {
            user_id: user.id.clone(),
            role: user.role.clone(),
            locked,
            evaluated_at: Utc::now(),
            permissions,
            decisions,
        }
    }
}

fn record(
    decisions: &mut BTreeMap<&'static str, BTreeMap<&'static str, Decision>>,
    key: CapabilityKey,
    value: bool,
    source: DecisionSource,
) {
    decisions
        .entry(key.area().as_str())
        .or_default()
        .insert(key.name(), Decision { value, source });
}

/// Layer that produced a cell's final value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DecisionSource {
    Lockdown,
    RoleDefault,
    SubscriptionOverlay,
    CustomOverride,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Decision {
    pub value: bool,
    pub source: DecisionSource,
}

/// Effective permissions plus per-cell provenance.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResolutionTrace {
    pub user_id: String,
    pub role: Role,
    pub locked: bool,
    pub evaluated_at: DateTime<Utc>,
    #[serde(skip)]
    pub permissions: EffectivePermissions,
    pub decisions: BTreeMap<&'static str, BTreeMap<&'static str, Decision>>,
}

impl ResolutionTrace {
    pub fn decision(&self, key: CapabilityKey) -> Option<Decision> {
        self.decisions
            .get(key.area().as_str())
            .and_then(|area| area.get(key.name()))
            .copied()
    }
}
