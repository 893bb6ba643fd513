use crate::engine::PermissionEngine;
use crate::errors::AccessResult;
use crate::plan_overlay::{OverlayMergeMode, PlanCatalog, PlanFragment};
use crate::role_defaults::RoleDefaultTable;
use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::info;

/// Default config file looked up in the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "fleetflow_access.toml";

/// Prefix for environment overrides, e.g. `FLEETFLOW_OVERLAY_MERGE_MODE=area_replace`.
pub const ENV_PREFIX: &str = "FLEETFLOW_";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccessConfig {
    #[serde(default)]
    pub overlay_merge_mode: OverlayMergeMode,
    #[serde(default = "default_annual_aliases")]
    pub annual_plan_aliases: bool,
    /// Extra or replacement plan fragments: `plan id -> area -> [key, ...]`.
    #[serde(default)]
    pub plans: BTreeMap<String, BTreeMap<String, Vec<String>>>,
}

fn default_annual_aliases() -> bool {
    true
}

impl Default for AccessConfig {
    fn default() -> Self {
        AccessConfig {
            overlay_merge_mode: OverlayMergeMode::default(),
            annual_plan_aliases: default_annual_aliases(),
            plans: BTreeMap::new(),
        }
    }
}

/// Load configuration from defaults, an optional TOML file, then the environment.
///
/// When `path` is `None` the default file is used if present.
pub fn load_config(path: Option<&Path>) -> AccessResult<AccessConfig> {
    let file = path.unwrap_or_else(|| Path::new(DEFAULT_CONFIG_FILE));
    let figment = Figment::from(Serialized::defaults(AccessConfig::default()))
        .merge(Toml::file(file))
        .merge(Env::prefixed(ENV_PREFIX));

    let config: AccessConfig = figment.extract()?;
    Ok(config)
}

impl PermissionEngine {
    /// Build an engine from configuration, validating configured plans against the schema.
    pub fn from_config(config: &AccessConfig) -> AccessResult<Self> {
        let mut plans = PlanCatalog::standard()?
            .with_merge_mode(config.overlay_merge_mode)
            .with_annual_aliases(config.annual_plan_aliases);

        for (plan_id, raw) in &config.plans {
            plans.insert_plan(plan_id.clone(), PlanFragment::from_names(plan_id, raw)?);
        }

        info!(
            configured_plans = config.plans.len(),
            merge_mode = ?config.overlay_merge_mode,
            "loaded access configuration"
        );
        Ok(PermissionEngine::new(RoleDefaultTable::standard()?, plans))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AccessConfig::default();
        assert_eq!(config.overlay_merge_mode, OverlayMergeMode::KeyUnion);
        assert!(config.annual_plan_aliases);
        assert!(config.plans.is_empty());
    }

    #[test]
    fn test_engine_from_default_config() {
        let engine = PermissionEngine::from_config(&AccessConfig::default()).unwrap();
        assert_eq!(engine.plans().merge_mode(), OverlayMergeMode::KeyUnion);
    }

    #[test]
    fn test_bad_configured_plan_fails_fast() {
        let mut config = AccessConfig::default();
        let mut areas = BTreeMap::new();
        areas.insert("brokerBox".to_string(), vec!["canPostLoadsEverywhere".to_string()]);
        config.plans.insert("custom".to_string(), areas);

        let err = PermissionEngine::from_config(&config).unwrap_err();
        assert!(err.to_string().contains("configured plan custom"));
    }
}
