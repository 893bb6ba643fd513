//! Per-user custom overrides, the highest precedence layer below lockdown.

use crate::errors::{AccessError, AccessResult};
use crate::schema::{CapabilityKey, FeatureArea, PermissionMatrix};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Wire shape of an override fragment: `area -> key -> value`.
pub type RawOverrides = BTreeMap<String, BTreeMap<String, bool>>;

/// Sparse set of explicit `true`/`false` assignments set by an administrator.
///
/// Parsing validates every area and key, so an override naming a capability
/// outside the schema is rejected before it can reach resolution.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(try_from = "RawOverrides", into = "RawOverrides")]
pub struct CustomOverrides {
    cells: BTreeMap<CapabilityKey, bool>,
}

impl CustomOverrides {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set or replace the override for `key`.
    pub fn set(&mut self, key: CapabilityKey, value: bool) -> &mut Self {
        self.cells.insert(key, value);
        self
    }

    /// Set an override by area and key name, rejecting names outside the schema.
    pub fn set_named(&mut self, area: FeatureArea, name: &str, value: bool) -> AccessResult<&mut Self> {
        let key = CapabilityKey::resolve("custom overrides", area, name)?;
        Ok(self.set(key, value))
    }

    pub fn remove(&mut self, key: CapabilityKey) -> Option<bool> {
        self.cells.remove(&key)
    }

    pub fn get(&self, key: CapabilityKey) -> Option<bool> {
        self.cells.get(&key).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (CapabilityKey, bool)> + '_ {
        self.cells.iter().map(|(key, value)| (*key, *value))
    }
}

impl TryFrom<RawOverrides> for CustomOverrides {
    type Error = AccessError;

    fn try_from(raw: RawOverrides) -> Result<Self, Self::Error> {
        let mut overrides = CustomOverrides::new();
        for (area, keys) in &raw {
            for (name, value) in keys {
                let key = CapabilityKey::parse("custom overrides", area, name)?;
                overrides.set(key, *value);
            }
        }
        Ok(overrides)
    }
}

impl From<CustomOverrides> for RawOverrides {
    fn from(overrides: CustomOverrides) -> Self {
        let mut raw = RawOverrides::new();
        for (key, value) in overrides.iter() {
            raw.entry(key.area().as_str().to_string())
                .or_default()
                .insert(key.name().to_string(), value);
        }
        raw
    }
}

/// Assign every overridden cell directly, replacing whatever `merged` held.
pub fn apply_overrides(merged: &PermissionMatrix, overrides: Option<&CustomOverrides>) -> PermissionMatrix {
    let mut effective = *merged;
    if let Some(overrides) = overrides {
        for (key, value) in overrides.iter() {
            effective.set(key, value);
        }
    }
    effective
}
