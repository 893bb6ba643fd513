//! Library root for the `fleetflow_access` crate
//! Section-level permission resolution for the FleetFlow dashboard

// Core error handling
pub mod errors;

// Capability catalog
pub mod schema;

// Inputs
pub mod role;
pub mod subscription;
pub mod user;

// Resolution layers
pub mod role_defaults;
pub mod plan_overlay;
pub mod lockdown;
pub mod overrides;

// Orchestration & accessors
pub mod engine;
pub mod legacy;
pub mod training;

// Configuration & CLI
pub mod config_loader;
pub mod cli;

pub use engine::{EffectivePermissions, PermissionEngine, ResolutionTrace};
pub use errors::{AccessError, AccessResult};
pub use legacy::LegacyCheck;
pub use overrides::CustomOverrides;
pub use role::Role;
pub use schema::{CapabilityKey, FeatureArea, PermissionMatrix};
pub use subscription::{SubscriptionState, SubscriptionStatus, SubscriptionTier};
pub use user::User;
