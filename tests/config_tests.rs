//! Configuration loading through figment: file, defaults and validation.

use fleetflow_access::config_loader::load_config;
use fleetflow_access::plan_overlay::OverlayMergeMode;
use fleetflow_access::{
    CapabilityKey, FeatureArea, PermissionEngine, Role, SubscriptionState, SubscriptionStatus,
    SubscriptionTier, User,
};
use std::io::Write;
use tempfile::NamedTempFile;

fn config_file(contents: &str) -> NamedTempFile {
    let mut file = tempfile::Builder::new()
        .suffix(".toml")
        .tempfile()
        .expect("create temp config");
    file.write_all(contents.as_bytes()).expect("write temp config");
    file
}

#[test]
fn configured_plan_is_applied() {
    let file = config_file(
        r#"
overlay_merge_mode = "area_replace"
annual_plan_aliases = false

[plans.payments_addon]
accounting = ["canProcessPayments"]
"#,
    );

    let config = load_config(Some(file.path())).unwrap();
    assert_eq!(config.overlay_merge_mode, OverlayMergeMode::AreaReplace);
    assert!(!config.annual_plan_aliases);

    let engine = PermissionEngine::from_config(&config).unwrap();
    assert_eq!(engine.plans().merge_mode(), OverlayMergeMode::AreaReplace);

    let payments = CapabilityKey::lookup(FeatureArea::Accounting, "canProcessPayments").unwrap();
    let user = User::new(
        "driver-cfg",
        Role::Driver,
        SubscriptionState::new(SubscriptionStatus::Active, SubscriptionTier::Basic)
            .with_plan("payments_addon"),
    );
    assert!(engine.can(&user, payments));

    // aliases disabled: the annual id no longer falls back
    let annual = User::new(
        "driver-annual",
        Role::Driver,
        SubscriptionState::new(SubscriptionStatus::Active, SubscriptionTier::Basic)
            .with_plan("payments_addon-annual"),
    );
    assert!(!engine.can(&annual, payments));
}

#[test]
fn missing_file_falls_back_to_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let config = load_config(Some(&dir.path().join("absent.toml"))).unwrap();
    assert_eq!(config.overlay_merge_mode, OverlayMergeMode::KeyUnion);
    assert!(config.annual_plan_aliases);
    assert!(config.plans.is_empty());
}

#[test]
fn unknown_key_in_configured_plan_fails_fast() {
    let file = config_file(
        r#"
[plans.broken]
dispatchCentral = ["canTeleportTrucks"]
"#,
    );

    let config = load_config(Some(file.path())).unwrap();
    let err = PermissionEngine::from_config(&config).unwrap_err();
    assert!(err.to_string().contains("canTeleportTrucks"));
}

#[test]
fn unknown_merge_mode_is_rejected() {
    let file = config_file("overlay_merge_mode = \"sometimes\"\n");
    assert!(load_config(Some(file.path())).is_err());
}
