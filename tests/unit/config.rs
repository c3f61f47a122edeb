use super::*;

#[test]
fn defaults_match_the_overlay_test() {
    let cfg = HarnessConfig::default();
    assert_eq!(cfg.marker, "Test");
    assert_eq!(cfg.output_size, Extent::new(100, 100));
    assert_eq!(cfg.overlay_tolerance, 2);
    assert_eq!(cfg.channel_tolerance, 0);
    assert_eq!(cfg.sweep_policy, SweepPolicy::AbortOnFirst);
    assert!(cfg.write_diff_images);
    assert!(!cfg.keep_scratch);
    cfg.validate().unwrap();
}

#[test]
fn json_overrides_only_named_fields() {
    let cfg = HarnessConfig::from_json_str(
        r#"{ "reference_dir": "refs/d3d11", "sweep_policy": "collect_all", "channel_tolerance": 1 }"#,
    )
    .unwrap();
    assert_eq!(cfg.reference_dir, PathBuf::from("refs/d3d11"));
    assert_eq!(cfg.sweep_policy, SweepPolicy::CollectAll);
    assert_eq!(cfg.channel_tolerance, 1);
    assert_eq!(cfg.overlay_tolerance, 2);
}

#[test]
fn unknown_fields_and_bad_values_are_config_errors() {
    assert!(matches!(
        HarnessConfig::from_json_str(r#"{ "tolerance": 3 }"#),
        Err(HarnessError::Config(_))
    ));
    assert!(matches!(
        HarnessConfig::from_json_str(r#"{ "marker": "  " }"#),
        Err(HarnessError::Config(_))
    ));
    assert!(matches!(
        HarnessConfig::from_json_str(r#"{ "output_size": { "width": 0, "height": 10 } }"#),
        Err(HarnessError::Config(_))
    ));
}

#[test]
fn loads_from_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("harness.json");
    std::fs::write(&path, r#"{ "marker": "Overlay", "keep_scratch": true }"#).unwrap();

    let cfg = HarnessConfig::from_json_file(&path).unwrap();
    assert_eq!(cfg.marker, "Overlay");
    assert!(cfg.keep_scratch);

    let missing = dir.path().join("missing.json");
    assert!(matches!(
        HarnessConfig::from_json_file(&missing),
        Err(HarnessError::Config(_))
    ));
}
