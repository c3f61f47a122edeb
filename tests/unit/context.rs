use super::*;

fn config_in(dir: &Path) -> HarnessConfig {
    HarnessConfig {
        scratch_root: Some(dir.join("scratch")),
        ..HarnessConfig::with_reference_dir(dir.join("refs"))
    }
}

#[test]
fn reference_store_reports_missing_files() {
    let dir = tempfile::tempdir().unwrap();
    let store = ReferenceStore::new(dir.path());
    std::fs::write(dir.path().join("depth.png"), b"x").unwrap();

    assert_eq!(store.resolve("depth.png").unwrap(), dir.path().join("depth.png"));
    assert!(matches!(
        store.resolve("stencil.png"),
        Err(HarnessError::ReferenceMissing(p)) if p == dir.path().join("stencil.png")
    ));
}

#[test]
fn contexts_get_disjoint_scratch_namespaces() {
    let dir = tempfile::tempdir().unwrap();
    let a = RunContext::new(config_in(dir.path())).unwrap();
    let b = RunContext::new(config_in(dir.path())).unwrap();

    assert_ne!(a.scratch_dir(), b.scratch_dir());
    assert!(a.scratch_dir().starts_with(dir.path().join("scratch")));
    assert_eq!(
        a.candidate_path("Drawcall.png"),
        a.scratch_dir().join("Drawcall.png")
    );
    assert_eq!(
        a.diff_path("Drawcall.png"),
        a.scratch_dir().join("Drawcall.diff.png")
    );
}

#[test]
fn scratch_is_removed_unless_kept() {
    let dir = tempfile::tempdir().unwrap();

    let ctx = RunContext::new(config_in(dir.path())).unwrap();
    let dropped = ctx.scratch_dir().to_path_buf();
    assert!(dropped.is_dir());
    drop(ctx);
    assert!(!dropped.exists());

    let kept_cfg = HarnessConfig {
        keep_scratch: true,
        ..config_in(dir.path())
    };
    let ctx = RunContext::new(kept_cfg).unwrap();
    let kept = ctx.scratch_dir().to_path_buf();
    drop(ctx);
    assert!(kept.is_dir());
}

#[test]
fn invalid_config_is_rejected() {
    let cfg = HarnessConfig {
        marker: String::new(),
        ..HarnessConfig::default()
    };
    assert!(matches!(RunContext::new(cfg), Err(HarnessError::Config(_))));
}

#[test]
fn failed_context_keeps_scratch_on_drop() {
    let dir = tempfile::tempdir().unwrap();
    let ctx = RunContext::new(config_in(dir.path())).unwrap();
    let scratch = ctx.scratch_dir().to_path_buf();
    std::fs::write(ctx.candidate_path("Depth.png"), b"candidate").unwrap();

    assert!(!ctx.has_failures());
    ctx.mark_failed();
    assert!(ctx.has_failures());
    drop(ctx);

    assert!(scratch.join("Depth.png").is_file());
}
