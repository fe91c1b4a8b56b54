use goboundcheck::LintEngine;
use goboundcheck::config;
use goboundcheck::level::LintLevel;
use goboundcheck::lint::{LintRegistry, LintSettings};
use std::path::Path;

#[test]
fn config_can_promote_lint_to_error() {
    let cfg_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/config/error_level/goboundcheck.toml");
    let cfg = config::load_config_file(&cfg_path).expect("config should load");

    let settings = LintSettings::default()
        .with_config_levels(cfg.lints.levels)
        .disable(cfg.lints.disabled);
    let engine = LintEngine::new_with_settings(LintRegistry::default_rules(), settings);

    let src = include_str!("fixtures/go/slices_bad.go");
    let diags = engine.lint_source(src).expect("linting should succeed");

    assert!(!diags.is_empty());
    assert!(
        diags
            .iter()
            .all(|d| d.lint.name == "unchecked_bounds_access" && d.level == LintLevel::Error)
    );
}

#[test]
fn config_can_disable_lint() {
    let cfg_path = Path::new(env!("CARGO_MANIFEST_DIR"))
        .join("tests/fixtures/config/disabled/goboundcheck.toml");
    let cfg = config::load_config_file(&cfg_path).expect("config should load");

    let settings = LintSettings::default()
        .with_config_levels(cfg.lints.levels)
        .disable(cfg.lints.disabled);
    let engine = LintEngine::new_with_settings(LintRegistry::default_rules(), settings);

    let src = include_str!("fixtures/go/slices_bad.go");
    let diags = engine.lint_source(src).expect("linting should succeed");

    assert!(diags.is_empty());
}

#[test]
fn config_file_is_discovered_upward() {
    let dir = tempfile::tempdir().expect("tempdir");
    let nested = dir.path().join("pkg").join("internal");
    std::fs::create_dir_all(&nested).expect("mkdir");
    std::fs::write(
        dir.path().join(config::DEFAULT_CONFIG_FILE_NAME),
        "[lints]\ndisabled = [\"unchecked_bounds_access\"]\n",
    )
    .expect("write config");

    let found = config::find_config_file(&nested).expect("config should be found");
    assert_eq!(found, dir.path().join(config::DEFAULT_CONFIG_FILE_NAME));

    let cfg = config::load_config_file(&found).expect("config should load");
    assert_eq!(cfg.lints.disabled, vec!["unchecked_bounds_access"]);
}

#[test]
fn missing_config_means_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let loaded = config::load_config(None, dir.path()).expect("load should not fail");
    // the tempdir has no goboundcheck.toml anywhere up its (temp) chain
    if let Some((path, _)) = loaded {
        assert!(
            !path.starts_with(dir.path()),
            "unexpected config inside tempdir: {}",
            path.display()
        );
    }
}
