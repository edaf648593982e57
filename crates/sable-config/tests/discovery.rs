use std::fs;

use pretty_assertions::assert_eq;
use sable_config::{discover_config_path, load_for_workspace, DiagnosticLevel, SableConfig};

#[test]
fn missing_config_yields_defaults() {
    let dir = tempfile::tempdir().expect("tempdir");
    let (config, path, diagnostics) = load_for_workspace(dir.path()).expect("load");
    assert_eq!(config, SableConfig::default());
    assert_eq!(path, None);
    assert!(diagnostics.is_empty());
}

#[test]
fn root_file_wins_over_dot_directory() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::create_dir(dir.path().join(".sable")).expect("mkdir");
    fs::write(
        dir.path().join(".sable/config.toml"),
        "[quick_info]\nsum_types = false\n",
    )
    .expect("write");
    assert_eq!(
        discover_config_path(dir.path()),
        Some(dir.path().join(".sable/config.toml"))
    );

    fs::write(
        dir.path().join("sable.toml"),
        "[diagnostics]\nimmutable_array_creation = \"warning\"\nbogus = 1\n",
    )
    .expect("write");
    let (config, path, diagnostics) = load_for_workspace(dir.path()).expect("load");
    assert_eq!(path, Some(dir.path().join("sable.toml")));
    assert_eq!(
        config.diagnostics.immutable_array_creation,
        DiagnosticLevel::Warning
    );
    assert!(config.quick_info.sum_types);
    assert_eq!(diagnostics.unknown_keys, ["diagnostics.bogus"]);
}

#[test]
fn unreadable_toml_is_an_error() {
    let dir = tempfile::tempdir().expect("tempdir");
    fs::write(dir.path().join("sable.toml"), "[refactor\n").expect("write");
    assert!(load_for_workspace(dir.path()).is_err());
}
