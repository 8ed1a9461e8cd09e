//! Integration tests for Settings layered loading.
//!
//! Only `env_override_*` touches DYNTREE_* variables, and it only checks
//! `in_place`, so the file tests stay independent of it.

use std::fs;

use tempfile::TempDir;

use dyntree::config::{Settings, SettingsError};

#[test]
fn given_missing_explicit_config_file_when_load_then_read_error() {
    let dir = TempDir::new().unwrap();
    let absent = dir.path().join("absent.toml");

    let result = Settings::load_from(&absent);

    match result {
        Err(SettingsError::Read { path, .. }) => assert_eq!(path, absent),
        other => panic!("expected read error, got {:?}", other),
    }
}

#[test]
fn given_empty_config_file_when_load_then_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dyntree.toml");
    fs::write(&path, "").unwrap();

    let settings = Settings::load_from(&path).expect("load settings");

    assert_eq!(settings.separator, '.');
    assert_eq!(settings.indent, "  ");
    assert_eq!(settings.prefix, "");
}

#[test]
fn given_config_file_when_load_then_file_values_override_defaults() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dyntree.toml");
    fs::write(
        &path,
        r#"
separator = "/"
indent = "    "
"#,
    )
    .unwrap();

    let settings = Settings::load_from(&path).expect("load settings");

    assert_eq!(settings.separator, '/');
    assert_eq!(settings.indent, "    ");
    assert_eq!(settings.prefix, "");
}

#[test]
fn given_malformed_config_file_when_load_then_parse_error() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dyntree.toml");
    fs::write(&path, "separator = [").unwrap();

    let result = Settings::load_from(&path);

    assert!(matches!(result, Err(SettingsError::Parse { .. })));
}

#[test]
fn env_override_replaces_file_value() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("dyntree.toml");
    fs::write(&path, "in_place = false\n").unwrap();

    std::env::set_var("DYNTREE_IN_PLACE", "true");
    let settings = Settings::load_from(&path);
    std::env::remove_var("DYNTREE_IN_PLACE");

    assert!(settings.expect("load settings").in_place);
}
