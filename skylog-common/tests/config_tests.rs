//! Root folder resolution and config file loading tests
//!
//! Tests touching process environment run serially.

use serial_test::serial;
use skylog_common::config::{load_config, resolve_root_folder, TomlConfig, ROOT_FOLDER_ENV};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

#[test]
#[serial]
fn test_env_var_beats_toml() {
    std::env::set_var(ROOT_FOLDER_ENV, "/from/env");
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, &config);
    std::env::remove_var(ROOT_FOLDER_ENV);

    assert_eq!(resolved, PathBuf::from("/from/env"));
}

#[test]
#[serial]
fn test_toml_used_when_env_unset() {
    std::env::remove_var(ROOT_FOLDER_ENV);
    let config = TomlConfig {
        root_folder: Some(PathBuf::from("/from/toml")),
        ..Default::default()
    };

    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, &config);
    assert_eq!(resolved, PathBuf::from("/from/toml"));
}

#[test]
#[serial]
fn test_default_root_folder_is_named_skylog() {
    std::env::remove_var(ROOT_FOLDER_ENV);
    let resolved = resolve_root_folder(None, ROOT_FOLDER_ENV, &TomlConfig::default());
    assert!(resolved.ends_with("skylog") || resolved.ends_with("skylog_data"));
}

#[test]
fn test_load_explicit_config_file() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
        [server]
        host = "0.0.0.0"
        port = 8080

        [geocoding]
        user_agent = "test-agent/1.0"

        [history]
        page_limit = 10
        "#,
    )
    .unwrap();

    let config = load_config(Some(&path)).unwrap();
    assert_eq!(config.server.host, "0.0.0.0");
    assert_eq!(config.server.port, 8080);
    assert_eq!(config.geocoding.user_agent, "test-agent/1.0");
    assert_eq!(config.history.page_limit, 10);
    assert_eq!(config.history.export_limit, 1000);
}

#[test]
fn test_invalid_limits_in_file_rejected() {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[history]\nexport_limit = 0\n").unwrap();

    assert!(load_config(Some(Path::new(&path))).is_err());
}
